use crate::adapter::ChatSink;
use crate::render::{Embed, OutgoingMessage};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Plain-text rendering of outgoing messages for a terminal.
pub fn format_message(message: &OutgoingMessage) -> String {
    match message {
        OutgoingMessage::Text(text) => format!("{}\n", text),
        OutgoingMessage::Embed(embed) => format_embed(embed),
        OutgoingMessage::Interactive {
            embed,
            choices,
            button,
        } => {
            let mut out = format_embed(embed);
            out.push_str("Styles (/genre <name>):\n");
            for choice in choices {
                let marker = if choice.selected { '*' } else { ' ' };
                out.push_str(&format!(
                    " {} {:<18} {}\n",
                    marker, choice.value, choice.description
                ));
            }
            out.push_str(&format!("[{}] (/go)\n", button));
            out
        }
    }
}

fn format_embed(embed: &Embed) -> String {
    let mut out = format!("== {} ==\n", embed.title);
    if !embed.description.is_empty() {
        out.push_str(&embed.description);
        out.push('\n');
    }
    for field in &embed.fields {
        out.push_str(&format!("-- {} --\n{}\n", field.name, field.value));
    }
    if let Some(footer) = &embed.footer {
        out.push_str(&format!("({})\n", footer));
    }
    out
}

/// Chat sink that prints to any async writer.
pub struct ConsoleSink<W> {
    out: W,
}

impl<W: AsyncWrite + Unpin + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: AsyncWrite + Unpin + Send> ChatSink for ConsoleSink<W> {
    async fn defer(&mut self) -> anyhow::Result<()> {
        self.out.write_all(b"... thinking\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn send(&mut self, message: OutgoingMessage) -> anyhow::Result<()> {
        self.out
            .write_all(format_message(&message).as_bytes())
            .await?;
        self.out.flush().await?;
        Ok(())
    }
}

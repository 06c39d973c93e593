mod nfc;
mod sanitize;

pub use nfc::NfcProcessor;
pub use sanitize::SanitizationProcessor;

/// One pass over reassembled display text, after the original spacing has
/// been restored.
pub trait TextProcessor: Send + Sync {
    fn process(&self, text: &str) -> String;
}

/// Ordered chain of display processors; each sees the previous one's output.
pub struct Pipeline {
    processors: Vec<Box<dyn TextProcessor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
        }
    }

    pub fn add_processor(&mut self, processor: Box<dyn TextProcessor>) {
        self.processors.push(processor);
    }

    /// Pipeline applied to every piece of text shown to users.
    ///
    /// Order matters: stripping invisible characters can bring combining marks
    /// next to each other, so canonical normalization runs last.
    pub fn for_display() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_processor(Box::new(SanitizationProcessor));
        pipeline.add_processor(Box::new(NfcProcessor));
        pipeline
    }

    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();

        for processor in &self.processors {
            result = processor.process(&result);
        }

        result
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

use aleph_engine::{BotCommand, OptionOverrides};
use aleph_types::{AnalysisGenre, Operation, TranslationDirection, TranslationGenre};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "alephbot")]
#[command(about = "Hebrew vowelization, analysis and translation bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Add niqqud (vowel points) to Hebrew text")]
    Vowelize(HebrewArgs),
    #[command(about = "Show morphological analysis of Hebrew text")]
    Analyze(HebrewArgs),
    #[command(about = "Get the base/root forms of Hebrew words")]
    Lemmatize(HebrewArgs),
    #[command(about = "Translate text between Hebrew and English")]
    Translate(TranslateArgs),
    #[command(about = "Start an interactive chat session on stdin")]
    Shell {
        #[arg(long, default_value = "console")]
        user: String,
    },
}

#[derive(Args)]
struct HebrewArgs {
    /// Text genre: modern, biblical, mishnaic or poetic
    #[arg(long)]
    genre: Option<AnalysisGenre>,
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,
}

#[derive(Args)]
struct TranslateArgs {
    /// Translation style, e.g. modern-formal or biblical
    #[arg(long)]
    genre: Option<TranslationGenre>,
    /// he-en or en-he; detected from the text when omitted
    #[arg(long)]
    direction: Option<TranslationDirection>,
    /// Determinism parameter between 0.0 and 1.0
    #[arg(long)]
    temperature: Option<f32>,
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,
}

fn hebrew(operation: Operation, args: HebrewArgs) -> BotCommand {
    BotCommand::Once {
        operation,
        text: args.text.join(" "),
        overrides: OptionOverrides {
            analysis_genre: args.genre,
            ..OptionOverrides::default()
        },
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Vowelize(args) => hebrew(Operation::Vowelize, args),
        Commands::Analyze(args) => hebrew(Operation::Analyze, args),
        Commands::Lemmatize(args) => hebrew(Operation::Lemmatize, args),
        Commands::Translate(args) => BotCommand::Once {
            operation: Operation::Translate,
            text: args.text.join(" "),
            overrides: OptionOverrides {
                direction: args.direction,
                translation_genre: args.genre,
                temperature: args.temperature,
                ..OptionOverrides::default()
            },
        },
        Commands::Shell { user } => BotCommand::Shell { user },
    };

    aleph_engine::run(command)
}

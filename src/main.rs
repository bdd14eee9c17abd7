//! Flashdeck - SM-2 scheduling and card generation
//!
//! CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use flashdeck::cli::cloze::{ClozeAction, ClozeCommand, ClozeOptions};
use flashdeck::cli::config::{ConfigAction, ConfigCommand, ConfigOptions};
use flashdeck::cli::due::{DueCommand, DueOptions};
use flashdeck::cli::generate::{GenerateCommand, GenerateOptions, NoteInput};
use flashdeck::cli::preview::{PreviewCommand, PreviewOptions, Side};
use flashdeck::cli::review::{ReviewCommand, ReviewOptions};
use flashdeck::cli::schedule::{ScheduleCommand, ScheduleOptions};
use flashdeck::config::Config;
use flashdeck::core::{
    CardGenerator, ClozeStyle, Reviewer, Scheduler, SchedulingState, INITIAL_EASE,
};
use flashdeck::error::{exit_codes, FlashdeckError};
use flashdeck::storage::FileReviewStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Flashdeck - SM-2 scheduling and card generation
#[derive(Parser)]
#[command(name = "flashdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the next schedule for a grade without storing anything
    Schedule {
        /// Review grade (0-5)
        #[arg(long, short = 'g', allow_negative_numbers = true)]
        quality: i64,
        /// Prior ease factor
        #[arg(long)]
        ease: Option<f64>,
        /// Prior interval in days
        #[arg(long, default_value_t = 0)]
        interval: u32,
        /// Prior number of successful repetitions
        #[arg(long, default_value_t = 0)]
        repetitions: u32,
        /// Review time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Record a review and store the new schedule
    Review {
        /// Card that was reviewed
        card_id: i64,
        /// Reviewing user
        #[arg(long, short)]
        user: i64,
        /// Review grade (0-5)
        #[arg(long, short = 'g', allow_negative_numbers = true)]
        quality: i64,
        /// Review time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List cards due for a user
    Due {
        /// User to list cards for
        #[arg(long, short)]
        user: i64,
        /// Candidate card ids (comma-separated); never-reviewed ones are due
        #[arg(long, value_delimiter = ',')]
        cards: Vec<i64>,
        /// Maximum number of cards
        #[arg(long, short)]
        limit: Option<usize>,
        /// Reference time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Work with cloze markup
    Cloze {
        #[command(subcommand)]
        action: ClozeSubcommand,
        /// Output style (defaults to plain)
        #[arg(long, value_enum, global = true)]
        style: Option<StyleArg>,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Generate cards from a note (JSON file or stdin)
    Generate {
        /// Input file, `-` or omitted for stdin
        input: Option<PathBuf>,
        /// Deck id, overriding the input
        #[arg(long)]
        deck_id: Option<i64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Render one card side as HTML (JSON file or stdin)
    Preview {
        /// Input file, `-` or omitted for stdin
        input: Option<PathBuf>,
        /// Zero-based card ordinal
        #[arg(long, default_value_t = 0)]
        ord: u32,
        /// Render the back instead of the front
        #[arg(long)]
        back: bool,
        /// Emit a standalone HTML document
        #[arg(long)]
        document: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigSubcommand,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Set a value in the project config (.flashdeck/config.toml)
    Set {
        /// Dotted key, e.g. scheduler.lapse_policy
        key: String,
        value: String,
    },
}

impl From<ConfigSubcommand> for ConfigAction {
    fn from(cmd: ConfigSubcommand) -> Self {
        match cmd {
            ConfigSubcommand::Show => ConfigAction::Show,
            ConfigSubcommand::Set { key, value } => ConfigAction::Set { key, value },
        }
    }
}

#[derive(Subcommand)]
enum ClozeSubcommand {
    /// Render text for one card
    Render {
        text: String,
        /// Card ordinal (the N in cN)
        #[arg(long, default_value_t = 1)]
        ordinal: u32,
        /// Show the answer instead of the placeholder
        #[arg(long)]
        reveal: bool,
    },
    /// Wrap text in cloze markup
    Create {
        content: String,
        /// Cloze index, defaults to the next free one in --note
        #[arg(long)]
        index: Option<u32>,
        /// Hint shown while hidden
        #[arg(long)]
        hint: Option<String>,
        /// Existing note text to number against
        #[arg(long)]
        note: Option<String>,
    },
    /// Print the next free cloze index
    Next { text: String },
    /// List the clozes in a text
    Parse { text: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Plain,
    Html,
}

impl From<StyleArg> for ClozeStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Plain => ClozeStyle::Plain,
            StyleArg::Html => ClozeStyle::Html,
        }
    }
}

impl From<ClozeSubcommand> for ClozeAction {
    fn from(cmd: ClozeSubcommand) -> Self {
        match cmd {
            ClozeSubcommand::Render {
                text,
                ordinal,
                reveal,
            } => ClozeAction::Render {
                text,
                ordinal,
                reveal,
            },
            ClozeSubcommand::Create {
                content,
                index,
                hint,
                note,
            } => ClozeAction::Create {
                content,
                index,
                hint,
                note,
            },
            ClozeSubcommand::Next { text } => ClozeAction::Next { text },
            ClozeSubcommand::Parse { text } => ClozeAction::Parse { text },
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("flashdeck error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Schedule {
            quality,
            ease,
            interval,
            repetitions,
            at,
            json,
            quiet,
        } => {
            let prior = SchedulingState {
                ease_factor: ease.unwrap_or(INITIAL_EASE),
                interval_days: interval,
                repetitions,
            };
            run_schedule(&config, quality, prior, at, json, quiet)
        }
        Commands::Review {
            card_id,
            user,
            quality,
            at,
            json,
            quiet,
        } => run_review(&config, card_id, user, quality, at, json, quiet),
        Commands::Due {
            user,
            cards,
            limit,
            at,
            json,
            quiet,
        } => run_due(&config, user, cards, limit, at, json, quiet),
        Commands::Cloze {
            action,
            style,
            json,
            quiet,
        } => run_cloze(action.into(), style, json, quiet),
        Commands::Generate {
            input,
            deck_id,
            json,
            quiet,
        } => run_generate(&config, input.as_deref(), deck_id, json, quiet),
        Commands::Preview {
            input,
            ord,
            back,
            document,
            json,
            quiet,
        } => {
            let side = if back { Side::Back } else { Side::Front };
            run_preview(&config, input.as_deref(), ord, side, document, json, quiet)
        }
        Commands::Config {
            action,
            json,
            quiet,
        } => run_config(action.into(), json, quiet),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Convert a command outcome to an exit code.
fn outcome_to_exit_code(success: bool, caller_error: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else if caller_error {
        ExitCode::from(exit_codes::USAGE as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
}

fn open_store(config: &Config) -> Result<FileReviewStore, FlashdeckError> {
    match config.reviews_dir() {
        Some(dir) => FileReviewStore::with_dir(dir),
        None => FileReviewStore::new(),
    }
}

/// Read the note input from a file, or stdin for `-` or no path.
fn read_note_input(path: Option<&Path>) -> Result<NoteInput, FlashdeckError> {
    let raw = match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).map_err(|e| FlashdeckError::storage(p, e))?
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    NoteInput::from_json(&raw)
}

fn run_schedule(
    config: &Config,
    quality: i64,
    prior: SchedulingState,
    at: Option<DateTime<Utc>>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ScheduleCommand::new(Scheduler::new(config.scheduler.lapse_policy));
    let options = ScheduleOptions {
        json,
        quiet,
        quality,
        prior: Some(prior),
        reviewed_at: at,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, output.caller_error))
}

fn run_review(
    config: &Config,
    card_id: i64,
    user_id: i64,
    quality: i64,
    at: Option<DateTime<Utc>>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let cmd = ReviewCommand::new(Reviewer::with_config(store, &config.scheduler));
    let options = ReviewOptions {
        json,
        quiet,
        card_id,
        user_id,
        quality,
        now: at,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, output.caller_error))
}

fn run_due(
    config: &Config,
    user_id: i64,
    card_ids: Vec<i64>,
    limit: Option<usize>,
    at: Option<DateTime<Utc>>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let cmd = DueCommand::new(Reviewer::with_config(store, &config.scheduler));
    let options = DueOptions {
        json,
        quiet,
        user_id,
        card_ids,
        limit,
        now: at,
    };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, false))
}

fn run_cloze(
    action: ClozeAction,
    style: Option<StyleArg>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ClozeCommand::new(style.map_or(ClozeStyle::Plain, ClozeStyle::from));
    let options = ClozeOptions { json, quiet };

    let output = cmd.run(&action);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, output.caller_error))
}

fn run_generate(
    config: &Config,
    input: Option<&Path>,
    deck_id: Option<i64>,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let input = match read_note_input(input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("flashdeck: invalid note input: {}", e);
            return Ok(ExitCode::from(exit_codes::USAGE as u8));
        }
    };

    let cmd = GenerateCommand::new(CardGenerator::from_config(&config.render));
    let options = GenerateOptions {
        json,
        quiet,
        deck_id,
    };

    let output = cmd.run(&input, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, output.caller_error))
}

fn run_preview(
    config: &Config,
    input: Option<&Path>,
    ord: u32,
    side: Side,
    document: bool,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let input = match read_note_input(input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("flashdeck: invalid note input: {}", e);
            return Ok(ExitCode::from(exit_codes::USAGE as u8));
        }
    };

    let cmd = PreviewCommand::new(CardGenerator::from_config(&config.render));
    let options = PreviewOptions {
        json,
        quiet,
        ord,
        side,
        document,
    };

    let output = cmd.run(&input, &options);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, output.caller_error))
}

fn run_config(
    action: ConfigAction,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ConfigCommand::new(std::env::current_dir()?);
    let options = ConfigOptions { json, quiet };

    let output = cmd.run(&action);
    print_formatted(&cmd.format_output(&output, &options));

    Ok(outcome_to_exit_code(output.success, output.caller_error))
}

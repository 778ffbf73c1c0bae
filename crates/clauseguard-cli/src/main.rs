mod commands;
mod output;

use clap::{Parser, Subcommand};
use clauseguard_core::script::ScriptCode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "clauseguard",
    version,
    about = "Offline risk analysis for freelance and services contracts"
)]
struct Cli {
    /// Log normalization and detection steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Analyzer config (tool paths, OCR settings, thresholds) as JSON
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a document.
#[derive(clap::Args)]
pub struct DocumentArgs {
    /// Path to a PDF, DOCX, text or image file
    pub input_file: PathBuf,

    /// Expected script: auto (default), english, devanagari, bengali,
    /// gurmukhi, gujarati, odia, tamil, telugu, kannada, malayalam
    #[arg(short, long, default_value = "auto", value_parser = parse_script)]
    pub script: ScriptCode,

    /// Always OCR PDFs, even when the text layer looks fine
    #[arg(long)]
    pub force_ocr: bool,

    /// Declared MIME type, overriding the file extension
    #[arg(long, value_name = "TYPE")]
    pub mime: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a contract: violations, deviations and risk score
    Analyze {
        #[command(flatten)]
        document: DocumentArgs,

        /// Fair template name (see `templates list`)
        #[arg(short, long, default_value = "freelance_general")]
        template: String,

        /// Custom fair template JSON file, overriding --template
        #[arg(long, value_name = "FILE")]
        template_file: Option<PathBuf>,

        /// JSON array of externally produced findings to merge
        #[arg(long, value_name = "FILE")]
        external: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Show how the document was read
        #[arg(long)]
        show_trace: bool,
    },
    /// Extract normalized text from a document (without analysing)
    Extract {
        #[command(flatten)]
        document: DocumentArgs,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Write the normalized text to a file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Print a redacted copy of a document's text, safe to share externally
    Redact {
        #[command(flatten)]
        document: DocumentArgs,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        output: String,
    },
    /// Inspect the built-in violation rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Inspect and validate fair templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List built-in rules
    List,
    /// Explain a rule in plain language
    Explain {
        /// Rule id (e.g., "LG-001") or violation type (e.g., "non_compete")
        rule: String,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List built-in fair templates
    List,
    /// Print a template as JSON (a starting point for custom templates)
    Show {
        /// Template name
        name: String,
    },
    /// Validate a custom template file
    Validate {
        /// Path to JSON template file
        file: PathBuf,
    },
}

fn parse_script(s: &str) -> Result<ScriptCode, String> {
    ScriptCode::from_str_loose(s).ok_or_else(|| format!("unknown script '{s}'"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "clauseguard_core=debug,clauseguard=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Analyze {
            document,
            template,
            template_file,
            external,
            output,
            show_trace,
        } => commands::analyze::run(
            &document,
            config,
            &template,
            template_file.as_deref(),
            external.as_deref(),
            &output,
            show_trace,
        ),
        Commands::Extract {
            document,
            output,
            out,
        } => commands::extract::run(&document, config, &output, out),
        Commands::Redact { document, output } => {
            commands::extract::redact(&document, config, &output)
        }
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { rule } => commands::rules::explain(&rule),
        },
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(),
            TemplatesAction::Show { name } => commands::templates::show(&name),
            TemplatesAction::Validate { file } => commands::templates::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

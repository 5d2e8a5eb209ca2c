//! `autoindent` - inspect indentation decisions from the command line.
//!
//! | Command | Output |
//! |---------|--------|
//! | `autoindent indent "if x:" -l python` | `IndentResult` as JSON |
//! | `autoindent trace cell.py` | One JSON result per line |
//! | `autoindent normalize cell.py` | The file with normalized indentation |
//! | `autoindent languages` | Registered language keys |

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jupyter_autoindent::{
    leading_whitespace_width, AutoIndentEngine, ConfigError, ErrorReporter, IndentContext,
    IndentSettings, LanguageIndentRegistry,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "autoindent")]
#[command(about = "Language-aware indentation for notebook code cells")]
#[command(version)]
struct Cli {
    /// JSON settings file with extra languages and aliases
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log every indentation decision
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Indentation for the line after LINE
    Indent {
        line: String,
        #[arg(short, long)]
        language: Option<String>,
        /// Defaults to the measured width of LINE
        #[arg(long)]
        current_indent: Option<usize>,
    },
    /// Indentation decision for every line of a file
    Trace {
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Rewrite leading whitespace in the language's style
    Normalize {
        file: PathBuf,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// List registered languages and aliases
    Languages,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let engine = build_engine(cli.config.as_deref(), cli.debug)?;

    match cli.command {
        Command::Indent {
            line,
            language,
            current_indent,
        } => {
            let language = language.unwrap_or_else(|| engine.registry().default_language().to_string());
            let current_indent = current_indent.unwrap_or_else(|| leading_whitespace_width(&line));
            let context = IndentContext::new(line, language).with_current_indent(current_indent);
            let result = engine.calculate_indent(&context);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Trace { file, language } => {
            let source = read_source(&file)?;
            let language = language.unwrap_or_else(|| engine.registry().default_language().to_string());
            let mut previous: Option<&str> = None;
            for (index, line) in source.lines().enumerate() {
                let mut context = IndentContext::new(line, language.as_str())
                    .with_current_indent(leading_whitespace_width(line));
                if let Some(previous) = previous {
                    context = context.with_previous_line(previous);
                }
                let result = engine.calculate_indent(&context);
                let record = serde_json::json!({ "line": index + 1, "text": line, "result": result });
                println!("{}", serde_json::to_string(&record)?);
                previous = Some(line);
            }
        }
        Command::Normalize { file, language } => {
            let source = read_source(&file)?;
            for line in source.lines() {
                println!("{}", engine.normalize_indentation(line, language.as_deref()));
            }
        }
        Command::Languages => {
            for language in engine.registry().registered_languages() {
                println!("{}", language);
            }
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))
}

fn build_engine(config: Option<&Path>, debug: bool) -> Result<AutoIndentEngine> {
    let Some(path) = config else {
        return Ok(AutoIndentEngine::new(Arc::new(LanguageIndentRegistry::new()), debug));
    };

    let source = read_source(path)?;
    let (registry, debug) = IndentSettings::from_json(&source)
        .and_then(|settings| {
            let debug = debug || settings.debug;
            LanguageIndentRegistry::with_settings(settings).map(|registry| (registry, debug))
        })
        .map_err(|e| report(path, &source, e))?;

    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(AutoIndentEngine::new(Arc::new(registry), debug))
}

fn report(path: &Path, source: &str, error: ConfigError) -> anyhow::Error {
    let name = path.display().to_string();
    if ErrorReporter::new(name.as_str(), source).report_config_error(&error).is_err() {
        eprintln!("{}: {}", name, error);
    }
    anyhow::Error::new(error).context(format!("invalid settings in '{}'", name))
}

//! clinerules TUI: checkbox front end for assembling a `.clinerules` file.
//!
//! Runs the same pipeline as the CLI, with a full-screen checkbox list and
//! a preview screen built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use clinerules_core::pipeline::{GenerateOutcome, RunEnd, SilentProgress, generate, settle};
use clinerules_markdown::parser_for;
use clinerules_shared::{FrontMatterKind, GenerateConfig, GenerateOverrides, load_config};
use tracing::warn;

use app::CheckboxPrompter;

/// Pick rule fragments in a checkbox list and write the rules file.
#[derive(Parser)]
#[command(name = "clinerules-tui", version, long_about = None)]
struct Args {
    /// Rule fragment directory (output goes to its parent).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output file path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Title line of the assembled document.
    #[arg(short, long)]
    title: Option<String>,

    /// Front-matter syntax: yaml or minimal.
    #[arg(long)]
    front_matter: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = Args::parse();

    let config = load_config()?;
    let kind = match args.front_matter.as_deref() {
        Some(raw) => raw.parse::<FrontMatterKind>()?,
        None => config.defaults.front_matter,
    };
    let parser = parser_for(kind);

    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    let overrides = GenerateOverrides {
        source: args.source,
        output: args.output,
        title: args.title,
        skip_confirm: false,
    };
    let generate_config = GenerateConfig::with_overrides(&config, &cwd, &overrides);

    let mut prompter = CheckboxPrompter::default();
    let result = generate(&generate_config, parser.as_ref(), &mut prompter, &SilentProgress).await;

    let outcome = match settle(result)? {
        RunEnd::Finished(outcome) => outcome,
        RunEnd::Stopped(err) => {
            warn!(error = %err, "generate stopped");
            eprintln!("Error: {err}");
            return Ok(());
        }
    };

    match outcome {
        _ if prompter.aborted => println!("Aborted."),
        GenerateOutcome::NoFragments => {
            println!("No rule files found in {}.", generate_config.source_dir.display());
        }
        GenerateOutcome::NothingSelected => println!("No rules selected."),
        GenerateOutcome::Cancelled => println!("Cancelled."),
        GenerateOutcome::Written { report, sections } => {
            println!("Wrote {} ({} bytes)", report.path.display(), report.bytes);
            for section in &sections {
                println!("  {} ({} rules)", section.heading, section.count);
            }
        }
    }

    Ok(())
}

/// Warnings only, on stderr; the alternate screen is not active while
/// fragments load, which is the only place warnings come from.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clinerules=warn"));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

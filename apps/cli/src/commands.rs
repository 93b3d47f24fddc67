//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use clinerules_core::group::{display_order, group_by_category, sort_buckets};
use clinerules_core::pipeline::{
    GenerateOutcome, ProgressReporter, RunEnd, discover, generate, settle,
};
use clinerules_core::prompt::{ScriptedPrompter, TextPrompter};
use clinerules_core::selector::Prompter;
use clinerules_markdown::{FrontMatterParser, parser_for};
use clinerules_shared::{
    AppConfig, FrontMatterKind, GenerateConfig, GenerateOverrides, init_config, load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// clinerules: pick rule fragments, get one `.clinerules` file.
#[derive(Parser)]
#[command(
    name = "clinerules",
    version,
    about = "Assemble a .clinerules file from a directory of markdown rule fragments.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `generate`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Select rule fragments and write the assembled file.
    Generate(GenerateArgs),

    /// List the fragments of a rule directory, grouped by category.
    List {
        /// Rule fragment directory.
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Front-matter syntax: yaml or minimal.
        #[arg(long)]
        front_matter: Option<String>,

        /// Print fragments as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags of `generate`.
#[derive(Args, Default)]
pub(crate) struct GenerateArgs {
    /// Rule fragment directory (output goes to its parent).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output file path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Title line of the assembled document.
    #[arg(short, long)]
    title: Option<String>,

    /// Non-interactive selection: `all` or 1-based positions like `1,3,5`.
    #[arg(long)]
    select: Option<String>,

    /// Write without the preview confirmation.
    #[arg(short, long)]
    yes: bool,

    /// Front-matter syntax: yaml or minimal.
    #[arg(long)]
    front_matter: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so they never
/// interleave with the prompt on stdout.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "clinerules=warn",
        1 => "clinerules=info",
        2 => "clinerules=debug",
        _ => "clinerules=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or_else(|| Command::Generate(GenerateArgs::default())) {
        Command::Generate(args) => cmd_generate(args).await,
        Command::List {
            source,
            front_matter,
            json,
        } => cmd_list(source, front_matter.as_deref(), json).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

fn front_matter_parser(
    config: &AppConfig,
    flag: Option<&str>,
) -> Result<Box<dyn FrontMatterParser>> {
    let kind = match flag {
        Some(raw) => raw.parse::<FrontMatterKind>()?,
        None => config.defaults.front_matter,
    };
    Ok(parser_for(kind))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let config = load_config()?;
    let parser = front_matter_parser(&config, args.front_matter.as_deref())?;

    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;

    let overrides = GenerateOverrides {
        source: args.source,
        output: args.output,
        title: args.title,
        skip_confirm: args.yes || args.select.is_some(),
    };
    let generate_config = GenerateConfig::with_overrides(&config, &cwd, &overrides);

    info!(
        source = %generate_config.source_dir.display(),
        destination = %generate_config.destination.display(),
        "generating rules file"
    );

    match args.select {
        Some(answer) => {
            let mut prompter = ScriptedPrompter::typed(answer);
            run_generate(&generate_config, parser.as_ref(), &mut prompter).await
        }
        None => {
            let mut prompter = TextPrompter::stdio();
            run_generate(&generate_config, parser.as_ref(), &mut prompter).await
        }
    }
}

async fn run_generate<P: Prompter>(
    config: &GenerateConfig,
    parser: &dyn FrontMatterParser,
    prompter: &mut P,
) -> Result<()> {
    let reporter = CliProgress::new();

    let result = generate(config, parser, prompter, &reporter).await;
    reporter.spinner.finish_and_clear();

    let outcome = match settle(result)? {
        RunEnd::Finished(outcome) => outcome,
        RunEnd::Stopped(err) => {
            warn!(error = %err, "generate stopped");
            eprintln!("Error: {err}");
            return Ok(());
        }
    };

    match outcome {
        GenerateOutcome::NoFragments => {
            println!("No rule files found in {}.", config.source_dir.display());
        }
        GenerateOutcome::NothingSelected => println!("No rules selected."),
        GenerateOutcome::Cancelled => println!("Cancelled."),
        GenerateOutcome::Written { report, sections } => {
            println!();
            println!("  Rules file written!");
            println!("  Path:     {}", report.path.display());
            for section in &sections {
                println!("  Section:  {} ({} rules)", section.heading, section.count);
            }
            println!("  Bytes:    {}", report.bytes);
            println!("  SHA-256:  {}", report.sha256);
            println!();
        }
    }

    Ok(())
}

async fn cmd_list(source: Option<PathBuf>, front_matter: Option<&str>, json: bool) -> Result<()> {
    let config = load_config()?;
    let parser = front_matter_parser(&config, front_matter)?;

    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;
    let overrides = GenerateOverrides {
        source,
        ..Default::default()
    };
    let generate_config = GenerateConfig::with_overrides(&config, &cwd, &overrides);

    info!(source = %generate_config.source_dir.display(), "listing rule fragments");

    let reporter = CliProgress::new();
    let fragments = discover(&generate_config, parser.as_ref(), &reporter).await;
    reporter.spinner.finish_and_clear();
    let fragments = fragments?;

    if json {
        println!("{}", serde_json::to_string_pretty(&fragments)?);
        return Ok(());
    }

    if fragments.is_empty() {
        println!("No rule files found in {}.", generate_config.source_dir.display());
        return Ok(());
    }

    let mut buckets = display_order(
        group_by_category(&fragments),
        &generate_config.category_order,
    );
    sort_buckets(&mut buckets);

    for bucket in &buckets {
        println!("{} ({} rules)", bucket.heading(), bucket.fragments.len());
        for fragment in &bucket.fragments {
            println!(
                "  {:>4}  {}  [{}]",
                fragment.order(),
                fragment.meta.label(),
                fragment.file
            );
        }
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn fragments_loaded(&self, count: usize) {
        self.spinner.set_message(format!("Loaded {count} rule files"));
    }

    // The spinner must be gone before the prompt takes over the terminal.
    fn awaiting_operator(&self) {
        self.spinner.finish_and_clear();
    }

    fn done(&self, _outcome: &GenerateOutcome) {
        self.spinner.finish_and_clear();
    }
}

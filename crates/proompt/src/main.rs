//! Render a quarterly business review prompt.
//!
//! Prints the prompt to stdout; logs go to stderr.
//!
//! # Examples
//!
//! ```sh
//! # Default company and quarter
//! proompt
//!
//! # Extra tools from a JSON array of function definitions, no footer
//! proompt --company Acme --quarter "Q1 2025" --tools tools.json --no-footer
//!
//! # Narrow the metrics analysis
//! proompt --focus churn --focus retention
//!
//! # Run providers through their async entry points
//! proompt --concurrent --verbose
//! ```

use std::path::PathBuf;

use clap::Parser;
use proompt::prompt::{Prompt, PromptConfig, ToolDetail};
use proompt::review::{ReviewOptions, quarterly_review};
use proompt::tools::load_tool_sources;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Render a quarterly business review prompt.
#[derive(Parser, Debug)]
#[command(name = "proompt", version)]
struct Cli {
    /// Company under review.
    #[arg(long, default_value = "StartupCorp")]
    company: String,

    /// Review period.
    #[arg(long, default_value = "Q3 2024")]
    quarter: String,

    /// JSON file holding extra tool definitions (array or single object).
    #[arg(long)]
    tools: Option<PathBuf>,

    /// JSON file with prompt layout settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Width of the `=` rule between sections (0 disables it).
    #[arg(long)]
    separator_width: Option<usize>,

    /// How tools are listed: names, summary, signatures, or full.
    #[arg(long, value_parser = parse_tool_detail)]
    tool_detail: Option<ToolDetail>,

    /// Focus area for the metrics analysis; repeat for several.
    #[arg(long = "focus", value_name = "AREA")]
    focus: Vec<String>,

    /// Omit the summary footer.
    #[arg(long)]
    no_footer: bool,

    /// Run providers through their async entry points, concurrently.
    #[arg(long)]
    concurrent: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_tool_detail(s: &str) -> Result<ToolDetail, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|_| format!("unknown tool detail '{s}' (names, summary, signatures, full)"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "proompt=debug" } else { "proompt=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: &Cli) -> proompt::Result<PromptConfig> {
    let mut config = match &cli.config {
        Some(path) => PromptConfig::load(path)?,
        None => PromptConfig::default(),
    };
    if let Some(width) = cli.separator_width {
        config = config.with_separator_width(width);
    }
    if let Some(detail) = cli.tool_detail {
        config = config.with_tool_detail(detail);
    }
    if cli.no_footer {
        config = config.with_footer(false);
    }
    Ok(config)
}

async fn run(cli: Cli) -> proompt::Result<String> {
    let config = build_config(&cli)?;
    let extra_tools = match &cli.tools {
        Some(path) => load_tool_sources(path)?,
        None => Vec::new(),
    };

    let mut options = ReviewOptions::new(&cli.company, &cli.quarter)
        .with_config(config)
        .with_extra_tools(extra_tools);
    if !cli.focus.is_empty() {
        options = options.with_focus_areas(cli.focus.clone());
    }
    let prompt = quarterly_review(options);
    info!(
        "prompt has {} section(s), {} provider(s), {} tool(s)",
        prompt.sections().len(),
        prompt.provider_count(),
        prompt.tool_count()
    );

    let text = if cli.concurrent {
        prompt.render_async().await?
    } else {
        prompt.render()?
    };
    info!(
        "{} chars, {} words",
        text.chars().count(),
        text.split_whitespace().count()
    );
    Ok(text)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

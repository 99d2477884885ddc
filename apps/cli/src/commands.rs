//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use reddit2epub_client::RedditClient;
use reddit2epub_core::locator::LocateOptions;
use reddit2epub_core::pipeline::{self, BuildConfig, BuildResult, ProgressReporter};
use reddit2epub_shared::{
    AppConfig, ClientConfig, init_config, load_config, resolve_credentials,
};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// reddit2epub: turn a Reddit story series into an EPUB.
#[derive(Parser)]
#[command(
    name = "reddit2epub",
    about = "Collect every chapter of a Reddit story series and package it as an EPUB.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
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
    /// Build an EPUB from the series a post belongs to.
    Build {
        #[command(flatten)]
        locate: LocateArgs,

        /// Output file. Derived from the first chapter's title by default.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// List the chapters that would go into the book, oldest first.
    Preview {
        #[command(flatten)]
        locate: LocateArgs,

        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print version information as JSON.
    Version,
}

/// Series lookup flags shared by `build` and `preview`.
#[derive(Args, Debug)]
pub(crate) struct LocateArgs {
    /// URL of any chapter of the series.
    #[arg(short, long)]
    pub input: String,

    /// Leading title words every chapter shares (config default: 2).
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Search the author's posts in every subreddit.
    #[arg(long)]
    pub all_subreddits: bool,
}

/// Reddit API credentials.
#[derive(Args, Debug)]
pub(crate) struct CredentialArgs {
    /// Reddit app client id.
    #[arg(short = 'c', long, env = "REDDIT_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Reddit app secret.
    #[arg(short = 's', long, env = "REDDIT_CLIENT_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "reddit2epub=info",
        1 => "reddit2epub=debug",
        _ => "reddit2epub=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
    match cli.command {
        Command::Build {
            locate,
            output,
            credentials,
        } => cmd_build(&locate, output, &credentials).await,
        Command::Preview {
            locate,
            credentials,
        } => cmd_preview(&locate, &credentials).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
        Command::Version => cmd_version(),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    locate: &LocateArgs,
    output: Option<PathBuf>,
    credentials: &CredentialArgs,
) -> Result<()> {
    let config = load_config()?;
    let (url, opts) = locate_options(locate, &config)?;
    let client = connect(&config, credentials).await?;

    let build_config = BuildConfig {
        url,
        locate: opts,
        output,
        output_dir: PathBuf::from(&config.defaults.output_dir),
    };

    info!(
        url = %build_config.url,
        overlap = build_config.locate.overlap,
        all_subreddits = build_config.locate.all_subreddits,
        "building book"
    );

    let reporter = CliProgress::new();
    let result = pipeline::build_book(&client, &build_config, &reporter).await?;

    println!();
    println!("  Title:    {}", result.title);
    println!("  Author:   {}", result.author);
    println!("  Chapters: {}", result.chapter_count);
    println!("  Path:     {}", result.path.display());
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_preview(locate: &LocateArgs, credentials: &CredentialArgs) -> Result<()> {
    let config = load_config()?;
    let (url, opts) = locate_options(locate, &config)?;
    let client = connect(&config, credentials).await?;

    let reporter = CliProgress::new();
    let located = pipeline::preview(&client, &url, &opts, &reporter).await?;
    reporter.spinner.finish_and_clear();

    println!(
        "Total number of found posts with title prefix '{}': {} (scanned {})",
        located.title_prefix,
        located.posts.len(),
        located.scanned
    );
    for (i, post) in located.posts.iter().rev().enumerate() {
        let marker = if post.id == located.anchor_id { "*" } else { " " };
        println!(
            "{marker} {:>3}. {}  [{}]  {}",
            i + 1,
            post.title,
            post.created_at.format("%Y-%m-%d"),
            post.url()
        );
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

fn cmd_version() -> Result<()> {
    println!("{}", serde_json::to_string(&version_json())?);
    Ok(())
}

/// Version info printed by the `version` subcommand.
fn version_json() -> serde_json::Value {
    serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Merge CLI flags over config defaults.
fn locate_options(args: &LocateArgs, config: &AppConfig) -> Result<(Url, LocateOptions)> {
    let url = Url::parse(&args.input).map_err(|e| eyre!("invalid URL '{}': {e}", args.input))?;
    let opts = LocateOptions {
        overlap: args.overlap.unwrap_or(config.defaults.overlap),
        all_subreddits: args.all_subreddits || config.defaults.all_subreddits,
    };
    Ok((url, opts))
}

async fn connect(config: &AppConfig, args: &CredentialArgs) -> Result<RedditClient> {
    let credentials =
        resolve_credentials(config, args.client_id.as_deref(), args.api_secret.as_deref())?;
    let client = RedditClient::connect(ClientConfig::from(config), &credentials).await?;
    Ok(client)
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
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_scanned(&self, page: usize, posts_seen: usize, matched: usize) {
        self.spinner.set_message(format!(
            "Scanning page {page}: {posts_seen} posts, {matched} chapters"
        ));
    }

    fn chapters_found(&self, title_prefix: &str, count: usize) {
        self.spinner.suspend(|| {
            println!("Total number of found posts with title prefix '{title_prefix}': {count}")
        });
    }

    fn warning(&self, message: &str) {
        self.spinner.suspend(|| eprintln!("Warning: {message}"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod a11y;
mod commands;
mod config;
mod context;
mod driver;
mod errors;
mod executor;
mod snapshot;
mod target;
mod types;
mod waits;
mod webdriver;

use commands::utils::{BrowserOpts, FrameOpts};
use commands::wait::WaitKind;
use errors::EngineError;
use waits::ElementState;

#[derive(Parser)]
#[command(name = "webgrip")]
#[command(about = "Resilient browser interaction engine for test automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a page (or iframe, or sub-region) for interactive elements and
    /// ready-to-use locating strategies
    Inspect {
        /// URL to inspect (empty to reuse the current page)
        url: String,

        /// Bound the scan to a CSS sub-region (e.g. a card or modal)
        #[arg(long)]
        root: Option<String>,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Click the first descriptor in a fallback chain that succeeds
    Click {
        /// URL to navigate to first (empty to reuse the current page)
        url: String,

        /// Target descriptors as JSON, e.g.
        /// '[{"by":"role","role":"button","name":"Save"},{"by":"text","text":"Save"}]'
        targets: String,

        /// Budget per descriptor attempt in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Fill the first field in a fallback chain that matches
    Fill {
        /// URL to navigate to first (empty to reuse the current page)
        url: String,

        /// Target descriptors as JSON
        targets: String,

        /// Value to fill in
        value: String,

        /// Skip clearing the field before typing
        #[arg(long)]
        no_clear: bool,

        /// Budget per descriptor attempt in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Wait for an element by (partial) accessible name, then report its
    /// suggested locating strategies
    WaitName {
        /// URL to navigate to first
        url: String,

        /// Name substring to wait for (case-insensitive by default)
        name: String,

        /// Which element family to search
        #[arg(long, value_enum, default_value = "clickable")]
        kind: WaitKind,

        /// Control type filter (required with --kind control)
        #[arg(long)]
        control_type: Option<String>,

        /// Overall wait budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Wait for an element to reach a lifecycle state
    WaitState {
        /// URL to navigate to first
        url: String,

        /// Target descriptors as JSON (first constructible one is watched)
        targets: String,

        /// State to wait for
        #[arg(value_enum)]
        state: ElementState,

        /// Overall wait budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Wait for a DOM mutation under a container
    WaitDom {
        /// URL to navigate to first
        url: String,

        /// CSS selector of the container to observe
        root: String,

        /// Also observe attribute changes
        #[arg(long)]
        attributes: bool,

        /// Do not observe child-list changes
        #[arg(long)]
        no_child_list: bool,

        /// Observe the container only, not its subtree
        #[arg(long)]
        no_subtree: bool,

        /// Overall wait budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Check whether a descriptor matches an element right now (no waiting)
    Exists {
        /// URL to navigate to first
        url: String,

        /// Target descriptor as JSON
        targets: String,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Extract the visible text of the first matching element
    Text {
        /// URL to navigate to first
        url: String,

        /// Target descriptor as JSON
        targets: String,

        #[command(flatten)]
        browser: BrowserOpts,

        #[command(flatten)]
        frame: FrameOpts,
    },

    /// Capture a PNG screenshot of the page
    Screenshot {
        /// URL to navigate to first
        url: String,

        /// Output path (defaults to screenshot_<timestamp>.png)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        browser: BrowserOpts,
    },

    /// Show URL, title and viewport of a page
    Info {
        /// URL to navigate to first
        url: String,

        #[command(flatten)]
        browser: BrowserOpts,
    },

    /// Press a key on the focused element
    Key {
        /// URL to navigate to first
        url: String,

        /// Key name (Enter, Tab, Escape, ...)
        key: String,

        #[command(flatten)]
        browser: BrowserOpts,
    },

    /// Dismiss a cookie-consent banner with the built-in strategies
    DismissBanner {
        /// URL to navigate to first
        url: String,

        /// Comma-separated strategy order (accept, agree, reject)
        #[arg(long)]
        strategies: Option<String>,

        /// Budget per dismissal attempt in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        browser: BrowserOpts,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => {}
        Err(err) => {
            // Exit codes follow the engine error taxonomy where one applies
            let exit_code = err
                .downcast_ref::<EngineError>()
                .map(EngineError::exit_code)
                .unwrap_or(1);
            let reason = err
                .downcast_ref::<EngineError>()
                .map(EngineError::reason);

            // JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": err.to_string(),
                "reason": reason,
                "exit_code": exit_code,
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", err);
            std::process::exit(exit_code);
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webgrip=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            url,
            root,
            browser,
            frame,
        } => commands::inspect::handle_inspect(url, root, browser, frame).await?,

        Commands::Click {
            url,
            targets,
            timeout_ms,
            browser,
            frame,
        } => commands::click::handle_click(url, targets, timeout_ms, browser, frame).await?,

        Commands::Fill {
            url,
            targets,
            value,
            no_clear,
            timeout_ms,
            browser,
            frame,
        } => {
            commands::fill::handle_fill(url, targets, value, no_clear, timeout_ms, browser, frame)
                .await?
        }

        Commands::WaitName {
            url,
            name,
            kind,
            control_type,
            timeout_ms,
            browser,
            frame,
        } => {
            commands::wait::handle_wait_name(
                url,
                name,
                kind,
                control_type,
                timeout_ms,
                browser,
                frame,
            )
            .await?
        }

        Commands::WaitState {
            url,
            targets,
            state,
            timeout_ms,
            browser,
            frame,
        } => {
            commands::wait::handle_wait_state(url, targets, state, timeout_ms, browser, frame)
                .await?
        }

        Commands::WaitDom {
            url,
            root,
            attributes,
            no_child_list,
            no_subtree,
            timeout_ms,
            browser,
            frame,
        } => {
            commands::wait::handle_wait_dom(
                url,
                root,
                attributes,
                no_child_list,
                no_subtree,
                timeout_ms,
                browser,
                frame,
            )
            .await?
        }

        Commands::Exists {
            url,
            targets,
            browser,
            frame,
        } => commands::page::handle_exists(url, targets, browser, frame).await?,

        Commands::Text {
            url,
            targets,
            browser,
            frame,
        } => commands::page::handle_text(url, targets, browser, frame).await?,

        Commands::Screenshot {
            url,
            output,
            browser,
        } => commands::page::handle_screenshot(url, output, browser).await?,

        Commands::Info { url, browser } => commands::page::handle_info(url, browser).await?,

        Commands::Key { url, key, browser } => {
            commands::page::handle_key(url, key, browser).await?
        }

        Commands::DismissBanner {
            url,
            strategies,
            timeout_ms,
            browser,
        } => commands::page::handle_banner(url, strategies, timeout_ms, browser).await?,
    }

    Ok(())
}

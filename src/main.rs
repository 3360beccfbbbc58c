use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use tokio_util::sync::CancellationToken;

use wbids::app::{fetch_alerts_once, fetch_status_once, Dashboard, DashboardOptions};
use wbids::config::{self, PollIntervals};
use wbids::logging::{init_logging, DEFAULT_FILTER};
use wbids::mock::MockBackend;
use wbids::notify;
use wbids::render::{render_alerts, render_analytics, render_status};
use wbids::views::FallbackPolicy;
use wbids::{ApiClient, Backend};

#[derive(Parser)]
#[command(name = "wbids", version, about = "Terminal dashboard for the WBIDS backend")]
struct Cli {
    /// Backend base URL (default: $WBIDS_API_URL or http://localhost:5000)
    #[arg(long)]
    api_url: Option<String>,

    /// Run against a built-in simulated backend instead of HTTP
    #[arg(long)]
    mock: bool,

    /// What a failed poll shows
    #[arg(long, value_enum, default_value_t = FallbackArg::DisplayDefault)]
    fallback: FallbackArg,

    /// Status poll interval in seconds
    #[arg(long)]
    status_interval: Option<u64>,

    /// Alerts poll interval in seconds
    #[arg(long)]
    alerts_interval: Option<u64>,

    /// Signal chart refresh interval in seconds
    #[arg(long)]
    signal_interval: Option<u64>,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Live dashboard (default)
    Watch,
    /// Print the system status once
    Status,
    /// Print the current alerts once
    Alerts,
    /// Ask the backend to start monitoring
    Start,
    /// Ask the backend to stop monitoring
    Stop,
}

#[derive(Clone, Copy, ValueEnum)]
enum FallbackArg {
    DisplayDefault,
    LastKnown,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::DisplayDefault => FallbackPolicy::DisplayDefault,
            FallbackArg::LastKnown => FallbackPolicy::LastKnown,
        }
    }
}

impl Cli {
    fn options(&self) -> DashboardOptions {
        let env = PollIntervals::from_env();
        DashboardOptions {
            intervals: PollIntervals {
                status: self.status_interval.map_or(env.status, config::clamp_interval),
                alerts: self.alerts_interval.map_or(env.alerts, config::clamp_interval),
                signal: self.signal_interval.map_or(env.signal, config::clamp_interval),
            },
            fallback: self.fallback.into(),
            mock_mode: self.mock,
            color: !self.no_color && std::io::stdout().is_terminal(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging(DEFAULT_FILTER);

    let cli = Cli::parse();
    let options = cli.options();
    let command = cli.command.unwrap_or(Command::Watch);

    if cli.mock {
        tracing::info!("using built-in mock backend");
        return run(Arc::new(MockBackend::new()), command, options).await;
    }

    let raw_url = cli.api_url.clone().unwrap_or_else(config::api_url);
    let url = config::parse_api_url(&raw_url)?;
    tracing::info!(%url, "using backend");
    run(Arc::new(ApiClient::new(url)), command, options).await
}

async fn run<B: Backend>(
    backend: Arc<B>,
    command: Command,
    options: DashboardOptions,
) -> anyhow::Result<()> {
    match command {
        Command::Watch => {
            let shutdown = CancellationToken::new();
            let handler_token = shutdown.clone();
            ctrlc::set_handler(move || handler_token.cancel())
                .context("cannot install Ctrl-C handler")?;
            Dashboard::new(backend, options, &shutdown)
                .run(shutdown)
                .await?;
        }
        Command::Status => {
            let view = fetch_status_once(backend.as_ref(), options.fallback).await;
            print!("{}", render_status(view.status(), view.source()));
        }
        Command::Alerts => {
            let (notifier, _feed) = notify::channel();
            let view = fetch_alerts_once(backend.as_ref(), options.fallback, notifier).await;
            print!(
                "{}\n{}",
                render_alerts(view.book(), view.source(), options.color),
                render_analytics(view.book(), options.color)
            );
        }
        Command::Start => {
            let ack = backend
                .start_monitoring()
                .await
                .context("could not start monitoring")?;
            println!("{} (is_monitoring: {})", ack.status, ack.is_monitoring);
        }
        Command::Stop => {
            let ack = backend
                .stop_monitoring()
                .await
                .context("could not stop monitoring")?;
            println!("{} (is_monitoring: {})", ack.status, ack.is_monitoring);
        }
    }
    Ok(())
}

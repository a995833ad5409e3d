// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! logtail server binary.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use logtail_buffer::{CaptureLayer, LogLevel, LoggingService};
use logtail_config::LogTailConfig;
use logtail_server::{bind, create_router, serve, version, AppState, LogTailClient};
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// logtail - sequenced tail of recent log records.
#[derive(Parser, Debug)]
#[command(name = "logtail-server", about = "Sequenced log tail server", version)]
struct Cli {
	/// Path to a TOML config file (default: /etc/logtail/server.toml)
	#[arg(long, global = true, env = "LOGTAIL_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Serve the log tail over HTTP (default)
	Serve,
	/// Follow a running server's log tail
	Tail(TailArgs),
	/// Show version and build information
	Version,
}

#[derive(Args, Debug)]
struct TailArgs {
	/// Base URL of the server
	#[arg(long, default_value = "http://127.0.0.1:9250")]
	url: String,
	/// Start from this sequence (default: only new records)
	#[arg(long, allow_hyphen_values = true)]
	from: Option<i64>,
	/// Truncate each message to this many characters
	#[arg(long)]
	max_length: Option<usize>,
	/// Poll interval, e.g. "500ms" or "2s"
	#[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
	interval: Duration,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let cli = Cli::parse();

	match cli.command.unwrap_or(Command::Serve) {
		Command::Version => {
			println!("{}", version::format_version_info());
			Ok(())
		}
		Command::Tail(args) => {
			tail(args).await?;
			Ok(())
		}
		Command::Serve => run_server(cli.config).await,
	}
}

async fn run_server(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match config_path {
		Some(path) => logtail_config::load_config_with_file(path)?,
		None => logtail_config::load_config()?,
	};

	// The service must exist before tracing init so the capture layer can feed it.
	let service = LoggingService::builder()
		.capacity(config.buffer.capacity)
		.seed(config.buffer.seed)
		.threshold(config.buffer.threshold)
		.build();
	init_tracing(&config, &service);

	tracing::info!(
		audit = true,
		host = %config.http.host,
		port = config.http.port,
		capacity = service.capacity(),
		threshold = %service.threshold(),
		"starting logtail-server"
	);

	let app = create_router(AppState::new(service)).layer(TraceLayer::new_for_http());
	let listener = bind(&config.socket_addr()).await?;

	serve(listener, app, async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for shutdown signal");
		}
		tracing::info!("Received shutdown signal");
	})
	.await?;

	Ok(())
}

/// Stdout gets the configured `EnvFilter`; the capture layer only needs the
/// levels the service admits.
fn init_tracing(config: &LogTailConfig, service: &LoggingService) {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	let fmt_layer = if config.logging.json {
		tracing_subscriber::fmt::layer().json().boxed()
	} else {
		tracing_subscriber::fmt::layer().boxed()
	};

	tracing_subscriber::registry()
		.with(fmt_layer.with_filter(env_filter))
		.with(CaptureLayer::new(service.clone()).with_filter(capture_filter(service.threshold())))
		.init();
}

fn capture_filter(threshold: LogLevel) -> LevelFilter {
	match threshold {
		LogLevel::Trace => LevelFilter::TRACE,
		LogLevel::Debug => LevelFilter::DEBUG,
		LogLevel::Info | LogLevel::Audit => LevelFilter::INFO,
		LogLevel::Warn => LevelFilter::WARN,
		LogLevel::Error | LogLevel::Fatal => LevelFilter::ERROR,
	}
}

async fn tail(args: TailArgs) -> anyhow::Result<()> {
	let mut client = LogTailClient::new(&args.url)?;
	if let Some(max_length) = args.max_length {
		client = client.with_max_length(max_length);
	}

	let from = match args.from {
		Some(from) => from,
		None => i64::try_from(client.next_sequence().await?).unwrap_or(i64::MAX),
	};

	tokio::select! {
		result = client.follow(from, args.interval, |message| {
			println!("{message}");
			ControlFlow::Continue(())
		}) => {
			result?;
		}
		_ = tokio::signal::ctrl_c() => {}
	}

	Ok(())
}

//! Compositor CLI and HTTP service.

use std::net::SocketAddr;
use std::path::Path;
use std::process;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use compositor::api;
use compositor::cli::{Cli, Command};
use compositor::config::{self, Config};
use compositor::context::{RecordingSession, ServiceContext};
use compositor::error::ComposeError;
use compositor::model::CompositionRequest;
use compositor::orchestrator::{Orchestrator, PipelineSettings};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr so `compose` output on stdout stays clean JSON.
fn init_tracing(verbose: bool) {
    let default = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter = EnvFilter::builder().with_default_directive(default.into()).from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<(), ComposeError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(ComposeError::Config)?;
    let settings = PipelineSettings::from_config(&config);

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind_address());
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| ComposeError::Config(format!("invalid bind address {bind}: {e}")))?;

            let (ctx, session) = build_context(&config).await?;
            api::serve(addr, Orchestrator::new(ctx, settings), shutdown_signal()).await?;
            info!("compositor stopped");
            finish_recording(session);
            Ok(())
        }
        Command::Compose { person, clothing, place } => {
            let request = CompositionRequest {
                person_image: person,
                clothing_images: clothing,
                place_image: place,
            };
            // Reject bad input before any service is configured.
            request.validate()?;

            let (ctx, session) = build_context(&config).await?;
            let result = Orchestrator::new(ctx, settings).compose(request).await;
            finish_recording(session);

            let response = result?;
            let json = serde_json::to_string_pretty(&response)
                .map_err(|e| ComposeError::Config(format!("failed to encode response: {e}")))?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Pick live, recording or replaying adapters from the environment.
async fn build_context(
    config: &Config,
) -> Result<(ServiceContext, Option<RecordingSession>), ComposeError> {
    let replay_path = std::env::var("COMPOSITOR_REPLAY").ok();
    let is_recording = std::env::var("COMPOSITOR_REC").is_ok_and(|v| v == "true" || v == "1");

    if let Some(cassette_path) = replay_path {
        info!(cassette = %cassette_path, "replay mode");
        Ok((ServiceContext::replaying(Path::new(&cassette_path))?, None))
    } else if is_recording {
        info!("recording mode");
        let (ctx, session) = ServiceContext::recording(config).await?;
        Ok((ctx, Some(session)))
    } else {
        Ok((ServiceContext::live(config).await?, None))
    }
}

fn finish_recording(session: Option<RecordingSession>) {
    if let Some(session) = session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => warn!(error = %e, "failed to save cassette"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

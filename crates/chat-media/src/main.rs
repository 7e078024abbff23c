//! Chat-Media: send photos and voice notes from the console.

mod adapters;
mod app;
mod app_command;
mod config;
mod console_handler;
mod error;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console_handler::ConsoleHandler,
    error::{AppError, Result as AppResult},
};

use crate::{
    adapters::{
        ConfigQuota, ConsoleObserver, CpalPlayer, CpalRecorder, HostPermissions, LocalStorage,
    },
    config::Config,
};

use chat_media_core::{
    AudioOutput, CaptureSession, ImageCapture, MediaFlow, MediaValidator, PermissionGate,
    QuotaGate, UploadPipeline,
};

use std::sync::Arc;

use tokio::{
    io::BufReader,
    sync::{mpsc, watch},
};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Application entry point.
fn main() {
    // stdout carries the conversation; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_media=info,chat_media_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    rt.block_on(async {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let app = match build_app(&config, command_rx, shutdown_tx) {
            Ok(app) => app,
            Err(e) => {
                error!("Failed to start: {:?}", e);
                std::process::exit(1);
            }
        };
        let console = ConsoleHandler::new(command_tx);

        println!("{}", console_handler::USAGE);

        tokio::join!(
            async {
                let stdin = BufReader::new(tokio::io::stdin());
                if let Err(e) = console.run(stdin, shutdown_rx).await {
                    error!(error = ?e, "Console handler error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );
    });

    // tokio's stdin reader blocks on a thread that cannot be interrupted.
    rt.shutdown_background();
}

/// Wire the adapters into a media flow.
fn build_app(
    config: &Config,
    command_rx: mpsc::Receiver<AppCommand>,
    shutdown_tx: watch::Sender<bool>,
) -> AppResult<App> {
    let storage = LocalStorage::new(
        config.storage.root_dir.clone(),
        config.storage.public_base_url.clone(),
    );

    let recorder = Arc::new(CpalRecorder::new(
        &config.recording.output_dir,
        config.recording.max_seconds,
    )?);

    let speaker: Option<Arc<dyn AudioOutput>> = match CpalPlayer::new(storage.clone()) {
        Ok(player) => Some(Arc::new(player) as Arc<dyn AudioOutput>),
        Err(e) => {
            warn!(error = ?e, "Playback disabled");
            None
        }
    };

    let quota = Arc::new(ConfigQuota::new(&config.account));
    let permissions = Arc::new(HostPermissions);

    let session = CaptureSession::new(PermissionGate::new(permissions.clone()), recorder);

    let pipeline = UploadPipeline::new(Arc::new(storage)).with_observer(Arc::new(ConsoleObserver));

    let flow = MediaFlow::new(
        QuotaGate::new(quota.clone()),
        session,
        ImageCapture::new(PermissionGate::new(permissions)),
        MediaValidator::new(config.media.max_bytes),
        pipeline,
    )
    .with_upload_timeout(config.media.upload_timeout());

    Ok(App {
        flow,
        quota,
        speaker,
        owner_id: config.account.owner_id.clone(),
        messages: Vec::new(),
        pending_retry: None,
        command_rx,
        shutdown_tx,
    })
}

use crate::{
    AppCommand, AppResult,
    adapters::{ConfigQuota, PathImageSource},
};

use chat_media_core::{
    AudioOutput, CapturedMedia, Delivery, MediaFlow, MediaKind, PlaybackEngine, RecordingState,
    StartOutcome,
};

use std::{path::PathBuf, sync::Arc};

use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

/// One delivered message in the conversation.
pub(crate) struct SentMessage {
    pub(crate) kind: MediaKind,
    pub(crate) url: String,
    pub(crate) duration_seconds: Option<u64>,
    /// Created on first play, dropped with the message.
    pub(crate) player: Option<PlaybackEngine>,
}

/// Main application state.
///
/// Owns the media flow and the conversation. Commands arrive from the
/// console handler; session status ticks arrive through the capture
/// session's watch channel.
pub struct App {
    pub(crate) flow: MediaFlow,
    pub(crate) quota: Arc<ConfigQuota>,
    pub(crate) speaker: Option<Arc<dyn AudioOutput>>,
    pub(crate) owner_id: String,
    pub(crate) messages: Vec<SentMessage>,
    /// Media whose last upload failed, kept for `retry`.
    pub(crate) pending_retry: Option<CapturedMedia>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self), fields(owner_id = %self.owner_id))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Chat-Media starting");

        let mut status_rx = self.flow.session().subscribe();

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(AppCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                        None => {
                            info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }

                Ok(()) = status_rx.changed() => {
                    let status = *status_rx.borrow_and_update();
                    if status.state == RecordingState::Active && status.elapsed_seconds > 0 {
                        println!("  recording... {}s", status.elapsed_seconds);
                    }
                }
            }
        }

        self.flow.cancel_voice_note().await;
        for message in &self.messages {
            if let Some(player) = &message.player {
                player.unload().await;
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Chat-Media shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::StartRecording => self.start_recording().await,
            AppCommand::StopRecording => self.stop_recording().await,
            AppCommand::CancelRecording => {
                if self.flow.cancel_voice_note().await {
                    println!("Voice note discarded");
                } else {
                    println!("Not recording");
                }
            }
            AppCommand::SendPhoto { path } => self.send_photo(path).await,
            AppCommand::Play { index } => self.play(index).await,
            AppCommand::Pause { index } => self.pause(index).await,
            AppCommand::Retry => self.retry().await,
            AppCommand::List => self.list(),
            AppCommand::Quota => {
                let snapshot = self.quota.current();
                if snapshot.is_premium {
                    println!("Premium: unlimited sends ({} so far)", snapshot.count);
                } else {
                    println!(
                        "{} of {} sends left",
                        snapshot.remaining(),
                        snapshot.limit
                    );
                }
            }
            AppCommand::Shutdown => {}
        }
    }

    async fn start_recording(&self) {
        match self.flow.begin_voice_note(&self.owner_id).await {
            Ok(StartOutcome::Started { session_id }) => {
                info!(session_id = %session_id, "Voice note started");
                println!("Recording. Type `stop` to send or `cancel` to discard.");
            }
            Ok(StartOutcome::Ignored) => println!("Already recording"),
            Err(e) => {
                warn!(error = ?e, "Failed to start voice note");
                println!("Cannot record: {}", e.message());
            }
        }
    }

    async fn stop_recording(&mut self) {
        match self.flow.finish_voice_note(&self.owner_id).await {
            Ok(Some(delivery)) => self.record_delivery(delivery),
            Ok(None) => println!("Not recording"),
            Err(e) => {
                error!(error = ?e, "Voice note failed");
                println!("Voice note failed: {}", e.message());
            }
        }
    }

    async fn send_photo(&mut self, path: PathBuf) {
        let source = PathImageSource::new(path);

        match self.flow.send_photo(&self.owner_id, &source).await {
            Ok(Some(delivery)) => self.record_delivery(delivery),
            Ok(None) => println!("Photo cancelled"),
            Err(e) => {
                warn!(error = ?e, "Photo not sent");
                println!("Photo not sent: {}", e.message());
            }
        }
    }

    async fn retry(&mut self) {
        let Some(media) = self.pending_retry.take() else {
            println!("Nothing to retry");
            return;
        };

        match self.flow.retry_upload(media.clone(), &self.owner_id).await {
            Ok(delivery) => self.record_delivery(delivery),
            Err(e) => {
                error!(error = ?e, "Retry failed");
                println!("Retry failed: {}", e.message());
                self.pending_retry = Some(media);
            }
        }
    }

    /// Add a sent message to the conversation, or park a failed upload.
    pub(crate) fn record_delivery(&mut self, delivery: Delivery) {
        let Delivery { media, result } = delivery;

        match result.into_result() {
            Ok(url) => {
                self.quota.record_send();
                println!("Sent {} #{}: {}", media.kind(), self.messages.len(), url);
                self.messages.push(SentMessage {
                    kind: media.kind(),
                    url,
                    duration_seconds: media.duration_seconds(),
                    player: None,
                });
                self.pending_retry = None;
            }
            Err(e) => {
                println!("Upload failed: {}. Type `retry` to try again.", e.message());
                self.pending_retry = Some(media);
            }
        }
    }

    async fn play(&mut self, index: usize) {
        let Some(speaker) = self.speaker.clone() else {
            println!("No speaker available");
            return;
        };

        let Some(message) = self.voice_message(index) else {
            return;
        };

        let url = message.url.clone();
        let estimate = message.duration_seconds;
        let player = message.player.get_or_insert_with(|| {
            let engine = PlaybackEngine::new(url, speaker);
            match estimate {
                Some(secs) => engine.with_estimated_duration(secs * 1000),
                None => engine,
            }
        });

        if let Err(e) = player.play().await {
            println!("Cannot play #{}: {}", index, e.message());
        }
    }

    async fn pause(&mut self, index: usize) {
        let Some(message) = self.voice_message(index) else {
            return;
        };

        let Some(player) = &message.player else {
            println!("#{} is not playing", index);
            return;
        };

        match player.pause().await {
            Ok(()) => println!("Paused #{} at {}ms", index, player.state().position_ms),
            Err(e) => println!("Cannot pause #{}: {}", index, e.message()),
        }
    }

    fn voice_message(&mut self, index: usize) -> Option<&mut SentMessage> {
        match self.messages.get_mut(index) {
            Some(message) if message.kind == MediaKind::Voice => Some(message),
            Some(_) => {
                println!("#{} is not a voice message", index);
                None
            }
            None => {
                println!("No message #{}", index);
                None
            }
        }
    }

    fn list(&self) {
        if self.messages.is_empty() {
            println!("No messages yet");
            return;
        }

        for (index, message) in self.messages.iter().enumerate() {
            let detail = match (&message.player, message.duration_seconds) {
                (Some(player), _) => {
                    let state = player.state();
                    format!(
                        "{:?} {}/{}ms",
                        state.status, state.position_ms, state.duration_ms
                    )
                }
                (None, Some(secs)) => format!("{}s", secs),
                (None, None) => String::new(),
            };
            println!("#{} {} {} {}", index, message.kind, message.url, detail);
        }
    }
}

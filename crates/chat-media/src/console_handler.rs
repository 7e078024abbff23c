//! Console command reader.
//!
//! Reads one command per line and forwards it to the main application over
//! an async channel. End of input is treated as a shutdown request.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Help text printed for unrecognised input.
pub(crate) const USAGE: &str = "commands: record | stop | cancel | photo <path> | \
play <n> | pause <n> | retry | list | quota | quit";

/// Line-oriented command reader.
pub struct ConsoleHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleHandler {
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run the reader loop until shutdown or end of input.
    #[instrument(skip(self, reader, shutdown_rx))]
    pub async fn run<R>(&self, reader: R, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if self.handle_line(&line).await? == Some(AppCommand::Shutdown) {
                                break;
                            }
                        }
                        None => {
                            debug!("End of input");
                            self.send(AppCommand::Shutdown).await?;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Parse and forward one input line.
    ///
    /// Blank lines and unknown commands are not forwarded; the latter print
    /// the usage line.
    #[instrument(skip(self))]
    pub(crate) async fn handle_line(&self, line: &str) -> AppResult<Option<AppCommand>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let command = match line.parse::<AppCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Ignoring input");
                println!("{}", USAGE);
                return Ok(None);
            }
        };

        self.send(command.clone()).await?;

        Ok(Some(command))
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", e.0, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

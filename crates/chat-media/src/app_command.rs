use crate::AppError;

use std::{panic::Location, path::PathBuf, str::FromStr};

use error_location::ErrorLocation;

/// Commands sent from the console reader to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a voice note.
    StartRecording,
    /// Stop the voice note and send it.
    StopRecording,
    /// Throw the current voice note away.
    CancelRecording,
    /// Send the photo at `path`. An empty path means the pick was cancelled.
    SendPhoto {
        /// Local file chosen by the user.
        path: PathBuf,
    },
    /// Play (or resume) the voice message at `index` in the conversation.
    Play {
        /// Position in the message list.
        index: usize,
    },
    /// Pause the voice message at `index`.
    Pause {
        /// Position in the message list.
        index: usize,
    },
    /// Re-upload the last media that failed to send.
    Retry,
    /// Print the conversation.
    List,
    /// Print the send allowance.
    Quota,
    /// Request application shutdown.
    Shutdown,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match (word.to_ascii_lowercase().as_str(), rest.is_empty()) {
            ("record", true) => AppCommand::StartRecording,
            ("stop", true) => AppCommand::StopRecording,
            ("cancel", true) => AppCommand::CancelRecording,
            ("photo", _) => AppCommand::SendPhoto {
                path: PathBuf::from(rest),
            },
            ("play", false) => AppCommand::Play {
                index: parse_index(rest, line)?,
            },
            ("pause", false) => AppCommand::Pause {
                index: parse_index(rest, line)?,
            },
            ("retry", true) => AppCommand::Retry,
            ("list", true) => AppCommand::List,
            ("quota", true) => AppCommand::Quota,
            ("quit" | "exit", true) => AppCommand::Shutdown,
            _ => return Err(unknown(line)),
        };

        Ok(command)
    }
}

#[track_caller]
fn parse_index(rest: &str, line: &str) -> Result<usize, AppError> {
    rest.parse().map_err(|_| unknown(line))
}

#[track_caller]
fn unknown(line: &str) -> AppError {
    AppError::UnknownCommand {
        input: line.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

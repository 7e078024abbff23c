use serde::{Deserialize, Serialize};

/// The two kinds of media a conversation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A photo taken with the camera or picked from the library.
    Image,
    /// A recorded voice note.
    Voice,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic"];
const VOICE_EXTENSIONS: &[&str] = &["m4a", "aac", "mp3", "wav", "ogg", "opus", "caf", "webm"];

impl MediaKind {
    /// Storage bucket holding objects of this kind.
    pub fn bucket(self) -> &'static str {
        match self {
            MediaKind::Image => "chat-images",
            MediaKind::Voice => "voice-messages",
        }
    }

    /// File extensions accepted for this kind, lowercase.
    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Voice => VOICE_EXTENSIONS,
        }
    }

    /// Whether `extension` (any case) is a declared type for this kind.
    pub fn accepts_extension(self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.allowed_extensions().contains(&extension.as_str())
    }

    /// MIME type sent to storage for a file with the given extension.
    pub fn content_type(self, extension: &str) -> &'static str {
        match (self, extension.to_ascii_lowercase().as_str()) {
            (MediaKind::Image, "png") => "image/png",
            (MediaKind::Image, "gif") => "image/gif",
            (MediaKind::Image, "webp") => "image/webp",
            (MediaKind::Image, "heic") => "image/heic",
            (MediaKind::Image, _) => "image/jpeg",
            (MediaKind::Voice, "mp3") => "audio/mpeg",
            (MediaKind::Voice, "wav") => "audio/wav",
            (MediaKind::Voice, "ogg") | (MediaKind::Voice, "opus") => "audio/ogg",
            (MediaKind::Voice, "webm") => "audio/webm",
            (MediaKind::Voice, "caf") => "audio/x-caf",
            (MediaKind::Voice, _) => "audio/mp4",
        }
    }

    /// Extension used when the local file has none.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Voice => "m4a",
        }
    }

    /// Lowercase name, used in log fields and storage paths.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Voice => "voice",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

mod captured_media;
mod media_kind;

pub use {captured_media::CapturedMedia, media_kind::MediaKind};

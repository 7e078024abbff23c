mod engine;
mod playback_state;

pub use {
    engine::PlaybackEngine,
    playback_state::{PlaybackState, PlaybackStatus},
};

use crate::{AppError, AppResult, adapters::LocalStorage};

use chat_media_core::{AudioOutput, CoreResult, MediaError, PlayerEvents, PlayerHandle};

use std::{
    collections::HashMap,
    panic::Location,
    path::Path,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    BufferSize, Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// How often position is reported while a track plays.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Decoded track shared between the output callback and the reporter.
pub(crate) struct Track {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
    cursor: AtomicUsize,
    paused: AtomicBool,
    finished: AtomicBool,
}

impl Track {
    fn millis_at(&self, sample_index: usize) -> u64 {
        let frames = (sample_index / usize::from(self.channels.max(1))) as u64;
        frames * 1000 / u64::from(self.sample_rate.max(1))
    }

    pub(crate) fn position_ms(&self) -> u64 {
        self.millis_at(self.cursor.load(Ordering::Acquire))
    }

    pub(crate) fn duration_ms(&self) -> u64 {
        self.millis_at(self.samples.len())
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Copy the next block into `out`, padding with silence.
    pub(crate) fn fill(&self, out: &mut [f32]) {
        if self.paused.load(Ordering::Acquire) || self.is_finished() {
            out.fill(0.0);
            return;
        }

        let start = self.cursor.load(Ordering::Acquire);
        let end = (start + out.len()).min(self.samples.len());
        let written = end.saturating_sub(start);

        out[..written].copy_from_slice(&self.samples[start..end]);
        out[written..].fill(0.0);

        self.cursor.store(end, Ordering::Release);
        if end >= self.samples.len() {
            self.finished.store(true, Ordering::Release);
        }
    }
}

struct LivePlayer {
    stream: Stream,
    track: Arc<Track>,
    reporter: JoinHandle<()>,
}

/// Default-speaker player for voice notes kept in [`LocalStorage`].
pub struct CpalPlayer {
    device: Device,
    storage: LocalStorage,
    live: Mutex<HashMap<PlayerHandle, LivePlayer>>,
}

impl CpalPlayer {
    /// Open the default output device.
    ///
    /// # Errors
    ///
    /// Returns error if the host has no output device.
    #[track_caller]
    #[instrument(skip(storage))]
    pub fn new(storage: LocalStorage) -> AppResult<Self> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| AppError::DeviceError {
                reason: "No speaker found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(device_id = ?device.id(), "CpalPlayer initialized");

        Ok(Self {
            device,
            storage,
            live: Mutex::new(HashMap::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlayerHandle, LivePlayer>> {
        self.live.lock().unwrap_or_else(|e| {
            error!("Player lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn open_stream(&self, track: &Arc<Track>, events: &PlayerEvents) -> CoreResult<Stream> {
        let config = StreamConfig {
            channels: track.channels,
            sample_rate: track.sample_rate,
            buffer_size: BufferSize::Default,
        };

        let source = Arc::clone(track);
        let failures = events.clone();

        let stream = self
            .device
            .build_output_stream(
                &config,
                move |out: &mut [f32], _: &cpal::OutputCallbackInfo| source.fill(out),
                move |err| {
                    error!("Audio output stream error: {}", err);
                    failures.failed(err.to_string());
                },
                None,
            )
            .map_err(|e| playback_failure(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| playback_failure(format!("Failed to start stream: {}", e)))?;

        Ok(stream)
    }

    fn with_player<T>(
        &self,
        handle: PlayerHandle,
        action: impl FnOnce(&LivePlayer) -> CoreResult<T>,
    ) -> CoreResult<T> {
        let live = self.lock();
        let player = live
            .get(&handle)
            .ok_or_else(|| playback_failure(format!("Unknown player {}", handle.id())))?;
        action(player)
    }
}

#[async_trait]
impl AudioOutput for CpalPlayer {
    #[instrument(skip(self, events))]
    async fn acquire_player(&self, url: &str, events: PlayerEvents) -> CoreResult<PlayerHandle> {
        let path = self
            .storage
            .resolve(url)
            .ok_or_else(|| playback_failure(format!("Not a local voice note: {}", url)))?;

        let track = tokio::task::spawn_blocking(move || decode_wav(&path))
            .await
            .map_err(|e| playback_failure(format!("WAV reader task failed: {}", e)))??;
        let track = Arc::new(track);

        let stream = self.open_stream(&track, &events)?;
        let handle = PlayerHandle::new();
        let reporter = spawn_reporter(Arc::clone(&track), events);

        info!(
            handle = %handle.id(),
            duration_ms = track.duration_ms(),
            "Player acquired"
        );

        self.lock().insert(
            handle,
            LivePlayer {
                stream,
                track,
                reporter,
            },
        );

        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn pause(&self, handle: PlayerHandle) -> CoreResult<()> {
        self.with_player(handle, |player| {
            player.track.paused.store(true, Ordering::Release);
            player
                .stream
                .pause()
                .map_err(|e| playback_failure(format!("Failed to pause stream: {}", e)))
        })
    }

    #[instrument(skip(self))]
    async fn resume(&self, handle: PlayerHandle) -> CoreResult<()> {
        self.with_player(handle, |player| {
            player.track.paused.store(false, Ordering::Release);
            player
                .stream
                .play()
                .map_err(|e| playback_failure(format!("Failed to resume stream: {}", e)))
        })
    }

    #[instrument(skip(self))]
    async fn release(&self, handle: PlayerHandle) -> CoreResult<()> {
        let player = self.lock().remove(&handle);

        match player {
            Some(player) => {
                player.reporter.abort();
                drop(player.stream);
                debug!(
                    handle = %handle.id(),
                    position_ms = player.track.position_ms(),
                    "Player released"
                );
            }
            None => debug!(handle = %handle.id(), "Release of unknown player ignored"),
        }

        Ok(())
    }
}

fn spawn_reporter(track: Arc<Track>, events: PlayerEvents) -> JoinHandle<()> {
    tokio::spawn(async move {
        let duration_ms = Some(track.duration_ms());
        let mut interval = tokio::time::interval(PROGRESS_INTERVAL);

        loop {
            interval.tick().await;

            if track.is_finished() {
                events.progress(track.position_ms(), duration_ms);
                events.finished();
                break;
            }

            if track.paused.load(Ordering::Acquire) {
                continue;
            }

            if !events.progress(track.position_ms(), duration_ms) {
                break;
            }
        }
    })
}

pub(crate) fn decode_wav(path: &Path) -> CoreResult<Track> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| playback_failure(format!("Failed to open {:?}: {}", path, e)))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| playback_failure(format!("Failed to decode {:?}: {}", path, e)))?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| playback_failure(format!("Failed to decode {:?}: {}", path, e)))?
        }
    };

    if samples.is_empty() {
        return Err(playback_failure(format!("{:?} holds no audio", path)));
    }

    Ok(Track {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        cursor: AtomicUsize::new(0),
        paused: AtomicBool::new(false),
        finished: AtomicBool::new(false),
    })
}

#[track_caller]
fn playback_failure(reason: String) -> MediaError {
    MediaError::PlaybackFailure {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

use crate::{AppError, AppResult};

use chat_media_core::{CaptureDevice, CoreResult, MediaError, RecorderHandle};

use std::{
    collections::HashMap,
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Captured samples, bounded by the longest note the recorder accepts.
///
/// Past the cap, further audio is refused rather than overwriting the
/// start of the note, and finalizing reports the overflow.
pub(crate) struct SampleBuffer {
    samples: Vec<f32>,
    cap: usize,
    overflowed: bool,
}

impl SampleBuffer {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            samples: Vec::new(),
            cap,
            overflowed: false,
        }
    }

    /// Room for `max_seconds` of interleaved audio.
    pub(crate) fn for_duration(sample_rate: u32, channels: u16, max_seconds: u64) -> Self {
        let per_second = u64::from(sample_rate) * u64::from(channels);
        let cap = per_second.saturating_mul(max_seconds);
        Self::new(usize::try_from(cap).unwrap_or(usize::MAX))
    }

    pub(crate) fn push(&mut self, data: &[f32]) {
        if self.overflowed {
            return;
        }

        let room = self.cap - self.samples.len();
        if data.len() > room {
            self.samples.extend_from_slice(&data[..room]);
            self.overflowed = true;
            warn!(cap = self.cap, "Recording hit the length cap, further audio dropped");
            return;
        }

        self.samples.extend_from_slice(data);
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    /// Hand over the recorded audio.
    ///
    /// # Errors
    ///
    /// Returns `IoFailure` when the note ran past the cap or holds nothing.
    #[track_caller]
    pub(crate) fn finish(self) -> CoreResult<Vec<f32>> {
        if self.overflowed {
            return Err(io_failure(format!(
                "Recording exceeded the {} sample limit",
                self.cap
            )));
        }

        if self.samples.is_empty() {
            return Err(io_failure("No audio captured".to_string()));
        }

        Ok(self.samples)
    }
}

/// One open input stream and the samples it has produced.
struct LiveRecording {
    stream: Stream,
    samples: Arc<Mutex<SampleBuffer>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after `finalize`
    /// has taken the buffer.
    shutdown: Arc<AtomicBool>,
}

impl LiveRecording {
    fn stop(self) -> SampleBuffer {
        self.shutdown.store(true, Ordering::Release);
        drop(self.stream);

        std::mem::replace(&mut *lock_samples(&self.samples), SampleBuffer::new(0))
    }
}

struct RecorderInner {
    device: Device,
    config: StreamConfig,
    max_seconds: u64,
    live: HashMap<RecorderHandle, LiveRecording>,
}

/// Default-microphone recorder writing finalized notes as WAV files.
pub struct CpalRecorder {
    output_dir: PathBuf,
    inner: Mutex<RecorderInner>,
}

impl CpalRecorder {
    /// Open the default input device, buffering at most `max_seconds` per note.
    ///
    /// # Errors
    ///
    /// Returns error if no input device exists or its config is unreadable.
    #[track_caller]
    #[instrument(skip(output_dir))]
    pub fn new(output_dir: &Path, max_seconds: u64) -> AppResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| AppError::DeviceError {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| AppError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        std::fs::create_dir_all(output_dir)?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            max_seconds,
            "CpalRecorder initialized"
        );

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            inner: Mutex::new(RecorderInner {
                device,
                config: config.into(),
                max_seconds,
                live: HashMap::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, RecorderInner> {
        self.inner.lock().unwrap_or_else(|e| {
            error!("Recorder lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn open_stream(&self) -> CoreResult<LiveRecording> {
        let inner = self.lock();
        let samples = Arc::new(Mutex::new(SampleBuffer::for_duration(
            inner.config.sample_rate,
            inner.config.channels,
            inner.max_seconds,
        )));
        let shutdown = Arc::new(AtomicBool::new(false));

        let buffer = Arc::clone(&samples);
        let stop = Arc::clone(&shutdown);

        let stream = inner
            .device
            .build_input_stream(
                &inner.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if stop.load(Ordering::Acquire) {
                        return;
                    }
                    lock_samples(&buffer).push(data);
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| device_failure(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| device_failure(format!("Failed to start stream: {}", e)))?;

        Ok(LiveRecording {
            stream,
            samples,
            shutdown,
        })
    }
}

#[async_trait]
impl CaptureDevice for CpalRecorder {
    #[instrument(skip(self))]
    async fn acquire_recorder(&self) -> CoreResult<RecorderHandle> {
        let recording = self.open_stream()?;
        let handle = RecorderHandle::new();

        self.lock().live.insert(handle, recording);
        info!(handle = %handle.id(), "Audio capture started");

        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn finalize(&self, handle: RecorderHandle) -> CoreResult<PathBuf> {
        let (recording, config) = {
            let mut inner = self.lock();
            let recording = inner.live.remove(&handle);
            (recording, inner.config.clone())
        };

        let recording = recording
            .ok_or_else(|| device_failure(format!("Unknown recorder {}", handle.id())))?;

        let samples = recording.stop().finish()?;

        let path = self.output_dir.join(format!("{}.wav", handle.id()));
        let spec = hound::WavSpec {
            channels: config.channels,
            sample_rate: config.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let target = path.clone();
        let sample_count = samples.len();
        tokio::task::spawn_blocking(move || write_wav(&target, spec, &samples))
            .await
            .map_err(|e| device_failure(format!("WAV writer task failed: {}", e)))??;

        info!(path = ?path, sample_count, "Audio capture finalized");

        Ok(path)
    }

    #[instrument(skip(self))]
    async fn discard(&self, handle: RecorderHandle) -> CoreResult<()> {
        let recording = self.lock().live.remove(&handle);

        if let Some(recording) = recording {
            let dropped = recording.stop();
            debug!(sample_count = dropped.len(), "Audio capture discarded");
        }

        Ok(())
    }
}

pub(crate) fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[f32]) -> CoreResult<()> {
    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| io_failure(format!("Failed to create {:?}: {}", path, e)))?;

    for sample in samples {
        writer
            .write_sample(*sample)
            .map_err(|e| io_failure(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| io_failure(format!("Failed to finalize WAV: {}", e)))
}

fn lock_samples(samples: &Mutex<SampleBuffer>) -> MutexGuard<'_, SampleBuffer> {
    // A poisoned mutex means a previous holder panicked, but the
    // buffered samples are still valid and usable.
    samples.lock().unwrap_or_else(|e| {
        error!("Sample buffer lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

#[track_caller]
fn device_failure(reason: String) -> MediaError {
    io_failure(reason)
}

#[track_caller]
fn io_failure(reason: String) -> MediaError {
    MediaError::IoFailure {
        reason,
        source: None,
        location: ErrorLocation::from(Location::caller()),
    }
}

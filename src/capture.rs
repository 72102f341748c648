//! Capture Session: a stateful wrapper that drives the Frame Composer for a
//! bounded duration while streaming the surface into an encoder sink, then
//! finalizes the encoded chunks into a downloadable artifact.
//!
//! The encoder is an opaque capability behind the `CaptureBackend` /
//! `EncoderSink` traits so the whole state machine is testable with a fake.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use tiny_skia::Pixmap;

use crate::clock::Clock;
use crate::compose::compose_frame;
use crate::driver::{AnimationDriver, TickScheduler};
use crate::schema::{RenderConfig, CAPTURE_FPS, DEFAULT_BITRATE};

pub const MIME_VP9: &str = "video/webm;codecs=vp9,opus";
pub const MIME_VP8: &str = "video/webm;codecs=vp8,opus";
pub const MIME_GENERIC: &str = "video/webm";

/// Codec preference order: first accepted wins. The final generic entry is
/// the fallback the container format itself guarantees.
pub const MIME_PREFERENCES: [&str; 3] = [MIME_VP9, MIME_VP8, MIME_GENERIC];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// The host offers no capture/encoding primitive at all.
    UnsupportedPlatform,
    /// None of the offered codec options were accepted by the encoder.
    EncoderRejected,
    /// `begin` was called while a recording is already in progress.
    SessionBusy,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPlatform => {
                write!(f, "no video encoder is available on this host")
            }
            Self::EncoderRejected => {
                write!(f, "the encoder rejected every offered codec option")
            }
            Self::SessionBusy => write!(f, "a capture is already recording"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// An open encoder write target. Frames go in, ordered encoded chunks come
/// out at finalization.
pub trait EncoderSink {
    /// The MIME type the encoder accepted when the sink was opened.
    fn mime_type(&self) -> &str;

    /// Feeds one RGBA frame. A sink that has stopped accepting input drops
    /// the frame and reports inactive from then on.
    fn write_frame(&mut self, rgba: &[u8]) -> Result<()>;

    /// Asks the encoder to stop; chunks already produced remain collectable.
    fn request_stop(&mut self);

    /// False once the encoder is no longer in a recording state, whether
    /// stopped by us or externally.
    fn is_active(&self) -> bool;

    /// Flushes the encoder and returns the ordered encoded chunks.
    fn finalize(self: Box<Self>) -> Result<Vec<Vec<u8>>>;
}

/// The host's capture/encoding capability.
pub trait CaptureBackend {
    fn is_supported(&self) -> bool;

    /// Opens a sink, trying each MIME preference in order; the first one the
    /// encoder accepts wins.
    fn open_sink(
        &mut self,
        config: &RenderConfig,
        fps: u32,
        bitrate: u32,
        mime_preferences: &[&str],
    ) -> Result<Box<dyn EncoderSink>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Finalizing,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    ReachedTarget,
    EncoderStopped,
}

/// The finalized capture: encoded bytes plus download metadata. Dropping or
/// releasing the artifact removes the file backing it, if one was written.
#[derive(Debug)]
pub struct Artifact {
    bytes: Vec<u8>,
    mime_type: String,
    suggested_filename: String,
    backing: Option<PathBuf>,
}

impl Artifact {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    /// Writes the encoded bytes to `path` and records it as the backing
    /// resource, released on `release`/drop unless `persist` is called.
    pub fn write_to(&mut self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write artifact to {}", path.display()))?;
        self.backing = Some(path.to_path_buf());
        Ok(())
    }

    /// Detaches the backing file so it outlives the artifact. Returns the
    /// path, if any.
    pub fn persist(&mut self) -> Option<PathBuf> {
        self.backing.take()
    }

    /// Removes the backing file. Idempotent: a second call is a no-op.
    pub fn release(&mut self) {
        if let Some(path) = self.backing.take() {
            let _ = fs::remove_file(path);
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        self.release();
    }
}

/// Download filename: `anime-video-<variant>-<w>x<h>-<timestamp>.webm`, with
/// the RFC 3339 timestamp's `:` and `.` replaced so it is filesystem-safe.
pub fn artifact_filename(config: &RenderConfig, timestamp: DateTime<Utc>) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!(
        "anime-video-{}-{}x{}-{}.webm",
        config.variant.slug(),
        config.width,
        config.height,
        stamp
    )
}

struct ActiveRecording {
    sink: Box<dyn EncoderSink>,
    config: RenderConfig,
    target: Duration,
    started_at: Duration,
}

pub struct CaptureSession {
    backend: Box<dyn CaptureBackend>,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn TickScheduler>,
    bitrate: u32,
    state: CaptureState,
    progress_percent: u8,
    status: String,
    active: Option<ActiveRecording>,
    artifact: Option<Artifact>,
}

impl CaptureSession {
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        clock: Box<dyn Clock>,
        scheduler: Box<dyn TickScheduler>,
    ) -> Self {
        Self {
            backend,
            clock,
            scheduler,
            bitrate: DEFAULT_BITRATE,
            state: CaptureState::Idle,
            progress_percent: 0,
            status: String::new(),
            active: None,
            artifact: None,
        }
    }

    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn take_artifact(&mut self) -> Option<Artifact> {
        self.artifact.take()
    }

    /// Opens an encoder sink and enters `Recording`. Fails with
    /// `SessionBusy` if a recording is already in progress (so two sinks can
    /// never interleave on one surface) and with `UnsupportedPlatform` if the
    /// backend has no encoder to offer. Either failure leaves any preview and
    /// the configuration untouched.
    pub fn begin(&mut self, config: &RenderConfig, duration_seconds: f64) -> Result<()> {
        if self.active.is_some() {
            return Err(CaptureError::SessionBusy.into());
        }
        if !self.backend.is_supported() {
            self.status = CaptureError::UnsupportedPlatform.to_string();
            return Err(CaptureError::UnsupportedPlatform.into());
        }

        // At least one second of capture, as the original enforced.
        let target_ms = ((duration_seconds * 1000.0).round() as u64).max(1000);
        let sink = self
            .backend
            .open_sink(config, CAPTURE_FPS, self.bitrate, &MIME_PREFERENCES)?;

        self.active = Some(ActiveRecording {
            sink,
            config: *config,
            target: Duration::from_millis(target_ms),
            started_at: self.clock.now(),
        });
        self.progress_percent = 0;
        self.state = CaptureState::Recording;
        self.status = "Recording...".to_owned();
        Ok(())
    }

    /// One cooperative tick of the capture drive loop: compose a frame at the
    /// session's elapsed time, feed it to the sink, update progress. Reports
    /// whether the loop should keep going.
    pub fn drive_tick(&mut self, surface: &mut Pixmap) -> Result<TickOutcome> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| anyhow!("drive_tick called with no active recording"))?;

        let elapsed = self.clock.now().saturating_sub(active.started_at);
        compose_frame(surface, elapsed.as_secs_f64(), &active.config);
        active.sink.write_frame(surface.data())?;

        let ratio = (elapsed.as_secs_f64() / active.target.as_secs_f64()).min(1.0);
        let percent = (ratio * 100.0).round() as u8;
        // Progress never moves backwards within a session.
        self.progress_percent = self.progress_percent.max(percent);

        if !active.sink.is_active() {
            Ok(TickOutcome::EncoderStopped)
        } else if ratio >= 1.0 {
            Ok(TickOutcome::ReachedTarget)
        } else {
            Ok(TickOutcome::Continue)
        }
    }

    /// Flushes the sink, concatenates its chunks into the session artifact,
    /// forces progress to 100 and enters `Complete`. A previously held
    /// artifact's backing resource is released before the new one replaces
    /// it.
    pub fn finalize(&mut self) -> Result<()> {
        let active = self
            .active
            .take()
            .ok_or_else(|| anyhow!("finalize called with no active recording"))?;
        self.state = CaptureState::Finalizing;

        let mut sink = active.sink;
        sink.request_stop();
        let mime_type = sink.mime_type().to_owned();
        let chunks = match sink.finalize() {
            Ok(chunks) => chunks,
            Err(error) => {
                self.state = CaptureState::Idle;
                self.status = format!("Recording failed: {error:#}");
                return Err(error);
            }
        };

        let mut bytes = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
        for chunk in &chunks {
            bytes.extend_from_slice(chunk);
        }

        if let Some(mut previous) = self.artifact.take() {
            previous.release();
        }
        self.artifact = Some(Artifact {
            bytes,
            mime_type,
            suggested_filename: artifact_filename(&active.config, Utc::now()),
            backing: None,
        });
        self.progress_percent = 100;
        self.state = CaptureState::Complete;
        self.status = "Recording complete.".to_owned();
        Ok(())
    }

    /// Runs a whole capture cooperatively: stops the preview driver, records
    /// until the duration target is reached or the encoder stops, finalizes,
    /// then restarts the preview.
    pub fn run(
        &mut self,
        surface: &mut Pixmap,
        config: &RenderConfig,
        duration_seconds: f64,
        mut preview: Option<&mut AnimationDriver>,
    ) -> Result<()> {
        if let Some(driver) = preview.as_deref_mut() {
            driver.stop();
        }

        self.begin(config, duration_seconds)?;
        let mut last_logged = 0_u8;
        loop {
            let outcome = match self.drive_tick(surface) {
                Ok(outcome) => outcome,
                Err(error) => {
                    self.abort();
                    return Err(error);
                }
            };
            if self.progress_percent >= last_logged.saturating_add(25) {
                last_logged = self.progress_percent;
                eprintln!("[animegen] recording {}%", self.progress_percent);
            }
            match outcome {
                TickOutcome::Continue => {}
                TickOutcome::ReachedTarget | TickOutcome::EncoderStopped => break,
            }
            // The scheduler running dry counts as an external stop signal.
            if !self.scheduler.next_tick() {
                break;
            }
        }
        self.finalize()?;

        if let Some(driver) = preview {
            driver.start();
        }
        Ok(())
    }

    /// Releases the held artifact's backing resource and returns to `Idle`.
    /// Safe to call with nothing held.
    pub fn discard(&mut self) {
        if let Some(mut artifact) = self.artifact.take() {
            artifact.release();
        }
        self.state = CaptureState::Idle;
    }

    fn abort(&mut self) {
        if let Some(active) = self.active.take() {
            let mut sink = active.sink;
            sink.request_stop();
            let _ = sink.finalize();
        }
        self.state = CaptureState::Idle;
        self.status = "Recording failed.".to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Resolution, Variant};
    use chrono::TimeZone;

    #[test]
    fn artifact_filename_is_filesystem_safe() {
        let config = RenderConfig::new(Variant::Sakura, Resolution::parse_or_default("1280x720"));
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 5).unwrap();
        let name = artifact_filename(&config, timestamp);
        assert!(name.starts_with("anime-video-sakura-1280x720-2024-03-09T14-30-05"));
        assert!(name.ends_with(".webm"));
        assert!(!name.contains(':'));
        // Only the extension's dot survives.
        assert_eq!(name.matches('.').count(), 1);
    }

    #[test]
    fn capture_error_messages_are_user_facing() {
        assert!(CaptureError::UnsupportedPlatform.to_string().contains("encoder"));
        assert!(CaptureError::SessionBusy.to_string().contains("already"));
    }
}

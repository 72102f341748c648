//! WebM encoding over an external ffmpeg process.
//!
//! The backend feeds raw RGBA frames into ffmpeg's stdin on a dedicated
//! writer thread and collects the encoded WebM stream from stdout on a reader
//! thread, so neither pipe can back up and deadlock the other. The encoded
//! bytes come back as ordered chunks for the capture session to assemble.

use std::collections::HashSet;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdout, Command, Stdio};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};

use crate::capture::{CaptureBackend, CaptureError, EncoderSink, MIME_GENERIC, MIME_VP8, MIME_VP9};
use crate::schema::RenderConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FfmpegMode {
    Auto,
    System,
    Sidecar,
}

/// Encoder backend over a system or sidecar ffmpeg binary.
pub struct FfmpegBackend {
    mode: FfmpegMode,
}

impl FfmpegBackend {
    pub fn new(mode: FfmpegMode) -> Self {
        Self { mode }
    }
}

impl CaptureBackend for FfmpegBackend {
    fn is_supported(&self) -> bool {
        let Ok(path) = resolve_ffmpeg_path(self.mode) else {
            return false;
        };
        Command::new(&path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn open_sink(
        &mut self,
        config: &RenderConfig,
        fps: u32,
        bitrate: u32,
        mime_preferences: &[&str],
    ) -> Result<Box<dyn EncoderSink>> {
        let path = resolve_ffmpeg_path(self.mode)?;
        let available = probe_encoders(&path).unwrap_or_default();

        for &mime in mime_preferences {
            let Some(codec_args) = codec_args_for_mime(mime, bitrate, &available) else {
                continue;
            };
            let pipe = WebmPipe::spawn(&path, config, fps, codec_args, mime)?;
            return Ok(Box::new(pipe));
        }
        Err(CaptureError::EncoderRejected.into())
    }
}

fn resolve_ffmpeg_path(mode: FfmpegMode) -> Result<PathBuf> {
    match mode {
        FfmpegMode::Auto | FfmpegMode::System => Ok(PathBuf::from("ffmpeg")),
        FfmpegMode::Sidecar => {
            #[cfg(feature = "sidecar_ffmpeg")]
            {
                let path = ffmpeg_sidecar::paths::ffmpeg_path();
                if !path.exists() {
                    ffmpeg_sidecar::download::auto_download()
                        .context("failed to auto-download ffmpeg sidecar binary")?;
                }
                Ok(path)
            }
            #[cfg(not(feature = "sidecar_ffmpeg"))]
            {
                Err(anyhow!(
                    "ffmpeg sidecar mode requested but animegen was built without `sidecar_ffmpeg`. Rebuild with `--features sidecar_ffmpeg`."
                ))
            }
        }
    }
}

/// Lists the encoder names this ffmpeg build ships, from
/// `ffmpeg -encoders` output lines like ` V....D libvpx-vp9  ...`.
fn probe_encoders(ffmpeg_path: &Path) -> Result<HashSet<String>> {
    let output = Command::new(ffmpeg_path)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .output()
        .context("failed to run `ffmpeg -encoders`")?;
    let text = String::from_utf8_lossy(&output.stdout);

    let mut names = HashSet::new();
    for line in text.lines() {
        let mut fields = line.split_whitespace();
        let (Some(flags), Some(name)) = (fields.next(), fields.next()) else {
            continue;
        };
        if flags.starts_with('V') {
            names.insert(name.to_owned());
        }
    }
    Ok(names)
}

/// Maps a codec-qualified MIME option to ffmpeg output arguments, or `None`
/// when this ffmpeg build cannot encode it. The generic `video/webm` entry is
/// always accepted and lets ffmpeg pick the container's default codec.
fn codec_args_for_mime(mime: &str, bitrate: u32, available: &HashSet<String>) -> Option<Vec<String>> {
    match mime {
        MIME_VP9 if available.contains("libvpx-vp9") => Some(vec![
            "-c:v".to_owned(),
            "libvpx-vp9".to_owned(),
            "-b:v".to_owned(),
            bitrate.to_string(),
            "-deadline".to_owned(),
            "realtime".to_owned(),
            "-cpu-used".to_owned(),
            "5".to_owned(),
        ]),
        MIME_VP8 if available.contains("libvpx") => Some(vec![
            "-c:v".to_owned(),
            "libvpx".to_owned(),
            "-b:v".to_owned(),
            bitrate.to_string(),
            "-deadline".to_owned(),
            "realtime".to_owned(),
        ]),
        MIME_GENERIC => Some(vec!["-b:v".to_owned(), bitrate.to_string()]),
        _ => None,
    }
}

pub fn webm_args(size: &str, fps: u32, codec_args: &[String]) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_owned(),
        "-loglevel".to_owned(),
        "error".to_owned(),
        "-f".to_owned(),
        "rawvideo".to_owned(),
        "-pix_fmt".to_owned(),
        "rgba".to_owned(),
        "-s:v".to_owned(),
        size.to_owned(),
        "-r".to_owned(),
        fps.to_string(),
        "-i".to_owned(),
        "-".to_owned(),
        "-an".to_owned(),
    ];
    args.extend(codec_args.iter().cloned());
    args.push("-f".to_owned());
    args.push("webm".to_owned());
    args.push("pipe:1".to_owned());
    args
}

/// An open ffmpeg WebM encode: frames in through a bounded channel, encoded
/// chunks back when the worker thread is joined.
pub struct WebmPipe {
    sender: Option<mpsc::SyncSender<Vec<u8>>>,
    worker: Option<JoinHandle<Result<Vec<Vec<u8>>>>>,
    mime_type: String,
}

impl WebmPipe {
    fn spawn(
        ffmpeg_path: &Path,
        config: &RenderConfig,
        fps: u32,
        codec_args: Vec<String>,
        mime: &str,
    ) -> Result<Self> {
        let size = format!("{}x{}", config.width, config.height);
        let args = webm_args(&size, fps, &codec_args);
        let path = ffmpeg_path.to_path_buf();
        let (sender, receiver) = mpsc::sync_channel::<Vec<u8>>(4);

        let worker = thread::Builder::new()
            .name("animegen-webm-encoder".to_owned())
            .spawn(move || run_ffmpeg_process(&path, receiver, &args))
            .context("failed to spawn ffmpeg writer thread")?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            mime_type: mime.to_owned(),
        })
    }
}

impl EncoderSink for WebmPipe {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn write_frame(&mut self, rgba: &[u8]) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(anyhow!("encoder has already been finalized"));
        };
        // A closed channel means ffmpeg went away mid-capture. Treat it as an
        // external stop; the underlying error surfaces at finalize.
        if sender.send(rgba.to_vec()).is_err() {
            self.sender = None;
        }
        Ok(())
    }

    fn request_stop(&mut self) {
        // Closing the channel ends the writer loop, which closes ffmpeg's
        // stdin and lets it flush the stream.
        self.sender = None;
    }

    fn is_active(&self) -> bool {
        self.sender.is_some()
    }

    fn finalize(mut self: Box<Self>) -> Result<Vec<Vec<u8>>> {
        drop(self.sender.take());

        let handle = self
            .worker
            .take()
            .ok_or_else(|| anyhow!("ffmpeg worker thread missing"))?;
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(anyhow!("ffmpeg worker thread panicked")),
        }
    }
}

fn run_ffmpeg_process(
    ffmpeg_path: &Path,
    receiver: mpsc::Receiver<Vec<u8>>,
    args: &[String],
) -> Result<Vec<Vec<u8>>> {
    let mut command = Command::new(ffmpeg_path);
    command
        .args(args.iter().map(String::as_str))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            anyhow!(
                "ffmpeg executable not found (resolved_path={}). Install ffmpeg or use sidecar mode with `--features sidecar_ffmpeg`.",
                ffmpeg_path.display()
            )
        } else {
            anyhow!(
                "failed to spawn ffmpeg process (resolved_path={}, args='{}'): {error}",
                ffmpeg_path.display(),
                args.join(" ")
            )
        }
    })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("failed to capture ffmpeg stdin"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("failed to capture ffmpeg stdout"))?;
    let mut stderr_pipe = child.stderr.take();

    // Drain stdout concurrently or a full pipe stalls the encode.
    let reader = thread::Builder::new()
        .name("animegen-webm-reader".to_owned())
        .spawn(move || read_chunks(stdout))
        .context("failed to spawn ffmpeg reader thread")?;

    while let Ok(frame) = receiver.recv() {
        // A write failure means ffmpeg exited; stop feeding and let the
        // status check below report what went wrong.
        if stdin.write_all(&frame).is_err() {
            break;
        }
    }
    let _ = stdin.flush();
    drop(stdin);

    let status = child.wait().context("failed waiting for ffmpeg process")?;
    let chunks = match reader.join() {
        Ok(result) => result.context("failed reading ffmpeg stdout")?,
        Err(_) => return Err(anyhow!("ffmpeg reader thread panicked")),
    };
    let stderr_tail = read_stderr_tail(&mut stderr_pipe)?;
    if !status.success() {
        return Err(anyhow!(
            "ffmpeg failed with status {status} (resolved_path={}, args='{}', stderr_tail='{}')",
            ffmpeg_path.display(),
            args.join(" "),
            stderr_tail
        ));
    }

    Ok(chunks)
}

fn read_chunks(mut stdout: ChildStdout) -> std::io::Result<Vec<Vec<u8>>> {
    let mut chunks = Vec::new();
    let mut buf = vec![0_u8; 64 * 1024];
    loop {
        let n = stdout.read(&mut buf)?;
        if n == 0 {
            return Ok(chunks);
        }
        chunks.push(buf[..n].to_vec());
    }
}

fn read_stderr_tail(stderr: &mut Option<std::process::ChildStderr>) -> Result<String> {
    let Some(mut pipe) = stderr.take() else {
        return Ok(String::new());
    };
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)
        .context("failed reading ffmpeg stderr")?;
    let text = String::from_utf8_lossy(&buf).to_string();
    Ok(last_n_chars(&text, 500))
}

fn last_n_chars(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars().collect::<Vec<_>>();
    if chars.len() > max_chars {
        chars = chars[chars.len().saturating_sub(max_chars)..].to_vec();
    }
    chars.into_iter().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vp9_option_requires_the_encoder_to_exist() {
        let empty = HashSet::new();
        assert!(codec_args_for_mime(MIME_VP9, 6_000_000, &empty).is_none());

        let mut with_vp9 = HashSet::new();
        with_vp9.insert("libvpx-vp9".to_owned());
        let args = codec_args_for_mime(MIME_VP9, 6_000_000, &with_vp9).unwrap();
        assert!(args.contains(&"libvpx-vp9".to_owned()));
        assert!(args.contains(&"6000000".to_owned()));
    }

    #[test]
    fn generic_webm_is_always_accepted() {
        let empty = HashSet::new();
        assert!(codec_args_for_mime(MIME_GENERIC, 6_000_000, &empty).is_some());
    }

    #[test]
    fn unknown_mime_is_rejected() {
        let mut available = HashSet::new();
        available.insert("libvpx-vp9".to_owned());
        assert!(codec_args_for_mime("video/mp4", 6_000_000, &available).is_none());
    }

    #[test]
    fn webm_args_stream_to_stdout() {
        let args = webm_args("1280x720", 60, &[]);
        assert_eq!(args.last().unwrap(), "pipe:1");
        assert!(args.windows(2).any(|w| w == ["-s:v", "1280x720"]));
        assert!(args.windows(2).any(|w| w == ["-r", "60"]));
    }

    #[test]
    fn last_n_chars_trims_and_bounds() {
        assert_eq!(last_n_chars("  hello  ", 500), "hello");
        assert_eq!(last_n_chars("abcdef", 3), "def");
    }
}

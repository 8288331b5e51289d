//! ffmpeg-backed camera
//!
//! Streams raw RGB24 frames from the platform capture API through an
//! `ffmpeg` child process. The child is the stream's only track: stopping
//! the stream kills it and releases the device.
//!
//! A reader thread drains the pipe continuously and keeps only the newest
//! complete frame, so a capture always sees what the camera sees now.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::RgbImage;

use crate::domain::result::DeviceAccessError;
use crate::ports::{CaptureDevice, VideoConstraints, VideoStream};

/// How long `open` waits for the device to deliver its first frame
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(10);

/// ffmpeg stderr lines kept for classifying a failed start
const STDERR_TAIL_LINES: usize = 20;

/// Platform capture input for ffmpeg's `-f`
fn input_format() -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        "dshow"
    } else {
        "v4l2"
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegCamera {
    device: String,
    ffmpeg: Option<PathBuf>,
}

impl FfmpegCamera {
    /// Camera on `device` (e.g. `/dev/video0`), ffmpeg located on PATH
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ffmpeg: which::which("ffmpeg").ok(),
        }
    }

    /// Use an explicit ffmpeg binary
    pub fn with_binary(device: impl Into<String>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
            ffmpeg: Some(ffmpeg.into()),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn ffmpeg_path(&self) -> Option<&Path> {
        self.ffmpeg.as_deref()
    }

    /// Check the device node before handing it to ffmpeg, so the common
    /// failures map onto distinct errors. Only device paths can be checked.
    pub fn probe_device(&self) -> Result<(), DeviceAccessError> {
        if !self.device.starts_with('/') {
            return Ok(());
        }
        match std::fs::OpenOptions::new().read(true).open(&self.device) {
            Ok(_) => Ok(()),
            Err(e) => Err(match e.kind() {
                ErrorKind::NotFound => DeviceAccessError::NotFound,
                ErrorKind::PermissionDenied => DeviceAccessError::PermissionDenied,
                _ => DeviceAccessError::Other(e.to_string()),
            }),
        }
    }

    fn command(&self, ffmpeg: &Path, constraints: &VideoConstraints) -> Command {
        let size = format!("{}x{}", constraints.width, constraints.height);
        let scale = format!("scale={}:{}", constraints.width, constraints.height);

        let mut cmd = Command::new(ffmpeg);
        cmd.args(["-hide_banner", "-loglevel", "error", "-nostdin"])
            .args(["-f", input_format()])
            .args(["-video_size", size.as_str()])
            .args(["-i", self.device.as_str()])
            .args(["-vf", scale.as_str()])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl CaptureDevice for FfmpegCamera {
    fn name(&self) -> String {
        format!("ffmpeg:{}", self.device)
    }

    fn open(&self, constraints: &VideoConstraints) -> Result<Box<dyn VideoStream>, DeviceAccessError> {
        let ffmpeg = self
            .ffmpeg
            .as_deref()
            .ok_or_else(|| DeviceAccessError::Other("ffmpeg not found on PATH".to_string()))?;

        self.probe_device()?;

        let mut child = self
            .command(ffmpeg, constraints)
            .spawn()
            .map_err(|e| DeviceAccessError::Other(format!("failed to start ffmpeg: {}", e)))?;
        tracing::debug!(device = %self.device, pid = child.id(), "camera stream started");

        let stderr = child.stderr.take().map(StderrTail::spawn);
        let frames = match child.stdout.take() {
            Some(stdout) => FrameReader::spawn(stdout, constraints.width, constraints.height)
                .map_err(|e| format!("failed to start frame reader: {}", e)),
            None => Err("ffmpeg stdout unavailable".to_string()),
        };

        let mut stream = FfmpegStream {
            child: Some(child),
            frames: None,
            stderr,
            width: constraints.width,
            height: constraints.height,
        };
        let started = frames.and_then(|frames| {
            let first = frames.wait_first_frame(FIRST_FRAME_TIMEOUT);
            stream.frames = Some(frames);
            first
        });

        match started {
            Ok(()) => Ok(Box::new(stream)),
            Err(reason) => {
                let stderr = stream.shutdown();
                let error = classify_failure(&stderr, &reason);
                tracing::warn!(device = %self.device, %reason, %error, "camera stream failed to start");
                Err(error)
            }
        }
    }
}

/// Map ffmpeg's complaint about the input device onto an access error
fn classify_failure(stderr: &str, fallback: &str) -> DeviceAccessError {
    let lower = stderr.to_lowercase();
    if lower.contains("device or resource busy") {
        DeviceAccessError::Busy
    } else if lower.contains("permission denied") || lower.contains("not authorized") {
        DeviceAccessError::PermissionDenied
    } else if lower.contains("no such file or directory") || lower.contains("could not find") {
        DeviceAccessError::NotFound
    } else {
        let detail = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or(fallback);
        DeviceAccessError::Other(detail.to_string())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct FrameState {
    latest: Option<RgbImage>,
    ended: Option<String>,
}

#[derive(Default)]
struct FrameSlot {
    state: Mutex<FrameState>,
    changed: Condvar,
}

/// Background reader holding the newest complete frame of a raw RGB24 pipe
struct FrameReader {
    slot: Arc<FrameSlot>,
    handle: Option<JoinHandle<()>>,
}

impl FrameReader {
    fn spawn<R>(mut source: R, width: u32, height: u32) -> std::io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let slot = Arc::new(FrameSlot::default());
        let shared = Arc::clone(&slot);
        let frame_len = width as usize * height as usize * 3;

        let handle = thread::Builder::new()
            .name("faceauth-camera".to_string())
            .spawn(move || {
                let ended = loop {
                    let mut buf = vec![0u8; frame_len];
                    if let Err(e) = source.read_exact(&mut buf) {
                        break match e.kind() {
                            ErrorKind::UnexpectedEof => "camera stream ended".to_string(),
                            _ => format!("camera stream ended: {}", e),
                        };
                    }
                    let Some(frame) = RgbImage::from_raw(width, height, buf) else {
                        break "short frame".to_string();
                    };
                    lock(&shared.state).latest = Some(frame);
                    shared.changed.notify_all();
                };
                lock(&shared.state).ended = Some(ended);
                shared.changed.notify_all();
            })?;

        Ok(Self {
            slot,
            handle: Some(handle),
        })
    }

    /// Block until a frame has arrived, the pipe ended, or `timeout` passed
    fn wait_first_frame(&self, timeout: Duration) -> Result<(), String> {
        let state = lock(&self.slot.state);
        let (state, _) = self
            .slot
            .changed
            .wait_timeout_while(state, timeout, |s| s.latest.is_none() && s.ended.is_none())
            .unwrap_or_else(PoisonError::into_inner);

        match (&state.latest, &state.ended) {
            (Some(_), _) => Ok(()),
            (None, Some(reason)) => Err(reason.clone()),
            (None, None) => Err(format!("no frame from camera within {}s", timeout.as_secs())),
        }
    }

    fn latest(&self) -> Result<RgbImage, DeviceAccessError> {
        let state = lock(&self.slot.state);
        if let Some(reason) = &state.ended {
            return Err(DeviceAccessError::Other(reason.clone()));
        }
        state
            .latest
            .clone()
            .ok_or_else(|| DeviceAccessError::Other("no frame yet".to_string()))
    }

    fn has_ended(&self) -> bool {
        lock(&self.slot.state).ended.is_some()
    }

    /// Wait for the reader thread; the source must already be closed
    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Last lines ffmpeg wrote to stderr, collected until the child exits
struct StderrTail(JoinHandle<String>);

impl StderrTail {
    fn spawn(stderr: ChildStderr) -> Self {
        Self(thread::spawn(move || {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            for line in BufReader::new(stderr).lines().map_while(|line| line.ok()) {
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Vec::from(tail).join("\n")
        }))
    }

    fn join(self) -> String {
        self.0.join().unwrap_or_default()
    }
}

struct FfmpegStream {
    child: Option<Child>,
    frames: Option<FrameReader>,
    stderr: Option<StderrTail>,
    width: u32,
    height: u32,
}

impl FfmpegStream {
    /// Kill the child, reap it and its reader threads. Returns ffmpeg's stderr tail.
    fn shutdown(&mut self) -> String {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("camera stream stopped");
        }
        if let Some(frames) = self.frames.as_mut() {
            frames.join();
        }
        self.stderr.take().map(StderrTail::join).unwrap_or_default()
    }
}

impl VideoStream for FfmpegStream {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Result<RgbImage, DeviceAccessError> {
        match (&self.child, &self.frames) {
            (Some(_), Some(frames)) => frames.latest(),
            _ => Err(DeviceAccessError::Other("stream stopped".to_string())),
        }
    }

    fn stop(&mut self) {
        self.shutdown();
    }

    fn is_live(&self) -> bool {
        self.child.is_some() && self.frames.as_ref().is_some_and(|f| !f.has_ended())
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

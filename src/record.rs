use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use headless_chrome::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::protocol::cdp::types::Event;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::{CastError, CastResult};

/// Capture rate of the output video.
pub const RECORD_FPS: u32 = 60;

/// Environment override for the ffmpeg binary path.
pub const FFMPEG_ENV: &str = "CAST2MP4_FFMPEG";

/// Resolve the video encoder binary: explicit override, else `ffmpeg` on
/// PATH.
pub fn resolve_ffmpeg() -> PathBuf {
    ffmpeg_path_from(std::env::var_os(FFMPEG_ENV))
}

fn ffmpeg_path_from(overridden: Option<OsString>) -> PathBuf {
    overridden
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("ffmpeg"))
}

fn ffmpeg_responds(ffmpeg: &Path) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub ffmpeg: PathBuf,
}

impl EncodeConfig {
    pub fn validate(&self) -> CastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CastError::record("frame width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(CastError::record("frame rate must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // The output targets yuv420p for maximum player compatibility.
            return Err(CastError::record(
                "frame width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> CastResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Arguments for one raw-RGBA-pipe to H.264 MP4 encode.
fn ffmpeg_args(cfg: &EncodeConfig) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "rgba".to_string(),
        "-s".to_string(),
        format!("{}x{}", cfg.width, cfg.height),
        "-r".to_string(),
        cfg.fps.to_string(),
        "-i".to_string(),
        "pipe:0".to_string(),
        "-an".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        cfg.out_path.display().to_string(),
    ]
}

/// Streams raw RGBA frames into a spawned ffmpeg process; dropping stdin
/// and waiting on the child finalizes the MP4.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> CastResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !ffmpeg_responds(&cfg.ffmpeg) {
            return Err(CastError::record(format!(
                "ffmpeg is required for MP4 encoding, but '{}' did not respond \
                 (set {FFMPEG_ENV} or install ffmpeg on PATH)",
                cfg.ffmpeg.display()
            )));
        }

        let mut child = Command::new(&cfg.ffmpeg)
            .args(ffmpeg_args(&cfg))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CastError::record(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CastError::record("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    pub fn config(&self) -> &EncodeConfig {
        &self.cfg
    }

    pub fn encode_frame(&mut self, rgba: &[u8]) -> CastResult<()> {
        let expected = (self.cfg.width * self.cfg.height * 4) as usize;
        if rgba.len() != expected {
            return Err(CastError::record(format!(
                "frame size mismatch: got {} bytes, expected {} ({}x{}x4)",
                rgba.len(),
                expected,
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CastError::record("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(rgba)
            .map_err(|e| CastError::record(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        Ok(())
    }

    pub fn finish(mut self) -> CastResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| CastError::record(format!("failed to wait for ffmpeg to finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CastError::record(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// One screencast delivery: base64-decoded PNG plus the CDP session id to
/// acknowledge.
struct ScreencastFrame {
    png: Vec<u8>,
    session_id: u32,
}

type FrameMailbox = Arc<Mutex<Option<ScreencastFrame>>>;

/// Captures the tab via `Page.startScreencast` and pumps a constant
/// 60 fps raw-RGBA stream into ffmpeg. Chromium only delivers frames when
/// the page changes, so the pump holds the last frame between deliveries.
pub struct Recorder {
    tab: Arc<Tab>,
    stop: Arc<AtomicBool>,
    pump: Option<JoinHandle<CastResult<FfmpegEncoder>>>,
}

impl Recorder {
    /// Spawn the encoder, subscribe to screencast frames and start the
    /// frame pump.
    pub fn start(tab: Arc<Tab>, cfg: EncodeConfig) -> CastResult<Self> {
        let encoder = FfmpegEncoder::new(cfg)?;

        let mailbox: FrameMailbox = Arc::new(Mutex::new(None));
        let listener_mailbox = Arc::clone(&mailbox);
        tab.add_event_listener(Arc::new(move |event: &Event| {
            if let Event::PageScreencastFrame(frame) = event {
                let params = &frame.params;
                if let Ok(png) = BASE64.decode(params.data.as_bytes()) {
                    let mut slot = listener_mailbox.lock().unwrap_or_else(|e| e.into_inner());
                    *slot = Some(ScreencastFrame {
                        png,
                        session_id: params.session_id,
                    });
                }
            }
        }))
        .map_err(|e| CastError::record(format!("failed to attach screencast listener: {e}")))?;

        let (width, height) = {
            let cfg = encoder.config();
            (cfg.width, cfg.height)
        };
        tab.call_method(Page::StartScreencast {
            format: Some(Page::StartScreencastFormatOption::Png),
            quality: None,
            max_width: Some(width),
            max_height: Some(height),
            every_nth_frame: None,
        })
        .map_err(|e| CastError::record(format!("failed to start screen capture: {e}")))?;

        let stop = Arc::new(AtomicBool::new(false));
        let pump = {
            let tab = Arc::clone(&tab);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || pump_frames(tab, encoder, mailbox, stop))
        };

        debug!(width, height, fps = RECORD_FPS, "screen capture started");

        Ok(Self {
            tab,
            stop,
            pump: Some(pump),
        })
    }

    /// Stop capture and finalize the video file.
    pub fn stop(mut self) -> CastResult<()> {
        self.stop.store(true, Ordering::SeqCst);

        // The page may already be gone; stopping the screencast is
        // best-effort.
        if let Err(e) = self.tab.call_method(Page::StopScreencast(None)) {
            debug!("failed to stop screencast cleanly: {e}");
        }

        let pump = self
            .pump
            .take()
            .ok_or_else(|| CastError::record("recorder already stopped"))?;
        let encoder = pump
            .join()
            .map_err(|_| CastError::record("frame pump thread panicked"))??;
        encoder.finish()?;
        debug!("screen capture stopped, video finalized");
        Ok(())
    }
}

/// 60 Hz loop: acknowledge and decode newly delivered screencast frames,
/// write one frame per tick (repeating the last one when the page is
/// idle). Runs until the recorder is stopped; returns the encoder for
/// finalization.
fn pump_frames(
    tab: Arc<Tab>,
    mut encoder: FfmpegEncoder,
    mailbox: FrameMailbox,
    stop: Arc<AtomicBool>,
) -> CastResult<FfmpegEncoder> {
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(encoder.config().fps));
    let (width, height) = (encoder.config().width, encoder.config().height);
    let mut current: Option<Vec<u8>> = None;
    let mut next_tick = Instant::now();

    while !stop.load(Ordering::SeqCst) {
        let delivered = mailbox.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(frame) = delivered {
            let _ = tab.call_method(Page::ScreencastFrameAck {
                session_id: frame.session_id,
            });
            current = Some(decode_frame(&frame.png, width, height)?);
        }

        if let Some(rgba) = current.as_ref() {
            encoder.encode_frame(rgba)?;
        }

        next_tick += frame_interval;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            // Fell behind (slow decode); restart the clock instead of
            // bursting catch-up frames.
            next_tick = now;
        }
    }

    Ok(encoder)
}

/// Decode a screencast PNG and normalize it to the exact encode dimensions.
fn decode_frame(png: &[u8], width: u32, height: u32) -> CastResult<Vec<u8>> {
    let image = image::load_from_memory(png)
        .map_err(|e| CastError::record(format!("failed to decode screencast frame: {e}")))?;
    let rgba = image.into_rgba8();
    if rgba.dimensions() == (width, height) {
        Ok(rgba.into_raw())
    } else {
        Ok(image::imageops::resize(&rgba, width, height, FilterType::Triangle).into_raw())
    }
}

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use tracing::{debug, info};

use crate::browser::{BrowserSession, Viewport};
use crate::error::CastResult;
use crate::input;
use crate::options::{ParsedOptions, RawOptions};
use crate::page;
use crate::player;
use crate::player_assets::PlayerAssets;
use crate::record::{self, EncodeConfig, RECORD_FPS, Recorder};
use crate::signal::SignalGuard;

/// Convert one cast recording into an MP4 video.
///
/// Strict top-to-bottom sequencing: resolve input, normalize options, load
/// the player bundle, compose the page, launch the browser, initialize the
/// player, record playback. The browser is closed exactly once on every
/// exit path, including interrupt.
pub fn convert_cast_to_video(input_path: &Path, raw: &RawOptions) -> CastResult<()> {
    let cast_path = input::resolve_cast_path(input_path)?;
    let output = input::resolve_output_path(&raw.output)?;
    let opts = ParsedOptions::from_raw(raw);

    let assets = PlayerAssets::load()?;
    let cast = std::fs::read(&cast_path)
        .with_context(|| format!("read cast file '{}'", cast_path.display()))?;
    let data_uri = page::cast_data_uri(&cast);
    let html = page::compose_page(&assets, &data_uri, opts.theme.as_str(), opts.speed);
    debug!(
        cast = %cast_path.display(),
        theme = %opts.theme,
        speed = opts.speed,
        "page composed"
    );

    let viewport = Viewport::from_options(&opts);
    let session = BrowserSession::launch(viewport)?;
    let _signal_guard = SignalGuard::arm(session.shared_browser())?;

    let result = run_session(&session, &html, viewport, &output);
    session.close();

    if result.is_ok() {
        info!("wrote {}", output.display());
    }
    result
}

fn run_session(
    session: &BrowserSession,
    html: &str,
    viewport: Viewport,
    output: &Path,
) -> CastResult<()> {
    player::init_player(session.tab(), html)?;

    let cfg = EncodeConfig {
        width: viewport.width,
        height: viewport.height,
        fps: RECORD_FPS,
        out_path: output.to_path_buf(),
        ffmpeg: record::resolve_ffmpeg(),
    };
    let recorder = Recorder::start(Arc::clone(session.tab()), cfg)?;

    let playback = player::trigger_playback(session.tab())
        .and_then(|()| player::wait_for_playback_end(session.tab()));
    match playback {
        Ok(()) => recorder.stop(),
        Err(err) => {
            // Best-effort teardown; the playback error is the one reported.
            let _ = recorder.stop();
            Err(err)
        }
    }
}

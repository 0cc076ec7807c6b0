use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::Tab;
use headless_chrome::protocol::cdp::types::Event;
use tracing::debug;

use crate::error::{CastError, CastResult};
use crate::page::{ENDED_FLAG, ERROR_FLAG, PLAY_HOOK, READY_FLAG};

/// The only bounded wait in the pipeline: a defensive cap on player
/// initialization.
pub const PLAYER_INIT_TIMEOUT: Duration = Duration::from_secs(15);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const ENDED_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Load the composed page into the tab and wait (bounded) for the player's
/// readiness flag. On timeout, any error the bootstrap captured in-page is
/// appended to the failure message.
pub fn init_player(tab: &Arc<Tab>, html: &str) -> CastResult<()> {
    forward_console(tab)?;
    load_page(tab, html)?;

    let deadline = Instant::now() + PLAYER_INIT_TIMEOUT;
    loop {
        if flag_is_true(tab, READY_FLAG)? {
            debug!("terminal player ready");
            return Ok(());
        }
        if Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(READY_POLL_INTERVAL);
    }

    let detail = read_error_flag(tab)?;
    Err(init_failure(&detail))
}

/// Start playback inside the page.
pub fn trigger_playback(tab: &Arc<Tab>) -> CastResult<()> {
    tab.evaluate(&format!("window.{PLAY_HOOK} && window.{PLAY_HOOK}()"), false)
        .map_err(|e| CastError::player(format!("failed to start playback: {e}")))?;
    debug!("playback started");
    Ok(())
}

/// Wait for the page's ended flag. Unbounded: the wait must last exactly as
/// long as the recording, and no duration estimate exists up front. A cast
/// that never ends blocks here forever.
pub fn wait_for_playback_end(tab: &Arc<Tab>) -> CastResult<()> {
    loop {
        if flag_is_true(tab, ENDED_FLAG)? {
            debug!("playback ended");
            return Ok(());
        }
        std::thread::sleep(ENDED_POLL_INTERVAL);
    }
}

/// Replace the tab's document with the composed page. The page text travels
/// as a JSON string literal inside one evaluate call, so it never touches
/// the filesystem or the network.
fn load_page(tab: &Arc<Tab>, html: &str) -> CastResult<()> {
    let literal = serde_json::to_string(html)
        .map_err(|e| CastError::player(format!("failed to encode page content: {e}")))?;
    let expression =
        format!("document.open(); document.write({literal}); document.close(); true");
    tab.evaluate(&expression, false)
        .map_err(|e| CastError::player(format!("failed to load player page: {e}")))?;
    Ok(())
}

/// Forward in-page console output to the process log, for observability
/// while the player initializes.
fn forward_console(tab: &Arc<Tab>) -> CastResult<()> {
    tab.enable_log()
        .map_err(|e| CastError::player(format!("failed to enable page log domain: {e}")))?;
    let _listener = tab
        .add_event_listener(Arc::new(move |event: &Event| {
            if let Event::LogEntryAdded(entry_added) = event {
                let entry = &entry_added.params.entry;
                debug!(target: "cast2mp4::page", "page console: {}", entry.text);
            }
        }))
        .map_err(|e| CastError::player(format!("failed to attach page log listener: {e}")))?;
    Ok(())
}

fn flag_is_true(tab: &Arc<Tab>, flag: &str) -> CastResult<bool> {
    let result = tab
        .evaluate(&format!("window.{flag} === true"), false)
        .map_err(|e| CastError::player(format!("failed to read page flag {flag}: {e}")))?;
    Ok(matches!(result.value, Some(serde_json::Value::Bool(true))))
}

fn read_error_flag(tab: &Arc<Tab>) -> CastResult<String> {
    let result = tab
        .evaluate(&format!("String(window.{ERROR_FLAG} || '')"), false)
        .map_err(|e| CastError::player(format!("failed to read page error flag: {e}")))?;
    match result.value {
        Some(serde_json::Value::String(text)) => Ok(text),
        _ => Ok(String::new()),
    }
}

fn init_failure(detail: &str) -> CastError {
    if detail.is_empty() {
        CastError::player(format!(
            "terminal player failed to initialize within {}s",
            PLAYER_INIT_TIMEOUT.as_secs()
        ))
    } else {
        CastError::player(format!("terminal player failed to initialize: {detail}"))
    }
}

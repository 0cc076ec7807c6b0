use std::sync::{Mutex, OnceLock};

use tracing::warn;

use crate::browser::{SharedBrowser, close_shared};
use crate::error::{CastError, CastResult};

static ACTIVE_BROWSER: OnceLock<Mutex<Option<SharedBrowser>>> = OnceLock::new();

fn active_slot() -> &'static Mutex<Option<SharedBrowser>> {
    ACTIVE_BROWSER.get_or_init(|| Mutex::new(None))
}

/// Scoped interrupt handling for one conversion run.
///
/// The ctrlc crate only supports a single process-wide handler, so the
/// handler itself is installed once and reads a global slot. Arming the
/// guard points the slot at the live browser; dropping it clears the slot on
/// every exit path, so repeated runs in one process never stack handlers and
/// a late signal cannot touch a browser from a finished run.
pub struct SignalGuard {
    _private: (),
}

impl SignalGuard {
    /// Install the process handler (first call only) and arm it with the
    /// browser of the current run.
    pub fn arm(browser: SharedBrowser) -> CastResult<Self> {
        install_handler()?;
        let mut slot = active_slot().lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(browser);
        Ok(Self { _private: () })
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        let mut slot = active_slot().lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}

fn install_handler() -> CastResult<()> {
    static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();
    INSTALLED
        .get_or_init(|| {
            ctrlc::set_handler(|| {
                warn!("interrupted, shutting down");
                let armed = active_slot()
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .take();
                if let Some(browser) = armed {
                    close_shared(browser.as_ref());
                }
                std::process::exit(1);
            })
            .map_err(|e| e.to_string())
        })
        .clone()
        .map_err(|e| CastError::browser(format!("failed to install signal handler: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn is_armed() -> bool {
        active_slot()
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    #[test]
    fn guard_arms_and_disarms_the_slot() {
        let browser: SharedBrowser = Arc::new(Mutex::new(None));
        let guard = SignalGuard::arm(browser).unwrap();
        assert!(is_armed());
        drop(guard);
        assert!(!is_armed());
    }
}

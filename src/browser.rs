use std::ffi::{OsStr, OsString};
use std::sync::{Arc, Mutex};

use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::debug;

use crate::error::{CastError, CastResult};
use crate::options::ParsedOptions;

/// Page dimensions and device-scale factor handed to Chromium.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Viewport {
    /// The numeric options are forwarded unchecked: the NaN sentinel (and
    /// any negative value) casts to 0 here and surfaces downstream, inside
    /// the browser or the encoder.
    pub fn from_options(opts: &ParsedOptions) -> Self {
        Self {
            width: opts.width as u32,
            height: opts.height as u32,
            scale: opts.scale,
        }
    }

    /// Extra Chromium command-line flags for this viewport.
    pub fn chrome_args(&self) -> Vec<OsString> {
        vec![
            OsString::from(format!("--force-device-scale-factor={}", self.scale)),
            OsString::from("--hide-scrollbars"),
            OsString::from("--mute-audio"),
        ]
    }
}

/// The browser handle shared between the orchestrator and the signal
/// handler. Whoever takes the handle out first drops it, which kills the
/// Chromium process; everyone else sees an empty slot.
pub type SharedBrowser = Arc<Mutex<Option<Browser>>>;

/// Take the browser out of the slot and drop it. Returns whether this call
/// was the one that closed it.
pub fn close_shared<T>(slot: &Mutex<Option<T>>) -> bool {
    let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
    guard.take().is_some()
}

/// One headless Chromium instance plus the single page used for rendering.
pub struct BrowserSession {
    browser: SharedBrowser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch headless Chromium sized to the viewport. Sandboxing is
    /// disabled so the browser starts inside containers and other
    /// restricted environments.
    pub fn launch(viewport: Viewport) -> CastResult<Self> {
        let extra_args = viewport.chrome_args();
        let args: Vec<&OsStr> = extra_args.iter().map(OsString::as_os_str).collect();

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((viewport.width, viewport.height)))
            .args(args)
            .build()
            .map_err(|e| CastError::browser(format!("invalid browser launch options: {e}")))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| CastError::browser(format!("failed to launch headless browser: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| CastError::browser(format!("failed to open browser page: {e}")))?;

        debug!(
            width = viewport.width,
            height = viewport.height,
            scale = viewport.scale,
            "headless browser launched"
        );

        Ok(Self {
            browser: Arc::new(Mutex::new(Some(browser))),
            tab,
        })
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Handle to the shared browser slot, for the signal guard.
    pub fn shared_browser(&self) -> SharedBrowser {
        Arc::clone(&self.browser)
    }

    /// Close the browser if it is still open. Idempotent.
    pub fn close(&self) {
        if close_shared(self.browser.as_ref()) {
            debug!("browser closed");
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ParsedOptions, RawOptions};

    fn parsed(width: &str, height: &str, scale: &str) -> ParsedOptions {
        ParsedOptions::from_raw(&RawOptions {
            width: width.to_string(),
            height: height.to_string(),
            scale: scale.to_string(),
            ..RawOptions::default()
        })
    }

    #[test]
    fn viewport_matches_parsed_options() {
        let v = Viewport::from_options(&parsed("1024", "768", "1.5"));
        assert_eq!(
            v,
            Viewport {
                width: 1024,
                height: 768,
                scale: 1.5
            }
        );
    }

    #[test]
    fn nan_dimensions_cast_to_zero() {
        let v = Viewport::from_options(&parsed("wide", "600", "2"));
        assert_eq!(v.width, 0);
        assert_eq!(v.height, 600);
    }

    #[test]
    fn chrome_args_carry_the_scale_factor() {
        let v = Viewport {
            width: 800,
            height: 600,
            scale: 2.0,
        };
        let args = v.chrome_args();
        assert!(args.contains(&OsString::from("--force-device-scale-factor=2")));
    }

    #[test]
    fn close_shared_takes_the_value_exactly_once() {
        struct CountedDrop(Arc<Mutex<u32>>);
        impl Drop for CountedDrop {
            fn drop(&mut self) {
                *self.0.lock().unwrap() += 1;
            }
        }

        let drops = Arc::new(Mutex::new(0));
        let slot = Mutex::new(Some(CountedDrop(Arc::clone(&drops))));

        assert!(close_shared(&slot));
        assert!(!close_shared(&slot));
        assert!(!close_shared(&slot));
        assert_eq!(*drops.lock().unwrap(), 1);
    }
}

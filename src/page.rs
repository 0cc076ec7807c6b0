use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::player_assets::PlayerAssets;

/// Delay between the player's `ended` event and the page-global ended flag.
/// The screencast has to capture the final frame before the recording is
/// judged complete; flipping the flag immediately would truncate it.
pub const POST_ENDED_DELAY_MS: u64 = 1000;

/// Page globals polled over CDP.
pub const READY_FLAG: &str = "__castPlayerReady";
pub const ENDED_FLAG: &str = "__castPlaybackEnded";
pub const ERROR_FLAG: &str = "__castPlayerError";
/// Page hook that starts playback.
pub const PLAY_HOOK: &str = "__castPlay";

/// Embed the raw cast bytes as a base64 data URI so the page needs no
/// network fetch to reach them.
pub fn cast_data_uri(cast: &[u8]) -> String {
    format!("data:application/json;base64,{}", BASE64.encode(cast))
}

/// One self-contained HTML document: player stylesheet and script inline, a
/// centering layout rule, and a bootstrap script that instantiates the
/// player against the cast data URI and exposes the readiness/ended/error
/// flags. Interpolated values are internal to this run; no escaping is done.
pub fn compose_page(assets: &PlayerAssets, cast_data_uri: &str, theme: &str, speed: f64) -> String {
    PAGE_TEMPLATE
        .replace("/*__PLAYER_CSS__*/", &assets.css)
        .replace("/*__PLAYER_JS__*/", &assets.js)
        .replace("__CAST_DATA_URI__", cast_data_uri)
        .replace("__THEME__", theme)
        .replace("__SPEED__", &speed.to_string())
        .replace("__ENDED_DELAY_MS__", &POST_ENDED_DELAY_MS.to_string())
}

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <style>/*__PLAYER_CSS__*/</style>
    <style>
      html, body { height: 100%; width: 100%; margin: 0; padding: 0; background: #121212; }
      #player { height: 100%; display: flex; align-items: center; justify-content: center; }
    </style>
  </head>
  <body>
    <div id="player"></div>
    <script>/*__PLAYER_JS__*/</script>
    <script>
      window.__castPlayerReady = false;
      window.__castPlaybackEnded = false;
      window.__castPlayerError = '';
      try {
        var player = AsciinemaPlayer.create('__CAST_DATA_URI__', document.getElementById('player'), {
          theme: '__THEME__',
          speed: __SPEED__,
          fontSize: 'medium',
          autoPlay: false,
          preload: true,
          fit: 'both'
        });
        player.addEventListener('ended', function () {
          setTimeout(function () { window.__castPlaybackEnded = true; }, __ENDED_DELAY_MS__);
        });
        window.__castPlayer = player;
        window.__castPlay = function () { player.play(); };
        window.__castPlayerReady = true;
      } catch (err) {
        window.__castPlayerError = String(err && err.message ? err.message : err);
      }
    </script>
  </body>
</html>
"#;

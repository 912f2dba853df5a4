//! HTML for the visual surface.
//!
//! The page is meant to be loaded as a transparent browser source on top of
//! a video stream. It is rendered with the current snapshot already applied,
//! then a small script keeps it in sync with `/ws`.

use crate::config::Anchor;
use crate::overlay::OverlayView;

/// Distance from the screen edges, and how far the box slides while hidden.
const INSET: &str = "3rem";

/// How long the browser waits before re-opening a dropped view stream.
const STREAM_RETRY_MS: u64 = 1000;

const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Chat Overlay</title>
<style>
html, body { margin: 0; background: transparent; overflow: hidden; }
#overlay {
  position: fixed;
  __POSITION__
  padding: 1rem 1.5rem;
  font: 700 2.25rem/1.2 system-ui, sans-serif;
  color: #fff;
  background: rgba(0, 0, 0, 0.6);
  border-radius: 0.5rem;
  box-shadow: 0 10px 15px -3px rgba(0, 0, 0, 0.3);
  opacity: 0;
  transform: translateY(__SHIFT__);
  transition: all 150ms cubic-bezier(0.4, 0, 0.2, 1);
}
#overlay.visible { opacity: 1; transform: translateY(0); }
</style>
</head>
<body>
<div id="overlay" data-anchor="__ANCHOR__" class="__CLASS__">__TEXT__</div>
<script>
(function () {
  var el = document.getElementById("overlay");
  function connect() {
    var scheme = location.protocol === "https:" ? "wss://" : "ws://";
    var ws = new WebSocket(scheme + location.host + "/ws");
    ws.onmessage = function (e) {
      var view = JSON.parse(e.data);
      el.textContent = view.text;
      el.classList.toggle("visible", view.visible);
    };
    ws.onclose = function () { setTimeout(connect, __RETRY__); };
  }
  connect();
})();
</script>
</body>
</html>
"#;

/// CSS placement rules for `anchor`.
#[must_use]
pub fn position_css(anchor: Anchor) -> String {
    let (vertical, horizontal) = match anchor {
        Anchor::TopLeft => ("top", "left"),
        Anchor::TopRight => ("top", "right"),
        Anchor::BottomLeft => ("bottom", "left"),
        Anchor::BottomRight => ("bottom", "right"),
    };
    format!("{vertical}: {INSET}; {horizontal}: {INSET};")
}

/// Hidden-state offset: toward the edge the box is pinned to.
fn hidden_shift(anchor: Anchor) -> String {
    if anchor.is_bottom() { INSET.to_string() } else { format!("-{INSET}") }
}

/// Full overlay page with `view` pre-applied.
#[must_use]
pub fn overlay_page(view: &OverlayView, anchor: Anchor) -> String {
    PAGE.replace("__POSITION__", &position_css(anchor))
        .replace("__SHIFT__", &hidden_shift(anchor))
        .replace("__ANCHOR__", anchor.as_str())
        .replace("__CLASS__", if view.visible { "visible" } else { "" })
        .replace("__RETRY__", &STREAM_RETRY_MS.to_string())
        .replace("__TEXT__", &escape_html(&view.text))
}

/// Escape text for use inside an HTML element.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

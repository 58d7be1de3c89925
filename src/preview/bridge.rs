//! Instrumentation bridge injected into compiled previews
//!
//! The script wraps `console.log/warn/error/info` so each call still reaches the real
//! console and is also posted to the hosting document as a labeled console message.
//! Uncaught errors and unhandled rejections are funneled through `console.error`.

use crate::sandbox::{MESSAGE_TYPE, UNSERIALIZABLE_PLACEHOLDER};
use regex::Regex;
use std::sync::OnceLock;

const BRIDGE_TEMPLATE: &str = r#"<script data-webpad-bridge>
(function () {
  var TYPE = "__TYPE__";
  var PLACEHOLDER = "__PLACEHOLDER__";
  function serialize(value) {
    if (value instanceof Error) {
      return value.name + ": " + value.message;
    }
    if (value === undefined) {
      return "undefined";
    }
    if (typeof value === "function" || typeof value === "symbol" || typeof value === "bigint") {
      return String(value);
    }
    try {
      return JSON.parse(JSON.stringify(value));
    } catch (e) {
      return PLACEHOLDER;
    }
  }
  function forward(channel, args) {
    try {
      var payload = [];
      for (var i = 0; i < args.length; i++) {
        payload.push(serialize(args[i]));
      }
      window.parent.postMessage(
        { type: TYPE, channel: channel, timestamp: Date.now(), payload: payload },
        "*"
      );
    } catch (e) {}
  }
  ["log", "warn", "error", "info"].forEach(function (channel) {
    var original = console[channel];
    console[channel] = function () {
      if (original) {
        original.apply(console, arguments);
      }
      forward(channel, arguments);
    };
  });
  window.addEventListener("error", function (event) {
    var where = event.filename ? " (" + event.filename + ":" + event.lineno + ")" : "";
    console.error((event.message || "Uncaught error") + where);
  });
  window.addEventListener("unhandledrejection", function (event) {
    console.error("Unhandled promise rejection:", serialize(event.reason));
  });
})();
</script>
"#;

/// The bridge `<script>` element
pub fn bridge_script() -> &'static str {
    static SCRIPT: OnceLock<String> = OnceLock::new();
    SCRIPT.get_or_init(|| {
        BRIDGE_TEMPLATE
            .replace("__TYPE__", MESSAGE_TYPE)
            .replace("__PLACEHOLDER__", UNSERIALIZABLE_PLACEHOLDER)
    })
}

fn head_close_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)</head\s*>").expect("head close pattern is valid"))
}

fn head_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("head open pattern is valid")
    })
}

/// Insert the bridge immediately before the first `</head>`.
///
/// Returns the markup unchanged (and `false`) when there is no closing head tag.
pub fn inject_bridge(html: &str) -> (String, bool) {
    match head_close_pattern().find(html) {
        Some(close) => {
            let mut out = String::with_capacity(html.len() + bridge_script().len());
            out.push_str(&html[..close.start()]);
            out.push_str(bridge_script());
            out.push_str(&html[close.start()..]);
            (out, true)
        }
        None => (html.to_string(), false),
    }
}

/// Content-Security-Policy used when external resources are not allowed
pub const LOCAL_ONLY_POLICY: &str = "default-src 'none'; script-src 'unsafe-inline' 'unsafe-eval' data:; style-src 'unsafe-inline' data:; img-src data: blob:; font-src data:; media-src data: blob:";

/// Insert a local-only CSP `<meta>` right after the opening `<head>` tag
pub fn inject_local_only_policy(html: &str) -> String {
    match head_open_pattern().find(html) {
        Some(open) => format!(
            "{}<meta http-equiv=\"Content-Security-Policy\" content=\"{}\">{}",
            &html[..open.end()],
            LOCAL_ONLY_POLICY,
            &html[open.end()..]
        ),
        None => html.to_string(),
    }
}

//! Widget resource catalog.
//!
//! UI-capable clients resolve the `ui://widget/...` URIs referenced by the
//! dispatcher's rendering hints through `resources/read`. The template is a
//! static HTML shell; clients that cannot render it always have the textual
//! fallback in the tool result.

use serde_json::json;

use crate::tools::catalog::{DETAIL_WIDGET_URI, LIST_WIDGET_URI};

/// Mime type ChatGPT expects for widget templates.
const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

/// Static widget shell. Renders the `structuredContent` payload the host
/// injects into the frame.
const WIDGET_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<style>
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 0; padding: 16px; }
.entry { border: 1px solid #eee; border-radius: 8px; padding: 12px; margin-bottom: 8px; }
.entry h3 { margin: 0 0 4px; font-size: 15px; }
.entry .meta { color: #666; font-size: 13px; }
pre { white-space: pre-wrap; font-family: inherit; }
</style>
</head>
<body>
<div id="root"></div>
<script>
(function () {
  var data = (window.openai && window.openai.toolOutput) || {};
  var root = document.getElementById("root");
  var items = Array.isArray(data.data) ? data.data : [data];
  items.forEach(function (t) {
    if (!t || typeof t !== "object") { return; }
    var el = document.createElement("div");
    el.className = "entry";
    var title = t.video_title || ("Transcription #" + (t.id != null ? t.id : "?"));
    var meta = [t.platform, t.language, t.created_at].filter(Boolean).join(" · ");
    el.innerHTML = "<h3></h3><div class='meta'></div><pre></pre>";
    el.querySelector("h3").textContent = title;
    el.querySelector(".meta").textContent = meta;
    el.querySelector("pre").textContent = t.transcription || "";
    root.appendChild(el);
  });
})();
</script>
</body>
</html>"#;

/// `resources/list` payload.
#[must_use]
pub fn list_resources() -> serde_json::Value {
    json!({
        "resources": [
            {
                "uri": LIST_WIDGET_URI,
                "name": "Transcription List UI",
                "description": "Interactive list of transcriptions",
                "mimeType": WIDGET_MIME_TYPE,
                "_meta": {
                    "openai/outputTemplate": LIST_WIDGET_URI,
                    "openai/widgetAccessible": true
                }
            },
            {
                "uri": DETAIL_WIDGET_URI,
                "name": "Transcription Detail UI",
                "description": "Detailed view of a single transcription",
                "mimeType": WIDGET_MIME_TYPE,
                "_meta": {
                    "openai/outputTemplate": DETAIL_WIDGET_URI,
                    "openai/widgetAccessible": true
                }
            }
        ]
    })
}

/// `resources/templates/list` payload.
#[must_use]
pub fn list_resource_templates() -> serde_json::Value {
    json!({
        "resourceTemplates": [
            {
                "uriTemplate": LIST_WIDGET_URI,
                "name": "Transcription List UI",
                "description": "Interactive list of transcriptions",
                "mimeType": WIDGET_MIME_TYPE,
                "_meta": {
                    "openai/outputTemplate": LIST_WIDGET_URI,
                    "openai/widgetAccessible": true
                }
            }
        ]
    })
}

/// `resources/read` payload, or `None` for an unknown URI.
#[must_use]
pub fn read_resource(uri: &str) -> Option<serde_json::Value> {
    if uri != LIST_WIDGET_URI && uri != DETAIL_WIDGET_URI {
        return None;
    }

    Some(json!({
        "contents": [
            {
                "uri": uri,
                "mimeType": WIDGET_MIME_TYPE,
                "text": WIDGET_TEMPLATE,
                "_meta": {
                    "openai/outputTemplate": uri,
                    "openai/widgetAccessible": true
                }
            }
        ]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_covers_both_widgets() {
        let list = list_resources();
        let uris: Vec<&str> = list["resources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["uri"].as_str().unwrap())
            .collect();
        assert_eq!(uris, vec![LIST_WIDGET_URI, DETAIL_WIDGET_URI]);
    }

    #[test]
    fn test_read_known_and_unknown() {
        assert!(read_resource(LIST_WIDGET_URI).is_some());
        assert!(read_resource(DETAIL_WIDGET_URI).is_some());
        assert!(read_resource("ui://widget/nope.html").is_none());
    }

    #[test]
    fn test_read_serves_template() {
        let contents = read_resource(LIST_WIDGET_URI).unwrap();
        let text = contents["contents"][0]["text"].as_str().unwrap();
        assert!(text.contains("<!DOCTYPE html>"));
        assert_eq!(contents["contents"][0]["mimeType"], WIDGET_MIME_TYPE);
    }
}

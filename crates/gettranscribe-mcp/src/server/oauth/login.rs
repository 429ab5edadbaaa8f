//! HTML authorization page.
//!
//! The user pastes their GetTranscribe API key here; submitting the form
//! issues the authorization code that later carries the key into a token.

/// Render the authorization page.
///
/// All parameters are HTML-escaped to prevent XSS.
#[must_use]
pub fn render_authorize_page(
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    response_type: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>GetTranscribe MCP Authorization</title>
<style>
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; padding: 40px; background: #f5f5f5; }}
.container {{ max-width: 400px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
h1 {{ color: #6942e2; margin-bottom: 20px; }}
.info {{ background: #f0f0f0; padding: 15px; border-radius: 4px; margin-bottom: 20px; }}
input, button {{ width: 100%; padding: 12px; margin: 8px 0; border: 1px solid #ddd; border-radius: 4px; font-size: 16px; box-sizing: border-box; }}
button {{ background: #6942e2; color: white; border: none; cursor: pointer; }}
button:hover {{ background: #5a38c7; }}
.hint {{ font-size: 12px; color: #666; text-align: center; }}
</style>
</head>
<body>
<div class="container">
<h1>GetTranscribe MCP</h1>
<div class="info">
<strong>{client_id}</strong> wants to access your GetTranscribe account to search and fetch video transcriptions.
</div>
<form method="POST" action="/oauth/authorize">
<input type="hidden" name="client_id" value="{client_id}">
<input type="hidden" name="redirect_uri" value="{redirect_uri}">
<input type="hidden" name="state" value="{state}">
<input type="hidden" name="response_type" value="{response_type}">
<label for="api_key">Your GetTranscribe API Key:</label>
<input type="password" id="api_key" name="api_key" placeholder="gtr_..." required autofocus>
<button type="submit">Authorize Access</button>
</form>
<p class="hint">Get your API key from <a href="https://www.gettranscribe.ai" target="_blank">gettranscribe.ai</a></p>
</div>
</body>
</html>"#,
        client_id = html_escape(client_id),
        redirect_uri = html_escape(redirect_uri),
        state = html_escape(state),
        response_type = html_escape(response_type),
    )
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("xss")</script>"#),
            "&lt;script&gt;alert(&quot;xss&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_render_escapes_parameters() {
        let html = render_authorize_page(
            r#""><script>"#,
            "https://chatgpt.com/cb",
            "st4te",
            "code",
        );
        assert!(!html.contains("<script>"));
        assert!(html.contains("st4te"));
        assert!(html.contains("https://chatgpt.com/cb"));
    }
}

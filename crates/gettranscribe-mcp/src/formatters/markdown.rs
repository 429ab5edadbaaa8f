//! Markdown rendering of transcription payloads, and the inverse scraper.
//!
//! The upstream `list_transcriptions` endpoint historically returns
//! pre-formatted markdown rather than JSON. `parse_search_results` scrapes
//! that format back into structured records for the `search` adapter. This is
//! a fragile seam: it must track the upstream's text layout, entry by entry.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// One structured result recovered for the `search` tool.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchResultEntry {
    pub id: String,
    pub title: String,
    pub url: String,
}

fn entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // **1. ID: 42** (youtube) ... 🔗 https://example/v
        Regex::new(r"(?s)\*\*\d+\. ID: (\d+)\*\* \(([^)]+)\).*?🔗 ([^\n]+)")
            .expect("valid entry regex")
    })
}

/// Scrape formatted transcription-list text into structured search results.
///
/// Entries missing a URL line are skipped. Truncated URLs (trailing `...`)
/// fall back to the canonical transcription URL.
#[must_use]
pub fn parse_search_results(text: &str, api_url: &str) -> Vec<SearchResultEntry> {
    entry_regex()
        .captures_iter(text)
        .map(|caps| {
            let id = caps[1].to_string();
            let platform = caps[2].to_string();
            let raw_url = caps[3].trim();

            let url = if raw_url.ends_with("...") {
                format!("{api_url}/transcriptions/{id}")
            } else {
                raw_url.to_string()
            };

            SearchResultEntry { title: format!("{platform} Transcription {id}"), id, url }
        })
        .collect()
}

/// Render a structured transcription list as a markdown summary.
#[must_use]
pub fn format_transcription_list(data: &serde_json::Value) -> String {
    let Some(items) = data.get("data").and_then(|d| d.as_array()).filter(|a| !a.is_empty())
    else {
        return "No transcriptions found.\n\nCreate one by sharing a video URL!".to_string();
    };

    let total = data.get("total").and_then(|t| t.as_u64()).unwrap_or(items.len() as u64);
    let mut output = format!("**Your Transcriptions** ({total} total)\n\n");

    for (index, item) in items.iter().enumerate() {
        let id = item.get("id").map(|v| v.to_string().trim_matches('"').to_string());
        let platform = item.get("platform").and_then(|v| v.as_str()).unwrap_or("unknown");

        output.push_str(&format!(
            "**{}. ID: {}** ({platform})\n",
            index + 1,
            id.unwrap_or_else(|| "?".to_string())
        ));

        if let Some(title) = item.get("video_title").and_then(|v| v.as_str()) {
            output.push_str(&format!("   {title}\n"));
        }
        if let Some(language) = item.get("language").and_then(|v| v.as_str()) {
            output.push_str(&format!("   Language: {}\n", language.to_uppercase()));
        }
        if let Some(created) = item.get("created_at").and_then(|v| v.as_str()) {
            output.push_str(&format!("   Created: {created}\n"));
        }
        if let Some(url) = item.get("video_url").and_then(|v| v.as_str()) {
            output.push_str(&format!("   🔗 {url}\n"));
        }
        if let Some(text) = item.get("transcription").and_then(|v| v.as_str()) {
            let preview: String = text.chars().take(100).collect();
            let ellipsis = if text.chars().count() > 100 { "..." } else { "" };
            output.push_str(&format!("   \"{preview}{ellipsis}\"\n"));
        }
        output.push('\n');
    }

    output
}

/// Render a single structured transcription as a markdown summary.
#[must_use]
pub fn format_transcription_detail(data: &serde_json::Value) -> String {
    let id = data.get("id").map(|v| v.to_string().trim_matches('"').to_string());
    let mut output =
        format!("**Transcription #{}**\n\n", id.unwrap_or_else(|| "?".to_string()));

    if let Some(platform) = data.get("platform").and_then(|v| v.as_str()) {
        output.push_str(&format!("**Platform:** {platform}\n"));
    }
    if let Some(duration) = data.get("duration").and_then(|v| v.as_u64()) {
        output.push_str(&format!("**Duration:** {}:{:02}\n", duration / 60, duration % 60));
    }
    if let Some(words) = data.get("word_count").and_then(|v| v.as_u64()) {
        output.push_str(&format!("**Word Count:** {words}\n"));
    }
    if let Some(language) = data.get("language").and_then(|v| v.as_str()) {
        output.push_str(&format!("**Language:** {}\n", language.to_uppercase()));
    }
    if let Some(created) = data.get("created_at").and_then(|v| v.as_str()) {
        output.push_str(&format!("**Created:** {created}\n"));
    }
    if let Some(text) = data.get("transcription").and_then(|v| v.as_str()) {
        output.push_str(&format!("\n**Transcription:**\n{text}\n"));
    }
    if let Some(url) = data.get("video_url").and_then(|v| v.as_str()) {
        output.push_str(&format!("\n**URL:** {url}"));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "🎥 **Your Transcriptions** (2 total)\n\n\
        **1. ID: 42** (youtube) 🎥\n   📝 Cat video\n   🌐 Language: EN\
        \n   📅 Created: 1/2/2024\n   🔗 https://youtube.com/watch?v=abc\n\n\
        **2. ID: 43** (tiktok) 🎵\n   📅 Created: 1/3/2024\n   🔗 https://tiktok.com/v/xyz...\n";

    #[test]
    fn test_parse_two_entries() {
        let results = parse_search_results(SAMPLE, "https://api.gettranscribe.ai");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "42");
        assert_eq!(results[0].title, "youtube Transcription 42");
        assert_eq!(results[0].url, "https://youtube.com/watch?v=abc");
    }

    #[test]
    fn test_parse_truncated_url_uses_canonical() {
        let results = parse_search_results(SAMPLE, "https://api.gettranscribe.ai");
        assert_eq!(results[1].url, "https://api.gettranscribe.ai/transcriptions/43");
    }

    #[test]
    fn test_parse_no_entries() {
        assert!(parse_search_results("📋 No transcriptions found.", "https://x").is_empty());
    }

    #[test]
    fn test_format_list_empty() {
        let summary = format_transcription_list(&serde_json::json!({"data": [], "total": 0}));
        assert!(summary.contains("No transcriptions found"));
    }

    #[test]
    fn test_format_list_roundtrips_through_scraper() {
        let data = serde_json::json!({
            "total": 1,
            "data": [{
                "id": 7,
                "platform": "instagram",
                "video_url": "https://instagram.com/reel/xyz",
                "created_at": "2024-01-02"
            }]
        });
        let text = format_transcription_list(&data);
        let results = parse_search_results(&text, "https://api.gettranscribe.ai");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "7");
    }

    #[test]
    fn test_format_detail() {
        let data = serde_json::json!({
            "id": 7,
            "platform": "youtube",
            "duration": 125,
            "language": "en",
            "transcription": "hello world"
        });
        let text = format_transcription_detail(&data);
        assert!(text.contains("Transcription #7"));
        assert!(text.contains("**Duration:** 2:05"));
        assert!(text.contains("**Language:** EN"));
        assert!(text.contains("hello world"));
    }
}

//! MCP tool surface: catalog, result shapes, and dispatch.

pub mod catalog;
pub mod dispatch;

pub use catalog::{definitions, ToolDefinition};
pub use dispatch::{Dispatcher, TransportKind};

use serde::Serialize;

/// The closed set of tools this server exposes.
///
/// Adding or removing a tool is a compile-time-checked change: dispatch
/// matches exhaustively on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    CreateTranscription,
    GetTranscription,
    ListTranscriptions,
    CreateTranscriptionFolder,
    GetTranscriptionFolder,
    ListTranscriptionFolders,
    /// Adapter required by ChatGPT connectors: fixed `{results: [...]}` shape.
    Search,
    /// Adapter required by ChatGPT connectors: fixed single-document shape.
    Fetch,
}

impl ToolName {
    /// Wire name of the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTranscription => "create_transcription",
            Self::GetTranscription => "get_transcription",
            Self::ListTranscriptions => "list_transcriptions",
            Self::CreateTranscriptionFolder => "create_transcription_folder",
            Self::GetTranscriptionFolder => "get_transcription_folder",
            Self::ListTranscriptionFolders => "list_transcription_folders",
            Self::Search => "search",
            Self::Fetch => "fetch",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "create_transcription" => Some(Self::CreateTranscription),
            "get_transcription" => Some(Self::GetTranscription),
            "list_transcriptions" => Some(Self::ListTranscriptions),
            "create_transcription_folder" => Some(Self::CreateTranscriptionFolder),
            "get_transcription_folder" => Some(Self::GetTranscriptionFolder),
            "list_transcription_folders" => Some(Self::ListTranscriptionFolders),
            "search" => Some(Self::Search),
            "fetch" => Some(Self::Fetch),
            _ => None,
        }
    }

    /// All tools, in catalog order.
    pub const ALL: [Self; 8] = [
        Self::CreateTranscription,
        Self::GetTranscription,
        Self::ListTranscriptions,
        Self::CreateTranscriptionFolder,
        Self::GetTranscriptionFolder,
        Self::ListTranscriptionFolders,
        Self::Search,
        Self::Fetch,
    ];
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One content block of a tool result.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ContentItem {
    /// Text content block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self { kind: "text", text: text.into() }
    }
}

/// Result of a tool call, serialized into the JSON-RPC `result` field.
///
/// Authentication and upstream failures are represented here with
/// `is_error: true` rather than as protocol faults.
#[derive(Debug, Clone, Serialize)]
pub struct CallToolResult {
    pub content: Vec<ContentItem>,

    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,

    /// Rendering hints for UI-capable clients. Additive only: the textual
    /// content above is always a complete fallback.
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,

    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Successful text-only result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(text)],
            structured_content: None,
            meta: None,
            is_error: false,
        }
    }

    /// Error result with a human-readable message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            structured_content: None,
            meta: None,
            is_error: true,
        }
    }

    /// Serialize into the JSON-RPC result payload.
    #[must_use]
    pub fn into_json(self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "content": [{"type": "text", "text": "Internal serialization error"}],
                "isError": true
            })
        })
    }
}

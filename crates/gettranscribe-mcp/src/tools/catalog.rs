//! Tool catalog: names, descriptions, and input schemas.
//!
//! Returned verbatim on `tools/list` for every transport.

use serde_json::json;

use super::ToolName;

/// Widget template served for transcription lists.
pub const LIST_WIDGET_URI: &str = "ui://widget/transcription-list.html";

/// Widget template served for a single transcription.
pub const DETAIL_WIDGET_URI: &str = "ui://widget/transcription-detail.html";

/// A catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub name: ToolName,
}

impl ToolDefinition {
    /// Tool description for the LLM.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self.name {
            ToolName::CreateTranscription => {
                "Create a transcription from a video URL (YouTube, Instagram, TikTok, Meta). \
                 Optionally place it in a folder, guide it with a prompt, or force a language."
            }
            ToolName::GetTranscription => {
                "Get a single transcription by ID, including its full text."
            }
            ToolName::ListTranscriptions => {
                "List transcriptions, optionally filtered by folder or platform, with pagination."
            }
            ToolName::CreateTranscriptionFolder => {
                "Create a folder for organizing transcriptions, optionally nested under a parent."
            }
            ToolName::GetTranscriptionFolder => "Get a transcription folder by ID.",
            ToolName::ListTranscriptionFolders => {
                "List transcription folders, optionally under a parent folder, with pagination."
            }
            ToolName::Search => {
                "Search for transcriptions. Returns a list of results with id, title and url."
            }
            ToolName::Fetch => {
                "Fetch the full content of a single transcription search result by id."
            }
        }
    }

    /// JSON Schema for the tool's input.
    #[must_use]
    pub fn input_schema(&self) -> serde_json::Value {
        match self.name {
            ToolName::CreateTranscription => json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "Video URL to transcribe"
                    },
                    "folder_id": {
                        "type": "integer",
                        "description": "Folder to place the transcription in"
                    },
                    "prompt": {
                        "type": "string",
                        "description": "Optional prompt guiding the transcription"
                    },
                    "language": {
                        "type": "string",
                        "description": "Force a transcription language (ISO 639-1)"
                    },
                    "include_segments": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include timestamped segments in the response"
                    }
                },
                "required": ["url"]
            }),
            ToolName::GetTranscription => json!({
                "type": "object",
                "properties": {
                    "transcription_id": {
                        "type": "integer",
                        "description": "Transcription ID"
                    }
                },
                "required": ["transcription_id"]
            }),
            ToolName::ListTranscriptions => json!({
                "type": "object",
                "properties": {
                    "folder_id": {
                        "type": "integer",
                        "description": "Only list transcriptions in this folder"
                    },
                    "platform": {
                        "type": "string",
                        "enum": ["youtube", "instagram", "tiktok", "meta"],
                        "description": "Only list transcriptions from this platform"
                    },
                    "limit": {
                        "type": "integer",
                        "default": 10,
                        "description": "Maximum number of transcriptions to return"
                    },
                    "skip": {
                        "type": "integer",
                        "default": 0,
                        "description": "Number of transcriptions to skip"
                    }
                }
            }),
            ToolName::CreateTranscriptionFolder => json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Folder name"
                    },
                    "parent_id": {
                        "type": "integer",
                        "description": "Parent folder ID for nesting"
                    }
                },
                "required": ["name"]
            }),
            ToolName::GetTranscriptionFolder => json!({
                "type": "object",
                "properties": {
                    "folder_id": {
                        "type": "integer",
                        "description": "Folder ID"
                    }
                },
                "required": ["folder_id"]
            }),
            ToolName::ListTranscriptionFolders => json!({
                "type": "object",
                "properties": {
                    "parent_id": {
                        "type": "integer",
                        "description": "Only list folders under this parent"
                    },
                    "limit": {
                        "type": "integer",
                        "default": 10,
                        "description": "Maximum number of folders to return"
                    },
                    "skip": {
                        "type": "integer",
                        "default": 0,
                        "description": "Number of folders to skip"
                    }
                }
            }),
            ToolName::Search => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
            ToolName::Fetch => json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "Transcription ID returned by search"
                    }
                },
                "required": ["id"]
            }),
        }
    }

    /// Serialize as a `tools/list` entry.
    #[must_use]
    pub fn to_list_entry(&self) -> serde_json::Value {
        json!({
            "name": self.name.as_str(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }
}

/// The fixed tool catalog.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    ToolName::ALL.into_iter().map(|name| ToolDefinition { name }).collect()
}

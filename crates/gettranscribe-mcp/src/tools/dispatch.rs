//! Tool dispatch: maps a tool name + arguments + resolved credential to an
//! upstream call and repackages the response.
//!
//! Dispatch never surfaces a transport-level fault for an authentication or
//! upstream failure; every such path returns a `CallToolResult` with
//! `is_error: true` and a human-readable message.

use serde_json::json;

use crate::auth::Credential;
use crate::client::{GetTranscribeClient, UpstreamToolResponse};
use crate::error::{ToolError, ToolResult};
use crate::formatters::{
    format_transcription_detail, format_transcription_list, parse_search_results,
};

use super::catalog::{DETAIL_WIDGET_URI, LIST_WIDGET_URI};
use super::{CallToolResult, ContentItem, ToolName};

/// Default page size for the `search` adapter's underlying list call.
const SEARCH_PAGE_SIZE: u64 = 10;

/// Which transport the call arrived on, used to word the remediation message
/// when no credential resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Stateless HTTP or legacy SSE: the caller can send headers.
    Http,
    /// Stdio: only the environment default is possible.
    Stdio,
}

impl TransportKind {
    fn missing_credential_hint(self) -> &'static str {
        match self {
            Self::Http => {
                "Provide an x-api-key header (or an Authorization: Bearer token) when calling \
                 the MCP endpoint, or set the GETTRANSCRIBE_API_KEY environment variable on \
                 the server."
            }
            Self::Stdio => "Set the GETTRANSCRIBE_API_KEY environment variable.",
        }
    }
}

/// Stateless tool dispatcher.
///
/// Holds only the upstream client; all per-call state (credential, arguments)
/// lives in the arguments of [`Dispatcher::dispatch`], so one instance can
/// serve concurrent callers without leaking state between them.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: GetTranscribeClient,
}

impl Dispatcher {
    #[must_use]
    pub fn new(client: GetTranscribeClient) -> Self {
        Self { client }
    }

    /// Execute a tool call.
    ///
    /// Always produces a result, never an error: failures are folded into
    /// `is_error` results with remediation text.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Value,
        credential: Option<&Credential>,
        transport: TransportKind,
    ) -> CallToolResult {
        match self.execute(name, arguments, credential, transport).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool call failed");
                CallToolResult::error(e.to_user_message())
            }
        }
    }

    async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
        credential: Option<&Credential>,
        transport: TransportKind,
    ) -> ToolResult<CallToolResult> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolError::UnknownTool(name.into()))?;

        let Some(credential) = credential else {
            return Err(ToolError::MissingCredential {
                hint: transport.missing_credential_hint().to_string(),
            });
        };

        tracing::info!(tool = %tool, source = ?credential.source, "Dispatching tool");

        match tool {
            ToolName::Search => self.search(arguments, &credential.api_key).await,
            ToolName::Fetch => self.fetch(arguments, &credential.api_key).await,
            forwarded => self.forward(forwarded, arguments, &credential.api_key).await,
        }
    }

    /// `search(query)` adapter: invoked upstream as `list_transcriptions`,
    /// then the formatted text response is scraped back into the fixed
    /// `{results: [{id, title, url}]}` shape ChatGPT connectors require.
    async fn search(
        &self,
        arguments: serde_json::Value,
        api_key: &str,
    ) -> ToolResult<CallToolResult> {
        let mut list_args = json!({ "limit": SEARCH_PAGE_SIZE });
        if let (Some(target), Some(source)) = (list_args.as_object_mut(), arguments.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }

        let response = self
            .client
            .call_tool(api_key, ToolName::ListTranscriptions.as_str(), &list_args)
            .await?;

        let results = parse_search_results(response.first_text(), self.client.api_url());

        Ok(CallToolResult::text(json!({ "results": results }).to_string()))
    }

    /// `fetch(id)` adapter: invoked upstream as `get_transcription`, result
    /// repackaged into the fixed `{id, title, text, url, metadata}` shape.
    async fn fetch(
        &self,
        arguments: serde_json::Value,
        api_key: &str,
    ) -> ToolResult<CallToolResult> {
        let id = arguments
            .get("id")
            .and_then(|v| {
                v.as_str().map(str::to_string).or_else(|| v.as_i64().map(|n| n.to_string()))
            })
            .ok_or_else(|| ToolError::validation("id", "missing or not a string"))?;

        let transcription_id: i64 = id
            .trim()
            .parse()
            .map_err(|_| ToolError::validation("id", "must be a numeric transcription ID"))?;

        let response = self
            .client
            .call_tool(
                api_key,
                ToolName::GetTranscription.as_str(),
                &json!({ "transcription_id": transcription_id }),
            )
            .await?;

        let document = json!({
            "id": id,
            "title": format!("Transcription {id}"),
            "text": response.first_text(),
            "url": format!("{}/transcriptions/{id}", self.client.api_url()),
            "metadata": { "source": "gettranscribe_mcp" }
        });

        Ok(CallToolResult::text(document.to_string()))
    }

    /// Forward a catalog tool unchanged, attaching widget rendering hints
    /// when the upstream returned structured data.
    async fn forward(
        &self,
        tool: ToolName,
        arguments: serde_json::Value,
        api_key: &str,
    ) -> ToolResult<CallToolResult> {
        let response = self.client.call_tool(api_key, tool.as_str(), &arguments).await?;

        if matches!(tool, ToolName::ListTranscriptions | ToolName::GetTranscription) {
            if let Some(structured) = structured_payload(&response) {
                return Ok(augment_with_widget(tool, structured));
            }
            tracing::debug!(tool = %tool, "Upstream returned formatted text, passing through");
        }

        Ok(pass_through(response))
    }
}

/// Structured data from an upstream response: an explicit
/// `structuredContent` field, or a text block that parses as a JSON object.
fn structured_payload(response: &UpstreamToolResponse) -> Option<serde_json::Value> {
    if response.is_error {
        return None;
    }
    if let Some(structured) = &response.structured_content {
        return Some(structured.clone());
    }
    serde_json::from_str::<serde_json::Value>(response.first_text())
        .ok()
        .filter(serde_json::Value::is_object)
}

/// Build a widget-augmented result: markdown summary as the text fallback,
/// the structured payload, and rendering hints. Additive only.
fn augment_with_widget(tool: ToolName, structured: serde_json::Value) -> CallToolResult {
    let is_list = tool == ToolName::ListTranscriptions;

    let summary = if is_list {
        format_transcription_list(&structured)
    } else {
        format_transcription_detail(&structured)
    };

    let meta = json!({
        "openai/outputTemplate": if is_list { LIST_WIDGET_URI } else { DETAIL_WIDGET_URI },
        "openai/toolInvocation/invoking":
            if is_list { "Loading transcriptions" } else { "Loading transcription" },
        "openai/toolInvocation/invoked":
            if is_list { "Transcriptions loaded" } else { "Transcription loaded" },
        "openai/widgetAccessible": true,
        "openai/resultCanProduceWidget": true
    });

    CallToolResult {
        content: vec![ContentItem::text(summary)],
        structured_content: Some(structured),
        meta: Some(meta),
        is_error: false,
    }
}

/// Convert an upstream response into a tool result without reshaping it.
fn pass_through(response: UpstreamToolResponse) -> CallToolResult {
    CallToolResult {
        content: response.content.into_iter().map(|b| ContentItem::text(b.text)).collect(),
        structured_content: response.structured_content,
        meta: None,
        is_error: response.is_error,
    }
}

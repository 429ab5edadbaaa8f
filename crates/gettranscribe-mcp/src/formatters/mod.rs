//! Output formatting helpers.

pub mod markdown;

pub use markdown::{
    format_transcription_detail, format_transcription_list, parse_search_results,
    SearchResultEntry,
};

//! Answer modes and the display payloads produced for each of them.

use crate::citation::SourceCitation;
use docchat_core::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user wants from the document collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Locate the documents that match the input
    #[default]
    DocumentSearch,

    /// Answer a question from the documents
    Inquiry,
}

impl Mode {
    /// All modes in the order they are offered to the user.
    pub const ALL: [Mode; 2] = [Mode::DocumentSearch, Mode::Inquiry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentSearch => "document_search",
            Self::Inquiry => "inquiry",
        }
    }

    /// Label of the mode selector option.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DocumentSearch => "Company document search",
            Self::Inquiry => "Internal inquiry",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DocumentSearch => {
                "Find where the internal documents related to your input are."
            }
            Self::Inquiry => {
                "Get answers to questions and requests based on internal documents."
            }
        }
    }

    pub fn example(&self) -> &'static str {
        match self {
            Self::DocumentSearch => "Minutes of the meeting on the employee training policy",
            Self::Inquiry => "List the employees who belong to the HR department",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "document_search" | "search" | "1" => Ok(Self::DocumentSearch),
            "inquiry" | "2" => Ok(Self::Inquiry),
            other => Err(AppError::Config(format!(
                "Unknown mode: {}. Supported: document_search, inquiry",
                other
            ))),
        }
    }
}

/// An assistant turn, shaped for display according to its mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AssistantPayload {
    DocumentSearch(DocumentSearchPayload),
    Inquiry(InquiryPayload),
}

impl AssistantPayload {
    pub fn mode(&self) -> Mode {
        match self {
            Self::DocumentSearch(_) => Mode::DocumentSearch,
            Self::Inquiry(_) => Mode::Inquiry,
        }
    }

    /// The generated answer text, whatever the shape.
    pub fn answer_text(&self) -> &str {
        match self {
            Self::DocumentSearch(DocumentSearchPayload::Found(hit)) => &hit.main_message,
            Self::DocumentSearch(DocumentSearchPayload::NoFileFound(miss)) => &miss.answer,
            Self::Inquiry(inquiry) => &inquiry.answer,
        }
    }
}

/// Document-search result: either a primary hit with optional secondary
/// citations, or a plain answer when no file could be pointed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentSearchPayload {
    Found(DocumentHit),
    NoFileFound(NoFileFound),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentHit {
    pub main_message: String,
    pub main_file_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_page_number: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_message: Option<String>,

    #[serde(default)]
    pub sub_choices: Vec<SourceCitation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoFileFound {
    /// Always set; marks the payload as having no file to point at
    #[serde(default = "flag_set")]
    pub no_file_path_flg: bool,

    pub answer: String,
}

impl NoFileFound {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            no_file_path_flg: true,
            answer: answer.into(),
        }
    }
}

fn flag_set() -> bool {
    true
}

/// Inquiry result: the answer plus the documents it was based on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InquiryPayload {
    pub answer: String,

    /// Caption shown above the file list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_info_list: Option<Vec<FileInfo>>,
}

/// One entry of an inquiry's file list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileInfo {
    /// Preformatted reference, e.g. `handbook.pdf (p.3)`
    Text(String),

    /// Structured reference
    Source(SourceCitation),
}

//! View model of the chat page.
//!
//! Turns the session's display log into chat bubbles made of a few widget
//! kinds. Rendering only reads the log; it never changes session state.

use docchat_core::Role;
use docchat_rag::{
    AssistantPayload, ConversationTurn, DocumentSearchPayload, FileInfo, InquiryPayload, Mode,
    SourceCitation,
};
use serde::Serialize;

/// Page title.
pub const APP_NAME: &str = "Company Document Assistant";

/// Label of the mode selector.
pub const MODE_LABEL: &str = "Choose what you want to do";

pub const GREETING: &str = "Hello. I am a chatbot that answers from the information in \
     internal documents. Choose a purpose in the sidebar, then send a message from the \
     chat box at the bottom of the screen.";

pub const GREETING_HINT: &str = "Specific questions tend to get the answers you expect.";

/// Appended to every error shown to the user.
pub const COMMON_ERROR_MESSAGE: &str =
    "If this problem persists, please contact the administrator.";

/// Suffix marking a page reference inside a preformatted citation.
const PAGE_SUFFIX_START: &str = " (p.";

/// One display element of a chat bubble.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Markdown { text: String },
    Success { text: String, icon: &'static str },
    Info { text: String, icon: &'static str },
    Warning { text: String },
    Divider,
    Heading { text: String },
}

/// A rendered turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatBubble {
    pub role: Role,
    pub widgets: Vec<Widget>,
}

/// One option of the mode selector, with its sidebar description.
#[derive(Debug, Clone, Serialize)]
pub struct ModeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub example: &'static str,
    pub selected: bool,
}

pub fn mode_options(selected: Mode) -> Vec<ModeOption> {
    Mode::ALL
        .iter()
        .map(|mode| ModeOption {
            value: mode.as_str(),
            label: mode.label(),
            description: mode.description(),
            example: mode.example(),
            selected: *mode == selected,
        })
        .collect()
}

/// Assistant bubble shown above the conversation.
pub fn initial_greeting() -> ChatBubble {
    ChatBubble {
        role: Role::Assistant,
        widgets: vec![
            Widget::Success {
                text: GREETING.to_string(),
                icon: "👋",
            },
            Widget::Warning {
                text: GREETING_HINT.to_string(),
            },
        ],
    }
}

/// Error text for the banner: the specific message, then the common one.
pub fn build_error_message(message: &str) -> String {
    [message, COMMON_ERROR_MESSAGE].join("\n")
}

/// Icon for a document source, by URL scheme first, then file extension.
pub fn source_icon(source: &str) -> &'static str {
    let path = source.split(PAGE_SUFFIX_START).next().unwrap_or(source);
    let lower = path.trim().to_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return "🔗";
    }

    match lower.rsplit_once('.').map(|(_, ext)| ext) {
        Some("pdf") => "📕",
        Some("doc" | "docx") => "📝",
        Some("csv" | "xls" | "xlsx") => "📊",
        Some("ppt" | "pptx") => "📽️",
        Some("txt" | "md") => "📃",
        _ => "📄",
    }
}

pub fn render_conversation(turns: &[ConversationTurn]) -> Vec<ChatBubble> {
    turns.iter().map(render_turn).collect()
}

pub fn render_turn(turn: &ConversationTurn) -> ChatBubble {
    match turn {
        ConversationTurn::User { content } => ChatBubble {
            role: Role::User,
            widgets: vec![Widget::Markdown {
                text: content.clone(),
            }],
        },
        ConversationTurn::Assistant { content } => ChatBubble {
            role: Role::Assistant,
            widgets: render_payload(content),
        },
    }
}

/// Widgets of one assistant payload, dispatched on its mode and fields.
pub fn render_payload(payload: &AssistantPayload) -> Vec<Widget> {
    match payload {
        AssistantPayload::DocumentSearch(DocumentSearchPayload::Found(hit)) => {
            let mut widgets = vec![
                Widget::Markdown {
                    text: hit.main_message.clone(),
                },
                Widget::Success {
                    text: SourceCitation::new(&hit.main_file_path, hit.main_page_number)
                        .to_string(),
                    icon: source_icon(&hit.main_file_path),
                },
            ];

            if let Some(ref sub_message) = hit.sub_message {
                widgets.push(Widget::Markdown {
                    text: sub_message.clone(),
                });
                widgets.extend(hit.sub_choices.iter().map(|choice| Widget::Info {
                    text: choice.to_string(),
                    icon: source_icon(&choice.source),
                }));
            }

            widgets
        }
        AssistantPayload::DocumentSearch(DocumentSearchPayload::NoFileFound(miss)) => {
            vec![Widget::Markdown {
                text: miss.answer.clone(),
            }]
        }
        AssistantPayload::Inquiry(inquiry) => render_inquiry(inquiry),
    }
}

fn render_inquiry(inquiry: &InquiryPayload) -> Vec<Widget> {
    let mut widgets = vec![Widget::Markdown {
        text: inquiry.answer.clone(),
    }];

    if let Some(ref files) = inquiry.file_info_list {
        widgets.push(Widget::Divider);
        widgets.push(Widget::Heading {
            text: inquiry.message.clone().unwrap_or_default(),
        });
        widgets.extend(files.iter().map(file_info_widget));
    }

    widgets
}

fn file_info_widget(file_info: &FileInfo) -> Widget {
    match file_info {
        FileInfo::Text(text) => Widget::Info {
            text: text.clone(),
            icon: source_icon(text),
        },
        FileInfo::Source(citation) => {
            // Structured entries only show a page for PDFs
            let text = match citation.page_number {
                Some(_) if citation.source.to_lowercase().ends_with(".pdf") => citation.to_string(),
                _ => citation.source.clone(),
            };
            Widget::Info {
                icon: source_icon(&citation.source),
                text,
            }
        }
    }
}

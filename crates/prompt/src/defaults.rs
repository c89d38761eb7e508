//! Built-in system prompts.
//!
//! Every prompt here can be replaced per workspace by a YAML file named after
//! its id (see [`crate::loader`]).

/// Id of the prompt that turns a follow-up into a standalone question.
pub const QUERY_REWRITE_ID: &str = "query.rewrite";

/// Id of the answer prompt used in document-search mode.
pub const DOCUMENT_SEARCH_ID: &str = "answer.document_search";

/// Id of the answer prompt used in inquiry mode.
pub const INQUIRY_ID: &str = "answer.inquiry";

pub const QUERY_REWRITE_PROMPT: &str = "\
Given the conversation history and the latest user input, which may refer to \
earlier messages, rewrite the input as a standalone question that can be \
understood without the history. Do not answer the question. If no rewrite is \
needed, return the input unchanged.";

pub const DOCUMENT_SEARCH_PROMPT: &str = "\
You are an assistant that helps employees find internal company documents.
Using the retrieved context below, describe in one or two sentences what the \
most relevant document covers, so the user can decide whether it is the one \
they are looking for.
If the context is unrelated to the user's input, reply only with: \
\"No relevant document was found.\"

{{context}}";

pub const INQUIRY_PROMPT: &str = "\
You are an assistant that answers employee questions using internal company \
documents.
Answer the user's question using only the retrieved context below. Be \
specific and structured; use bullet points or tables when they help.
If the context does not contain the answer, reply: \"I could not find the \
information needed to answer this question in the company documents.\" Do \
not guess.

{{context}}";

/// Built-in text for a prompt id, if there is one.
pub fn builtin(id: &str) -> Option<&'static str> {
    match id {
        QUERY_REWRITE_ID => Some(QUERY_REWRITE_PROMPT),
        DOCUMENT_SEARCH_ID => Some(DOCUMENT_SEARCH_PROMPT),
        INQUIRY_ID => Some(INQUIRY_PROMPT),
        _ => None,
    }
}

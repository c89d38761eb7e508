//! Test doubles shared by the unit tests of this crate.


use crate::chain::{ChainInput, ChainOutput, RagChain};
use crate::document::Document;
use crate::retriever::Retriever;
use docchat_core::{AppError, AppResult};
use docchat_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::VecDeque;
use std::sync::Mutex;

/// LLM returning canned replies in order and recording every request.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let content = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Llm("no scripted reply left".to_string()))?;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(1, 1),
        })
    }
}

/// Retriever remembering the queries it was asked, returning nothing.
#[derive(Default)]
pub struct RecordingRetriever {
    queries: Mutex<Vec<String>>,
}

impl RecordingRetriever {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Retriever for RecordingRetriever {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<Document>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(Vec::new())
    }
}

/// What a [`ScriptedChain`] does when invoked.
pub enum ChainBehavior {
    Output(ChainOutput),
    Nothing,
    Fail(String),
}

/// Chain with a fixed behavior, counting its invocations.
pub struct ScriptedChain {
    behavior: ChainBehavior,
    invocations: Mutex<Vec<ChainInput>>,
}

impl ScriptedChain {
    pub fn new(behavior: ChainBehavior) -> Self {
        Self {
            behavior,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<ChainInput> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RagChain for ScriptedChain {
    async fn invoke(&self, input: &ChainInput) -> AppResult<Option<ChainOutput>> {
        self.invocations.lock().unwrap().push(input.clone());

        match &self.behavior {
            ChainBehavior::Output(output) => Ok(Some(output.clone())),
            ChainBehavior::Nothing => Ok(None),
            ChainBehavior::Fail(msg) => Err(AppError::Llm(msg.clone())),
        }
    }
}

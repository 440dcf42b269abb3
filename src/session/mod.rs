pub mod action;
pub mod file_access;

use anyhow::Result;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::model::Message;
use crate::model_gateway::{ModelGateway, ModelGatewayRequest};
use action::ActionRequest;
use file_access::FileReadResult;

const PERSONA_ACKNOWLEDGEMENT: &str =
    "Understood Sensei! Arona will read files and solve problems automatically! ✧◝(⁰▿⁰)◜✧";
const AUTO_SOLVE_PREFIX: &str = "Please solve this problem from the file:\n";

/// What the controller made of one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Reply(String),
    FileLoaded { path: String },
    FileNotFound { path: String },
    UnknownAction { action: Option<String> },
}

/// Conversation state owned by the loop.
///
/// `pending_content` only means something while `processing_mode` is set;
/// both are written together when a file is loaded and the flag is cleared
/// before the content is handed out for the automatic follow-up turn.
#[derive(Debug, Default)]
pub struct Session {
    transcript: Vec<Message>,
    processing_mode: bool,
    pending_content: String,
}

impl Session {
    pub fn new(system_prompt: &str) -> Self {
        let mut session = Self::default();
        if !system_prompt.trim().is_empty() {
            session.transcript.push(Message::user(system_prompt));
            session
                .transcript
                .push(Message::model(PERSONA_ACKNOWLEDGEMENT));
        }
        session
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_processing(&self) -> bool {
        self.processing_mode
    }

    pub fn pending_content(&self) -> &str {
        &self.pending_content
    }

    /// Consumes loaded file content if an automatic follow-up is due.
    pub fn take_pending_content(&mut self) -> Option<String> {
        if !self.processing_mode {
            return None;
        }
        self.processing_mode = false;
        Some(std::mem::take(&mut self.pending_content))
    }

    /// Sends `input` as the next user turn and interprets the reply.
    ///
    /// The transcript only grows when the remote call succeeds.
    pub async fn send<G>(&mut self, gateway: &G, input: &str) -> Result<TurnOutcome>
    where
        G: ModelGateway + ?Sized,
    {
        let user_message = Message::user(input);
        let mut messages = self.transcript.clone();
        messages.push(user_message.clone());

        let response = gateway.chat(ModelGatewayRequest { messages }).await?;

        self.transcript.push(user_message);
        self.transcript.push(Message::model(response.content.clone()));
        Ok(self.handle_reply(&response.content))
    }

    pub fn handle_reply(&mut self, reply: &str) -> TurnOutcome {
        match action::parse_action(reply) {
            None => TurnOutcome::Reply(reply.to_string()),
            Some(ActionRequest::FileRead { path }) => self.load_file(path),
            Some(ActionRequest::Unsupported { action }) => {
                warn!(action = ?action, "model requested an unsupported action");
                TurnOutcome::UnknownAction { action }
            }
        }
    }

    fn load_file(&mut self, path: String) -> TurnOutcome {
        debug!(path = %path, "model requested file read");
        if !file_access::path_exists(&path) {
            warn!(path = %path, "requested file does not exist");
            return TurnOutcome::FileNotFound { path };
        }

        let result = file_access::read_file(Path::new(&path));
        match &result {
            FileReadResult::Content(content) => {
                info!(path = %path, bytes = content.len(), "loaded requested file");
            }
            FileReadResult::Failed(cause) => {
                warn!(path = %path, error = %cause, "failed to read requested file");
            }
        }

        self.pending_content = result.into_text();
        self.processing_mode = true;
        TurnOutcome::FileLoaded { path }
    }
}

/// The synthesized user turn that asks the model to work on loaded content.
pub fn auto_solve_message(content: &str) -> String {
    format!("{AUTO_SOLVE_PREFIX}{content}")
}

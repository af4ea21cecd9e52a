//! Conversation turn: send the windowed history plus the new input to the LLM, record both
//! sides, then either run the embedded tool call or render the reply.

use std::sync::Arc;
use std::time::Duration;

use crate::llm::{ChatMessage, LlmBackend, LlmError};
use crate::render;
use crate::session::{History, Session, Turn};
use crate::tools::{self, ToolExecutor};

/// Instruction sent as the first message of every request.
pub const SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant designed to assist citizens with E-Governance related queries.
Your purpose is to provide relevant information on government schemes, help citizens raise grievances, track their applications, and engage them through feedback.
You should maintain a formal tone and use simple language to ensure inclusiveness for all citizens.
Do not use emojis.
You are not a human, but aim to be respectful, transparent, and helpful in all interactions.

Your primary tasks include:
1. Providing information on government schemes.
2. Helping users track applications for services like passport, Aadhar, etc.
3. Assisting with grievance redressal.
4. Answering frequently asked questions about public services.
5. Engaging with citizens for feedback or survey requests.

Available functions:
- fetch_scheme_info(scheme_name)
- raise_grievance(grievance_description)
- track_application(application_id)
- citizen_feedback(feedback)

For each function call, return a json object with function name and arguments within <tool_call></tool_call> XML tags as follows:
<tool_call>
{"name": <function-name>, "arguments": <args-dict>}
</tool_call>

Please adhere strictly to the above tasks and avoid irrelevant information."#;

/// Shown when the LLM call fails or times out.
pub const DEGRADED_REPLY: &str =
    "The assistant is temporarily unavailable. Please try again shortly.";

/// Request messages: system prompt, prior turns, then the new user input.
pub fn build_messages(history: &History, user_text: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.extend(history.iter().map(Turn::to_chat_message));
    messages.push(ChatMessage::user(user_text));
    messages
}

/// Runs turns for sessions against one backend and one executor.
#[derive(Clone)]
pub struct Conversation {
    backend: Arc<dyn LlmBackend>,
    executor: Arc<dyn ToolExecutor>,
    model: String,
    timeout: Duration,
}

impl Conversation {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        executor: Arc<dyn ToolExecutor>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            executor,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Record the user turn, call the LLM with the window and record its raw reply.
    /// Errors propagate; the user turn stays recorded.
    pub async fn submit(&self, session: &mut Session, user_text: &str) -> Result<String, LlmError> {
        let messages = build_messages(&session.history, user_text);
        session.history.push(Turn::user(user_text));
        log::debug!(
            "conversation {}: calling {} with {} messages",
            session.id,
            self.model,
            messages.len()
        );
        let res = tokio::time::timeout(self.timeout, self.backend.chat(&self.model, messages))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))??;
        let content = res.content().to_string();
        session.history.push(Turn::assistant(content.clone()));
        Ok(content)
    }

    /// Handle one inbound message end to end and return the HTML to send back.
    pub async fn respond(&self, session: &mut Session, user_text: &str) -> String {
        let response = match self.submit(session, user_text).await {
            Ok(r) => r,
            Err(e) => {
                log::error!("conversation {}: llm call failed: {}", session.id, e);
                return DEGRADED_REPLY.to_string();
            }
        };
        match tools::extract_payload(&response) {
            Some(payload) => self.dispatch(session, payload),
            None => render::markdown_to_html(&response),
        }
    }

    /// Decode and execute a delimited tool call; the reply (or decode error) is recorded as an
    /// assistant turn. The delimited model response itself is never shown to the user.
    fn dispatch(&self, session: &mut Session, payload: &str) -> String {
        let reply = match tools::decode(payload) {
            Ok(request) => {
                log::info!("conversation {}: tool call {}", session.id, request.name());
                self.executor.execute(&request)
            }
            Err(e) => {
                log::warn!("conversation {}: bad tool call: {}", session.id, e);
                format!("An error occurred while processing the tool call: {}", e)
            }
        };
        session.history.push(Turn::assistant(reply.clone()));
        render::escape_html(&reply)
    }
}

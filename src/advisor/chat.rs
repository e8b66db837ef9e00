//! Chat wire types and the running transcript

use serde::{Deserialize, Serialize};

use super::context::FinancialContext;
use super::stream::StreamEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Body of a chat request: the full history plus a fresh snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub financial_context: FinancialContext,
}

/// Ordered conversation history, grown as a reply streams in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Add a user turn. Blank input is ignored; returns whether it was added.
    pub fn push_user(&mut self, content: &str) -> bool {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::user(trimmed));
        true
    }

    /// Append streamed text to the trailing assistant message, or start one
    pub fn apply_delta(&mut self, delta: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant => last.content.push_str(delta),
            _ => self.messages.push(ChatMessage::assistant(delta)),
        }
    }

    /// Apply decoder output; returns true once the stream is complete
    pub fn apply_events(&mut self, events: &[StreamEvent]) -> bool {
        let mut done = false;
        for event in events {
            match event {
                StreamEvent::Delta(text) => self.apply_delta(text),
                StreamEvent::Done => done = true,
            }
        }
        done
    }

    /// Record a failed request as an assistant apology
    pub fn push_error(&mut self, error: &dyn std::fmt::Display) {
        self.messages
            .push(ChatMessage::assistant(format!("Sorry, I encountered an error: {}", error)));
    }

    /// Request body for the next turn
    pub fn request(&self, context: FinancialContext) -> ChatRequest {
        ChatRequest {
            messages: self.messages.clone(),
            financial_context: context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::profile::FinancialProfile;

    #[test]
    fn test_deltas_build_one_reply() {
        let mut transcript = Transcript::new();
        assert!(transcript.push_user("  How do I pay off debt?  "));
        assert!(!transcript.push_user("   "));

        transcript.apply_delta("Start ");
        transcript.apply_delta("with the card.");

        assert_eq!(transcript.messages().len(), 2);
        assert_eq!(transcript.messages()[0].content, "How do I pay off debt?");
        assert_eq!(transcript.last(), Some(&ChatMessage::assistant("Start with the card.")));
    }

    #[test]
    fn test_apply_events_reports_done() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        assert!(!transcript.apply_events(&[StreamEvent::Delta("a".into())]));
        assert!(transcript.apply_events(&[StreamEvent::Delta("b".into()), StreamEvent::Done]));
        assert_eq!(transcript.last().unwrap().content, "ab");
    }

    #[test]
    fn test_error_appends_apology() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        transcript.push_error(&GatewayError::RateLimited);
        assert_eq!(
            transcript.last().unwrap().content,
            "Sorry, I encountered an error: Rate limit exceeded. Please try again later."
        );
    }

    #[test]
    fn test_request_wire_format() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        let request = transcript.request(FinancialContext::for_chat(&FinancialProfile::sample()));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
        assert_eq!(json["financialContext"]["totalEMI"], 49_235.0);
    }
}

//! AI assistant conversation.

use serde::Serialize;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{PortalError, Result};
use crate::normalized::chat_reply_text;
use crate::store::{Activities, Reducer, Resource, Store};

const ASK_FALLBACK: &str = "Failed to get AI response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatActivity {
    Ask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub activity: Activities<ChatActivity>,
}

#[derive(Debug)]
pub enum ChatAction {
    Started(ChatActivity),
    Failed(ChatActivity, String),
    Settled(ChatActivity),
    /// The latest ask completed; its reply is appended separately.
    Answered,
    MessageAdded(ChatMessage),
    MessagesCleared,
}

impl Reducer for ChatState {
    type Action = ChatAction;
    type Category = ChatActivity;

    fn reduce(&self, action: ChatAction) -> Self {
        let mut next = self.clone();
        match action {
            ChatAction::Started(category) => next.activity.start(category),
            ChatAction::Failed(category, message) => next.activity.fail(category, message),
            ChatAction::Settled(category) => next.activity.settle(category),
            ChatAction::Answered => next.activity.succeed(ChatActivity::Ask),
            ChatAction::MessageAdded(message) => {
                if !next.messages.iter().any(|m| m.id == message.id) {
                    next.messages.push(message);
                }
            }
            ChatAction::MessagesCleared => next.messages.clear(),
        }
        next
    }

    fn started(category: ChatActivity) -> ChatAction {
        ChatAction::Started(category)
    }

    fn failed(category: ChatActivity, message: String) -> ChatAction {
        ChatAction::Failed(category, message)
    }

    fn settled(category: ChatActivity) -> ChatAction {
        ChatAction::Settled(category)
    }
}

/// AI chat state machine.
#[derive(Debug, Clone)]
pub struct AiChat {
    api: ApiClient,
    resource: Resource<ChatState>,
}

impl AiChat {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource: Resource::new("ai_chat"),
        }
    }

    pub fn store(&self) -> &Store<ChatState> {
        self.resource.store()
    }

    /// `POST /ai-chat/ask`.
    ///
    /// The question is appended to the conversation before the call. Every
    /// completed call appends one assistant message: the reply, or an apology
    /// carrying the error text.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PortalError::Validation("Message is required".to_string()));
        }
        self.store()
            .dispatch(ChatAction::MessageAdded(ChatMessage::user(question)));

        let result = self
            .resource
            .execute(
                ChatActivity::Ask,
                ASK_FALLBACK,
                async {
                    let body = self.api.chat().ask(question).await?;
                    Ok(chat_reply_text(&body))
                },
                |_| ChatAction::Answered,
            )
            .await;

        let reply = match &result {
            Ok(text) => Some(ChatMessage::assistant(text.clone())),
            Err(PortalError::SessionExpired) => None,
            Err(err) => Some(ChatMessage::assistant(format!(
                "Sorry, something went wrong: {}",
                err.user_message(ASK_FALLBACK)
            ))),
        };
        if let Some(reply) = reply {
            self.store().dispatch(ChatAction::MessageAdded(reply));
        }
        result
    }

    pub fn clear_messages(&self) {
        self.store().dispatch(ChatAction::MessagesCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_added_is_idempotent() {
        let message = ChatMessage::user("How many leaves do I have?");
        let once = ChatState::default().reduce(ChatAction::MessageAdded(message.clone()));
        let twice = once.reduce(ChatAction::MessageAdded(message));
        assert_eq!(once, twice);
        assert_eq!(twice.messages.len(), 1);
    }

    #[test]
    fn test_clear_keeps_activity() {
        let state = ChatState::default()
            .reduce(ChatAction::MessageAdded(ChatMessage::user("hi")))
            .reduce(ChatAction::Failed(ChatActivity::Ask, "offline".to_string()))
            .reduce(ChatAction::MessagesCleared);
        assert!(state.messages.is_empty());
        assert_eq!(state.activity.error(ChatActivity::Ask), Some("offline"));
    }
}

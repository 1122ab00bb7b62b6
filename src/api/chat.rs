use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::client::OllamaClient;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::Transport;
use crate::http::request::OperationBody;

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            images: Vec::new(),
        }
    }

    pub fn system(content: &str) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: &str) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new("assistant", content)
    }

    /// Attaches a base64-encoded image.
    pub fn with_image(mut self, image_base64: &str) -> Self {
        self.images.push(image_base64.to_string());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut message = json!({
            "role": self.role,
            "content": self.content,
        });
        if !self.images.is_empty()
            && let Some(obj) = message.as_object_mut()
        {
            obj.insert("images".to_string(), json!(self.images));
        }
        message
    }
}

/// Builds the `messages` array for [`OllamaClient::chat`].
pub fn messages(conversation: &[ChatMessage]) -> Value {
    Value::Array(conversation.iter().map(ChatMessage::to_value).collect())
}

impl<T: Transport> OllamaClient<T> {
    /// Sends `messages` (a JSON array of role/content objects) to the chat
    /// endpoint with the configured model.
    pub async fn chat(&mut self, messages: Value) -> Result<Value> {
        let payload = self
            .request_mut()
            .build_payload(OperationBody::Chat { messages });
        self.dispatch(Endpoint::Chat, Some(payload)).await
    }
}

#[cfg(test)]
mod chat_tests {
    use super::*;

    #[test]
    fn builds_messages_array_in_order() {
        let conversation = [
            ChatMessage::system("be brief"),
            ChatMessage::user("why is the sky blue?"),
        ];

        assert_eq!(
            messages(&conversation),
            json!([
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "why is the sky blue?"}
            ])
        );
    }

    #[test]
    fn images_are_only_sent_when_present() {
        let message = ChatMessage::user("what is this?").with_image("aGVsbG8=");
        assert_eq!(message.to_value()["images"], json!(["aGVsbG8="]));
        assert!(ChatMessage::assistant("ok").to_value().get("images").is_none());
    }

    #[test]
    fn deserializes_server_messages() {
        let message: ChatMessage =
            serde_json::from_value(json!({"role": "assistant", "content": "Hi"})).unwrap();
        assert_eq!(message, ChatMessage::assistant("Hi"));
    }
}

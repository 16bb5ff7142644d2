use serde::{Deserialize, Serialize};

/// Who authored a message. Serializes to the wire-level role strings.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One exchange unit. Immutable once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
        }
    }
}

/// The ordered message list resent in full on every completion call.
///
/// The first element is always the system prompt fixed at construction.
/// A successful turn appends a `user` message and then an `assistant`
/// message; a failed call leaves the `user` message unanswered, and the
/// next turn appends its own `user` message directly after it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates a new Conversation seeded with the system prompt.
    pub fn new(system_prompt: &str) -> Self {
        Conversation {
            messages: vec![Message::new(Role::System, system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::new(Role::Assistant, content));
    }

    /// The full ordered message list, system prompt first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

use serde::Serialize;

/// Speaker of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One piece of turn content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Publicly reachable image, e.g. an uploaded page screenshot
    ImageUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl Message {
    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text(text) => Some(text.as_str()),
                ContentPart::ImageUrl(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Ordered user/assistant turns plus an optional system prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.push_user(text);
        self
    }

    pub fn user_parts(mut self, parts: Vec<ContentPart>) -> Self {
        self.messages.push(Message {
            role: Role::User,
            parts,
        });
        self
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, text.into());
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, text.into());
    }

    /// Text of the most recent user turn
    pub fn last_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(Message::text)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, role: Role, text: String) {
        self.messages.push(Message {
            role,
            parts: vec![ContentPart::Text(text)],
        });
    }
}

// the vendor contracts
use super::conversation::{ContentPart, Conversation};
use serde::{Deserialize, Serialize};

/// Anthropic Messages API request
#[derive(Debug, Serialize)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    pub messages: Vec<MessagesTurn<'a>>,
}

#[derive(Debug, Serialize)]
pub struct MessagesTurn<'a> {
    pub role: &'static str,
    pub content: Vec<MessagesContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagesContent<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource<'a> {
    Url { url: &'a str },
}

impl<'a> MessagesRequest<'a> {
    pub fn new(
        model: &'a str,
        max_tokens: u32,
        temperature: f32,
        conversation: &'a Conversation,
    ) -> Self {
        let messages = conversation
            .messages
            .iter()
            .map(|message| MessagesTurn {
                role: message.role.as_str(),
                content: message
                    .parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text(text) => MessagesContent::Text { text },
                        ContentPart::ImageUrl(url) => MessagesContent::Image {
                            source: ImageSource::Url { url },
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            model,
            max_tokens,
            temperature,
            system: conversation.system.as_deref(),
            messages,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    /// All text blocks joined, or `None` when the reply had none
    pub fn into_text(self) -> Option<String> {
        let texts: Vec<String> = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text),
                ResponseBlock::Other => None,
            })
            .collect();
        (!texts.is_empty()).then(|| texts.concat())
    }
}

/// OpenAI Chat Completions request
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub messages: Vec<ChatTurn<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatTurn<'a> {
    pub role: &'static str,
    pub content: Vec<ChatContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatContent<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl<'a> {
    pub url: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(
        model: &'a str,
        max_tokens: u32,
        temperature: f32,
        conversation: &'a Conversation,
    ) -> Self {
        let system = conversation.system.as_deref().map(|text| ChatTurn {
            role: "system",
            content: vec![ChatContent::Text { text }],
        });

        let turns = conversation.messages.iter().map(|message| ChatTurn {
            role: message.role.as_str(),
            content: message
                .parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text(text) => ChatContent::Text { text },
                    ContentPart::ImageUrl(url) => ChatContent::ImageUrl {
                        image_url: ImageUrl { url },
                    },
                })
                .collect(),
        });

        Self {
            model,
            max_tokens,
            temperature,
            messages: system.into_iter().chain(turns).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

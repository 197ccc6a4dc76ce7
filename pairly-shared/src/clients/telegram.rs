use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Telegram caps photo captions at 1024 characters.
const MAX_CAPTION_CHARS: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Http(reqwest::Error),

    #[error("telegram api error ({status}): {description}")]
    Api { status: u16, description: String },
}

// Request URLs embed the bot token, so it is stripped before the error can be displayed.
impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Http(err.without_url())
    }
}

/// Minimal Bot API client: plain messages and photos by file id or URL.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: i64,
    photo: &'a str,
    caption: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T: Serialize>(&self, method: &str, body: &T) -> Result<(), TelegramError> {
        let response = self.client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let reply: BotApiResponse = response.json().await?;

        if !status.is_success() || !reply.ok {
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description: reply.description.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };
        self.call("sendMessage", &request).await?;

        tracing::debug!(chat_id, "telegram message sent");
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, photo: &str, caption: &str) -> Result<(), TelegramError> {
        let caption = truncate_chars(caption, MAX_CAPTION_CHARS);
        let request = SendPhotoRequest {
            chat_id,
            photo,
            caption,
        };
        self.call("sendPhoto", &request).await?;

        tracing::debug!(chat_id, "telegram photo sent");
        Ok(())
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

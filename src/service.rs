use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/api/chat-memory";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: String,
}

/// Client for the remote chat service.
///
/// The service takes `{"message": ...}` and answers with `{"message": ...}`.
#[derive(Clone, Debug)]
pub struct ChatServiceClient {
    client: Client,
    url: String,
}

impl ChatServiceClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn send(&self, text: &str) -> Result<String> {
        tracing::debug!(url = %self.url, chars = text.chars().count(), "Sending chat message");

        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message: text })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.message)
    }
}

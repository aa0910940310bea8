use std::time::Duration;

use crate::error::Result;
use crate::service::ChatServiceClient;

pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_SIMULATED_REPLY: &str = "This is a simulated bot response.";

/// How the bot produces its answer
#[derive(Clone, Debug)]
pub enum Responder {
    /// Canned reply after a fixed delay, no network involved
    Simulated { delay: Duration, reply: String },
    Remote(ChatServiceClient),
}

impl Responder {
    pub fn simulated() -> Self {
        Responder::Simulated {
            delay: DEFAULT_SIMULATED_DELAY,
            reply: DEFAULT_SIMULATED_REPLY.to_string(),
        }
    }

    pub async fn respond(&self, text: &str) -> Result<String> {
        match self {
            Responder::Simulated { delay, reply } => {
                tokio::time::sleep(*delay).await;
                Ok(reply.clone())
            }
            Responder::Remote(client) => client.send(text).await,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Responder::Simulated { .. } => "Local (simulated)".to_string(),
            Responder::Remote(client) => format!("Remote: {}", client.url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_waits_for_delay() {
        let responder = Responder::simulated();
        let start = tokio::time::Instant::now();

        let reply = responder.respond("anything").await.unwrap();

        assert_eq!(reply, DEFAULT_SIMULATED_REPLY);
        assert!(start.elapsed() >= DEFAULT_SIMULATED_DELAY);
    }
}

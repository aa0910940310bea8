pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod responder;
pub mod service;
pub mod transcript;
pub mod tui;
pub mod ui;
pub mod widget;

// Re-export main types for convenience
pub use config::{Config, ResponseMode};
pub use error::ChatError;
pub use message::{ChatMessage, ChatRole};
pub use responder::Responder;
pub use service::ChatServiceClient;
pub use transcript::TranscriptView;
pub use widget::{ChatWidget, APOLOGY};

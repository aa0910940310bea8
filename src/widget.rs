//! The chat widget: draft input, transcript and the pending bot reply.
//!
//! A submit appends the user's message, clears the draft and spawns the
//! responder on the tokio runtime. The reply comes back over a channel tagged
//! with the request id, so a reply for a cancelled request is never applied.
//! Only one request is in flight at a time.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ChatError, Result};
use crate::message::ChatMessage;
use crate::responder::Responder;
use crate::transcript::TranscriptView;

/// Shown in place of the bot's answer when the responder fails
pub const APOLOGY: &str = "Sorry, I am having trouble responding right now.";

/// Outcome of one responder run
#[derive(Debug)]
pub struct Reply {
    pub request_id: u64,
    pub outcome: std::result::Result<String, ChatError>,
}

#[derive(Debug)]
struct PendingRequest {
    id: u64,
    task: JoinHandle<()>,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct ChatWidget {
    responder: Responder,

    // Draft input
    draft: String,
    cursor: usize, // char index into draft

    // Transcript
    messages: Vec<ChatMessage>,
    awaiting_response: bool,
    view: Option<TranscriptView>,

    // In-flight request
    pending: Option<PendingRequest>,
    next_request_id: u64,
    reply_tx: mpsc::UnboundedSender<Reply>,
    reply_rx: mpsc::UnboundedReceiver<Reply>,
}

impl ChatWidget {
    pub fn new(responder: Responder) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        Self {
            responder,
            draft: String::new(),
            cursor: 0,
            messages: Vec::new(),
            awaiting_response: false,
            view: None,
            pending: None,
            next_request_id: 0,
            reply_tx,
            reply_rx,
        }
    }

    /// Start the transcript with a bot greeting
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.append(ChatMessage::bot(greeting));
        self
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// Send the current draft to the bot.
    ///
    /// Returns `false` without touching any state when the trimmed draft is
    /// empty or a reply is still pending.
    ///
    /// # Panics
    ///
    /// Spawns the responder with `tokio::spawn`, so it must be called from
    /// within a tokio runtime.
    pub fn submit(&mut self) -> bool {
        let text = self.draft.trim();
        if text.is_empty() || self.awaiting_response {
            return false;
        }
        let text = text.to_string();

        self.messages.push(ChatMessage::user(text.clone()));
        self.awaiting_response = true;
        self.request_scroll_to_bottom();

        let responder = self.responder.clone();
        self.start_request(async move { responder.respond(&text).await });

        self.draft.clear();
        self.cursor = 0;
        true
    }

    /// Spawn the response and track it as the pending request. A panic in
    /// the response is delivered as a failed reply.
    fn start_request<F>(&mut self, response: F)
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let reply_tx = self.reply_tx.clone();
        let task = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(response).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => Err(ChatError::Responder("responder panicked".to_string())),
            };
            // Receiver is gone once the widget is dropped
            let _ = reply_tx.send(Reply {
                request_id,
                outcome,
            });
        });

        tracing::debug!(request_id, "Submitted message");
        self.pending = Some(PendingRequest {
            id: request_id,
            task,
        });
    }

    /// Wait for the next reply from the responder. Cancel-safe.
    pub async fn next_reply(&mut self) -> Option<Reply> {
        self.reply_rx.recv().await
    }

    /// Apply a queued reply, if any, without waiting
    pub fn poll_reply(&mut self) -> Option<Result<()>> {
        while let Ok(reply) = self.reply_rx.try_recv() {
            if let Some(outcome) = self.apply_reply(reply) {
                return Some(outcome);
            }
        }
        None
    }

    /// Wait for the pending request to finish and apply its reply.
    ///
    /// Returns `None` when nothing is pending.
    pub async fn settle(&mut self) -> Option<Result<()>> {
        while self.pending.is_some() {
            let reply = self.reply_rx.recv().await?;
            if let Some(outcome) = self.apply_reply(reply) {
                return Some(outcome);
            }
        }
        None
    }

    /// Record a reply in the transcript and return to idle.
    ///
    /// On failure the apology is appended and the error handed back to the
    /// caller. Replies for anything but the pending request are dropped.
    pub fn apply_reply(&mut self, reply: Reply) -> Option<Result<()>> {
        match &self.pending {
            Some(pending) if pending.id == reply.request_id => {}
            _ => {
                tracing::trace!(request_id = reply.request_id, "Dropping stale reply");
                return None;
            }
        }

        self.pending = None;
        self.awaiting_response = false;

        match reply.outcome {
            Ok(text) => {
                self.append(ChatMessage::bot(text));
                Some(Ok(()))
            }
            Err(err) => {
                self.append(ChatMessage::bot(APOLOGY));
                Some(Err(err))
            }
        }
    }

    /// Abort the in-flight request, if any. Nothing is appended.
    pub fn cancel_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        pending.task.abort();
        self.awaiting_response = false;
        self.request_scroll_to_bottom();
        tracing::info!(request_id = pending.id, "Cancelled pending reply");
        true
    }

    // Transcript view lifecycle

    pub fn mount(&mut self, view: TranscriptView) {
        self.view = Some(view);
        self.request_scroll_to_bottom();
    }

    pub fn unmount(&mut self) -> Option<TranscriptView> {
        self.view.take()
    }

    pub fn transcript_view(&self) -> Option<&TranscriptView> {
        self.view.as_ref()
    }

    pub fn transcript_view_mut(&mut self) -> Option<&mut TranscriptView> {
        self.view.as_mut()
    }

    /// Mount a view of the given size, or resize the mounted one. A view
    /// pinned to the bottom scrolls again after a size change.
    pub fn fit_view(&mut self, width: u16, height: u16) {
        match self.view.as_mut() {
            Some(view) => {
                if view.resize(width, height) && view.is_pinned() {
                    self.request_scroll_to_bottom();
                }
            }
            None => self.mount(TranscriptView::new(width, height)),
        }
    }

    fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.request_scroll_to_bottom();
    }

    /// Best effort: without a mounted view there is nothing to scroll
    fn request_scroll_to_bottom(&mut self) {
        match self.view.as_mut() {
            Some(view) => view.scroll_to_bottom(&self.messages, self.awaiting_response),
            None => tracing::trace!("Transcript not mounted, skipping scroll"),
        }
    }

    // Draft editing

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
        self.cursor = self.draft.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.draft, self.cursor);
        self.draft.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft.chars().count() {
            let byte_pos = char_to_byte_index(&self.draft, self.cursor);
            self.draft.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.draft.chars().count();
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

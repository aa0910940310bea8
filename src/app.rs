use crate::error::Result;
use crate::widget::ChatWidget;

pub struct App {
    pub should_quit: bool,
    pub widget: ChatWidget,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    /// Last responder failure, shown in the footer until the next submit
    pub last_error: Option<String>,
}

impl App {
    pub fn new(widget: ChatWidget) -> Self {
        Self {
            should_quit: false,
            widget,
            animation_frame: 0,
            last_error: None,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.is_awaiting_response() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn submit(&mut self) {
        if self.widget.submit() {
            self.last_error = None;
            self.animation_frame = 0;
        }
    }

    /// Record the outcome of an applied reply
    pub fn on_reply(&mut self, outcome: Option<Result<()>>) {
        if let Some(Err(e)) = outcome {
            tracing::warn!(error = %e, "Bot failed to respond");
            self.last_error = Some(e.to_string());
        }
    }

    /// Tear down: abort any pending reply and release the transcript view
    pub fn quit(&mut self) {
        self.widget.cancel_pending();
        self.widget.unmount();
        self.should_quit = true;
    }
}

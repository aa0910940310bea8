use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::message::{ChatMessage, ChatRole};

// Used until the first render reports the real viewport size.
const FALLBACK_WIDTH: u16 = 50;
const FALLBACK_HEIGHT: u16 = 20;

/// Wrapping shared by the renderer and the row count
pub const TRANSCRIPT_WRAP: Wrap = Wrap { trim: false };

/// Widest frame of the "Thinking..." animation
const LAST_ANIMATION_FRAME: u8 = 2;

/// Build the transcript lines: role label, content, blank separator, and the
/// "Thinking" indicator while a reply is pending.
pub fn transcript_text(
    messages: &[ChatMessage],
    awaiting_response: bool,
    animation_frame: u8,
) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in messages {
        lines.push(role_line(msg.role));
        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if awaiting_response {
        lines.push(role_line(ChatRole::Bot));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn role_line(role: ChatRole) -> Line<'static> {
    let color = match role {
        ChatRole::User => Color::Cyan,
        ChatRole::Bot => Color::Yellow,
    };
    Line::from(Span::styled(
        role.label(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Handle to the scrollable transcript area.
///
/// The UI mounts one on the widget once it knows the viewport size, and the
/// widget asks it to scroll whenever a message is appended. While pinned to
/// the bottom, a resize scrolls again so the newest line stays visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptView {
    width: u16,
    height: u16,
    scroll: u16,
    pinned: bool,
}

impl TranscriptView {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            scroll: 0,
            pinned: true,
        }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Returns true when the size actually changed
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.pinned = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn page_height(&self) -> u16 {
        if self.height > 0 {
            self.height
        } else {
            FALLBACK_HEIGHT
        }
    }

    /// Move the offset so the last transcript line is visible
    pub fn scroll_to_bottom(&mut self, messages: &[ChatMessage], awaiting_response: bool) {
        let text = transcript_text(messages, awaiting_response, LAST_ANIMATION_FRAME);
        let total_lines = Paragraph::new(text)
            .wrap(TRANSCRIPT_WRAP)
            .line_count(self.wrap_width());
        let total_lines = u16::try_from(total_lines).unwrap_or(u16::MAX);

        self.scroll = total_lines.saturating_sub(self.page_height());
        self.pinned = true;
    }

    fn wrap_width(&self) -> u16 {
        if self.width > 0 {
            self.width
        } else {
            FALLBACK_WIDTH
        }
    }
}

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;
use crate::transcript::{transcript_text, TRANSCRIPT_WRAP};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Simple Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}] ", app.widget.responder().display_name()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inner size minus borders
    app.widget
        .fit_view(area.width.saturating_sub(2), area.height.saturating_sub(2));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Chat ");

    let awaiting = app.widget.is_awaiting_response();
    let text = if app.widget.messages().is_empty() && !awaiting {
        Text::from(Span::styled(
            "Say something to start the conversation...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        transcript_text(app.widget.messages(), awaiting, app.animation_frame)
    };

    let scroll = app.widget.transcript_view().map_or(0, |view| view.scroll());
    let chat = Paragraph::new(text)
        .block(block)
        .wrap(TRANSCRIPT_WRAP)
        .scroll((scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.widget.is_awaiting_response() {
        Color::DarkGray
    } else {
        Color::Yellow
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ");

    let inner_width = area.width.saturating_sub(2);
    let (visible_text, cursor_x) = input_window(app.widget.draft(), app.widget.cursor(), inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

/// Slice of the draft that fits in `width` columns with the cursor visible,
/// and the cursor's column within it. Measured in display columns so wide
/// characters keep the cursor on the text.
fn input_window(draft: &str, cursor: usize, width: u16) -> (String, u16) {
    let width = width as usize;
    let chars: Vec<char> = draft.chars().collect();
    let cursor = cursor.min(chars.len());
    let col = |c: &char| c.width().unwrap_or(0);

    // Drop chars from the left until the cursor cell fits
    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(col).sum();
    while start < cursor && cursor_col >= width {
        cursor_col -= col(&chars[start]);
        start += 1;
    }

    let mut used = 0;
    let visible: String = chars[start..]
        .iter()
        .take_while(|c| {
            used += col(*c);
            used <= width
        })
        .collect();

    (visible, cursor_col as u16)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
    ];
    if app.widget.is_awaiting_response() {
        spans.extend(vec![
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]);
    }
    spans.extend(vec![
        Span::styled(" Ctrl+C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    if let Some(err) = &app.last_error {
        spans.push(Span::styled(
            format!(" {} ", err),
            Style::default().bg(Color::Black).fg(Color::Red),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::Responder;
    use crate::widget::ChatWidget;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut text = String::new();
        for row in buffer.content.chunks(width) {
            for cell in row {
                text.push_str(cell.symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_shows_transcript_and_thinking() {
        let widget = ChatWidget::new(Responder::simulated()).with_greeting("Hello, how can I help you?");
        let mut app = App::new(widget);
        app.widget.set_draft("hi");
        app.submit();

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Hello, how can I help you?"));
        assert!(text.contains("You:"));
        assert!(text.contains("hi"));
        assert!(text.contains("Thinking."));
        assert!(text.contains("Esc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_word_of_wrapped_message_is_visible() {
        let words = format!("{} LASTWORD", ["xxxxxxx"; 6].join(" "));
        let widget = ChatWidget::new(Responder::simulated())
            .with_greeting(words.clone())
            .with_greeting(words);
        let mut app = App::new(widget);

        let mut terminal = Terminal::new(TestBackend::new(14, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(screen_text(&terminal).contains("LASTWORD"));
    }

    #[test]
    fn test_shrinking_terminal_keeps_tail_visible() {
        let widget = ChatWidget::new(Responder::simulated())
            .with_greeting("first message")
            .with_greeting("the quick brown fox jumps over the lazy TAILWORD");
        let mut app = App::new(widget);

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("TAILWORD"));

        terminal.backend_mut().resize(16, 10);
        terminal.resize(ratatui::layout::Rect::new(0, 0, 16, 10)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("TAILWORD"));
    }

    #[test]
    fn test_input_window_counts_display_columns() {
        // Each CJK char takes two columns
        assert_eq!(input_window("你好", 2, 10), ("你好".to_string(), 4));

        // Cursor at the end of a draft wider than the box
        let (visible, cursor_x) = input_window("你好世界", 4, 5);
        assert_eq!(visible, "世界");
        assert_eq!(cursor_x, 4);

        assert_eq!(input_window("abc", 1, 10), ("abc".to_string(), 1));
        assert_eq!(input_window("", 0, 0), (String::new(), 0));
    }

    #[test]
    fn test_first_render_mounts_transcript_view() {
        let mut app = App::new(ChatWidget::new(Responder::simulated()));
        assert!(app.widget.transcript_view().is_none());

        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let view = app.widget.transcript_view().cloned();
        assert_eq!(view.map(|v| v.page_height()), Some(5));
        assert!(screen_text(&terminal).contains("Say something"));
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // Next render picks up the new size
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit(),
        KeyCode::Esc => {
            app.widget.cancel_pending();
        }

        // Draft editing
        KeyCode::Backspace => app.widget.backspace(),
        KeyCode::Delete => app.widget.delete(),
        KeyCode::Left => app.widget.move_left(),
        KeyCode::Right => app.widget.move_right(),
        KeyCode::Home => app.widget.move_home(),
        KeyCode::End => app.widget.move_end(),
        // Ctrl/Alt chords are shortcuts, not text
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.widget.insert_char(c)
        }

        // Transcript scrolling
        KeyCode::Up => scroll_up(app, 1),
        KeyCode::Down => scroll_down(app, 1),
        KeyCode::PageUp => {
            let page = page_height(app);
            scroll_up(app, page);
        }
        KeyCode::PageDown => {
            let page = page_height(app);
            scroll_down(app, page);
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => scroll_up(app, MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollDown => scroll_down(app, MOUSE_SCROLL_LINES),
        _ => {}
    }
}

fn page_height(app: &App) -> u16 {
    app.widget
        .transcript_view()
        .map(|view| view.page_height().saturating_sub(1).max(1))
        .unwrap_or(1)
}

fn scroll_up(app: &mut App, lines: u16) {
    if let Some(view) = app.widget.transcript_view_mut() {
        view.scroll_up(lines);
    }
}

fn scroll_down(app: &mut App, lines: u16) {
    if let Some(view) = app.widget.transcript_view_mut() {
        view.scroll_down(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::Responder;
    use crate::transcript::TranscriptView;
    use crate::widget::ChatWidget;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn test_app() -> App {
        App::new(ChatWidget::new(Responder::simulated()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_and_enter_submits() {
        let mut app = test_app();
        for c in "hi".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.widget.messages().len(), 1);
        assert!(app.widget.is_awaiting_response());
        assert_eq!(app.widget.draft(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_cancels_pending_reply() {
        let mut app = test_app();
        app.widget.set_draft("hi");
        app.submit();

        handle_event(&mut app, key(KeyCode::Esc));

        assert!(!app.widget.is_awaiting_response());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = test_app();
        let event = KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        );
        handle_event(&mut app, AppEvent::Key(event));

        assert!(app.should_quit);
        assert!(app.widget.draft().is_empty());
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = test_app();
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)));
        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)));
        assert_eq!(app.widget.draft(), "");

        handle_event(&mut app, AppEvent::Key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)));
        assert_eq!(app.widget.draft(), "A");
    }

    #[test]
    fn test_page_keys_scroll_transcript() {
        let mut app = test_app();
        app.widget.mount(TranscriptView::new(40, 10));

        handle_event(&mut app, key(KeyCode::PageDown));
        assert_eq!(app.widget.transcript_view().map(|v| v.scroll()), Some(9));

        handle_event(&mut app, key(KeyCode::Up));
        assert_eq!(app.widget.transcript_view().map(|v| v.scroll()), Some(8));

        handle_event(&mut app, key(KeyCode::PageUp));
        assert_eq!(app.widget.transcript_view().map(|v| v.scroll()), Some(0));
    }
}

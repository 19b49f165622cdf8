use crate::app::{App, Focus, LoadState};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.search_typing {
        Cow::Borrowed("Type to search | ESC clear | ENTER go to results")
    } else {
        match (app.load_state, app.focus) {
            (LoadState::Loading, _) => Cow::Borrowed("Loading... [q]uit"),
            (LoadState::Empty, _) => Cow::Borrowed("[r]eload [t]heme [?]help [q]uit"),
            (LoadState::Ready, Focus::Sidebar) => {
                Cow::Borrowed("[j/k]move [Enter]jump [Tab]sites [/]search [?]help [q]uit")
            }
            (LoadState::Ready, _) => Cow::Borrowed(
                "[hjkl]move [Enter]open [[/]]category [/]search [t]heme [H]istory [?]help [q]uit",
            ),
        }
    };

    let is_error = app.status_message.as_ref().is_some_and(|(msg, _)| {
        ["Error", "Failed", "Internal error"]
            .iter()
            .any(|prefix| msg.starts_with(prefix))
    });
    let style = if is_error {
        app.style("status_error")
    } else {
        app.style("status_bar")
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

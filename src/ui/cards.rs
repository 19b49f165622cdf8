//! Card grid: one section per category, cards laid out in rows.

use crate::app::{App, Focus, IconState, LoadState};
use crate::icons::{monogram, IconKind, CARD_PALETTE};
use crate::util::{domain_key, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;

/// Outer width of one card, borders included.
pub(super) const CARD_WIDTH: u16 = 26;
/// Outer height of one card, borders included.
const CARD_HEIGHT: usize = 4;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Vertical extent of one section in grid lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SectionSpan {
    top: usize,
    rows: usize,
}

impl SectionSpan {
    /// Header line, card rows (or one "empty" line), blank separator.
    fn height(self) -> usize {
        let body = if self.rows == 0 {
            1
        } else {
            self.rows * CARD_HEIGHT
        };
        1 + body + 1
    }

    fn row_top(self, row: usize) -> usize {
        self.top + 1 + row * CARD_HEIGHT
    }
}

fn section_spans(app: &App, per_row: usize) -> Vec<SectionSpan> {
    let mut top = 0;
    (0..app.section_count())
        .map(|section| {
            let rows = app.section_links(section).len().div_ceil(per_row);
            let span = SectionSpan { top, rows };
            top += span.height();
            span
        })
        .collect()
}

/// Number of cards that fit in one row of `width` columns.
pub(super) fn cards_per_row(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// Render the card area. Updates the app's row width and scroll position.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let focused = matches!(app.focus, Focus::Cards)
        || (app.focus == Focus::Results && !app.search_outcome.is_active());
    let border_style = if focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .style(app.style("page"))
        .title("Sites");
    if let Some(reason) = &app.fallback_reason {
        block = block.title_bottom(Line::from(format!(" built-in links: {} ", reason)));
    }
    let inner = block.inner(area);
    f.render_widget(block, area);

    match app.load_state {
        LoadState::Loading => {
            let frame = SPINNER[app.spinner_frame % SPINNER_FRAMES];
            render_centered(f, app, inner, format!("{} Loading links...", frame));
            return;
        }
        LoadState::Empty => {
            render_centered(f, app, inner, "No data\n\nPress r to reload".to_string());
            return;
        }
        LoadState::Ready => {}
    }

    let per_row = cards_per_row(inner.width);
    app.cards_per_row = per_row;
    let spans = section_spans(app, per_row);
    let height = usize::from(inner.height);

    app.card_scroll = scroll_for(app, &spans, height);

    let scroll = app.card_scroll;
    for (section, span) in spans.iter().enumerate() {
        if span.top + span.height() <= scroll || span.top >= scroll + height {
            continue;
        }

        if span.top >= scroll {
            let header_area = Rect {
                x: inner.x,
                y: inner.y + (span.top - scroll) as u16,
                width: inner.width,
                height: 1,
            };
            render_header(f, app, section, header_area);
        }

        if span.rows == 0 {
            let line_y = span.top + 1;
            if line_y >= scroll && line_y < scroll + height {
                let empty = Paragraph::new("  (no links)").style(app.style("card_domain"));
                f.render_widget(
                    empty,
                    Rect {
                        x: inner.x,
                        y: inner.y + (line_y - scroll) as u16,
                        width: inner.width,
                        height: 1,
                    },
                );
            }
            continue;
        }

        for (index, _) in app.section_links(section).iter().enumerate() {
            let top = span.row_top(index / per_row);
            // Only whole cards are drawn
            if top < scroll || top + CARD_HEIGHT > scroll + height {
                continue;
            }
            let card_area = Rect {
                x: inner.x + (index % per_row) as u16 * CARD_WIDTH,
                y: inner.y + (top - scroll) as u16,
                width: CARD_WIDTH.min(inner.width),
                height: CARD_HEIGHT as u16,
            };
            render_card(f, app, section, index, card_area);
        }
    }
}

/// Keep the cursor's card row on screen, honoring a pending category jump.
fn scroll_for(app: &mut App, spans: &[SectionSpan], height: usize) -> usize {
    let total = spans.last().map_or(0, |s| s.top + s.height());
    let max_scroll = total.saturating_sub(height);

    if let Some(section) = app.scroll_to_section.take() {
        if let Some(span) = spans.get(section) {
            return span.top.min(max_scroll);
        }
    }

    let mut scroll = app.card_scroll.min(max_scroll);
    if let Some(span) = spans.get(app.cursor.section) {
        let row = app.cursor.index / app.cards_per_row.max(1);
        let top = if row == 0 { span.top } else { span.row_top(row) };
        let bottom = span.row_top(row) + CARD_HEIGHT;
        if top < scroll {
            scroll = top;
        } else if bottom > scroll + height {
            scroll = bottom.saturating_sub(height);
        }
    }
    scroll
}

fn render_header(f: &mut Frame, app: &App, section: usize, area: Rect) {
    let name = app.section_name(section);
    let (style, marker) = if app.highlight == Some(section) {
        (app.style("category_highlight"), "")
    } else if app.is_pinned(section) {
        (app.style("category_pinned"), " ★")
    } else {
        (app.style("category_title"), "")
    };
    let line = Line::from(vec![
        Span::styled(format!(" {}", name), style),
        Span::styled(marker, style),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_card(f: &mut Frame, app: &App, section: usize, index: usize, area: Rect) {
    let Some(link) = app.section_links(section).get(index) else {
        return;
    };
    let selected = app.focus == Focus::Cards
        && app.cursor.section == section
        && app.cursor.index == index;

    let (card_style, border_style) = if selected {
        (app.style("card_selected"), app.style("card_selected"))
    } else {
        (app.style("card_normal"), app.style("panel_border"))
    };

    let text_width = usize::from(area.width.saturating_sub(2));
    let badge = icon_badge(app, &link.title, &link.url);
    let title = truncate_to_width(&link.title, text_width.saturating_sub(3));
    let domain = domain_key(&link.url).unwrap_or_else(|| link.url.clone());
    let domain = truncate_to_width(&domain, text_width).into_owned();

    let domain_style = if selected {
        card_style
    } else {
        app.style("card_domain")
    };

    let body = vec![
        Line::from(vec![badge, Span::raw(" "), Span::styled(title, card_style)]),
        Line::from(Span::styled(domain, domain_style)),
    ];

    let card = Paragraph::new(body).style(card_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(card, area);
}

/// Icon stand-in: a glyph once the icon loads, the monogram if it failed.
fn icon_badge<'a>(app: &App, title: &str, url: &str) -> Span<'a> {
    match app.icon_state(url) {
        Some(IconState::Pending) => Span::styled(" … ", app.style("card_pending")),
        Some(IconState::Failed) => {
            let mono = monogram(title, &CARD_PALETTE);
            Span::styled(
                format!(" {} ", mono.letter),
                Style::default()
                    .bg(mono.color)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }
        Some(IconState::Ready(icon)) => {
            let glyph = match icon.kind() {
                IconKind::Local => " ■ ",
                IconKind::Remote => " ● ",
                IconKind::DataUri => " ◆ ",
            };
            Span::styled(glyph, app.style("card_ready"))
        }
        None => Span::styled(" ◆ ", app.style("card_ready")),
    }
}

fn render_centered(f: &mut Frame, app: &App, area: Rect, text: String) {
    let lines = text.lines().count() as u16;
    let y = area.y + area.height.saturating_sub(lines) / 2;
    let target = Rect {
        x: area.x,
        y,
        width: area.width,
        height: lines.min(area.height),
    };
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(app.style("search_empty"));
    f.render_widget(paragraph, target);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_per_row() {
        assert_eq!(cards_per_row(10), 1);
        assert_eq!(cards_per_row(CARD_WIDTH * 3 + 5), 3);
    }

    #[test]
    fn test_section_span_height() {
        let empty = SectionSpan { top: 0, rows: 0 };
        assert_eq!(empty.height(), 3);
        let two_rows = SectionSpan { top: 10, rows: 2 };
        assert_eq!(two_rows.height(), 1 + 2 * CARD_HEIGHT + 1);
        assert_eq!(two_rows.row_top(1), 10 + 1 + CARD_HEIGHT);
    }
}

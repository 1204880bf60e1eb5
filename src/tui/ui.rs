//! Stateless rendering for the participant view.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::PlayerApp;
use crate::bingo::{GRID_SIZE, Grid, MarkMatrix, REQUIRED_LINES};
use crate::session::{CardStatus, CategoryEntry, PlayerView};

/// Draws the whole view. `refreshing` marks an outstanding config fetch.
pub fn draw(frame: &mut Frame, app: &PlayerApp, refreshing: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(6),    // Body
            Constraint::Length(3), // Help
        ])
        .split(frame.area());

    let view = app.session().view();
    let (title, help) = match &view {
        PlayerView::Playing { category, .. } => (
            format!("{category} BINGO"),
            "Arrows: move | Space: mark | N: new card | C: categories | Q: quit",
        ),
        PlayerView::ChooseCategory { .. } => (
            "Choose a category".to_string(),
            "Up/Down: choose | Enter: play | R: reload | Q: quit",
        ),
        _ => ("Word Bingo".to_string(), "R: reload | Q: quit"),
    };

    let title = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    match &view {
        PlayerView::Loading => draw_message(frame, chunks[1], "Loading config...", Color::Yellow),
        PlayerView::Failed { reason } => {
            draw_message(frame, chunks[1], &format!("Error: {reason}"), Color::Red)
        }
        PlayerView::NoCategories => {
            draw_message(frame, chunks[1], "The config lists no categories.", Color::Red)
        }
        PlayerView::ChooseCategory { categories } => {
            draw_categories(frame, chunks[1], categories, app.category_index())
        }
        PlayerView::Playing {
            grid,
            marks,
            status,
            ..
        } => draw_card(frame, chunks[1], grid, marks, app.cursor(), *status),
    }

    let help = if refreshing {
        format!("{help} | refreshing...")
    } else {
        help.to_string()
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);

    if let Some(notice) = app.notice() {
        draw_notice(frame, notice);
    }
}

fn draw_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, center_rect(area, area.width, 3));
}

fn draw_categories(frame: &mut Frame, area: Rect, categories: &[CategoryEntry<'_>], selected: usize) {
    let items: Vec<ListItem> = categories
        .iter()
        .map(|entry| ListItem::new(format!("{}  ({} words)", entry.name, entry.word_count)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Categories"))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_card(
    frame: &mut Frame,
    area: Rect,
    grid: &Grid,
    marks: &MarkMatrix,
    cursor: (usize, usize),
    status: CardStatus,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(GRID_SIZE as u16 * 3), Constraint::Length(1)])
        .split(area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, GRID_SIZE as u32); grid.size()])
        .split(chunks[0]);

    for (r, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_SIZE as u32); grid.size()])
            .split(*row_area);
        for (c, cell_area) in cols.iter().enumerate() {
            let word = grid.get(r, c).unwrap_or_default();
            draw_cell(frame, *cell_area, word, marks.is_marked(r, c), cursor == (r, c));
        }
    }

    let badge = if status.is_win {
        Span::styled(
            format!(" BINGO! ({} lines) ", status.lines),
            Style::default()
                .fg(Color::White)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!(" Lines: {} / {} ", status.lines, REQUIRED_LINES),
            Style::default().fg(Color::Gray),
        )
    };
    frame.render_widget(
        Paragraph::new(Line::from(badge)).alignment(Alignment::Center),
        chunks[1],
    );
}

fn draw_cell(frame: &mut Frame, area: Rect, word: &str, marked: bool, focused: bool) {
    let mut style = if marked {
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightGreen)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text = fit_word(word, area.width.saturating_sub(2) as usize);
    let paragraph = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(paragraph, area);
}

fn draw_notice(frame: &mut Frame, notice: &str) {
    let area = center_rect(frame.area(), 50, 5);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(notice.to_string()),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(paragraph, area);
}

/// Shortens `word` to `width` display columns, ending with an ellipsis
/// when cut.
fn fit_word(word: &str, width: usize) -> String {
    if word.width() <= width {
        return word.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in word.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}

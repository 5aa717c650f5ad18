use std::time::Duration;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::{Phase, Snapshot};
use crate::games::memory::{Card, Memory, COLUMNS};

use super::{centered, game_block, help_line, phase_span, separator};

const CARD_W: u16 = 8;
const CARD_H: u16 = 4;

fn clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Screen rect of each card that fits, paired with its board position.
fn card_rects(board: Rect, cards: usize) -> Vec<(Rect, usize)> {
    (0..cards)
        .map(|i| {
            let (col, row) = ((i % COLUMNS) as u16, (i / COLUMNS) as u16);
            (Rect::new(board.x + col * CARD_W, board.y + row * CARD_H, CARD_W, CARD_H), i)
        })
        .filter(|(r, _)| r.right() <= board.right() && r.bottom() <= board.bottom())
        .collect()
}

fn card_face(card: &Card) -> (String, Style) {
    if card.matched {
        (card.symbol.to_string(), Style::default().bg(Color::Rgb(30, 70, 40)))
    } else if card.flipped {
        (card.symbol.to_string(), Style::default().bg(Color::Rgb(70, 60, 110)))
    } else {
        (
            "?".to_string(),
            Style::default()
                .fg(Color::Rgb(200, 120, 255))
                .bg(Color::Rgb(35, 30, 55))
                .add_modifier(Modifier::BOLD),
        )
    }
}

/// Draws the card grid and returns the clickable card regions.
pub fn render(frame: &mut Frame, area: Rect, view: &Snapshot<'_, Memory>, cursor: usize) -> Vec<(Rect, usize)> {
    let block = game_block(" 🃏 Memory ", Color::Rgb(100, 60, 140), Color::Rgb(200, 120, 255));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(CARD_H * 2), // Cards
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let game = view.game;
    let total = game.cards().len() / 2;
    let status = Line::from(vec![
        Span::styled(
            format!(" Moves: {} ", game.moves()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(format!("⏱ {} ", clock(view.elapsed)), Style::default().fg(Color::Cyan)),
        separator(),
        Span::styled(
            format!("Pairs: {}/{} ", game.matched_pairs(), total),
            Style::default().fg(Color::Green),
        ),
        separator(),
        Span::styled(format!("{} ", game.difficulty().label()), Style::default().fg(Color::Rgb(200, 120, 255))),
        separator(),
        phase_span(view.phase),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let rows = game.cards().len().div_ceil(COLUMNS) as u16;
    let board = centered(chunks[1], CARD_W * COLUMNS as u16, CARD_H * rows);
    let rects = card_rects(board, game.cards().len());
    for &(rect, i) in &rects {
        let card = &game.cards()[i];
        let selected = i == cursor && view.phase != Phase::GameOver;
        let border = if selected {
            Color::Rgb(255, 220, 80)
        } else if card.matched {
            Color::Rgb(60, 140, 80)
        } else {
            Color::Rgb(80, 70, 110)
        };
        let card_block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected { BorderType::Double } else { BorderType::Rounded })
            .border_style(Style::default().fg(border));
        let face_area = card_block.inner(rect);
        frame.render_widget(card_block, rect);
        let (face, style) = card_face(card);
        frame.render_widget(
            Paragraph::new(vec![Line::from(""), Line::from(face)])
                .style(style)
                .alignment(Alignment::Center),
            face_area,
        );
    }

    let help = if view.phase == Phase::GameOver {
        Line::from(vec![
            Span::styled(
                format!(" 🎉 All pairs found in {} moves, {}! ", game.moves(), clock(view.elapsed)),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled("R to reshuffle │ 1/2/3 difficulty │ Esc menu", Style::default().fg(Color::Gray)),
        ])
    } else {
        help_line(
            view.phase,
            "Flip a card to start!",
            &[("↑↓←→", "Move"), ("Enter/click", "Flip"), ("1/2/3", "Difficulty"), ("R", "Reshuffle")],
        )
    };
    frame.render_widget(Paragraph::new(help), chunks[2]);

    rects
}

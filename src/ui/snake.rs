use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::{Phase, Snapshot};
use crate::games::snake::{Cell, Crash, Snake, SnakeEnd};

use super::{centered, game_block, help_line, phase_span, separator};

const HEAD: Color = Color::Rgb(120, 255, 120);
const BODY: Color = Color::Rgb(40, 170, 60);
const FOOD: Color = Color::Rgb(255, 80, 80);
const BOARD: Color = Color::Rgb(18, 24, 18);
const BOARD_ALT: Color = Color::Rgb(22, 30, 22);

/// Each board cell is drawn two columns wide so the grid looks square.
fn field_lines(snake: &Snake) -> Vec<Line<'static>> {
    let n = snake.settings().grid;
    let mut grid: Vec<Vec<(&str, Style)>> = (0..n)
        .map(|y| {
            (0..n)
                .map(|x| {
                    let bg = if (x + y) % 2 == 0 { BOARD } else { BOARD_ALT };
                    ("  ", Style::default().bg(bg))
                })
                .collect()
        })
        .collect();

    let mut put = |cell: Cell, glyph: &'static str, style: Style| {
        if (0..n).contains(&cell.x) && (0..n).contains(&cell.y) {
            grid[cell.y as usize][cell.x as usize] = (glyph, style);
        }
    };

    if let Some(food) = snake.food() {
        put(food, "●●", Style::default().fg(FOOD).bg(BOARD).add_modifier(Modifier::BOLD));
    }
    for (i, cell) in snake.body().iter().enumerate().rev() {
        if i == 0 {
            let head = if snake.end().is_some() { Color::Red } else { HEAD };
            put(*cell, "██", Style::default().fg(head));
        } else {
            put(*cell, "▓▓", Style::default().fg(BODY));
        }
    }

    grid.into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(glyph, style)| Span::styled(glyph, style))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn end_reason(end: Option<SnakeEnd>) -> &'static str {
    match end {
        Some(SnakeEnd::Crashed(Crash::Wall)) => "Hit the wall",
        Some(SnakeEnd::Crashed(Crash::Body)) => "Bit yourself",
        Some(SnakeEnd::BoardFilled) => "Board filled!",
        None => "",
    }
}

pub fn render(frame: &mut Frame, area: Rect, view: &Snapshot<'_, Snake>, best: u32) {
    let block = game_block(" 🐍 Snake ", Color::Rgb(40, 120, 40), Color::Rgb(80, 220, 80));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(4),    // Board
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let snake = view.game;
    let status = Line::from(vec![
        Span::styled(
            format!(" Score: {} ", view.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(format!("🏆 Best: {} ", best.max(view.score)), Style::default().fg(Color::Cyan)),
        separator(),
        Span::styled(format!("Length: {} ", snake.body().len()), Style::default().fg(Color::Green)),
        separator(),
        phase_span(view.phase),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let n = snake.settings().grid.max(0) as u16;
    let board_area = centered(chunks[1], n * 2 + 2, n + 2);
    let board = Paragraph::new(field_lines(snake)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(60, 120, 60))),
    );
    frame.render_widget(board, board_area);

    let help = if view.phase == Phase::GameOver {
        Line::from(vec![
            Span::styled(
                format!(" 💀 {}! ", end_reason(snake.end())),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("Score: {} │ Enter or R to play again, Esc for menu", view.score),
                Style::default().fg(Color::Gray),
            ),
        ])
    } else {
        help_line(
            view.phase,
            "Press ENTER or an arrow to start!",
            &[("↑↓←→", "Steer"), ("Space/P", "Pause"), ("R", "Restart"), ("Esc", "Menu")],
        )
    };
    frame.render_widget(Paragraph::new(help), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::snake::{Direction as Heading, SnakeSettings};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn board_shows_head_body_and_food() {
        let settings = SnakeSettings {
            grid: 5,
            ..SnakeSettings::default()
        };
        let snake = Snake::with_layout(
            settings,
            vec![Cell::new(2, 2), Cell::new(1, 2)],
            Heading::Right,
            Cell::new(4, 0),
        );
        let lines = field_lines(&snake);
        assert_eq!(lines.len(), 5);
        assert_eq!(text(&lines[0]), "        ●●");
        assert_eq!(text(&lines[2]), "  ▓▓██    ");
    }
}

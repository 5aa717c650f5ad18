use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::{Phase, Snapshot};
use crate::games::tictactoe::{Mark, Outcome, TicTacToe};

use super::{centered, game_block, help_line, phase_span, separator};

const CELL_W: u16 = 9;
const CELL_H: u16 = 3;

fn mark_color(mark: Mark) -> Color {
    match mark {
        Mark::X => Color::Rgb(80, 200, 255),
        Mark::O => Color::Rgb(255, 120, 120),
    }
}

/// Screen rect of each board cell that fits, paired with its index.
fn cell_rects(board: Rect) -> Vec<(Rect, usize)> {
    (0..9usize)
        .map(|i| {
            let (col, row) = ((i % 3) as u16, (i / 3) as u16);
            (Rect::new(board.x + col * CELL_W, board.y + row * CELL_H, CELL_W, CELL_H), i)
        })
        .filter(|(r, _)| r.right() <= board.right() && r.bottom() <= board.bottom())
        .collect()
}

fn status_text(game: &TicTacToe, thinking: bool) -> (String, Color) {
    match game.outcome() {
        Some(Outcome::Winner { mark, .. }) => (format!("{} wins!", mark.symbol()), mark_color(mark)),
        Some(Outcome::Draw) => ("It's a draw!".to_string(), Color::Gray),
        None if thinking => ("AI is thinking…".to_string(), mark_color(Mark::O)),
        None => (format!("Next player: {}", game.turn().symbol()), mark_color(game.turn())),
    }
}

/// Draws the board and returns the clickable cell regions.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    view: &Snapshot<'_, TicTacToe>,
    cursor: usize,
    ai_pending: bool,
) -> Vec<(Rect, usize)> {
    let block = game_block(" ❌ Tic-Tac-Toe ", Color::Rgb(140, 80, 30), Color::Rgb(255, 160, 60));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Length(1),
            Constraint::Min(CELL_H * 3), // Board
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let game = view.game;
    let tally = game.tally();
    let mode = if game.vs_ai() { "vs AI" } else { "2 players" };
    let status = Line::from(vec![
        Span::styled(
            format!(" X: {} ", tally.x),
            Style::default().fg(mark_color(Mark::X)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" O: {} ", tally.o),
            Style::default().fg(mark_color(Mark::O)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" Draws: {} ", tally.draws), Style::default().fg(Color::Gray)),
        separator(),
        Span::styled(format!("{} ", mode), Style::default().fg(Color::Cyan)),
        separator(),
        phase_span(view.phase),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let (text, color) = status_text(game, ai_pending);
    let turn = Paragraph::new(Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD)))
        .alignment(Alignment::Center);
    frame.render_widget(turn, chunks[1]);

    let winning: Vec<usize> = match game.outcome() {
        Some(Outcome::Winner { line, .. }) => line.to_vec(),
        _ => Vec::new(),
    };
    let board = centered(chunks[2], CELL_W * 3, CELL_H * 3);
    let rects = cell_rects(board);
    for &(rect, i) in &rects {
        let selected = i == cursor && game.outcome().is_none();
        let won = winning.contains(&i);
        let border = if won {
            Color::Rgb(255, 220, 80)
        } else if selected {
            Color::White
        } else {
            Color::Rgb(70, 70, 90)
        };
        let cell_block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected { BorderType::Thick } else { BorderType::Plain })
            .border_style(Style::default().fg(border));
        let content = match game.board()[i] {
            Some(mark) => {
                let mut style = Style::default().fg(mark_color(mark)).add_modifier(Modifier::BOLD);
                if won {
                    style = style.bg(Color::Rgb(60, 50, 20));
                }
                Span::styled(mark.symbol().to_string(), style)
            }
            None => Span::styled(format!("{}", i + 1), Style::default().fg(Color::Rgb(60, 60, 70))),
        };
        frame.render_widget(
            Paragraph::new(content).alignment(Alignment::Center).block(cell_block),
            rect,
        );
    }

    let help = if view.phase == Phase::GameOver {
        Line::from(vec![
            Span::styled(" Round over! ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled("N/R new round │ M switch mode │ X clear tally │ Esc menu", Style::default().fg(Color::Gray)),
        ])
    } else {
        help_line(
            view.phase,
            "X moves first!",
            &[("↑↓←→", "Move"), ("Enter/1-9/click", "Mark"), ("M", "Mode"), ("N", "New round")],
        )
    };
    frame.render_widget(Paragraph::new(help), chunks[3]);

    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_tile_the_board_row_major() {
        let rects = cell_rects(Rect::new(10, 4, CELL_W * 3, CELL_H * 3));
        assert_eq!(rects.len(), 9);
        assert_eq!(rects[0], (Rect::new(10, 4, CELL_W, CELL_H), 0));
        assert_eq!(rects[5], (Rect::new(10 + 2 * CELL_W, 4 + CELL_H, CELL_W, CELL_H), 5));
    }

    #[test]
    fn cramped_board_drops_cells_that_do_not_fit() {
        let rects = cell_rects(Rect::new(0, 0, CELL_W * 2, CELL_H * 3));
        let kept: Vec<usize> = rects.iter().map(|(_, i)| *i).collect();
        assert_eq!(kept, vec![0, 1, 3, 4, 6, 7]);
    }

    #[test]
    fn status_shows_whose_turn() {
        let game = TicTacToe::new(crate::games::tictactoe::Opponent::Human);
        assert_eq!(status_text(&game, false).0, "Next player: X");
    }
}

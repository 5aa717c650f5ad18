use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::engine::{Phase, Snapshot};
use crate::games::flappy::{
    Crash, Flappy, BIRD_SIZE, BIRD_X, FIELD_HEIGHT, FIELD_WIDTH, GROUND_HEIGHT, PIPE_WIDTH,
};

use super::{centered, game_block, help_line, phase_span, separator};

const SKY: Color = Color::Rgb(40, 110, 170);
const PIPE: Color = Color::Rgb(60, 180, 60);
const PIPE_EDGE: Color = Color::Rgb(30, 110, 30);
const GROUND: Color = Color::Rgb(150, 110, 60);
const BIRD: Color = Color::Rgb(255, 220, 60);

/// Rasterizes the 400x600 playfield onto a `width` x `height` character grid.
fn field_lines(game: &Flappy, width: usize, height: usize, dead: bool) -> Vec<Line<'static>> {
    let sx = FIELD_WIDTH / width as f32;
    let sy = FIELD_HEIGHT / height as f32;
    let ground_top = FIELD_HEIGHT - GROUND_HEIGHT;

    let mut grid: Vec<Vec<(char, Style)>> = (0..height)
        .map(|row| {
            let y = (row as f32 + 0.5) * sy;
            let cell = if y >= ground_top {
                ('▒', Style::default().fg(GROUND).bg(Color::Rgb(110, 80, 40)))
            } else {
                (' ', Style::default().bg(SKY))
            };
            vec![cell; width]
        })
        .collect();

    for pipe in game.pipes() {
        let left = (pipe.x / sx).floor() as i32;
        let right = ((pipe.x + PIPE_WIDTH) / sx).ceil() as i32;
        for col in left.max(0)..right.min(width as i32) {
            let edge = col == left || col == right - 1;
            for (row, line) in grid.iter_mut().enumerate() {
                let y = (row as f32 + 0.5) * sy;
                if y >= ground_top {
                    continue;
                }
                if y < pipe.top_height || y > pipe.gap_bottom() {
                    let color = if edge { PIPE_EDGE } else { PIPE };
                    line[col as usize] = ('█', Style::default().fg(color).bg(SKY));
                }
            }
        }
    }

    let bird = game.bird();
    let col = (BIRD_X / sx) as i32;
    let row = (bird.y / sy) as i32;
    let half = ((BIRD_SIZE / 2.0) / sx).round().max(1.0) as i32;
    let glyph = if dead {
        '✖'
    } else if bird.velocity < 0.0 {
        '▲'
    } else {
        '●'
    };
    if (0..height as i32).contains(&row) {
        for c in (col - half + 1)..(col + half) {
            if (0..width as i32).contains(&c) {
                let g = if c == col { glyph } else { '█' };
                grid[row as usize][c as usize] = (g, Style::default().fg(BIRD).bg(SKY).add_modifier(Modifier::BOLD));
            }
        }
    }

    grid.into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|(ch, style)| Span::styled(ch.to_string(), style))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, view: &Snapshot<'_, Flappy>, best: u32) {
    let block = game_block(" 🐦 Flappy Bird ", Color::Rgb(140, 120, 40), Color::Rgb(255, 220, 80));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(6),    // Field
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let status = Line::from(vec![
        Span::styled(
            format!(" Score: {} ", view.score),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(format!("🏆 Best: {} ", best.max(view.score)), Style::default().fg(Color::Cyan)),
        separator(),
        phase_span(view.phase),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    // Terminal cells are about twice as tall as wide; keep the 2:3 field roughly in proportion.
    let height = chunks[1].height;
    let width = (height as u32 * 4 / 3).min(chunks[1].width as u32) as u16;
    let field = centered(chunks[1], width, height);
    if field.width > 0 && field.height > 0 {
        let dead = view.phase == Phase::GameOver;
        let lines = field_lines(view.game, field.width as usize, field.height as usize, dead);
        frame.render_widget(Paragraph::new(lines), field);
    }

    let help = if view.phase == Phase::GameOver {
        let reason = match view.game.crash() {
            Some(Crash::Ceiling) => "Flew too high",
            Some(Crash::Floor) => "Hit the ground",
            Some(Crash::Pipe) | None => "Hit a pipe",
        };
        Line::from(vec![
            Span::styled(
                format!(" 💀 {}! ", reason),
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
            "Press SPACE or click to flap!",
            &[("Space/↑/click", "Flap"), ("P", "Pause"), ("R", "Restart"), ("Esc", "Menu")],
        )
    };
    frame.render_widget(Paragraph::new(help), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::flappy::{Bird, Pipe};

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn pipes_leave_the_gap_open() {
        let pipe = Pipe {
            x: 300.0,
            top_height: 200.0,
            scored: false,
        };
        let game = Flappy::with_bird(Bird { y: 100.0, velocity: 0.0 }, vec![pipe], 1);
        let lines = field_lines(&game, 40, 60, false);
        assert_eq!(lines.len(), 60);
        // Row 10 is y = 105, above the gap: pipe columns 30..38 are solid.
        assert!(text(&lines[10]).chars().skip(30).take(8).all(|c| c == '█'));
        // Row 25 is y = 255, inside the gap.
        assert!(!text(&lines[25]).chars().skip(30).any(|c| c == '█'));
        // Bottom rows are ground.
        assert!(text(&lines[59]).chars().all(|c| c == '▒'));
    }
}

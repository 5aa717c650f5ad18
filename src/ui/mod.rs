pub mod flappy;
pub mod home;
pub mod memory;
pub mod snake;
pub mod tabs;
pub mod tictactoe;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};
use crate::engine::Phase;
use crate::games::GameId;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),   // Content
        ])
        .split(frame.area());

    tabs::render_tabs(frame, app, chunks[0]);

    app.hit_regions = match app.current_tab {
        Tab::Home => {
            home::render_home(frame, chunks[1], app.selected_game, &app.scores);
            Vec::new()
        }
        Tab::Snake => {
            snake::render(frame, chunks[1], &app.snake.session.snapshot(), app.best(GameId::Snake));
            Vec::new()
        }
        Tab::TicTacToe => tictactoe::render(
            frame,
            chunks[1],
            &app.tictactoe.session.snapshot(),
            app.tictactoe.input.keymap().cursor(),
            app.tictactoe.session.awaiting_timer(),
        ),
        Tab::Memory => memory::render(
            frame,
            chunks[1],
            &app.memory.session.snapshot(),
            app.memory.input.keymap().cursor(),
        ),
        Tab::Flappy => {
            flappy::render(frame, chunks[1], &app.flappy.session.snapshot(), app.best(GameId::Flappy));
            Vec::new()
        }
    };

    if let Some(game) = app.new_best {
        let over = app.phase(app.current_tab) == Some(Phase::GameOver);
        if over && app.current_tab.game() == Some(game) {
            render_new_best(frame, chunks[1], app.best(game));
        }
    }
}

/// Outer frame shared by every game screen.
fn game_block(title: &str, border: Color, accent: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title)
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
}

fn separator() -> Span<'static> {
    Span::styled(" │ ", Style::default().fg(Color::DarkGray))
}

fn phase_span(phase: Phase) -> Span<'static> {
    let color = match phase {
        Phase::Idle => Color::Rgb(80, 200, 255),
        Phase::Running => Color::Green,
        Phase::Paused => Color::Yellow,
        Phase::GameOver => Color::Red,
    };
    Span::styled(
        phase.label().to_uppercase(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Bottom line: the phase prompt followed by the key hints.
fn help_line(phase: Phase, prompt: &str, hints: &[(&str, &str)]) -> Line<'static> {
    let lead = match phase {
        Phase::Idle => format!(" ▶ {} ", prompt),
        Phase::Paused => " ⏸ PAUSED ".to_string(),
        Phase::GameOver => " 💀 GAME OVER! R to restart ".to_string(),
        Phase::Running => String::from(" "),
    };
    let mut spans = vec![Span::styled(
        lead,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];
    for (i, (key, what)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))));
        }
        spans.push(Span::styled(format!("{} {} ", key, what), Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Area of `width` x `height` centered in `area`, clipped to it.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn render_new_best(frame: &mut Frame, area: Rect, best: u32) {
    let banner = Rect::new(area.x + 2, area.y + 1, 24u16.min(area.width.saturating_sub(4)), 1);
    if banner.width == 0 {
        return;
    }
    let line = Line::from(Span::styled(
        format!(" 🏆 New best: {} ", best),
        Style::default()
            .fg(Color::Rgb(15, 15, 25))
            .bg(Color::Rgb(255, 220, 80))
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Clear, banner);
    frame.render_widget(Paragraph::new(line), banner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_clips_to_the_area() {
        let area = Rect::new(2, 3, 10, 4);
        assert_eq!(centered(area, 6, 2), Rect::new(4, 4, 6, 2));
        assert_eq!(centered(area, 40, 40), area);
    }
}

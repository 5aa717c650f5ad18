use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{App, Tab};
use crate::engine::Phase;

const ACTIVE: Color = Color::Rgb(255, 220, 80);
const INACTIVE: Color = Color::Rgb(120, 120, 140);

/// Small marker after a game's tab title so a paused or finished run is visible from anywhere.
fn phase_marker(phase: Option<Phase>) -> Option<Span<'static>> {
    let (glyph, color) = match phase? {
        Phase::Idle => return None,
        Phase::Running => ("●", Color::Green),
        Phase::Paused => ("⏸", Color::Yellow),
        Phase::GameOver => ("✖", Color::Red),
    };
    Some(Span::styled(glyph, Style::default().fg(color)))
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|tab| {
            let color = if *tab == app.current_tab { ACTIVE } else { INACTIVE };
            let mut spans = vec![Span::styled(tab.title(), Style::default().fg(color))];
            spans.extend(phase_marker(app.phase(*tab)));
            Line::from(spans)
        })
        .collect();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .border_type(BorderType::Rounded)
        .title(" 🎪 Festplay ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    if !app.scores.is_persistent() {
        block = block.title_bottom(
            Line::from(Span::styled(" scores not saved ", Style::default().fg(INACTIVE))).right_aligned(),
        );
    }

    let tabs = Tabs::new(titles)
        .block(block)
        .select(app.current_tab.index())
        .highlight_style(Style::default().fg(ACTIVE).add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, area);
}

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::games::GameId;
use crate::scores::BestScores;

const BANNER: &str = r#"
 ███████╗███████╗███████╗████████╗██████╗ ██╗      █████╗ ██╗   ██╗
 ██╔════╝██╔════╝██╔════╝╚══██╔══╝██╔══██╗██║     ██╔══██╗╚██╗ ██╔╝
 █████╗  █████╗  ███████╗   ██║   ██████╔╝██║     ███████║ ╚████╔╝
 ██╔══╝  ██╔══╝  ╚════██║   ██║   ██╔═══╝ ██║     ██╔══██║  ╚██╔╝
 ██║     ███████╗███████║   ██║   ██║     ███████╗██║  ██║   ██║
 ╚═╝     ╚══════╝╚══════╝   ╚═╝   ╚═╝     ╚══════╝╚═╝  ╚═╝   ╚═╝   "#;

struct GameTile {
    icon: &'static str,
    desc: &'static str,
    color: Color,
    border_color: Color,
    controls: &'static [(&'static str, &'static str)],
}

const GAME_TILES: [GameTile; 4] = [
    GameTile {
        icon: "🐍",
        desc: "Eat, grow,\ndon't bite yourself",
        color: Color::Rgb(80, 220, 80),
        border_color: Color::Rgb(40, 120, 40),
        controls: &[
            ("↑ ↓ ← → / WASD", "Steer"),
            ("Enter", "Start"),
            ("Space / P", "Pause"),
            ("R", "Restart"),
        ],
    },
    GameTile {
        icon: "❌",
        desc: "Three in a row,\nfriend or AI",
        color: Color::Rgb(255, 160, 60),
        border_color: Color::Rgb(140, 80, 30),
        controls: &[
            ("↑ ↓ ← →", "Move cursor"),
            ("Enter / Space", "Place mark"),
            ("1-9 / click", "Place directly"),
            ("M", "Toggle AI opponent"),
            ("X", "Clear tally"),
            ("N / R", "New round"),
        ],
    },
    GameTile {
        icon: "🃏",
        desc: "Flip cards,\nfind the pairs",
        color: Color::Rgb(200, 120, 255),
        border_color: Color::Rgb(100, 60, 140),
        controls: &[
            ("↑ ↓ ← →", "Move cursor"),
            ("Enter / Space", "Flip card"),
            ("click", "Flip card"),
            ("1 / 2 / 3", "Easy / Medium / Hard"),
            ("R", "Reshuffle"),
        ],
    },
    GameTile {
        icon: "🐦",
        desc: "Flap through\nthe pipes",
        color: Color::Rgb(255, 220, 80),
        border_color: Color::Rgb(140, 120, 40),
        controls: &[
            ("Space / ↑ / W", "Flap"),
            ("click", "Flap"),
            ("Enter", "Start"),
            ("P", "Pause"),
            ("R", "Restart"),
        ],
    },
];

const KEY_STYLE: Style = Style::new().fg(Color::Rgb(80, 200, 255));
const TEXT_STYLE: Style = Style::new().fg(Color::Rgb(140, 140, 140));

fn key_line(key: &str, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<17}", key), KEY_STYLE),
        Span::styled(what.to_string(), TEXT_STYLE),
    ])
}

fn render_game_tile(frame: &mut Frame, area: Rect, game: GameId, tile: &GameTile, selected: bool) {
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { tile.border_color };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let name_color = if selected { Color::Rgb(255, 255, 255) } else { tile.color };
    let desc_color = if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(120, 120, 140) };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", game.index() + 1),
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ", tile.icon)),
        Span::styled(game.name(), Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
    ])];
    lines.extend(
        tile.desc
            .split('\n')
            .map(|l| Line::from(Span::styled(l, Style::default().fg(desc_color)))),
    );
    if selected {
        lines.push(Line::from(Span::styled(
            "▶ Enter to play",
            Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD),
        )));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

pub fn render_home(frame: &mut Frame, area: Rect, selected_game: usize, scores: &BestScores) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Banner
            Constraint::Length(2), // Subtitle
            Constraint::Length(7), // Game tiles
            Constraint::Min(9),    // Controls area
        ])
        .split(area);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(80, 200, 255)))
        .alignment(Alignment::Center);
    frame.render_widget(banner, chunks[0]);

    let subtitle = Paragraph::new(Line::from(Span::styled(
        "  🎪 Four little games, one terminal 🎪  ",
        Style::default()
            .fg(Color::Rgb(255, 220, 80))
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(subtitle, chunks[1]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(chunks[2]);
    for (i, game) in GameId::all().iter().enumerate() {
        render_game_tile(frame, cols[i], *game, &GAME_TILES[i], selected_game == i);
    }

    let ctrl_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(40),
            Constraint::Percentage(25),
        ])
        .split(chunks[3]);

    let navigation = Paragraph::new(vec![
        Line::from(""),
        key_line("Tab / Shift+Tab", "Switch tabs"),
        key_line("1-4", "Launch game"),
        key_line("← →", "Select game"),
        key_line("Enter", "Play selected"),
        key_line("Esc", "Return to Home"),
        key_line("q / Ctrl+C", "Quit"),
    ])
    .block(panel(" ⌨ Navigation ", Color::Rgb(60, 150, 200), Color::Rgb(200, 120, 255)));
    frame.render_widget(navigation, ctrl_cols[0]);

    let game = GameId::all()[selected_game];
    let tile = &GAME_TILES[selected_game];
    let mut controls = vec![Line::from("")];
    controls.extend(tile.controls.iter().map(|(key, what)| key_line(key, what)));
    let game_ctrl = Paragraph::new(controls).block(panel(
        &format!(" 🎮 {} Controls ", game.name()),
        Color::Rgb(50, 100, 140),
        tile.color,
    ));
    frame.render_widget(game_ctrl, ctrl_cols[1]);

    let mut best_lines = vec![Line::from("")];
    for game in GameId::all().iter().filter(|g| g.best_key().is_some()) {
        best_lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", game.name()), TEXT_STYLE),
            Span::styled(
                format!("{:>5}", scores.best(*game)),
                Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    if !scores.is_persistent() {
        best_lines.push(Line::from(""));
        best_lines.push(Line::from(Span::styled(
            "  this session only",
            Style::default().fg(Color::Rgb(100, 100, 120)).add_modifier(Modifier::ITALIC),
        )));
    }
    let best = Paragraph::new(best_lines).block(panel(
        " 🏆 Best ",
        Color::Rgb(140, 120, 40),
        Color::Rgb(255, 220, 80),
    ));
    frame.render_widget(best, ctrl_cols[2]);
}

fn panel(title: &str, border: Color, accent: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(title.to_string())
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
}

use ratatui::{prelude::*, widgets::*};

fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::from(key).light_cyan().bold(),
        Span::raw(" : "),
        Span::raw(description),
    ])
}

/// Draw the key binding popup for the selected tab over `area`
pub fn render_help(area: Rect, buf: &mut Buffer, selected_tab: usize) {
    let mut lines = vec![
        key_line("  q  ", "Close the dashboard (jobs keep training)"),
        key_line("  h  ", "Toggle help popup"),
        key_line(" Tab ", "Switch tabs"),
    ];

    match selected_tab {
        0 => lines.extend([
            key_line("⬆ / ⬇", "Select a job"),
            key_line("j / k", "Select a job"),
        ]),
        1 => lines.extend([
            key_line("  s  ", "Toggle the target selector"),
            key_line("  f  ", "Focus on the selected target only"),
            key_line("⬆ / ⬇", "Switch log target"),
            key_line("j / k", "Switch log target"),
            key_line("⬅ / ➡", "Show fewer/more log levels"),
            key_line("- / +", "Capture fewer/more log levels"),
            key_line("PgUp ", "Pause and scroll up"),
            key_line("PgDn ", "Pause and scroll down"),
            key_line(" Esc ", "Resume following new lines"),
        ]),
        _ => {}
    }

    let [_, center_vert, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length((lines.len() + 4) as u16),
        Constraint::Fill(1),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(64),
        Constraint::Fill(1),
    ])
    .areas(center_vert);

    Clear.render(center, buf);

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1))
                .title("Help"),
        )
        .wrap(Wrap { trim: false })
        .render(center, buf);
}

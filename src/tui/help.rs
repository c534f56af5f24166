use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(text),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, countdown_secs: u64) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("↑/↓", Style::default().fg(Color::Magenta)),
            Span::raw(" or "),
            Span::styled("j/k", Style::default().fg(Color::Magenta)),
            Span::raw("  Select role"),
        ]),
        key_line("Enter", 7, "Analyze selected role"),
        key_line("a", 11, "Show trends for all roles"),
        key_line("e", 11, "Export displayed report as JSON"),
        key_line("c", 11, "Export displayed report as CSV"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("How it works:"),
        Line::from(format!(
            "  Analyzing a role asks the backend to crawl fresh postings, waits {countdown_secs} seconds,"
        )),
        Line::from("  then loads the aggregated trends for that role."),
        Line::from("  Only one analysis runs at a time unless started with --on-busy replace."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}

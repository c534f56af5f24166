use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use super::state::UiState;
use crate::charts::{BarSeries, Orientation};

const SKILLS_COLOR: Color = Color::Rgb(0x43, 0x61, 0xee);
const LOCATIONS_COLOR: Color = Color::Rgb(0x4c, 0xc9, 0xf0);
const COMPANIES_COLOR: Color = Color::Rgb(0xf8, 0x96, 0x1e);

/// Shorten a label to `max` characters, marking the cut with an ellipsis.
pub fn truncate_label(label: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if label.chars().count() > max {
        let mut s: String = label.chars().take(max.saturating_sub(1)).collect();
        s.push('…');
        s
    } else {
        label.to_string()
    }
}

/// Draw the 2×2 chart grid.
pub fn draw_chart_grid(f: &mut Frame, area: Rect, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);

    let cells = [top[0], top[1], bottom[0], bottom[1]];
    let colors = [SKILLS_COLOR, SKILLS_COLOR, LOCATIONS_COLOR, COMPANIES_COLOR];
    for (((title, series, orientation), cell), color) in
        state.charts.panels().into_iter().zip(cells).zip(colors)
    {
        draw_bar_panel(f, cell, title, series, orientation, color);
    }
}

/// Render one bar chart inside a bordered panel. Empty series show a placeholder.
pub fn draw_bar_panel(
    f: &mut Frame,
    area: Rect,
    title: &str,
    series: &BarSeries,
    orientation: Orientation,
    color: Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(title.to_string()));

    if series.is_empty() {
        let empty = Paragraph::new("No data")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2);
    let n = series.values.len().max(1) as u16;

    let (label_max, bar_width) = match orientation {
        // Labels take up to a third of the panel.
        Orientation::Horizontal => ((inner_width / 3).max(4) as usize, 1),
        Orientation::Vertical => {
            let w = (inner_width.saturating_sub(n) / n).clamp(3, 12);
            (w as usize, w)
        }
    };
    let bars: Vec<Bar> = series
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .label(Line::from(truncate_label(label, label_max)))
                .value(value)
                .text_value(value.to_string())
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = match orientation {
        Orientation::Horizontal => BarChart::default()
            .direction(Direction::Horizontal)
            .bar_gap(0),
        Orientation::Vertical => BarChart::default()
            .direction(Direction::Vertical)
            .bar_gap(1),
    }
    .bar_width(bar_width)
    .data(BarGroup::default().bars(&bars));

    f.render_widget(
        chart
            .block(block)
            .value_style(Style::default().fg(Color::White).bg(color)),
        area,
    );
}

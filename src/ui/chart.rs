use crate::models::transaction::Transaction;
use crate::operations::reports::Report;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Renders the active report into the chart panel. The panel is rebuilt
/// from scratch on every frame, so switching reports or mutating data
/// needs no invalidation logic.
pub fn render_report(frame: &mut Frame, area: Rect, report: Report, transactions: &[Transaction]) {
    let block = Block::default()
        .title(Span::styled(
            report.title(),
            Style::default()
                .fg(report_color(report))
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = report.rows(transactions);
    if rows.is_empty() {
        let empty = Paragraph::new(no_data_message(report))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    if report == Report::Balance {
        render_balance_rows(frame, inner, &rows);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(24), Constraint::Length(28)])
        .split(inner);

    render_bars(frame, layout[0], &rows, report_color(report));
    render_totals(frame, layout[1], &rows, report_color(report));
}

fn report_color(report: Report) -> Color {
    match report {
        Report::ExpensesByCategory | Report::MonthlyExpenses => Color::Red,
        Report::IncomeByCategory | Report::MonthlyIncome => Color::Green,
        Report::Balance => Color::Blue,
    }
}

fn no_data_message(report: Report) -> &'static str {
    match report {
        Report::ExpensesByCategory | Report::MonthlyExpenses => "No expense data to chart",
        Report::IncomeByCategory | Report::MonthlyIncome => "No income data to chart",
        Report::Balance => "No data to compute a balance",
    }
}

fn render_bars(frame: &mut Frame, area: Rect, rows: &[(String, Decimal)], color: Color) {
    let data: Vec<(&str, u64)> = rows
        .iter()
        .map(|(label, value)| (label.as_str(), chart_value(*value)))
        .collect();

    // Wide enough for month labels, capped so long category names do not
    // push every other bar off screen.
    let bar_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(3)
        .clamp(3, 12) as u16;

    let chart = BarChart::default()
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(chart, area);
}

/// Exact sums next to the chart; the bar heights above are rounded to
/// whole units.
fn render_totals(frame: &mut Frame, area: Rect, rows: &[(String, Decimal)], color: Color) {
    let mut lines = vec![Line::from(Span::styled(
        "Totals",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    for (label, value) in rows {
        let mut label = label.clone();
        if label.len() > 14 {
            label.truncate(13);
            label.push('~');
        }
        lines.push(Line::from(vec![
            Span::styled(format!("{label:<15}"), Style::default().fg(Color::White)),
            Span::styled(
                format!("{:>10}", format!("{value:.2}")),
                Style::default().fg(color),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// The balance series is signed, which `BarChart` cannot draw, so each
/// month becomes a block-bar row colored by the sign of its net.
fn render_balance_rows(frame: &mut Frame, area: Rect, rows: &[(String, Decimal)]) {
    let max_abs = rows
        .iter()
        .map(|(_, value)| value.abs().to_f64().unwrap_or(0.0))
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let bar_width = (area.width as usize).saturating_sub(24).clamp(8, 40);

    let lines: Vec<Line> = rows
        .iter()
        .map(|(month, value)| {
            let magnitude = value.abs().to_f64().unwrap_or(0.0);
            let filled = ((magnitude / max_abs) * bar_width as f64).round() as usize;
            let filled = filled.min(bar_width);
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_width - filled));

            let (sign, color) = if value.is_sign_negative() {
                ("-", Color::Red)
            } else {
                ("+", Color::Green)
            };

            Line::from(vec![
                Span::styled(format!("{month}  "), Style::default().fg(Color::DarkGray)),
                Span::styled(bar, Style::default().fg(color)),
                Span::styled(
                    format!("  {sign}{:.2}", value.abs()),
                    Style::default().fg(color),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn chart_value(value: Decimal) -> u64 {
    value.to_f64().unwrap_or(0.0).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_chart_value_rounds_and_floors_at_zero() {
        assert_eq!(chart_value(Decimal::from_str("12.49").unwrap()), 12);
        assert_eq!(chart_value(Decimal::from_str("12.50").unwrap()), 13);
        assert_eq!(chart_value(Decimal::from_str("-3").unwrap()), 0);
    }
}

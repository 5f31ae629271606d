//! Terminal rendering of the dashboard views.

use comfy_table::{Cell, Color, ContentArrangement, Table};
use core_types::Severity;
use dashboard::adapter::{RateRow, SectorOutlook};
use dashboard::{DashboardView, StockDetailView, TelemetryView, Widget};
use rust_decimal::Decimal;
use std::fmt::Write;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Favorable => Color::Green,
        Severity::Caution => Color::Yellow,
        Severity::Adverse => Color::Red,
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pct(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{}%", v))
}

fn widget_line<T>(label: &str, widget: &Widget<T>, show: impl Fn(&T) -> String) -> String {
    match widget {
        Widget::Available(value) => format!("{}: {}", label, show(value)),
        Widget::Unavailable { reason } => format!("{}: unavailable ({})", label, reason),
    }
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut table = new_table(vec![
        "Symbol",
        "Company",
        "Sector",
        "Price",
        "Score",
        "Recommendation",
        "Sentiment",
    ]);
    for record in &view.records {
        table.add_row(vec![
            Cell::new(&record.symbol),
            Cell::new(&record.company_name),
            Cell::new(&record.sector),
            Cell::new(format!("${:.2}", record.price)),
            Cell::new(record.score.normalize()),
            Cell::new(&record.recommendation).fg(severity_color(record.recommendation_severity)),
            Cell::new(format!("{:?} ({})", record.sentiment_tier, record.sentiment_score.normalize()))
                .fg(severity_color(record.sentiment_severity)),
        ]);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Last analysis: {}", view.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(sector) = &view.sector {
        let _ = writeln!(out, "Sector: {}", sector);
    }
    let _ = writeln!(out, "{}", table);
    let _ = writeln!(out, "{}", outlooks(&view.outlooks));
    out
}

fn outlooks(rows: &[SectorOutlook]) -> Table {
    let mut table = new_table(vec!["Sector", "Buy", "Hold", "Sell", "Outlook"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.sector),
            Cell::new(row.buy),
            Cell::new(row.hold),
            Cell::new(row.sell),
            Cell::new(format!("{:?}", row.outlook)).fg(severity_color(row.severity)),
        ]);
    }
    table
}

pub fn stock_detail(view: &StockDetailView) -> String {
    let record = &view.record;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}) | {} | ${:.2} | {}",
        record.company_name, record.symbol, record.sector, record.price, record.recommendation
    );
    let _ = writeln!(
        out,
        "Sentiment: {:?} ({}) {}",
        record.sentiment_tier,
        record.sentiment_score.normalize(),
        record.sentiment_summary
    );
    if let Some(summary) = &view.technical_summary {
        let _ = writeln!(out, "Technical summary: {}", summary);
    }

    let _ = writeln!(
        out,
        "{}",
        widget_line("Chart", &view.chart, |chart| {
            let last_average = chart
                .moving_average
                .iter()
                .rev()
                .find_map(|p| p.value)
                .map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v));
            format!(
                "{} points, axis {:.2}..{:.2}, {}-period MA {}",
                chart.points.len(),
                chart.display_range.lower,
                chart.display_range.upper,
                chart.moving_average_window,
                last_average
            )
        })
    );
    let _ = writeln!(
        out,
        "{}",
        widget_line("Momentum", &view.momentum, |m| format!(
            "RSI {} ({:?}), MACD {} ({:?})",
            m.oscillator_value.normalize(),
            m.zone,
            m.signed_momentum.normalize(),
            m.direction
        ))
    );
    for average in &view.moving_averages {
        let label = format!("{}-Day MA", average.window);
        let _ = writeln!(
            out,
            "{}",
            widget_line(&label, &average.reading, |r| format!(
                "${:.2} ({:?})",
                r.average, r.position
            ))
        );
    }
    let _ = writeln!(
        out,
        "{}",
        widget_line("Levels", &view.levels, |l| format!(
            "support ${:.2}, resistance ${:.2}",
            l.support, l.resistance
        ))
    );
    let _ = writeln!(
        out,
        "{}",
        widget_line("Interpretation", &view.interpretation, String::clone)
    );

    if !view.news.is_empty() {
        let mut table = new_table(vec!["Date", "Source", "Title", "Sentiment"]);
        for item in &view.news {
            table.add_row(vec![
                Cell::new(item.date),
                Cell::new(&item.source),
                Cell::new(&item.title),
                Cell::new(format!("{:?} ({})", item.tier, item.sentiment.normalize()))
                    .fg(severity_color(item.severity)),
            ]);
        }
        let _ = writeln!(out, "{}", table);
    }
    out
}

fn rate_rows(rows: &[RateRow]) -> Table {
    let mut table = new_table(vec!["Endpoint", "Calls", "Success", "Errors", "Success %", "Error %"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.dimension),
            Cell::new(row.total),
            Cell::new(row.successful),
            Cell::new(row.failed),
            Cell::new(pct(row.success_rate_pct)),
            Cell::new(pct(row.error_rate_pct)),
        ]);
    }
    table
}

pub fn telemetry(view: &TelemetryView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fetched: {}", view.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(
        out,
        "{}",
        widget_line("API calls", &view.overall, |o| format!(
            "{} total, {} successful, {} failed (success {}, errors {})",
            o.total,
            o.successful,
            o.failed,
            pct(o.success_rate_pct),
            pct(o.error_rate_pct)
        ))
    );
    match &view.endpoints {
        Widget::Available(rows) => {
            let _ = writeln!(out, "{}", rate_rows(rows));
        }
        Widget::Unavailable { reason } => {
            let _ = writeln!(out, "Endpoints: unavailable ({})", reason);
        }
    }

    match &view.models {
        Widget::Available(rows) => {
            let mut models = new_table(vec!["Model", "Tokens", "Cost"]);
            for model in rows {
                models.add_row(vec![
                    Cell::new(&model.dimension),
                    Cell::new(model.usage_units),
                    Cell::new(format!("${:.2}", model.cost)),
                ]);
            }
            let _ = writeln!(out, "{}", models);
        }
        Widget::Unavailable { reason } => {
            let _ = writeln!(out, "Models: unavailable ({})", reason);
        }
    }
    let _ = writeln!(
        out,
        "{} | {}",
        widget_line("Tokens", &view.total_tokens, u64::to_string),
        widget_line("Estimated cost", &view.total_cost, |c| format!("${:.2}", c))
    );
    let _ = writeln!(
        out,
        "{}",
        widget_line("Latency (ms)", &view.latency, |l| format!(
            "mean {:.1}, p50 {}, p95 {}, p99 {}, max {}",
            l.mean,
            l.p50.normalize(),
            l.p95.normalize(),
            l.p99.normalize(),
            l.max.normalize()
        ))
    );

    if !view.recent_errors.is_empty() {
        let mut errors = new_table(vec!["Time", "Endpoint", "Error", "Status"]);
        for event in &view.recent_errors {
            errors.add_row(vec![
                Cell::new(event.timestamp.format("%Y-%m-%d %H:%M:%S")),
                Cell::new(&event.endpoint),
                Cell::new(&event.message),
                Cell::new(event.status).fg(Color::Red),
            ]);
        }
        let _ = writeln!(out, "{}", errors);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::telemetry::LatencySummary;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn empty_telemetry() -> TelemetryView {
        TelemetryView {
            fetched_at: Utc.with_ymd_and_hms(2023, 9, 19, 15, 0, 0).unwrap(),
            overall: Widget::Available(RateRow {
                dimension: "all".to_string(),
                total: 0,
                successful: 0,
                failed: 0,
                in_flight: 0,
                success_rate_pct: None,
                error_rate_pct: None,
            }),
            endpoints: Widget::Available(vec![]),
            call_history: vec![],
            models: Widget::Available(vec![]),
            total_tokens: Widget::Available(0),
            total_cost: Widget::Available(Decimal::ZERO),
            token_history: vec![],
            latency: Widget::unavailable("latency_summary: empty series"),
            latency_history: vec![],
            recent_errors: vec![],
        }
    }

    #[test]
    fn absent_rates_render_as_not_available() {
        let text = telemetry(&empty_telemetry());
        assert!(text.contains("success n/a"));
        assert!(text.contains("Latency (ms): unavailable"));
    }

    #[test]
    fn overflowed_totals_render_as_unavailable() {
        let mut view = empty_telemetry();
        view.total_tokens = Widget::unavailable("Arithmetic overflow in total_usage");
        let text = telemetry(&view);
        assert!(text.contains("Tokens: unavailable (Arithmetic overflow"));
        assert!(text.contains("Estimated cost: $0.00"));
    }

    #[test]
    fn latency_summary_is_rendered() {
        let mut view = empty_telemetry();
        view.latency = Widget::Available(LatencySummary {
            count: 3,
            mean: dec!(220),
            p50: dec!(218),
            p95: dec!(232),
            p99: dec!(232),
            max: dec!(232),
        });
        assert!(telemetry(&view).contains("p50 218"));
    }
}

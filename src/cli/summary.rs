use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::charts::{BarChartSpec, HistogramSpec, PieSpec, Reading};
use crate::cli::{chart_options, open_dataset, OutputFormat};
use crate::error::{DashError, Result};
use crate::filter::{FilterState, GenderFilter};
use crate::fmt::{number, percent};
use crate::session::{DashboardUpdate, Session};
use crate::settings::load_settings;

pub fn run(data: Option<&str>, locations: &[String], gender: &str, format: OutputFormat) -> Result<()> {
    let settings = load_settings();
    let dataset = open_dataset(data)?;
    let options = chart_options(&settings, &dataset)?;
    let filter = FilterState {
        locations: locations.iter().cloned().collect(),
        gender: GenderFilter::parse(gender),
    };

    let mut rendered: Option<DashboardUpdate> = None;
    Session::with_filter(&dataset, options, filter, |u: &DashboardUpdate| {
        rendered = Some(u.clone());
    });
    let update = rendered.ok_or_else(|| DashError::Other("dashboard produced no charts".into()))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&update.charts)?;
            println!("{json}");
        }
        OutputFormat::Text => println!("{}", format_text(&update)),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure formatting functions (charts -> String)
// ---------------------------------------------------------------------------

pub fn format_text(update: &DashboardUpdate) -> String {
    let charts = &update.charts;
    let mut out = String::new();
    out.push_str(&format!(
        "Filter: {}  ({} transactions)\n\n",
        update.filter.describe(),
        number(update.rows)
    ));

    let mut table = Table::new();
    table.set_header(vec!["Indicator", "Value"]);
    for spec in [&charts.total_amount, &charts.average_rating] {
        let value = match spec.reading {
            Reading::Value(_) => Cell::new(&spec.display),
            Reading::NoData => Cell::new(spec.display.as_str().dimmed()),
        };
        table.add_row(vec![Cell::new(&spec.title), value]);
    }
    out.push_str(&format!("{table}\n\n"));

    out.push_str(&format_histogram(&charts.histogram));
    out.push_str("\n\n");
    out.push_str(&format_bars(&charts.bars));
    out.push_str("\n\n");
    out.push_str(&format_pie(&charts.pie));
    out
}

/// Non-empty bins only; one column per (location, gender) series.
pub fn format_histogram(spec: &HistogramSpec) -> String {
    if spec.bins.is_empty() {
        return format!("{}\n{}", spec.title.bold(), "No data".dimmed());
    }
    let mut header = vec![spec.x_label.clone()];
    header.extend(spec.series.iter().map(|s| format!("{} {}", s.location, s.gender)));
    header.push("All".to_string());

    let mut table = Table::new();
    table.set_header(header);
    for (i, (bin, total)) in spec.bins.iter().zip(spec.bin_totals()).enumerate() {
        if total == 0 {
            continue;
        }
        let mut row = vec![Cell::new(format!("{:.2} - {:.2}", bin.start, bin.end))];
        row.extend(spec.series.iter().map(|s| Cell::new(s.counts[i])));
        row.push(Cell::new(total));
        table.add_row(row);
    }
    format!("{}\n{table}", spec.title.bold())
}

pub fn format_bars(spec: &BarChartSpec) -> String {
    if spec.groups.is_empty() {
        return format!("{}\n{}", spec.title.bold(), "No data".dimmed());
    }
    let mut table = Table::new();
    table.set_header(vec![spec.x_label.as_str(), "Gender", spec.y_label.as_str()]);
    for group in &spec.groups {
        for bar in &group.bars {
            table.add_row(vec![
                Cell::new(&group.location),
                Cell::new(&bar.gender),
                Cell::new(bar.count),
            ]);
        }
    }
    format!("{}\n{table}", spec.title.bold())
}

pub fn format_pie(spec: &PieSpec) -> String {
    if spec.slices.is_empty() {
        return format!("{}\n{}", spec.title.bold(), "No data".dimmed());
    }
    let mut table = Table::new();
    table.set_header(vec!["Product line", "Purchases", "Share"]);
    for slice in &spec.slices {
        table.add_row(vec![
            Cell::new(&slice.category),
            Cell::new(slice.count),
            Cell::new(percent(slice.fraction)),
        ]);
    }
    format!("{}\n{table}", spec.title.bold())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{render_all, ChartOptions, Palette};
    use crate::pipeline::compute;
    use crate::pipeline::tests::three_rows;

    fn update_for(filter: FilterState) -> String {
        let ds = three_rows();
        let opts = ChartOptions {
            palette: Palette::for_dataset(&ds),
            ..ChartOptions::default()
        };
        let view = compute(&ds, &filter);
        let update = DashboardUpdate {
            rows: view.len(),
            charts: render_all(&view, &opts),
            filter,
        };
        format_text(&update)
    }

    #[test]
    fn test_text_summary_for_single_location() {
        let text = update_for(FilterState::with_locations(["A"]));
        assert!(text.contains("(2 transactions)"));
        assert!(text.contains("30.00 USD"));
        assert!(text.contains("7.00"));
        assert!(text.contains("Food"));
        assert!(text.contains("50.0%"));
    }

    #[test]
    fn test_text_summary_for_empty_subset() {
        let text = update_for(FilterState::with_locations(["C"]));
        assert!(text.contains("(0 transactions)"));
        assert!(text.contains("0.00 USD"));
        assert!(text.contains("No data"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn test_histogram_table_skips_empty_bins() {
        let ds = three_rows();
        let opts = ChartOptions {
            histogram_bins: 4,
            palette: Palette::for_dataset(&ds),
            ..ChartOptions::default()
        };
        let view = compute(&ds, &FilterState::default());
        let table = format_histogram(&crate::charts::histogram(&view, &opts));
        assert!(table.contains("10.00 - 15.00"));
        assert!(!table.contains("15.00 - 20.00"));
        assert!(table.contains("25.00 - 30.00"));
    }
}

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset as Series, GraphType, Paragraph},
    Frame,
};

use crate::charts::{BarChartSpec, ChartOptions, HistogramSpec, IndicatorSpec, PieSpec, NO_DATA};
use crate::cli::{chart_options, open_dataset};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::GenderFilter;
use crate::fmt::{number, percent};
use crate::session::{ChartSink, DashboardUpdate, FilterEvent, Session};
use crate::settings::load_settings;
use crate::tui::{
    hex_color, pattern_glyph, pattern_marker, reading_span, restore_on_panic, FOOTER_STYLE,
    HEADER_STYLE, NO_DATA_STYLE, PANEL_BORDER, SELECTED_STYLE, TITLE_STYLE,
};

const HINTS: &str =
    " Tab=switch control  Up/Down=move  Space=toggle  a=all  c=clear  Left/Right=gender  q=quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Locations,
    Gender,
}

#[derive(Debug, PartialEq, Eq)]
enum DashboardAction {
    Continue,
    Quit,
}

/// Chart sink for the terminal: keeps the latest render for the next draw.
#[derive(Default)]
struct Canvas {
    latest: Option<DashboardUpdate>,
}

impl ChartSink for Canvas {
    fn replace(&mut self, update: &DashboardUpdate) {
        self.latest = Some(update.clone());
    }
}

struct Dashboard<'a> {
    session: Session<'a, Canvas>,
    locations: Vec<String>,
    genders: Vec<GenderFilter>,
    focus: Focus,
    cursor: usize,
    header: String,
}

impl<'a> Dashboard<'a> {
    fn new(dataset: &'a Dataset, options: ChartOptions) -> Self {
        let locations: Vec<String> = dataset.locations().into_iter().map(str::to_string).collect();
        let genders: Vec<GenderFilter> = std::iter::once(GenderFilter::All)
            .chain(dataset.genders().into_iter().map(|g| GenderFilter::Only(g.to_string())))
            .collect();
        let (first, last) = dataset.date_range();
        let source = dataset
            .source()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let header = format!(
            " Supermarket dashboard  {source}  {} transactions, {} to {}",
            number(dataset.len()),
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d"),
        );
        Self {
            session: Session::new(dataset, options, Canvas::default()),
            locations,
            genders,
            focus: Focus::Locations,
            cursor: 0,
            header,
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> DashboardAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return DashboardAction::Quit,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Locations => Focus::Gender,
                    Focus::Gender => Focus::Locations,
                };
            }
            KeyCode::Up => match self.focus {
                Focus::Locations => self.cursor = self.cursor.saturating_sub(1),
                Focus::Gender => self.cycle_gender(-1),
            },
            KeyCode::Down => match self.focus {
                Focus::Locations => {
                    self.cursor = (self.cursor + 1).min(self.locations.len().saturating_sub(1));
                }
                Focus::Gender => self.cycle_gender(1),
            },
            KeyCode::Char(' ') | KeyCode::Enter => {
                if self.focus == Focus::Locations {
                    if let Some(location) = self.locations.get(self.cursor) {
                        self.session.apply(FilterEvent::ToggleLocation(location.clone()));
                    }
                }
            }
            KeyCode::Left => self.cycle_gender(-1),
            KeyCode::Right => self.cycle_gender(1),
            KeyCode::Char('a') => self.session.apply(FilterEvent::SelectAllLocations),
            KeyCode::Char('c') => self.session.apply(FilterEvent::ClearLocations),
            _ => {}
        }
        DashboardAction::Continue
    }

    fn cycle_gender(&mut self, delta: isize) {
        let n = self.genders.len() as isize;
        let current = self
            .genders
            .iter()
            .position(|g| g == &self.session.filter().gender)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(n) as usize;
        self.session
            .apply(FilterEvent::SetGender(self.genders[next].clone()));
    }

    fn draw(&self, frame: &mut Frame) {
        let Some(update) = self.session.sink().latest.as_ref() else {
            return;
        };
        let area = frame.area();
        let filter_rows = (self.locations.len() as u16).max(1) + 2;
        let pie_rows = (update.charts.pie.slices.len() as u16).max(1) + 2;

        let [header_area, filters_area, indicators_area, charts_area, pie_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(filter_rows),
                Constraint::Length(4),
                Constraint::Fill(1),
                Constraint::Length(pie_rows),
                Constraint::Length(1),
            ])
            .areas(area);

        let showing = format!("showing {} ", number(update.rows));
        let pad = (area.width as usize).saturating_sub(self.header.len() + showing.len());
        frame.render_widget(
            Paragraph::new(format!("{}{}{showing}", self.header, " ".repeat(pad))).style(HEADER_STYLE),
            header_area,
        );

        self.draw_filters(frame, filters_area, update);

        let [total_area, rating_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(indicators_area);
        draw_indicator(frame, total_area, &update.charts.total_amount);
        draw_indicator(frame, rating_area, &update.charts.average_rating);

        let [hist_area, bars_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(charts_area);
        draw_histogram(frame, hist_area, &update.charts.histogram);
        draw_bars(frame, bars_area, &update.charts.bars);
        draw_pie(frame, pie_area, &update.charts.pie);

        frame.render_widget(Paragraph::new(HINTS).style(FOOTER_STYLE), hints_area);
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect, update: &DashboardUpdate) {
        let [loc_area, gender_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

        let loc_title = if update.filter.locations.is_empty() {
            "Locations (none ticked = all)"
        } else {
            "Locations"
        };
        let lines: Vec<Line> = self
            .locations
            .iter()
            .enumerate()
            .map(|(i, loc)| {
                let mark = if update.filter.is_location_selected(loc) { "x" } else { " " };
                let text = format!(" [{mark}] {loc}");
                if self.focus == Focus::Locations && i == self.cursor {
                    Line::from(Span::styled(text, SELECTED_STYLE))
                } else {
                    Line::from(text)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(panel(loc_title)), loc_area);

        let gender_text = format!(" < {} > ", update.filter.gender);
        let gender_line = if self.focus == Focus::Gender {
            Line::from(Span::styled(gender_text, SELECTED_STYLE))
        } else {
            Line::from(gender_text)
        };
        frame.render_widget(Paragraph::new(gender_line).block(panel("Gender")), gender_area);
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

fn panel(title: &str) -> Block<'static> {
    Block::bordered()
        .border_style(PANEL_BORDER)
        .title(Span::styled(format!(" {title} "), TITLE_STYLE))
}

fn no_data(block: Block<'static>) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(NO_DATA, NO_DATA_STYLE)))
        .alignment(Alignment::Center)
        .block(block)
}

fn draw_indicator(frame: &mut Frame, area: Rect, spec: &IndicatorSpec) {
    let paragraph = Paragraph::new(Line::from(reading_span(spec)))
        .alignment(Alignment::Center)
        .block(panel(&spec.title));
    frame.render_widget(paragraph, area);
}

/// Series are stacked: each layer is drawn at the running total of itself and
/// the series before it, tallest first, so lower layers paint over the base.
fn draw_histogram(frame: &mut Frame, area: Rect, spec: &HistogramSpec) {
    let block = panel(&spec.title);
    let (Some(first), Some(last)) = (spec.bins.first(), spec.bins.last()) else {
        frame.render_widget(no_data(block), area);
        return;
    };
    let (lo, hi) = (first.start, last.end);
    let mids: Vec<f64> = spec.bins.iter().map(|b| (b.start + b.end) / 2.0).collect();

    let mut running = vec![0usize; spec.bins.len()];
    let mut layers: Vec<Vec<(f64, f64)>> = Vec::with_capacity(spec.series.len());
    for s in &spec.series {
        for (r, c) in running.iter_mut().zip(&s.counts) {
            *r += c;
        }
        layers.push(
            mids.iter()
                .zip(&running)
                .filter(|(_, c)| **c > 0)
                .map(|(x, c)| (*x, *c as f64))
                .collect(),
        );
    }
    let y_max = running.iter().copied().max().unwrap_or(1).max(1) as f64;

    let datasets: Vec<Series> = spec
        .series
        .iter()
        .zip(&layers)
        .rev()
        .map(|(s, points)| {
            Series::default()
                .name(format!("{} {}", s.location, s.gender))
                .marker(pattern_marker(&s.pattern))
                .graph_type(GraphType::Bar)
                .style(Style::default().fg(hex_color(&s.color)))
                .data(points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(spec.x_label.clone())
                .style(FOOTER_STYLE)
                .bounds([lo, hi])
                .labels([format!("{lo:.0}"), format!("{:.0}", (lo + hi) / 2.0), format!("{hi:.0}")]),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_label.clone())
                .style(FOOTER_STYLE)
                .bounds([0.0, y_max])
                .labels(["0".to_string(), format!("{y_max:.0}")]),
        );
    frame.render_widget(chart, area);
}

fn draw_bars(frame: &mut Frame, area: Rect, spec: &BarChartSpec) {
    let legend: Vec<String> = {
        let mut seen: Vec<(&str, &str)> = Vec::new();
        for g in &spec.groups {
            for b in &g.bars {
                if !seen.iter().any(|(gender, _)| *gender == b.gender) {
                    seen.push((b.gender.as_str(), b.pattern.as_str()));
                }
            }
        }
        seen.iter()
            .map(|(gender, pattern)| format!("{} {gender}", pattern_glyph(pattern)))
            .collect()
    };
    let title = if legend.is_empty() {
        spec.title.clone()
    } else {
        format!("{}  {}", spec.title, legend.join("  "))
    };
    let block = panel(&title);
    if spec.groups.is_empty() {
        frame.render_widget(no_data(block), area);
        return;
    }

    let groups: Vec<BarGroup> = spec
        .groups
        .iter()
        .map(|g| {
            let style = Style::default().fg(hex_color(&g.color));
            let bars: Vec<Bar> = g
                .bars
                .iter()
                .map(|b| {
                    let initial: String = b.gender.chars().take(1).collect();
                    Bar::default()
                        .value(b.count as u64)
                        .label(Line::from(format!("{}{initial}", pattern_glyph(&b.pattern))))
                        .style(style)
                })
                .collect();
            BarGroup::default()
                .label(Line::from(g.location.clone()))
                .bars(&bars)
        })
        .collect();

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(4)
        .bar_gap(1)
        .group_gap(3);
    for group in groups {
        chart = chart.data(group);
    }
    frame.render_widget(chart, area);
}

fn draw_pie(frame: &mut Frame, area: Rect, spec: &PieSpec) {
    let block = panel(&spec.title);
    if spec.slices.is_empty() {
        frame.render_widget(no_data(block), area);
        return;
    }
    let name_width = spec
        .slices
        .iter()
        .map(|s| s.category.chars().count())
        .max()
        .unwrap_or(10);
    let inner = area.width.saturating_sub(2) as usize;
    let bar_room = inner.saturating_sub(name_width + 18).max(1);

    let lines: Vec<Line> = spec
        .slices
        .iter()
        .map(|s| {
            let filled = ((s.fraction * bar_room as f64).round() as usize).max(1);
            Line::from(vec![
                Span::raw(format!(" {:<width$}  ", s.category, width = name_width)),
                Span::styled("█".repeat(filled), Style::default().fg(hex_color(&s.color))),
                Span::raw(format!(" {} ({})", number(s.count), percent(s.fraction))),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

pub fn run(data: Option<&str>) -> Result<()> {
    let settings = load_settings();
    // Loading happens before the terminal is touched so a bad file is
    // reported as a plain error.
    let dataset = open_dataset(data)?;
    let options = chart_options(&settings, &dataset)?;
    let mut dashboard = Dashboard::new(&dataset, options);

    restore_on_panic();
    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break Ok(());
                }
                if dashboard.handle_key(key.code) == DashboardAction::Quit {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

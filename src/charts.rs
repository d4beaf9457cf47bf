//! Render adapters: one pure function per dashboard widget, each turning a
//! [`DerivedView`] into a serializable chart description. The terminal UI
//! draws these; `summary --format json` prints them verbatim.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::fmt::{fixed2, money};
use crate::pipeline::DerivedView;

pub const DEFAULT_BINS: usize = 30;
pub const MAX_BINS: usize = 1000;
pub const DEFAULT_CURRENCY: &str = "USD";
pub const NO_DATA: &str = "No data";

const KNOWN_LOCATION_COLORS: &[(&str, &str)] = &[
    ("Yangon", "#D98E73"),
    ("Naypyitaw", "#88BDBC"),
    ("Mandalay", "#A3B18A"),
];

const FALLBACK_LOCATION_COLORS: &[&str] = &[
    "#A3B18A", "#88BDBC", "#D98E73", "#A9C5D3", "#C9BBCF", "#E3B778",
];

const PIE_COLORS: &[&str] = &[
    "#A3B18A", "#D98E73", "#A9C5D3", "#C9BBCF", "#E3B778", "#88BDBC",
];

const GENDER_PATTERNS: &[&str] = &["", "/", "\\", "x", "-", "|", "+", "."];

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

fn known_color(location: &str) -> Option<&'static str> {
    KNOWN_LOCATION_COLORS
        .iter()
        .find(|(name, _)| *name == location)
        .map(|(_, c)| *c)
}

/// Stable visual encodings for the dataset's categorical values: one color
/// per location, one fill pattern per gender. Built once from the full
/// dataset so colors do not shift as filters change.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    locations: Vec<(String, &'static str)>,
    genders: Vec<(String, &'static str)>,
}

impl Palette {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self::new(&dataset.locations(), &dataset.genders())
    }

    pub fn new(locations: &[&str], genders: &[&str]) -> Self {
        // Unknown locations skip colors already held by known ones.
        let claimed: Vec<&str> = locations.iter().filter_map(|loc| known_color(loc)).collect();
        let mut free: Vec<&'static str> = FALLBACK_LOCATION_COLORS
            .iter()
            .copied()
            .filter(|c| !claimed.contains(c))
            .collect();
        if free.is_empty() {
            free = FALLBACK_LOCATION_COLORS.to_vec();
        }
        let mut fallback = free.into_iter().cycle();
        let locations = locations
            .iter()
            .map(|loc| {
                let color = known_color(loc)
                    .or_else(|| fallback.next())
                    .unwrap_or(FALLBACK_LOCATION_COLORS[0]);
                (loc.to_string(), color)
            })
            .collect();
        let genders = genders
            .iter()
            .zip(GENDER_PATTERNS.iter().cycle())
            .map(|(g, p)| (g.to_string(), *p))
            .collect();
        Self { locations, genders }
    }

    pub fn location_color(&self, location: &str) -> &'static str {
        self.locations
            .iter()
            .find(|(name, _)| name == location)
            .map(|(_, c)| *c)
            .unwrap_or(FALLBACK_LOCATION_COLORS[0])
    }

    pub fn gender_pattern(&self, gender: &str) -> &'static str {
        self.genders
            .iter()
            .find(|(name, _)| name == gender)
            .map(|(_, p)| *p)
            .unwrap_or(GENDER_PATTERNS[0])
    }

    /// Sort key placing known locations in dataset order, unknown ones last.
    fn location_rank(&self, location: &str) -> usize {
        self.locations
            .iter()
            .position(|(name, _)| name == location)
            .unwrap_or(usize::MAX)
    }

    fn gender_rank(&self, gender: &str) -> usize {
        self.genders
            .iter()
            .position(|(name, _)| name == gender)
            .unwrap_or(usize::MAX)
    }
}

/// Static rendering parameters shared by every adapter.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub currency_suffix: String,
    pub histogram_bins: usize,
    pub palette: Palette,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            currency_suffix: DEFAULT_CURRENCY.to_string(),
            histogram_bins: DEFAULT_BINS,
            palette: Palette::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chart specs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Reading {
    Value(f64),
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSpec {
    pub title: String,
    pub reading: Reading,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinRange {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSeries {
    pub location: String,
    pub gender: String,
    pub color: String,
    pub pattern: String,
    /// One count per bin, aligned with `HistogramSpec::bins`.
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Vec<BinRange>,
    pub series: Vec<HistogramSeries>,
}

impl HistogramSpec {
    /// Sum of all series per bin.
    pub fn bin_totals(&self) -> Vec<usize> {
        let mut totals = vec![0; self.bins.len()];
        for s in &self.series {
            for (t, c) in totals.iter_mut().zip(&s.counts) {
                *t += c;
            }
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    pub gender: String,
    pub pattern: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroupSpec {
    pub location: String,
    pub color: String,
    pub bars: Vec<BarSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub groups: Vec<BarGroupSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub count: usize,
    pub fraction: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSpec {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

/// The five widgets of one dashboard render, replaced wholesale on every
/// filter change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub total_amount: IndicatorSpec,
    pub average_rating: IndicatorSpec,
    pub histogram: HistogramSpec,
    pub bars: BarChartSpec,
    pub pie: PieSpec,
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

pub fn total_amount_indicator(view: &DerivedView, opts: &ChartOptions) -> IndicatorSpec {
    IndicatorSpec {
        title: "Total purchases".to_string(),
        reading: Reading::Value(view.total_amount),
        display: money(view.total_amount, &opts.currency_suffix),
    }
}

pub fn average_rating_indicator(view: &DerivedView) -> IndicatorSpec {
    let (reading, display) = match view.average_rating {
        Some(avg) => (Reading::Value(avg), fixed2(avg)),
        None => (Reading::NoData, NO_DATA.to_string()),
    };
    IndicatorSpec {
        title: "Average rating (/10)".to_string(),
        reading,
        display,
    }
}

/// Equal-width bins over the subset's `[min, max]` of totals. A subset
/// whose totals are all equal gets a unit-wide range centred on the value.
/// The bin count is clamped to `1..=MAX_BINS`.
fn bin_ranges(values: impl Iterator<Item = f64> + Clone, bins: usize) -> Vec<BinRange> {
    let bins = bins.clamp(1, MAX_BINS);
    let Some(min) = values.clone().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.reduce(f64::max).unwrap_or(min);
    let (lo, hi) = if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    };
    let width = (hi - lo) / bins as f64;
    (0..bins)
        .map(|i| BinRange {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
        })
        .collect()
}

fn bin_index(value: f64, ranges: &[BinRange]) -> usize {
    let lo = ranges[0].start;
    let hi = ranges[ranges.len() - 1].end;
    let width = (hi - lo) / ranges.len() as f64;
    // Totals too large for a half-unit offset collapse the range to a point.
    if width <= 0.0 || !width.is_finite() {
        return 0;
    }
    let idx = ((value - lo) / width).floor();
    if idx.is_nan() || idx <= 0.0 {
        0
    } else {
        (idx as usize).min(ranges.len() - 1)
    }
}

pub fn histogram(view: &DerivedView, opts: &ChartOptions) -> HistogramSpec {
    let bins = bin_ranges(view.rows.iter().map(|t| t.total), opts.histogram_bins);

    let mut series: Vec<HistogramSeries> = Vec::new();
    if !bins.is_empty() {
        for t in &view.rows {
            let idx = bin_index(t.total, &bins);
            let pos = series
                .iter()
                .position(|s| s.location == t.location && s.gender == t.gender);
            let pos = match pos {
                Some(p) => p,
                None => {
                    series.push(HistogramSeries {
                        location: t.location.clone(),
                        gender: t.gender.clone(),
                        color: opts.palette.location_color(&t.location).to_string(),
                        pattern: opts.palette.gender_pattern(&t.gender).to_string(),
                        counts: vec![0; bins.len()],
                    });
                    series.len() - 1
                }
            };
            series[pos].counts[idx] += 1;
        }
    }
    series.sort_by_key(|s| {
        (
            opts.palette.location_rank(&s.location),
            s.location.clone(),
            opts.palette.gender_rank(&s.gender),
            s.gender.clone(),
        )
    });

    HistogramSpec {
        title: "Distribution of purchase totals".to_string(),
        x_label: format!("Total ({})", opts.currency_suffix),
        y_label: "Purchases".to_string(),
        bins,
        series,
    }
}

pub fn grouped_bars(view: &DerivedView, opts: &ChartOptions) -> BarChartSpec {
    let mut groups: Vec<BarGroupSpec> = Vec::new();
    for gc in &view.group_counts {
        let bar = BarSpec {
            gender: gc.gender.clone(),
            pattern: opts.palette.gender_pattern(&gc.gender).to_string(),
            count: gc.count,
        };
        match groups.iter_mut().find(|g| g.location == gc.location) {
            Some(group) => group.bars.push(bar),
            None => groups.push(BarGroupSpec {
                location: gc.location.clone(),
                color: opts.palette.location_color(&gc.location).to_string(),
                bars: vec![bar],
            }),
        }
    }
    groups.sort_by_key(|g| (opts.palette.location_rank(&g.location), g.location.clone()));

    BarChartSpec {
        title: "Purchases by gender and location".to_string(),
        x_label: "Location".to_string(),
        y_label: "Purchases".to_string(),
        groups,
    }
}

pub fn pie(view: &DerivedView) -> PieSpec {
    let total: usize = view.category_counts.iter().map(|c| c.count).sum();
    let slices = view
        .category_counts
        .iter()
        .zip(PIE_COLORS.iter().cycle())
        .map(|(c, color)| PieSlice {
            category: c.category.clone(),
            count: c.count,
            fraction: c.count as f64 / total as f64,
            color: color.to_string(),
        })
        .collect();
    PieSpec {
        title: "Product line share".to_string(),
        slices,
    }
}

pub fn render_all(view: &DerivedView, opts: &ChartOptions) -> DashboardCharts {
    DashboardCharts {
        total_amount: total_amount_indicator(view, opts),
        average_rating: average_rating_indicator(view),
        histogram: histogram(view, opts),
        bars: grouped_bars(view, opts),
        pie: pie(view),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterState, GenderFilter};
    use crate::pipeline::compute;
    use crate::pipeline::tests::{three_rows, txn};

    fn opts_for(ds: &Dataset) -> ChartOptions {
        ChartOptions {
            palette: Palette::for_dataset(ds),
            ..ChartOptions::default()
        }
    }

    fn only(locations: &[&str]) -> FilterState {
        FilterState::with_locations(locations.iter().copied())
    }

    #[test]
    fn test_total_indicator_formatting() {
        let ds = Dataset::new("t.csv", vec![txn("1", "A", "M", "Food", 1234.5, 5.0)]).unwrap();
        let view = compute(&ds, &FilterState::default());
        let spec = total_amount_indicator(&view, &opts_for(&ds));
        assert_eq!(spec.display, "1,234.50 USD");
        assert_eq!(spec.reading, Reading::Value(1234.5));
    }

    #[test]
    fn test_rating_indicator_no_data() {
        let ds = three_rows();
        let view = compute(&ds, &only(&["C"]));
        let spec = average_rating_indicator(&view);
        assert_eq!(spec.reading, Reading::NoData);
        assert_eq!(spec.display, NO_DATA);
        assert!(!spec.display.contains("NaN"));

        let total = total_amount_indicator(&view, &opts_for(&ds));
        assert_eq!(total.display, "0.00 USD");
    }

    #[test]
    fn test_rating_indicator_value() {
        let ds = three_rows();
        let view = compute(&ds, &only(&["A"]));
        let spec = average_rating_indicator(&view);
        assert_eq!(spec.reading, Reading::Value(7.0));
        assert_eq!(spec.display, "7.00");
    }

    #[test]
    fn test_histogram_bins_and_series() {
        let ds = three_rows();
        let view = compute(&ds, &FilterState::default());
        let spec = histogram(&view, &opts_for(&ds));
        assert_eq!(spec.bins.len(), DEFAULT_BINS);
        assert_eq!(spec.bins[0].start, 10.0);
        assert_eq!(spec.bins[DEFAULT_BINS - 1].end, 30.0);
        assert_eq!(spec.bin_totals().iter().sum::<usize>(), 3);
        // 10 lands in the first bin, 30 (the max) in the last.
        assert_eq!(spec.bin_totals()[0], 1);
        assert_eq!(spec.bin_totals()[DEFAULT_BINS - 1], 1);
        let keys: Vec<(&str, &str)> = spec
            .series
            .iter()
            .map(|s| (s.location.as_str(), s.gender.as_str()))
            .collect();
        assert_eq!(keys, vec![("A", "M"), ("A", "F"), ("B", "M")]);
        assert_eq!(spec.series[0].pattern, "");
        assert_eq!(spec.series[1].pattern, "/");
        assert_eq!(spec.series[0].color, spec.series[1].color);
        assert_ne!(spec.series[0].color, spec.series[2].color);
    }

    #[test]
    fn test_histogram_single_value() {
        let ds = three_rows();
        let view = compute(&ds, &only(&["B"]));
        let spec = histogram(&view, &opts_for(&ds));
        assert_eq!(spec.bins.first().unwrap().start, 29.5);
        assert_eq!(spec.bins.last().unwrap().end, 30.5);
        assert_eq!(spec.bin_totals().iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_histogram_custom_bin_count() {
        let ds = three_rows();
        let view = compute(&ds, &FilterState::default());
        let opts = ChartOptions {
            histogram_bins: 4,
            ..opts_for(&ds)
        };
        let spec = histogram(&view, &opts);
        assert_eq!(spec.bins.len(), 4);
        assert_eq!(spec.bin_totals(), vec![1, 0, 1, 1]);
    }

    #[test]
    fn test_grouped_bars() {
        let ds = three_rows();
        let view = compute(&ds, &FilterState::default());
        let spec = grouped_bars(&view, &opts_for(&ds));
        assert_eq!(spec.groups.len(), 2);
        assert_eq!(spec.groups[0].location, "A");
        let genders: Vec<&str> = spec.groups[0].bars.iter().map(|b| b.gender.as_str()).collect();
        assert_eq!(genders, vec!["F", "M"]);
        assert_eq!(spec.groups[1].location, "B");
        assert_eq!(spec.groups[1].bars.len(), 1);
        assert_eq!(spec.groups[1].bars[0].count, 1);
    }

    #[test]
    fn test_grouped_bars_patterns_follow_gender() {
        let ds = three_rows();
        let view = compute(&ds, &FilterState::default());
        let spec = grouped_bars(&view, &opts_for(&ds));
        let m_pattern = &spec.groups[1].bars[0].pattern;
        let f_pattern = &spec.groups[0].bars[0].pattern;
        assert_eq!(m_pattern, "");
        assert_eq!(f_pattern, "/");
    }

    #[test]
    fn test_pie_fractions() {
        let ds = three_rows();
        let view = compute(&ds, &FilterState::default());
        let spec = pie(&view);
        assert_eq!(spec.slices.len(), 2);
        assert_eq!(spec.slices[0].category, "Food");
        assert_eq!(spec.slices[0].count, 2);
        let sum: f64 = spec.slices.iter().map(|s| s.fraction).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(spec.slices[0].color, PIE_COLORS[0]);
        assert_eq!(spec.slices[1].color, PIE_COLORS[1]);
    }

    #[test]
    fn test_all_adapters_tolerate_empty_subset() {
        let ds = three_rows();
        let mut f = FilterState::default();
        f.gender = GenderFilter::Only("X".into());
        let view = compute(&ds, &f);
        let charts = render_all(&view, &opts_for(&ds));
        assert_eq!(charts.total_amount.reading, Reading::Value(0.0));
        assert_eq!(charts.average_rating.reading, Reading::NoData);
        assert!(charts.histogram.bins.is_empty());
        assert!(charts.histogram.series.is_empty());
        assert!(charts.bars.groups.is_empty());
        assert!(charts.pie.slices.is_empty());
    }

    #[test]
    fn test_known_location_colors() {
        let palette = Palette::new(&["Mandalay", "Springfield", "Yangon"], &["Female", "Male"]);
        assert_eq!(palette.location_color("Yangon"), "#D98E73");
        assert_eq!(palette.location_color("Mandalay"), "#A3B18A");
        assert_eq!(palette.location_color("Springfield"), "#88BDBC");
        assert_eq!(palette.gender_pattern("Female"), "");
        assert_eq!(palette.gender_pattern("Male"), "/");
    }

    #[test]
    fn test_unknown_locations_never_share_known_colors() {
        let palette = Palette::new(&["Springfield", "Mandalay"], &["F"]);
        assert_eq!(palette.location_color("Mandalay"), "#A3B18A");
        assert_ne!(palette.location_color("Springfield"), palette.location_color("Mandalay"));

        let palette = Palette::new(&["Yangon", "Naypyitaw", "Mandalay", "X", "Y", "Z"], &[]);
        let colors: Vec<&str> = ["Yangon", "Naypyitaw", "Mandalay", "X", "Y", "Z"]
            .iter()
            .map(|l| palette.location_color(l))
            .collect();
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_oversized_bin_count_is_clamped() {
        let ds = three_rows();
        let view = compute(&ds, &FilterState::default());
        let opts = ChartOptions {
            histogram_bins: usize::MAX,
            ..opts_for(&ds)
        };
        let spec = histogram(&view, &opts);
        assert_eq!(spec.bins.len(), MAX_BINS);
        assert_eq!(spec.bin_totals().iter().sum::<usize>(), 3);
    }

    #[test]
    fn test_histogram_huge_equal_totals() {
        let ds = Dataset::new(
            "big.csv",
            vec![
                txn("1", "A", "M", "Food", 1e17, 5.0),
                txn("2", "A", "F", "Food", 1e17, 6.0),
            ],
        )
        .unwrap();
        let view = compute(&ds, &FilterState::default());
        let spec = histogram(&view, &opts_for(&ds));
        assert_eq!(spec.bin_totals()[0], 2);
        assert_eq!(spec.bin_totals().iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_no_data_serializes_without_nan() {
        let spec = IndicatorSpec {
            title: "Average rating (/10)".into(),
            reading: Reading::NoData,
            display: NO_DATA.into(),
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"state\":\"no_data\""));
        assert!(!json.contains("NaN"));
    }
}

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::dataset::Dataset;
use crate::filter::FilterState;
use crate::models::{CategoryCount, GroupCount, Transaction};

/// The filtered subset plus everything the five charts are drawn from.
/// Rebuilt from scratch on every filter change.
#[derive(Debug, Clone)]
pub struct DerivedView<'a> {
    pub rows: Vec<&'a Transaction>,
    pub total_amount: f64,
    /// None when the subset is empty.
    pub average_rating: Option<f64>,
    pub group_counts: Vec<GroupCount>,
    pub category_counts: Vec<CategoryCount>,
}

impl DerivedView<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

fn filter_by_location<'a>(rows: Vec<&'a Transaction>, filter: &FilterState) -> Vec<&'a Transaction> {
    if filter.locations.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|t| filter.location_matches(&t.location))
        .collect()
}

fn filter_by_gender<'a>(rows: Vec<&'a Transaction>, filter: &FilterState) -> Vec<&'a Transaction> {
    rows.into_iter()
        .filter(|t| filter.gender_matches(&t.gender))
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

pub fn total_amount(rows: &[&Transaction]) -> f64 {
    rows.iter().map(|t| t.total).sum()
}

pub fn average_rating(rows: &[&Transaction]) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let sum: f64 = rows.iter().map(|t| t.rating).sum();
    Some(sum / rows.len() as f64)
}

/// Counts per observed (gender, location) pair, sorted by gender then
/// location.
pub fn group_counts(rows: &[&Transaction]) -> Vec<GroupCount> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for t in rows {
        *counts.entry((t.gender.as_str(), t.location.as_str())).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((gender, location), count)| GroupCount {
            gender: gender.to_string(),
            location: location.to_string(),
            count,
        })
        .collect()
}

/// Counts per observed product line, most frequent first (ties by name).
pub fn category_counts(rows: &[&Transaction]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in rows {
        *counts.entry(t.product_line.as_str()).or_default() += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    out
}

// ---------------------------------------------------------------------------
// compute
// ---------------------------------------------------------------------------

/// Filter the dataset (location first, then gender) and aggregate the
/// result. Total over every filter state, including ones that select
/// nothing.
pub fn compute<'a>(dataset: &'a Dataset, filter: &FilterState) -> DerivedView<'a> {
    let rows: Vec<&Transaction> = dataset.records().iter().collect();
    let rows = filter_by_gender(filter_by_location(rows, filter), filter);

    DerivedView {
        total_amount: total_amount(&rows),
        average_rating: average_rating(&rows),
        group_counts: group_counts(&rows),
        category_counts: category_counts(&rows),
        rows,
    }
}

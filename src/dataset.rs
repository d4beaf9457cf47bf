use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::{DashError, Result};
use crate::models::Transaction;

pub const COL_INVOICE_ID: &str = "Invoice ID";
pub const COL_LOCATION: &str = "City";
pub const COL_GENDER: &str = "Gender";
pub const COL_PRODUCT_LINE: &str = "Product line";
pub const COL_TOTAL: &str = "Total";
pub const COL_RATING: &str = "Rating";
pub const COL_DATE: &str = "Date";

const MAX_RATING: f64 = 10.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money-ish cell: tolerates thousands separators, quotes and a
/// leading dollar sign. Returns None for anything that is not a number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let value: f64 = s.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Accepts `M/D/YYYY` (the export format of the sales sheet) and ISO dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Push `value` onto `seen` unless already present. Keeps first-appearance
/// order, which is the order the UI controls list their options in.
fn push_unique<'a>(seen: &mut Vec<&'a str>, value: &'a str) {
    if !seen.contains(&value) {
        seen.push(value);
    }
}

// ---------------------------------------------------------------------------
// Header mapping
// ---------------------------------------------------------------------------

struct Columns {
    invoice_id: usize,
    location: usize,
    gender: usize,
    product_line: usize,
    total: usize,
    rating: usize,
    date: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord, source: &str) -> Result<Self> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| DashError::MissingColumn {
                    path: source.to_string(),
                    column,
                })
        };
        Ok(Self {
            invoice_id: find(COL_INVOICE_ID)?,
            location: find(COL_LOCATION)?,
            gender: find(COL_GENDER)?,
            product_line: find(COL_PRODUCT_LINE)?,
            total: find(COL_TOTAL)?,
            rating: find(COL_RATING)?,
            date: find(COL_DATE)?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Transaction> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let malformed = |reason: String| DashError::MalformedRow { line, reason };
        let text = |idx: usize, column: &str| -> Result<String> {
            let value = record.get(idx).unwrap_or("").trim();
            if value.is_empty() {
                return Err(malformed(format!("empty '{column}'")));
            }
            Ok(value.to_string())
        };

        let raw_total = record.get(self.total).unwrap_or("");
        let total = parse_amount(raw_total)
            .filter(|t| *t >= 0.0)
            .ok_or_else(|| malformed(format!("invalid {COL_TOTAL} '{raw_total}'")))?;

        let raw_rating = record.get(self.rating).unwrap_or("");
        let rating = parse_amount(raw_rating)
            .filter(|r| (0.0..=MAX_RATING).contains(r))
            .ok_or_else(|| malformed(format!("invalid {COL_RATING} '{raw_rating}'")))?;

        let raw_date = record.get(self.date).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| malformed(format!("invalid {COL_DATE} '{raw_date}'")))?;

        Ok(Transaction {
            invoice_id: text(self.invoice_id, COL_INVOICE_ID)?,
            location: text(self.location, COL_LOCATION)?,
            gender: text(self.gender, COL_GENDER)?,
            product_line: text(self.product_line, COL_PRODUCT_LINE)?,
            total,
            rating,
            date,
        })
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// The full, read-only set of transactions. Built once at startup and
/// handed to the pipeline by reference.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    records: Vec<Transaction>,
}

impl Dataset {
    pub fn new(source: impl Into<PathBuf>, records: Vec<Transaction>) -> Result<Self> {
        let source = source.into();
        if records.is_empty() {
            return Err(DashError::EmptyDataset(source.display().to_string()));
        }
        Ok(Self { source, records })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(std::io::BufReader::new(file), path)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let label = source.display().to_string();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let columns = Columns::from_headers(rdr.headers()?, &label)?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result?;
            records.push(columns.parse(&record)?);
        }
        Self::new(source, records)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Distinct locations in first-appearance order.
    pub fn locations(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for r in &self.records {
            push_unique(&mut seen, &r.location);
        }
        seen
    }

    /// Distinct genders in first-appearance order.
    pub fn genders(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for r in &self.records {
            push_unique(&mut seen, &r.gender);
        }
        seen
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        // Non-empty by construction.
        let first = self.records[0].date;
        self.records
            .iter()
            .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date)))
    }
}

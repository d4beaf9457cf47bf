use chrono::NaiveDate;

/// One row of the sales dataset. Columns the dashboard never reads are
/// dropped at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub invoice_id: String,
    pub location: String,
    pub gender: String,
    pub product_line: String,
    pub total: f64,
    pub rating: f64,
    pub date: NaiveDate,
}

/// Purchase count for one observed (gender, location) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub gender: String,
    pub location: String,
    pub count: usize,
}

/// Purchase count for one observed product line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

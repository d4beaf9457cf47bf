use colored::Colorize;

use crate::cli::open_dataset;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::filter::ALL;
use crate::fmt::number;

pub fn run(data: Option<&str>) -> Result<()> {
    let dataset = open_dataset(data)?;
    println!("{}", format_options(&dataset));
    Ok(())
}

/// The choices the two dashboard controls offer, plus a one-line dataset
/// summary.
pub fn format_options(dataset: &Dataset) -> String {
    let (first, last) = dataset.date_range();
    let mut out = format!(
        "{} transactions, {} to {}\n\n",
        number(dataset.len()),
        first.format("%Y-%m-%d"),
        last.format("%Y-%m-%d")
    );
    out.push_str(&format!("{}\n", "Locations".bold()));
    for loc in dataset.locations() {
        out.push_str(&format!("  {loc}\n"));
    }
    out.push_str(&format!("\n{}\n", "Genders".bold()));
    out.push_str(&format!("  {ALL}\n"));
    for g in dataset.genders() {
        out.push_str(&format!("  {g}\n"));
    }
    out
}

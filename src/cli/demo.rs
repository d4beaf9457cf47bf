use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::dataset::{
    Dataset, COL_DATE, COL_GENDER, COL_INVOICE_ID, COL_LOCATION, COL_PRODUCT_LINE, COL_RATING,
    COL_TOTAL,
};
use crate::error::{DashError, Result};
use crate::fmt::number;
use crate::settings::{config_dir, load_settings, save_settings};

/// (branch code, city)
const BRANCHES: &[(&str, &str)] = &[("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];

const GENDERS: &[&str] = &["Female", "Male"];

const CUSTOMER_TYPES: &[&str] = &["Member", "Normal"];

const PRODUCT_LINES: &[&str] = &[
    "Health and beauty",
    "Electronic accessories",
    "Home and lifestyle",
    "Sports and travel",
    "Food and beverages",
    "Fashion accessories",
];

const PAYMENTS: &[&str] = &["Ewallet", "Cash", "Credit card"];

const TAX_RATE: f64 = 0.05;

/// First quarter of 2019, matching the shape of the public sales sheet.
const FIRST_DAY: (i32, u32, u32) = (2019, 1, 1);
const DAYS: i64 = 90;

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Write `rows` synthetic sales with every column of the original export.
/// Same seed, same file.
pub fn write_demo(path: &Path, rows: usize, seed: u64) -> Result<()> {
    if rows == 0 {
        return Err(DashError::Other("--rows must be at least 1".into()));
    }
    let (y, m, d) = FIRST_DAY;
    let start = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| DashError::Other("invalid demo start date".into()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        COL_INVOICE_ID,
        "Branch",
        COL_LOCATION,
        "Customer type",
        COL_GENDER,
        COL_PRODUCT_LINE,
        "Unit price",
        "Quantity",
        "Tax 5%",
        COL_TOTAL,
        COL_DATE,
        "Time",
        "Payment",
        "cogs",
        "gross margin percentage",
        "gross income",
        COL_RATING,
    ])?;

    for _ in 0..rows {
        let (branch, city) = BRANCHES[rng.gen_range(0..BRANCHES.len())];
        let unit_price = round2(rng.gen_range(10.0..100.0));
        let quantity: u32 = rng.gen_range(1..=10);
        let cogs = round2(unit_price * quantity as f64);
        let tax = round2(cogs * TAX_RATE);
        let total = round2(cogs + tax);
        let date = start + Duration::days(rng.gen_range(0..DAYS));
        let rating = rng.gen_range(40..=100) as f64 / 10.0;
        let invoice = format!(
            "{:03}-{:02}-{:04}",
            rng.gen_range(100..1000),
            rng.gen_range(10..100),
            rng.gen_range(1000..10000)
        );
        let time = format!("{:02}:{:02}", rng.gen_range(10..21), rng.gen_range(0..60));

        wtr.write_record([
            invoice,
            branch.to_string(),
            city.to_string(),
            pick(&mut rng, CUSTOMER_TYPES).to_string(),
            pick(&mut rng, GENDERS).to_string(),
            pick(&mut rng, PRODUCT_LINES).to_string(),
            format!("{unit_price:.2}"),
            quantity.to_string(),
            format!("{tax:.4}"),
            format!("{total:.4}"),
            date.format("%-m/%-d/%Y").to_string(),
            time,
            pick(&mut rng, PAYMENTS).to_string(),
            format!("{cogs:.2}"),
            "4.761904762".to_string(),
            format!("{tax:.4}"),
            format!("{rating:.1}"),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(rows: usize, seed: u64, output: Option<&str>) -> Result<()> {
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("demo_sales.csv"));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_demo(&path, rows, seed)?;
    let dataset = Dataset::load(&path)?;
    tracing::info!(path = %path.display(), rows, seed, "wrote demo dataset");

    let mut settings = load_settings();
    settings.dataset_path = Some(path.to_string_lossy().to_string());
    save_settings(&settings)?;

    println!(
        "Wrote {} demo transactions to {}",
        number(dataset.len()),
        path.display()
    );
    println!("Run `tillview` to open the dashboard.");
    Ok(())
}

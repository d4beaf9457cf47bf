use crate::dataset::Dataset;
use crate::error::Result;
use crate::fmt::number;
use crate::settings::{load_settings, log_path, resolve_dataset, settings_path};

pub fn run(data: Option<&str>) -> Result<()> {
    let settings = load_settings();

    println!("Settings:   {}", settings_path().display());
    println!("Log file:   {}", log_path().display());
    println!("Currency:   {}", settings.currency_suffix);
    println!("Bins:       {}", settings.histogram_bins);

    let Ok(path) = resolve_dataset(data) else {
        println!("Dataset:    (not set)");
        println!();
        println!("Run `tillview load <FILE>` or `tillview demo` to pick a dataset.");
        return Ok(());
    };
    println!("Dataset:    {}", path.display());

    if path.exists() {
        let dataset = Dataset::load(&path)?;
        let (first, last) = dataset.date_range();
        println!();
        println!("Transactions:  {}", number(dataset.len()));
        println!("Locations:     {}", dataset.locations().join(", "));
        println!("Genders:       {}", dataset.genders().join(", "));
        println!("Date range:    {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"));
    } else {
        println!();
        println!("Dataset file not found.");
    }

    Ok(())
}

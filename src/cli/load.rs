use std::path::PathBuf;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::fmt::number;
use crate::settings::{load_settings, save_settings, shellexpand_path};

/// Validate the file with a full load, then make it the default dataset.
pub fn run(path: &str) -> Result<()> {
    let resolved = PathBuf::from(shellexpand_path(path));
    let dataset = Dataset::load(&resolved)?;

    let mut settings = load_settings();
    settings.dataset_path = Some(resolved.to_string_lossy().to_string());
    save_settings(&settings)?;

    println!(
        "Switched to {} ({} transactions)",
        resolved.display(),
        number(dataset.len())
    );
    Ok(())
}

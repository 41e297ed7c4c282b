//! Catalog listing command

use tablebook_core::{error::Result, Settings};

/// Print tables and time slots
pub async fn handle(settings: &Settings) -> Result<()> {
    let catalog = settings.catalog()?;

    println!("Tables:");
    for table in catalog.tables() {
        println!("  {}", table);
    }

    let slots: Vec<&str> = catalog.time_slots().iter().map(|s| s.as_str()).collect();
    println!();
    println!("Time slots ({}): {}", slots.len(), slots.join(", "));
    println!("Max party size: {}", settings.booking.max_party_size);

    Ok(())
}

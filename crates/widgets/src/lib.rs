pub mod battery;
pub mod summary;

pub use battery::BatteryDetails;
pub use summary::BatterySummary;

use devinfo_core::Section;
use tracing::warn;

/// Build the section registered under `kind`, if any.
pub fn section_for(kind: &str) -> Option<Box<dyn Section>> {
    match kind {
        "details" => Some(Box::new(BatteryDetails::new())),
        "summary" => Some(Box::new(BatterySummary::new())),
        other => {
            warn!("Unknown section kind '{other}'; skipping");
            None
        }
    }
}

use crate::state::{BatteryReading, LabeledEntry};

/// A block of rows on the battery screen.
///
/// Sections are purely reactive: they receive a read-only snapshot and
/// return the rows to display.  Diffing and drawing happen in
/// `devinfo-renderer`.
pub trait Section: Send + Sync + std::fmt::Debug {
    /// Unique string identifier, e.g. `"details"` or `"summary"`.
    fn id(&self) -> &str;

    /// Rows for `reading`, in display order.
    fn rows(&self, reading: &BatteryReading) -> Vec<LabeledEntry>;
}

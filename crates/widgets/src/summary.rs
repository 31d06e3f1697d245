use crate::battery::hours_minutes;
use devinfo_core::{BatteryReading, ChargeEstimate, LabeledEntry, Section};
use std::time::Duration;

/// One-line battery overview: level, charge glyph and time to full.
///
/// Shows `N/A` when there is no battery (desktop / VM).
#[derive(Debug, Default)]
pub struct BatterySummary;

impl BatterySummary {
    pub fn new() -> Self {
        Self
    }
}

impl Section for BatterySummary {
    fn id(&self) -> &str {
        "summary"
    }

    fn rows(&self, reading: &BatteryReading) -> Vec<LabeledEntry> {
        let Some(pct) = reading.level_percent else {
            return vec![LabeledEntry::new("Battery", crate::battery::NOT_AVAILABLE)];
        };
        let mut value = format!("{} {pct}%", glyph(pct, reading.status.is_charging()));
        if let ChargeEstimate::Remaining(d) = reading.charge_estimate {
            if let Some(time) = compact_duration(d) {
                value.push_str(&format!(" ({time} to full)"));
            }
        }

        vec![LabeledEntry::new("Battery", value)]
    }
}

/// Bolt while charging, otherwise a bar that fills in 20% steps.
fn glyph(pct: u8, charging: bool) -> &'static str {
    const BARS: [&str; 5] = ["▏", "▎", "▌", "▊", "█"];
    if charging {
        "⚡"
    } else {
        BARS[usize::from(pct.min(99) / 20)]
    }
}

/// `"1h 23m"` or `"45m"`; `None` under a minute.
fn compact_duration(d: Duration) -> Option<String> {
    match hours_minutes(d) {
        (0, 0) => None,
        (0, m) => Some(format!("{m}m")),
        (h, m) => Some(format!("{h}h {m}m")),
    }
}

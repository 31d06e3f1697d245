use devinfo_core::{BatteryReading, ChargeEstimate, LabeledEntry, Section};
use devinfo_system::format_power;
use std::time::Duration;

/// Placeholder for any value no source could provide.
pub const NOT_AVAILABLE: &str = "N/A";

pub const LABEL_CURRENT: &str = "Current (Real-time)";
pub const LABEL_POWER: &str = "Power (Real-time)";
pub const LABEL_VOLTAGE: &str = "Voltage";

/// The full battery detail list: status, health, electrical readings,
/// charge-time estimate and design capacity.
#[derive(Debug, Default)]
pub struct BatteryDetails;

impl BatteryDetails {
    pub fn new() -> Self {
        Self
    }
}

impl Section for BatteryDetails {
    fn id(&self) -> &str {
        "details"
    }

    fn rows(&self, r: &BatteryReading) -> Vec<LabeledEntry> {
        vec![
            LabeledEntry::new("Health", r.health.label()),
            LabeledEntry::new("Level", or_na(r.level_percent.map(|p| format!("{p}%")))),
            LabeledEntry::new("Status", r.status.label()),
            LabeledEntry::new("Power Source", r.plug_source.label()),
            LabeledEntry::new("Technology", or_na(r.technology.clone())),
            LabeledEntry::new("Temperature", format_temperature(r.temperature_tenths_celsius)),
            LabeledEntry::new(LABEL_VOLTAGE, or_na(r.voltage_millivolts.map(|v| format!("{v} mV")))),
            LabeledEntry::new(LABEL_CURRENT, or_na(r.current_milliamps.map(|c| format!("{c} mA")))),
            LabeledEntry::new(LABEL_POWER, format_power(r.power_watts)),
            LabeledEntry::new("Time to Charge/Discharge", format_estimate(r.charge_estimate)),
            LabeledEntry::new(
                "Capacity (Design)",
                or_na(r.design_capacity_mah.map(|c| format!("{c} mAh"))),
            ),
        ]
    }
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Tenths of a degree → `"28.4°C"`.
pub fn format_temperature(tenths: Option<i32>) -> String {
    match tenths {
        Some(t) => format!("{:.1}°C", f64::from(t) / 10.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_estimate(estimate: ChargeEstimate) -> String {
    match estimate {
        ChargeEstimate::Remaining(d) => format_duration(d),
        ChargeEstimate::Calculating => "Calculating...".to_string(),
        ChargeEstimate::Discharging => "Discharging".to_string(),
    }
}

/// `"1 hr 30 min"`.
fn format_duration(d: Duration) -> String {
    let (hours, mins) = hours_minutes(d);
    format!("{hours} hr {mins} min")
}

/// Whole hours and the leftover minutes of `d`.
pub(crate) fn hours_minutes(d: Duration) -> (u64, u64) {
    let mins = d.as_secs() / 60;
    (mins / 60, mins % 60)
}

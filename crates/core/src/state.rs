use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Charging state as reported by the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeStatus {
    Charging,
    Discharging,
    Full,
    NotCharging,
    #[default]
    Unknown,
}

impl ChargeStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Charging    => "Charging",
            Self::Discharging => "Discharging",
            Self::Full        => "Full",
            Self::NotCharging => "Not Charging",
            Self::Unknown     => "Unknown",
        }
    }

    /// `true` while external power is feeding the battery.
    pub fn is_charging(self) -> bool {
        matches!(self, Self::Charging | Self::Full)
    }
}

/// Battery health as reported by the fuel gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Health {
    Good,
    Overheat,
    Dead,
    Cold,
    OverVoltage,
    Failure,
    #[default]
    Unknown,
}

impl Health {
    pub fn label(self) -> &'static str {
        match self {
            Self::Good        => "Good",
            Self::Overheat    => "Overheat",
            Self::Dead        => "Dead",
            Self::Cold        => "Cold",
            Self::OverVoltage => "Over Voltage",
            Self::Failure     => "Failure",
            Self::Unknown     => "Unknown",
        }
    }
}

/// Which external supply (if any) is powering the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlugSource {
    Ac,
    Usb,
    Wireless,
    /// Running on battery.
    None,
    #[default]
    Unknown,
}

impl PlugSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ac       => "AC Charger",
            Self::Usb      => "USB Port",
            Self::Wireless => "Wireless",
            Self::None     => "On Battery",
            Self::Unknown  => "Unknown",
        }
    }
}

/// How the reported current sign is presented.
///
/// Fuel gauges disagree on whether positive current means charging or
/// discharging, so the reader never touches the sign; this is applied on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CurrentSign {
    /// Show whatever the source reported.
    #[default]
    Raw,
    /// Positive while charging/full, negative while discharging.
    PositiveCharging,
}

impl CurrentSign {
    /// Apply the convention to a raw current reading.
    pub fn apply(self, current_ma: Option<i32>, status: ChargeStatus) -> Option<i32> {
        let ma = current_ma?;
        Some(match (self, status) {
            (Self::Raw, _) => ma,
            (Self::PositiveCharging, s) if s.is_charging() => ma.saturating_abs(),
            (Self::PositiveCharging, ChargeStatus::Discharging) => -ma.saturating_abs(),
            (Self::PositiveCharging, _) => ma,
        })
    }
}

/// Time-to-full estimate shown next to the charge status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeEstimate {
    /// Platform estimate of time until full.
    Remaining(Duration),
    /// Charging, but no usable estimate yet.
    #[default]
    Calculating,
    /// Not applicable while discharging.
    Discharging,
}

/// One battery-change event, shaped like the platform's key/value extras.
///
/// The newest value is retained by the battery service so late subscribers
/// can read the current state without waiting for the next change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatteryChanged {
    pub present:     bool,
    pub level:       Option<i32>,
    pub scale:       Option<i32>,
    pub status:      ChargeStatus,
    pub health:      Health,
    pub plugged:     PlugSource,
    pub technology:  Option<String>,
    /// Tenths of a degree Celsius.
    pub temperature: Option<i32>,
    /// Millivolts.
    pub voltage:     Option<i32>,
}

impl BatteryChanged {
    /// Charge level in percent, `None` when level or scale is missing.
    pub fn level_percent(&self) -> Option<u8> {
        let level = self.level?;
        let scale = self.scale.filter(|s| *s > 0)?;
        let pct = (level as f32 * 100.0 / scale as f32) as i32;
        Some(pct.clamp(0, 100) as u8)
    }
}

/// Fields owned by the slow (battery-change) channel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusFields {
    pub level_percent:              Option<u8>,
    pub status:                     ChargeStatus,
    pub health:                     Health,
    pub plug_source:                PlugSource,
    pub technology:                 Option<String>,
    pub temperature_tenths_celsius: Option<i32>,
    pub charge_estimate:            ChargeEstimate,
    pub design_capacity_mah:        Option<u32>,
}

/// Fields owned by the fast (timer) channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySample {
    pub current_milliamps:  Option<i32>,
    pub voltage_millivolts: Option<i32>,
    pub power_watts:        Option<f64>,
}

/// A point-in-time battery snapshot.  Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReading {
    pub level_percent:              Option<u8>,
    pub status:                     ChargeStatus,
    pub health:                     Health,
    pub plug_source:                PlugSource,
    pub technology:                 Option<String>,
    pub temperature_tenths_celsius: Option<i32>,
    pub voltage_millivolts:         Option<i32>,
    /// Sign indicates direction; see [`CurrentSign`].
    pub current_milliamps:          Option<i32>,
    /// Only `Some` when current and a positive voltage are both known.
    pub power_watts:                Option<f64>,
    pub charge_estimate:            ChargeEstimate,
    pub design_capacity_mah:        Option<u32>,
    pub taken_at:                   DateTime<Local>,
}

impl Default for BatteryReading {
    fn default() -> Self {
        Self {
            level_percent:              None,
            status:                     ChargeStatus::Unknown,
            health:                     Health::Unknown,
            plug_source:                PlugSource::Unknown,
            technology:                 None,
            temperature_tenths_celsius: None,
            voltage_millivolts:         None,
            current_milliamps:          None,
            power_watts:                None,
            charge_estimate:            ChargeEstimate::Calculating,
            design_capacity_mah:        None,
            taken_at:                   Local::now(),
        }
    }
}

impl BatteryReading {
    /// New snapshot with the slow-channel fields replaced.
    #[must_use]
    pub fn apply_status(&self, fields: &StatusFields) -> Self {
        Self {
            level_percent:              fields.level_percent,
            status:                     fields.status,
            health:                     fields.health,
            plug_source:                fields.plug_source,
            technology:                 fields.technology.clone(),
            temperature_tenths_celsius: fields.temperature_tenths_celsius,
            charge_estimate:            fields.charge_estimate,
            design_capacity_mah:        fields.design_capacity_mah,
            taken_at:                   Local::now(),
            ..self.clone()
        }
    }

    /// New snapshot with the fast-channel fields replaced.
    #[must_use]
    pub fn apply_telemetry(&self, sample: &TelemetrySample) -> Self {
        Self {
            current_milliamps:  sample.current_milliamps,
            voltage_millivolts: sample.voltage_millivolts,
            power_watts:        sample.power_watts,
            taken_at:           Local::now(),
            ..self.clone()
        }
    }
}

/// A `(label, value)` row for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledEntry {
    pub label: String,
    pub value: String,
}

impl LabeledEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

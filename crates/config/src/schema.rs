use devinfo_core::state::CurrentSign;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fastest allowed telemetry refresh, in milliseconds.
pub const MIN_FAST_INTERVAL_MS: u64 = 250;
/// Slowest allowed telemetry refresh, in milliseconds.
pub const MAX_FAST_INTERVAL_MS: u64 = 10_000;

/// Root configuration structure parsed from `devinfo.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevinfoConfig {
    /// Where and how to find the battery.
    pub battery: BatteryConfig,
    /// Refresh cadence of both channels.
    pub refresh: RefreshConfig,
    /// What the screen shows and how.
    pub display: DisplayConfig,
}

/// Battery discovery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryConfig {
    /// Root of the power-supply class tree.
    pub sysfs_root: PathBuf,
    /// Supply to use for status and service queries, or `"auto"` to pick the
    /// first `type == Battery` entry under `sysfs_root`.
    pub supply: String,
    /// Supplies probed, in order, for `current_now` / `voltage_now`.
    /// Vendors name the fuel gauge differently, so several are tried.
    pub telemetry_sources: Vec<String>,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys/class/power_supply"),
            supply:     "auto".to_string(),
            telemetry_sources: ["battery", "Battery", "bms", "main", "BAT0", "BAT1"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Refresh cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Period of the current / voltage / power timer.
    pub fast_interval_ms: u64,
    /// How often the battery-change snapshot is checked for changes.
    pub slow_poll_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            fast_interval_ms: 1_000,
            slow_poll_ms:     5_000,
        }
    }
}

impl RefreshConfig {
    /// Fast-channel period, clamped to a sane range.
    pub fn fast_interval(&self) -> Duration {
        Duration::from_millis(
            self.fast_interval_ms
                .clamp(MIN_FAST_INTERVAL_MS, MAX_FAST_INTERVAL_MS),
        )
    }

    /// Slow-channel poll period; never faster than the fast channel.
    pub fn slow_poll(&self) -> Duration {
        Duration::from_millis(self.slow_poll_ms).max(self.fast_interval())
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Sections shown on the screen, top to bottom.
    pub sections: Vec<SectionConfig>,
    /// Sign convention applied to the displayed current.
    pub current_sign: CurrentSign,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            sections:     vec![SectionConfig::new("summary"), SectionConfig::new("details")],
            current_sign: CurrentSign::Raw,
        }
    }
}

/// Config block for a single section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Section type identifier: `"summary"` or `"details"`.
    pub kind: String,
    /// Optional heading printed above the rows.
    #[serde(default)]
    pub label: Option<String>,
}

impl SectionConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind:  kind.into(),
            label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: DevinfoConfig = toml::from_str(
            r#"
            [refresh]
            fast_interval_ms = 2000

            [display]
            current_sign = "positive-charging"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.refresh.fast_interval(), Duration::from_secs(2));
        assert_eq!(cfg.refresh.slow_poll_ms, 5_000);
        assert_eq!(cfg.display.current_sign, CurrentSign::PositiveCharging);
        assert_eq!(cfg.battery, BatteryConfig::default());
        assert_eq!(cfg.display.sections.len(), 2);
    }

    #[test]
    fn fast_interval_is_clamped() {
        let mut r = RefreshConfig { fast_interval_ms: 10, slow_poll_ms: 0 };
        assert_eq!(r.fast_interval(), Duration::from_millis(MIN_FAST_INTERVAL_MS));
        assert_eq!(r.slow_poll(), Duration::from_millis(MIN_FAST_INTERVAL_MS));

        r.fast_interval_ms = 60_000;
        assert_eq!(r.fast_interval(), Duration::from_millis(MAX_FAST_INTERVAL_MS));
    }

    #[test]
    fn sections_parse_with_labels() {
        let cfg: DevinfoConfig = toml::from_str(
            r#"
            [[display.sections]]
            kind  = "details"
            label = "Battery"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.display.sections.len(), 1);
        assert_eq!(cfg.display.sections[0].kind, "details");
        assert_eq!(cfg.display.sections[0].label.as_deref(), Some("Battery"));
    }
}

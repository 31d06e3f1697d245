use crate::power::compute_power_watts;
use crate::service::{is_sentinel, BatteryProperty, BatteryService};
use devinfo_core::TelemetrySample;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Reads instantaneous current and voltage from the best available source.
///
/// Fuel gauges expose these under vendor-specific supply names, so a list of
/// candidate files is tried in order before falling back to the battery
/// service.  Every failure is local to its source; the next one is tried.
#[derive(Debug)]
pub struct TelemetryReader<S> {
    current_paths: Vec<PathBuf>,
    voltage_paths: Vec<PathBuf>,
    service:       S,
}

impl<S: BatteryService> TelemetryReader<S> {
    /// Build a reader probing `<root>/<source>/{current_now,voltage_now}` for
    /// each of `sources`, in order.
    pub fn new(service: S, root: &Path, sources: &[String]) -> Self {
        let paths = |attr: &str| -> Vec<PathBuf> {
            sources.iter().map(|s| root.join(s).join(attr)).collect()
        };
        Self {
            current_paths: paths("current_now"),
            voltage_paths: paths("voltage_now"),
            service,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Instantaneous current in mA, sign as reported.  `None` when no source
    /// produced a usable value.
    pub fn read_current_milliamps(&self) -> Option<i32> {
        if let Some(ma) = read_first_usable(&self.current_paths, micro_to_milli) {
            return Some(ma);
        }

        [BatteryProperty::CurrentNow, BatteryProperty::CurrentAverage]
            .into_iter()
            .find_map(|prop| match self.service.int_property(prop) {
                Ok(ua) if is_usable(ua) => micro_to_milli(ua),
                Ok(_) => None,
                Err(e) => {
                    trace!("{prop:?} unavailable: {e}");
                    None
                }
            })
    }

    /// Battery voltage in mV.  Falls back to the last battery-change event.
    pub fn read_voltage_millivolts(&self) -> Option<i32> {
        let to_mv = |uv| micro_to_milli(uv).filter(|mv| *mv > 0);
        if let Some(mv) = read_first_usable(&self.voltage_paths, to_mv) {
            return Some(mv);
        }

        self.service
            .sticky_battery_changed()
            .and_then(|ev| ev.voltage)
            .filter(|mv| *mv > 0)
    }

    /// One fast-channel sample: current, voltage and the derived power.
    pub fn sample(&self) -> TelemetrySample {
        let current_milliamps = self.read_current_milliamps();
        let voltage_millivolts = self.read_voltage_millivolts();
        TelemetrySample {
            current_milliamps,
            voltage_millivolts,
            power_watts: compute_power_watts(current_milliamps, voltage_millivolts),
        }
    }
}

/// Non-zero and not a sentinel.
fn is_usable(raw: i64) -> bool {
    raw != 0 && !is_sentinel(raw)
}

fn micro_to_milli(raw: i64) -> Option<i32> {
    i32::try_from(raw / 1_000).ok()
}

/// First path that exists, parses to a usable integer and survives `convert`.
fn read_first_usable(paths: &[PathBuf], convert: impl Fn(i64) -> Option<i32>) -> Option<i32> {
    paths.iter().find_map(|path| {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                trace!("skip '{}': {e}", path.display());
                return None;
            }
        };
        match raw.trim().parse::<i64>() {
            Ok(v) if is_usable(v) => {
                let converted = convert(v);
                if converted.is_none() {
                    trace!("skip '{}': out of range {v}", path.display());
                }
                converted
            }
            Ok(v) => {
                trace!("skip '{}': unusable value {v}", path.display());
                None
            }
            Err(e) => {
                trace!("skip '{}': {e}", path.display());
                None
            }
        }
    })
}

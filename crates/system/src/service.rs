use crate::uevent::{parse_uevent, scan_plug_source};
use devinfo_core::{BatteryChanged, ChargeStatus, DevinfoError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Returned by [`BatteryService::int_property`] when a property is unsupported.
pub const SENTINEL: i64 = i64::MIN;

/// `true` for values the platform uses to mean "unsupported / unknown".
pub fn is_sentinel(value: i64) -> bool {
    value == SENTINEL || value == i64::from(i32::MIN)
}

/// Integer properties exposed by the battery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryProperty {
    /// Instantaneous current, µA.
    CurrentNow,
    /// Averaged current, µA.
    CurrentAverage,
    /// Remaining capacity, percent.
    Capacity,
}

impl BatteryProperty {
    /// Candidate attribute files, most specific first.
    fn attributes(self) -> &'static [&'static str] {
        match self {
            Self::CurrentNow     => &["current_now"],
            Self::CurrentAverage => &["current_avg"],
            Self::Capacity       => &["capacity"],
        }
    }
}

/// Battery-service seam: property queries plus the sticky battery-change event.
///
/// Implementations must be cheap to call from the refresh tasks; every call is
/// a handful of small local reads.
pub trait BatteryService: Send + Sync {
    /// Read an integer property.  Unsupported properties yield [`SENTINEL`];
    /// a source that exists but cannot be read yields an error.
    fn int_property(&self, property: BatteryProperty) -> Result<i64>;

    /// Milliseconds until full, or a non-positive value when unknown.
    fn compute_charge_time_remaining(&self) -> Result<i64>;

    /// Latest battery-change event, `None` when there is no battery.
    fn sticky_battery_changed(&self) -> Option<BatteryChanged>;

    /// Manufacturer-rated capacity in mAh.
    ///
    /// Fragile and driver-dependent; callers should probe once and cache
    /// (see [`crate::capacity::DesignCapacityProbe`]).
    fn probe_design_capacity(&self) -> Option<u32> {
        None
    }
}

/// [`BatteryService`] backed by the Linux power-supply class.
#[derive(Debug, Clone)]
pub struct SysfsBatteryService {
    /// Root of the class tree, e.g. `/sys/class/power_supply`.
    root:   PathBuf,
    /// Directory of the chosen battery; `None` when no battery was found.
    supply: Option<PathBuf>,
}

impl SysfsBatteryService {
    /// Use the supply called `name` under `root`.
    pub fn new(root: impl Into<PathBuf>, name: &str) -> Self {
        let root = root.into();
        let supply = Some(root.join(name));
        Self { root, supply }
    }

    /// Resolve `supply` (`"auto"` or a name) under `root`.
    ///
    /// Never fails: without a battery every query degrades to "unknown".
    pub fn discover(root: impl Into<PathBuf>, supply: &str) -> Self {
        let root = root.into();
        if supply != "auto" {
            return Self::new(root, supply);
        }

        let found = find_battery(&root);
        match &found {
            Some(p) => debug!("Using battery supply '{}'", p.display()),
            None    => warn!("No battery found under '{}'", root.display()),
        }
        Self { root, supply: found }
    }

    /// Read an attribute of the battery, `Ok(None)` if it does not exist.
    fn read_attr(&self, name: &str) -> Result<Option<String>> {
        let Some(dir) = &self.supply else {
            return Ok(None);
        };
        let path = dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DevinfoError::Service(format!("read '{}': {e}", path.display()))),
        }
    }

    fn read_i64(&self, name: &str) -> Result<Option<i64>> {
        let Some(raw) = self.read_attr(name)? else {
            return Ok(None);
        };
        raw.parse::<i64>()
            .map(Some)
            .map_err(|e| DevinfoError::Service(format!("parse {name} = {raw:?}: {e}")))
    }

    /// Attribute value, if present and positive.
    fn positive(&self, name: &str) -> Option<i64> {
        self.read_i64(name).ok().flatten().filter(|v| *v > 0)
    }
}

impl BatteryService for SysfsBatteryService {
    fn int_property(&self, property: BatteryProperty) -> Result<i64> {
        for attr in property.attributes() {
            if let Some(v) = self.read_i64(attr)? {
                return Ok(v);
            }
        }
        Ok(SENTINEL)
    }

    fn compute_charge_time_remaining(&self) -> Result<i64> {
        if let Some(secs) = self.positive("time_to_full_now") {
            return Ok(secs * 1_000);
        }

        let charging = self
            .read_attr("status")?
            .is_some_and(|s| crate::uevent::parse_status(&s) == ChargeStatus::Charging);
        if !charging {
            return Ok(-1);
        }

        // Fall back to the coulomb counter: (full - now) / current.
        let (Some(full), Some(now)) = (self.positive("charge_full"), self.positive("charge_now"))
        else {
            return Ok(-1);
        };
        let current = self
            .read_i64("current_now")?
            .map(i64::abs)
            .filter(|c| *c > 0);
        match current {
            Some(ua) if full > now => Ok((full - now) * 3_600_000 / ua),
            _ => Ok(-1),
        }
    }

    fn sticky_battery_changed(&self) -> Option<BatteryChanged> {
        let raw = match self.read_attr("uevent") {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!("Battery uevent unavailable: {e}");
                return None;
            }
        };

        let mut event = parse_uevent(&raw);
        if event.level.is_none() {
            match self.int_property(BatteryProperty::Capacity) {
                Ok(pct) if (0..=100).contains(&pct) => {
                    event.level = i32::try_from(pct).ok();
                    event.scale = Some(100);
                }
                Ok(_) => {}
                Err(e) => debug!("Battery capacity unavailable: {e}"),
            }
        }
        event.plugged = scan_plug_source(&self.root);
        Some(event)
    }

    fn probe_design_capacity(&self) -> Option<u32> {
        if let Some(uah) = self.positive("charge_full_design") {
            return u32::try_from(uah / 1_000).ok();
        }

        // Energy-reporting gauges: µWh / µV = Ah.
        let uwh = self.positive("energy_full_design")?;
        let uv = self.positive("voltage_min_design")?;
        u32::try_from(uwh * 1_000 / uv).ok()
    }
}

/// First `type == Battery` entry under `root`, in name order.
fn find_battery(root: &Path) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    entries.into_iter().find(|p| {
        std::fs::read_to_string(p.join("type"))
            .map(|t| t.trim() == "Battery")
            .unwrap_or(false)
    })
}

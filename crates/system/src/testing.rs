//! Test doubles shared by this crate's unit tests.

use crate::service::{BatteryProperty, BatteryService, SENTINEL};
use devinfo_core::{BatteryChanged, ChargeStatus, DevinfoError, Health, Result};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Create `<root>/<name>/` with the given attribute files.
pub fn write_supply(root: &Path, name: &str, attrs: &[(&str, &str)]) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    for (attr, value) in attrs {
        std::fs::write(dir.join(attr), format!("{value}\n")).unwrap();
    }
}

/// In-memory battery service that counts how often it is queried.
#[derive(Debug, Default)]
pub struct FakeService {
    pub current_now:     i64,
    pub current_avg:     i64,
    pub charge_time_ms:  i64,
    pub design_capacity: Option<u32>,
    pub fail:            bool,
    pub event:           Mutex<Option<BatteryChanged>>,
    pub reads:           AtomicUsize,
    pub probes:          AtomicUsize,
}

impl FakeService {
    pub fn with_current(ua: i64) -> Self {
        Self { current_now: ua, ..Default::default() }
    }

    /// A discharging battery at `voltage_mv`.
    pub fn with_event(voltage_mv: i32) -> Self {
        let svc = Self::default();
        svc.set_event(BatteryChanged {
            present:    true,
            level:      Some(80),
            scale:      Some(100),
            status:     ChargeStatus::Discharging,
            health:     Health::Good,
            technology: Some("Li-ion".into()),
            voltage:    Some(voltage_mv),
            ..Default::default()
        });
        svc
    }

    pub fn set_event(&self, event: BatteryChanged) {
        *self.event.lock().unwrap() = Some(event);
    }
}

impl BatteryService for FakeService {
    fn int_property(&self, property: BatteryProperty) -> Result<i64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DevinfoError::Service("fake failure".into()));
        }
        Ok(match property {
            BatteryProperty::CurrentNow     => self.current_now,
            BatteryProperty::CurrentAverage => self.current_avg,
            _                               => SENTINEL,
        })
    }

    fn compute_charge_time_remaining(&self) -> Result<i64> {
        if self.fail {
            return Err(DevinfoError::Service("fake failure".into()));
        }
        Ok(self.charge_time_ms)
    }

    fn sticky_battery_changed(&self) -> Option<BatteryChanged> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.event.lock().unwrap().clone()
    }

    fn probe_design_capacity(&self) -> Option<u32> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.design_capacity
    }
}

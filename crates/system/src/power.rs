use crate::service::BatteryService;
use devinfo_core::{ChargeEstimate, ChargeStatus};
use std::time::Duration;
use tracing::trace;

/// Magnitudes below this render as zero, so idle noise doesn't flip sign.
pub const POWER_EPSILON_WATTS: f64 = 0.005;

/// Instantaneous power in watts: volts × amps.
///
/// `None` unless both inputs are known and the voltage is positive.  The sign
/// follows the current's sign; no correction is applied here.
pub fn compute_power_watts(current_ma: Option<i32>, voltage_mv: Option<i32>) -> Option<f64> {
    let current_ma = current_ma?;
    let voltage_mv = voltage_mv.filter(|v| *v > 0)?;
    Some((f64::from(voltage_mv) / 1000.0) * (f64::from(current_ma) / 1000.0))
}

/// Render a power value: `"N/A"`, `"0.00 W"` near zero, else two decimals.
pub fn format_power(watts: Option<f64>) -> String {
    match watts {
        None => "N/A".to_string(),
        Some(w) if !w.is_finite() => "N/A".to_string(),
        Some(w) if w.abs() < POWER_EPSILON_WATTS => "0.00 W".to_string(),
        Some(w) => format!("{w:.2} W"),
    }
}

/// Time-to-full estimate for `status`.
///
/// Discharging is reported as such rather than projected from the drain rate.
/// Otherwise the service's own estimate is used; a missing or non-positive
/// estimate shows as "calculating".
pub fn estimate_charge_time<S: BatteryService + ?Sized>(
    status: ChargeStatus,
    service: &S,
) -> ChargeEstimate {
    if status == ChargeStatus::Discharging {
        return ChargeEstimate::Discharging;
    }

    match service.compute_charge_time_remaining() {
        Ok(ms) if ms > 0 => ChargeEstimate::Remaining(Duration::from_millis(ms.unsigned_abs())),
        Ok(_) => ChargeEstimate::Calculating,
        Err(e) => {
            trace!("charge time unavailable: {e}");
            ChargeEstimate::Calculating
        }
    }
}

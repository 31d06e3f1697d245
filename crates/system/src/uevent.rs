use devinfo_core::{BatteryChanged, ChargeStatus, Health, PlugSource};
use std::path::Path;

/// Parse a power-supply `uevent` dump into a [`BatteryChanged`].
///
/// The format is one `POWER_SUPPLY_<KEY>=<value>` pair per line.  Unknown keys
/// and malformed lines are ignored; units are converted to the event's
/// conventions (level/scale, tenths °C, millivolts).  `plugged` is left
/// `Unknown` since it lives on the other supplies; see [`scan_plug_source`].
pub fn parse_uevent(raw: &str) -> BatteryChanged {
    let mut event = BatteryChanged {
        present: true,
        ..Default::default()
    };

    for line in raw.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches("POWER_SUPPLY_");
        let value = value.trim();

        match key {
            "PRESENT" => event.present = value == "1",
            "CAPACITY" => {
                event.level = value.parse().ok();
                event.scale = Some(100);
            }
            "STATUS" => event.status = parse_status(value),
            "HEALTH" => event.health = parse_health(value),
            "TECHNOLOGY" => {
                event.technology = match value {
                    "" | "Unknown" => None,
                    t => Some(t.to_string()),
                };
            }
            "TEMP" => event.temperature = value.parse().ok(),
            "VOLTAGE_NOW" => {
                event.voltage = value
                    .parse::<i64>()
                    .ok()
                    .and_then(|uv| i32::try_from(uv / 1_000).ok())
                    .filter(|mv| *mv > 0);
            }
            _ => {}
        }
    }

    event
}

/// Map the kernel's `status` string.
pub fn parse_status(raw: &str) -> ChargeStatus {
    match raw.trim() {
        "Charging"     => ChargeStatus::Charging,
        "Discharging"  => ChargeStatus::Discharging,
        "Full"         => ChargeStatus::Full,
        "Not charging" => ChargeStatus::NotCharging,
        _              => ChargeStatus::Unknown,
    }
}

/// Map the kernel's `health` string.
pub fn parse_health(raw: &str) -> Health {
    match raw.trim() {
        "Good"                => Health::Good,
        "Overheat" | "Hot"    => Health::Overheat,
        "Dead"                => Health::Dead,
        "Cold"                => Health::Cold,
        "Over voltage"        => Health::OverVoltage,
        "Unspecified failure" => Health::Failure,
        _                     => Health::Unknown,
    }
}

/// Determine which external supply is online.
///
/// `None` means external supplies exist but none is online (on battery);
/// `Unknown` means there is nothing to inspect.
pub fn scan_plug_source(root: &Path) -> PlugSource {
    let Ok(dir) = std::fs::read_dir(root) else {
        return PlugSource::Unknown;
    };
    let mut supplies: Vec<_> = dir.filter_map(|e| e.ok().map(|e| e.path())).collect();
    supplies.sort();

    let mut saw_external = false;
    for supply in supplies {
        let kind = match std::fs::read_to_string(supply.join("type")) {
            Ok(t) => t.trim().to_string(),
            Err(_) => continue,
        };
        let source = match kind.as_str() {
            "Mains" => PlugSource::Ac,
            "Wireless" => PlugSource::Wireless,
            k if k.starts_with("USB") => PlugSource::Usb,
            _ => continue,
        };
        saw_external = true;

        let online = std::fs::read_to_string(supply.join("online"))
            .map(|s| s.trim() == "1")
            .unwrap_or(false);
        if online {
            return source;
        }
    }

    if saw_external {
        PlugSource::None
    } else {
        PlugSource::Unknown
    }
}

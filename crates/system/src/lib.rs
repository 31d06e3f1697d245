pub mod capacity;
pub mod power;
pub mod service;
pub mod telemetry;
pub mod uevent;

#[cfg(test)]
mod testing;

pub use capacity::DesignCapacityProbe;
pub use power::{compute_power_watts, estimate_charge_time, format_power};
pub use service::{BatteryProperty, BatteryService, SysfsBatteryService};
pub use telemetry::TelemetryReader;

use devinfo_core::{BatteryChanged, Message, StatusFields};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

/// Periods of the two refresh channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Current / voltage / power timer.
    pub fast_interval: Duration,
    /// Battery-change poll.
    pub slow_poll: Duration,
}

/// Both refresh channels, alive for as long as this handle is.
///
/// Acquire with [`spawn_refresh`] when the screen becomes visible; release by
/// dropping it or calling [`RefreshHandle::stop`] when the screen is hidden.
/// Either way both tasks are aborted and no further reads happen.
#[derive(Debug)]
pub struct RefreshHandle {
    rx:    mpsc::Receiver<Message>,
    tasks: Vec<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Next update from either channel.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Abort both channels and wait until they are gone.
    pub async fn stop(mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Spawn the slow and fast refresh channels and return their handle.
///
/// - slow: reads the sticky battery-change event immediately, then every
///   `slow_poll`, and sends [`Message::StatusChanged`] only when the status
///   fields differ from the last ones sent.
/// - fast: every `fast_interval`, samples current and voltage and sends
///   [`Message::Telemetry`].
///
/// The kernel also announces changes as netlink uevents; the slow channel
/// reads the `uevent` attribute instead, which also sees drivers that update
/// charge attributes silently.
///
/// Each task also stops on its own once the receiver is dropped.
pub fn spawn_refresh<S>(
    reader: Arc<TelemetryReader<S>>,
    probe: Arc<DesignCapacityProbe>,
    settings: RefreshSettings,
) -> RefreshHandle
where
    S: BatteryService + 'static,
{
    let (tx, rx) = mpsc::channel(16);

    let slow = tokio::spawn(slow_channel(
        Arc::clone(&reader),
        probe,
        settings.slow_poll,
        tx.clone(),
    ));
    let fast = tokio::spawn(fast_channel(reader, settings.fast_interval, tx));

    debug!(
        "Refresh armed (fast {:?}, slow {:?})",
        settings.fast_interval, settings.slow_poll
    );

    RefreshHandle {
        rx,
        tasks: vec![slow, fast],
    }
}

async fn fast_channel<S: BatteryService>(
    reader: Arc<TelemetryReader<S>>,
    period: Duration,
    tx: mpsc::Sender<Message>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let sample = reader.sample();

        if tx.send(Message::Telemetry(sample)).await.is_err() {
            break; // all receivers dropped
        }
    }
}

async fn slow_channel<S: BatteryService>(
    reader: Arc<TelemetryReader<S>>,
    probe: Arc<DesignCapacityProbe>,
    period: Duration,
    tx: mpsc::Sender<Message>,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<StatusFields> = None;

    loop {
        ticker.tick().await;
        let Some(event) = reader.service().sticky_battery_changed() else {
            continue;
        };

        let fields = status_fields(&event, reader.service(), &probe);
        if last.as_ref() == Some(&fields) {
            continue;
        }
        last = Some(fields.clone());

        if tx.send(Message::StatusChanged(fields)).await.is_err() {
            break;
        }
    }
}

/// Derive the slow-channel fields from one battery-change event.
pub fn status_fields<S: BatteryService + ?Sized>(
    event: &BatteryChanged,
    service: &S,
    probe: &DesignCapacityProbe,
) -> StatusFields {
    StatusFields {
        level_percent:              event.level_percent(),
        status:                     event.status,
        health:                     event.health,
        plug_source:                event.plugged,
        technology:                 event.technology.clone(),
        temperature_tenths_celsius: event.temperature,
        charge_estimate:            estimate_charge_time(event.status, service),
        design_capacity_mah:        probe.get(service),
    }
}

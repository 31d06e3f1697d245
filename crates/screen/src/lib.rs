//! The battery details screen.
//!
//! Owns the run loop and wires together:
//! - battery-change poller (health, status, plug, level; slow channel)
//! - telemetry timer (current, voltage, power; fast channel)
//! - config file watcher (live reload on change)
//! - Ctrl-C (hide and exit)

use devinfo_config::{load as load_config, ConfigOverrides, ConfigWatcher, DevinfoConfig};
use devinfo_core::{BatteryReading, DevinfoError, Message, Result, TelemetrySample};
use devinfo_renderer::{diff_rows, render_list, Frame, RowChange, RowLayout};
use devinfo_system::{
    compute_power_watts, spawn_refresh, status_fields, BatteryService, DesignCapacityProbe,
    RefreshHandle, RefreshSettings, SysfsBatteryService, TelemetryReader,
};
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Clear the terminal and move the cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";

// ── State ─────────────────────────────────────────────────────────────────────

/// Battery details screen.
///
/// Holds the latest immutable [`BatteryReading`] and the frame drawn from it.
/// Every message produces a new reading; the returned [`RowChange`]s say
/// which rows differ from the previous frame.
pub struct BatteryScreen<S: BatteryService + 'static> {
    reading:     BatteryReading,
    frame:       Frame,
    layout:      RowLayout,
    config:      DevinfoConfig,
    config_path: Option<PathBuf>,
    overrides:   ConfigOverrides,
    reader:      Arc<TelemetryReader<S>>,
    probe:       Arc<DesignCapacityProbe>,
    /// Present only while visible.
    refresh:     Option<RefreshHandle>,
}

impl BatteryScreen<SysfsBatteryService> {
    /// Screen backed by the Linux power-supply class, as configured.
    pub fn sysfs(config: DevinfoConfig) -> Self {
        let service =
            SysfsBatteryService::discover(&config.battery.sysfs_root, &config.battery.supply);
        Self::new(config, service)
    }
}

impl<S: BatteryService + 'static> BatteryScreen<S> {
    pub fn new(config: DevinfoConfig, service: S) -> Self {
        let reader = TelemetryReader::new(
            service,
            &config.battery.sysfs_root,
            &config.battery.telemetry_sources,
        );
        let layout  = RowLayout::from_config(&config.display);
        let reading = BatteryReading::default();
        let frame   = layout.frame(&reading);

        Self {
            reading,
            frame,
            layout,
            config,
            config_path: None,
            overrides:   ConfigOverrides::default(),
            reader:  Arc::new(reader),
            probe:   Arc::new(DesignCapacityProbe::new()),
            refresh: None,
        }
    }

    /// File re-read on [`Message::ConfigReloaded`].
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Command-line settings re-applied on top of every reloaded file.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let config = overrides.apply(self.config.clone());
        self.overrides = overrides;
        self.apply_config(config);
        self
    }

    pub fn config(&self) -> &DevinfoConfig {
        &self.config
    }

    pub fn reading(&self) -> &BatteryReading {
        &self.reading
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn is_visible(&self) -> bool {
        self.refresh.is_some()
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Arm both refresh channels.  A no-op if they are already armed.
    pub fn on_visible(&mut self) {
        if self.refresh.is_some() {
            debug!("Screen already visible; refresh stays armed");
            return;
        }
        self.refresh = Some(spawn_refresh(
            Arc::clone(&self.reader),
            Arc::clone(&self.probe),
            self.refresh_settings(),
        ));
        info!("Battery refresh armed");
    }

    /// Disarm both refresh channels.  Hiding an already hidden screen is
    /// ignored.
    pub fn on_hidden(&mut self) {
        match self.refresh.take() {
            Some(handle) => {
                drop(handle);
                info!("Battery refresh disarmed");
            }
            None => debug!("Screen hidden without an armed refresh; ignoring"),
        }
    }

    /// Next message from the refresh channels.  Never resolves while hidden.
    pub async fn next_message(&mut self) -> Option<Message> {
        match &mut self.refresh {
            Some(handle) => handle.recv().await,
            None => std::future::pending().await,
        }
    }

    fn refresh_settings(&self) -> RefreshSettings {
        RefreshSettings {
            fast_interval: self.config.refresh.fast_interval(),
            slow_poll:     self.config.refresh.slow_poll(),
        }
    }

    // ── Update ────────────────────────────────────────────────────────────────

    /// Fold `msg` into a new snapshot and return the rows that changed.
    pub fn update(&mut self, msg: Message) -> Vec<RowChange> {
        match msg {
            Message::StatusChanged(fields) => {
                self.reading = self.reading.apply_status(&fields);
            }
            Message::Telemetry(sample) => {
                let sample = self.signed(sample);
                self.reading = self.reading.apply_telemetry(&sample);
            }
            Message::ConfigReloaded => self.reload_config(),
            Message::Visible => self.on_visible(),
            Message::Hidden | Message::Shutdown => self.on_hidden(),
        }
        self.redraw()
    }

    /// Read both channels once, synchronously.  Used for one-shot output.
    pub fn refresh_now(&mut self) -> Vec<RowChange> {
        let service = self.reader.service();
        if let Some(event) = service.sticky_battery_changed() {
            let fields = status_fields(&event, service, &self.probe);
            self.update(Message::StatusChanged(fields));
        }
        let sample = self.reader.sample();
        self.update(Message::Telemetry(sample))
    }

    /// Apply the configured sign convention; power follows the signed current.
    fn signed(&self, sample: TelemetrySample) -> TelemetrySample {
        let current = self
            .config
            .display
            .current_sign
            .apply(sample.current_milliamps, self.reading.status);
        TelemetrySample {
            current_milliamps: current,
            power_watts:       compute_power_watts(current, sample.voltage_millivolts),
            ..sample
        }
    }

    fn reload_config(&mut self) {
        let Some(path) = &self.config_path else {
            return;
        };
        match load_config(path) {
            Ok(cfg) => {
                info!("Config reloaded");
                let mut cfg = self.overrides.apply(cfg);
                if cfg.battery != self.config.battery {
                    warn!("Battery source changes take effect after a restart");
                    cfg.battery = self.config.battery.clone();
                }
                self.apply_config(cfg);
            }
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }

    /// Swap in `config`, re-arming the refresh loop if visible so new
    /// intervals apply.
    pub fn apply_config(&mut self, config: DevinfoConfig) {
        let rearm = self.is_visible() && config.refresh != self.config.refresh;
        self.layout = RowLayout::from_config(&config.display);
        self.config = config;

        if rearm {
            self.on_hidden();
            self.on_visible();
        }
    }

    fn redraw(&mut self) -> Vec<RowChange> {
        let frame = self.layout.frame(&self.reading);
        let changes = diff_rows(&self.frame, &frame);
        self.frame = frame;
        changes
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Print the current frame, or the reading as JSON.
    pub fn print(&self, out: &mut impl Write, json: bool) -> Result<()> {
        if json {
            serde_json::to_writer_pretty(&mut *out, &self.reading)
                .map_err(|e| DevinfoError::Screen(format!("encode reading: {e}")))?;
            writeln!(out)?;
        } else {
            render_list(out, &self.frame)?;
        }
        Ok(())
    }
}

impl<S: BatteryService + 'static> Drop for BatteryScreen<S> {
    fn drop(&mut self) {
        self.on_hidden();
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Show the screen on stdout until Ctrl-C, redrawing whenever a row changes.
///
/// On a terminal the list is redrawn in place; otherwise each changed frame
/// is appended, separated by a blank line.
pub async fn run<S: BatteryService + 'static>(screen: BatteryScreen<S>) -> Result<()> {
    let stdout = std::io::stdout();
    let in_place = stdout.is_terminal();
    let mut out = stdout.lock();

    run_until(screen, &mut out, in_place, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Drive `screen` into `out` until `shutdown` resolves.
pub async fn run_until<S, F>(
    mut screen: BatteryScreen<S>,
    out: &mut impl Write,
    in_place: bool,
    shutdown: F,
) -> Result<()>
where
    S: BatteryService + 'static,
    F: Future<Output = ()>,
{
    let mut config_rx = match &screen.config_path {
        Some(path) => Some(ConfigWatcher::spawn(path)),
        None => None,
    };
    tokio::pin!(shutdown);

    screen.update(Message::Visible);
    draw(out, &screen, in_place)?;

    loop {
        let msg = tokio::select! {
            Some(msg) = screen.next_message() => msg,
            Some(()) = config_changed(&mut config_rx) => Message::ConfigReloaded,
            () = &mut shutdown => Message::Shutdown,
        };
        let shutdown = matches!(msg, Message::Shutdown);

        if !screen.update(msg).is_empty() {
            draw(out, &screen, in_place)?;
        }
        if shutdown {
            info!("Shutting down");
            return Ok(());
        }
    }
}

async fn config_changed(
    watcher: &mut Option<(ConfigWatcher, tokio::sync::mpsc::Receiver<()>)>,
) -> Option<()> {
    match watcher {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn draw<S: BatteryService + 'static>(
    out: &mut impl Write,
    screen: &BatteryScreen<S>,
    in_place: bool,
) -> Result<()> {
    if in_place {
        write!(out, "{CLEAR}")?;
    } else {
        writeln!(out)?;
    }
    screen.print(out, false)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use devinfo_core::{
        BatteryChanged, ChargeStatus, CurrentSign, Health, LabeledEntry, StatusFields,
    };
    use devinfo_config::SectionConfig;
    use devinfo_system::BatteryProperty;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct Fake {
        int_reads: AtomicUsize,
    }

    impl BatteryService for Fake {
        fn int_property(&self, property: BatteryProperty) -> Result<i64> {
            self.int_reads.fetch_add(1, Ordering::SeqCst);
            Ok(match property {
                BatteryProperty::CurrentNow => 500_000,
                _ => i64::MIN,
            })
        }

        fn compute_charge_time_remaining(&self) -> Result<i64> {
            Ok(-1)
        }

        fn sticky_battery_changed(&self) -> Option<BatteryChanged> {
            Some(BatteryChanged {
                present:    true,
                level:      Some(50),
                scale:      Some(100),
                status:     ChargeStatus::Discharging,
                health:     Health::Good,
                technology: Some("Li-ion".into()),
                voltage:    Some(4000),
                ..Default::default()
            })
        }
    }

    fn screen() -> BatteryScreen<Fake> {
        let mut cfg = DevinfoConfig::default();
        cfg.battery.sysfs_root = std::env::temp_dir().join("devinfo-no-such-root");
        cfg.battery.telemetry_sources.clear();
        BatteryScreen::new(cfg, Fake::default())
    }

    fn int_reads(s: &BatteryScreen<Fake>) -> usize {
        s.reader.service().int_reads.load(Ordering::SeqCst)
    }

    #[test]
    fn refresh_now_fills_every_row() {
        let mut s = screen();
        s.refresh_now();

        assert_eq!(s.frame().value("Technology"), Some("Li-ion"));
        assert_eq!(s.frame().value("Level"), Some("50%"));
        assert_eq!(s.frame().value("Current (Real-time)"), Some("500 mA"));
        assert_eq!(s.frame().value("Power (Real-time)"), Some("2.00 W"));
        assert_eq!(s.frame().value("Time to Charge/Discharge"), Some("Discharging"));
        assert_eq!(s.frame().value("Battery"), Some("▌ 50%"));
    }

    #[test]
    fn telemetry_only_touches_fast_rows() {
        let mut s = screen();
        s.refresh_now();

        let changes = s.update(Message::Telemetry(TelemetrySample {
            current_milliamps:  Some(750),
            voltage_millivolts: Some(4000),
            power_watts:        Some(3.0),
        }));

        let labels: Vec<String> = changes
            .iter()
            .map(|c| match c {
                RowChange::Changed { row, .. } => row.label.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(labels, vec!["Current (Real-time)", "Power (Real-time)"]);
        assert_eq!(s.frame().value("Technology"), Some("Li-ion"));
    }

    #[test]
    fn status_only_touches_slow_rows() {
        let mut s = screen();
        s.refresh_now();

        let changes = s.update(Message::StatusChanged(StatusFields {
            level_percent: Some(50),
            status:        ChargeStatus::Discharging,
            health:        Health::Overheat,
            technology:    Some("Li-ion".into()),
            charge_estimate: devinfo_core::ChargeEstimate::Discharging,
            ..Default::default()
        }));

        assert!(changes.contains(&RowChange::Changed {
            index: 1,
            row:   LabeledEntry::new("Health", "Overheat"),
        }));
        assert_eq!(s.frame().value("Current (Real-time)"), Some("500 mA"));
        assert_eq!(s.frame().value("Voltage"), Some("4000 mV"));
    }

    #[test]
    fn sign_convention_applies_to_current_and_power() {
        let mut s = screen();
        let mut cfg = s.config.clone();
        cfg.display.current_sign = CurrentSign::PositiveCharging;
        s.apply_config(cfg);
        s.refresh_now(); // discharging, raw +500 mA

        assert_eq!(s.reading().current_milliamps, Some(-500));
        assert_eq!(s.frame().value("Power (Real-time)"), Some("-2.00 W"));
    }

    #[test]
    fn hiding_a_hidden_screen_is_harmless() {
        let mut s = screen();
        s.on_hidden();
        s.update(Message::Hidden);
        assert!(!s.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn second_visible_does_not_double_arm() {
        let mut s = screen();
        s.on_visible();
        s.on_visible();
        tokio::time::sleep(Duration::from_millis(10)).await;

        // One fast tick at t=0 → one CurrentNow read.
        assert_eq!(int_reads(&s), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_screen_does_no_reads() {
        let mut s = screen();
        s.update(Message::Visible);
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        loop {
            match tokio::time::timeout(Duration::ZERO, s.next_message()).await {
                Ok(Some(msg)) => s.update(msg),
                _ => break,
            };
        }
        assert_eq!(s.frame().value("Current (Real-time)"), Some("500 mA"));

        s.update(Message::Hidden);
        tokio::task::yield_now().await;
        let reads = int_reads(&s);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(int_reads(&s), reads);

        s.update(Message::Visible);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(int_reads(&s), reads + 1);
    }

    #[test]
    fn reload_keeps_command_line_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devinfo.toml");
        std::fs::write(&path, "# first\n[refresh]\nfast_interval_ms = 1000\n").unwrap();

        let mut s = screen().with_config_path(&path).with_overrides(ConfigOverrides {
            fast_interval_ms: Some(2_000),
            sections:         Some(vec![SectionConfig::new("details")]),
        });
        assert_eq!(s.config().refresh.fast_interval_ms, 2_000);

        std::fs::write(&path, "# edited\n[refresh]\nfast_interval_ms = 1000\n").unwrap();
        s.update(Message::ConfigReloaded);

        assert_eq!(s.config().refresh.fast_interval_ms, 2_000);
        assert_eq!(s.layout.ids(), vec!["details"]);
        assert_eq!(s.frame().value("Battery"), None);
    }

    #[test]
    fn reload_keeps_the_running_battery_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devinfo.toml");
        let mut s = screen().with_config_path(&path);
        let running = s.config().battery.clone();

        std::fs::write(&path, "[battery]\nsupply = \"BAT9\"\n[refresh]\nslow_poll_ms = 7000\n")
            .unwrap();
        s.update(Message::ConfigReloaded);
        assert_eq!(s.config().battery, running);
        assert_eq!(s.config().refresh.slow_poll_ms, 7_000);

        // Still differs from the file, so a second reload warns again.
        s.update(Message::ConfigReloaded);
        assert_eq!(s.config().battery, running);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_sent_before_the_loop_is_not_lost() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();

        let mut out = Vec::new();
        run_until(screen(), &mut out, false, async {
            let _ = rx.await;
        })
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Technology"));
    }

    #[test]
    fn json_output_is_valid() {
        let mut s = screen();
        s.refresh_now();

        let mut out = Vec::new();
        s.print(&mut out, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["technology"], "Li-ion");
        assert_eq!(value["status"], "discharging");
        assert_eq!(value["current_milliamps"], 500);
    }
}

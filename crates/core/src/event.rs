use crate::state::{StatusFields, TelemetrySample};

/// All messages (events) that can flow into the battery screen.
///
/// Sources:
/// - Battery-change poller  → `StatusChanged`
/// - Telemetry timer        → `Telemetry`
/// - Config watcher task    → `ConfigReloaded`
/// - Terminal / signals     → `Visible`, `Hidden`, `Shutdown`
#[derive(Debug, Clone)]
pub enum Message {
    // ── Slow channel ──────────────────────────────────────────────────────────
    /// Health / status / plug / technology / level changed.
    StatusChanged(StatusFields),

    // ── Fast channel ──────────────────────────────────────────────────────────
    /// Fresh current / voltage / power sample from the refresh timer.
    Telemetry(TelemetrySample),

    // ── Config ────────────────────────────────────────────────────────────────
    /// Config file changed on disk — triggers a live reload.
    ConfigReloaded,

    // ── Lifecycle ─────────────────────────────────────────────────────────────
    /// The screen became visible; arm both refresh channels.
    Visible,
    /// The screen was hidden; disarm both refresh channels.
    Hidden,
    /// Graceful shutdown requested.
    Shutdown,
}

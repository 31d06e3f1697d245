use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Quiet period used to fold an editor's write burst into one reload.
const SETTLE: Duration = Duration::from_millis(200);

/// Watches the config file for changes and sends a notification per save.
///
/// The parent directory is watched rather than the file itself, so saves
/// that replace the file (write-to-temp then rename) keep being seen.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// use devinfo_config::ConfigWatcher;
/// let (_watcher, mut rx) = ConfigWatcher::spawn("/home/user/.config/devinfo/devinfo.toml");
/// while rx.recv().await.is_some() {
///     println!("config changed — reloading");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

    let Some(dir) = path.parent().map(Path::to_path_buf) else {
        error!("Config path '{}' has no parent directory", path.display());
        return;
    };
    let file_name = path.file_name().map(|n| n.to_os_string());

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        // No config directory is a normal setup; the defaults stay in force.
        warn!("Not watching '{}': {e}", dir.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        let event = match event {
            Ok(e) => e,
            Err(e) => {
                warn!("Watcher error: {e}");
                continue;
            }
        };

        use notify::EventKind::*;
        let touches_config = event
            .paths
            .iter()
            .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
        if !touches_config || !matches!(event.kind, Modify(_) | Create(_)) {
            continue;
        }

        // Drain the rest of the burst before notifying.
        while let Ok(Some(_)) = tokio::time::timeout(SETTLE, sync_rx.recv()).await {}
        debug!("Config change detected");

        if tx.send(()).await.is_err() {
            break; // receiver dropped
        }
    }
}

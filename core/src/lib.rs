use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Context;
use async_trait::async_trait;
use keycodes_shared_types::{AppEvent, Config, KeyRecord};
use tokio::sync::broadcast;
use tracing::{debug, info};

pub mod viewer;

pub use viewer::{EscapeCounter, KeyLog, KeyViewer, Outcome};

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn send(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }

    pub fn publish_key(&self, record: &KeyRecord) {
        debug!(code = record.code, label = %record.label, "key recorded");
        self.send(AppEvent::Key(record.clone()));
    }
}

/// Shared flag front ends poll between events to notice an external stop request.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct ModuleContext {
    pub bus: EventBus,
}

#[derive(Debug)]
pub struct ModuleHandle {
    join: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl ModuleHandle {
    pub fn new(join: tokio::task::JoinHandle<anyhow::Result<()>>) -> Self {
        Self { join }
    }

    pub async fn join(self) -> anyhow::Result<()> {
        self.join
            .await
            .context("module task panicked")?
            .context("module task returned error")
    }
}

#[async_trait]
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;
    async fn start(&self, ctx: ModuleContext) -> anyhow::Result<ModuleHandle>;
}

/// Reads and validates the config file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let config = match std::fs::read_to_string(path) {
        Ok(raw) => toml::from_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config: {}", path.display()));
        }
    };
    config
        .validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(config)
}

pub fn is_module_loaded(config: &Config, name: &str) -> bool {
    let loaded: HashSet<&str> = config.modules.loaded.iter().map(|s| s.as_str()).collect();
    let disabled: HashSet<&str> =
        config.modules.disabled.iter().map(|s| s.as_str()).collect();
    loaded.contains(name) && !disabled.contains(name)
}

pub struct Runtime {
    pub config_path: PathBuf,
    pub config: Config,
    pub bus: EventBus,
    pub shutdown: ShutdownSignal,
}

impl Runtime {
    pub fn new(config_path: PathBuf, config: Config) -> Self {
        info!(config = %config_path.display(), frontend = %config.viewer.frontend, "runtime created");
        Self {
            config_path,
            config,
            bus: EventBus::new(256),
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn module_context(&self) -> ModuleContext {
        ModuleContext {
            bus: self.bus.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use keycodes_shared_types::{Frontend, KeyDirection};

    use super::*;

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.viewer.frontend, Frontend::Window);
    }

    #[test]
    fn config_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[viewer]\nfrontend = \"terminal\"\n[terminal]\nmax_events = 3").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.viewer.frontend, Frontend::Terminal);
        assert_eq!(config.terminal.max_events, 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nmax_events = 0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("window.max_events"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[viewer\nfrontend = ").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn disabled_module_is_not_loaded() {
        let mut config = Config::default();
        assert!(is_module_loaded(&config, "key_echo"));
        config.modules.disabled.push("key_echo".to_string());
        assert!(!is_module_loaded(&config, "key_echo"));
        assert!(!is_module_loaded(&config, "unknown"));
    }

    #[test]
    fn shutdown_signal_is_shared_between_clones() {
        let signal = ShutdownSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_requested());
        signal.request();
        assert!(observer.is_requested());
    }

    #[tokio::test]
    async fn bus_delivers_published_keys() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let record = KeyRecord {
            direction: KeyDirection::Down,
            label: "a".to_string(),
            code: 97,
        };
        bus.publish_key(&record);
        bus.send(AppEvent::ShutdownRequested);

        match rx.recv().await.unwrap() {
            AppEvent::Key(got) => assert_eq!(got, record),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), AppEvent::ShutdownRequested));
    }

    #[tokio::test]
    async fn module_handle_surfaces_task_errors() {
        let handle = ModuleHandle::new(tokio::spawn(async { anyhow::bail!("boom") }));
        let err = handle.join().await.unwrap_err();
        assert!(format!("{err:#}").contains("boom"));
    }
}

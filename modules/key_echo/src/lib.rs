use std::{
    io::{self, Write},
    sync::Mutex,
};

use anyhow::Context;
use async_trait::async_trait;
use keycodes_core::{Module, ModuleContext, ModuleHandle};
use keycodes_shared_types::{AppEvent, config::EchoConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

type EchoWriter = Box<dyn Write + Send>;

/// Prints every recorded key to a line-oriented sink, stdout by default.
pub struct KeyEchoModule {
    config: EchoConfig,
    writer: Mutex<Option<EchoWriter>>,
}

impl KeyEchoModule {
    pub fn new(config: EchoConfig) -> Self {
        Self::with_writer(config, Box::new(io::stdout()))
    }

    pub fn with_writer(config: EchoConfig, writer: EchoWriter) -> Self {
        Self {
            config,
            writer: Mutex::new(Some(writer)),
        }
    }
}

#[async_trait]
impl Module for KeyEchoModule {
    fn name(&self) -> &'static str {
        "key_echo"
    }

    async fn start(&self, ctx: ModuleContext) -> anyhow::Result<ModuleHandle> {
        let mut rx = ctx.bus.subscribe();
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("key_echo writer lock poisoned"))?
            .take()
            .context("key_echo already started")?;
        let enabled = self.config.enabled;

        let join = tokio::spawn(async move {
            info!(enabled, "key_echo started");

            loop {
                match rx.recv().await {
                    Ok(AppEvent::ShutdownRequested) | Err(RecvError::Closed) => {
                        info!("key_echo shutting down");
                        break;
                    }
                    Ok(AppEvent::Key(record)) => {
                        if enabled {
                            writeln!(writer, "{record}").context("write key record")?;
                            writer.flush().context("flush key record")?;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "key_echo fell behind, records dropped");
                    }
                }
            }

            Ok(())
        });

        Ok(ModuleHandle::new(join))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use keycodes_core::EventBus;
    use keycodes_shared_types::{KeyDirection, KeyRecord};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record(label: &str, code: u32) -> KeyRecord {
        KeyRecord {
            direction: KeyDirection::Down,
            label: label.to_string(),
            code,
        }
    }

    #[tokio::test]
    async fn echoes_records_until_shutdown() {
        let buf = SharedBuf::default();
        let module = KeyEchoModule::with_writer(EchoConfig { enabled: true }, Box::new(buf.clone()));
        let bus = EventBus::new(16);
        let handle = module.start(ModuleContext { bus: bus.clone() }).await.unwrap();

        bus.publish_key(&record("Ctrl+a", 97));
        bus.publish_key(&record("escape", 27));
        bus.send(AppEvent::ShutdownRequested);
        handle.join().await.unwrap();

        assert_eq!(
            buf.contents(),
            "Key Down: Ctrl+a (Code: 97)\nKey Down: escape (Code: 27)\n"
        );
    }

    #[tokio::test]
    async fn disabled_echo_stays_silent() {
        let buf = SharedBuf::default();
        let module = KeyEchoModule::with_writer(EchoConfig { enabled: false }, Box::new(buf.clone()));
        let bus = EventBus::new(16);
        let handle = module.start(ModuleContext { bus: bus.clone() }).await.unwrap();

        bus.publish_key(&record("a", 97));
        bus.send(AppEvent::ShutdownRequested);
        handle.join().await.unwrap();

        assert!(buf.contents().is_empty());
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let module = KeyEchoModule::with_writer(EchoConfig::default(), Box::new(io::sink()));
        let bus = EventBus::new(4);
        let first = module.start(ModuleContext { bus: bus.clone() }).await.unwrap();
        assert!(module.start(ModuleContext { bus: bus.clone() }).await.is_err());
        bus.send(AppEvent::ShutdownRequested);
        first.join().await.unwrap();
    }
}

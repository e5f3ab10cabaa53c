//! Key viewer front ends, one per input toolkit.

use keycodes_core::{EventBus, ShutdownSignal};
use keycodes_shared_types::{Config, Frontend, KeyDefinition};
use tracing::info;

#[cfg(feature = "terminal")]
pub mod terminal;

#[cfg(feature = "window")]
pub mod window;

#[derive(Clone)]
pub struct Platform {
    bus: EventBus,
    shutdown: ShutdownSignal,
}

impl Platform {
    pub fn new(bus: EventBus, shutdown: ShutdownSignal) -> Self {
        Self { bus, shutdown }
    }

    /// Runs the front end's event loop on the calling thread until it quits.
    pub fn run(&self, frontend: Frontend, config: &Config) -> anyhow::Result<()> {
        info!(%frontend, "starting front end");
        match frontend {
            #[cfg(feature = "terminal")]
            Frontend::Terminal => terminal::run(config, &self.bus, &self.shutdown),
            #[cfg(feature = "window")]
            Frontend::Window => window::run(config, &self.bus, &self.shutdown),
            #[allow(unreachable_patterns)]
            other => anyhow::bail!("front end {other} was not compiled in"),
        }
    }
}

/// Every key the front end's toolkit defines, sorted by code.
pub fn key_definitions(frontend: Frontend) -> anyhow::Result<Vec<KeyDefinition>> {
    match frontend {
        #[cfg(feature = "terminal")]
        Frontend::Terminal => Ok(terminal::keymap::definitions()),
        #[cfg(feature = "window")]
        Frontend::Window => Ok(window::keymap::definitions()),
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("front end {other} was not compiled in"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "terminal")]
    #[test]
    fn terminal_table_lists_sdl_codes() {
        let lines: Vec<String> = key_definitions(Frontend::Terminal)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(lines.contains(&"escape : 27".to_string()));
        assert!(lines.contains(&"f1 : 1073741882".to_string()));
    }

    #[cfg(feature = "window")]
    #[test]
    fn window_table_is_sorted_by_code() {
        let defs = key_definitions(Frontend::Window).unwrap();
        assert!(defs.windows(2).all(|pair| pair[0].code <= pair[1].code));
        assert!(defs.iter().any(|d| d.name == "<Esc>"));
    }
}

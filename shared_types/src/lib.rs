pub mod config;
pub mod events;
pub mod modifiers;

pub use config::{Config, ConfigError, Frontend};
pub use events::{AppEvent, KeyDefinition, KeyDirection, KeyEvent, KeyRecord, KeyRole};
pub use modifiers::Modifiers;

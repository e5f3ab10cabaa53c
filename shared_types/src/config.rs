use std::{fmt, path::PathBuf, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub logging: LoggingConfig,
    pub viewer: ViewerConfig,
    pub terminal: TerminalConfig,
    pub window: WindowConfig,
    pub echo: EchoConfig,
    pub modules: ModulesConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewer.escape_presses_to_quit == 0 {
            return Err(ConfigError::ZeroEscapePresses);
        }
        if self.terminal.max_events == 0 {
            return Err(ConfigError::ZeroCapacity { section: "terminal" });
        }
        if self.window.max_events == 0 {
            return Err(ConfigError::ZeroCapacity { section: "window" });
        }
        if !(self.window.width > 0.0 && self.window.height > 0.0) {
            return Err(ConfigError::WindowSize {
                width: self.window.width,
                height: self.window.height,
            });
        }
        if self.logging.output == LogOutput::File && self.logging.file.is_none() {
            return Err(ConfigError::MissingLogFile);
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("viewer.escape_presses_to_quit must be at least 1")]
    ZeroEscapePresses,
    #[error("{section}.max_events must be at least 1")]
    ZeroCapacity { section: &'static str },
    #[error("window size must be positive, got {width}x{height}")]
    WindowSize { width: f32, height: f32 },
    #[error("logging.output = \"file\" requires logging.file")]
    MissingLogFile,
    #[error("unknown frontend {0:?}, expected \"terminal\" or \"window\"")]
    UnknownFrontend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOutput {
    Console,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LoggingConfig {
    pub level: String,
    pub output: LogOutput,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Console,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frontend {
    Terminal,
    #[default]
    Window,
}

impl Frontend {
    pub fn as_str(self) -> &'static str {
        match self {
            Frontend::Terminal => "terminal",
            Frontend::Window => "window",
        }
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frontend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal" | "tui" => Ok(Frontend::Terminal),
            "window" | "gui" => Ok(Frontend::Window),
            _ => Err(ConfigError::UnknownFrontend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ViewerConfig {
    pub frontend: Frontend,
    pub show_key_up: bool,
    pub escape_presses_to_quit: u8,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frontend: Frontend::default(),
            show_key_up: false,
            escape_presses_to_quit: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TerminalConfig {
    pub max_events: usize,
    pub keyboard_enhancement: bool,
    pub tick_ms: u64,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_events: 19,
            keyboard_enhancement: true,
            tick_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct WindowConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub max_events: usize,
    pub list_key_definitions: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Keycodes - <Esc> twice to quit.".to_string(),
            width: 400.0,
            height: 500.0,
            max_events: 1000,
            list_key_definitions: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EchoConfig {
    pub enabled: bool,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ModulesConfig {
    pub loaded: Vec<String>,
    pub disabled: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            loaded: vec!["key_echo".to_string()],
            disabled: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.viewer.frontend, Frontend::Window);
        assert_eq!(config.viewer.escape_presses_to_quit, 2);
        assert_eq!(config.terminal.max_events, 19);
        assert_eq!(config.window.max_events, 1000);
        assert_eq!(config.modules.loaded, ["key_echo"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
            [viewer]
            frontend = "terminal"
            show_key_up = true

            [terminal]
            max_events = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.viewer.frontend, Frontend::Terminal);
        assert!(config.viewer.show_key_up);
        assert_eq!(config.terminal.max_events, 5);
        assert!(config.terminal.keyboard_enhancement);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn validation_rejects_zero_capacity() {
        let mut config = Config::default();
        config.terminal.max_events = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity { section: "terminal" })
        );
    }

    #[test]
    fn validation_rejects_file_output_without_path() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            output = "file"
            "#,
        )
        .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::MissingLogFile));
    }

    #[test]
    fn validation_rejects_zero_escape_presses() {
        let mut config = Config::default();
        config.viewer.escape_presses_to_quit = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroEscapePresses));
    }

    #[test]
    fn example_config_parses_and_validates() {
        let config: Config = toml::from_str(include_str!("../../config.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.title, "Keycodes - <Esc> twice to quit.");
    }

    #[test]
    fn frontend_parses_aliases() {
        assert_eq!("TUI".parse::<Frontend>(), Ok(Frontend::Terminal));
        assert_eq!("window".parse::<Frontend>(), Ok(Frontend::Window));
        assert!(matches!(
            "qt".parse::<Frontend>(),
            Err(ConfigError::UnknownFrontend(_))
        ));
    }
}

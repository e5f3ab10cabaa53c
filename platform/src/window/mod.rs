//! Native window viewer drawn with egui.

use std::time::Duration;

use eframe::egui::{self, Color32, RichText};
use keycodes_core::{EventBus, KeyViewer, ShutdownSignal, viewer::HELP_TEXT};
use keycodes_shared_types::{Config, KeyDefinition};
use tracing::info;

pub mod keymap;

const NAME_COLOR: Color32 = Color32::from_rgb(128, 0, 128);
const CODE_COLOR: Color32 = Color32::from_rgb(0, 0, 255);
const ROW_BG: Color32 = Color32::from_rgb(240, 240, 240);
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

const APP_ID: &str = "keycodes";

fn native_options(config: &Config) -> eframe::NativeOptions {
    let window = &config.window;
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(window.title.clone())
            .with_inner_size([window.width, window.height]),
        centered: true,
        ..Default::default()
    }
}

pub fn run(config: &Config, bus: &EventBus, shutdown: &ShutdownSignal) -> anyhow::Result<()> {
    let app = KeyCodeApp::new(config, bus.clone(), shutdown.clone());
    eframe::run_native(
        APP_ID,
        native_options(config),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|err| anyhow::anyhow!("window viewer failed: {err}"))
}

struct KeyCodeApp {
    viewer: KeyViewer,
    definitions: Vec<KeyDefinition>,
    bus: EventBus,
    shutdown: ShutdownSignal,
    closing: bool,
}

impl KeyCodeApp {
    fn new(config: &Config, bus: EventBus, shutdown: ShutdownSignal) -> Self {
        let definitions = if config.window.list_key_definitions {
            keymap::definitions()
        } else {
            Vec::new()
        };
        Self {
            viewer: KeyViewer::new(
                config.window.max_events,
                config.viewer.escape_presses_to_quit,
                config.viewer.show_key_up,
            ),
            definitions,
            bus,
            shutdown,
            closing: false,
        }
    }

    /// Feeds this frame's key events to the viewer. Returns true when it asks to quit.
    ///
    /// Clipboard shortcuts reach egui as `Copy`/`Cut`/`Paste` instead of key
    /// presses; they are turned back into the key that produced them.
    fn consume_keys(&mut self, events: &[egui::Event], frame_mods: egui::Modifiers) -> bool {
        let mut quit = false;
        for event in events {
            let (key, pressed, modifiers) = match event {
                egui::Event::Key {
                    key,
                    pressed,
                    modifiers,
                    ..
                } => (*key, *pressed, *modifiers),
                other => match keymap::clipboard_key(other, frame_mods) {
                    Some(key) => (key, true, frame_mods),
                    None => continue,
                },
            };

            let outcome = self
                .viewer
                .handle(keymap::translate(key, pressed, modifiers));
            if let Some(record) = &outcome.record {
                self.bus.publish_key(record);
            }
            if outcome.quit {
                quit = true;
                break;
            }
        }
        quit
    }

    fn help_window(&mut self, ctx: &egui::Context) {
        let mut close = false;
        egui::Window::new("Instructions.")
            .collapsible(false)
            .resizable(false)
            .default_size([300.0, 200.0])
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                for line in HELP_TEXT {
                    ui.label(RichText::new(line).size(16.0));
                    ui.add_space(8.0);
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        if close {
            self.viewer.hide_help();
        }
    }
}

fn key_row(ui: &mut egui::Ui, name: &str, code: u32) -> egui::Response {
    egui::Frame::none()
        .fill(ROW_BG)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(|ui| {
                ui.add(egui::Label::new(RichText::new(name).color(NAME_COLOR)).selectable(true));
                ui.label(":");
                ui.add(
                    egui::Label::new(RichText::new(code.to_string()).color(CODE_COLOR))
                        .selectable(true),
                );
            });
        })
        .response
}

impl eframe::App for KeyCodeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (events, frame_mods) = ctx.input(|i| (i.events.clone(), i.modifiers));
        let quit = self.consume_keys(&events, frame_mods);

        if !self.closing && (quit || self.shutdown.is_requested()) {
            info!(by_escape = quit, "closing window viewer");
            self.closing = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for def in &self.definitions {
                        key_row(ui, def.name, def.code);
                    }
                    if !self.definitions.is_empty() {
                        ui.separator();
                    }
                    for record in self.viewer.log().iter() {
                        key_row(ui, &record.label, record.code)
                            .on_hover_text(format!("Key pressed: {} ({})", record.label, record.code));
                    }
                });
        });

        if self.viewer.help_visible() {
            self.help_window(ctx);
        }

        ctx.request_repaint_after(SHUTDOWN_POLL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: egui::Key, pressed: bool) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn app() -> (KeyCodeApp, EventBus) {
        let bus = EventBus::new(64);
        let app = KeyCodeApp::new(&Config::default(), bus.clone(), ShutdownSignal::new());
        (app, bus)
    }

    #[test]
    fn definitions_are_listed_by_default() {
        let (app, _bus) = app();
        assert!(!app.definitions.is_empty());
    }

    #[test]
    fn key_presses_are_recorded_and_published() {
        let (mut app, bus) = app();
        let mut rx = bus.subscribe();

        let quit = app.consume_keys(
            &[key(egui::Key::A, true), key(egui::Key::A, false)],
            egui::Modifiers::NONE,
        );

        assert!(!quit);
        assert_eq!(app.viewer.log().len(), 1);
        assert!(matches!(
            rx.try_recv(),
            Ok(keycodes_shared_types::AppEvent::Key(record)) if record.label == "A"
        ));
    }

    #[test]
    fn double_escape_quits() {
        let (mut app, _bus) = app();
        assert!(!app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));
        assert!(app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));
    }

    #[test]
    fn clipboard_shortcut_breaks_escape_sequence() {
        let (mut app, bus) = app();
        let mut rx = bus.subscribe();

        assert!(!app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));
        assert!(!app.consume_keys(&[egui::Event::Copy], egui::Modifiers::CTRL));
        assert!(!app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));

        let labels: Vec<_> = app.viewer.log().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["<Esc>", "Ctrl+C", "<Esc>"]);
        assert!(matches!(rx.try_recv(), Ok(keycodes_shared_types::AppEvent::Key(_))));
        assert!(matches!(
            rx.try_recv(),
            Ok(keycodes_shared_types::AppEvent::Key(record)) if record.code == egui::Key::C as u32
        ));
    }

    #[test]
    fn cut_and_paste_are_recorded_as_keys() {
        let (mut app, _bus) = app();
        app.consume_keys(
            &[egui::Event::Cut, egui::Event::Paste("text".to_string())],
            egui::Modifiers::CTRL,
        );
        let labels: Vec<_> = app.viewer.log().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["Ctrl+X", "Ctrl+V"]);
    }

    #[test]
    fn modifier_only_frames_record_nothing() {
        let (mut app, _bus) = app();
        assert!(!app.consume_keys(&[], egui::Modifiers::SHIFT));
        assert!(app.viewer.log().is_empty());
    }

    #[test]
    fn app_id_is_fixed_and_title_comes_from_config() {
        let mut config = Config::default();
        config.window.title = "Custom title".to_string();
        let options = native_options(&config);
        assert_eq!(options.viewport.title.as_deref(), Some("Custom title"));
        assert_eq!(APP_ID, "keycodes");
    }

    #[test]
    fn escape_from_help_needs_three_presses() {
        let (mut app, _bus) = app();
        app.consume_keys(&[key(egui::Key::F1, true)], egui::Modifiers::NONE);
        assert!(app.viewer.help_visible());

        assert!(!app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));
        assert!(!app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));
        assert!(app.consume_keys(&[key(egui::Key::Escape, true)], egui::Modifiers::NONE));
    }
}

//! Frame-loop viewer on the terminal's alternate screen.

use std::{
    io::{self, Stdout},
    time::Duration,
};

use anyhow::Context;
use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use keycodes_core::{EventBus, KeyViewer, ShutdownSignal, viewer::HELP_TEXT};
use keycodes_shared_types::Config;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};
use tracing::{debug, info, warn};

pub mod keymap;

const BG: Color = Color::Rgb(30, 30, 30);
const FG: Color = Color::Rgb(200, 200, 200);

/// Owns raw mode and the alternate screen; restores both on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    raw: bool,
    alternate: bool,
    enhanced: bool,
}

impl TerminalSession {
    fn enter(request_enhancement: bool) -> anyhow::Result<Self> {
        let terminal =
            Terminal::new(CrosstermBackend::new(io::stdout())).context("create terminal")?;
        let mut session = Self {
            terminal,
            raw: false,
            alternate: false,
            enhanced: false,
        };

        enable_raw_mode().context("enable raw mode")?;
        session.raw = true;

        execute!(session.terminal.backend_mut(), EnterAlternateScreen)
            .context("enter alternate screen")?;
        session.alternate = true;

        if request_enhancement {
            match supports_keyboard_enhancement() {
                Ok(true) => {
                    execute!(
                        session.terminal.backend_mut(),
                        PushKeyboardEnhancementFlags(
                            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                                | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                        )
                    )
                    .context("push keyboard enhancement flags")?;
                    session.enhanced = true;
                }
                Ok(false) => info!("terminal does not report key releases or modifier presses"),
                Err(err) => warn!(error = %err, "keyboard enhancement query failed"),
            }
        }

        session.terminal.hide_cursor().context("hide cursor")?;
        session.terminal.clear().context("clear terminal")?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }
        if self.alternate {
            let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        }
        if self.raw {
            let _ = disable_raw_mode();
        }
        let _ = self.terminal.show_cursor();
    }
}

pub fn run(config: &Config, bus: &EventBus, shutdown: &ShutdownSignal) -> anyhow::Result<()> {
    let mut viewer = KeyViewer::new(
        config.terminal.max_events,
        config.viewer.escape_presses_to_quit,
        config.viewer.show_key_up,
    );
    let tick = Duration::from_millis(config.terminal.tick_ms.max(1));
    let mut session = TerminalSession::enter(config.terminal.keyboard_enhancement)?;
    let enhanced = session.enhanced;

    loop {
        if shutdown.is_requested() {
            info!("shutdown requested, leaving terminal viewer");
            break;
        }

        session
            .terminal
            .draw(|frame| render(frame, &viewer, enhanced))
            .context("draw frame")?;

        if !event::poll(tick).context("poll terminal events")? {
            continue;
        }

        match event::read().context("read terminal event")? {
            Event::Key(key) => {
                let Some(ev) = keymap::translate(key) else {
                    debug!(?key, "key has no code in this table");
                    continue;
                };

                let outcome = viewer.handle(ev);
                if let Some(record) = &outcome.record {
                    bus.publish_key(record);
                }
                if outcome.quit {
                    info!("escape pressed twice, leaving terminal viewer");
                    break;
                }
            }
            Event::Resize(width, height) => debug!(width, height, "terminal resized"),
            _ => {}
        }
    }

    Ok(())
}

fn render(frame: &mut Frame<'_>, viewer: &KeyViewer, enhanced: bool) {
    let area = frame.area();
    let base = Style::new().fg(FG).bg(BG);
    frame.render_widget(Block::new().style(base), area);

    let [header, body] = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let mode = if enhanced {
        "key up/down reported"
    } else {
        "key down only"
    };
    let title = Line::from(vec![
        Span::styled(" Terminal Key Code Viewer ", base.add_modifier(Modifier::BOLD)),
        Span::styled("<Esc> twice to quit, F1 for help ", base),
        Span::styled(format!("({mode})"), base.fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(title).style(base), header);

    let block = Block::bordered()
        .title(format!(" {}/{} ", viewer.log().len(), viewer.log().capacity()))
        .style(base);
    let visible = usize::from(block.inner(body).height);
    let skip = viewer.log().len().saturating_sub(visible);
    let lines: Vec<Line<'_>> = viewer
        .log()
        .iter()
        .skip(skip)
        .map(|record| Line::raw(record.to_string()))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), body);

    if viewer.help_visible() {
        render_help(frame, area, base);
    }
}

fn render_help(frame: &mut Frame<'_>, area: Rect, style: Style) {
    let width = HELP_TEXT.iter().map(|line| line.len()).max().unwrap_or(0) as u16 + 4;
    let height = HELP_TEXT.len() as u16 * 2 + 1;
    let popup = centered(area, width, height);

    let mut lines = Vec::with_capacity(HELP_TEXT.len() * 2);
    for text in HELP_TEXT {
        lines.push(Line::raw(text));
        lines.push(Line::raw(""));
    }

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(Block::bordered().title(" Instructions. ").style(style)),
        popup,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

use crate::breathing::{PhaseTimer, PollableState, ScheduleHandle};
use crate::color::Rgba;
use crate::config::Settings;
use crate::render::{Canvas, Painter, ShapeGeometry, compute_fill};
use crate::ui::settings::{PanelAction, SettingsPanel};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const LABEL_COLOR: Rgba = Rgba::opaque(0.85, 0.85, 0.85);

/// Options that affect the app but aren't user preferences.
#[derive(Clone, Debug)]
pub(crate) struct AppOptions {
    /// Where preferences are saved to, if anywhere.
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) frame_interval: Duration,
    pub(crate) show_phase: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The breathing guide: owns the settings, the phase timer and the screen.
pub(crate) struct App<W: Write> {
    settings: Settings,
    options: AppOptions,
    timer: PhaseTimer,
    schedule: Option<ScheduleHandle>,
    canvas: Canvas,
    painter: Painter<W>,
    panel: Option<SettingsPanel>,
    dirty: bool,
}

impl<W: Write> App<W> {
    pub(crate) fn new(settings: Settings, options: AppOptions, output: W, (columns, rows): (u16, u16)) -> Self {
        let painter = Painter::new(output, columns, rows);
        let (width, height) = painter.canvas_size();
        Self {
            settings,
            options,
            timer: PhaseTimer::new(),
            schedule: None,
            canvas: Canvas::new(width, height),
            painter,
            panel: None,
            dirty: true,
        }
    }

    /// Run until the user quits.
    pub(crate) fn run(&mut self) -> anyhow::Result<()> {
        self.start_cycle(Instant::now());
        loop {
            let now = Instant::now();
            self.tick(now)?;
            if event::poll(self.options.frame_interval)? && self.handle_event(event::read()?, Instant::now()) == Flow::Quit {
                log::info!("quitting after {} cycles", self.timer.cycle_count());
                self.stop_cycle();
                return Ok(());
            }
        }
    }

    fn start_cycle(&mut self, now: Instant) {
        self.schedule = Some(self.timer.start(now, &self.settings));
        self.dirty = true;
    }

    fn stop_cycle(&mut self) {
        if let Some(handle) = self.schedule.take() {
            self.timer.cancel(handle);
        }
    }

    /// Advance the timer and repaint if anything changed.
    fn tick(&mut self, now: Instant) -> io::Result<()> {
        let state = self.timer.poll(now, &self.settings);
        for entry in self.timer.take_entries() {
            log::debug!(
                "phase {:?} towards {} for {:.2}s in cycle {}",
                entry.phase,
                entry.target_progress,
                entry.duration.as_secs_f64(),
                entry.cycle
            );
        }
        // The countdown label changes every second even while holding.
        if state != PollableState::Unmodified || self.dirty || self.options.show_phase {
            self.render(now)?;
            self.dirty = false;
        }
        Ok(())
    }

    fn render(&mut self, now: Instant) -> io::Result<()> {
        let phase = self.timer.phase();
        let progress = self.timer.progress(now);
        let geometry = ShapeGeometry::new(self.settings.shape, progress, &self.canvas.viewport());
        let fill = compute_fill(phase, progress, &self.settings, geometry.radius());
        self.canvas.paint(&geometry, &fill, &self.settings.background_color);
        self.painter.draw_canvas(&self.canvas)?;

        if self.options.show_phase {
            let remaining = self.timer.remaining(now).unwrap_or_default().as_secs_f64().ceil();
            let label = format!(" {phase} {remaining:.0} ");
            let (columns, rows) = self.painter.dimensions();
            let column = columns.saturating_sub(label.len() as u16) / 2;
            self.painter.draw_text(column, rows.saturating_sub(1), &label, LABEL_COLOR, self.settings.background_color)?;
        }
        if let Some(panel) = &self.panel {
            panel.draw(&mut self.painter, &self.settings)?;
        }
        self.painter.flush()
    }

    fn handle_event(&mut self, event: Event, now: Instant) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, now),
            Event::Resize(columns, rows) => {
                log::debug!("terminal resized to {columns}x{rows}");
                self.painter.resize(columns, rows);
                let (width, height) = self.painter.canvas_size();
                self.canvas.resize(width, height);
                self.dirty = true;
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }
        if let Some(panel) = &mut self.panel {
            let action = panel.handle_key(key, &mut self.settings);
            let field = panel.selected_field();
            match action {
                PanelAction::None => return Flow::Continue,
                PanelAction::Redraw => (),
                PanelAction::Changed => log::debug!("settings field {field:?} changed"),
                PanelAction::Save => self.save_settings(),
                PanelAction::Close => self.close_settings(),
            }
            self.dirty = true;
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Flow::Quit,
            KeyCode::Char('s') | KeyCode::Char(',') => {
                self.panel = Some(SettingsPanel::default());
                self.dirty = true;
                Flow::Continue
            }
            KeyCode::Char('r') => {
                log::info!("restarting breathing cycle");
                self.start_cycle(now);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn close_settings(&mut self) {
        self.panel = None;
        // Cells the panel covered may not change in the canvas, force them out.
        self.painter.invalidate();
    }

    fn save_settings(&mut self) {
        let status = match &self.options.config_path {
            Some(path) => match self.settings.save(path) {
                Ok(()) => format!("saved to {}", path.display()),
                Err(e) => {
                    log::warn!("failed to save settings: {e}");
                    format!("save failed: {e}")
                }
            },
            None => "no config location available".to_string(),
        };
        if let Some(panel) = &mut self.panel {
            panel.set_status(status);
        }
    }
}

/// Puts the terminal in raw mode on the alternate screen and restores it when dropped.
pub(crate) struct TerminalGuard;

impl TerminalGuard {
    pub(crate) fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }

    /// Restore the terminal, even if the app panicked.
    pub(crate) fn restore() {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        Self::restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breathing::BreathingPhase;
    use crate::config::AnimationShape;

    fn app(config_path: Option<PathBuf>) -> App<Vec<u8>> {
        let options = AppOptions { config_path, frame_interval: Duration::from_millis(16), show_phase: true };
        App::new(Settings::default(), options, Vec::new(), (40, 12))
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn quit_keys() {
        let mut app = app(None);
        let now = Instant::now();
        assert_eq!(app.handle_event(press(KeyCode::Char('q')), now), Flow::Quit);
        assert_eq!(app.handle_event(press(KeyCode::Esc), now), Flow::Quit);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.handle_event(ctrl_c, now), Flow::Quit);
    }

    #[test]
    fn restart_resets_cycle() {
        let mut app = app(None);
        let start = Instant::now();
        app.start_cycle(start);
        app.tick(start + Duration::from_secs(16)).expect("tick failed");
        assert_eq!(app.timer.cycle_count(), 1);

        let restart = start + Duration::from_secs(17);
        assert_eq!(app.handle_event(press(KeyCode::Char('r')), restart), Flow::Continue);
        assert_eq!(app.timer.cycle_count(), 0);
        assert_eq!(app.timer.phase(), BreathingPhase::Inhale);
        assert_eq!(app.timer.progress(restart), 0.0);
    }

    #[test]
    fn stopping_cancels_pending_transition() {
        let mut app = app(None);
        let start = Instant::now();
        app.start_cycle(start);
        app.stop_cycle();
        assert_eq!(app.timer.remaining(start), None);
        app.tick(start + Duration::from_secs(30)).expect("tick failed");
        assert_eq!(app.timer.phase(), BreathingPhase::Inhale);
    }

    #[test]
    fn settings_panel_edits_live_settings() {
        let mut app = app(None);
        let now = Instant::now();
        app.start_cycle(now);
        app.handle_event(press(KeyCode::Char('s')), now);
        assert!(app.panel.is_some());

        for _ in 0..9 {
            app.handle_event(press(KeyCode::Down), now);
        }
        app.handle_event(press(KeyCode::Right), now);
        assert_eq!(app.settings.shape, AnimationShape::Circle);
        app.tick(now).expect("tick failed");

        // Escape closes the panel rather than quitting.
        assert_eq!(app.handle_event(press(KeyCode::Esc), now), Flow::Continue);
        assert!(app.panel.is_none());
    }

    #[test]
    fn unbound_panel_key_skips_repaint() {
        let mut app = app(None);
        let now = Instant::now();
        app.handle_event(press(KeyCode::Char('s')), now);
        app.tick(now).expect("tick failed");
        assert!(!app.dirty);

        assert_eq!(app.handle_event(press(KeyCode::Char('x')), now), Flow::Continue);
        assert!(!app.dirty);
        assert_eq!(app.settings, Settings::default());

        app.handle_event(press(KeyCode::Down), now);
        assert!(app.dirty);
    }

    #[test]
    fn saving_writes_config() {
        let dir = tempfile::tempdir().expect("no tempdir");
        let path = dir.path().join("config.yaml");
        let mut app = app(Some(path.clone()));
        let now = Instant::now();
        app.handle_event(press(KeyCode::Char(',')), now);
        app.handle_event(press(KeyCode::Right), now);
        app.handle_event(press(KeyCode::Char('w')), now);

        let saved = Settings::load(&path).expect("load failed");
        assert_eq!(saved.inhale_duration, Settings::default().inhale_duration + 0.5);
    }

    #[test]
    fn resize_follows_terminal() {
        let mut app = app(None);
        app.handle_event(Event::Resize(100, 30), Instant::now());
        assert_eq!((app.canvas.width(), app.canvas.height()), (100, 60));
        assert!(app.dirty);
    }
}

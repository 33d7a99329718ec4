use crate::color::{Rgba, palette_step};
use crate::config::{AnimationMode, AnimationShape, ColorFillType, MAX_DRIFT, MAX_DURATION, MIN_DRIFT, Settings};
use crate::render::Painter;
use crossterm::event::{KeyCode, KeyEvent};
use std::io::{self, Write};
use strum::{EnumIter, IntoEnumIterator};
use unicode_width::UnicodeWidthStr;

const DURATION_STEP: f64 = 0.5;
const DRIFT_STEP: f64 = 0.01;

const PANEL_FOREGROUND: Rgba = Rgba::opaque(0.9, 0.9, 0.9);
const PANEL_BACKGROUND: Rgba = Rgba::opaque(0.12, 0.12, 0.14);
const SELECTED_BACKGROUND: Rgba = Rgba::opaque(0.25, 0.25, 0.32);

/// A single editable preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub(crate) enum SettingsField {
    InhaleDuration,
    PostInhaleHoldDuration,
    ExhaleDuration,
    PostExhaleHoldDuration,
    InhaleColor,
    ExhaleColor,
    BackgroundColor,
    ColorFillType,
    ColorTransition,
    Shape,
    AnimationMode,
    Drift,
}

impl SettingsField {
    fn label(self) -> &'static str {
        match self {
            Self::InhaleDuration => "Inhale",
            Self::PostInhaleHoldDuration => "Hold after inhale",
            Self::ExhaleDuration => "Exhale",
            Self::PostExhaleHoldDuration => "Hold after exhale",
            Self::InhaleColor => "Inhale color",
            Self::ExhaleColor => "Exhale color",
            Self::BackgroundColor => "Background color",
            Self::ColorFillType => "Fill",
            Self::ColorTransition => "Color transition",
            Self::Shape => "Shape",
            Self::AnimationMode => "Animation",
            Self::Drift => "Drift",
        }
    }

    fn value(self, settings: &Settings) -> String {
        match self {
            Self::InhaleDuration => format!("{:.1}s", settings.inhale_duration),
            Self::PostInhaleHoldDuration => format!("{:.1}s", settings.post_inhale_hold_duration),
            Self::ExhaleDuration => format!("{:.1}s", settings.exhale_duration),
            Self::PostExhaleHoldDuration => format!("{:.1}s", settings.post_exhale_hold_duration),
            Self::InhaleColor => settings.inhale_color.to_string(),
            Self::ExhaleColor => settings.exhale_color.to_string(),
            Self::BackgroundColor => settings.background_color.to_string(),
            Self::ColorFillType => settings.color_fill_type.to_string(),
            Self::ColorTransition => if settings.color_transition_enabled { "on" } else { "off" }.to_string(),
            Self::Shape => settings.shape.to_string(),
            Self::AnimationMode => settings.animation_mode.to_string(),
            Self::Drift => format!("{:.2}", settings.drift),
        }
    }

    /// Step this field's value up or down, keeping it within its valid range.
    pub(crate) fn adjust(self, settings: &mut Settings, forward: bool) {
        match self {
            Self::InhaleDuration => step_duration(&mut settings.inhale_duration, forward),
            Self::PostInhaleHoldDuration => step_duration(&mut settings.post_inhale_hold_duration, forward),
            Self::ExhaleDuration => step_duration(&mut settings.exhale_duration, forward),
            Self::PostExhaleHoldDuration => step_duration(&mut settings.post_exhale_hold_duration, forward),
            Self::InhaleColor => settings.inhale_color = palette_step(&settings.inhale_color, forward),
            Self::ExhaleColor => settings.exhale_color = palette_step(&settings.exhale_color, forward),
            Self::BackgroundColor => settings.background_color = palette_step(&settings.background_color, forward),
            Self::ColorFillType => settings.color_fill_type = cycle::<ColorFillType>(settings.color_fill_type, forward),
            Self::ColorTransition => settings.color_transition_enabled = !settings.color_transition_enabled,
            Self::Shape => settings.shape = cycle::<AnimationShape>(settings.shape, forward),
            Self::AnimationMode => settings.animation_mode = cycle::<AnimationMode>(settings.animation_mode, forward),
            Self::Drift => {
                let delta = if forward { DRIFT_STEP } else { -DRIFT_STEP };
                let stepped = ((settings.drift + delta) * 100.0).round() / 100.0;
                settings.drift = bounded(settings.drift, stepped, forward, MIN_DRIFT, MAX_DRIFT);
            }
        }
    }
}

fn step_duration(value: &mut f64, forward: bool) {
    let delta = if forward { DURATION_STEP } else { -DURATION_STEP };
    // Snap to the step grid so hand edited values line up again.
    let stepped = ((*value + delta) / DURATION_STEP).round() * DURATION_STEP;
    *value = bounded(*value, stepped, forward, 0.0, MAX_DURATION);
}

/// Keep a stepped value within `[min, max]` without ever moving it against the step.
///
/// A value that already sits outside the range isn't pulled back in, only kept from going further out.
fn bounded(current: f64, stepped: f64, forward: bool, min: f64, max: f64) -> f64 {
    if forward { stepped.min(max.max(current)) } else { stepped.max(min.min(current)) }
}

fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T, forward: bool) -> T {
    let variants: Vec<T> = T::iter().collect();
    let position = variants.iter().position(|v| *v == current).unwrap_or(0);
    let index = if forward { (position + 1) % variants.len() } else { (position + variants.len() - 1) % variants.len() };
    variants[index]
}

/// What the app should do after the panel handled a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PanelAction {
    /// The key isn't bound in the panel.
    None,

    /// The selection moved, only the panel needs repainting.
    Redraw,

    /// The selected field's value was edited.
    Changed,
    Save,
    Close,
}

/// The preferences overlay.
#[derive(Debug, Default)]
pub(crate) struct SettingsPanel {
    selected: usize,
    status: Option<String>,
}

impl SettingsPanel {
    pub(crate) fn selected_field(&self) -> SettingsField {
        SettingsField::iter().nth(self.selected).unwrap_or(SettingsField::InhaleDuration)
    }

    /// Show a one line message at the bottom of the panel.
    pub(crate) fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = Some(status.into());
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent, settings: &mut Settings) -> PanelAction {
        let fields = SettingsField::iter().count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = (self.selected + fields - 1) % fields;
                PanelAction::Redraw
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1) % fields;
                PanelAction::Redraw
            }
            KeyCode::Left | KeyCode::Char('h') => self.adjust(settings, false),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => self.adjust(settings, true),
            KeyCode::Char('w') => PanelAction::Save,
            KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char(',') => PanelAction::Close,
            _ => PanelAction::None,
        }
    }

    fn adjust(&mut self, settings: &mut Settings, forward: bool) -> PanelAction {
        self.selected_field().adjust(settings, forward);
        self.status = None;
        PanelAction::Changed
    }

    /// Draw the panel centered on the screen.
    pub(crate) fn draw<W: Write>(&self, painter: &mut Painter<W>, settings: &Settings) -> io::Result<()> {
        let mut lines: Vec<(String, bool)> = vec![(" Preferences".to_string(), false), (String::new(), false)];
        for (index, field) in SettingsField::iter().enumerate() {
            let line = format!(" {:<18} {:>10} ", field.label(), field.value(settings));
            lines.push((line, index == self.selected));
        }
        lines.push((String::new(), false));
        lines.push((" ↑↓ select  ←→ change  w save  esc close".to_string(), false));
        if let Some(status) = &self.status {
            lines.push((format!(" {status}"), false));
        }

        let width = lines.iter().map(|(line, _)| line.width()).max().unwrap_or(0) as u16 + 1;
        let height = lines.len() as u16;
        let (columns, rows) = painter.dimensions();
        let left = columns.saturating_sub(width) / 2;
        let top = rows.saturating_sub(height) / 2;
        for (offset, (line, selected)) in lines.iter().enumerate() {
            let background = if *selected { SELECTED_BACKGROUND } else { PANEL_BACKGROUND };
            let padded = format!("{line:<width$}", width = width as usize);
            painter.draw_text(left, top + offset as u16, &padded, PANEL_FOREGROUND, background)?;
        }
        Ok(())
    }
}

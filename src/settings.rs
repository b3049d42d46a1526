use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::icon::IconRecord;
use crate::render::MarkType;

/// What a click does to the application behind a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickAction {
    Nothing,
    Iconify,
    Lower,
    Close,
}

impl std::str::FromStr for ClickAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nothing" => Ok(ClickAction::Nothing),
            "iconify" => Ok(ClickAction::Iconify),
            "lower" => Ok(ClickAction::Lower),
            "close" => Ok(ClickAction::Close),
            _ => Err(format!("unknown click action '{s}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DockSettings {
    /// Outer width of a dock slot in pixels.
    #[serde(default = "default_slot_size")]
    pub slot_width: usize,
    /// Outer height of a dock slot in pixels.
    #[serde(default = "default_slot_size")]
    pub slot_height: usize,
    /// Stencil drawn over tiles whose application is running.
    #[serde(default)]
    pub mark: MarkType,
    /// Left margin of the mark, negative counts from the right edge.
    /// Falls back to a per-mark default when missing.
    #[serde(default)]
    pub mark_left: Option<i32>,
    /// Top margin of the mark, negative counts from the bottom edge.
    #[serde(default)]
    pub mark_top: Option<i32>,
    /// Performed on left click when the tile's application already has focus.
    #[serde(default = "default_left_click")]
    pub left_click: ClickAction,
    #[serde(default = "default_right_click")]
    pub right_click: ClickAction,
    /// Match window titles case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub debug_logging: bool,
    /// Write log output to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Growth factor of the fade level per tick.
    #[serde(default = "default_fade_step")]
    pub fade_step: f64,
    /// Icon records, see [`crate::icon::IconRecord::parse`].
    #[serde(default)]
    pub icons: Vec<String>,
}

fn default_slot_size() -> usize {
    64
}

fn default_left_click() -> ClickAction {
    ClickAction::Nothing
}

fn default_right_click() -> ClickAction {
    ClickAction::Iconify
}

fn default_tick_interval() -> u64 {
    250
}

fn default_fade_step() -> f64 {
    1.05
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            slot_width: default_slot_size(),
            slot_height: default_slot_size(),
            mark: MarkType::default(),
            mark_left: None,
            mark_top: None,
            left_click: default_left_click(),
            right_click: default_right_click(),
            case_sensitive: false,
            debug_logging: false,
            log_file: None,
            tick_interval_ms: default_tick_interval(),
            fade_step: default_fade_step(),
            icons: Vec::new(),
        }
    }
}

impl DockSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Self = serde_json::from_str(&content)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Effective mark margins as `(left, top)`.
    pub fn mark_margins(&self) -> (i32, i32) {
        let (left, top) = self.mark.default_margins();
        (self.mark_left.unwrap_or(left), self.mark_top.unwrap_or(top))
    }

    /// Parsed icon records; malformed entries are logged and skipped.
    pub fn icon_records(&self) -> Vec<IconRecord> {
        crate::icon::parse_records(&self.icons.join("\n"))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn sanitize(&mut self) {
        if self.tick_interval_ms == 0 {
            tracing::warn!(
                "tick_interval_ms must be positive; using {}",
                default_tick_interval()
            );
            self.tick_interval_ms = default_tick_interval();
        }
        if !(self.fade_step > 1.0 && self.fade_step.is_finite()) {
            tracing::warn!(
                "fade_step {} would never finish a fade; using {}",
                self.fade_step,
                default_fade_step()
            );
            self.fade_step = default_fade_step();
        }
        if self.slot_width == 0 || self.slot_height == 0 {
            tracing::warn!("slot size must be positive; using the default");
            self.slot_width = default_slot_size();
            self.slot_height = default_slot_size();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_margins_default_per_mark_type() {
        let mut settings = DockSettings::default();
        assert_eq!(settings.mark_margins(), (-1, 0));
        settings.mark = MarkType::Corner;
        assert_eq!(settings.mark_margins(), (-1, -1));
        settings.mark_top = Some(4);
        assert_eq!(settings.mark_margins(), (-1, 4));
    }

    #[test]
    fn icon_records_skip_comments() {
        let settings = DockSettings {
            icons: vec![
                "# terminals".into(),
                "xterm.png:xterm:XTerm:fast".into(),
                "gimp.png:gimp".into(),
            ],
            ..DockSettings::default()
        };
        let records = settings.icon_records();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_exclusive());
        assert_eq!(records[1].command, "gimp");
    }

    #[test]
    fn click_actions_parse_case_insensitively() {
        assert_eq!("Lower".parse::<ClickAction>(), Ok(ClickAction::Lower));
        assert!("minimize".parse::<ClickAction>().is_err());
    }
}

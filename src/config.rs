//! Client configuration
//!
//! Loaded from a TOML file; every field has a default, so a missing file or
//! a partial one is fine.
//!
//! ```toml
//! log_filter = "discorder=debug"
//!
//! [display]
//! padding = 2
//! header_fill = "="
//!
//! [menu]
//! rank_order = "descending"
//! anchor_min = [0.1, 0.1]
//! anchor_max = [0.9, 0.9]
//!
//! [styles.menu_selected]
//! fg = "white"
//! bg = "#3050a0"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::history::EntryStyles;
use crate::ui::layout::{Anchors, LayoutError, Vec2};
use crate::ui::menu::{MenuStyles, RankOrder};
use crate::ui::render::Style;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub menu: MenuConfig,
    pub styles: StylesConfig,
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Columns left blank on each side of the message pane
    pub padding: u16,
    /// Character repeated around the header title
    pub header_fill: char,
    /// Entries kept in the message history
    pub history_limit: usize,
    /// Rows per PageUp/PageDown in the message pane; viewport minus two when unset
    pub page_step: Option<u16>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            padding: 2,
            header_fill: '=',
            history_limit: 1000,
            page_step: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub rank_order: RankOrder,
    pub anchor_min: [f32; 2],
    pub anchor_max: [f32; 2],
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            rank_order: RankOrder::Ascending,
            anchor_min: [0.1, 0.1],
            anchor_max: [0.9, 0.9],
        }
    }
}

impl MenuConfig {
    /// Popup anchors, validated
    pub fn anchors(&self) -> Result<Anchors, LayoutError> {
        Anchors::new(
            Vec2::new(self.anchor_min[0], self.anchor_min[1]),
            Vec2::new(self.anchor_max[0], self.anchor_max[1]),
        )
    }
}

/// Overrides for one style; unset fields keep the built-in value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: Option<bool>,
}

impl StyleConfig {
    pub fn apply(&self, base: Style) -> Style {
        let mut style = base;
        if let Some(fg) = self.fg.as_deref().and_then(|name| parse_color("fg", name)) {
            style.fg = Some(fg);
        }
        if let Some(bg) = self.bg.as_deref().and_then(|name| parse_color("bg", name)) {
            style.bg = Some(bg);
        }
        if let Some(bold) = self.bold {
            style.bold = bold;
        }
        style
    }
}

fn parse_color(field: &str, name: &str) -> Option<crossterm::style::Color> {
    let color = Style::parse_color(name);
    if color.is_none() {
        warn!(field, name, "unknown colour in config, keeping default");
    }
    color
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    pub menu_normal: Option<StyleConfig>,
    pub menu_marked: Option<StyleConfig>,
    pub menu_selected: Option<StyleConfig>,
    pub menu_marked_selected: Option<StyleConfig>,
    pub window: Option<StyleConfig>,
    pub search: Option<StyleConfig>,
    pub header: Option<StyleConfig>,
    pub prompt: Option<StyleConfig>,
    pub channel: Option<StyleConfig>,
    pub direct: Option<StyleConfig>,
    pub author: Option<StyleConfig>,
    pub error: Option<StyleConfig>,
    pub log: Option<StyleConfig>,
}

fn over(config: &Option<StyleConfig>, base: Style) -> Style {
    config.as_ref().map_or(base, |c| c.apply(base))
}

impl StylesConfig {
    pub fn menu(&self) -> MenuStyles {
        let base = MenuStyles::default();
        MenuStyles {
            normal: over(&self.menu_normal, base.normal),
            marked: over(&self.menu_marked, base.marked),
            selected: over(&self.menu_selected, base.selected),
            marked_selected: over(&self.menu_marked_selected, base.marked_selected),
            window: over(&self.window, base.window),
            search: over(&self.search, base.search),
        }
    }

    pub fn entries(&self) -> EntryStyles {
        let base = EntryStyles::default();
        EntryStyles {
            channel: over(&self.channel, base.channel),
            direct: over(&self.direct, base.direct),
            author: over(&self.author, base.author),
            error: over(&self.error, base.error),
            log: over(&self.log, base.log),
        }
    }

    pub fn header(&self) -> Style {
        over(&self.header, Style::new())
    }

    /// Composer prompt; bold yellow unless overridden
    pub fn prompt(&self) -> Style {
        over(
            &self.prompt,
            Style::new().fg(crossterm::style::Color::Yellow).bold(),
        )
    }
}

impl Config {
    /// Parse configuration text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("failed to parse config")?;
        config.menu.anchors().context("invalid [menu] anchors")?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if it
    /// does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("failed to load {}", path.display()))?;

        info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::style::Color;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.display.padding, 2);
        assert_eq!(config.display.header_fill, '=');
        assert_eq!(config.menu.rank_order, RankOrder::Ascending);
        assert!(config.menu.anchors().is_ok());
        assert_eq!(config.styles.menu(), MenuStyles::default());
    }

    #[test]
    fn test_partial_file() -> Result<()> {
        let config = Config::from_toml_str(
            r##"
            log_filter = "discorder=trace"

            [display]
            padding = 4
            page_step = 5

            [menu]
            rank_order = "descending"

            [styles.menu_selected]
            fg = "black"
            bg = "#102030"
            "##,
        )?;

        assert_eq!(config.log_filter.as_deref(), Some("discorder=trace"));
        assert_eq!(config.display.padding, 4);
        assert_eq!(config.display.page_step, Some(5));
        assert_eq!(config.display.history_limit, 1000);
        assert_eq!(config.menu.rank_order, RankOrder::Descending);

        let selected = config.styles.menu().selected;
        assert_eq!(selected.fg, Some(Color::Black));
        assert_eq!(selected.bg, Some(Color::Rgb { r: 0x10, g: 0x20, b: 0x30 }));
        Ok(())
    }

    #[test]
    fn test_unknown_colour_keeps_default() {
        let style = StyleConfig {
            fg: Some("not-a-colour".into()),
            bg: None,
            bold: Some(true),
        }
        .apply(Style::new().fg(Color::Green));

        assert_eq!(style.fg, Some(Color::Green));
        assert!(style.bold);
    }

    #[test]
    fn test_degenerate_anchors_rejected() {
        let err = Config::from_toml_str(
            r#"
            [menu]
            anchor_min = [0.8, 0.1]
            anchor_max = [0.2, 0.9]
            "#,
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("degenerate"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::load(dir.path().join("nope.toml"))?;
        assert_eq!(config.display.padding, 2);
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[display]\nheader_fill = \"-\"")?;

        let config = Config::load(file.path())?;
        assert_eq!(config.display.header_fill, '-');
        Ok(())
    }

    #[test]
    fn test_load_reports_parse_errors() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[display\npadding = ")?;

        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load"));
        Ok(())
    }
}

//! Display preferences stored next to the session.

use std::sync::Arc;

use tracing::warn;

use crate::storage::{KeyValueStore, StorageResult, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct Preferences {
    backend: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Stored theme, or light when nothing valid is stored
    pub fn theme(&self) -> Theme {
        match self.backend.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Ignoring unknown stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> StorageResult<()> {
        self.backend.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self) -> StorageResult<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }
}

//! UI preferences persisted next to the tasks in the key-value table.

use crate::db::kv::{kv_get, kv_set};
use crate::db::DbResult;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

pub struct Preferences<'conn> {
    conn: &'conn Connection,
    theme_key: String,
    welcomed_key: String,
}

impl<'conn> Preferences<'conn> {
    pub fn new(
        conn: &'conn Connection,
        theme_key: impl Into<String>,
        welcomed_key: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            theme_key: theme_key.into(),
            welcomed_key: welcomed_key.into(),
        }
    }

    /// Stored theme; unset or unknown values read as `Light`.
    pub fn theme(&self) -> DbResult<Theme> {
        Ok(kv_get(self.conn, &self.theme_key)?
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> DbResult<()> {
        kv_set(self.conn, &self.theme_key, theme.as_str())?;
        info!(
            "event=theme_set module=preferences status=ok theme={}",
            theme.as_str()
        );
        Ok(())
    }

    /// Switches light/dark, persists, and returns the new theme.
    pub fn toggle_theme(&self) -> DbResult<Theme> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Whether the first-run welcome was already shown.
    pub fn is_welcomed(&self) -> DbResult<bool> {
        Ok(kv_get(self.conn, &self.welcomed_key)?.as_deref() == Some("true"))
    }

    pub fn mark_welcomed(&self) -> DbResult<()> {
        kv_set(self.conn, &self.welcomed_key, "true")
    }
}

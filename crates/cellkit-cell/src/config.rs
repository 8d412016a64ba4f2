#![forbid(unsafe_code)]

//! Container configuration: the shortcut bindings the container intercepts
//! before regular key dispatch.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CELLKIT_PRIMARY_MODIFIER` | `ctrl`, `super` or `alt`: modifier for copy, cut and paste |
//! | `CELLKIT_COMPLETE_KEY` | key stroke for completion, e.g. `ctrl+space` |
//!
//! # Config file
//!
//! With the `config-file` feature, a TOML document can be loaded:
//!
//! ```toml
//! [shortcuts]
//! copy = ["super+c"]
//! complete = ["ctrl+space", "alt+enter"]
//! ```
//!
//! Missing tables and keys keep their defaults.

use cellkit_core::event::{KeyCode, KeyEvent, Modifiers};
use cellkit_core::keystroke::KeyStroke;
use tracing::warn;

/// Key strokes bound to the container-level clipboard and completion
/// actions. Each action may have several bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-file",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ShortcutConfig {
    pub copy: Vec<KeyStroke>,
    pub cut: Vec<KeyStroke>,
    pub paste: Vec<KeyStroke>,
    pub complete: Vec<KeyStroke>,
}

fn primary(c: char, modifiers: Modifiers) -> Vec<KeyStroke> {
    vec![KeyStroke::new(KeyCode::Char(c), modifiers)]
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        Self {
            copy: primary('c', Modifiers::CTRL),
            cut: primary('x', Modifiers::CTRL),
            paste: primary('v', Modifiers::CTRL),
            complete: vec![KeyStroke::new(KeyCode::Space, Modifiers::CTRL)],
        }
    }
}

/// Shortcut action matched by [`ShortcutConfig::action_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    Copy,
    Cut,
    Paste,
    Complete,
}

impl ShortcutConfig {
    /// Rebind copy, cut and paste to `modifiers` + c/x/v.
    #[must_use]
    pub fn with_primary_modifier(mut self, modifiers: Modifiers) -> Self {
        self.copy = primary('c', modifiers);
        self.cut = primary('x', modifiers);
        self.paste = primary('v', modifiers);
        self
    }

    /// The action bound to `event`, checked in the order copy, cut, paste,
    /// complete.
    #[must_use]
    pub fn action_for(&self, event: &KeyEvent) -> Option<ShortcutAction> {
        [
            (ShortcutAction::Copy, &self.copy),
            (ShortcutAction::Cut, &self.cut),
            (ShortcutAction::Paste, &self.paste),
            (ShortcutAction::Complete, &self.complete),
        ]
        .into_iter()
        .find(|(_, strokes)| strokes.iter().any(|s| s.matches(event)))
        .map(|(action, _)| action)
    }

    /// Drop duplicate bindings (a stroke keeps its first action) and
    /// restore the default for any action left without bindings.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let mut seen: Vec<KeyStroke> = Vec::new();
        for (name, strokes, fallback) in [
            ("copy", &mut self.copy, defaults.copy),
            ("cut", &mut self.cut, defaults.cut),
            ("paste", &mut self.paste, defaults.paste),
            ("complete", &mut self.complete, defaults.complete),
        ] {
            strokes.retain(|stroke| {
                if seen.contains(stroke) {
                    warn!(action = name, %stroke, "duplicate shortcut binding dropped");
                    false
                } else {
                    seen.push(*stroke);
                    true
                }
            });
            if strokes.is_empty() {
                warn!(action = name, "no shortcut bound; restoring default");
                *strokes = fallback
                    .into_iter()
                    .filter(|stroke| !seen.contains(stroke))
                    .collect();
                seen.extend(strokes.iter().copied());
            }
        }
        self
    }
}

/// Configuration of a [`crate::container::CellContainer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-file",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ContainerConfig {
    pub shortcuts: ShortcutConfig,
}

impl ContainerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_shortcuts(mut self, shortcuts: ShortcutConfig) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    #[must_use]
    pub fn with_copy(mut self, strokes: Vec<KeyStroke>) -> Self {
        self.shortcuts.copy = strokes;
        self
    }

    #[must_use]
    pub fn with_cut(mut self, strokes: Vec<KeyStroke>) -> Self {
        self.shortcuts.cut = strokes;
        self
    }

    #[must_use]
    pub fn with_paste(mut self, strokes: Vec<KeyStroke>) -> Self {
        self.shortcuts.paste = strokes;
        self
    }

    #[must_use]
    pub fn with_complete(mut self, strokes: Vec<KeyStroke>) -> Self {
        self.shortcuts.complete = strokes;
        self
    }

    /// Load config from environment variables.
    ///
    /// Unset or unparsable variables leave the default in place.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`ContainerConfig::from_env`] over an arbitrary variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("CELLKIT_PRIMARY_MODIFIER") {
            match val.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" => {
                    config.shortcuts = config.shortcuts.with_primary_modifier(Modifiers::CTRL);
                }
                "super" | "cmd" | "meta" => {
                    config.shortcuts = config.shortcuts.with_primary_modifier(Modifiers::SUPER);
                }
                "alt" | "option" => {
                    config.shortcuts = config.shortcuts.with_primary_modifier(Modifiers::ALT);
                }
                other => warn!(value = other, "ignoring CELLKIT_PRIMARY_MODIFIER"),
            }
        }

        if let Some(val) = lookup("CELLKIT_COMPLETE_KEY") {
            match val.parse::<KeyStroke>() {
                Ok(stroke) => config.shortcuts.complete = vec![stroke],
                Err(err) => warn!(value = %val, error = %err, "ignoring CELLKIT_COMPLETE_KEY"),
            }
        }

        config.validated()
    }

    #[must_use]
    pub fn validated(mut self) -> Self {
        self.shortcuts = self.shortcuts.validated();
        self
    }

    /// Parse a TOML document. The result is validated.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        Ok(config.validated())
    }
}

/// Error loading a configuration file.
#[cfg(feature = "config-file")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid container config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(text: &str) -> KeyStroke {
        text.parse().unwrap()
    }

    fn key(text: &str) -> KeyEvent {
        let s = stroke(text);
        KeyEvent::new(s.code).with_modifiers(s.modifiers)
    }

    #[test]
    fn defaults_bind_ctrl_shortcuts() {
        let shortcuts = ShortcutConfig::default();
        assert_eq!(shortcuts.action_for(&key("ctrl+c")), Some(ShortcutAction::Copy));
        assert_eq!(shortcuts.action_for(&key("ctrl+x")), Some(ShortcutAction::Cut));
        assert_eq!(shortcuts.action_for(&key("ctrl+v")), Some(ShortcutAction::Paste));
        assert_eq!(
            shortcuts.action_for(&key("ctrl+space")),
            Some(ShortcutAction::Complete)
        );
        assert_eq!(shortcuts.action_for(&key("c")), None);
    }

    #[test]
    fn env_overrides_modifier_and_complete_key() {
        let config = ContainerConfig::from_lookup(|name| match name {
            "CELLKIT_PRIMARY_MODIFIER" => Some("super".into()),
            "CELLKIT_COMPLETE_KEY" => Some("alt+enter".into()),
            _ => None,
        });
        assert_eq!(config.shortcuts.copy, vec![stroke("super+c")]);
        assert_eq!(config.shortcuts.paste, vec![stroke("super+v")]);
        assert_eq!(config.shortcuts.complete, vec![stroke("alt+enter")]);
    }

    #[test]
    fn bad_env_values_keep_defaults() {
        let config = ContainerConfig::from_lookup(|name| match name {
            "CELLKIT_PRIMARY_MODIFIER" => Some("hyper".into()),
            "CELLKIT_COMPLETE_KEY" => Some("ctrl+nonsense".into()),
            _ => None,
        });
        assert_eq!(config, ContainerConfig::default());
    }

    #[test]
    fn validation_drops_duplicates_and_restores_empties() {
        let config = ContainerConfig::new()
            .with_copy(vec![stroke("ctrl+c"), stroke("ctrl+c")])
            .with_cut(vec![stroke("ctrl+c")])
            .with_paste(Vec::new())
            .validated();
        assert_eq!(config.shortcuts.copy, vec![stroke("ctrl+c")]);
        assert_eq!(config.shortcuts.cut, vec![stroke("ctrl+x")]);
        assert_eq!(config.shortcuts.paste, vec![stroke("ctrl+v")]);
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_overrides_only_listed_actions() {
        let config = ContainerConfig::from_toml_str(
            r#"
            [shortcuts]
            copy = ["super+c"]
            "#,
        )
        .unwrap();
        assert_eq!(config.shortcuts.copy, vec![stroke("super+c")]);
        assert_eq!(config.shortcuts.complete, vec![stroke("ctrl+space")]);
        assert!(ContainerConfig::from_toml_str("shortcuts = 3").is_err());
    }
}

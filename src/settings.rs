//! Player preferences
//!
//! Persisted separately from the high score.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};

/// Which control scheme the host shell should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Arrow keys for Pluto, mouse for PJ
    #[default]
    Keyboard,
    /// On-screen joystick for Pluto, touch for PJ
    Touch,
}

impl ControlScheme {
    /// Pick a scheme from a browser user agent
    pub fn detect(user_agent: &str) -> Self {
        let mobile = ["iPhone", "iPad", "iPod", "Android"]
            .iter()
            .any(|needle| user_agent.contains(needle));
        if mobile {
            ControlScheme::Touch
        } else {
            ControlScheme::Keyboard
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// The first-run tutorial has been dismissed
    pub tutorial_seen: bool,
    /// `None` until the host has detected (or the player picked) a scheme
    pub controls: Option<ControlScheme>,
}

impl Settings {
    const STORAGE_KEY: &'static str = "vibeycat_settings";

    /// Show the tutorial on first launch only
    pub fn should_show_tutorial(&self) -> bool {
        !self.tutorial_seen
    }

    pub fn complete_tutorial(&mut self) {
        self.tutorial_seen = true;
    }

    /// Scheme to use, falling back to user-agent detection
    pub fn control_scheme(&self, user_agent: &str) -> ControlScheme {
        self.controls.unwrap_or_else(|| ControlScheme::detect(user_agent))
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }
}

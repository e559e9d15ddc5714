//! wasm32 host binding
//!
//! The page's `requestAnimationFrame` loop asks [`WebGame::wants_frame`] and
//! feeds timestamps to [`WebGame::frame`]; after each frame it reads the
//! snapshot and event list as JSON.

use wasm_bindgen::prelude::*;

use crate::driver::{Command, Driver, ManualScheduler};
use crate::persistence::{KeyValueStore, LocalStorage, MemoryStore};
use crate::settings::ControlScheme;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Vibey Cat starting...");
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    driver: Driver<ManualScheduler>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        let store: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                log::warn!("{}, progress will not be saved", e);
                Box::new(MemoryStore::new())
            }
        };

        let mut driver = Driver::with_entropy(ManualScheduler::new(), store, Tuning::load());
        driver.set_play_field(width, height);
        WebGame { driver }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.driver.set_play_field(width, height);
    }

    pub fn frame(&mut self, now: f64) {
        self.driver.on_frame(now);
    }

    /// True while the page should keep its animation loop running
    pub fn wants_frame(&self) -> bool {
        self.driver.has_pending_frame()
    }

    /// Returns true if the page should `preventDefault()` the key
    pub fn key_down(&mut self, key: &str) -> bool {
        self.driver.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.driver.key_up(key)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.driver.pointer_moved(x, y);
    }

    pub fn pointer_release(&mut self) {
        self.driver.pointer_released();
    }

    pub fn joystick(&mut self, x: f32, y: f32) {
        self.driver.joystick(x, y);
    }

    pub fn start(&mut self) {
        self.driver.command(Command::Start);
    }

    pub fn toggle_pause(&mut self) {
        self.driver.command(Command::TogglePause);
    }

    pub fn reset_round(&mut self) {
        self.driver.command(Command::ResetRound);
    }

    pub fn reset_game(&mut self, auto_start: bool) {
        self.driver.command(Command::ResetGame { auto_start });
    }

    pub fn trigger_ability(&mut self) {
        self.driver.command(Command::TriggerAbility);
    }

    pub fn primary_action(&mut self) {
        self.driver.command(Command::PrimaryAction);
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        self.driver.snapshot().to_json().map_err(to_js)
    }

    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.driver.drain_events()).map_err(to_js)
    }

    pub fn show_tutorial(&self) -> bool {
        self.driver.settings().should_show_tutorial()
    }

    pub fn complete_tutorial(&mut self) {
        self.driver.complete_tutorial();
    }

    pub fn use_touch_controls(&self, user_agent: &str) -> bool {
        self.driver.settings().control_scheme(user_agent) == ControlScheme::Touch
    }
}

//! Vibey Cat entry point
//!
//! The browser build is driven from `platform::web`; natively this runs a
//! headless scripted session and prints how it went.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok());
    log::info!("Vibey Cat (native) starting...");

    let summary = demo::run(seed);
    println!("{}", summary);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use vibey_cat::driver::{Command, Driver, ManualScheduler};
    use vibey_cat::highscores::format_time;
    use vibey_cat::persistence::MemoryStore;
    use vibey_cat::sim::{GameEvent, RoundPhase};
    use vibey_cat::{Snapshot, Tuning};

    /// 60 Hz frames
    const FRAME_MS: f64 = 16.66;
    /// Give up after ten minutes of simulated time
    const MAX_FRAMES: u32 = 36_000;
    /// Pluto changes direction this often
    const WANDER_FRAMES: u32 = 90;

    const WANDER: [&str; 4] = ["ArrowLeft", "ArrowUp", "ArrowRight", "ArrowDown"];

    /// Play one game with a simple script: PJ chases the eagle, Pluto
    /// wanders in a loop, lightning fires whenever it is ready
    pub fn run(seed: Option<u64>) -> String {
        let scheduler = ManualScheduler::new();
        let store = Box::new(MemoryStore::new());
        let tuning = Tuning::load();

        let mut driver = match seed {
            Some(seed) => Driver::new(scheduler, store, tuning, seed),
            None => Driver::with_entropy(scheduler, store, tuning),
        };
        driver.set_play_field(800.0, 600.0);

        let mut now = 0.0;
        let mut held: Option<&str> = None;
        let mut frames = 0;

        while frames < MAX_FRAMES {
            if frames % WANDER_FRAMES == 0 {
                if let Some(key) = held.take() {
                    driver.key_up(key);
                }
                let key = WANDER[(frames / WANDER_FRAMES) as usize % WANDER.len()];
                driver.key_down(key);
                held = Some(key);
            }

            let eagle = driver.state().evader.pos;
            driver.pointer_moved(eagle.x, eagle.y);
            if driver.state().lightning.ready {
                driver.command(Command::TriggerAbility);
            }

            if !driver.has_pending_frame() {
                break;
            }
            driver.on_frame(now);
            now += FRAME_MS;
            frames += 1;

            for event in driver.drain_events() {
                match event {
                    GameEvent::Capture(kind) => log::info!("Capture: {:?}", kind),
                    GameEvent::LevelUp { level } => log::info!("Level {}", level),
                    GameEvent::PowerUpCollected { kind, .. } => log::info!("Picked up {:?}", kind),
                    _ => log::debug!("{:?}", event),
                }
            }

            if driver.state().phase == RoundPhase::GameOver {
                break;
            }
        }

        summarize(&driver.snapshot(), driver.state().seed, frames)
    }

    fn summarize(snap: &Snapshot, seed: u64, frames: u32) -> String {
        let outcome = match (&snap.message, snap.phase) {
            (Some(message), RoundPhase::GameOver) => message.text.clone(),
            _ => format!("Stopped in {:?}", snap.phase),
        };
        format!(
            "{}\n  seed: {}\n  frames: {}\n  time: {}\n  level: {}\n  combo: x{}\n  high score: {}",
            outcome,
            seed,
            frames,
            format_time(snap.elapsed_ms),
            snap.level,
            snap.combo.count,
            format_time(snap.high_score_ms),
        )
    }
}

//! Shape Tap entry point
//!
//! Web: drives the game from `requestAnimationFrame` and canvas pointer events.
//! Native: runs a headless autoplay session and reports the score.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, PointerEvent};

    use glam::Vec2;
    use shape_tap::Settings;
    use shape_tap::sim::{Game, HudRole, TapOutcome};

    /// Host-side wrapper around the simulation
    struct Host {
        game: Game,
        last_hud: (String, String, String),
    }

    impl Host {
        /// Mirror score labels into the DOM HUD (only when they change)
        fn update_hud(&mut self) {
            let score = self.game.score();
            let hud = (
                score.text(HudRole::Hit),
                score.text(HudRole::Miss),
                score.text(HudRole::Accuracy),
            );
            if hud == self.last_hud {
                return;
            }

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            for (id, text) in [
                ("hud-hit", &hud.0),
                ("hud-miss", &hud.1),
                ("hud-accuracy", &hud.2),
            ] {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            }
            self.last_hud = hud;
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Shape Tap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let mut settings = Settings::load();
        settings.camera.viewport = Vec2::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );

        let seed = js_sys::Date::now() as u64;
        // Missing particle template means a broken build; nothing to recover
        let game = Game::new(settings, seed).expect("Failed to start game");
        let host = Rc::new(RefCell::new(Host {
            game,
            last_hud: Default::default(),
        }));

        setup_input_handlers(&canvas, host.clone());
        request_animation_frame(host);
        log::info!("Shape Tap running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) {
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            event.prevent_default();
            let mut h = host.borrow_mut();
            h.game.resize(
                canvas_clone.client_width() as f32,
                canvas_clone.client_height() as f32,
            );
            let point = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
            if let TapOutcome::Hit { kind, .. } = h.game.tap(point) {
                log::debug!("tapped {}", kind.as_str());
            }
            h.update_hud();
        });
        let _ = canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(host, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = host.borrow_mut();
            // rAF time is in milliseconds
            h.game.frame(time / 1000.0);
            h.update_hud();
        }
        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shape Tap (native) starting...");

    if let Err(e) = autoplay::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use std::time::{SystemTime, UNIX_EPOCH};

    use glam::Vec2;
    use shape_tap::sim::{Game, HudRole, TapOutcome};
    use shape_tap::{GameError, Settings};

    /// Simulated host frame rate
    const FPS: f64 = 60.0;
    /// Session length (seconds)
    const SESSION_SECS: f64 = 60.0;
    /// Frames between autoplayer taps
    const REACTION_FRAMES: u32 = 24;

    pub fn run() -> Result<(), GameError> {
        let settings = match std::env::args().nth(1) {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::default(),
        };
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut game = Game::new(settings, seed)?;
        let frames = (SESSION_SECS * FPS) as u32;

        for frame in 1..=frames {
            game.frame(frame as f64 / FPS);
            if frame % REACTION_FRAMES == 0 {
                if let Some(point) = lowest_falling_shape(&game) {
                    if let TapOutcome::Hit { kind, .. } = game.tap(point) {
                        log::debug!("autoplay hit a {}", kind.as_str());
                    }
                }
            }
        }

        let score = game.score();
        log::info!(
            "Session over (seed {}): spawned {}, live {}",
            game.seed(),
            score.spawned(),
            score.live()
        );
        println!(
            "{}  {}  {}",
            score.text(HudRole::Hit),
            score.text(HudRole::Miss),
            score.text(HudRole::Accuracy)
        );
        Ok(())
    }

    /// Screen point of the on-screen shape closest to the bottom that's already falling
    fn lowest_falling_shape(game: &Game) -> Option<Vec2> {
        let viewport = game.camera().viewport;
        game.scene()
            .entities()
            .filter(|(_, entity)| entity.body.velocity.y < 0.0)
            .filter_map(|(node, _)| {
                let p = game.camera().project(node.presentation.position)?;
                let on_screen = p.x >= 0.0 && p.y >= 0.0 && p.x <= viewport.x && p.y <= viewport.y;
                on_screen.then_some((node.presentation.position.y, p))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }
}

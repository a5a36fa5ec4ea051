//! Festive Pang entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    use festive_pang::audio::AudioManager;
    use festive_pang::consts::*;
    use festive_pang::sim::{
        tick, Character, GamePhase, GameState, Harpoon, Target, TickInput, VisualKind,
    };
    use festive_pang::{ui, HighScore, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        ctx: CanvasRenderingContext2d,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        highscore: HighScore,
        settings: Settings,
        audio: AudioManager,
    }

    impl Game {
        fn new(seed: u64, ctx: CanvasRenderingContext2d) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            audio.set_muted(settings.muted);

            Self {
                state: GameState::new(seed, settings.variant),
                ctx,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                highscore: HighScore::load(),
                settings,
                audio,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= FRAME_DT && substeps < MAX_STEPS_PER_FRAME {
                let input = self.input;
                tick(&mut self.state, &input);
                self.accumulator -= FRAME_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.select = None;
                self.input.retry = false;
                self.input.change_character = false;

                for event in self.state.events.clone() {
                    self.audio.play(event);
                }

                // Persist immediately on every record, not just at session
                // end, so closing the tab mid-run never loses a best score
                if self.highscore.observe(self.state.score) {
                    log::info!("New high score: {}", self.highscore.best);
                }
            }
        }

        fn render(&self) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("#0b1020");
            ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);

            match self.state.phase {
                GamePhase::SelectingCharacter => self.render_select(),
                GamePhase::Playing => self.render_playing(),
                GamePhase::GameOver => {
                    self.render_playing();
                    self.render_overlay("GAME OVER");
                }
                GamePhase::Win => {
                    self.render_playing();
                    self.render_overlay("YOU WIN!");
                }
            }
        }

        fn render_select(&self) {
            let ctx = &self.ctx;
            let cx = (CANVAS_WIDTH / 2.0) as f64;

            ctx.set_fill_style_str("#ffd700");
            ctx.set_font("bold 36px monospace");
            ctx.set_text_align("center");
            ctx.fill_text("FESTIVE PANG", cx, 90.0).ok();

            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("20px monospace");
            ctx.fill_text("Pick a character (1-6)", cx, 140.0).ok();

            for (i, character) in Character::ALL.iter().enumerate() {
                let y = ui::roster_row_y(i) as f64;
                let label = format!("{}. {}", i + 1, character.name());
                ctx.fill_text(&label, cx, y).ok();
            }

            ctx.set_fill_style_str("#9aa4b2");
            ctx.set_font("16px monospace");
            ctx.fill_text(
                &format!(
                    "Mode: {:?} (V to switch)   M: mute {}",
                    self.settings.variant,
                    if self.settings.muted { "on" } else { "off" },
                ),
                cx,
                CANVAS_HEIGHT as f64 - 60.0,
            )
            .ok();
            ctx.fill_text(
                &format!("High score: {}", self.highscore.best),
                cx,
                CANVAS_HEIGHT as f64 - 30.0,
            )
            .ok();
        }

        fn render_playing(&self) {
            let ctx = &self.ctx;

            // Walls and ground
            ctx.set_fill_style_str("#3d4a5c");
            ctx.fill_rect(0.0, 0.0, WALL_THICKNESS as f64, CANVAS_HEIGHT as f64);
            ctx.fill_rect(
                (CANVAS_WIDTH - WALL_THICKNESS) as f64,
                0.0,
                WALL_THICKNESS as f64,
                CANVAS_HEIGHT as f64,
            );
            ctx.fill_rect(
                0.0,
                GROUND_Y as f64,
                CANVAS_WIDTH as f64,
                (CANVAS_HEIGHT - GROUND_Y) as f64,
            );

            for harpoon in &self.state.harpoons {
                self.render_harpoon(harpoon);
            }

            // Player
            let px = self.state.player_x as f64;
            ctx.set_fill_style_str("#e74c3c");
            ctx.fill_rect(
                px - (PLAYER_WIDTH / 2.0) as f64,
                (GROUND_Y - PLAYER_HEIGHT) as f64,
                PLAYER_WIDTH as f64,
                PLAYER_HEIGHT as f64,
            );

            for target in &self.state.targets {
                self.render_target(target);
            }

            self.render_hud();
        }

        fn render_harpoon(&self, harpoon: &Harpoon) {
            let ctx = &self.ctx;
            let x = harpoon.x as f64;
            let y = harpoon.y as f64;

            // Chain from the ground to the tip, arrow head on top
            ctx.set_stroke_style_str("#ffd700");
            ctx.set_line_width(3.0);
            ctx.begin_path();
            ctx.move_to(x, GROUND_Y as f64);
            ctx.line_to(x, y);
            ctx.stroke();

            ctx.set_fill_style_str("#ffd700");
            ctx.begin_path();
            ctx.move_to(x, y - 10.0);
            ctx.line_to(x - 6.0, y + 4.0);
            ctx.line_to(x + 6.0, y + 4.0);
            ctx.close_path();
            ctx.fill();
        }

        fn render_target(&self, target: &Target) {
            let ctx = &self.ctx;
            let r = target.radius() as f64;

            ctx.set_fill_style_str(kind_color(target.kind));
            ctx.begin_path();
            ctx.arc(
                target.pos.x as f64,
                target.pos.y as f64,
                r,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
            ctx.fill();

            // Highlight
            ctx.set_fill_style_str("rgba(255,255,255,0.3)");
            ctx.begin_path();
            ctx.arc(
                target.pos.x as f64 - r * 0.3,
                target.pos.y as f64 - r * 0.3,
                r * 0.2,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
            ctx.fill();
        }

        fn render_hud(&self) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("16px monospace");
            ctx.set_text_align("left");
            ctx.fill_text(&format!("Score: {}", self.state.score), 20.0, 28.0)
                .ok();
            ctx.fill_text(&format!("Level: {}", self.state.level), 20.0, 50.0)
                .ok();
            ctx.fill_text(&format!("Lives: {}", self.state.lives), 20.0, 72.0)
                .ok();
            ctx.set_text_align("right");
            ctx.fill_text(
                &format!("Best: {}", self.highscore.best),
                CANVAS_WIDTH as f64 - 20.0,
                28.0,
            )
            .ok();
            ctx.set_text_align("center");
        }

        fn render_overlay(&self, title: &str) {
            let ctx = &self.ctx;
            let cx = (CANVAS_WIDTH / 2.0) as f64;
            let cy = (CANVAS_HEIGHT / 2.0) as f64;

            ctx.set_fill_style_str("rgba(0,0,0,0.55)");
            ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH as f64, CANVAS_HEIGHT as f64);

            ctx.set_fill_style_str("#ffd700");
            ctx.set_font("bold 48px monospace");
            ctx.set_text_align("center");
            ctx.fill_text(title, cx, cy - 40.0).ok();

            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("20px monospace");
            ctx.fill_text(&format!("Score: {}", self.state.score), cx, cy + 4.0)
                .ok();
            ctx.set_font("16px monospace");
            ctx.fill_text("Enter: play again   Esc: change character", cx, cy + 44.0)
                .ok();
        }
    }

    fn kind_color(kind: VisualKind) -> &'static str {
        use VisualKind::*;
        match kind {
            ScratchBlock => "#FF8C1A",
            ScratchCat => "#FFAB19",
            ScratchBlockYellow => "#FFBF00",
            ScratchBlockPurple => "#9966FF",
            GearBig => "#4ECDC4",
            GearMedium => "#45B7D1",
            GearSmall => "#96CEB4",
            GearColored => "#FF6B6B",
            ClayRed => "#E74C3C",
            ClayBlue => "#3498DB",
            ClayYellow => "#F1C40F",
            ClayGreen => "#2ECC71",
            RockBrown => "#8B4513",
            BoxBrown => "#A0522D",
            BagBrown => "#8B5A2B",
            WeightBrown => "#654321",
            CvPaper => "#ECF0F1",
            CvFolder => "#F39C12",
            CvStack => "#BDC3C7",
            Contract => "#FDFEFE",
            Pencil => "#F4D03F",
            Sharpener => "#95A5A6",
            Eraser => "#EC7063",
            Invoice => "#D5DBDB",
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Festive Pang starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(CANVAS_WIDTH as u32);
        canvas.set_height(CANVAS_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, ctx)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_touch_handlers(&canvas, game.clone());
        request_animation_frame(game);

        log::info!("Festive Pang running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keydown
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                // First gesture unlocks the audio context
                g.audio.resume();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.move_left = true,
                    "ArrowRight" | "d" | "D" => g.input.move_right = true,
                    " " | "ArrowUp" => {
                        g.input.fire = true;
                        event.prevent_default();
                    }
                    "Enter" => g.input.retry = true,
                    "Escape" => g.input.change_character = true,
                    "m" | "M" => {
                        g.settings.muted = !g.settings.muted;
                        let muted = g.settings.muted;
                        g.audio.set_muted(muted);
                        g.settings.save();
                    }
                    "v" | "V" => {
                        // Rule set only changes between sessions
                        if g.state.phase == GamePhase::SelectingCharacter {
                            g.settings.variant = g.settings.variant.toggled();
                            g.settings.save();
                            let seed = js_sys::Date::now() as u64;
                            g.state = GameState::new(seed, g.settings.variant);
                        }
                    }
                    key => {
                        if let Some(digit) = key.chars().next().and_then(|c| c.to_digit(10)) {
                            let idx = digit.wrapping_sub(1) as usize;
                            if let Some(&character) = Character::ALL.get(idx) {
                                g.input.select = Some(character);
                            }
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyup
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.move_left = false,
                    "ArrowRight" | "d" | "D" => g.input.move_right = false,
                    " " | "ArrowUp" => g.input.fire = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Touch zones: left third moves left, right third moves right, the
    /// middle fires. Any touch also acts as retry/select confirmation.
    fn setup_touch_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let canvas_ref = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().item(0) else {
                    return;
                };
                let rect = canvas_ref.get_bounding_client_rect();
                let frac = (touch.client_x() as f64 - rect.left()) / rect.width().max(1.0);
                let canvas_y = (touch.client_y() as f64 - rect.top()) / rect.height().max(1.0)
                    * CANVAS_HEIGHT as f64;

                let mut g = game.borrow_mut();
                g.audio.resume();
                match g.state.phase {
                    GamePhase::Playing => {
                        if frac < 1.0 / 3.0 {
                            g.input.move_left = true;
                        } else if frac > 2.0 / 3.0 {
                            g.input.move_right = true;
                        } else {
                            g.input.fire = true;
                        }
                    }
                    GamePhase::SelectingCharacter => {
                        // Touching a roster row picks that character
                        if let Some(character) = ui::roster_entry_at(canvas_y as f32) {
                            g.input.select = Some(character);
                        }
                    }
                    GamePhase::GameOver | GamePhase::Win => g.input.retry = true,
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.input.move_left = false;
                g.input.move_right = false;
                g.input.fire = false;
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            let _ = canvas
                .add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use festive_pang::consts::*;
    use festive_pang::sim::{tick, Character, GamePhase, GameState, GameVariant, TickInput};

    env_logger::init();
    log::info!("Festive Pang (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    // Headless demo: a few seconds of simulated play per variant
    for variant in [GameVariant::Splitting, GameVariant::FixedBounce] {
        let mut state = GameState::new(0xFE57, variant);
        tick(
            &mut state,
            &TickInput {
                select: Some(Character::Laura),
                ..Default::default()
            },
        );

        let mut input = TickInput::default();
        for frame in 0..600u32 {
            input.move_left = (frame / 90) % 2 == 0;
            input.move_right = !input.move_left;
            input.fire = frame % 30 < 2;
            tick(&mut state, &input);
            if state.phase != GamePhase::Playing {
                break;
            }
        }

        log::info!(
            "{:?} demo: level {}, score {}, {} targets live after {} ticks",
            variant,
            state.level,
            state.score,
            state.targets.len(),
            state.time_ticks
        );
        assert!(state.level >= 1 && state.level <= MAX_LEVEL + 1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

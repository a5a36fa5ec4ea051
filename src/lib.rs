//! Festive Pang - a bubble-popping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `highscore`: Persisted best-score value
//! - `settings`: Player preferences (game variant, audio)
//! - `ui`: Select-screen layout shared by rendering and pointer input
//! - `audio`: Web Audio sound cues (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscore;
pub mod settings;
pub mod sim;
pub mod ui;

pub use highscore::HighScore;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one frame at 60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum catch-up steps per display frame to prevent spiral of death
    pub const MAX_STEPS_PER_FRAME: u32 = 4;

    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 850.0;
    pub const CANVAS_HEIGHT: f32 = 480.0;
    /// Top of the ground strip
    pub const GROUND_Y: f32 = 440.0;
    /// Side wall thickness
    pub const WALL_THICKNESS: f32 = 10.0;

    /// Player hitbox (anchored to the ground)
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    /// Horizontal movement per frame
    pub const PLAYER_SPEED: f32 = 5.0;

    /// Harpoon upward travel per frame
    pub const HARPOON_SPEED: f32 = 8.0;
    /// Concurrent live harpoon cap
    pub const MAX_HARPOONS: usize = 2;
    /// Extra reach added to the target radius in the harpoon hit test
    pub const HIT_SLOP: f32 = 5.0;

    /// Downward acceleration per frame
    pub const GRAVITY: f32 = 0.15;
    /// Ground-bounce energy retention (splitting variant)
    pub const BOUNCE_DAMPING: f32 = 0.98;
    /// Fall speed cap (fixed-bounce variant)
    pub const MAX_FALL_SPEED: f32 = 7.0;
    /// Constant upward speed assigned on every ground contact (fixed-bounce variant)
    pub const BOUNCE_VELOCITY: f32 = 7.5;
    /// Ceiling rebound retention (fixed-bounce variant)
    pub const CEILING_REBOUND_FACTOR: f32 = 0.5;
    /// Score multiplier in the fixed-bounce variant (no splitting payoff)
    pub const FIXED_BOUNCE_SCORE_MULT: u32 = 2;

    /// Horizontal offset of split children from the parent
    pub const SPLIT_OFFSET: f32 = 10.0;
    /// Horizontal speedup applied to split children
    pub const SPLIT_SPEEDUP: f32 = 1.1;
    /// Upward kick given to split children
    pub const SPLIT_KICK_VY: f32 = -4.0;

    /// Fresh-target horizontal speed at level 0
    pub const BASE_TARGET_SPEED: f32 = 2.0;
    /// Horizontal speed gained per level
    pub const TARGET_SPEED_PER_LEVEL: f32 = 0.3;

    /// Clearing level 5 wins the game
    pub const MAX_LEVEL: u32 = 5;
    /// Simultaneous targets at level start are capped at this (splitting variant)
    pub const LEVEL_BATCH_CAP: u32 = 4;
    /// Deferred spawn delay (1 second at the frame clock)
    pub const SPAWN_DELAY_TICKS: u32 = 60;
    /// Vertical spawn position for fresh targets
    pub const SPAWN_Y: f32 = 100.0;
}

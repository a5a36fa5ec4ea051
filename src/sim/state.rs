//! Game state and core simulation types
//!
//! Everything the tick function mutates lives here. The state is fully
//! serializable and owned exclusively by the game loop.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Picking a roster character; no simulation runs
    SelectingCharacter,
    /// Active gameplay
    Playing,
    /// Lives exhausted
    GameOver,
    /// Level 5 cleared
    Win,
}

/// Which rule set the session runs under
///
/// The two variants differ in bounce physics, scoring, and spawn policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameVariant {
    /// Targets split into two smaller children when hit
    #[default]
    Splitting,
    /// Targets always rebound at one constant speed; hits respawn a fresh
    /// large target instead of splitting
    FixedBounce,
}

impl GameVariant {
    /// The other rule set
    pub fn toggled(self) -> Self {
        match self {
            GameVariant::Splitting => GameVariant::FixedBounce,
            GameVariant::FixedBounce => GameVariant::Splitting,
        }
    }
}

/// Target size class, ordered largest to smallest
///
/// Smaller classes are harder to hit and worth more points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Large,
    Medium,
    Small,
    Tiny,
}

impl SizeClass {
    /// Collision radius in pixels
    pub fn radius(self) -> f32 {
        match self {
            SizeClass::Large => 35.0,
            SizeClass::Medium => 25.0,
            SizeClass::Small => 18.0,
            SizeClass::Tiny => 12.0,
        }
    }

    /// Base point value awarded on a harpoon hit
    pub fn points(self) -> u32 {
        match self {
            SizeClass::Large => 100,
            SizeClass::Medium => 200,
            SizeClass::Small => 300,
            SizeClass::Tiny => 500,
        }
    }

    /// Next size class down, or `None` for the smallest
    pub fn smaller(self) -> Option<SizeClass> {
        match self {
            SizeClass::Large => Some(SizeClass::Medium),
            SizeClass::Medium => Some(SizeClass::Small),
            SizeClass::Small => Some(SizeClass::Tiny),
            SizeClass::Tiny => None,
        }
    }

    /// Minimum post-bounce upward speed in the splitting variant
    ///
    /// Keeps small targets lively instead of settling on the ground.
    pub fn min_rebound(self) -> f32 {
        match self {
            SizeClass::Large => 10.0,
            SizeClass::Medium => 11.0,
            SizeClass::Small => 10.0,
            SizeClass::Tiny => 9.0,
        }
    }
}

/// Cosmetic icon drawn for a target; has no effect on physics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    ScratchBlock,
    ScratchCat,
    ScratchBlockYellow,
    ScratchBlockPurple,
    GearBig,
    GearMedium,
    GearSmall,
    GearColored,
    ClayRed,
    ClayBlue,
    ClayYellow,
    ClayGreen,
    RockBrown,
    BoxBrown,
    BagBrown,
    WeightBrown,
    CvPaper,
    CvFolder,
    CvStack,
    Contract,
    Pencil,
    Sharpener,
    Eraser,
    Invoice,
}

/// Playable roster character
///
/// Each character themes the targets via a closed, static table of four
/// visual kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Character {
    #[default]
    David,
    Jordi,
    Lucia,
    Lidia,
    Laura,
    Anna,
}

impl Character {
    pub const ALL: [Character; 6] = [
        Character::David,
        Character::Jordi,
        Character::Lucia,
        Character::Lidia,
        Character::Laura,
        Character::Anna,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Character::David => "David",
            Character::Jordi => "Jordi",
            Character::Lucia => "Lucia",
            Character::Lidia => "Lidia",
            Character::Laura => "Laura",
            Character::Anna => "Anna",
        }
    }

    /// The four themed icons this character's targets cycle through
    pub fn kinds(self) -> [VisualKind; 4] {
        use VisualKind::*;
        match self {
            Character::David => [ScratchBlock, ScratchCat, ScratchBlockYellow, ScratchBlockPurple],
            Character::Jordi => [Pencil, Sharpener, Eraser, Invoice],
            Character::Lucia => [GearBig, GearMedium, GearSmall, GearColored],
            Character::Lidia => [RockBrown, BoxBrown, BagBrown, WeightBrown],
            Character::Laura => [ClayRed, ClayBlue, ClayYellow, ClayGreen],
            Character::Anna => [CvPaper, CvFolder, CvStack, Contract],
        }
    }
}

/// A bouncing target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: SizeClass,
    pub kind: VisualKind,
}

impl Target {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.radius()
    }
}

/// A player-fired vertical shot
///
/// Travels straight up from its launch point; x never changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Harpoon {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// What a deferred spawn produces when its delay elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnKind {
    /// Level-start batch (splitting) or single fresh target (fixed-bounce)
    LevelBatch,
    /// One replacement target after a destruction (fixed-bounce only)
    Replacement,
}

/// A spawn scheduled to fire after a fixed tick delay
///
/// Cleared wholesale on any transition out of `Playing`, so a stale spawn
/// can never mutate a reset game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeferredSpawn {
    pub ticks_remaining: u32,
    pub kind: SpawnKind,
}

/// Discrete event emitted during a tick for the shell to act on
///
/// Audio cues map one-to-one onto the first four; failures to play them
/// never feed back into the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Shoot,
    Pop,
    Hit,
    LevelUp,
    GameOver,
    Win,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Seeded RNG for spawn positions and icon choice
    pub rng: Pcg32,
    /// Active rule set
    pub variant: GameVariant,
    /// Current phase
    pub phase: GamePhase,
    /// Selected roster character
    pub character: Character,
    /// Session score, monotonically non-decreasing
    pub score: u32,
    /// Remaining lives
    pub lives: u8,
    /// Current level, 1-based
    pub level: u32,
    /// Destructions this level (fixed-bounce clear counter)
    pub cleared_this_level: u32,
    /// Player horizontal center; y is fixed to ground level
    pub player_x: f32,
    /// Live targets
    pub targets: Vec<Target>,
    /// Live harpoons
    pub harpoons: Vec<Harpoon>,
    /// Spawns waiting on their delay
    pub pending_spawns: Vec<DeferredSpawn>,
    /// Fire latch: set on release, cleared on spawn (edge-triggered fire)
    pub can_fire: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events emitted this tick, drained by the shell
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh state in the character-select phase
    pub fn new(seed: u64, variant: GameVariant) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            variant,
            phase: GamePhase::SelectingCharacter,
            character: Character::default(),
            score: 0,
            lives: 3,
            level: 1,
            cleared_this_level: 0,
            player_x: CANVAS_WIDTH / 2.0,
            targets: Vec::new(),
            harpoons: Vec::new(),
            pending_spawns: Vec::new(),
            can_fire: true,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Schedule a deferred spawn
    pub fn schedule_spawn(&mut self, kind: SpawnKind) {
        self.pending_spawns.push(DeferredSpawn {
            ticks_remaining: SPAWN_DELAY_TICKS,
            kind,
        });
    }

    /// Reset all per-session counters and entities and enter `Playing`
    ///
    /// Used both for the initial start and for retry after game over / win.
    pub fn start_session(&mut self, character: Character) {
        self.character = character;
        self.score = 0;
        self.lives = 3;
        self.level = 1;
        self.cleared_this_level = 0;
        self.player_x = CANVAS_WIDTH / 2.0;
        self.targets.clear();
        self.harpoons.clear();
        self.pending_spawns.clear();
        self.can_fire = true;
        self.phase = GamePhase::Playing;
        log::info!(
            "Session started: character={}, variant={:?}",
            character.name(),
            self.variant
        );
    }

    /// Leave gameplay for the character-select screen
    ///
    /// Cancels every pending spawn so nothing stale fires into the next run.
    pub fn return_to_select(&mut self) {
        self.targets.clear();
        self.harpoons.clear();
        self.pending_spawns.clear();
        self.phase = GamePhase::SelectingCharacter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_toggle_round_trips() {
        for variant in [GameVariant::Splitting, GameVariant::FixedBounce] {
            assert_ne!(variant.toggled(), variant);
            assert_eq!(variant.toggled().toggled(), variant);
        }
    }

    #[test]
    fn every_character_has_a_closed_kind_table() {
        for character in Character::ALL {
            let kinds = character.kinds();
            assert!(!character.name().is_empty());
            // All four icons distinct
            for (i, a) in kinds.iter().enumerate() {
                for b in &kinds[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }
}

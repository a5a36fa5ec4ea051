//! Deterministic game simulation
//!
//! Fixed-timestep, seeded, fully serializable. The shell feeds a
//! [`TickInput`] into [`tick`] once per frame and renders whatever
//! [`GameState`] says afterwards; nothing in here touches the platform.

pub mod collision;
pub mod physics;
pub mod state;
pub mod tick;

pub use state::{
    Character, GameEvent, GamePhase, GameState, GameVariant, Harpoon, SizeClass, SpawnKind, Target,
    VisualKind,
};
pub use tick::{tick, TickInput};

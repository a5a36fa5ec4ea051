//! Collision tests between harpoons, targets, and the player hitbox
//!
//! Pure pairwise checks; the tick function decides what happens on a hit.
//! Within a frame the harpoon pass always resolves before the player pass,
//! so a target struck by both in the same frame counts as a harpoon hit.

use glam::Vec2;

use crate::consts::*;

use super::state::{Harpoon, Target};

/// Harpoon tip vs target: Euclidean center distance under radius plus slop
#[inline]
pub fn harpoon_hits_target(harpoon: &Harpoon, target: &Target) -> bool {
    let tip = Vec2::new(harpoon.x, harpoon.y);
    target.pos.distance(tip) < target.radius() + HIT_SLOP
}

/// Target circle bounds vs the player's fixed rectangle at ground level
pub fn target_hits_player(target: &Target, player_x: f32) -> bool {
    let r = target.radius();
    let left = player_x - PLAYER_WIDTH / 2.0;
    let right = player_x + PLAYER_WIDTH / 2.0;
    let top = GROUND_Y - PLAYER_HEIGHT;

    target.pos.x + r > left
        && target.pos.x - r < right
        && target.pos.y + r > top
        && target.pos.y - r < GROUND_Y
}

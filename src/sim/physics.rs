//! Per-target physics integration
//!
//! One unit-timestep update per frame: gravity, position advance, then
//! boundary reflection against the walls, ground, and ceiling. The two
//! game variants differ only in how the vertical bounce behaves.

use crate::consts::*;

use super::state::{GameVariant, Target};

/// Advance one target by one frame under the given variant's rules
///
/// Applied identically to every live target, independent of draw order.
pub fn integrate(target: &mut Target, variant: GameVariant) {
    match variant {
        GameVariant::Splitting => integrate_splitting(target),
        GameVariant::FixedBounce => integrate_fixed_bounce(target),
    }
}

/// Splitting variant: free-fall acceleration, damped ground bounce with a
/// per-class minimum rebound floor.
fn integrate_splitting(target: &mut Target) {
    target.vel.y += GRAVITY;
    target.pos += target.vel;

    let r = target.radius();
    reflect_walls(target, r);

    if target.pos.y + r > GROUND_Y {
        target.pos.y = GROUND_Y - r;
        target.vel.y = -target.vel.y.abs() * BOUNCE_DAMPING;
        let floor = target.size.min_rebound();
        if target.vel.y > -floor {
            target.vel.y = -floor;
        }
    }

    if target.pos.y - r < 0.0 {
        target.pos.y = r;
        target.vel.y = target.vel.y.abs();
    }
}

/// Fixed-bounce variant: fall speed is capped, every ground contact snaps
/// the rebound to one constant speed, and the ceiling reflects at half
/// speed. Same hop height regardless of impact speed.
fn integrate_fixed_bounce(target: &mut Target) {
    target.vel.y = (target.vel.y + GRAVITY).min(MAX_FALL_SPEED);
    target.pos += target.vel;

    let r = target.radius();
    reflect_walls(target, r);

    if target.pos.y + r > GROUND_Y {
        target.pos.y = GROUND_Y - r;
        target.vel.y = -BOUNCE_VELOCITY;
    }

    if target.pos.y - r < 0.0 {
        target.pos.y = r;
        target.vel.y = target.vel.y.abs() * CEILING_REBOUND_FACTOR;
    }
}

/// Clamp to the side walls and reflect horizontal velocity
fn reflect_walls(target: &mut Target, r: f32) {
    if target.pos.x - r < WALL_THICKNESS {
        target.pos.x = WALL_THICKNESS + r;
        target.vel.x = target.vel.x.abs();
    }
    if target.pos.x + r > CANVAS_WIDTH - WALL_THICKNESS {
        target.pos.x = CANVAS_WIDTH - WALL_THICKNESS - r;
        target.vel.x = -target.vel.x.abs();
    }
}

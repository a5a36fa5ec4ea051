//! Fixed timestep simulation tick
//!
//! The single per-frame driver. Owns every state mutation and sequences the
//! other components in a strict order: input, player movement, fire, harpoon
//! advance, target physics, collision resolution (harpoon pass fully before
//! player pass), level bookkeeping, deferred spawn timers.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

use super::collision;
use super::physics;
use super::state::{
    Character, GameEvent, GamePhase, GameState, GameVariant, Harpoon, SizeClass, SpawnKind, Target,
};

/// Input commands for a single tick, sampled at the frame boundary
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held movement keys
    pub move_left: bool,
    pub move_right: bool,
    /// Held fire key; spawning is edge-triggered via the state's fire latch
    pub fire: bool,
    /// Character chosen on the select screen (one-shot)
    pub select: Option<Character>,
    /// Restart with the same character from a terminal screen (one-shot)
    pub retry: bool,
    /// Return to the select screen from a terminal screen (one-shot)
    pub change_character: bool,
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    match state.phase {
        GamePhase::SelectingCharacter => {
            if let Some(character) = input.select {
                state.start_session(character);
                spawn_level_batch(state);
            }
        }
        GamePhase::GameOver | GamePhase::Win => {
            if input.retry {
                let character = state.character;
                state.start_session(character);
                spawn_level_batch(state);
            } else if input.change_character {
                state.return_to_select();
            }
        }
        GamePhase::Playing => tick_playing(state, input),
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput) {
    state.time_ticks += 1;

    // Player movement, clamped to the playfield minus the wall thickness
    if input.move_left {
        state.player_x -= PLAYER_SPEED;
    }
    if input.move_right {
        state.player_x += PLAYER_SPEED;
    }
    let half = PLAYER_WIDTH / 2.0;
    state.player_x = state
        .player_x
        .clamp(WALL_THICKNESS + half, CANVAS_WIDTH - WALL_THICKNESS - half);

    // Edge-triggered fire under the concurrent cap: the latch only re-arms
    // on release, so holding the key never repeat-fires
    if input.fire {
        if state.can_fire && state.harpoons.len() < MAX_HARPOONS {
            let id = state.next_entity_id();
            state.harpoons.push(Harpoon {
                id,
                x: state.player_x,
                y: GROUND_Y - PLAYER_HEIGHT,
            });
            state.can_fire = false;
            state.events.push(GameEvent::Shoot);
        }
    } else {
        state.can_fire = true;
    }

    // Advance harpoons; discard any past the top boundary
    for harpoon in &mut state.harpoons {
        harpoon.y -= HARPOON_SPEED;
    }
    state.harpoons.retain(|h| h.y > 0.0);

    // Physics for every live target
    let variant = state.variant;
    for target in &mut state.targets {
        physics::integrate(target, variant);
    }

    // Harpoon pass resolves entirely before the player pass, so a target
    // struck by both in one frame counts as a harpoon hit
    resolve_harpoon_hits(state);
    if resolve_player_hit(state) {
        return;
    }

    direct_level(state);
    if state.phase != GamePhase::Playing {
        return;
    }

    run_spawn_timers(state);
}

/// Resolve every harpoon-target overlap this frame
///
/// A struck harpoon is consumed immediately so it cannot double-hit.
/// Split children are held back until the pass is over; they can't be hit
/// in the frame they are born.
fn resolve_harpoon_hits(state: &mut GameState) {
    let mut children: Vec<Target> = Vec::new();

    let mut i = 0;
    while i < state.targets.len() {
        let struck = state
            .harpoons
            .iter()
            .position(|h| collision::harpoon_hits_target(h, &state.targets[i]));
        let Some(h_idx) = struck else {
            i += 1;
            continue;
        };

        state.harpoons.remove(h_idx);
        let target = state.targets.remove(i);
        state.events.push(GameEvent::Pop);

        match state.variant {
            GameVariant::Splitting => {
                state.score += target.size.points();
                split_children(state, &target, &mut children);
            }
            GameVariant::FixedBounce => {
                state.score += target.size.points() * FIXED_BOUNCE_SCORE_MULT;
                state.cleared_this_level += 1;
                state.schedule_spawn(SpawnKind::Replacement);
            }
        }
    }

    state.targets.append(&mut children);
}

/// Push the two child targets for a destroyed parent, one class smaller
///
/// Tiny targets produce no children.
fn split_children(state: &mut GameState, parent: &Target, out: &mut Vec<Target>) {
    let Some(size) = parent.size.smaller() else {
        return;
    };
    let kinds = state.character.kinds();
    let speed = parent.vel.x.abs() * SPLIT_SPEEDUP;

    for dir in [-1.0f32, 1.0] {
        let kind = kinds[state.rng.random_range(0..kinds.len())];
        let id = state.next_entity_id();
        out.push(Target {
            id,
            pos: Vec2::new(parent.pos.x + dir * SPLIT_OFFSET, parent.pos.y),
            vel: Vec2::new(dir * speed, SPLIT_KICK_VY),
            size,
            kind,
        });
    }
}

/// Player pass over the targets that survived the harpoon pass
///
/// Returns true if the session ended this frame; nothing else may run after
/// that transition.
fn resolve_player_hit(state: &mut GameState) -> bool {
    let player_x = state.player_x;
    let hit = state
        .targets
        .iter()
        .any(|t| collision::target_hits_player(t, player_x));
    if !hit {
        return false;
    }

    state.events.push(GameEvent::Hit);
    state.lives = state.lives.saturating_sub(1);

    if state.lives == 0 {
        state.pending_spawns.clear();
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over at level {} with score {}", state.level, state.score);
        return true;
    }

    // Survived: recenter, drop in-flight shots
    state.player_x = CANVAS_WIDTH / 2.0;
    state.harpoons.clear();

    if state.variant == GameVariant::FixedBounce {
        state.targets.clear();
        state.pending_spawns.clear();
        state.schedule_spawn(SpawnKind::Replacement);
    }

    false
}

/// Level director: decide whether the current level is cleared
fn direct_level(state: &mut GameState) {
    let cleared = match state.variant {
        // Cleared once the live set empties and no batch is still pending
        GameVariant::Splitting => state.targets.is_empty() && state.pending_spawns.is_empty(),
        // Level N requires exactly N + 2 destructions
        GameVariant::FixedBounce => state.cleared_this_level >= state.level + 2,
    };
    if cleared {
        advance_level(state);
    }
}

fn advance_level(state: &mut GameState) {
    if state.level >= MAX_LEVEL {
        state.pending_spawns.clear();
        state.phase = GamePhase::Win;
        state.events.push(GameEvent::Win);
        log::info!("Won with score {}", state.score);
        return;
    }

    state.level += 1;
    state.cleared_this_level = 0;
    state.targets.clear();
    state.pending_spawns.clear();
    state.events.push(GameEvent::LevelUp);
    state.schedule_spawn(SpawnKind::LevelBatch);
    log::debug!("Level up to {}", state.level);
}

/// Count down deferred spawns and fire the ones that are due
///
/// A due spawn only fires into an empty field; if another spawn beat it
/// there, it is dropped, never duplicated.
fn run_spawn_timers(state: &mut GameState) {
    let mut due: Vec<SpawnKind> = Vec::new();
    state.pending_spawns.retain_mut(|s| {
        s.ticks_remaining -= 1;
        if s.ticks_remaining == 0 {
            due.push(s.kind);
            false
        } else {
            true
        }
    });

    for kind in due {
        if !state.targets.is_empty() {
            continue;
        }
        match kind {
            SpawnKind::LevelBatch => spawn_level_batch(state),
            SpawnKind::Replacement => spawn_single_target(state),
        }
    }
}

/// Level-start spawn: min(level, 4) large targets spread across the field
/// (splitting variant) or one fresh target (fixed-bounce variant)
pub fn spawn_level_batch(state: &mut GameState) {
    match state.variant {
        GameVariant::Splitting => {
            let count = state.level.min(LEVEL_BATCH_CAP);
            let kinds = state.character.kinds();
            let speed = BASE_TARGET_SPEED + state.level as f32 * TARGET_SPEED_PER_LEVEL;
            for i in 0..count {
                let dir = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let id = state.next_entity_id();
                state.targets.push(Target {
                    id,
                    pos: Vec2::new(100.0 + i as f32 * 200.0, SPAWN_Y),
                    vel: Vec2::new(dir * speed, 0.0),
                    size: SizeClass::Large,
                    kind: kinds[i as usize % kinds.len()],
                });
            }
        }
        GameVariant::FixedBounce => spawn_single_target(state),
    }
}

/// One fresh large target at a random x with a random horizontal direction
fn spawn_single_target(state: &mut GameState) {
    let r = SizeClass::Large.radius();
    let x = state
        .rng
        .random_range(WALL_THICKNESS + r..CANVAS_WIDTH - WALL_THICKNESS - r);
    let dir = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let speed = BASE_TARGET_SPEED + state.level as f32 * TARGET_SPEED_PER_LEVEL;
    let kinds = state.character.kinds();
    let kind = kinds[state.rng.random_range(0..kinds.len())];
    let id = state.next_entity_id();
    state.targets.push(Target {
        id,
        pos: Vec2::new(x, SPAWN_Y),
        vel: Vec2::new(dir * speed, 0.0),
        size: SizeClass::Large,
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::VisualKind;
    use proptest::prelude::*;

    fn playing_state(variant: GameVariant) -> GameState {
        let mut state = GameState::new(7, variant);
        let input = TickInput {
            select: Some(Character::Laura),
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    fn target_at(state: &mut GameState, x: f32, y: f32, size: SizeClass) -> u32 {
        let id = state.next_entity_id();
        state.targets.push(Target {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size,
            kind: VisualKind::ClayBlue,
        });
        id
    }

    #[test]
    fn fire_is_edge_triggered_at_center() {
        let mut state = playing_state(GameVariant::Splitting);
        assert_eq!(state.player_x, CANVAS_WIDTH / 2.0);

        let held = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &held);
        assert_eq!(state.harpoons.len(), 1);
        assert_eq!(state.harpoons[0].x, 425.0);
        // Launched at ground minus player height, then advanced once this frame
        assert_eq!(
            state.harpoons[0].y,
            GROUND_Y - PLAYER_HEIGHT - HARPOON_SPEED
        );

        // Holding fire must not spawn a second shot
        tick(&mut state, &held);
        tick(&mut state, &held);
        assert_eq!(state.harpoons.len(), 1);

        // Release, then press again: second shot allowed
        tick(&mut state, &TickInput::default());
        tick(&mut state, &held);
        assert_eq!(state.harpoons.len(), 2);

        // Cap of two holds even across another release/press
        tick(&mut state, &TickInput::default());
        tick(&mut state, &held);
        assert_eq!(state.harpoons.len(), 2);
    }

    #[test]
    fn harpoons_expire_at_top_boundary() {
        let mut state = playing_state(GameVariant::Splitting);
        state.targets.clear();
        state.harpoons.push(Harpoon {
            id: 99,
            x: 200.0,
            y: 6.0,
        });
        // Keep the director quiet while the harpoon exits
        state.schedule_spawn(SpawnKind::LevelBatch);
        tick(&mut state, &TickInput::default());
        assert!(state.harpoons.is_empty());
    }

    #[test]
    fn splitting_hit_spawns_two_smaller_children() {
        let mut state = playing_state(GameVariant::Splitting);
        state.targets.clear();
        let id = target_at(&mut state, 300.0, 200.0, SizeClass::Large);
        state.targets[0].vel.x = 2.0;
        state.harpoons.push(Harpoon {
            id: 50,
            x: 300.0,
            y: 200.0,
        });

        tick(&mut state, &TickInput::default());

        assert!(state.targets.iter().all(|t| t.id != id));
        assert_eq!(state.targets.len(), 2);
        assert!(state.targets.iter().all(|t| t.size == SizeClass::Medium));
        assert_eq!(state.score, 100);
        assert!(state.harpoons.is_empty());
        // Children diverge horizontally with an upward kick
        let (left, right) = (&state.targets[0], &state.targets[1]);
        assert!(left.vel.x < 0.0 && right.vel.x > 0.0);
        assert!(left.vel.y < 0.0 && right.vel.y < 0.0);
    }

    #[test]
    fn tiny_hit_spawns_nothing() {
        let mut state = playing_state(GameVariant::Splitting);
        state.targets.clear();
        target_at(&mut state, 300.0, 200.0, SizeClass::Tiny);
        state.harpoons.push(Harpoon {
            id: 50,
            x: 300.0,
            y: 200.0,
        });

        tick(&mut state, &TickInput::default());

        assert_eq!(state.score, 500);
        // Field emptied, so the director scheduled the next level batch
        assert_eq!(state.level, 2);
        assert_eq!(state.pending_spawns.len(), 1);
        assert!(state.targets.is_empty());
    }

    #[test]
    fn fixed_bounce_level_needs_n_plus_two_destructions() {
        let mut state = playing_state(GameVariant::FixedBounce);
        state.level = 3;
        state.cleared_this_level = 0;

        for n in 1..=5u32 {
            state.targets.clear();
            state.pending_spawns.clear();
            target_at(&mut state, 100.0, 200.0, SizeClass::Large);
            state.harpoons.clear();
            state.harpoons.push(Harpoon {
                id: 100 + n,
                x: 100.0,
                y: 200.0,
            });

            tick(&mut state, &TickInput::default());

            assert!(state.targets.is_empty());
            if n < 5 {
                assert_eq!(state.level, 3, "level advanced after only {n} destructions");
                assert_eq!(state.cleared_this_level, n);
            } else {
                assert_eq!(state.level, 4);
                assert_eq!(state.cleared_this_level, 0);
            }
        }
    }

    #[test]
    fn fixed_bounce_hit_scores_double() {
        let mut state = playing_state(GameVariant::FixedBounce);
        state.targets.clear();
        state.pending_spawns.clear();
        target_at(&mut state, 100.0, 200.0, SizeClass::Large);
        state.harpoons.push(Harpoon {
            id: 1,
            x: 100.0,
            y: 200.0,
        });

        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, 200);
    }

    #[test]
    fn fixed_bounce_replacement_waits_for_delay_and_empty_field() {
        let mut state = playing_state(GameVariant::FixedBounce);
        state.targets.clear();
        state.pending_spawns.clear();
        target_at(&mut state, 100.0, 200.0, SizeClass::Large);
        state.harpoons.push(Harpoon {
            id: 1,
            x: 100.0,
            y: 200.0,
        });

        tick(&mut state, &TickInput::default());
        assert!(state.targets.is_empty());
        assert_eq!(state.pending_spawns.len(), 1);

        // Not yet due
        for _ in 0..SPAWN_DELAY_TICKS - 2 {
            tick(&mut state, &TickInput::default());
            assert!(state.targets.is_empty());
        }
        tick(&mut state, &TickInput::default());
        assert_eq!(state.targets.len(), 1);
        assert!(state.pending_spawns.is_empty());
    }

    #[test]
    fn due_spawn_into_occupied_field_is_dropped() {
        let mut state = playing_state(GameVariant::FixedBounce);
        state.targets.clear();
        state.pending_spawns.clear();
        state.schedule_spawn(SpawnKind::Replacement);
        // Another spawn beat the deferred one to the field
        target_at(&mut state, 700.0, 100.0, SizeClass::Large);

        for _ in 0..SPAWN_DELAY_TICKS + 5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.targets.len(), 1);
        assert!(state.pending_spawns.is_empty());
    }

    #[test]
    fn player_hit_with_last_life_ends_session_same_frame() {
        let mut state = playing_state(GameVariant::Splitting);
        state.lives = 1;
        state.targets.clear();
        state.schedule_spawn(SpawnKind::LevelBatch);
        let px = state.player_x;
        target_at(&mut state, px, GROUND_Y - 30.0, SizeClass::Large);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver));
        // Outstanding deferred spawns are cancelled on the transition
        assert!(state.pending_spawns.is_empty());

        // The loop is stopped: no further frames advance
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn player_hit_with_lives_left_recenters_and_clears_shots() {
        let mut state = playing_state(GameVariant::Splitting);
        state.targets.clear();
        state.player_x = 100.0;
        target_at(&mut state, 100.0, GROUND_Y - 30.0, SizeClass::Large);
        // A second target far away must survive the reset in this variant
        target_at(&mut state, 700.0, 100.0, SizeClass::Large);
        state.harpoons.push(Harpoon {
            id: 9,
            x: 500.0,
            y: 300.0,
        });

        tick(&mut state, &TickInput::default());

        assert_eq!(state.lives, 2);
        assert_eq!(state.player_x, CANVAS_WIDTH / 2.0);
        assert!(state.harpoons.is_empty());
        assert_eq!(state.targets.len(), 2);
    }

    #[test]
    fn fixed_bounce_player_hit_clears_field_and_respawns_one() {
        let mut state = playing_state(GameVariant::FixedBounce);
        state.targets.clear();
        state.pending_spawns.clear();
        state.player_x = 100.0;
        target_at(&mut state, 100.0, GROUND_Y - 30.0, SizeClass::Large);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.lives, 2);
        assert!(state.targets.is_empty());
        assert_eq!(state.pending_spawns.len(), 1);
    }

    #[test]
    fn projectile_hit_wins_tie_break_over_player() {
        let mut state = playing_state(GameVariant::Splitting);
        state.targets.clear();
        let px = state.player_x;
        // Tiny target overlapping the player AND skewered by a harpoon
        target_at(&mut state, px, GROUND_Y - 20.0, SizeClass::Tiny);
        state.harpoons.push(Harpoon {
            id: 1,
            x: px,
            y: GROUND_Y - 20.0,
        });

        tick(&mut state, &TickInput::default());

        // Resolved as a pop, not a hit: lives untouched, points awarded
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 500);
        assert!(state.events.contains(&GameEvent::Pop));
        assert!(!state.events.contains(&GameEvent::Hit));
    }

    #[test]
    fn clearing_level_five_wins() {
        let mut state = playing_state(GameVariant::Splitting);
        state.level = MAX_LEVEL;
        state.targets.clear();
        state.pending_spawns.clear();
        target_at(&mut state, 300.0, 200.0, SizeClass::Tiny);
        state.harpoons.push(Harpoon {
            id: 1,
            x: 300.0,
            y: 200.0,
        });

        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::Win);
        assert!(state.events.contains(&GameEvent::Win));
        assert!(state.pending_spawns.is_empty());
    }

    #[test]
    fn retry_resets_the_whole_session() {
        let mut state = playing_state(GameVariant::Splitting);
        state.score = 4200;
        state.lives = 1;
        state.level = 4;
        state.targets.clear();
        state.schedule_spawn(SpawnKind::LevelBatch);
        let px = state.player_x;
        target_at(&mut state, px, GROUND_Y - 30.0, SizeClass::Large);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        let retry = TickInput {
            retry: true,
            ..Default::default()
        };
        tick(&mut state, &retry);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert!(state.harpoons.is_empty());
        assert!(state.pending_spawns.is_empty());
        // Only the fresh level-1 batch is on the field
        assert_eq!(state.targets.len(), 1);
        assert_eq!(state.targets[0].size, SizeClass::Large);
    }

    #[test]
    fn change_character_returns_to_select() {
        let mut state = playing_state(GameVariant::Splitting);
        state.lives = 1;
        state.targets.clear();
        let px = state.player_x;
        target_at(&mut state, px, GROUND_Y - 30.0, SizeClass::Large);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        let input = TickInput {
            change_character: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::SelectingCharacter);
        assert!(state.targets.is_empty());
        assert!(state.pending_spawns.is_empty());

        // Picking a different character starts a fresh session
        let input = TickInput {
            select: Some(Character::Anna),
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.character, Character::Anna);
        assert_eq!(state.targets.len(), 1);
    }

    #[test]
    fn splitting_level_batch_scales_with_level() {
        for (level, expected) in [(1u32, 1usize), (3, 3), (5, 4)] {
            let mut state = GameState::new(11, GameVariant::Splitting);
            state.start_session(Character::David);
            state.level = level;
            spawn_level_batch(&mut state);
            assert_eq!(state.targets.len(), expected);
            assert!(state.targets.iter().all(|t| t.size == SizeClass::Large));
        }
    }

    proptest! {
        #[test]
        fn harpoon_cap_and_score_monotonic_under_any_input(
            inputs in proptest::collection::vec(
                (any::<bool>(), any::<bool>(), any::<bool>()),
                0..400,
            ),
            variant in prop_oneof![
                Just(GameVariant::Splitting),
                Just(GameVariant::FixedBounce),
            ],
        ) {
            let mut state = playing_state(variant);
            let mut last_score = 0u32;
            for (move_left, move_right, fire) in inputs {
                let input = TickInput {
                    move_left,
                    move_right,
                    fire,
                    ..Default::default()
                };
                tick(&mut state, &input);
                prop_assert!(state.harpoons.len() <= MAX_HARPOONS);
                prop_assert!(state.score >= last_score);
                last_score = state.score;
                if state.phase != GamePhase::Playing {
                    break;
                }
            }
        }

        #[test]
        fn fixed_bounce_never_exceeds_one_live_target(
            seed in any::<u64>(),
            frames in 1usize..600,
        ) {
            let mut state = GameState::new(seed, GameVariant::FixedBounce);
            let input = TickInput {
                select: Some(Character::Lucia),
                ..Default::default()
            };
            tick(&mut state, &input);
            let fire = TickInput { fire: true, ..Default::default() };
            for i in 0..frames {
                // Alternate fire to exercise the latch
                let input = if i % 3 == 0 { fire } else { TickInput::default() };
                tick(&mut state, &input);
                prop_assert!(state.targets.len() <= 1);
                if state.phase != GamePhase::Playing {
                    break;
                }
            }
        }
    }
}

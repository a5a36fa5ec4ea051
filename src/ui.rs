//! Select-screen layout shared between rendering and pointer input
//!
//! The roster list is drawn at fixed canvas coordinates; pointer input maps
//! back through the same numbers so the two can never drift apart.

use crate::sim::Character;

/// Text baseline of the first roster row
pub const ROSTER_TOP: f32 = 190.0;
/// Vertical spacing between roster rows
pub const ROSTER_ROW_HEIGHT: f32 = 36.0;

/// Baseline y of the given roster row
pub fn roster_row_y(index: usize) -> f32 {
    ROSTER_TOP + index as f32 * ROSTER_ROW_HEIGHT
}

/// Map a canvas-space y to the roster entry drawn there
///
/// Each row owns the band of one row height centered on its baseline;
/// anywhere outside the list returns `None`.
pub fn roster_entry_at(y: f32) -> Option<Character> {
    let rel = y - (ROSTER_TOP - ROSTER_ROW_HEIGHT / 2.0);
    if rel < 0.0 {
        return None;
    }
    let row = (rel / ROSTER_ROW_HEIGHT) as usize;
    Character::ALL.get(row).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_roster_row_is_reachable() {
        for (i, &character) in Character::ALL.iter().enumerate() {
            let y = roster_row_y(i);
            assert_eq!(roster_entry_at(y), Some(character));
            // Anywhere inside the row band picks the same entry
            assert_eq!(
                roster_entry_at(y - ROSTER_ROW_HEIGHT / 2.0 + 1.0),
                Some(character)
            );
            assert_eq!(
                roster_entry_at(y + ROSTER_ROW_HEIGHT / 2.0 - 1.0),
                Some(character)
            );
        }
    }

    #[test]
    fn outside_the_list_selects_nothing() {
        assert_eq!(roster_entry_at(0.0), None);
        assert_eq!(roster_entry_at(ROSTER_TOP - ROSTER_ROW_HEIGHT), None);
        let below = roster_row_y(Character::ALL.len());
        assert_eq!(roster_entry_at(below), None);
    }
}

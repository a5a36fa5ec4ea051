//! Persisted best score
//!
//! A single integer in LocalStorage, stored as a plain decimal string for
//! compatibility with earlier releases of the game.

/// Best score across sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "pangHighScore";

    /// Record a finished-or-running session's score
    ///
    /// Returns true and persists when the score beats the stored best.
    pub fn observe(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        self.save();
        true
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(text)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(best) = text.trim().parse::<u32>() {
                    log::info!("Loaded high score {best}");
                    return Self { best };
                }
            }
        }

        log::info!("No high score found, starting fresh");
        Self::default()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.best.to_string());
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

//! Game settings and preferences
//!
//! Persisted separately from the scoreboard, as a bare stringified float
//! under `fps_sensitivity`.

use crate::consts::{DEFAULT_SENSITIVITY, MAX_SENSITIVITY, MIN_SENSITIVITY};
use crate::persistence::{self, KeyValueStore, SENSITIVITY_KEY};

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Look sensitivity multiplier, always within [0.2, 2.0]
    sensitivity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

/// Clamp a sensitivity value into range (non-finite input resets to default)
pub fn clamp_sensitivity(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
    } else {
        DEFAULT_SENSITIVITY
    }
}

impl Settings {
    pub fn with_sensitivity(sensitivity: f32) -> Self {
        Self {
            sensitivity: clamp_sensitivity(sensitivity),
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Set sensitivity, clamping silently. Returns the stored value.
    pub fn set_sensitivity(&mut self, value: f32) -> f32 {
        self.sensitivity = clamp_sensitivity(value);
        self.sensitivity
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SENSITIVITY_KEY) {
            Ok(Some(raw)) => match raw.trim().parse::<f32>() {
                Ok(value) => {
                    log::info!("Loaded sensitivity {}", value);
                    Self::with_sensitivity(value)
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt sensitivity {:?}: {}", raw, e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> persistence::Result<()> {
        store.set(SENSITIVITY_KEY, &self.sensitivity.to_string())?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(Settings::with_sensitivity(5.0).sensitivity(), MAX_SENSITIVITY);
        assert_eq!(Settings::with_sensitivity(0.0).sensitivity(), MIN_SENSITIVITY);
        assert_eq!(Settings::with_sensitivity(f32::NAN).sensitivity(), DEFAULT_SENSITIVITY);

        let mut settings = Settings::default();
        assert_eq!(settings.set_sensitivity(-3.0), MIN_SENSITIVITY);
        assert_eq!(settings.set_sensitivity(1.25), 1.25);
    }

    #[test]
    fn test_roundtrip_as_plain_string() {
        let mut store = MemoryStore::new();
        Settings::with_sensitivity(1.5).save(&mut store).unwrap();
        assert_eq!(store.get(SENSITIVITY_KEY).unwrap().as_deref(), Some("1.5"));
        assert_eq!(Settings::load(&store).sensitivity(), 1.5);
    }

    #[test]
    fn test_load_fails_soft() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());

        store.set(SENSITIVITY_KEY, "fast").unwrap();
        assert_eq!(Settings::load(&store).sensitivity(), DEFAULT_SENSITIVITY);

        // Out-of-range stored values are clamped, not rejected
        store.set(SENSITIVITY_KEY, "9").unwrap();
        assert_eq!(Settings::load(&store).sensitivity(), MAX_SENSITIVITY);
    }
}

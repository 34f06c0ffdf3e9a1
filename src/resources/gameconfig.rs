//! Game configuration resource.
//!
//! Manages simulation, pool, and collision settings loaded from an INI
//! configuration file. Provides defaults for safe startup; values missing
//! from the file keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! ticks = 600
//! delta = 0.016666
//! seed = 24301
//!
//! [pool]
//! initial_size = 2
//! shot_pool_size = 6
//! ; "grow" or "fixed"
//! growth = grow
//! ; only used by "grow", omit for unbounded
//! limit = 8
//!
//! [collision]
//! player = Obstacle, Enemy
//! shot = Enemy, Obstacle
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

use crate::pool::GrowthPolicy;
use crate::resources::collisionlayers::CollisionLayers;

/// Default safe values for startup
const DEFAULT_TICKS: u32 = 600;
const DEFAULT_DELTA: f32 = 1.0 / 60.0;
const DEFAULT_SEED: u64 = 24301;
const DEFAULT_POOL_SIZE: usize = 2;
const DEFAULT_SHOT_POOL_SIZE: usize = 6;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";
const DEFAULT_LAYER_PAIRS: [(&str, &str); 4] = [
    ("Player", "Obstacle"),
    ("Player", "Enemy"),
    ("Shot", "Enemy"),
    ("Shot", "Obstacle"),
];

/// Errors raised while reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    Load(String),
    #[error("invalid value '{value}' for [{section}] {key}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

/// Game configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Number of fixed ticks the headless run simulates.
    pub ticks: u32,
    /// Seconds per tick.
    pub delta: f32,
    /// Seed for spawn randomness.
    pub seed: u64,
    /// Instances each obstacle pool builds up front.
    pub pool_initial_size: usize,
    /// Instances the player's shot pool builds up front.
    pub shot_pool_size: usize,
    /// What pools do when they run dry.
    pub growth: GrowthPolicy,
    /// Which collision layers interact.
    pub collision_layers: CollisionLayers,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        let collision_layers = DEFAULT_LAYER_PAIRS
            .iter()
            .fold(CollisionLayers::new(), |layers, (a, b)| layers.with_pair(a, b));
        Self {
            ticks: DEFAULT_TICKS,
            delta: DEFAULT_DELTA,
            seed: DEFAULT_SEED,
            pool_initial_size: DEFAULT_POOL_SIZE,
            shot_pool_size: DEFAULT_SHOT_POOL_SIZE,
            growth: GrowthPolicy::default(),
            collision_layers,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    ///
    /// Missing values retain their current (default) values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value
    /// is present but malformed.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(ConfigError::Load)?;
        self.apply(&config)?;
        info!("Loaded config from {:?}", self.config_path);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, contents: &str) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config
            .read(contents.to_string())
            .map_err(ConfigError::Load)?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), ConfigError> {
        // [simulation] section
        if let Some(ticks) = read_uint(config, "simulation", "ticks")? {
            self.ticks = narrow(ticks, "simulation", "ticks")?;
        }
        if let Some(delta) = read_float(config, "simulation", "delta")? {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(ConfigError::Invalid {
                    section: "simulation",
                    key: "delta",
                    value: delta.to_string(),
                });
            }
            self.delta = delta as f32;
        }
        if let Some(seed) = read_uint(config, "simulation", "seed")? {
            self.seed = seed;
        }

        // [pool] section
        if let Some(size) = read_uint(config, "pool", "initial_size")? {
            self.pool_initial_size = narrow(size, "pool", "initial_size")?;
        }
        if let Some(size) = read_uint(config, "pool", "shot_pool_size")? {
            self.shot_pool_size = narrow(size, "pool", "shot_pool_size")?;
        }
        let limit = read_uint(config, "pool", "limit")?
            .map(|limit| narrow(limit, "pool", "limit"))
            .transpose()?;
        match config.get("pool", "growth").as_deref().map(str::trim) {
            None => {
                if let (GrowthPolicy::Grow { limit: current }, Some(_)) = (&mut self.growth, limit) {
                    *current = limit;
                }
            }
            Some("fixed") => self.growth = GrowthPolicy::Fixed,
            Some("grow") => self.growth = GrowthPolicy::Grow { limit },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    section: "pool",
                    key: "growth",
                    value: other.to_string(),
                });
            }
        }

        // [collision] section replaces the default matrix when present
        if let Some(section) = config.get_map_ref().get("collision") {
            let mut layers = CollisionLayers::new();
            for (layer, others) in section {
                for other in others.iter().flat_map(|value| value.split(',')) {
                    let other = other.trim();
                    if !other.is_empty() {
                        layers.allow(layer, other);
                    }
                }
            }
            self.collision_layers = layers;
        }

        info!(
            "Config: {} ticks at {:.4}s, pools of {} (shots {}), growth {:?}",
            self.ticks, self.delta, self.pool_initial_size, self.shot_pool_size, self.growth
        );
        Ok(())
    }
}

fn read_uint(
    config: &Ini,
    section: &'static str,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    config.getuint(section, key).map_err(|_| ConfigError::Invalid {
        section,
        key,
        value: config.get(section, key).unwrap_or_default(),
    })
}

/// Convert a parsed integer into the field's type, rejecting values that
/// do not fit.
fn narrow<T: TryFrom<u64>>(
    value: u64,
    section: &'static str,
    key: &'static str,
) -> Result<T, ConfigError> {
    T::try_from(value).map_err(|_| ConfigError::Invalid {
        section,
        key,
        value: value.to_string(),
    })
}

fn read_float(
    config: &Ini,
    section: &'static str,
    key: &'static str,
) -> Result<Option<f64>, ConfigError> {
    config.getfloat(section, key).map_err(|_| ConfigError::Invalid {
        section,
        key,
        value: config.get(section, key).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file_contents() {
        let mut config = GameConfig::new();
        config.load_from_str("").unwrap();
        assert_eq!(config.ticks, DEFAULT_TICKS);
        assert_eq!(config.growth, GrowthPolicy::Grow { limit: None });
        assert!(config.collision_layers.can_collide("Player", "Obstacle"));
    }

    #[test]
    fn reads_pool_and_collision_sections() {
        let mut config = GameConfig::new();
        config
            .load_from_str(
                "[pool]\ninitial_size = 4\ngrowth = fixed\n\n[collision]\nplayer = Enemy\n",
            )
            .unwrap();
        assert_eq!(config.pool_initial_size, 4);
        assert_eq!(config.growth, GrowthPolicy::Fixed);
        assert!(config.collision_layers.can_collide("Player", "Enemy"));
        assert!(!config.collision_layers.can_collide("Player", "Obstacle"));
    }

    #[test]
    fn grow_with_limit() {
        let mut config = GameConfig::new();
        config
            .load_from_str("[pool]\ngrowth = grow\nlimit = 5\n")
            .unwrap();
        assert_eq!(config.growth, GrowthPolicy::Grow { limit: Some(5) });
    }

    #[test]
    fn rejects_unknown_growth_policy() {
        let mut config = GameConfig::new();
        let err = config
            .load_from_str("[pool]\ngrowth = sometimes\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "growth", .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[simulation]\nticks = 42\nseed = 7\ndelta = 0.5\n").unwrap();

        let mut config = GameConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.ticks, 42);
        assert_eq!(config.seed, 7);
        assert_eq!(config.delta, 0.5);
        assert_eq!(config.pool_initial_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GameConfig::with_path(dir.path().join("absent.ini"));
        assert!(matches!(config.load_from_file(), Err(ConfigError::Load(_))));
        assert_eq!(config.ticks, DEFAULT_TICKS);
    }

    #[test]
    fn rejects_ticks_that_do_not_fit() {
        let mut config = GameConfig::new();
        let err = config
            .load_from_str("[simulation]\nticks = 4294967296\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "ticks", .. }));
        assert_eq!(config.ticks, DEFAULT_TICKS);

        config
            .load_from_str("[simulation]\nticks = 4294967295\n")
            .unwrap();
        assert_eq!(config.ticks, u32::MAX);
    }

    #[test]
    fn rejects_nan_and_infinite_delta() {
        for bad in ["nan", "NaN", "inf", "-0.5", "0"] {
            let mut config = GameConfig::new();
            let err = config
                .load_from_str(&format!("[simulation]\ndelta = {bad}\n"))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "delta", .. }),
                "delta = {bad} was accepted"
            );
            assert_eq!(config.delta, DEFAULT_DELTA);
        }
    }

    #[test]
    fn rejects_non_numeric_ticks() {
        let mut config = GameConfig::new();
        assert!(config.load_from_str("[simulation]\nticks = lots\n").is_err());
    }
}

//! Loading and validating `Tunables` from RON.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use ron::Options;
use thiserror::Error;

use super::tunables::{Tunables, WavePatternConfig};

/// Default location of the tunables file, relative to the working directory.
pub const TUNABLES_PATH: &str = "assets/config/tunables.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid tunables: {0}")]
    Invalid(String),
}

fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Parse and validate tunables from RON text. `origin` names the source in errors.
pub fn parse_tunables(text: &str, origin: &str) -> Result<Tunables, ConfigError> {
    let tunables: Tunables = ron_options().from_str(text).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })?;
    tunables.validate()?;
    Ok(tunables)
}

pub fn load_tunables(path: &Path) -> Result<Tunables, ConfigError> {
    let name = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: name.clone(),
        source,
    })?;
    parse_tunables(&text, &name)
}

/// Load the tunables file, falling back to defaults when it is missing or broken.
pub fn load_or_default(path: &Path) -> Tunables {
    match load_tunables(path) {
        Ok(tunables) => {
            info!("Loaded tunables from {}", path.display());
            tunables
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!("No tunables file at {}, using defaults", path.display());
            Tunables::default()
        }
        Err(err) => {
            warn!("{err}; using default tunables");
            Tunables::default()
        }
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn check_range(name: &str, (lo, hi): (f32, f32)) -> Result<(), ConfigError> {
    if lo > hi {
        return Err(invalid(format!("{name} range is inverted: ({lo}, {hi})")));
    }
    Ok(())
}

impl Tunables {
    /// Reject shapes that would make a wave impossible to spawn or complete.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pixels_per_meter <= 0.0 {
            return Err(invalid("pixels_per_meter must be positive"));
        }
        if self.waves.templates.is_empty() {
            return Err(invalid("at least one wave template is required"));
        }

        for (i, template) in self.waves.templates.iter().enumerate() {
            match template.pattern {
                WavePatternConfig::Formation { layers: 0, .. } => {
                    return Err(invalid(format!("wave template {i}: formation needs at least one layer")));
                }
                WavePatternConfig::Sinusoidal { count: 0, .. } | WavePatternConfig::Sideways { count: 0, .. } => {
                    return Err(invalid(format!("wave template {i}: count must be at least one")));
                }
                _ => {}
            }
            if template.start_delay < 0.0 {
                return Err(invalid(format!("wave template {i}: negative start delay")));
            }
        }

        if self.waves.height_variation < 0.0 {
            return Err(invalid("waves.height_variation cannot be negative"));
        }

        let field = &self.waves.asteroid_field;
        if !(1..=4).contains(&field.max) {
            return Err(invalid(format!("asteroid_field.max must be in 1..=4, got {}", field.max)));
        }
        if field.variants == 0 {
            return Err(invalid("asteroid_field.variants must be at least one"));
        }
        check_range("asteroid_field.x_range", field.x_range)?;
        check_range("asteroid_field.interval", field.interval)?;
        if field.interval.0 <= 0.0 {
            return Err(invalid("asteroid_field.interval must be strictly positive"));
        }

        check_range("enemy.fire_delay", self.enemy.fire_delay)?;
        if self.player.start_level < 0 {
            return Err(invalid("player.start_level cannot be negative"));
        }
        if self.boss.health <= 0 {
            return Err(invalid("boss.health must be positive"));
        }
        if self.boss.vulnerabilities.is_empty() {
            return Err(invalid("boss needs at least one vulnerability"));
        }
        Ok(())
    }
}

//! Highscores: one ranked list per difficulty, persisted as RON.
//!
//! Ranking is by score, highest first; equal scores keep the earlier run
//! ahead. The file is only read and written when a `HighscoreFile` resource is
//! present, so headless apps never touch the disk.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::tunables::Difficulty;

/// Default location of the highscores file, relative to the working directory.
pub const HIGHSCORES_PATH: &str = "highscores.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highscore {
    pub score: u64,
    pub time: DateTime<Utc>,
}

impl Highscore {
    pub fn new(score: u64, time: DateTime<Utc>) -> Self {
        Self { score, time }
    }
}

impl Ord for Highscore {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score.cmp(&self.score).then_with(|| self.time.cmp(&other.time))
    }
}

impl PartialOrd for Highscore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Highscores {
    normal: Vec<Highscore>,
    hard: Vec<Highscore>,
}

impl Highscores {
    /// Ranked entries for one difficulty.
    pub fn list(&self, difficulty: Difficulty) -> &[Highscore] {
        match difficulty {
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }

    /// Insert `entry` at its rank and return that rank (0 is best).
    pub fn record(&mut self, difficulty: Difficulty, entry: Highscore) -> usize {
        let list = match difficulty {
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        };
        let rank = list.partition_point(|e| *e <= entry);
        list.insert(rank, entry);
        rank
    }

    fn sort(&mut self) {
        self.normal.sort();
        self.hard.sort();
    }
}

/// Where highscores are persisted.
#[derive(Resource, Debug, Clone)]
pub struct HighscoreFile(pub PathBuf);

impl Default for HighscoreFile {
    fn default() -> Self {
        Self(PathBuf::from(HIGHSCORES_PATH))
    }
}

#[derive(Debug, Error)]
pub enum HighscoreError {
    #[error("failed to access {path}: {source}")]
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
    #[error("failed to serialize highscores: {0}")]
    Serialize(#[from] ron::Error),
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Highscores>().add_systems(Startup, load_on_startup);
}

/// Parse highscores from RON text; each difficulty keeps its own entries.
pub fn parse_highscores(text: &str, origin: &str) -> Result<Highscores, HighscoreError> {
    let mut scores: Highscores = ron::from_str(text).map_err(|source| HighscoreError::Parse {
        path: origin.to_string(),
        source,
    })?;
    scores.sort();
    Ok(scores)
}

pub fn load_highscores(path: &Path) -> Result<Highscores, HighscoreError> {
    let name = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|source| HighscoreError::Io {
        path: name.clone(),
        source,
    })?;
    parse_highscores(&text, &name)
}

/// Load the highscores file, starting empty when it is missing or broken.
pub fn load_or_empty(path: &Path) -> Highscores {
    match load_highscores(path) {
        Ok(scores) => scores,
        Err(HighscoreError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!("No highscores at {}", path.display());
            Highscores::default()
        }
        Err(err) => {
            warn!("{err}; starting with empty highscores");
            Highscores::default()
        }
    }
}

pub fn save_highscores(path: &Path, scores: &Highscores) -> Result<(), HighscoreError> {
    let text = ron::ser::to_string_pretty(scores, PrettyConfig::default())?;
    fs::write(path, text).map_err(|source| HighscoreError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn load_on_startup(file: Option<Res<HighscoreFile>>, mut scores: ResMut<Highscores>) {
    let Some(file) = file else {
        return;
    };
    *scores = load_or_empty(&file.0);
    info!(
        "Loaded {} normal and {} hard highscores",
        scores.list(Difficulty::Normal).len(),
        scores.list(Difficulty::Hard).len()
    );
}

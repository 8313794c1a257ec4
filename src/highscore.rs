//! High-score table persisted as plain `<name> <score>` lines.
//!
//! One entry per name (its best score), sorted descending, truncated to the
//! table capacity. Names cannot contain whitespace; anything after the first
//! whitespace run on a line is the score.
use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{GameError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScore {
    pub name: String,
    pub score: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreTable {
    entries: Vec<HighScore>,
    capacity: usize,
}

/// Names are stored without whitespace so the file stays parseable.
pub fn sanitize_name(name: &str) -> String {
    let joined: String = name.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "player".to_string()
    } else {
        joined
    }
}

impl HighScoreTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Parses file contents. Malformed lines are skipped with a warning.
    pub fn parse(text: &str, capacity: usize) -> Self {
        let mut table = Self::new(capacity);
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let parsed = match (parts.next(), parts.next(), parts.next()) {
                (Some(name), Some(score), None) => score.parse::<u64>().ok().map(|s| (name, s)),
                _ => None,
            };
            match parsed {
                Some((name, score)) => table.entries.push(HighScore {
                    name: name.to_string(),
                    score,
                }),
                None => warn!(line_no = number + 1, "skipping malformed high-score line: {line:?}"),
            }
        }
        table.normalize();
        table
    }

    /// A missing file is an empty table, not an error.
    pub fn load(path: &Path, capacity: usize) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text, capacity)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no high-score file at {}", path.display());
                Ok(Self::new(capacity))
            }
            Err(source) => Err(GameError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| GameError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.to_text()).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {}\n", e.name, e.score))
            .collect()
    }

    fn normalize(&mut self) {
        let mut best: HashMap<String, u64> = HashMap::new();
        for entry in self.entries.drain(..) {
            let slot = best.entry(entry.name).or_insert(0);
            *slot = (*slot).max(entry.score);
        }
        self.entries = best
            .into_iter()
            .map(|(name, score)| HighScore { name, score })
            .collect();
        self.entries
            .sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        self.entries.truncate(self.capacity);
    }

    /// Records a score. Returns its 0-based rank if it made the table.
    pub fn insert(&mut self, name: &str, score: u64) -> Option<usize> {
        let name = sanitize_name(name);
        self.entries.push(HighScore {
            name: name.clone(),
            score,
        });
        self.normalize();
        self.entries
            .iter()
            .position(|e| e.name == name && e.score == score)
    }

    /// Would `score` earn a place in the table?
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 || self.capacity == 0 {
            return false;
        }
        self.entries.len() < self.capacity || self.entries.last().is_some_and(|e| score > e.score)
    }

    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    pub fn best(&self) -> u64 {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//! Device-local learning progress
//!
//! One record per video holding the outcome of the latest quiz submission.
//! Records are advisory UI state: they are never synced to the shared store.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Config;
use crate::catalog::VideoId;

/// Storage key (and file stem) of the progress map
pub const STORAGE_KEY: &str = "learning_records";

/// Outcome of the latest quiz submission for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Number of correctly answered questions
    pub score: usize,
    /// Number of questions in the quiz
    pub total: usize,
    /// Whether every question was answered correctly
    pub passed: bool,
    /// When the quiz was graded
    pub date: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn new(score: usize, total: usize, date: DateTime<Utc>) -> Self {
        Self { score, total, passed: score == total, date }
    }
}

/// What the catalog shows for a video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    NotStarted,
    Complete,
    Scored { score: usize, total: usize },
}

impl ProgressStatus {
    pub fn of(record: Option<&ProgressRecord>) -> Self {
        match record {
            None => Self::NotStarted,
            Some(r) if r.passed => Self::Complete,
            Some(r) => Self::Scored { score: r.score, total: r.total },
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::Complete => f.write_str("complete"),
            Self::Scored { score, total } => write!(f, "score {}/{}", score, total),
        }
    }
}

/// All progress records on this device, keyed by video identifier
#[derive(Debug, Clone, Default)]
pub struct LearningRecords {
    records: BTreeMap<VideoId, ProgressRecord>,
    /// Backing file; `None` keeps records in memory only
    path: Option<PathBuf>,
}

impl LearningRecords {
    /// Load progress from the data directory, in memory only if there is none
    pub fn load() -> Self {
        match Self::records_path() {
            Ok(path) => Self::load_from(path),
            Err(e) => {
                tracing::warn!("progress will not be kept: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load progress from a specific file.
    ///
    /// A missing file means no progress yet. An unreadable or malformed file
    /// is logged and treated as empty; it stays on disk until the next save.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = if path.exists() {
            match Self::read_records(&path) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("ignoring progress in {:?}: {:#}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Self { records, path: Some(path) }
    }

    fn read_records(path: &Path) -> Result<BTreeMap<VideoId, ProgressRecord>> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read progress from {:?}", path))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}.json", STORAGE_KEY))
    }

    /// Save progress to its backing file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }

        let contents = serde_json::to_string_pretty(&self.records)
            .with_context(|| "Failed to serialize progress")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write progress to {:?}", path))?;

        Ok(())
    }

    fn records_path() -> Result<PathBuf> {
        Ok(Config::data_dir()?.join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a graded quiz, replacing any previous record for the video
    pub fn record(&mut self, video: &VideoId, record: ProgressRecord) -> &ProgressRecord {
        self.records.insert(video.clone(), record);
        &self.records[video]
    }

    pub fn get(&self, video: &VideoId) -> Option<&ProgressRecord> {
        self.records.get(video)
    }

    pub fn status(&self, video: &VideoId) -> ProgressStatus {
        ProgressStatus::of(self.get(video))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VideoId, &ProgressRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::DashboardStats;
use crate::dedup::{GroupingStats, TrackGroup};
use crate::error::{AppError, Result};
use crate::spotify::{ArtistInfo, TrackOccurrence};

/// A fetched library: every liked and playlist occurrence plus artist
/// details for genre lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub occurrences: Vec<TrackOccurrence>,
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
}

impl LibrarySnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::NotFound(path.display().to_string()));
        }

        let raw = fs::read_to_string(path)?;
        let snapshot: LibrarySnapshot = serde_json::from_str(&raw)?;

        if let Some(index) = snapshot
            .occurrences
            .iter()
            .position(|o| o.playlist().is_some_and(|p| p.id.is_empty()))
        {
            return Err(AppError::InvalidSnapshot(format!(
                "occurrence {} references a playlist without an id",
                index
            )));
        }

        if snapshot.occurrences.is_empty() {
            warn!("Snapshot {} contains no occurrences", path.display());
        }
        info!(
            "Loaded {} occurrences and {} artists from {}",
            snapshot.occurrences.len(),
            snapshot.artists.len(),
            path.display()
        );

        Ok(snapshot)
    }

    /// Artist details keyed by id. Later duplicates replace earlier ones.
    pub fn artist_lookup(&self) -> HashMap<String, ArtistInfo> {
        self.artists
            .iter()
            .map(|artist| (artist.id.clone(), artist.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub source: Option<String>,
    pub grouping: GroupingStats,
    pub dashboard: DashboardStats,
    pub groups: Vec<TrackGroup>,
}

impl AnalysisReport {
    pub fn new(
        source: Option<&Path>,
        grouping: GroupingStats,
        dashboard: DashboardStats,
        groups: Vec<TrackGroup>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.map(|p| p.display().to_string()),
            grouping,
            dashboard,
            groups,
        }
    }

    /// Writes the report as pretty JSON into `results_dir` and returns the file path.
    pub fn save(&self, results_dir: &Path) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");

        fs::create_dir_all(results_dir)?;

        let filename = results_dir.join(format!("analysis_{}.json", timestamp));
        let json = serde_json::to_string_pretty(self)?;

        fs::write(&filename, json)?;

        info!("Analysis report saved to: {}", filename.display());

        Ok(filename)
    }
}

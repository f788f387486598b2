use std::path::PathBuf;

use crate::error::{AppError, Result};

const DEFAULT_RESULTS_DIR: &str = "analysis_results";
const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot_path: Option<PathBuf>,
    pub results_dir: PathBuf,
    pub top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let snapshot_path = std::env::var("DEDUP_SNAPSHOT").ok().map(PathBuf::from);

        let results_dir = std::env::var("DEDUP_RESULTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_DIR));

        let top_n = match std::env::var("DEDUP_TOP_N") {
            Ok(raw) => parse_top_n(&raw)?,
            Err(_) => DEFAULT_TOP_N,
        };

        Ok(Self {
            snapshot_path,
            results_dir,
            top_n,
        })
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.snapshot_path.is_none() {
            missing.push("DEDUP_SNAPSHOT".to_string());
        }

        missing
    }

    /// Picks the CLI value when given, falling back to the environment.
    pub fn with_overrides(mut self, snapshot: Option<PathBuf>, top_n: Option<usize>) -> Self {
        if snapshot.is_some() {
            self.snapshot_path = snapshot;
        }
        if let Some(n) = top_n {
            self.top_n = n.max(1);
        }
        self
    }
}

fn parse_top_n(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::Config(format!(
            "DEDUP_TOP_N must be a positive integer, got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_n() {
        assert_eq!(parse_top_n("10").unwrap(), 10);
        assert_eq!(parse_top_n(" 3 ").unwrap(), 3);
        assert!(matches!(parse_top_n("0"), Err(AppError::Config(_))));
        assert!(matches!(parse_top_n("many"), Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_and_missing() {
        let config = Config::default();
        assert_eq!(config.get_missing_config(), vec!["DEDUP_SNAPSHOT".to_string()]);

        let config = config.with_overrides(Some(PathBuf::from("library.json")), Some(0));
        assert!(config.get_missing_config().is_empty());
        assert_eq!(config.top_n, 1);
        assert_eq!(config.results_dir, PathBuf::from("analysis_results"));
    }
}

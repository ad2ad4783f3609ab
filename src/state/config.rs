use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::git::{GitError, RefSelection};
use crate::graph::{ColorAssigner, Palette};

const CONFIG_DIR: &str = "lanegraph";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_size: (f32, f32),
    pub recent_repositories: Vec<PathBuf>,
    pub max_recent_repos: usize,
    pub graph: GraphSettings,
    pub refs: RefSettings,
    pub performance: PerformanceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub row_height: f32,
    pub buffer_rows: usize,
    pub lane_width: f32,
    pub node_radius: f32,
    pub lane_palette: Vec<String>,  // hex colors, empty = built-in
    pub label_palette: Vec<String>, // hex colors, empty = built-in
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefSettings {
    pub show_remote_branches: bool,
    pub show_tags: bool,
    /// Refresh when branches, tags or HEAD change on disk.
    pub watch_for_changes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub commit_batch_size: usize,
    pub max_commits_to_load: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_size: (1200.0, 800.0),
            recent_repositories: Vec::new(),
            max_recent_repos: 10,
            graph: GraphSettings::default(),
            refs: RefSettings::default(),
            performance: PerformanceSettings::default(),
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            row_height: 26.0,
            buffer_rows: 15,
            lane_width: 16.0,
            node_radius: 4.0,
            lane_palette: Vec::new(),
            label_palette: Vec::new(),
        }
    }
}

impl Default for RefSettings {
    fn default() -> Self {
        Self {
            show_remote_branches: false,
            show_tags: true,
            watch_for_changes: true,
        }
    }
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            commit_batch_size: 500,
            max_commits_to_load: 10_000,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from the user config directory, falling back to defaults.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Using default settings, could not load {:?}: {}", path, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, GitError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn save(&self) -> Result<(), GitError> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => {
                warn!("No config directory available, settings not saved");
                Ok(())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), GitError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GitError> {
        if !(self.graph.row_height > 0.0) {
            return Err(GitError::configuration("graph.row_height", "must be positive"));
        }
        if !(self.graph.lane_width > 0.0) {
            return Err(GitError::configuration("graph.lane_width", "must be positive"));
        }
        if self.performance.commit_batch_size == 0 {
            return Err(GitError::configuration(
                "performance.commit_batch_size",
                "must be at least 1",
            ));
        }
        self.color_assigner()?;
        Ok(())
    }

    /// Colors from the configured palettes, built-in ones where unset.
    pub fn color_assigner(&self) -> Result<ColorAssigner, GitError> {
        let lanes = Palette::from_hex("graph.lane_palette", &self.graph.lane_palette)?
            .unwrap_or_else(Palette::lanes);
        let labels = Palette::from_hex("graph.label_palette", &self.graph.label_palette)?
            .unwrap_or_else(Palette::labels);
        Ok(ColorAssigner::new(lanes, labels))
    }

    pub fn ref_selection(&self) -> RefSelection {
        RefSelection {
            remote_branches: self.refs.show_remote_branches,
            tags: self.refs.show_tags,
        }
    }

    pub fn add_recent_repository(&mut self, path: PathBuf) {
        self.recent_repositories.retain(|p| p != &path);
        self.recent_repositories.insert(0, path);
        self.recent_repositories.truncate(self.max_recent_repos);
    }

    pub fn remove_recent_repository(&mut self, path: &Path) {
        self.recent_repositories.retain(|p| p != path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.graph.row_height, 26.0);
        assert_eq!(config.graph.buffer_rows, 15);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.graph.buffer_rows = 4;
        config.refs.show_remote_branches = true;
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"graph":{"row_height":30.0}}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.graph.row_height, 30.0);
        assert_eq!(config.graph.buffer_rows, 15);
        assert_eq!(config.performance, PerformanceSettings::default());
        assert!(config.refs.watch_for_changes);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut config = AppConfig::default();
        config.graph.row_height = 0.0;
        assert!(matches!(
            config.validate(),
            Err(GitError::Configuration { .. })
        ));

        let mut config = AppConfig::default();
        config.graph.lane_palette = vec!["not-a-color".to_string()];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.performance.commit_batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_recent_repositories_are_deduplicated_and_capped() {
        let mut config = AppConfig::default();
        config.max_recent_repos = 2;
        config.add_recent_repository(PathBuf::from("/a"));
        config.add_recent_repository(PathBuf::from("/b"));
        config.add_recent_repository(PathBuf::from("/a"));
        config.add_recent_repository(PathBuf::from("/c"));

        assert_eq!(
            config.recent_repositories,
            vec![PathBuf::from("/c"), PathBuf::from("/a")]
        );
    }
}

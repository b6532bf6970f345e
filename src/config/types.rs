use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::wait::{Readiness, WaitOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compose_file: String,
    pub docker_binary: String,
    pub retries: u32,
    pub poll_interval_ms: u64,
    pub readiness: Readiness,
    pub services: Vec<String>,
    pub search_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compose_file: "docker-compose.yml".to_string(),
            docker_binary: "docker".to_string(),
            retries: 10,
            poll_interval_ms: 500,
            readiness: Readiness::Running,
            services: Vec::new(),
            search_depth: 4,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new(self.retries, self.poll_interval()).with_readiness(self.readiness)
    }

    /// The compose file resolved against `root` unless already absolute.
    pub fn compose_path(&self, root: &Path) -> PathBuf {
        let path = PathBuf::from(&self.compose_file);
        if path.is_absolute() {
            path
        } else {
            root.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wait_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.wait_options(), WaitOptions::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg: Config =
            serde_yaml::from_str("retries: 60\nreadiness: healthy\nservices: [db, cache]\n")
                .unwrap();
        assert_eq!(cfg.retries, 60);
        assert_eq!(cfg.readiness, Readiness::Healthy);
        assert_eq!(cfg.services, vec!["db", "cache"]);
        assert_eq!(cfg.compose_file, "docker-compose.yml");
        assert_eq!(cfg.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn compose_path_joins_relative_names() {
        let cfg = Config {
            compose_file: "deploy/compose.yaml".into(),
            ..Config::default()
        };
        assert_eq!(
            cfg.compose_path(Path::new("/repo")),
            PathBuf::from("/repo/deploy/compose.yaml")
        );
    }

    #[cfg(unix)]
    #[test]
    fn compose_path_keeps_absolute_names() {
        let cfg = Config {
            compose_file: "/etc/stack/compose.yaml".into(),
            ..Config::default()
        };
        assert_eq!(
            cfg.compose_path(Path::new("/repo")),
            PathBuf::from("/etc/stack/compose.yaml")
        );
    }
}

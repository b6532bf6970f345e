use std::path::Path;

use anyhow::{Context, Result};

use super::Config;

pub const CONFIG_FILE: &str = ".stackwait.yaml";

/// Load `.stackwait.yaml` from `dir`, falling back to defaults when absent.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "compose_file: compose.yaml\npoll_interval_ms: 50\n",
        )
        .unwrap();

        let cfg = load(dir.path()).unwrap();
        assert_eq!(cfg.compose_file, "compose.yaml");
        assert_eq!(cfg.poll_interval_ms, 50);
        assert_eq!(cfg.retries, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "retries: [not, a, number]\n").unwrap();

        let err = load(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config"));
    }
}

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, SetupError};

use super::Config;

const COMPOSE_FILE_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Nearest ancestor of `start` (inclusive) that contains a `.git` entry.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Absolute path of `name` in the root of the project containing the
/// current directory.
pub fn root_config_path(name: &str) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    root_config_path_from(&cwd, name)
}

/// As [`root_config_path`], starting from `start`. Outside any project the
/// search falls back to `start` itself.
pub fn root_config_path_from(start: &Path, name: &str) -> Result<PathBuf> {
    let root = find_project_root(start).unwrap_or_else(|| start.to_path_buf());
    let path = root.join(name);
    if !path.is_file() {
        return Err(SetupError::ConfigNotFound {
            name: name.to_string(),
            root,
        });
    }
    Ok(path)
}

/// The configured compose file under `root`, or else the first compose
/// file found within `config.search_depth` levels.
pub fn locate_compose_file(root: &Path, config: &Config) -> Result<PathBuf> {
    let configured = config.compose_path(root);
    if configured.is_file() {
        return Ok(configured);
    }
    discover_compose_files(root, config.search_depth)
        .into_iter()
        .next()
        .map(|rel| root.join(rel))
        .ok_or_else(|| SetupError::ConfigNotFound {
            name: config.compose_file.clone(),
            root: root.to_path_buf(),
        })
}

/// Walk the tree below `root` for compose files.
/// Returns a sorted list of relative paths.
pub fn discover_compose_files(root: &Path, max_depth: usize) -> Vec<String> {
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_skip(e));

    let mut matches: Vec<String> = walker
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| COMPOSE_FILE_NAMES.contains(&name))
        })
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(|rel| rel.to_string_lossy().to_string())
        })
        .collect();

    matches.sort();
    matches
}

fn should_skip(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    matches!(
        entry.file_name().to_str().unwrap_or_default(),
        ".git" | "target" | "node_modules" | ".idea" | ".vscode"
    )
}

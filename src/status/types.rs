use serde::{Deserialize, Serialize};

/// A published port of a running unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Publisher {
    #[serde(rename = "URL")]
    pub url: String,
    pub target_port: u16,
    pub published_port: u16,
    pub protocol: String,
}

/// One unit as reported by `docker compose ps --format=json`.
///
/// `service` is the key under `services:` in the compose file, not the
/// generated container `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceStatus {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub command: String,
    pub project: String,
    pub service: String,
    pub state: String,
    pub health: String,
    /// Only meaningful once `state` is terminal.
    pub exit_code: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub publishers: Vec<Publisher>,
}

impl ServiceStatus {
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }

    /// First published host port for the given container port, if any.
    pub fn published_port(&self, target_port: u16) -> Option<u16> {
        self.publishers
            .iter()
            .find(|p| p.target_port == target_port && p.published_port != 0)
            .map(|p| p.published_port)
    }
}

// `Publishers` comes back as `null` for units with nothing published.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Publisher>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Publisher>>::deserialize(deserializer)?.unwrap_or_default())
}

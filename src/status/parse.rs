use crate::error::{Result, SetupError};

use super::ServiceStatus;

/// Parse `docker compose ps --format=json` output into status records.
///
/// Older compose releases print one JSON array; newer ones print one object
/// per line:
/// ```text
/// {"ID":"a1b2","Service":"db","State":"running","ExitCode":0,...}
/// {"ID":"c3d4","Service":"cache","State":"running","ExitCode":0,...}
/// ```
/// Blank output means no units exist.
pub fn parse_listing(raw: &[u8]) -> Result<Vec<ServiceStatus>> {
    let text = std::str::from_utf8(raw).map_err(|e| SetupError::Parse {
        reason: format!("output is not UTF-8: {e}"),
    })?;
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| SetupError::Parse {
            reason: e.to_string(),
        });
    }

    trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| SetupError::Parse {
                reason: format!("record {}: {e}", idx + 1),
            })
        })
        .collect()
}

/// First record whose service key equals `service`.
pub fn find_service<'a>(units: &'a [ServiceStatus], service: &str) -> Option<&'a ServiceStatus> {
    units.iter().find(|unit| unit.service == service)
}

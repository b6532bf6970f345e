// Service status records decoded from `docker compose ps --format=json`.
mod parse;
mod types;

pub use parse::{find_service, parse_listing};
pub use types::{Publisher, ServiceStatus};

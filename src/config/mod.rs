mod discovery;
mod loader;
mod types;

pub use discovery::{
    discover_compose_files, find_project_root, locate_compose_file, root_config_path,
    root_config_path_from,
};
pub use loader::{CONFIG_FILE, load};
pub use types::Config;

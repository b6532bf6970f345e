// Docker compose invocation and cooperative cancellation.

pub mod run;
pub mod types;

pub use run::{ComposeRunner, DockerCompose, ensure_available};
pub use types::CancelToken;

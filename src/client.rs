use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::{self, Config};
use crate::docker::{CancelToken, ComposeRunner, DockerCompose};
use crate::error::{Result, SetupError};
use crate::status::{self, ServiceStatus};
use crate::wait::{self, ManyHandle, StatusProbe, WaitHandle, WaitOptions};

/// Extra flags for tearing a stack down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownOptions {
    /// `--rmi=all`
    pub remove_images: bool,
    /// `--volumes`
    pub volumes: bool,
}

impl DownOptions {
    fn command(&self) -> String {
        let mut command = String::from("down");
        if self.remove_images {
            command.push_str(" --rmi=all");
        }
        if self.volumes {
            command.push_str(" --volumes");
        }
        command
    }
}

/// Drives one compose stack.
///
/// Service names are the keys under `services:` in the compose file, not
/// the generated container names.
#[derive(Clone)]
pub struct ComposeClient {
    compose_file: PathBuf,
    runner: Arc<dyn ComposeRunner>,
}

impl std::fmt::Debug for ComposeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeClient")
            .field("compose_file", &self.compose_file)
            .finish_non_exhaustive()
    }
}

impl ComposeClient {
    /// Client for `compose_file` using the `docker` binary on PATH.
    pub fn new(compose_file: impl Into<PathBuf>) -> Self {
        Self::with_runner(compose_file, DockerCompose::default())
    }

    pub fn with_runner(compose_file: impl Into<PathBuf>, runner: impl ComposeRunner + 'static) -> Self {
        Self {
            compose_file: compose_file.into(),
            runner: Arc::new(runner),
        }
    }

    /// Client for the compose file named in `config`, relative to `root`.
    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::with_runner(
            config.compose_path(root),
            DockerCompose::new(&config.docker_binary),
        )
    }

    /// Like [`ComposeClient::from_config`], but falls back to the first
    /// compose file found within `config.search_depth` levels of `root`
    /// when the configured one does not exist.
    pub fn discover(root: &Path, config: &Config) -> Result<Self> {
        let path = config::locate_compose_file(root, config)?;
        Ok(Self::with_runner(path, DockerCompose::new(&config.docker_binary)))
    }

    pub fn compose_file(&self) -> &Path {
        &self.compose_file
    }

    fn run(&self, command: &str) -> Result<Vec<u8>> {
        self.runner.run(&self.compose_file, command)
    }

    /// Start the stack detached. Does not wait for readiness; use
    /// [`ComposeClient::wait`] or [`ComposeClient::wait_many`].
    #[instrument(skip(self), fields(file = %self.compose_file.display()))]
    pub fn up(&self) -> Result<()> {
        self.run("up -d")?;
        info!("stack started");
        Ok(())
    }

    /// Stop one service. Fails with [`SetupError::ServiceNotFound`] before
    /// issuing the stop if the service is not listed.
    #[instrument(skip(self), fields(file = %self.compose_file.display()))]
    pub fn stop(&self, service: &str) -> Result<()> {
        self.find_container(service)?;
        self.run(&format!("stop {}", shell_words::quote(service)))?;
        info!("service stopped");
        Ok(())
    }

    pub fn down(&self) -> Result<()> {
        self.down_with(DownOptions::default())
    }

    #[instrument(skip(self), fields(file = %self.compose_file.display()))]
    pub fn down_with(&self, options: DownOptions) -> Result<()> {
        self.run(&options.command())?;
        info!("stack down");
        Ok(())
    }

    /// Every unit currently listed by `ps`.
    pub fn list(&self) -> Result<Vec<ServiceStatus>> {
        let out = self.run("ps --format=json")?;
        status::parse_listing(&out)
    }

    /// Current status of the unit whose service key is `service`.
    pub fn find_container(&self, service: &str) -> Result<ServiceStatus> {
        let units = self.list()?;
        debug!(service, units = units.len(), "scanned status listing");
        status::find_service(&units, service)
            .cloned()
            .ok_or_else(|| SetupError::ServiceNotFound {
                service: service.to_string(),
            })
    }

    /// Poll `service` in the background until it is ready.
    pub fn wait(&self, service: &str, options: WaitOptions, cancel: CancelToken) -> WaitHandle {
        wait::wait(Arc::new(self.clone()), service, options, cancel)
    }

    /// Poll every service in `services` in the background until all are
    /// ready or one fails.
    pub fn wait_many<S: AsRef<str>>(
        &self,
        services: &[S],
        options: WaitOptions,
        cancel: CancelToken,
    ) -> ManyHandle {
        wait::wait_many(Arc::new(self.clone()), services, options, cancel)
    }

    /// Wait for the configured default service set with the configured
    /// retry budget and readiness policy.
    pub fn wait_configured(&self, config: &Config, cancel: CancelToken) -> ManyHandle {
        self.wait_many(config.services.as_slice(), config.wait_options(), cancel)
    }
}

impl StatusProbe for ComposeClient {
    fn find_status(&self, service: &str) -> Result<ServiceStatus> {
        self.find_container(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every command and answers `ps` with a fixed listing.
    #[derive(Clone)]
    struct Recorder {
        listing: &'static str,
        fail_on: Option<&'static str>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn new(listing: &'static str) -> Self {
            Self {
                listing,
                fail_on: None,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ComposeRunner for Recorder {
        fn run(&self, compose_file: &Path, command: &str) -> Result<Vec<u8>> {
            assert_eq!(compose_file, Path::new("/repo/docker-compose.yml"));
            self.calls.lock().unwrap().push(command.to_string());
            if self.fail_on.is_some_and(|prefix| command.starts_with(prefix)) {
                return Err(SetupError::Execution {
                    command: command.to_string(),
                    reason: "exit status: 1".into(),
                });
            }
            if command.starts_with("ps") {
                return Ok(self.listing.as_bytes().to_vec());
            }
            Ok(Vec::new())
        }
    }

    const LISTING: &str = r#"[
        {"ID": "1", "Name": "setup-db-1", "Service": "db", "State": "running", "ExitCode": 0},
        {"ID": "2", "Name": "setup-cache-1", "Service": "cache", "State": "created", "ExitCode": 0}
    ]"#;

    fn client(runner: &Recorder) -> ComposeClient {
        ComposeClient::with_runner("/repo/docker-compose.yml", runner.clone())
    }

    #[test]
    fn up_starts_detached() {
        let runner = Recorder::new(LISTING);
        client(&runner).up().unwrap();
        assert_eq!(runner.calls(), vec!["up -d"]);
    }

    #[test]
    fn stop_checks_existence_first() {
        let runner = Recorder::new(LISTING);
        client(&runner).stop("db").unwrap();
        assert_eq!(runner.calls(), vec!["ps --format=json", "stop db"]);
    }

    #[test]
    fn stop_unknown_service_never_issues_stop() {
        let runner = Recorder::new(LISTING);
        let err = client(&runner).stop("ghost").unwrap_err();
        assert!(matches!(err, SetupError::ServiceNotFound { ref service } if service == "ghost"));
        assert_eq!(runner.calls(), vec!["ps --format=json"]);
    }

    #[test]
    fn down_variants() {
        let runner = Recorder::new(LISTING);
        let c = client(&runner);
        c.down().unwrap();
        c.down_with(DownOptions {
            remove_images: true,
            volumes: true,
        })
        .unwrap();
        assert_eq!(runner.calls(), vec!["down", "down --rmi=all --volumes"]);
    }

    #[test]
    fn lifecycle_errors_surface_immediately() {
        let runner = Recorder {
            fail_on: Some("up"),
            ..Recorder::new(LISTING)
        };
        let err = client(&runner).up().unwrap_err();
        match err {
            SetupError::Execution { command, .. } => assert_eq!(command, "up -d"),
            other => panic!("expected Execution, got: {other:?}"),
        }
    }

    #[test]
    fn find_container_matches_service_key() {
        let runner = Recorder::new(LISTING);
        let status = client(&runner).find_container("db").unwrap();
        assert_eq!(status.name, "setup-db-1");
    }

    #[test]
    fn find_container_missing_is_not_found_not_default() {
        let runner = Recorder::new(LISTING);
        let err = client(&runner).find_container("web").unwrap_err();
        assert!(matches!(err, SetupError::ServiceNotFound { .. }));
    }

    #[test]
    fn find_container_is_idempotent_on_unchanged_stack() {
        let runner = Recorder::new(LISTING);
        let c = client(&runner);
        assert_eq!(c.find_container("cache").unwrap(), c.find_container("cache").unwrap());
    }

    #[test]
    fn discovery_errors_propagate_from_find_container() {
        let runner = Recorder {
            fail_on: Some("ps"),
            ..Recorder::new(LISTING)
        };
        let err = client(&runner).find_container("db").unwrap_err();
        assert!(matches!(err, SetupError::Execution { .. }));
    }

    #[test]
    fn wait_many_through_client() {
        let runner = Recorder::new(LISTING);
        let c = client(&runner);
        let opts = WaitOptions::new(3, Duration::from_millis(5));

        assert!(c.wait("db", opts, CancelToken::new()).recv().is_ok());

        // "cache" is listed but only created, so the group times out on it.
        let err = c
            .wait_many(&["db", "cache"], opts, CancelToken::new())
            .recv()
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.service(), Some("cache"));
    }

    #[test]
    fn wait_configured_uses_config_services_and_budget() {
        let runner = Recorder::new(LISTING);
        let c = client(&runner);

        let ready = Config {
            services: vec!["db".into()],
            retries: 2,
            poll_interval_ms: 5,
            ..Config::default()
        };
        assert!(c.wait_configured(&ready, CancelToken::new()).recv().is_ok());

        let stuck = Config {
            services: vec!["db".into(), "cache".into()],
            retries: 2,
            poll_interval_ms: 5,
            ..Config::default()
        };
        let handle = c.wait_configured(&stuck, CancelToken::new());
        assert_eq!(handle.services(), ["db".to_string(), "cache".to_string()]);
        match handle.recv().unwrap_err() {
            SetupError::Timeout {
                service, attempts, ..
            } => {
                assert_eq!(service, "cache");
                assert_eq!(attempts, 2);
            }
            other => panic!("expected Timeout, got: {other:?}"),
        }
    }

    #[test]
    fn discover_finds_nested_compose_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("integration");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("compose.yaml"), "services: {}\n").unwrap();

        let c = ComposeClient::discover(dir.path(), &Config::default()).unwrap();
        assert_eq!(c.compose_file(), nested.join("compose.yaml"));

        let empty = tempfile::tempdir().unwrap();
        let err = ComposeClient::discover(empty.path(), &Config::default()).unwrap_err();
        assert!(matches!(err, SetupError::ConfigNotFound { .. }));
    }

    #[test]
    fn from_config_resolves_compose_path() {
        let cfg = Config {
            compose_file: "compose.yaml".into(),
            ..Config::default()
        };
        let c = ComposeClient::from_config(Path::new("/repo"), &cfg);
        assert_eq!(c.compose_file(), Path::new("/repo/compose.yaml"));
    }
}

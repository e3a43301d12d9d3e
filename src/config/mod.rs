// src/config/mod.rs
// Server configuration - resolved once from CLI flags and environment

use std::path::PathBuf;

use tracing::debug;

/// Bucket holding the DAM asset files
pub const DEFAULT_BUCKET: &str = "owndays-dam.firebasestorage.app";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

/// Env var naming a local Firestore emulator (`host:port`)
pub const FIRESTORE_EMULATOR_ENV: &str = "FIRESTORE_EMULATOR_HOST";
/// Env var naming a local Storage emulator (`host:port` or a full URL)
pub const STORAGE_EMULATOR_ENV: &str = "STORAGE_EMULATOR_HOST";

/// How the MCP server talks to its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

/// Local emulator endpoints picked up from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmulatorHosts {
    pub firestore: Option<String>,
    pub storage: Option<String>,
}

impl EmulatorHosts {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve emulator hosts through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let hosts = Self {
            firestore: read(FIRESTORE_EMULATOR_ENV),
            storage: read(STORAGE_EMULATOR_ENV),
        };
        if hosts.firestore.is_some() || hosts.storage.is_some() {
            debug!(firestore = ?hosts.firestore, storage = ?hosts.storage, "Emulator hosts configured");
        }
        hosts
    }

    /// Firestore REST root for the emulator, if one is configured
    pub fn firestore_base_url(&self) -> Option<String> {
        self.firestore.as_deref().map(|host| format!("{}/v1", with_scheme(host)))
    }

    /// Storage JSON API root for the emulator, if one is configured
    pub fn storage_base_url(&self) -> Option<String> {
        self.storage.as_deref().map(|host| format!("{}/storage/v1", with_scheme(host)))
    }
}

fn with_scheme(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the service account JSON key
    pub credentials: PathBuf,
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub bucket: String,
    /// Overrides the project in the credentials file
    pub project_id: Option<String>,
    pub debug: bool,
    pub emulators: EmulatorHosts,
}

impl ServerConfig {
    pub fn new(credentials: impl Into<PathBuf>) -> Self {
        Self {
            credentials: credentials.into(),
            transport: Transport::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bucket: DEFAULT_BUCKET.to_string(),
            project_id: None,
            debug: false,
            emulators: EmulatorHosts::default(),
        }
    }

    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check the configuration before anything touches the network
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if !self.credentials.exists() {
            validation.add_error(format!(
                "Credentials file not found: {}",
                self.credentials.display()
            ));
        } else if !self.credentials.is_file() {
            validation.add_error(format!(
                "Credentials path is not a file: {}",
                self.credentials.display()
            ));
        }

        if self.bucket.trim().is_empty() {
            validation.add_error("Storage bucket name is empty");
        }

        if let Some(ref project) = self.project_id
            && project.trim().is_empty()
        {
            validation.add_error("Project id override is empty");
        }

        if self.transport == Transport::Http {
            if self.port == 0 {
                validation.add_error("HTTP transport needs a non-zero --port");
            }
            if self.host.trim().is_empty() {
                validation.add_error("HTTP transport needs a --host");
            }
        }

        if self.emulators.firestore.is_some() {
            validation.add_warning(format!(
                "{} is set - Firestore queries go to the emulator",
                FIRESTORE_EMULATOR_ENV
            ));
        }
        if self.emulators.storage.is_some() {
            validation.add_warning(format!(
                "{} is set - bucket listings go to the emulator",
                STORAGE_EMULATOR_ENV
            ));
        }

        let emulator_urls = [
            (FIRESTORE_EMULATOR_ENV, self.emulators.firestore_base_url()),
            (STORAGE_EMULATOR_ENV, self.emulators.storage_base_url()),
        ];
        for (name, base_url) in emulator_urls {
            if let Some(base_url) = base_url
                && let Err(e) = url::Url::parse(&base_url)
            {
                validation.add_error(format!("{} is not a usable host ({}): {}", name, e, base_url));
            }
        }

        validation
    }
}

/// Result of [`ServerConfig::validate`]
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn creds_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new("/tmp/creds.json");
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.bind_address(), "localhost:8000");
        assert_eq!(config.bucket, DEFAULT_BUCKET);
        assert!(config.project_id.is_none());
    }

    #[test]
    fn test_valid_config() {
        let file = creds_file();
        let validation = ServerConfig::new(file.path()).validate();
        assert!(validation.is_valid());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_missing_credentials() {
        let validation = ServerConfig::new("/nonexistent/creds.json").validate();
        assert!(!validation.is_valid());
        assert!(validation.errors[0].contains("not found"));
    }

    #[test]
    fn test_credentials_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let validation = ServerConfig::new(dir.path()).validate();
        assert!(!validation.is_valid());
        assert!(validation.errors[0].contains("not a file"));
    }

    #[test]
    fn test_http_port_zero_rejected() {
        let file = creds_file();
        let mut config = ServerConfig::new(file.path());
        config.transport = Transport::Http;
        config.port = 0;
        assert!(!config.validate().is_valid());

        // stdio never binds, so the port is irrelevant there
        config.transport = Transport::Stdio;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_emulators_warn() {
        let file = creds_file();
        let mut config = ServerConfig::new(file.path());
        config.emulators.firestore = Some("localhost:8080".into());
        let validation = config.validate();
        assert!(validation.is_valid());
        assert_eq!(validation.warnings.len(), 1);
        assert!(validation.warnings[0].contains(FIRESTORE_EMULATOR_ENV));
    }

    #[test]
    fn test_unparsable_emulator_host() {
        let file = creds_file();
        let mut config = ServerConfig::new(file.path());
        config.emulators.storage = Some("bad host:9199".into());
        let validation = config.validate();
        assert!(!validation.is_valid());
        assert!(validation.errors[0].contains(STORAGE_EMULATOR_ENV));
    }

    #[test]
    fn test_emulator_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (FIRESTORE_EMULATOR_ENV, "localhost:8080"),
            (STORAGE_EMULATOR_ENV, "http://127.0.0.1:9199/"),
        ]);
        let hosts = EmulatorHosts::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(hosts.firestore_base_url().as_deref(), Some("http://localhost:8080/v1"));
        assert_eq!(
            hosts.storage_base_url().as_deref(),
            Some("http://127.0.0.1:9199/storage/v1")
        );
    }

    #[test]
    fn test_blank_emulator_vars_ignored() {
        let hosts = EmulatorHosts::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(hosts, EmulatorHosts::default());
        assert!(hosts.firestore_base_url().is_none());
    }
}

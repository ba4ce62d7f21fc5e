use folio_content::AdminCredentials;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the durable content records
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// The single administrator account
    #[serde(default = "default_admin")]
    pub admin: AdminCredentials,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// How often `serve` re-reads storage for saves made elsewhere
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_storage_dir() -> String {
    ".folio".to_string()
}

// No password digest matches, so nobody can sign in until `folio init`
fn default_admin() -> AdminCredentials {
    AdminCredentials {
        email: "admin@localhost".to_string(),
        password_sha256: String::new(),
    }
}

fn default_http_port() -> u16 {
    3030
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the storage directory
    pub fn get_storage_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.storage_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            admin: default_admin(),
            http_port: default_http_port(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "storageDir": "content",
            "admin": { "email": "me@site.dev", "passwordSha256": "abc123" },
            "httpPort": 8080,
            "pollIntervalSecs": 30
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage_dir, "content");
        assert_eq!(config.admin.email, "me@site.dev");
        assert_eq!(config.admin.password_sha256, "abc123");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "httpPort": 9000 }"#).unwrap();
        assert_eq!(config.storage_dir, ".folio");
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.poll_interval_secs, 5);
    }

    #[test]
    fn test_default_admin_cannot_sign_in() {
        let config = Config::default();
        assert!(!config.admin.matches("admin@localhost", ""));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.storage_dir, ".folio");
        assert_eq!(config.get_storage_dir("/site"), PathBuf::from("/site/.folio"));
    }
}

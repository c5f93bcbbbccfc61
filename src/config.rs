//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative backend settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-call and per-request time budgets.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// AWS client settings.
    #[serde(default)]
    pub aws: AwsConfig,
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:8080".to_string() }
    }
}

/// Generative backend settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Name of the deployed inference endpoint.
    pub endpoint: String,
    /// Number of denoising steps.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "instantid-endpoint".to_string(),
            steps: 30,
            guidance_scale: 7.5,
            width: 1024,
            height: 1024,
        }
    }
}

/// Object storage settings.
#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Bucket generated images are written to.
    pub bucket: Option<String>,
}

/// Time budgets, in seconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Whole-request deadline.
    pub request: u64,
    /// Single image fetch.
    pub fetch: u64,
    /// Single vision analysis call.
    pub analyze: u64,
    /// Single generation call.
    pub generate: u64,
    /// Single storage write or URL mint.
    pub publish: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self { request: 60, fetch: 10, analyze: 10, generate: 45, publish: 15 }
    }
}

/// AWS client settings.
#[derive(Debug, Default, Deserialize)]
pub struct AwsConfig {
    /// Region override; the default provider chain is used when absent.
    pub region: Option<String>,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the bind address, preferring environment variable.
    #[must_use]
    pub fn bind_address(&self) -> String {
        std::env::var("COMPOSITOR_BIND").unwrap_or_else(|_| self.server.bind.clone())
    }

    /// Get the inference endpoint name, preferring environment variable.
    #[must_use]
    pub fn endpoint_name(&self) -> String {
        std::env::var("COMPOSITOR_ENDPOINT").unwrap_or_else(|_| self.generation.endpoint.clone())
    }

    /// Get the storage bucket, preferring environment variable.
    #[must_use]
    pub fn storage_bucket(&self) -> Option<String> {
        std::env::var("COMPOSITOR_BUCKET")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .or_else(|| self.storage.bucket.clone())
    }
}

impl TimeoutsConfig {
    /// Whole-request deadline.
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request)
    }

    /// Budget for one image fetch.
    #[must_use]
    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch)
    }

    /// Budget for one vision call.
    #[must_use]
    pub fn analyze(&self) -> Duration {
        Duration::from_secs(self.analyze)
    }

    /// Budget for one generation call.
    #[must_use]
    pub fn generate(&self) -> Duration {
        Duration::from_secs(self.generate)
    }

    /// Budget for one storage call.
    #[must_use]
    pub fn publish(&self) -> Duration {
        Duration::from_secs(self.publish)
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `COMPOSITOR_CONFIG` environment variable
/// 3. `~/.config/compositor/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("COMPOSITOR_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/compositor/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/compositor/config.toml")
    } else {
        PathBuf::from("compositor.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.generation.endpoint, "instantid-endpoint");
        assert_eq!(config.generation.steps, 30);
        assert!((config.generation.guidance_scale - 7.5).abs() < f32::EPSILON);
        assert_eq!(config.generation.width, 1024);
        assert_eq!(config.generation.height, 1024);
        assert!(config.storage.bucket.is_none());
        assert_eq!(config.timeouts.request(), Duration::from_secs(60));
        assert_eq!(config.timeouts.fetch(), Duration::from_secs(10));
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let config = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.generation.endpoint, "instantid-endpoint");
    }

    #[test]
    fn load_valid_toml() {
        let dir = std::env::temp_dir().join("compositor_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind = "127.0.0.1:9000"

[generation]
endpoint = "sdxl-v2"
steps = 40

[storage]
bucket = "composites"

[timeouts]
generate = 90

[aws]
region = "eu-west-1"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.generation.endpoint, "sdxl-v2");
        assert_eq!(config.generation.steps, 40);
        // Unset keys in a present section keep their defaults
        assert_eq!(config.generation.width, 1024);
        assert_eq!(config.storage.bucket.as_deref(), Some("composites"));
        assert_eq!(config.timeouts.generate(), Duration::from_secs(90));
        assert_eq!(config.timeouts.publish(), Duration::from_secs(15));
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_invalid_toml() {
        let dir = std::env::temp_dir().join("compositor_config_bad_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        assert!(Config::load(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bucket_falls_back_to_file_value() {
        let config = Config {
            storage: StorageConfig { bucket: Some("from-file".into()) },
            ..Config::default()
        };

        std::env::remove_var("COMPOSITOR_BUCKET");
        assert_eq!(config.storage_bucket().as_deref(), Some("from-file"));
    }

    #[test]
    fn discover_explicit_path() {
        let path = discover_config_path(Some("/tmp/my-config.toml"));
        assert_eq!(path, PathBuf::from("/tmp/my-config.toml"));
    }
}

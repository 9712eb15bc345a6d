//! Client configuration.
//!
//! Layers, lowest first: built-in defaults, a TOML file, the environment,
//! then command-line flags (applied by the binary).
//!
//! ```toml
//! server_url = "http://127.0.0.1:5000"
//! weight_text = 0.5
//! report_dir = "similarity-reports"
//! request_timeout_secs = 30
//! mathjax = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CompareError;

pub const CONFIG_PATH_ENV: &str = "PDF_SIMILARITY_CONFIG";
pub const SERVER_URL_ENV: &str = "PDF_SIMILARITY_SERVER";
pub const DEFAULT_CONFIG_FILE: &str = "pdf-similarity.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root URL of the comparison service.
    pub server_url: String,
    /// Initial slider position, in [0, 1].
    pub weight_text: f64,
    /// Where HTML reports are written when no explicit path is given.
    pub report_dir: PathBuf,
    /// Whole-request timeout. No timeout when unset.
    pub request_timeout_secs: Option<u64>,
    /// Load MathJax in reports that contain math segments.
    pub mathjax: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: "http://127.0.0.1:5000".to_string(),
            weight_text: crate::view::DEFAULT_WEIGHT,
            report_dir: PathBuf::from("similarity-reports"),
            request_timeout_secs: None,
            mathjax: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, CompareError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CompareError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompareError::io(format!("reading config {}", path.display()), e))?;
        Self::from_toml_str(&content)
    }

    /// Defaults, then the first config file found, then the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CompareError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a caller-supplied environment lookup.
    pub fn load_with(
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CompareError> {
        let mut config = match locate(explicit, &env) {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            None => Config::default(),
        };
        config.apply_env(&env);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(SERVER_URL_ENV).filter(|u| !u.trim().is_empty()) {
            debug!(server_url = %url, "server URL taken from environment");
            self.server_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        validate_weight(self.weight_text)?;
        if self.server_url.trim().is_empty() {
            return Err(CompareError::Config("server_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(CompareError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn validate_weight(weight: f64) -> Result<f64, CompareError> {
    if (0.0..=1.0).contains(&weight) {
        Ok(weight)
    } else {
        Err(CompareError::Config(format!(
            "weight_text must be within [0, 1], got {weight}"
        )))
    }
}

/// An explicit path wins, then `PDF_SIMILARITY_CONFIG`, then
/// `./pdf-similarity.toml` if it exists.
fn locate(explicit: Option<&Path>, env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("cfg.toml");
        std::fs::write(&path, body).expect("write");
        path
    }

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.server_url, "http://127.0.0.1:5000");
        assert_eq!(c.weight_text, 0.5);
        assert_eq!(c.report_dir, PathBuf::from("similarity-reports"));
        assert!(c.request_timeout_secs.is_none());
        assert!(c.mathjax);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = Config::from_toml_str("weight_text = 0.8\nmathjax = false").expect("parse");
        assert_eq!(c.weight_text, 0.8);
        assert!(!c.mathjax);
        assert_eq!(c.server_url, Config::default().server_url);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml_str("sever_url = \"x\"").unwrap_err();
        assert!(matches!(err, CompareError::Config(_)));
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        assert!(Config::from_toml_str("weight_text = 1.5").is_err());
        assert!(Config::from_toml_str("weight_text = -0.1").is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert_eq!(validate_weight(0.0).expect("ok"), 0.0);
        assert_eq!(validate_weight(1.0).expect("ok"), 1.0);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Config::from_toml_str("request_timeout_secs = 0").is_err());
        let c = Config::from_toml_str("request_timeout_secs = 30").expect("parse");
        assert_eq!(c.request_timeout_secs, Some(30));
    }

    #[test]
    fn test_explicit_file_beats_env_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let explicit = write_config(&dir, "server_url = \"http://explicit:1\"");
        let other = dir.path().join("other.toml");
        std::fs::write(&other, "server_url = \"http://envfile:2\"").expect("write");
        let env = env_of(&[(CONFIG_PATH_ENV, other.to_str().expect("utf8"))]);

        let c = Config::load_with(Some(&explicit), &env).expect("load");
        assert_eq!(c.server_url, "http://explicit:1");

        let c = Config::load_with(None, &env).expect("load");
        assert_eq!(c.server_url, "http://envfile:2");
    }

    #[test]
    fn test_env_server_beats_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "server_url = \"http://file:1\"\nweight_text = 0.2");
        let env = env_of(&[(SERVER_URL_ENV, "http://env:9")]);
        let c = Config::load_with(Some(&path), env).expect("load");
        assert_eq!(c.server_url, "http://env:9");
        assert_eq!(c.weight_text, 0.2);
    }

    #[test]
    fn test_blank_env_server_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "server_url = \"http://file:1\"");
        let c = Config::load_with(Some(&path), env_of(&[(SERVER_URL_ENV, "  ")])).expect("load");
        assert_eq!(c.server_url, "http://file:1");
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load_with(Some(&dir.path().join("nope.toml")), env_of(&[])).unwrap_err();
        assert!(matches!(err, CompareError::Io { .. }));
    }
}

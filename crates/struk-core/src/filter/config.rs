//! Filter configuration and its YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// File name looked up in `./config/` and the user config directory.
pub const CONFIG_FILE_NAME: &str = "email_filters.yaml";

const DEFAULT_DATE_RANGE_DAYS: u32 = 10;
const DEFAULT_MAX_RESULTS: usize = 1000;

const DEFAULT_SENDER_DOMAINS: &[&str] = &[
    // E-wallets and marketplaces
    "shopee.co.id",
    "gojek.com",
    "ovo.id",
    "dana.id",
    "grab.com",
    "tokopedia.com",
    "bukalapak.com",
    "blibli.com",
    // Banks
    "bca.co.id",
    "mandiri.co.id",
    "bni.co.id",
    "bri.co.id",
    "seabank.co.id",
    "cimb.co.id",
    "danamon.co.id",
    // Payment gateways
    "midtrans.com",
    "xendit.co",
    "doku.com",
    // Notification senders
    "noreply@shopee.co.id",
    "notification@gojek.com",
    "noreply@grab.com",
];

const DEFAULT_SUBJECT_PATTERNS: &[&str] = &[
    r".*receipt.*",
    r".*transaction.*",
    r".*payment.*",
    r".*invoice.*",
    r".*billing.*",
    r".*purchase.*",
    r".*confirmation.*",
    r".*statement.*",
    r".*bukti.*",
    r".*transaksi.*",
    r".*pembayaran.*",
    r".*struk.*",
    r".*tagihan.*",
    r".*pembelian.*",
    r".*konfirmasi.*",
    r".*laporan.*",
    r".*shopee.*pay.*",
    r".*gopay.*",
    r".*ovo.*payment.*",
    r".*dana.*transfer.*",
    r".*linkaja.*",
];

/// What the candidate filter looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Sender substrings, searched in order.
    pub sender_domains: Vec<String>,
    /// Case-insensitive subject regular expressions, tried in order.
    pub subject_patterns: Vec<String>,
    /// How many days back the search window reaches.
    pub date_range_days: u32,
    /// Upper bound on selected candidates. Zero selects nothing.
    pub max_results: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sender_domains: DEFAULT_SENDER_DOMAINS.iter().map(ToString::to_string).collect(),
            subject_patterns: DEFAULT_SUBJECT_PATTERNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            date_range_days: DEFAULT_DATE_RANGE_DAYS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// On-disk layout of `email_filters.yaml`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct FilterFile {
    sender_domains: Vec<String>,
    subject_patterns: Vec<String>,
    settings: FileSettings,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct FileSettings {
    date_range_days: u32,
    max_emails: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            date_range_days: DEFAULT_DATE_RANGE_DAYS,
            max_emails: DEFAULT_MAX_RESULTS,
        }
    }
}

impl FilterConfig {
    /// Parses the YAML file format.
    ///
    /// Returns `Ok(None)` for a document without sender domains or subject
    /// patterns, which cannot select anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML for this layout.
    pub fn from_yaml(text: &str) -> Result<Option<Self>> {
        if text.trim().is_empty() {
            warn!("Filter config is empty");
            return Ok(None);
        }

        let file: FilterFile = serde_yaml::from_str(text)?;
        if file.sender_domains.is_empty() {
            warn!("No sender domains in filter config");
            return Ok(None);
        }
        if file.subject_patterns.is_empty() {
            warn!("No subject patterns in filter config");
            return Ok(None);
        }

        Ok(Some(Self {
            sender_domains: file.sender_domains,
            subject_patterns: file.subject_patterns,
            date_range_days: file.settings.date_range_days,
            max_results: file.settings.max_emails,
        }))
    }

    /// Serializes to the YAML file format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        let file = FilterFile {
            sender_domains: self.sender_domains.clone(),
            subject_patterns: self.subject_patterns.clone(),
            settings: FileSettings {
                date_range_days: self.date_range_days,
                max_emails: self.max_results,
            },
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    /// Loads the configuration, falling back to the built-in defaults.
    ///
    /// An explicit `path` must exist. Otherwise `./config/email_filters.yaml`
    /// is tried, then `email_filters.yaml` under the user config directory.
    /// A file without domains or patterns is ignored in favour of the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read or parsed, or if
    /// an explicit path does not exist.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !tokio::fs::try_exists(path).await? {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => find_config_file().await,
        };

        let Some(path) = path else {
            info!("No filter config found, using built-in defaults");
            return Ok(Self::default());
        };

        let text = tokio::fs::read_to_string(&path).await?;
        if let Some(config) = Self::from_yaml(&text)? {
            info!(
                path = %path.display(),
                sender_domains = config.sender_domains.len(),
                subject_patterns = config.subject_patterns.len(),
                date_range_days = config.date_range_days,
                max_results = config.max_results,
                "Loaded filter config"
            );
            Ok(config)
        } else {
            warn!(path = %path.display(), "Ignoring incomplete filter config, using built-in defaults");
            Ok(Self::default())
        }
    }
}

/// Default locations of the filter config file, in lookup order.
#[must_use]
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config").join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("struk").join(CONFIG_FILE_NAME));
    }
    paths
}

async fn find_config_file() -> Option<PathBuf> {
    for path in default_config_paths() {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.sender_domains.len(), 21);
        assert_eq!(config.subject_patterns.len(), 21);
        assert_eq!(config.date_range_days, 10);
        assert_eq!(config.max_results, 1000);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = "sender_domains:\n  - shopee.co.id\n  - gojek.com\nsubject_patterns:\n  - '.*receipt.*'\nsettings:\n  date_range_days: 30\n  max_emails: 50\n";
        let config = FilterConfig::from_yaml(yaml).unwrap().unwrap();
        assert_eq!(config.sender_domains, vec!["shopee.co.id", "gojek.com"]);
        assert_eq!(config.subject_patterns, vec![".*receipt.*"]);
        assert_eq!(config.date_range_days, 30);
        assert_eq!(config.max_results, 50);
    }

    #[test]
    fn test_from_yaml_settings_optional() {
        let yaml = "sender_domains: [ovo.id]\nsubject_patterns: [bukti]\n";
        let config = FilterConfig::from_yaml(yaml).unwrap().unwrap();
        assert_eq!(config.date_range_days, 10);
        assert_eq!(config.max_results, 1000);
    }

    #[test]
    fn test_from_yaml_incomplete() {
        assert!(FilterConfig::from_yaml("").unwrap().is_none());
        assert!(FilterConfig::from_yaml("sender_domains: []\nsubject_patterns: [x]").unwrap().is_none());
        assert!(FilterConfig::from_yaml("sender_domains: [ovo.id]").unwrap().is_none());
    }

    #[test]
    fn test_from_yaml_invalid() {
        let err = FilterConfig::from_yaml("sender_domains: {oops").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = FilterConfig::default();
        let parsed = FilterConfig::from_yaml(&config.to_yaml().unwrap()).unwrap().unwrap();
        assert_eq!(parsed, config);
    }

    #[tokio::test]
    async fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.yaml");
        std::fs::write(&path, "sender_domains: [dana.id]\nsubject_patterns: [transfer]\n").unwrap();

        let config = FilterConfig::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(config.sender_domains, vec!["dana.id"]);
    }

    #[tokio::test]
    async fn test_load_incomplete_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.yaml");
        std::fs::write(&path, "subject_patterns: [transfer]\n").unwrap();

        let config = FilterConfig::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[tokio::test]
    async fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = FilterConfig::load_or_default(Some(&dir.path().join("nope.yaml")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

//! Layered configuration for RadioTV ingest.
//!
//! Values are resolved from, in increasing order of precedence:
//!
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension),
//! 3. environment variables prefixed with `RADIOTV_`, where `__` separates
//!    nested keys (`RADIOTV_INGEST__OVERWRITE=false`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "RADIOTV_";
pub const DEFAULT_TEMPLATE_PID: &str = "doms:Template_Program";
pub const DEFAULT_HAS_FILE_RELATION: &str = "http://doms.statsbiblioteket.dk/relations/default/0/1/#hasFile";
pub const DEFAULT_COMMENT_TEMPLATE: &str = "RadioTV ingest of '{{ filename }}': {{ message }}";
const FILE_STEM: &str = "config";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Allow updating a program object that already exists.
    pub overwrite: bool,
    /// Skip all writes when an existing object already matches the record.
    pub check: bool,
    /// Object new program objects are cloned from.
    pub template_pid: String,
    /// Predicate linking a program object to its file objects.
    pub has_file_relation: String,
    /// Template for audit comments; `filename` and `message` are available.
    pub comment_template: String,
    /// Records ingested at the same time by a batch.
    pub concurrency: usize,
}
impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            overwrite: true,
            check: true,
            template_pid: DEFAULT_TEMPLATE_PID.to_string(),
            has_file_relation: DEFAULT_HAS_FILE_RELATION.to_string(),
            comment_template: DEFAULT_COMMENT_TEMPLATE.to_string(),
            concurrency: 4,
        }
    }
}

impl Config {
    /// Load from the default file location (if a file exists there) and the
    /// environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(default_path().as_deref())?)
    }

    /// Load from an explicit file, which must exist, and the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            exn::bail!(ErrorKind::Load(format!("no configuration file at {}", path.display())));
        }
        Self::from_figment(Self::figment(Some(path))?)
    }

    /// Every configuration source merged in order of precedence, without
    /// extracting anything yet.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Reading configuration file");
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::Load(format!("unsupported configuration format: {}", path.display()))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and [validate](Self::validate) a configuration.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load("could not deserialize".to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let ingest = &self.ingest;
        if ingest.template_pid.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("ingest.template_pid must not be empty".to_string()));
        }
        if ingest.has_file_relation.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("ingest.has_file_relation must not be empty".to_string()));
        }
        if ingest.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("ingest.concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// First existing `config.{toml,yaml,yml,json}` in the user's configuration
/// directory.
pub fn default_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("dk", "statsbiblioteket", "radiotv-ingest")?;
    EXTENSIONS
        .iter()
        .map(|extension| dirs.config_dir().join(format!("{FILE_STEM}.{extension}")))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;

    fn file(extension: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(&format!(".{extension}")).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(Figment::from(Serialized::defaults(Config::default()))).unwrap();
        assert!(config.ingest.overwrite);
        assert!(config.ingest.check);
        assert_eq!(config.ingest.template_pid, "doms:Template_Program");
        assert_eq!(config.ingest.concurrency, 4);
    }

    #[rstest]
    #[case::toml("toml", "[ingest]\noverwrite = false\nconcurrency = 2\n")]
    #[case::yaml("yaml", "ingest:\n  overwrite: false\n  concurrency: 2\n")]
    #[case::json("json", r#"{"ingest": {"overwrite": false, "concurrency": 2}}"#)]
    fn test_file_formats(#[case] extension: &str, #[case] content: &str) {
        let file = file(extension, content);
        let config = Config::load_from(file.path()).unwrap();
        assert!(!config.ingest.overwrite);
        assert_eq!(config.ingest.concurrency, 2);
        // Untouched keys keep their defaults.
        assert!(config.ingest.check);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/radiotv.toml")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = file("ini", "overwrite = false");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
    }

    #[test]
    fn test_unknown_key() {
        let file = file("toml", "[ingest]\noverwrites = false\n");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
    }

    #[rstest]
    #[case::zero_concurrency("[ingest]\nconcurrency = 0\n")]
    #[case::empty_template("[ingest]\ntemplate_pid = \" \"\n")]
    #[case::empty_predicate("[ingest]\nhas_file_relation = \"\"\n")]
    fn test_invalid(#[case] content: &str) {
        let file = file("toml", content);
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[ingest]\ncheck = false\ncomment_template = \"file\"\n")?;
            // Only keys no other test asserts on, the environment is process-wide.
            jail.set_env("RADIOTV_INGEST__COMMENT_TEMPLATE", "from environment");
            let config = Config::load_from(Path::new("config.toml")).unwrap();
            assert!(!config.ingest.check);
            assert_eq!(config.ingest.comment_template, "from environment");
            Ok(())
        });
    }
}

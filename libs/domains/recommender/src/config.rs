use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or};
use domain_catalog::service::MAX_RANDOM_LIMIT;
use std::path::PathBuf;

pub const INDEX_FILE: &str = "index.bin";
pub const METADATA_FILE: &str = "metadata.json";

/// Recommender tuning and artifact location
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Directory holding `index.bin` and `metadata.json`
    pub artifact_dir: PathBuf,
    /// Results per user recommendation when `k` is omitted
    pub default_k: usize,
    /// Candidates requested per interest vector
    pub per_source_k: usize,
    /// Results per text search when `k` is omitted
    pub search_default_k: usize,
    /// Size of the random sample served as a fallback
    pub random_fallback_size: u64,
    /// Overrides the embedding model recorded in the metadata
    pub embedding_model: Option<String>,
}

impl RecommenderConfig {
    pub fn index_path(&self) -> PathBuf {
        self.artifact_dir.join(INDEX_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.artifact_dir.join(METADATA_FILE)
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            default_k: 50,
            per_source_k: 100,
            search_default_k: 20,
            random_fallback_size: 30,
            embedding_model: None,
        }
    }
}

impl FromEnv for RecommenderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let random_fallback_size =
            env_parse_or("RANDOM_FALLBACK_SIZE", defaults.random_fallback_size)?;
        if !(1..=MAX_RANDOM_LIMIT).contains(&random_fallback_size) {
            return Err(ConfigError::ParseError {
                key: "RANDOM_FALLBACK_SIZE".to_string(),
                details: format!("must be between 1 and {}", MAX_RANDOM_LIMIT),
            });
        }
        Ok(Self {
            artifact_dir: PathBuf::from(env_or_default("ARTIFACT_DIR", "artifacts")),
            default_k: env_parse_or("RECOMMEND_DEFAULT_K", defaults.default_k)?,
            per_source_k: env_parse_or("RECOMMEND_PER_SOURCE_K", defaults.per_source_k)?,
            search_default_k: env_parse_or("SEARCH_DEFAULT_K", defaults.search_default_k)?,
            random_fallback_size,
            embedding_model: env_optional("EMBEDDING_MODEL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        temp_env::with_vars_unset(
            [
                "ARTIFACT_DIR",
                "RECOMMEND_DEFAULT_K",
                "RECOMMEND_PER_SOURCE_K",
                "SEARCH_DEFAULT_K",
                "RANDOM_FALLBACK_SIZE",
                "EMBEDDING_MODEL",
            ],
            || {
                let config = RecommenderConfig::from_env().unwrap();
                assert_eq!(config, RecommenderConfig::default());
                assert_eq!(config.index_path(), PathBuf::from("artifacts/index.bin"));
            },
        );
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("ARTIFACT_DIR", Some("/srv/model")),
                ("RECOMMEND_DEFAULT_K", Some("10")),
                ("EMBEDDING_MODEL", Some("all-MiniLM-L6-v2")),
            ],
            || {
                let config = RecommenderConfig::from_env().unwrap();
                assert_eq!(config.metadata_path(), PathBuf::from("/srv/model/metadata.json"));
                assert_eq!(config.default_k, 10);
                assert_eq!(config.embedding_model.as_deref(), Some("all-MiniLM-L6-v2"));
            },
        );
    }

    #[test]
    fn test_invalid_number_is_parse_error() {
        temp_env::with_var("RECOMMEND_PER_SOURCE_K", Some("-5"), || {
            assert!(matches!(
                RecommenderConfig::from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }

    #[test]
    fn test_random_fallback_size_bounds() {
        for bad in ["0", "101"] {
            temp_env::with_var("RANDOM_FALLBACK_SIZE", Some(bad), || {
                let err = RecommenderConfig::from_env().unwrap_err();
                assert!(
                    matches!(&err, ConfigError::ParseError { key, .. } if key == "RANDOM_FALLBACK_SIZE"),
                    "{} accepted: {:?}",
                    bad,
                    err
                );
            });
        }
        temp_env::with_var("RANDOM_FALLBACK_SIZE", Some("100"), || {
            assert_eq!(RecommenderConfig::from_env().unwrap().random_fallback_size, 100);
        });
    }
}

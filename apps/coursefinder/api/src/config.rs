use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_recommender::{OpenAIConfig, RecommenderConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub recommender: RecommenderConfig,
    pub embedding: OpenAIConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // DATABASE_URL is required
        let server = ServerConfig::from_env()?;
        let recommender = RecommenderConfig::from_env()?;
        let embedding = OpenAIConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            recommender,
            embedding,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }

    #[test]
    fn test_config_composes_sections() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/courses")),
                ("PORT", Some("9090")),
                ("ARTIFACT_DIR", Some("/srv/artifacts")),
                ("RECOMMEND_DEFAULT_K", Some("10")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "coursefinder_api");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.recommender.default_k, 10);
                assert_eq!(
                    config.recommender.index_path(),
                    std::path::PathBuf::from("/srv/artifacts/index.bin")
                );
            },
        );
    }
}

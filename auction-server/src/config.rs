use {
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    serde::Deserialize,
    std::{
        fs,
        time::Duration,
    },
};

pub mod server;

// Command line of the sealed-bid server. `run` serves the API, `migrate` applies the migrations and exits.
#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
#[allow(clippy::large_enum_variant)]
pub enum Options {
    /// Run the auction server service.
    Run(RunOptions),
    /// Apply the database migrations and exit.
    Migrate(MigrateOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub database: DatabaseOptions,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
pub struct MigrateOptions {
    #[command(flatten)]
    pub database: DatabaseOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Database Options")]
#[group(id = "Database")]
pub struct DatabaseOptions {
    /// database url for persistent storage.
    #[arg(long = "database-url")]
    #[arg(env = "DATABASE_URL")]
    pub database_url: String,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file containing the auction server settings.
    #[arg(long = "config")]
    #[arg(env = "AUCTION_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

const DEFAULT_ACTOR_HEADER: &str = "X-Actor-Id";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_EXPIRY_INTERVAL: Duration = Duration::from_secs(5);

fn default_actor_header() -> String {
    DEFAULT_ACTOR_HEADER.to_string()
}

fn default_database_max_connections() -> u32 {
    DEFAULT_DATABASE_MAX_CONNECTIONS
}

fn default_true() -> bool {
    true
}

fn default_expiry_interval() -> Duration {
    DEFAULT_EXPIRY_INTERVAL
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExpiryWorkerConfig {
    /// Whether to periodically flag expired auctions as ended.
    #[serde(default = "default_true")]
    pub enabled:  bool,
    /// How often expired auctions are flagged.
    #[serde(with = "humantime_serde", default = "default_expiry_interval")]
    pub interval: Duration,
}

impl Default for ExpiryWorkerConfig {
    fn default() -> Self {
        Self {
            enabled:  true,
            interval: DEFAULT_EXPIRY_INTERVAL,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Request header the identity provider puts the caller identity in.
    #[serde(default = "default_actor_header")]
    pub actor_header:             String,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default)]
    pub expiry_worker:            ExpiryWorkerConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        // Open and read the YAML file
        let yaml_content = fs::read_to_string(path)?;
        Self::parse(&yaml_content)
    }

    fn parse(yaml_content: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(yaml_content)?;
        if config.actor_header.trim().is_empty() {
            return Err(anyhow::anyhow!("actor_header must not be empty"));
        }
        if config.database_max_connections == 0 {
            return Err(anyhow::anyhow!(
                "database_max_connections must be greater than zero"
            ));
        }
        if config.expiry_worker.interval.is_zero() {
            return Err(anyhow::anyhow!("expiry_worker.interval must not be zero"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        clap::CommandFactory,
    };

    #[test]
    fn test_options_are_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
actor_header: X-User
database_max_connections: 20
expiry_worker:
  enabled: false
  interval: 1m 30s
"#,
        )
        .unwrap();
        assert_eq!(
            config,
            Config {
                actor_header:             "X-User".to_string(),
                database_max_connections: 20,
                expiry_worker:            ExpiryWorkerConfig {
                    enabled:  false,
                    interval: Duration::from_secs(90),
                },
            }
        );
    }

    #[test]
    fn test_parse_applies_defaults() {
        let config = Config::parse("{}").unwrap();
        assert_eq!(config.actor_header, "X-Actor-Id");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.expiry_worker, ExpiryWorkerConfig::default());

        let config = Config::parse("expiry_worker:\n  enabled: false\n").unwrap();
        assert!(!config.expiry_worker.enabled);
        assert_eq!(config.expiry_worker.interval, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_rejects_invalid_config() {
        assert!(Config::parse("unknown_key: 1").is_err());
        assert!(Config::parse("actor_header: ''").is_err());
        assert!(Config::parse("database_max_connections: 0").is_err());
        assert!(Config::parse("expiry_worker:\n  interval: 0s\n").is_err());
        assert!(Config::parse("expiry_worker:\n  interval: soon\n").is_err());
    }
}

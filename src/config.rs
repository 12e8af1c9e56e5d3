use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.asia-basket.com";
pub const DEFAULT_LEAGUE_PATH: &str = "/Lebanon/basketball-League-LBL.aspx";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_BOX_SCORE_TEMPLATE: &str = "{base_url}/boxscore/{game_id}";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Site root, without trailing slash
    pub base_url: String,
    /// Main league page (standings, results, upcoming, leaders)
    pub league_path: String,
    /// Optional schedule page (results and upcoming only)
    #[serde(default)]
    pub schedule_path: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `{base_url}` and `{game_id}` are substituted
    #[serde(default = "default_box_score_template")]
    pub box_score_url_template: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_box_score_template() -> String {
    DEFAULT_BOX_SCORE_TEMPLATE.to_string()
}

impl SourceConfig {
    pub fn league_url(&self) -> String {
        join_url(&self.base_url, &self.league_path)
    }

    pub fn schedule_url(&self) -> Option<String> {
        self.schedule_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| join_url(&self.base_url, p))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            league_path: DEFAULT_LEAGUE_PATH.to_string(),
            schedule_path: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            box_score_url_template: default_box_score_template(),
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between scheduled refresh cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    300
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Maximum number of entries kept per category
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct LimitsConfig {
    #[serde(default = "default_standings_limit")]
    pub standings: usize,
    #[serde(default = "default_results_limit")]
    pub results: usize,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming: usize,
    #[serde(default = "default_leaders_limit")]
    pub leaders: usize,
}

fn default_standings_limit() -> usize {
    12
}

fn default_results_limit() -> usize {
    20
}

fn default_upcoming_limit() -> usize {
    5
}

fn default_leaders_limit() -> usize {
    5
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            standings: default_standings_limit(),
            results: default_results_limit(),
            upcoming: default_upcoming_limit(),
            leaders: default_leaders_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a config directory, then the environment
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("source.base_url", DEFAULT_BASE_URL)?
            .set_default("source.league_path", DEFAULT_LEAGUE_PATH)?
            .set_default("refresh.interval_secs", default_interval_secs())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("LBL_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (LBL_SOURCE__BASE_URL, etc.)
            .add_source(
                Environment::with_prefix("LBL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if url::Url::parse(&self.source.base_url).is_err() {
            errors.push(format!(
                "source.base_url is not a valid URL: {}",
                self.source.base_url
            ));
        }

        if self.source.timeout_secs == 0 {
            errors.push("source.timeout_secs must be positive".to_string());
        }

        if !self.source.box_score_url_template.contains("{game_id}") {
            errors.push("source.box_score_url_template must contain {game_id}".to_string());
        }

        if self.refresh.interval_secs == 0 {
            errors.push("refresh.interval_secs must be positive".to_string());
        }

        let limits = &self.limits;
        for (name, value) in [
            ("standings", limits.standings),
            ("results", limits.results),
            ("upcoming", limits.upcoming),
            ("leaders", limits.leaders),
        ] {
            if value == 0 {
                errors.push(format!("limits.{name} must be positive"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            refresh: RefreshConfig::default(),
            limits: LimitsConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

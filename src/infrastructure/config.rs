use crate::application::update_service::FailurePolicy;
use crate::domain::account::AccountContext;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/linky";
const DEFAULT_BASE_URL: &str = "https://conso.boris.sh";
const DEFAULT_USER_AGENT: &str = "Home Assistant";
const SECS_PER_HOUR: u64 = 3600;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub account: AccountSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub update: UpdateSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Deserialize, Clone)]
pub struct AccountSettings {
    pub api_key: String,
    pub point_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl std::fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSettings")
            .field("api_key", &"***")
            .field("point_id", &self.point_id)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on how much of a raw response body gets logged
    pub max_logged_body_bytes: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_logged_body_bytes: 4096,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpdateSettings {
    pub interval_hours: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            interval_hours: 8,
            failure_policy: FailurePolicy::Retain,
        }
    }
}

impl UpdateSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(SECS_PER_HOUR))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl AppConfig {
    pub fn account_context(&self) -> AccountContext {
        AccountContext::new(
            self.account.api_key.clone(),
            self.account.point_id.clone(),
            self.account.email.clone(),
        )
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.account.api_key.trim().is_empty(),
            "account.api_key must not be empty"
        );
        anyhow::ensure!(
            !self.account.point_id.trim().is_empty(),
            "account.point_id must not be empty"
        );
        anyhow::ensure!(
            self.update.interval_hours > 0,
            "update.interval_hours must be greater than 0"
        );
        anyhow::ensure!(
            self.update.interval_hours.checked_mul(SECS_PER_HOUR).is_some(),
            "update.interval_hours is too large"
        );
        anyhow::ensure!(self.api.timeout_secs > 0, "api.timeout_secs must be greater than 0");
        Ok(())
    }
}

/// Load configuration from `config/linky.*` (or the path in `LINKY_CONFIG`),
/// overridden by `LINKY__SECTION__KEY` environment variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let path =
        std::env::var("LINKY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let builder = config::Config::builder()
        .add_source(config::File::with_name(&path).required(false))
        .add_source(environment_source());

    build_app_config(builder)
}

// Values stay strings so digit-only meter ids keep their leading zeros;
// numeric fields are converted on deserialization
fn environment_source() -> config::Environment {
    config::Environment::with_prefix("LINKY")
        .prefix_separator("__")
        .separator("__")
}

fn build_app_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let settings = builder.build()?;
    let cfg: AppConfig = settings.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> anyhow::Result<AppConfig> {
        build_app_config(
            config::Config::builder()
                .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
        )
    }

    fn parse_env(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        build_app_config(
            config::Config::builder().add_source(environment_source().source(Some(map))),
        )
    }

    #[test]
    fn test_env_point_id_keeps_leading_zero() {
        let cfg = parse_env(&[
            ("LINKY__ACCOUNT__API_KEY", "token"),
            ("LINKY__ACCOUNT__POINT_ID", "01234567890123"),
            ("LINKY__UPDATE__INTERVAL_HOURS", "2"),
        ])
        .unwrap();

        assert_eq!(cfg.account.point_id, "01234567890123");
        assert_eq!(cfg.account_context().point_id(), "01234567890123");
        assert_eq!(cfg.update.interval(), Duration::from_secs(2 * 3600));
    }

    #[test]
    fn test_rejects_overflowing_interval() {
        let result = parse(
            r#"
            [account]
            api_key = "token"
            point_id = "12345678901234"

            [update]
            interval_hours = 9223372036854775807
            "#,
        );
        assert!(result.unwrap_err().to_string().contains("too large"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = parse(
            r#"
            [account]
            api_key = "token"
            point_id = "12345678901234"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api.base_url, "https://conso.boris.sh");
        assert_eq!(cfg.api.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.api.user_agent, "Home Assistant");
        assert_eq!(cfg.update.interval(), Duration::from_secs(8 * 3600));
        assert_eq!(cfg.update.failure_policy, FailurePolicy::Retain);
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.account_context().email(), None);
    }

    #[test]
    fn test_full_config() {
        let cfg = parse(
            r#"
            [account]
            api_key = "token"
            point_id = "12345678901234"
            email = "me@example.org"

            [api]
            base_url = "http://localhost:9000"
            timeout_secs = 3

            [update]
            interval_hours = 1
            failure_policy = "reset"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api.base_url, "http://localhost:9000");
        assert_eq!(cfg.api.timeout_secs, 3);
        assert_eq!(cfg.api.max_logged_body_bytes, 4096);
        assert_eq!(cfg.update.failure_policy, FailurePolicy::Reset);
        assert_eq!(cfg.account_context().contact_email(), "me@example.org");
    }

    #[test]
    fn test_rejects_empty_credentials() {
        let result = parse(
            r#"
            [account]
            api_key = ""
            point_id = "12345678901234"
            "#,
        );
        assert!(result.unwrap_err().to_string().contains("api_key"));

        let result = parse(
            r#"
            [account]
            api_key = "token"
            point_id = "  "
            "#,
        );
        assert!(result.unwrap_err().to_string().contains("point_id"));
    }

    #[test]
    fn test_rejects_missing_account() {
        assert!(parse("[update]\ninterval_hours = 2\n").is_err());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = parse(
            r#"
            [account]
            api_key = "token"
            point_id = "12345678901234"

            [update]
            interval_hours = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let cfg = parse(
            r#"
            [account]
            api_key = "super-secret"
            point_id = "12345678901234"
            "#,
        )
        .unwrap();
        assert!(!format!("{:?}", cfg).contains("super-secret"));
    }
}

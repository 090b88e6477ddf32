use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_UUID: &str = "DEFAULT_UUID";
pub const DEFAULT_CHART_URL: &str = "http://bot-charts.mybluemix.net";
pub const DEFAULT_BOT_NAME: &str = "hubot";

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub audit: AuditConfig,
    pub chart: ChartConfig,
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Elasticsearch endpoint. Auditing is off when unset.
    pub endpoint: Option<String>,
    /// Identifier of the running instance; scopes every report.
    pub container_uuid: String,
    /// Explicit kill switch, independent of the endpoint.
    pub disabled: bool,
}

/// `disabled` comes from `USAGE_CHART_DISABLED`: any non-empty value turns
/// charting off except an explicit `false`/`0`/`no`/`off`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub disabled: bool,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub name: String,
    /// Chat adapter the bot runs on (slack, facebook, shell, ...).
    pub adapter: Option<String>,
}

impl ActivityConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let endpoint =
            non_empty_env("HUBOT_AUDIT_ENDPOINT").or_else(|| non_empty_env("AUDIT_ENDPOINT"));

        Ok(ActivityConfig {
            common,
            audit: AuditConfig {
                endpoint,
                container_uuid: non_empty_env("uuid")
                    .unwrap_or_else(|| DEFAULT_UUID.to_string()),
                disabled: matches!(
                    env::var("HUBOT_BLUEMIX_AUDIT_DISABLED").as_deref(),
                    Ok("TRUE") | Ok("true")
                ),
            },
            chart: ChartConfig {
                disabled: non_empty_env("USAGE_CHART_DISABLED")
                    .map(|v| parse_flag(&v))
                    .unwrap_or(false),
                base_url: non_empty_env("USAGE_CHART_URL")
                    .unwrap_or_else(|| DEFAULT_CHART_URL.to_string()),
            },
            bot: BotConfig {
                name: non_empty_env("BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string()),
                adapter: non_empty_env("BOT_ADAPTER"),
            },
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Boolean-like flag: anything set other than an explicit false counts as on.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

use crate::core::scheduler::Schedule;
use crate::utils::error::{ReminderError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "reminder.toml";
const DEFAULT_MAIL_SERVER: &str = "smtp.gmail.com";
const DEFAULT_MAIL_PORT: u16 = 587;
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_STORE_PATH: &str = "birthdays.json";
const DEFAULT_CHECK_TIME: &str = "09:00";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub use_tls: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local time of day, `HH:MM`.
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    #[default]
    Smtp,
    Webhook,
    Log,
}

impl FromStr for DeliveryChannel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "webhook" => Ok(Self::Webhook),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown delivery channel '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub channel: Option<DeliveryChannel>,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
}

impl MailConfig {
    pub fn server(&self) -> &str {
        self.server.as_deref().unwrap_or(DEFAULT_MAIL_SERVER)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_MAIL_PORT)
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls.unwrap_or(true)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// 寄件者，未設定時使用登入帳號
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.username.as_deref())
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReminderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReminderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 只使用環境變數建立配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 有設定檔就讀檔，否則退回環境變數
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            tracing::debug!("Loading configuration from {}", path.as_ref().display());
            Self::from_file(path)
        } else {
            tracing::debug!(
                "{} not found, reading configuration from environment",
                path.as_ref().display()
            );
            Self::from_env()
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            mail: MailConfig {
                server: lookup("MAIL_SERVER"),
                port: parse_var(&lookup, "MAIL_PORT")?,
                use_tls: parse_var(&lookup, "MAIL_USE_TLS")?,
                username: lookup("MAIL_USERNAME").or_else(|| lookup("GMAIL_USER")),
                password: lookup("MAIL_PASSWORD").or_else(|| lookup("GMAIL_PASSWORD")),
                from: lookup("MAIL_FROM"),
                timeout_seconds: parse_var(&lookup, "MAIL_TIMEOUT_SECONDS")?,
            },
            schedule: ScheduleConfig {
                time: lookup("REMINDER_TIME"),
            },
            store: StoreConfig {
                path: lookup("REMINDER_STORE"),
            },
            delivery: DeliveryConfig {
                channel: parse_var(&lookup, "REMINDER_CHANNEL")?,
                webhook_url: lookup("REMINDER_WEBHOOK_URL"),
                webhook_token: lookup("REMINDER_WEBHOOK_TOKEN"),
            },
            logging: LoggingConfig {
                json: parse_var(&lookup, "REMINDER_LOG_JSON")?,
            },
        })
    }

    /// 替換環境變數 (例如 ${MAIL_PASSWORD})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = placeholder_pattern()?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn store_path(&self) -> &str {
        self.store.path.as_deref().unwrap_or(DEFAULT_STORE_PATH)
    }

    pub fn channel(&self) -> DeliveryChannel {
        self.delivery.channel.unwrap_or_default()
    }

    pub fn schedule(&self) -> Result<Schedule> {
        Schedule::parse_daily(self.schedule.time.as_deref().unwrap_or(DEFAULT_CHECK_TIME))
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("store.path", self.store_path())?;
        self.schedule()?;

        if let Some(timeout) = self.mail.timeout_seconds {
            validate_range("mail.timeout_seconds", timeout, 1, 300)?;
        }

        match self.channel() {
            DeliveryChannel::Smtp => self.validate_smtp(),
            DeliveryChannel::Webhook => {
                ensure_resolved(self.delivery.webhook_url.as_deref())?;
                ensure_resolved(self.delivery.webhook_token.as_deref())?;
                let url =
                    validate_required_field("delivery.webhook_url", &self.delivery.webhook_url)?;
                validate_url("delivery.webhook_url", url)
            }
            DeliveryChannel::Log => Ok(()),
        }
    }

    fn validate_smtp(&self) -> Result<()> {
        let mail = &self.mail;
        for value in [&mail.server, &mail.username, &mail.password, &mail.from] {
            ensure_resolved(value.as_deref())?;
        }

        validate_non_empty_string("mail.server", mail.server())?;
        validate_range("mail.port", mail.port(), 1, u16::MAX)?;

        // 帳號與密碼必須同時設定
        if mail.username.is_some() {
            validate_required_field("mail.password", &mail.password)?;
        }
        if mail.password.is_some() {
            validate_required_field("mail.username", &mail.username)?;
        }

        let sender = mail.sender();
        let sender = validate_required_field("mail.from", &sender)?;
        validate_non_empty_string("mail.from", sender)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn placeholder_pattern() -> Result<regex::Regex> {
    regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReminderError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })
}

/// 未被替換的 `${VAR}` 代表環境變數沒有設定
fn ensure_resolved(value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };

    match placeholder_pattern()?.captures(value) {
        Some(caps) => Err(ReminderError::MissingConfigError {
            field: caps[1].to_string(),
        }),
        None => Ok(()),
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ReminderError::InvalidConfigValueError {
                field: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

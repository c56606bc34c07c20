use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Invalid birth date: month {month}, day {day}")]
    InvalidDateInput { month: u32, day: u32 },

    #[error("Notification to {destination} failed: {reason}")]
    NotificationDeliveryFailure { destination: String, reason: String },

    #[error("Record store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Delivery,
    Storage,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReminderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDateInput { .. } | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::NotificationDeliveryFailure { .. } | Self::HttpError(_) => {
                ErrorCategory::Delivery
            }
            Self::StoreUnavailable { .. } | Self::SerializationError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單筆記錄的錯誤不影響整體執行
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Delivery | ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 針對錯誤類別提供修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidDateInput { .. } => {
                "Fix the record's birth month/day; it will be skipped until then"
            }
            Self::NotificationDeliveryFailure { .. } | Self::HttpError(_) => {
                "Check mail server reachability and credentials; the next tick will retry"
            }
            Self::StoreUnavailable { .. } | Self::SerializationError(_) => {
                "Make sure the record store file exists and contains a valid JSON array"
            }
            Self::MissingConfigError { .. } => {
                "Add the missing field to the config file or set the matching MAIL_* variable"
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => "Review the configuration file and try again",
            Self::ValidationError { .. } => "Correct the input and try again",
            Self::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::StoreUnavailable { .. } => format!("Could not read birthdays: {}", self),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => format!("Setting '{}' is required", field),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReminderError>;

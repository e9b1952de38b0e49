use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned HTTP {status} for {url}")]
    HttpStatusError { status: u16, url: String },

    #[error("API rejected the access key (HTTP {status})")]
    AuthError { status: u16 },

    #[error("Malformed payload: {message}")]
    MalformedPayloadError { message: String },

    #[error("Search returned no records")]
    EmptySearchResult,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid command '{input}': {reason}")]
    InvalidCommandError { input: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Auth,
    Payload,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FinderError {
    pub fn malformed(message: impl Into<String>) -> Self {
        FinderError::MalformedPayloadError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FinderError::ApiError(_) | FinderError::HttpStatusError { .. } => {
                ErrorCategory::Transport
            }
            FinderError::AuthError { .. } => ErrorCategory::Auth,
            FinderError::MalformedPayloadError { .. } | FinderError::EmptySearchResult => {
                ErrorCategory::Payload
            }
            FinderError::IoError(_)
            | FinderError::ConfigError { .. }
            | FinderError::ConfigValidationError { .. }
            | FinderError::InvalidConfigValueError { .. }
            | FinderError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FinderError::InvalidCommandError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Transport => ErrorSeverity::Medium,
            ErrorCategory::Payload => ErrorSeverity::High,
            ErrorCategory::Auth | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FinderError::ApiError(e) if e.is_timeout() => {
                "The cat API did not answer in time".to_string()
            }
            FinderError::ApiError(_) => "Could not reach the cat API".to_string(),
            FinderError::HttpStatusError { status, .. } => {
                format!("The cat API answered with an error (HTTP {})", status)
            }
            FinderError::AuthError { .. } => "The cat API rejected the access key".to_string(),
            FinderError::MalformedPayloadError { .. } => {
                "The cat API sent a response that could not be understood".to_string()
            }
            FinderError::EmptySearchResult => "The cat API returned no cats".to_string(),
            FinderError::IoError(e) => format!("File system error: {}", e),
            FinderError::ConfigError { message } => format!("Configuration problem: {}", message),
            FinderError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            FinderError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            FinderError::MissingConfigError { field } => {
                format!("Required setting '{}' is not set", field)
            }
            FinderError::InvalidCommandError { input, reason } => {
                format!("Cannot run '{}': {}", input, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => "Check your network connection and request another cat",
            ErrorCategory::Auth => "Set a valid key in CAT_API_KEY or pass --api-key",
            ErrorCategory::Payload => "The API may have changed; try again or check the base URL",
            ErrorCategory::Configuration => "Review the command line flags or the TOML file",
            ErrorCategory::Input => "Type 'help' to list the available commands",
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;

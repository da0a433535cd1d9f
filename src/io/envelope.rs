//! JSON output envelope for `--json` commands.
//!
//! Every command prints exactly one envelope, so the output can be piped
//! into `jq` without knowing which command produced it.

use serde::{Deserialize, Serialize};

use crate::io::ExitCode;

/// Schema version for this envelope format.
pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Result,
    Error,
}

/// Operation outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Operation succeeded with results
    Success,
    /// Operation succeeded but found nothing
    NotFound,
    /// Operation ran but the input did not pass its checks
    Invalid,
    /// Operation failed
    Error,
}

/// Machine-readable result codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Ok,
    NotFound,
    ParseError,
    IndexError,
    InvalidModel,
    ValidationFailed,
    ConfigError,
    InternalError,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::ParseError => "PARSE_ERROR",
            Self::IndexError => "INDEX_ERROR",
            Self::InvalidModel => "INVALID_MODEL",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Exit code a command returns along with this result.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Ok => ExitCode::Success,
            Self::NotFound => ExitCode::NotFound,
            Self::ParseError | Self::IndexError | Self::InvalidModel => ExitCode::ParseError,
            Self::ValidationFailed => ExitCode::ValidationFailed,
            Self::ConfigError => ExitCode::ConfigError,
            Self::InternalError => ExitCode::GeneralError,
        }
    }
}

/// Entity type in the data payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Sample,
    SearchRecord,
    Member,
    Scope,
    ValidationReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    /// Message type for stream discrimination
    #[serde(rename = "type")]
    pub message_type: MessageType,

    pub status: Status,

    pub code: ResultCode,

    /// Unix exit code (0-255)
    pub exit_code: u8,

    /// Human-readable message
    pub message: String,

    /// Suggested next step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// Result payload (null on error)
    pub data: Option<T>,

    pub meta: Meta,
}

/// Response metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version (semver)
    pub schema_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,

    /// Number of items in data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Original query string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Execution time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            entity_type: None,
            count: None,
            query: None,
            duration_ms: None,
        }
    }
}

impl<T> Envelope<T> {
    fn new(message_type: MessageType, status: Status, code: ResultCode, message: String) -> Self {
        Self {
            message_type,
            status,
            code,
            exit_code: code.exit_code().as_u8(),
            message,
            hint: None,
            data: None,
            meta: Meta::default(),
        }
    }

    /// Create a success envelope with data.
    pub fn success(data: T) -> Self {
        let mut envelope = Self::new(
            MessageType::Result,
            Status::Success,
            ResultCode::Ok,
            "Operation completed successfully".to_string(),
        );
        envelope.data = Some(data);
        envelope
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            MessageType::Result,
            Status::NotFound,
            ResultCode::NotFound,
            message.into(),
        )
    }

    /// The command ran, `data` explains why the input is invalid.
    pub fn invalid(data: T, message: impl Into<String>) -> Self {
        let mut envelope = Self::new(
            MessageType::Result,
            Status::Invalid,
            ResultCode::ValidationFailed,
            message.into(),
        );
        envelope.data = Some(data);
        envelope
    }

    pub fn error(code: ResultCode, message: impl Into<String>) -> Self {
        Self::new(MessageType::Error, Status::Error, code, message.into())
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.meta.entity_type = Some(entity_type);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.meta.count = Some(count);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.meta.query = Some(query.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.meta.duration_ms = Some(duration_ms);
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        self.code.exit_code()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error>
    where
        T: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let data = vec![0.5, 1.0];
        let envelope = Envelope::success(data)
            .with_entity_type(EntityType::Sample)
            .with_count(2)
            .with_message("Simulated 2 steps");

        assert_eq!(envelope.message_type, MessageType::Result);
        assert_eq!(envelope.status, Status::Success);
        assert_eq!(envelope.code, ResultCode::Ok);
        assert_eq!(envelope.exit_code, 0);
        assert_eq!(envelope.meta.count, Some(2));
        assert!(envelope.data.is_some());
    }

    #[test]
    fn test_not_found_envelope() {
        let envelope: Envelope<()> = Envelope::not_found("No documentation entry for 'foo'")
            .with_hint("Lookups are exact; try `sunsys docs scopes`");

        assert_eq!(envelope.status, Status::NotFound);
        assert_eq!(envelope.code, ResultCode::NotFound);
        assert_eq!(envelope.exit_code, 1);
        assert!(envelope.data.is_none());
        assert!(envelope.hint.is_some());
    }

    #[test]
    fn test_error_envelope() {
        let envelope: Envelope<()> = Envelope::error(ResultCode::InvalidModel, "den is empty");

        assert_eq!(envelope.message_type, MessageType::Error);
        assert_eq!(envelope.status, Status::Error);
        assert_eq!(envelope.exit_code(), ExitCode::ParseError);
        assert_eq!(envelope.exit_code, ExitCode::ParseError.as_u8());
    }

    #[test]
    fn test_invalid_envelope_keeps_data() {
        let envelope = Envelope::invalid(vec!["empty key"], "1 error");
        assert_eq!(envelope.status, Status::Invalid);
        assert_eq!(envelope.exit_code(), ExitCode::ValidationFailed);
        assert!(envelope.data.is_some());
    }

    #[test]
    fn test_json_serialization() {
        let envelope = Envelope::success(vec!["sun", "sun::RK4"])
            .with_entity_type(EntityType::Scope)
            .with_count(2);

        let json = envelope.to_json().unwrap();
        assert!(json.contains("\"type\": \"result\""));
        assert!(json.contains("\"status\": \"success\""));
        assert!(json.contains("\"code\": \"OK\""));
        assert!(json.contains("\"entity_type\": \"scope\""));
        assert!(json.contains("\"schema_version\": \"1.0.0\""));
    }
}

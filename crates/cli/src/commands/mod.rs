pub mod add_price;
pub mod add_product;
pub mod config;
pub mod delete_product;
pub mod markets;
pub mod prices;
pub mod products;
pub mod smoke;

use std::str::FromStr;
use std::sync::Arc;

use pricebook_client::HttpCatalogBackend;
use pricebook_core::config::{AppConfig, ConfigError, LoadOptions};
use pricebook_core::{CatalogError, Session, SortDirection, SortSpec, ValidationError};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

pub const EXIT_TRANSPORT: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_VALIDATION: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandOutcome {
    fn ok(command: &str, message: String, data: Option<Value>) -> Self {
        Self {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message,
            detail: None,
            retryable: None,
            data,
        }
    }

    fn error(command: &str, error_class: &str, message: String) -> Self {
        Self {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message,
            detail: None,
            retryable: None,
            data: None,
        }
    }
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome::ok(command, message.into(), None);
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => {
                let payload = CommandOutcome::ok(command, message.into(), Some(data));
                Self { exit_code: 0, output: serialize_payload(payload) }
            }
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_TRANSPORT),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome::error(command, error_class, message.into());
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_catalog_error(command: &str, error: &CatalogError) -> Self {
        let (error_class, exit_code) = match error {
            CatalogError::Validation(_) => ("validation", EXIT_VALIDATION),
            CatalogError::Transport(_) => ("transport", EXIT_TRANSPORT),
        };
        let mut payload =
            CommandOutcome::error(command, error_class, error.user_message().to_string());
        payload.detail = Some(error.to_string());
        payload.retryable = Some(error.is_retryable());
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_config_error(command: &str, error: &ConfigError) -> Self {
        Self::failure(command, "config", error.to_string(), EXIT_CONFIG)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Loads config and builds the runtime a catalog command runs on.
pub(crate) fn prepare(
    command: &str,
    options: &LoadOptions,
) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = AppConfig::load(options.clone())
        .map_err(|error| CommandResult::from_config_error(command, &error))?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| {
            CommandResult::failure(
                command,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_TRANSPORT,
            )
        },
    )?;
    Ok((config, runtime))
}

pub(crate) async fn open_session(config: &AppConfig) -> Result<Session, CatalogError> {
    let backend = HttpCatalogBackend::from_config(&config.backend)?;
    let mut session = Session::new(Arc::new(backend));
    session.load().await?;
    Ok(session)
}

/// Named field starts ascending, like a first header click; no field keeps newest first.
pub(crate) fn sort_spec<F>(
    field: Option<&str>,
    direction: Option<&str>,
) -> Result<SortSpec<F>, ValidationError>
where
    F: FromStr<Err = ValidationError> + Default + Copy + PartialEq,
{
    let mut spec = match field {
        Some(raw) => SortSpec::new(raw.parse()?, SortDirection::Ascending),
        None => SortSpec::default(),
    };
    if let Some(raw) = direction {
        spec.direction = raw.parse()?;
    }
    Ok(spec)
}

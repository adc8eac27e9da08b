#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

use crate::utils::forecast_types::ValidationError;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("forecast_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Unable to acquire the forecast store lock: {}", .0)]
    StoreLock(String),

    #[error("Unable to render template {}: {}", .0, .1)]
    TemplateRender(String, String),
}

/// StoreError is the failure side of every forecast store operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A forecast already exists for the requested date.
    #[error("{}", .0)]
    Conflict(String),

    /// One or more request fields are invalid.
    #[error("Invalid input: {}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),

    /// No forecast has the requested id.
    #[error("NOT_FOUND: Forecast with id {} does not exist.", .0)]
    NotFound(i32),
}

// ---------------------------------------------------------------------------
// format_validation_errors:
// ---------------------------------------------------------------------------
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors.iter()
        .map(|e| format!("{}: {}", e.identifier, e.error_message))
        .collect::<Vec<String>>()
        .join("; ")
}

// ***************************************************************************
//                              HTTP Results
// ***************************************************************************
/// The body returned by endpoints on failure.
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self {result_code, result_msg}
    }
}

/// A single field level error.
#[derive(Object, Debug)]
pub struct HttpFieldError {
    pub identifier: String,
    pub error_message: String,
}

/// The body returned when request validation fails.
#[derive(Object, Debug)]
pub struct HttpValidationResult {
    pub result_code: String,
    pub result_msg: String,
    pub errors: Vec<HttpFieldError>,
}

impl HttpValidationResult {
    pub fn new(result_code: String, result_msg: String, errors: &[ValidationError]) -> Self {
        let errors = errors.iter()
            .map(|e| HttpFieldError {identifier: e.identifier.clone(),
                                     error_message: e.error_message.clone()})
            .collect();
        Self {result_code, result_msg, errors}
    }
}

#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse };
use anyhow::Result;
use log::{error, info};

use crate::utils::errors::{HttpResult, HttpValidationResult, StoreError};
use crate::utils::forecast_store::{lock_store, SharedStore};
use crate::utils::forecast_types::ValidationError;
use crate::utils::forecast_utils::{self, parse_forecast_date, RequestDebug};
use crate::v1::forecasts::ForecastElement;

// Field identifier used when the date can't be parsed.
const DATE_FIELD: &str = "date";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct CreateForecastsApi {
    store: SharedStore,
}

impl CreateForecastsApi {
    pub fn new(store: SharedStore) -> Self {
        Self {store}
    }
}

#[derive(Object)]
pub struct ReqCreateForecast
{
    /// A date (YYYY-MM-DD) or rfc3339 timestamp; only the date is kept.
    date: String,
    temperature_c: i32,
    #[oai(default)]
    summary: String,
}

#[derive(Object, Debug)]
pub struct RespCreateForecast
{
    result_code: String,
    result_msg: String,
    forecast: ForecastElement,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqCreateForecast {
    type Req = ReqCreateForecast;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    date: ");
        s.push_str(&self.date);
        s.push_str("\n    temperature_c: ");
        s.push_str(&self.temperature_c.to_string());
        s.push_str("\n    summary: ");
        s.push_str(&self.summary);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum ForecastResponse {
    #[oai(status = 201)]
    Http201(Json<RespCreateForecast>),
    #[oai(status = 400)]
    Http400(Json<HttpValidationResult>),
    #[oai(status = 409)]
    Http409(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_201(resp: RespCreateForecast) -> ForecastResponse {
    ForecastResponse::Http201(Json(resp))
}
fn make_http_400(msg: String, errors: &[ValidationError]) -> ForecastResponse {
    ForecastResponse::Http400(Json(HttpValidationResult::new(400.to_string(), msg, errors)))
}
fn make_http_409(msg: String) -> ForecastResponse {
    ForecastResponse::Http409(Json(HttpResult::new(409.to_string(), msg)))
}
fn make_http_500(msg: String) -> ForecastResponse {
    ForecastResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl CreateForecastsApi {
    /// Create a forecast.  Only one forecast may exist per date.
    #[oai(path = "/forecasts", method = "post")]
    async fn create_forecast(&self, http_req: &Request, req: Json<ReqCreateForecast>) -> ForecastResponse {
        // -------------------- Process Request ----------------------
        match RespCreateForecast::process(http_req, &req.0, &self.store) {
            Ok(r) => r,
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespCreateForecast {
    /// Create a new response.
    fn new(result_code: &str, result_msg: String, forecast: ForecastElement) -> Self {
        Self {result_code: result_code.to_string(), result_msg, forecast}
    }

    /// Process the request.
    fn process(http_req: &Request, req: &ReqCreateForecast, store: &SharedStore)
    -> Result<ForecastResponse, anyhow::Error> {
        // Conditional logging depending on log level.
        forecast_utils::debug_request(http_req, req);

        // A malformed date never reaches the store.
        let date = match parse_forecast_date(&req.date) {
            Ok(d) => d,
            Err(e) => {
                let errors = vec![ValidationError::new(DATE_FIELD, &e.to_string())];
                let msg = StoreError::Invalid(errors.clone()).to_string();
                error!("{}", msg);
                return Ok(make_http_400(msg, &errors));
            }
        };

        // The lock is held across the conflict check and the append.
        let result = lock_store(store)?.create(date, req.temperature_c, &req.summary);
        match result {
            Ok(f) => {
                info!("Forecast {} created for {} ({}).", f.id, f.date, f.summary);
                Ok(make_http_201(Self::new("0", "success".to_string(), ForecastElement::from(&f))))
            },
            Err(StoreError::Conflict(msg)) => {
                error!("{}", msg);
                Ok(make_http_409(msg))
            },
            Err(StoreError::Invalid(errors)) => {
                let msg = StoreError::Invalid(errors.clone()).to_string();
                error!("{}", msg);
                Ok(make_http_400(msg, &errors))
            },
            Err(e) => Err(e.into()),
        }
    }
}

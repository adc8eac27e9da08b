#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, param::Path, ApiResponse };
use anyhow::Result;
use log::error;

use crate::utils::errors::{HttpResult, StoreError};
use crate::utils::forecast_store::{lock_store, SharedStore};
use crate::utils::forecast_utils::{self, RequestDebug};
use crate::v1::forecasts::ForecastElement;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct GetForecastsApi {
    store: SharedStore,
}

impl GetForecastsApi {
    pub fn new(store: SharedStore) -> Self {
        Self {store}
    }
}

#[derive(Object)]
struct ReqGetForecast
{
    id: i32,
}

#[derive(Object, Debug)]
pub struct RespGetForecast
{
    result_code: String,
    result_msg: String,
    forecast: ForecastElement,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqGetForecast {
    type Req = ReqGetForecast;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    id: ");
        s.push_str(&self.id.to_string());
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum ForecastResponse {
    #[oai(status = 200)]
    Http200(Json<RespGetForecast>),
    #[oai(status = 404)]
    Http404(Json<HttpResult>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: RespGetForecast) -> ForecastResponse {
    ForecastResponse::Http200(Json(resp))
}
fn make_http_404(msg: String) -> ForecastResponse {
    ForecastResponse::Http404(Json(HttpResult::new(404.to_string(), msg)))
}
fn make_http_500(msg: String) -> ForecastResponse {
    ForecastResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl GetForecastsApi {
    /// Get a single forecast by id.
    #[oai(path = "/forecasts/:id", method = "get")]
    async fn get_forecast(&self, http_req: &Request, id: Path<i32>) -> ForecastResponse {
        let req = ReqGetForecast {id: id.0};

        // -------------------- Process Request ----------------------
        match RespGetForecast::process(http_req, &req, &self.store) {
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
impl RespGetForecast {
    /// Create a new response.
    fn new(result_code: &str, result_msg: String, forecast: ForecastElement) -> Self {
        Self {result_code: result_code.to_string(), result_msg, forecast}
    }

    /// Process the request.
    fn process(http_req: &Request, req: &ReqGetForecast, store: &SharedStore)
    -> Result<ForecastResponse, anyhow::Error> {
        // Conditional logging depending on log level.
        forecast_utils::debug_request(http_req, req);

        let result = lock_store(store)?.get_by_id(req.id);
        match result {
            Ok(f) => Ok(make_http_200(Self::new("0", "success".to_string(),
                                                ForecastElement::from(&f)))),
            Err(e @ StoreError::NotFound(_)) => Ok(make_http_404(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse };
use anyhow::Result;
use log::error;

use crate::utils::errors::HttpResult;
use crate::utils::forecast_store::{lock_store, SharedStore};
use crate::utils::forecast_utils::{self, RequestDebug};
use crate::v1::forecasts::ForecastElement;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct ListForecastsApi {
    store: SharedStore,
}

impl ListForecastsApi {
    pub fn new(store: SharedStore) -> Self {
        Self {store}
    }
}

#[derive(Object)]
struct ReqListForecasts
{
    // Empty, the list endpoint takes no filters and no paging.
}

#[derive(Object, Debug)]
pub struct RespListForecasts
{
    result_code: String,
    result_msg: String,
    num_forecasts: i32,
    forecasts: Vec<ForecastElement>,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqListForecasts {
    type Req = ReqListForecasts;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum ForecastResponse {
    #[oai(status = 200)]
    Http200(Json<RespListForecasts>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(resp: RespListForecasts) -> ForecastResponse {
    ForecastResponse::Http200(Json(resp))
}
fn make_http_500(msg: String) -> ForecastResponse {
    ForecastResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListForecastsApi {
    /// List every forecast in insertion order.
    #[oai(path = "/forecasts", method = "get")]
    async fn list_forecasts(&self, http_req: &Request) -> ForecastResponse {
        let req = ReqListForecasts {};

        // -------------------- Process Request ----------------------
        match RespListForecasts::process(http_req, &req, &self.store) {
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
impl RespListForecasts {
    /// Create a new response.
    fn new(result_code: &str, result_msg: String, num_forecasts: i32, forecasts: Vec<ForecastElement>)
    -> Self {
        Self {result_code: result_code.to_string(), result_msg, num_forecasts, forecasts}
    }

    /// Process the request.
    fn process(http_req: &Request, req: &ReqListForecasts, store: &SharedStore)
    -> Result<ForecastResponse, anyhow::Error> {
        // Conditional logging depending on log level.
        forecast_utils::debug_request(http_req, req);

        // Copy the records out so the lock is released before conversion.
        let records = lock_store(store)?.list();
        let forecasts: Vec<ForecastElement> = records.iter().map(ForecastElement::from).collect();
        Ok(make_http_200(Self::new("0", "success".to_string(),
                                   forecasts.len() as i32, forecasts)))
    }
}

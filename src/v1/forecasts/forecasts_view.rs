#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::{Html, Json}, Object, ApiResponse };
use anyhow::{Result, anyhow};
use log::error;
use tera::{Context, Tera};

use crate::utils::errors::{Errors, HttpResult};
use crate::utils::forecast_store::{lock_store, SharedStore};
use crate::utils::forecast_utils::{self, RequestDebug};
use crate::v1::forecasts::ForecastElement;

// The page template is compiled into the binary.
const FORECASTS_TEMPLATE_NAME: &str = "forecasts.html";
const FORECASTS_TEMPLATE: &str = include_str!("../../../templates/forecasts.html");

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct ViewForecastsApi {
    store: SharedStore,
    title: String,
}

impl ViewForecastsApi {
    pub fn new(store: SharedStore, title: &str) -> Self {
        Self {store, title: title.to_string()}
    }
}

#[derive(Object)]
struct ReqViewForecasts
{
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqViewForecasts {
    type Req = ReqViewForecasts;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(ApiResponse)]
enum ForecastResponse {
    #[oai(status = 200)]
    Http200(Html<String>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_500(msg: String) -> ForecastResponse {
    ForecastResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ViewForecastsApi {
    /// Render all forecasts as an HTML page.
    #[oai(path = "/view/forecasts", method = "get")]
    async fn view_forecasts(&self, http_req: &Request) -> ForecastResponse {
        let req = ReqViewForecasts {};
        forecast_utils::debug_request(http_req, &req);

        match self.process() {
            Ok(page) => ForecastResponse::Http200(Html(page)),
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}

impl ViewForecastsApi {
    fn process(&self) -> Result<String> {
        let records = lock_store(&self.store)?.list();
        let forecasts: Vec<ForecastElement> = records.iter().map(ForecastElement::from).collect();
        render_forecasts(&self.title, &forecasts)
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// render_forecasts:
// ---------------------------------------------------------------------------
/** Render the forecast page.  Values are html escaped. */
fn render_forecasts(title: &str, forecasts: &[ForecastElement]) -> Result<String> {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("forecasts", forecasts);

    let mut tera = Tera::default();
    tera.autoescape_on(vec![".html"]);
    tera.add_raw_template(FORECASTS_TEMPLATE_NAME, FORECASTS_TEMPLATE)
        .and_then(|_| tera.render(FORECASTS_TEMPLATE_NAME, &context))
        .map_err(|e| anyhow!(Errors::TemplateRender(FORECASTS_TEMPLATE_NAME.to_string(), e.to_string())))
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: i32, summary: &str) -> ForecastElement {
        ForecastElement {id, date: "2024-03-10".to_string(), temperature_c: 12,
                         temperature_f: 53, summary: summary.to_string()}
    }

    #[test]
    fn renders_rows() {
        let page = render_forecasts("Weather", &[element(0, "Cool"), element(1, "Warm")]).unwrap();
        assert!(page.contains("<title>Weather</title>"));
        assert!(page.contains("Cool"));
        assert!(page.contains("Warm"));
        assert!(page.contains("53"));
    }

    #[test]
    fn escapes_summaries() {
        let page = render_forecasts("Weather", &[element(0, "<script>x</script>")]).unwrap();
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn renders_empty_list() {
        let page = render_forecasts("Weather", &[]).unwrap();
        assert!(page.contains("No forecasts"));
    }
}

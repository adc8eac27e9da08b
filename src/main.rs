#![forbid(unsafe_code)]

use anyhow::Result;
use lazy_static::lazy_static;
use log::info;
use poem::web::Redirect;
use poem::{get, handler, listener::TcpListener, Route};
use poem_openapi::{param::Query, payload::PlainText, OpenApi, OpenApiService};

// Forecast Server Utilities
use crate::v1::forecasts::forecasts_create::CreateForecastsApi;
use crate::v1::forecasts::forecasts_get::GetForecastsApi;
use crate::v1::forecasts::forecasts_list::ListForecastsApi;
use crate::v1::forecasts::forecasts_view::ViewForecastsApi;
use crate::v1::forecasts::version::{RespVersion, VersionApi};
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx, FORECAST_ARGS, FORECAST_DIRS};
use crate::utils::errors::Errors;
use crate::utils::forecast_store::{ForecastStore, SharedStore};

// Modules
mod utils;
mod v1;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "ForecastServer"; // for poem logging
const API_VERSION : &str = env!("CARGO_PKG_VERSION");
const SWAGGER_PATH: &str = "/swagger";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Server --------------
    println!("Starting forecast_server!");

    // Only create the data directories if requested.
    if FORECAST_ARGS.create_dirs_only {
        println!("Data directories created under {}.", FORECAST_DIRS.root_dir);
        return Ok(());
    }

    forecast_init();

    // --------------- Main Loop Set Up ---------------
    // Assign base URL.
    let forecast_url = format!("{}:{}{}",
        RUNTIME_CTX.parms.config.http_addr,
        RUNTIME_CTX.parms.config.http_port,
        "/v1");

    // The store lives for the life of the process and is shared by all endpoints.
    let store = ForecastStore::new().into_shared();
    let app = make_app(store, &RUNTIME_CTX.parms.config.title, &forecast_url);

    // ------------------ Main Loop -------------------
    let addr = format!("{}{}", "0.0.0.0:", RUNTIME_CTX.parms.config.http_port);
    info!("Listening on {}, API base URL {}.", addr, forecast_url);
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// forecast_init:
// ---------------------------------------------------------------------------
/** Initialize logging and the runtime context before the main loop starts. */
fn forecast_init() {
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    // Log build info.
    info!("\n{}.", RespVersion::build_info());
}

// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the API endpoints, generated docs and the swagger ui into a
 * single route tree.
 */
fn make_app(store: SharedStore, title: &str, server_url: &str) -> Route {
    let endpoints = (HelloApi,
                     ListForecastsApi::new(store.clone()),
                     GetForecastsApi::new(store.clone()),
                     CreateForecastsApi::new(store.clone()),
                     ViewForecastsApi::new(store, title),
                     VersionApi);
    let api_service =
        OpenApiService::new(endpoints, title, API_VERSION).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/v1", api_service)
        .nest(SWAGGER_PATH, ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .at("/", get(root_redirect))
}

// ---------------------------------------------------------------------------
// root_redirect:
// ---------------------------------------------------------------------------
#[handler]
fn root_redirect() -> Redirect {
    Redirect::see_other(SWAGGER_PATH)
}

// ***************************************************************************
//                             Hello Endpoint
// ***************************************************************************
// Hello structure.
struct HelloApi;

// ---------------------------------------------------------------------------
// hello endpoint:
// ---------------------------------------------------------------------------
#[OpenApi]
impl HelloApi {
    #[oai(path = "/hello", method = "get")]
    async fn index(&self, name: Query<Option<String>>) -> PlainText<String> {
        match name.0 {
            Some(name) => PlainText(format!("hello, {}!", name)),
            None => PlainText("hello!".to_string()),
        }
    }
}

#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::Json, Object };

// From cargo.toml and build.rs.
const FORECAST_VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");
const UNKNOWN: &str = "unknown";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct VersionApi;

#[derive(Object, Debug)]
pub struct RespVersion
{
    result_code: String,
    result_msg: String,
    forecast_version: String,
    git_branch: String,
    git_commit: String,
    git_dirty: String,
    source_ts: String,
    rustc_version: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl VersionApi {
    /// Report the server version and build information.
    #[oai(path = "/version", method = "get")]
    async fn get_version(&self) -> Json<RespVersion> {
        Json(RespVersion::process())
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl RespVersion {
    fn process() -> RespVersion {
        Self {result_code: "0".to_string(),
              result_msg: "success".to_string(),
              forecast_version: FORECAST_VERSION.unwrap_or(UNKNOWN).to_string(),
              git_branch: option_env!("GIT_BRANCH").unwrap_or(UNKNOWN).to_string(),
              git_commit: option_env!("GIT_COMMIT_SHORT").unwrap_or(UNKNOWN).to_string(),
              git_dirty: option_env!("GIT_DIRTY").unwrap_or(UNKNOWN).to_string(),
              source_ts: option_env!("SOURCE_TIMESTAMP").unwrap_or(UNKNOWN).to_string(),
              rustc_version: option_env!("RUSTC_VERSION").unwrap_or(UNKNOWN).to_string(),
        }
    }

    /// One line summary for the startup log.
    pub fn build_info() -> String {
        let v = Self::process();
        format!("*** Running FORECAST={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}",
                v.forecast_version, v.git_branch, v.git_commit, v.git_dirty, v.source_ts, v.rustc_version)
    }
}

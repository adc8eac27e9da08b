#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, error, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::{env, fs, path::Path};
use fs_mistrust::Mistrust;
use std::os::unix::fs::PermissionsExt;
use lazy_static::lazy_static;
use structopt::StructOpt;

use crate::utils::{forecast_utils, errors::Errors};

use super::forecast_utils::get_absolute_path;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_FORECAST_ROOT_DIR : &str = "FORECAST_ROOT_DIR";
const ENV_FORECAST_LOGS_DIR : &str = "FORECAST_LOGS_DIR";  // set for log4rs.yml
const DEFAULT_ROOT_DIR      : &str = "~/.forecast";
const CONFIG_DIR            : &str = "/config";
const LOGS_DIR              : &str = "/logs";
const LOG4RS_CONFIG_FILE    : &str = "/log4rs.yml";    // relative to config dir
const FORECAST_CONFIG_FILE  : &str = "/forecast.toml"; // relative to config dir

// Fallback console logging when no log4rs file is present.
const CONSOLE_LOG_PATTERN   : &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {h({l})} {t} - {m}{n}";

// Networking.
const DEFAULT_HTTP_ADDR     : &str = "http://localhost";
const DEFAULT_HTTP_PORT     : u16  = 3000;

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref FORECAST_ARGS: ForecastArgs = init_forecast_args();
}

// Calculate the data directories BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref FORECAST_DIRS: ForecastDirs = init_forecast_dirs();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ForecastDirs:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct ForecastDirs {
    pub root_dir: String,
    pub config_dir: String,
    pub logs_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// ForecastArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, StructOpt)]
#[structopt(name = "forecast_args", about = "Command line arguments for the Forecast Server.")]
pub struct ForecastArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the configuration and log files.
    #[structopt(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the FORECAST_ROOT_DIR environment,
    ///
    ///   2. Otherwise, if set, the value of the --root_dir command line argument,
    ///
    ///   3. Otherwise, ~/.forecast
    ///
    #[structopt(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
#[allow(dead_code)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub forecast_args: &'static ForecastArgs,
    pub forecast_dirs: &'static ForecastDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Forecast Server".to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_forecast_args:
// ---------------------------------------------------------------------------
/** Get the command line arguments. */
fn init_forecast_args() -> ForecastArgs {
    let args = ForecastArgs::from_args();
    println!("{:?}", args);
    args
}

// ---------------------------------------------------------------------------
// init_forecast_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories. */
fn init_forecast_dirs() -> ForecastDirs {
    let mistrust = get_mistrust();

    // Check that each path is absolute and is a directory with the
    // proper permission assign if it exists.  If it doesn't exist,
    // create it.
    let root_dir = get_root_dir();
    check_forecast_dir(&root_dir, "root directory", &mistrust);

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_forecast_dir(&config_dir, "config directory", &mistrust);

    let logs_dir = root_dir.clone() + LOGS_DIR;
    check_forecast_dir(&logs_dir, "logs directory", &mistrust);

    ForecastDirs {root_dir, config_dir, logs_dir}
}

// ---------------------------------------------------------------------------
// check_forecast_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that is has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust package
 * creates directories with 0o700 permissions.
 *
 * Any failure results in a panic.
 */
fn check_forecast_dir(dir: &str, msgname: &str, mistrust: &Mistrust) {
    let path = Path::new(dir);
    if !path.is_absolute() {
        panic!("The forecast server {} path must be absolute: {}", msgname, dir);
    }
    if path.exists() {
        if !path.is_dir() {
            panic!("The forecast server {} path must be a directory: {}", msgname, dir);
        }

        // Make sure the directory had rwx for owner only.
        let meta = path.metadata().unwrap_or_else(|_| panic!("Unable to read metadata for {}: {}", msgname, dir));
        let perm = meta.permissions().mode();
        if perm & 0o777 != 0o700 {
            panic!("The forecast server {} path must be have 0o700 permissions: {}", msgname, dir);
        }
    } else if let Err(e) = mistrust.make_directory(path) {
        panic!("Make directory error for {:?}: {}", path, &e.to_string());
    }
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Mistrust {
    match Mistrust::builder()
        .ignore_prefix(get_absolute_path("~"))
        .trust_group(0)
        .build() {
            Ok(m) => m,
            Err(e) => {
                panic!("Mistrust configuration error: {}", &e.to_string());
            }
        }
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir() -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_FORECAST_ROOT_DIR).unwrap_or_else(
        |_| {
            match FORECAST_ARGS.root_dir.clone() {
                Some(r) => r,
                None => DEFAULT_ROOT_DIR.to_string(),
            }
        });

    get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the configuration directory's log4rs.yml.  If that
 * file doesn't exist, log to the console at info level.
 */
pub fn init_log() {
    let logconfig = init_log_config();
    if !Path::new(&logconfig).exists() {
        init_console_log();
        info!("No log configuration at {}, logging to console.", logconfig);
        return;
    }

    // File appenders in log4rs.yml reference $ENV{FORECAST_LOGS_DIR}.
    export_logs_dir(&FORECAST_DIRS.logs_dir);
    match log4rs::init_file(logconfig.clone(), Default::default()) {
        Ok(_) => (),
        Err(e) => {
            println!("{}", e);
            let s = format!("{}", Errors::Log4rsInitialization(logconfig));
            panic!("{}", s);
        },
    }
    info!("Log4rs initialized using: {}", logconfig);
}

// ---------------------------------------------------------------------------
// export_logs_dir:
// ---------------------------------------------------------------------------
/** Publish the computed logs directory in the environment so that log file
 * paths follow the root directory however it was chosen.
 */
fn export_logs_dir(logs_dir: &str) {
    env::set_var(ENV_FORECAST_LOGS_DIR, logs_dir);
}

// ---------------------------------------------------------------------------
// init_console_log:
// ---------------------------------------------------------------------------
fn init_console_log() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_LOG_PATTERN)))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));

    let result = match config {
        Ok(c) => log4rs::init_config(c).map(|_| ()).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    if let Err(e) = result {
        let s = format!("{}", Errors::Log4rsInitialization(e));
        panic!("{}", s);
    }
}

// ---------------------------------------------------------------------------
// init_log_config:
// ---------------------------------------------------------------------------
fn init_log_config() -> String {
    FORECAST_DIRS.config_dir.clone() + LOG4RS_CONFIG_FILE
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * configuration directory.  If the file cannot be read, default values are
 * used.  A file that exists but cannot be parsed is an error.
 */
fn get_parms() -> Result<Parms> {
    let config_file = FORECAST_DIRS.config_dir.clone() + FORECAST_CONFIG_FILE;

    let config_file_abs = forecast_utils::get_absolute_path(&config_file);
    info!("{}", Errors::ReadingConfigFile(config_file_abs.clone()));
    let contents = match fs::read_to_string(&config_file_abs) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    let config = parse_config(&contents, &config_file_abs)?;
    Ok(Parms { config_file: config_file_abs, config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
/** Parse toml configuration content.  Missing keys take their default values. */
pub fn parse_config(contents: &str, config_file: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c)  => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Result::Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> RuntimeCtx {
    // The application aborts if the configuration can't be read.
    let parms = get_parms().expect("FAILED to read configuration file.");
    RuntimeCtx {parms, forecast_args: &FORECAST_ARGS, forecast_dirs: &FORECAST_DIRS}
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::new();
        assert_eq!(config.title, "Forecast Server");
        assert_eq!(config.http_addr, DEFAULT_HTTP_ADDR);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            title = "Test Forecasts"
            http_addr = "http://example.org"
            http_port = 8080
        "#;
        let config = parse_config(toml, "test.toml").unwrap();
        assert_eq!(config, Config {
            title: "Test Forecasts".to_string(),
            http_addr: "http://example.org".to_string(),
            http_port: 8080,
        });
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let config = parse_config("http_port = 9000", "test.toml").unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.title, "Forecast Server");
    }

    #[test]
    fn parse_bad_config_fails() {
        let err = parse_config("http_port = \"not a number\"", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn logs_dir_is_exported_for_log4rs() {
        export_logs_dir("/tmp/forecast_test/logs");
        assert_eq!(env::var(ENV_FORECAST_LOGS_DIR).unwrap(), "/tmp/forecast_test/logs");

        // The sample log4rs configuration writes into the exported directory.
        let sample = include_str!("../../resources/log4rs.yml");
        let env_ref = format!("$ENV{{{}}}", ENV_FORECAST_LOGS_DIR);
        assert!(sample.contains(&format!("{}/forecast_server.log", env_ref)));
        assert!(!sample.contains("$ENV{HOME}"));
    }
}

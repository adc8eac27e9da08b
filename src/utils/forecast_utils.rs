#![forbid(unsafe_code)]

use path_absolutize::Absolutize;
use std::ops::Deref;
use std::path::Path;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use poem::Request;

use anyhow::{Result, anyhow};
use log::{debug, LevelFilter};

// Calendar date format used on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ***************************************************************************
// GENERAL PUBLIC FUNCTIONS
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_absolute_path:
// ---------------------------------------------------------------------------
/** Replace tilde (~) and environment variable values in a path name and
 * then construct the absolute path name.  Unlike canonicalize, absolutize
 * does not care whether the file exists.  On any error the original path
 * is returned.
 */
pub fn get_absolute_path(path: &str) -> String {
    let s = match shellexpand::full(path) {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };

    let p = Path::new(s.deref());
    let p1 = match p.absolutize() {
        Ok(x) => x,
        Err(_) => return path.to_owned(),
    };
    match p1.to_str() {
        Some(x) => x.to_owned(),
        None => path.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// parse_forecast_date:
// ---------------------------------------------------------------------------
/** Parse a forecast date.  Plain dates (2024-03-10), rfc3339 timestamps
 * (2024-03-10T08:00:00Z) and naive timestamps (2024-03-10T08:00:00) are
 * accepted; only the date component is kept.
 */
pub fn parse_forecast_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(d);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = s.parse::<NaiveDateTime>() {
        return Ok(ts.date());
    }
    Err(anyhow!("Unable to parse '{}' as a date (expected YYYY-MM-DD or an rfc3339 timestamp).", s))
}

// ---------------------------------------------------------------------------
// date_to_str:
// ---------------------------------------------------------------------------
pub fn date_to_str(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ***************************************************************************
//                                  Traits
// ***************************************************************************
pub trait RequestDebug {
    type Req;
    fn get_request_info(&self) -> String;
}

// ---------------------------------------------------------------------------
// debug_request:
// ---------------------------------------------------------------------------
// Dump http request information to the log.
pub fn debug_request(http_req: &Request, req: &impl RequestDebug) {
    // Check that debug or higher logging is in effect.
    let level = log::max_level();
    if level < LevelFilter::Debug {
        return;
    }

    // Accumulate the output.
    let mut s = "\n".to_string();

    // Restate the URI.
    let uri = http_req.uri();
    s += format!("  URI: {:?}\n", uri).as_str();

    // Accumulate the headers
    for v in http_req.headers().iter() {
        s += format!("  Header: {} = {:?} \n", v.0, v.1).as_str();
    };

    // List query parameters.
    if let Some(q) = uri.query() {
        s += format!("  Query Parameters: {:?}\n", q).as_str();
    } else {
        s += "  * No Query Parameters\n";
    }

    // Add the request's information.
    s += req.get_request_info().as_str();

    // Write the single log record.
    debug!("{}", s);
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        let d = parse_forecast_date("2024-03-10").unwrap();
        assert_eq!(date_to_str(d), "2024-03-10");
    }

    #[test]
    fn parses_timestamps_keeping_date() {
        let d = parse_forecast_date("2024-03-10T23:15:00Z").unwrap();
        assert_eq!(date_to_str(d), "2024-03-10");
        let d = parse_forecast_date("2024-03-10T08:00:00").unwrap();
        assert_eq!(date_to_str(d), "2024-03-10");
        let d = parse_forecast_date("2024-03-10T08:00:00-05:00").unwrap();
        assert_eq!(date_to_str(d), "2024-03-10");
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_forecast_date("").is_err());
        assert!(parse_forecast_date("tomorrow").is_err());
        assert!(parse_forecast_date("2024-02-30").is_err());
    }

    #[test]
    fn absolute_path_is_absolute() {
        let p = get_absolute_path("some/relative/dir");
        assert!(Path::new(&p).is_absolute());
        assert!(p.ends_with("some/relative/dir"));
    }
}

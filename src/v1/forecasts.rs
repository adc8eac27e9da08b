#![forbid(unsafe_code)]

use poem_openapi::Object;
use serde::Serialize;

use crate::utils::forecast_types::Forecast;
use crate::utils::forecast_utils::date_to_str;

pub mod forecasts_create;
pub mod forecasts_get;
pub mod forecasts_list;
pub mod forecasts_view;
pub mod version;

// ***************************************************************************
//                          Shared Response Definitions
// ***************************************************************************
/// The representation of a forecast in every endpoint response.
#[derive(Object, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ForecastElement
{
    pub id: i32,
    pub date: String,
    pub temperature_c: i32,
    pub temperature_f: i64,
    pub summary: String,
}

impl From<&Forecast> for ForecastElement {
    fn from(f: &Forecast) -> Self {
        Self {id: f.id,
              date: date_to_str(f.date),
              temperature_c: f.temperature_c,
              temperature_f: f.temperature_f(),
              summary: f.summary.clone()}
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn element_from_forecast() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let elem = ForecastElement::from(&Forecast::new(7, date, 32, "Hot".to_string()));
        assert_eq!(elem, ForecastElement {id: 7, date: "2024-03-10".to_string(),
                                          temperature_c: 32, temperature_f: 89,
                                          summary: "Hot".to_string()});
    }
}

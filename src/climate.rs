//! Monthly weather drivers consumed by the energy balance engine, and the glue that derives
//! them from an hourly weather year.

use crate::compare_floats::max_of_2;
use crate::core::month::Month;
use crate::core::orientation::OrientationValues;
use crate::core::units::{average_monthly_to_annual, HOURS_PER_DAY, HOURS_PER_YEAR};
use anyhow::bail;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Base temperature for heating and cooling degree days, in Celsius
pub const DEGREE_DAY_BASE_TEMPERATURE: f64 = 18.;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonthlyClimate {
    /// mean outdoor air temperature, in Celsius
    pub mean_temperature: f64,
    /// mean total irradiance on each facade and on the horizontal (roof), in W/m2
    pub solar_radiation: OrientationValues<f64>,
    /// in K.day
    pub heating_degree_days: f64,
    /// in K.day
    pub cooling_degree_days: f64,
}

/// Twelve monthly climate records, January first.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClimateSummary {
    months: [MonthlyClimate; 12],
}

impl ClimateSummary {
    pub fn new(months: [MonthlyClimate; 12]) -> Self {
        Self { months }
    }

    /// Build a summary from monthly mean temperatures and irradiances, estimating degree days
    /// from the monthly mean temperature alone.
    pub fn from_monthly_means(
        mean_temperatures: [f64; 12],
        solar_radiation: [OrientationValues<f64>; 12],
    ) -> Self {
        let months = Month::ALL.map(|month| {
            let mean_temperature = mean_temperatures[month.index()];
            let days = month.days() as f64;

            MonthlyClimate {
                mean_temperature,
                solar_radiation: solar_radiation[month.index()],
                heating_degree_days: days
                    * max_of_2(0., DEGREE_DAY_BASE_TEMPERATURE - mean_temperature),
                cooling_degree_days: days
                    * max_of_2(0., mean_temperature - DEGREE_DAY_BASE_TEMPERATURE),
            }
        });

        Self { months }
    }

    /// Aggregate an hourly weather year into monthly means and degree days.
    pub fn from_hourly(weather: &HourlyWeather) -> anyhow::Result<Self> {
        let expected_hours = HOURS_PER_YEAR as usize;
        if weather.air_temperatures.len() != expected_hours {
            bail!(
                "Hourly weather must cover {expected_hours} hours, got {} air temperatures",
                weather.air_temperatures.len()
            );
        }
        if weather.solar_irradiance.len() != expected_hours {
            bail!(
                "Hourly weather must cover {expected_hours} hours, got {} irradiance values",
                weather.solar_irradiance.len()
            );
        }
        if let Some(hour) = weather
            .air_temperatures
            .iter()
            .position(|temperature| !temperature.is_finite())
        {
            bail!("Air temperature at hour {hour} is not a finite number");
        }

        let months = Month::ALL.map(|month| {
            let (start, end) = month.start_end_hours();
            let hours = start as usize..end as usize;
            let hour_count = month.hours();

            let temperatures = &weather.air_temperatures[hours.clone()];
            let mean_temperature = temperatures.iter().sum::<f64>() / hour_count;

            let irradiance = &weather.solar_irradiance[hours];
            let solar_radiation = OrientationValues::from_fn(|orientation| {
                irradiance
                    .iter()
                    .map(|values| max_of_2(0., values[orientation]))
                    .sum::<f64>()
                    / hour_count
            });

            let (heating_degree_days, cooling_degree_days) = temperatures
                .chunks(HOURS_PER_DAY as usize)
                .map(|day| day.iter().sum::<f64>() / day.len() as f64)
                .fold((0., 0.), |(heating, cooling), daily_mean| {
                    (
                        heating + max_of_2(0., DEGREE_DAY_BASE_TEMPERATURE - daily_mean),
                        cooling + max_of_2(0., daily_mean - DEGREE_DAY_BASE_TEMPERATURE),
                    )
                });

            MonthlyClimate {
                mean_temperature,
                solar_radiation,
                heating_degree_days,
                cooling_degree_days,
            }
        });

        Ok(Self { months })
    }

    pub fn month(&self, month: Month) -> &MonthlyClimate {
        &self.months[month.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, &MonthlyClimate)> {
        Month::ALL.into_iter().zip(self.months.iter())
    }

    /// Day-weighted mean of the monthly mean temperatures
    pub fn annual_mean_temperature(&self) -> f64 {
        average_monthly_to_annual(self.months.map(|month| month.mean_temperature))
    }

    pub fn annual_heating_degree_days(&self) -> f64 {
        self.months.iter().map(|m| m.heating_degree_days).sum()
    }

    pub fn annual_cooling_degree_days(&self) -> f64 {
        self.months.iter().map(|m| m.cooling_degree_days).sum()
    }
}

/// One year of hourly weather, hour 0 being the first hour of January 1st.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HourlyWeather {
    /// in Celsius
    pub air_temperatures: Vec<f64>,
    /// total irradiance on each facade and on the horizontal, in W/m2
    pub solar_irradiance: Vec<OrientationValues<f64>>,
}

/// Resolves a weather file reference into a climate summary.
pub trait ClimateSource {
    fn resolve(&self, weather_file: &str) -> Option<Arc<ClimateSummary>>;
}

/// An in-memory set of climate summaries keyed by weather file reference. Summaries are shared
/// read-only by every model compiled against them.
#[derive(Clone, Debug, Default)]
pub struct ClimateLibrary {
    summaries: IndexMap<String, Arc<ClimateSummary>>,
}

impl ClimateLibrary {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(
        &mut self,
        weather_file: impl Into<String>,
        summary: ClimateSummary,
    ) -> Option<Arc<ClimateSummary>> {
        self.summaries
            .insert(weather_file.into(), Arc::new(summary))
    }

    pub fn with(mut self, weather_file: impl Into<String>, summary: ClimateSummary) -> Self {
        self.insert(weather_file, summary);
        self
    }

    pub fn weather_files(&self) -> impl Iterator<Item = &str> {
        self.summaries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl ClimateSource for ClimateLibrary {
    fn resolve(&self, weather_file: &str) -> Option<Arc<ClimateSummary>> {
        self.summaries.get(weather_file).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::orientation::Orientation;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn constant_weather() -> HourlyWeather {
        HourlyWeather {
            air_temperatures: vec![8.; HOURS_PER_YEAR as usize],
            solar_irradiance: (0..HOURS_PER_YEAR)
                .map(|hour| {
                    // sun up for half of every day
                    let irradiance = if hour % 24 >= 6 && hour % 24 < 18 {
                        200.
                    } else {
                        0.
                    };
                    OrientationValues::from_fn(|orientation| match orientation {
                        Orientation::Roof => irradiance * 2.,
                        _ => irradiance,
                    })
                })
                .collect(),
        }
    }

    #[rstest]
    fn should_aggregate_hourly_weather_into_months(constant_weather: HourlyWeather) {
        let summary = ClimateSummary::from_hourly(&constant_weather).unwrap();

        assert_eq!(summary.iter().count(), 12);
        for (month, climate) in summary.iter() {
            assert_relative_eq!(climate.mean_temperature, 8.);
            assert_relative_eq!(climate.solar_radiation.south, 100.);
            assert_relative_eq!(climate.solar_radiation.roof, 200.);
            assert_relative_eq!(climate.heating_degree_days, 10. * month.days() as f64);
            assert_eq!(climate.cooling_degree_days, 0.);
        }
        assert_relative_eq!(summary.annual_mean_temperature(), 8.);
        assert_relative_eq!(summary.annual_heating_degree_days(), 3650.);
    }

    #[rstest]
    fn should_count_degree_days_from_daily_means(mut constant_weather: HourlyWeather) {
        // first day of January at 28C, the rest of the month at 8C
        for hour in 0..24 {
            constant_weather.air_temperatures[hour] = 28.;
        }

        let january = *ClimateSummary::from_hourly(&constant_weather)
            .unwrap()
            .month(Month::January);

        assert_relative_eq!(january.cooling_degree_days, 10.);
        assert_relative_eq!(january.heating_degree_days, 300.);
        assert_relative_eq!(january.mean_temperature, (28. + 8. * 30.) / 31.);
    }

    #[rstest]
    fn should_reject_incomplete_weather_year(mut constant_weather: HourlyWeather) {
        constant_weather.air_temperatures.pop();
        assert!(ClimateSummary::from_hourly(&constant_weather).is_err());
    }

    #[rstest]
    fn should_reject_non_finite_temperatures(mut constant_weather: HourlyWeather) {
        constant_weather.air_temperatures[100] = f64::NAN;
        assert!(ClimateSummary::from_hourly(&constant_weather).is_err());
    }

    #[rstest]
    fn should_resolve_shared_summaries_by_weather_file() {
        let summary = ClimateSummary::from_monthly_means(
            [0.; 12],
            [OrientationValues::uniform(50.); 12],
        );
        let library = ClimateLibrary::new().with("cold.epw", summary.clone());

        let first = library.resolve("cold.epw").unwrap();
        let second = library.resolve("cold.epw").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, summary);
        assert!(library.resolve("missing.epw").is_none());
        assert_eq!(library.weather_files().collect::<Vec<_>>(), vec!["cold.epw"]);
    }

    #[rstest]
    fn should_estimate_degree_days_from_monthly_means() {
        let mut temperatures = [18.; 12];
        temperatures[Month::January.index()] = 8.;
        temperatures[Month::July.index()] = 24.;
        let summary =
            ClimateSummary::from_monthly_means(temperatures, [OrientationValues::default(); 12]);

        assert_relative_eq!(summary.month(Month::January).heating_degree_days, 310.);
        assert_relative_eq!(summary.month(Month::July).cooling_degree_days, 186.);
        assert_eq!(summary.month(Month::March).heating_degree_days, 0.);
    }
}

//! Simulation results, and the aggregation of per-end-use energy into fuel types.

use crate::compare_floats::non_negative;
use crate::core::end_uses::{EndUse, EndUseFuelMap, FuelType};
use crate::core::month::Month;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use strum::EnumCount;
use thiserror::Error;

/// Energy per end use, in kWh/m2. Never negative.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(
    from = "IndexMap<EndUse, f64>",
    into = "IndexMap<EndUse, f64>"
)]
pub struct EndUseValues([f64; EndUse::COUNT]);

impl EndUseValues {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, end_use: EndUse) -> f64 {
        self.0[end_use.index()]
    }

    /// Set the energy for an end use, clamping it at zero.
    pub fn set(&mut self, end_use: EndUse, energy: f64) {
        self.0[end_use.index()] = non_negative(energy);
    }

    pub fn with(mut self, end_use: EndUse, energy: f64) -> Self {
        self.set(end_use, energy);
        self
    }

    /// Values in canonical end use order
    pub fn iter(&self) -> impl Iterator<Item = (EndUse, f64)> + '_ {
        EndUse::ALL
            .into_iter()
            .map(|end_use| (end_use, self.get(end_use)))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl Index<EndUse> for EndUseValues {
    type Output = f64;

    fn index(&self, end_use: EndUse) -> &Self::Output {
        &self.0[end_use.index()]
    }
}

impl From<IndexMap<EndUse, f64>> for EndUseValues {
    fn from(values: IndexMap<EndUse, f64>) -> Self {
        values
            .into_iter()
            .fold(Self::new(), |acc, (end_use, energy)| acc.with(end_use, energy))
    }
}

impl From<EndUseValues> for IndexMap<EndUse, f64> {
    fn from(values: EndUseValues) -> Self {
        values.iter().collect()
    }
}

/// Energy delivered to the building in one calendar month.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MonthlyResult {
    month: Month,
    end_uses: EndUseValues,
    fuel_map: EndUseFuelMap,
}

impl MonthlyResult {
    pub(crate) fn new(month: Month, end_uses: EndUseValues, fuel_map: EndUseFuelMap) -> Self {
        Self {
            month,
            end_uses,
            fuel_map,
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn end_uses(&self) -> &EndUseValues {
        &self.end_uses
    }

    /// Energy of an end use in kWh/m2, zero if the building does not use it
    pub fn end_use(&self, end_use: EndUse) -> f64 {
        self.end_uses.get(end_use)
    }

    /// Energy of all end uses served by a fuel type, in kWh/m2
    pub fn fuel_type(&self, fuel_type: FuelType) -> f64 {
        self.fuel_map
            .end_uses_for(fuel_type)
            .map(|end_use| self.end_use(end_use))
            .sum()
    }

    /// Energy of an end use if it is served by the given fuel type, otherwise zero
    pub fn end_use_by_fuel(&self, end_use: EndUse, fuel_type: FuelType) -> f64 {
        if self.fuel_map.fuel_for(end_use) == Some(fuel_type) {
            self.end_use(end_use)
        } else {
            0.
        }
    }

    /// Energy per fuel type, in canonical fuel type order
    pub fn fuel_types(&self) -> impl Iterator<Item = (FuelType, f64)> + '_ {
        FuelType::ALL
            .into_iter()
            .map(|fuel_type| (fuel_type, self.fuel_type(fuel_type)))
    }

    pub fn total(&self) -> f64 {
        self.end_uses.total()
    }
}

/// The outcome of one simulation run: twelve monthly results, January first.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "ResultsRecord")]
pub struct Results {
    monthly_results: Vec<MonthlyResult>,
    /// energy use intensity, in kWh/m2
    total_energy_use: f64,
    /// in m2, as simulated
    floor_area: f64,
}

impl Results {
    /// Assemble results from the energy of each end use in each month.
    pub(crate) fn aggregate(
        monthly_end_uses: [EndUseValues; 12],
        fuel_map: &EndUseFuelMap,
        floor_area: f64,
    ) -> Self {
        let monthly_results = Month::ALL
            .into_iter()
            .zip(monthly_end_uses)
            .map(|(month, end_uses)| MonthlyResult::new(month, end_uses, fuel_map.clone()))
            .collect::<Vec<_>>();
        let total_energy_use = monthly_results.iter().map(MonthlyResult::total).sum();

        Self {
            monthly_results,
            total_energy_use,
            floor_area,
        }
    }

    pub fn monthly_results(&self) -> &[MonthlyResult] {
        &self.monthly_results
    }

    pub fn monthly_result(&self, month: Month) -> &MonthlyResult {
        &self.monthly_results[month.index()]
    }

    pub fn annual_end_use(&self, end_use: EndUse) -> f64 {
        self.monthly_results
            .iter()
            .map(|result| result.end_use(end_use))
            .sum()
    }

    pub fn annual_fuel_type(&self, fuel_type: FuelType) -> f64 {
        self.monthly_results
            .iter()
            .map(|result| result.fuel_type(fuel_type))
            .sum()
    }

    /// Annual energy use intensity, in kWh/m2
    pub fn total_energy_use(&self) -> f64 {
        self.total_energy_use
    }

    /// Annual energy use of the whole building, in kWh
    pub fn total_energy_use_absolute(&self) -> f64 {
        self.total_energy_use * self.floor_area
    }

    pub fn floor_area(&self) -> f64 {
        self.floor_area
    }
}

/// Results as read back from their serialized form, before the monthly records are checked.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ResultsRecord {
    monthly_results: Vec<MonthlyResult>,
    #[allow(dead_code)]
    total_energy_use: f64,
    floor_area: f64,
}

impl TryFrom<ResultsRecord> for Results {
    type Error = ResultsError;

    // the stored total is recomputed so it always matches the months
    fn try_from(record: ResultsRecord) -> Result<Self, Self::Error> {
        let ResultsRecord {
            monthly_results,
            floor_area,
            ..
        } = record;

        if monthly_results.len() != Month::ALL.len() {
            return Err(ResultsError::MonthCount(monthly_results.len()));
        }
        if let Some((expected, result)) = Month::ALL
            .into_iter()
            .zip(&monthly_results)
            .find(|(expected, result)| result.month() != *expected)
        {
            return Err(ResultsError::MonthOrder {
                expected,
                found: result.month(),
            });
        }
        if !(floor_area.is_finite() && floor_area >= 0.) {
            return Err(ResultsError::InvalidFloorArea(floor_area));
        }

        let total_energy_use = monthly_results.iter().map(MonthlyResult::total).sum();

        Ok(Self {
            monthly_results,
            total_energy_use,
            floor_area,
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ResultsError {
    #[error("Results must hold one record per month, got {0}")]
    MonthCount(usize),
    #[error(
        "Monthly results must run January to December, found {found} where {expected} belongs"
    )]
    MonthOrder { expected: Month, found: Month },
    #[error("Floor area must be a finite, non-negative number, got {0}")]
    InvalidFloorArea(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn fuel_map() -> EndUseFuelMap {
        [
            (EndUse::Heating, FuelType::NaturalGas),
            (EndUse::Cooling, FuelType::Electricity),
            (EndUse::InteriorLighting, FuelType::Electricity),
            (EndUse::WaterSystems, FuelType::NaturalGas),
        ]
        .into_iter()
        .collect()
    }

    #[fixture]
    fn results(fuel_map: EndUseFuelMap) -> Results {
        let monthly = Month::ALL.map(|month| {
            EndUseValues::new()
                .with(EndUse::Heating, 10. - month.index() as f64)
                .with(EndUse::Cooling, month.index() as f64)
                .with(EndUse::InteriorLighting, 2.)
                .with(EndUse::WaterSystems, 0.5)
        });
        Results::aggregate(monthly, &fuel_map, 1000.)
    }

    #[rstest]
    fn should_clamp_end_use_values_at_zero() {
        let values = EndUseValues::new()
            .with(EndUse::Heating, -3.)
            .with(EndUse::Fans, f64::NAN)
            .with(EndUse::Pumps, 1.5);

        assert_eq!(values[EndUse::Heating], 0.);
        assert_eq!(values.get(EndUse::Fans), 0.);
        assert_eq!(values.total(), 1.5);
    }

    #[rstest]
    fn should_partition_end_uses_by_fuel(results: Results) {
        let january = results.monthly_result(Month::January);

        assert_eq!(january.month(), Month::January);
        assert_relative_eq!(january.fuel_type(FuelType::NaturalGas), 10.5);
        assert_relative_eq!(january.fuel_type(FuelType::Electricity), 2.);
        assert_eq!(january.fuel_type(FuelType::DistrictCooling), 0.);
        assert_relative_eq!(
            january.fuel_types().map(|(_, energy)| energy).sum::<f64>(),
            january.total()
        );
        assert_eq!(
            january.end_use_by_fuel(EndUse::Heating, FuelType::NaturalGas),
            10.
        );
        assert_eq!(
            january.end_use_by_fuel(EndUse::Heating, FuelType::Electricity),
            0.
        );
        assert_eq!(january.end_use(EndUse::ExteriorLighting), 0.);
    }

    #[rstest]
    fn should_report_fuel_types_in_canonical_order(results: Results) {
        assert_eq!(
            results
                .monthly_result(Month::March)
                .fuel_types()
                .map(|(fuel_type, _)| fuel_type)
                .collect::<Vec<_>>(),
            FuelType::ALL.to_vec()
        );
    }

    #[rstest]
    fn should_total_annual_energy(results: Results) {
        // heating 10 + 9 + ... - 1 clamped, cooling 0 + 1 + ... + 11
        let heating = (0..12).map(|i| (10. - i as f64).max(0.)).sum::<f64>();
        let cooling = (0..12).map(|i| i as f64).sum::<f64>();

        assert_relative_eq!(results.annual_end_use(EndUse::Heating), heating);
        assert_relative_eq!(
            results.total_energy_use(),
            heating + cooling + 12. * 2.5
        );
        assert_relative_eq!(
            results.total_energy_use(),
            results.monthly_results().iter().map(MonthlyResult::total).sum::<f64>()
        );
        assert_relative_eq!(
            results.annual_fuel_type(FuelType::NaturalGas)
                + results.annual_fuel_type(FuelType::Electricity),
            results.total_energy_use()
        );
        assert_relative_eq!(
            results.total_energy_use_absolute(),
            results.total_energy_use() * 1000.
        );
        assert_eq!(results.floor_area(), 1000.);
    }

    #[rstest]
    fn should_read_back_serialized_results(results: Results) {
        let json = serde_json::to_string(&results).unwrap();

        assert_eq!(serde_json::from_str::<Results>(&json).unwrap(), results);
    }

    #[rstest]
    fn should_reject_results_missing_months(results: Results) {
        let mut json = serde_json::to_value(&results).unwrap();
        json["monthly_results"].as_array_mut().unwrap().truncate(3);

        let error = serde_json::from_value::<Results>(json).unwrap_err();

        assert!(error.to_string().contains("got 3"));
    }

    #[rstest]
    fn should_reject_results_out_of_calendar_order(results: Results) {
        let mut json = serde_json::to_value(&results).unwrap();
        json["monthly_results"].as_array_mut().unwrap().swap(0, 11);

        let error = serde_json::from_value::<Results>(json).unwrap_err();

        assert!(error.to_string().contains("found December where January belongs"));
    }

    #[rstest]
    fn should_recompute_total_when_reading_results(results: Results) {
        let mut json = serde_json::to_value(&results).unwrap();
        json["total_energy_use"] = serde_json::json!(-1.);

        let restored = serde_json::from_value::<Results>(json).unwrap();

        assert_relative_eq!(restored.total_energy_use(), results.total_energy_use());
        assert_eq!(restored.monthly_result(Month::December).month(), Month::December);
    }

    #[rstest]
    fn should_serialize_end_uses_by_name() {
        let values = EndUseValues::new().with(EndUse::Cooling, 4.);
        let json = serde_json::to_value(values).unwrap();

        assert_eq!(json["cooling"], 4.);
        assert_eq!(json["heating"], 0.);
        assert_eq!(serde_json::from_value::<EndUseValues>(json).unwrap(), values);
    }
}

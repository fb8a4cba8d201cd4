//! The compile step: checks every invariant of a reduced building model, reporting all
//! violations together, and derives the simulation model from a model that passes.

use crate::climate::{ClimateSource, ClimateSummary};
use crate::compare_floats::is_fraction;
use crate::core::end_uses::EndUse;
use crate::core::orientation::{Orientation, OrientationValues};
use crate::core::sim_model::SimModel;
use crate::core::user_model::{EfficiencyInput, Schedule, Systems, UserModel};
use crate::errors::{InvariantViolation, ValidationError};
use std::sync::Arc;
use tracing::{debug, warn};

impl UserModel {
    /// Validate this model and build its simulation model against the climate that its
    /// weather file resolves to.
    pub fn compile(&self, climates: &impl ClimateSource) -> Result<SimModel, ValidationError> {
        let mut violations = Violations::default();

        self.check_non_negative(&mut violations);
        self.check_positive(&mut violations);
        self.check_fractions(&mut violations);
        self.check_gross_areas(&mut violations);
        self.check_fuels(&mut violations);
        self.check_efficiency_chains(&mut violations);
        self.check_setpoints(&mut violations);
        let climate = self.resolve_climate(climates, &mut violations);

        match climate {
            Some(climate) if violations.is_empty() => {
                let sim_model = SimModel::derive(self, climate);
                debug!(
                    floor_area = sim_model.floor_area(),
                    weather_file = sim_model.weather_file(),
                    transmission_conductance = sim_model.transmission_conductance(),
                    "Compiled reduced building model"
                );
                Ok(sim_model)
            }
            _ => {
                warn!(
                    violation_count = violations.0.len(),
                    "Reduced building model failed validation"
                );
                Err(ValidationError::new(violations.0))
            }
        }
    }

    fn check_non_negative(&self, violations: &mut Violations) {
        let geometry = &self.geometry;
        violations.non_negative("geometry.floor_area", geometry.floor_area);
        violations.non_negative("geometry.building_height", geometry.building_height);
        violations.non_negative("geometry.aspect_ratio", geometry.aspect_ratio);
        if let Some(gross_areas) = &geometry.gross_wall_areas {
            violations.non_negative_per_orientation("geometry.gross_wall_areas", gross_areas);
        }

        let envelope = &self.envelope;
        violations.non_negative("envelope.wall_u_value", envelope.wall_u_value);
        violations.non_negative("envelope.roof_u_value", envelope.roof_u_value);
        violations.non_negative("envelope.window_u_value", envelope.window_u_value);
        violations.non_negative("envelope.skylight_u_value", envelope.skylight_u_value);
        violations.non_negative("envelope.infiltration_ach", envelope.infiltration_ach);
        violations.non_negative("envelope.ventilation_rate", envelope.ventilation_rate);
        violations.non_negative(
            "envelope.interior_heat_capacity",
            envelope.interior_heat_capacity,
        );

        let systems = &self.systems;
        violations.non_negative(
            "systems.water_heating.demand_density",
            systems.water_heating.demand_density,
        );
        violations.non_negative("systems.fans.power_density", systems.fans.power_density);
        violations.non_negative("systems.pumps.power_density", systems.pumps.power_density);
        violations.non_negative(
            "systems.interior_lighting.power_density",
            systems.interior_lighting.power_density,
        );
        violations.non_negative(
            "systems.exterior_lighting.power",
            systems.exterior_lighting.power,
        );
        violations.non_negative(
            "systems.interior_equipment.power_density",
            systems.interior_equipment.power_density,
        );
        violations.non_negative("systems.occupants.density", systems.occupants.density);
        violations.non_negative(
            "systems.occupants.heat_per_person",
            systems.occupants.heat_per_person,
        );
    }

    // only zero values are reported here; negative ones already are
    fn check_positive(&self, violations: &mut Violations) {
        let geometry = &self.geometry;
        for (field, value) in [
            ("geometry.floor_area", geometry.floor_area),
            ("geometry.building_height", geometry.building_height),
            ("geometry.aspect_ratio", geometry.aspect_ratio),
        ] {
            if value == 0. {
                violations.record(field, "must be greater than zero");
            }
        }

        if geometry.stories == 0 {
            violations.record("geometry.stories", "must be at least 1");
        }
    }

    fn check_fractions(&self, violations: &mut Violations) {
        violations.fraction_per_orientation(
            "geometry.window_to_wall_ratio",
            &self.geometry.window_to_wall_ratio,
        );
        violations.fraction_per_orientation("envelope.window_shgc", &self.envelope.window_shgc);
        violations.fraction(
            "envelope.window_shading_factor",
            self.envelope.window_shading_factor,
        );
        violations.fraction(
            "envelope.heat_recovery_efficiency",
            self.envelope.heat_recovery_efficiency,
        );
        violations.fraction(
            "systems.interior_equipment.heat_gain_fraction",
            self.systems.interior_equipment.heat_gain_fraction,
        );

        let schedules = &self.schedules;
        for (field, schedule) in [
            ("schedules.occupancy", &schedules.occupancy),
            ("schedules.lighting", &schedules.lighting),
            ("schedules.exterior_lighting", &schedules.exterior_lighting),
            ("schedules.equipment", &schedules.equipment),
            ("schedules.hvac", &schedules.hvac),
            ("schedules.water_heating", &schedules.water_heating),
        ] {
            violations.schedule(field, schedule);
        }
    }

    fn check_gross_areas(&self, violations: &mut Violations) {
        if let Some(gross_areas) = &self.geometry.gross_wall_areas {
            if !(gross_areas.vertical_sum() > 0.) {
                violations.record(
                    "geometry.gross_wall_areas",
                    "at least one facade must have a wall area greater than zero",
                );
            }
        }
    }

    fn check_fuels(&self, violations: &mut Violations) {
        for end_use in EndUse::ALL {
            if self.systems.is_active(end_use) && self.systems.fuel_for(end_use).is_none() {
                violations.record(
                    Systems::fuel_field(end_use),
                    format!("active end use {end_use} has no fuel type"),
                );
            }
        }
    }

    fn check_efficiency_chains(&self, violations: &mut Violations) {
        let systems = &self.systems;
        for (end_use, field, efficiency) in [
            (
                EndUse::Heating,
                "systems.heating.efficiency",
                &systems.heating.efficiency,
            ),
            (
                EndUse::Cooling,
                "systems.cooling.efficiency",
                &systems.cooling.efficiency,
            ),
            (
                EndUse::WaterSystems,
                "systems.water_heating.efficiency",
                &systems.water_heating.efficiency,
            ),
        ] {
            if systems.is_active(end_use) {
                violations.efficiency_chain(field, efficiency);
            }
        }
    }

    fn check_setpoints(&self, violations: &mut Violations) {
        let setpoints = &self.systems.setpoints;
        let mut all_finite = true;
        for (field, value) in [
            ("systems.setpoints.heating_occupied", setpoints.heating_occupied),
            (
                "systems.setpoints.heating_unoccupied",
                setpoints.heating_unoccupied,
            ),
            ("systems.setpoints.cooling_occupied", setpoints.cooling_occupied),
            (
                "systems.setpoints.cooling_unoccupied",
                setpoints.cooling_unoccupied,
            ),
        ] {
            if !value.is_finite() {
                violations.record(field, format!("must be a finite temperature, got {value}"));
                all_finite = false;
            }
        }

        if !all_finite {
            return;
        }
        if setpoints.heating_occupied > setpoints.cooling_occupied {
            violations.record(
                "systems.setpoints.heating_occupied",
                "must not exceed the occupied cooling setpoint",
            );
        }
        if setpoints.heating_unoccupied > setpoints.cooling_unoccupied {
            violations.record(
                "systems.setpoints.heating_unoccupied",
                "must not exceed the unoccupied cooling setpoint",
            );
        }
    }

    fn resolve_climate<C: ClimateSource>(
        &self,
        climates: &C,
        violations: &mut Violations,
    ) -> Option<Arc<ClimateSummary>> {
        let weather_file = self.location.weather_file.trim();
        if weather_file.is_empty() {
            violations.record("location.weather_file", "must not be empty");
            return None;
        }

        let climate = climates.resolve(weather_file);
        match &climate {
            Some(summary) => violations.climate("location.weather_file", summary),
            None => violations.record(
                "location.weather_file",
                format!("no climate summary found for '{weather_file}'"),
            ),
        }
        climate
    }
}

#[derive(Default)]
struct Violations(Vec<InvariantViolation>);

impl Violations {
    fn record(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(InvariantViolation::new(field, message));
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.record(field, format!("must be a finite number, got {value}"));
        } else if value < 0. {
            self.record(field, format!("must not be negative, got {value}"));
        }
    }

    fn non_negative_per_orientation(&mut self, field: &str, values: &OrientationValues<f64>) {
        for (orientation, value) in values.iter() {
            self.non_negative(&orientation_field(field, orientation), value);
        }
    }

    fn fraction(&mut self, field: &str, value: f64) {
        if !is_fraction(value) {
            self.record(field, format!("must be between 0 and 1, got {value}"));
        }
    }

    fn fraction_per_orientation(&mut self, field: &str, values: &OrientationValues<f64>) {
        for (orientation, value) in values.iter() {
            self.fraction(&orientation_field(field, orientation), value);
        }
    }

    fn schedule(&mut self, field: &str, schedule: &Schedule) {
        match schedule {
            Schedule::Annual(fraction) => self.fraction(field, *fraction),
            Schedule::Monthly(_) => {
                for (month, fraction) in schedule.fractions() {
                    if !is_fraction(fraction) {
                        self.record(
                            field,
                            format!("{month} fraction must be between 0 and 1, got {fraction}"),
                        );
                    }
                }
            }
        }
    }

    fn climate(&mut self, field: &str, summary: &ClimateSummary) {
        for (month, climate) in summary.iter() {
            if !climate.mean_temperature.is_finite() {
                self.record(
                    field,
                    format!(
                        "climate summary has a non-finite {month} mean temperature, got {}",
                        climate.mean_temperature
                    ),
                );
            }
            for (orientation, irradiance) in climate.solar_radiation.iter() {
                if !(irradiance.is_finite() && irradiance >= 0.) {
                    self.record(
                        field,
                        format!(
                            "climate summary has an invalid {month} {orientation} irradiance, \
                             got {irradiance}"
                        ),
                    );
                }
            }
        }
    }

    fn efficiency_chain(&mut self, field: &str, efficiency: &EfficiencyInput) {
        if !(efficiency.generation.is_finite() && efficiency.generation > 0.) {
            self.record(
                format!("{field}.generation"),
                format!("must be greater than zero, got {}", efficiency.generation),
            );
        }
        for (stage, value) in [
            ("distribution", efficiency.distribution),
            ("control", efficiency.control),
        ] {
            if !(value > 0. && value <= 1.) {
                self.record(
                    format!("{field}.{stage}"),
                    format!("must be greater than 0 and at most 1, got {value}"),
                );
            }
        }
    }
}

fn orientation_field(field: &str, orientation: Orientation) -> String {
    format!("{field}.{orientation}")
}

//! The monthly quasi-steady-state energy balance.
//!
//! For each month the useful heating and cooling needs follow from the balance between heat
//! transfer through the envelope and by air, and heat gains from the sun and internal sources,
//! with utilization factors discounting the part of the surplus the building cannot store.
//! Delivered energy divides those needs by the efficiency chain of the serving system. Fixed
//! end uses are power density times operating fraction times month length.
//!
//! Every quantity here is per m2 of conditioned floor area.

use crate::compare_floats::non_negative;
use crate::core::end_uses::EndUse;
use crate::core::month::Month;
use crate::core::results::{EndUseValues, Results};
use crate::core::sim_model::SimModel;
use crate::core::units::power_density_to_energy;
use crate::core::utilization::{
    gain_utilization_factor, heating_season_limit, loss_utilization_factor,
};
use tracing::{debug, trace};

/// Heat balance terms of one month, in kWh/m2 unless stated otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonthlyBalance {
    pub month: Month,
    /// weighted heating setpoint, in Celsius
    pub heating_setpoint: f64,
    /// weighted cooling setpoint, in Celsius
    pub cooling_setpoint: f64,
    /// total heat transfer coefficient, in W / (K.m2)
    pub conductance: f64,
    pub heat_transfer_heating: f64,
    pub heat_transfer_cooling: f64,
    pub solar_gains: f64,
    pub internal_gains: f64,
    /// numerical parameter of the utilization curves
    pub utilization_parameter: f64,
    pub heating_need: f64,
    pub cooling_need: f64,
}

impl MonthlyBalance {
    pub fn total_gains(&self) -> f64 {
        self.solar_gains + self.internal_gains
    }
}

/// Useful heating need for one month.
///
/// Zero when there is no heat loss to make up, or when gains are so large relative to losses
/// that the month falls outside the heating season.
pub(crate) fn heating_need(heat_transfer: f64, gains: f64, a: f64) -> f64 {
    if heat_transfer <= 0. {
        return 0.;
    }

    let gain_loss_ratio = gains / heat_transfer;
    if gain_loss_ratio > heating_season_limit(a) {
        return 0.;
    }

    non_negative(heat_transfer - gain_utilization_factor(gain_loss_ratio, a) * gains)
}

/// Useful cooling need for one month.
///
/// When the outdoor air is warmer than the cooling setpoint, the envelope adds heat and the
/// whole of it is a cooling need along with the gains.
pub(crate) fn cooling_need(heat_transfer: f64, gains: f64, a: f64) -> f64 {
    if heat_transfer <= 0. {
        return non_negative(gains - heat_transfer);
    }
    if gains <= 0. {
        return 0.;
    }

    let loss_gain_ratio = heat_transfer / gains;
    non_negative(gains - loss_utilization_factor(loss_gain_ratio, a) * heat_transfer)
}

impl SimModel {
    /// Run the monthly simulation. Cannot fail: every input has already been validated.
    pub fn simulate(&self) -> Results {
        let monthly_end_uses = Month::ALL.map(|month| self.monthly_end_uses(month));
        let results = Results::aggregate(monthly_end_uses, self.fuel_map(), self.floor_area());

        debug!(
            floor_area = results.floor_area(),
            energy_use_intensity = results.total_energy_use(),
            weather_file = self.weather_file(),
            "Simulated building"
        );

        results
    }

    /// Heat balance of the conditioned space for a month
    pub fn monthly_balance(&self, month: Month) -> MonthlyBalance {
        let climate = self.climate().month(month);
        let schedules = self.schedules();
        let setpoints = self.setpoints();
        let hours = month.hours();

        let hvac_fraction = schedules.hvac.fraction(month);
        let heating_setpoint = weighted_setpoint(
            setpoints.heating_occupied,
            setpoints.heating_unoccupied,
            hvac_fraction,
        );
        let cooling_setpoint = weighted_setpoint(
            setpoints.cooling_occupied,
            setpoints.cooling_unoccupied,
            hvac_fraction,
        );

        let conductance = self.transmission_conductance()
            + self.infiltration_conductance()
            + hvac_fraction * self.ventilation_conductance();
        let heat_transfer_heating = power_density_to_energy(
            conductance * (heating_setpoint - climate.mean_temperature),
            hours,
        );
        let heat_transfer_cooling = power_density_to_energy(
            conductance * (cooling_setpoint - climate.mean_temperature),
            hours,
        );

        let solar_power = self
            .solar_apertures()
            .iter()
            .map(|(orientation, aperture)| aperture * climate.solar_radiation[orientation])
            .sum::<f64>();
        let solar_gains = power_density_to_energy(solar_power, hours);

        let internal_power = self.lighting_density() * schedules.lighting.fraction(month)
            + self.equipment_density()
                * self.equipment_heat_fraction()
                * schedules.equipment.fraction(month)
            + self.occupant_heat_density() * schedules.occupancy.fraction(month);
        let internal_gains = power_density_to_energy(internal_power, hours);

        let utilization_parameter = self.utilization_parameter();
        let gains = solar_gains + internal_gains;

        let balance = MonthlyBalance {
            month,
            heating_setpoint,
            cooling_setpoint,
            conductance,
            heat_transfer_heating,
            heat_transfer_cooling,
            solar_gains,
            internal_gains,
            utilization_parameter,
            heating_need: heating_need(heat_transfer_heating, gains, utilization_parameter),
            cooling_need: cooling_need(heat_transfer_cooling, gains, utilization_parameter),
        };

        trace!(?balance, "Monthly heat balance");

        balance
    }

    /// Delivered energy of every end use for a month, in kWh/m2
    pub fn monthly_end_uses(&self, month: Month) -> EndUseValues {
        let balance = self.monthly_balance(month);
        let schedules = self.schedules();
        let hours = month.hours();
        let fixed = |density: f64, fraction: f64| power_density_to_energy(density * fraction, hours);

        let mut end_uses = EndUseValues::new();

        if let Some(chain) = self.efficiency_chain(EndUse::Heating) {
            end_uses.set(EndUse::Heating, chain.delivered_energy(balance.heating_need));
        }
        if let Some(chain) = self.efficiency_chain(EndUse::Cooling) {
            end_uses.set(EndUse::Cooling, chain.delivered_energy(balance.cooling_need));
        }
        if let Some(chain) = self.efficiency_chain(EndUse::WaterSystems) {
            let useful = fixed(
                self.water_heating_demand_density(),
                schedules.water_heating.fraction(month),
            );
            end_uses.set(EndUse::WaterSystems, chain.delivered_energy(useful));
        }

        end_uses.set(
            EndUse::InteriorLighting,
            fixed(self.lighting_density(), schedules.lighting.fraction(month)),
        );
        end_uses.set(
            EndUse::ExteriorLighting,
            fixed(
                self.exterior_lighting_density(),
                schedules.exterior_lighting.fraction(month),
            ),
        );
        end_uses.set(
            EndUse::InteriorEquipment,
            fixed(self.equipment_density(), schedules.equipment.fraction(month)),
        );
        end_uses.set(
            EndUse::Fans,
            fixed(self.fan_density(), schedules.hvac.fraction(month)),
        );
        end_uses.set(
            EndUse::Pumps,
            fixed(self.pump_density(), schedules.hvac.fraction(month)),
        );

        end_uses
    }
}

/// Setpoint weighted by the fraction of the month the HVAC operates in occupied mode
fn weighted_setpoint(occupied: f64, unoccupied: f64, operating_fraction: f64) -> f64 {
    operating_fraction * occupied + (1. - operating_fraction) * unoccupied
}

//! The reduced building model: the minimal, physics-relevant parameter set the monthly engine
//! needs. Values are plain data; nothing here is validated until the model is compiled with
//! [`UserModel::compile`].

use crate::core::end_uses::{EndUse, EndUseFuelMap, FuelType};
use crate::core::month::Month;
use crate::core::orientation::OrientationValues;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserModel {
    pub geometry: Geometry,
    pub envelope: Envelope,
    pub systems: Systems,
    pub schedules: Schedules,
    pub location: Location,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Geometry {
    /// conditioned floor area, in m2
    pub floor_area: f64,
    /// height from ground to roof, in m
    pub building_height: f64,
    pub stories: u32,
    /// ratio of the north/south facade length to the east/west facade length
    pub aspect_ratio: f64,
    /// window area over gross wall area for each facade; the roof entry is the skylight to
    /// roof area ratio
    pub window_to_wall_ratio: OrientationValues<f64>,
    /// gross (opaque + glazed) wall area per facade and roof area, in m2. Derived from a
    /// rectangular footprint when absent.
    #[serde(default)]
    pub gross_wall_areas: Option<OrientationValues<f64>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// in W / (m2.K)
    pub wall_u_value: f64,
    pub roof_u_value: f64,
    pub window_u_value: f64,
    pub skylight_u_value: f64,
    /// solar heat gain coefficient of glazing per facade; the roof entry is for skylights
    pub window_shgc: OrientationValues<f64>,
    /// reduction of solar gains by external shading, 0 (fully shaded) to 1 (unshaded)
    pub window_shading_factor: f64,
    /// infiltration air change rate, in 1/h
    pub infiltration_ach: f64,
    /// mechanical outdoor air supply while HVAC is operating, in m3 / (h.m2 floor area)
    pub ventilation_rate: f64,
    /// fraction of ventilation heat recovered, 0 to 1
    pub heat_recovery_efficiency: f64,
    /// effective internal heat capacity, in J / (K.m2 floor area)
    pub interior_heat_capacity: f64,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingSystemType {
    #[default]
    None,
    Boiler,
    Furnace,
    HeatPump,
    ElectricResistance,
    DistrictHeat,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingSystemType {
    #[default]
    None,
    Chiller,
    DirectExpansion,
    DistrictCooling,
}

/// Efficiencies of the stages between fuel delivered to a system and useful energy delivered to
/// the conditioned space.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EfficiencyInput {
    /// seasonal generation efficiency, or COP for heat pumps and chillers
    pub generation: f64,
    pub distribution: f64,
    pub control: f64,
}

impl EfficiencyInput {
    pub fn new(generation: f64, distribution: f64, control: f64) -> Self {
        Self {
            generation,
            distribution,
            control,
        }
    }
}

impl Default for EfficiencyInput {
    fn default() -> Self {
        Self::new(1., 1., 1.)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeatingSystem {
    pub system_type: HeatingSystemType,
    pub efficiency: EfficiencyInput,
    pub fuel: Option<FuelType>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoolingSystem {
    pub system_type: CoolingSystemType,
    pub efficiency: EfficiencyInput,
    pub fuel: Option<FuelType>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WaterHeatingSystem {
    /// average useful hot water heat demand while in use, in W/m2
    pub demand_density: f64,
    pub efficiency: EfficiencyInput,
    pub fuel: Option<FuelType>,
}

/// A system whose consumption is a power density in W/m2 (fans, pumps, interior lighting)
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PowerDensitySystem {
    pub power_density: f64,
    pub fuel: Option<FuelType>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExteriorLighting {
    /// total installed power, in W
    pub power: f64,
    pub fuel: Option<FuelType>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentSystem {
    pub power_density: f64,
    /// fraction of equipment consumption released as heat into the space
    pub heat_gain_fraction: f64,
    pub fuel: Option<FuelType>,
}

/// Thermostat setpoints, in Celsius
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Setpoints {
    pub heating_occupied: f64,
    pub heating_unoccupied: f64,
    pub cooling_occupied: f64,
    pub cooling_unoccupied: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Occupants {
    /// persons per m2 floor area at full occupancy
    pub density: f64,
    /// sensible heat output per person, in W
    pub heat_per_person: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Systems {
    pub heating: HeatingSystem,
    pub cooling: CoolingSystem,
    pub water_heating: WaterHeatingSystem,
    pub fans: PowerDensitySystem,
    pub pumps: PowerDensitySystem,
    pub interior_lighting: PowerDensitySystem,
    pub exterior_lighting: ExteriorLighting,
    pub interior_equipment: EquipmentSystem,
    pub setpoints: Setpoints,
    pub occupants: Occupants,
}

impl Systems {
    /// Whether any system serves the given end use
    pub fn is_active(&self, end_use: EndUse) -> bool {
        match end_use {
            EndUse::Heating => self.heating.system_type != HeatingSystemType::None,
            EndUse::Cooling => self.cooling.system_type != CoolingSystemType::None,
            EndUse::InteriorLighting => self.interior_lighting.power_density > 0.,
            EndUse::ExteriorLighting => self.exterior_lighting.power > 0.,
            EndUse::InteriorEquipment => self.interior_equipment.power_density > 0.,
            EndUse::Fans => self.fans.power_density > 0.,
            EndUse::Pumps => self.pumps.power_density > 0.,
            EndUse::WaterSystems => self.water_heating.demand_density > 0.,
        }
    }

    /// Fuel type designated for the given end use, whether or not the end use is active
    pub fn fuel_for(&self, end_use: EndUse) -> Option<FuelType> {
        match end_use {
            EndUse::Heating => self.heating.fuel,
            EndUse::Cooling => self.cooling.fuel,
            EndUse::InteriorLighting => self.interior_lighting.fuel,
            EndUse::ExteriorLighting => self.exterior_lighting.fuel,
            EndUse::InteriorEquipment => self.interior_equipment.fuel,
            EndUse::Fans => self.fans.fuel,
            EndUse::Pumps => self.pumps.fuel,
            EndUse::WaterSystems => self.water_heating.fuel,
        }
    }

    /// Path of the fuel field for an end use, as reported in validation errors
    pub(crate) fn fuel_field(end_use: EndUse) -> &'static str {
        match end_use {
            EndUse::Heating => "systems.heating.fuel",
            EndUse::Cooling => "systems.cooling.fuel",
            EndUse::InteriorLighting => "systems.interior_lighting.fuel",
            EndUse::ExteriorLighting => "systems.exterior_lighting.fuel",
            EndUse::InteriorEquipment => "systems.interior_equipment.fuel",
            EndUse::Fans => "systems.fans.fuel",
            EndUse::Pumps => "systems.pumps.fuel",
            EndUse::WaterSystems => "systems.water_heating.fuel",
        }
    }

    /// Fuel assignments of the active end uses
    pub fn fuel_map(&self) -> EndUseFuelMap {
        EndUse::ALL
            .into_iter()
            .filter(|end_use| self.is_active(*end_use))
            .filter_map(|end_use| self.fuel_for(end_use).map(|fuel| (end_use, fuel)))
            .collect()
    }
}

/// A fractional operating profile: either one value for the whole year or one per month.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Schedule {
    Annual(f64),
    Monthly([f64; 12]),
}

impl Schedule {
    pub fn fraction(&self, month: Month) -> f64 {
        match self {
            Schedule::Annual(fraction) => *fraction,
            Schedule::Monthly(fractions) => fractions[month.index()],
        }
    }

    pub(crate) fn fractions(&self) -> impl Iterator<Item = (Month, f64)> + '_ {
        Month::ALL
            .into_iter()
            .map(move |month| (month, self.fraction(month)))
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Annual(1.)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Schedules {
    pub occupancy: Schedule,
    pub lighting: Schedule,
    pub exterior_lighting: Schedule,
    pub equipment: Schedule,
    pub hvac: Schedule,
    pub water_heating: Schedule,
}

/// Wind exposure of the site, reducing infiltration for sheltered buildings.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Open,
    Country,
    #[default]
    Suburban,
    Urban,
    CityCentre,
}

impl TerrainClass {
    pub fn shielding_factor(&self) -> f64 {
        match self {
            TerrainClass::Open => 1.0,
            TerrainClass::Country => 0.9,
            TerrainClass::Suburban => 0.8,
            TerrainClass::Urban => 0.7,
            TerrainClass::CityCentre => 0.6,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    /// reference to the weather dataset, resolved into a climate summary at compile time
    pub weather_file: String,
    #[serde(default)]
    pub terrain: TerrainClass,
}

impl UserModel {
    pub fn floor_area(&self) -> f64 {
        self.geometry.floor_area
    }

    pub fn weather_file(&self) -> &str {
        &self.location.weather_file
    }

    pub fn set_weather_file(&mut self, weather_file: impl Into<String>) {
        self.location.weather_file = weather_file.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn systems() -> Systems {
        Systems {
            heating: HeatingSystem {
                system_type: HeatingSystemType::Boiler,
                efficiency: EfficiencyInput::new(0.85, 0.95, 0.98),
                fuel: Some(FuelType::NaturalGas),
            },
            cooling: CoolingSystem {
                system_type: CoolingSystemType::None,
                efficiency: EfficiencyInput::default(),
                fuel: None,
            },
            water_heating: WaterHeatingSystem {
                demand_density: 0.5,
                efficiency: EfficiencyInput::new(0.8, 0.9, 1.),
                fuel: Some(FuelType::NaturalGas),
            },
            fans: PowerDensitySystem {
                power_density: 1.,
                fuel: Some(FuelType::Electricity),
            },
            pumps: PowerDensitySystem {
                power_density: 0.,
                fuel: None,
            },
            interior_lighting: PowerDensitySystem {
                power_density: 8.,
                fuel: Some(FuelType::Electricity),
            },
            exterior_lighting: ExteriorLighting {
                power: 0.,
                fuel: Some(FuelType::Electricity),
            },
            interior_equipment: EquipmentSystem {
                power_density: 10.,
                heat_gain_fraction: 1.,
                fuel: Some(FuelType::Electricity),
            },
            setpoints: Setpoints {
                heating_occupied: 20.,
                heating_unoccupied: 16.,
                cooling_occupied: 25.,
                cooling_unoccupied: 28.,
            },
            occupants: Occupants {
                density: 0.05,
                heat_per_person: 80.,
            },
        }
    }

    #[rstest]
    fn should_only_map_fuel_for_active_end_uses() {
        let fuel_map = systems().fuel_map();

        assert_eq!(
            fuel_map.iter().collect::<Vec<_>>(),
            vec![
                (EndUse::Heating, FuelType::NaturalGas),
                (EndUse::InteriorLighting, FuelType::Electricity),
                (EndUse::InteriorEquipment, FuelType::Electricity),
                (EndUse::Fans, FuelType::Electricity),
                (EndUse::WaterSystems, FuelType::NaturalGas),
            ]
        );
    }

    #[rstest]
    fn should_read_annual_and_monthly_schedules() {
        let annual: Schedule = serde_json::from_str("0.5").unwrap();
        assert_eq!(annual.fraction(Month::July), 0.5);

        let monthly: Schedule =
            serde_json::from_str("[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 0.0, 0.5]")
                .unwrap();
        assert_eq!(monthly.fraction(Month::January), 0.1);
        assert_eq!(monthly.fraction(Month::November), 0.);
        assert_eq!(monthly.fractions().count(), 12);

        assert!(serde_json::from_str::<Schedule>("[0.1, 0.2]").is_err());
    }

    #[rstest]
    fn should_fill_unlisted_schedules_with_always_on() {
        let schedules: Schedules = serde_json::from_str(r#"{"hvac": 0.6}"#).unwrap();

        assert_eq!(
            schedules,
            Schedules {
                hvac: Schedule::Annual(0.6),
                ..Default::default()
            }
        );
        assert_eq!(schedules.occupancy, Schedule::Annual(1.));
        assert!(serde_json::from_str::<Schedules>(r#"{"heating": 0.6}"#).is_err());
    }

    #[rstest]
    fn should_shield_infiltration_in_sheltered_terrain() {
        assert!(
            TerrainClass::CityCentre.shielding_factor() < TerrainClass::Open.shielding_factor()
        );
        assert_eq!(TerrainClass::default(), TerrainClass::Suburban);
    }
}

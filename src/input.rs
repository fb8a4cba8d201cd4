//! The detailed building description accepted by the forward translator.

use crate::core::end_uses::FuelType;
use crate::core::orientation::Azimuth;
use crate::core::user_model::{
    CoolingSystemType, EfficiencyInput, ExteriorLighting, HeatingSystemType, PowerDensitySystem,
    Schedules, Setpoints, TerrainClass,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> anyhow::Result<BuildingDescription> {
    let reader = BufReader::new(json);

    let description: BuildingDescription = serde_json::from_reader(reader)?;

    Ok(description)
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingDescription {
    #[serde(default)]
    pub name: Option<String>,
    /// conditioned spaces keyed by name
    pub spaces: IndexMap<String, Space>,
    /// exterior surfaces keyed by name
    pub surfaces: IndexMap<String, Surface>,
    #[serde(default)]
    pub stories: Option<u32>,
    /// in m; the stories stacked at their area-weighted ceiling height when absent
    #[serde(default)]
    pub building_height: Option<f64>,
    pub air_leakage: AirLeakage,
    /// effective internal heat capacity, in J / (K.m2); 165 000 when absent
    #[serde(default)]
    pub interior_heat_capacity: Option<f64>,
    /// 1 (unshaded) when absent
    #[serde(default)]
    pub window_shading_factor: Option<f64>,
    pub systems: SystemsDescription,
    #[serde(default)]
    pub setpoints: Option<Setpoints>,
    #[serde(default)]
    pub schedules: Schedules,
    #[serde(default)]
    pub weather_file: Option<String>,
    #[serde(default)]
    pub terrain: Option<TerrainClass>,
}

impl BuildingDescription {
    /// Conditioned floor area of all spaces, counting each space's multiplier
    pub fn total_floor_area(&self) -> f64 {
        self.spaces.values().map(Space::total_floor_area).sum()
    }

    pub fn walls(&self) -> impl Iterator<Item = (&str, &Surface)> {
        self.surfaces
            .iter()
            .filter(|(_, surface)| matches!(surface, Surface::Wall { .. }))
            .map(|(name, surface)| (name.as_str(), surface))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Space {
    /// in m2, for one instance of the space
    pub floor_area: f64,
    /// in m
    pub ceiling_height: f64,
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    /// persons per m2
    #[serde(default)]
    pub occupant_density: f64,
    /// in W/m2
    #[serde(default)]
    pub lighting_power_density: f64,
    /// in W/m2
    #[serde(default)]
    pub equipment_power_density: f64,
}

impl Space {
    pub fn total_floor_area(&self) -> f64 {
        self.floor_area * self.multiplier as f64
    }
}

fn default_multiplier() -> u32 {
    1
}

/// An exterior surface. Its area is the gross area, including any windows or skylights.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum Surface {
    Wall {
        area: f64,
        u_value: f64,
        azimuth: Azimuth,
        #[serde(default)]
        sub_surfaces: IndexMap<String, SubSurface>,
    },
    Roof {
        area: f64,
        u_value: f64,
        #[serde(default)]
        sub_surfaces: IndexMap<String, SubSurface>,
    },
}

impl Surface {
    pub fn area(&self) -> f64 {
        match self {
            Surface::Wall { area, .. } | Surface::Roof { area, .. } => *area,
        }
    }

    pub fn u_value(&self) -> f64 {
        match self {
            Surface::Wall { u_value, .. } | Surface::Roof { u_value, .. } => *u_value,
        }
    }

    pub fn sub_surfaces(&self) -> &IndexMap<String, SubSurface> {
        match self {
            Surface::Wall { sub_surfaces, .. } | Surface::Roof { sub_surfaces, .. } => {
                sub_surfaces
            }
        }
    }
}

/// A glazed opening (window or skylight) within a surface.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubSurface {
    pub area: f64,
    pub u_value: f64,
    /// solar heat gain coefficient
    pub g_value: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AirLeakage {
    /// in 1/h
    pub infiltration_ach: f64,
    /// mechanical outdoor air supply, in m3 / (h.m2)
    #[serde(default)]
    pub ventilation_rate: f64,
    #[serde(default)]
    pub heat_recovery_efficiency: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SystemsDescription {
    #[serde(default)]
    pub heating: IndexMap<String, HeatingSystemDescription>,
    #[serde(default)]
    pub cooling: IndexMap<String, CoolingSystemDescription>,
    #[serde(default)]
    pub water_heating: IndexMap<String, WaterHeaterDescription>,
    /// useful hot water heat demand, in W/m2
    #[serde(default)]
    pub water_heating_demand: f64,
    #[serde(default)]
    pub fans: Option<PowerDensitySystem>,
    #[serde(default)]
    pub pumps: Option<PowerDensitySystem>,
    #[serde(default)]
    pub exterior_lighting: Option<ExteriorLighting>,
    #[serde(default = "default_electricity")]
    pub lighting_fuel: FuelType,
    #[serde(default = "default_electricity")]
    pub equipment_fuel: FuelType,
    /// 1 when absent
    #[serde(default)]
    pub equipment_heat_gain_fraction: Option<f64>,
    /// sensible heat per occupant in W; 80 when absent
    #[serde(default)]
    pub occupant_heat_gain: Option<f64>,
}

fn default_electricity() -> FuelType {
    FuelType::Electricity
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeatingSystemDescription {
    pub system_type: HeatingSystemType,
    pub efficiency: EfficiencyInput,
    pub fuel: FuelType,
    /// in m2
    #[serde(default)]
    pub served_floor_area: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoolingSystemDescription {
    pub system_type: CoolingSystemType,
    pub efficiency: EfficiencyInput,
    pub fuel: FuelType,
    #[serde(default)]
    pub served_floor_area: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WaterHeaterDescription {
    pub efficiency: EfficiencyInput,
    pub fuel: FuelType,
    #[serde(default)]
    pub served_floor_area: Option<f64>,
}

use crate::climate::ClimateSummary;
use crate::core::end_uses::{EndUse, EndUseFuelMap};
use crate::core::orientation::{Orientation, OrientationValues};
use crate::core::units::AIR_HEAT_CAPACITY_WH_PER_M3_K;
use crate::core::utilization::{numerical_parameter, time_constant, REFERENCE_CONDUCTANCE};
use crate::core::user_model::{
    CoolingSystemType, EfficiencyInput, Geometry, HeatingSystemType, Schedules, Setpoints,
    UserModel,
};
use serde::Serialize;
use std::sync::Arc;

/// Losses between fuel delivered to a system and useful energy reaching the space, composed
/// into one ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EfficiencyChain {
    generation: f64,
    distribution: f64,
    control: f64,
}

impl EfficiencyChain {
    pub(crate) fn new(generation: f64, distribution: f64, control: f64) -> Self {
        Self {
            generation,
            distribution,
            control,
        }
    }

    pub fn generation(&self) -> f64 {
        self.generation
    }

    pub fn distribution(&self) -> f64 {
        self.distribution
    }

    pub fn control(&self) -> f64 {
        self.control
    }

    /// Useful energy delivered per unit of fuel energy
    pub fn overall(&self) -> f64 {
        self.generation * self.distribution * self.control
    }

    /// Fuel energy needed to deliver the given useful energy
    pub fn delivered_energy(&self, useful_energy: f64) -> f64 {
        useful_energy / self.overall()
    }
}

impl From<&EfficiencyInput> for EfficiencyChain {
    fn from(input: &EfficiencyInput) -> Self {
        Self::new(input.generation, input.distribution, input.control)
    }
}

/// Areas of the envelope components in each orientation bucket, in m2. Roof entries hold the
/// opaque roof and the skylights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComponentAreas {
    pub opaque: OrientationValues<f64>,
    pub glazed: OrientationValues<f64>,
}

impl ComponentAreas {
    fn new(gross: OrientationValues<f64>, glazing_ratios: OrientationValues<f64>) -> Self {
        let glazed = gross.map(|orientation, area| area * glazing_ratios[orientation]);
        let opaque = gross.map(|orientation, area| area - glazed[orientation]);

        Self { opaque, glazed }
    }

    pub fn total(&self) -> f64 {
        self.opaque.sum() + self.glazed.sum()
    }
}

/// Gross envelope area per orientation: explicit when supplied, otherwise the walls and roof of
/// a rectangular footprint whose longer side (for aspect ratios above 1) faces north and south.
pub(crate) fn gross_envelope_areas(geometry: &Geometry) -> OrientationValues<f64> {
    if let Some(gross_areas) = geometry.gross_wall_areas {
        return gross_areas;
    }

    let footprint = geometry.floor_area / geometry.stories as f64;
    let east_west_length = (footprint / geometry.aspect_ratio).sqrt();
    let north_south_length = east_west_length * geometry.aspect_ratio;

    OrientationValues {
        north: north_south_length * geometry.building_height,
        east: east_west_length * geometry.building_height,
        south: north_south_length * geometry.building_height,
        west: east_west_length * geometry.building_height,
        roof: footprint,
    }
}

/// A validated, ready-to-run building model. All densities and conductances are per m2 of
/// conditioned floor area. Only built by compiling a [`UserModel`].
#[derive(Clone, Debug, Serialize)]
pub struct SimModel {
    floor_area: f64,
    weather_file: String,
    component_areas: ComponentAreas,
    /// in W / (K.m2)
    transmission_conductance: f64,
    infiltration_conductance: f64,
    /// at full HVAC operation
    ventilation_conductance: f64,
    /// effective collecting area per m2 floor area
    solar_apertures: OrientationValues<f64>,
    /// in J / (K.m2)
    heat_capacity: f64,
    /// numerical parameter of the utilization curves
    utilization_parameter: f64,
    /// in W/m2
    lighting_density: f64,
    equipment_density: f64,
    equipment_heat_fraction: f64,
    occupant_heat_density: f64,
    fan_density: f64,
    pump_density: f64,
    exterior_lighting_density: f64,
    water_heating_demand_density: f64,
    heating: Option<EfficiencyChain>,
    cooling: Option<EfficiencyChain>,
    water_heating: Option<EfficiencyChain>,
    setpoints: Setpoints,
    schedules: Schedules,
    fuel_map: EndUseFuelMap,
    climate: Arc<ClimateSummary>,
}

impl SimModel {
    /// Derive the aggregates of a model that has passed validation.
    pub(crate) fn derive(model: &UserModel, climate: Arc<ClimateSummary>) -> Self {
        let UserModel {
            geometry,
            envelope,
            systems,
            schedules,
            location,
        } = model;
        let floor_area = geometry.floor_area;

        let component_areas = ComponentAreas::new(
            gross_envelope_areas(geometry),
            geometry.window_to_wall_ratio,
        );

        let transmission_conductance = Orientation::ALL
            .into_iter()
            .map(|orientation| {
                let (opaque_u_value, glazed_u_value) = if orientation.is_vertical() {
                    (envelope.wall_u_value, envelope.window_u_value)
                } else {
                    (envelope.roof_u_value, envelope.skylight_u_value)
                };
                opaque_u_value * component_areas.opaque[orientation]
                    + glazed_u_value * component_areas.glazed[orientation]
            })
            .sum::<f64>()
            / floor_area;

        let volume = floor_area / geometry.stories as f64 * geometry.building_height;
        let infiltration_conductance = AIR_HEAT_CAPACITY_WH_PER_M3_K
            * envelope.infiltration_ach
            * volume
            * location.terrain.shielding_factor()
            / floor_area;
        let ventilation_conductance = AIR_HEAT_CAPACITY_WH_PER_M3_K
            * envelope.ventilation_rate
            * (1. - envelope.heat_recovery_efficiency);

        let solar_apertures = component_areas.glazed.map(|orientation, area| {
            area * envelope.window_shgc[orientation] * envelope.window_shading_factor / floor_area
        });

        let heating = (systems.heating.system_type != HeatingSystemType::None)
            .then(|| EfficiencyChain::from(&systems.heating.efficiency));
        let cooling = (systems.cooling.system_type != CoolingSystemType::None)
            .then(|| EfficiencyChain::from(&systems.cooling.efficiency));
        let water_heating = systems
            .is_active(EndUse::WaterSystems)
            .then(|| EfficiencyChain::from(&systems.water_heating.efficiency));

        Self {
            floor_area,
            weather_file: location.weather_file.clone(),
            component_areas,
            transmission_conductance,
            infiltration_conductance,
            ventilation_conductance,
            solar_apertures,
            heat_capacity: envelope.interior_heat_capacity,
            utilization_parameter: numerical_parameter(time_constant(
                envelope.interior_heat_capacity,
                REFERENCE_CONDUCTANCE,
            )),
            lighting_density: systems.interior_lighting.power_density,
            equipment_density: systems.interior_equipment.power_density,
            equipment_heat_fraction: systems.interior_equipment.heat_gain_fraction,
            occupant_heat_density: systems.occupants.density * systems.occupants.heat_per_person,
            fan_density: systems.fans.power_density,
            pump_density: systems.pumps.power_density,
            exterior_lighting_density: systems.exterior_lighting.power / floor_area,
            water_heating_demand_density: systems.water_heating.demand_density,
            heating,
            cooling,
            water_heating,
            setpoints: systems.setpoints,
            schedules: schedules.clone(),
            fuel_map: systems.fuel_map(),
            climate,
        }
    }

    pub fn floor_area(&self) -> f64 {
        self.floor_area
    }

    pub fn weather_file(&self) -> &str {
        &self.weather_file
    }

    pub fn component_areas(&self) -> &ComponentAreas {
        &self.component_areas
    }

    pub fn transmission_conductance(&self) -> f64 {
        self.transmission_conductance
    }

    pub fn infiltration_conductance(&self) -> f64 {
        self.infiltration_conductance
    }

    pub fn ventilation_conductance(&self) -> f64 {
        self.ventilation_conductance
    }

    /// Sum of U.A over all envelope components, in W/K
    pub fn envelope_conductance(&self) -> f64 {
        self.transmission_conductance * self.floor_area
    }

    pub fn solar_apertures(&self) -> &OrientationValues<f64> {
        &self.solar_apertures
    }

    pub fn heat_capacity(&self) -> f64 {
        self.heat_capacity
    }

    pub fn utilization_parameter(&self) -> f64 {
        self.utilization_parameter
    }

    /// Heat released into the space with lighting, equipment and occupants all at full
    /// operation, in W/m2
    pub fn internal_gain_density(&self) -> f64 {
        self.lighting_density
            + self.equipment_density * self.equipment_heat_fraction
            + self.occupant_heat_density
    }

    pub(crate) fn lighting_density(&self) -> f64 {
        self.lighting_density
    }

    pub(crate) fn equipment_density(&self) -> f64 {
        self.equipment_density
    }

    pub(crate) fn equipment_heat_fraction(&self) -> f64 {
        self.equipment_heat_fraction
    }

    pub(crate) fn occupant_heat_density(&self) -> f64 {
        self.occupant_heat_density
    }

    pub(crate) fn fan_density(&self) -> f64 {
        self.fan_density
    }

    pub(crate) fn pump_density(&self) -> f64 {
        self.pump_density
    }

    pub(crate) fn exterior_lighting_density(&self) -> f64 {
        self.exterior_lighting_density
    }

    pub(crate) fn water_heating_demand_density(&self) -> f64 {
        self.water_heating_demand_density
    }

    /// Efficiency chain of the system serving a thermal end use, if one is installed
    pub fn efficiency_chain(&self, end_use: EndUse) -> Option<&EfficiencyChain> {
        match end_use {
            EndUse::Heating => self.heating.as_ref(),
            EndUse::Cooling => self.cooling.as_ref(),
            EndUse::WaterSystems => self.water_heating.as_ref(),
            _ => None,
        }
    }

    pub fn setpoints(&self) -> &Setpoints {
        &self.setpoints
    }

    pub fn schedules(&self) -> &Schedules {
        &self.schedules
    }

    pub fn fuel_map(&self) -> &EndUseFuelMap {
        &self.fuel_map
    }

    pub fn climate(&self) -> &ClimateSummary {
        &self.climate
    }

    /// Shared handle to the climate summary this model was compiled against
    pub fn climate_handle(&self) -> Arc<ClimateSummary> {
        Arc::clone(&self.climate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::end_uses::FuelType;
    use crate::tests::fixtures::{office_model, temperate_climates, TEMPERATE_WEATHER_FILE};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_compose_efficiency_chain() {
        let chain = EfficiencyChain::new(0.9, 0.8, 0.5);
        assert_relative_eq!(chain.overall(), 0.36);
        assert_relative_eq!(chain.delivered_energy(36.), 100.);
    }

    #[rstest]
    fn should_derive_rectangular_footprint(office_model: UserModel) {
        let mut geometry = office_model.geometry.clone();
        geometry.gross_wall_areas = None;
        geometry.floor_area = 1200.;
        geometry.stories = 3;
        geometry.building_height = 12.;
        geometry.aspect_ratio = 4.;

        // 400 m2 footprint of 40 m by 10 m
        let areas = gross_envelope_areas(&geometry);
        assert_relative_eq!(areas.north, 480.);
        assert_relative_eq!(areas.south, 480.);
        assert_relative_eq!(areas.east, 120.);
        assert_relative_eq!(areas.west, 120.);
        assert_relative_eq!(areas.roof, 400.);
    }

    #[rstest]
    fn should_split_gross_areas_into_components() {
        let areas = ComponentAreas::new(
            OrientationValues::uniform(100.),
            OrientationValues {
                north: 0.2,
                east: 0.,
                south: 0.5,
                west: 1.,
                roof: 0.1,
            },
        );

        assert_relative_eq!(areas.glazed.south, 50.);
        assert_relative_eq!(areas.opaque.south, 50.);
        assert_eq!(areas.opaque.west, 0.);
        assert_relative_eq!(areas.glazed.roof, 10.);
        assert_relative_eq!(areas.total(), 500.);
    }

    #[rstest]
    fn should_derive_conductances_per_floor_area(mut office_model: UserModel) {
        office_model.geometry.gross_wall_areas = Some(OrientationValues {
            north: 100.,
            east: 100.,
            south: 100.,
            west: 100.,
            roof: 200.,
        });
        office_model.geometry.window_to_wall_ratio = OrientationValues {
            roof: 0.,
            ..OrientationValues::uniform(0.5)
        };
        office_model.geometry.floor_area = 200.;
        office_model.geometry.stories = 1;
        office_model.geometry.building_height = 3.;
        office_model.envelope.wall_u_value = 0.5;
        office_model.envelope.window_u_value = 2.;
        office_model.envelope.roof_u_value = 0.25;
        office_model.envelope.infiltration_ach = 0.5;
        office_model.envelope.ventilation_rate = 3.;
        office_model.envelope.heat_recovery_efficiency = 0.5;
        office_model.location.terrain = crate::core::user_model::TerrainClass::Open;

        let sim_model = office_model.compile(&temperate_climates()).unwrap();

        // 4 * (50 * 0.5 + 50 * 2) + 200 * 0.25 = 550 W/K over 200 m2
        assert_relative_eq!(sim_model.transmission_conductance(), 2.75);
        assert_relative_eq!(sim_model.envelope_conductance(), 550.);
        // 1/3 Wh/(m3.K) * 0.5 1/h * 600 m3 over 200 m2
        assert_relative_eq!(sim_model.infiltration_conductance(), 0.5);
        assert_relative_eq!(sim_model.ventilation_conductance(), 0.5);
        assert_eq!(sim_model.solar_apertures().roof, 0.);
        assert_eq!(sim_model.weather_file(), TEMPERATE_WEATHER_FILE);
    }

    #[rstest]
    fn should_only_carry_chains_for_installed_systems(mut office_model: UserModel) {
        office_model.systems.cooling.system_type = CoolingSystemType::None;
        office_model.systems.cooling.fuel = None;

        let sim_model = office_model.compile(&temperate_climates()).unwrap();

        assert!(sim_model.efficiency_chain(EndUse::Cooling).is_none());
        assert!(sim_model.efficiency_chain(EndUse::Heating).is_some());
        assert!(sim_model.efficiency_chain(EndUse::Fans).is_none());
        assert_eq!(sim_model.fuel_map().fuel_for(EndUse::Cooling), None);
        assert_eq!(
            sim_model.fuel_map().fuel_for(EndUse::Heating),
            Some(FuelType::NaturalGas)
        );
    }
}

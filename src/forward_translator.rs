//! Translation of a detailed building description into the reduced building model.

use crate::compare_floats::min_of_2;
use crate::core::end_uses::FuelType;
use crate::core::orientation::{Orientation, OrientationValues};
use crate::core::user_model::{
    CoolingSystem, CoolingSystemType, EfficiencyInput, Envelope, EquipmentSystem,
    ExteriorLighting, Geometry, HeatingSystem, HeatingSystemType, Location, Occupants,
    PowerDensitySystem, Setpoints, Systems, UserModel, WaterHeatingSystem,
};
use crate::errors::TranslationError;
use crate::input::{BuildingDescription, Space, Surface};
use itertools::Itertools;
use tracing::{info, warn};

pub const DEFAULT_SETPOINTS: Setpoints = Setpoints {
    heating_occupied: 20.,
    heating_unoccupied: 16.,
    cooling_occupied: 25.,
    cooling_unoccupied: 28.,
};
/// in W per person
pub const DEFAULT_OCCUPANT_HEAT_GAIN: f64 = 80.;
/// medium thermal mass class, in J / (K.m2)
pub const DEFAULT_INTERIOR_HEAT_CAPACITY: f64 = 165_000.;
pub const DEFAULT_EQUIPMENT_HEAT_GAIN_FRACTION: f64 = 1.;
pub const DEFAULT_WINDOW_SHADING_FACTOR: f64 = 1.;

/// Converts detailed building descriptions into reduced building models, keeping a log of the
/// simplifications made along the way.
#[derive(Debug, Default)]
pub struct ForwardTranslator {
    warnings: Vec<String>,
}

/// A system taking part in the collapse of several systems into one per end use.
struct ServingSystem<T> {
    name: String,
    kind: T,
    efficiency: EfficiencyInput,
    fuel: FuelType,
    served_floor_area: Option<f64>,
}

/// Envelope areas and area-weighted properties gathered from the surfaces.
#[derive(Default)]
struct EnvelopeTotals {
    gross: OrientationValues<f64>,
    glazed: OrientationValues<f64>,
    opaque_ua: OrientationValues<f64>,
    glazed_ua: OrientationValues<f64>,
    glazed_g_area: OrientationValues<f64>,
}

impl ForwardTranslator {
    pub fn new() -> Self {
        Default::default()
    }

    /// Warnings raised by the most recent translation
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Build the reduced model of a detailed building description. The description is not
    /// modified.
    pub fn translate(
        &mut self,
        description: &BuildingDescription,
    ) -> Result<UserModel, TranslationError> {
        self.warnings.clear();

        let floor_area = description.total_floor_area();
        if !(floor_area > 0.) {
            return Err(TranslationError::MissingFloorArea);
        }
        let weather_file = match description.weather_file.as_deref().map(str::trim) {
            Some(weather_file) if !weather_file.is_empty() => weather_file.to_string(),
            _ => return Err(TranslationError::MissingWeatherFile),
        };

        info!(
            floor_area,
            surface_count = description.surfaces.len(),
            wall_count = description.walls().count(),
            "Translating building description"
        );

        let totals = self.envelope_totals(description)?;
        if !(totals.gross.vertical_sum() > 0.) {
            return Err(TranslationError::MissingEnvelope);
        }

        let geometry = self.geometry(description, floor_area, &totals);
        let envelope = self.envelope(description, &totals);
        let systems = self.systems(description, floor_area);

        let user_model = UserModel {
            geometry,
            envelope,
            systems,
            schedules: description.schedules.clone(),
            location: Location {
                weather_file,
                terrain: description.terrain.unwrap_or_default(),
            },
        };

        info!(
            warning_count = self.warnings.len(),
            "Translated building description"
        );

        Ok(user_model)
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }

    fn envelope_totals(
        &mut self,
        description: &BuildingDescription,
    ) -> Result<EnvelopeTotals, TranslationError> {
        let mut totals = EnvelopeTotals::default();

        for (name, surface) in &description.surfaces {
            let area = surface.area();
            let u_value = surface.u_value();
            if !(area.is_finite() && area >= 0.) {
                return Err(invalid_surface(name, format!("area must not be negative, got {area}")));
            }
            if !(u_value.is_finite() && u_value >= 0.) {
                return Err(invalid_surface(
                    name,
                    format!("U-value must not be negative, got {u_value}"),
                ));
            }
            if area == 0. {
                self.warn(format!("Surface '{name}' has no area and was skipped"));
                continue;
            }

            let orientation = match surface {
                Surface::Wall { azimuth, .. } => azimuth.facade(),
                Surface::Roof { .. } => Orientation::Roof,
            };

            let mut sub_surface_area = 0.;
            for (sub_name, sub_surface) in surface.sub_surfaces() {
                let fields = [
                    ("area", sub_surface.area),
                    ("U-value", sub_surface.u_value),
                    ("g-value", sub_surface.g_value),
                ];
                if let Some((field, value)) = fields
                    .into_iter()
                    .find(|(_, value)| !(value.is_finite() && *value >= 0.))
                {
                    return Err(invalid_surface(
                        sub_name,
                        format!("{field} must not be negative, got {value}"),
                    ));
                }
                if sub_surface.g_value > 1. {
                    return Err(invalid_surface(
                        sub_name,
                        format!("g-value must not exceed 1, got {}", sub_surface.g_value),
                    ));
                }
                sub_surface_area += sub_surface.area;
            }

            // oversized openings are scaled down to fill their host exactly
            let scale = if sub_surface_area > area {
                self.warn(format!(
                    "Sub-surfaces of '{name}' total {sub_surface_area} m2, more than its area of \
                     {area} m2; they were clipped to the surface area"
                ));
                area / sub_surface_area
            } else {
                1.
            };

            for sub_surface in surface.sub_surfaces().values() {
                let glazed_area = sub_surface.area * scale;
                totals.glazed[orientation] += glazed_area;
                totals.glazed_ua[orientation] += glazed_area * sub_surface.u_value;
                totals.glazed_g_area[orientation] += glazed_area * sub_surface.g_value;
            }
            totals.gross[orientation] += area;
            totals.opaque_ua[orientation] += (area - sub_surface_area * scale) * u_value;
        }

        Ok(totals)
    }

    fn geometry(
        &self,
        description: &BuildingDescription,
        floor_area: f64,
        totals: &EnvelopeTotals,
    ) -> Geometry {
        let stories = description.stories.unwrap_or(1);
        let building_height = description.building_height.unwrap_or_else(|| {
            let ceiling_height = weighted_average(
                description
                    .spaces
                    .values()
                    .map(|space| (space.ceiling_height, space.total_floor_area())),
            )
            .unwrap_or_default();
            ceiling_height * stories.max(1) as f64
        });

        let window_to_wall_ratio = totals.gross.map(|orientation, gross| {
            if gross > 0. {
                min_of_2(1., totals.glazed[orientation] / gross)
            } else {
                0.
            }
        });

        let north_south = totals.gross.north + totals.gross.south;
        let east_west = totals.gross.east + totals.gross.west;
        let aspect_ratio = if north_south > 0. && east_west > 0. {
            north_south / east_west
        } else {
            1.
        };

        Geometry {
            floor_area,
            building_height,
            stories,
            aspect_ratio,
            window_to_wall_ratio,
            gross_wall_areas: Some(totals.gross),
        }
    }

    fn envelope(&self, description: &BuildingDescription, totals: &EnvelopeTotals) -> Envelope {
        let opaque = totals.gross.map(|o, gross| gross - totals.glazed[o]);
        let vertical = |values: &OrientationValues<f64>| values.vertical_sum();

        let wall_u_value = ratio_or_zero(vertical(&totals.opaque_ua), vertical(&opaque));
        let window_u_value =
            ratio_or_zero(vertical(&totals.glazed_ua), vertical(&totals.glazed));
        let roof_u_value = ratio_or_zero(totals.opaque_ua.roof, opaque.roof);
        let skylight_u_value = ratio_or_zero(totals.glazed_ua.roof, totals.glazed.roof);
        let window_shgc = totals
            .glazed_g_area
            .map(|orientation, g_area| ratio_or_zero(g_area, totals.glazed[orientation]));

        let air_leakage = description.air_leakage;

        Envelope {
            wall_u_value,
            roof_u_value,
            window_u_value,
            skylight_u_value,
            window_shgc,
            window_shading_factor: description
                .window_shading_factor
                .unwrap_or(DEFAULT_WINDOW_SHADING_FACTOR),
            infiltration_ach: air_leakage.infiltration_ach,
            ventilation_rate: air_leakage.ventilation_rate,
            heat_recovery_efficiency: air_leakage.heat_recovery_efficiency,
            interior_heat_capacity: description
                .interior_heat_capacity
                .unwrap_or(DEFAULT_INTERIOR_HEAT_CAPACITY),
        }
    }

    fn systems(&mut self, description: &BuildingDescription, floor_area: f64) -> Systems {
        let systems = &description.systems;

        let heating = self
            .collapse(
                "heating",
                systems
                    .heating
                    .iter()
                    .filter(|(_, system)| system.system_type != HeatingSystemType::None)
                    .map(|(name, system)| ServingSystem {
                        name: name.clone(),
                        kind: system.system_type,
                        efficiency: system.efficiency,
                        fuel: system.fuel,
                        served_floor_area: system.served_floor_area,
                    })
                    .collect(),
            )
            .map_or_else(
                || HeatingSystem {
                    system_type: HeatingSystemType::None,
                    efficiency: EfficiencyInput::default(),
                    fuel: None,
                },
                |(system_type, efficiency, fuel)| HeatingSystem {
                    system_type,
                    efficiency,
                    fuel: Some(fuel),
                },
            );

        let cooling = self
            .collapse(
                "cooling",
                systems
                    .cooling
                    .iter()
                    .filter(|(_, system)| system.system_type != CoolingSystemType::None)
                    .map(|(name, system)| ServingSystem {
                        name: name.clone(),
                        kind: system.system_type,
                        efficiency: system.efficiency,
                        fuel: system.fuel,
                        served_floor_area: system.served_floor_area,
                    })
                    .collect(),
            )
            .map_or_else(
                || CoolingSystem {
                    system_type: CoolingSystemType::None,
                    efficiency: EfficiencyInput::default(),
                    fuel: None,
                },
                |(system_type, efficiency, fuel)| CoolingSystem {
                    system_type,
                    efficiency,
                    fuel: Some(fuel),
                },
            );

        let water_heater = self.collapse(
            "water heating",
            systems
                .water_heating
                .iter()
                .map(|(name, system)| ServingSystem {
                    name: name.clone(),
                    kind: (),
                    efficiency: system.efficiency,
                    fuel: system.fuel,
                    served_floor_area: system.served_floor_area,
                })
                .collect(),
        );
        if water_heater.is_none() && systems.water_heating_demand > 0. {
            self.warn(
                "Hot water demand is given but no water heater serves it; it was ignored"
                    .to_string(),
            );
        }
        let water_heating = match water_heater {
            Some((_, efficiency, fuel)) => WaterHeatingSystem {
                demand_density: systems.water_heating_demand,
                efficiency,
                fuel: Some(fuel),
            },
            None => WaterHeatingSystem {
                demand_density: 0.,
                efficiency: EfficiencyInput::default(),
                fuel: None,
            },
        };

        let space_density = |density: fn(&Space) -> f64| {
            description
                .spaces
                .values()
                .map(|space| density(space) * space.total_floor_area())
                .sum::<f64>()
                / floor_area
        };

        Systems {
            heating,
            cooling,
            water_heating,
            fans: systems.fans.clone().unwrap_or(PowerDensitySystem {
                power_density: 0.,
                fuel: None,
            }),
            pumps: systems.pumps.clone().unwrap_or(PowerDensitySystem {
                power_density: 0.,
                fuel: None,
            }),
            interior_lighting: PowerDensitySystem {
                power_density: space_density(|space| space.lighting_power_density),
                fuel: Some(systems.lighting_fuel),
            },
            exterior_lighting: systems.exterior_lighting.clone().unwrap_or(ExteriorLighting {
                power: 0.,
                fuel: None,
            }),
            interior_equipment: EquipmentSystem {
                power_density: space_density(|space| space.equipment_power_density),
                heat_gain_fraction: systems
                    .equipment_heat_gain_fraction
                    .unwrap_or(DEFAULT_EQUIPMENT_HEAT_GAIN_FRACTION),
                fuel: Some(systems.equipment_fuel),
            },
            setpoints: description.setpoints.unwrap_or(DEFAULT_SETPOINTS),
            occupants: Occupants {
                density: space_density(|space| space.occupant_density),
                heat_per_person: systems
                    .occupant_heat_gain
                    .unwrap_or(DEFAULT_OCCUPANT_HEAT_GAIN),
            },
        }
    }

    /// Collapse the systems serving one end use into a representative kind, efficiency chain
    /// and fuel. Each stage efficiency is weighted by served floor area when every system
    /// states one, otherwise averaged. The kind and fuel come from the system serving the
    /// largest area (the first one listed when areas are unknown).
    fn collapse<T: Copy>(
        &mut self,
        end_use: &str,
        systems: Vec<ServingSystem<T>>,
    ) -> Option<(T, EfficiencyInput, FuelType)> {
        let served_areas = systems
            .iter()
            .map(|system| system.served_floor_area.filter(|area| *area > 0.))
            .collect::<Option<Vec<f64>>>();

        let weights = match served_areas {
            Some(areas) => areas,
            None => {
                if systems.len() > 1 {
                    self.warn(format!(
                        "Not every {end_use} system states a served floor area; their \
                         efficiencies were averaged"
                    ));
                }
                vec![1.; systems.len()]
            }
        };

        let dominant = systems
            .iter()
            .zip(&weights)
            .fold(None::<(&ServingSystem<T>, f64)>, |best, (system, weight)| {
                match best {
                    Some((_, best_weight)) if best_weight >= *weight => best,
                    _ => Some((system, *weight)),
                }
            })
            .map(|(system, _)| system)?;

        if systems.iter().map(|system| system.fuel).unique().count() > 1 {
            self.warn(format!(
                "{} systems use different fuels; all {end_use} is assigned {} from '{}'",
                capitalize(end_use),
                dominant.fuel,
                dominant.name
            ));
        }

        let stage = |efficiency: fn(&EfficiencyInput) -> f64| {
            weighted_average(
                systems
                    .iter()
                    .zip(&weights)
                    .map(|(system, weight)| (efficiency(&system.efficiency), *weight)),
            )
            .unwrap_or_default()
        };
        let efficiency = EfficiencyInput::new(
            stage(|e| e.generation),
            stage(|e| e.distribution),
            stage(|e| e.control),
        );

        Some((dominant.kind, efficiency, dominant.fuel))
    }
}

fn invalid_surface(name: &str, reason: String) -> TranslationError {
    TranslationError::InvalidSurface {
        name: name.to_string(),
        reason,
    }
}

/// Average of values weighted by non-negative weights, or `None` when the weights sum to zero
fn weighted_average(values: impl IntoIterator<Item = (f64, f64)>) -> Option<f64> {
    let (weighted_sum, total_weight) = values
        .into_iter()
        .fold((0., 0.), |(sum, total), (value, weight)| {
            (sum + value * weight, total + weight)
        });

    (total_weight > 0.).then(|| weighted_sum / total_weight)
}

fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0. {
        numerator / denominator
    } else {
        0.
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

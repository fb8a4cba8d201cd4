use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

/// A category of energy consumption within the building.
///
/// The declaration order is the canonical reporting order.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumCount,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndUse {
    Heating,
    Cooling,
    InteriorLighting,
    ExteriorLighting,
    InteriorEquipment,
    Fans,
    Pumps,
    WaterSystems,
}

impl EndUse {
    pub const ALL: [EndUse; EndUse::COUNT] = [
        EndUse::Heating,
        EndUse::Cooling,
        EndUse::InteriorLighting,
        EndUse::ExteriorLighting,
        EndUse::InteriorEquipment,
        EndUse::Fans,
        EndUse::Pumps,
        EndUse::WaterSystems,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// The energy carrier delivering energy to an end use.
///
/// The declaration order is the canonical reporting order.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumCount,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FuelType {
    Electricity,
    NaturalGas,
    DistrictHeating,
    DistrictCooling,
    OtherFuel,
}

impl FuelType {
    pub const ALL: [FuelType; FuelType::COUNT] = [
        FuelType::Electricity,
        FuelType::NaturalGas,
        FuelType::DistrictHeating,
        FuelType::DistrictCooling,
        FuelType::OtherFuel,
    ];
}

/// Assignment of a fuel type to each end use of one building. An end use carries at most one
/// fuel type; unassigned end uses are not served by any system.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EndUseFuelMap(IndexMap<EndUse, FuelType>);

impl EndUseFuelMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Assign a fuel type to an end use, returning the fuel type previously assigned, if any.
    pub fn assign(&mut self, end_use: EndUse, fuel_type: FuelType) -> Option<FuelType> {
        self.0.insert(end_use, fuel_type)
    }

    pub fn fuel_for(&self, end_use: EndUse) -> Option<FuelType> {
        self.0.get(&end_use).copied()
    }

    /// End uses served by the given fuel type, in canonical end use order
    pub fn end_uses_for(&self, fuel_type: FuelType) -> impl Iterator<Item = EndUse> + '_ {
        EndUse::ALL
            .into_iter()
            .filter(move |end_use| self.fuel_for(*end_use) == Some(fuel_type))
    }

    /// Assignments in canonical end use order, independent of insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EndUse, FuelType)> + '_ {
        EndUse::ALL
            .into_iter()
            .filter_map(|end_use| self.fuel_for(end_use).map(|fuel| (end_use, fuel)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(EndUse, FuelType)> for EndUseFuelMap {
    fn from_iter<I: IntoIterator<Item = (EndUse, FuelType)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[rstest]
    fn should_list_enumerations_in_declared_order() {
        assert_eq!(EndUse::iter().collect::<Vec<_>>(), EndUse::ALL.to_vec());
        assert_eq!(FuelType::iter().collect::<Vec<_>>(), FuelType::ALL.to_vec());
        for (idx, end_use) in EndUse::ALL.iter().enumerate() {
            assert_eq!(end_use.index(), idx);
        }
    }

    #[rstest]
    fn should_iterate_in_canonical_order_regardless_of_insertion() {
        let map: EndUseFuelMap = [
            (EndUse::WaterSystems, FuelType::NaturalGas),
            (EndUse::Fans, FuelType::Electricity),
            (EndUse::Heating, FuelType::NaturalGas),
            (EndUse::Cooling, FuelType::Electricity),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![
                (EndUse::Heating, FuelType::NaturalGas),
                (EndUse::Cooling, FuelType::Electricity),
                (EndUse::Fans, FuelType::Electricity),
                (EndUse::WaterSystems, FuelType::NaturalGas),
            ]
        );
        assert_eq!(
            map.end_uses_for(FuelType::NaturalGas).collect::<Vec<_>>(),
            vec![EndUse::Heating, EndUse::WaterSystems]
        );
        assert_eq!(map.end_uses_for(FuelType::DistrictCooling).count(), 0);
    }

    #[rstest]
    fn should_hold_one_fuel_per_end_use() {
        let mut map = EndUseFuelMap::new();
        assert_eq!(map.assign(EndUse::Heating, FuelType::NaturalGas), None);
        assert_eq!(
            map.assign(EndUse::Heating, FuelType::Electricity),
            Some(FuelType::NaturalGas)
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.fuel_for(EndUse::Heating), Some(FuelType::Electricity));
        assert_eq!(map.fuel_for(EndUse::Pumps), None);
    }

    #[rstest]
    fn should_reject_unknown_fuel_names() {
        assert_eq!(
            serde_json::from_str::<FuelType>("\"natural_gas\"").unwrap(),
            FuelType::NaturalGas
        );
        assert!(serde_json::from_str::<FuelType>("\"coal\"").is_err());
        assert_eq!(FuelType::DistrictHeating.to_string(), "district_heating");
    }
}

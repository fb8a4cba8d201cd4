use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use strum::{Display, EnumIter};
use thiserror::Error;

/// The orientation buckets that envelope components are aggregated into: the four cardinal
/// facades plus the (flat) roof.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Orientation {
    North,
    East,
    South,
    West,
    Roof,
}

impl Orientation {
    pub const ALL: [Orientation; 5] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
        Orientation::Roof,
    ];

    pub const VERTICAL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    pub fn is_vertical(&self) -> bool {
        *self != Orientation::Roof
    }
}

/// One value per orientation bucket.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrientationValues<T> {
    pub north: T,
    pub east: T,
    pub south: T,
    pub west: T,
    pub roof: T,
}

impl<T: Copy> OrientationValues<T> {
    /// The same value for every orientation
    pub fn uniform(value: T) -> Self {
        Self {
            north: value,
            east: value,
            south: value,
            west: value,
            roof: value,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Orientation) -> T) -> Self {
        Self {
            north: f(Orientation::North),
            east: f(Orientation::East),
            south: f(Orientation::South),
            west: f(Orientation::West),
            roof: f(Orientation::Roof),
        }
    }

    pub fn get(&self, orientation: Orientation) -> T {
        self[orientation]
    }

    pub fn map<U: Copy>(&self, mut f: impl FnMut(Orientation, T) -> U) -> OrientationValues<U> {
        OrientationValues::from_fn(|orientation| f(orientation, self[orientation]))
    }

    /// Values paired with their orientation, in canonical orientation order
    pub fn iter(&self) -> impl Iterator<Item = (Orientation, T)> + '_ {
        Orientation::ALL
            .into_iter()
            .map(move |orientation| (orientation, self[orientation]))
    }
}

impl OrientationValues<f64> {
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, value)| value).sum()
    }

    pub fn vertical_sum(&self) -> f64 {
        self.iter()
            .filter(|(orientation, _)| orientation.is_vertical())
            .map(|(_, value)| value)
            .sum()
    }
}

impl<T> Index<Orientation> for OrientationValues<T> {
    type Output = T;

    fn index(&self, orientation: Orientation) -> &Self::Output {
        match orientation {
            Orientation::North => &self.north,
            Orientation::East => &self.east,
            Orientation::South => &self.south,
            Orientation::West => &self.west,
            Orientation::Roof => &self.roof,
        }
    }
}

impl<T> IndexMut<Orientation> for OrientationValues<T> {
    fn index_mut(&mut self, orientation: Orientation) -> &mut Self::Output {
        match orientation {
            Orientation::North => &mut self.north,
            Orientation::East => &mut self.east,
            Orientation::South => &mut self.south,
            Orientation::West => &mut self.west,
            Orientation::Roof => &mut self.roof,
        }
    }
}

/// Compass azimuth of an outward surface normal, clockwise from north, 0 to 360 degrees.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Azimuth(f64);

impl Azimuth {
    pub fn new(angle: f64) -> Result<Self, AzimuthError> {
        if !(0. ..=360.).contains(&angle) {
            return Err(AzimuthError::InvalidAngle(angle));
        }

        Ok(Self(angle))
    }

    pub fn angle(&self) -> f64 {
        self.0
    }

    /// Facade bucket this azimuth falls into. Each cardinal bucket spans 90 degrees centred on
    /// its compass point; boundaries belong to the clockwise-next bucket.
    pub fn facade(&self) -> Orientation {
        match self.0 {
            a if !(45. ..315.).contains(&a) => Orientation::North,
            a if a < 135. => Orientation::East,
            a if a < 225. => Orientation::South,
            _ => Orientation::West,
        }
    }

    pub fn difference(first: Azimuth, second: Azimuth) -> f64 {
        let relative = (first.angle() - second.angle()).abs();

        if relative > 180. {
            360. - relative
        } else {
            relative
        }
    }
}

impl fmt::Display for Azimuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Azimuth {
    type Error = AzimuthError;

    fn try_from(angle: f64) -> Result<Self, Self::Error> {
        Self::new(angle)
    }
}

impl From<Azimuth> for f64 {
    fn from(azimuth: Azimuth) -> Self {
        azimuth.0
    }
}

impl FromStr for Azimuth {
    type Err = AzimuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let angle = s
            .trim()
            .parse::<f64>()
            .map_err(|_| AzimuthError::Unparseable(s.to_string()))?;
        Self::new(angle)
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum AzimuthError {
    #[error("Azimuth must be between 0 and 360 degrees inclusive, got {0}")]
    InvalidAngle(f64),
    #[error("Could not read an azimuth from '{0}'")]
    Unparseable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0., Orientation::North)]
    #[case(44.9, Orientation::North)]
    #[case(45., Orientation::East)]
    #[case(90., Orientation::East)]
    #[case(180., Orientation::South)]
    #[case(224.9, Orientation::South)]
    #[case(270., Orientation::West)]
    #[case(315., Orientation::North)]
    #[case(360., Orientation::North)]
    fn should_bucket_azimuth_into_facade(#[case] angle: f64, #[case] expected: Orientation) {
        assert_eq!(Azimuth::new(angle).unwrap().facade(), expected);
    }

    #[rstest]
    fn should_reject_out_of_range_azimuth() {
        assert!(Azimuth::new(-10.).is_err());
        assert!(Azimuth::new(380.).is_err());
        assert!(Azimuth::new(f64::NAN).is_err());
        assert!("abc".parse::<Azimuth>().is_err());
        assert_eq!("90".parse::<Azimuth>().unwrap().angle(), 90.);
    }

    #[rstest]
    #[case(10., 350., 20.)]
    #[case(90., 270., 180.)]
    #[case(0., 45., 45.)]
    fn should_calc_azimuth_difference(
        #[case] first: f64,
        #[case] second: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(
            Azimuth::difference(Azimuth(first), Azimuth(second)),
            expected
        );
    }

    #[rstest]
    fn should_index_values_by_orientation() {
        let mut values = OrientationValues::uniform(1.);
        values[Orientation::South] = 3.;
        values.roof = 5.;

        assert_eq!(values.get(Orientation::South), 3.);
        assert_eq!(values.sum(), 11.);
        assert_eq!(values.vertical_sum(), 6.);
        assert_eq!(
            values.iter().map(|(o, _)| o).collect::<Vec<_>>(),
            Orientation::ALL.to_vec()
        );
    }

    #[rstest]
    fn should_deserialize_azimuth_with_range_check() {
        assert_eq!(
            serde_json::from_str::<Azimuth>("135.0").unwrap(),
            Azimuth(135.)
        );
        assert!(serde_json::from_str::<Azimuth>("400.0").is_err());
    }
}

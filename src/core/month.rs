use crate::core::units::{DAYS_IN_MONTH, HOURS_PER_DAY};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

// Hours that start each month (and end the previous one). There are 13 values so that the end
// of the final month is handled correctly, e.g. January is hours 0-743.
const MONTH_START_END_HOURS: [u32; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// A calendar month of a non-leap year.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
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
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Month from its calendar number, 1 (January) to 12 (December)
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1..=12 => Some(Self::ALL[(number - 1) as usize]),
            _ => None,
        }
    }

    /// Calendar number, 1 to 12
    pub fn number(&self) -> u32 {
        self.index() as u32 + 1
    }

    /// Zero-based position in the year, 0 to 11
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn days(&self) -> u32 {
        DAYS_IN_MONTH[self.index()]
    }

    pub fn hours(&self) -> f64 {
        (self.days() * HOURS_PER_DAY) as f64
    }

    /// First hour of the year in this month and first hour of the following month
    pub fn start_end_hours(&self) -> (u32, u32) {
        (
            MONTH_START_END_HOURS[self.index()],
            MONTH_START_END_HOURS[self.index() + 1],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[rstest]
    fn should_iterate_in_calendar_order() {
        assert_eq!(Month::iter().collect::<Vec<_>>(), Month::ALL.to_vec());
        for (idx, month) in Month::ALL.iter().enumerate() {
            assert_eq!(month.index(), idx);
            assert_eq!(month.number(), idx as u32 + 1);
        }
    }

    #[rstest]
    #[case(0, None)]
    #[case(1, Some(Month::January))]
    #[case(2, Some(Month::February))]
    #[case(12, Some(Month::December))]
    #[case(13, None)]
    fn should_build_month_from_number(#[case] number: u32, #[case] expected: Option<Month>) {
        assert_eq!(Month::from_number(number), expected);
    }

    #[rstest]
    fn should_have_hours_consistent_with_month_boundaries() {
        for month in Month::ALL {
            let (start, end) = month.start_end_hours();
            assert_eq!((end - start) as f64, month.hours());
        }
    }

    #[rstest]
    fn should_display_month_name() {
        assert_eq!(Month::September.to_string(), "September");
    }
}

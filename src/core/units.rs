pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: u32 = DAYS_PER_YEAR * HOURS_PER_DAY;
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Volumetric heat capacity of air, in Wh / (m3.K) (1200 J / (m3.K))
pub const AIR_HEAT_CAPACITY_WH_PER_M3_K: f64 = 1200. / SECONDS_PER_HOUR as f64;

/// Convert an average power density (W/m2) sustained for a number of hours into an energy
/// density in kWh/m2.
pub(crate) fn power_density_to_energy(power_w_per_m2: f64, hours: f64) -> f64 {
    power_w_per_m2 * hours / WATTS_PER_KILOWATT as f64
}

pub(crate) fn average_monthly_to_annual(list_monthly_averages: [f64; 12]) -> f64 {
    list_monthly_averages
        .iter()
        .enumerate()
        .map(|(month_idx, month_ave)| month_ave * DAYS_IN_MONTH[month_idx] as f64)
        .sum::<f64>()
        / DAYS_PER_YEAR as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_have_consistent_calendar() {
        assert_eq!(DAYS_IN_MONTH.iter().sum::<u32>(), DAYS_PER_YEAR);
        assert_eq!(HOURS_PER_YEAR, 8760);
    }

    #[rstest]
    fn should_convert_power_density_to_energy() {
        // 10 W/m2 for a 31 day month
        assert_relative_eq!(power_density_to_energy(10., 744.), 7.44);
    }

    #[rstest]
    fn should_convert_average_monthly_to_annual() {
        let list_monthly_averages = [
            4.3, 4.9, 6.5, 8.9, 11.7, 14.6, 16.6, 16.4, 14.1, 10.6, 7.1, 4.2,
        ];
        assert_relative_eq!(
            average_monthly_to_annual(list_monthly_averages),
            10.020547945205479,
            max_relative = 1e-12
        );
    }
}

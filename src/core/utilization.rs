//! Gain and loss utilization factors of the ISO 13790 monthly method.
//!
//! Both factors follow the same saturating curve of a dimensionless ratio `x`:
//!
//! ```text
//! eta(x, a) = (1 - x^a) / (1 - x^(a+1))    x > 0, x != 1
//!           = a / (a + 1)                  x = 1
//!           = 1                            x <= 0
//! ```
//!
//! `eta` tends to 1 as `x` tends to 0, and behaves like `1 / x` as `x` grows, so the utilized
//! quantity `eta * x` saturates at 1. The numerical parameter `a` grows with the building's
//! thermal time constant: heavier buildings store more surplus and use more of it.

use crate::core::units::SECONDS_PER_HOUR;

/// Reference numerical parameter for the monthly method
const A_0: f64 = 1.;
/// Reference time constant for the monthly method, in hours
const TAU_0: f64 = 15.;

/// Heat transfer coefficient the building time constant is evaluated against, in W / (K.m2).
/// Heating needs only rise and cooling needs only fall with envelope U-values while this does
/// not depend on the envelope.
pub const REFERENCE_CONDUCTANCE: f64 = 1.;

/// Thermal time constant of the building zone, in hours.
///
/// Arguments:
/// * `heat_capacity` - internal heat capacity, in J / (K.m2)
/// * `conductance` - total heat transfer coefficient, in W / (K.m2)
pub fn time_constant(heat_capacity: f64, conductance: f64) -> f64 {
    if conductance <= 0. {
        return f64::INFINITY;
    }

    heat_capacity / SECONDS_PER_HOUR as f64 / conductance
}

/// Numerical parameter `a` for a thermal time constant in hours
pub fn numerical_parameter(time_constant: f64) -> f64 {
    A_0 + time_constant / TAU_0
}

/// Utilization factor for heat gains in heating mode.
///
/// `gain_loss_ratio` is total heat gains over total heat transfer for the month.
pub fn gain_utilization_factor(gain_loss_ratio: f64, a: f64) -> f64 {
    utilization_factor(gain_loss_ratio, a)
}

/// Utilization factor for heat transfer in cooling mode.
///
/// `loss_gain_ratio` is total heat transfer over total heat gains for the month.
pub fn loss_utilization_factor(loss_gain_ratio: f64, a: f64) -> f64 {
    utilization_factor(loss_gain_ratio, a)
}

/// Gain/loss ratio above which a month is outside the heating season
pub fn heating_season_limit(a: f64) -> f64 {
    if !a.is_finite() {
        return 1.;
    }

    (a + 1.) / a
}

fn utilization_factor(ratio: f64, a: f64) -> f64 {
    if ratio <= 0. || ratio.is_nan() {
        return 1.;
    }
    if ratio.is_infinite() {
        return 0.;
    }

    // limit of the curve for an infinitely heavy building
    if !a.is_finite() {
        return if ratio < 1. { 1. } else { 1. / ratio };
    }

    if is_close!(ratio, 1., rel_tol = 1e-9) {
        return a / (a + 1.);
    }

    let factor = (1. - ratio.powf(a)) / (1. - ratio.powf(a + 1.));

    // large exponents of large ratios overflow to inf / inf
    if factor.is_finite() {
        factor
    } else {
        1. / ratio
    }
}

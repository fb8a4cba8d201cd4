pub(crate) fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub(crate) fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Clamp an energy quantity at zero. NaN is treated as zero.
pub(crate) fn non_negative(value: f64) -> f64 {
    if value > 0. {
        value
    } else {
        0.
    }
}

pub(crate) fn is_fraction(value: f64) -> bool {
    (0. ..=1.).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(2., 4., 2.)]
    #[case(4., 2., 2.)]
    #[case(-1., 0., -1.)]
    fn should_calc_min_of_2(#[case] first: f64, #[case] second: f64, #[case] expected: f64) {
        assert_eq!(min_of_2(first, second), expected);
    }

    #[rstest]
    #[case(2., 4., 4.)]
    #[case(4., 2., 4.)]
    fn should_calc_max_of_2(#[case] first: f64, #[case] second: f64, #[case] expected: f64) {
        assert_eq!(max_of_2(first, second), expected);
    }

    #[rstest]
    fn should_clamp_negative_and_nan_to_zero() {
        assert_eq!(non_negative(-3.5), 0.);
        assert_eq!(non_negative(f64::NAN), 0.);
        assert_eq!(non_negative(2.25), 2.25);
    }

    #[rstest]
    fn should_recognise_fractions() {
        assert!(is_fraction(0.));
        assert!(is_fraction(1.));
        assert!(!is_fraction(1.01));
        assert!(!is_fraction(-0.01));
        assert!(!is_fraction(f64::NAN));
    }
}

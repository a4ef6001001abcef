#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn unit(text: &str) -> Unit {
    Unit::parse(text).unwrap()
}

#[test]
fn parse_and_display() {
    assert_eq!(unit("m/s^2").to_string(), "m/s^2");
    assert_eq!(unit("kg·m").to_string(), "kg·m");
    assert!(unit("").is_unitless());
    assert_eq!(unit("m·m").to_string(), "m^2");
}

#[test]
fn product_and_quotient_compose() {
    let speed = unit("m/s");
    let time = Unit::base("s");
    assert_eq!(speed.product(&time), Some(Unit::base("m")));
    assert_eq!(Unit::base("m").quotient(&Unit::base("m")), Some(Unit::unitless()));
    assert_eq!(Unit::base("m").power(2), Some(unit("m^2")));
    assert_eq!(Unit::base("m").power(0), Some(Unit::unitless()));
}

#[test]
fn split_number_literal() {
    let (magnitude, parsed) = split_number("9.8m/s^2").unwrap();
    assert_eq!(magnitude, 9.8);
    assert_eq!(parsed, unit("m/s^2"));
    let (magnitude, parsed) = split_number("42").unwrap();
    assert_eq!(magnitude, 42.0);
    assert!(parsed.is_unitless());
}

#[test]
fn exponents_that_do_not_fit_are_rejected() {
    let huge = unit("m^2147483647");
    assert_eq!(huge.product(&Unit::base("m")), None);
    assert_eq!(huge.power(2), None);
    assert_eq!(unit("m^-2147483648").power(-1), None);
    assert_eq!(Unit::base("s").quotient(&unit("s^-2147483648")), None);
    assert_eq!(Unit::parse("m^2147483647·m"), None);
    assert_eq!(Unit::parse("s/m^-2147483648"), None);
    assert_eq!(Unit::parse("m^99999999999"), None);
    assert_eq!(split_number("1m^2147483647·m"), None);
    assert_eq!(huge.conversion_factor(&huge), Some(1.0));
}

#[test]
fn conversion_factors_within_a_family() {
    assert_eq!(Unit::base("km").conversion_factor(&Unit::base("m")), Some(1000.0));
    assert_eq!(Unit::base("min").conversion_factor(&Unit::base("s")), Some(60.0));
    let factor = unit("km/h").conversion_factor(&unit("m/s")).unwrap();
    assert!((factor - 1000.0 / 3600.0).abs() < 1e-12);
    assert_eq!(Unit::base("m").conversion_factor(&Unit::base("s")), None);
}

fn small_unit() -> impl Strategy<Value = Unit> {
    proptest::collection::vec((prop::sample::select(vec!["m", "s", "kg", "px"]), -4i32..=4), 0..4)
        .prop_map(|factors| {
            let mut out = Unit::unitless();
            for (name, power) in factors {
                if power != 0 {
                    out = out.product(&Unit::base(name).power(power).unwrap()).unwrap();
                }
            }
            out
        })
}

proptest! {
    #[test]
    fn quotient_undoes_product(a in small_unit(), b in small_unit()) {
        let product = a.product(&b).unwrap();
        prop_assert_eq!(product.quotient(&b), Some(a));
    }

    #[test]
    fn display_parses_back(a in small_unit()) {
        prop_assert_eq!(Unit::parse(&a.to_string()), Some(a));
    }
}

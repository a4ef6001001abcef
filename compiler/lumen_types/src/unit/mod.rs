//! Physical units on numbers.
//!
//! A unit is a product of named base factors raised to non-zero integer
//! powers. `kg·m/s^2` is `{kg: 1, m: 1, s: -2}`. Addition and comparison
//! require identical units; multiplication and division compose them.

use std::collections::BTreeMap;
use std::fmt;

use lumen_ir::Name;

/// A compound unit. The empty unit is unitless.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Unit(BTreeMap<Name, i32>);

/// Scale of a named unit relative to its family's base.
const SCALES: &[(&str, &str, f64)] = &[
    ("m", "m", 1.0),
    ("km", "m", 1000.0),
    ("cm", "m", 0.01),
    ("mm", "m", 0.001),
    ("s", "s", 1.0),
    ("ms", "s", 0.001),
    ("min", "s", 60.0),
    ("h", "s", 3600.0),
    ("g", "g", 1.0),
    ("kg", "g", 1000.0),
];

impl Unit {
    pub fn unitless() -> Self {
        Unit::default()
    }

    /// A single factor with power 1.
    pub fn base(name: &str) -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(Name::new(name), 1);
        Unit(factors)
    }

    /// Parse unit text such as `m`, `m/s^2` or `kg·m`. Everything after
    /// the first `/` is in the denominator. `None` when an exponent does
    /// not fit.
    pub fn parse(text: &str) -> Option<Self> {
        let (numerator, denominator) = match text.split_once('/') {
            Some((top, bottom)) => (top, Some(bottom)),
            None => (text, None),
        };
        let mut unit = Unit::unitless();
        unit.add_factors(numerator, 1)?;
        if let Some(bottom) = denominator {
            unit.add_factors(bottom, -1)?;
        }
        Some(unit)
    }

    fn add_factors(&mut self, text: &str, sign: i32) -> Option<()> {
        for factor in text.split('·').filter(|f| !f.is_empty()) {
            let (name, power) = match factor.split_once('^') {
                Some((name, power)) => (name, power.parse::<i32>().ok()?),
                None => (factor, 1),
            };
            self.add(name, power.checked_mul(sign)?)?;
        }
        Some(())
    }

    fn add(&mut self, name: &str, power: i32) -> Option<()> {
        let entry = self.0.entry(Name::new(name)).or_insert(0);
        *entry = entry.checked_add(power)?;
        if *entry == 0 {
            self.0.remove(name);
        }
        Some(())
    }

    pub fn is_unitless(&self) -> bool {
        self.0.is_empty()
    }

    /// `self·other`, or `None` when an exponent overflows.
    #[must_use]
    pub fn product(&self, other: &Unit) -> Option<Unit> {
        let mut out = self.clone();
        for (name, power) in &other.0 {
            out.add(name.as_str(), *power)?;
        }
        Some(out)
    }

    #[must_use]
    pub fn quotient(&self, other: &Unit) -> Option<Unit> {
        self.product(&other.power(-1)?)
    }

    #[must_use]
    pub fn power(&self, exponent: i32) -> Option<Unit> {
        if exponent == 0 {
            return Some(Unit::unitless());
        }
        self.0
            .iter()
            .map(|(name, power)| Some((name.clone(), power.checked_mul(exponent)?)))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(Unit)
    }

    /// Same unit expressed in family bases, with the scale factor.
    fn to_base(&self) -> Option<(Unit, f64)> {
        let mut base = Unit::unitless();
        let mut scale = 1.0;
        for (name, power) in &self.0 {
            match SCALES.iter().find(|(unit, _, _)| *unit == name.as_str()) {
                Some((_, family, factor)) => {
                    base.add(family, *power)?;
                    scale *= factor.powi(*power);
                }
                None => base.add(name.as_str(), *power)?,
            }
        }
        Some((base, scale))
    }

    /// Multiplier taking a number in `self` to the same quantity in `to`,
    /// if both measure the same dimensions.
    pub fn conversion_factor(&self, to: &Unit) -> Option<f64> {
        let (from_base, from_scale) = self.to_base()?;
        let (to_base, to_scale) = to.to_base()?;
        (from_base == to_base).then(|| from_scale / to_scale)
    }
}

/// Split number literal text into its magnitude and unit.
///
/// `9.8m/s^2` is `(9.8, m/s^2)`. Magnitudes that do not parse are NaN.
/// `None` when the unit's exponents do not fit.
pub fn split_number(text: &str) -> Option<(f64, Unit)> {
    let boundary = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let magnitude = text[..boundary].parse::<f64>().unwrap_or(f64::NAN);
    Some((magnitude, Unit::parse(&text[boundary..])?))
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_factors = |f: &mut fmt::Formatter<'_>, positive: bool| -> fmt::Result {
            let mut first = true;
            for (name, power) in &self.0 {
                if (*power > 0) != positive {
                    continue;
                }
                if !first {
                    f.write_str("·")?;
                }
                first = false;
                let magnitude = power.abs();
                if magnitude == 1 {
                    write!(f, "{name}")?;
                } else {
                    write!(f, "{name}^{magnitude}")?;
                }
            }
            Ok(())
        };
        write_factors(f, true)?;
        if self.0.values().any(|power| *power < 0) {
            f.write_str("/")?;
            write_factors(f, false)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit({self})")
    }
}

#[cfg(test)]
mod tests;

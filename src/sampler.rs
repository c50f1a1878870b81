// sampler.rs - randomized geometry draws under static and derived bounds

use std::fmt;

use rand::Rng;

use crate::{Error, Result};

/// Ordered name/value pairs describing one candidate geometry. Order is the
/// declaration order of the bound spec, which is also the dataset column
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pairs: Vec<(String, f64)>,
}

impl ParameterSet {
    pub fn from_pairs(pairs: Vec<(String, f64)>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.pairs
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|&(_, v)| v)
    }

    /// Value at declaration index. Panics on out-of-range index, which is a
    /// caller bug (the recorder and trainer only index within the header).
    pub fn value_at(&self, idx: usize) -> f64 {
        self.pairs[idx].1
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.pairs.iter().map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Static range for an independently drawn dimension.
#[derive(Debug, Clone)]
pub struct FieldRange {
    pub name: String,
    pub lo: f64,
    pub hi: f64,
}

/// Upper limit computed from an earlier draw: `hi = scale * source + offset`.
#[derive(Debug, Clone)]
pub struct DerivedUpper {
    pub source: String,
    pub scale: f64,
    pub offset: f64,
}

/// A dimension whose upper bound depends on an already-drawn field.
#[derive(Debug, Clone)]
pub struct DependentRange {
    pub name: String,
    pub lo: f64,
    pub upper: DerivedUpper,
}

/// Bound declaration for one geometry family. Independent fields are drawn
/// first, in order, then dependent fields, in order.
///
/// Computed dependent bounds are assumed to satisfy `lo <= hi` for every
/// reachable draw of their sources; that is a property of the static
/// configuration, not something checked per draw.
#[derive(Debug, Clone)]
pub struct BoundSpec {
    pub independent: Vec<FieldRange>,
    pub dependent: Vec<DependentRange>,
}

impl BoundSpec {
    /// Bounds for the U-slot patch geometry, in millimetres: patch width
    /// and length are free, the slot must fit inside the patch.
    pub fn u_slot_patch() -> Self {
        Self {
            independent: vec![
                FieldRange { name: "W".into(), lo: 30.0, hi: 50.0 },
                FieldRange { name: "L".into(), lo: 25.0, hi: 40.0 },
            ],
            dependent: vec![
                DependentRange {
                    name: "Ls".into(),
                    lo: 10.0,
                    upper: DerivedUpper { source: "W".into(), scale: 1.0, offset: -4.0 },
                },
                DependentRange {
                    name: "Ws".into(),
                    lo: 2.0,
                    upper: DerivedUpper { source: "L".into(), scale: 0.5, offset: -2.0 },
                },
            ],
        }
    }

    /// All field names in draw (and column) order.
    pub fn names(&self) -> Vec<String> {
        self.independent
            .iter()
            .map(|f| f.name.clone())
            .chain(self.dependent.iter().map(|d| d.name.clone()))
            .collect()
    }
}

/// Draws one [`ParameterSet`] per call from a validated [`BoundSpec`].
pub struct Sampler {
    spec: BoundSpec,
}

/// Millimetre values are kept at two decimals, like the solver project
/// expects them.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl Sampler {
    /// Validates that every derived upper bound references a field drawn
    /// before it. Numeric validity of the computed ranges is not checked.
    pub fn new(spec: BoundSpec) -> Result<Self> {
        let mut known: Vec<&str> = spec.independent.iter().map(|f| f.name.as_str()).collect();
        for dep in &spec.dependent {
            if !known.contains(&dep.upper.source.as_str()) {
                return Err(Error::Bounds(format!(
                    "dependent bound `{}` references unknown field `{}`",
                    dep.name, dep.upper.source
                )));
            }
            known.push(dep.name.as_str());
        }
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &BoundSpec {
        &self.spec
    }

    /// One uniform draw per field, independents first, then dependents
    /// against the values just drawn. Rounded values are clamped back into
    /// their range so the two-decimal grid can never step outside it.
    pub fn draw(&self, rng: &mut impl Rng) -> ParameterSet {
        let mut pairs: Vec<(String, f64)> =
            Vec::with_capacity(self.spec.independent.len() + self.spec.dependent.len());

        for field in &self.spec.independent {
            let v = round2(rng.gen_range(field.lo..field.hi)).clamp(field.lo, field.hi);
            pairs.push((field.name.clone(), v));
        }

        for dep in &self.spec.dependent {
            let source = pairs
                .iter()
                .find(|(n, _)| *n == dep.upper.source)
                .map(|&(_, v)| v)
                .unwrap_or_default();
            let hi = dep.upper.scale * source + dep.upper.offset;
            let v = round2(rng.gen_range(dep.lo..hi)).clamp(dep.lo, hi);
            pairs.push((dep.name.clone(), v));
        }

        ParameterSet { pairs }
    }
}

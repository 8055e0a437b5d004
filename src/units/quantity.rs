use super::{convert, Equivalency, Unit, UnitError};

/// A vector of values tagged with one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    values: Vec<f64>,
    unit: Unit,
}

impl Quantity {
    pub fn new(values: Vec<f64>, unit: Unit) -> Self {
        Quantity { values, unit }
    }

    pub fn scalar(value: f64, unit: Unit) -> Self {
        Quantity::new(vec![value], unit)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest finite-or-infinite value, skipping NaN.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }

    /// Re-express in `unit`. `context` is the spectral axis for
    /// [`Equivalency::SpectralDensity`] and ignored otherwise.
    pub fn to(&self, unit: &Unit, equivalency: Equivalency, context: Option<&Quantity>) -> Result<Quantity, UnitError> {
        let values = convert(&self.values, &self.unit, unit, equivalency, context)?;
        Ok(Quantity::new(values, unit.clone()))
    }

    /// Sub-range `[start, end)` keeping the unit.
    pub fn slice(&self, start: usize, end: usize) -> Quantity {
        Quantity::new(self.values[start..end].to_vec(), self.unit.clone())
    }
}

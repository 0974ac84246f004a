use crate::DescError;

/// One variable stored in a data file.
///
/// `dimensions` is the array shape of a single sample (e.g. `[40, 50]` for a
/// 40x50 grid per timestamp). Every axis must be non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDesc {
    name: String,
    dimensions: Vec<u64>,
    units: String,
    long_name: String,
    valid_min: f32,
    valid_max: f32,
}

impl VariableDesc {
    /// Creates a variable with no units, `long_name == name` and the full
    /// `f32` valid range.
    ///
    /// # Errors
    ///
    /// Returns [`DescError::EmptyVariableName`] or [`DescError::ZeroDimension`].
    pub fn new(name: impl Into<String>, dimensions: Vec<u64>) -> Result<Self, DescError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DescError::EmptyVariableName);
        }
        if let Some(axis) = dimensions.iter().position(|&d| d == 0) {
            return Err(DescError::ZeroDimension { name, axis });
        }
        Ok(Self {
            long_name: name.clone(),
            name,
            dimensions,
            units: String::new(),
            valid_min: f32::MIN,
            valid_max: f32::MAX,
        })
    }

    /// Returns a copy with the given units.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Returns a copy with the given human-readable name.
    #[must_use]
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = long_name.into();
        self
    }

    /// Returns a copy with the given valid range.
    #[must_use]
    pub fn with_valid_range(mut self, min: f32, max: f32) -> Self {
        self.valid_min = min;
        self.valid_max = max;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    pub fn valid_min(&self) -> f32 {
        self.valid_min
    }

    pub fn valid_max(&self) -> f32 {
        self.valid_max
    }

    /// Number of scalar values in one sample (product of the dimensions).
    /// A scalar variable (no dimensions) has one value per sample. `None` if
    /// the product does not fit in a `u64`.
    #[must_use]
    pub fn values_per_sample(&self) -> Option<u64> {
        self.dimensions
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
    }
}

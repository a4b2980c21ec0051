use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Number of vibration motors on the vest, one per image column zone.
pub const ZONE_COUNT: usize = 7;

/// One complete set of motor intensities, in motor order, each in [0, 1].
///
/// A vector is always built whole from a single depth field; slots are
/// never updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuationVector([f32; ZONE_COUNT]);

impl ActuationVector {
    pub fn new(values: [f32; ZONE_COUNT]) -> Self {
        Self(values)
    }

    /// All motors off. Devices treat this as "stand down".
    pub fn zeros() -> Self {
        Self([0.0; ZONE_COUNT])
    }

    pub fn values(&self) -> &[f32; ZONE_COUNT] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Largest single intensity, useful for "anything close?" checks.
    pub fn peak(&self) -> f32 {
        self.0.iter().copied().fold(0.0, f32::max)
    }
}

impl std::ops::Index<usize> for ActuationVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl TryFrom<Vec<f32>> for ActuationVector {
    type Error = Error;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        let len = values.len();
        let values: [f32; ZONE_COUNT] = values.try_into().map_err(|_| {
            Error::Actuation(format!("expected {} intensities, got {}", ZONE_COUNT, len))
        })?;
        Ok(Self(values))
    }
}

impl fmt::Display for ActuationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.2}", v)?;
        }
        write!(f, "]")
    }
}

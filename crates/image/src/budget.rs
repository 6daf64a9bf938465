//! Size budget and the linear scale schedule used by the preparer.

use serde::{Deserialize, Serialize};

/// Default maximum encoded upload size in bytes.
pub const DEFAULT_BUDGET_BYTES: usize = 60_000;

/// Number of scale steps between 1.0 and 0.0.
const STEPS_PER_UNIT: u8 = 10;

/// Maximum encoded size, in bytes, an uploaded photo may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressionBudget(usize);

impl CompressionBudget {
    /// Create a budget of `bytes`.
    pub const fn new(bytes: usize) -> Self {
        Self(bytes)
    }

    /// The budget in bytes.
    pub const fn bytes(&self) -> usize {
        self.0
    }

    /// Whether an encoding of `len` bytes is acceptable.
    pub const fn fits(&self, len: usize) -> bool {
        len <= self.0
    }
}

impl Default for CompressionBudget {
    fn default() -> Self {
        Self(DEFAULT_BUDGET_BYTES)
    }
}

/// Multiplier applied to the working image side to pick a resample target.
///
/// Starts at 1.0 and decreases by exactly 0.1 per attempt. The value is kept
/// in whole tenths so ten decrements land on 0.0 rather than a float residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScaleFactor {
    tenths: u8,
}

impl ScaleFactor {
    /// The starting scale, 1.0.
    pub const fn initial() -> Self {
        Self {
            tenths: STEPS_PER_UNIT,
        }
    }

    /// Scale as a real number.
    pub fn value(&self) -> f64 {
        f64::from(self.tenths) / f64::from(STEPS_PER_UNIT)
    }

    /// True once the scale has reached 0.0 and no further attempt is useful.
    pub const fn is_exhausted(&self) -> bool {
        self.tenths == 0
    }

    /// Decrease by 0.1, saturating at 0.0.
    pub fn decrement(&mut self) {
        self.tenths = self.tenths.saturating_sub(1);
    }

    /// Target pixel side for a square of `side` pixels, never below 1.
    pub fn target_dimension(&self, side: u32) -> u32 {
        let scaled = (u64::from(side) * u64::from(self.tenths) + u64::from(STEPS_PER_UNIT) / 2)
            / u64::from(STEPS_PER_UNIT);
        u32::try_from(scaled).unwrap_or(side).max(1)
    }

    /// Maximum number of attempts a fresh scale allows.
    pub const fn max_attempts() -> usize {
        STEPS_PER_UNIT as usize
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::initial()
    }
}

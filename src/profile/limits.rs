use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// A slope limit in degrees constrained to [1.0, 90.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct SlopeLimitDeg(f32);

impl SlopeLimitDeg {
    const MIN: f32 = 1.0;
    const MAX: f32 = 90.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for SlopeLimitDeg {
    fn default() -> Self {
        Self::new(15.0)
    }
}

/// A turn-angle limit in degrees constrained to [5.0, 180.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct TurnLimitDeg(f32);

impl TurnLimitDeg {
    const MIN: f32 = 5.0;
    const MAX: f32 = 180.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TurnLimitDeg {
    fn default() -> Self {
        Self::new(60.0)
    }
}

/// A cost multiplier constrained to [0.01, 1000.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, From, Serialize, Deserialize)]
pub struct CostScale(f32);

impl CostScale {
    const MIN: f32 = 0.01;
    const MAX: f32 = 1000.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for CostScale {
    fn default() -> Self {
        Self::new(1.0)
    }
}

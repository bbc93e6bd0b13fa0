use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Scaling strategy code handed to the engine before solving.
///
/// The low three bits select the base algorithm, the higher bits are modifier
/// flags that can be combined with `|`.
///
/// ```
/// use lpkit::ScalingMode;
/// let mode = ScalingMode::GEOMETRIC | ScalingMode::EQUILIBRATE | ScalingMode::INTEGERS;
/// assert_eq!(mode, ScalingMode::DEFAULT);
/// assert_eq!(mode.code(), 196);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalingMode(i32);

impl ScalingMode {
    /// No scaling at all. Used for the retry after a failed solve.
    pub const NONE: ScalingMode = ScalingMode(0);
    /// Scale to convergence using the largest absolute value
    pub const EXTREME: ScalingMode = ScalingMode(1);
    /// Scale based on the range of values
    pub const RANGE: ScalingMode = ScalingMode(2);
    /// Scale to the mean value
    pub const MEAN: ScalingMode = ScalingMode(3);
    /// Geometric scaling
    pub const GEOMETRIC: ScalingMode = ScalingMode(4);
    /// Curtis-Reid scaling
    pub const CURTISREID: ScalingMode = ScalingMode(7);

    /// Modifier: quadratic mean
    pub const QUADRATIC: ScalingMode = ScalingMode(8);
    /// Modifier: logarithmic mean
    pub const LOGARITHMIC: ScalingMode = ScalingMode(16);
    /// Modifier: round scale factors to powers of two
    pub const POWER2: ScalingMode = ScalingMode(32);
    /// Modifier: make sure no scaled value exceeds 1
    pub const EQUILIBRATE: ScalingMode = ScalingMode(64);
    /// Modifier: also scale integer columns
    pub const INTEGERS: ScalingMode = ScalingMode(128);
    /// Modifier: recompute scale factors on every solve
    pub const DYNUPDATE: ScalingMode = ScalingMode(256);

    /// The engine default: geometric, equilibrated, integers included
    pub const DEFAULT: ScalingMode = ScalingMode(196);

    const BASE_MASK: i32 = 7;

    /// Wrap a raw scaling code
    pub const fn from_code(code: i32) -> Self {
        ScalingMode(code)
    }

    /// The raw scaling code
    pub const fn code(self) -> i32 {
        self.0
    }

    /// The base algorithm, with all modifier flags removed
    pub const fn base(self) -> ScalingMode {
        ScalingMode(self.0 & Self::BASE_MASK)
    }

    /// Whether this mode scales anything at all
    pub const fn is_none(self) -> bool {
        self.0 & Self::BASE_MASK == 0
    }

    /// Whether all the bits of `flag` are set
    pub const fn contains(self, flag: ScalingMode) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl Default for ScalingMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for ScalingMode {
    type Output = ScalingMode;

    fn bitor(self, rhs: ScalingMode) -> ScalingMode {
        ScalingMode(self.0 | rhs.0)
    }
}

impl From<i32> for ScalingMode {
    fn from(code: i32) -> Self {
        ScalingMode(code)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_base_strips_flags() {
        let mode = ScalingMode::CURTISREID | ScalingMode::POWER2 | ScalingMode::DYNUPDATE;
        assert_eq!(mode.base(), ScalingMode::CURTISREID);
        assert!(mode.contains(ScalingMode::POWER2));
        assert!(!mode.contains(ScalingMode::INTEGERS));
    }

    #[test]
    fn test_none_ignores_flags() {
        assert!(ScalingMode::NONE.is_none());
        assert!((ScalingMode::NONE | ScalingMode::EQUILIBRATE).is_none());
        assert!(!ScalingMode::DEFAULT.is_none());
    }

    #[test]
    fn test_serialized_as_code() {
        let json = serde_json::to_string(&ScalingMode::DEFAULT).unwrap();
        assert_eq!(json, "196");
        let back: ScalingMode = serde_json::from_str("4").unwrap();
        assert_eq!(back, ScalingMode::GEOMETRIC);
    }
}

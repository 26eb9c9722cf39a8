use core::fmt;

use serde::{Deserialize, Serialize};

/// Direction of the transform a stage belongs to.
///
/// Forward transforms rotate by `exp(-i*theta)`, inverse transforms by `exp(+i*theta)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    /// Maps the conventional exponent sign (`-1` forward, `+1` inverse) to a direction.
    #[must_use]
    pub const fn from_sign(sign: i32) -> Option<Self> {
        match sign {
            -1 => Some(Self::Forward),
            1 => Some(Self::Inverse),
            _ => None,
        }
    }

    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Forward => -1,
            Self::Inverse => 1,
        }
    }
}

/// How many base-256 digits of the position product a twiddle lookup consumes.
///
/// Each level covers a factor of 256 more of the position range, so level `k` is exact for
/// positions below `256^k`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TwiddleLevel {
    Two,
    Three,
    Four,
}

impl TwiddleLevel {
    #[must_use]
    pub const fn digits(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }
}

impl fmt::Display for TwiddleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digits())
    }
}

/// The twiddle step a stage fuses into its loads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TwiddleSpec {
    pub level: TwiddleLevel,
    pub direction: Direction,
}

impl TwiddleSpec {
    #[must_use]
    pub const fn new(level: TwiddleLevel, direction: Direction) -> Self {
        Self { level, direction }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_round_trip() {
        for dir in [Direction::Forward, Direction::Inverse] {
            assert_eq!(Direction::from_sign(dir.sign()), Some(dir));
        }
        assert_eq!(Direction::from_sign(0), None);
        assert_eq!(Direction::from_sign(2), None);
    }

    #[test]
    fn levels_are_ordered_by_digits() {
        assert!(TwiddleLevel::Two < TwiddleLevel::Three);
        assert!(TwiddleLevel::Three < TwiddleLevel::Four);
        assert_eq!(TwiddleLevel::Four.digits(), 4);
    }

    #[test]
    fn spec_serializes_with_named_fields() {
        let spec = TwiddleSpec::new(TwiddleLevel::Three, Direction::Inverse);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"level":"Three","direction":"Inverse"}"#);
        let back: TwiddleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}

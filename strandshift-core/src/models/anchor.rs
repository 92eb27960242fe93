use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::AnchorParseError;

///
/// Strand of a mapped read.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = AnchorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "+" | "f" | "fwd" | "forward" | "0" => Ok(Strand::Forward),
            "-" | "r" | "rev" | "reverse" | "16" => Ok(Strand::Reverse),
            _ => Err(AnchorParseError::InvalidStrand(s.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// A single read reduced to its 5' anchor on one strand.
///
/// Positions are 0-based. Anchors flagged as duplicates are kept in the
/// collection but never counted by the profile engine.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub struct ReadAnchor {
    pub position: i64,
    pub duplicate: bool,
}

impl ReadAnchor {
    pub fn new(position: i64) -> Self {
        ReadAnchor {
            position,
            duplicate: false,
        }
    }

    pub fn duplicate(position: i64) -> Self {
        ReadAnchor {
            position,
            duplicate: true,
        }
    }

    /// True when the anchor takes part in density construction.
    #[inline]
    pub fn is_counted(&self) -> bool {
        !self.duplicate
    }
}

use core::fmt;
use core::str::FromStr;

/// Facet marker of a boundary patch in the external mesh.
///
/// Tags are assigned by the meshing toolkit (wall = 0, then inlet and
/// outlets), so 0 is a valid value and no index offset is applied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BoundaryTag(u32);

impl BoundaryTag {
    pub const fn new(tag: u32) -> Self {
        Self(tag)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for BoundaryTag {
    fn from(tag: u32) -> Self {
        Self(tag)
    }
}

impl FromStr for BoundaryTag {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(Self)
    }
}

impl fmt::Debug for BoundaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundaryTag({})", self.0)
    }
}

impl fmt::Display for BoundaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Alias used where a tag always names an outlet patch.
pub type OutletId = BoundaryTag;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

/// The `idType` named in an ICO file header.
///
/// Only [`ResourceType::Icon`] is ever written.  A cursor file is accepted
/// on read and decoded exactly like an icon: its hotspot fields sit in the
/// directory entry's planes and bit count, which are ignored anyway.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ResourceType {
    /// An icon file (`idType` 1).
    Icon,
    /// A cursor file (`idType` 2), accepted on read only.
    Cursor,
}

impl ResourceType {
    /// Maps an `idType` value to a resource type, or `None` if the header
    /// names anything else.
    pub(crate) fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }

    pub(crate) fn number(&self) -> u16 {
        match *self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }
}

//===========================================================================//


//===========================================================================//

//! Tile type definitions.

use super::ContentError;
use crate::state::{TagSet, TileFlags};

/// Static description of a tile type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileDefinition {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub solid: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub opaque: bool,
    /// Characters whose tags match this query see the opposite solidity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub solid_exceptions: TagSet,
}

impl TileDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: false,
            opaque: false,
            solid_exceptions: TagSet::new(),
        }
    }

    pub fn solid(mut self) -> Self {
        self.solid = true;
        self
    }

    pub fn with_exceptions(mut self, exceptions: TagSet) -> Self {
        self.solid_exceptions = exceptions;
        self
    }

    pub fn flags(&self) -> TileFlags {
        let mut flags = TileFlags::empty();
        flags.set(TileFlags::SOLID, self.solid);
        flags.set(TileFlags::OPAQUE, self.opaque);
        flags
    }

    pub(crate) fn validate(&self) -> Result<(), ContentError> {
        if self.name.trim().is_empty() {
            return Err(ContentError::invalid("tile", &self.name, "name is empty"));
        }
        Ok(())
    }
}

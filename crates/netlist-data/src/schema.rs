//! Serde structs for netlist description files.
//!
//! These define the on-disk format. They are deserialized from RON, JSON, or
//! TOML and then resolved into a `Netlist` by the loader.

use serde::Deserialize;

/// A whole netlist description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetlistData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<BlockData>,
}

/// One block and the nets its pins attach to, one pin per entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockData {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Nets this block drives. A net may appear as an output at most once
    /// across the whole description.
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub clocks: Vec<String>,
}

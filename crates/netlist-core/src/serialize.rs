//! Binary snapshots of a netlist.
//!
//! A snapshot is a bitcode envelope holding a [`SnapshotHeader`] and the
//! bitcode-encoded netlist as an opaque payload. The header can be checked
//! without decoding the payload, and a decoded payload is only accepted once
//! [`Netlist::verify`] passes, so corrupt input yields an error rather than
//! a netlist whose tables disagree.

use std::cmp::Ordering;

use crate::netlist::{Netlist, NetlistError};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Leading tag of a netlist snapshot ("NET" followed by 0x01).
pub const SNAPSHOT_MAGIC: u32 = 0x4E45_5401;

/// Snapshot layout revision written by this build.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure to encode a netlist snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("netlist snapshot encoding failed: {0}")]
    Encode(String),
}

/// Failure to read a netlist snapshot back.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("not a netlist snapshot: magic 0x{0:08X}")]
    InvalidMagic(u32),
    #[error("netlist snapshot version {0} is no longer readable (current is {FORMAT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("netlist snapshot version {0} is newer than this build ({FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("netlist snapshot decoding failed: {0}")]
    Decode(String),
    /// The payload decoded but its tables do not describe a consistent
    /// netlist.
    #[error("corrupt netlist snapshot: {0}")]
    Corrupt(#[source] NetlistError),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Identifies the payload as a netlist and records its layout revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotHeader {
    /// Header stamped on snapshots written by this build.
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    /// Accept only netlist snapshots of exactly [`FORMAT_VERSION`].
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        match self.version.cmp(&FORMAT_VERSION) {
            Ordering::Equal => Ok(()),
            Ordering::Less => Err(DeserializeError::UnsupportedVersion(self.version)),
            Ordering::Greater => Err(DeserializeError::FutureVersion(self.version)),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    header: SnapshotHeader,
    /// The bitcode-encoded `Netlist`.
    payload: Vec<u8>,
}

fn open_envelope(data: &[u8]) -> Result<Envelope, DeserializeError> {
    let envelope: Envelope =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    envelope.header.validate()?;
    Ok(envelope)
}

impl Netlist {
    /// Encode the netlist, ids and removed slots included, behind a
    /// [`SnapshotHeader`].
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let payload = bitcode::serialize(self).map_err(|e| SerializeError::Encode(e.to_string()))?;
        let envelope = Envelope {
            header: SnapshotHeader::new(),
            payload,
        };
        bitcode::serialize(&envelope).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Decode a netlist written by [`Netlist::serialize`].
    ///
    /// The decoded tables must pass [`Netlist::verify`]; otherwise
    /// [`DeserializeError::Corrupt`] is returned.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let envelope = open_envelope(data)?;
        let mut netlist: Netlist = bitcode::deserialize(&envelope.payload)
            .map_err(|e| DeserializeError::Decode(e.to_string()))?;
        netlist.verify().map_err(DeserializeError::Corrupt)?;

        netlist.rebuild_lookups();
        tracing::debug!(
            name = netlist.name(),
            blocks = netlist.block_count(),
            nets = netlist.net_count(),
            "netlist snapshot loaded"
        );
        Ok(netlist)
    }
}

/// Read and validate the header of a snapshot without decoding the netlist.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    open_envelope(data).map(|envelope| envelope.header)
}

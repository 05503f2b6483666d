//! Resolution pipeline: reads description files, resolves net names, builds
//! a `Netlist`.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and the
//! two-pass builder that turns a [`NetlistData`] into a [`Netlist`].

use netlist_core::id::NetId;
use netlist_core::netlist::{Netlist, NetlistError, PinKind};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::schema::NetlistData;

/// Origin reported in errors for descriptions parsed from a string.
const INLINE_ORIGIN: &str = "<inline>";

// ===========================================================================
// Errors
// ===========================================================================

/// Why a netlist description could not be turned into a `Netlist`.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("no netlist description '{base_name}' in {dir}")]
    MissingFile { base_name: String, dir: PathBuf },

    /// The extension is not one of `.ron`, `.toml` or `.json`.
    #[error("{file} is not a .ron, .toml or .json netlist description")]
    UnsupportedFormat { file: PathBuf },

    /// The same description exists in two formats, so the choice is ambiguous.
    #[error("netlist description exists as both {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("cannot parse netlist description {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A pin names a net that no block drives.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// Two blocks share a name.
    #[error("block '{name}' declared twice in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("net '{net}' has more than one driver in {file}")]
    MultipleDrivers { file: PathBuf, net: String },

    #[error(transparent)]
    Netlist(#[from] NetlistError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats
// ===========================================================================

/// Encodings a netlist description may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// File extension of each format, in discovery priority order.
const EXTENSIONS: [(&str, Format); 3] = [
    ("ron", Format::Ron),
    ("toml", Format::Toml),
    ("json", Format::Json),
];

impl Format {
    pub fn extension(self) -> &'static str {
        EXTENSIONS
            .iter()
            .find(|(_, format)| *format == self)
            .map_or("", |&(ext, _)| ext)
    }
}

/// Pick the format of a description from its file extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    EXTENSIONS
        .iter()
        .find(|(known, _)| Some(*known) == ext)
        .map(|&(_, format)| format)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Locate `{base_name}.{ron,toml,json}` in `dir`.
///
/// Returns `Ok(None)` when no such description exists, and
/// `ConflictingFormats` when more than one does.
pub fn find_netlist_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = EXTENSIONS
        .iter()
        .map(|(ext, _)| dir.join(format!("{base_name}.{ext}")))
        .filter(|candidate| candidate.exists());

    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (found, _) => Ok(found),
    }
}

/// [`find_netlist_file`] for a description that must exist.
pub fn require_netlist_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_netlist_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingFile {
        base_name: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load a netlist description from a file, detecting the format from its
/// extension.
pub fn load_netlist(path: &Path) -> Result<Netlist, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let data: NetlistData = deserialize_str(&content, format, path)?;
    let netlist = build_netlist(&data, path)?;

    tracing::debug!(
        path = %path.display(),
        ?format,
        blocks = netlist.block_count(),
        nets = netlist.net_count(),
        "netlist loaded"
    );
    Ok(netlist)
}

/// Parse a netlist description held in memory.
pub fn parse_netlist(content: &str, format: Format) -> Result<Netlist, DataLoadError> {
    let origin = Path::new(INLINE_ORIGIN);
    let data: NetlistData = deserialize_str(content, format, origin)?;
    build_netlist(&data, origin)
}

/// Build a netlist from a parsed description.
///
/// Runs in two passes: first every block and its output pins (which create
/// the nets they drive), then input and clock pins, which must name a net
/// some block drives. `origin` is only used in error reports.
pub fn build_netlist(data: &NetlistData, origin: &Path) -> Result<Netlist, DataLoadError> {
    let mut netlist = Netlist::new(data.name.clone());
    let mut nets: HashMap<String, NetId> = HashMap::new();

    // Pass 1: blocks and driven nets.
    let mut blocks = Vec::with_capacity(data.blocks.len());
    for block in &data.blocks {
        if netlist.find_block(&block.name).is_some() {
            return Err(DataLoadError::DuplicateName {
                file: origin.to_path_buf(),
                name: block.name.clone(),
            });
        }
        let blk = netlist.create_block(block.name.clone())?;
        for net_name in &block.outputs {
            if nets.contains_key(net_name) {
                return Err(DataLoadError::MultipleDrivers {
                    file: origin.to_path_buf(),
                    net: net_name.clone(),
                });
            }
            let net = netlist.create_net(net_name.clone())?;
            netlist.create_pin(blk, PinKind::Output, net)?;
            nets.insert(net_name.clone(), net);
        }
        blocks.push(blk);
    }

    // Pass 2: sinks.
    for (block, &blk) in data.blocks.iter().zip(&blocks) {
        let sinks = block
            .inputs
            .iter()
            .map(|name| (name, PinKind::Input))
            .chain(block.clocks.iter().map(|name| (name, PinKind::Clock)));
        for (net_name, kind) in sinks {
            let net = resolve_net(&nets, net_name, origin)?;
            netlist.create_pin(blk, kind, net)?;
        }
    }

    Ok(netlist)
}

/// Look up a driven net by name, returning an `UnresolvedRef` error if no
/// block drives it.
fn resolve_net(
    nets: &HashMap<String, NetId>,
    name: &str,
    origin: &Path,
) -> Result<NetId, DataLoadError> {
    nets.get(name)
        .copied()
        .ok_or_else(|| DataLoadError::UnresolvedRef {
            file: origin.to_path_buf(),
            name: name.to_string(),
            expected_kind: "driver",
        })
}

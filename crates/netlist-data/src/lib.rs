//! Netlist Data -- netlist description files for netlist-core.
//!
//! A description lists blocks by name together with the nets their input,
//! output and clock pins attach to. Files may be RON, TOML or JSON; the
//! format is picked from the extension. Loading resolves every net name and
//! produces a [`netlist_core::netlist::Netlist`].

pub mod loader;
pub mod schema;

pub use loader::{load_netlist, parse_netlist, DataLoadError, Format};

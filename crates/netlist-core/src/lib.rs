//! Netlist Core -- identifier compaction and block ordering for netlists.
//!
//! This crate provides the identifier bookkeeping that every netlist-based
//! tool leans on: strongly-typed ids with an invalid sentinel, dense
//! id-indexed storage, compaction of a sparse id space with consistent
//! rewriting of every reference into it, and a breadth-first topological
//! ordering of blocks over any graph exposing [`topo::NetlistView`].
//!
//! # Compaction Pattern
//!
//! A compaction pass builds one old-to-new map per id kind and then applies
//! that same map to every table and every reference list keyed by that kind:
//!
//! ```rust,ignore
//! let block_id_map = compress_ids(&block_ids);
//! let names = clean_and_reorder_values(names, &block_id_map);
//! let pin_blocks = update_all_refs(&pin_blocks, &block_id_map);
//! ```
//!
//! # Key Types
//!
//! - [`id::StrongId`] -- Trait implemented by every id kind
//!   ([`id::BlockId`], [`id::PinId`], [`id::NetId`]).
//! - [`id_map::IdMap`] -- Dense, auto-extending storage indexed by an id.
//! - [`compact`] -- `compress_ids`, `clean_and_reorder_*`, and the
//!   reference rewriting routines.
//! - [`topo::topological_block_order`] -- Kahn-style block ordering from
//!   roots toward sinks.
//! - [`netlist::Netlist`] -- In-memory block/pin/net store that implements
//!   [`topo::NetlistView`] and compacts itself with [`compact`].
//! - [`serialize`] -- Versioned binary snapshots of a [`netlist::Netlist`]
//!   via bitcode.

pub mod compact;
pub mod id;
pub mod id_map;
pub mod netlist;
pub mod serialize;
pub mod topo;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

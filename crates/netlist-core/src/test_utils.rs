//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::{BlockId, NetId};
use crate::netlist::{Netlist, PinKind};
use crate::topo::NetlistView;

// ===========================================================================
// Netlist construction
// ===========================================================================

/// Add one block per name, returning their ids in the same order.
pub fn add_blocks<const N: usize>(netlist: &mut Netlist, names: [&str; N]) -> [BlockId; N] {
    names.map(|name| netlist.create_block(name).unwrap())
}

/// Drive a fresh net from a new output pin on `driver` and give each block in
/// `sinks` a new input pin on it. The net is named `<driver>.out<k>`.
pub fn connect(netlist: &mut Netlist, driver: BlockId, sinks: &[BlockId]) -> NetId {
    let outputs = netlist.block_output_pins(driver).count();
    let name = format!("{}.out{}", netlist.block_name(driver), outputs);
    let net = netlist.create_net(name).unwrap();
    netlist.create_pin(driver, PinKind::Output, net).unwrap();
    for &sink in sinks {
        netlist.create_pin(sink, PinKind::Input, net).unwrap();
    }
    net
}

/// A chain `b0 -> b1 -> ... -> b{n-1}`.
pub fn chain_netlist(n: usize) -> (Netlist, Vec<BlockId>) {
    let mut netlist = Netlist::new(format!("chain{n}"));
    let blocks: Vec<BlockId> = (0..n)
        .map(|i| netlist.create_block(format!("b{i}")).unwrap())
        .collect();
    for pair in blocks.windows(2) {
        connect(&mut netlist, pair[0], &[pair[1]]);
    }
    (netlist, blocks)
}

/// A layered DAG: `layers` layers of `width` blocks, every block driving all
/// blocks of the next layer through one net.
pub fn layered_netlist(layers: usize, width: usize) -> (Netlist, Vec<Vec<BlockId>>) {
    let mut netlist = Netlist::new(format!("layered{layers}x{width}"));
    let grid: Vec<Vec<BlockId>> = (0..layers)
        .map(|l| {
            (0..width)
                .map(|w| netlist.create_block(format!("l{l}_{w}")).unwrap())
                .collect()
        })
        .collect();
    for pair in grid.windows(2) {
        for &driver in &pair[0] {
            connect(&mut netlist, driver, &pair[1]);
        }
    }
    (netlist, grid)
}

// ===========================================================================
// Order checks
// ===========================================================================

/// Returns true if every ordered block appears after the drivers of all of
/// its ordered inputs.
pub fn respects_dependencies(netlist: &Netlist, order: &[BlockId]) -> bool {
    let position = |blk: BlockId| order.iter().position(|&b| b == blk);
    order.iter().all(|&blk| {
        let sink_pos = position(blk);
        netlist
            .block_input_pins(blk)
            .chain(netlist.block_clock_pins(blk))
            .all(|pin| {
                let net = netlist.pin_net(pin);
                if !net.is_valid() || !netlist.net_driver(net).is_valid() {
                    return true;
                }
                let driver_blk = netlist.pin_block(netlist.net_driver(net));
                match (position(driver_blk), sink_pos) {
                    (Some(d), Some(s)) => d < s,
                    _ => false,
                }
            })
    })
}

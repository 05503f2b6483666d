//! Breadth-first topological ordering of netlist blocks.

use std::collections::VecDeque;

use crate::id::{StrongId, Validity};
use crate::id_map::IdMap;

/// The lookups a block/pin/net graph must expose to be ordered.
///
/// Implementors only report live entities: `blocks()` yields every block
/// that exists, and the pin iterators skip removed pins.
pub trait NetlistView {
    type BlockId: StrongId;
    type PinId: StrongId;
    type NetId: StrongId;

    /// Every live block, in iteration order.
    fn blocks(&self) -> impl Iterator<Item = Self::BlockId>;

    fn block_input_pins(&self, blk: Self::BlockId) -> impl Iterator<Item = Self::PinId>;

    fn block_clock_pins(&self, blk: Self::BlockId) -> impl Iterator<Item = Self::PinId>;

    fn block_output_pins(&self, blk: Self::BlockId) -> impl Iterator<Item = Self::PinId>;

    /// Net a pin is attached to; the invalid id for an unconnected pin.
    fn pin_net(&self, pin: Self::PinId) -> Self::NetId;

    /// Sink pins of a net (every pin except its driver).
    fn net_sinks(&self, net: Self::NetId) -> impl Iterator<Item = Self::PinId>;

    fn pin_block(&self, pin: Self::PinId) -> Self::BlockId;
}

/// Order blocks from roots (no input or clock pins) toward sinks.
///
/// Runs Kahn's algorithm with a FIFO queue. A block becomes ready once every
/// one of its input and clock pins has been reached from an already ordered
/// driver. Ties between ready blocks follow enqueue order, so the result is
/// deterministic for a given iteration order but not canonical.
///
/// Blocks on a cycle, or fed by one, never become ready and are left out:
/// callers that need full coverage compare the result length against the
/// block count. Output pins on unconnected nets are skipped.
///
/// # Panics
///
/// Panics if the graph reports more sink edges into a block than it reports
/// input and clock pins on that block.
///
/// # Examples
///
/// ```
/// use netlist_core::netlist::{Netlist, PinKind};
/// use netlist_core::topo::topological_block_order;
///
/// let mut netlist = Netlist::new("chain");
/// let a = netlist.create_block("a").unwrap();
/// let b = netlist.create_block("b").unwrap();
/// let n = netlist.create_net("a_out").unwrap();
/// netlist.create_pin(a, PinKind::Output, n).unwrap();
/// netlist.create_pin(b, PinKind::Input, n).unwrap();
///
/// assert_eq!(topological_block_order(&netlist), vec![a, b]);
/// ```
pub fn topological_block_order<N: NetlistView>(netlist: &N) -> Vec<N::BlockId> {
    let mut pending: IdMap<N::BlockId, usize> = IdMap::new();
    let mut queue: VecDeque<N::BlockId> = VecDeque::new();
    let mut total = 0usize;

    // Seed the queue with every block that has no inputs.
    for blk in netlist.blocks() {
        let inputs = netlist.block_input_pins(blk).count() + netlist.block_clock_pins(blk).count();
        pending.insert(blk, inputs);
        total += 1;
        if inputs == 0 {
            queue.push_back(blk);
        }
    }

    let mut order: Vec<N::BlockId> = Vec::with_capacity(total);

    while let Some(blk) = queue.pop_front() {
        assert_eq!(
            pending[blk], 0,
            "block {blk:?} dequeued with unsatisfied inputs"
        );
        order.push(blk);

        for driver in netlist.block_output_pins(blk) {
            let net = netlist.pin_net(driver);
            if !net.is_valid() {
                continue;
            }
            for sink in netlist.net_sinks(net) {
                let sink_blk = netlist.pin_block(sink);
                let count = &mut pending[sink_blk];
                assert!(*count > 0, "block {sink_blk:?} reached more often than it has inputs");
                *count -= 1;
                if *count == 0 {
                    queue.push_back(sink_blk);
                }
            }
        }
    }

    if order.len() != total {
        tracing::debug!(
            ordered = order.len(),
            total,
            "blocks left out of topological order (cycle or cycle-fed)"
        );
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BlockId;
    use crate::netlist::{Netlist, PinKind};
    use crate::test_utils::*;

    fn position(order: &[BlockId], blk: BlockId) -> usize {
        order.iter().position(|&b| b == blk).unwrap()
    }

    // -----------------------------------------------------------------------
    // Test 1: Linear chain A->B->C
    // -----------------------------------------------------------------------
    #[test]
    fn linear_chain() {
        let mut netlist = Netlist::new("t");
        let [a, b, c] = add_blocks(&mut netlist, ["a", "b", "c"]);
        connect(&mut netlist, a, &[b]);
        connect(&mut netlist, b, &[c]);

        assert_eq!(topological_block_order(&netlist), vec![a, b, c]);
    }

    // -----------------------------------------------------------------------
    // Test 2: Diamond A->B, A->C, B->D, C->D
    // -----------------------------------------------------------------------
    #[test]
    fn diamond() {
        let mut netlist = Netlist::new("t");
        let [a, b, c, d] = add_blocks(&mut netlist, ["a", "b", "c", "d"]);
        connect(&mut netlist, a, &[b, c]);
        connect(&mut netlist, b, &[d]);
        connect(&mut netlist, c, &[d]);

        let order = topological_block_order(&netlist);
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], a);
        assert_eq!(order[3], d);
        // FIFO tie-break: B was reached before C on A's fanout net.
        assert_eq!(order[1], b);
        assert_eq!(order[2], c);
    }

    // -----------------------------------------------------------------------
    // Test 3: Cycle is silently omitted
    // -----------------------------------------------------------------------
    #[test]
    fn cycle_is_omitted() {
        let mut netlist = Netlist::new("t");
        let [a, b, c] = add_blocks(&mut netlist, ["a", "b", "c"]);
        connect(&mut netlist, a, &[b]);
        connect(&mut netlist, b, &[c]);
        connect(&mut netlist, c, &[b]);

        let order = topological_block_order(&netlist);
        assert_eq!(order, vec![a]);
        assert!(order.len() < netlist.block_count());
    }

    #[test]
    fn self_loop_is_omitted() {
        let mut netlist = Netlist::new("t");
        let [a] = add_blocks(&mut netlist, ["a"]);
        connect(&mut netlist, a, &[a]);
        assert!(topological_block_order(&netlist).is_empty());
    }

    // -----------------------------------------------------------------------
    // Test 4: Clock pins count as inputs
    // -----------------------------------------------------------------------
    #[test]
    fn clock_pins_gate_readiness() {
        let mut netlist = Netlist::new("t");
        let [clk, d, ff] = add_blocks(&mut netlist, ["clk", "d", "ff"]);
        connect(&mut netlist, d, &[ff]);
        let clk_net = netlist.create_net("clk_net").unwrap();
        netlist.create_pin(clk, PinKind::Output, clk_net).unwrap();
        netlist.create_pin(ff, PinKind::Clock, clk_net).unwrap();

        let order = topological_block_order(&netlist);
        assert_eq!(order, vec![clk, d, ff]);
    }

    // -----------------------------------------------------------------------
    // Test 5: Disconnected components all appear
    // -----------------------------------------------------------------------
    #[test]
    fn disconnected_components() {
        let mut netlist = Netlist::new("t");
        let [a, b, c, d] = add_blocks(&mut netlist, ["a", "b", "c", "d"]);
        connect(&mut netlist, a, &[b]);
        connect(&mut netlist, c, &[d]);

        let order = topological_block_order(&netlist);
        // Roots are seeded in block order, then their fanout.
        assert_eq!(order, vec![a, c, b, d]);
    }

    #[test]
    fn empty_netlist() {
        let netlist = Netlist::new("empty");
        assert!(topological_block_order(&netlist).is_empty());
    }

    #[test]
    fn unconnected_output_pin_is_skipped() {
        let mut netlist = Netlist::new("t");
        let [a] = add_blocks(&mut netlist, ["a"]);
        netlist
            .create_pin(a, PinKind::Output, crate::id::NetId::INVALID)
            .unwrap();
        assert_eq!(topological_block_order(&netlist), vec![a]);
    }

    #[test]
    fn multi_pin_sink_waits_for_every_driver() {
        let mut netlist = Netlist::new("t");
        let [a, b, c] = add_blocks(&mut netlist, ["a", "b", "c"]);
        connect(&mut netlist, a, &[b, c]);
        connect(&mut netlist, b, &[c]);

        let order = topological_block_order(&netlist);
        assert!(position(&order, b) < position(&order, c));
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn removed_blocks_are_not_ordered() {
        let mut netlist = Netlist::new("t");
        let [a, b, c] = add_blocks(&mut netlist, ["a", "b", "c"]);
        connect(&mut netlist, a, &[b]);
        connect(&mut netlist, b, &[c]);
        netlist.remove_block(a).unwrap();

        // b lost its driver pin but keeps the dangling input, so it never
        // becomes ready; only removal of the input pin would release it.
        let order = topological_block_order(&netlist);
        assert!(!order.contains(&a));
        assert!(order.is_empty());
    }
}

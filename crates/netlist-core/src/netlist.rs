use crate::compact::{
    are_contiguous, clean_and_reorder_ids, clean_and_reorder_values, compress_ids,
    count_valid_refs, update_all_refs, update_valid_refs,
};
use crate::id::{BlockId, NetId, PinId, StrongId, Validity};
use crate::id_map::IdMap;
use crate::topo::NetlistView;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while building or checking a netlist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    #[error("block not found: {0:?}")]
    BlockNotFound(BlockId),
    #[error("pin not found: {0:?}")]
    PinNotFound(PinId),
    #[error("net not found: {0:?}")]
    NetNotFound(NetId),
    #[error("duplicate block name '{0}'")]
    DuplicateBlockName(String),
    #[error("duplicate net name '{0}'")]
    DuplicateNetName(String),
    #[error("net {net:?} is already driven by {driver:?}")]
    NetAlreadyDriven { net: NetId, driver: PinId },
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Role of a pin on its block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PinKind {
    #[default]
    Input,
    Output,
    Clock,
}

/// Position of the driver in a net's pin list. The slot always exists and
/// holds the invalid id while the net is undriven.
const DRIVER_SLOT: usize = 0;

/// Old-to-new id maps produced by [`Netlist::compress`].
///
/// Callers holding ids from before the compaction translate them here; an
/// entity that was removed translates to the invalid id.
#[derive(Debug, Clone, Default)]
pub struct IdRemapper {
    block_id_map: IdMap<BlockId, BlockId>,
    pin_id_map: IdMap<PinId, PinId>,
    net_id_map: IdMap<NetId, NetId>,
}

impl IdRemapper {
    pub fn new_block_id(&self, old: BlockId) -> BlockId {
        self.block_id_map.get(old).copied().unwrap_or(BlockId::INVALID)
    }

    pub fn new_pin_id(&self, old: PinId) -> PinId {
        self.pin_id_map.get(old).copied().unwrap_or(PinId::INVALID)
    }

    pub fn new_net_id(&self, old: NetId) -> NetId {
        self.net_id_map.get(old).copied().unwrap_or(NetId::INVALID)
    }

    pub fn block_id_map(&self) -> &IdMap<BlockId, BlockId> {
        &self.block_id_map
    }

    pub fn pin_id_map(&self) -> &IdMap<PinId, PinId> {
        &self.pin_id_map
    }

    pub fn net_id_map(&self) -> &IdMap<NetId, NetId> {
        &self.net_id_map
    }
}

/// Number of entities dropped by [`Netlist::remove_unused`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedCounts {
    pub blocks: usize,
    pub nets: usize,
}

// ---------------------------------------------------------------------------
// Netlist
// ---------------------------------------------------------------------------

/// A block/pin/net store with struct-of-arrays tables keyed by strong ids.
///
/// Removal only invalidates: the entity's slot in its `*_ids` table is set to
/// the invalid id and references to it are left in place (or set to the
/// invalid id where their position matters, like a net's driver slot).
/// Queries skip removed entities. [`Netlist::compress`] then renumbers every
/// id kind densely and rewrites all cross-references in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    pub(crate) name: String,

    pub(crate) block_ids: IdMap<BlockId, BlockId>,
    pub(crate) block_names: IdMap<BlockId, String>,
    pub(crate) block_input_pins: IdMap<BlockId, Vec<PinId>>,
    pub(crate) block_output_pins: IdMap<BlockId, Vec<PinId>>,
    pub(crate) block_clock_pins: IdMap<BlockId, Vec<PinId>>,

    pub(crate) pin_ids: IdMap<PinId, PinId>,
    pub(crate) pin_blocks: IdMap<PinId, BlockId>,
    pub(crate) pin_nets: IdMap<PinId, NetId>,
    pub(crate) pin_kinds: IdMap<PinId, PinKind>,

    pub(crate) net_ids: IdMap<NetId, NetId>,
    pub(crate) net_names: IdMap<NetId, String>,
    /// Driver at `DRIVER_SLOT`, sinks after it.
    pub(crate) net_pins: IdMap<NetId, Vec<PinId>>,

    /// Name lookups, rebuilt after compaction and deserialization.
    #[serde(skip)]
    pub(crate) block_lookup: HashMap<String, BlockId>,
    #[serde(skip)]
    pub(crate) net_lookup: HashMap<String, NetId>,
}

impl Netlist {
    /// Create an empty netlist.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Add a block with no pins.
    pub fn create_block(&mut self, name: impl Into<String>) -> Result<BlockId, NetlistError> {
        let name = name.into();
        if self.block_lookup.contains_key(&name) {
            return Err(NetlistError::DuplicateBlockName(name));
        }

        let blk = BlockId::new(self.block_ids.len());
        self.block_ids.push(blk);
        self.block_names.push(name.clone());
        self.block_input_pins.push(Vec::new());
        self.block_output_pins.push(Vec::new());
        self.block_clock_pins.push(Vec::new());
        self.block_lookup.insert(name, blk);
        Ok(blk)
    }

    /// Add an undriven net with no sinks.
    pub fn create_net(&mut self, name: impl Into<String>) -> Result<NetId, NetlistError> {
        let name = name.into();
        if self.net_lookup.contains_key(&name) {
            return Err(NetlistError::DuplicateNetName(name));
        }

        let net = NetId::new(self.net_ids.len());
        self.net_ids.push(net);
        self.net_names.push(name.clone());
        self.net_pins.push(vec![PinId::INVALID]);
        self.net_lookup.insert(name, net);
        Ok(net)
    }

    /// Add a pin to `blk` and attach it to `net`.
    ///
    /// An output pin becomes the net's driver; input and clock pins become
    /// sinks. Pass [`NetId::INVALID`] for an unconnected pin.
    pub fn create_pin(
        &mut self,
        blk: BlockId,
        kind: PinKind,
        net: NetId,
    ) -> Result<PinId, NetlistError> {
        if !self.block_exists(blk) {
            return Err(NetlistError::BlockNotFound(blk));
        }
        if net.is_valid() {
            if !self.net_exists(net) {
                return Err(NetlistError::NetNotFound(net));
            }
            let driver = self.net_driver(net);
            if kind == PinKind::Output && driver.is_valid() {
                return Err(NetlistError::NetAlreadyDriven { net, driver });
            }
        }

        let pin = PinId::new(self.pin_ids.len());
        self.pin_ids.push(pin);
        self.pin_blocks.push(blk);
        self.pin_nets.push(net);
        self.pin_kinds.push(kind);

        match kind {
            PinKind::Input => self.block_input_pins[blk].push(pin),
            PinKind::Output => self.block_output_pins[blk].push(pin),
            PinKind::Clock => self.block_clock_pins[blk].push(pin),
        }

        if net.is_valid() {
            let pins = &mut self.net_pins[net];
            if kind == PinKind::Output {
                pins[DRIVER_SLOT] = pin;
            } else {
                pins.push(pin);
            }
        }

        Ok(pin)
    }

    // -----------------------------------------------------------------------
    // Removal (invalidate only; `compress` reclaims the slots)
    // -----------------------------------------------------------------------

    /// Remove a block together with all of its pins.
    pub fn remove_block(&mut self, blk: BlockId) -> Result<(), NetlistError> {
        if !self.block_exists(blk) {
            return Err(NetlistError::BlockNotFound(blk));
        }

        let pins: Vec<PinId> = self.block_pins(blk).collect();
        for pin in pins {
            self.remove_pin_unchecked(pin);
        }

        self.block_ids[blk] = BlockId::INVALID;
        self.block_lookup.remove(&self.block_names[blk]);
        Ok(())
    }

    /// Remove a pin, detaching it from its net.
    ///
    /// Removing a net's driver leaves the net undriven.
    pub fn remove_pin(&mut self, pin: PinId) -> Result<(), NetlistError> {
        if !self.pin_exists(pin) {
            return Err(NetlistError::PinNotFound(pin));
        }
        self.remove_pin_unchecked(pin);
        Ok(())
    }

    /// Remove a net. Its pins stay on their blocks, unconnected.
    pub fn remove_net(&mut self, net: NetId) -> Result<(), NetlistError> {
        if !self.net_exists(net) {
            return Err(NetlistError::NetNotFound(net));
        }
        self.remove_net_unchecked(net);
        Ok(())
    }

    fn remove_pin_unchecked(&mut self, pin: PinId) {
        let net = self.pin_nets[pin];
        if let Some(pins) = self.net_pins.get_mut(net) {
            for slot in pins.iter_mut().filter(|slot| **slot == pin) {
                *slot = PinId::INVALID;
            }
        }
        self.pin_nets[pin] = NetId::INVALID;
        self.pin_ids[pin] = PinId::INVALID;
    }

    fn remove_net_unchecked(&mut self, net: NetId) {
        for &pin in &self.net_pins[net] {
            if pin.is_valid() {
                self.pin_nets[pin] = NetId::INVALID;
            }
        }
        self.net_ids[net] = NetId::INVALID;
        self.net_lookup.remove(&self.net_names[net]);
    }

    /// Remove nets with neither a driver nor a live sink, then blocks left
    /// without any live pin.
    pub fn remove_unused(&mut self) -> RemovedCounts {
        let mut removed = RemovedCounts::default();

        let dead_nets: Vec<NetId> = self
            .nets()
            .filter(|&net| {
                let sinks = self.net_pins[net].iter().skip(DRIVER_SLOT + 1).copied();
                !self.net_driver(net).is_valid() && count_valid_refs(sinks, &self.pin_ids) == 0
            })
            .collect();
        for net in dead_nets {
            tracing::trace!(net = %net, name = %self.net_names[net], "removing unused net");
            self.remove_net_unchecked(net);
            removed.nets += 1;
        }

        let dead_blocks: Vec<BlockId> = self
            .blocks()
            .filter(|&blk| {
                let pins = self.block_input_pins[blk]
                    .iter()
                    .chain(&self.block_output_pins[blk])
                    .chain(&self.block_clock_pins[blk])
                    .copied();
                count_valid_refs(pins, &self.pin_ids) == 0
            })
            .collect();
        for blk in dead_blocks {
            tracing::trace!(block = %blk, name = %self.block_names[blk], "removing unused block");
            self.block_ids[blk] = BlockId::INVALID;
            self.block_lookup.remove(&self.block_names[blk]);
            removed.blocks += 1;
        }

        removed
    }

    // -----------------------------------------------------------------------
    // Compaction
    // -----------------------------------------------------------------------

    /// Returns true if no id kind has holes left by removals.
    pub fn is_compressed(&self) -> bool {
        are_contiguous(&self.block_ids)
            && are_contiguous(&self.pin_ids)
            && are_contiguous(&self.net_ids)
    }

    /// Renumber blocks, pins and nets densely, dropping removed entities and
    /// rewriting every cross-reference. Returns the old-to-new maps.
    pub fn compress(&mut self) -> IdRemapper {
        let block_id_map = compress_ids(&self.block_ids);
        let pin_id_map = compress_ids(&self.pin_ids);
        let net_id_map = compress_ids(&self.net_ids);

        // Tables first (keyed by old ids), then the references they hold.
        self.clean_blocks(&block_id_map);
        self.clean_pins(&pin_id_map);
        self.clean_nets(&net_id_map);

        self.rebuild_block_refs(&pin_id_map);
        self.rebuild_pin_refs(&block_id_map, &net_id_map);
        self.rebuild_net_refs(&pin_id_map);

        self.rebuild_lookups();
        self.shrink_to_fit();

        tracing::debug!(
            blocks = self.block_ids.len(),
            pins = self.pin_ids.len(),
            nets = self.net_ids.len(),
            "netlist compressed"
        );

        IdRemapper {
            block_id_map,
            pin_id_map,
            net_id_map,
        }
    }

    fn clean_blocks(&mut self, id_map: &IdMap<BlockId, BlockId>) {
        self.block_ids = clean_and_reorder_ids(id_map);
        self.block_names = clean_and_reorder_values(std::mem::take(&mut self.block_names), id_map);
        self.block_input_pins =
            clean_and_reorder_values(std::mem::take(&mut self.block_input_pins), id_map);
        self.block_output_pins =
            clean_and_reorder_values(std::mem::take(&mut self.block_output_pins), id_map);
        self.block_clock_pins =
            clean_and_reorder_values(std::mem::take(&mut self.block_clock_pins), id_map);
    }

    fn clean_pins(&mut self, id_map: &IdMap<PinId, PinId>) {
        self.pin_ids = clean_and_reorder_ids(id_map);
        self.pin_blocks = clean_and_reorder_values(std::mem::take(&mut self.pin_blocks), id_map);
        self.pin_nets = clean_and_reorder_values(std::mem::take(&mut self.pin_nets), id_map);
        self.pin_kinds = clean_and_reorder_values(std::mem::take(&mut self.pin_kinds), id_map);
    }

    fn clean_nets(&mut self, id_map: &IdMap<NetId, NetId>) {
        self.net_ids = clean_and_reorder_ids(id_map);
        self.net_names = clean_and_reorder_values(std::mem::take(&mut self.net_names), id_map);
        self.net_pins = clean_and_reorder_values(std::mem::take(&mut self.net_pins), id_map);
    }

    fn rebuild_block_refs(&mut self, pin_id_map: &IdMap<PinId, PinId>) {
        let no_slots = BTreeSet::new();
        for pins in self
            .block_input_pins
            .values_mut()
            .chain(self.block_output_pins.values_mut())
            .chain(self.block_clock_pins.values_mut())
        {
            *pins = update_valid_refs(&*pins, pin_id_map, &no_slots);
        }
    }

    fn rebuild_pin_refs(
        &mut self,
        block_id_map: &IdMap<BlockId, BlockId>,
        net_id_map: &IdMap<NetId, NetId>,
    ) {
        // Unconnected pins hold the invalid net and keep it.
        self.pin_blocks = update_all_refs(&self.pin_blocks, block_id_map);
        self.pin_nets = update_all_refs(&self.pin_nets, net_id_map);
    }

    fn rebuild_net_refs(&mut self, pin_id_map: &IdMap<PinId, PinId>) {
        let driver_slot = BTreeSet::from([DRIVER_SLOT]);
        for pins in self.net_pins.values_mut() {
            *pins = update_valid_refs(&*pins, pin_id_map, &driver_slot);
        }
    }

    fn shrink_to_fit(&mut self) {
        self.block_ids.shrink_to_fit();
        self.block_names.shrink_to_fit();
        self.block_input_pins.shrink_to_fit();
        self.block_output_pins.shrink_to_fit();
        self.block_clock_pins.shrink_to_fit();
        self.pin_ids.shrink_to_fit();
        self.pin_blocks.shrink_to_fit();
        self.pin_nets.shrink_to_fit();
        self.pin_kinds.shrink_to_fit();
        self.net_ids.shrink_to_fit();
        self.net_names.shrink_to_fit();
        self.net_pins.shrink_to_fit();
    }

    /// Rebuild the name lookups from the id tables.
    pub(crate) fn rebuild_lookups(&mut self) {
        self.block_lookup = self
            .block_ids
            .values()
            .filter(|id| id.is_valid())
            .map(|&blk| (self.block_names[blk].clone(), blk))
            .collect();
        self.net_lookup = self
            .net_ids
            .values()
            .filter(|id| id.is_valid())
            .map(|&net| (self.net_names[net].clone(), net))
            .collect();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn block_exists(&self, blk: BlockId) -> bool {
        self.block_ids.get(blk).is_some_and(|id| id.is_valid())
    }

    pub fn pin_exists(&self, pin: PinId) -> bool {
        self.pin_ids.get(pin).is_some_and(|id| id.is_valid())
    }

    pub fn net_exists(&self, net: NetId) -> bool {
        self.net_ids.get(net).is_some_and(|id| id.is_valid())
    }

    /// Number of live blocks.
    pub fn block_count(&self) -> usize {
        self.block_ids.values().filter(|id| id.is_valid()).count()
    }

    /// Number of live pins.
    pub fn pin_count(&self) -> usize {
        self.pin_ids.values().filter(|id| id.is_valid()).count()
    }

    /// Number of live nets.
    pub fn net_count(&self) -> usize {
        self.net_ids.values().filter(|id| id.is_valid()).count()
    }

    pub fn block_name(&self, blk: BlockId) -> &str {
        &self.block_names[blk]
    }

    pub fn net_name(&self, net: NetId) -> &str {
        &self.net_names[net]
    }

    pub fn pin_kind(&self, pin: PinId) -> PinKind {
        self.pin_kinds[pin]
    }

    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.block_lookup.get(name).copied()
    }

    pub fn find_net(&self, name: &str) -> Option<NetId> {
        self.net_lookup.get(name).copied()
    }

    /// Every live pin.
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pin_ids.values().copied().filter(|id| id.is_valid())
    }

    /// Every live net.
    pub fn nets(&self) -> impl Iterator<Item = NetId> + '_ {
        self.net_ids.values().copied().filter(|id| id.is_valid())
    }

    /// Live pins of a block: inputs, then outputs, then clocks.
    pub fn block_pins(&self, blk: BlockId) -> impl Iterator<Item = PinId> + '_ {
        self.live_pins(&self.block_input_pins[blk])
            .chain(self.live_pins(&self.block_output_pins[blk]))
            .chain(self.live_pins(&self.block_clock_pins[blk]))
    }

    /// Driver of a net, or the invalid id if it is undriven.
    pub fn net_driver(&self, net: NetId) -> PinId {
        let driver = self.net_pins[net][DRIVER_SLOT];
        if self.pin_exists(driver) {
            driver
        } else {
            PinId::INVALID
        }
    }

    /// Live pins of a net, driver first.
    pub fn net_pins(&self, net: NetId) -> impl Iterator<Item = PinId> + '_ {
        self.live_pins(&self.net_pins[net])
    }

    fn live_pins<'a>(&'a self, pins: &'a [PinId]) -> impl Iterator<Item = PinId> + 'a {
        pins.iter().copied().filter(|&pin| self.pin_exists(pin))
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    /// Check that every cross-reference between live entities agrees in
    /// both directions and that each live pin is listed exactly once on its
    /// block and its net.
    ///
    /// Never panics on arbitrary table contents; decoded snapshots go
    /// through it before use.
    pub fn verify(&self) -> Result<(), NetlistError> {
        self.verify_sizes()?;

        for blk in self.blocks() {
            let lists = [
                (PinKind::Input, &self.block_input_pins[blk]),
                (PinKind::Output, &self.block_output_pins[blk]),
                (PinKind::Clock, &self.block_clock_pins[blk]),
            ];
            for (kind, pins) in lists {
                for pin in self.live_pins(pins) {
                    if self.pin_blocks[pin] != blk {
                        return Err(violation(format!(
                            "{pin:?} listed on {blk:?} but owned by {:?}",
                            self.pin_blocks[pin]
                        )));
                    }
                    if self.pin_kinds[pin] != kind {
                        return Err(violation(format!(
                            "{pin:?} listed as {kind:?} but is {:?}",
                            self.pin_kinds[pin]
                        )));
                    }
                }
            }
        }

        for pin in self.pins() {
            let blk = self.pin_blocks[pin];
            if !self.block_exists(blk) {
                return Err(violation(format!("{pin:?} owned by missing {blk:?}")));
            }
            let listed = match self.pin_kinds[pin] {
                PinKind::Input => &self.block_input_pins[blk],
                PinKind::Output => &self.block_output_pins[blk],
                PinKind::Clock => &self.block_clock_pins[blk],
            };
            if occurrences(listed, pin) != 1 {
                return Err(violation(format!("{pin:?} not listed once on {blk:?}")));
            }
            let net = self.pin_nets[pin];
            if !net.is_valid() {
                continue;
            }
            if !self.net_exists(net) {
                return Err(violation(format!("{pin:?} attached to missing {net:?}")));
            }
            let attached = match self.pin_kinds[pin] {
                PinKind::Output => self.net_pins[net][DRIVER_SLOT] == pin,
                PinKind::Input | PinKind::Clock => {
                    occurrences(&self.net_pins[net][DRIVER_SLOT + 1..], pin) == 1
                }
            };
            if !attached {
                return Err(violation(format!("{pin:?} not attached once to {net:?}")));
            }
        }

        for net in self.nets() {
            for (slot, &pin) in self.net_pins[net].iter().enumerate() {
                if !self.pin_exists(pin) {
                    continue;
                }
                if self.pin_nets[pin] != net {
                    return Err(violation(format!(
                        "{net:?} lists {pin:?} which is attached to {:?}",
                        self.pin_nets[pin]
                    )));
                }
                if (slot == DRIVER_SLOT) != (self.pin_kinds[pin] == PinKind::Output) {
                    return Err(violation(format!(
                        "{net:?} holds {:?} {pin:?} in slot {slot}",
                        self.pin_kinds[pin]
                    )));
                }
            }
        }

        Ok(())
    }

    fn verify_sizes(&self) -> Result<(), NetlistError> {
        let blocks = self.block_ids.len();
        let pins = self.pin_ids.len();
        let nets = self.net_ids.len();
        let consistent = [
            self.block_names.len(),
            self.block_input_pins.len(),
            self.block_output_pins.len(),
            self.block_clock_pins.len(),
        ]
        .iter()
        .all(|&len| len == blocks)
            && [self.pin_blocks.len(), self.pin_nets.len(), self.pin_kinds.len()]
                .iter()
                .all(|&len| len == pins)
            && [self.net_names.len(), self.net_pins.len()]
                .iter()
                .all(|&len| len == nets)
            && self.net_pins.values().all(|pins| !pins.is_empty());
        if !consistent {
            return Err(violation("table sizes disagree".to_string()));
        }

        // A live id always sits at its own position.
        match misplaced_id(&self.block_ids)
            .or_else(|| misplaced_id(&self.pin_ids))
            .or_else(|| misplaced_id(&self.net_ids))
        {
            Some(detail) => Err(violation(detail)),
            None => Ok(()),
        }
    }
}

fn violation(detail: String) -> NetlistError {
    NetlistError::IntegrityViolation(detail)
}

fn misplaced_id<K: StrongId>(ids: &IdMap<K, K>) -> Option<String> {
    ids.iter()
        .find(|&(pos, &id)| id.is_valid() && id != pos)
        .map(|(pos, id)| format!("{id:?} stored at {pos:?}"))
}

fn occurrences(pins: &[PinId], pin: PinId) -> usize {
    pins.iter().filter(|&&p| p == pin).count()
}

impl NetlistView for Netlist {
    type BlockId = BlockId;
    type PinId = PinId;
    type NetId = NetId;

    fn blocks(&self) -> impl Iterator<Item = Self::BlockId> {
        self.block_ids.values().copied().filter(|id| id.is_valid())
    }

    fn block_input_pins(&self, blk: Self::BlockId) -> impl Iterator<Item = Self::PinId> {
        self.live_pins(&self.block_input_pins[blk])
    }

    fn block_clock_pins(&self, blk: Self::BlockId) -> impl Iterator<Item = Self::PinId> {
        self.live_pins(&self.block_clock_pins[blk])
    }

    fn block_output_pins(&self, blk: Self::BlockId) -> impl Iterator<Item = Self::PinId> {
        self.live_pins(&self.block_output_pins[blk])
    }

    fn pin_net(&self, pin: Self::PinId) -> Self::NetId {
        self.pin_nets[pin]
    }

    fn net_sinks(&self, net: Self::NetId) -> impl Iterator<Item = Self::PinId> {
        self.live_pins(&self.net_pins[net][DRIVER_SLOT + 1..])
    }

    fn pin_block(&self, pin: Self::PinId) -> Self::BlockId {
        self.pin_blocks[pin]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn two_stage() -> (Netlist, [BlockId; 3], NetId, NetId) {
        let mut netlist = Netlist::new("two_stage");
        let [a, b, c] = add_blocks(&mut netlist, ["a", "b", "c"]);
        let ab = connect(&mut netlist, a, &[b]);
        let bc = connect(&mut netlist, b, &[c]);
        (netlist, [a, b, c], ab, bc)
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    #[test]
    fn create_entities() {
        let (netlist, [a, b, c], ab, bc) = two_stage();
        assert_eq!(netlist.block_count(), 3);
        assert_eq!(netlist.net_count(), 2);
        assert_eq!(netlist.pin_count(), 4);
        assert_eq!(netlist.find_block("b"), Some(b));
        assert_eq!(netlist.block_name(c), "c");
        assert_eq!(netlist.pin_kind(netlist.net_driver(ab)), PinKind::Output);
        assert_eq!(netlist.pin_block(netlist.net_driver(bc)), b);
        assert_eq!(netlist.net_sinks(ab).map(|p| netlist.pin_block(p)).collect::<Vec<_>>(), vec![b]);
        assert_eq!(netlist.block_pins(a).count(), 1);
        netlist.verify().unwrap();
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut netlist = Netlist::new("t");
        netlist.create_block("x").unwrap();
        assert_eq!(
            netlist.create_block("x"),
            Err(NetlistError::DuplicateBlockName("x".into()))
        );
        netlist.create_net("n").unwrap();
        assert_eq!(
            netlist.create_net("n"),
            Err(NetlistError::DuplicateNetName("n".into()))
        );
    }

    #[test]
    fn second_driver_rejected() {
        let (mut netlist, [_, _, c], ab, _) = two_stage();
        let driver = netlist.net_driver(ab);
        assert_eq!(
            netlist.create_pin(c, PinKind::Output, ab),
            Err(NetlistError::NetAlreadyDriven { net: ab, driver })
        );
    }

    #[test]
    fn pin_on_missing_entities_rejected() {
        let (mut netlist, [a, ..], _, _) = two_stage();
        assert_eq!(
            netlist.create_pin(BlockId::new(9), PinKind::Input, NetId::INVALID),
            Err(NetlistError::BlockNotFound(BlockId::new(9)))
        );
        assert_eq!(
            netlist.create_pin(a, PinKind::Input, NetId::new(9)),
            Err(NetlistError::NetNotFound(NetId::new(9)))
        );
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    #[test]
    fn remove_driver_block_leaves_net_undriven() {
        let (mut netlist, [a, b, _], ab, _) = two_stage();
        netlist.remove_block(a).unwrap();

        assert!(!netlist.block_exists(a));
        assert!(netlist.find_block("a").is_none());
        assert!(!netlist.net_driver(ab).is_valid());
        assert_eq!(netlist.net_sinks(ab).count(), 1);
        assert_eq!(netlist.block_pins(b).count(), 2);
        netlist.verify().unwrap();
    }

    #[test]
    fn remove_twice_errors() {
        let (mut netlist, [a, ..], ab, _) = two_stage();
        netlist.remove_block(a).unwrap();
        assert_eq!(netlist.remove_block(a), Err(NetlistError::BlockNotFound(a)));
        netlist.remove_net(ab).unwrap();
        assert_eq!(netlist.remove_net(ab), Err(NetlistError::NetNotFound(ab)));
    }

    #[test]
    fn remove_net_disconnects_pins() {
        let (mut netlist, [_, b, _], _, bc) = two_stage();
        let driver = netlist.net_driver(bc);
        netlist.remove_net(bc).unwrap();
        assert!(!netlist.pin_net(driver).is_valid());
        assert!(netlist.pin_exists(driver));
        assert_eq!(netlist.block_pins(b).count(), 2);
        netlist.verify().unwrap();
    }

    #[test]
    fn remove_unused_sweeps_dead_nets_then_empty_blocks() {
        let mut netlist = Netlist::new("t");
        let [a, b] = add_blocks(&mut netlist, ["a", "b"]);
        let ab = connect(&mut netlist, a, &[b]);
        let floating = netlist.create_net("floating").unwrap();
        let lonely = netlist.create_block("lonely").unwrap();

        // ab loses its driver but keeps a live sink, so it stays.
        netlist.remove_block(a).unwrap();
        let removed = netlist.remove_unused();
        assert_eq!(removed, RemovedCounts { blocks: 1, nets: 1 });
        assert!(!netlist.net_exists(floating));
        assert!(!netlist.block_exists(lonely));
        assert!(netlist.net_exists(ab));
        assert!(netlist.block_exists(b));
    }

    // -----------------------------------------------------------------------
    // Compaction
    // -----------------------------------------------------------------------

    #[test]
    fn fresh_netlist_is_compressed() {
        let (netlist, ..) = two_stage();
        assert!(netlist.is_compressed());
    }

    #[test]
    fn compress_after_removing_middle_block() {
        let (mut netlist, [a, b, c], ab, bc) = two_stage();
        netlist.remove_block(b).unwrap();
        assert!(!netlist.is_compressed());

        let remap = netlist.compress();
        assert!(netlist.is_compressed());
        netlist.verify().unwrap();

        assert_eq!(remap.new_block_id(a), BlockId::new(0));
        assert_eq!(remap.new_block_id(b), BlockId::INVALID);
        assert_eq!(remap.new_block_id(c), BlockId::new(1));
        assert_eq!(remap.new_net_id(ab), NetId::new(0));
        assert_eq!(remap.new_net_id(bc), NetId::new(1));

        assert_eq!(netlist.block_count(), 2);
        assert_eq!(netlist.pin_count(), 2);
        assert_eq!(netlist.find_block("c"), Some(BlockId::new(1)));

        // ab lost its only sink, bc lost its driver but keeps the slot.
        let ab = remap.new_net_id(ab);
        let bc = remap.new_net_id(bc);
        assert_eq!(netlist.net_sinks(ab).count(), 0);
        assert!(!netlist.net_driver(bc).is_valid());
        let bc_sinks: Vec<PinId> = netlist.net_sinks(bc).collect();
        assert_eq!(bc_sinks.len(), 1);
        assert_eq!(netlist.pin_block(bc_sinks[0]), BlockId::new(1));
    }

    #[test]
    fn compress_rewrites_unconnected_pins() {
        let (mut netlist, [a, ..], ab, _) = two_stage();
        let spare = netlist.create_pin(a, PinKind::Input, NetId::INVALID).unwrap();
        netlist.remove_net(ab).unwrap();

        let remap = netlist.compress();
        let spare = remap.new_pin_id(spare);
        assert!(spare.is_valid());
        assert!(!netlist.pin_net(spare).is_valid());
        assert_eq!(netlist.net_count(), 1);
        netlist.verify().unwrap();
    }

    #[test]
    fn compress_keeps_pin_order_on_blocks() {
        let mut netlist = Netlist::new("t");
        let [src0, src1, src2, sink] = add_blocks(&mut netlist, ["s0", "s1", "s2", "sink"]);
        connect(&mut netlist, src0, &[sink]);
        let dropped = connect(&mut netlist, src1, &[sink]);
        connect(&mut netlist, src2, &[sink]);
        let stale: Vec<PinId> = netlist.net_sinks(dropped).collect();
        netlist.remove_pin(stale[0]).unwrap();
        netlist.remove_block(src1).unwrap();

        let remap = netlist.compress();
        let sink = remap.new_block_id(sink);
        let drivers: Vec<String> = netlist
            .block_input_pins(sink)
            .map(|pin| netlist.net_driver(netlist.pin_net(pin)))
            .map(|pin| netlist.block_name(netlist.pin_block(pin)).to_string())
            .collect();
        assert_eq!(drivers, vec!["s0", "s2"]);
    }

    #[test]
    fn compress_when_nothing_removed_is_identity() {
        let (mut netlist, ..) = two_stage();
        let before = netlist.clone();
        let remap = netlist.compress();
        assert!(are_contiguous(remap.block_id_map()));
        assert!(are_contiguous(remap.pin_id_map()));
        assert!(are_contiguous(remap.net_id_map()));
        assert_eq!(netlist, before);
    }

    #[test]
    fn error_display_messages() {
        let msg = format!("{}", NetlistError::BlockNotFound(BlockId::new(2)));
        assert!(msg.contains("block not found"), "got: {msg}");
        let msg = format!(
            "{}",
            NetlistError::NetAlreadyDriven {
                net: NetId::new(1),
                driver: PinId::new(4)
            }
        );
        assert!(msg.contains("already driven"), "got: {msg}");
    }
}

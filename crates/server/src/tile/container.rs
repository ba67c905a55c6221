//! Tiles that hold items.

use fastnbt::Value;
use tilecraft_engine::world::block::BlockId;
use tilecraft_engine::world::position::BlockPos;

use super::{Tile, TileBase, TileKind, TileType, read_custom_name, write_custom_name};
use crate::block::{FURNACE, LIT_FURNACE};
use crate::document::{CompoundTag, DocumentError};

const TAG_ITEMS: &str = "Items";

fn read_items(nbt: &CompoundTag) -> Result<Vec<Value>, DocumentError> {
    Ok(nbt
        .get::<&[Value]>(TAG_ITEMS)?
        .map(<[Value]>::to_vec)
        .unwrap_or_default())
}

// -- Chest --

/// A chest. Item stacks are kept as their saved compounds.
#[derive(Debug)]
pub struct Chest {
    base: TileBase,
    items: Vec<Value>,
    /// x and z of the other half of a double chest.
    pair: Option<(i32, i32)>,
    custom_name: Option<String>,
}

impl Chest {
    pub const TAG_PAIRX: &'static str = "pairx";
    pub const TAG_PAIRZ: &'static str = "pairz";

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<Value> {
        &mut self.items
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref()
    }

    pub fn set_custom_name(&mut self, name: Option<String>) {
        self.custom_name = name;
    }

    pub fn is_paired(&self) -> bool {
        self.pair.is_some()
    }

    pub fn pair_position(&self) -> Option<BlockPos> {
        self.pair
            .map(|(x, z)| BlockPos::new(i64::from(x), self.position().y, i64::from(z)))
    }

    /// Pair with the chest at `other`. Fails unless `other` is horizontally
    /// adjacent.
    pub fn pair_with(&mut self, other: BlockPos) -> bool {
        if !self.position().is_horizontally_adjacent(&other) {
            return false;
        }
        match (i32::try_from(other.x), i32::try_from(other.z)) {
            (Ok(x), Ok(z)) => {
                self.pair = Some((x, z));
                true
            }
            _ => false,
        }
    }

    pub fn unpair(&mut self) {
        self.pair = None;
    }
}

impl Tile for Chest {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.items = read_items(nbt)?;
        self.custom_name = read_custom_name(nbt)?;

        self.pair = None;
        let pairx = nbt.get::<i32>(Self::TAG_PAIRX)?;
        let pairz = nbt.get::<i32>(Self::TAG_PAIRZ)?;
        if let (Some(x), Some(z)) = (pairx, pairz) {
            // A pair that is not next to us is stale; drop it.
            let other = BlockPos::new(i64::from(x), self.position().y, i64::from(z));
            if !self.pair_with(other) {
                tracing::debug!(
                    "Ignoring non-adjacent chest pair ({}, {}) at {:?}",
                    x,
                    z,
                    self.position()
                );
            }
        }
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(TAG_ITEMS, self.items.clone());
        if let Some((x, z)) = self.pair {
            nbt.put(Self::TAG_PAIRX, x).put(Self::TAG_PAIRZ, z);
        }
        write_custom_name(nbt, self.custom_name.as_deref());
    }
}

impl TileType for Chest {
    const KIND: TileKind = TileKind::new("Chest");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            items: Vec::new(),
            pair: None,
            custom_name: None,
        }
    }
}

// -- Ender chest --

/// Ender chest. Its inventory belongs to the player, so nothing is saved here.
#[derive(Debug)]
pub struct EnderChest {
    base: TileBase,
}

impl Tile for EnderChest {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, _nbt: &CompoundTag) -> Result<(), DocumentError> {
        Ok(())
    }

    fn write_save_data(&self, _nbt: &mut CompoundTag) {}
}

impl TileType for EnderChest {
    const KIND: TileKind = TileKind::new("EnderChest");

    fn new(base: TileBase) -> Self {
        Self { base }
    }
}

// -- Furnace --

#[derive(Debug)]
pub struct Furnace {
    base: TileBase,
    items: Vec<Value>,
    /// Ticks of fuel left.
    burn_time: i16,
    /// Ticks the current item has been smelting.
    cook_time: i16,
    /// Burn time of the fuel item last consumed.
    max_time: i16,
    custom_name: Option<String>,
}

impl Furnace {
    pub const TAG_BURN_TIME: &'static str = "BurnTime";
    pub const TAG_COOK_TIME: &'static str = "CookTime";
    pub const TAG_MAX_TIME: &'static str = "MaxTime";

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn burn_time(&self) -> i16 {
        self.burn_time
    }

    pub fn cook_time(&self) -> i16 {
        self.cook_time
    }

    pub fn max_time(&self) -> i16 {
        self.max_time
    }

    /// Start burning a fuel item worth `ticks`.
    pub fn ignite(&mut self, ticks: i16) {
        self.burn_time = ticks.max(0);
        self.max_time = self.burn_time;
    }

    pub fn is_burning(&self) -> bool {
        self.burn_time > 0
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.custom_name.as_deref()
    }

    /// Swap the block under this tile between the lit and unlit furnace ids,
    /// keeping its facing meta. Returns the block now in the world, or `None`
    /// if the block there is not a furnace.
    pub fn sync_block(&self) -> Option<BlockId> {
        let type_id = if self.is_burning() { LIT_FURNACE } else { FURNACE };
        let mut is_furnace = false;
        let block = self.world().update_block(self.position(), |current| {
            if !matches!(current.type_id(), FURNACE | LIT_FURNACE) {
                return current;
            }
            is_furnace = true;
            BlockId::from_legacy(type_id, current.meta())
        });
        is_furnace.then_some(block)
    }
}

impl Tile for Furnace {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.items = read_items(nbt)?;
        self.burn_time = nbt.get_or::<i16>(Self::TAG_BURN_TIME, 0)?.max(0);
        self.cook_time = nbt.get_or::<i16>(Self::TAG_COOK_TIME, 0)?.max(0);
        self.max_time = nbt.get_or::<i16>(Self::TAG_MAX_TIME, 0)?.max(0);
        self.custom_name = read_custom_name(nbt)?;
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(TAG_ITEMS, self.items.clone())
            .put(Self::TAG_BURN_TIME, self.burn_time)
            .put(Self::TAG_COOK_TIME, self.cook_time)
            .put(Self::TAG_MAX_TIME, self.max_time);
        write_custom_name(nbt, self.custom_name.as_deref());
    }
}

impl TileType for Furnace {
    const KIND: TileKind = TileKind::new("Furnace");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            items: Vec::new(),
            burn_time: 0,
            cook_time: 0,
            max_time: 0,
            custom_name: None,
        }
    }
}

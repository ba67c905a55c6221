//! Tiles (block entities): blocks that carry typed, persisted state beyond
//! their legacy id.
//!
//! Every tile implements [`Tile`], the object-safe capability the registry,
//! world and persistence code work with. Concrete types additionally
//! implement [`TileType`], which names their [`TileKind`] and the base kinds
//! they can stand in for. An override registered for a base kind must list
//! that base in its [`TileType::ANCESTRY`].

pub mod container;
pub mod decoration;
pub mod factory;
pub mod mechanism;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tilecraft_engine::world::World;
use tilecraft_engine::world::block::BlockId;
use tilecraft_engine::world::position::BlockPos;

use crate::document::{CompoundTag, DocumentError};

pub use container::{Chest, EnderChest, Furnace};
pub use decoration::{Bed, FlowerPot, ItemFrame, Sign, Skull};
pub use factory::{RegistryError, TileConstructor, TileFactory};
pub use mechanism::{MonsterSpawner, Note};

/// Document field holding the save name.
pub const TAG_ID: &str = "id";
pub const TAG_X: &str = "x";
pub const TAG_Y: &str = "y";
pub const TAG_Z: &str = "z";

/// Identity of a tile type, used as the registry key.
///
/// Kinds compare by name. Names may be namespaced (`"plugin:TrappedChest"`);
/// [`TileKind::short_name`] drops the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKind(&'static str);

impl TileKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }

    /// The name after the last `:` or `\`, used as the fallback save name.
    pub fn short_name(&self) -> &'static str {
        self.0.rsplit(|c: char| c == ':' || c == '\\').next().unwrap_or(self.0)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Blanket `Any` access so `dyn Tile` can be downcast.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// State every tile shares: where it is and what it is.
#[derive(Clone)]
pub struct TileBase {
    world: Arc<World>,
    position: BlockPos,
    kind: TileKind,
    ancestry: &'static [TileKind],
    closed: bool,
}

impl TileBase {
    /// Base state for a `T` at `position`.
    pub fn of<T: TileType>(world: Arc<World>, position: BlockPos) -> Self {
        Self {
            world,
            position,
            kind: T::KIND,
            ancestry: T::ANCESTRY,
            closed: false,
        }
    }
}

impl fmt::Debug for TileBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileBase")
            .field("position", &self.position)
            .field("kind", &self.kind)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// A block entity.
pub trait Tile: AsAny + fmt::Debug + Send + Sync {
    fn base(&self) -> &TileBase;

    fn base_mut(&mut self) -> &mut TileBase;

    /// Populate type-specific fields from a saved document. Absent optional
    /// fields take their defaults; only malformed data is an error.
    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError>;

    /// Write type-specific fields. Identity and position are written by the
    /// caller.
    fn write_save_data(&self, nbt: &mut CompoundTag);

    fn kind(&self) -> TileKind {
        self.base().kind
    }

    /// Base kinds this tile can stand in for, nearest first.
    fn ancestry(&self) -> &'static [TileKind] {
        self.base().ancestry
    }

    /// True if this tile is a `kind` or substitutes for one.
    fn is_a(&self, kind: TileKind) -> bool {
        self.kind() == kind || self.ancestry().contains(&kind)
    }

    fn position(&self) -> BlockPos {
        self.base().position
    }

    fn world(&self) -> &Arc<World> {
        &self.base().world
    }

    /// The block this tile sits in.
    fn block(&self) -> BlockId {
        self.world().get_block(self.position())
    }

    fn close(&mut self) {
        self.base_mut().closed = true;
    }

    fn is_closed(&self) -> bool {
        self.base().closed
    }
}

impl dyn Tile {
    pub fn is<T: Tile>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }

    pub fn downcast_ref<T: Tile>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Tile>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut::<T>()
    }
}

/// A concrete, constructible tile type.
pub trait TileType: Tile + Sized {
    const KIND: TileKind;

    /// Base kinds this type substitutes for. Empty for stock types.
    const ANCESTRY: &'static [TileKind] = &[];

    /// A fresh tile with default state.
    fn new(base: TileBase) -> Self;
}

/// Optional `CustomName` carried by nameable tiles.
pub(crate) fn read_custom_name(nbt: &CompoundTag) -> Result<Option<String>, DocumentError> {
    Ok(nbt
        .get::<&str>("CustomName")?
        .filter(|name| !name.is_empty())
        .map(str::to_owned))
}

pub(crate) fn write_custom_name(nbt: &mut CompoundTag, name: Option<&str>) {
    if let Some(name) = name {
        nbt.put("CustomName", name);
    }
}

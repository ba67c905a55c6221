//! Registry of tile types.
//!
//! Two tables resolve tiles:
//!
//! - the **override table** maps a base kind to the constructor currently in
//!   effect for it, and is what [`TileFactory::create`] uses;
//! - the **alias table** maps every save name to the constructor that was
//!   registered with it, and is what loading a saved document uses.
//!
//! [`TileFactory::override_tile`] only touches the first. A plugin that swaps
//! in its own `Chest` gets its type for newly placed chests, while chests in
//! existing saves keep loading as the stock type until the plugin also
//! registers the aliases. Alias collisions are last-registered-wins.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tilecraft_engine::world::World;
use tilecraft_engine::world::position::BlockPos;

use super::{
    Bed, Chest, EnderChest, FlowerPot, Furnace, ItemFrame, MonsterSpawner, Note, Sign, Skull,
    TAG_ID, TAG_X, TAG_Y, TAG_Z, Tile, TileBase, TileKind, TileType,
};
use crate::document::{CompoundTag, DocumentError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tile `{0}` is not registered")]
    NotRegistered(TileKind),
    #[error("`{implementation}` cannot stand in for tile `{base}`")]
    NotSubstitutable {
        base: TileKind,
        implementation: TileKind,
    },
    #[error("tile registry is sealed")]
    Sealed,
}

/// Builds a tile bound to a world position.
#[derive(Debug, Clone, Copy)]
pub struct TileConstructor {
    kind: TileKind,
    ancestry: &'static [TileKind],
    build: fn(Arc<World>, BlockPos) -> Box<dyn Tile>,
}

fn construct<T: TileType>(world: Arc<World>, pos: BlockPos) -> Box<dyn Tile> {
    Box::new(T::new(TileBase::of::<T>(world, pos)))
}

impl TileConstructor {
    pub fn of<T: TileType>() -> Self {
        Self {
            kind: T::KIND,
            ancestry: T::ANCESTRY,
            build: construct::<T>,
        }
    }

    /// The kind of tile this constructor produces.
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// True if tiles built here can be used wherever a `base` is expected.
    pub fn conforms_to(&self, base: TileKind) -> bool {
        self.kind == base || self.ancestry.contains(&base)
    }

    pub fn build(&self, world: Arc<World>, pos: BlockPos) -> Box<dyn Tile> {
        (self.build)(world, pos)
    }
}

/// Maps tile kinds and save names to constructors.
///
/// Build one at startup, register plugin types, optionally [`seal`] it, then
/// hand it by reference to whatever creates or loads tiles.
///
/// [`seal`]: TileFactory::seal
#[derive(Debug, Clone)]
pub struct TileFactory {
    /// Save name -> constructor registered under it.
    known: HashMap<String, TileConstructor>,
    /// Base kind -> save names, primary first.
    save_names: HashMap<TileKind, Vec<String>>,
    /// Base kind -> effective constructor.
    mapping: HashMap<TileKind, TileConstructor>,
    sealed: bool,
}

impl TileFactory {
    /// A factory with every stock tile registered.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.insert_builtin::<Bed>(&["Bed", "minecraft:bed"]);
        factory.insert_builtin::<Chest>(&["Chest", "minecraft:chest"]);
        factory.insert_builtin::<EnderChest>(&["EnderChest", "minecraft:ender_chest"]);
        factory.insert_builtin::<FlowerPot>(&["FlowerPot", "minecraft:flower_pot"]);
        factory.insert_builtin::<Furnace>(&["Furnace", "minecraft:furnace"]);
        // An entity on Java edition, so there is no namespaced alias.
        factory.insert_builtin::<ItemFrame>(&["ItemFrame"]);
        factory.insert_builtin::<MonsterSpawner>(&["MobSpawner", "minecraft:mob_spawner"]);
        factory.insert_builtin::<Note>(&["Music", "minecraft:noteblock"]);
        factory.insert_builtin::<Sign>(&["Sign", "minecraft:sign"]);
        factory.insert_builtin::<Skull>(&["Skull", "minecraft:skull"]);
        factory
    }

    /// A factory with nothing registered.
    pub fn empty() -> Self {
        Self {
            known: HashMap::new(),
            save_names: HashMap::new(),
            mapping: HashMap::new(),
            sealed: false,
        }
    }

    fn insert_builtin<T: TileType>(&mut self, aliases: &[&str]) {
        self.insert(T::KIND, TileConstructor::of::<T>(), aliases);
    }

    /// Register `constructor` as the implementation of `base`, loadable under
    /// each of `aliases`.
    ///
    /// The short name of `base` is appended to the aliases if missing, so
    /// every registration has a save name. Aliases already bound to another
    /// constructor are rebound to this one. Registering a base again keeps
    /// its earlier save names in front.
    pub fn register(
        &mut self,
        base: TileKind,
        constructor: TileConstructor,
        aliases: &[&str],
    ) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if !constructor.conforms_to(base) {
            return Err(RegistryError::NotSubstitutable {
                base,
                implementation: constructor.kind(),
            });
        }
        self.insert(base, constructor, aliases);
        Ok(())
    }

    /// Register a tile type as its own base.
    pub fn register_type<T: TileType>(&mut self, aliases: &[&str]) -> Result<(), RegistryError> {
        self.register(T::KIND, TileConstructor::of::<T>(), aliases)
    }

    fn insert(&mut self, base: TileKind, constructor: TileConstructor, aliases: &[&str]) {
        let mut names: Vec<String> = aliases.iter().map(|a| (*a).to_owned()).collect();
        let short_name = base.short_name();
        if !names.iter().any(|n| n == short_name) {
            names.push(short_name.to_owned());
        }

        for name in &names {
            if let Some(previous) = self.known.insert(name.clone(), constructor) {
                if previous.kind() != constructor.kind() {
                    tracing::warn!(
                        "Save name {} rebound from {} to {}",
                        name,
                        previous.kind(),
                        constructor.kind()
                    );
                }
            }
        }

        let saved = self.save_names.entry(base).or_default();
        for name in names {
            if !saved.contains(&name) {
                saved.push(name);
            }
        }

        self.mapping.insert(base, constructor);
        tracing::debug!("Registered tile {} as {}", base, constructor.kind());
    }

    /// Make `constructor` the implementation [`create`](Self::create) uses for
    /// `base`. Save names are left alone.
    pub fn override_tile(
        &mut self,
        base: TileKind,
        constructor: TileConstructor,
    ) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        if !self.mapping.contains_key(&base) {
            return Err(RegistryError::NotRegistered(base));
        }
        if !constructor.conforms_to(base) {
            return Err(RegistryError::NotSubstitutable {
                base,
                implementation: constructor.kind(),
            });
        }
        self.mapping.insert(base, constructor);
        tracing::debug!("Overrode tile {} with {}", base, constructor.kind());
        Ok(())
    }

    /// Make `create(B::KIND)` build a `C`.
    pub fn override_type<B: TileType, C: TileType>(&mut self) -> Result<(), RegistryError> {
        self.override_tile(B::KIND, TileConstructor::of::<C>())
    }

    /// A fresh tile for `base` at `pos`, built by the effective constructor.
    pub fn create(
        &self,
        base: TileKind,
        world: Arc<World>,
        pos: BlockPos,
    ) -> Result<Box<dyn Tile>, RegistryError> {
        let constructor = self
            .mapping
            .get(&base)
            .ok_or(RegistryError::NotRegistered(base))?;
        let tile = constructor.build(world, pos);
        debug_assert!(tile.is_a(base));
        Ok(tile)
    }

    /// Resolve a saved document's `id` through the alias table and build an
    /// unpopulated tile at the document's position.
    ///
    /// `Ok(None)` when the document has no string `id` or the id is unknown.
    /// A known id with a missing or mistyped position is an error.
    pub fn instantiate_saved(
        &self,
        world: Arc<World>,
        nbt: &CompoundTag,
    ) -> Result<Option<Box<dyn Tile>>, DocumentError> {
        let Some(id) = nbt.get::<&str>(TAG_ID).ok().flatten() else {
            return Ok(None);
        };
        let Some(constructor) = self.known.get(id) else {
            return Ok(None);
        };
        let pos = BlockPos::new(
            i64::from(nbt.require::<i32>(TAG_X)?),
            i64::from(nbt.require::<i32>(TAG_Y)?),
            i64::from(nbt.require::<i32>(TAG_Z)?),
        );
        Ok(Some(constructor.build(world, pos)))
    }

    /// The primary save name of `base`: the first alias it was registered with.
    pub fn save_id(&self, base: TileKind) -> Result<&str, RegistryError> {
        self.save_names
            .get(&base)
            .and_then(|names| names.first())
            .map(String::as_str)
            .ok_or(RegistryError::NotRegistered(base))
    }

    /// Save name for a tile instance: its own kind's if registered, otherwise
    /// that of the nearest registered kind it substitutes for.
    pub fn save_id_of(&self, tile: &dyn Tile) -> Result<&str, RegistryError> {
        std::iter::once(tile.kind())
            .chain(tile.ancestry().iter().copied())
            .find_map(|kind| self.save_id(kind).ok())
            .ok_or(RegistryError::NotRegistered(tile.kind()))
    }

    /// Every save name this factory resolves, with the kind it resolves to.
    pub fn aliases(&self) -> Vec<(&str, TileKind)> {
        let mut aliases: Vec<(&str, TileKind)> = self
            .known
            .iter()
            .map(|(name, ctor)| (name.as_str(), ctor.kind()))
            .collect();
        aliases.sort();
        aliases
    }

    pub fn is_registered(&self, base: TileKind) -> bool {
        self.mapping.contains_key(&base)
    }

    /// Kind `create` currently builds for `base`.
    pub fn effective_kind(&self, base: TileKind) -> Option<TileKind> {
        self.mapping.get(&base).map(TileConstructor::kind)
    }

    /// End the registration phase. Later `register`/`override_tile` calls fail.
    pub fn seal(&mut self) {
        self.sealed = true;
        tracing::info!(
            "Tile registry sealed: {} kinds, {} save names",
            self.mapping.len(),
            self.known.len()
        );
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

impl Default for TileFactory {
    fn default() -> Self {
        Self::new()
    }
}

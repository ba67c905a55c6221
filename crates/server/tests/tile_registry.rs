//! Registry and persistence working together, as a plugin would use them.

use std::sync::Arc;

use tilecraft_engine::world::World;
use tilecraft_engine::world::position::BlockPos;
use tilecraft_server::document::{CompoundTag, DocumentError};
use tilecraft_server::persistence::{
    create_from_document, load_chunk_tiles, load_tiles, save_document, save_tiles,
};
use tilecraft_server::tile::{
    Bed, Chest, EnderChest, FlowerPot, Furnace, ItemFrame, MonsterSpawner, Note, RegistryError,
    Sign, Skull, TAG_ID, TAG_X, TAG_Y, TAG_Z, Tile, TileBase, TileConstructor, TileFactory,
    TileKind, TileType,
};

/// A chest that remembers how many times it was opened.
#[derive(Debug)]
struct CountingChest {
    base: TileBase,
    opened: i32,
}

impl Tile for CountingChest {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.opened = nbt.get_or::<i32>("Opened", 0)?;
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put("Opened", self.opened);
    }
}

impl TileType for CountingChest {
    const KIND: TileKind = TileKind::new("plugin:CountingChest");
    const ANCESTRY: &'static [TileKind] = &[Chest::KIND];

    fn new(base: TileBase) -> Self {
        Self { base, opened: 0 }
    }
}

fn world() -> Arc<World> {
    Arc::new(World::new())
}

fn doc(id: &str, x: i32, y: i32, z: i32) -> CompoundTag {
    let mut nbt = CompoundTag::new();
    nbt.put(TAG_ID, id).put(TAG_X, x).put(TAG_Y, y).put(TAG_Z, z);
    nbt
}

#[test]
fn every_stock_kind_creates_a_matching_tile() {
    let factory = TileFactory::new();
    let kinds = [
        Bed::KIND,
        Chest::KIND,
        EnderChest::KIND,
        FlowerPot::KIND,
        Furnace::KIND,
        ItemFrame::KIND,
        MonsterSpawner::KIND,
        Note::KIND,
        Sign::KIND,
        Skull::KIND,
    ];
    let pos = BlockPos::new(-7, 12, 30);
    for kind in kinds {
        let tile = factory.create(kind, world(), pos).unwrap();
        assert!(tile.is_a(kind), "{} built {}", kind, tile.kind());
        assert_eq!(tile.position(), pos);

        // Everything the factory builds can be saved and loaded back.
        let saved = save_document(&factory, tile.as_ref()).unwrap();
        let loaded = create_from_document(&factory, world(), &saved).unwrap().unwrap();
        assert_eq!(loaded.kind(), kind);
    }
}

#[test]
fn namespaced_alias_loads_chest() {
    let factory = TileFactory::new();
    let tile = create_from_document(&factory, world(), &doc("minecraft:chest", 1, 2, 3))
        .unwrap()
        .unwrap();
    assert!(tile.is::<Chest>());
    assert_eq!(tile.position(), BlockPos::new(1, 2, 3));

    let mut unknown = CompoundTag::new();
    unknown.put(TAG_ID, "nonexistent");
    assert!(create_from_document(&factory, world(), &unknown).unwrap().is_none());
}

#[test]
fn plugin_override_is_created_and_saved_under_base_name() {
    let mut factory = TileFactory::new();
    factory.override_type::<Chest, CountingChest>().unwrap();
    factory.seal();

    let mut tile = factory.create(Chest::KIND, world(), BlockPos::new(0, 64, 0)).unwrap();
    tile.downcast_mut::<CountingChest>().unwrap().opened = 3;

    let saved = save_document(&factory, tile.as_ref()).unwrap();
    assert_eq!(saved.get::<&str>(TAG_ID), Ok(Some("Chest")));
    assert_eq!(saved.require::<i32>("Opened"), Ok(3));

    // Loading still goes through the alias table, which points at the stock
    // chest until the plugin re-registers the names.
    let loaded = create_from_document(&factory, world(), &saved).unwrap().unwrap();
    assert!(loaded.is::<Chest>());
}

#[test]
fn plugin_can_take_over_loading_too() {
    let mut factory = TileFactory::new();
    factory
        .register(
            Chest::KIND,
            TileConstructor::of::<CountingChest>(),
            &["Chest", "minecraft:chest"],
        )
        .unwrap();

    let mut saved = doc("Chest", 4, 5, 6);
    saved.put("Opened", 9i32);
    let loaded = create_from_document(&factory, world(), &saved).unwrap().unwrap();
    assert_eq!(loaded.downcast_ref::<CountingChest>().map(|c| c.opened), Some(9));
    assert_eq!(factory.save_id(Chest::KIND), Ok("Chest"));
}

#[test]
fn unrelated_constructor_is_refused() {
    let mut factory = TileFactory::new();
    assert_eq!(
        factory.override_tile(Furnace::KIND, TileConstructor::of::<CountingChest>()),
        Err(RegistryError::NotSubstitutable {
            base: Furnace::KIND,
            implementation: CountingChest::KIND,
        })
    );
    assert_eq!(
        factory.create(TileKind::new("Cauldron"), world(), BlockPos::new(0, 0, 0)).err(),
        Some(RegistryError::NotRegistered(TileKind::new("Cauldron")))
    );
}

#[test]
fn batch_keeps_going_past_bad_documents() {
    let factory = TileFactory::new();
    let mut bad_note = doc("Music", 0, 0, 0);
    bad_note.put(Note::TAG_NOTE, "C#");
    let docs = vec![
        doc("Skull", 0, 0, 0),
        bad_note,
        doc("Cauldron", 0, 0, 0),
        CompoundTag::new(),
        doc("MobSpawner", 0, 0, 0),
    ];

    let report = load_chunk_tiles(&factory, &world(), &docs);
    assert_eq!(report.tiles.len(), 2);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.failed, 1);
}

#[test]
fn region_files_round_trip_mixed_tiles() {
    let factory = TileFactory::new();
    let world = world();
    let dir = std::env::temp_dir().join("tilecraft_test_registry_regions");
    let _ = std::fs::remove_dir_all(&dir);

    let mut tiles: Vec<Box<dyn Tile>> = Vec::new();
    for (i, kind) in [Sign::KIND, Furnace::KIND, Bed::KIND].into_iter().enumerate() {
        let pos = BlockPos::new(i as i64 * 700, 64, -(i as i64) * 700);
        tiles.push(factory.create(kind, Arc::clone(&world), pos).unwrap());
    }
    if let Some(sign) = tiles[0].downcast_mut::<Sign>() {
        sign.set_line(2, "hello");
    }

    assert_eq!(save_tiles(&factory, &tiles, &dir).unwrap(), 3);
    let report = load_tiles(&factory, &world, &dir).unwrap();
    assert_eq!(report.tiles.len(), 3);

    let sign = report
        .tiles
        .iter()
        .find_map(|t| t.downcast_ref::<Sign>())
        .unwrap();
    assert_eq!(sign.lines()[2], "hello");

    // Saving again overwrites the same chunks instead of duplicating tiles.
    save_tiles(&factory, &tiles, &dir).unwrap();
    assert_eq!(load_tiles(&factory, &world, &dir).unwrap().tiles.len(), 3);

    let _ = std::fs::remove_dir_all(&dir);
}

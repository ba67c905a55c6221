//! World storage tests. Block values are opaque legacy states; nothing here
//! depends on a particular block catalog.

use tilecraft_engine::world::World;
use tilecraft_engine::world::block::BlockId;
use tilecraft_engine::world::chunk::{Chunk, SECTION_SIZE};
use tilecraft_engine::world::position::{BlockPos, ChunkPos, LocalBlockPos};

#[test]
fn unloaded_chunks_read_as_air() {
    let world = World::new();
    assert_eq!(world.get_block(BlockPos::new(100, 64, -100)), BlockId::AIR);
    assert_eq!(world.chunk_count(), 0);
}

#[test]
fn set_then_get_keeps_meta() {
    let world = World::new();
    let pos = BlockPos::new(-3, 70, 18);
    let log = BlockId::from_legacy(17, 0b1000);
    world.set_block(pos, log);

    assert!(world.has_chunk(ChunkPos::new(-1, 1)));
    assert_eq!(world.get_block(pos), log);
    assert_eq!(world.get_block(pos).meta(), 0b1000);
}

#[test]
fn clearing_last_block_drops_section() {
    let mut chunk = Chunk::new();
    let pos = LocalBlockPos { x: 1, y: 33, z: 2 };
    chunk.set_block(pos, BlockId::from_legacy(1, 0));
    assert_eq!(chunk.section_count(), 1);

    // Air with leftover meta still counts as air.
    chunk.set_block(pos, BlockId::from_legacy(0, 3));
    assert_eq!(chunk.section_count(), 0);
    assert!(chunk.get_block(pos).is_air());
}

#[test]
fn sections_are_sparse() {
    let world = World::new();
    for y in 0..(SECTION_SIZE as i64 * 3) {
        world.set_block(BlockPos::new(0, y, 0), BlockId::from_legacy(1, 0));
    }
    assert_eq!(world.chunk_count(), 1);
    assert_eq!(world.get_block(BlockPos::new(0, 47, 0)).type_id(), 1);
    assert!(world.get_block(BlockPos::new(0, 48, 0)).is_air());
}

#[test]
fn update_block_sees_current_state() {
    let world = World::new();
    let pos = BlockPos::new(7, 5, 7);
    world.set_block(pos, BlockId::from_legacy(61, 3));

    let lit = world.update_block(pos, |current| BlockId::from_legacy(62, current.meta()));
    assert_eq!(lit, BlockId::from_legacy(62, 3));
    assert_eq!(world.get_block(pos), lit);
}

#[test]
fn update_block_in_unloaded_chunk_allocates_only_on_write() {
    let world = World::new();
    let pos = BlockPos::new(100, 64, -100);

    let unchanged = world.update_block(pos, |current| current);
    assert!(unchanged.is_air());
    assert!(!world.has_chunk(pos.chunk()));
    assert_eq!(world.chunk_count(), 0);

    let placed = world.update_block(pos, |_| BlockId::from_legacy(61, 2));
    assert_eq!(placed, BlockId::from_legacy(61, 2));
    assert!(world.has_chunk(pos.chunk()));
    assert_eq!(world.get_block(pos), placed);
}

pub mod block;
pub mod chunk;
pub mod position;

use block::BlockId;
use chunk::Chunk;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::RefMut;
use position::{BlockPos, ChunkPos};

/// The block world that tiles are bound to. Thread-safe, lock-sharded by chunk.
pub struct World {
    chunks: DashMap<ChunkPos, Chunk>,
}

impl World {
    pub fn new() -> Self {
        Self {
            chunks: DashMap::new(),
        }
    }

    /// Read a block at an absolute position. Returns AIR for unloaded chunks.
    pub fn get_block(&self, pos: BlockPos) -> BlockId {
        match self.chunks.get(&pos.chunk()) {
            Some(chunk) => chunk.get_block(pos.local()),
            None => BlockId::AIR,
        }
    }

    /// Write a block at an absolute position. Creates the chunk if needed.
    pub fn set_block(&self, pos: BlockPos, block: BlockId) {
        self.chunk_mut(pos.chunk()).set_block(pos.local(), block);
    }

    /// Replace the block at `pos` with `f(current)` while holding the chunk's
    /// shard lock, so concurrent writers cannot interleave. Returns the block
    /// written.
    ///
    /// An unloaded chunk reads as AIR and is only allocated if `f` writes
    /// something other than AIR.
    pub fn update_block(&self, pos: BlockPos, f: impl FnOnce(BlockId) -> BlockId) -> BlockId {
        let local = pos.local();
        match self.chunks.entry(pos.chunk()) {
            Entry::Occupied(mut chunk) => {
                let chunk = chunk.get_mut();
                let updated = f(chunk.get_block(local));
                chunk.set_block(local, updated);
                updated
            }
            Entry::Vacant(slot) => {
                let updated = f(BlockId::AIR);
                if !updated.is_air() {
                    slot.insert(allocate(pos.chunk())).set_block(local, updated);
                }
                updated
            }
        }
    }

    fn chunk_mut(&self, pos: ChunkPos) -> RefMut<'_, ChunkPos, Chunk> {
        self.chunks.entry(pos).or_insert_with(|| allocate(pos))
    }

    pub fn has_chunk(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

fn allocate(pos: ChunkPos) -> Chunk {
    tracing::trace!("Allocating chunk ({}, {})", pos.x, pos.z);
    Chunk::new()
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

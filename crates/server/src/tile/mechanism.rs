//! Tiles that drive world behaviour: note blocks and mob spawners.

use super::{Tile, TileBase, TileKind, TileType};
use crate::document::{CompoundTag, DocumentError};

/// A note block.
#[derive(Debug)]
pub struct Note {
    base: TileBase,
    pitch: i8,
}

impl Note {
    pub const TAG_NOTE: &'static str = "note";
    pub const MAX_PITCH: i8 = 24;

    pub fn pitch(&self) -> i8 {
        self.pitch
    }

    pub fn set_pitch(&mut self, pitch: i8) {
        self.pitch = pitch.clamp(0, Self::MAX_PITCH);
    }

    /// Advance one semitone, wrapping after the top note.
    pub fn tune(&mut self) {
        self.pitch = (self.pitch + 1) % (Self::MAX_PITCH + 1);
    }
}

impl Tile for Note {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.set_pitch(nbt.get_or::<i8>(Self::TAG_NOTE, 0)?);
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(Self::TAG_NOTE, self.pitch);
    }
}

impl TileType for Note {
    const KIND: TileKind = TileKind::new("Note");

    fn new(base: TileBase) -> Self {
        Self { base, pitch: 0 }
    }
}

/// Spawn timing for a [`MonsterSpawner`], in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTiming {
    pub delay: i16,
    pub min_delay: i16,
    pub max_delay: i16,
    pub count: i16,
    pub range: i16,
}

impl Default for SpawnTiming {
    fn default() -> Self {
        Self {
            delay: 20,
            min_delay: 200,
            max_delay: 800,
            count: 4,
            range: 4,
        }
    }
}

#[derive(Debug)]
pub struct MonsterSpawner {
    base: TileBase,
    /// Legacy network id of the spawned entity, 0 when unset.
    entity_id: i32,
    timing: SpawnTiming,
}

impl MonsterSpawner {
    pub const TAG_ENTITY_ID: &'static str = "EntityId";
    pub const TAG_DELAY: &'static str = "Delay";
    pub const TAG_MIN_SPAWN_DELAY: &'static str = "MinSpawnDelay";
    pub const TAG_MAX_SPAWN_DELAY: &'static str = "MaxSpawnDelay";
    pub const TAG_SPAWN_COUNT: &'static str = "SpawnCount";
    pub const TAG_SPAWN_RANGE: &'static str = "SpawnRange";

    pub fn entity_id(&self) -> i32 {
        self.entity_id
    }

    pub fn set_entity_id(&mut self, entity_id: i32) {
        self.entity_id = entity_id;
    }

    pub fn timing(&self) -> SpawnTiming {
        self.timing
    }
}

impl Tile for MonsterSpawner {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        let defaults = SpawnTiming::default();
        self.entity_id = nbt.get_or::<i32>(Self::TAG_ENTITY_ID, 0)?;

        let min_delay = nbt.get_or::<i16>(Self::TAG_MIN_SPAWN_DELAY, defaults.min_delay)?;
        let max_delay = nbt.get_or::<i16>(Self::TAG_MAX_SPAWN_DELAY, defaults.max_delay)?;
        self.timing = SpawnTiming {
            delay: nbt.get_or::<i16>(Self::TAG_DELAY, defaults.delay)?,
            min_delay,
            // An inverted window collapses to its minimum.
            max_delay: max_delay.max(min_delay),
            count: nbt.get_or::<i16>(Self::TAG_SPAWN_COUNT, defaults.count)?,
            range: nbt.get_or::<i16>(Self::TAG_SPAWN_RANGE, defaults.range)?,
        };
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(Self::TAG_ENTITY_ID, self.entity_id)
            .put(Self::TAG_DELAY, self.timing.delay)
            .put(Self::TAG_MIN_SPAWN_DELAY, self.timing.min_delay)
            .put(Self::TAG_MAX_SPAWN_DELAY, self.timing.max_delay)
            .put(Self::TAG_SPAWN_COUNT, self.timing.count)
            .put(Self::TAG_SPAWN_RANGE, self.timing.range);
    }
}

impl TileType for MonsterSpawner {
    const KIND: TileKind = TileKind::new("MonsterSpawner");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            entity_id: 0,
            timing: SpawnTiming::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tilecraft_engine::world::World;
    use tilecraft_engine::world::position::BlockPos;

    use super::*;

    fn tile<T: TileType>() -> T {
        T::new(TileBase::of::<T>(
            Arc::new(World::new()),
            BlockPos::new(4, 10, -4),
        ))
    }

    #[test]
    fn note_pitch_is_clamped() {
        let mut note: Note = tile();
        let mut nbt = CompoundTag::new();
        nbt.put(Note::TAG_NOTE, 40i8);
        note.read_save_data(&nbt).unwrap();
        assert_eq!(note.pitch(), Note::MAX_PITCH);

        nbt.put(Note::TAG_NOTE, -3i8);
        note.read_save_data(&nbt).unwrap();
        assert_eq!(note.pitch(), 0);
    }

    #[test]
    fn note_tune_wraps() {
        let mut note: Note = tile();
        note.set_pitch(23);
        note.tune();
        assert_eq!(note.pitch(), 24);
        note.tune();
        assert_eq!(note.pitch(), 0);
    }

    #[test]
    fn spawner_defaults() {
        let mut spawner: MonsterSpawner = tile();
        spawner.read_save_data(&CompoundTag::new()).unwrap();
        assert_eq!(spawner.entity_id(), 0);
        assert_eq!(spawner.timing(), SpawnTiming::default());
        assert_eq!(spawner.timing().delay, 20);
    }

    #[test]
    fn spawner_writes_all_fields() {
        let mut spawner: MonsterSpawner = tile();
        let mut nbt = CompoundTag::new();
        nbt.put(MonsterSpawner::TAG_ENTITY_ID, 50i32)
            .put(MonsterSpawner::TAG_MIN_SPAWN_DELAY, 300i16)
            .put(MonsterSpawner::TAG_MAX_SPAWN_DELAY, 100i16);
        spawner.read_save_data(&nbt).unwrap();
        assert_eq!(spawner.timing().max_delay, 300);

        let mut out = CompoundTag::new();
        spawner.write_save_data(&mut out);
        assert_eq!(out.require::<i32>(MonsterSpawner::TAG_ENTITY_ID), Ok(50));
        assert_eq!(out.require::<i16>(MonsterSpawner::TAG_DELAY), Ok(20));
        assert_eq!(out.len(), 6);
    }
}

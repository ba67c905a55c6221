use super::block::BlockId;
use super::position::LocalBlockPos;
use std::collections::HashMap;

/// Number of blocks along each axis of a chunk section.
pub const SECTION_SIZE: usize = 16;
const SECTION_VOLUME: usize = SECTION_SIZE * SECTION_SIZE * SECTION_SIZE;

/// Packed 4-bit values, two per byte, low nibble first.
#[derive(Clone)]
struct NibbleArray(Box<[u8; SECTION_VOLUME / 2]>);

impl NibbleArray {
    fn new() -> Self {
        Self(Box::new([0; SECTION_VOLUME / 2]))
    }

    fn get(&self, index: usize) -> u8 {
        let byte = self.0[index >> 1];
        if index & 1 == 0 { byte & 0x0F } else { byte >> 4 }
    }

    fn set(&mut self, index: usize, value: u8) {
        let byte = &mut self.0[index >> 1];
        let value = value & 0x0F;
        *byte = if index & 1 == 0 {
            (*byte & 0xF0) | value
        } else {
            (*byte & 0x0F) | (value << 4)
        };
    }
}

/// A 16x16x16 cube of legacy block states, split the way legacy region files
/// store them: low 8 bits of the type id, an optional nibble of high type id
/// bits (only allocated once an id above 255 is written) and the meta nibble.
///
/// Indexed YZX (x varies fastest).
#[derive(Clone)]
pub struct ChunkSection {
    blocks: Box<[u8; SECTION_VOLUME]>,
    add: Option<NibbleArray>,
    data: NibbleArray,
    non_air: u16,
}

impl ChunkSection {
    pub fn new_empty() -> Self {
        Self {
            blocks: Box::new([0; SECTION_VOLUME]),
            add: None,
            data: NibbleArray::new(),
            non_air: 0,
        }
    }

    #[inline]
    const fn index(x: u8, y: u8, z: u8) -> usize {
        (y as usize) * SECTION_SIZE * SECTION_SIZE + (z as usize) * SECTION_SIZE + (x as usize)
    }

    fn type_id_at(&self, index: usize) -> u16 {
        let high = self.add.as_ref().map_or(0, |add| add.get(index));
        (u16::from(high) << 8) | u16::from(self.blocks[index])
    }

    pub fn get(&self, x: u8, y: u8, z: u8) -> BlockId {
        let index = Self::index(x, y, z);
        BlockId::from_legacy(self.type_id_at(index), self.data.get(index))
    }

    pub fn set(&mut self, x: u8, y: u8, z: u8, block: BlockId) {
        let index = Self::index(x, y, z);
        let was_air = self.type_id_at(index) == 0;

        let type_id = block.type_id();
        self.blocks[index] = (type_id & 0xFF) as u8;
        let high = (type_id >> 8) as u8;
        match &mut self.add {
            Some(add) => add.set(index, high),
            None if high != 0 => {
                let mut add = NibbleArray::new();
                add.set(index, high);
                self.add = Some(add);
            }
            None => {}
        }
        self.data.set(index, block.meta());

        match (was_air, block.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.non_air == 0
    }
}

/// A column of chunk sections, keyed by section index (y >> 4). Sections
/// holding only air are not stored.
pub struct Chunk {
    sections: HashMap<i32, ChunkSection>,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            sections: HashMap::new(),
        }
    }

    pub fn get_block(&self, pos: LocalBlockPos) -> BlockId {
        self.sections
            .get(&pos.section_index())
            .map_or(BlockId::AIR, |section| {
                section.get(pos.x, pos.section_local_y(), pos.z)
            })
    }

    pub fn set_block(&mut self, pos: LocalBlockPos, block: BlockId) {
        let section_idx = pos.section_index();
        let y = pos.section_local_y();

        if block.is_air() {
            let Some(section) = self.sections.get_mut(&section_idx) else {
                return;
            };
            section.set(pos.x, y, pos.z, block);
            if section.is_empty() {
                self.sections.remove(&section_idx);
            }
        } else {
            self.sections
                .entry(section_idx)
                .or_insert_with(ChunkSection::new_empty)
                .set(pos.x, y, pos.z, block);
        }
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nibbles_do_not_bleed() {
        let mut nibbles = NibbleArray::new();
        nibbles.set(4, 0xF);
        nibbles.set(5, 0x3);
        assert_eq!(nibbles.get(4), 0xF);
        assert_eq!(nibbles.get(5), 0x3);
        nibbles.set(4, 0x1A);
        assert_eq!(nibbles.get(4), 0xA);
        assert_eq!(nibbles.get(5), 0x3);
    }

    #[test]
    fn high_type_ids_allocate_add_nibbles() {
        let mut section = ChunkSection::new_empty();
        section.set(0, 0, 0, BlockId::from_legacy(17, 4));
        assert!(section.add.is_none());

        let wide = BlockId::from_legacy(0x2C7, 9);
        section.set(15, 15, 15, wide);
        assert!(section.add.is_some());
        assert_eq!(section.get(15, 15, 15), wide);
        assert_eq!(section.get(0, 0, 0), BlockId::from_legacy(17, 4));
    }

    #[test]
    fn overwriting_keeps_air_count() {
        let mut section = ChunkSection::new_empty();
        section.set(1, 2, 3, BlockId::from_legacy(1, 0));
        section.set(1, 2, 3, BlockId::from_legacy(4, 0));
        assert!(!section.is_empty());
        section.set(1, 2, 3, BlockId::AIR);
        assert!(section.is_empty());
    }
}

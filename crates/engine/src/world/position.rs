/// Absolute block position in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BlockPos {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(&self, dx: i64, dy: i64, dz: i64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The chunk this block belongs to.
    pub const fn chunk(&self) -> ChunkPos {
        ChunkPos {
            x: (self.x >> 4) as i32,
            z: (self.z >> 4) as i32,
        }
    }

    /// Position within the chunk (0..16 on x and z, unbounded y).
    pub const fn local(&self) -> LocalBlockPos {
        LocalBlockPos {
            x: (self.x & 0xF) as u8,
            y: self.y,
            z: (self.z & 0xF) as u8,
        }
    }

    /// True if `other` shares this position's y and is one step away on
    /// exactly one horizontal axis.
    pub fn is_horizontally_adjacent(&self, other: &BlockPos) -> bool {
        self.y == other.y
            && ((self.x == other.x && (self.z - other.z).abs() == 1)
                || (self.z == other.z && (self.x - other.x).abs() == 1))
    }
}

/// Chunk column position (each chunk is 16x16 blocks horizontally).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The Anvil region (32x32 chunks) containing this chunk.
    pub const fn region(&self) -> (i32, i32) {
        (self.x.div_euclid(32), self.z.div_euclid(32))
    }

    /// Chunk offset inside its region, each axis in 0..32.
    pub const fn region_local(&self) -> (usize, usize) {
        (self.x.rem_euclid(32) as usize, self.z.rem_euclid(32) as usize)
    }
}

/// Block position local to a chunk (x, z in 0..16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalBlockPos {
    pub x: u8,
    pub y: i64,
    pub z: u8,
}

impl LocalBlockPos {
    pub const fn section_index(&self) -> i32 {
        (self.y >> 4) as i32
    }

    pub const fn section_local_y(&self) -> u8 {
        (self.y.rem_euclid(16)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_coordinates_floor_into_chunks() {
        let pos = BlockPos::new(-1, 64, -17);
        assert_eq!(pos.chunk(), ChunkPos::new(-1, -2));
        let local = pos.local();
        assert_eq!((local.x, local.z), (15, 15));
    }

    #[test]
    fn region_math() {
        assert_eq!(ChunkPos::new(0, 0).region(), (0, 0));
        assert_eq!(ChunkPos::new(31, 32).region(), (0, 1));
        assert_eq!(ChunkPos::new(-1, -33).region(), (-1, -2));
        assert_eq!(ChunkPos::new(-1, 33).region_local(), (31, 1));
    }

    #[test]
    fn horizontal_adjacency() {
        let pos = BlockPos::new(4, 10, 4);
        assert!(pos.is_horizontally_adjacent(&pos.offset(1, 0, 0)));
        assert!(pos.is_horizontally_adjacent(&pos.offset(0, 0, -1)));
        assert!(!pos.is_horizontally_adjacent(&pos.offset(1, 0, 1)));
        assert!(!pos.is_horizontally_adjacent(&pos.offset(0, 1, 0)));
        assert!(!pos.is_horizontally_adjacent(&pos));
    }
}

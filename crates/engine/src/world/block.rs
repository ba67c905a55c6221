/// Number of low bits of a [`BlockId`] reserved for the block's compact state.
pub const META_BITS: u8 = 4;
/// Mask selecting the compact state from a raw [`BlockId`].
pub const META_MASK: u16 = (1 << META_BITS) - 1;
/// Largest legacy type id that fits above the meta nibble.
pub const MAX_TYPE_ID: u16 = u16::MAX >> META_BITS;

/// Full legacy block state: the base type id in the high 12 bits, the compact
/// state ("meta") in the low nibble.
///
/// The engine stores these without interpreting the meta. Game layers assign
/// meaning to type ids (e.g. 17 = log) and decode meta through a
/// [`StateCodec`](crate::state::StateCodec).
///
/// The only semantic the engine enforces is that type id 0 is the "empty"
/// block: chunk sections filled entirely with air are deallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The universal "empty" block.
    pub const AIR: BlockId = BlockId(0);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    /// Pack a type id and meta. Bits of `meta` above [`META_BITS`] and bits of
    /// `type_id` above [`MAX_TYPE_ID`] are discarded.
    pub const fn from_legacy(type_id: u16, meta: u8) -> Self {
        Self(((type_id & MAX_TYPE_ID) << META_BITS) | (meta as u16 & META_MASK))
    }

    pub const fn type_id(self) -> u16 {
        self.0 >> META_BITS
    }

    pub const fn meta(self) -> u8 {
        (self.0 & META_MASK) as u8
    }

    /// Same type, different compact state.
    pub const fn with_meta(self, meta: u8) -> Self {
        Self::from_legacy(self.type_id(), meta)
    }

    /// Air with any meta is still air.
    pub const fn is_air(self) -> bool {
        self.type_id() == 0
    }
}

//! Legacy block type ids and the blocks whose meta carries state.
//!
//! A [`BlockId`] is a type id plus a 4-bit meta. The types here decode that
//! meta into named state and encode it back, each through a const
//! [`MetaLayout`] so the bit allocation is checked at compile time.

use tilecraft_engine::state::{
    Axis, Facing, Field, HorizontalFacing, MetaFragment, MetaLayout, PriorityFlag, StateCodec,
};
use tilecraft_engine::world::block::{BlockId, META_BITS};

// -- Legacy type ids --

pub const AIR: u16 = 0;
pub const STONE: u16 = 1;
pub const PLANKS: u16 = 5;
pub const LOG: u16 = 17;
pub const NOTEBLOCK: u16 = 25;
pub const BED: u16 = 26;
pub const STONE_SLAB: u16 = 44;
pub const MOB_SPAWNER: u16 = 52;
pub const OAK_STAIRS: u16 = 53;
pub const CHEST: u16 = 54;
pub const FURNACE: u16 = 61;
pub const LIT_FURNACE: u16 = 62;
pub const SIGN_POST: u16 = 63;
pub const COBBLESTONE_STAIRS: u16 = 67;
pub const WALL_SIGN: u16 = 68;
pub const ENDER_CHEST: u16 = 130;
pub const FLOWER_POT: u16 = 140;
pub const SKULL: u16 = 144;
pub const LOG2: u16 = 162;
pub const ITEM_FRAME: u16 = 199;

/// A block type whose meta is decoded by a [`StateCodec`].
pub trait Block: StateCodec {
    fn type_id(&self) -> u16;

    /// The full legacy state: type id with the encoded meta.
    fn state_id(&self) -> BlockId {
        BlockId::from_legacy(self.type_id(), self.encode_state())
    }
}

// -- Log --

/// A log. Bits 0-1 hold the axis; bit 3 marks the six-sided "full bark"
/// variant, which has no axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Log {
    type_id: u16,
    axis: Axis,
    full_bark: bool,
}

impl Log {
    const AXIS: Field<Axis> = Field::new(0);
    const FULL_BARK: PriorityFlag = PriorityFlag::new(3);
    const LAYOUT: MetaLayout = MetaLayout::new(META_BITS)
        .with(Self::AXIS.range())
        .with(Self::FULL_BARK.range());

    pub fn new(type_id: u16) -> Self {
        Self {
            type_id,
            axis: Axis::default(),
            full_bark: false,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn set_axis(&mut self, axis: Axis) -> &mut Self {
        self.axis = axis;
        self
    }

    pub fn is_full_bark(&self) -> bool {
        self.full_bark
    }

    pub fn set_full_bark(&mut self, full_bark: bool) -> &mut Self {
        self.full_bark = full_bark;
        self
    }
}

impl StateCodec for Log {
    fn encode_state(&self) -> u8 {
        Self::FULL_BARK.encode(self.full_bark, || Self::AXIS.write(self.axis))
    }

    fn decode_state(&mut self, meta: u8) {
        let meta = meta & Self::LAYOUT.mask();
        let mut axis = Axis::default();
        self.full_bark = Self::FULL_BARK.decode(meta, |meta| axis = Self::AXIS.read(meta));
        self.axis = axis;
    }
}

impl Block for Log {
    fn type_id(&self) -> u16 {
        self.type_id
    }
}

// -- Stairs --

/// Stairs: bits 0-1 are the facing, bit 2 flips them upside down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stairs {
    type_id: u16,
    facing: HorizontalFacing,
    upside_down: bool,
}

impl Stairs {
    const FACING: Field<HorizontalFacing> = Field::new(0);
    const UPSIDE_DOWN: Field<bool> = Field::new(2);
    const LAYOUT: MetaLayout = MetaLayout::new(META_BITS)
        .with(Self::FACING.range())
        .with(Self::UPSIDE_DOWN.range());

    pub fn new(type_id: u16) -> Self {
        Self {
            type_id,
            facing: HorizontalFacing::default(),
            upside_down: false,
        }
    }

    pub fn facing(&self) -> HorizontalFacing {
        self.facing
    }

    pub fn set_facing(&mut self, facing: HorizontalFacing) -> &mut Self {
        self.facing = facing;
        self
    }

    pub fn is_upside_down(&self) -> bool {
        self.upside_down
    }

    pub fn set_upside_down(&mut self, upside_down: bool) -> &mut Self {
        self.upside_down = upside_down;
        self
    }
}

impl StateCodec for Stairs {
    fn encode_state(&self) -> u8 {
        Self::FACING.write(self.facing) | Self::UPSIDE_DOWN.write(self.upside_down)
    }

    fn decode_state(&mut self, meta: u8) {
        let meta = meta & Self::LAYOUT.mask();
        self.facing = Self::FACING.read(meta);
        self.upside_down = Self::UPSIDE_DOWN.read(meta);
    }
}

impl Block for Stairs {
    fn type_id(&self) -> u16 {
        self.type_id
    }
}

// -- Slab --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlabVariant {
    #[default]
    Stone,
    Sandstone,
    Wooden,
    Cobblestone,
    Brick,
    StoneBrick,
    Quartz,
    NetherBrick,
}

impl MetaFragment for SlabVariant {
    const WIDTH: u8 = 3;

    fn to_bits(self) -> u8 {
        self as u8
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            1 => SlabVariant::Sandstone,
            2 => SlabVariant::Wooden,
            3 => SlabVariant::Cobblestone,
            4 => SlabVariant::Brick,
            5 => SlabVariant::StoneBrick,
            6 => SlabVariant::Quartz,
            7 => SlabVariant::NetherBrick,
            _ => SlabVariant::Stone,
        }
    }
}

/// Half slab: bits 0-2 pick the material, bit 3 puts it in the top half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slab {
    type_id: u16,
    variant: SlabVariant,
    top: bool,
}

impl Slab {
    const VARIANT: Field<SlabVariant> = Field::new(0);
    const TOP: Field<bool> = Field::new(3);
    const LAYOUT: MetaLayout = MetaLayout::new(META_BITS)
        .with(Self::VARIANT.range())
        .with(Self::TOP.range());

    pub fn new(type_id: u16) -> Self {
        Self {
            type_id,
            variant: SlabVariant::default(),
            top: false,
        }
    }

    pub fn variant(&self) -> SlabVariant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: SlabVariant) -> &mut Self {
        self.variant = variant;
        self
    }

    pub fn is_top(&self) -> bool {
        self.top
    }

    pub fn set_top(&mut self, top: bool) -> &mut Self {
        self.top = top;
        self
    }
}

impl StateCodec for Slab {
    fn encode_state(&self) -> u8 {
        Self::VARIANT.write(self.variant) | Self::TOP.write(self.top)
    }

    fn decode_state(&mut self, meta: u8) {
        let meta = meta & Self::LAYOUT.mask();
        self.variant = Self::VARIANT.read(meta);
        self.top = Self::TOP.read(meta);
    }
}

impl Block for Slab {
    fn type_id(&self) -> u16 {
        self.type_id
    }
}

// -- Horizontally facing blocks (chests, furnaces) --

/// A block that faces one of the four horizontal directions, stored as a full
/// 3-bit [`Facing`]. Up, down and the unused patterns decode to north.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacingBlock {
    type_id: u16,
    facing: HorizontalFacing,
}

impl FacingBlock {
    const FACING: Field<Facing> = Field::new(0);
    const LAYOUT: MetaLayout = MetaLayout::new(META_BITS).with(Self::FACING.range());
    const FALLBACK: HorizontalFacing = HorizontalFacing::North;

    pub fn new(type_id: u16) -> Self {
        Self {
            type_id,
            facing: Self::FALLBACK,
        }
    }

    pub fn facing(&self) -> HorizontalFacing {
        self.facing
    }

    pub fn set_facing(&mut self, facing: HorizontalFacing) -> &mut Self {
        self.facing = facing;
        self
    }
}

impl StateCodec for FacingBlock {
    fn encode_state(&self) -> u8 {
        Self::FACING.write(Facing::from(self.facing))
    }

    fn decode_state(&mut self, meta: u8) {
        let meta = meta & Self::LAYOUT.mask();
        self.facing = Self::FACING
            .read(meta)
            .horizontal()
            .unwrap_or(Self::FALLBACK);
    }
}

impl Block for FacingBlock {
    fn type_id(&self) -> u16 {
        self.type_id
    }
}

// -- Dispatch --

/// A decoded block of any type this server knows the meta layout of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownBlock {
    Log(Log),
    Stairs(Stairs),
    Slab(Slab),
    Facing(FacingBlock),
}

impl KnownBlock {
    /// Decode a full legacy state. `None` for types without a known layout.
    pub fn from_state(id: BlockId) -> Option<Self> {
        let meta = id.meta();
        let block = match id.type_id() {
            LOG | LOG2 => {
                let mut log = Log::new(id.type_id());
                log.decode_state(meta);
                KnownBlock::Log(log)
            }
            OAK_STAIRS | COBBLESTONE_STAIRS => {
                let mut stairs = Stairs::new(id.type_id());
                stairs.decode_state(meta);
                KnownBlock::Stairs(stairs)
            }
            STONE_SLAB => {
                let mut slab = Slab::new(id.type_id());
                slab.decode_state(meta);
                KnownBlock::Slab(slab)
            }
            CHEST | ENDER_CHEST | FURNACE | LIT_FURNACE => {
                let mut block = FacingBlock::new(id.type_id());
                block.decode_state(meta);
                KnownBlock::Facing(block)
            }
            _ => return None,
        };
        Some(block)
    }

    pub fn state_id(&self) -> BlockId {
        match self {
            KnownBlock::Log(b) => b.state_id(),
            KnownBlock::Stairs(b) => b.state_id(),
            KnownBlock::Slab(b) => b.state_id(),
            KnownBlock::Facing(b) => b.state_id(),
        }
    }
}

//! Compact block state codecs.
//!
//! A block's mutable sub-state (orientation, variant, flags) lives in the low
//! [`META_BITS`] of its legacy id. Each piece of that state is a
//! [`MetaFragment`] placed at a [`Field`]. A type lists its fields in a
//! [`MetaLayout`], which rejects overlapping ranges during const evaluation,
//! so a layout bug is a compile error rather than corrupt saves.
//!
//! Some legacy encodings reuse bits: a single flag changes the meaning of the
//! rest of the meta. [`PriorityFlag`] expresses that: when set it wins, and
//! the fields it shadows are neither written nor read.

use std::marker::PhantomData;

use crate::world::block::META_BITS;

/// Mask of the `width` low bits.
const fn low_mask(width: u8) -> u8 {
    ((1u16 << width) - 1) as u8
}

/// Bidirectional conversion between a type's in-memory state and its compact
/// legacy meta.
///
/// `decode_state` must be total: every value in `0..(1 << WIDTH)` produces a
/// valid state. Bits above `WIDTH` are the caller's to mask; implementations
/// only look at the bits their layout declares.
pub trait StateCodec {
    /// Number of meta bits this type owns.
    const WIDTH: u8 = META_BITS;

    fn encode_state(&self) -> u8;

    fn decode_state(&mut self, meta: u8);
}

/// A reusable piece of state with a fixed bit width.
///
/// `from_bits` receives only the low `WIDTH` bits and maps every pattern the
/// fragment does not use to `Default::default()`.
pub trait MetaFragment: Copy + Default {
    const WIDTH: u8;

    fn to_bits(self) -> u8;

    fn from_bits(bits: u8) -> Self;
}

impl MetaFragment for bool {
    const WIDTH: u8 = 1;

    fn to_bits(self) -> u8 {
        self as u8
    }

    fn from_bits(bits: u8) -> Self {
        bits & 1 != 0
    }
}

/// Pillar orientation (logs, quartz pillars, hay bales).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    #[default]
    Y,
    X,
    Z,
}

impl MetaFragment for Axis {
    const WIDTH: u8 = 2;

    fn to_bits(self) -> u8 {
        match self {
            Axis::Y => 0,
            Axis::X => 1,
            Axis::Z => 2,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Axis::X,
            2 => Axis::Z,
            _ => Axis::Y,
        }
    }
}

/// One of the four horizontal directions, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalFacing {
    #[default]
    South,
    West,
    North,
    East,
}

impl HorizontalFacing {
    pub const ALL: [HorizontalFacing; 4] = [
        HorizontalFacing::South,
        HorizontalFacing::West,
        HorizontalFacing::North,
        HorizontalFacing::East,
    ];

    pub fn opposite(self) -> Self {
        match self {
            HorizontalFacing::South => HorizontalFacing::North,
            HorizontalFacing::West => HorizontalFacing::East,
            HorizontalFacing::North => HorizontalFacing::South,
            HorizontalFacing::East => HorizontalFacing::West,
        }
    }
}

impl MetaFragment for HorizontalFacing {
    const WIDTH: u8 = 2;

    fn to_bits(self) -> u8 {
        self as u8
    }

    fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }
}

/// One of the six block faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    #[default]
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Facing {
    /// The horizontal component, or `None` for up/down.
    pub fn horizontal(self) -> Option<HorizontalFacing> {
        match self {
            Facing::North => Some(HorizontalFacing::North),
            Facing::South => Some(HorizontalFacing::South),
            Facing::West => Some(HorizontalFacing::West),
            Facing::East => Some(HorizontalFacing::East),
            Facing::Down | Facing::Up => None,
        }
    }
}

impl From<HorizontalFacing> for Facing {
    fn from(facing: HorizontalFacing) -> Self {
        match facing {
            HorizontalFacing::South => Facing::South,
            HorizontalFacing::West => Facing::West,
            HorizontalFacing::North => Facing::North,
            HorizontalFacing::East => Facing::East,
        }
    }
}

impl MetaFragment for Facing {
    const WIDTH: u8 = 3;

    fn to_bits(self) -> u8 {
        self as u8
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            1 => Facing::Up,
            2 => Facing::North,
            3 => Facing::South,
            4 => Facing::West,
            5 => Facing::East,
            _ => Facing::Down,
        }
    }
}

/// A contiguous run of meta bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    pub shift: u8,
    pub width: u8,
}

impl BitRange {
    pub const fn new(shift: u8, width: u8) -> Self {
        Self { shift, width }
    }

    pub const fn mask(&self) -> u8 {
        low_mask(self.width) << self.shift
    }
}

/// A fragment of type `F` stored at a fixed shift.
pub struct Field<F> {
    shift: u8,
    _fragment: PhantomData<F>,
}

impl<F: MetaFragment> Field<F> {
    pub const fn new(shift: u8) -> Self {
        Self {
            shift,
            _fragment: PhantomData,
        }
    }

    pub const fn range(&self) -> BitRange {
        BitRange::new(self.shift, F::WIDTH)
    }

    /// Decode this field from `meta`, ignoring every bit outside it.
    pub fn read(&self, meta: u8) -> F {
        F::from_bits((meta >> self.shift) & low_mask(F::WIDTH))
    }

    /// Encode `value` into this field's bits; all other bits are zero.
    pub fn write(&self, value: F) -> u8 {
        (value.to_bits() & low_mask(F::WIDTH)) << self.shift
    }
}

/// Allocation of meta bits to fields.
///
/// Build it in a `const` with [`MetaLayout::with`]; overlapping ranges or
/// ranges past `width` abort const evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaLayout {
    width: u8,
    used: u8,
}

impl MetaLayout {
    pub const fn new(width: u8) -> Self {
        assert!(width <= 8, "meta layouts are at most 8 bits wide");
        Self { width, used: 0 }
    }

    pub const fn with(self, range: BitRange) -> Self {
        assert!(
            range.shift + range.width <= self.width,
            "field does not fit in the layout width"
        );
        assert!(
            self.used & range.mask() == 0,
            "field overlaps a previously allocated field"
        );
        Self {
            width: self.width,
            used: self.used | range.mask(),
        }
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Bits claimed by some field.
    pub const fn mask(&self) -> u8 {
        self.used
    }

    /// Bits inside the width that no field claims.
    pub const fn unused(&self) -> u8 {
        low_mask(self.width) & !self.used
    }
}

/// A one-bit flag that takes precedence over the lower-priority fields.
///
/// When set, the encoded meta is the flag bit alone and the lower fields are
/// never consulted. When decoding a meta with the bit set, the lower fields
/// are never read; the caller leaves them at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFlag {
    bit: u8,
}

impl PriorityFlag {
    pub const fn new(bit: u8) -> Self {
        assert!(bit < 8, "flag bit out of range");
        Self { bit }
    }

    pub const fn range(&self) -> BitRange {
        BitRange::new(self.bit, 1)
    }

    pub fn is_set(&self, meta: u8) -> bool {
        meta & self.range().mask() != 0
    }

    /// Encode with `lower` producing the meta of the shadowed fields. `lower`
    /// only runs when the flag is clear.
    pub fn encode(&self, set: bool, lower: impl FnOnce() -> u8) -> u8 {
        if set {
            self.range().mask()
        } else {
            lower() & !self.range().mask()
        }
    }

    /// Returns whether the flag is set. `lower` receives the meta only when
    /// it is clear.
    pub fn decode(&self, meta: u8, lower: impl FnOnce(u8)) -> bool {
        let set = self.is_set(meta);
        if !set {
            lower(meta);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fragments_are_total() {
        for bits in 0..=u8::MAX {
            let _ = bool::from_bits(bits);
            let _ = Axis::from_bits(bits);
            let _ = HorizontalFacing::from_bits(bits);
            let _ = Facing::from_bits(bits);
        }
    }

    #[test]
    fn unused_patterns_fall_back_to_default() {
        assert_eq!(Axis::from_bits(0b11), Axis::default());
        assert_eq!(Facing::from_bits(6), Facing::default());
        assert_eq!(Facing::from_bits(7), Facing::default());
    }

    #[test]
    fn fragment_round_trip_on_used_values() {
        for axis in [Axis::Y, Axis::X, Axis::Z] {
            assert_eq!(Axis::from_bits(axis.to_bits()), axis);
        }
        for facing in HorizontalFacing::ALL {
            assert_eq!(HorizontalFacing::from_bits(facing.to_bits()), facing);
            assert_eq!(facing.opposite().opposite(), facing);
        }
        for bits in 0..6 {
            assert_eq!(Facing::from_bits(bits).to_bits(), bits);
        }
    }

    #[test]
    fn field_reads_only_its_bits() {
        const AXIS: Field<Axis> = Field::new(2);
        assert_eq!(AXIS.range().mask(), 0b1100);
        assert_eq!(AXIS.write(Axis::Z), 0b1000);
        assert_eq!(AXIS.read(0b0111), Axis::X);
        assert_eq!(AXIS.read(0b1011), Axis::Z);
        assert_eq!(AXIS.read(0b1111_0011), Axis::Y);
    }

    #[test]
    fn layout_tracks_allocated_bits() {
        const LAYOUT: MetaLayout = MetaLayout::new(4)
            .with(Field::<Axis>::new(0).range())
            .with(PriorityFlag::new(3).range());
        assert_eq!(LAYOUT.width(), 4);
        assert_eq!(LAYOUT.mask(), 0b1011);
        assert_eq!(LAYOUT.unused(), 0b0100);
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn layout_rejects_overlap() {
        let _ = MetaLayout::new(4)
            .with(BitRange::new(0, 2))
            .with(BitRange::new(1, 1));
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn layout_rejects_overflow() {
        let _ = MetaLayout::new(4).with(BitRange::new(3, 2));
    }

    #[test]
    fn priority_flag_skips_lower_fields_when_set() {
        let flag = PriorityFlag::new(3);
        let calls = Cell::new(0);

        let meta = flag.encode(true, || {
            calls.set(calls.get() + 1);
            0b0011
        });
        assert_eq!(meta, 0b1000);
        assert_eq!(calls.get(), 0);

        assert!(flag.decode(0b1011, |_| calls.set(calls.get() + 1)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn priority_flag_delegates_when_clear() {
        let flag = PriorityFlag::new(3);
        assert_eq!(flag.encode(false, || 0b0010), 0b0010);
        // A lower encoder can never smuggle the flag bit in.
        assert_eq!(flag.encode(false, || 0b1010), 0b0010);

        let seen = Cell::new(None);
        assert!(!flag.decode(0b0001, |meta| seen.set(Some(meta))));
        assert_eq!(seen.get(), Some(0b0001));
    }
}

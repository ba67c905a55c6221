//! Decorative tiles: beds, flower pots, item frames, signs and skulls.

use fastnbt::Value;

use super::{Tile, TileBase, TileKind, TileType};
use crate::document::{CompoundTag, DocumentError};

// -- Bed --

#[derive(Debug)]
pub struct Bed {
    base: TileBase,
    /// Dye color index.
    color: i8,
}

impl Bed {
    pub const TAG_COLOR: &'static str = "color";
    pub const DEFAULT_COLOR: i8 = 14;

    pub fn color(&self) -> i8 {
        self.color
    }

    pub fn set_color(&mut self, color: i8) {
        self.color = color & 0xF;
    }
}

impl Tile for Bed {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.set_color(nbt.get_or::<i8>(Self::TAG_COLOR, Self::DEFAULT_COLOR)?);
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(Self::TAG_COLOR, self.color);
    }
}

impl TileType for Bed {
    const KIND: TileKind = TileKind::new("Bed");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            color: Self::DEFAULT_COLOR,
        }
    }
}

// -- Flower pot --

#[derive(Debug)]
pub struct FlowerPot {
    base: TileBase,
    /// Legacy item id and damage of the plant, `None` when empty.
    plant: Option<(i16, i32)>,
}

impl FlowerPot {
    pub const TAG_ITEM: &'static str = "item";
    pub const TAG_ITEM_DATA: &'static str = "mData";

    pub fn plant(&self) -> Option<(i16, i32)> {
        self.plant
    }

    pub fn set_plant(&mut self, plant: Option<(i16, i32)>) {
        self.plant = plant.filter(|(id, _)| *id != 0);
    }
}

impl Tile for FlowerPot {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        let item = nbt.get::<i16>(Self::TAG_ITEM)?;
        let data = nbt.get_or::<i32>(Self::TAG_ITEM_DATA, 0)?;
        self.set_plant(item.map(|id| (id, data)));
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        if let Some((id, data)) = self.plant {
            nbt.put(Self::TAG_ITEM, id).put(Self::TAG_ITEM_DATA, data);
        }
    }
}

impl TileType for FlowerPot {
    const KIND: TileKind = TileKind::new("FlowerPot");

    fn new(base: TileBase) -> Self {
        Self { base, plant: None }
    }
}

// -- Item frame --

#[derive(Debug)]
pub struct ItemFrame {
    base: TileBase,
    item: Option<CompoundTag>,
    /// Eighth turns, 0..8.
    rotation: i8,
    drop_chance: f32,
}

impl ItemFrame {
    pub const TAG_ITEM: &'static str = "Item";
    pub const TAG_ITEM_ROTATION: &'static str = "ItemRotation";
    pub const TAG_ITEM_DROP_CHANCE: &'static str = "ItemDropChance";
    pub const ROTATIONS: i8 = 8;

    pub fn item(&self) -> Option<&CompoundTag> {
        self.item.as_ref()
    }

    pub fn set_item(&mut self, item: Option<CompoundTag>) {
        self.item = item;
    }

    pub fn rotation(&self) -> i8 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: i8) {
        self.rotation = rotation.rem_euclid(Self::ROTATIONS);
    }

    pub fn drop_chance(&self) -> f32 {
        self.drop_chance
    }
}

impl Tile for ItemFrame {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.item = match nbt.raw(Self::TAG_ITEM) {
            None => None,
            Some(value) => Some(CompoundTag::from_value(value.clone()).ok_or_else(|| {
                DocumentError::WrongType {
                    field: Self::TAG_ITEM.to_owned(),
                    expected: "compound",
                }
            })?),
        };
        self.set_rotation(nbt.get_or::<i8>(Self::TAG_ITEM_ROTATION, 0)?);
        self.drop_chance = nbt
            .get_or::<f32>(Self::TAG_ITEM_DROP_CHANCE, 1.0)?
            .clamp(0.0, 1.0);
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        if let Some(item) = &self.item {
            nbt.put(Self::TAG_ITEM, item.clone());
        }
        nbt.put(Self::TAG_ITEM_ROTATION, self.rotation)
            .put(Self::TAG_ITEM_DROP_CHANCE, self.drop_chance);
    }
}

impl TileType for ItemFrame {
    const KIND: TileKind = TileKind::new("ItemFrame");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            item: None,
            rotation: 0,
            drop_chance: 1.0,
        }
    }
}

// -- Sign --

#[derive(Debug)]
pub struct Sign {
    base: TileBase,
    lines: [String; 4],
}

impl Sign {
    pub const TAG_TEXT: &'static str = "Text";
    /// Per-line keys written by older versions.
    pub const TAG_LEGACY_LINES: [&'static str; 4] = ["Text1", "Text2", "Text3", "Text4"];

    pub fn lines(&self) -> &[String; 4] {
        &self.lines
    }

    pub fn set_line(&mut self, index: usize, text: impl Into<String>) {
        if let Some(line) = self.lines.get_mut(index) {
            *line = text.into();
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn set_text(&mut self, text: &str) {
        self.lines = Default::default();
        for (line, part) in self.lines.iter_mut().zip(text.split('\n')) {
            *line = part.to_owned();
        }
    }
}

impl Tile for Sign {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        if let Some(text) = nbt.get::<&str>(Self::TAG_TEXT)? {
            self.set_text(text);
        } else {
            for (line, key) in self.lines.iter_mut().zip(Self::TAG_LEGACY_LINES) {
                *line = nbt.get_or::<&str>(key, "")?.to_owned();
            }
        }
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(Self::TAG_TEXT, self.text());
    }
}

impl TileType for Sign {
    const KIND: TileKind = TileKind::new("Sign");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            lines: Default::default(),
        }
    }
}

// -- Skull --

#[derive(Debug)]
pub struct Skull {
    base: TileBase,
    skull_type: i8,
    /// Sixteenth turns when standing on the floor.
    rotation: i8,
}

impl Skull {
    pub const TAG_SKULL_TYPE: &'static str = "SkullType";
    pub const TAG_ROT: &'static str = "Rot";

    pub fn skull_type(&self) -> i8 {
        self.skull_type
    }

    pub fn rotation(&self) -> i8 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: i8) {
        self.rotation = rotation & 0xF;
    }
}

impl Tile for Skull {
    fn base(&self) -> &TileBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TileBase {
        &mut self.base
    }

    fn read_save_data(&mut self, nbt: &CompoundTag) -> Result<(), DocumentError> {
        self.skull_type = nbt.get_or::<i8>(Self::TAG_SKULL_TYPE, 0)?;
        self.set_rotation(nbt.get_or::<i8>(Self::TAG_ROT, 0)?);
        Ok(())
    }

    fn write_save_data(&self, nbt: &mut CompoundTag) {
        nbt.put(Self::TAG_SKULL_TYPE, self.skull_type)
            .put(Self::TAG_ROT, self.rotation);
    }
}

impl TileType for Skull {
    const KIND: TileKind = TileKind::new("Skull");

    fn new(base: TileBase) -> Self {
        Self {
            base,
            skull_type: 0,
            rotation: 0,
        }
    }
}

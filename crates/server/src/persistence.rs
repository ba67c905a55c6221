//! Tile persistence: self-describing documents and Anvil region storage.
//!
//! A saved tile is a [`CompoundTag`] carrying its save name (`id`), its
//! position (`x`, `y`, `z`) and whatever fields the tile type writes. Documents
//! are grouped per chunk into `block_entities` lists and stored in
//! `<dir>/region/r.X.Z.mca` files, so the output opens in vanilla region tools.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Seek};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tilecraft_engine::world::World;
use tilecraft_engine::world::position::ChunkPos;

use crate::document::CompoundTag;
use crate::tile::{TAG_ID, TAG_X, TAG_Y, TAG_Z, Tile, TileFactory};

/// DataVersion written into every saved chunk. 1.12.2 = 1343, the last
/// release with numeric block ids.
const DATA_VERSION: i32 = 1343;

// ── Documents ───────────────────────────────────────────────────────────────

/// Rebuild a tile from a saved document.
///
/// `Ok(None)` when the document has no `id` or names an unregistered type.
/// A known type with a corrupt document is an error.
pub fn create_from_document(
    factory: &TileFactory,
    world: Arc<World>,
    doc: &CompoundTag,
) -> Result<Option<Box<dyn Tile>>> {
    let Some(mut tile) = factory
        .instantiate_saved(world, doc)
        .context("reading tile position")?
    else {
        return Ok(None);
    };
    let (kind, pos) = (tile.kind(), tile.position());
    tile.read_save_data(doc)
        .with_context(|| format!("reading {} at {:?}", kind, pos))?;
    Ok(Some(tile))
}

/// Serialize a tile: save name and position first, then its own fields.
pub fn save_document(factory: &TileFactory, tile: &dyn Tile) -> Result<CompoundTag> {
    let id = factory.save_id_of(tile)?;
    let pos = tile.position();
    let coord = |v: i64, axis: &str| {
        i32::try_from(v).with_context(|| format!("{} coordinate {} out of range", axis, v))
    };

    let mut doc = CompoundTag::new();
    doc.put(TAG_ID, id)
        .put(TAG_X, coord(pos.x, TAG_X)?)
        .put(TAG_Y, coord(pos.y, TAG_Y)?)
        .put(TAG_Z, coord(pos.z, TAG_Z)?);
    tile.write_save_data(&mut doc);
    Ok(doc)
}

/// Outcome of loading a batch of documents.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub tiles: Vec<Box<dyn Tile>>,
    /// Documents with no id or an unregistered one.
    pub skipped: usize,
    /// Documents of a known type that could not be read.
    pub failed: usize,
}

impl LoadReport {
    fn absorb(&mut self, other: LoadReport) {
        self.tiles.extend(other.tiles);
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Load every document of a chunk. Neither unknown nor corrupt documents
/// abort the batch.
pub fn load_chunk_tiles<'a>(
    factory: &TileFactory,
    world: &Arc<World>,
    docs: impl IntoIterator<Item = &'a CompoundTag>,
) -> LoadReport {
    let mut report = LoadReport::default();
    for doc in docs {
        match create_from_document(factory, Arc::clone(world), doc) {
            Ok(Some(tile)) => report.tiles.push(tile),
            Ok(None) => {
                tracing::debug!("Skipping tile with unknown id {:?}", doc.raw(TAG_ID));
                report.skipped += 1;
            }
            Err(e) => {
                tracing::warn!("Dropping corrupt tile document: {:#}", e);
                report.failed += 1;
            }
        }
    }
    report
}

// ── Region storage ──────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug)]
struct ChunkTilesNbt {
    #[serde(rename = "DataVersion")]
    data_version: i32,
    #[serde(rename = "xPos")]
    x_pos: i32,
    #[serde(rename = "zPos")]
    z_pos: i32,
    #[serde(default)]
    block_entities: Vec<CompoundTag>,
}

/// Write `tiles` to Anvil region files under `<dir>/region/`.
///
/// Every chunk holding at least one of `tiles` is rewritten in full, so a
/// chunk whose tiles are all closed ends up with an empty `block_entities`
/// list. Chunks none of `tiles` live in are left as they are. Closed tiles
/// are not saved. Returns the number of documents written.
pub fn save_tiles(factory: &TileFactory, tiles: &[Box<dyn Tile>], dir: &Path) -> Result<usize> {
    let start = Instant::now();

    let mut chunks: HashMap<ChunkPos, Vec<CompoundTag>> = HashMap::new();
    for tile in tiles {
        let docs = chunks.entry(tile.position().chunk()).or_default();
        if tile.is_closed() {
            continue;
        }
        let doc = save_document(factory, &**tile)
            .with_context(|| format!("saving {} at {:?}", tile.kind(), tile.position()))?;
        docs.push(doc);
    }

    let mut regions: HashMap<(i32, i32), Vec<(ChunkPos, bool, Vec<u8>)>> = HashMap::new();
    let mut total_docs = 0usize;
    for (pos, docs) in chunks {
        total_docs += docs.len();
        let emptied = docs.is_empty();
        let nbt = ChunkTilesNbt {
            data_version: DATA_VERSION,
            x_pos: pos.x,
            z_pos: pos.z,
            block_entities: docs,
        };
        let bytes = fastnbt::to_bytes(&nbt)
            .with_context(|| format!("serializing chunk ({}, {})", pos.x, pos.z))?;
        regions.entry(pos.region()).or_default().push((pos, emptied, bytes));
    }

    let region_dir = dir.join("region");
    let mut written = 0usize;
    for ((rx, rz), chunks) in &regions {
        let path = region_dir.join(format!("r.{}.{}.mca", rx, rz));

        let mut region = if path.exists() {
            let file_bytes =
                fs::read(&path).with_context(|| format!("reading region r.{}.{}", rx, rz))?;
            fastanvil::Region::from_stream(Cursor::new(file_bytes))
                .with_context(|| format!("parsing region r.{}.{}", rx, rz))?
        } else if chunks.iter().all(|(_, emptied, _)| *emptied) {
            // Nothing was ever stored here.
            continue;
        } else {
            fs::create_dir_all(&region_dir)?;
            fastanvil::Region::new(Cursor::new(Vec::new()))
                .with_context(|| format!("creating region r.{}.{}", rx, rz))?
        };

        for (pos, _, bytes) in chunks {
            let (local_x, local_z) = pos.region_local();
            region
                .write_chunk(local_x, local_z, bytes)
                .with_context(|| format!("writing chunk ({}, {})", pos.x, pos.z))?;
        }

        let mut cursor = region.into_inner()?;
        let len = cursor.stream_position()?;
        let data = cursor.into_inner();
        fs::write(&path, &data[..len as usize])?;
        written += 1;
    }

    if written == 0 {
        tracing::info!("Tile save: nothing to save");
    } else {
        tracing::info!(
            "Tiles saved: {} documents across {} regions ({:.2?})",
            total_docs,
            written,
            start.elapsed(),
        );
    }
    Ok(total_docs)
}

/// Load every tile stored under `<dir>/region/` into `world`.
///
/// A missing region directory yields an empty report. Unreadable region
/// files are an error. A chunk that cannot be read or decoded counts as one
/// failure, and bad documents inside readable chunks are counted one by one.
pub fn load_tiles(factory: &TileFactory, world: &Arc<World>, dir: &Path) -> Result<LoadReport> {
    let region_dir = dir.join("region");
    let mut report = LoadReport::default();
    if !region_dir.is_dir() {
        return Ok(report);
    }

    let start = Instant::now();
    let mut region_count = 0usize;

    for entry in fs::read_dir(&region_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((rx, rz)) = parse_region_name(name) else {
            tracing::warn!("Skipping unexpected file in region dir: {}", name);
            continue;
        };

        let file = fs::File::open(&path)
            .with_context(|| format!("opening region file {}", path.display()))?;
        let mut region = fastanvil::Region::from_stream(file)
            .with_context(|| format!("parsing region file {}", path.display()))?;

        for x in 0..32usize {
            for z in 0..32usize {
                let bytes = match region.read_chunk(x, z) {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::warn!(
                            "Skipping unreadable chunk ({}, {}) in r.{}.{}: {}",
                            x, z, rx, rz, e
                        );
                        report.failed += 1;
                        continue;
                    }
                };
                match fastnbt::from_bytes::<ChunkTilesNbt>(&bytes) {
                    Ok(chunk) => {
                        report.absorb(load_chunk_tiles(factory, world, &chunk.block_entities))
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Skipping malformed chunk ({}, {}) in r.{}.{}: {}",
                            x, z, rx, rz, e
                        );
                        report.failed += 1;
                    }
                }
            }
        }
        region_count += 1;
    }

    tracing::info!(
        "Tiles loaded: {} from {} regions, {} skipped, {} failed ({:.2?})",
        report.tiles.len(),
        region_count,
        report.skipped,
        report.failed,
        start.elapsed(),
    );
    Ok(report)
}

/// `r.X.Z.mca` → `(X, Z)`.
fn parse_region_name(name: &str) -> Option<(i32, i32)> {
    let coords = name.strip_prefix("r.")?.strip_suffix(".mca")?;
    let (x, z) = coords.split_once('.')?;
    Some((x.parse().ok()?, z.parse().ok()?))
}

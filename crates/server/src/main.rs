use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tilecraft_engine::state::HorizontalFacing;
use tilecraft_engine::world::World;
use tilecraft_engine::world::block::BlockId;
use tilecraft_engine::world::position::BlockPos;
use tilecraft_server::block::{self, Block, FacingBlock, KnownBlock};
use tilecraft_server::persistence;
use tilecraft_server::tile::{Chest, Furnace, Note, Sign, TileFactory, TileType};

#[derive(Parser, Debug)]
#[command(name = "tilecraft")]
#[command(about = "Legacy block states and tile entity storage", long_about = None)]
struct Args {
    /// World directory; tiles live in `<world>/region/*.mca`
    #[arg(long, global = true, default_value = "world")]
    world: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Place a few tiles, save them and load them back
    Demo,
    /// Count stored tiles by type
    Inspect,
    /// Print every stored tile document as JSON
    Dump,
    /// Decode a legacy block state
    Meta {
        /// Legacy block type id
        type_id: u16,
        /// Metadata nibble (0-15)
        meta: u8,
    },
    /// List every save name the registry resolves
    Aliases,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut factory = TileFactory::new();
    factory.seal();

    match args.command {
        Commands::Demo => run_demo(&factory, &args.world),
        Commands::Inspect => inspect(&factory, &args.world),
        Commands::Dump => dump(&factory, &args.world),
        Commands::Meta { type_id, meta } => {
            describe_state(type_id, meta);
            Ok(())
        }
        Commands::Aliases => {
            for (name, kind) in factory.aliases() {
                let primary = factory.save_id(kind).is_ok_and(|id| id == name);
                println!("{:<24} {}{}", name, kind, if primary { " (saved as)" } else { "" });
            }
            Ok(())
        }
    }
}

fn run_demo(factory: &TileFactory, dir: &Path) -> Result<()> {
    tracing::info!("Tilecraft demo: writing tiles to {}", dir.display());
    let world = Arc::new(World::new());

    let chest_pos = BlockPos::new(8, 64, 8);
    let mut chest_block = FacingBlock::new(block::CHEST);
    chest_block.set_facing(HorizontalFacing::East);
    world.set_block(chest_pos, chest_block.state_id());
    world.set_block(chest_pos.offset(1, 0, 0), chest_block.state_id());

    let mut chest = factory.create(Chest::KIND, Arc::clone(&world), chest_pos)?;
    if let Some(chest) = chest.downcast_mut::<Chest>() {
        chest.set_custom_name(Some("Demo loot".into()));
        chest.pair_with(chest_pos.offset(1, 0, 0));
    }

    let furnace_pos = BlockPos::new(10, 64, 8);
    world.set_block(furnace_pos, FacingBlock::new(block::FURNACE).state_id());
    let mut furnace = factory.create(Furnace::KIND, Arc::clone(&world), furnace_pos)?;
    if let Some(furnace) = furnace.downcast_mut::<Furnace>() {
        furnace.ignite(1600);
        furnace.sync_block();
    }
    tracing::info!("Furnace block is now {:?}", world.get_block(furnace_pos));

    let mut note = factory.create(Note::KIND, Arc::clone(&world), BlockPos::new(-20, 70, 300))?;
    if let Some(note) = note.downcast_mut::<Note>() {
        note.set_pitch(12);
    }

    let mut sign = factory.create(Sign::KIND, Arc::clone(&world), BlockPos::new(9, 65, 8))?;
    if let Some(sign) = sign.downcast_mut::<Sign>() {
        sign.set_line(0, "Tilecraft");
        sign.set_line(1, "demo");
    }

    let tiles = [chest, furnace, note, sign];
    let saved = persistence::save_tiles(factory, &tiles, dir)?;

    let reloaded = Arc::new(World::new());
    let report = persistence::load_tiles(factory, &reloaded, dir)?;
    tracing::info!(
        "Saved {} tiles, reloaded {} ({} skipped, {} failed)",
        saved,
        report.tiles.len(),
        report.skipped,
        report.failed,
    );
    for tile in &report.tiles {
        tracing::info!("  {} at {:?}", tile.kind(), tile.position());
    }
    Ok(())
}

fn inspect(factory: &TileFactory, dir: &Path) -> Result<()> {
    let world = Arc::new(World::new());
    let report = persistence::load_tiles(factory, &world, dir)
        .with_context(|| format!("loading tiles from {}", dir.display()))?;

    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for tile in &report.tiles {
        *counts.entry(tile.kind().name()).or_default() += 1;
    }
    for (kind, count) in &counts {
        println!("{:<16} {}", kind, count);
    }
    println!(
        "{} tiles, {} skipped, {} failed",
        report.tiles.len(),
        report.skipped,
        report.failed
    );
    Ok(())
}

fn dump(factory: &TileFactory, dir: &Path) -> Result<()> {
    let world = Arc::new(World::new());
    let report = persistence::load_tiles(factory, &world, dir)
        .with_context(|| format!("loading tiles from {}", dir.display()))?;
    let docs = report
        .tiles
        .iter()
        .map(|tile| persistence::save_document(factory, &**tile))
        .collect::<Result<Vec<_>>>()?;
    let json = serde_json::to_string_pretty(&docs).context("encoding tile documents as JSON")?;
    println!("{}", json);
    Ok(())
}

fn describe_state(type_id: u16, meta: u8) {
    let state = BlockId::from_legacy(type_id, meta);
    match KnownBlock::from_state(state) {
        Some(decoded) => {
            let canonical = decoded.state_id();
            println!("{:?}", decoded);
            if canonical != state {
                println!(
                    "meta {} is not canonical; re-encodes as {}",
                    state.meta(),
                    canonical.meta()
                );
            }
        }
        None => println!("block {} has no known meta layout", state.type_id()),
    }
}

pub mod state;
pub mod world;

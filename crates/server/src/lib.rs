pub mod block;
pub mod document;
pub mod persistence;
pub mod tile;

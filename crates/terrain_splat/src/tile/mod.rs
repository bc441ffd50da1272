//! Tile textures: materialization, cross-tile welding and the texture store.
pub mod materialize;
pub mod store;
pub mod texture;
pub mod weld;

pub use materialize::{materialize, MaterializeStep, Materializer};
pub use store::{NeighborAccess, TileTextureStore};
pub use texture::{NamedTexture, TextureFormat, TileTexture};
pub use weld::{weld_texture, weld_to_neighbors, WeldNeighbors};

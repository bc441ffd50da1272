//! Splat-control assembly: layers, packed buffers, channel packing and cluster ranking.
pub mod buffer;
pub mod cluster;
pub mod layer;
pub mod mode;
pub mod packer;

pub use buffer::{CutoutBuffer, NamedBuffer, PackedBuffer, PackedOutput};
pub use cluster::{rank_clusters, ClusterLookup, RankOptions, StaticClusters};
pub use layer::{ChannelSlot, Layer, CHANNELS_PER_TEXTURE};
pub use mode::SplatMode;
pub use packer::{
    accumulate_channels, collect_contributions, collect_cutouts, pack_channels, ChannelPacker,
    Contribution,
};

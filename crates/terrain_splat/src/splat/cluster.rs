//! Dual-layer cluster ranking.
//!
//! Instead of packing every layer into its own channel, each cell keeps only the two layers
//! with the largest masked weight. Both are remapped to concrete texture indices through a
//! [`ClusterLookup`] and encoded into a single control color:
//! `(bot_index / 255, top_index / 255, 1 - blend, 1)`.
//!
//! Naming follows the established encoding: `bot` is the layer with the *largest* weight and
//! `top` the runner-up, until the final swap orders them by texture index.
use glam::{Vec3, Vec4};
use tracing::warn;

use super::buffer::PackedBuffer;
use super::packer::Contribution;
use crate::generator::{EventSink, GenerateContext, PipelineEvent, PipelineEventKind, ResultStore};

/// Height ratio used when the tile has no height grid.
pub const DEFAULT_HEIGHT_RATIO: f32 = 0.5;

/// Maps a logical layer index to a concrete cluster texture index.
///
/// The answer may depend on the cell: `position` is the world position scaled by the noise
/// scale, `normal` the surface normal and `height_ratio` the normalized terrain height.
pub trait ClusterLookup {
    /// Number of clusters. Logical indices at or above this fall back to cluster 0.
    fn cluster_count(&self) -> usize;

    fn texture_index(
        &self,
        cluster: usize,
        position: mint::Vector3<f32>,
        normal: mint::Vector3<f32>,
        height_ratio: f32,
    ) -> usize;
}

/// Lookup with one fixed texture index per cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticClusters {
    indices: Vec<usize>,
}

impl StaticClusters {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Cluster `i` maps to texture `i`.
    pub fn identity(count: usize) -> Self {
        Self {
            indices: (0..count).collect(),
        }
    }
}

impl ClusterLookup for StaticClusters {
    fn cluster_count(&self) -> usize {
        self.indices.len()
    }

    fn texture_index(
        &self,
        cluster: usize,
        _position: mint::Vector3<f32>,
        _normal: mint::Vector3<f32>,
        _height_ratio: f32,
    ) -> usize {
        self.indices.get(cluster).copied().unwrap_or(0)
    }
}

/// Settings of one ranking pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankOptions {
    pub noise_scale: f32,
    pub smooth_falloff: bool,
}

/// Ease curve applied to blend weights when smoothing is on. Inverse of `3x² - 2x³`.
#[inline]
pub fn smooth_blend(blend: f32) -> f32 {
    blend.sqrt() * (1.0 - blend) + blend * blend * blend
}

/// World position of a global cell, as fed to the cluster lookup before scaling.
#[inline]
pub fn cell_world_position(ctx: &GenerateContext, x: i32, z: i32) -> Vec3 {
    let resolution = ctx.tile_size.resolution.max(1) as f32;
    Vec3::new(
        x as f32 / resolution * ctx.rect.size.x as f32,
        0.0,
        z as f32 / resolution * ctx.rect.size.z as f32,
    )
}

/// Rank the two strongest contributions per cell and encode them into a control buffer.
///
/// Returns `[control, params]`; the params buffer is left zeroed.
pub fn rank_clusters(
    ctx: &GenerateContext,
    results: &ResultStore,
    contributions: &[Contribution<'_>],
    lookup: &dyn ClusterLookup,
    options: RankOptions,
    sink: &mut dyn EventSink,
) -> [PackedBuffer; 2] {
    let rect = ctx.rect;
    let mut control = PackedBuffer::new(rect);
    let params = PackedBuffer::new(rect);
    if contributions.is_empty() {
        return [control, params];
    }

    let cluster_count = lookup.cluster_count();
    let normal: mint::Vector3<f32> = Vec3::Y.into();
    let mut fallback_cells = 0usize;

    for (pos, cell) in rect.cells().enumerate() {
        let (mut bot_idx, mut bot_weight) = (0usize, 0.0f32);
        let (mut top_idx, mut top_weight) = (0usize, 0.0f32);
        for (i, contribution) in contributions.iter().enumerate() {
            let value = contribution.value(cell.x, cell.z);
            if value > bot_weight {
                top_weight = bot_weight;
                top_idx = bot_idx;
                bot_weight = value;
                bot_idx = i;
            } else if value > top_weight {
                top_weight = value;
                top_idx = i;
            }
        }

        let mut bot_cluster = contributions[bot_idx].layer.index;
        let mut top_cluster = contributions[top_idx].layer.index;
        if bot_cluster >= cluster_count || top_cluster >= cluster_count {
            bot_cluster = 0;
            top_cluster = 0;
            fallback_cells += 1;
        }

        let position: mint::Vector3<f32> =
            (cell_world_position(ctx, cell.x, cell.z) * options.noise_scale).into();
        let height_ratio = results
            .heights()
            .and_then(|h| h.try_get(cell.x, cell.z))
            .unwrap_or(DEFAULT_HEIGHT_RATIO);

        let mut top = lookup.texture_index(top_cluster, position, normal, height_ratio);
        let mut bot = lookup.texture_index(bot_cluster, position, normal, height_ratio);
        if bot > top {
            std::mem::swap(&mut bot, &mut top);
            std::mem::swap(&mut bot_weight, &mut top_weight);
        }

        let mut blend = (bot_weight / (top_weight + bot_weight).max(0.01)).min(1.0);
        if options.smooth_falloff {
            blend = smooth_blend(blend);
        }

        control.set(
            pos,
            Vec4::new(bot as f32 / 255.0, top as f32 / 255.0, 1.0 - blend, 1.0),
        );
    }

    if fallback_cells > 0 {
        warn!(
            "{} cells referenced clusters outside 0..{}; used cluster 0.",
            fallback_cells, cluster_count
        );
        if sink.wants(PipelineEventKind::ClusterFallback) {
            sink.send(PipelineEvent::ClusterFallback {
                cells: fallback_cells,
            });
        }
    }

    [control, params]
}

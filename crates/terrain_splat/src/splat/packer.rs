//! Channel packing.
//!
//! Packing runs once per tile after every producer has generated. It is an explicit
//! reduction: [`collect_contributions`] gathers the `(layer grid, biome mask, slot)` triples
//! of all enabled producers as a value, and [`accumulate_channels`] folds them into freshly
//! allocated buffers. Contributions to the same slot add up.
use glam::Vec4;
use tracing::{debug, info, warn};

use super::buffer::{CutoutBuffer, NamedBuffer, PackedBuffer, PackedOutput};
use super::cluster::{rank_clusters, ClusterLookup, RankOptions};
use super::layer::Layer;
use crate::config::SplatConfig;
use crate::generator::{
    report_cancelled, EventSink, GenerateContext, Generator, PipelineEvent, PipelineEventKind,
    ResultStore, SkipReason, SplatOutput, StopSignal,
};
use crate::raster::{CoordRect, Grid};

/// One layer output of one producer, ready to be packed.
#[derive(Clone, Copy, Debug)]
pub struct Contribution<'a> {
    pub producer: &'a str,
    pub layer: &'a Layer,
    pub grid: &'a Grid,
    /// Biome mask of the producer, if it declares one.
    pub mask: Option<&'a Grid>,
}

impl Contribution<'_> {
    /// Masked layer value at a global cell. Cells outside either grid count as 0.
    #[inline]
    pub fn value(&self, x: i32, z: i32) -> f32 {
        let value = self.grid.try_get(x, z).unwrap_or(0.0);
        match self.mask {
            Some(mask) => value * mask.try_get(x, z).unwrap_or(0.0),
            None => value,
        }
    }
}

fn skip_producer(producer: &SplatOutput, reason: SkipReason, sink: &mut dyn EventSink) {
    debug!("Producer '{}' skipped: {:?}.", producer.id(), reason);
    if sink.wants(PipelineEventKind::ProducerSkipped) {
        sink.send(PipelineEvent::ProducerSkipped {
            producer: producer.id().to_string(),
            reason,
        });
    }
}

fn skip_layer(producer: &SplatOutput, layer: &Layer, reason: SkipReason, sink: &mut dyn EventSink) {
    debug!(
        "Layer '{}' of producer '{}' skipped: {:?}.",
        layer.name,
        producer.id(),
        reason
    );
    if sink.wants(PipelineEventKind::LayerSkipped) {
        sink.send(PipelineEvent::LayerSkipped {
            producer: producer.id().to_string(),
            layer: layer.name.clone(),
            reason,
        });
    }
}

/// Gather the non-empty layer outputs of all enabled producers, in producer order.
///
/// A producer whose biome mask is declared but missing or empty contributes nothing. Returns
/// `None` when `stop` fires.
pub fn collect_contributions<'a>(
    results: &'a ResultStore,
    producers: &'a [SplatOutput],
    stop: &dyn StopSignal,
    sink: &mut dyn EventSink,
) -> Option<Vec<Contribution<'a>>> {
    let mut contributions = Vec::new();
    for producer in producers {
        if !producer.is_enabled() {
            skip_producer(producer, SkipReason::Disabled, sink);
            continue;
        }

        let mask = match producer.biome_mask() {
            Some(port) => match results.get(port) {
                None => {
                    skip_producer(producer, SkipReason::MissingBiomeMask, sink);
                    continue;
                }
                Some(mask) if mask.is_empty() => {
                    skip_producer(producer, SkipReason::EmptyBiomeMask, sink);
                    continue;
                }
                Some(mask) => Some(mask),
            },
            None => None,
        };

        for layer in producer.layers() {
            if stop.should_stop(0.0) {
                return None;
            }
            let Some(grid) = results.get(&layer.output) else {
                skip_layer(producer, layer, SkipReason::MissingOutput, sink);
                continue;
            };
            if grid.is_empty() {
                skip_layer(producer, layer, SkipReason::EmptyOutput, sink);
                continue;
            }
            contributions.push(Contribution {
                producer: producer.id(),
                layer,
                grid,
                mask,
            });
        }
    }
    Some(contributions)
}

/// Fold `contributions` into `texture_count` zeroed buffers over `rect`.
///
/// Contributions whose texture slot is beyond `texture_count` are dropped.
pub fn accumulate_channels(
    rect: CoordRect,
    contributions: &[Contribution<'_>],
    texture_count: usize,
) -> Vec<PackedBuffer> {
    contributions.iter().fold(
        vec![PackedBuffer::new(rect); texture_count],
        |mut buffers, contribution| {
            let slot = contribution.layer.slot();
            let Some(buffer) = buffers.get_mut(slot.texture) else {
                warn!(
                    "Layer '{}' of producer '{}' targets texture {} but only {} exist; dropped.",
                    contribution.layer.name, contribution.producer, slot.texture, texture_count
                );
                return buffers;
            };
            for (pos, cell) in rect.cells().enumerate() {
                let value = contribution.value(cell.x, cell.z);
                if value != 0.0 {
                    buffer.add(pos, slot.channel, value);
                }
            }
            buffers
        },
    )
}

/// Cutout masks of all enabled producers that declare one, each as `(m, m, m, m)`.
pub fn collect_cutouts(
    rect: CoordRect,
    results: &ResultStore,
    producers: &[SplatOutput],
) -> Vec<CutoutBuffer> {
    producers
        .iter()
        .filter(|p| p.is_enabled())
        .filter_map(|producer| {
            let port = producer.cutout_input()?;
            let Some(mask) = results.get(port) else {
                debug!(
                    "Producer '{}' has no cutout mask on '{}'.",
                    producer.id(),
                    port
                );
                return None;
            };
            let mut buffer = PackedBuffer::new(rect);
            for (pos, cell) in rect.cells().enumerate() {
                buffer.set(pos, Vec4::splat(mask.try_get(cell.x, cell.z).unwrap_or(0.0)));
            }
            Some(CutoutBuffer {
                producer: producer.id().to_string(),
                buffer,
            })
        })
        .collect()
}

/// Builds the packed buffers of one tile from all splat producers.
pub struct ChannelPacker<'a> {
    config: &'a SplatConfig,
    clusters: Option<&'a dyn ClusterLookup>,
}

impl<'a> ChannelPacker<'a> {
    pub fn new(config: &'a SplatConfig) -> Self {
        Self {
            config,
            clusters: None,
        }
    }

    /// Cluster lookup used by cluster-ranking modes.
    pub fn with_clusters(mut self, clusters: &'a dyn ClusterLookup) -> Self {
        self.clusters = Some(clusters);
        self
    }

    /// Number of control textures the enabled producers need under the configured mode.
    pub fn texture_count(&self, producers: &[SplatOutput]) -> usize {
        let max_index = producers
            .iter()
            .filter(|p| p.is_enabled())
            .filter_map(SplatOutput::max_channel_index)
            .max()
            .unwrap_or(0);
        self.config.texture_count(max_index)
    }

    /// Pack all producers for the tile described by `ctx`. Returns `None` when stopped.
    pub fn pack(
        &self,
        ctx: &GenerateContext,
        results: &ResultStore,
        producers: &[SplatOutput],
        stop: &dyn StopSignal,
        sink: &mut dyn EventSink,
    ) -> Option<PackedOutput> {
        if stop.should_stop(0.0) {
            report_cancelled("pack", sink);
            return None;
        }

        let Some(contributions) = collect_contributions(results, producers, stop, sink) else {
            report_cancelled("pack", sink);
            return None;
        };

        let buffers = if self.config.mode.uses_clusters() {
            self.rank(ctx, results, &contributions, sink)
        } else {
            let count = self.texture_count(producers);
            accumulate_channels(ctx.rect, &contributions, count)
        };

        if stop.should_stop(0.5) {
            report_cancelled("pack", sink);
            return None;
        }

        let names = self.config.texture_names(buffers.len());
        if names.len() < buffers.len() {
            warn!(
                "Only {} of {} control textures have names; the rest are dropped.",
                names.len(),
                buffers.len()
            );
        }
        let splats: Vec<NamedBuffer> = names
            .into_iter()
            .zip(buffers)
            .map(|(name, buffer)| NamedBuffer { name, buffer })
            .collect();
        let cutouts = collect_cutouts(ctx.rect, results, producers);

        if stop.should_stop(1.0) {
            report_cancelled("pack", sink);
            return None;
        }

        info!(
            "Packed {} contributions into {} control and {} cutout buffers.",
            contributions.len(),
            splats.len(),
            cutouts.len()
        );
        Some(PackedOutput { splats, cutouts })
    }

    fn rank(
        &self,
        ctx: &GenerateContext,
        results: &ResultStore,
        contributions: &[Contribution<'_>],
        sink: &mut dyn EventSink,
    ) -> Vec<PackedBuffer> {
        let Some(clusters) = self.clusters else {
            warn!("Cluster mode without a cluster lookup; nothing packed.");
            return Vec::new();
        };
        if clusters.cluster_count() == 0 || contributions.is_empty() {
            debug!("No clusters or no contributions; nothing ranked.");
            return Vec::new();
        }
        let options = RankOptions {
            noise_scale: self.config.cluster_noise_scale,
            smooth_falloff: self.config.smooth_falloff,
        };
        rank_clusters(ctx, results, contributions, clusters, options, sink).into()
    }
}

/// Pack `producers` with channel packing or cluster ranking, as configured.
pub fn pack_channels(
    ctx: &GenerateContext,
    results: &ResultStore,
    producers: &[SplatOutput],
    config: &SplatConfig,
    clusters: Option<&dyn ClusterLookup>,
    stop: &dyn StopSignal,
    sink: &mut dyn EventSink,
) -> Option<PackedOutput> {
    let mut packer = ChannelPacker::new(config);
    if let Some(clusters) = clusters {
        packer = packer.with_clusters(clusters);
    }
    packer.pack(ctx, results, producers, stop, sink)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::generator::events::VecSink;
    use crate::generator::{GeneratorState, TileSize};
    use crate::splat::{SplatMode, StaticClusters};

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    fn rect() -> CoordRect {
        CoordRect::new(0, 0, 2, 2)
    }

    fn ctx() -> GenerateContext {
        GenerateContext::new(rect(), TileSize::new(2, 10.0, 10.0), 0)
    }

    fn single_layer(id: &str, output: &str, index: usize) -> SplatOutput {
        SplatOutput::new(id).with_layer(Layer::new(output, output).with_index(index))
    }

    #[test]
    fn overlapping_producers_accumulate() {
        let mut results = ResultStore::new();
        results.commit("a", Grid::filled(rect(), 0.4));
        results.commit("mask_a", Grid::filled(rect(), 0.5));
        results.commit("b", Grid::filled(rect(), 0.6));
        results.commit("mask_b", Grid::filled(rect(), 1.0));
        let producers = vec![
            single_layer("pa", "a", 5).with_biome_mask("mask_a"),
            single_layer("pb", "b", 5).with_biome_mask("mask_b"),
        ];

        let config = SplatConfig::default().with_control_texture_names(["_C0", "_C1"]);
        let out = pack_channels(&ctx(), &results, &producers, &config, None, &(), &mut ())
            .expect("not stopped");

        assert_eq!(out.splats.len(), 2);
        let cell = out.splat("_C1").expect("second texture").get(1, 1);
        approx_eq(cell.y, 0.4 * 0.5 + 0.6 * 1.0);
        assert_eq!(out.splat("_C0").map(|b| b.get(0, 0)), Some(Vec4::ZERO));
    }

    #[test]
    fn missing_or_empty_biome_skips_producer() {
        let mut results = ResultStore::new();
        results.commit("a", Grid::filled(rect(), 1.0));
        results.commit("empty_mask", Grid::new(rect()));
        let producers = vec![
            single_layer("missing", "a", 0).with_biome_mask("nope"),
            single_layer("empty", "a", 0).with_biome_mask("empty_mask"),
            single_layer("off", "a", 0).with_state(GeneratorState::Disabled),
        ];
        let mut sink = VecSink::new();
        let contributions =
            collect_contributions(&results, &producers, &(), &mut sink).expect("not stopped");
        assert!(contributions.is_empty());
        assert_eq!(sink.count(PipelineEventKind::ProducerSkipped), 3);
        assert!(sink.as_slice().contains(&PipelineEvent::ProducerSkipped {
            producer: "empty".into(),
            reason: SkipReason::EmptyBiomeMask,
        }));
    }

    #[test]
    fn empty_layer_outputs_are_skipped() {
        let mut results = ResultStore::new();
        results.commit("zero", Grid::new(rect()));
        let producers = vec![SplatOutput::new("p")
            .with_layer(Layer::new("zero", "zero"))
            .with_layer(Layer::new("gone", "gone").with_index(1))];
        let mut sink = VecSink::new();
        let contributions =
            collect_contributions(&results, &producers, &(), &mut sink).expect("not stopped");
        assert!(contributions.is_empty());
        assert_eq!(sink.count(PipelineEventKind::LayerSkipped), 2);
    }

    #[test]
    fn rtp_caps_texture_count() {
        let mut results = ResultStore::new();
        results.commit("far", Grid::filled(rect(), 1.0));
        let producers = vec![single_layer("p", "far", 14)];
        let config = SplatConfig::new(SplatMode::Rtp);
        let out = pack_channels(&ctx(), &results, &producers, &config, None, &(), &mut ())
            .expect("not stopped");
        let names: Vec<&str> = out.splats.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["_Control1", "_Control2", "_Control3"]);
        assert!(out
            .splats
            .iter()
            .all(|b| b.buffer.cells().iter().all(|c| *c == Vec4::ZERO)));
    }

    #[test]
    fn cluster_mode_ranks_instead_of_packing() {
        let mut results = ResultStore::new();
        results.commit("l0", Grid::filled(rect(), 0.1));
        results.commit("l1", Grid::filled(rect(), 0.9));
        results.commit("l2", Grid::filled(rect(), 0.5));
        let producers = vec![SplatOutput::new("p")
            .with_layer(Layer::new("l0", "l0"))
            .with_layer(Layer::new("l1", "l1").with_index(1))
            .with_layer(Layer::new("l2", "l2").with_index(2))];
        let config = SplatConfig::new(SplatMode::MegaSplat);
        let clusters = StaticClusters::identity(3);
        let out = pack_channels(
            &ctx(),
            &results,
            &producers,
            &config,
            Some(&clusters),
            &(),
            &mut (),
        )
        .expect("not stopped");
        let control = out.splat("_SplatControl").expect("control").get(0, 1);
        approx_eq(control.x, 1.0 / 255.0);
        approx_eq(control.y, 2.0 / 255.0);
        assert!(out.splat("_SplatParams").is_some());
    }

    #[test]
    fn cluster_mode_without_clusters_packs_nothing() {
        let mut results = ResultStore::new();
        results.commit("l0", Grid::filled(rect(), 1.0));
        let producers = vec![single_layer("p", "l0", 0)];
        let config = SplatConfig::new(SplatMode::MegaSplat);
        let out = pack_channels(
            &ctx(),
            &results,
            &producers,
            &config,
            Some(&StaticClusters::default()),
            &(),
            &mut (),
        )
        .expect("not stopped");
        assert!(out.splats.is_empty());
    }

    #[test]
    fn cutouts_are_per_producer() {
        let mut results = ResultStore::new();
        results.commit("cut", Grid::filled(rect(), 0.25));
        let producers = vec![
            single_layer("a", "x", 0).with_cutout("cut"),
            single_layer("b", "x", 0).with_cutout("missing"),
            single_layer("c", "x", 0),
        ];
        let cutouts = collect_cutouts(rect(), &results, &producers);
        assert_eq!(cutouts.len(), 1);
        assert_eq!(cutouts[0].producer, "a");
        assert_eq!(cutouts[0].buffer.get(1, 0), Vec4::splat(0.25));
    }

    #[test]
    fn stop_during_collection_returns_none() {
        let mut results = ResultStore::new();
        results.commit("a", Grid::filled(rect(), 1.0));
        let producers = vec![single_layer("p", "a", 0)];
        let polls = Cell::new(0);
        let stop = |_p: f32| {
            polls.set(polls.get() + 1);
            polls.get() > 1
        };
        let mut sink = VecSink::new();
        let config = SplatConfig::default();
        let packed = pack_channels(&ctx(), &results, &producers, &config, None, &stop, &mut sink);
        assert!(packed.is_none());
        assert_eq!(sink.count(PipelineEventKind::Cancelled), 1);
    }
}

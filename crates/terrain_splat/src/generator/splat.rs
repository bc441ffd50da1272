//! Splat producer.
//!
//! A [`SplatOutput`] owns an ordered list of [`Layer`]s. Its generate step blends the layer
//! inputs back to front and commits one coverage grid per layer. Packing into control
//! textures happens later, once per tile, in [`crate::splat::packer`].
use tracing::warn;

use super::{
    commit_output, load_input_or_neutral, report_cancelled, EventSink, GenerateContext,
    Generator, GeneratorState, PortId, ResultStore, StopSignal,
};
use crate::raster::{blend_layers, Grid};
use crate::splat::Layer;

pub struct SplatOutput {
    id: String,
    state: GeneratorState,
    layers: Vec<Layer>,
    biome_mask: Option<PortId>,
    cutout_input: Option<PortId>,
}

impl SplatOutput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: GeneratorState::Enabled,
            layers: Vec::new(),
            biome_mask: None,
            cutout_input: None,
        }
    }

    /// Append a layer. The first layer added is the background.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Restrict the producer to a biome. Packing skips it while the mask is missing or empty.
    pub fn with_biome_mask(mut self, port: impl Into<PortId>) -> Self {
        self.biome_mask = Some(port.into());
        self
    }

    /// Read a cutout mask from `port` at packing time.
    pub fn with_cutout(mut self, port: impl Into<PortId>) -> Self {
        self.cutout_input = Some(port.into());
        self
    }

    pub fn with_state(mut self, state: GeneratorState) -> Self {
        self.state = state;
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut Vec<Layer> {
        &mut self.layers
    }

    pub fn biome_mask(&self) -> Option<&str> {
        self.biome_mask.as_deref()
    }

    pub fn cutout_input(&self) -> Option<&str> {
        self.cutout_input.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.state == GeneratorState::Enabled
    }

    pub fn set_state(&mut self, state: GeneratorState) {
        self.state = state;
    }

    /// Largest channel index over all layers, `None` without layers.
    pub fn max_channel_index(&self) -> Option<usize> {
        self.layers.iter().map(|l| l.index).max()
    }
}

impl Generator for SplatOutput {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn inputs(&self) -> Vec<&str> {
        self.layers
            .iter()
            .skip(1)
            .filter_map(|l| l.input.as_deref())
            .chain(self.biome_mask.as_deref())
            .chain(self.cutout_input.as_deref())
            .collect()
    }

    fn outputs(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.output.as_str()).collect()
    }

    /// Disabled producers commit nothing.
    fn passthrough_ports(&self) -> Option<(&str, &str)> {
        None
    }

    fn generate(
        &self,
        ctx: &GenerateContext,
        results: &mut ResultStore,
        stop: &dyn StopSignal,
        sink: &mut dyn EventSink,
    ) {
        if self.layers.is_empty() {
            return;
        }

        let mut grids: Vec<Grid> = Vec::with_capacity(self.layers.len());
        grids.push(Grid::filled(ctx.rect, 1.0));
        for layer in &self.layers[1..] {
            let grid = load_input_or_neutral(
                &self.id,
                results,
                layer.input.as_deref(),
                ctx.rect,
                0.0,
                sink,
            );
            if grid.rect() != ctx.rect {
                warn!(
                    "Layer '{}' of splat producer '{}' covers {:?}; resampled to the tile rect.",
                    layer.name, self.id, grid.rect()
                );
                grids.push(grid.resampled(ctx.rect));
            } else {
                grids.push(grid);
            }
        }

        let opacities: Vec<f32> = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, layer)| if i == 0 { 1.0 } else { layer.opacity })
            .collect();

        if stop.should_stop(0.0) {
            report_cancelled(&self.id, sink);
            return;
        }
        blend_layers(&mut grids, &opacities);

        for (i, (layer, grid)) in self.layers.iter().zip(grids).enumerate() {
            if stop.should_stop(i as f32 / self.layers.len() as f32) {
                report_cancelled(&self.id, sink);
                return;
            }
            commit_output(&self.id, results, &layer.output, grid, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::generator::events::VecSink;
    use crate::generator::{run_generator, PipelineEventKind, TileSize};
    use crate::raster::CoordRect;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    fn rect() -> CoordRect {
        CoordRect::new(0, 0, 2, 2)
    }

    fn ctx() -> GenerateContext {
        GenerateContext::new(rect(), TileSize::new(2, 10.0, 10.0), 0)
    }

    fn producer() -> SplatOutput {
        SplatOutput::new("splat")
            .with_layer(Layer::new("base", "base_out").with_input("ignored"))
            .with_layer(
                Layer::new("grass", "grass_out")
                    .with_input("grass_in")
                    .with_index(1)
                    .with_opacity(0.5),
            )
            .with_layer(
                Layer::new("rock", "rock_out")
                    .with_input("rock_in")
                    .with_index(2),
            )
    }

    #[test]
    fn blended_outputs_conserve_coverage() {
        let mut results = ResultStore::new();
        results.commit("grass_in", Grid::filled(rect(), 1.0));
        results.commit("rock_in", Grid::filled(rect(), 0.4));
        results.commit("ignored", Grid::filled(rect(), 0.0));

        run_generator(&producer(), &ctx(), &mut results, &(), &mut ());

        let base = results.get("base_out").expect("base");
        let grass = results.get("grass_out").expect("grass");
        let rock = results.get("rock_out").expect("rock");
        approx_eq(rock.get(0, 0), 0.4);
        approx_eq(grass.get(0, 0), 0.5 * 0.6);
        approx_eq(base.get(0, 0) + grass.get(0, 0) + rock.get(0, 0), 1.0);
    }

    #[test]
    fn offset_inputs_are_resampled_to_the_tile() {
        let mut results = ResultStore::new();
        results.commit("grass_in", Grid::filled(CoordRect::new(1, 0, 2, 2), 1.0));
        run_generator(&producer(), &ctx(), &mut results, &(), &mut ());

        let base = results.get("base_out").expect("base");
        let grass = results.get("grass_out").expect("grass");
        assert_eq!(grass.rect(), rect());
        approx_eq(grass.get(0, 0), 0.0);
        approx_eq(grass.get(1, 0), 0.5);
        for (x, z) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            approx_eq(base.get(x, z) + grass.get(x, z), 1.0);
        }
    }

    #[test]
    fn missing_inputs_become_empty_layers() {
        let mut results = ResultStore::new();
        run_generator(&producer(), &ctx(), &mut results, &(), &mut ());
        assert!(results.get("rock_out").expect("rock").is_empty());
        assert_eq!(results.get("base_out").map(|g| g.get(1, 1)), Some(1.0));
    }

    #[test]
    fn disabled_producer_commits_nothing() {
        let mut results = ResultStore::new();
        results.commit("grass_in", Grid::filled(rect(), 1.0));
        let gen = SplatOutput::new("splat")
            .with_layer(Layer::new("base", "base_out"))
            .with_cutout("cutout")
            .with_state(GeneratorState::Disabled);
        let mut sink = VecSink::new();
        run_generator(&gen, &ctx(), &mut results, &(), &mut sink);
        assert!(!results.contains("base_out"));
        assert_eq!(sink.count(PipelineEventKind::Passthrough), 0);
    }

    #[test]
    fn stop_between_commits_keeps_earlier_outputs() {
        let mut results = ResultStore::new();
        let polls = Cell::new(0);
        // Polls: run_generator, after blend, before each of the three commits.
        let stop = |_p: f32| {
            polls.set(polls.get() + 1);
            polls.get() > 3
        };
        let mut sink = VecSink::new();
        run_generator(&producer(), &ctx(), &mut results, &stop, &mut sink);
        assert!(results.contains("base_out"));
        assert!(!results.contains("grass_out"));
        assert!(!results.contains("rock_out"));
        assert_eq!(sink.count(PipelineEventKind::Cancelled), 1);
    }

    #[test]
    fn inputs_skip_background_and_include_masks() {
        let gen = producer().with_biome_mask("biome").with_cutout("cutout");
        assert_eq!(gen.inputs(), vec!["grass_in", "rock_in", "biome", "cutout"]);
        assert_eq!(gen.outputs(), vec!["base_out", "grass_out", "rock_out"]);
        assert_eq!(gen.max_channel_index(), Some(2));
    }
}

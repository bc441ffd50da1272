//! Height band filter.
//!
//! Marks cells whose normalized height lies inside `[height_min, height_max]` (world units,
//! divided by the tile height range). Both bounds are inclusive.
use tracing::warn;

use super::{
    commit_output, load_input_or_neutral, report_cancelled, EventSink, GenerateContext,
    Generator, GeneratorState, PortId, ResultStore, StopSignal,
};
use crate::raster::Grid;

pub struct HeightFilter {
    id: String,
    state: GeneratorState,
    input: PortId,
    output: PortId,
    /// Lower bound in world units.
    pub height_min: f32,
    /// Upper bound in world units.
    pub height_max: f32,
}

impl HeightFilter {
    pub fn new(id: impl Into<String>, input: impl Into<PortId>, output: impl Into<PortId>) -> Self {
        Self {
            id: id.into(),
            state: GeneratorState::Enabled,
            input: input.into(),
            output: output.into(),
            height_min: 0.0,
            height_max: 1.0,
        }
    }

    pub fn with_band(mut self, height_min: f32, height_max: f32) -> Self {
        self.height_min = height_min;
        self.height_max = height_max;
        self
    }

    pub fn with_state(mut self, state: GeneratorState) -> Self {
        self.state = state;
        self
    }

    /// Band bounds divided by the terrain height range.
    pub fn normalized_band(&self, terrain_height: f32) -> (f32, f32) {
        if terrain_height <= 0.0 {
            warn!(
                "Height filter '{}' got terrain height {}; using raw bounds.",
                self.id, terrain_height
            );
            return (self.height_min, self.height_max);
        }
        (
            self.height_min / terrain_height,
            self.height_max / terrain_height,
        )
    }
}

impl Generator for HeightFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> GeneratorState {
        self.state
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.input.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        vec![self.output.as_str()]
    }

    fn generate(
        &self,
        ctx: &GenerateContext,
        results: &mut ResultStore,
        stop: &dyn StopSignal,
        sink: &mut dyn EventSink,
    ) {
        let src = load_input_or_neutral(
            &self.id,
            results,
            Some(self.input.as_str()),
            ctx.rect,
            0.0,
            sink,
        );
        if stop.should_stop(0.0) {
            report_cancelled(&self.id, sink);
            return;
        }

        let (lo, hi) = self.normalized_band(ctx.tile_size.height);
        let mut dst = Grid::new(src.rect());
        for (out, v) in dst.data_mut().iter_mut().zip(src.data()) {
            *out = if *v >= lo && *v <= hi { 1.0 } else { 0.0 };
        }

        if stop.should_stop(1.0) {
            report_cancelled(&self.id, sink);
            return;
        }
        commit_output(&self.id, results, &self.output, dst, sink);
    }
}

//! Edge detection generator.
//!
//! Produces an L1 gradient-magnitude map of its input using the generalized derivative
//! kernels from [`crate::raster::kernel`]. Kernels are built once per configured size.
use super::{
    commit_output, load_input_or_neutral, report_cancelled, EventSink, GenerateContext,
    Generator, GeneratorState, PortId, ResultStore, StopSignal,
};
use crate::raster::{detect_edges, EdgeKernels, KernelSize};

pub struct EdgeDetector {
    id: String,
    state: GeneratorState,
    input: PortId,
    output: PortId,
    kernels: EdgeKernels,
}

impl EdgeDetector {
    pub fn new(id: impl Into<String>, input: impl Into<PortId>, output: impl Into<PortId>) -> Self {
        Self {
            id: id.into(),
            state: GeneratorState::Enabled,
            input: input.into(),
            output: output.into(),
            kernels: EdgeKernels::build(KernelSize::default()),
        }
    }

    pub fn with_kernel_size(mut self, size: KernelSize) -> Self {
        self.set_kernel_size(size);
        self
    }

    pub fn with_state(mut self, state: GeneratorState) -> Self {
        self.state = state;
        self
    }

    pub fn kernel_size(&self) -> KernelSize {
        self.kernels.size
    }

    pub fn kernels(&self) -> &EdgeKernels {
        &self.kernels
    }

    /// Change the aperture. Kernels are rebuilt only when the size actually changes.
    pub fn set_kernel_size(&mut self, size: KernelSize) {
        if self.kernels.size != size {
            self.kernels = EdgeKernels::build(size);
        }
    }

    /// Change the aperture from a free integer, see [`KernelSize::coerce`].
    pub fn set_kernel_size_raw(&mut self, requested: i32) {
        self.set_kernel_size(KernelSize::coerce(requested));
    }

    pub fn set_state(&mut self, state: GeneratorState) {
        self.state = state;
    }
}

impl Generator for EdgeDetector {
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

        let dst = detect_edges(&src, &self.kernels);

        if stop.should_stop(1.0) {
            report_cancelled(&self.id, sink);
            return;
        }
        commit_output(&self.id, results, &self.output, dst, sink);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::generator::events::VecSink;
    use crate::generator::{run_generator, PipelineEventKind, TileSize};
    use crate::raster::{CoordRect, Grid};

    fn ctx(rect: CoordRect) -> GenerateContext {
        GenerateContext::new(rect, TileSize::default(), 0)
    }

    fn step_input(rect: CoordRect) -> ResultStore {
        let mut results = ResultStore::new();
        results.commit("height", Grid::from_fn(rect, |x, _| if x < 4 { 0.0 } else { 1.0 }));
        results
    }

    #[test]
    fn detects_vertical_step() {
        let rect = CoordRect::new(0, 0, 8, 8);
        let mut results = step_input(rect);
        let gen = EdgeDetector::new("edges", "height", "edges_out");
        run_generator(&gen, &ctx(rect), &mut results, &(), &mut ());

        let out = results.get("edges_out").expect("committed");
        assert_eq!(out.get(1, 4), 0.0);
        assert!(out.get(3, 4) > 0.0);
        assert!(out.get(4, 4) > 0.0);
        assert_eq!(out.get(6, 4), 0.0);
    }

    #[test]
    fn input_is_not_modified() {
        let rect = CoordRect::new(0, 0, 8, 8);
        let mut results = step_input(rect);
        let before = results.get_copy("height");
        let gen = EdgeDetector::new("edges", "height", "edges_out");
        run_generator(&gen, &ctx(rect), &mut results, &(), &mut ());
        assert_eq!(results.get_copy("height"), before);
    }

    #[test]
    fn kernel_rebuilt_only_on_change() {
        let mut gen = EdgeDetector::new("edges", "a", "b");
        assert_eq!(gen.kernel_size(), KernelSize::X3);
        gen.set_kernel_size_raw(6);
        assert_eq!(gen.kernel_size(), KernelSize::X7);
        assert_eq!(gen.kernels().horizontal.dim(), 7);
        let before = gen.kernels().clone();
        gen.set_kernel_size(KernelSize::X7);
        assert_eq!(gen.kernels(), &before);
    }

    #[test]
    fn disabled_detector_forwards_input() {
        let rect = CoordRect::new(0, 0, 8, 8);
        let mut results = step_input(rect);
        let gen =
            EdgeDetector::new("edges", "height", "edges_out").with_state(GeneratorState::Disabled);
        run_generator(&gen, &ctx(rect), &mut results, &(), &mut ());
        assert_eq!(results.get("edges_out"), results.get("height"));
    }

    #[test]
    fn stop_before_commit_leaves_output_unset() {
        let rect = CoordRect::new(0, 0, 8, 8);
        let mut results = step_input(rect);
        let polls = Cell::new(0);
        let stop = |_p: f32| {
            polls.set(polls.get() + 1);
            polls.get() > 2
        };
        let mut sink = VecSink::new();
        let gen = EdgeDetector::new("edges", "height", "edges_out");
        run_generator(&gen, &ctx(rect), &mut results, &stop, &mut sink);
        assert!(!results.contains("edges_out"));
        assert_eq!(sink.count(PipelineEventKind::Cancelled), 1);
    }
}

//! Ordered layer-opacity blending.
//!
//! Layers are composited back to front. Index 0 is the background and the last index is the
//! top layer. After blending, each grid holds that layer's effective coverage once every
//! higher layer has claimed its share.
use tracing::warn;

use super::grid::Grid;

/// Blend `layers` in place with the matching `opacities`.
///
/// The background opacity is always treated as 1. Per cell, layer `i` keeps
/// `clamp(g_i * o_i, 0, 1) * (1 - claimed)`, where `claimed` is the coverage of all layers
/// above it, so the total over all layers never exceeds 1.
pub fn blend_layers(layers: &mut [Grid], opacities: &[f32]) {
    let Some(first) = layers.first() else {
        return;
    };
    let len = first.data().len();
    if layers.iter().any(|g| g.data().len() != len) {
        warn!("Layer grids differ in size; blending skipped.");
        return;
    }

    let opacity = |i: usize| -> f32 {
        if i == 0 {
            1.0
        } else {
            opacities.get(i).copied().unwrap_or(1.0).clamp(0.0, 1.0)
        }
    };

    for pos in 0..len {
        let mut claimed = 0.0f32;
        for i in (0..layers.len()).rev() {
            let cell = &mut layers[i].data_mut()[pos];
            let coverage = (*cell * opacity(i)).clamp(0.0, 1.0);
            let visible = coverage * (1.0 - claimed).max(0.0);
            *cell = visible;
            claimed += visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::CoordRect;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    fn rect() -> CoordRect {
        CoordRect::new(0, 0, 2, 2)
    }

    #[test]
    fn opaque_top_layer_claims_everything() {
        let mut layers = vec![
            Grid::filled(rect(), 1.0),
            Grid::filled(rect(), 1.0),
            Grid::filled(rect(), 1.0),
        ];
        blend_layers(&mut layers, &[1.0, 0.5, 1.0]);

        for pos in 0..4 {
            approx_eq(layers[2].data()[pos], 1.0);
            approx_eq(layers[1].data()[pos], 0.0);
            approx_eq(layers[0].data()[pos], 0.0);
            let sum: f32 = layers.iter().map(|g| g.data()[pos]).sum();
            approx_eq(sum, 1.0);
        }
    }

    #[test]
    fn partial_layers_leave_remainder_to_background() {
        let mut layers = vec![
            Grid::filled(rect(), 1.0),
            Grid::filled(rect(), 0.8),
            Grid::filled(rect(), 0.5),
        ];
        blend_layers(&mut layers, &[0.0, 0.5, 1.0]);

        approx_eq(layers[2].data()[0], 0.5);
        approx_eq(layers[1].data()[0], 0.2);
        approx_eq(layers[0].data()[0], 0.3);
    }

    #[test]
    fn background_opacity_is_forced_to_one() {
        let mut layers = vec![Grid::filled(rect(), 1.0), Grid::new(rect())];
        blend_layers(&mut layers, &[0.0, 1.0]);
        approx_eq(layers[0].data()[0], 1.0);
    }

    #[test]
    fn total_never_exceeds_one() {
        let mut layers = vec![
            Grid::filled(rect(), 1.0),
            Grid::filled(rect(), 2.0),
            Grid::filled(rect(), 0.9),
            Grid::filled(rect(), 0.7),
        ];
        blend_layers(&mut layers, &[1.0, 1.0, 1.0, 1.0]);
        let sum: f32 = layers.iter().map(|g| g.data()[3]).sum();
        approx_eq(sum, 1.0);
        assert!(layers.iter().all(|g| g.data()[3] >= 0.0));
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut layers: Vec<Grid> = Vec::new();
        blend_layers(&mut layers, &[]);
        assert!(layers.is_empty());
    }
}

//! Border welding between adjacent tile textures.
//!
//! Both tiles of a shared edge converge on the same boundary value: the average of the two
//! creation-time edge pixels. Pixels up to `margin` deep fade from that average back to their
//! own creation-time value:
//!
//! `pixel(d) = lerp(source(d), average, 1 - d / margin)` for `d < margin`.
//!
//! Where the fades of two edges overlap, the pixel keeps the weld nearest to its edge. Corner
//! pixels take the average of every ready tile meeting at that corner, so all edges through
//! the corner agree once their tiles are welded.
use std::sync::Arc;

use glam::Vec4;
use tracing::{debug, warn};

use super::store::NeighborAccess;
use super::texture::TileTexture;
use crate::generator::{EventSink, PipelineEvent, PipelineEventKind};
use crate::raster::{Direction, TileCoord};

/// Texture corners as the pair of edges meeting there.
const CORNERS: [(Direction, Direction); 4] = [
    (Direction::PrevX, Direction::PrevZ),
    (Direction::NextX, Direction::PrevZ),
    (Direction::PrevX, Direction::NextZ),
    (Direction::NextX, Direction::NextZ),
];

#[inline]
fn slot(direction: Direction) -> usize {
    match direction {
        Direction::PrevX => 0,
        Direction::NextX => 1,
        Direction::PrevZ => 2,
        Direction::NextZ => 3,
    }
}

/// Pixel coordinate `depth` pixels inside the edge facing `direction`, `along` pixels along it.
#[inline]
fn edge_pixel(
    direction: Direction,
    width: usize,
    height: usize,
    depth: usize,
    along: usize,
) -> (usize, usize) {
    match direction {
        Direction::PrevX => (depth, along),
        Direction::NextX => (width - 1 - depth, along),
        Direction::PrevZ => (along, depth),
        Direction::NextZ => (along, height - 1 - depth),
    }
}

/// Inverse of [`edge_pixel`]: `(depth, along)` of pixel `(x, y)` for the edge facing `direction`.
#[inline]
fn edge_offset(
    direction: Direction,
    width: usize,
    height: usize,
    x: usize,
    y: usize,
) -> (usize, usize) {
    match direction {
        Direction::PrevX => (x, y),
        Direction::NextX => (width - 1 - x, y),
        Direction::PrevZ => (y, x),
        Direction::NextZ => (height - 1 - y, x),
    }
}

/// Pixel at the corner where the `x_side` and `z_side` edges meet.
#[inline]
fn corner_pixel(
    x_side: Direction,
    z_side: Direction,
    width: usize,
    height: usize,
) -> (usize, usize) {
    let x = if x_side == Direction::PrevX { 0 } else { width - 1 };
    let y = if z_side == Direction::PrevZ { 0 } else { height - 1 };
    (x, y)
}

/// Same-named textures of the ready tiles around one tile.
#[derive(Clone, Debug, Default)]
pub struct WeldNeighbors {
    edges: [Option<Arc<TileTexture>>; 4],
    diagonals: [Option<Arc<TileTexture>>; 4],
}

impl WeldNeighbors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up texture `name` of every ready tile around `tile`, diagonals included.
    pub fn gather(tile: TileCoord, name: &str, neighbors: &dyn NeighborAccess) -> Self {
        let mut found = Self::default();
        for direction in Direction::ALL {
            found.edges[slot(direction)] = neighbors.ready_texture(tile.neighbor(direction), name);
        }
        for (i, (x_side, z_side)) in CORNERS.into_iter().enumerate() {
            found.diagonals[i] =
                neighbors.ready_texture(tile.neighbor(x_side).neighbor(z_side), name);
        }
        found
    }

    pub fn with_edge(mut self, direction: Direction, texture: Arc<TileTexture>) -> Self {
        self.edges[slot(direction)] = Some(texture);
        self
    }

    /// Set the tile diagonally across the corner of `x_side` and `z_side`.
    pub fn with_diagonal(
        mut self,
        x_side: Direction,
        z_side: Direction,
        texture: Arc<TileTexture>,
    ) -> Self {
        if let Some(i) = CORNERS.iter().position(|c| *c == (x_side, z_side)) {
            self.diagonals[i] = Some(texture);
        }
        self
    }

    pub fn edge(&self, direction: Direction) -> Option<&TileTexture> {
        self.edges[slot(direction)].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.iter().all(Option::is_none)
    }
}

fn matching<'a>(
    texture: &TileTexture,
    neighbor: Option<&'a TileTexture>,
) -> Option<&'a TileTexture> {
    let neighbor = neighbor?;
    if texture.same_size(neighbor) {
        Some(neighbor)
    } else {
        warn!(
            "Neighbor texture is {}x{} but this one is {}x{}; weld skipped.",
            neighbor.width(),
            neighbor.height(),
            texture.width(),
            texture.height()
        );
        None
    }
}

/// Recompute the welded pixels of `texture` from its creation-time pixels and `neighbors`.
///
/// Every earlier weld is undone first, so the result depends only on the source pixels of
/// this tile and its ready neighbors. Returns the directions that were welded; none when
/// `margin` is 0, the texture is empty, or no neighbor of the same size is ready.
pub fn weld_texture(
    texture: &mut TileTexture,
    neighbors: &WeldNeighbors,
    margin: usize,
) -> Vec<Direction> {
    texture.reset();
    let (width, height) = (texture.width(), texture.height());
    if margin == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let mut edges: [Option<&TileTexture>; 4] = [None; 4];
    for direction in Direction::ALL {
        edges[slot(direction)] = matching(texture, neighbors.edge(direction));
    }
    let welded: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|d| edges[slot(*d)].is_some())
        .collect();
    if welded.is_empty() {
        return welded;
    }

    let mut updates = Vec::new();
    for y in 0..height {
        for x in 0..width {
            // (weight, target) of the nearest welded edge.
            let mut nearest: Option<(f32, Vec4)> = None;
            for &direction in &welded {
                let (depth, along) = edge_offset(direction, width, height, x, y);
                if depth >= margin {
                    continue;
                }
                let weight = 1.0 - depth as f32 / margin as f32;
                if nearest.is_some_and(|(w, _)| w >= weight) {
                    continue;
                }
                let Some(neighbor) = edges[slot(direction)] else {
                    continue;
                };
                let (ox, oy) = edge_pixel(direction, width, height, 0, along);
                let (nx, ny) = edge_pixel(direction.opposite(), width, height, 0, along);
                let average =
                    (texture.source_pixel(ox, oy) + neighbor.source_pixel(nx, ny)) * 0.5;
                nearest = Some((weight, average));
            }
            match nearest {
                Some((weight, average)) if weight >= 1.0 => updates.push((x, y, average)),
                Some((weight, average)) => {
                    let value = Vec4::lerp(texture.source_pixel(x, y), average, weight);
                    updates.push((x, y, value));
                }
                None => {}
            }
        }
    }

    for (i, (x_side, z_side)) in CORNERS.into_iter().enumerate() {
        let across_x = edges[slot(x_side)];
        let across_z = edges[slot(z_side)];
        if across_x.is_none() && across_z.is_none() {
            continue;
        }
        let (cx, cy) = corner_pixel(x_side, z_side, width, height);
        // Slots are the four tiles at the corner in fixed order (low x, low z first), so
        // every tile sums the same values in the same order.
        let own_slot =
            usize::from(x_side == Direction::PrevX) + 2 * usize::from(z_side == Direction::PrevZ);
        let mut at_corner: [Option<Vec4>; 4] = [None; 4];
        at_corner[own_slot] = Some(texture.source_pixel(cx, cy));
        let shared = [
            (across_x, 1, x_side.opposite(), z_side),
            (across_z, 2, x_side, z_side.opposite()),
            (
                matching(texture, neighbors.diagonals[i].as_deref()),
                3,
                x_side.opposite(),
                z_side.opposite(),
            ),
        ];
        for (other, flip, ox_side, oz_side) in shared {
            if let Some(other) = other {
                let (px, py) = corner_pixel(ox_side, oz_side, width, height);
                at_corner[own_slot ^ flip] = Some(other.source_pixel(px, py));
            }
        }
        let (sum, count) = at_corner
            .into_iter()
            .flatten()
            .fold((Vec4::ZERO, 0.0f32), |(sum, count), v| (sum + v, count + 1.0));
        updates.push((cx, cy, sum / count));
    }

    for (x, y, value) in updates {
        texture.set_pixel(x, y, value);
    }
    welded
}

/// Weld `texture` against the same-named texture of every ready tile around `tile`.
///
/// Returns the number of edges welded.
pub fn weld_to_neighbors(
    tile: TileCoord,
    name: &str,
    texture: &mut TileTexture,
    neighbors: &dyn NeighborAccess,
    margin: usize,
    sink: &mut dyn EventSink,
) -> usize {
    let around = WeldNeighbors::gather(tile, name, neighbors);
    let welded = weld_texture(texture, &around, margin);

    for direction in Direction::ALL {
        if welded.contains(&direction) {
            if sink.wants(PipelineEventKind::WeldApplied) {
                sink.send(PipelineEvent::WeldApplied {
                    tile,
                    direction,
                    name: name.to_string(),
                });
            }
        } else {
            debug!(
                "No weld of '{}' for tile {:?} towards {:?}.",
                name, tile, direction
            );
            if sink.wants(PipelineEventKind::WeldSkipped) {
                sink.send(PipelineEvent::WeldSkipped {
                    tile,
                    direction,
                    name: name.to_string(),
                });
            }
        }
    }
    welded.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    fn uniform(width: usize, height: usize, v: f32) -> TileTexture {
        TileTexture::from_pixels(width, height, vec![Vec4::splat(v); width * height])
            .expect("sized")
    }

    fn only(direction: Direction, texture: &TileTexture) -> WeldNeighbors {
        WeldNeighbors::new().with_edge(direction, Arc::new(texture.clone()))
    }

    #[test]
    fn shared_edge_meets_at_the_average() {
        let a0 = uniform(4, 3, 0.2);
        let b0 = uniform(4, 3, 0.8);

        let mut a = a0.clone();
        let mut b = b0.clone();
        assert_eq!(weld_texture(&mut a, &only(Direction::NextX, &b0), 1), vec![Direction::NextX]);
        assert_eq!(weld_texture(&mut b, &only(Direction::PrevX, &a0), 1), vec![Direction::PrevX]);

        for y in 0..3 {
            approx_eq(a.pixel(3, y).x, 0.5);
            assert_eq!(a.pixel(3, y), b.pixel(0, y));
        }
        approx_eq(a.pixel(2, 0).x, 0.2);
    }

    #[test]
    fn welded_neighbor_reads_as_its_source() {
        let a0 = uniform(4, 3, 0.2);
        let mut b = uniform(4, 3, 0.8);
        weld_texture(&mut b, &only(Direction::PrevX, &a0), 2);

        let mut from_source = a0.clone();
        let mut from_welded = a0.clone();
        weld_texture(&mut from_source, &only(Direction::NextX, &uniform(4, 3, 0.8)), 2);
        weld_texture(&mut from_welded, &only(Direction::NextX, &b), 2);
        assert_eq!(from_source, from_welded);
    }

    #[test]
    fn margin_fades_towards_source() {
        let mut a = uniform(4, 4, 0.0);
        let b = uniform(4, 4, 1.0);
        weld_texture(&mut a, &only(Direction::PrevZ, &b), 2);
        approx_eq(a.pixel(1, 0).x, 0.5);
        approx_eq(a.pixel(1, 1).x, 0.25);
        approx_eq(a.pixel(1, 2).x, 0.0);
    }

    #[test]
    fn nearer_edge_wins_where_fades_overlap() {
        let mut a = uniform(4, 4, 0.0);
        let around = WeldNeighbors::new()
            .with_edge(Direction::NextX, Arc::new(uniform(4, 4, 1.0)))
            .with_edge(Direction::PrevZ, Arc::new(uniform(4, 4, 0.4)));
        weld_texture(&mut a, &around, 2);
        // Depth 0 towards NextX beats depth 1 towards PrevZ.
        approx_eq(a.pixel(3, 1).x, 0.5);
        // Depth 0 towards PrevZ beats depth 1 towards NextX.
        approx_eq(a.pixel(2, 0).x, 0.2);
        // Corner averages all three tiles.
        approx_eq(a.pixel(3, 0).x, (0.0 + 1.0 + 0.4) / 3.0);
    }

    #[test]
    fn corner_includes_ready_diagonal() {
        let mut a = uniform(3, 3, 0.0);
        let around = WeldNeighbors::new()
            .with_edge(Direction::NextX, Arc::new(uniform(3, 3, 1.0)))
            .with_diagonal(Direction::NextX, Direction::NextZ, Arc::new(uniform(3, 3, 0.6)));
        weld_texture(&mut a, &around, 1);
        approx_eq(a.pixel(2, 2).x, (0.0 + 1.0 + 0.6) / 3.0);
        approx_eq(a.pixel(2, 0).x, 0.5);
        approx_eq(a.pixel(2, 1).x, 0.5);
    }

    #[test]
    fn zero_margin_or_size_mismatch_skips() {
        let mut a = uniform(4, 4, 0.0);
        let before = a.clone();
        assert!(weld_texture(&mut a, &only(Direction::NextZ, &uniform(4, 4, 1.0)), 0).is_empty());
        assert!(weld_texture(&mut a, &only(Direction::NextZ, &uniform(3, 4, 1.0)), 1).is_empty());
        assert_eq!(a, before);
    }

    #[test]
    fn reweld_is_idempotent() {
        let mut a = uniform(2, 2, 0.0);
        let around = only(Direction::NextX, &uniform(2, 2, 1.0));
        weld_texture(&mut a, &around, 1);
        let once = a.clone();
        weld_texture(&mut a, &around, 1);
        assert_eq!(a, once);
    }
}

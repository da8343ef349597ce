//! Grid tiling
//!
//! Lays `n` square tiles out on a viewport. Two candidate layouts are built:
//! one that spans the viewport width and one that spans its height. The
//! span mode decides which one is used. The grid is centered with equal
//! margins on each axis.

use crate::error::ConfigError;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy for choosing between the span-width and span-height layouts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "String")]
pub enum SpanMode {
    SpanWidth,
    SpanHeight,
    /// Whichever layout places more tiles.
    MaxTiles,
    /// Whichever layout gives each tile more area.
    MaxArea,
}

impl SpanMode {
    pub fn name(self) -> &'static str {
        match self {
            SpanMode::SpanWidth => "spanWidth",
            SpanMode::SpanHeight => "spanHeight",
            SpanMode::MaxTiles => "maxTiles",
            SpanMode::MaxArea => "maxArea",
        }
    }
}

impl fmt::Display for SpanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for SpanMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for SpanMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spanWidth" => Ok(SpanMode::SpanWidth),
            "spanHeight" => Ok(SpanMode::SpanHeight),
            "maxTiles" => Ok(SpanMode::MaxTiles),
            "maxArea" => Ok(SpanMode::MaxArea),
            other => Err(ConfigError::UnknownSpanMode(other.to_string())),
        }
    }
}

/// Viewport size in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Dimensions usable for layout: at least one pixel on each axis.
    fn clamped(&self) -> (f64, f64) {
        (
            f64::from(self.width).max(1.0),
            f64::from(self.height).max(1.0),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridParameters {
    pub active_tiles: usize,
    /// Tiles the current layout can place, `rows * columns`.
    pub capacity: usize,
    pub rows: usize,
    pub columns: usize,
    pub tile_size: f32,
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Fraction of a tile left empty around its dot.
    pub padding: f32,
    pub span_mode: SpanMode,
}

/// One candidate layout before margins are applied.
#[derive(Debug, Copy, Clone)]
struct Candidate {
    rows: usize,
    columns: usize,
    tile_size: f64,
    width: f64,
    height: f64,
}

impl Candidate {
    fn capacity(&self) -> usize {
        self.rows * self.columns
    }
}

fn span_width(tiles: f64, width: f64, height: f64) -> Candidate {
    let ratio = width / height;
    let mut columns = (tiles * ratio).sqrt().ceil().max(1.0);
    let mut rows = (tiles / columns).ceil().max(1.0);
    while columns < rows * ratio {
        columns += 1.0;
        rows = (tiles / columns).ceil().max(1.0);
    }
    let tile_size = width / columns;
    Candidate {
        rows: rows as usize,
        columns: columns as usize,
        tile_size,
        width,
        height: rows * tile_size,
    }
}

fn span_height(tiles: f64, width: f64, height: f64) -> Candidate {
    let ratio = width / height;
    let cell_width = (tiles * ratio).sqrt();
    let mut rows = (tiles / cell_width).ceil().max(1.0);
    let mut columns = (tiles / rows).ceil().max(1.0);
    while rows * ratio < columns {
        rows += 1.0;
        columns = (tiles / rows).ceil().max(1.0);
    }
    let tile_size = height / rows;
    Candidate {
        rows: rows as usize,
        columns: columns as usize,
        tile_size,
        width: columns * tile_size,
        height,
    }
}

/// Compute the tiling of `active_tiles` tiles on `viewport`.
pub fn layout(
    active_tiles: usize,
    viewport: Viewport,
    span_mode: SpanMode,
    padding: f32,
) -> GridParameters {
    let (width, height) = viewport.clamped();
    let tiles = active_tiles.max(1) as f64;

    let chosen = match span_mode {
        SpanMode::SpanWidth => span_width(tiles, width, height),
        SpanMode::SpanHeight => span_height(tiles, width, height),
        SpanMode::MaxTiles => {
            let by_width = span_width(tiles, width, height);
            let by_height = span_height(tiles, width, height);
            if by_width.capacity() > by_height.capacity() {
                by_width
            } else {
                by_height
            }
        }
        SpanMode::MaxArea => {
            let by_width = span_width(tiles, width, height);
            let by_height = span_height(tiles, width, height);
            if by_height.tile_size > by_width.tile_size {
                by_height
            } else {
                by_width
            }
        }
    };

    GridParameters {
        active_tiles,
        capacity: chosen.capacity(),
        rows: chosen.rows,
        columns: chosen.columns,
        tile_size: chosen.tile_size as f32,
        width: chosen.width as f32,
        height: chosen.height as f32,
        margin_x: ((width - chosen.width) / 2.0) as f32,
        margin_y: ((height - chosen.height) / 2.0) as f32,
        padding,
        span_mode,
    }
}

/// Tile layout tracking a growing agent population.
#[derive(Debug, Clone)]
pub struct GridTiler {
    params: GridParameters,
}

impl GridTiler {
    pub fn new(active_tiles: usize, viewport: Viewport, padding: f32, span_mode: SpanMode) -> Self {
        let params = layout(active_tiles, viewport, span_mode, padding);
        tracing::debug!(
            active_tiles,
            rows = params.rows,
            columns = params.columns,
            tile_size = params.tile_size,
            "grid laid out"
        );
        Self { params }
    }

    pub fn parameters(&self) -> &GridParameters {
        &self.params
    }

    /// Make room for `count` more tiles.
    ///
    /// The grid is only re-tiled once the new count no longer fits the
    /// current capacity. Returns whether a re-layout happened.
    pub fn add_tiles(&mut self, count: i64, viewport: Viewport) -> bool {
        if count <= 0 {
            tracing::warn!(count, "add_tiles called with a non-positive count; ignoring");
            return false;
        }

        let active = self.params.active_tiles.saturating_add(count as usize);
        if active > self.params.capacity {
            self.relayout(active, viewport);
            true
        } else {
            self.params.active_tiles = active;
            false
        }
    }

    /// Re-tile the current population for a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        self.relayout(self.params.active_tiles, viewport);
    }

    fn relayout(&mut self, active_tiles: usize, viewport: Viewport) {
        self.params = layout(active_tiles, viewport, self.params.span_mode, self.params.padding);
        tracing::debug!(
            active_tiles,
            rows = self.params.rows,
            columns = self.params.columns,
            capacity = self.params.capacity,
            "grid re-tiled"
        );
    }

    /// Tile index under `point`, if any.
    ///
    /// With `circular` set, only points inside the tile's dot count as hits.
    pub fn hit_test(&self, point: Vec2, circular: bool) -> Option<usize> {
        let p = &self.params;
        let column = ((point.x - p.margin_x) / p.tile_size).floor();
        let row = ((point.y - p.margin_y) / p.tile_size).floor();
        if !column.is_finite() || !row.is_finite() {
            return None;
        }
        if column < 0.0 || column >= p.columns as f32 || row < 0.0 || row >= p.rows as f32 {
            return None;
        }

        let index = column as usize + row as usize * p.columns;
        if index >= p.active_tiles {
            return None;
        }

        if circular {
            let radius = 0.5 * p.tile_size * (1.0 - p.padding);
            let center = self.center_of(column as usize, row as usize);
            if point.distance(center) > radius {
                return None;
            }
        }
        Some(index)
    }

    /// Pixel center of tile `index`, if it is active.
    pub fn tile_center(&self, index: usize) -> Option<Vec2> {
        if index >= self.params.active_tiles || self.params.columns == 0 {
            return None;
        }
        let column = index % self.params.columns;
        let row = index / self.params.columns;
        Some(self.center_of(column, row))
    }

    fn center_of(&self, column: usize, row: usize) -> Vec2 {
        let p = &self.params;
        Vec2::new(
            p.margin_x + (column as f32 + 0.5) * p.tile_size,
            p.margin_y + (row as f32 + 0.5) * p.tile_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Viewport {
        Viewport::new(1000.0, 1000.0)
    }

    #[test]
    fn square_viewport_gives_square_grid() {
        let params = layout(10_000, square(), SpanMode::MaxArea, 0.15);
        assert_eq!(params.rows, 100);
        assert_eq!(params.columns, 100);
        assert_eq!(params.capacity, 10_000);
        assert!((params.tile_size - 10.0).abs() < 1e-4);
        assert!(params.margin_x.abs() < 1e-3 && params.margin_y.abs() < 1e-3);
    }

    #[test]
    fn span_width_fills_width() {
        let viewport = Viewport::new(1600.0, 900.0);
        let params = layout(500, viewport, SpanMode::SpanWidth, 0.0);
        assert!(params.rows * params.columns >= 500);
        assert!((params.width - 1600.0).abs() < 1e-3);
        assert!(params.height <= 900.0 + 1e-3);
        assert!((params.margin_y - (900.0 - params.height) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn span_height_fills_height() {
        let viewport = Viewport::new(1600.0, 900.0);
        let params = layout(500, viewport, SpanMode::SpanHeight, 0.0);
        assert!(params.rows * params.columns >= 500);
        assert!((params.height - 900.0).abs() < 1e-3);
        assert!(params.width <= 1600.0 + 1e-3);
    }

    #[test]
    fn max_tiles_picks_larger_capacity() {
        let viewport = Viewport::new(1280.0, 720.0);
        let chosen = layout(777, viewport, SpanMode::MaxTiles, 0.1);
        let w = layout(777, viewport, SpanMode::SpanWidth, 0.1);
        let h = layout(777, viewport, SpanMode::SpanHeight, 0.1);
        assert_eq!(chosen.capacity, w.capacity.max(h.capacity));
    }

    #[test]
    fn unknown_span_mode_is_an_error() {
        assert_eq!(
            "diagonal".parse::<SpanMode>(),
            Err(ConfigError::UnknownSpanMode("diagonal".into()))
        );
        assert_eq!("maxArea".parse::<SpanMode>(), Ok(SpanMode::MaxArea));
    }

    #[test]
    fn zero_tiles_still_yield_a_grid() {
        let params = layout(0, square(), SpanMode::MaxArea, 0.15);
        assert_eq!((params.rows, params.columns), (1, 1));
        assert_eq!(params.active_tiles, 0);
    }

    #[test]
    fn add_tiles_only_relayouts_past_capacity() {
        // 7 tiles on a square viewport → 3x3 grid with room for 9.
        let mut grid = GridTiler::new(7, square(), 0.15, SpanMode::MaxArea);
        assert_eq!(grid.parameters().capacity, 9);

        assert!(!grid.add_tiles(2, square()));
        assert_eq!(grid.parameters().active_tiles, 9);
        assert_eq!(grid.parameters().capacity, 9);

        assert!(grid.add_tiles(1, square()));
        assert_eq!(grid.parameters().active_tiles, 10);
        assert!(grid.parameters().capacity >= 10);
    }

    #[test]
    fn non_positive_growth_is_a_no_op() {
        let mut grid = GridTiler::new(7, square(), 0.15, SpanMode::MaxArea);
        let before = *grid.parameters();
        assert!(!grid.add_tiles(0, square()));
        assert!(!grid.add_tiles(-3, square()));
        assert_eq!(*grid.parameters(), before);
    }

    #[test]
    fn hit_test_rejects_points_outside_the_grid() {
        let grid = GridTiler::new(7, square(), 0.15, SpanMode::MaxArea);
        assert_eq!(grid.hit_test(Vec2::new(-5.0, 10.0), false), None);
        assert_eq!(grid.hit_test(Vec2::new(10.0, -5.0), false), None);
        assert_eq!(grid.hit_test(Vec2::new(1005.0, 10.0), false), None);
        // Tile 8 exists in the 3x3 layout but only 7 are active.
        let last = Vec2::new(900.0, 900.0);
        assert_eq!(grid.hit_test(last, false), None);
    }

    #[test]
    fn far_away_points_miss() {
        let grid = GridTiler::new(10_000, square(), 0.15, SpanMode::MaxArea);
        assert_eq!(grid.hit_test(Vec2::new(5.0, 1.0e20), false), None);
        assert_eq!(grid.hit_test(Vec2::new(5.0, 1.0e20), true), None);
        assert_eq!(grid.hit_test(Vec2::new(5.0, 1000.5), false), None);
        assert_eq!(grid.hit_test(Vec2::new(f32::MAX, f32::MAX), false), None);
    }

    #[test]
    fn resize_relays_out_and_recenters() {
        let mut grid = GridTiler::new(100, square(), 0.15, SpanMode::MaxArea);
        assert_eq!((grid.parameters().columns, grid.parameters().rows), (10, 10));

        let wide = Viewport::new(1600.0, 500.0);
        grid.resize(wide);
        let p = *grid.parameters();
        assert_eq!(p.active_tiles, 100);
        assert!(p.rows * p.columns >= 100);
        assert!(p.columns > p.rows);
        assert!((2.0 * p.margin_x + p.width - 1600.0).abs() < 1e-2);
        assert!((2.0 * p.margin_y + p.height - 500.0).abs() < 1e-2);
        assert!(p.margin_x >= 0.0 && p.margin_y >= 0.0);

        for index in 0..100 {
            let center = grid.tile_center(index).unwrap();
            assert_eq!(grid.hit_test(center, false), Some(index));
        }
    }

    #[test]
    fn circular_hit_test_rejects_tile_corners() {
        let grid = GridTiler::new(4, square(), 0.2, SpanMode::MaxArea);
        // 2x2 grid of 500px tiles; the dot radius is 200px.
        assert_eq!(grid.hit_test(Vec2::new(250.0, 250.0), true), Some(0));
        assert_eq!(grid.hit_test(Vec2::new(5.0, 5.0), true), None);
        assert_eq!(grid.hit_test(Vec2::new(5.0, 5.0), false), Some(0));
        assert_eq!(grid.hit_test(Vec2::new(760.0, 700.0), true), Some(3));
    }

    #[test]
    fn tile_center_round_trips() {
        let grid = GridTiler::new(37, Viewport::new(800.0, 600.0), 0.15, SpanMode::MaxTiles);
        for index in 0..37 {
            let center = grid.tile_center(index).unwrap();
            assert_eq!(grid.hit_test(center, false), Some(index));
            assert_eq!(grid.hit_test(center, true), Some(index));
        }
        assert_eq!(grid.tile_center(37), None);
    }
}

//! Rasterization of density grids into georeferenced RGBA images.

use hazard_common::{DensityGrid, GeoBounds, HazardError, HazardResult};
use rayon::prelude::*;
use tracing::debug;

use crate::ramp::{color_for, normalize_in, Color};

/// Minimum pixels to benefit from parallel painting
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Largest accepted upscale factor.
pub const MAX_SCALE: usize = 16;

/// RGBA raster covering a geographic rectangle.
///
/// Row 0 of the image is the northern edge of `bounds`.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    scale: usize,
    bounds: GeoBounds,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixels per grid cell along each axis.
    pub fn scale(&self) -> usize {
        self.scale
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// RGBA pixel data (4 bytes per pixel)
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color of pixel `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let p = &self.pixels[idx..idx + 4];
        Some(Color::new(p[0], p[1], p[2], p[3]))
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> HazardResult<Vec<u8>> {
        crate::png::create_png_auto(&self.pixels, self.width, self.height)
    }
}

/// Render a grid with the heat ramp.
///
/// Every cell becomes a `scale × scale` block. Cells holding 0 stay fully
/// transparent; positive cells are colored by their density normalized over
/// the grid's positive range.
pub fn render(grid: &DensityGrid, scale: usize) -> HazardResult<RasterImage> {
    let range = grid.positive_range();
    debug!(
        resolution = grid.resolution(),
        scale,
        min = range.min,
        max = range.max,
        painted_cells = grid.positive_count(),
        "Rendering density grid"
    );
    render_grid(grid, scale, |value| color_for(normalize_in(value, &range)))
}

/// Render a grid with a custom color function applied to positive cells.
///
/// Image row block `k` holds grid row `resolution - 1 - k`: raster rows run
/// north to south while grid rows run south to north.
pub fn render_grid<F>(grid: &DensityGrid, scale: usize, color_fn: F) -> HazardResult<RasterImage>
where
    F: Fn(f64) -> Color + Sync,
{
    if scale == 0 || scale > MAX_SCALE {
        return Err(HazardError::invalid_parameter(
            "scale",
            format!("must be between 1 and {}, got {}", MAX_SCALE, scale),
        ));
    }

    let resolution = grid.resolution();
    let size = resolution * scale;
    let mut pixels = vec![0u8; size * size * 4];

    // One chunk per image row block, i.e. per grid row
    let block_bytes = size * scale * 4;
    let paint_block = |(k, block): (usize, &mut [u8])| {
        let grid_row = resolution - 1 - k;
        paint_row_block(block, grid, grid_row, scale, size, &color_fn);
    };

    if size * size >= PARALLEL_THRESHOLD {
        pixels
            .par_chunks_mut(block_bytes)
            .enumerate()
            .for_each(paint_block);
    } else {
        pixels.chunks_mut(block_bytes).enumerate().for_each(paint_block);
    }

    Ok(RasterImage {
        width: size,
        height: size,
        scale,
        bounds: *grid.bounds(),
        pixels,
    })
}

/// Paint one grid row into its `scale` image rows.
fn paint_row_block<F>(
    block: &mut [u8],
    grid: &DensityGrid,
    grid_row: usize,
    scale: usize,
    width: usize,
    color_fn: &F,
) where
    F: Fn(f64) -> Color,
{
    let row_bytes = width * 4;
    let resolution = grid.resolution();
    let values = &grid.cells()[grid_row * resolution..(grid_row + 1) * resolution];

    // Paint the first image row, then copy it down the block
    {
        let first = &mut block[..row_bytes];
        for (col, &value) in values.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }
            let rgba = color_fn(value).to_array();
            let start = col * scale * 4;
            for px in first[start..start + scale * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }
    for line in 1..scale {
        let (head, tail) = block.split_at_mut(line * row_bytes);
        tail[..row_bytes].copy_from_slice(&head[..row_bytes]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<f64>>) -> DensityGrid {
        let bounds = GeoBounds::new(0.0, 2.0, 0.0, 2.0).unwrap();
        DensityGrid::from_rows(&rows, bounds).unwrap()
    }

    #[test]
    fn test_scale_zero_rejected() {
        let g = grid(vec![vec![1.0]]);
        assert!(matches!(
            render(&g, 0),
            Err(HazardError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_block_copy_fills_scale_rows() {
        let g = grid(vec![vec![0.0, 1.0], vec![0.0, 0.0]]);
        let img = render(&g, 3).unwrap();
        // cell (0, 1) is the south-east cell: image rows 3..6, cols 3..6
        for y in 0..6 {
            for x in 0..6 {
                let painted = !img.pixel(x, y).unwrap().is_transparent();
                assert_eq!(painted, y >= 3 && x >= 3, "pixel ({}, {})", x, y);
            }
        }
    }
}

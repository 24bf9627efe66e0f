use serde::{Deserialize, Serialize};

/// Top-left origin of a square block. The block covers
/// `[x, x + size) x [y, y + size)` in pixel space.
///
/// `x` and `y` are pixel coordinates, not grid indices. They coincide at
/// stride 1; with a larger stride they are multiples of the stride, so
/// distances between blocks (and the match threshold) stay in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub x: u32,
    pub y: u32,
}

/// Enumerates overlapping blocks over a `width x height` grid.
///
/// Blocks are produced column-major: `x` in the outer loop, `y` in the inner
/// loop. With the default stride of 1 consecutive blocks differ by one pixel.
/// Origins are emitted in pixel units for every stride, see [`Block`].
#[derive(Debug, Clone, Copy)]
pub struct BlockPartitioner {
    block_size: u32,
    stride: u32,
}

impl BlockPartitioner {
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size,
            stride: 1,
        }
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Number of block origins along one axis of length `extent`.
    fn origins_along(&self, extent: u32) -> u32 {
        if self.block_size == 0 || self.stride == 0 || extent < self.block_size {
            return 0;
        }

        (extent - self.block_size) / self.stride + 1
    }

    pub fn grid_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (self.origins_along(width), self.origins_along(height))
    }

    pub fn block_count(&self, width: u32, height: u32) -> usize {
        let (bx, by) = self.grid_dimensions(width, height);
        bx as usize * by as usize
    }

    pub fn blocks(&self, width: u32, height: u32) -> impl Iterator<Item = Block> + use<> {
        let (bx, by) = self.grid_dimensions(width, height);
        let stride = self.stride;

        (0..bx).flat_map(move |i| {
            (0..by).map(move |j| Block {
                x: i * stride,
                y: j * stride,
            })
        })
    }
}

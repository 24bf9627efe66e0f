use std::{f64::consts::PI, sync::OnceLock};

use ndarray::Array2;

use crate::{
    FeatureEntry, FeatureKind, FeatureSet,
    analysis::partition::Block,
    image_utils::{PixelSource, Sample},
};

/// The four channel planes of one block, indexed `[[x, y]]` relative to the
/// block origin. Borrowed from the source once and dropped after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockWindow {
    pub red: Array2<f64>,
    pub green: Array2<f64>,
    pub blue: Array2<f64>,
    pub luma: Array2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl BlockWindow {
    pub fn from_fn<F>(size: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> Sample,
    {
        let samples = Array2::from_shape_fn((size, size), |(x, y)| f(x, y));

        Self {
            red: samples.mapv(|s| s.red),
            green: samples.mapv(|s| s.green),
            blue: samples.mapv(|s| s.blue),
            luma: samples.mapv(|s| s.luma),
        }
    }

    pub fn read<S: PixelSource + ?Sized>(source: &S, block: Block, size: u32) -> Self {
        Self::from_fn(size as usize, |x, y| {
            source.sample_at(block.x + x as u32, block.y + y as u32)
        })
    }

    pub fn size(&self) -> usize {
        self.luma.nrows()
    }

    pub fn sample(&self, x: usize, y: usize) -> Sample {
        Sample {
            red: self.red[[x, y]],
            green: self.green[[x, y]],
            blue: self.blue[[x, y]],
            luma: self.luma[[x, y]],
        }
    }

    /// Arithmetic mean of each color channel over the block.
    pub fn channel_means(&self) -> ChannelMeans {
        let mut red = 0.0;
        let mut green = 0.0;
        let mut blue = 0.0;

        for ((r, g), b) in self.red.iter().zip(self.green.iter()).zip(self.blue.iter()) {
            red += r;
            green += g;
            blue += b;
        }

        let count = self.luma.len().max(1) as f64;

        ChannelMeans {
            red: red / count,
            green: green / count,
            blue: blue / count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coefficient {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub luma: f64,
}

/// Transform coefficients of one block, indexed `[[u, v]]` where `u` is the
/// horizontal and `v` the vertical frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientMatrix {
    pub red: Array2<f64>,
    pub green: Array2<f64>,
    pub blue: Array2<f64>,
    pub luma: Array2<f64>,
}

impl CoefficientMatrix {
    pub fn size(&self) -> usize {
        self.luma.nrows()
    }

    pub fn at(&self, u: usize, v: usize) -> Coefficient {
        Coefficient {
            red: self.red[[u, v]],
            green: self.green[[u, v]],
            blue: self.blue[[u, v]],
            luma: self.luma[[u, v]],
        }
    }

    /// Luma coefficient at `(u, v)`, or 0.0 when the block is too small to
    /// carry that frequency.
    pub fn luma_or_zero(&self, u: usize, v: usize) -> f64 {
        self.luma.get([u, v]).copied().unwrap_or(0.0)
    }

    pub fn dc(&self) -> Coefficient {
        self.at(0, 0)
    }
}

/// Orthonormal 2-D type-II DCT over K x K blocks.
///
/// `basis[[u, x]] = alpha(u) * cos((2x + 1) * u * PI / 2K)`, so the forward
/// transform is `B * P * B^T` and the type-III inverse is `B^T * C * B`.
#[derive(Debug, Clone)]
pub struct DctTransform {
    size: usize,
    basis: Array2<f64>,
    basis_t: Array2<f64>,
}

impl DctTransform {
    pub fn new(size: usize) -> Self {
        let basis = Self::compute_basis(size);
        let basis_t = basis.t().to_owned();

        Self {
            size,
            basis,
            basis_t,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alpha(size: usize, frequency: usize) -> f64 {
        if frequency == 0 {
            (1.0 / size as f64).sqrt()
        } else {
            (2.0 / size as f64).sqrt()
        }
    }

    fn compute_basis(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(u, x)| {
            let angle = (2.0 * x as f64 + 1.0) * u as f64 * PI / (2.0 * n as f64);
            Self::alpha(n, u) * angle.cos()
        })
    }

    fn forward_plane(&self, plane: &Array2<f64>) -> Array2<f64> {
        self.basis.dot(plane).dot(&self.basis_t)
    }

    fn inverse_plane(&self, coefficients: &Array2<f64>) -> Array2<f64> {
        self.basis_t.dot(coefficients).dot(&self.basis)
    }

    /// DC term only: `alpha(0)^2 * sum`, i.e. the plane sum divided by K.
    fn dc_plane(&self, plane: &Array2<f64>) -> Array2<f64> {
        let mut coefficients = Array2::zeros((self.size, self.size));
        if self.size > 0 {
            coefficients[[0, 0]] = plane.sum() / self.size as f64;
        }
        coefficients
    }

    pub fn forward(&self, window: &BlockWindow) -> CoefficientMatrix {
        CoefficientMatrix {
            red: self.forward_plane(&window.red),
            green: self.forward_plane(&window.green),
            blue: self.forward_plane(&window.blue),
            luma: self.forward_plane(&window.luma),
        }
    }

    /// Luma gets every frequency; the color channels only carry their DC term
    /// and are zero elsewhere.
    pub fn forward_for_features(&self, window: &BlockWindow) -> CoefficientMatrix {
        CoefficientMatrix {
            red: self.dc_plane(&window.red),
            green: self.dc_plane(&window.green),
            blue: self.dc_plane(&window.blue),
            luma: self.forward_plane(&window.luma),
        }
    }

    pub fn inverse(&self, coefficients: &CoefficientMatrix) -> BlockWindow {
        BlockWindow {
            red: self.inverse_plane(&coefficients.red),
            green: self.inverse_plane(&coefficients.green),
            blue: self.inverse_plane(&coefficients.blue),
            luma: self.inverse_plane(&coefficients.luma),
        }
    }
}

/// Turns one block into its descriptor entries.
///
/// The K x K basis is built on first use, so an extractor for a block size
/// larger than the image never allocates it.
#[derive(Debug, Clone)]
pub struct DctFeatureExtractor {
    block_size: u32,
    transform: OnceLock<DctTransform>,
    features: FeatureSet,
}

impl DctFeatureExtractor {
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size,
            transform: OnceLock::new(),
            features: FeatureSet::default(),
        }
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn features_per_block(&self) -> usize {
        self.features.len()
    }

    pub fn transform(&self) -> &DctTransform {
        self.transform
            .get_or_init(|| DctTransform::new(self.block_size as usize))
    }

    pub fn is_transform_built(&self) -> bool {
        self.transform.get().is_some()
    }

    /// The full nine-slot descriptor in canonical order:
    /// `[luma(0,0), luma(0,1), luma(1,0), red(0,0), green(0,0), blue(0,0),
    /// avg red, avg blue, avg green]`.
    pub fn feature_vector(&self, window: &BlockWindow) -> [f64; 9] {
        let coefficients = self.transform().forward_for_features(window);
        let means = window.channel_means();

        FeatureKind::ALL.map(|kind| Self::feature_value(kind, &coefficients, &means))
    }

    fn feature_value(kind: FeatureKind, coefficients: &CoefficientMatrix, means: &ChannelMeans) -> f64 {
        match kind {
            FeatureKind::LumaDc => coefficients.luma_or_zero(0, 0),
            FeatureKind::LumaVertical => coefficients.luma_or_zero(0, 1),
            FeatureKind::LumaHorizontal => coefficients.luma_or_zero(1, 0),
            FeatureKind::RedDc => coefficients.dc().red,
            FeatureKind::GreenDc => coefficients.dc().green,
            FeatureKind::BlueDc => coefficients.dc().blue,
            FeatureKind::AverageRed => means.red,
            FeatureKind::AverageBlue => means.blue,
            FeatureKind::AverageGreen => means.green,
        }
    }

    pub fn extract_into<S: PixelSource + ?Sized>(
        &self,
        source: &S,
        block: Block,
        out: &mut Vec<FeatureEntry>,
    ) {
        let window = BlockWindow::read(source, block, self.block_size);
        let vector = self.feature_vector(&window);

        out.extend(
            FeatureKind::ALL
                .iter()
                .zip(vector)
                .filter(|(kind, _)| self.features.contains(**kind))
                .map(|(&kind, value)| FeatureEntry {
                    x: block.x,
                    y: block.y,
                    kind,
                    value,
                }),
        );
    }

    pub fn extract<S: PixelSource + ?Sized>(&self, source: &S, block: Block) -> Vec<FeatureEntry> {
        let mut entries = Vec::with_capacity(self.features.len());
        self.extract_into(source, block, &mut entries);
        entries
    }
}

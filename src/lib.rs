use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{copy_move::CopyMoveDetector, duplicate::DistancePredicate},
    error::{ForensicsError, Result},
};

pub mod analysis;
pub mod error;
pub mod image_utils;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub block_size: u32,
    pub threshold: f64,
    pub stride: u32,
    pub predicate: DistancePredicate,
    pub features: FeatureSet,
    pub parallel: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            block_size: 4,
            threshold: 10.0,
            stride: 1,
            predicate: DistancePredicate::Below,
            features: FeatureSet::default(),
            parallel: false,
        }
    }
}

impl DetectionConfig {
    /// Parses a JSON object; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_predicate(mut self, predicate: DistancePredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(ForensicsError::InvalidConfiguration(
                "Block size must be positive".into(),
            ));
        }

        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ForensicsError::InvalidConfiguration(format!(
                "Threshold must be a positive number, got {}",
                self.threshold
            )));
        }

        if self.stride == 0 {
            return Err(ForensicsError::InvalidConfiguration(
                "Stride must be positive".into(),
            ));
        }

        if self.features.is_empty() {
            return Err(ForensicsError::InvalidConfiguration(
                "At least one feature must be selected".into(),
            ));
        }

        Ok(())
    }
}

pub struct ForgeryAnalyzer {
    original: DynamicImage,
    config: DetectionConfig,
    path: Option<String>,
}

impl ForgeryAnalyzer {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let original = image::open(&path)?;

        Ok(Self {
            original,
            config: DetectionConfig::default(),
            path: Some(path_str),
        })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            original: image,
            config: DetectionConfig::default(),
            path: None,
        }
    }

    pub fn with_config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn detect_copy_move(&self) -> Result<CopyMoveResult> {
        let detector = CopyMoveDetector::new(&self.config)?;
        detector.detect_image(&self.original)
    }
}

/// The nine per-block descriptors, declared in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Luma coefficient at `(0, 0)`.
    LumaDc,
    /// Luma coefficient at `(0, 1)`.
    LumaVertical,
    /// Luma coefficient at `(1, 0)`.
    LumaHorizontal,
    RedDc,
    GreenDc,
    BlueDc,
    AverageRed,
    AverageBlue,
    AverageGreen,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 9] = [
        FeatureKind::LumaDc,
        FeatureKind::LumaVertical,
        FeatureKind::LumaHorizontal,
        FeatureKind::RedDc,
        FeatureKind::GreenDc,
        FeatureKind::BlueDc,
        FeatureKind::AverageRed,
        FeatureKind::AverageBlue,
        FeatureKind::AverageGreen,
    ];
}

/// Selection of descriptors emitted per block. Emission always follows
/// [`FeatureKind::ALL`] regardless of how the set was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    kinds: Vec<FeatureKind>,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            kinds: FeatureKind::ALL.to_vec(),
        }
    }
}

impl FeatureSet {
    pub fn only(kinds: &[FeatureKind]) -> Self {
        Self {
            kinds: FeatureKind::ALL
                .into_iter()
                .filter(|kind| kinds.contains(kind))
                .collect(),
        }
    }

    pub fn contains(&self, kind: FeatureKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn len(&self) -> usize {
        FeatureKind::ALL.iter().filter(|&&kind| self.contains(kind)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kinds(&self) -> impl Iterator<Item = FeatureKind> + '_ {
        FeatureKind::ALL.into_iter().filter(|&kind| self.contains(kind))
    }
}

/// One scalar descriptor of the block whose origin is `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub x: u32,
    pub y: u32,
    pub kind: FeatureKind,
    pub value: f64,
}

/// Two entries that ended up next to each other after sorting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub first: FeatureEntry,
    pub second: FeatureEntry,
    pub distance: f64,
}

impl MatchCandidate {
    pub fn origins(&self) -> ((u32, u32), (u32, u32)) {
        ((self.first.x, self.first.y), (self.second.x, self.second.y))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyMoveResult {
    pub candidates: Vec<MatchCandidate>,
    pub block_count: usize,
    pub feature_count: usize,
}

impl CopyMoveResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

use std::time::Instant;

use image::DynamicImage;
use log::{debug, info, warn};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    CopyMoveResult, DetectionConfig,
    analysis::{
        dct::DctFeatureExtractor,
        duplicate::DuplicateDetector,
        feature_index::FeatureIndex,
        partition::{Block, BlockPartitioner},
    },
    error::Result,
    image_utils::{PixelSource, SampleImage},
};

/// Block-matching copy-move detector: partition, describe, sort, scan.
pub struct CopyMoveDetector {
    partitioner: BlockPartitioner,
    extractor: DctFeatureExtractor,
    duplicates: DuplicateDetector,
    parallel: bool,
}

impl CopyMoveDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            partitioner: BlockPartitioner::new(config.block_size).with_stride(config.stride),
            extractor: DctFeatureExtractor::new(config.block_size)
                .with_features(config.features.clone()),
            duplicates: DuplicateDetector::new(config.threshold).with_predicate(config.predicate),
            parallel: config.parallel,
        })
    }

    pub fn detect_image(&self, image: &DynamicImage) -> Result<CopyMoveResult> {
        let samples = SampleImage::from_dynamic(image);
        self.detect(&samples)
    }

    pub fn detect<S: PixelSource + Sync + ?Sized>(&self, source: &S) -> Result<CopyMoveResult> {
        let start = Instant::now();
        let (width, height) = source.dimensions();

        let block_count = self.partitioner.block_count(width, height);
        if block_count == 0 {
            warn!(
                "Image {}x{} is smaller than block size {}, nothing to compare",
                width,
                height,
                self.partitioner.block_size()
            );
            return Ok(CopyMoveResult::default());
        }

        let index = self.extract_features(source);
        let feature_count = index.len();
        debug!(
            "Extracted {} features from {} blocks in {:.2?}",
            feature_count,
            block_count,
            start.elapsed()
        );

        let sort_start = Instant::now();
        let sorted = index.into_sorted();
        debug!("Sorted feature index in {:.2?}", sort_start.elapsed());

        let candidates = self.duplicates.scan(&sorted);
        info!(
            "Copy-move scan found {} candidate(s) over {} blocks in {:.2?}",
            candidates.len(),
            block_count,
            start.elapsed()
        );

        Ok(CopyMoveResult {
            candidates,
            block_count,
            feature_count,
        })
    }

    /// Builds the unsorted index, blocks in partitioner order.
    pub fn extract_features<S: PixelSource + Sync + ?Sized>(&self, source: &S) -> FeatureIndex {
        let (width, height) = source.dimensions();
        let capacity = self.partitioner.block_count(width, height) * self.extractor.features_per_block();

        if self.parallel {
            let blocks = self.partitioner.blocks(width, height).collect::<Vec<Block>>();
            let per_block = blocks
                .par_iter()
                .map(|&block| self.extractor.extract(source, block))
                .collect::<Vec<_>>();

            let mut index = FeatureIndex::with_capacity(capacity);
            index.extend(per_block.into_iter().flatten());
            index
        } else {
            let mut entries = Vec::with_capacity(capacity);
            for block in self.partitioner.blocks(width, height) {
                self.extractor.extract_into(source, block, &mut entries);
            }
            FeatureIndex::from_entries(entries)
        }
    }
}

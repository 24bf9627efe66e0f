use std::env;

use copy_move_forensics::{DetectionConfig, ForgeryAnalyzer};
use flexi_logger::Logger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let mut args = env::args().skip(1);
    let image_path = args.next().unwrap_or_else(|| "evidences/copy_move.png".into());
    let config = match args.next() {
        Some(config_path) => DetectionConfig::from_path(config_path)?,
        None => DetectionConfig::default(),
    };

    let analyzer = ForgeryAnalyzer::new(&image_path)?.with_config(config);
    let result = analyzer.detect_copy_move()?;

    println!("Blocks: {}", result.block_count);
    println!("Features: {}", result.feature_count);
    println!("Candidates: {}", result.candidates.len());

    for (i, candidate) in result.candidates.iter().take(10).enumerate() {
        let ((x0, y0), (x1, y1)) = candidate.origins();
        println!(
            "  {}. ({}, {}) -> ({}, {}) | {:?} {:.3} | distance {:.2}",
            i + 1,
            x0,
            y0,
            x1,
            y1,
            candidate.first.kind,
            candidate.first.value,
            candidate.distance
        );
    }

    if result.candidates.len() > 10 {
        println!("  ... and {} more candidates", result.candidates.len() - 10);
    }

    Ok(())
}

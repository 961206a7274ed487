use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageBuffer, Rgb};
use nutriscan::classify::{HistogramClassifier, RuleClassifier};
use nutriscan::ensemble::{EnsembleCombiner, MethodVotes};
use nutriscan::features::FeatureExtractor;
use nutriscan::{AnalysisOptions, AnalyzerConfig, DetectionMethod, FoodAnalyzer};
use std::io::Cursor;

fn plate(size: u32) -> DynamicImage {
    let colors = [[200u8, 40, 40], [245, 245, 245], [140, 90, 40], [20, 200, 30]];
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(size, size, |x, y| {
        Rgb(colors[((x / 9 + y / 13) % 4) as usize])
    }))
}

fn benchmark_feature_extraction(c: &mut Criterion) {
    let extractor = FeatureExtractor::new();
    let image = plate(640);
    c.bench_function("extract_features_640", |b| {
        b.iter(|| extractor.extract(black_box(&image)))
    });
}

fn benchmark_local_classification(c: &mut Criterion) {
    let features = FeatureExtractor::new().extract(&plate(640));
    let rules = RuleClassifier::new();
    let histogram = HistogramClassifier::new();
    let combiner = EnsembleCombiner::default();

    c.bench_function("classify_and_combine", |b| {
        b.iter(|| {
            let mut votes = MethodVotes::new();
            votes.record(
                DetectionMethod::FeatureMatching,
                Some(rules.classify(black_box(&features))),
            );
            votes.record(
                DetectionMethod::ColorHistogram,
                Some(histogram.classify(black_box(&features))),
            );
            combiner.combine(&votes, features.dominant_hue)
        })
    });
}

fn benchmark_offline_analysis(c: &mut Criterion) {
    let analyzer = match FoodAnalyzer::new(AnalyzerConfig::offline()) {
        Ok(analyzer) => analyzer,
        Err(e) => panic!("analyzer setup failed: {}", e),
    };
    let mut bytes = Cursor::new(Vec::new());
    if let Err(e) = plate(480).write_to(&mut bytes, image::ImageFormat::Png) {
        panic!("encoding failed: {}", e);
    }
    let photo = match nutriscan::image_loader::decode_bytes(bytes.into_inner()) {
        Ok(photo) => photo,
        Err(e) => panic!("decoding failed: {}", e),
    };
    let options = AnalysisOptions::default();

    c.bench_function("analyze_offline_480", |b| {
        b.iter(|| analyzer.analyze(black_box(&photo), &options))
    });
}

criterion_group!(
    benches,
    benchmark_feature_extraction,
    benchmark_local_classification,
    benchmark_offline_analysis
);
criterion_main!(benches);

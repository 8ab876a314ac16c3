use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;
use strokematch::dtw::dtw;
use strokematch::recognizer::RecognizerBuildParams;
use strokematch::{
    HandwritingRecognizer, Point, Recognizer, RecognizerOptions, Stroke, TemplateModel, Writing,
};

/// A jittered multi-stroke glyph, roughly the size of a kanji sample.
fn random_writing(rng: &mut fastrand::Rng) -> Writing {
    let mut w = Writing::new();
    for _ in 0..rng.usize(2..8) {
        let (mut x, mut y) = (rng.i32(100..900), rng.i32(100..900));
        let mut stroke = Stroke::new();
        for _ in 0..rng.usize(10..30) {
            x = (x + rng.i32(-40..=40)).clamp(0, 999);
            y = (y + rng.i32(-40..=40)).clamp(0, 999);
            stroke.append_point(Point::new(x, y));
        }
        w.append_stroke(stroke).expect("stroke has points");
    }
    w
}

fn setup_recognizer(n_templates: usize, parallel: bool) -> (Recognizer, Writing) {
    let mut rng = fastrand::Rng::with_seed(42);
    let options = RecognizerOptions {
        parallel,
        ..Default::default()
    };
    let mut model = TemplateModel::new(2).unwrap();
    for i in 0..n_templates {
        let features = options
            .features
            .preprocess(&random_writing(&mut rng), options.downsample_threshold)
            .unwrap();
        model.insert(format!("c{}", i), features).unwrap();
    }

    let recognizer = RecognizerBuildParams::builder()
        .model(Arc::new(model))
        .options(options)
        .build()
        .build_recognizer()
        .expect("Failed to build recognizer");
    (recognizer, random_writing(&mut rng))
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(7);
    let s: Vec<f32> = (0..2 * 40).map(|_| rng.f32() * 100.0).collect();
    let t: Vec<f32> = (0..2 * 55).map(|_| rng.f32() * 100.0).collect();
    c.bench_function("dtw (40x55 vectors)", |b| {
        b.iter(|| dtw(black_box(&s), black_box(&t), 2))
    });

    let (seq, query) = setup_recognizer(2000, false);
    c.bench_function("recognize sequential (2k templates)", |b| {
        b.iter(|| seq.recognize(black_box(&query), 10))
    });

    let (par, query) = setup_recognizer(2000, true);
    c.bench_function("recognize parallel (2k templates)", |b| {
        b.iter(|| par.recognize(black_box(&query), 10))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

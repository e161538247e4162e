use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use image_prep::metadata::Tag;
use image_prep::watermark::MIN_FONT_SIZE_CAP;
use image_prep::{
    default_output_dir, save_image, BatchSummary, Error, ImageAsset, Metadata, ProcessingOptions,
    Processor, Watermarker,
};

fn write_jpeg(path: &Path, width: u32, height: u32, metadata: &Metadata) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            u8::try_from(x % 256).unwrap(),
            u8::try_from(y % 256).unwrap(),
            90,
        ])
    });
    save_image(&DynamicImage::ImageRgb8(img), metadata, path, 90).unwrap();
}

fn camera_metadata() -> Metadata {
    let mut meta = Metadata::new();
    meta.set_text(Tag::Make, "Acme");
    meta.set_text(Tag::Model, "Shooter 3000");
    meta
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn only_jpegs_are_resized_into_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    write_jpeg(&input.path().join("a.jpg"), 2000, 1000, &Metadata::new());
    RgbImage::new(50, 50)
        .save(input.path().join("b.png"))
        .unwrap();
    std::fs::create_dir(input.path().join("nested.jpg")).unwrap();

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    let results = processor
        .process_directory(input.path(), output.path())
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].dimensions, Some((1080, 540)));
    assert_eq!(listing(output.path()), vec!["a.jpg"]);

    let out = image::open(output.path().join("a.jpg")).unwrap();
    assert_eq!((out.width(), out.height()), (1080, 540));
}

#[test]
fn uppercase_extensions_are_ignored() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("shout.JPG"), 20, 20, &Metadata::new());
    write_jpeg(&input.path().join("quiet.jpeg"), 20, 20, &Metadata::new());

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    let results = processor
        .process_directory(input.path(), output.path())
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(listing(output.path()), vec!["quiet.jpeg"]);
}

#[test]
fn small_images_keep_their_size() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("small.jpg"), 300, 200, &Metadata::new());

    let processor = Processor::new(ProcessingOptions {
        max_size: 5000,
        ..ProcessingOptions::default()
    })
    .unwrap();
    let results = processor
        .process_directory(input.path(), output.path())
        .unwrap();

    assert_eq!(results[0].dimensions, Some((300, 200)));
}

#[test]
fn portrait_ratio_is_preserved() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("tall.jpg"), 1000, 3000, &Metadata::new());

    let processor = Processor::new(ProcessingOptions {
        max_size: 600,
        ..ProcessingOptions::default()
    })
    .unwrap();
    processor
        .process_directory(input.path(), output.path())
        .unwrap();

    let out = image::open(output.path().join("tall.jpg")).unwrap();
    assert_eq!((out.width(), out.height()), (200, 600));
}

#[test]
fn corrupt_files_are_skipped_without_aborting() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("good.jpg"), 40, 30, &Metadata::new());
    std::fs::write(input.path().join("broken.jpg"), b"\xFF\xD8 truncated").unwrap();

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    let results = processor
        .process_directory(input.path(), output.path())
        .unwrap();

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);

    let broken = results
        .iter()
        .find(|r| r.path.ends_with("broken.jpg"))
        .unwrap();
    assert!(!broken.success);
    assert!(broken.message.starts_with("Failed to load"));
    assert_eq!(listing(output.path()), vec!["good.jpg"]);
}

#[test]
fn missing_input_directory_is_fatal_and_writes_nothing() {
    let scratch = tempfile::tempdir().unwrap();
    let input = scratch.path().join("does-not-exist");
    let output = scratch.path().join("out");

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    let err = processor.process_directory(&input, &output).unwrap_err();

    assert!(matches!(err, Error::InputDirectory { .. }));
    assert!(err.is_fatal());
    assert!(!output.exists());
}

#[test]
fn uncreatable_output_directory_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("a.jpg"), 10, 10, &Metadata::new());
    let blocker = input.path().join("blocker.txt");
    std::fs::write(&blocker, b"a file, not a directory").unwrap();

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    let err = processor
        .process_directory(input.path(), &blocker.join("out"))
        .unwrap_err();
    assert!(matches!(err, Error::OutputDirectory { .. }));
}

#[test]
fn default_output_directory_is_created_inside_input() {
    let input = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("a.jpg"), 10, 10, &Metadata::new());
    let output = default_output_dir(input.path());

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    processor.process_directory(input.path(), &output).unwrap();
    assert!(output.join("a.jpg").is_file());

    // A second run sees `output/` as a directory and leaves it alone.
    let again = processor.process_directory(input.path(), &output).unwrap();
    assert_eq!(again.len(), 1);
}

#[test]
fn stripping_removes_existing_metadata() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("cam.jpg"), 20, 20, &camera_metadata());

    let processor = Processor::new(ProcessingOptions::default()).unwrap();
    processor
        .process_directory(input.path(), output.path())
        .unwrap();

    let out = ImageAsset::load(&output.path().join("cam.jpg")).unwrap();
    assert!(out.metadata.is_empty());
}

#[test]
fn metadata_is_carried_over_without_stripping() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("cam.jpg"), 20, 20, &camera_metadata());

    let processor = Processor::new(ProcessingOptions {
        strip_metadata: false,
        ..ProcessingOptions::default()
    })
    .unwrap();
    processor
        .process_directory(input.path(), output.path())
        .unwrap();

    let out = ImageAsset::load(&output.path().join("cam.jpg")).unwrap();
    assert_eq!(out.metadata.text(Tag::Make).as_deref(), Some("Acme"));
    assert_eq!(
        out.metadata.text(Tag::Model).as_deref(),
        Some("Shooter 3000")
    );
}

fn fixture_font() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSansMono.ttf")
}

#[test]
fn rights_holder_is_tagged_and_watermarked() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("cam.jpg"), 800, 400, &camera_metadata());

    let opts = ProcessingOptions {
        rights_holder: Some("Jane Doe".into()),
        font: Some(fixture_font()),
        ..ProcessingOptions::default()
    };
    assert_eq!(opts.watermark(), Some("Jane Doe"));
    let processor = Processor::new(opts).unwrap();
    let results = processor
        .process_directory(input.path(), output.path())
        .unwrap();

    let plan = results[0].watermark.unwrap();
    assert!(f64::from(plan.text_width) >= 720.0);

    let out = ImageAsset::load(&output.path().join("cam.jpg")).unwrap();
    assert_eq!(out.metadata.artist().as_deref(), Some("Jane Doe"));
    assert_eq!(out.metadata.len(), 1);
    assert_eq!(out.dimensions(), (800, 400));
}

#[test]
fn short_watermark_fills_a_panorama() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    // 90% of 6000px needs a font size beyond 4096 for two glyphs.
    write_jpeg(&input.path().join("wide.jpg"), 6000, 300, &Metadata::new());

    let watermarker = Watermarker::load(Some(fixture_font().as_path())).unwrap();
    let opts = ProcessingOptions {
        max_size: 6000,
        watermark_text: Some("JD".into()),
        ..ProcessingOptions::default()
    };
    let processor = Processor::with_watermarker(opts, watermarker).unwrap();
    let results = processor
        .process_directory(input.path(), output.path())
        .unwrap();

    assert!(results[0].success, "{:?}", results[0].message);
    let plan = results[0].watermark.unwrap();
    assert!(f64::from(plan.text_width) >= 5400.0);
    assert!(plan.font_size > MIN_FONT_SIZE_CAP);
}

#[test]
fn watermark_plan_is_stable_across_runs() {
    let input = tempfile::tempdir().unwrap();
    write_jpeg(&input.path().join("a.jpg"), 1080, 720, &Metadata::new());

    let opts = ProcessingOptions {
        watermark_text: Some("Jane Doe".into()),
        font: Some(fixture_font()),
        ..ProcessingOptions::default()
    };
    let processor = Processor::new(opts).unwrap();

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let a = processor.process_directory(input.path(), first.path()).unwrap();
    let b = processor.process_directory(input.path(), second.path()).unwrap();

    assert_eq!(a[0].watermark, b[0].watermark);
    assert_eq!(
        std::fs::read(first.path().join("a.jpg")).unwrap(),
        std::fs::read(second.path().join("a.jpg")).unwrap()
    );
}

//! End-to-end tests for the batch driver.

mod common;

use std::path::{Path, PathBuf};

use datemark_core::{
    resolve_capture_date, Config, DatemarkError, DateSource, OutcomeStatus, ProcessOptions,
};
use exif::Tag;

use common::{processor, write_bytes, write_jpeg_with_exif, write_png};

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap()
}

#[tokio::test]
async fn jpeg_with_original_date_is_stamped_bottom_right() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photos");
    write_jpeg_with_exif(
        &input.join("shot.jpg"),
        400,
        200,
        &[(Tag::DateTimeOriginal, "2022:01:01 00:00:00")],
    );

    let report = processor(&Config::default())
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap();

    let expected_root = canonical(dir.path()).join("photos_watermark");
    assert_eq!(report.output_root, expected_root);
    assert_eq!((report.succeeded, report.failed, report.skipped), (1, 0, 0));

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.text.as_deref(), Some("2022-01-01"));
    assert_eq!(outcome.date_source, Some(DateSource::DateTimeOriginal));

    let output = expected_root.join("shot.jpg");
    assert_eq!(outcome.output.as_deref(), Some(output.as_path()));

    // Default font size 20 -> 160x16 text box at (230, 174) on a black image.
    // Allow one JPEG block of slack around it.
    let rendered = image::open(&output).unwrap().to_luma8();
    let (box_x, box_y) = (400 - 160 - 10, 200 - 16 - 10);
    let mut lit_inside = 0;
    for (x, y, px) in rendered.enumerate_pixels() {
        let near_box = x + 8 >= box_x && y + 8 >= box_y;
        if px.0[0] > 100 {
            assert!(near_box, "bright pixel at ({x},{y}) away from bottom-right");
            lit_inside += 1;
        }
    }
    assert!(lit_inside > 0, "no watermark pixels found");
}

#[tokio::test]
async fn unsupported_files_are_skipped_silently() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("docs");
    write_bytes(&input.join("notes.txt"), b"not a photo");

    let report = processor(&Config::default())
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!((report.succeeded, report.failed, report.skipped), (0, 0, 1));
    assert!(report.outcomes.is_empty());
    assert!(!report.output_root.exists());
}

#[tokio::test]
async fn missing_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing");

    let err = processor(&Config::default())
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DatemarkError::InputNotFound(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn corrupt_file_does_not_abort_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mixed");
    write_bytes(&input.join("a_broken.jpg"), &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
    write_png(&input.join("b_fine.png"), 80, 60, [30, 30, 30]);

    let report = processor(&Config::default())
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert_eq!(report.outcomes[0].status, OutcomeStatus::Failed);
    assert!(report.outcomes[0].error.is_some());
    assert_eq!(report.outcomes[1].status, OutcomeStatus::Succeeded);
    assert_eq!(report.outcomes[1].text.as_deref(), Some("no date"));
    assert!(report.output_root.join("b_fine.png").is_file());
    assert!(!report.output_root.join("a_broken.jpg").exists());
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("album");
    write_png(&input.join("undated.png"), 120, 90, [90, 120, 150]);
    write_jpeg_with_exif(
        &input.join("dated.jpg"),
        160,
        120,
        &[(Tag::DateTimeDigitized, "2019:07:04 12:00:00")],
    );

    let processor = processor(&Config::default());
    let first = processor
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap();
    let snapshot: Vec<Vec<u8>> = first
        .outcomes
        .iter()
        .map(|o| std::fs::read(o.output.as_ref().unwrap()).unwrap())
        .collect();

    let second = processor
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap();
    for (outcome, before) in second.outcomes.iter().zip(&snapshot) {
        let after = std::fs::read(outcome.output.as_ref().unwrap()).unwrap();
        assert_eq!(&after, before, "{:?} changed between runs", outcome.output);
    }
}

#[tokio::test]
async fn nested_directories_are_mirrored_with_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photos");
    write_png(&input.join("2023/may/a.png"), 60, 40, [0, 0, 0]);
    write_png(&input.join("top.png"), 60, 40, [0, 0, 0]);

    let mut config = Config::default();
    config.processing.suffix = Some("_watermarked".to_string());
    let report = processor(&config)
        .process_path(&input, &ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert!(report.output_root.join("2023/may/a_watermarked.png").is_file());
    assert!(report.output_root.join("top_watermarked.png").is_file());
}

#[tokio::test]
async fn single_file_goes_to_parent_sibling() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("trip").join("beach.png");
    write_png(&file, 64, 64, [200, 180, 160]);
    let original = std::fs::read(&file).unwrap();

    let report = processor(&Config::default())
        .process_path(&file, &ProcessOptions::default())
        .await
        .unwrap();

    let expected = canonical(dir.path()).join("trip_watermark").join("beach.png");
    assert_eq!(report.succeeded, 1);
    assert!(expected.is_file());
    assert_eq!(std::fs::read(&file).unwrap(), original, "input was modified");
}

#[tokio::test]
async fn explicit_output_dir_overrides_sibling() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photos");
    write_png(&input.join("a.png"), 40, 40, [0, 0, 0]);
    let out = dir.path().join("elsewhere");

    let options = ProcessOptions {
        output_dir: Some(out.clone()),
    };
    let report = processor(&Config::default())
        .process_path(&input, &options)
        .await
        .unwrap();

    assert_eq!(report.output_root, canonical(dir.path()).join("elsewhere"));
    assert!(out.join("a.png").is_file());
    assert!(!dir.path().join("photos_watermark").exists());
}

#[tokio::test]
async fn output_dir_equal_to_input_dir_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("trip").join("beach.png");
    write_png(&file, 64, 64, [200, 180, 160]);
    let original = std::fs::read(&file).unwrap();

    let options = ProcessOptions {
        output_dir: Some(dir.path().join("trip")),
    };
    let report = processor(&Config::default())
        .process_path(&file, &options)
        .await
        .unwrap();

    assert_eq!((report.succeeded, report.failed), (0, 1));
    assert_eq!(report.outcomes[0].status, OutcomeStatus::Failed);
    assert!(report.outcomes[0].output.is_none());
    assert_eq!(std::fs::read(&file).unwrap(), original, "input was modified");

    let mut config = Config::default();
    config.processing.suffix = Some("_dated".to_string());
    let report = processor(&config).process_path(&file, &options).await.unwrap();
    assert_eq!(report.succeeded, 1);
    assert!(dir.path().join("trip").join("beach_dated.png").is_file());
    assert_eq!(std::fs::read(&file).unwrap(), original, "input was modified");
}

#[tokio::test]
async fn winding_output_dir_inside_input_is_still_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("photos");
    write_png(&input.join("a.png"), 40, 40, [0, 0, 0]);

    let options = ProcessOptions {
        output_dir: Some(input.join("../photos/out")),
    };
    let processor = processor(&Config::default());
    processor.process_path(&input, &options).await.unwrap();
    let second = processor.process_path(&input, &options).await.unwrap();

    let out = canonical(&input).join("out");
    assert_eq!(second.output_root, out);
    assert_eq!(second.succeeded, 1);
    assert!(second.outcomes.iter().all(|o| !o.input.starts_with(&out)));
    assert!(!out.join("out").exists());
}

#[tokio::test]
async fn parallel_workers_match_sequential_results() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("many");
    for i in 0..6 {
        write_png(&input.join(format!("img{i}.png")), 50 + i * 10, 40, [10, 20, 30]);
    }

    let sequential = processor(&Config::default())
        .process_path(
            &input,
            &ProcessOptions {
                output_dir: Some(dir.path().join("seq")),
            },
        )
        .await
        .unwrap();

    let mut config = Config::default();
    config.processing.parallel_workers = 3;
    let parallel = processor(&config)
        .process_path(
            &input,
            &ProcessOptions {
                output_dir: Some(dir.path().join("par")),
            },
        )
        .await
        .unwrap();

    assert_eq!(parallel.succeeded, 6);
    let seq_inputs: Vec<_> = sequential.outcomes.iter().map(|o| &o.input).collect();
    let par_inputs: Vec<_> = parallel.outcomes.iter().map(|o| &o.input).collect();
    assert_eq!(seq_inputs, par_inputs);

    for i in 0..6 {
        let name = format!("img{i}.png");
        assert_eq!(
            std::fs::read(dir.path().join("seq").join(&name)).unwrap(),
            std::fs::read(dir.path().join("par").join(&name)).unwrap()
        );
    }
}

#[tokio::test]
async fn progress_callback_sees_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cb");
    write_png(&input.join("a.png"), 30, 30, [0, 0, 0]);
    write_png(&input.join("b.png"), 30, 30, [0, 0, 0]);

    let mut seen = Vec::new();
    processor(&Config::default())
        .process_path_with(&input, &ProcessOptions::default(), |o| {
            seen.push(o.input.clone())
        })
        .await
        .unwrap();

    assert_eq!(seen.len(), 2);
}

#[test]
fn fixture_jpeg_carries_readable_exif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.jpg");
    write_jpeg_with_exif(&path, 16, 16, &[(Tag::DateTime, "20200229")]);

    let resolved = resolve_capture_date(&std::fs::read(&path).unwrap());
    assert_eq!(resolved.date().unwrap().to_string(), "2020-02-29");
    assert_eq!(resolved.source(), Some(DateSource::DateTime));
}

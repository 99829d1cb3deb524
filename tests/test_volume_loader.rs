mod common;

use common::{TextSliceParser, write_fake_slice, write_png};
use dicom_mpr::{
    PlaneAxis, VolumeLoader, VolumeLoaderError,
    volume_loader::{DEFAULT_CALIBRATED_MODALITY, IMAGE_STACK_MODALITY},
};

fn text_loader() -> VolumeLoader {
    VolumeLoader::new(Some(Box::new(TextSliceParser)))
}

// ---------------------------------------------------------------------------
// Image stack fallback
// ---------------------------------------------------------------------------

#[test]
fn test_png_stack_without_calibrated_support() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "b.png", 4, 3, 20);
    write_png(dir.path(), "a.png", 4, 3, 10);
    write_png(dir.path(), "c.png", 4, 3, 30);
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let (volume, metadata) = VolumeLoader::image_stack_only()
        .load_from_directory(dir.path())
        .unwrap();

    assert_eq!(volume.dim(), (3, 3, 4));
    let firsts: Vec<f32> = (0..3)
        .map(|d| volume.extract_slice(PlaneAxis::Axial, d)[[0, 0]])
        .collect();
    assert_eq!(firsts, vec![10.0, 20.0, 30.0]);
    assert_eq!(metadata.modality, IMAGE_STACK_MODALITY);
    assert_eq!(metadata.num_slices, 3);
    assert_eq!((metadata.rows, metadata.columns), (3, 4));
}

#[test]
fn test_image_stack_orders_by_name_across_extensions() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "slice_2.png", 2, 2, 2);
    write_png(dir.path(), "slice_1.bmp", 2, 2, 1);
    write_png(dir.path(), "slice_3.tif", 2, 2, 3);

    let (volume, _) = VolumeLoader::image_stack_only()
        .load_from_directory(dir.path())
        .unwrap();

    let values: Vec<f32> = volume
        .extract_slice(PlaneAxis::Coronal, 0)
        .column(0)
        .to_vec();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_dcm_files_ignored_without_calibrated_support() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(dir.path(), "a.dcm", &["seq=1"]);
    write_png(dir.path(), "a.png", 2, 2, 7);

    let (volume, metadata) = VolumeLoader::image_stack_only()
        .load_from_directory(dir.path())
        .unwrap();
    assert_eq!(volume.dim(), (1, 2, 2));
    assert_eq!(metadata.modality, IMAGE_STACK_MODALITY);
}

#[test]
fn test_parser_without_candidates_falls_back_to_images() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "only.png", 5, 2, 0);

    let (volume, _) = text_loader().load_from_directory(dir.path()).unwrap();
    assert_eq!(volume.dim(), (1, 2, 5));
}

#[test]
fn test_empty_folder_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = VolumeLoader::image_stack_only()
        .load_from_directory(dir.path())
        .unwrap_err();
    assert!(matches!(err, VolumeLoaderError::NoSupportedFiles { .. }));
}

#[test]
fn test_mismatched_image_sizes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "a.png", 4, 4, 0);
    write_png(dir.path(), "b.png", 4, 5, 0);

    let err = VolumeLoader::image_stack_only()
        .load_from_directory(dir.path())
        .unwrap_err();
    match err {
        VolumeLoaderError::InconsistentDimensions {
            path,
            expected,
            found,
        } => {
            assert!(path.ends_with("b.png"));
            assert_eq!(expected, (4, 4));
            assert_eq!(found, (5, 4));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = VolumeLoader::image_stack_only()
        .load_from_directory(dir.path().join("missing"))
        .unwrap_err();
    assert!(matches!(err, VolumeLoaderError::Io(_)));
}

// ---------------------------------------------------------------------------
// Calibrated series
// ---------------------------------------------------------------------------

#[test]
fn test_calibrated_sort_tie_break() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(dir.path(), "a.dcm", &["seq=2", "loc=5.0", "value=1"]);
    write_fake_slice(dir.path(), "b.dcm", &["seq=1", "loc=9.0", "value=2"]);
    write_fake_slice(dir.path(), "c.dcm", &["seq=2", "loc=3.0", "value=3"]);

    let (volume, metadata) = text_loader().load_from_directory(dir.path()).unwrap();

    let order: Vec<f32> = (0..3)
        .map(|d| volume.extract_slice(PlaneAxis::Axial, d)[[0, 0]])
        .collect();
    assert_eq!(order, vec![2.0, 3.0, 1.0]);
    assert_eq!(metadata.num_slices, 3);
}

#[test]
fn test_calibration_is_applied_per_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(
        dir.path(),
        "a.dcm",
        &["seq=1", "value=100", "slope=2", "intercept=-50"],
    );
    write_fake_slice(dir.path(), "b.dcm", &["seq=2", "value=100"]);

    let (volume, _) = text_loader().load_from_directory(dir.path()).unwrap();
    assert!(volume.extract_slice(PlaneAxis::Axial, 0).iter().all(|&v| v == 150.0));
    assert!(volume.extract_slice(PlaneAxis::Axial, 1).iter().all(|&v| v == 100.0));
}

#[test]
fn test_unreadable_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(dir.path(), "a.dcm", &["seq=1", "value=4"]);
    write_fake_slice(dir.path(), "b.dcm", &["garbage"]);
    write_fake_slice(dir.path(), "c.dcm", &["seq=3", "value=6"]);

    let (volume, metadata) = text_loader().load_from_directory(dir.path()).unwrap();
    assert_eq!(volume.dim().0, 2);
    assert_eq!(metadata.num_slices, 2);
}

#[test]
fn test_no_readable_calibrated_files() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(dir.path(), "a.dcm", &["garbage"]);
    write_fake_slice(dir.path(), "b.dcm", &["seq=oops"]);
    // images are not consulted once calibrated candidates exist
    write_png(dir.path(), "c.png", 2, 2, 0);

    let err = text_loader().load_from_directory(dir.path()).unwrap_err();
    assert!(matches!(err, VolumeLoaderError::NoReadableCalibrated { .. }));
}

#[test]
fn test_calibrated_shape_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(dir.path(), "a.dcm", &["seq=1", "rows=2", "cols=2"]);
    write_fake_slice(dir.path(), "b.dcm", &["seq=2", "rows=2", "cols=3"]);

    let err = text_loader().load_from_directory(dir.path()).unwrap_err();
    assert!(matches!(err, VolumeLoaderError::InconsistentDimensions { .. }));
}

#[test]
fn test_metadata_from_first_sorted_slice() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(
        dir.path(),
        "a.dcm",
        &["seq=2", "modality=MR", "thickness=5.0", "rows=3", "cols=4"],
    );
    write_fake_slice(
        dir.path(),
        "b.dcm",
        &["seq=1", "modality=CT", "thickness=1.25", "rows=3", "cols=4"],
    );

    let (_, metadata) = text_loader().load_from_directory(dir.path()).unwrap();
    assert_eq!(metadata.modality, "CT");
    assert_eq!(metadata.slice_thickness, 1.25);
    assert_eq!((metadata.rows, metadata.columns), (3, 4));
}

#[test]
fn test_metadata_defaults_when_attributes_missing() {
    let dir = tempfile::tempdir().unwrap();
    write_fake_slice(dir.path(), "a.dcm", &["value=1"]);

    let (_, metadata) = text_loader().load_from_directory(dir.path()).unwrap();
    assert_eq!(metadata.modality, DEFAULT_CALIBRATED_MODALITY);
    assert_eq!(metadata.slice_thickness, 0.0);
}

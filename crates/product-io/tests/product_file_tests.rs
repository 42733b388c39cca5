//! On-disk round-trip tests for the product container format.

use product_io::{Band, Product, ProductError};

fn sample_product() -> Product {
    let width = 4;
    let height = 3;
    let samples: Vec<f32> = (0..width * height).map(|i| i as f32 * 10.0).collect();
    let bands = vec![
        Band::new("radiance_1", width, height, samples.clone()).unwrap(),
        Band::new("radiance_5", width, height, samples.clone()).unwrap(),
        Band::new("radiance_13", width, height, samples).unwrap(),
    ];
    Product::new(bands).unwrap()
}

#[test]
fn test_save_and_open_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.bprd");

    let product = sample_product();
    product.save(&path).unwrap();

    let back = Product::open(&path).unwrap();
    assert_eq!(
        back.band_names(),
        vec!["radiance_1", "radiance_5", "radiance_13"]
    );

    let band = back.band("radiance_13").unwrap();
    assert_eq!(band.width(), 4);
    assert_eq!(band.height(), 3);
    assert_eq!(band.samples(), product.band("radiance_13").unwrap().samples());
}

#[test]
fn test_open_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Product::open(dir.path().join("no_such.bprd"));
    assert!(matches!(result, Err(ProductError::Io(_))));
}

#[test]
fn test_open_garbage_file_is_bad_magic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bprd");
    std::fs::write(&path, b"definitely not a product").unwrap();

    assert!(matches!(Product::open(&path), Err(ProductError::BadMagic)));
}

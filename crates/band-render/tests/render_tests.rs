//! End-to-end rendering tests: band -> raster -> PNG on disk.

use band_render::{
    auto_image_info, build_legend, render_band, render_rgb, write_image, EncodeOptions,
    ImageFormat, LegendOptions,
};
use product_io::{Band, Color, ColorPaletteDef, ColorPoint, ImageInfo, Product};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn ramp_band(name: &str, width: usize, height: usize) -> Band {
    let samples: Vec<f32> = (0..width * height)
        .map(|i| (i as f32 / (width * height - 1) as f32) * 100.0)
        .collect();
    Band::new(name, width, height, samples).unwrap()
}

fn test_info() -> ImageInfo {
    ImageInfo::new(ColorPaletteDef::new(vec![
        ColorPoint::new(0.0, Color::YELLOW),
        ColorPoint::new(50.0, Color::RED),
        ColorPoint::new(100.0, Color::BLUE),
    ]))
}

#[test]
fn test_band_to_png_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("band.png");

    let band = ramp_band("radiance_13", 32, 16);
    let image = render_band(&band, &test_info()).unwrap();
    assert_eq!(image.width(), 32);
    assert_eq!(image.height(), 16);

    write_image(&image, &path, ImageFormat::Png, &EncodeOptions::default()).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    assert_eq!(&bytes[12..16], b"IHDR");
    // IHDR dimensions are big-endian
    assert_eq!(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 32);
    assert_eq!(u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]), 16);
}

#[test]
fn test_legend_to_png_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legend.png");

    let band = ramp_band("radiance_13", 8, 8);
    let legend = build_legend(&test_info(), &band, &LegendOptions::default()).unwrap();
    write_image(&legend, &path, ImageFormat::Png, &EncodeOptions::default()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], &PNG_SIGNATURE);
}

#[test]
fn test_rgb_composite_pipeline() {
    let red = ramp_band("radiance_13", 16, 16);
    let green = ramp_band("radiance_5", 16, 16);
    let blue = ramp_band("radiance_1", 16, 16);

    let info = auto_image_info([&red, &green, &blue]);
    let image = render_rgb([&red, &green, &blue], &info).unwrap();

    // Identical inputs per channel give a gray ramp
    let first = image.pixel_at(0, 0).unwrap();
    assert_eq!(first[0], first[1]);
    assert_eq!(first[1], first[2]);
    assert_eq!(first[3], 255);

    let last = image.pixel_at(15, 15).unwrap();
    assert!(last[0] > first[0]);
}

#[test]
fn test_product_render_is_idempotent() {
    // The same product rendered twice must produce identical bytes
    let bands = vec![
        ramp_band("radiance_1", 16, 8),
        ramp_band("radiance_5", 16, 8),
        ramp_band("radiance_13", 16, 8),
    ];
    let mut product = Product::new(bands).unwrap();
    product
        .band_mut("radiance_13")
        .unwrap()
        .set_image_info(test_info());

    let encode = |product: &Product| {
        let band = product.band("radiance_13").unwrap();
        let image = render_band(band, band.image_info().unwrap()).unwrap();
        band_render::writer::encode(&image, ImageFormat::Png, &EncodeOptions::default()).unwrap()
    };

    assert_eq!(encode(&product), encode(&product));
}

use base::{Tensor, Vec2};
use base64::{Engine as _, engine::general_purpose};
use image::{
    Image, ImageError, PNG_DATA_URI_PREFIX, PixelFormat, composite, decode_image, encode_png,
    overlay_data_uri, to_data_uri,
};

fn gray_scan(width: usize, height: usize) -> Image {
    Image::new(
        Vec2::new(width, height),
        vec![100; width * height],
        PixelFormat::Luma8,
    )
}

#[test]
fn test_composite_matches_original_size() {
    let importance = Tensor::new(vec![7, 7], vec![0.5; 49]).unwrap();
    for (width, height) in [(1, 1), (13, 5), (224, 224), (300, 17)] {
        let original = gray_scan(width, height);
        let overlay = composite(&original, &importance).unwrap();
        assert_eq!(overlay.size, Vec2::new(width, height));
        assert_eq!(overlay.format, PixelFormat::Rgb8);
        assert_eq!(overlay.data.len(), width * height * 3);
    }
}

#[test]
fn test_composite_blend_weights() {
    // zero importance colors every pixel (0, 0, 127)
    let original = Image::new(Vec2::new(2, 2), vec![200; 12], PixelFormat::Rgb8);
    let importance = Tensor::new(vec![1, 1], vec![0.0]).unwrap();

    let overlay = composite(&original, &importance).unwrap();

    for pixel in overlay.data.chunks_exact(3) {
        assert_eq!(pixel[0], 120); // 0.6 * 200
        assert_eq!(pixel[1], 120);
        assert_eq!(pixel[2], 170); // 0.6 * 200 + 0.4 * 127
    }
}

#[test]
fn test_composite_full_importance_is_red() {
    let original = Image::new(Vec2::new(3, 3), vec![0; 27], PixelFormat::Rgb8);
    let importance = Tensor::new(vec![2, 2], vec![1.0; 4]).unwrap();

    let overlay = composite(&original, &importance).unwrap();

    for pixel in overlay.data.chunks_exact(3) {
        assert_eq!(pixel, &[50, 0, 0]); // 0.4 * 127
    }
}

#[test]
fn test_composite_drops_alpha() {
    let original = Image::new(Vec2::new(1, 1), vec![10, 20, 30, 0], PixelFormat::Rgba8);
    let importance = Tensor::new(vec![1, 1], vec![0.5]).unwrap();

    let overlay = composite(&original, &importance).unwrap();

    assert_eq!(overlay.format, PixelFormat::Rgb8);
    assert_eq!(overlay.data.len(), 3);
}

#[test]
fn test_composite_rejects_wrong_rank() {
    let original = gray_scan(4, 4);
    let importance = Tensor::new(vec![1, 2, 2], vec![0.1; 4]).unwrap();
    assert!(matches!(
        composite(&original, &importance),
        Err(ImageError::Shape(_))
    ));
}

#[test]
fn test_encode_png_roundtrip() {
    let original = Image::new(
        Vec2::new(3, 2),
        (0..18).map(|v| v * 10).collect(),
        PixelFormat::Rgb8,
    );
    let png = encode_png(&original).unwrap();
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    assert_eq!(decode_image(&png).unwrap(), original);
}

#[test]
fn test_data_uri_prefix_and_payload() {
    let uri = to_data_uri(&[1, 2, 3]);
    assert_eq!(PNG_DATA_URI_PREFIX, "data:image/png;base64,");
    assert_eq!(uri, "data:image/png;base64,AQID");
}

#[test]
fn test_overlay_data_uri_decodes_to_original_size() {
    let original = gray_scan(40, 30);
    let importance = Tensor::new(vec![2, 2], vec![0.0, 0.25, 0.5, 1.0]).unwrap();

    let uri = overlay_data_uri(&original, Some(&importance)).unwrap();

    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).unwrap();
    let png = general_purpose::STANDARD.decode(payload).unwrap();
    let overlay = decode_image(&png).unwrap();
    assert_eq!(overlay.size, Vec2::new(40, 30));
    assert_eq!(overlay.format, PixelFormat::Rgb8);
}

#[test]
fn test_overlay_data_uri_absent_map() {
    assert_eq!(overlay_data_uri(&gray_scan(4, 4), None), None);
}

#[test]
fn test_overlay_data_uri_failure_degrades_to_none() {
    let broken = Image::new(Vec2::new(4, 4), vec![0; 3], PixelFormat::Rgb8);
    let importance = Tensor::new(vec![1, 1], vec![1.0]).unwrap();
    assert_eq!(overlay_data_uri(&broken, Some(&importance)), None);
}

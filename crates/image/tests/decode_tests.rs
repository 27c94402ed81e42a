use crates_image::ImageEncoder;
use image::{ImageError, PixelFormat, decode_image};

fn png_bytes(data: &[u8], width: u32, height: u32, color: crates_image::ExtendedColorType) -> Vec<u8> {
    let mut buffer = Vec::new();
    crates_image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(data, width, height, color)
        .unwrap();
    buffer
}

#[test]
fn test_decode_jpeg_rgb() {
    let mut buffer = Vec::new();
    let img = crates_image::RgbImage::from_fn(2, 2, |x, y| {
        let val = (x + y) as u8 * 64;
        crates_image::Rgb([val, val + 16, val + 32])
    });
    crates_image::codecs::jpeg::JpegEncoder::new(&mut buffer)
        .encode_image(&img)
        .unwrap();

    let decoded = decode_image(&buffer).unwrap();

    assert_eq!(decoded.format, PixelFormat::Rgb8);
    assert_eq!(decoded.width(), 2);
    assert_eq!(decoded.height(), 2);
    assert_eq!(decoded.data.len(), 12);
}

#[test]
fn test_decode_png_keeps_rgba() {
    let data: Vec<u8> = (0..16).collect();
    let buffer = png_bytes(&data, 2, 2, crates_image::ExtendedColorType::Rgba8);

    let decoded = decode_image(&buffer).unwrap();

    assert_eq!(decoded.format, PixelFormat::Rgba8);
    assert_eq!(decoded.data, data);
}

#[test]
fn test_decode_png_grayscale() {
    let data = vec![0u8, 64, 128, 255, 32, 16];
    let buffer = png_bytes(&data, 3, 2, crates_image::ExtendedColorType::L8);

    let decoded = decode_image(&buffer).unwrap();

    assert_eq!(decoded.format, PixelFormat::Luma8);
    assert_eq!(decoded.width(), 3);
    assert_eq!(decoded.height(), 2);
    assert_eq!(decoded.data, data);
}

#[test]
fn test_decode_16bit_png_reduced_to_8bit() {
    let img = crates_image::ImageBuffer::<crates_image::Luma<u16>, Vec<u16>>::from_raw(
        2,
        1,
        vec![0u16, 65535],
    )
    .unwrap();
    let mut buffer = std::io::Cursor::new(Vec::new());
    crates_image::DynamicImage::ImageLuma16(img)
        .write_to(&mut buffer, crates_image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(buffer.get_ref()).unwrap();

    assert_eq!(decoded.format, PixelFormat::Luma8);
    assert_eq!(decoded.data, vec![0, 255]);
}

#[test]
fn test_decode_invalid_data() {
    let result = decode_image(b"definitely not an image");
    assert!(matches!(result, Err(ImageError::Decode(_))));
    assert!(result.unwrap_err().to_string().contains("decode error"));
}

#[test]
fn test_decode_empty_data() {
    assert!(decode_image(&[]).is_err());
}

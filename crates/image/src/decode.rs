use crate::{Image, ImageError};

/// Decodes an encoded image (PNG, JPEG, GIF, BMP, TIFF, WebP) from memory.
///
/// The format is auto-detected. The color mode of the source is kept
/// (grayscale, grayscale + alpha, RGB, RGBA); deeper sources are reduced to
/// 8 bits per channel.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the bytes are not a supported image.
pub fn decode_image(data: &[u8]) -> Result<Image, ImageError> {
    let image = crates_image::load_from_memory(data)?;
    Ok(Image::from_dynamic(image))
}

use {
    crate::{Image, ImageError, PixelFormat},
    base64::{Engine as _, engine::general_purpose},
    crates_image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder},
};

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encodes an image as PNG, keeping its color mode.
pub fn encode_png(image: &Image) -> Result<Vec<u8>, ImageError> {
    let color_type = match image.format {
        PixelFormat::Luma8 => ExtendedColorType::L8,
        PixelFormat::LumaA8 => ExtendedColorType::La8,
        PixelFormat::Rgb8 => ExtendedColorType::Rgb8,
        PixelFormat::Rgba8 => ExtendedColorType::Rgba8,
    };

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            &image.data,
            image.width() as u32,
            image.height() as u32,
            color_type,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}

/// Wraps PNG bytes in a `data:image/png;base64,...` URI.
pub fn to_data_uri(png: &[u8]) -> String {
    format!(
        "{PNG_DATA_URI_PREFIX}{}",
        general_purpose::STANDARD.encode(png)
    )
}

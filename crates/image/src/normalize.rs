use {
    crate::{Image, ImageError},
    base::Tensor,
    crates_image::imageops::FilterType,
};

/// Converts an image into a model input tensor of shape `[1, height, width, 3]`.
///
/// The image is resized to exactly `width` x `height` with a bilinear filter,
/// converted to RGB (grayscale is replicated, alpha is dropped) and scaled
/// from 0-255 to 0.0-1.0. The fixed `/ 255` scaling assumes the classifier
/// was trained on the same range.
pub fn normalize(image: &Image, height: usize, width: usize) -> Result<Tensor<f32>, ImageError> {
    if height == 0 || width == 0 {
        return Err(ImageError::Shape(format!(
            "target size must be non-zero, got {width}x{height}"
        )));
    }

    let resized = image
        .to_dynamic()?
        .resize_exact(width as u32, height as u32, FilterType::Triangle);
    let data = resized
        .to_rgb8()
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / 255.0)
        .collect();

    Ok(Tensor::new(vec![1, height, width, 3], data)?)
}

use {
    crate::{Image, ImageError, PixelFormat, encode_png, to_data_uri},
    base::Tensor,
    crates_image::{GrayImage, imageops::FilterType},
};

const ORIGINAL_WEIGHT: f64 = 0.6;
const HEATMAP_WEIGHT: f64 = 0.4;

fn ramp(v: f32, center: f32) -> f32 {
    (1.5 - 4.0 * (v - center).abs()).clamp(0.0, 1.0)
}

/// Jet-style colormap: blue for low intensities, red for high.
pub fn jet(v: f32) -> [f32; 3] {
    [ramp(v, 0.75), ramp(v, 0.5), ramp(v, 0.25)]
}

/// Blends a `[h, w]` importance map in `[0, 1]` over `original`.
///
/// The map is upscaled bilinearly to the original's size, colorized with
/// [`jet`] and mixed 60% original / 40% heatmap. The result is RGB and has
/// exactly the original's dimensions. Channel values are truncated to `u8`.
pub fn composite(original: &Image, importance: &Tensor<f32>) -> Result<Image, ImageError> {
    let &[map_h, map_w] = importance.shape.as_slice() else {
        return Err(ImageError::Shape(format!(
            "importance map must be [h, w], got {:?}",
            importance.shape
        )));
    };
    if map_h == 0 || map_w == 0 {
        return Err(ImageError::Shape("importance map is empty".to_string()));
    }

    let base = original.to_dynamic()?.to_rgb8();
    let (width, height) = base.dimensions();

    // saturating casts also map NaN to 0
    let intensities = importance.data.iter().map(|&v| (v * 255.0) as u8).collect();
    let heat = GrayImage::from_raw(map_w as u32, map_h as u32, intensities)
        .ok_or_else(|| ImageError::Shape("importance map data does not match its shape".into()))?;
    let heat = crates_image::imageops::resize(&heat, width, height, FilterType::Triangle);

    let mut data = Vec::with_capacity(base.as_raw().len());
    for (pixel, level) in base.pixels().zip(heat.pixels()) {
        let color = jet(level[0] as f32 / 255.0);
        for (channel, weight) in pixel.0.iter().zip(color) {
            let colored = (weight * 255.0) as u8;
            let blended = ORIGINAL_WEIGHT * *channel as f64 + HEATMAP_WEIGHT * colored as f64;
            data.push(blended as u8);
        }
    }

    Ok(Image::new(original.size, data, PixelFormat::Rgb8))
}

/// Produces the overlay as an embeddable PNG data URI.
///
/// Returns `None` when there is no importance map or when compositing or
/// encoding fails; failures are logged and never propagated.
pub fn overlay_data_uri(original: &Image, importance: Option<&Tensor<f32>>) -> Option<String> {
    let importance = importance?;
    match composite(original, importance).and_then(|overlay| encode_png(&overlay)) {
        Ok(png) => Some(to_data_uri(&png)),
        Err(error) => {
            base::log_warn!("Overlay error: {}", error);
            None
        }
    }
}

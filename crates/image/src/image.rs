use {
    crate::ImageError,
    base::Vec2,
    crates_image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Luma8,
    LumaA8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Luma8 => 1,
            PixelFormat::LumaA8 => 2,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Decoded 8-bit raster, rows top to bottom, channels interleaved.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub size: Vec2<usize>,
    pub data: Vec<u8>,
    pub format: PixelFormat,
}

impl Image {
    pub fn new(size: Vec2<usize>, data: Vec<u8>, format: PixelFormat) -> Self {
        Self { size, data, format }
    }

    pub fn width(&self) -> usize {
        self.size.x
    }

    pub fn height(&self) -> usize {
        self.size.y
    }

    pub(crate) fn from_dynamic(image: DynamicImage) -> Self {
        let size = Vec2::new(image.width() as usize, image.height() as usize);
        let (data, format) = match image {
            DynamicImage::ImageLuma8(buf) => (buf.into_raw(), PixelFormat::Luma8),
            DynamicImage::ImageLumaA8(buf) => (buf.into_raw(), PixelFormat::LumaA8),
            DynamicImage::ImageRgb8(buf) => (buf.into_raw(), PixelFormat::Rgb8),
            DynamicImage::ImageRgba8(buf) => (buf.into_raw(), PixelFormat::Rgba8),
            // 16-bit and float sources are reduced to 8 bits per channel
            other => {
                let color = other.color();
                match (color.has_color(), color.has_alpha()) {
                    (false, false) => (other.to_luma8().into_raw(), PixelFormat::Luma8),
                    (false, true) => (other.to_luma_alpha8().into_raw(), PixelFormat::LumaA8),
                    (true, false) => (other.to_rgb8().into_raw(), PixelFormat::Rgb8),
                    (true, true) => (other.to_rgba8().into_raw(), PixelFormat::Rgba8),
                }
            }
        };
        Self { size, data, format }
    }

    pub(crate) fn to_dynamic(&self) -> Result<DynamicImage, ImageError> {
        if self.size.x == 0 || self.size.y == 0 {
            return Err(ImageError::Decode(format!("empty image: {}", self.size)));
        }
        let (w, h) = (self.size.x as u32, self.size.y as u32);
        let data = self.data.clone();
        let image = match self.format {
            PixelFormat::Luma8 => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            PixelFormat::LumaA8 => {
                GrayAlphaImage::from_raw(w, h, data).map(DynamicImage::ImageLumaA8)
            }
            PixelFormat::Rgb8 => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            PixelFormat::Rgba8 => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
        };
        image.ok_or_else(|| {
            ImageError::Shape(format!(
                "{} bytes do not fill a {} {:?} image",
                self.data.len(),
                self.size,
                self.format
            ))
        })
    }
}

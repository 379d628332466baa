//! Bridge between `PixelBuffer` and the `image` crate for PNG load and save

use std::path::Path;

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::io::error::{GenerationError, Result, file_system, invalid_parameter};
use crate::spatial::buffer::PixelBuffer;

/// Convert a pixel buffer into an `image` RGBA buffer
///
/// # Errors
///
/// Returns an error if the dimensions overflow `u32` or the buffer is malformed
pub fn to_rgba_image(buffer: &PixelBuffer) -> Result<RgbaImage> {
    let width = u32::try_from(buffer.width())
        .map_err(|error| invalid_parameter("width", &buffer.width(), &error))?;
    let height = u32::try_from(buffer.height())
        .map_err(|error| invalid_parameter("height", &buffer.height(), &error))?;
    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, buffer.data().to_vec()).ok_or_else(|| {
        invalid_parameter(
            "buffer",
            &format!("{width}x{height}"),
            &"pixel data does not match dimensions",
        )
    })
}

/// Convert an `image` RGBA buffer into a pixel buffer
///
/// # Errors
///
/// Returns an error if the raw data does not match the reported dimensions
pub fn from_rgba_image(image: RgbaImage) -> Result<PixelBuffer> {
    let width = image.width() as usize;
    let height = image.height() as usize;
    PixelBuffer::from_raw(width, height, image.into_raw())
}

/// Decode any supported image file into RGBA8
///
/// # Errors
///
/// Returns `ImageLoad` if the file cannot be opened or decoded
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let decoded = image::open(path).map_err(|source| GenerationError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    from_rgba_image(decoded.to_rgba8())
}

/// Encode a pixel buffer as PNG, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The buffer is empty or malformed
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    if buffer.is_empty() {
        return Err(invalid_parameter(
            "buffer",
            &path.display(),
            &"cannot save an empty image",
        ));
    }
    let image = to_rgba_image(buffer)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|source| file_system(parent, "create directory", source))?;
    }

    image.save(path).map_err(|source| GenerationError::ImageExport {
        path: path.to_path_buf(),
        source,
    })
}

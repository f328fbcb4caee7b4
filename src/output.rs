//! Image output.
//!
//! Encodes the rendered framebuffer as a PPM P3 text file or a PNG. The
//! framebuffer is already tone-mapped to 8-bit; these functions only encode.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use image::RgbImage;
use log::{info, warn};

use crate::framebuffer::Framebuffer;

/// Save the framebuffer as a PNG file.
pub fn save_image_as_png(framebuffer: &Framebuffer, output_path: &str) {
    let image = RgbImage::from_raw(
        framebuffer.width(),
        framebuffer.height(),
        framebuffer.to_rgb_bytes(),
    );
    match image {
        Some(image) => match image.save(output_path) {
            Ok(()) => info!("Image saved as {}", output_path),
            Err(e) => warn!("Failed to save image: {}", e),
        },
        None => warn!("Framebuffer dimensions do not match its pixel data"),
    }
}

/// Save the framebuffer as a plain-text PPM (P3) file.
pub fn save_image_as_ppm(framebuffer: &Framebuffer, output_path: &str) {
    let result = File::create(output_path)
        .map(BufWriter::new)
        .and_then(|mut writer| write_ppm(framebuffer, &mut writer));
    match result {
        Ok(()) => info!("Image saved as {}", output_path),
        Err(e) => warn!("Failed to save image: {}", e),
    }
}

fn write_ppm(framebuffer: &Framebuffer, writer: &mut impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "P3\n{} {}\n255",
        framebuffer.width(),
        framebuffer.height()
    )?;
    for px in framebuffer.pixels() {
        writeln!(writer, "{} {} {}", px.r, px.g, px.b)?;
    }
    writer.flush()
}

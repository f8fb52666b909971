use eframe::egui::ColorImage;

/// Decodes PNG/JPEG/WebP bytes into an egui image.
pub fn decode_image(bytes: &[u8]) -> Option<ColorImage> {
    // Load image data into an image::DynamicImage and convert to RGBA8
    let img = image::load_from_memory(bytes).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}

/// Downloads the poster image yt-dlp reported for the video.
pub fn fetch_poster(url: &str) -> Option<ColorImage> {
    // Blocking GET, any error just means no poster
    let resp = match reqwest::blocking::get(url).and_then(|r| r.error_for_status()) {
        Ok(resp) => resp,
        Err(e) => {
            log::warn!("Poster fetch failed for {}: {}", url, e);
            return None;
        }
    };
    decode_image(&resp.bytes().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn decodes_png_bytes() {
        let src = image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 99, 71, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(src)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        let img = decode_image(&png).unwrap();
        assert_eq!(img.size, [3, 2]);
        assert_eq!(img.pixels[0], eframe::egui::Color32::from_rgb(255, 99, 71));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_image(b"not an image").is_none());
    }
}

//! Icon generation and conversion.
//!
//! When no icon is configured, a placeholder is generated in two formats
//! from the same design: a vector image for `scalable/apps` and a raster
//! image for the fixed-size icon directories and the AppDir root. A user
//! supplied icon is resized to [`RASTER_ICON_SIZE`].

use crate::bundler::error::Result;
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// Edge length of the raster icon installed into the AppDir.
pub const RASTER_ICON_SIZE: u32 = 256;

const BACKGROUND_TOP: [u8; 3] = [0x2c, 0x3e, 0x50];
const BACKGROUND_BOTTOM: [u8; 3] = [0x34, 0x98, 0xdb];
const PANEL: [u8; 3] = [0xec, 0xf0, 0xf1];
const TILES: [[u8; 3]; 3] = [[0xe7, 0x4c, 0x3c], [0xf1, 0xc4, 0x0f], [0x2e, 0xcc, 0x71]];

/// Placeholder vector icon: a rounded square with a dock panel of three tiles.
pub fn placeholder_svg() -> String {
    let hex = |c: [u8; 3]| format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2]);
    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="256" height="256" viewBox="0 0 256 256">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="0" y2="1">
      <stop offset="0" stop-color="{top}"/>
      <stop offset="1" stop-color="{bottom}"/>
    </linearGradient>
  </defs>
  <rect x="8" y="8" width="240" height="240" rx="40" fill="url(#bg)"/>
  <rect x="40" y="168" width="176" height="48" rx="12" fill="{panel}"/>
  <rect x="56" y="176" width="32" height="32" rx="6" fill="{t0}"/>
  <rect x="112" y="176" width="32" height="32" rx="6" fill="{t1}"/>
  <rect x="168" y="176" width="32" height="32" rx="6" fill="{t2}"/>
</svg>
"##,
        top = hex(BACKGROUND_TOP),
        bottom = hex(BACKGROUND_BOTTOM),
        panel = hex(PANEL),
        t0 = hex(TILES[0]),
        t1 = hex(TILES[1]),
        t2 = hex(TILES[2]),
    )
}

/// Rasterizes the placeholder design at `size` x `size`.
///
/// Coordinates are those of the 256-unit SVG canvas scaled to `size`.
pub fn placeholder_raster(size: u32) -> RgbaImage {
    let scale = size as f32 / 256.0;
    let rect = |x: f32, y: f32, w: f32, h: f32, r: f32| RoundedRect {
        x: x * scale,
        y: y * scale,
        w: w * scale,
        h: h * scale,
        r: r * scale,
    };

    let background = rect(8.0, 8.0, 240.0, 240.0, 40.0);
    let panel = rect(40.0, 168.0, 176.0, 48.0, 12.0);
    let tiles = [
        rect(56.0, 176.0, 32.0, 32.0, 6.0),
        rect(112.0, 176.0, 32.0, 32.0, 6.0),
        rect(168.0, 176.0, 32.0, 32.0, 6.0),
    ];

    RgbaImage::from_fn(size, size, |px, py| {
        let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);

        if let Some(i) = tiles.iter().position(|t| t.contains(x, y)) {
            return opaque(TILES[i]);
        }
        if panel.contains(x, y) {
            return opaque(PANEL);
        }
        if background.contains(x, y) {
            let t = ((y - background.y) / background.h).clamp(0.0, 1.0);
            return opaque(lerp(BACKGROUND_TOP, BACKGROUND_BOTTOM, t));
        }
        Rgba([0, 0, 0, 0])
    })
}

struct RoundedRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    r: f32,
}

impl RoundedRect {
    fn contains(&self, x: f32, y: f32) -> bool {
        if x < self.x || y < self.y || x > self.x + self.w || y > self.y + self.h {
            return false;
        }
        // Distance to the nearest corner circle centre, zero along the straight edges.
        let cx = x.clamp(self.x + self.r, self.x + self.w - self.r);
        let cy = y.clamp(self.y + self.r, self.y + self.h - self.r);
        let (dx, dy) = (x - cx, y - cy);
        dx * dx + dy * dy <= self.r * self.r
    }
}

fn opaque(c: [u8; 3]) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 0xff])
}

fn lerp(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Loads and resizes an icon to exact dimensions.
///
/// Uses Lanczos3 filtering, which gives the best quality for downscaling.
pub fn load_and_resize(
    source_path: &Path,
    target_width: u32,
    target_height: u32,
) -> Result<RgbaImage> {
    let img = image::open(source_path).map_err(|e| crate::bundler::Error::Fs {
        context: "loading icon for resize",
        path: source_path.to_path_buf(),
        error: std::io::Error::other(e),
    })?;

    if img.width() == target_width && img.height() == target_height {
        return Ok(img.to_rgba8());
    }

    if img.width() != img.height() {
        log::warn!(
            "Icon {} is {}x{}, not square; it will be stretched",
            source_path.display(),
            img.width(),
            img.height()
        );
    }

    let resized = img.resize_exact(
        target_width,
        target_height,
        image::imageops::FilterType::Lanczos3,
    );

    Ok(resized.to_rgba8())
}

/// Encodes an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_raster_layout() {
        let img = placeholder_raster(RASTER_ICON_SIZE);

        assert_eq!(img.dimensions(), (256, 256));
        // Rounded corner stays transparent, centre is background, tiles are painted.
        assert_eq!(img.get_pixel(9, 9)[3], 0);
        assert_eq!(img.get_pixel(128, 60)[3], 0xff);
        assert_eq!(*img.get_pixel(72, 192), opaque(TILES[0]));
        assert_eq!(*img.get_pixel(100, 212), opaque(PANEL));
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&placeholder_raster(32)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_placeholder_svg_is_svg() {
        let svg = placeholder_svg();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg "));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_load_and_resize_user_icon() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("icon.png");
        std::fs::write(&path, encode_png(&placeholder_raster(64)).unwrap()).unwrap();

        let resized = load_and_resize(&path, 256, 256).unwrap();
        assert_eq!(resized.dimensions(), (256, 256));
    }
}

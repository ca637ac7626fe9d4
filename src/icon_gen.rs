use crate::glyph::{Face, Raster};
use crate::manifest;
use anyhow::{Context, Result};
use image::{
    codecs::{
        ico::{IcoEncoder, IcoFrame},
        png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    },
    ColorType, GrayImage, ImageEncoder, Luma, Rgba, RgbaImage,
};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug)]
pub struct Options {
    pub output: PathBuf,
    pub letter: String,
    pub font: Option<PathBuf>,
    pub start_color: String,
    pub end_color: String,
    pub png: Option<Vec<u32>>,
    pub manifest: bool,
}

/// The fixed (size, relative path) targets of a zero-argument run.
pub const TARGETS: &[(u32, &str)] = &[
    (16, "favicon.ico"),
    (32, "favicon-32x32.png"),
    (192, "icons/Icon-192.png"),
    (512, "icons/Icon-512.png"),
    (192, "icons/Icon-maskable-192.png"),
    (512, "icons/Icon-maskable-512.png"),
];

pub fn generate_icons(options: &Options) -> Result<()> {
    let face = Face::load(options.font.as_deref());
    let start = parse_color(&options.start_color, [26, 35, 126]);
    let end = parse_color(&options.end_color, [74, 20, 140]);

    // Ensure the output directory exists
    create_dir_all(&options.output).context("Can't create output directory")?;

    // Track written PNGs for the optional manifest
    let mut written: Vec<(u32, String)> = Vec::new();

    if let Some(sizes) = &options.png {
        println!("Generating custom PNG sizes...");
        for &size in sizes {
            let rel_path = format!("{size}x{size}.png");
            let icon = render_icon(size, &options.letter, &face, start, end);
            save_icon(&icon, &options.output.join(&rel_path))?;
            println!("  ✓ Generated {rel_path}");
            written.push((size, rel_path));
        }
    } else {
        println!("Generating favicon set...");
        for &(size, rel_path) in TARGETS {
            let path = options.output.join(rel_path);
            if let Some(parent) = path.parent() {
                create_dir_all(parent)
                    .with_context(|| format!("Can't create parent directory for {rel_path}"))?;
            }
            let icon = render_icon(size, &options.letter, &face, start, end);
            save_icon(&icon, &path)?;
            println!("  ✓ Generated {rel_path} ({size}x{size})");
            written.push((size, rel_path.to_string()));
        }
    }

    if options.manifest {
        manifest::write_manifest(&options.output, &written)?;
    }

    Ok(())
}

/// Parse a CSS color into RGB, falling back to `default` on bad input.
fn parse_color(value: &str, default: [u8; 3]) -> [u8; 3] {
    css_color::Srgb::from_str(value)
        .map(|color| {
            [
                (color.red * 255.) as u8,
                (color.green * 255.) as u8,
                (color.blue * 255.) as u8,
            ]
        })
        .unwrap_or(default)
}

/// Render one icon: gradient fill, rounded corners, centered glyph with
/// drop shadow and a four-direction glow.
pub fn render_icon(size: u32, text: &str, face: &Face, start: [u8; 3], end: [u8; 3]) -> RgbaImage {
    let mut canvas = RgbaImage::new(size, size);
    paint_gradient(&mut canvas, start, end);

    let mask = rounded_mask(size, size / 6);
    apply_mask(&mut canvas, &mask);

    let raster = face.raster(text, size as f32 / 2.0);
    let x = (size as i64 - raster.width() as i64) / 2;
    // Placed slightly above center
    let y = (size as i64 - raster.height() as i64) / 2 - size as i64 / 20;

    // Drop shadow first, then the glyph itself
    let shadow = (size as i64 / 64).max(1);
    draw_raster(&mut canvas, &raster, x + shadow, y + shadow, [0, 0, 0, 100]);
    draw_raster(&mut canvas, &raster, x, y, [255, 255, 255, 255]);

    // Glow layers on a separate sheet, composited over the canvas
    let mut glow = RgbaImage::new(size, size);
    for offset in 1..(size as i64 / 32).max(2) {
        let alpha = (60 - offset * 15).max(10) as u8;
        let fill = [255, 255, 255, alpha];
        draw_raster(&mut glow, &raster, x - offset, y, fill);
        draw_raster(&mut glow, &raster, x + offset, y, fill);
        draw_raster(&mut glow, &raster, x, y - offset, fill);
        draw_raster(&mut glow, &raster, x, y + offset, fill);
    }
    alpha_composite(&mut canvas, &glow);

    // Redraw on top so the glow doesn't soften the glyph edges
    draw_raster(&mut canvas, &raster, x, y, [255, 255, 255, 255]);

    canvas
}

/// Paint a row-wise linear gradient from `start` at row 0 toward `end`.
/// The blend ratio is `row / size`, so the final row stops one step short
/// of `end`, matching the original artwork.
fn paint_gradient(img: &mut RgbaImage, start: [u8; 3], end: [u8; 3]) {
    let size = img.height();
    for (_, y, pixel) in img.enumerate_pixels_mut() {
        let ratio = y as f32 / size as f32;
        let r = (start[0] as f32 + (end[0] as f32 - start[0] as f32) * ratio) as u8;
        let g = (start[1] as f32 + (end[1] as f32 - start[1] as f32) * ratio) as u8;
        let b = (start[2] as f32 + (end[2] as f32 - start[2] as f32) * ratio) as u8;
        *pixel = Rgba([r, g, b, 255]);
    }
}

/// Build a rounded-rectangle coverage mask with a one-pixel anti-aliased rim.
fn rounded_mask(size: u32, radius: u32) -> GrayImage {
    let r = radius as f32;
    let w = size as f32;
    GrayImage::from_fn(size, size, |x, y| {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;
        let in_left = px < r;
        let in_right = px > w - r;
        let in_top = py < r;
        let in_bottom = py > w - r;
        if !((in_left || in_right) && (in_top || in_bottom)) {
            // Outside the corner squares the rectangle is fully covered
            return Luma([255]);
        }
        let cx = if in_left { r } else { w - r };
        let cy = if in_top { r } else { w - r };
        let dx = px - cx;
        let dy = py - cy;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= r - 1.0 {
            Luma([255])
        } else if distance >= r {
            Luma([0])
        } else {
            Luma([((r - distance) * 255.0) as u8])
        }
    })
}

/// Multiply the mask into the image alpha channel.
fn apply_mask(img: &mut RgbaImage, mask: &GrayImage) {
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let m = mask.get_pixel(x, y)[0] as u16;
        pixel[3] = ((pixel[3] as u16 * m) / 255) as u8;
    }
}

/// Blend a glyph coverage map over the image at (left, top), clipping at
/// the image bounds. `fill` alpha is scaled by per-pixel coverage.
fn draw_raster(img: &mut RgbaImage, raster: &Raster, left: i64, top: i64, fill: [u8; 4]) {
    for gy in 0..raster.height() {
        for gx in 0..raster.width() {
            let cov = raster.coverage_at(gx, gy);
            if cov == 0 {
                continue;
            }
            let x = left + gx as i64;
            let y = top + gy as i64;
            if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
                continue;
            }
            let alpha = (fill[3] as u16 * cov as u16 / 255) as u8;
            let src = Rgba([fill[0], fill[1], fill[2], alpha]);
            let dst = img.get_pixel_mut(x as u32, y as u32);
            *dst = blend_over(src, *dst);
        }
    }
}

/// Standard "source over destination" alpha blending.
fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let sc = src[i] as f32;
        let dc = dst[i] as f32;
        out[i] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

/// Composite `layer` over `base` pixel by pixel.
fn alpha_composite(base: &mut RgbaImage, layer: &RgbaImage) {
    for (x, y, pixel) in base.enumerate_pixels_mut() {
        let src = layer.get_pixel(x, y);
        if src[3] > 0 {
            *pixel = blend_over(*src, *pixel);
        }
    }
}

/// Encode and write one icon; `.ico` paths get a single-frame ICO, anything
/// else a PNG. Existing files are overwritten.
fn save_icon(icon: &RgbaImage, path: &Path) -> Result<()> {
    let is_ico = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("ico"));

    let mut out_file = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );

    if is_ico {
        let frame = IcoFrame::as_png(icon.as_raw(), icon.width(), icon.height(), ColorType::Rgba8)?;
        let encoder = IcoEncoder::new(&mut out_file);
        encoder.encode_images(&[frame])?;
    } else {
        write_png(icon.as_raw(), &mut out_file, icon.width())?;
    }

    out_file.flush()?;
    Ok(())
}

// Encode image data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, size: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder.write_image(image_data, size, size, ColorType::Rgba8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_match_palette() {
        let mut img = RgbaImage::new(64, 64);
        paint_gradient(&mut img, [26, 35, 126], [74, 20, 140]);

        assert_eq!(img.get_pixel(32, 0), &Rgba([26, 35, 126, 255]));

        let bottom = img.get_pixel(32, 63);
        assert!((bottom[0] as i32 - 74).abs() <= 2);
        assert!((bottom[1] as i32 - 20).abs() <= 2);
        assert!((bottom[2] as i32 - 140).abs() <= 2);
        assert_eq!(bottom[3], 255);
    }

    #[test]
    fn rounded_mask_clears_corners_and_keeps_edges() {
        let mask = rounded_mask(96, 16);
        assert_eq!(mask.get_pixel(0, 0)[0], 0, "corner pixel should be masked");
        assert_eq!(mask.get_pixel(95, 0)[0], 0);
        assert_eq!(mask.get_pixel(48, 48)[0], 255, "center is fully covered");
        assert_eq!(mask.get_pixel(48, 0)[0], 255, "edge midpoint is fully covered");
        assert_eq!(mask.get_pixel(0, 48)[0], 255);
    }

    #[test]
    fn zero_radius_mask_is_solid() {
        let mask = rounded_mask(4, 0);
        for pixel in mask.pixels() {
            assert_eq!(pixel[0], 255);
        }
    }

    #[test]
    fn blend_over_opaque_source_wins() {
        let out = blend_over(Rgba([10, 20, 30, 255]), Rgba([200, 200, 200, 255]));
        assert_eq!(out, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn blend_over_transparent_source_is_identity() {
        let dst = Rgba([200, 100, 50, 255]);
        assert_eq!(blend_over(Rgba([255, 255, 255, 0]), dst), dst);
    }

    #[test]
    fn rendered_icon_has_requested_dimensions() {
        let icon = render_icon(48, "F", &Face::Builtin, [26, 35, 126], [74, 20, 140]);
        assert_eq!(icon.width(), 48);
        assert_eq!(icon.height(), 48);
    }

    #[test]
    fn rendered_icon_contains_white_glyph_pixels() {
        let icon = render_icon(128, "F", &Face::Builtin, [26, 35, 126], [74, 20, 140]);
        let white = icon
            .pixels()
            .filter(|p| p[0] == 255 && p[1] == 255 && p[2] == 255 && p[3] == 255)
            .count();
        assert!(white > 0, "glyph should leave fully white pixels");
    }

    #[test]
    fn rendering_size_zero_does_not_panic() {
        let icon = render_icon(0, "F", &Face::Builtin, [26, 35, 126], [74, 20, 140]);
        assert_eq!(icon.width(), 0);
    }

    #[test]
    fn bad_css_color_falls_back_to_default() {
        assert_eq!(parse_color("not-a-color", [1, 2, 3]), [1, 2, 3]);
        assert_eq!(parse_color("#ff0000", [1, 2, 3]), [255, 0, 0]);
    }
}

use std::io::Write;
use std::path::Path;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::types::color::{Color, ColorOps};

/// Writes the canvas as an 8-bit image; the format follows the file extension.
pub fn save_canvas(canvas: &Canvas, path: &Path) -> Result<()> {
    if canvas.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "refusing to save an empty {}x{} canvas",
            canvas.width(),
            canvas.height()
        )));
    }
    canvas.to_rgb8().save(path)?;
    log::info!("Saved {}x{} image to {}", canvas.width(), canvas.height(), path.display());
    Ok(())
}

pub fn write_color(out: &mut impl Write, color: &Color) -> std::io::Result<()> {
    let [r, g, b] = color.to_rgb().0;
    writeln!(out, "{} {} {}", r, g, b)
}

/// Plain-text PPM (P3), one pixel per line.
pub fn write_ppm(canvas: &Canvas, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "P3\n{} {}\n255", canvas.width(), canvas.height())?;
    for color in canvas.pixels() {
        write_color(out, color)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_has_header_and_one_line_per_pixel() {
        let mut canvas = Canvas::new(2, 1);
        canvas.overwrite(vec![Color::gray(1.0), Color::new(0.0, 0.5, 2.0)]);
        let mut out = Vec::new();
        write_ppm(&canvas, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[..3], ["P3", "2 1", "255"]);
        assert_eq!(lines[3], "255 255 255");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn saves_png_and_rejects_unknown_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let mut canvas = Canvas::new(3, 2);
        canvas.overwrite(vec![Color::gray(0.5); 6]);

        let png = dir.path().join("out.png");
        save_canvas(&canvas, &png).unwrap();
        let loaded = image::open(&png).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(2, 1).0, canvas.pixel(2, 1).to_rgb().0);

        assert!(matches!(
            save_canvas(&canvas, &dir.path().join("out.nope")),
            Err(Error::Image(_))
        ));
        assert!(save_canvas(&Canvas::new(0, 0), &png).is_err());
    }
}

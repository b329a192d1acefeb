use std::io::Write;

use rasterkit_image::{Image, Pixel};
use terminal_size::{terminal_size, Height, Width};

use crate::error::IoError;

/// Terminal size assumed when stdout is not a terminal.
const FALLBACK_SIZE: (usize, usize) = (80, 24);

/// Render `image` as rows of ANSI 24-bit background-colored cells that fit in
/// `cols` x `rows` character cells.
///
/// A character cell is about twice as tall as it is wide, so each cell covers
/// one source column and two source rows at unit scale. Images are only ever
/// shrunk, using nearest sampling.
pub fn render_preview(image: &Image<Pixel>, cols: usize, rows: usize) -> String {
    if image.is_empty() || cols == 0 || rows == 0 {
        return String::new();
    }
    let (w, h) = (image.width() as f64, image.height() as f64);
    let scale = (cols as f64 / w).min(2.0 * rows as f64 / h).min(1.0);
    let out_cols = ((w * scale) as usize).max(1);
    let out_rows = ((h * scale / 2.0) as usize).max(1);

    let mut out = String::with_capacity(out_cols * out_rows * 24);
    for cy in 0..out_rows {
        let y = ((cy as f64 * 2.0 / scale) as usize).min(image.height() - 1);
        for cx in 0..out_cols {
            let x = ((cx as f64 / scale) as usize).min(image.width() - 1);
            let p = image.get(x, y).copied().unwrap_or_default();
            out.push_str(&format!("\x1b[48;2;{};{};{}m \x1b[0m", p.r, p.g, p.b));
        }
        out.push('\n');
    }
    out
}

/// Print a preview of `image` sized to the current terminal.
///
/// # Errors
///
/// Returns [`IoError::FileError`] if stdout cannot be written.
pub fn print_preview(image: &Image<Pixel>) -> Result<(), IoError> {
    let (cols, rows) = match terminal_size() {
        Some((Width(w), Height(h))) => (w as usize, h as usize),
        None => FALLBACK_SIZE,
    };
    // keep one line for the prompt
    let preview = render_preview(image, cols, rows.saturating_sub(1).max(1));
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(preview.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

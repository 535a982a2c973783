//! Turning a photo of the board into a [`Board`].
//!
//! The pipeline mirrors how a person reads a photographed grid: flatten
//! to grayscale, binarize so ink is black and paper is white, cut the
//! image into nine cells, and read one glyph per cell. Glyph reading
//! sits behind [`GlyphReader`] so the classifier can be swapped without
//! touching the pipeline.

use image::{imageops, GrayImage};
use snapmark_core::{Board, Cell};
use tracing::{debug, instrument};

/// Fraction of each cell's width and height trimmed from every edge
/// before reading, so grid lines on cell boundaries never count as ink.
pub const BORDER_CROP: f32 = 0.10;

/// Grayscale values above this are treated as paper, at or below as ink.
pub const LUMA_THRESHOLD: u8 = 100;

/// Errors from reading a board photo.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum VisionError {
    /// The submitted bytes are not a decodable image.
    #[display("could not decode board photo: {_0}")]
    Decode(#[error(source)] image::ImageError),
    /// The image is too small to cut into nine readable cells.
    #[display("board photo too small to split into cells")]
    TooSmall,
}

/// Classifies a single prepared cell image as a glyph character.
///
/// Implementations receive the binarized, border-cropped cell and return
/// the character they read; the pipeline maps it through
/// [`Cell::from_char`], so anything unrecognized lands on an empty cell.
pub trait GlyphReader {
    /// Reads the glyph drawn in one cell.
    fn read_glyph(&self, cell: &GrayImage) -> char;
}

/// Glyph classifier based on ink distribution.
///
/// A blank cell has almost no ink. Of the two marks, only a cross puts
/// ink through the middle of the cell; a ring leaves it empty. So the
/// overall ink fraction separates blank from marked, and the ink
/// fraction of the center third separates `X` from `O`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InkGlyphReader;

impl InkGlyphReader {
    /// Cells with less than this overall ink fraction are blank.
    const INK_FLOOR: f32 = 0.02;
    /// Marked cells with at least this ink fraction in the center third
    /// are crosses.
    const CROSS_CENTER_MIN: f32 = 0.10;

    fn ink_fraction(cell: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32) -> f32 {
        let area = ((x1 - x0) * (y1 - y0)) as f32;
        if area == 0.0 {
            return 0.0;
        }
        let mut ink = 0u32;
        for y in y0..y1 {
            for x in x0..x1 {
                if cell.get_pixel(x, y).0[0] <= LUMA_THRESHOLD {
                    ink += 1;
                }
            }
        }
        ink as f32 / area
    }
}

impl GlyphReader for InkGlyphReader {
    fn read_glyph(&self, cell: &GrayImage) -> char {
        let (width, height) = cell.dimensions();
        let overall = Self::ink_fraction(cell, 0, 0, width, height);
        if overall < Self::INK_FLOOR {
            return ' ';
        }
        let center = Self::ink_fraction(
            cell,
            width / 3,
            height / 3,
            2 * width / 3,
            2 * height / 3,
        );
        debug!(overall, center, "classifying cell ink");
        if center >= Self::CROSS_CENTER_MIN { 'x' } else { 'o' }
    }
}

/// Flattens to grayscale and binarizes against [`LUMA_THRESHOLD`].
fn preprocess(image: &image::DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > LUMA_THRESHOLD { 255 } else { 0 };
    }
    gray
}

/// Cuts out one cell ninth, inset by [`BORDER_CROP`] on every edge.
fn crop_cell(image: &GrayImage, row: u32, col: u32) -> GrayImage {
    let cell_width = image.width() / 3;
    let cell_height = image.height() / 3;
    let left = ((col as f32 + BORDER_CROP) * cell_width as f32) as u32;
    let top = ((row as f32 + BORDER_CROP) * cell_height as f32) as u32;
    let right = ((col as f32 + 1.0 - BORDER_CROP) * cell_width as f32) as u32;
    let bottom = ((row as f32 + 1.0 - BORDER_CROP) * cell_height as f32) as u32;
    imageops::crop_imm(image, left, top, right - left, bottom - top).to_image()
}

/// Reads a full board out of an encoded photo.
///
/// # Errors
///
/// [`VisionError::Decode`] if the bytes are not an image,
/// [`VisionError::TooSmall`] if the grid cannot be cut into cells.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn read_board(bytes: &[u8], reader: &dyn GlyphReader) -> Result<Board, VisionError> {
    let decoded = image::load_from_memory(bytes).map_err(VisionError::Decode)?;
    let prepared = preprocess(&decoded);
    if prepared.width() / 3 < 4 || prepared.height() / 3 < 4 {
        return Err(VisionError::TooSmall);
    }

    let mut rows = [[Cell::Empty; 3]; 3];
    for (row, cells) in rows.iter_mut().enumerate() {
        for (col, cell) in cells.iter_mut().enumerate() {
            let glyph = reader.read_glyph(&crop_cell(&prepared, row as u32, col as u32));
            *cell = Cell::from_char(glyph);
        }
    }
    let board = Board::from_rows(rows);
    debug!(filled = board.filled(), "board read from photo");
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;
    use snapmark_core::Move;
    use std::io::Cursor;

    const CELL: u32 = 80;
    const STROKE: i32 = 3;

    fn blank_photo() -> GrayImage {
        let mut img = GrayImage::new(CELL * 3, CELL * 3);
        for pixel in img.pixels_mut() {
            pixel.0[0] = 255;
        }
        // Grid lines on the cell boundaries, like a drawn board.
        for line in [CELL, CELL * 2] {
            for t in 0..CELL * 3 {
                img.put_pixel(line, t, image::Luma([0]));
                img.put_pixel(t, line, image::Luma([0]));
            }
        }
        img
    }

    fn put_ink(img: &mut GrayImage, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, image::Luma([0]));
        }
    }

    fn draw_x(img: &mut GrayImage, row: u32, col: u32) {
        let (ox, oy) = ((col * CELL) as i32, (row * CELL) as i32);
        for t in 0..CELL as i32 {
            for s in -STROKE..=STROKE {
                put_ink(img, ox + t + s, oy + t);
                put_ink(img, ox + t + s, oy + (CELL as i32 - 1 - t));
            }
        }
    }

    fn draw_o(img: &mut GrayImage, row: u32, col: u32) {
        let center = CELL as f32 / 2.0;
        let (ox, oy) = ((col * CELL) as f32, (row * CELL) as f32);
        for y in 0..CELL as i32 {
            for x in 0..CELL as i32 {
                let dist = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt();
                if (dist - CELL as f32 * 0.35).abs() <= STROKE as f32 {
                    put_ink(img, ox as i32 + x, oy as i32 + y);
                }
            }
        }
    }

    fn encode_png(img: GrayImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn mv(row: usize, col: usize) -> Move {
        Move::new(row, col).unwrap()
    }

    #[test]
    fn test_blank_photo_reads_as_empty_board() {
        let bytes = encode_png(blank_photo());
        let board = read_board(&bytes, &InkGlyphReader).unwrap();
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_glyphs_read_back_from_photo() {
        let mut img = blank_photo();
        draw_x(&mut img, 0, 0);
        draw_o(&mut img, 1, 1);
        draw_x(&mut img, 2, 1);
        draw_o(&mut img, 0, 2);

        let board = read_board(&encode_png(img), &InkGlyphReader).unwrap();
        assert_eq!(board.get(mv(0, 0)), Cell::X);
        assert_eq!(board.get(mv(1, 1)), Cell::O);
        assert_eq!(board.get(mv(2, 1)), Cell::X);
        assert_eq!(board.get(mv(0, 2)), Cell::O);
        assert_eq!(board.filled(), 4);
    }

    #[test]
    fn test_grid_lines_are_not_read_as_marks() {
        // Only grid lines, no glyphs: the border crop must discard them.
        let board = read_board(&encode_png(blank_photo()), &InkGlyphReader).unwrap();
        assert_eq!(board.filled(), 0);
    }

    #[test]
    fn test_undecodable_bytes_are_rejected() {
        let err = read_board(b"not an image", &InkGlyphReader).unwrap_err();
        assert!(matches!(err, VisionError::Decode(_)));
    }

    #[test]
    fn test_tiny_image_is_rejected() {
        let mut img = GrayImage::new(9, 9);
        for pixel in img.pixels_mut() {
            pixel.0[0] = 255;
        }
        let err = read_board(&encode_png(img), &InkGlyphReader).unwrap_err();
        assert!(matches!(err, VisionError::TooSmall));
    }

    #[test]
    fn test_crop_cell_insets_the_borders() {
        let img = blank_photo();
        let cell = crop_cell(&img, 0, 0);
        // 10% trimmed from each edge of an 80px cell leaves 64px.
        assert_eq!(cell.dimensions(), (64, 64));
    }

    #[test]
    fn test_ink_reader_distinguishes_the_glyphs() {
        let mut img = blank_photo();
        draw_x(&mut img, 0, 0);
        draw_o(&mut img, 0, 1);
        let prepared = preprocess(&DynamicImage::ImageLuma8(img));

        assert_eq!(InkGlyphReader.read_glyph(&crop_cell(&prepared, 0, 0)), 'x');
        assert_eq!(InkGlyphReader.read_glyph(&crop_cell(&prepared, 0, 1)), 'o');
        assert_eq!(InkGlyphReader.read_glyph(&crop_cell(&prepared, 0, 2)), ' ');
    }
}

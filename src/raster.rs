//! Turns 20x20 images into batched pixel-fill commands.

use image::RgbImage;

use crate::color::{self, PaletteColor};
use crate::grid::{GRID_HEIGHT, GRID_WIDTH, PIXEL_COUNT};
use crate::protocol::{Command, ProtocolError, MAX_FILL_SLOTS};

/// Pixels darker than this value byte go out as OFF.
const VALUE_FLOOR: u8 = 50;
/// Bright, washed-out pixels (value at or above this, saturation below
/// `WHITE_SATURATION`) go out as WHITE.
const WHITE_VALUE: u8 = 200;
const WHITE_SATURATION: u8 = 50;

/// Flatten an image into 400 device color bytes.
///
/// Cells are emitted column by column: all of x=0 top to bottom, then
/// x=1, and so on. Single-pixel writes address the panel row-major
/// (`y * 20 + x`) instead; the bulk path has always walked columns, so
/// the two orders intentionally disagree. Unifying them without checking
/// a real panel transposes the picture.
pub fn rasterize(image: &RgbImage) -> Result<Vec<u8>, ProtocolError> {
    let (width, height) = image.dimensions();
    if width != GRID_WIDTH as u32 || height != GRID_HEIGHT as u32 {
        return Err(ProtocolError::BadImageDimensions { width, height });
    }

    let mut cells = Vec::with_capacity(PIXEL_COUNT);
    for x in 0..width {
        for y in 0..height {
            let pixel = image.get_pixel(x, y);
            cells.push(classify(pixel[0], pixel[1], pixel[2]));
        }
    }
    Ok(cells)
}

/// Map one RGB pixel to a device color byte.
fn classify(r: u8, g: u8, b: u8) -> u8 {
    let (hue, saturation, value) = color::rgb_to_hsv(r, g, b);
    if value < VALUE_FLOOR {
        PaletteColor::Off.device_byte()
    } else if value >= WHITE_VALUE && saturation < WHITE_SATURATION {
        PaletteColor::White.device_byte()
    } else {
        color::hue_to_device_byte(hue)
    }
}

/// Slice device color bytes into fill commands of at most 77 slots, each
/// offset advancing in lockstep. The tail batch stays short; padding it
/// out would address cells past the end of the buffer.
pub fn fill_commands(cells: &[u8]) -> Vec<Command> {
    cells
        .chunks(MAX_FILL_SLOTS)
        .enumerate()
        .map(|(batch, chunk)| Command::PixelFill {
            colors: chunk.to_vec(),
            offset: (batch * MAX_FILL_SLOTS) as u16,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;
    use image::Rgb;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn uniform(r: u8, g: u8, b: u8) -> RgbImage {
        let mut img = RgbImage::new(20, 20);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
        img
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        assert!(matches!(
            rasterize(&RgbImage::new(19, 20)),
            Err(ProtocolError::BadImageDimensions { width: 19, height: 20 })
        ));
        assert!(matches!(
            rasterize(&RgbImage::new(20, 21)),
            Err(ProtocolError::BadImageDimensions { width: 20, height: 21 })
        ));
        assert!(rasterize(&RgbImage::new(20, 20)).is_ok());
    }

    #[test]
    fn test_black_goes_off() {
        let cells = rasterize(&uniform(0, 0, 0)).unwrap();
        assert_eq!(cells.len(), PIXEL_COUNT);
        assert!(cells.iter().all(|&c| c == 0xFE));
    }

    #[test]
    fn test_white_goes_white() {
        let cells = rasterize(&uniform(255, 255, 255)).unwrap();
        assert!(cells.iter().all(|&c| c == 0xFF));
    }

    #[test]
    fn test_dim_color_goes_off() {
        // value 30 is under the floor even though the pixel is saturated
        let cells = rasterize(&uniform(30, 0, 0)).unwrap();
        assert!(cells.iter().all(|&c| c == 0xFE));
    }

    #[test]
    fn test_saturated_bright_color_keeps_its_hue() {
        let cells = rasterize(&uniform(255, 0, 0)).unwrap();
        assert!(cells.iter().all(|&c| c == 0x00));

        let cells = rasterize(&uniform(0, 255, 0)).unwrap();
        assert!(cells.iter().all(|&c| c == 60));
    }

    #[test]
    fn test_column_major_flattening() {
        let mut img = uniform(0, 0, 0);
        img.put_pixel(1, 0, Rgb([255, 0, 0]));

        let cells = rasterize(&img).unwrap();
        // (x=1, y=0) lands after all twenty cells of column 0
        assert_eq!(cells[20], 0x00);
        assert!(cells[..20].iter().all(|&c| c == 0xFE));

        // the row-major single-pixel index for the same cell is different
        assert_eq!(grid::pixel_index(1, 0).unwrap(), 1);
    }

    #[test]
    fn test_four_hundred_cells_batch_into_six_fills() {
        let cells = vec![0x3C; PIXEL_COUNT];
        let commands = fill_commands(&cells);
        assert_eq!(commands.len(), 6);

        let offsets: Vec<u16> = commands
            .iter()
            .map(|c| match c {
                Command::PixelFill { offset, .. } => *offset,
                other => panic!("unexpected command {:?}", other),
            })
            .collect();
        assert_eq!(offsets, vec![0, 77, 154, 231, 308, 385]);

        match &commands[5] {
            Command::PixelFill { colors, .. } => assert_eq!(colors.len(), 15),
            other => panic!("unexpected command {:?}", other),
        }

        // every batch encodes into a legal frame
        let mut rng = StdRng::seed_from_u64(1);
        for command in &commands {
            let frame = command.encode(&mut rng).unwrap();
            assert!(frame.len() <= 4 + 255);
        }
    }
}

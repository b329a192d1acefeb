use rasterkit_image::{Image, ImageSize, Pixel};

use crate::error::IoError;
use crate::palette::Palette;

/// The `BM` magic number.
pub const BMP_MAGIC: u16 = 0x4D42;

/// Size of the file header in bytes.
pub const FILE_HEADER_SIZE: u32 = 14;

/// Size of the info header written by the encoder.
pub const INFO_HEADER_SIZE: u32 = 40;

/// Supported pixel storage depths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitDepth {
    /// One palette index byte per pixel.
    Eight,
    /// Three bytes per pixel in B, G, R order.
    TwentyFour,
}

impl BitDepth {
    /// Bits per pixel as stored in the header.
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::TwentyFour => 24,
        }
    }

    fn bytes_per_pixel(self) -> usize {
        self.bits() as usize / 8
    }

    fn from_bits(bits: u16) -> Result<Self, IoError> {
        match bits {
            8 => Ok(BitDepth::Eight),
            24 => Ok(BitDepth::TwentyFour),
            other => Err(IoError::UnsupportedDepth(other)),
        }
    }
}

/// The 14-byte file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    /// Magic number, `0x4D42`.
    pub file_type: u16,
    /// Total file size in bytes.
    pub file_size: u32,
    /// Reserved, zero.
    pub reserved1: u16,
    /// Reserved, zero.
    pub reserved2: u16,
    /// Offset of the pixel data from the start of the file.
    pub pixel_data_offset: u32,
}

/// The 40-byte info header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    /// Size of this header in bytes.
    pub header_size: u32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels, negative for top-down files.
    pub height: i32,
    /// Color planes, one.
    pub planes: u16,
    /// Bits per pixel.
    pub bits_per_pixel: u16,
    /// Compression method, zero for none.
    pub compression: u32,
    /// Size of the padded pixel data in bytes.
    pub image_size: u32,
    /// Horizontal resolution in pixels per meter.
    pub x_pixels_per_meter: i32,
    /// Vertical resolution in pixels per meter.
    pub y_pixels_per_meter: i32,
    /// Number of palette entries.
    pub total_colors: u32,
    /// Number of important colors, zero for all.
    pub important_colors: u32,
}

/// A decoded bitmap: headers, optional palette and the pixels.
///
/// Pixels are held top row first regardless of the row order of the file.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    file_header: FileHeader,
    info_header: InfoHeader,
    palette: Option<Palette>,
    image: Image<Pixel>,
}

/// Little-endian field reader over a byte slice.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], IoError> {
        let end = self.pos + N;
        let chunk = self.bytes.get(self.pos..end).ok_or(IoError::Truncated {
            expected: end,
            actual: self.bytes.len(),
        })?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16, IoError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32, IoError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32, IoError> {
        Ok(i32::from_le_bytes(self.take()?))
    }
}

/// Bytes per stored row, padded to a multiple of four.
pub fn row_stride(width: usize, depth: BitDepth) -> usize {
    (width * depth.bytes_per_pixel()).div_ceil(4) * 4
}

impl Bitmap {
    /// Wrap an image as a 24-bit bitmap.
    pub fn new(image: Image<Pixel>) -> Self {
        let mut bitmap = Self {
            file_header: FileHeader {
                file_type: BMP_MAGIC,
                file_size: 0,
                reserved1: 0,
                reserved2: 0,
                pixel_data_offset: 0,
            },
            info_header: InfoHeader {
                header_size: INFO_HEADER_SIZE,
                width: 0,
                height: 0,
                planes: 1,
                bits_per_pixel: 24,
                compression: 0,
                image_size: 0,
                x_pixels_per_meter: 0,
                y_pixels_per_meter: 0,
                total_colors: 0,
                important_colors: 0,
            },
            palette: None,
            image,
        };
        bitmap.regenerate_header();
        bitmap
    }

    /// Decode a bitmap from its file bytes.
    ///
    /// Rows are stored bottom row first unless the height is negative.
    ///
    /// # Errors
    ///
    /// * [`IoError::NotARaster`] if the magic number is not `BM`.
    /// * [`IoError::UnsupportedDepth`] for depths other than 8 and 24.
    /// * [`IoError::UnsupportedCompression`] for compressed data.
    /// * [`IoError::Truncated`] if the buffer is shorter than the header announces.
    /// * [`IoError::InvalidPaletteIndex`] for an index past the palette end.
    ///
    /// # Examples
    ///
    /// ```
    /// use rasterkit_image::{Image, Pixel};
    /// use rasterkit_io::Bitmap;
    ///
    /// let image = Image::from_size_val([3, 2].into(), Pixel::RED);
    /// let bytes = Bitmap::new(image.clone()).encode().unwrap();
    /// let decoded = Bitmap::decode(&bytes).unwrap();
    /// assert_eq!(decoded.image(), &image);
    /// ```
    pub fn decode(bytes: &[u8]) -> Result<Self, IoError> {
        let mut reader = Reader::new(bytes, 0);
        let file_type = reader.u16()?;
        if file_type != BMP_MAGIC {
            return Err(IoError::NotARaster(file_type));
        }
        let file_header = FileHeader {
            file_type,
            file_size: reader.u32()?,
            reserved1: reader.u16()?,
            reserved2: reader.u16()?,
            pixel_data_offset: reader.u32()?,
        };
        let info_header = InfoHeader {
            header_size: reader.u32()?,
            width: reader.i32()?,
            height: reader.i32()?,
            planes: reader.u16()?,
            bits_per_pixel: reader.u16()?,
            compression: reader.u32()?,
            image_size: reader.u32()?,
            x_pixels_per_meter: reader.i32()?,
            y_pixels_per_meter: reader.i32()?,
            total_colors: reader.u32()?,
            important_colors: reader.u32()?,
        };

        let depth = BitDepth::from_bits(info_header.bits_per_pixel)?;
        if info_header.compression != 0 {
            return Err(IoError::UnsupportedCompression(info_header.compression));
        }
        if info_header.width <= 0 || info_header.height == 0 || info_header.height == i32::MIN {
            return Err(IoError::InvalidDimensions(
                info_header.width,
                info_header.height,
            ));
        }

        let width = info_header.width as usize;
        let height = info_header.height.unsigned_abs() as usize;
        let bottom_up = info_header.height > 0;

        let palette = match depth {
            BitDepth::Eight => Some(Self::decode_palette(bytes, &file_header, &info_header)?),
            BitDepth::TwentyFour => None,
        };

        let stride = row_stride(width, depth);
        let offset = file_header.pixel_data_offset as usize;
        let expected = offset + stride * height;
        if bytes.len() < expected {
            return Err(IoError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let mut pixels = vec![Pixel::default(); width * height];
        for file_row in 0..height {
            let row = if bottom_up { height - 1 - file_row } else { file_row };
            let start = offset + file_row * stride;
            let src = &bytes[start..start + width * depth.bytes_per_pixel()];
            let dst = &mut pixels[row * width..(row + 1) * width];
            match (&palette, depth) {
                (Some(palette), BitDepth::Eight) => {
                    for (p, &index) in dst.iter_mut().zip(src) {
                        *p = palette
                            .get(index)
                            .ok_or(IoError::InvalidPaletteIndex(index, palette.len()))?;
                    }
                }
                _ => {
                    for (p, bgr) in dst.iter_mut().zip(src.chunks_exact(3)) {
                        *p = Pixel::rgb(bgr[2], bgr[1], bgr[0]);
                    }
                }
            }
        }

        log::debug!(
            "decoded {}x{} bitmap at {} bits per pixel",
            width,
            height,
            depth.bits()
        );

        let image = Image::new(ImageSize { width, height }, pixels)?;
        let mut bitmap = Self {
            file_header,
            info_header,
            palette,
            image,
        };
        bitmap.regenerate_header();
        Ok(bitmap)
    }

    fn decode_palette(
        bytes: &[u8],
        file_header: &FileHeader,
        info_header: &InfoHeader,
    ) -> Result<Palette, IoError> {
        let start = (FILE_HEADER_SIZE + info_header.header_size) as usize;
        let count = (file_header.pixel_data_offset as usize)
            .saturating_sub(start)
            / 4;
        let count = count.min(crate::palette::MAX_PALETTE_LEN);

        let mut reader = Reader::new(bytes, start);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let [b, g, r, a] = reader.take::<4>()?;
            colors.push(Pixel::new(r, g, b, a));
        }
        Palette::new(colors)
    }

    /// Encode the bitmap into file bytes, bottom row first.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ColorNotInPalette`] if an 8-bit image holds a color
    /// missing from its palette.
    pub fn encode(&self) -> Result<Vec<u8>, IoError> {
        let depth = self.bit_depth();
        let fh = &self.file_header;
        let ih = &self.info_header;

        let mut out = Vec::with_capacity(fh.file_size as usize);
        out.extend_from_slice(&fh.file_type.to_le_bytes());
        out.extend_from_slice(&fh.file_size.to_le_bytes());
        out.extend_from_slice(&fh.reserved1.to_le_bytes());
        out.extend_from_slice(&fh.reserved2.to_le_bytes());
        out.extend_from_slice(&fh.pixel_data_offset.to_le_bytes());

        out.extend_from_slice(&ih.header_size.to_le_bytes());
        out.extend_from_slice(&ih.width.to_le_bytes());
        out.extend_from_slice(&ih.height.to_le_bytes());
        out.extend_from_slice(&ih.planes.to_le_bytes());
        out.extend_from_slice(&ih.bits_per_pixel.to_le_bytes());
        out.extend_from_slice(&ih.compression.to_le_bytes());
        out.extend_from_slice(&ih.image_size.to_le_bytes());
        out.extend_from_slice(&ih.x_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&ih.y_pixels_per_meter.to_le_bytes());
        out.extend_from_slice(&ih.total_colors.to_le_bytes());
        out.extend_from_slice(&ih.important_colors.to_le_bytes());

        let index_map = match &self.palette {
            Some(palette) if depth == BitDepth::Eight => {
                for c in palette.colors() {
                    out.extend_from_slice(&[c.b, c.g, c.r, c.a]);
                }
                Some(palette.index_map())
            }
            _ => None,
        };

        let width = self.image.width();
        let stride = row_stride(width, depth);
        let padding = stride - width * depth.bytes_per_pixel();
        for y in (0..self.image.height()).rev() {
            let row = self.image.row(y).unwrap_or_default();
            match (&index_map, depth) {
                (Some(map), BitDepth::Eight) => {
                    for p in row {
                        let index = map.get(p).ok_or(IoError::ColorNotInPalette(*p))?;
                        out.push(*index);
                    }
                }
                (None, BitDepth::Eight) => {
                    if let Some(p) = row.first() {
                        return Err(IoError::ColorNotInPalette(*p));
                    }
                }
                _ => {
                    for p in row {
                        out.extend_from_slice(&[p.b, p.g, p.r]);
                    }
                }
            }
            out.extend(std::iter::repeat(0u8).take(padding));
        }
        Ok(out)
    }

    /// Recompute sizes, offsets and dimensions from the pixels and palette.
    ///
    /// The pixel data is always laid out bottom row first after this call.
    pub fn regenerate_header(&mut self) {
        let depth = self.bit_depth();
        let palette_len = match (&self.palette, depth) {
            (Some(p), BitDepth::Eight) => p.len() as u32,
            _ => 0,
        };
        let image_size = (row_stride(self.image.width(), depth) * self.image.height()) as u32;
        let offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + 4 * palette_len;

        self.file_header.file_type = BMP_MAGIC;
        self.file_header.pixel_data_offset = offset;
        self.file_header.file_size = offset + image_size;

        let ih = &mut self.info_header;
        ih.header_size = INFO_HEADER_SIZE;
        ih.width = self.image.width() as i32;
        ih.height = self.image.height() as i32;
        ih.planes = 1;
        ih.compression = 0;
        ih.image_size = image_size;
        ih.total_colors = palette_len;
        ih.important_colors = 0;
    }

    /// Reduce the bitmap to an 8-bit palette of the colors currently present.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::TooManyColors`] if more than 256 distinct colors are
    /// present; the bitmap is left unchanged.
    pub fn change_to_eight_bit(&mut self) -> Result<(), IoError> {
        let palette = Palette::from_image(&self.image)?;
        self.palette = Some(palette);
        self.info_header.bits_per_pixel = BitDepth::Eight.bits();
        self.regenerate_header();
        Ok(())
    }

    /// Store the pixels directly at 24 bits, dropping the palette.
    pub fn change_to_twenty_four_bit(&mut self) {
        self.palette = None;
        self.info_header.bits_per_pixel = BitDepth::TwentyFour.bits();
        self.regenerate_header();
    }

    /// Replace the pixels, keeping the depth and palette.
    pub fn set_image(&mut self, image: Image<Pixel>) {
        self.image = image;
        self.regenerate_header();
    }

    /// The storage depth.
    pub fn bit_depth(&self) -> BitDepth {
        match self.info_header.bits_per_pixel {
            8 => BitDepth::Eight,
            _ => BitDepth::TwentyFour,
        }
    }

    /// The file header.
    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    /// The info header.
    pub fn info_header(&self) -> &InfoHeader {
        &self.info_header
    }

    /// The palette of an 8-bit bitmap.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// The pixels, top row first.
    pub fn image(&self) -> &Image<Pixel> {
        &self.image
    }

    /// Consume the bitmap and return the pixels.
    pub fn into_image(self) -> Image<Pixel> {
        self.image
    }
}

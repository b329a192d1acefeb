use std::collections::{BTreeSet, HashMap};

use rasterkit_image::{Image, Pixel};

use crate::error::IoError;

/// Maximum number of entries in an 8-bit palette.
pub const MAX_PALETTE_LEN: usize = 256;

/// An ordered list of unique colors referenced by index from 8-bit pixel data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Pixel>,
}

impl Palette {
    /// Wrap an explicit list of colors, as read from a file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::TooManyColors`] beyond 256 entries.
    pub fn new(colors: Vec<Pixel>) -> Result<Self, IoError> {
        if colors.len() > MAX_PALETTE_LEN {
            return Err(IoError::TooManyColors(colors.len()));
        }
        Ok(Self { colors })
    }

    /// Build the palette of the distinct colors present in `image`, sorted by
    /// channel value.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::TooManyColors`] if the image holds more than 256
    /// distinct colors.
    pub fn from_image(image: &Image<Pixel>) -> Result<Self, IoError> {
        let mut unique = BTreeSet::new();
        image.data().for_each_sync(|p, _| {
            unique.insert(*p);
        });
        Self::new(unique.into_iter().collect())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The entries in index order.
    pub fn colors(&self) -> &[Pixel] {
        &self.colors
    }

    /// The color stored at `index`.
    pub fn get(&self, index: u8) -> Option<Pixel> {
        self.colors.get(index as usize).copied()
    }

    /// Map every color to its index.
    ///
    /// When a color appears twice the first index wins.
    pub fn index_map(&self) -> HashMap<Pixel, u8> {
        let mut map = HashMap::with_capacity(self.colors.len());
        for (i, c) in self.colors.iter().enumerate() {
            map.entry(*c).or_insert(i as u8);
        }
        map
    }
}

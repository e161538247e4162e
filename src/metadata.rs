//! Typed EXIF metadata block.
//!
//! A [`Metadata`] maps EXIF tags to typed values for the primary image. It is
//! decoded from, and encoded back to, the raw TIFF stream stored in a JPEG's
//! APP1 segment.

use std::collections::HashMap;
use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Reader};
pub use exif::{Tag, Value};

use crate::error::Result;

/// Numeric EXIF id of the Artist tag (`0x013B`), used for the rights holder.
pub const ARTIST_TAG_ID: u16 = 315;

/// Tags describing the layout of the TIFF stream rather than the image.
/// They are regenerated when the block is written.
const STRUCTURAL_TAGS: [Tag; 5] = [
    Tag::ExifIFDPointer,
    Tag::GPSInfoIFDPointer,
    Tag::InteropIFDPointer,
    Tag::JPEGInterchangeFormat,
    Tag::JPEGInterchangeFormatLength,
];

/// Metadata block of an image: EXIF tag to value.
///
/// A block decoded from a file keeps its original bytes and writes them back
/// unchanged until it is modified.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    fields: HashMap<Tag, Value>,
    little_endian: bool,
    raw: Option<Vec<u8>>,
}

impl Metadata {
    /// Create an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw EXIF (TIFF) stream.
    ///
    /// Thumbnail entries and IFD pointers are dropped; every other
    /// primary-image field is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exif`](crate::Error::Exif) if the stream is malformed.
    pub fn from_exif(raw: Vec<u8>) -> Result<Self> {
        let exif = Reader::new().read_raw(raw.clone())?;
        let fields = exif
            .fields()
            .filter(|f| f.ifd_num == In::PRIMARY)
            .filter(|f| !STRUCTURAL_TAGS.contains(&f.tag))
            .filter(|f| !matches!(f.value, Value::Unknown(..)))
            .map(|f| (f.tag, f.value.clone()))
            .collect();

        Ok(Self {
            fields,
            little_endian: exif.little_endian(),
            raw: Some(raw),
        })
    }

    /// Number of fields in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the block holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `tag` is present.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.fields.contains_key(&tag)
    }

    /// Value stored for `tag`.
    #[must_use]
    pub fn get(&self, tag: Tag) -> Option<&Value> {
        self.fields.get(&tag)
    }

    /// All tags present, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.fields.keys().copied()
    }

    /// Set `tag` to `value`, replacing any previous value.
    pub fn insert(&mut self, tag: Tag, value: Value) {
        self.raw = None;
        self.fields.insert(tag, value);
    }

    /// Remove `tag`, returning its value if it was present.
    pub fn remove(&mut self, tag: Tag) -> Option<Value> {
        let old = self.fields.remove(&tag);
        if old.is_some() {
            self.raw = None;
        }
        old
    }

    /// Discard every field.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.raw = None;
    }

    /// Store `text` as an ASCII-typed value.
    pub fn set_text(&mut self, tag: Tag, text: &str) {
        self.insert(tag, Value::Ascii(vec![text.as_bytes().to_vec()]));
    }

    /// Text stored for `tag`, if it is ASCII-typed.
    #[must_use]
    pub fn text(&self, tag: Tag) -> Option<String> {
        match self.fields.get(&tag)? {
            Value::Ascii(parts) => parts.first().map(|bytes| {
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .to_string()
            }),
            _ => None,
        }
    }

    /// The Artist field.
    #[must_use]
    pub fn artist(&self) -> Option<String> {
        self.text(Tag::Artist)
    }

    /// Set the Artist field.
    pub fn set_artist(&mut self, artist: &str) {
        self.set_text(Tag::Artist, artist);
    }

    /// Record the size of the stored raster in `PixelXDimension` and
    /// `PixelYDimension`.
    ///
    /// Only tags the block already carries are updated; a block without them
    /// stays untouched.
    pub fn set_pixel_dimensions(&mut self, width: u32, height: u32) {
        for (tag, value) in [
            (Tag::PixelXDimension, width),
            (Tag::PixelYDimension, height),
        ] {
            let stale = self
                .fields
                .get(&tag)
                .is_some_and(|old| old.get_uint(0) != Some(value));
            if stale {
                self.insert(tag, Value::Long(vec![value]));
            }
        }
    }

    /// Encode the block as a raw EXIF (TIFF) stream.
    ///
    /// An unmodified block is returned as decoded, thumbnail included. A
    /// modified block is rebuilt from the primary-image fields only, so the
    /// thumbnail, which would show the unedited picture, is dropped. Returns
    /// `None` when there is nothing to write, so that no APP1 segment is
    /// emitted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exif`](crate::Error::Exif) if a value cannot be encoded.
    pub fn to_exif(&self) -> Result<Option<Vec<u8>>> {
        if let Some(raw) = &self.raw {
            return Ok(Some(raw.clone()));
        }
        if self.fields.is_empty() {
            return Ok(None);
        }

        let mut fields: Vec<Field> = self
            .fields
            .iter()
            .map(|(tag, value)| Field {
                tag: *tag,
                ifd_num: In::PRIMARY,
                value: value.clone(),
            })
            .collect();
        fields.sort_by_key(|f| f.tag.number());

        let mut writer = Writer::new();
        for field in &fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, self.little_endian)?;
        Ok(Some(buf.into_inner()))
    }
}

//! The Windows icon (`.ico`) container.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! header     reserved:u16 = 0 | type:u16 = 1 | count:u16
//! directory  count x { width:u8 | height:u8 | colors:u8 | reserved:u8
//!                    | planes:u16 | bpp:u16 | size:u32 | offset:u32 }
//! payloads   image bytes back to back, in directory order
//! ```
//!
//! A width or height of 256 is stored as 0.

use crate::error::ContainerError;
use crate::icon::IconImage;

/// Byte length of the container header.
pub const HEADER_LEN: usize = 6;
/// Byte length of one directory entry.
pub const DIR_ENTRY_LEN: usize = 16;

const ICON_TYPE: u16 = 1;
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

// ============================================================================
// IcoDirEntry
// ============================================================================

/// One decoded directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcoDirEntry {
    /// Width in pixels (1-256).
    pub width: u32,
    /// Height in pixels (1-256).
    pub height: u32,
    /// Palette size; 0 when the payload carries its own depth.
    pub color_count: u8,
    pub color_planes: u16,
    pub bits_per_pixel: u16,
    /// Payload length in bytes.
    pub size: u32,
    /// Payload position from the start of the container.
    pub offset: u32,
}

impl IcoDirEntry {
    /// The payload bytes this entry points at, if they lie within `bytes`.
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.offset as usize;
        bytes.get(start..start.checked_add(self.size as usize)?)
    }
}

// ============================================================================
// IcoContainer
// ============================================================================

/// An ordered list of images to pack into one icon file.
///
/// Directory and payload order are the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcoContainer {
    entries: Vec<IconImage>,
}

impl IcoContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_images(images: Vec<IconImage>) -> Self {
        Self { entries: images }
    }

    pub fn push(&mut self, image: IconImage) {
        self.entries.push(image);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IconImage] {
        &self.entries
    }

    /// Serializes header, directory and payloads.
    pub fn encode(&self) -> Result<Vec<u8>, ContainerError> {
        let count = u16::try_from(self.entries.len())
            .map_err(|_| ContainerError::TooManyEntries(self.entries.len()))?;

        let data_start = HEADER_LEN + DIR_ENTRY_LEN * self.entries.len();
        let payload_len: usize = self.entries.iter().map(|e| e.payload().len()).sum();
        let mut out = Vec::with_capacity(data_start + payload_len);

        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&ICON_TYPE.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());

        let mut offset = data_start;
        for image in &self.entries {
            let dimension = dimension_byte(image.size())?;
            let len = image.payload().len();
            let size = u32::try_from(len).map_err(|_| ContainerError::PayloadTooLarge(len))?;
            let position =
                u32::try_from(offset).map_err(|_| ContainerError::PayloadTooLarge(offset))?;

            out.push(dimension); // width
            out.push(dimension); // height
            out.push(0); // color count
            out.push(0); // reserved
            out.extend_from_slice(&COLOR_PLANES.to_le_bytes());
            out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&position.to_le_bytes());

            offset += len;
        }

        for image in &self.entries {
            out.extend_from_slice(image.payload());
        }

        tracing::debug!(entries = count, len = out.len(), "encoded icon container");
        Ok(out)
    }
}

/// Stores 1-255 as-is and 256 as 0.
fn dimension_byte(size: u32) -> Result<u8, ContainerError> {
    match size {
        256 => Ok(0),
        1..=255 => Ok(size as u8),
        other => Err(ContainerError::InvalidDimension(other)),
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Parses the header and directory of an icon container.
///
/// Fails unless every entry's payload lies within `bytes`.
pub fn read_directory(bytes: &[u8]) -> Result<Vec<IcoDirEntry>, ContainerError> {
    if bytes.len() < HEADER_LEN {
        return Err(ContainerError::Truncated {
            needed: HEADER_LEN,
            len: bytes.len(),
        });
    }
    let reserved = read_u16(bytes, 0);
    let kind = read_u16(bytes, 2);
    if reserved != 0 || kind != ICON_TYPE {
        return Err(ContainerError::InvalidHeader);
    }

    let count = read_u16(bytes, 4) as usize;
    let needed = HEADER_LEN + count * DIR_ENTRY_LEN;
    if bytes.len() < needed {
        return Err(ContainerError::Truncated {
            needed,
            len: bytes.len(),
        });
    }

    let mut entries = Vec::with_capacity(count);
    for record in bytes[HEADER_LEN..needed].chunks_exact(DIR_ENTRY_LEN) {
        let entry = IcoDirEntry {
            width: dimension_from_byte(record[0]),
            height: dimension_from_byte(record[1]),
            color_count: record[2],
            color_planes: read_u16(record, 4),
            bits_per_pixel: read_u16(record, 6),
            size: read_u32(record, 8),
            offset: read_u32(record, 12),
        };
        let end = (entry.offset as usize).checked_add(entry.size as usize);
        match end {
            Some(end) if end <= bytes.len() => {}
            _ => {
                return Err(ContainerError::Truncated {
                    needed: end.unwrap_or(usize::MAX),
                    len: bytes.len(),
                });
            }
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn dimension_from_byte(byte: u8) -> u32 {
    if byte == 0 { 256 } else { byte as u32 }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IcoContainer {
        IcoContainer::from_images(vec![
            IconImage::new(16, vec![0xAA; 5]),
            IconImage::new(256, vec![0xBB; 3]),
            IconImage::new(48, vec![0xCC; 7]),
        ])
    }

    #[test]
    fn header_layout() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[..6], &[0, 0, 1, 0, 3, 0]);
        assert_eq!(bytes.len(), 6 + 3 * 16 + 5 + 3 + 7);
    }

    #[test]
    fn directory_entry_layout() {
        let bytes = sample().encode().unwrap();
        let first = &bytes[6..22];
        assert_eq!(
            first,
            &[16, 16, 0, 0, 1, 0, 32, 0, 5, 0, 0, 0, 54, 0, 0, 0]
        );
    }

    #[test]
    fn dimension_256_is_stored_as_zero() {
        let bytes = sample().encode().unwrap();
        let second = &bytes[22..38];
        assert_eq!(second[0], 0);
        assert_eq!(second[1], 0);

        for size in [1u32, 16, 128, 255] {
            let bytes = IcoContainer::from_images(vec![IconImage::new(size, vec![1])])
                .encode()
                .unwrap();
            assert_eq!(bytes[6] as u32, size);
            assert_eq!(bytes[7] as u32, size);
        }
    }

    #[test]
    fn offsets_bound_payloads_in_input_order() {
        let container = sample();
        let bytes = container.encode().unwrap();
        let entries = read_directory(&bytes).unwrap();

        assert_eq!(entries.len(), container.len());
        let mut expected_offset = (HEADER_LEN + 3 * DIR_ENTRY_LEN) as u32;
        for (entry, image) in entries.iter().zip(container.entries()) {
            assert_eq!(entry.width, image.size());
            assert_eq!(entry.height, image.size());
            assert_eq!(entry.offset, expected_offset);
            assert_eq!(entry.size as usize, image.payload().len());
            assert_eq!(entry.payload(&bytes).unwrap(), image.payload());
            assert_eq!((entry.color_planes, entry.bits_per_pixel), (1, 32));
            expected_offset += entry.size;
        }
        assert_eq!(expected_offset as usize, bytes.len());
    }

    #[test]
    fn empty_container_is_header_only() {
        let bytes = IcoContainer::new().encode().unwrap();
        assert_eq!(bytes, vec![0, 0, 1, 0, 0, 0]);
        assert!(read_directory(&bytes).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_dimensions_fail() {
        for size in [0u32, 257, 512] {
            let mut container = IcoContainer::new();
            container.push(IconImage::new(size, vec![1]));
            assert_eq!(
                container.encode(),
                Err(ContainerError::InvalidDimension(size))
            );
        }
    }

    #[test]
    fn read_rejects_cursor_and_truncated_files() {
        let mut bytes = sample().encode().unwrap();
        assert!(matches!(
            read_directory(&bytes[..4]),
            Err(ContainerError::Truncated { .. })
        ));
        assert!(matches!(
            read_directory(&bytes[..bytes.len() - 1]),
            Err(ContainerError::Truncated { .. })
        ));

        bytes[2] = 2;
        assert_eq!(read_directory(&bytes), Err(ContainerError::InvalidHeader));
    }

    #[test]
    fn read_rejects_entry_past_address_space() {
        let mut bytes = sample().encode().unwrap();
        // First entry: size and offset both u32::MAX.
        bytes[14..22].fill(0xFF);
        assert!(matches!(
            read_directory(&bytes),
            Err(ContainerError::Truncated { .. })
        ));

        let entry = IcoDirEntry {
            width: 16,
            height: 16,
            color_count: 0,
            color_planes: 1,
            bits_per_pixel: 32,
            size: u32::MAX,
            offset: u32::MAX,
        };
        assert!(entry.payload(&bytes).is_none());
    }
}

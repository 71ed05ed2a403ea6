//! Encoded icon images.

/// One square image of an icon set, already encoded (PNG for icon
/// containers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    /// Edge length in pixels.
    size: u32,

    /// The encoded image bytes.
    payload: Vec<u8>,
}

impl IconImage {
    pub fn new(size: u32, payload: Vec<u8>) -> Self {
        Self { size, payload }
    }

    /// Returns the edge length in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

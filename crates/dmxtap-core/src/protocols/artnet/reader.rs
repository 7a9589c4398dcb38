use super::layout;

/// Bounds-checked byte access over a raw UDP payload.
///
/// Every accessor returns `None` past the end of the payload; a truncated
/// packet can never panic the decoder.
pub struct ArtNetReader<'a> {
    payload: &'a [u8],
}

impl<'a> ArtNetReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn has_len(&self, needed: usize) -> bool {
        self.payload.len() >= needed
    }

    pub fn read_u16_le(&self, range: std::ops::Range<usize>) -> Option<u16> {
        let bytes = self.read_slice(range)?.try_into().ok()?;
        Some(u16::from_le_bytes(bytes))
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Option<u16> {
        let bytes = self.read_slice(range)?.try_into().ok()?;
        Some(u16::from_be_bytes(bytes))
    }

    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.payload.get(offset).copied()
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Option<&'a [u8]> {
        self.payload.get(range)
    }

    pub fn read_signature(&self) -> Option<&'a [u8]> {
        self.read_slice(0..layout::ARTNET_ID.len())
    }
}

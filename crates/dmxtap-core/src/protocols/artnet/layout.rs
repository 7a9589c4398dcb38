pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

pub const OP_CODE_RANGE: std::ops::Range<usize> = 8..10;
pub const PROT_VER_RANGE: std::ops::Range<usize> = 10..12;
pub const SEQUENCE_OFFSET: usize = 12;
pub const SUB_UNI_OFFSET: usize = 14;
pub const NET_OFFSET: usize = 15;
pub const LENGTH_RANGE: std::ops::Range<usize> = 16..18;
pub const DMX_DATA_OFFSET: usize = 18;

pub const ARTDMX_OPCODE: u16 = 0x5000;

pub const DMX_MIN_LENGTH: usize = 2;
pub const DMX_MAX_SLOTS: usize = 512;

/// Standard Art-Net UDP port.
pub const ARTNET_PORT: u16 = 6454;

/// Significant bits of the Port-Address: 7-bit Net, 4-bit Sub-Net, 4-bit
/// Universe. Bit 15 is reserved on the wire and always masked off.
pub const NET_MASK: u8 = 0x7F;

use super::layout;
use super::reader::ArtNetReader;

/// One decoded ArtDMX packet, before capture metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtDmx {
    /// 15-bit Port-Address (Net << 8 | SubUni), bit 15 masked off.
    pub universe: u16,
    /// Wire sequence number; `0x00` on the wire means "sequence unused".
    pub sequence: Option<u8>,
    /// Full universe, zero-padded beyond the packet's declared data length.
    pub slots: [u8; layout::DMX_MAX_SLOTS],
}

impl ArtDmx {
    /// 7-bit Net portion of the Port-Address.
    pub fn net(&self) -> u8 {
        (self.universe >> 8) as u8
    }

    /// 4-bit Sub-Net portion of the Port-Address.
    pub fn sub_net(&self) -> u8 {
        ((self.universe >> 4) & 0x0F) as u8
    }

    /// 4-bit Universe portion of the Port-Address.
    pub fn universe_index(&self) -> u8 {
        (self.universe & 0x0F) as u8
    }
}

/// Decode a raw UDP payload as an ArtDMX frame.
///
/// Returns `None` for anything that is not a well-formed ArtDMX packet:
/// short payloads, a missing `"Art-Net\0"` signature, foreign opcodes
/// (ArtPoll and friends are legitimate traffic this tap simply ignores),
/// and declared data lengths outside 2..=512 or past the payload end.
/// Protocol version, sequence, and physical port are not validated.
pub fn parse_artdmx(payload: &[u8]) -> Option<ArtDmx> {
    let reader = ArtNetReader::new(payload);
    if !reader.has_len(layout::DMX_DATA_OFFSET) {
        return None;
    }

    let signature = reader.read_signature()?;
    if signature != layout::ARTNET_ID {
        return None;
    }

    let opcode = reader.read_u16_le(layout::OP_CODE_RANGE)?;
    if opcode != layout::ARTDMX_OPCODE {
        return None;
    }

    // Read but do not enforce: forward compatible with later revisions.
    let _prot_ver = reader.read_u16_be(layout::PROT_VER_RANGE)?;

    let sequence = reader.read_u8(layout::SEQUENCE_OFFSET)?;
    let sub_uni = reader.read_u8(layout::SUB_UNI_OFFSET)?;
    let net = reader.read_u8(layout::NET_OFFSET)?;
    let universe = u16::from(net & layout::NET_MASK) << 8 | u16::from(sub_uni);

    let length = reader.read_u16_be(layout::LENGTH_RANGE)? as usize;
    if length < layout::DMX_MIN_LENGTH || length > layout::DMX_MAX_SLOTS {
        return None;
    }
    let data = reader.read_slice(layout::DMX_DATA_OFFSET..layout::DMX_DATA_OFFSET + length)?;

    let mut slots = [0u8; layout::DMX_MAX_SLOTS];
    slots[..length].copy_from_slice(data);

    Some(ArtDmx {
        universe,
        sequence: if sequence == 0 { None } else { Some(sequence) },
        slots,
    })
}

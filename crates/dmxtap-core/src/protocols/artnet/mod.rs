//! Art-Net protocol decoding.
//!
//! The parser validates the Art-Net signature and opcode, then decodes ArtDMX
//! payloads into domain-friendly structures. The declared data length is
//! bounded to 2..=512 and checked against the payload before any copy, so a
//! truncated datagram is rejected whole, never partially applied.
//!
//! Rejection is a tagged result (`None`), not an error: on a shared network
//! segment, foreign broadcast packets and other Art-Net opcodes (ArtPoll,
//! ArtSync) are routine and must be ignored without noise. Byte offsets live
//! in `layout`, access conventions in `reader`.
//!
//! Version française (résumé):
//! Le module décode Art-Net/ArtDMX avec validations strictes (signature,
//! opcode, longueur DMX dans 2..=512, bornée par la charge utile). Tout
//! paquet étranger ou tronqué est écarté en silence (`None`), jamais via une
//! erreur. Les positions sont dans `layout`, les conventions dans `reader`.

pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{ArtDmx, parse_artdmx};

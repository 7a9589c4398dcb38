//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `reader`: safe byte access and protocol conventions
//!
//! Parsers are pure and contain no I/O; the capture layer owns sockets and
//! aggregation. A packet that is not a well-formed ArtDMX frame decodes to
//! `None` rather than an error: a shared segment legitimately carries
//! unrelated broadcast traffic, and a passive tap must drop it in silence.

pub mod artnet;

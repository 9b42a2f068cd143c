//! # Wire Packets
//!
//! ```text
//! status:   rlp([0x00, version])
//! messages: rlp([0x01, envelope_0, envelope_1, ...])
//! ```
//!
//! Envelopes inside a messages packet are decoded independently, so one
//! malformed envelope does not cost the others.

use std::sync::Arc;

use hs_01_envelope::{CodecError, Envelope};
use rlp::{Rlp, RlpStream};

use super::errors::PropagationError;

const STATUS_PACKET: u8 = 0x00;
const MESSAGES_PACKET: u8 = 0x01;

/// Outbound packet.
#[derive(Clone, Debug, PartialEq)]
pub enum Packet {
    Status { version: u32 },
    Messages(Vec<Arc<Envelope>>),
}

/// Decoded inbound packet, with per-envelope decode results.
#[derive(Debug)]
pub enum Inbound {
    Status { version: u32 },
    Messages(Vec<Result<Envelope, CodecError>>),
}

impl Packet {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Status { version } => {
                let mut s = RlpStream::new_list(2);
                s.append(&STATUS_PACKET).append(version);
                s.out().to_vec()
            }
            Self::Messages(envelopes) => {
                let mut s = RlpStream::new_list(1 + envelopes.len());
                s.append(&MESSAGES_PACKET);
                for envelope in envelopes {
                    envelope.stream_rlp(&mut s, true);
                }
                s.out().to_vec()
            }
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Inbound, PropagationError> {
        let rlp = Rlp::new(bytes);
        if rlp.payload_info()?.total() != bytes.len() {
            return Err(PropagationError::MalformedPacket("trailing bytes".into()));
        }
        if !rlp.is_list() {
            return Err(PropagationError::MalformedPacket("packet is not a list".into()));
        }
        let count = rlp.item_count()?;
        if count == 0 {
            return Err(PropagationError::MalformedPacket("empty packet".into()));
        }

        match rlp.val_at::<u8>(0)? {
            STATUS_PACKET => {
                if count != 2 {
                    return Err(PropagationError::MalformedPacket(format!(
                        "status packet has {} items",
                        count
                    )));
                }
                Ok(Inbound::Status {
                    version: rlp.val_at(1)?,
                })
            }
            MESSAGES_PACKET => Ok(Inbound::Messages(
                rlp.iter()
                    .skip(1)
                    .map(|item| Envelope::decode_rlp(&item))
                    .collect(),
            )),
            other => Err(PropagationError::UnknownPacket(other)),
        }
    }
}

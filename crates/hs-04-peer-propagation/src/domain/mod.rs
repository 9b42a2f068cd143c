//! # Domain Layer for Peer Propagation
//!
//! - **entities**: `PeerId`, `PeerState`, `PostRequest`, `WorkBudget`
//! - **value_objects**: `PropagationConfig`, `HostStatus`
//! - **packets**: wire packet codec
//! - **errors**: `PropagationError`, `HostError`

mod entities;
mod errors;
mod packets;
mod value_objects;

pub use entities::*;
pub use errors::*;
pub use packets::*;
pub use value_objects::*;

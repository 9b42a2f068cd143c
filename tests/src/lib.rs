//! # Hush Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/hush_benchmarks.rs   # Proof-of-work, envelope codec, sender recovery
//! └── src/integration/             # Multi-node scenarios over the in-memory transport
//!     ├── whisper_topic.rs         # Topic filtering between two nodes
//!     ├── forwarding.rs            # Relaying through intermediate nodes
//!     └── transaction_flow.rs      # Transactions carried as message payloads
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hush-tests
//! cargo bench -p hush-tests
//! ```

pub mod integration;

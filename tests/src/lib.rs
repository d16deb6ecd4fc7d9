//! # kv-port Test Suite
//!
//! Cross-layer tests built against kv-port with the `full` feature, so every
//! codec and the accelerated checksum are linked.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # block encode → write → sync → read → decode
//!     └── matrix.rs     # resolved matrix as seen by a dependent crate
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kv-port-tests
//!
//! # Without target detection
//! KV_PORT_NO_PROBE=1 cargo test -p kv-port-tests
//! ```

pub mod integration;

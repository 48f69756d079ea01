//! # Component Runtime Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures/         # A small arena game built from components
//! │
//! └── integration/      # End-to-end scenarios against the public API
//!     ├── lifecycle.rs
//!     ├── mutation.rs
//!     └── resolution.rs
//!
//! tests/benches/        # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p runtime-tests
//!
//! # By category
//! cargo test -p runtime-tests integration::resolution::
//!
//! # Benchmarks
//! cargo bench -p runtime-tests
//! ```

//! # Hosting Commitment Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/        # Criterion benchmarks (codec, validator, index)
//! └── src/
//!     └── integration/  # Admission → index → lookup scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p hc-tests
//! cargo test -p hc-tests integration::
//! cargo bench -p hc-tests
//! ```

pub mod integration;

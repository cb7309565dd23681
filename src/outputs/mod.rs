//! Run report output.
//!
//! # Output Structure
//!
//! ```text
//! report_dir/
//! └── 2025-05-06/
//!     ├── 080012.json
//!     └── 200341.json
//! ```

pub mod json;

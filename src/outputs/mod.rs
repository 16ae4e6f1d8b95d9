//! Output generation.
//!
//! The thin web layer serves the digest as-is, so the only output format is
//! JSON ([`json`]), organized by date and edition:
//!
//! ```text
//! json_output_dir/
//! └── 2026-08-27/
//!     ├── morning.json
//!     ├── afternoon.json
//!     └── evening.json
//! ```

pub mod json;

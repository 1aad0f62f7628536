//! Data layer: trace types and the measurement-file loader.
//!
//! Architecture:
//! ```text
//!  .result / .csv / .txt  (raw bytes)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  decode   │  UTF-8-sig → UTF-16 → UTF-8 → Latin-1 → Windows-1252
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────────────┐
//!   │ fixed  │ delimited   │  raw (freq, amp) pairs, bad rows dropped
//!   └─────────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  unit policy → Trace (sorted, MHz)
//!   └──────────┘
//! ```

pub mod decode;
pub mod delimited;
pub mod error;
pub mod fixed;
pub mod loader;
pub mod model;
pub mod numeric;

pub use error::LoadError;
pub use loader::{load, load_file, load_named};
pub use model::{FormatHint, Trace, TracePoint, UnitPolicy};

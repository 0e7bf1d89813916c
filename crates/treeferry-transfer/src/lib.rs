//! Single-file transfer strategies for Treeferry
//!
//! One [`Transfer`] instance encapsulates a transfer primitive (copy, move,
//! hardlink, symlink, or an external command) together with its runtime
//! options, and performs one source-to-destination transfer per call. The
//! instance is shared across all transfers in a run; nothing per-call
//! persists on it.

pub mod method;
pub mod transfer;

pub use method::TransferMethod;
pub use transfer::{Transfer, TransferOptions, TransferOutcome};

//! # smslog-core: Foundational Types for smslog
//!
//! Defines the data model shared by every other crate in the workspace:
//! which monthly log a message belongs to, what one log entry looks like,
//! and how a whole log is laid out on the wire.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `PeriodKey` and `VersionToken` are constructed
//!    through checked constructors. A period key can never contain a path
//!    separator, so it can never escape the log directory.
//!
//! 2. **One codec.** All reads and writes of log content flow through
//!    [`decode_records`] and [`encode_records`]. Content that does not match
//!    the expected shape is an error, never an empty log.
//!
//! 3. **Existing history is opaque.** Records read back from storage keep
//!    their original timestamp text; only new records are formatted here.
//!
//! ## Crate Policy
//!
//! - No I/O and no dependencies on other `smslog-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod codec;
pub mod error;
pub mod period;
pub mod record;

pub use codec::{decode_records, encode_records};
pub use error::{CodecError, CoreError};
pub use period::{KeyStyle, LogKeyResolver, MonthlyKeyResolver, PeriodKey};
pub use record::{format_timestamp, LogBlob, LogRecord, VersionToken};

//! Partial-update pipeline: payload decoding, patch resolution and SQL
//! statement construction.
//!
//! Layout:
//! - `field.rs`: tri-state field values and the bound SQL value type
//! - `decode.rs`: JSON document -> sparse field set
//! - `resolve.rs`: sparse field set + identity -> change-set or no-op
//! - `statement.rs`: change-set + identity -> parameterized SQL

pub mod decode;
pub mod field;
pub mod resolve;
pub mod statement;

pub use decode::{DecodeError, decode_fields, decode_slice};
pub use field::{Field, SparseFields, SqlValue};
pub use resolve::{ChangeSet, Identity, InvalidPatchError, ResolvedPatch, resolve_create, resolve_patch};
pub use statement::{BuildError, Statement};

//! Algebraic data types for Verity.
//!
//! Rust already ships most of the classic ADTs, so this crate only adds
//! what the standard library is missing:
//!
//! | Concept       | Rust type                 |
//! |---------------|---------------------------|
//! | Maybe         | [`Option<T>`]             |
//! | Either        | [`Result<T, E>`]          |
//! | Tuple         | native tuples             |
//! | NonEmptyList  | [`NonEmptyList<T>`]       |
//!
//! # How it fits in the stack
//!
//! ```text
//! Codec layer (above)  ← decodes JSON arrays into NonEmptyList
//!     ↕
//! ADT layer (this crate)  ← owns the non-empty invariant
//! ```
//!
//! # Feature Flags
//!
//! - `serde` (default): `Serialize`/`Deserialize` for [`NonEmptyList`]

mod error;
mod non_empty;

pub use error::AdtError;
pub use non_empty::NonEmptyList;

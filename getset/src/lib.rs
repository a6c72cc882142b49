//! GetSet
//!
//! Schema-driven, observable property containers:
//! - Entries with type and value constraints, defaults and read-only slots
//! - Nested containers whose changes bubble up as dotted paths
//! - Change and rejection hooks that run after the write has settled
//! - A plain ordered projection, serializable with serde
//!
//! ```
//! use getset::{FieldDef, GetSet, Schema, Value};
//!
//! let post = GetSet::new(
//!     Schema::new().field("id", FieldDef::new().with_type("Number").with_default(0)),
//! )
//! .unwrap();
//!
//! post.set("id", 5).unwrap();
//! assert_eq!(post.get("id").unwrap(), Value::Int(5));
//! assert!(post.set("id", "five").is_err());
//! ```

mod constraint;
mod entry;
mod error;
mod getset;
mod interceptor;
mod observer;
mod options;
mod schema;
mod serialize;
mod value;

pub use crate::getset::{GetSet, GetSetBuilder};
pub use constraint::*;
pub use entry::*;
pub use error::*;
pub use interceptor::*;
pub use observer::*;
pub use options::*;
pub use schema::*;
pub use value::*;

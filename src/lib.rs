//! Stacked handler annotations with inheritance-aware merging.
//!
//! Application code declares metadata against named artifacts during a
//! registration phase: documentation fragments, expected request arguments,
//! response-marshalling schemas. At request time one effective
//! [`Annotation`] per (artifact, kind) pair is resolved: the artifact's own
//! declarations first, then its parent's, lazy [`Ref`] payloads resolved
//! against the parent state, and the whole list folded through a child-wins
//! merge. A selection pass then picks the first option set whose activation
//! policy matches the live request/response pair.
//!
//! # Example
//!
//! ```
//! use annomerge::{
//!     resolve_annotations, ApplyPolicy, ArtifactId, Declaration, Kind, RegistryBuilder,
//!     Request, Response, Value,
//! };
//! use serde_json::json;
//!
//! let list_bands = ArtifactId::new("bands.list");
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .docs(&list_bands, Declaration::new(json!({"tags": ["bands"]})))
//!     .response(
//!         &list_bands,
//!         Declaration::new(json!({"schema": "BandSummary"})).code(201),
//!     )
//!     .response(
//!         &list_bands,
//!         Declaration::new(json!({"schema": "Band"})).apply(ApplyPolicy::Always),
//!     );
//! let registry = builder.build();
//!
//! let annotation = resolve_annotations(&registry, &list_bands, Kind::Response, None);
//!
//! let created = annotation
//!     .select(&Request::new(), &Response::new(201))
//!     .unwrap();
//! assert_eq!(created.get("schema"), Some(&Value::from(json!("BandSummary"))));
//!
//! let ok = annotation
//!     .select(&Request::new(), &Response::new(200))
//!     .unwrap();
//! assert_eq!(ok.get("schema"), Some(&Value::from(json!("Band"))));
//! ```
//!
//! # Merge Rules
//!
//! Child is the annotation earlier in the list, parent the later one.
//!
//! | Field | Result |
//! |-------|--------|
//! | `options` | child's followed by parent's; earlier sets win ties |
//! | `inherit` | parent's, except `Some(false)` on the child returns the child unchanged |
//! | `apply` | child's when present, otherwise parent's |
//!
//! Option payloads deep-merge key-by-key through nested maps with the child
//! side winning at every path; sequences and scalars replace wholesale.
//!
//! # Activation
//!
//! Every option set has a tri-state apply slot: its own policy, an explicit
//! never, or absent. Absent slots fall back to the annotation-level default,
//! and an absent default means always-true. [`Annotation::select`] walks the
//! option sets in order and returns the first whose policy matches.

mod activation;
mod annotation;
mod error;
mod merge;
mod registry;
mod resolver;
mod value;

pub use activation::{match_status_code, ApplyPolicy, Predicate, Request, Response};
pub use annotation::{Annotation, OptionSet};
pub use error::ValueError;
pub use merge::merge_recursive;
pub use registry::{ArtifactId, Declaration, Kind, Registry, RegistryBuilder};
pub use resolver::{resolve_annotations, Parent};
pub use value::{resolve_refs, FieldSource, Map, Ref, Value};

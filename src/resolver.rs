//! Per-request resolution of one effective annotation.

use std::fmt;

use tracing::trace;

use crate::annotation::Annotation;
use crate::registry::{ArtifactId, Kind, Registry};
use crate::value::FieldSource;

/// Inheritance context for resolution.
///
/// One object serves both roles: its id names the parent artifact whose
/// declarations are inherited, and its state resolves [`Ref`] payloads.
/// A parent without interesting state can pass `&()`.
///
/// [`Ref`]: crate::Ref
#[derive(Clone, Copy)]
pub struct Parent<'a> {
    id: &'a ArtifactId,
    state: &'a dyn FieldSource,
}

impl<'a> Parent<'a> {
    pub fn new(id: &'a ArtifactId, state: &'a dyn FieldSource) -> Self {
        Self { id, state }
    }
}

impl fmt::Debug for Parent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parent")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Resolve the effective annotation for an artifact and kind.
///
/// Concatenates the artifact's own declarations with the parent's, resolves
/// references in each against the parent state, and folds the list through
/// [`Annotation::merge`] starting from the empty annotation. An annotation
/// declaring `inherit` false cuts off everything after it in the list. With
/// no declarations anywhere the result is the empty annotation, never an
/// error.
///
/// Deeper inheritance hierarchies are flattened by the caller at
/// registration time: declare an ancestor's annotations after the
/// artifact's own, in precedence order.
pub fn resolve_annotations(
    registry: &Registry,
    artifact: &ArtifactId,
    kind: Kind,
    parent: Option<Parent<'_>>,
) -> Annotation {
    let own = registry.annotations(artifact, kind);
    let inherited = parent
        .map(|parent| registry.annotations(parent.id, kind))
        .unwrap_or(&[]);
    let state = parent.map(|parent| parent.state);

    trace!(
        artifact = %artifact,
        kind = kind.as_str(),
        own = own.len(),
        inherited = inherited.len(),
        "resolving annotations"
    );

    own.iter()
        .chain(inherited)
        .map(|annotation| annotation.resolve(state))
        .fold(Annotation::default(), |acc, next| acc.merge(&next))
}

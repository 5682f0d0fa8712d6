//! Declaration entry points and the immutable annotation table.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::activation::{match_status_code, ApplyPolicy};
use crate::annotation::{Annotation, OptionSet};
use crate::value::Value;

/// Names a declared artifact: a handler function or a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of annotation, one per declaration entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Documentation fragments merged into generated API metadata.
    Docs,
    /// Expected request-argument schemas.
    Args,
    /// Response-marshalling schemas.
    Response,
}

impl Kind {
    /// All kinds, for consumers sweeping a whole artifact.
    pub const ALL: [Kind; 3] = [Kind::Docs, Kind::Args, Kind::Response];

    /// Stable string form, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Docs => "docs",
            Kind::Args => "args",
            Kind::Response => "response",
        }
    }
}

/// One declaration: option payloads plus inheritance and activation
/// modifiers, recorded against an artifact under a kind.
#[derive(Debug, Clone)]
pub struct Declaration {
    options: Vec<OptionSet>,
    inherit: Option<bool>,
    apply: Option<ApplyPolicy>,
    code: Option<u16>,
}

impl Declaration {
    /// Declaration with a single option payload and an absent slot.
    pub fn new(fields: impl Into<Value>) -> Self {
        Self {
            options: vec![OptionSet::new(fields)],
            inherit: None,
            apply: None,
            code: None,
        }
    }

    /// Declaration from pre-built option sets, kept in the given order.
    pub fn from_options(options: Vec<OptionSet>) -> Self {
        Self {
            options,
            inherit: None,
            apply: None,
            code: None,
        }
    }

    /// Append a sibling option set.
    pub fn option(mut self, option: OptionSet) -> Self {
        self.options.push(option);
        self
    }

    /// Opt in or out of parent annotations; `false` cuts inheritance off.
    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = Some(inherit);
        self
    }

    /// Default activation policy for this declaration's option sets.
    /// Wins over [`code`](Self::code) when both are given.
    pub fn apply(mut self, apply: impl Into<ApplyPolicy>) -> Self {
        self.apply = Some(apply.into());
        self
    }

    /// Status-code shorthand: stored as a policy matching `code` exactly.
    pub fn code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    fn into_annotation(self) -> Annotation {
        let apply = self
            .apply
            .or_else(|| self.code.map(|code| match_status_code(code).into()));
        Annotation::new(self.options, self.inherit, apply)
    }
}

/// Collects declarations during the registration phase.
///
/// Declarations for one (artifact, kind) pair are consulted in call order:
/// the first declaration wins ties, the way the outermost of stacked
/// decorators outranks the ones beneath it. Write declarations top-down.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<ArtifactId, HashMap<Kind, Vec<Annotation>>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration for an artifact under a kind.
    pub fn declare(
        &mut self,
        artifact: &ArtifactId,
        kind: Kind,
        declaration: Declaration,
    ) -> &mut Self {
        self.entries
            .entry(artifact.clone())
            .or_default()
            .entry(kind)
            .or_default()
            .push(declaration.into_annotation());
        self
    }

    /// Declare a documentation fragment.
    pub fn docs(&mut self, artifact: &ArtifactId, declaration: Declaration) -> &mut Self {
        self.declare(artifact, Kind::Docs, declaration)
    }

    /// Declare an expected request-argument schema.
    pub fn args(&mut self, artifact: &ArtifactId, declaration: Declaration) -> &mut Self {
        self.declare(artifact, Kind::Args, declaration)
    }

    /// Declare a response-marshalling schema.
    pub fn response(&mut self, artifact: &ArtifactId, declaration: Declaration) -> &mut Self {
        self.declare(artifact, Kind::Response, declaration)
    }

    /// Seal the table.
    pub fn build(self) -> Registry {
        debug!(artifacts = self.entries.len(), "annotation registry built");
        Registry {
            entries: self.entries,
        }
    }
}

/// Immutable annotation table keyed by (artifact, kind).
///
/// Built once during registration and only read afterwards, so it can be
/// shared freely across request threads.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<ArtifactId, HashMap<Kind, Vec<Annotation>>>,
}

impl Registry {
    /// Declared annotations for an artifact and kind, in precedence order.
    /// Unknown pairs yield an empty slice, never an error.
    pub fn annotations(&self, artifact: &ArtifactId, kind: Kind) -> &[Annotation] {
        self.entries
            .get(artifact)
            .and_then(|kinds| kinds.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate every (artifact, kind) entry, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactId, Kind, &[Annotation])> {
        self.entries.iter().flat_map(|(artifact, kinds)| {
            kinds
                .iter()
                .map(move |(kind, annotations)| (artifact, *kind, annotations.as_slice()))
        })
    }

    /// Number of artifacts with at least one declaration.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

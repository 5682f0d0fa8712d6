//! Annotations: ordered option sets with inheritance and activation
//! modifiers, and the merge algebra that folds them.

use crate::activation::{ApplyPolicy, Request, Response};
use crate::merge::merge_maps;
use crate::value::{resolve_refs, FieldSource, Map, Value};

/// One configuration payload plus its activation slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionSet {
    /// Named option values, insertion-ordered.
    pub fields: Map,
    /// Activation slot: own policy, explicit [`ApplyPolicy::Never`], or
    /// absent. Absent falls back to the annotation default at selection
    /// time, and to always-true when that is absent too.
    pub apply: Option<ApplyPolicy>,
}

impl OptionSet {
    /// Option set with an absent activation slot. Accepts anything
    /// convertible to a [`Value`]; non-map payloads yield empty fields.
    pub fn new(fields: impl Into<Value>) -> Self {
        Self {
            fields: fields.into().into_map(),
            apply: None,
        }
    }

    /// Option set carrying its own activation policy.
    pub fn with_apply(fields: impl Into<Value>, apply: impl Into<ApplyPolicy>) -> Self {
        Self {
            fields: fields.into().into_map(),
            apply: Some(apply.into()),
        }
    }

    /// Field value by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn resolve(&self, source: Option<&dyn FieldSource>) -> OptionSet {
        OptionSet {
            fields: self
                .fields
                .iter()
                .map(|(key, value)| (key.clone(), resolve_refs(source, value)))
                .collect(),
            apply: self.apply.clone(),
        }
    }
}

/// Declared or effective metadata for one (artifact, kind) pair.
///
/// Equality is structural over all three fields; predicates inside
/// [`ApplyPolicy::When`] compare by identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotation {
    /// Option sets in precedence order; earlier sets win.
    pub options: Vec<OptionSet>,
    /// Tri-state inheritance. `Some(false)` opts out of parent annotations;
    /// `None` and `Some(true)` both inherit.
    pub inherit: Option<bool>,
    /// Default activation policy for option sets without their own slot.
    pub apply: Option<ApplyPolicy>,
}

impl Annotation {
    /// Build an annotation, backfilling `apply` into every option set whose
    /// slot is absent. A [`ApplyPolicy::Never`] default is kept at the
    /// annotation level but never written into slots. Slots already set are
    /// never overwritten by the default.
    pub fn new(options: Vec<OptionSet>, inherit: Option<bool>, apply: Option<ApplyPolicy>) -> Self {
        let mut options = options;
        if let Some(policy) = &apply {
            if !matches!(policy, ApplyPolicy::Never) {
                for option in &mut options {
                    if option.apply.is_none() {
                        option.apply = Some(policy.clone());
                    }
                }
            }
        }
        Self {
            options,
            inherit,
            apply,
        }
    }

    /// Overwrite every option set's activation slot, previously set slots
    /// included.
    ///
    /// # Panics
    ///
    /// Panics on [`ApplyPolicy::Never`]: clearing an activation is not
    /// supported.
    pub fn set_apply(&mut self, apply: ApplyPolicy) {
        assert!(
            !matches!(apply, ApplyPolicy::Never),
            "clearing apply is not supported"
        );
        for option in &mut self.options {
            option.apply = Some(apply.clone());
        }
    }

    /// Resolve every reference in the option payloads against `source`.
    /// Inheritance and activation modifiers carry over unchanged.
    pub fn resolve(&self, source: Option<&dyn FieldSource>) -> Annotation {
        Annotation::new(
            self.options
                .iter()
                .map(|option| option.resolve(source))
                .collect(),
            self.inherit,
            self.apply.clone(),
        )
    }

    /// Merge with a parent annotation, self being the child.
    ///
    /// Child option sets come first and win ties; `inherit` is taken from
    /// the parent and `apply` from the child when it has one. A child whose
    /// `inherit` is `Some(false)` is returned unchanged and the parent is
    /// ignored entirely. The result goes through [`Annotation::new`], so the
    /// merged default fills option slots still absent at this point.
    pub fn merge(&self, parent: &Annotation) -> Annotation {
        if self.inherit == Some(false) {
            return self.clone();
        }
        let mut options = self.options.clone();
        options.extend(parent.options.iter().cloned());
        Annotation::new(
            options,
            parent.inherit,
            self.apply.clone().or_else(|| parent.apply.clone()),
        )
    }

    /// First option set whose activation policy matches the live pair.
    ///
    /// An absent slot falls back to the annotation default; an absent
    /// default counts as always-true. Returns `None` when nothing matches.
    pub fn select(&self, req: &Request, res: &Response) -> Option<&OptionSet> {
        self.options.iter().find(|option| {
            option
                .apply
                .as_ref()
                .or(self.apply.as_ref())
                .map_or(true, |policy| policy.evaluate(req, res))
        })
    }

    /// Deep-merge all option payloads into one map, earlier sets winning.
    pub fn merged_fields(&self) -> Map {
        self.options
            .iter()
            .fold(Map::new(), |acc, option| merge_maps(&acc, &option.fields))
    }

    /// True when nothing was declared or inherited.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

//! Constructor catalogue and overload resolution
//!
//! A catalogue groups an implementation class's constructors by arity. It is
//! built once per installed class and never mutated afterwards.

use std::collections::BTreeMap;

use hermes_engine::{describe_args, match_assignable_types, runtime_types, Constructor, ImplementClass};
use hermes_sdk::Value;

use crate::error::MatchError;

/// Arity-indexed constructors of one implementation class
pub struct ConstructorCatalogue<T: ?Sized> {
    class: &'static str,
    groups: BTreeMap<usize, Vec<Constructor<T>>>,
}

impl<T: ?Sized + 'static> ConstructorCatalogue<T> {
    /// Group the constructors of `class` by arity
    ///
    /// Declaration order is preserved inside each group.
    pub fn collect(class: &ImplementClass<T>) -> Self {
        let mut groups: BTreeMap<usize, Vec<Constructor<T>>> = BTreeMap::new();
        for constructor in class.constructors() {
            groups
                .entry(constructor.arity())
                .or_default()
                .push(constructor.clone());
        }

        Self {
            class: class.name(),
            groups,
        }
    }

    pub fn class_name(&self) -> &'static str {
        self.class
    }

    /// Arities with at least one constructor, ascending
    pub fn arities(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.keys().copied()
    }

    /// Constructors taking exactly `arity` arguments
    pub fn group(&self, arity: usize) -> &[Constructor<T>] {
        self.groups.get(&arity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of constructors
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Pick the constructor for `args`
    ///
    /// With no arguments the first zero-arity constructor is returned without
    /// any type checks. Otherwise the first constructor in declaration order
    /// whose parameters all accept the argument types wins.
    pub fn match_constructor(&self, args: &[Value]) -> Result<&Constructor<T>, MatchError> {
        let group = self
            .groups
            .get(&args.len())
            .filter(|group| !group.is_empty())
            .ok_or(MatchError::ArityMismatch {
                class: self.class,
                arity: args.len(),
            })?;

        if args.is_empty() {
            return Ok(&group[0]);
        }

        let types = runtime_types(args);
        group
            .iter()
            .find(|constructor| match_assignable_types(constructor.params(), &types))
            .ok_or_else(|| MatchError::NoAssignableConstructor {
                class: self.class,
                signature: describe_args(args),
            })
    }
}

impl<T: ?Sized + 'static> std::fmt::Debug for ConstructorCatalogue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorCatalogue")
            .field("class", &self.class)
            .field("groups", &self.groups)
            .finish()
    }
}

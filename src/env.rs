use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
};

use crate::fraction::Fraction;

pub(crate) type FxBuildHasher = fxhash::FxBuildHasher;

#[cfg(feature = "deterministic")]
mod map {
    pub type Env = indexmap::IndexMap<String, crate::Fraction, super::FxBuildHasher>;
}
#[cfg(not(feature = "deterministic"))]
mod map {
    pub type Env = std::collections::HashMap<String, crate::Fraction, super::FxBuildHasher>;
}

/// Default variable environment, name -> value.
///
/// Iterates in insertion order when the `deterministic` feature is enabled.
pub use map::Env;

/// Anything [crate::Expr::eval] can resolve variable names against.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<Fraction>;
}

impl<K, S> Bindings for HashMap<K, Fraction, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<Fraction> {
        self.get(name).copied()
    }
}

impl<K, S> Bindings for indexmap::IndexMap<K, Fraction, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<Fraction> {
        self.get(name).copied()
    }
}

impl<K> Bindings for BTreeMap<K, Fraction>
where
    K: Borrow<str> + Ord,
{
    fn lookup(&self, name: &str) -> Option<Fraction> {
        self.get(name).copied()
    }
}

impl<B: Bindings + ?Sized> Bindings for &B {
    fn lookup(&self, name: &str) -> Option<Fraction> {
        (**self).lookup(name)
    }
}

/// The empty environment.
impl Bindings for () {
    fn lookup(&self, _: &str) -> Option<Fraction> {
        None
    }
}

/// build an [Env] from name/value pairs
pub fn env<I, K, V>(pairs: I) -> Env
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Fraction>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

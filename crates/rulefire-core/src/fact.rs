//! Opaque fact values
//!
//! A `Fact` wraps any `'static + Debug + Send + Sync` value behind an `Arc`.
//! Working memory, globals and emitted results all carry facts; the only
//! identity a fact has is its exact runtime type, exposed as a `FactType`.

use crate::error::{CoreError, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Any value that can be held in working memory
pub trait FactValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + Send + Sync> FactValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Shared handle to a value inserted into, or emitted from, a session
#[derive(Clone)]
pub struct Fact {
    inner: Arc<dyn FactValue>,
}

impl Fact {
    /// Wrap a value.
    ///
    /// Passing a `Fact` here nests it; clone the fact instead.
    pub fn new<T: FactValue>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    fn value(&self) -> &dyn Any {
        FactValue::as_any(&*self.inner)
    }

    /// Exact runtime type of the wrapped value
    pub fn fact_type(&self) -> FactType {
        FactType {
            id: self.value().type_id(),
            name: FactValue::type_name(&*self.inner),
        }
    }

    pub fn type_name(&self) -> &'static str {
        FactValue::type_name(&*self.inner)
    }

    /// True when the wrapped value is exactly a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.value().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value().downcast_ref::<T>()
    }

    /// Like `downcast_ref`, but reports both type names on mismatch
    pub fn downcast<T: Any>(&self) -> Result<&T> {
        self.downcast_ref::<T>().ok_or_else(|| CoreError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: self.type_name(),
        })
    }

    /// True when both handles point at the same inserted value
    pub fn ptr_eq(&self, other: &Fact) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

/// Exact runtime type of a fact
#[derive(Debug, Clone, Copy)]
pub struct FactType {
    id: TypeId,
    name: &'static str,
}

impl FactType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Exact match only; a wrapper or newtype around `T` is a different type
    pub fn matches(&self, fact: &Fact) -> bool {
        fact.fact_type().id == self.id
    }
}

impl PartialEq for FactType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FactType {}

impl Hash for FactType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for FactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Non-empty set of fact types used to filter emitted facts.
///
/// "No filter" is expressed as `Option::<FactTypes>::None`, so an empty
/// filter cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactTypes {
    types: Vec<FactType>,
}

impl FactTypes {
    pub fn of<T: Any>() -> Self {
        Self {
            types: vec![FactType::of::<T>()],
        }
    }

    /// Add another type; adding a type twice is a no-op
    pub fn and<T: Any>(mut self) -> Self {
        let fact_type = FactType::of::<T>();
        if !self.types.contains(&fact_type) {
            self.types.push(fact_type);
        }
        self
    }

    /// Build from an arbitrary list; `None` when the list is empty
    pub fn from_types(types: impl IntoIterator<Item = FactType>) -> Option<Self> {
        let mut unique: Vec<FactType> = Vec::new();
        for fact_type in types {
            if !unique.contains(&fact_type) {
                unique.push(fact_type);
            }
        }
        if unique.is_empty() {
            None
        } else {
            Some(Self { types: unique })
        }
    }

    pub fn contains(&self, fact_type: &FactType) -> bool {
        self.types.contains(fact_type)
    }

    pub fn matches(&self, fact: &Fact) -> bool {
        self.contains(&fact.fact_type())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FactType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Display for FactTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.types.iter().map(|t| t.name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

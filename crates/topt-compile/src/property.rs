//! `PropertySet` for pass communication.
//!
//! Passes share the active [`TransformConfig`] and store typed analysis
//! results for later passes and callers:
//!
//! ```
//! use topt_compile::PropertySet;
//!
//! #[derive(Debug, PartialEq)]
//! struct BlockCount(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(BlockCount(3));
//! assert_eq!(props.get::<BlockCount>(), Some(&BlockCount(3)));
//! assert_eq!(props.config.pmh_section_size, 2);
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use crate::config::TransformConfig;

/// Properties shared between compilation passes.
///
/// Each custom type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Settings read by the passes.
    pub config: TransformConfig,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a property set with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}

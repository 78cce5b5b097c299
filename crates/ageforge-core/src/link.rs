//! Symbolic resolution of forward references.
//!
//! Runs once every Raw API Object is registered. Each object's
//! fully-qualified name is its concrete namespace path plus its name, or
//! its parent's fully-qualified name plus its name when nested. Parents are
//! found through forward references, so a missing parent or a location
//! chain that loops back on itself makes the object unresolvable.

use crate::container::ObjectContainer;
use crate::forward_ref::{ForwardRef, Location};
use crate::id::ApiObjectKey;
use std::collections::{HashMap, HashSet};

/// Why a Raw API Object or one of its references cannot be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    #[error("dangling forward reference {reference} in '{from}'")]
    Dangling { from: String, reference: ForwardRef },
    #[error("cyclic location chain through {reference}")]
    Cycle { reference: ForwardRef },
    #[error("unknown API object key {0:?}")]
    UnknownKey(ApiObjectKey),
}

/// Fully-qualified names of every registered Raw API Object.
#[derive(Debug, Default)]
pub struct ResolvedNames {
    by_key: HashMap<ApiObjectKey, String>,
    by_ref: HashMap<ForwardRef, String>,
}

impl ResolvedNames {
    pub fn get(&self, key: ApiObjectKey) -> Option<&str> {
        self.by_key.get(&key).map(String::as_str)
    }

    pub fn resolve(&self, r: &ForwardRef) -> Option<&str> {
        self.by_ref.get(r).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Walks the container and resolves locations, caching results.
pub struct LinkResolver<'a> {
    data: &'a ObjectContainer,
    cache: HashMap<ApiObjectKey, String>,
}

impl<'a> LinkResolver<'a> {
    pub fn new(data: &'a ObjectContainer) -> Self {
        Self {
            data,
            cache: HashMap::new(),
        }
    }

    fn self_ref(&self, key: ApiObjectKey) -> Result<ForwardRef, LinkError> {
        let object = self
            .data
            .api_object(key)
            .ok_or(LinkError::UnknownKey(key))?;
        let owner = self
            .data
            .api_object_owner(key)
            .ok_or(LinkError::UnknownKey(key))?;
        Ok(ForwardRef::new(owner, object.reference()))
    }

    /// Fully-qualified name of a registered object.
    pub fn fqon(&mut self, key: ApiObjectKey) -> Result<String, LinkError> {
        let data = self.data;
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = key;

        let mut name = loop {
            if let Some(cached) = self.cache.get(&current) {
                break cached.clone();
            }
            if !seen.insert(current) {
                return Err(LinkError::Cycle {
                    reference: self.self_ref(current)?,
                });
            }
            let object = data
                .api_object(current)
                .ok_or(LinkError::UnknownKey(current))?;
            match object.location() {
                Location::Path(path) => {
                    let resolved = if path.is_empty() {
                        object.name().to_string()
                    } else {
                        format!("{path}.{}", object.name())
                    };
                    self.cache.insert(current, resolved.clone());
                    break resolved;
                }
                Location::Nested(parent) => {
                    let parent_key = data.lookup(parent).ok_or_else(|| LinkError::Dangling {
                        from: object.reference().to_string(),
                        reference: parent.clone(),
                    })?;
                    chain.push(current);
                    current = parent_key;
                }
            }
        };

        while let Some(k) = chain.pop() {
            let object = data.api_object(k).ok_or(LinkError::UnknownKey(k))?;
            name = format!("{name}.{}", object.name());
            self.cache.insert(k, name.clone());
        }
        Ok(name)
    }

    /// Fully-qualified name of the object a forward reference names.
    pub fn resolve(&mut self, r: &ForwardRef) -> Result<String, LinkError> {
        let key = self.data.lookup(r).ok_or_else(|| LinkError::Dangling {
            from: String::new(),
            reference: r.clone(),
        })?;
        self.fqon(key)
    }

    /// Resolve every object and every reference it holds. All failures
    /// are collected; an empty error list means the container is ready to
    /// be emitted.
    pub fn resolve_all(mut self) -> Result<ResolvedNames, Vec<LinkError>> {
        let data = self.data;
        let mut resolved = ResolvedNames::default();
        let mut errors = Vec::new();

        for (key, object) in data.api_objects() {
            match self.fqon(key) {
                Ok(name) => {
                    if let Ok(r) = self.self_ref(key) {
                        resolved.by_ref.insert(r, name.clone());
                    }
                    resolved.by_key.insert(key, name);
                }
                Err(e) => errors.push(e),
            }

            for r in object.forward_refs() {
                let Some(target) = data.lookup(r) else {
                    errors.push(LinkError::Dangling {
                        from: object.reference().to_string(),
                        reference: r.clone(),
                    });
                    continue;
                };
                if let Err(e) = self.fqon(target) {
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(resolved)
        } else {
            let mut unique: Vec<LinkError> = Vec::with_capacity(errors.len());
            for e in errors {
                if !unique.contains(&e) {
                    unique.push(e);
                }
            }
            Err(unique)
        }
    }
}

/// Convenience wrapper: resolve the whole container.
pub fn resolve_all(data: &ObjectContainer) -> Result<ResolvedNames, Vec<LinkError>> {
    LinkResolver::new(data).resolve_all()
}

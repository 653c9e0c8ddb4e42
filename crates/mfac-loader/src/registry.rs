//! # Message Registry
//!
//! Index of every message type extracted from the loaded modules, keyed by
//! the factory's [`NamingPolicy`]:
//!
//! - [`NamingPolicy::MessageName`]: the type's declared name.
//! - [`NamingPolicy::FileName`]: the stem of the schema file the module
//!   was generated from, read from the module's own file descriptor. All
//!   types of one file share a key, so the last one bound wins.
//!
//! Only [`Binding::Message`] values are indexed. Imported modules, enums,
//! constants, and the descriptor binding are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use mfac_core::{MessageType, NamingPolicy};

use crate::module::{Binding, LoadedModule};

/// Key → message type index.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    policy: NamingPolicy,
    index: HashMap<String, Arc<MessageType>>,
}

impl MessageRegistry {
    /// An empty registry keyed under `policy`.
    pub fn new(policy: NamingPolicy) -> Self {
        Self {
            policy,
            index: HashMap::new(),
        }
    }

    /// The naming policy keys are built with.
    pub fn policy(&self) -> NamingPolicy {
        self.policy
    }

    /// Index every message type bound at the top level of `module`,
    /// overwriting existing entries under the same key.
    ///
    /// Returns the number of types indexed.
    pub fn extract(&mut self, module: &LoadedModule) -> usize {
        let mut count = 0;
        for (_, binding) in module.bindings() {
            let Binding::Message(message_type) = binding else {
                continue;
            };
            let key = match self.policy {
                NamingPolicy::MessageName => message_type.name.clone(),
                NamingPolicy::FileName => module.descriptor().stem().to_string(),
            };
            if let Some(previous) = self.index.insert(key.clone(), Arc::clone(message_type)) {
                if previous.file != message_type.file || previous.name != message_type.name {
                    tracing::debug!(
                        key = %key,
                        replaced = %previous.to_ref(),
                        by = %message_type.to_ref(),
                        "registry key overwritten"
                    );
                }
            }
            count += 1;
        }
        count
    }

    /// Replace the whole index with the types extracted from `modules`,
    /// in order.
    pub fn rebuild(&mut self, modules: &[Arc<LoadedModule>]) {
        self.index.clear();
        for module in modules {
            self.extract(module);
        }
    }

    /// The message type registered under `key`.
    pub fn get(&self, key: &str) -> Option<&Arc<MessageType>> {
        self.index.get(key)
    }

    /// Whether `key` is registered.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.index.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate over `(key, type)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<MessageType>)> {
        self.index.iter().map(|(key, ty)| (key.as_str(), ty))
    }
}

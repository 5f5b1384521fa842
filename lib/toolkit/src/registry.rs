//! Definition registries.
//!
//! A [`DefinitionRegistry`] is an ordered, id-keyed catalog. It is filled
//! during startup through `&mut self` and then shared read-only behind an
//! `Arc`, so the borrow checker enforces the single-writer phase.
//!
//! [`HotReloadRegistry`] is the opt-in alternative for processes that
//! need to add or replace definitions while serving. Writers are
//! serialized and publish a fresh snapshot; readers keep whatever snapshot
//! they took.

use crate::action::ActionDefinition;
use crate::definition::Definition;
use crate::error::RegistryError;
use crate::trigger::TriggerDefinition;
use flowkit_core::DefinitionId;
use indexmap::IndexMap;
use indexmap::map::Entry;
use parking_lot::{Mutex, RwLock};
use rootcause::prelude::Report;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// What `register_with` does when the id is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationMode {
    /// Fail with [`RegistryError::Duplicate`] and keep the existing entry.
    #[default]
    Reject,
    /// Overwrite the existing entry in place, keeping its position.
    Replace,
}

/// An ordered catalog of definitions.
pub struct DefinitionRegistry<D> {
    entries: IndexMap<DefinitionId, Arc<D>>,
}

/// Registry of trigger definitions.
pub type TriggerRegistry = DefinitionRegistry<TriggerDefinition>;

/// Registry of action definitions.
pub type ActionRegistry = DefinitionRegistry<ActionDefinition>;

impl<D: Definition> DefinitionRegistry<D> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Registers a definition, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the id is already registered;
    /// the registry is left unchanged.
    pub fn register(&mut self, definition: D) -> Result<Arc<D>, Report<RegistryError>> {
        self.register_with(definition, RegistrationMode::Reject)
    }

    /// Registers a definition with an explicit duplicate policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] in [`RegistrationMode::Reject`]
    /// if the id is already registered.
    pub fn register_with(
        &mut self,
        definition: D,
        mode: RegistrationMode,
    ) -> Result<Arc<D>, Report<RegistryError>> {
        let id = definition.id().clone();
        let kind = definition.kind();
        let definition = Arc::new(definition);

        match self.entries.entry(id) {
            Entry::Vacant(entry) => {
                debug!(definition_id = %entry.key(), %kind, "definition registered");
                entry.insert(Arc::clone(&definition));
            }
            Entry::Occupied(mut entry) => match mode {
                RegistrationMode::Reject => {
                    warn!(definition_id = %entry.key(), %kind, "duplicate definition rejected");
                    return Err(RegistryError::Duplicate {
                        id: entry.key().clone(),
                    }
                    .into());
                }
                RegistrationMode::Replace => {
                    debug!(definition_id = %entry.key(), %kind, "definition replaced");
                    entry.insert(Arc::clone(&definition));
                }
            },
        }

        Ok(definition)
    }

    /// Registers several definitions in order, stopping at the first
    /// duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] for the first id already taken;
    /// definitions before it stay registered.
    pub fn register_all<I>(&mut self, definitions: I) -> Result<(), Report<RegistryError>>
    where
        I: IntoIterator<Item = D>,
    {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Looks up a definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no definition has this id.
    pub fn get(&self, id: &str) -> Result<Arc<D>, Report<RegistryError>> {
        self.entries.get(id).cloned().ok_or_else(|| {
            RegistryError::NotFound {
                id: DefinitionId::from(id),
            }
            .into()
        })
    }

    /// Returns true if a definition has this id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Iterates over all definitions in registration order.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &Arc<D>> + '_ {
        self.entries.values()
    }

    /// Returns the number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<D: Definition> Default for DefinitionRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for DefinitionRegistry<D> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<D> fmt::Debug for DefinitionRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionRegistry")
            .field("ids", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A registry that accepts writes while readers are active.
///
/// Readers call [`HotReloadRegistry::snapshot`] and work on an immutable
/// `Arc` of the registry; writes never block or alter a snapshot already
/// taken.
pub struct HotReloadRegistry<D> {
    current: RwLock<Arc<DefinitionRegistry<D>>>,
    writer: Mutex<()>,
}

impl<D: Definition> HotReloadRegistry<D> {
    /// Wraps a registry populated during startup.
    #[must_use]
    pub fn new(initial: DefinitionRegistry<D>) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            writer: Mutex::new(()),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DefinitionRegistry<D>> {
        Arc::clone(&self.current.read())
    }

    /// Registers a definition and publishes a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] in [`RegistrationMode::Reject`]
    /// if the id is already registered; no snapshot is published.
    pub fn register_with(
        &self,
        definition: D,
        mode: RegistrationMode,
    ) -> Result<Arc<D>, Report<RegistryError>> {
        let _guard = self.writer.lock();
        let mut next = (*self.snapshot()).clone();
        let registered = next.register_with(definition, mode)?;
        *self.current.write() = Arc::new(next);
        Ok(registered)
    }

    /// Looks up a definition in the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no definition has this id.
    pub fn get(&self, id: &str) -> Result<Arc<D>, Report<RegistryError>> {
        self.snapshot().get(id)
    }
}

impl<D> fmt::Debug for HotReloadRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotReloadRegistry")
            .field("current", &*self.current.read())
            .finish()
    }
}

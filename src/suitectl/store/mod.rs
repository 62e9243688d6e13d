//! # Storage Layer
//!
//! This module defines the record storage abstraction the controllers work
//! against. The [`RecordStore`] trait is the only thing a controller knows about
//! where settings, imports and variables live.
//!
//! ## Design Rationale
//!
//! The parsed test data is owned by whatever parser/serializer the embedding
//! application uses. Controllers never hold records; they hold ids and ask the
//! store for the current record on every call. This keeps:
//! - **Back-references** (tag → controller, setting → owner, file → parent)
//!   as plain ids, without ownership cycles
//! - **Testing** simple with `InMemoryStore`
//! - **Caching** explicit: the only cached state is the import resolution cache
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: hash-map arena, used by tests and by
//!   applications that keep the whole suite tree in memory.
//!
//! ## Record Pattern
//!
//! Reads return owned copies. A controller edits the copy and writes it back
//! with the matching `save_*` call:
//!
//! ```text
//! let mut setting = store.get_setting(&id)?;
//! setting.value = new_value;
//! store.save_setting(&setting)?;
//! ```

use crate::error::Result;
use crate::model::{
    Entity, EntityId, Import, ImportId, Setting, SettingId, Variable, VariableId,
};

pub mod memory;

/// Abstract interface for test data record storage.
pub trait RecordStore {
    /// Get an entity (data file, test or keyword) by ID
    fn get_entity(&self, id: &EntityId) -> Result<Entity>;

    /// Save an entity (create or update)
    fn save_entity(&mut self, entity: &Entity) -> Result<()>;

    /// List every entity in the store
    fn list_entities(&self) -> Result<Vec<Entity>>;

    fn get_setting(&self, id: &SettingId) -> Result<Setting>;

    fn save_setting(&mut self, setting: &Setting) -> Result<()>;

    fn get_import(&self, id: &ImportId) -> Result<Import>;

    fn save_import(&mut self, import: &Import) -> Result<()>;

    /// Delete an import record permanently
    fn delete_import(&mut self, id: &ImportId) -> Result<()>;

    fn list_imports(&self) -> Result<Vec<Import>>;

    fn get_variable(&self, id: &VariableId) -> Result<Variable>;

    fn save_variable(&mut self, variable: &Variable) -> Result<()>;

    /// Delete a variable record permanently
    fn delete_variable(&mut self, id: &VariableId) -> Result<()>;

    // --- Resource resolution cache ---

    /// `None` when the import has not been resolved since the last
    /// invalidation; `Some(None)` when it was resolved and nothing matched.
    fn cached_resolution(&self, id: &ImportId) -> Option<Option<EntityId>>;

    fn cache_resolution(&mut self, id: &ImportId, target: Option<EntityId>);

    fn clear_resolution(&mut self, id: &ImportId);
}

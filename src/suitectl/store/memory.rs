use super::RecordStore;
use crate::error::{Result, SuiteError};
use crate::model::{
    Entity, EntityId, Import, ImportId, Setting, SettingId, Variable, VariableId,
};
use std::collections::HashMap;

/// In-memory record arena.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    entities: HashMap<EntityId, Entity>,
    settings: HashMap<SettingId, Setting>,
    imports: HashMap<ImportId, Import>,
    variables: HashMap<VariableId, Variable>,
    resolutions: HashMap<ImportId, Option<EntityId>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryStore {
    fn get_entity(&self, id: &EntityId) -> Result<Entity> {
        self.entities
            .get(id)
            .cloned()
            .ok_or(SuiteError::EntityNotFound(*id))
    }

    fn save_entity(&mut self, entity: &Entity) -> Result<()> {
        self.entities.insert(entity.id, entity.clone());
        Ok(())
    }

    fn list_entities(&self) -> Result<Vec<Entity>> {
        Ok(self.entities.values().cloned().collect())
    }

    fn get_setting(&self, id: &SettingId) -> Result<Setting> {
        self.settings
            .get(id)
            .cloned()
            .ok_or(SuiteError::SettingNotFound(*id))
    }

    fn save_setting(&mut self, setting: &Setting) -> Result<()> {
        self.settings.insert(setting.id, setting.clone());
        Ok(())
    }

    fn get_import(&self, id: &ImportId) -> Result<Import> {
        self.imports
            .get(id)
            .cloned()
            .ok_or(SuiteError::ImportNotFound(*id))
    }

    fn save_import(&mut self, import: &Import) -> Result<()> {
        self.imports.insert(import.id, import.clone());
        Ok(())
    }

    fn delete_import(&mut self, id: &ImportId) -> Result<()> {
        if self.imports.remove(id).is_none() {
            return Err(SuiteError::ImportNotFound(*id));
        }
        self.resolutions.remove(id);
        Ok(())
    }

    fn list_imports(&self) -> Result<Vec<Import>> {
        Ok(self.imports.values().cloned().collect())
    }

    fn get_variable(&self, id: &VariableId) -> Result<Variable> {
        self.variables
            .get(id)
            .cloned()
            .ok_or(SuiteError::VariableNotFound(*id))
    }

    fn save_variable(&mut self, variable: &Variable) -> Result<()> {
        self.variables.insert(variable.id, variable.clone());
        Ok(())
    }

    fn delete_variable(&mut self, id: &VariableId) -> Result<()> {
        if self.variables.remove(id).is_none() {
            return Err(SuiteError::VariableNotFound(*id));
        }
        Ok(())
    }

    fn cached_resolution(&self, id: &ImportId) -> Option<Option<EntityId>> {
        self.resolutions.get(id).copied()
    }

    fn cache_resolution(&mut self, id: &ImportId, target: Option<EntityId>) {
        self.resolutions.insert(*id, target);
    }

    fn clear_resolution(&mut self, id: &ImportId) {
        self.resolutions.remove(id);
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{EntityKind, ImportType, SettingKind, SettingValue};

    /// Builds a suite tree in an [`InMemoryStore`], wiring the id lists of
    /// every owner as records are added.
    pub struct SuiteFixture {
        pub store: InMemoryStore,
    }

    impl Default for SuiteFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    impl SuiteFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        fn add_entity(
            &mut self,
            kind: EntityKind,
            name: &str,
            source: Option<&str>,
            parent: Option<EntityId>,
        ) -> EntityId {
            let mut entity = Entity::new(kind, name);
            entity.source = source.map(str::to_string);
            entity.parent = parent;
            self.store.save_entity(&entity).unwrap();
            entity.id
        }

        pub fn directory(
            &mut self,
            name: &str,
            source: &str,
            parent: Option<EntityId>,
        ) -> EntityId {
            self.add_entity(EntityKind::Directory, name, Some(source), parent)
        }

        pub fn suite(&mut self, name: &str, source: &str, parent: Option<EntityId>) -> EntityId {
            self.add_entity(EntityKind::Suite, name, Some(source), parent)
        }

        pub fn resource(&mut self, name: &str, source: &str) -> EntityId {
            self.add_entity(EntityKind::Resource, name, Some(source), None)
        }

        pub fn test(&mut self, datafile: EntityId, name: &str) -> EntityId {
            self.add_entity(EntityKind::TestCase, name, None, Some(datafile))
        }

        pub fn keyword(&mut self, datafile: EntityId, name: &str) -> EntityId {
            self.add_entity(EntityKind::Keyword, name, None, Some(datafile))
        }

        pub fn setting(
            &mut self,
            owner: EntityId,
            kind: SettingKind,
            setting_name: &str,
            value: SettingValue,
        ) -> SettingId {
            let setting = Setting::new(owner, kind, setting_name).with_value(value);
            self.store.save_setting(&setting).unwrap();
            let mut entity = self.store.get_entity(&owner).unwrap();
            entity.settings.push(setting.id);
            self.store.save_entity(&entity).unwrap();
            setting.id
        }

        pub fn unset_setting(
            &mut self,
            owner: EntityId,
            kind: SettingKind,
            setting_name: &str,
        ) -> SettingId {
            self.setting(owner, kind, setting_name, kind.initial_value())
        }

        pub fn force_tags(&mut self, datafile: EntityId, tags: &[&str]) -> SettingId {
            self.setting(
                datafile,
                SettingKind::ForceTags,
                "Force Tags",
                SettingValue::Tags(Some(strings(tags))),
            )
        }

        pub fn default_tags(&mut self, datafile: EntityId, tags: &[&str]) -> SettingId {
            self.setting(
                datafile,
                SettingKind::DefaultTags,
                "Default Tags",
                SettingValue::Tags(Some(strings(tags))),
            )
        }

        /// `None` leaves the `[Tags]` setting unset.
        pub fn tags(&mut self, owner: EntityId, tags: Option<&[&str]>) -> SettingId {
            self.setting(
                owner,
                SettingKind::Tags,
                "[Tags]",
                SettingValue::Tags(tags.map(strings)),
            )
        }

        pub fn import(&mut self, owner: EntityId, import_type: ImportType, name: &str) -> ImportId {
            let import = Import::new(owner, import_type, name);
            self.store.save_import(&import).unwrap();
            let mut entity = self.store.get_entity(&owner).unwrap();
            entity.imports.push(import.id);
            self.store.save_entity(&entity).unwrap();
            import.id
        }

        pub fn variable(&mut self, owner: EntityId, name: &str, value: &[&str]) -> VariableId {
            let variable = Variable::new(owner, name, strings(value));
            self.store.save_variable(&variable).unwrap();
            let mut entity = self.store.get_entity(&owner).unwrap();
            entity.variables.push(variable.id);
            self.store.save_entity(&entity).unwrap();
            variable.id
        }
    }
}

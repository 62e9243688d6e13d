//! # API Facade
//!
//! The API layer is a **thin facade** over the controllers. It is the entry
//! point an editing application uses, whatever its UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Builds controllers** from record ids
//! - **Owns** the store and the [`ControllerConfig`]
//! - **Returns structured types** (`Result<EditResult>`, values, tags)
//!
//! It does no parsing, comparing or dirty marking itself; that belongs in
//! `controller/*.rs`.
//!
//! ## Generic Over RecordStore
//!
//! `SuiteApi<S: RecordStore>` is generic over the storage backend, so tests
//! drive it with `InMemoryStore`.

use crate::config::ControllerConfig;
use crate::controller::{
    owner, DocumentationController, EditResult, ImportController, MetadataController,
    SettingController, Tag, TagsController, VariableController, VariableValue,
};
use crate::error::Result;
use crate::model::{EntityId, ImportId, SettingId, VariableId};
use crate::store::RecordStore;

pub struct SuiteApi<S: RecordStore> {
    store: S,
    config: ControllerConfig,
}

impl<S: RecordStore> SuiteApi<S> {
    pub fn new(store: S, config: ControllerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_dirty(&self, entity: &EntityId) -> Result<bool> {
        owner::is_dirty(&self.store, entity)
    }

    // --- Settings ---

    pub fn setting(&self, id: &SettingId) -> Result<SettingController> {
        SettingController::new(&self.store, id)
    }

    pub fn setting_value(&self, id: &SettingId) -> Result<String> {
        self.setting(id)?.value(&self.store)
    }

    pub fn setting_display_value(&self, id: &SettingId) -> Result<String> {
        self.setting(id)?.display_value(&self.store)
    }

    pub fn set_setting_value(&mut self, id: &SettingId, value: &str) -> Result<EditResult> {
        self.setting(id)?.set_value(&mut self.store, value)
    }

    pub fn set_setting_comment(&mut self, id: &SettingId, comment: &str) -> Result<EditResult> {
        self.setting(id)?.set_comment(&mut self.store, comment)
    }

    /// Copies value and comment of `source` into `target`.
    pub fn copy_setting(&mut self, target: &SettingId, source: &SettingId) -> Result<EditResult> {
        let source = self.setting(source)?;
        self.setting(target)?.set_from(&mut self.store, &source)
    }

    pub fn clear_setting(&mut self, id: &SettingId) -> Result<EditResult> {
        self.setting(id)?.clear(&mut self.store)
    }

    /// Renames the keyword called by every fixture and template that calls
    /// `old_name`.
    pub fn rename_keyword_usages(&mut self, old_name: &str, new_name: &str) -> Result<EditResult> {
        let mut result = EditResult::unchanged();
        for entity in self.store.list_entities()? {
            for id in &entity.settings {
                let setting = self.setting(id)?;
                if setting.contains_keyword(&self.store, old_name)? {
                    result.merge(setting.replace_keyword(&mut self.store, new_name)?);
                }
            }
        }
        Ok(result)
    }

    // --- Documentation ---

    pub fn documentation(&self, id: &SettingId) -> Result<DocumentationController> {
        DocumentationController::new(&self.store, id)
    }

    pub fn editable_documentation(&self, id: &SettingId) -> Result<String> {
        self.documentation(id)?.editable_value(&self.store)
    }

    pub fn set_documentation(&mut self, id: &SettingId, text: &str) -> Result<EditResult> {
        self.documentation(id)?.set_editable_value(&mut self.store, text)
    }

    pub fn rendered_documentation(&self, id: &SettingId) -> Result<String> {
        self.documentation(id)?.visible_value(&self.store)
    }

    // --- Tags ---

    pub fn tags_controller(&self, id: &SettingId) -> Result<TagsController> {
        TagsController::new(&self.store, id)
    }

    pub fn tags(&self, id: &SettingId) -> Result<Vec<Tag>> {
        self.tags_controller(id)?.tags(&self.store)
    }

    pub fn add_tag(&mut self, id: &SettingId, name: &str) -> Result<Tag> {
        self.tags_controller(id)?.add(&mut self.store, name)
    }

    pub fn change_tag(&mut self, id: &SettingId, tag: &Tag, new_name: &str) -> Result<EditResult> {
        self.tags_controller(id)?.change_tag(&mut self.store, tag, new_name)
    }

    pub fn remove_tag(&mut self, id: &SettingId, tag: &Tag) -> Result<EditResult> {
        self.tags_controller(id)?.remove_tag(&mut self.store, tag)
    }

    pub fn tag_tooltip(&self, tag: &Tag) -> Result<String> {
        tag.tooltip(&self.store)
    }

    // --- Metadata ---

    pub fn set_metadata(&mut self, id: &SettingId, name: &str, value: &str) -> Result<EditResult> {
        MetadataController::new(&self.store, id)?.set_value(&mut self.store, name, value)
    }

    // --- Variables ---

    pub fn variable(&self, id: &VariableId) -> Result<VariableController> {
        VariableController::new(&self.store, id)
    }

    pub fn set_variable(
        &mut self,
        id: &VariableId,
        name: &str,
        value: impl Into<VariableValue>,
    ) -> Result<EditResult> {
        self.variable(id)?.set_value(&mut self.store, name, value)
    }

    pub fn validate_variable_name(&self, id: &VariableId, new_name: &str) -> Result<()> {
        self.variable(id)?.validate_name(&self.store, new_name)
    }

    pub fn delete_variable(&mut self, id: &VariableId) -> Result<EditResult> {
        self.variable(id)?.delete(&mut self.store)
    }

    // --- Imports ---

    pub fn import(&self, id: &ImportId) -> Result<ImportController> {
        ImportController::new(&self.store, id)
    }

    pub fn import_display_value(&self, id: &ImportId) -> Result<String> {
        self.import(id)?.display_value(&self.store, &self.config)
    }

    pub fn import_row(&self, id: &ImportId) -> Result<Vec<String>> {
        self.import(id)?.as_list(&self.store, &self.config)
    }

    pub fn set_import(
        &mut self,
        id: &ImportId,
        name: &str,
        args: &str,
        alias: &str,
    ) -> Result<EditResult> {
        self.import(id)?.set_value(&mut self.store, name, args, alias)
    }

    pub fn remove_import(&mut self, id: &ImportId) -> Result<EditResult> {
        self.import(id)?.remove(&mut self.store)
    }

    pub fn resolve_import(&mut self, id: &ImportId) -> Result<Option<EntityId>> {
        self.import(id)?.get_imported_controller(&mut self.store)
    }

    /// Follows a renamed resource file in every resource import naming it.
    pub fn resource_renamed(&mut self, old_name: &str, new_name: &str) -> Result<EditResult> {
        let mut result = EditResult::unchanged();
        for import in self.store.list_imports()? {
            let ctrl = self.import(&import.id)?;
            if ctrl.is_resource() {
                result.merge(ctrl.change_name(&mut self.store, old_name, new_name)?);
            }
        }
        Ok(result)
    }

    /// Switches the extension of every resource import of `datafile`.
    pub fn change_resource_format(
        &mut self,
        datafile: &EntityId,
        format: &str,
    ) -> Result<EditResult> {
        let mut result = EditResult::unchanged();
        for id in self.store.get_entity(datafile)?.imports {
            let ctrl = self.import(&id)?;
            result.merge(ctrl.change_format(&mut self.store, &self.config, format)?);
        }
        Ok(result)
    }
}

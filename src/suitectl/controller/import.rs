//! Import controllers.
//!
//! [`ImportController::new`] picks the variant from the record's import type:
//! `Resource` imports get [`ImportKind::Resource`], libraries and variable
//! files get [`ImportKind::Library`]. Only resource imports resolve to another
//! data file, and only they take part in renames and format changes.

use crate::config::ControllerConfig;
use crate::controller::{owner, EditResult, Notification};
use crate::error::Result;
use crate::model::{EntityId, Import, ImportId, ImportType};
use crate::store::RecordStore;
use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Resource,
    Library,
}

impl From<ImportType> for ImportKind {
    fn from(import_type: ImportType) -> Self {
        match import_type {
            ImportType::Resource => ImportKind::Resource,
            ImportType::Library | ImportType::Variables => ImportKind::Library,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportController {
    id: ImportId,
    owner: EntityId,
    import_type: ImportType,
    kind: ImportKind,
}

impl ImportController {
    pub fn new<S: RecordStore>(store: &S, id: &ImportId) -> Result<Self> {
        let import = store.get_import(id)?;
        Ok(Self {
            id: import.id,
            owner: import.owner,
            import_type: import.import_type,
            kind: import.import_type.into(),
        })
    }

    pub fn id(&self) -> ImportId {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn import_type(&self) -> ImportType {
        self.import_type
    }

    pub fn is_resource(&self) -> bool {
        self.kind == ImportKind::Resource
    }

    pub fn label(&self) -> &'static str {
        self.import_type.as_str()
    }

    pub fn record<S: RecordStore>(&self, store: &S) -> Result<Import> {
        store.get_import(&self.id)
    }

    pub fn name<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(self.record(store)?.name)
    }

    /// Empty when the import has no alias.
    pub fn alias<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(self.record(store)?.alias.unwrap_or_default())
    }

    pub fn args<S: RecordStore>(&self, store: &S) -> Result<Vec<String>> {
        Ok(self.record(store)?.args)
    }

    /// Arguments followed by the alias marker and alias, when aliased.
    pub fn display_value<S: RecordStore>(
        &self,
        store: &S,
        config: &ControllerConfig,
    ) -> Result<String> {
        let import = self.record(store)?;
        let mut tokens = import.args;
        if let Some(alias) = import.alias {
            tokens.push(config.alias_marker.clone());
            tokens.push(alias);
        }
        Ok(tokens.join(text::SEPARATOR))
    }

    /// Positional row of the import, using the configured alias marker.
    pub fn as_list<S: RecordStore>(
        &self,
        store: &S,
        config: &ControllerConfig,
    ) -> Result<Vec<String>> {
        Ok(self.record(store)?.as_list_with_marker(&config.alias_marker))
    }

    /// Dirty flag of the importing data file.
    pub fn dirty<S: RecordStore>(&self, store: &S) -> Result<bool> {
        owner::is_dirty(store, &self.owner)
    }

    /// Rewrites the whole import. `args` is the pipe-separated edit form;
    /// an empty `alias` removes the alias.
    pub fn set_value<S: RecordStore>(
        &self,
        store: &mut S,
        name: &str,
        args: &str,
        alias: &str,
    ) -> Result<EditResult> {
        let mut import = self.record(store)?;
        import.name = name.to_string();
        import.args = text::split_value(args);
        import.alias = if alias.is_empty() {
            None
        } else {
            Some(alias.to_string())
        };
        self.write(store, import)
    }

    fn write<S: RecordStore>(&self, store: &mut S, import: Import) -> Result<EditResult> {
        store.save_import(&import)?;
        let datafile = owner::mark_dirty(store, &self.owner)?;
        tracing::debug!("{} import '{}' updated", self.import_type, import.name);

        let mut result =
            EditResult::changed().with_notification(Notification::ImportSettingChanged {
                datafile,
                name: import.name.clone(),
                import_type: self.import_type,
            });
        result.merge(self.import_loaded_or_modified(store, datafile, &import.name)?);
        Ok(result)
    }

    fn import_loaded_or_modified<S: RecordStore>(
        &self,
        store: &mut S,
        datafile: EntityId,
        name: &str,
    ) -> Result<EditResult> {
        let mut result =
            EditResult::unchanged().with_notification(Notification::ImportsModified { datafile });
        if self.is_resource() {
            result.notify(owner::resource_import_modified(store, &datafile, name)?);
        }
        Ok(result)
    }

    pub fn remove<S: RecordStore>(&self, store: &mut S) -> Result<EditResult> {
        owner::remove_import_data(store, &self.id)
    }

    /// The resource data file this import points at. Resolved on first call
    /// and cached, including a failed resolution, until [`unresolve`](Self::unresolve).
    /// Library imports never resolve.
    pub fn get_imported_controller<S: RecordStore>(
        &self,
        store: &mut S,
    ) -> Result<Option<EntityId>> {
        if !self.is_resource() {
            return Ok(None);
        }
        if let Some(cached) = store.cached_resolution(&self.id) {
            tracing::debug!("Resolution cache hit for import {}", self.id);
            return Ok(cached);
        }
        let import = self.record(store)?;
        let target = owner::find_with_import(store, &import)?;
        tracing::debug!(
            "Resolved resource import '{}' to {:?}",
            import.name,
            target
        );
        store.cache_resolution(&self.id, target);
        Ok(target)
    }

    pub fn unresolve<S: RecordStore>(&self, store: &mut S) {
        store.clear_resolution(&self.id);
    }

    pub fn contains_filename<S: RecordStore>(&self, store: &S, filename: &str) -> Result<bool> {
        Ok(self.record(store)?.name.ends_with(filename))
    }

    /// Follows a rename of the imported file: when the import name ends with
    /// `old_name`, that suffix becomes `new_name`. Arguments and alias are kept.
    pub fn change_name<S: RecordStore>(
        &self,
        store: &mut S,
        old_name: &str,
        new_name: &str,
    ) -> Result<EditResult> {
        let mut import = self.record(store)?;
        if !self.is_resource() || !import.name.ends_with(old_name) {
            return Ok(EditResult::unchanged());
        }
        let stem = import.name[..import.name.len() - old_name.len()].to_string();
        import.name = stem + new_name;
        self.write(store, import)
    }

    /// Follows a format change of the imported file, when the name carries
    /// one of the configured resource extensions.
    pub fn change_format<S: RecordStore>(
        &self,
        store: &mut S,
        config: &ControllerConfig,
        format: &str,
    ) -> Result<EditResult> {
        let mut import = self.record(store)?;
        let has_format = text::extension(&import.name)
            .is_some_and(|ext| config.is_resource_extension(ext));
        if !self.is_resource() || !has_format {
            return Ok(EditResult::unchanged());
        }
        import.name = text::replace_extension(&import.name, format);
        self.write(store, import)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityKind};
    use crate::store::memory::fixtures::SuiteFixture;
    use crate::store::memory::InMemoryStore;

    fn suite_importing(
        import_type: ImportType,
        name: &str,
    ) -> (InMemoryStore, EntityId, ImportController) {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/tests/suite.txt", None);
        let id = fx.import(suite, import_type, name);
        let ctrl = ImportController::new(&fx.store, &id).unwrap();
        (fx.store, suite, ctrl)
    }

    #[test]
    fn factory_picks_variant_by_type() {
        let (store, _, resource) = suite_importing(ImportType::Resource, "res.txt");
        assert!(resource.is_resource());
        assert_eq!(resource.label(), "Resource");

        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let lib = fx.import(suite, ImportType::Library, "OperatingSystem");
        let vars = fx.import(suite, ImportType::Variables, "vars.py");
        assert_eq!(
            ImportController::new(&fx.store, &lib).unwrap().kind(),
            ImportKind::Library
        );
        let vars = ImportController::new(&fx.store, &vars).unwrap();
        assert_eq!(vars.kind(), ImportKind::Library);
        assert_eq!(vars.label(), "Variables");
        assert_eq!(resource.alias(&store).unwrap(), "");
    }

    #[test]
    fn set_value_writes_all_fields_and_notifies() {
        let (mut store, suite, lib) = suite_importing(ImportType::Library, "Remote");
        let result = lib
            .set_value(&mut store, "Remote", r"http://h:8270 | a\|b", "Svc")
            .unwrap();

        assert!(result.changed);
        assert_eq!(
            result.notifications,
            vec![
                Notification::ImportSettingChanged {
                    datafile: suite,
                    name: "Remote".to_string(),
                    import_type: ImportType::Library,
                },
                Notification::ImportsModified { datafile: suite },
            ]
        );
        assert_eq!(lib.args(&store).unwrap(), vec!["http://h:8270", "a|b"]);
        assert!(lib.dirty(&store).unwrap());
        assert_eq!(
            lib.display_value(&store, &ControllerConfig::default()).unwrap(),
            "http://h:8270 | a|b | WITH NAME | Svc"
        );
    }

    #[test]
    fn configured_alias_marker_shows_in_both_views() {
        let (mut store, _, lib) = suite_importing(ImportType::Library, "Remote");
        lib.set_value(&mut store, "Remote", "uri", "Svc").unwrap();
        let config = ControllerConfig {
            alias_marker: "AS".to_string(),
            ..ControllerConfig::default()
        };

        assert_eq!(lib.display_value(&store, &config).unwrap(), "uri | AS | Svc");
        assert_eq!(
            lib.as_list(&store, &config).unwrap(),
            vec!["Library", "Remote", "uri", "AS", "Svc"]
        );
    }

    #[test]
    fn resource_set_value_invalidates_same_named_imports() {
        let mut fx = SuiteFixture::new();
        let a = fx.suite("A", "/p/a.txt", None);
        let b = fx.suite("B", "/p/b.txt", None);
        let res = fx.resource("common", "/p/common.txt");
        let in_a = fx.import(a, ImportType::Resource, "common.txt");
        let in_b = fx.import(b, ImportType::Resource, "../p/common.txt");
        let mut store = fx.store;

        let ca = ImportController::new(&store, &in_a).unwrap();
        let cb = ImportController::new(&store, &in_b).unwrap();
        assert_eq!(ca.get_imported_controller(&mut store).unwrap(), Some(res));
        assert_eq!(cb.get_imported_controller(&mut store).unwrap(), Some(res));

        let result = ca.set_value(&mut store, "common.txt", "", "").unwrap();
        assert_eq!(
            result.notifications.last(),
            Some(&Notification::ResourceImportModified {
                datafile: a,
                name: "common.txt".to_string()
            })
        );
        assert_eq!(store.cached_resolution(&in_a), None);
        assert_eq!(store.cached_resolution(&in_b), None);
    }

    #[test]
    fn resolution_is_cached_until_unresolved() {
        let (mut store, _, ctrl) = suite_importing(ImportType::Resource, "../res/keys.txt");
        assert_eq!(ctrl.get_imported_controller(&mut store).unwrap(), None);
        assert_eq!(store.cached_resolution(&ctrl.id()), Some(None));

        let resource = Entity::new(EntityKind::Resource, "keys").with_source("/p/res/keys.txt");
        store.save_entity(&resource).unwrap();
        assert_eq!(ctrl.get_imported_controller(&mut store).unwrap(), None);

        ctrl.unresolve(&mut store);
        assert_eq!(
            ctrl.get_imported_controller(&mut store).unwrap(),
            Some(resource.id)
        );
    }

    #[test]
    fn library_never_resolves() {
        let (mut store, _, lib) = suite_importing(ImportType::Library, "keys.txt");
        assert_eq!(lib.get_imported_controller(&mut store).unwrap(), None);
        assert_eq!(store.cached_resolution(&lib.id()), None);
    }

    #[test]
    fn change_name_rewrites_matching_suffix_only() {
        let (mut store, _, ctrl) = suite_importing(ImportType::Resource, "../res/old.txt");
        assert!(!ctrl
            .change_name(&mut store, "other.txt", "new.txt")
            .unwrap()
            .changed);
        assert_eq!(ctrl.name(&store).unwrap(), "../res/old.txt");

        assert!(ctrl.contains_filename(&store, "old.txt").unwrap());
        assert!(ctrl
            .change_name(&mut store, "old.txt", "new.txt")
            .unwrap()
            .changed);
        assert_eq!(ctrl.name(&store).unwrap(), "../res/new.txt");
    }

    #[test]
    fn change_name_keeps_args_and_alias() {
        let (mut store, _, ctrl) = suite_importing(ImportType::Resource, "old.txt");
        ctrl.set_value(&mut store, "old.txt", "x", "A").unwrap();
        ctrl.change_name(&mut store, "old.txt", "new.txt").unwrap();
        assert_eq!(ctrl.args(&store).unwrap(), vec!["x"]);
        assert_eq!(ctrl.alias(&store).unwrap(), "A");
    }

    #[test]
    fn change_format_requires_known_extension() {
        let config = ControllerConfig::default();
        let (mut store, _, ctrl) = suite_importing(ImportType::Resource, "res/keys.HTML");
        assert!(ctrl.change_format(&mut store, &config, "TXT").unwrap().changed);
        assert_eq!(ctrl.name(&store).unwrap(), "res/keys.txt");

        let (mut store, _, ctrl) = suite_importing(ImportType::Resource, "keys.robot");
        assert!(!ctrl.change_format(&mut store, &config, "txt").unwrap().changed);

        let (mut store, _, ctrl) = suite_importing(ImportType::Resource, "keys");
        assert!(!ctrl.change_format(&mut store, &config, "txt").unwrap().changed);
        assert_eq!(ctrl.name(&store).unwrap(), "keys");
    }

    #[test]
    fn remove_detaches_import() {
        let (mut store, suite, ctrl) = suite_importing(ImportType::Library, "Collections");
        let result = ctrl.remove(&mut store).unwrap();
        assert_eq!(
            result.notifications,
            vec![
                Notification::ImportSettingRemoved {
                    datafile: suite,
                    name: "Collections".to_string(),
                    import_type: ImportType::Library,
                },
                Notification::ImportsModified { datafile: suite },
            ]
        );
        assert!(store.get_entity(&suite).unwrap().imports.is_empty());
        assert!(store.get_import(&ctrl.id()).is_err());
    }
}

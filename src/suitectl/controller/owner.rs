//! Owner-side operations.
//!
//! Controllers never reach into their parents directly; whatever they need
//! from the owning test, keyword or data file goes through these functions.

use crate::controller::tags::Tag;
use crate::controller::{EditResult, Notification};
use crate::error::{Result, SuiteError};
use crate::model::{
    Entity, EntityId, EntityKind, Import, ImportId, ImportType, SettingId, SettingKind,
    SettingValue, VariableId,
};
use crate::store::RecordStore;
use crate::text;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// The data file an entity lives in; a data file is its own data file.
pub fn datafile_of<S: RecordStore>(store: &S, entity: &EntityId) -> Result<Entity> {
    let entity = store.get_entity(entity)?;
    if entity.kind.is_datafile() {
        return Ok(entity);
    }
    match entity.parent {
        Some(parent) => store.get_entity(&parent),
        None => Err(SuiteError::Store(format!(
            "{} '{}' is not attached to a data file",
            kind_name(entity.kind),
            entity.name
        ))),
    }
}

fn kind_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Directory => "Directory",
        EntityKind::Suite => "Suite",
        EntityKind::Resource => "Resource",
        EntityKind::TestCase => "Test case",
        EntityKind::Keyword => "Keyword",
    }
}

/// Marks the data file owning `entity` dirty and returns its id.
pub fn mark_dirty<S: RecordStore>(store: &mut S, entity: &EntityId) -> Result<EntityId> {
    let mut datafile = datafile_of(store, entity)?;
    if !datafile.dirty {
        tracing::debug!("Data file '{}' marked dirty", datafile.name);
        datafile.dirty = true;
        store.save_entity(&datafile)?;
    }
    Ok(datafile.id)
}

pub fn is_dirty<S: RecordStore>(store: &S, entity: &EntityId) -> Result<bool> {
    Ok(datafile_of(store, entity)?.dirty)
}

/// First setting of `kind` declared directly on `owner`.
pub fn find_setting<S: RecordStore>(
    store: &S,
    owner: &Entity,
    kind: SettingKind,
) -> Result<Option<SettingId>> {
    for id in &owner.settings {
        if store.get_setting(id)?.kind == kind {
            return Ok(Some(*id));
        }
    }
    Ok(None)
}

/// Forced tags applying to `entity`, collected from its data file and every
/// enclosing suite. The outermost suite's tags come first.
pub fn force_tags<S: RecordStore>(store: &S, entity: &EntityId) -> Result<Vec<Tag>> {
    let start = datafile_of(store, entity)?;
    let mut levels: Vec<Vec<Tag>> = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(start.id);

    while let Some(id) = current {
        if !visited.insert(id) {
            tracing::warn!("Parent cycle detected at data file {}", id);
            break;
        }
        let level = store.get_entity(&id)?;
        if let Some(setting_id) = find_setting(store, &level, SettingKind::ForceTags)? {
            let setting = store.get_setting(&setting_id)?;
            if let SettingValue::Tags(Some(names)) = setting.value {
                levels.push(
                    names
                        .into_iter()
                        .enumerate()
                        .map(|(index, name)| Tag::forced(name, index, setting_id))
                        .collect(),
                );
            }
        }
        current = level.parent;
    }

    Ok(levels.into_iter().rev().flatten().collect())
}

/// Default tags declared by the data file owning `entity`.
pub fn default_tags<S: RecordStore>(store: &S, entity: &EntityId) -> Result<Vec<Tag>> {
    let datafile = datafile_of(store, entity)?;
    let Some(setting_id) = find_setting(store, &datafile, SettingKind::DefaultTags)? else {
        return Ok(Vec::new());
    };
    match store.get_setting(&setting_id)?.value {
        SettingValue::Tags(Some(names)) => Ok(names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Tag::default_tag(name, index, setting_id))
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Removes a variable from its owner's variable table.
pub fn remove_var<S: RecordStore>(store: &mut S, variable: &VariableId) -> Result<EditResult> {
    let record = store.get_variable(variable)?;
    let mut owner = store.get_entity(&record.owner)?;
    owner.variables.retain(|id| id != variable);
    store.save_entity(&owner)?;
    store.delete_variable(variable)?;
    mark_dirty(store, &record.owner)?;
    tracing::debug!("Variable '{}' removed from '{}'", record.name, owner.name);
    Ok(EditResult::changed())
}

/// Removes an import from its owning data file.
pub fn remove_import_data<S: RecordStore>(store: &mut S, import: &ImportId) -> Result<EditResult> {
    let record = store.get_import(import)?;
    let mut owner = store.get_entity(&record.owner)?;
    owner.imports.retain(|id| id != import);
    store.save_entity(&owner)?;
    store.delete_import(import)?;
    let datafile = mark_dirty(store, &record.owner)?;
    tracing::debug!("{} import '{}' removed", record.import_type, record.name);

    Ok(EditResult::changed()
        .with_notification(Notification::ImportSettingRemoved {
            datafile,
            name: record.name,
            import_type: record.import_type,
        })
        .with_notification(Notification::ImportsModified { datafile }))
}

fn file_name(path: &str) -> &str {
    path.rsplit(&['/', '\\'][..]).next().unwrap_or(path)
}

/// A resource import named `name` was edited in `datafile`: every resource
/// import pointing at the same file name must resolve again.
pub fn resource_import_modified<S: RecordStore>(
    store: &mut S,
    datafile: &EntityId,
    name: &str,
) -> Result<Notification> {
    let target = file_name(name);
    for import in store.list_imports()? {
        if import.import_type == ImportType::Resource && file_name(&import.name) == target {
            store.clear_resolution(&import.id);
        }
    }
    tracing::debug!("Resolutions of resource '{}' invalidated", name);
    Ok(Notification::ResourceImportModified {
        datafile: *datafile,
        name: name.to_string(),
    })
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Finds the resource data file an import refers to.
///
/// The import name is taken relative to the importing data file's directory.
/// When no resource has exactly that path, a resource whose source ends with
/// the import name's path components is accepted; among several, the one with
/// the smallest source path wins.
pub fn find_with_import<S: RecordStore>(
    store: &S,
    import: &Import,
) -> Result<Option<EntityId>> {
    let importer = datafile_of(store, &import.owner)?;
    let resources: Vec<Entity> = store
        .list_entities()?
        .into_iter()
        .filter(|e| e.kind == EntityKind::Resource && e.source.is_some())
        .collect();

    if let Some(source) = &importer.source {
        let directory = Path::new(source).parent().unwrap_or_else(|| Path::new(""));
        let wanted = normalize_path(&directory.join(&import.name));
        if let Some(found) = resources.iter().find(|r| {
            r.source
                .as_deref()
                .is_some_and(|s| normalize_path(Path::new(s)) == wanted)
        }) {
            return Ok(Some(found.id));
        }
    }

    if import.name.trim().is_empty() {
        return Ok(None);
    }
    let tail = Path::new(&import.name);
    Ok(resources
        .iter()
        .filter_map(|r| r.source.as_deref().map(|s| (s, r.id)))
        .filter(|(s, _)| Path::new(s).ends_with(tail))
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, id)| id))
}

fn validate_variable_name<S: RecordStore>(
    store: &S,
    owner: &EntityId,
    name: &str,
    item: Option<&VariableId>,
    well_formed: bool,
    format: &str,
) -> Result<()> {
    if !well_formed {
        return Err(SuiteError::InvalidVariableName {
            name: name.to_string(),
            reason: format!("variable name must be in format {}", format),
        });
    }
    let table = store.get_entity(owner)?;
    let wanted = text::normalize_name(name);
    for id in table.variables.iter().filter(|id| Some(*id) != item) {
        if text::normalize_name(&store.get_variable(id)?.name) == wanted {
            return Err(SuiteError::InvalidVariableName {
                name: name.to_string(),
                reason: "variable with this name already exists".to_string(),
            });
        }
    }
    Ok(())
}

/// Checks `name` for a scalar variable of `owner`'s table. `item` is the
/// variable being renamed, which may keep its own name.
pub fn validate_scalar_variable_name<S: RecordStore>(
    store: &S,
    owner: &EntityId,
    name: &str,
    item: Option<&VariableId>,
) -> Result<()> {
    validate_variable_name(
        store,
        owner,
        name,
        item,
        text::is_scalar_variable(name),
        "${name}",
    )
}

pub fn validate_list_variable_name<S: RecordStore>(
    store: &S,
    owner: &EntityId,
    name: &str,
    item: Option<&VariableId>,
) -> Result<()> {
    validate_variable_name(
        store,
        owner,
        name,
        item,
        text::is_list_variable(name),
        "@{name}",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::SuiteFixture;

    #[test]
    fn test_resolves_to_its_data_file() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let test = fx.test(suite, "T1");
        assert_eq!(datafile_of(&fx.store, &test).unwrap().id, suite);
        assert_eq!(datafile_of(&fx.store, &suite).unwrap().id, suite);
    }

    #[test]
    fn mark_dirty_targets_data_file() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let kw = fx.keyword(suite, "KW");
        assert_eq!(mark_dirty(&mut fx.store, &kw).unwrap(), suite);
        assert!(fx.store.get_entity(&suite).unwrap().dirty);
        assert!(is_dirty(&fx.store, &kw).unwrap());
    }

    #[test]
    fn force_tags_are_gathered_outermost_first() {
        let mut fx = SuiteFixture::new();
        let top = fx.directory("Top", "/p/__init__.txt", None);
        let middle = fx.directory("Middle", "/p/m/__init__.txt", Some(top));
        let inner = fx.suite("Inner", "/p/m/inner.txt", Some(middle));
        fx.force_tags(top, &["f1"]);
        fx.force_tags(middle, &["f2"]);
        fx.force_tags(inner, &["f3"]);
        let test = fx.test(inner, "T");

        let names: Vec<_> = force_tags(&fx.store, &test)
            .unwrap()
            .into_iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn levels_without_force_tags_are_skipped() {
        let mut fx = SuiteFixture::new();
        let top = fx.directory("Top", "/p/__init__.txt", None);
        let inner = fx.suite("Inner", "/p/inner.txt", Some(top));
        fx.force_tags(inner, &["own"]);

        let tags = force_tags(&fx.store, &inner).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name(), "own");
        assert_eq!(tags[0].index(), Some(0));
    }

    #[test]
    fn finds_resource_relative_to_importer() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/tests/suite.txt", None);
        let res = fx.resource("common", "/p/resources/common.txt");
        let other = fx.resource("common", "/q/common.txt");
        let import = fx.import(suite, ImportType::Resource, "../resources/common.txt");

        let record = fx.store.get_import(&import).unwrap();
        let found = find_with_import(&fx.store, &record).unwrap();
        assert_eq!(found, Some(res));
        assert_ne!(found, Some(other));
    }

    #[test]
    fn unknown_resource_resolves_to_none() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let import = fx.import(suite, ImportType::Resource, "${RES}/missing.txt");
        let record = fx.store.get_import(&import).unwrap();
        assert_eq!(find_with_import(&fx.store, &record).unwrap(), None);
    }

    #[test]
    fn name_suffix_must_match_whole_segments() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        fx.resource("mycommon", "/q/mycommon.txt");
        let import = fx.import(suite, ImportType::Resource, "common.txt");
        let record = fx.store.get_import(&import).unwrap();
        assert_eq!(find_with_import(&fx.store, &record).unwrap(), None);
    }

    #[test]
    fn suffix_match_picks_smallest_source() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let second = fx.resource("common", "/b/res/common.txt");
        let first = fx.resource("common", "/a/res/common.txt");
        let import = fx.import(suite, ImportType::Resource, "res/common.txt");
        let record = fx.store.get_import(&import).unwrap();

        for _ in 0..5 {
            assert_eq!(find_with_import(&fx.store, &record).unwrap(), Some(first));
        }
        assert_ne!(find_with_import(&fx.store, &record).unwrap(), Some(second));
    }

    #[test]
    fn scalar_name_validation() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let existing = fx.variable(suite, "${My Var}", &["1"]);

        assert!(validate_scalar_variable_name(&fx.store, &suite, "${other}", None).is_ok());
        assert!(validate_scalar_variable_name(&fx.store, &suite, "other", None).is_err());
        assert!(validate_scalar_variable_name(&fx.store, &suite, "${my_var}", None).is_err());
        assert!(
            validate_scalar_variable_name(&fx.store, &suite, "${myvar}", Some(&existing)).is_ok()
        );
        assert!(validate_list_variable_name(&fx.store, &suite, "${list}", None).is_err());
        assert!(validate_list_variable_name(&fx.store, &suite, "@{list}", None).is_ok());
    }

    #[test]
    fn removing_import_reports_removal() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let import = fx.import(suite, ImportType::Library, "Collections");

        let result = remove_import_data(&mut fx.store, &import).unwrap();
        assert!(fx.store.get_entity(&suite).unwrap().imports.is_empty());
        assert!(result.notifications.contains(&Notification::ImportSettingRemoved {
            datafile: suite,
            name: "Collections".to_string(),
            import_type: ImportType::Library,
        }));
    }
}

use crate::controller::setting::SettingController;
use crate::controller::{owner, EditResult};
use crate::error::{Result, SuiteError};
use crate::model::{SettingId, SettingKind, SettingValue};
use crate::store::RecordStore;

/// One `Metadata` row of a suite.
///
/// Metadata rows are members of a collection rather than singleton settings,
/// so every edit is written through without comparing first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataController {
    setting: SettingController,
}

impl MetadataController {
    pub fn new<S: RecordStore>(store: &S, id: &SettingId) -> Result<Self> {
        let setting = SettingController::new(store, id)?;
        if setting.kind() != SettingKind::Metadata {
            return Err(SuiteError::Store(format!(
                "Setting '{}' is not metadata",
                setting.label()
            )));
        }
        Ok(Self { setting })
    }

    pub fn setting(&self) -> &SettingController {
        &self.setting
    }

    fn parts<S: RecordStore>(&self, store: &S) -> Result<(String, String)> {
        match self.setting.record(store)?.value {
            SettingValue::Metadata { name, value } => Ok((name, value)),
            _ => Ok((String::new(), String::new())),
        }
    }

    pub fn name<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(self.parts(store)?.0)
    }

    pub fn value<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(self.parts(store)?.1)
    }

    pub fn set_value<S: RecordStore>(
        &self,
        store: &mut S,
        name: &str,
        value: &str,
    ) -> Result<EditResult> {
        let mut setting = self.setting.record(store)?;
        setting.value = SettingValue::Metadata {
            name: name.to_string(),
            value: value.to_string(),
        };
        store.save_setting(&setting)?;
        owner::mark_dirty(store, &self.setting.owner())?;
        tracing::debug!("Metadata '{}' set", name);
        Ok(EditResult::changed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::SuiteFixture;

    #[test]
    fn set_value_always_marks_dirty() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let id = fx.setting(
            suite,
            SettingKind::Metadata,
            "Metadata",
            SettingValue::Metadata {
                name: "Version".to_string(),
                value: "1.0".to_string(),
            },
        );
        let mut store = fx.store;
        let ctrl = MetadataController::new(&store, &id).unwrap();
        assert_eq!(ctrl.name(&store).unwrap(), "Version");
        assert_eq!(ctrl.value(&store).unwrap(), "1.0");

        let result = ctrl.set_value(&mut store, "Version", "1.0").unwrap();
        assert!(result.changed);
        assert!(store.get_entity(&suite).unwrap().dirty);
    }

    #[test]
    fn generic_set_value_keeps_the_name() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let id = fx.setting(
            suite,
            SettingKind::Metadata,
            "Metadata",
            SettingValue::Metadata {
                name: "Owner".to_string(),
                value: "qa".to_string(),
            },
        );
        let mut store = fx.store;
        let ctrl = MetadataController::new(&store, &id).unwrap();
        ctrl.setting().set_value(&mut store, "dev").unwrap();
        assert_eq!(ctrl.name(&store).unwrap(), "Owner");
        assert_eq!(ctrl.value(&store).unwrap(), "dev");
        assert_eq!(
            ctrl.setting().as_list(&store).unwrap(),
            vec!["Metadata", "Owner", "dev"]
        );
    }
}

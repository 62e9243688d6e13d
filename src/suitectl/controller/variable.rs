use crate::controller::{owner, EditResult, Notification};
use crate::error::Result;
use crate::model::{Comment, EntityId, Variable, VariableId};
use crate::store::RecordStore;
use crate::text;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// New value for a variable: one scalar, or the items of a list variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableValue {
    Scalar(String),
    List(Vec<String>),
}

impl VariableValue {
    fn into_items(self) -> Vec<String> {
        match self {
            VariableValue::Scalar(value) => vec![value],
            VariableValue::List(items) => items,
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::Scalar(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::Scalar(value)
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(items: Vec<String>) -> Self {
        VariableValue::List(items)
    }
}

/// Controller for one row of a variable table.
#[derive(Debug, Clone, Copy)]
pub struct VariableController {
    id: VariableId,
    owner: EntityId,
}

impl VariableController {
    pub fn new<S: RecordStore>(store: &S, id: &VariableId) -> Result<Self> {
        let variable = store.get_variable(id)?;
        Ok(Self {
            id: variable.id,
            owner: variable.owner,
        })
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn record<S: RecordStore>(&self, store: &S) -> Result<Variable> {
        store.get_variable(&self.id)
    }

    pub fn label(&self) -> &str {
        ""
    }

    pub fn name<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(self.record(store)?.name)
    }

    pub fn value<S: RecordStore>(&self, store: &S) -> Result<Vec<String>> {
        Ok(self.record(store)?.value)
    }

    pub fn comment<S: RecordStore>(&self, store: &S) -> Result<Option<Comment>> {
        Ok(self.record(store)?.comment)
    }

    pub fn is_scalar<S: RecordStore>(&self, store: &S) -> Result<bool> {
        Ok(text::is_scalar_variable(&self.name(store)?))
    }

    /// Writes name and value. A scalar is stored as a one-item list.
    pub fn set_value<S: RecordStore>(
        &self,
        store: &mut S,
        name: &str,
        value: impl Into<VariableValue>,
    ) -> Result<EditResult> {
        let mut variable = self.record(store)?;
        variable.name = name.to_string();
        variable.value = value.into().into_items();
        store.save_variable(&variable)?;
        owner::mark_dirty(store, &self.owner)?;
        tracing::debug!("Variable '{}' set to {:?}", variable.name, variable.value);

        Ok(EditResult::changed().with_notification(self.notify_value_changed(store)?))
    }

    pub fn delete<S: RecordStore>(&self, store: &mut S) -> Result<EditResult> {
        owner::remove_var(store, &self.id)
    }

    /// Checks a new name against the owning table. The current name picks the
    /// scalar or list rules.
    pub fn validate_name<S: RecordStore>(&self, store: &S, new_name: &str) -> Result<()> {
        if self.is_scalar(store)? {
            owner::validate_scalar_variable_name(store, &self.owner, new_name, Some(&self.id))
        } else {
            owner::validate_list_variable_name(store, &self.owner, new_name, Some(&self.id))
        }
    }

    pub fn notify_value_changed<S: RecordStore>(&self, store: &S) -> Result<Notification> {
        Ok(Notification::VariableUpdated {
            variable: self.id,
            datafile: owner::datafile_of(store, &self.owner)?.id,
        })
    }

    /// Equal when both point at the same row, or at rows with equal name and value.
    pub fn equals<S: RecordStore>(
        &self,
        store: &S,
        other: Option<&VariableController>,
    ) -> Result<bool> {
        let Some(other) = other else {
            return Ok(false);
        };
        if self.id == other.id {
            return Ok(true);
        }
        Ok(self.record(store)? == other.record(store)?)
    }

    /// Hash consistent with [`equals`](Self::equals).
    pub fn record_hash<S: RecordStore>(&self, store: &S) -> Result<u64> {
        let mut hasher = DefaultHasher::new();
        self.record(store)?.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SuiteError;
    use crate::store::memory::fixtures::SuiteFixture;
    use crate::store::memory::InMemoryStore;

    fn table() -> (InMemoryStore, EntityId, VariableId, VariableId) {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        let host = fx.variable(suite, "${HOST}", &["localhost"]);
        let users = fx.variable(suite, "@{USERS}", &["a", "b"]);
        (fx.store, suite, host, users)
    }

    #[test]
    fn scalar_is_wrapped_into_list() {
        let (mut store, suite, host, _) = table();
        let ctrl = VariableController::new(&store, &host).unwrap();
        let result = ctrl.set_value(&mut store, "${HOST}", "example.org").unwrap();

        assert!(result.changed);
        assert_eq!(
            result.notifications,
            vec![Notification::VariableUpdated {
                variable: host,
                datafile: suite
            }]
        );
        assert_eq!(ctrl.value(&store).unwrap(), vec!["example.org"]);
        assert!(store.get_entity(&suite).unwrap().dirty);
    }

    #[test]
    fn list_value_is_stored_as_is() {
        let (mut store, _, _, users) = table();
        let ctrl = VariableController::new(&store, &users).unwrap();
        ctrl.set_value(&mut store, "@{USERS}", vec!["x".to_string(), "y".to_string()])
            .unwrap();
        assert_eq!(ctrl.value(&store).unwrap(), vec!["x", "y"]);
        assert_eq!(ctrl.label(), "");
    }

    #[test]
    fn equality_compares_name_and_value() {
        let mut fx = SuiteFixture::new();
        let a = fx.suite("A", "/p/a.txt", None);
        let b = fx.suite("B", "/p/b.txt", None);
        let v1 = fx.variable(a, "${X}", &["1"]);
        let v2 = fx.variable(b, "${X}", &["1"]);
        let v3 = fx.variable(b, "${Y}", &["1"]);
        let store = fx.store;

        let c1 = VariableController::new(&store, &v1).unwrap();
        let c2 = VariableController::new(&store, &v2).unwrap();
        let c3 = VariableController::new(&store, &v3).unwrap();
        assert!(c1.equals(&store, Some(&c1)).unwrap());
        assert!(c1.equals(&store, Some(&c2)).unwrap());
        assert!(!c1.equals(&store, Some(&c3)).unwrap());
        assert!(!c1.equals(&store, None).unwrap());
        assert_eq!(
            c1.record_hash(&store).unwrap(),
            c2.record_hash(&store).unwrap()
        );
    }

    #[test]
    fn delete_removes_from_owner_table() {
        let (mut store, suite, host, users) = table();
        let ctrl = VariableController::new(&store, &host).unwrap();
        assert!(ctrl.delete(&mut store).unwrap().changed);

        let owner = store.get_entity(&suite).unwrap();
        assert_eq!(owner.variables, vec![users]);
        assert!(owner.dirty);
        assert!(matches!(
            store.get_variable(&host),
            Err(SuiteError::VariableNotFound(_))
        ));
    }

    #[test]
    fn validate_name_uses_scalar_or_list_rules() {
        let (store, _, host, users) = table();
        let scalar = VariableController::new(&store, &host).unwrap();
        let list = VariableController::new(&store, &users).unwrap();

        assert!(scalar.validate_name(&store, "${HOST}").is_ok());
        assert!(scalar.validate_name(&store, "${PORT}").is_ok());
        assert!(scalar.validate_name(&store, "@{PORT}").is_err());
        assert!(list.validate_name(&store, "@{ADMINS}").is_ok());
        assert!(list.validate_name(&store, "${ADMINS}").is_err());
    }

    #[test]
    fn duplicate_names_are_rejected_loosely() {
        let mut fx = SuiteFixture::new();
        let suite = fx.suite("Suite", "/p/suite.txt", None);
        fx.variable(suite, "${HOST}", &["localhost"]);
        let port = fx.variable(suite, "${PORT}", &["80"]);
        let store = fx.store;

        let ctrl = VariableController::new(&store, &port).unwrap();
        let err = ctrl.validate_name(&store, "${ho st}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid variable name '${ho st}': variable with this name already exists"
        );
    }
}

//! # Controllers
//!
//! Each controller wraps one record by id and mediates every read and edit
//! the application makes on it. Controllers are small handles holding ids;
//! the record itself always lives in the [`RecordStore`](crate::store::RecordStore)
//! passed to each call.
//!
//! ## Edit Protocol
//!
//! Every mutating call follows the same sequence, without interruption:
//!
//! 1. parse the input into the record's shape
//! 2. compare with the stored, parsed value (never the raw strings)
//! 3. on a real change: write through, mark the owning data file dirty
//! 4. return an [`EditResult`] listing the [`Notification`]s to publish
//!
//! Nothing is published from inside this crate; the caller decides which bus
//! (if any) receives the notifications.

use crate::model::{EntityId, ImportType, VariableId};

pub mod documentation;
pub mod import;
pub mod metadata;
pub mod owner;
pub mod setting;
pub mod tags;
pub mod variable;

pub use documentation::DocumentationController;
pub use import::ImportController;
pub use metadata::MetadataController;
pub use setting::SettingController;
pub use tags::{Tag, TagKind, TagsController};
pub use variable::{VariableController, VariableValue};

/// Something the rest of the application should hear about after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A setting of a test, keyword or data file changed.
    SettingsChanged { owner: EntityId },
    /// Steps must be re-read, e.g. after a template change.
    StepsChanged { owner: EntityId },
    ImportsModified { datafile: EntityId },
    /// A resource import was edited; other importers of `name` must re-resolve.
    ResourceImportModified { datafile: EntityId, name: String },
    ImportSettingChanged {
        datafile: EntityId,
        name: String,
        import_type: ImportType,
    },
    ImportSettingRemoved {
        datafile: EntityId,
        name: String,
        import_type: ImportType,
    },
    VariableUpdated {
        variable: VariableId,
        datafile: EntityId,
    },
}

/// Outcome of an edit.
///
/// `changed` is true exactly when the record was written and its data file
/// marked dirty.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EditResult {
    pub changed: bool,
    pub notifications: Vec<Notification>,
}

impl EditResult {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn changed() -> Self {
        Self {
            changed: true,
            notifications: Vec::new(),
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    pub fn merge(&mut self, other: EditResult) {
        self.changed |= other.changed;
        self.notifications.extend(other.notifications);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn merge_keeps_order_and_changed_flag() {
        let owner = Uuid::new_v4();
        let mut first = EditResult::unchanged()
            .with_notification(Notification::SettingsChanged { owner });
        let second = EditResult::changed().with_notification(Notification::StepsChanged { owner });
        first.merge(second);

        assert!(first.changed);
        assert_eq!(
            first.notifications,
            vec![
                Notification::SettingsChanged { owner },
                Notification::StepsChanged { owner }
            ]
        );
    }
}

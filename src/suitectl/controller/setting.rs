//! The base setting controller.
//!
//! One [`SettingController`] type serves every [`SettingKind`]. The kind picks
//! the strategy used to parse edit input, compare it with the stored value,
//! and decide which notifications a write or clear produces. Specialized
//! controllers ([`DocumentationController`](super::DocumentationController),
//! [`TagsController`](super::TagsController),
//! [`MetadataController`](super::MetadataController)) wrap this one and add
//! the operations only their kind supports.

use crate::controller::tags::effective_tags;
use crate::controller::{owner, EditResult, Notification};
use crate::error::Result;
use crate::model::{Comment, EntityId, Setting, SettingId, SettingKind, SettingValue};
use crate::store::RecordStore;
use crate::text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingController {
    id: SettingId,
    owner: EntityId,
    kind: SettingKind,
    label: String,
}

fn label_for(setting: &Setting) -> String {
    if setting.kind == SettingKind::ReturnValue {
        return "Return Value".to_string();
    }
    let name = &setting.setting_name;
    match name.strip_prefix('[') {
        Some(inner) => inner.strip_suffix(']').unwrap_or(inner).to_string(),
        None => name.clone(),
    }
}

/// Parses edit input into the value shape of `kind`.
///
/// `current` is only consulted by kinds whose edit form covers part of the
/// record (metadata keeps its name).
fn parse_input(kind: SettingKind, current: &SettingValue, input: &str) -> SettingValue {
    match kind {
        // Free text: whitespace is content.
        SettingKind::Documentation => SettingValue::Text(input.to_string()),
        SettingKind::Template => SettingValue::Text(text::unescape_pipes(input.trim())),
        SettingKind::Fixture => {
            let mut tokens = text::split_value(input);
            if tokens.is_empty() {
                SettingValue::Fixture {
                    name: String::new(),
                    args: Vec::new(),
                }
            } else {
                let name = tokens.remove(0);
                SettingValue::Fixture { name, args: tokens }
            }
        }
        SettingKind::Tags | SettingKind::DefaultTags | SettingKind::ForceTags => {
            SettingValue::Tags(Some(text::split_value(input)))
        }
        SettingKind::Timeout => {
            let (value, message) = text::split_first(input);
            SettingValue::Timeout { value, message }
        }
        SettingKind::Arguments | SettingKind::ReturnValue => {
            SettingValue::List(text::split_value(input))
        }
        SettingKind::Metadata => {
            let name = match current {
                SettingValue::Metadata { name, .. } => name.clone(),
                _ => String::new(),
            };
            SettingValue::Metadata {
                name,
                value: input.to_string(),
            }
        }
    }
}

/// Notifications owed to the owner after the value of `kind` was written or cleared.
fn value_notifications(kind: SettingKind, owner: EntityId) -> Vec<Notification> {
    match kind {
        SettingKind::Arguments => vec![Notification::SettingsChanged { owner }],
        SettingKind::Template => vec![Notification::StepsChanged { owner }],
        _ => Vec::new(),
    }
}

impl SettingController {
    pub fn new<S: RecordStore>(store: &S, id: &SettingId) -> Result<Self> {
        let setting = store.get_setting(id)?;
        Ok(Self {
            id: setting.id,
            owner: setting.owner,
            kind: setting.kind,
            label: label_for(&setting),
        })
    }

    pub fn id(&self) -> SettingId {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn kind(&self) -> SettingKind {
        self.kind
    }

    /// Display name: the setting name without `[...]` decoration.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn record<S: RecordStore>(&self, store: &S) -> Result<Setting> {
        store.get_setting(&self.id)
    }

    pub fn as_list<S: RecordStore>(&self, store: &S) -> Result<Vec<String>> {
        Ok(self.record(store)?.as_list())
    }

    fn escaped_tokens(setting: &Setting) -> Vec<String> {
        setting
            .as_list()
            .iter()
            .skip(1)
            .map(|token| text::escape_pipes(token))
            .collect()
    }

    /// Edit form of the value, without the comment.
    pub fn value<S: RecordStore>(&self, store: &S) -> Result<String> {
        let setting = self.record(store)?;
        match &setting.value {
            SettingValue::Text(doc) if self.kind == SettingKind::Documentation => Ok(doc.clone()),
            SettingValue::Metadata { value, .. } => Ok(value.clone()),
            _ => {
                let mut tokens = Self::escaped_tokens(&setting);
                if setting.comment.is_some() {
                    tokens.pop();
                }
                Ok(tokens.join(text::SEPARATOR))
            }
        }
    }

    /// Read-only rendering. Keeps the comment, and for tags shows the
    /// effective tags including inherited ones.
    pub fn display_value<S: RecordStore>(&self, store: &S) -> Result<String> {
        let setting = self.record(store)?;
        if self.kind.is_tags() {
            let tags = effective_tags(store, &setting)?;
            return Ok(text::join_escaped(tags.iter().map(|t| t.name())));
        }
        Ok(Self::escaped_tokens(&setting).join(text::SEPARATOR))
    }

    pub fn comment<S: RecordStore>(&self, store: &S) -> Result<Option<Comment>> {
        Ok(self.record(store)?.comment)
    }

    pub fn is_set<S: RecordStore>(&self, store: &S) -> Result<bool> {
        let setting = self.record(store)?;
        if self.kind.is_tags() {
            return Ok(!effective_tags(store, &setting)?.is_empty());
        }
        Ok(setting.is_set())
    }

    /// Name of the keyword this setting calls; empty for non-keyword settings.
    pub fn keyword_name<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(match self.record(store)?.value {
            SettingValue::Fixture { name, .. } if self.kind == SettingKind::Fixture => name,
            SettingValue::Text(template) if self.kind == SettingKind::Template => template,
            _ => String::new(),
        })
    }

    pub fn contains_keyword<S: RecordStore>(&self, store: &S, name: &str) -> Result<bool> {
        Ok(text::eq(&self.keyword_name(store)?, name))
    }

    /// Writes `value` when it differs from the stored value once parsed.
    pub fn set_value<S: RecordStore>(&self, store: &mut S, value: &str) -> Result<EditResult> {
        let mut setting = self.record(store)?;
        let parsed = parse_input(self.kind, &setting.value, value);
        if parsed == setting.value {
            tracing::trace!("Setting '{}' unchanged", self.label);
            return Ok(EditResult::unchanged());
        }

        setting.value = parsed;
        store.save_setting(&setting)?;
        owner::mark_dirty(store, &self.owner)?;
        tracing::debug!("Setting '{}' ({:?}) set to {:?}", self.label, self.kind, value);

        let mut result = EditResult::changed();
        for notification in value_notifications(self.kind, self.owner) {
            result.notify(notification);
        }
        Ok(result)
    }

    pub fn set_comment<S: RecordStore>(&self, store: &mut S, comment: &str) -> Result<EditResult> {
        let mut setting = self.record(store)?;
        let comment = Comment::parse(comment);
        if comment == setting.comment {
            return Ok(EditResult::unchanged());
        }

        setting.comment = comment;
        store.save_setting(&setting)?;
        owner::mark_dirty(store, &self.owner)?;
        tracing::debug!("Comment of setting '{}' changed", self.label);
        Ok(EditResult::changed())
    }

    /// Copies value and comment from another setting of the same shape.
    pub fn set_from<S: RecordStore>(
        &self,
        store: &mut S,
        other: &SettingController,
    ) -> Result<EditResult> {
        let source = other.record(store)?;
        let copy_value = if other.kind.is_tags() {
            matches!(source.value, SettingValue::Tags(Some(_))) && other.is_set(store)?
        } else {
            other.is_set(store)?
        };

        let mut result = EditResult::unchanged();
        if copy_value {
            let value = other.value(store)?;
            result.merge(self.set_value(store, &value)?);
        }
        let comment = source.comment.as_ref().map(Comment::text).unwrap_or("");
        result.merge(self.set_comment(store, comment)?);
        Ok(result)
    }

    /// Resets the value and drops the comment.
    pub fn clear<S: RecordStore>(&self, store: &mut S) -> Result<EditResult> {
        let mut setting = self.record(store)?;
        setting.reset();
        // Reset leaves the comment in place; remove it on its own.
        setting.comment = None;
        store.save_setting(&setting)?;
        owner::mark_dirty(store, &self.owner)?;
        tracing::debug!("Setting '{}' cleared", self.label);

        let mut result = EditResult::changed();
        for notification in value_notifications(self.kind, self.owner) {
            result.notify(notification);
        }
        Ok(result)
    }

    /// Renames the called keyword in place. Arguments are kept.
    ///
    /// Only fixtures and templates call keywords; other kinds are left alone.
    pub fn replace_keyword<S: RecordStore>(
        &self,
        store: &mut S,
        new_name: &str,
    ) -> Result<EditResult> {
        let mut setting = self.record(store)?;
        match (&mut setting.value, self.kind) {
            (SettingValue::Fixture { name, .. }, SettingKind::Fixture) => {
                *name = new_name.to_string();
            }
            (SettingValue::Text(template), SettingKind::Template) => {
                *template = new_name.to_string();
            }
            _ => return Ok(EditResult::unchanged()),
        }
        store.save_setting(&setting)?;
        owner::mark_dirty(store, &self.owner)?;
        tracing::debug!("Keyword of setting '{}' renamed to '{}'", self.label, new_name);

        let mut result = EditResult::changed();
        if self.kind == SettingKind::Template {
            result.notify(Notification::StepsChanged { owner: self.owner });
        }
        Ok(result)
    }

    pub fn notify_value_changed(&self) -> Notification {
        Notification::SettingsChanged { owner: self.owner }
    }
}

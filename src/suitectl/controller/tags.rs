//! Tags and the tags setting controllers.
//!
//! A test's effective tags are composed from three places:
//!
//! - **forced** tags of its data file and every enclosing suite (outermost first),
//!   which always apply
//! - its own `[Tags]`, when set
//! - otherwise the data file's **default** tags
//!
//! An own `[Tags]` that is set but empty yields one blank tag, so the editor
//! can show "explicitly no tags" distinctly from "inherits defaults".

use crate::controller::setting::SettingController;
use crate::controller::{owner, EditResult};
use crate::error::{Result, SuiteError};
use crate::model::{Setting, SettingId, SettingKind, SettingValue};
use crate::store::RecordStore;
use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Own,
    /// Inherited from the data file's default tags.
    Default,
    /// Inherited from force tags; applies regardless of own tags.
    Forced,
}

#[derive(Debug, Clone)]
pub struct Tag {
    name: Option<String>,
    index: Option<usize>,
    controller: SettingId,
    kind: TagKind,
}

impl Tag {
    pub(crate) fn own(
        name: impl Into<String>,
        index: Option<usize>,
        controller: SettingId,
    ) -> Self {
        Self {
            name: Some(name.into()),
            index,
            controller,
            kind: TagKind::Own,
        }
    }

    pub(crate) fn default_tag(
        name: impl Into<String>,
        index: usize,
        controller: SettingId,
    ) -> Self {
        Self {
            name: Some(name.into()),
            index: Some(index),
            controller,
            kind: TagKind::Default,
        }
    }

    pub(crate) fn forced(name: impl Into<String>, index: usize, controller: SettingId) -> Self {
        Self {
            name: Some(name.into()),
            index: Some(index),
            controller,
            kind: TagKind::Forced,
        }
    }

    fn placeholder(kind: TagKind, controller: SettingId) -> Self {
        Self {
            name: None,
            index: None,
            controller,
            kind,
        }
    }

    /// Tag name; the placeholder tag reads as empty.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// True only for the placeholder from [`TagsController::empty_tag`].
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The tags setting this tag was read from.
    pub fn controller(&self) -> SettingId {
        self.controller
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn tooltip<S: RecordStore>(&self, store: &S) -> Result<String> {
        if self.kind == TagKind::Own {
            return Ok("Own tag".to_string());
        }
        let setting = store.get_setting(&self.controller)?;
        let suite = owner::datafile_of(store, &setting.owner)?;
        Ok(match self.kind {
            TagKind::Default => format!("Default tag from suite {}", suite.name),
            _ => format!("Force tag from suite {}", suite.name),
        })
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.index == other.index
    }
}

impl Eq for Tag {}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn tag_kind_for(kind: SettingKind) -> TagKind {
    match kind {
        SettingKind::DefaultTags => TagKind::Default,
        SettingKind::ForceTags => TagKind::Forced,
        _ => TagKind::Own,
    }
}

/// The tags a tags setting shows, inherited ones included.
pub(crate) fn effective_tags<S: RecordStore>(store: &S, setting: &Setting) -> Result<Vec<Tag>> {
    let own = match &setting.value {
        SettingValue::Tags(own) => own.clone(),
        _ => None,
    };

    match setting.kind {
        SettingKind::DefaultTags => Ok(own
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, name)| Tag::default_tag(name, index, setting.id))
            .collect()),
        SettingKind::ForceTags => owner::force_tags(store, &setting.owner),
        _ => {
            let mut tags = owner::force_tags(store, &setting.owner)?;
            match own {
                None => tags.extend(owner::default_tags(store, &setting.owner)?),
                Some(names) if names.is_empty() => tags.push(Tag::own("", None, setting.id)),
                Some(names) => tags.extend(
                    names
                        .into_iter()
                        .enumerate()
                        .map(|(index, name)| Tag::own(name, Some(index), setting.id)),
                ),
            }
            Ok(tags)
        }
    }
}

/// Controller for `[Tags]`, `Default Tags` and `Force Tags` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagsController {
    setting: SettingController,
}

impl TagsController {
    pub fn new<S: RecordStore>(store: &S, id: &SettingId) -> Result<Self> {
        let setting = SettingController::new(store, id)?;
        if !setting.kind().is_tags() {
            return Err(SuiteError::Store(format!(
                "Setting '{}' does not hold tags",
                setting.label()
            )));
        }
        Ok(Self { setting })
    }

    pub fn setting(&self) -> &SettingController {
        &self.setting
    }

    pub fn kind(&self) -> SettingKind {
        self.setting.kind()
    }

    /// Effective tags, forced ones first.
    pub fn tags<S: RecordStore>(&self, store: &S) -> Result<Vec<Tag>> {
        effective_tags(store, &self.setting.record(store)?)
    }

    pub fn is_set<S: RecordStore>(&self, store: &S) -> Result<bool> {
        self.setting.is_set(store)
    }

    pub fn value<S: RecordStore>(&self, store: &S) -> Result<String> {
        self.setting.value(store)
    }

    pub fn display_value<S: RecordStore>(&self, store: &S) -> Result<String> {
        self.setting.display_value(store)
    }

    pub fn set_value<S: RecordStore>(&self, store: &mut S, value: &str) -> Result<EditResult> {
        self.setting.set_value(store, value)
    }

    pub fn empty_tag(&self) -> Tag {
        Tag::placeholder(tag_kind_for(self.kind()), self.setting.id())
    }

    fn own_names<S: RecordStore>(&self, store: &S) -> Result<Option<Vec<String>>> {
        match self.setting.record(store)?.value {
            SettingValue::Tags(own) => Ok(own),
            _ => Ok(None),
        }
    }

    /// Appends a tag, initializing an unset setting. Returns the stored tag.
    pub fn add<S: RecordStore>(&self, store: &mut S, name: &str) -> Result<Tag> {
        let mut setting = self.setting.record(store)?;
        let SettingValue::Tags(own) = &mut setting.value else {
            return Err(SuiteError::Store(format!(
                "Setting '{}' does not hold tags",
                self.setting.label()
            )));
        };
        let names = own.get_or_insert_with(Vec::new);
        let index = names.len();
        names.push(name.to_string());
        store.save_setting(&setting)?;
        owner::mark_dirty(store, &self.setting.owner())?;
        tracing::debug!("Tag '{}' added to '{}'", name, self.setting.label());

        let mut tag = Tag::own(name, Some(index), self.setting.id());
        tag.kind = tag_kind_for(self.kind());
        Ok(tag)
    }

    fn write_names<S: RecordStore>(&self, store: &mut S, names: &[String]) -> Result<EditResult> {
        let mut result = self.setting.set_value(store, &text::join_escaped(names))?;
        if result.changed {
            result.notify(self.setting.notify_value_changed());
        }
        Ok(result)
    }

    /// Renames `tag`. A tag stored in this setting is replaced in place, or
    /// removed when `new_name` is blank; any other tag (inherited or the
    /// placeholder) adds `new_name` as a new own tag.
    pub fn change_tag<S: RecordStore>(
        &self,
        store: &mut S,
        tag: &Tag,
        new_name: &str,
    ) -> Result<EditResult> {
        let mut names = self.own_names(store)?.unwrap_or_default();
        let new_name = new_name.trim();
        let stored_here = tag.controller == self.setting.id() && !tag.is_empty();

        match tag.index.filter(|i| stored_here && *i < names.len()) {
            Some(index) if new_name.is_empty() => {
                names.remove(index);
            }
            Some(index) => names[index] = new_name.to_string(),
            None if new_name.is_empty() => return Ok(EditResult::unchanged()),
            None => names.push(new_name.to_string()),
        }
        self.write_names(store, &names)
    }

    /// Removes a tag stored in this setting. Inherited tags cannot be removed here.
    pub fn remove_tag<S: RecordStore>(&self, store: &mut S, tag: &Tag) -> Result<EditResult> {
        let mut names = self.own_names(store)?.unwrap_or_default();
        match tag.index {
            Some(index) if tag.controller == self.setting.id() && index < names.len() => {
                names.remove(index);
                self.write_names(store, &names)
            }
            _ => Ok(EditResult::unchanged()),
        }
    }

    /// Compares the stored tags of two settings. An absent counterpart is
    /// never equal.
    pub fn equals<S: RecordStore>(
        &self,
        store: &S,
        other: Option<&TagsController>,
    ) -> Result<bool> {
        let Some(other) = other else {
            return Ok(false);
        };
        if self.setting.id() == other.setting.id() {
            return Ok(true);
        }
        if self.kind() != other.kind() {
            return Ok(false);
        }
        Ok(self.own_names(store)? == other.own_names(store)?)
    }
}

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

pub type EntityId = Uuid;
pub type SettingId = Uuid;
pub type ImportId = Uuid;
pub type VariableId = Uuid;

/// Marker separating library arguments from the library alias.
pub const ALIAS_MARKER: &str = "WITH NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Directory suite, backed by an initialization file.
    Directory,
    /// Test case file.
    Suite,
    Resource,
    TestCase,
    Keyword,
}

impl EntityKind {
    pub fn is_datafile(self) -> bool {
        matches!(
            self,
            EntityKind::Directory | EntityKind::Suite | EntityKind::Resource
        )
    }
}

/// A node of the suite hierarchy: a data file, or a test/keyword inside one.
///
/// `parent` is a handle, not an owning link. Tests and keywords point at
/// their data file; data files point at the enclosing directory suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    pub source: Option<String>,
    pub parent: Option<EntityId>,
    pub dirty: bool,
    pub settings: Vec<SettingId>,
    pub imports: Vec<ImportId>,
    pub variables: Vec<VariableId>,
}

impl Entity {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            source: None,
            parent: None,
            dirty: false,
            settings: Vec::new(),
            imports: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Trailing comment of a record. Always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comment(String);

impl Comment {
    /// Normalizes raw editor input. Blank input means "no comment".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    /// The token this comment occupies in the positional form.
    pub fn as_token(&self) -> String {
        if self.0.starts_with('#') {
            self.0.clone()
        } else {
            format!("# {}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKind {
    Documentation,
    Fixture,
    Tags,
    DefaultTags,
    ForceTags,
    Timeout,
    Template,
    Arguments,
    ReturnValue,
    Metadata,
}

impl SettingKind {
    pub fn initial_value(self) -> SettingValue {
        match self {
            SettingKind::Documentation | SettingKind::Template => SettingValue::Text(String::new()),
            SettingKind::Fixture => SettingValue::Fixture {
                name: String::new(),
                args: Vec::new(),
            },
            SettingKind::Tags | SettingKind::DefaultTags | SettingKind::ForceTags => {
                SettingValue::Tags(None)
            }
            SettingKind::Timeout => SettingValue::Timeout {
                value: String::new(),
                message: String::new(),
            },
            SettingKind::Arguments | SettingKind::ReturnValue => SettingValue::List(Vec::new()),
            SettingKind::Metadata => SettingValue::Metadata {
                name: String::new(),
                value: String::new(),
            },
        }
    }

    pub fn is_tags(self) -> bool {
        matches!(
            self,
            SettingKind::Tags | SettingKind::DefaultTags | SettingKind::ForceTags
        )
    }
}

/// Parsed value of a setting. The shape is fixed by the setting's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Text(String),
    Fixture { name: String, args: Vec<String> },
    /// `None` is "not set", `Some(vec![])` is "explicitly no tags".
    Tags(Option<Vec<String>>),
    Timeout { value: String, message: String },
    List(Vec<String>),
    Metadata { name: String, value: String },
}

impl SettingValue {
    /// Value tokens as they follow the setting marker.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            SettingValue::Text(text) => {
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text.clone()]
                }
            }
            SettingValue::Fixture { name, args } => {
                let mut tokens = Vec::new();
                if !name.is_empty() || !args.is_empty() {
                    tokens.push(name.clone());
                }
                tokens.extend(args.iter().cloned());
                tokens
            }
            SettingValue::Tags(tags) => tags.clone().unwrap_or_default(),
            SettingValue::Timeout { value, message } => {
                let mut tokens = Vec::new();
                if !value.is_empty() || !message.is_empty() {
                    tokens.push(value.clone());
                }
                if !message.is_empty() {
                    tokens.push(message.clone());
                }
                tokens
            }
            SettingValue::List(items) => items.clone(),
            SettingValue::Metadata { name, value } => vec![name.clone(), value.clone()],
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            SettingValue::Text(text) => !text.is_empty(),
            SettingValue::Fixture { name, .. } => !name.is_empty(),
            SettingValue::Tags(tags) => tags.is_some(),
            SettingValue::Timeout { value, .. } => !value.is_empty(),
            SettingValue::List(items) => !items.is_empty(),
            SettingValue::Metadata { name, .. } => !name.is_empty(),
        }
    }
}

/// One setting row of an entity, e.g. `[Setup]` of a test or `Force Tags` of a suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub id: SettingId,
    pub owner: EntityId,
    pub kind: SettingKind,
    pub setting_name: String,
    pub value: SettingValue,
    pub comment: Option<Comment>,
}

impl Setting {
    pub fn new(owner: EntityId, kind: SettingKind, setting_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            kind,
            setting_name: setting_name.into(),
            value: kind.initial_value(),
            comment: None,
        }
    }

    pub fn with_value(mut self, value: SettingValue) -> Self {
        self.value = value;
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Comment::parse(comment);
        self
    }

    /// Positional form: marker, value tokens, then the comment token if any.
    pub fn as_list(&self) -> Vec<String> {
        let mut list = vec![self.setting_name.clone()];
        list.extend(self.value.tokens());
        if let Some(comment) = &self.comment {
            list.push(comment.as_token());
        }
        list
    }

    pub fn is_set(&self) -> bool {
        self.value.is_set()
    }

    /// Restores the initial value. The comment is left as is.
    pub fn reset(&mut self) {
        self.value = self.kind.initial_value();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub owner: EntityId,
    pub name: String,
    pub value: Vec<String>,
    pub comment: Option<Comment>,
}

impl Variable {
    pub fn new(owner: EntityId, name: impl Into<String>, value: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name: name.into(),
            value,
            comment: None,
        }
    }

    pub fn as_list(&self) -> Vec<String> {
        let mut list = vec![self.name.clone()];
        list.extend(self.value.iter().cloned());
        if let Some(comment) = &self.comment {
            list.push(comment.as_token());
        }
        list
    }
}

// Records compare by content so that two handles onto equal rows match.
impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.value.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportType {
    Resource,
    Library,
    Variables,
}

impl ImportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Resource => "Resource",
            ImportType::Library => "Library",
            ImportType::Variables => "Variables",
        }
    }
}

impl std::fmt::Display for ImportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub id: ImportId,
    pub owner: EntityId,
    pub import_type: ImportType,
    pub name: String,
    pub args: Vec<String>,
    pub alias: Option<String>,
    pub comment: Option<Comment>,
}

impl Import {
    pub fn new(owner: EntityId, import_type: ImportType, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            import_type,
            name: name.into(),
            args: Vec::new(),
            alias: None,
            comment: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.alias = if alias.is_empty() { None } else { Some(alias) };
        self
    }

    pub fn as_list(&self) -> Vec<String> {
        self.as_list_with_marker(ALIAS_MARKER)
    }

    /// Like [`Import::as_list`], writing `alias_marker` before the alias.
    pub fn as_list_with_marker(&self, alias_marker: &str) -> Vec<String> {
        let mut list = vec![self.import_type.to_string(), self.name.clone()];
        list.extend(self.args.iter().cloned());
        if let Some(alias) = &self.alias {
            list.push(alias_marker.to_string());
            list.push(alias.clone());
        }
        if let Some(comment) = &self.comment {
            list.push(comment.as_token());
        }
        list
    }
}

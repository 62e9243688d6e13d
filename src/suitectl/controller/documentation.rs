use crate::controller::setting::SettingController;
use crate::controller::EditResult;
use crate::error::{Result, SuiteError};
use crate::model::{SettingId, SettingKind};
use crate::store::RecordStore;
use crate::text;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Escaped newline sequences in stored documentation, applied in this order.
static NEWLINE_ESCAPES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(\\+)r\\n").expect("valid crlf regex"),
        Regex::new(r"(\\+)n").expect("valid lf regex"),
        Regex::new(r"(\\+)r").expect("valid cr regex"),
    ]
});

/// An odd run of backslashes escapes the newline; an even run is a literal
/// backslash followed by a plain letter.
fn replace_newline(caps: &Captures) -> String {
    let backslashes = caps[1].len();
    if backslashes % 2 == 1 {
        format!("{}\n", "\\".repeat(backslashes - 1))
    } else {
        caps[0].to_string()
    }
}

fn unescape_newlines(stored: &str) -> String {
    NEWLINE_ESCAPES
        .iter()
        .fold(stored.to_string(), |item, regex| {
            regex.replace_all(&item, replace_newline).into_owned()
        })
}

fn escape_newlines(edited: &str) -> String {
    let mut item = edited.to_string();
    for newline in ["\r\n", "\n", "\r"] {
        item = item.replace(newline, "\\n");
    }
    // A leading hash would otherwise be read back as a comment.
    if item.trim().starts_with('#') {
        item.insert(0, '\\');
    }
    item
}

/// Documentation of a test, keyword or data file.
///
/// The stored text keeps newlines escaped as `\n`; the editor works on the
/// multi-line [`editable_value`](Self::editable_value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationController {
    setting: SettingController,
}

impl DocumentationController {
    pub fn new<S: RecordStore>(store: &S, id: &SettingId) -> Result<Self> {
        let setting = SettingController::new(store, id)?;
        if setting.kind() != SettingKind::Documentation {
            return Err(SuiteError::Store(format!(
                "Setting '{}' is not documentation",
                setting.label()
            )));
        }
        Ok(Self { setting })
    }

    pub fn setting(&self) -> &SettingController {
        &self.setting
    }

    /// The stored text as-is.
    pub fn value<S: RecordStore>(&self, store: &S) -> Result<String> {
        self.setting.value(store)
    }

    pub fn editable_value<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(unescape_newlines(&self.value(store)?))
    }

    pub fn set_editable_value<S: RecordStore>(
        &self,
        store: &mut S,
        value: &str,
    ) -> Result<EditResult> {
        self.setting.set_value(store, &escape_newlines(value))
    }

    pub fn set_value<S: RecordStore>(&self, store: &mut S, value: &str) -> Result<EditResult> {
        self.setting.set_value(store, value)
    }

    /// HTML rendering for read-only views.
    pub fn visible_value<S: RecordStore>(&self, store: &S) -> Result<String> {
        Ok(text::html_escape(&text::unescape(&self.value(store)?), true))
    }
}

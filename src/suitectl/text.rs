//! # Text Rules
//!
//! The small string grammars shared by every controller:
//!
//! - the pipe-separated edit form (`a | b\|c`), see [`split_value`] and [`join_escaped`]
//! - loose name equality for keyword lookups, see [`eq`]
//! - backslash escapes of the test data format, see [`unescape`]
//! - HTML rendering of documentation, see [`html_escape`]

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const SEPARATOR: &str = " | ";

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(?:https?|ftp|file)://[^\s<>"]+"#).expect("valid url regex"));
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b_([^_\s](?:[^_]*[^_\s])?)_\b").expect("valid italic regex"));

/// Splits the edit form into tokens.
///
/// Splits on `|`, except where the pipe is escaped as `\|`, in which case the
/// pipe is kept literally. Every token is trimmed. Blank input yields no tokens.
///
/// ```
/// use suitectl::text::split_value;
///
/// assert_eq!(split_value("a | b"), vec!["a", "b"]);
/// assert_eq!(split_value(r"a\|b | c"), vec!["a|b", "c"]);
/// assert!(split_value("").is_empty());
/// ```
pub fn split_value(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    if !value.contains('\\') {
        return value.split('|').map(|v| v.trim().to_string()).collect();
    }

    let mut tokens = Vec::new();
    let mut pending = String::new();
    for part in value.split('|') {
        if let Some(head) = part.strip_suffix('\\') {
            pending.push_str(head);
            pending.push('|');
        } else {
            pending.push_str(part);
            tokens.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        // Trailing backslash with no pipe after it: keep it as typed.
        pending.pop();
        pending.push('\\');
        tokens.push(pending);
    }
    tokens.into_iter().map(|v| v.trim().to_string()).collect()
}

/// Splits at the first unescaped `|` only. Both parts are trimmed and have
/// `\|` resolved; the second part is empty when there is no separator.
///
/// ```
/// use suitectl::text::split_first;
///
/// assert_eq!(split_first(r"5s | a\|b | c"), ("5s".to_string(), "a|b | c".to_string()));
/// assert_eq!(split_first("5s"), ("5s".to_string(), String::new()));
/// ```
pub fn split_first(value: &str) -> (String, String) {
    let mut prev = None;
    let split_at = value.char_indices().find_map(|(i, c)| {
        let found = c == '|' && prev != Some('\\');
        prev = Some(c);
        found.then_some(i)
    });
    let (head, tail) = match split_at {
        Some(i) => (&value[..i], &value[i + 1..]),
        None => (value, ""),
    };
    (unescape_pipes(head.trim()), unescape_pipes(tail.trim()))
}

/// Resolves `\|` to `|`, leaving other backslashes alone.
pub fn unescape_pipes(token: &str) -> String {
    token.replace("\\|", "|")
}

pub fn escape_pipes(token: &str) -> String {
    token.replace('|', "\\|")
}

/// Inverse of [`split_value`] for tokens without surrounding whitespace.
pub fn join_escaped<I, T>(tokens: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| escape_pipes(t.as_ref()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Lowercases and drops all whitespace.
pub fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Like [`normalize`] but also ignores underscores, the way variable names match.
pub fn normalize_name(value: &str) -> String {
    normalize(value).replace('_', "")
}

/// Case and whitespace insensitive equality.
pub fn eq(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn is_var(name: &str) -> bool {
    let length = name.len();
    length > 3
        && (name.starts_with('$') || name.starts_with('@'))
        && name.rfind('{') == Some(1)
        && name.find('}') == Some(length - 1)
}

pub fn is_scalar_variable(name: &str) -> bool {
    is_var(name) && name.starts_with('$')
}

pub fn is_list_variable(name: &str) -> bool {
    is_var(name) && name.starts_with('@')
}

/// Resolves backslash escapes: `\n`, `\r`, `\t`, `\xHH`, `\uHHHH`,
/// `\UHHHHHHHH`; any other escaped character stands for itself.
pub fn unescape(item: &str) -> String {
    if !item.contains('\\') {
        return item.to_string();
    }
    let chars: Vec<char> = item.chars().collect();
    let mut out = String::with_capacity(item.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let Some(&next) = chars.get(i + 1) else {
            out.push('\\');
            break;
        };
        i += 2;
        match next {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                match decode_hex(&chars, i, width) {
                    Some(decoded) => {
                        out.push(decoded);
                        i += width;
                    }
                    None => out.push(next),
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn decode_hex(chars: &[char], start: usize, width: usize) -> Option<char> {
    let digits: String = chars.get(start..start + width)?.iter().collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
}

fn escape_html_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_plain(text: &str) -> String {
    let escaped = escape_html_chars(text);
    let bold = BOLD.replace_all(&escaped, |caps: &Captures| format!("<b>{}</b>", &caps[1]));
    ITALIC
        .replace_all(&bold, |caps: &Captures| format!("<i>{}</i>", &caps[1]))
        .into_owned()
}

/// HTML-escapes `text`. With `formatting`, also renders `*bold*`,
/// `_italic_`, bare URLs as links and newlines as `<br>`.
pub fn html_escape(text: &str, formatting: bool) -> String {
    if !formatting {
        return escape_html_chars(text);
    }
    text.split('\n')
        .map(|line| {
            let mut out = String::new();
            let mut last = 0;
            for url in URL.find_iter(line) {
                out.push_str(&format_plain(&line[last..url.start()]));
                let href = escape_html_chars(url.as_str());
                out.push_str(&format!("<a href=\"{href}\">{href}</a>"));
                last = url.end();
            }
            out.push_str(&format_plain(&line[last..]));
            out
        })
        .collect::<Vec<_>>()
        .join("<br>\n")
}

/// Replaces the extension of the last path segment with `extension`, lowercased.
pub fn replace_extension(path: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.').to_lowercase();
    let segment_start = path.rfind(&['/', '\\'][..]).map(|i| i + 1).unwrap_or(0);
    let segment = &path[segment_start..];
    let stem_len = match segment.trim_start_matches('.').rfind('.') {
        Some(dot) => segment.len() - segment.trim_start_matches('.').len() + dot,
        None => segment.len(),
    };
    format!("{}.{}", &path[..segment_start + stem_len], extension)
}

/// Extension of the last path segment, without the dot.
pub fn extension(path: &str) -> Option<&str> {
    let segment_start = path.rfind(&['/', '\\'][..]).map(|i| i + 1).unwrap_or(0);
    let segment = &path[segment_start..];
    let dot = segment.rfind('.')?;
    Some(&segment[dot + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_unescaped_pipes_and_trims() {
        assert_eq!(split_value(" a |b  | c "), vec!["a", "b", "c"]);
        assert_eq!(split_value(r"a\|b|c"), vec!["a|b", "c"]);
        assert_eq!(split_value(r"x\|"), vec!["x|"]);
    }

    #[test]
    fn blank_input_yields_no_tokens() {
        assert!(split_value("   ").is_empty());
    }

    #[test]
    fn split_first_skips_escaped_pipes() {
        assert_eq!(
            split_first(r"a\|b | c | d"),
            ("a|b".to_string(), "c | d".to_string())
        );
        assert_eq!(split_first(" | m "), (String::new(), "m".to_string()));
        assert_eq!(
            split_first(&join_escaped(["5s", "x|y"])),
            ("5s".to_string(), "x|y".to_string())
        );
    }

    #[test]
    fn keeps_empty_tokens_between_separators() {
        assert_eq!(split_value("a || b"), vec!["a", "", "b"]);
    }

    #[test]
    fn join_escapes_pipes_and_reparses() {
        let tokens = vec!["a|b".to_string(), "c".to_string()];
        let joined = join_escaped(&tokens);
        assert_eq!(joined, r"a\|b | c");
        assert_eq!(split_value(&joined), tokens);
    }

    #[test]
    fn eq_ignores_case_and_spaces() {
        assert!(eq("Log Many", "logmany"));
        assert!(eq("", ""));
        assert!(!eq("Log", "Log Many"));
    }

    #[test]
    fn classifies_variable_names() {
        assert!(is_scalar_variable("${foo}"));
        assert!(is_list_variable("@{foo}"));
        assert!(!is_scalar_variable("${}"));
        assert!(!is_scalar_variable("${foo"));
        assert!(!is_scalar_variable("@{foo}"));
    }

    #[test]
    fn unescapes_known_sequences() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"tab\there"), "tab\there");
        assert_eq!(unescape(r"\x41ä"), "Aä");
        assert_eq!(unescape(r"\\n"), r"\n");
        assert_eq!(unescape(r"\#comment"), "#comment");
        assert_eq!(unescape(r"\xZZ"), "xZZ");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn html_escape_formats_text() {
        assert_eq!(html_escape("<a> & b", false), "&lt;a&gt; &amp; b");
        assert_eq!(html_escape("*bold* text", true), "<b>bold</b> text");
        assert_eq!(html_escape("an _italic_ word", true), "an <i>italic</i> word");
        assert_eq!(html_escape("keep snake_case_name", true), "keep snake_case_name");
        assert_eq!(html_escape("one\ntwo", true), "one<br>\ntwo");
        assert_eq!(
            html_escape("see http://x.org/a now", true),
            "see <a href=\"http://x.org/a\">http://x.org/a</a> now"
        );
    }

    #[test]
    fn replaces_extension_of_last_segment() {
        assert_eq!(replace_extension("res/common.html", "TXT"), "res/common.txt");
        assert_eq!(replace_extension("common", ".tsv"), "common.tsv");
        assert_eq!(replace_extension("dir.v1/common", "txt"), "dir.v1/common.txt");
        assert_eq!(extension("dir.v1/common.TSV"), Some("TSV"));
        assert_eq!(extension("dir.v1/common"), None);
    }
}

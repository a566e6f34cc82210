//! Placeholder scanning over raw WordprocessingML markup
//!
//! Two independent syntaxes name an insertion point in a template:
//!
//! - inline tags delimited by double braces, `{{ Nombre }}`
//! - legacy `MERGEFIELD` field codes, either as `<w:fldSimple w:instr="...">`
//!   or as complex fields built from `<w:fldChar>` / `<w:instrText>` runs
//!
//! The scanners here work on the XML text directly. They never fail: markup
//! they cannot make sense of simply yields no tags.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

fn inline_re() -> &'static Regex {
    static INLINE_RE: OnceLock<Regex> = OnceLock::new();
    INLINE_RE.get_or_init(|| Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("inline tag regex"))
}

fn split_inline_re() -> &'static Regex {
    static SPLIT_RE: OnceLock<Regex> = OnceLock::new();
    SPLIT_RE.get_or_init(|| {
        // Braces and tag text interleaved with run markup: `{</w:t>...<w:t>{ name }</w:t>...}`
        Regex::new(r"\{(?:<[^>]*>)*\{((?:[^{}<]|<[^>]*>)*?)\}(?:<[^>]*>)*\}")
            .expect("split inline tag regex")
    })
}

fn markup_re() -> &'static Regex {
    static MARKUP_RE: OnceLock<Regex> = OnceLock::new();
    MARKUP_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("markup regex"))
}

fn merge_field_re() -> &'static Regex {
    static MERGE_RE: OnceLock<Regex> = OnceLock::new();
    MERGE_RE.get_or_init(|| Regex::new(r"(?i)MERGEFIELD\s+(.+)").expect("mergefield regex"))
}

pub(crate) fn simple_field_re() -> &'static Regex {
    static SIMPLE_RE: OnceLock<Regex> = OnceLock::new();
    SIMPLE_RE.get_or_init(|| {
        Regex::new(r#"(?is)<w:fldSimple\b[^>]*?w:instr="([^"]*)"[^>]*?(?:/>|>.*?</w:fldSimple>)"#)
            .expect("fldSimple regex")
    })
}

fn instr_text_re() -> &'static Regex {
    static INSTR_RE: OnceLock<Regex> = OnceLock::new();
    INSTR_RE.get_or_init(|| {
        Regex::new(r"(?i)<w:instrText\b[^>]*>([^<]+)</w:instrText>").expect("instrText regex")
    })
}

fn field_token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r#"(?i)<w:fldChar\b[^>]*w:fldCharType="(begin|separate|end)"[^>]*>|<w:instrText\b[^>]*>([^<]*)</w:instrText>"#,
        )
        .expect("field token regex")
    })
}

/// Rejoin inline tags that Word split across several runs.
///
/// `{{` and `}}` often end up in separate `<w:t>` elements because of
/// spell-check or formatting boundaries. The markup found between the two
/// delimiters is dropped so the tag becomes contiguous text again. Tags that
/// are already contiguous are returned untouched.
pub fn merge_split_placeholders(xml: &str) -> Cow<'_, str> {
    let has_split = split_inline_re()
        .find_iter(xml)
        .any(|m| m.as_str().contains('<'));
    if !has_split {
        return Cow::Borrowed(xml);
    }
    split_inline_re().replace_all(xml, |caps: &regex::Captures<'_>| {
        let inner = markup_re().replace_all(&caps[1], "");
        format!("{{{{{}}}}}", inner)
    })
}

/// Find every `{{ ... }}` tag in a part, trimmed, in first-seen order.
///
/// Tags whose content contains a brace are not tags.
pub fn inline_tags(xml: &str) -> Vec<String> {
    let merged = merge_split_placeholders(xml);
    let mut tags: Vec<String> = Vec::new();
    for caps in inline_re().captures_iter(&merged) {
        let tag = caps[1].trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Visit every `{{ ... }}` tag in a part, letting the caller choose the replacement
pub(crate) fn replace_inline_tags<F>(xml: &str, mut replacement: F) -> String
where
    F: FnMut(&str) -> String,
{
    inline_re()
        .replace_all(xml, |caps: &regex::Captures<'_>| replacement(caps[1].trim()))
        .into_owned()
}

/// Extract the field name from a field instruction such as
/// ` MERGEFIELD  "Fecha Nac" \* MERGEFORMAT `.
///
/// Returns `None` when the instruction is not a MERGEFIELD or names nothing.
pub fn merge_field_name(instruction: &str) -> Option<String> {
    let instruction = quick_xml::escape::unescape(instruction)
        .unwrap_or(Cow::Borrowed(instruction));
    let caps = merge_field_re().captures(&instruction)?;
    let rest = caps[1].trim();
    let before_switch = rest.split('\\').next().unwrap_or_default();
    let name = before_switch.replace('"', "");
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Field names referenced by MERGEFIELD codes in a part.
///
/// The simple-field scan, the per-run `instrText` scan and the complex-field
/// scan are concatenated in that order; duplicates are kept.
pub fn field_tags(xml: &str) -> Vec<String> {
    let mut found = Vec::new();

    for caps in simple_field_re().captures_iter(xml) {
        found.extend(merge_field_name(&caps[1]));
    }

    for caps in instr_text_re().captures_iter(xml) {
        found.extend(merge_field_name(&caps[1]));
    }

    for field in complex_fields(xml) {
        found.extend(field.name);
    }

    found
}

/// A complex field located in a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComplexField {
    /// Byte range from the start of the run holding `fldChar begin` to the
    /// end of the run holding the matching `fldChar end`
    pub range: Range<usize>,
    /// MERGEFIELD name, if the instruction is a MERGEFIELD
    pub name: Option<String>,
    /// Number of enclosing fields
    pub depth: usize,
}

/// A field whose `end` has not been seen yet
struct OpenField {
    begin: usize,
    instruction: Vec<String>,
    in_code: bool,
}

/// Locate complex fields, ordered by start position.
///
/// `begin` and `end` markers are paired by nesting depth, so a MERGEFIELD
/// inside an `IF` field is reported with its own span and the outer field
/// keeps all of its markers. Instruction text belongs to the innermost open
/// field and may be split over several runs. Unterminated fields are ignored.
pub(crate) fn complex_fields(xml: &str) -> Vec<ComplexField> {
    let mut fields = Vec::new();
    let mut open: Vec<OpenField> = Vec::new();

    for caps in field_token_re().captures_iter(xml) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        if let Some(text) = caps.get(2) {
            if let Some(field) = open.last_mut().filter(|f| f.in_code) {
                field.instruction.push(text.as_str().to_string());
            }
            continue;
        }

        match caps.get(1).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
            Some("begin") => open.push(OpenField {
                begin: whole.start(),
                instruction: Vec::new(),
                in_code: true,
            }),
            Some("separate") => {
                if let Some(field) = open.last_mut() {
                    field.in_code = false;
                }
            }
            Some("end") => {
                let Some(field) = open.pop() else {
                    continue;
                };
                let start = run_start_before(xml, field.begin).unwrap_or(field.begin);
                let end = run_end_after(xml, whole.end()).unwrap_or(whole.end());
                let name = if field.instruction.is_empty() {
                    None
                } else {
                    merge_field_name(&field.instruction.join(" "))
                };
                fields.push(ComplexField {
                    range: start..end,
                    name,
                    depth: open.len(),
                });
            }
            _ => {}
        }
    }

    fields.sort_by_key(|field| field.range.start);
    fields
}

fn run_start_before(xml: &str, pos: usize) -> Option<usize> {
    let head = &xml[..pos];
    let plain = head.rfind("<w:r>");
    let with_attrs = head.rfind("<w:r ");
    let start = plain.max(with_attrs)?;
    // A closed run in between means the fldChar is not inside that run
    if head[start..].contains("</w:r>") {
        None
    } else {
        Some(start)
    }
}

fn run_end_after(xml: &str, pos: usize) -> Option<usize> {
    xml[pos..]
        .find("</w:r>")
        .map(|offset| pos + offset + "</w:r>".len())
}

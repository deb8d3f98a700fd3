//! Slide XML synthesis and deck manifest rewriting.
//!
//! A deck template is an Office Open XML presentation: a zip archive whose
//! parts are XML documents. This module contains the pure text-level logic
//! for producing one slide per name from the template's first slide and for
//! keeping the presentation root, relationship manifest, and content-types
//! manifest index-aligned with the generated slides.
//!
//! Edits are node-scoped: the placeholder and recognized phrases are
//! located inside `<a:t>` text elements, and the whole enclosing `<a:r>`
//! run is rewritten. All user-supplied text is XML-escaped before it is
//! spliced into a document.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Placeholder token in the template's first slide that is replaced by the
/// guest name.
pub const NAME_PLACEHOLDER: &str = "ИМЯ";

/// Fixed text fragments that are emboldened wherever they appear verbatim.
pub const BOLD_PHRASES: &[&str] = &["eyacademycca.com", "EY Academy", "Учись у лучших"];

/// Font size for names up to 10 characters, in hundredths of a point (56pt).
pub const FONT_SIZE_BASE: u32 = 5_600;

/// Size reduction applied per length bracket (8pt).
pub const FONT_SIZE_STEP: u32 = 800;

/// Floor size for very long names (32pt).
pub const FONT_SIZE_MIN: u32 = 3_200;

/// Relationship type URI for slide parts.
pub const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// Content type declared for slide parts in `[Content_Types].xml`.
pub const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Slide ids in `<p:sldIdLst>` start here (the format reserves ids below 256).
const FIRST_SLIDE_ID: usize = 256;

/// A `<a:t>` text element and its raw text content.
static TEXT_ELEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a:t>([^<]*)</a:t>").expect("valid regex"));

/// Run properties, either self-closing or paired.
static RUN_PROPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<a:rPr[^>]*/>|<a:rPr.*?</a:rPr>").expect("valid regex"));

/// A `b="..."` attribute inside run properties.
static BOLD_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bb="[^"]*""#).expect("valid regex"));

/// The slide list block in the presentation root.
static SLIDE_ID_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<p:sldIdLst>.*?</p:sldIdLst>|<p:sldIdLst/>").expect("valid regex")
});

/// An `r:id="rIdN"` reference attribute.
static R_ID_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"r:id="(rId[0-9]+)""#).expect("valid regex"));

/// A self-closing `<Relationship .../>` entry.
static RELATIONSHIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Relationship\b[^>]*/>").expect("valid regex"));

/// The `Id="..."` attribute of a relationship entry.
static REL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Id="([^"]+)""#).expect("valid regex"));

/// The `Type="..."` attribute of a relationship entry.
static REL_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Type="([^"]+)""#).expect("valid regex"));

/// The opening `<Relationships ...>` root tag.
static RELATIONSHIPS_ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<Relationships\b[^>]*>").expect("valid regex"));

/// A slide `<Override .../>` entry in `[Content_Types].xml`.
static SLIDE_OVERRIDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Override PartName="/ppt/slides/slide[0-9]+\.xml"[^>]*/>"#).expect("valid regex")
});

// ---------------------------------------------------------------------------
// Font sizing
// ---------------------------------------------------------------------------

/// Pick a font size for a name by its character count.
///
/// Deterministic and total: no locale- or glyph-width-aware measurement,
/// just length brackets. Sizes are in hundredths of a point.
pub fn font_size_for(name: &str) -> u32 {
    match name.chars().count() {
        0..=10 => FONT_SIZE_BASE,
        11..=15 => FONT_SIZE_BASE - FONT_SIZE_STEP,
        16..=20 => FONT_SIZE_BASE - 2 * FONT_SIZE_STEP,
        _ => FONT_SIZE_MIN,
    }
}

// ---------------------------------------------------------------------------
// XML text escaping
// ---------------------------------------------------------------------------

/// Escape text for inclusion in XML character data or attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Slide synthesis
// ---------------------------------------------------------------------------

/// Render one slide document for `name` from the template's first slide.
///
/// Replaces the name placeholder with a bold, size-adjusted run and
/// emboldens every verbatim occurrence of the recognized fixed phrases.
pub fn render_name_slide(template_xml: &str, name: &str) -> Result<String, CoreError> {
    let mut xml = replace_placeholder(template_xml, name)?;
    for phrase in BOLD_PHRASES {
        xml = embolden_phrase(&xml, phrase);
    }
    Ok(xml)
}

/// Replace the first occurrence of the name placeholder with a styled run.
///
/// The run containing the placeholder is rewritten; text before/after the
/// token inside that run is preserved in runs carrying the original
/// properties.
fn replace_placeholder(xml: &str, name: &str) -> Result<String, CoreError> {
    let name_run = format!(
        r#"<a:r><a:rPr lang="ru-RU" b="1" sz="{}" dirty="0"/><a:t>{}</a:t></a:r>"#,
        font_size_for(name),
        escape_xml(name)
    );

    for caps in TEXT_ELEMENT_RE.captures_iter(xml) {
        let element = caps.get(0).expect("whole match");
        let text = caps.get(1).expect("text group").as_str();
        let Some(token_at) = text.find(NAME_PLACEHOLDER) else {
            continue;
        };
        let (run_start, run_end) = find_run_bounds(xml, element.start()).ok_or_else(|| {
            CoreError::MalformedTemplate("name placeholder is not inside a text run".to_string())
        })?;
        let props = extract_run_properties(&xml[run_start..run_end]);

        let before = &text[..token_at];
        let after = &text[token_at + NAME_PLACEHOLDER.len()..];
        let mut replacement = String::new();
        if !before.is_empty() {
            replacement.push_str(&plain_run(props, before));
        }
        replacement.push_str(&name_run);
        if !after.is_empty() {
            replacement.push_str(&plain_run(props, after));
        }

        let mut out = String::with_capacity(xml.len() + replacement.len());
        out.push_str(&xml[..run_start]);
        out.push_str(&replacement);
        out.push_str(&xml[run_end..]);
        return Ok(out);
    }

    Err(CoreError::MalformedTemplate(format!(
        "name placeholder '{NAME_PLACEHOLDER}' not found in slide template"
    )))
}

/// Embolden every verbatim occurrence of `phrase` in the document's text
/// elements.
///
/// Matching is exact-string, case-sensitive, non-overlapping. Each matching
/// run is split into segments; matched segments get the run's properties
/// with `b="1"` forced, the rest keep the original properties.
pub fn embolden_phrase(xml: &str, phrase: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some((run_start, run_end, replacement)) = next_phrase_run(rest, phrase) {
        out.push_str(&rest[..run_start]);
        out.push_str(&replacement);
        rest = &rest[run_end..];
    }
    out.push_str(rest);
    out
}

/// Find the next run whose text contains `phrase` and build its rewritten
/// form. Returns the run's byte bounds and the replacement markup.
fn next_phrase_run(xml: &str, phrase: &str) -> Option<(usize, usize, String)> {
    for caps in TEXT_ELEMENT_RE.captures_iter(xml) {
        let element = caps.get(0).expect("whole match");
        let text = caps.get(1).expect("text group").as_str();
        if !text.contains(phrase) {
            continue;
        }
        // A text element outside any run is left untouched.
        let Some((run_start, run_end)) = find_run_bounds(xml, element.start()) else {
            continue;
        };
        let props = extract_run_properties(&xml[run_start..run_end]);
        let bold_props = bold_run_properties(props);

        let segments: Vec<&str> = text.split(phrase).collect();
        let mut replacement = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                replacement.push_str(&format!("<a:r>{bold_props}<a:t>{phrase}</a:t></a:r>"));
            }
            if !segment.is_empty() {
                replacement.push_str(&plain_run(props, segment));
            }
        }
        return Some((run_start, run_end, replacement));
    }
    None
}

/// Byte bounds of the `<a:r>...</a:r>` run enclosing position `pos`.
fn find_run_bounds(xml: &str, pos: usize) -> Option<(usize, usize)> {
    let head = &xml[..pos];
    let open_plain = head.rfind("<a:r>");
    let open_attrs = head.rfind("<a:r ");
    let start = match (open_plain, open_attrs) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };
    let end = xml[pos..].find("</a:r>")? + pos + "</a:r>".len();
    Some((start, end))
}

/// The run's `<a:rPr .../>` (or paired `<a:rPr>...</a:rPr>`) block, if any.
fn extract_run_properties(run: &str) -> Option<&str> {
    RUN_PROPS_RE.find(run).map(|m| m.as_str())
}

/// Run properties with bold emphasis forced on.
fn bold_run_properties(props: Option<&str>) -> String {
    match props {
        None => r#"<a:rPr b="1"/>"#.to_string(),
        Some(props) => {
            if BOLD_ATTR_RE.is_match(props) {
                BOLD_ATTR_RE.replace(props, r#"b="1""#).into_owned()
            } else {
                props.replacen("<a:rPr", r#"<a:rPr b="1""#, 1)
            }
        }
    }
}

/// A run with the given (optional) properties and raw text.
fn plain_run(props: Option<&str>, text: &str) -> String {
    format!("<a:r>{}<a:t>{text}</a:t></a:r>", props.unwrap_or(""))
}

// ---------------------------------------------------------------------------
// Manifest rewriting
// ---------------------------------------------------------------------------

/// File name of the generated slide at 1-based `index`.
pub fn slide_filename(index: usize) -> String {
    format!("slide{index}.xml")
}

/// A fresh `<p:sldIdLst>` block with one entry per generated slide, in
/// order, with sequential slide ids and relationship ids `rId1..rIdN`.
pub fn slide_id_list_xml(count: usize) -> String {
    let mut out = String::from("<p:sldIdLst>");
    for i in 1..=count {
        out.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{i}"/>"#,
            FIRST_SLIDE_ID + i - 1
        ));
    }
    out.push_str("</p:sldIdLst>");
    out
}

/// Rewrite the root relationship manifest for `count` generated slides.
///
/// Existing slide relationships are discarded. Slides take `rId1..rIdN` in
/// slide order; every other relationship keeps its tag verbatim but is
/// renumbered to follow the slides. Returns the new document and the
/// old-id-to-new-id mapping for the renumbered entries, so references in
/// the presentation root can be fixed up.
pub fn rewrite_relationships_xml(
    xml: &str,
    count: usize,
) -> Result<(String, HashMap<String, String>), CoreError> {
    let root_open = RELATIONSHIPS_ROOT_RE
        .find(xml)
        .ok_or_else(|| {
            CoreError::MalformedTemplate(
                "relationship manifest has no <Relationships> root".to_string(),
            )
        })?
        .as_str();

    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push_str(root_open);
    for i in 1..=count {
        out.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="{SLIDE_REL_TYPE}" Target="slides/{}"/>"#,
            slide_filename(i)
        ));
    }

    let mut remap = HashMap::new();
    let mut next = count + 1;
    for entry in RELATIONSHIP_RE.find_iter(xml) {
        let tag = entry.as_str();
        let is_slide = REL_TYPE_RE
            .captures(tag)
            .is_some_and(|c| &c[1] == SLIDE_REL_TYPE);
        if is_slide {
            continue;
        }
        let old_id = REL_ID_RE
            .captures(tag)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                CoreError::MalformedTemplate("relationship entry without an Id".to_string())
            })?;
        let new_id = format!("rId{next}");
        next += 1;
        out.push_str(&REL_ID_RE.replace(tag, format!(r#"Id="{new_id}""#).as_str()));
        remap.insert(old_id, new_id);
    }
    out.push_str("</Relationships>");
    Ok((out, remap))
}

/// Rewrite the presentation root for `count` generated slides.
///
/// Non-slide relationship references (`r:id`) are renumbered per `remap`,
/// then the existing slide list block is replaced wholesale by a freshly
/// generated one.
pub fn rewrite_presentation_xml(
    xml: &str,
    count: usize,
    remap: &HashMap<String, String>,
) -> Result<String, CoreError> {
    if !SLIDE_ID_LIST_RE.is_match(xml) {
        return Err(CoreError::MalformedTemplate(
            "presentation root has no <p:sldIdLst> block".to_string(),
        ));
    }
    // Single pass, so renumbered ids are never themselves rewritten again.
    let remapped = R_ID_REF_RE.replace_all(xml, |caps: &regex::Captures<'_>| {
        match remap.get(&caps[1]) {
            Some(new_id) => format!(r#"r:id="{new_id}""#),
            None => caps[0].to_string(),
        }
    });
    let out = SLIDE_ID_LIST_RE.replace(&remapped, slide_id_list_xml(count).as_str());
    Ok(out.into_owned())
}

/// Rewrite `[Content_Types].xml` to declare exactly `count` slide parts.
pub fn rewrite_content_types_xml(xml: &str, count: usize) -> Result<String, CoreError> {
    let stripped = SLIDE_OVERRIDE_RE.replace_all(xml, "");
    let close = stripped.rfind("</Types>").ok_or_else(|| {
        CoreError::MalformedTemplate("content types manifest has no </Types> close tag".to_string())
    })?;
    let mut overrides = String::new();
    for i in 1..=count {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/{}" ContentType="{SLIDE_CONTENT_TYPE}"/>"#,
            slide_filename(i)
        ));
    }
    let mut out = stripped.into_owned();
    out.insert_str(close, &overrides);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

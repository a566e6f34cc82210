//! Template rendering
//!
//! [`TemplateRenderer`] is the seam between the tag engine and the document
//! format: it receives a flat tag → string mapping and returns a filled
//! package. [`DocxRenderer`] is the WordprocessingML implementation:
//!
//! 1. split inline tags are rejoined (see [`merge_split_placeholders`])
//! 2. every `{{ tag }}` in a `word/*.xml` part is replaced by its value
//! 3. MERGEFIELD fields in `word/document.xml` become a plain run
//! 4. each rewritten part must still be well-formed XML
//!
//! Values are escaped for XML. Newlines become `<w:br/>` and tabs become
//! `<w:tab/>`, which keeps the row/column layout of range values visible.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::error::{OoxmlError, Result};
use crate::placeholders::{
    complex_fields, merge_field_name, merge_split_placeholders, replace_inline_tags,
    simple_field_re,
};
use crate::template::Template;

/// Flat mapping from tag name (as written in the template) to its text
pub type RenderContext = HashMap<String, String>;

/// Something that can fill a template from a render context
pub trait TemplateRenderer {
    /// Render the template, returning the filled package
    ///
    /// Fails when the template markup cannot be rendered; the template
    /// itself is never modified.
    fn render(&self, template: &Template, context: &RenderContext) -> Result<OoxmlArchive>;
}

/// Renderer for DOCX packages
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self
    }

    /// Render a single part's markup
    ///
    /// `fields` enables MERGEFIELD replacement, which only applies to the
    /// main document part.
    pub fn render_part(
        &self,
        part: &str,
        xml: &str,
        context: &RenderContext,
        fields: bool,
    ) -> Result<String> {
        let merged = merge_split_placeholders(xml);

        // Delimiters are checked on the template text; values may contain braces
        let stripped = replace_inline_tags(&merged, |_| String::new());
        if stripped.contains("{{") || stripped.contains("}}") {
            return Err(OoxmlError::TemplateSyntax {
                part: part.to_string(),
                message: "unbalanced '{{' / '}}' delimiters".to_string(),
            });
        }

        let mut rendered = replace_inline_tags(&merged, |tag| {
            run_text(context.get(tag).map(String::as_str).unwrap_or_default())
        });

        if fields {
            rendered = replace_simple_fields(&rendered, context);
            rendered = replace_complex_fields(&rendered, context);
        }

        check_well_formed(part, &rendered)?;
        Ok(rendered)
    }
}

impl TemplateRenderer for DocxRenderer {
    fn render(&self, template: &Template, context: &RenderContext) -> Result<OoxmlArchive> {
        let source = template.archive();
        // Surface a missing main part as an error before touching anything
        source.document_xml()?;

        let mut output = source.clone();
        for part in source.word_xml_parts() {
            let Some(xml) = source.get_string(part) else {
                continue;
            };
            let rendered = self.render_part(part, &xml, context, part == DOCUMENT_PART)?;
            if rendered != xml {
                output.set_string(part, rendered);
            }
        }

        tracing::debug!(entries = context.len(), "rendered template");
        Ok(output)
    }
}

/// Escape a value for use inside `<w:t>`, mapping newlines and tabs to
/// their WordprocessingML elements
fn run_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, line) in value.split('\n').enumerate() {
        if i > 0 {
            out.push_str(r#"</w:t><w:br/><w:t xml:space="preserve">"#);
        }
        for (j, cell) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str(r#"</w:t><w:tab/><w:t xml:space="preserve">"#);
            }
            out.push_str(&quick_xml::escape::escape(cell));
        }
    }
    out
}

fn field_run(value: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, run_text(value))
}

fn field_value<'a>(context: &'a RenderContext, name: &str) -> &'a str {
    context.get(name).map(String::as_str).unwrap_or_default()
}

fn replace_simple_fields(xml: &str, context: &RenderContext) -> String {
    simple_field_re()
        .replace_all(xml, |caps: &regex::Captures<'_>| match merge_field_name(&caps[1]) {
            Some(name) => field_run(field_value(context, &name)),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn replace_complex_fields(xml: &str, context: &RenderContext) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for field in complex_fields(xml) {
        // Fields inside an already replaced MERGEFIELD go with it
        if field.range.start < cursor {
            continue;
        }
        let Some(name) = field.name else {
            continue;
        };
        tracing::trace!(field = %name, depth = field.depth, "replacing merge field");
        out.push_str(&xml[cursor..field.range.start]);
        out.push_str(&field_run(field_value(context, &name)));
        cursor = field.range.end;
    }
    out.push_str(&xml[cursor..]);
    out
}

fn check_well_formed(part: &str, xml: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(source) => {
                return Err(OoxmlError::Xml {
                    part: part.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_template, document_xml};

    fn context(pairs: &[(&str, &str)]) -> RenderContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn render_body(body: &str, ctx: &RenderContext) -> Result<String> {
        DocxRenderer::new().render_part(DOCUMENT_PART, &document_xml(body), ctx, true)
    }

    #[test]
    fn test_inline_substitution() {
        let out = render_body(
            "<w:p><w:r><w:t>Paciente: {{ Nombre }}</w:t></w:r></w:p>",
            &context(&[("Nombre", "Ana")]),
        )
        .unwrap();
        assert!(out.contains("<w:t>Paciente: Ana</w:t>"));
    }

    #[test]
    fn test_missing_tag_renders_empty() {
        let out = render_body("<w:p><w:r><w:t>[{{Lote}}]</w:t></w:r></w:p>", &context(&[])).unwrap();
        assert!(out.contains("<w:t>[]</w:t>"));
    }

    #[test]
    fn test_values_are_escaped() {
        let out = render_body(
            "<w:p><w:r><w:t>{{Dosis}}</w:t></w:r></w:p>",
            &context(&[("Dosis", "<5 mg & más>")]),
        )
        .unwrap();
        assert!(out.contains("&lt;5 mg &amp; más&gt;"));
    }

    #[test]
    fn test_range_value_layout() {
        let out = render_body(
            "<w:p><w:r><w:t>{{Tabla}}</w:t></w:r></w:p>",
            &context(&[("Tabla", "1\t2\n3\t4")]),
        )
        .unwrap();
        assert!(out.contains(
            r#"<w:t>1</w:t><w:tab/><w:t xml:space="preserve">2</w:t><w:br/><w:t xml:space="preserve">3</w:t><w:tab/><w:t xml:space="preserve">4</w:t>"#
        ));
    }

    #[test]
    fn test_split_tag_is_rendered() {
        let out = render_body(
            "<w:p><w:r><w:t>{{ Nom</w:t></w:r><w:r><w:t>bre }}</w:t></w:r></w:p>",
            &context(&[("Nombre", "Ana")]),
        )
        .unwrap();
        assert!(out.contains("<w:t>Ana</w:t>"));
    }

    #[test]
    fn test_simple_field_replaced() {
        let out = render_body(
            r#"<w:p><w:fldSimple w:instr=" MERGEFIELD Fecha_Nac \* MERGEFORMAT "><w:r><w:t>«Fecha_Nac»</w:t></w:r></w:fldSimple></w:p>"#,
            &context(&[("Fecha_Nac", "05/01/2024")]),
        )
        .unwrap();
        assert!(!out.contains("fldSimple"));
        assert!(out.contains(r#"<w:r><w:t xml:space="preserve">05/01/2024</w:t></w:r>"#));
    }

    #[test]
    fn test_complex_field_replaced() {
        let body = concat!(
            r#"<w:p><w:r><w:t>Lote: </w:t></w:r><w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> MERGEFIELD Lote </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r><w:r><w:t>«Lote»</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
        );
        let out = render_body(body, &context(&[("Lote", "L-42")])).unwrap();
        assert!(!out.contains("fldChar"));
        assert!(out.contains(
            r#"<w:r><w:t>Lote: </w:t></w:r><w:r><w:t xml:space="preserve">L-42</w:t></w:r></w:p>"#
        ));
    }

    #[test]
    fn test_merge_field_nested_in_if() {
        let body = concat!(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> IF </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> MERGEFIELD Sexo </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r><w:r><w:t>«Sexo»</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> = "F" "Sra." "Sr." </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r><w:r><w:t>Sr.</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
        );
        let out = render_body(body, &context(&[("Sexo", "F")])).unwrap();

        assert!(!out.contains("MERGEFIELD"));
        assert!(out.contains(r#"<w:r><w:t xml:space="preserve">F</w:t></w:r>"#));
        // The IF field keeps one begin, one separate and one end
        assert_eq!(out.matches(r#"w:fldCharType="begin""#).count(), 1);
        assert_eq!(out.matches(r#"w:fldCharType="separate""#).count(), 1);
        assert_eq!(out.matches(r#"w:fldCharType="end""#).count(), 1);
        assert!(out.contains(" IF "));
    }

    #[test]
    fn test_non_merge_fields_untouched() {
        let body = r#"<w:p><w:fldSimple w:instr=" PAGE "><w:r><w:t>1</w:t></w:r></w:fldSimple></w:p>"#;
        let out = render_body(body, &context(&[])).unwrap();
        assert!(out.contains(r#"w:instr=" PAGE ""#));
    }

    #[test]
    fn test_unbalanced_delimiters_fail() {
        let err = render_body("<w:p><w:r><w:t>{{ Nombre</w:t></w:r></w:p>", &context(&[]))
            .unwrap_err();
        assert!(matches!(err, OoxmlError::TemplateSyntax { .. }));
    }

    #[test]
    fn test_values_with_braces_render() {
        let out = render_body(
            "<w:p><w:r><w:t>{{ Nombre }}: {{ Nota }}</w:t></w:r></w:p>",
            &context(&[("Nombre", "Ana"), ("Nota", "ver {{anexo}}")]),
        )
        .unwrap();
        assert!(out.contains("<w:t>Ana: ver {{anexo}}</w:t>"));
    }

    #[test]
    fn test_malformed_markup_fails() {
        let err = DocxRenderer::new()
            .render_part("word/header1.xml", "<w:hdr><w:p></w:hdr>", &context(&[]), false)
            .unwrap_err();
        assert!(matches!(err, OoxmlError::Xml { ref part, .. } if part == "word/header1.xml"));
    }

    #[test]
    fn test_render_leaves_template_untouched() {
        let bytes = create_template("<w:p><w:r><w:t>{{Nombre}}</w:t></w:r></w:p>");
        let template = Template::from_bytes(&bytes).unwrap();

        let rendered = DocxRenderer::new()
            .render(&template, &context(&[("Nombre", "Ana")]))
            .unwrap();

        assert!(rendered.get_string(DOCUMENT_PART).unwrap().contains("<w:t>Ana</w:t>"));
        assert!(template.document_xml().unwrap().contains("{{Nombre}}"));
    }
}

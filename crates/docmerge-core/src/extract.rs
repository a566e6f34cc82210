//! Template tag extraction.
//!
//! Tags are the union, in first-seen order, of inline `{{ }}` tags, field
//! names with whitespace runs joined by `_`, and the raw field names.
//! Extraction never fails: an unreadable template yields fewer tags.

use docmerge_ooxml::Template;

/// All distinct tags a template references
pub fn extract_tags(template: &Template) -> Vec<String> {
    let inline = template.inline_tags();

    let fields = template.field_tags().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not scan merge fields");
        Vec::new()
    });

    let synthesized = fields.iter().map(|name| synthesize_field_tag(name));

    let mut tags: Vec<String> = Vec::with_capacity(inline.len() + fields.len());
    for tag in inline.into_iter().chain(synthesized).chain(fields.iter().cloned()) {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    tracing::debug!(count = tags.len(), "extracted template tags");
    tags
}

/// Field name with each whitespace run replaced by one underscore
pub fn synthesize_field_tag(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmerge_ooxml::test_utils::{create_template, create_template_with_parts};
    use docmerge_ooxml::OoxmlArchive;

    fn load(docx: &[u8]) -> Template {
        Template::from_bytes(docx).unwrap()
    }

    #[test]
    fn test_union_order() {
        let body = concat!(
            r#"<w:p><w:fldSimple w:instr=" MERGEFIELD  Fecha  Nac \* MERGEFORMAT "/></w:p>"#,
            r#"<w:p><w:r><w:t>{{ Nombre }} {{Lote}}</w:t></w:r></w:p>"#,
            r#"<w:p><w:fldSimple w:instr="MERGEFIELD Nombre"/></w:p>"#,
        );
        let tags = extract_tags(&load(&create_template(body)));

        assert_eq!(tags, vec!["Nombre", "Lote", "Fecha_Nac", "Fecha  Nac"]);
    }

    #[test]
    fn test_header_inline_tags_are_included() {
        let header = r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:r><w:t>{{ Protocolo }}</w:t></w:r></w:p></w:hdr>"#;
        let docx = create_template_with_parts(
            "<w:p><w:r><w:t>{{ Nombre }}</w:t></w:r></w:p>",
            &[("word/header1.xml", header)],
        );
        let tags = extract_tags(&load(&docx));

        assert_eq!(tags, vec!["Nombre", "Protocolo"]);
    }

    #[test]
    fn test_complex_field_name() {
        let body = concat!(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText xml:space="preserve"> MERGEFIELD </w:instrText></w:r>"#,
            r#"<w:r><w:instrText>Fecha_Nac</w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:t>«Fecha_Nac»</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
        );
        let tags = extract_tags(&load(&create_template(body)));

        assert_eq!(tags, vec!["Fecha_Nac"]);
    }

    #[test]
    fn test_missing_document_part_degrades() {
        let mut archive = OoxmlArchive::default();
        archive.set_string(
            "word/header1.xml",
            "<w:hdr><w:p><w:r><w:t>{{ Nombre }}</w:t></w:r></w:p></w:hdr>",
        );
        let tags = extract_tags(&Template::from_archive(archive));

        assert_eq!(tags, vec!["Nombre"]);
    }

    #[test]
    fn test_synthesize_field_tag() {
        assert_eq!(synthesize_field_tag("Fecha  Nac"), "Fecha_Nac");
        assert_eq!(synthesize_field_tag(" Nombre\tCompleto "), "Nombre_Completo");
        assert_eq!(synthesize_field_tag("Lote"), "Lote");
    }
}

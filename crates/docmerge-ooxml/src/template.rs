//! Template loader for DOCX templates
//!
//! A [`Template`] is a read-only view of the template package. Rendering
//! clones the underlying archive, so one loaded template can be filled for
//! any number of spreadsheets.
//!
//! # Example
//!
//! ```ignore
//! use docmerge_ooxml::Template;
//!
//! let template = Template::load("protocolo.docx")?;
//! for tag in template.inline_tags() {
//!     println!("{}", tag);
//! }
//! ```

use std::path::Path;

use crate::archive::{OoxmlArchive, DOCUMENT_PART};
use crate::error::Result;
use crate::placeholders;

/// A Word template (.docx/.dotx) wrapper providing template-specific operations
#[derive(Debug, Clone)]
pub struct Template {
    /// The underlying OOXML archive
    archive: OoxmlArchive,
}

impl Template {
    /// Load a template from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let archive = OoxmlArchive::open(path)?;
        Ok(Self { archive })
    }

    /// Load a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cursor = std::io::Cursor::new(bytes);
        let archive = OoxmlArchive::from_reader(cursor)?;
        Ok(Self { archive })
    }

    /// Wrap an already unpacked archive
    pub fn from_archive(archive: OoxmlArchive) -> Self {
        Self { archive }
    }

    /// Get a reference to the underlying archive
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Consume the template and return the underlying archive
    pub fn into_archive(self) -> OoxmlArchive {
        self.archive
    }

    /// The main document part as text
    pub fn document_xml(&self) -> Result<String> {
        let bytes = self.archive.document_xml()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// `{{ ... }}` tags across every `word/*.xml` part, first-seen order
    pub fn inline_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for part in self.archive.word_xml_parts() {
            let Some(xml) = self.archive.get_string(part) else {
                continue;
            };
            for tag in placeholders::inline_tags(&xml) {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        tags
    }

    /// MERGEFIELD names in the main document part, duplicates kept
    pub fn field_tags(&self) -> Result<Vec<String>> {
        let xml = self.document_xml()?;
        Ok(placeholders::field_tags(&xml))
    }

    /// Whether the package has the part every renderable document needs
    pub fn has_document_part(&self) -> bool {
        self.archive.contains(DOCUMENT_PART)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_template, create_template_with_parts};

    #[test]
    fn test_load_from_bytes() {
        let bytes = create_template("<w:p><w:r><w:t>Hola</w:t></w:r></w:p>");
        let result = Template::from_bytes(&bytes);
        assert!(result.is_ok(), "Failed to load template: {:?}", result.err());
        assert!(result.unwrap().has_document_part());
    }

    #[test]
    fn test_load_from_invalid_bytes() {
        let result = Template::from_bytes(b"This is not a ZIP file");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_truncated_zip() {
        let truncated = &[0x50, 0x4b, 0x03, 0x04, 0x00, 0x00];
        assert!(Template::from_bytes(truncated).is_err());
    }

    #[test]
    fn test_inline_tags_span_header_and_body() {
        let bytes = create_template_with_parts(
            "<w:p><w:r><w:t>{{ Nombre }} {{Lote}}</w:t></w:r></w:p>",
            &[("word/header1.xml", "<w:hdr><w:p><w:r><w:t>{{Titulo}} {{Nombre}}</w:t></w:r></w:p></w:hdr>")],
        );
        let template = Template::from_bytes(&bytes).unwrap();

        // document.xml sorts before header1.xml
        assert_eq!(template.inline_tags(), vec!["Nombre", "Lote", "Titulo"]);
    }

    #[test]
    fn test_field_tags_from_document() {
        let bytes = create_template(
            r#"<w:p><w:fldSimple w:instr=" MERGEFIELD Fecha_Nac "><w:r><w:t>«Fecha_Nac»</w:t></w:r></w:fldSimple></w:p>"#,
        );
        let template = Template::from_bytes(&bytes).unwrap();
        assert_eq!(template.field_tags().unwrap(), vec!["Fecha_Nac"]);
    }

    #[test]
    fn test_field_tags_without_document_part() {
        let mut archive = Template::from_bytes(&create_template("")).unwrap().into_archive();
        archive.remove(DOCUMENT_PART);
        let template = Template::from_archive(archive);

        assert!(!template.has_document_part());
        assert!(template.field_tags().is_err());
        assert!(template.inline_tags().is_empty());
    }
}

//! Text normalization for tag matching.
//!
//! A normalized key is lower-case ASCII letters and digits separated by
//! single underscores: `"  Título del Protocolo (v2) "` becomes
//! `"titulo_del_protocolo_v2"`. Keys are only used for matching and never
//! shown to the user.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Decompose accented characters and drop the combining marks
pub fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Canonicalize text into a matchable key
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut key = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in strip_accents(text).chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(c);
        } else {
            pending_separator = true;
        }
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_and_case() {
        assert_eq!(normalize("Título"), "titulo");
        assert_eq!(normalize("TITULO"), "titulo");
        assert_eq!(normalize("titulo"), "titulo");
        assert_eq!(normalize("Año_Fabricación"), "ano_fabricacion");
    }

    #[test]
    fn test_separator_runs_collapse() {
        assert_eq!(normalize("Fecha Nac"), "fecha_nac");
        assert_eq!(normalize("Fecha_Nac"), "fecha_nac");
        assert_eq!(normalize("Fecha -- / Nac"), "fecha_nac");
        assert_eq!(normalize("__Fecha__Nac__"), "fecha_nac");
        assert_eq!(normalize("  Dosis (mg) "), "dosis_mg");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("¿?¡!"), "");
    }

    #[test]
    fn test_non_latin_letters_are_separators() {
        assert_eq!(normalize("Peso µg"), "peso_g");
        assert_eq!(normalize("ß1"), "1");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "Título del Protocolo (v2)",
            "Fecha_Nac",
            "  ",
            "ÑANDÚ 3 x 4",
            "a__b",
            "ǅ Digraph",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_strip_accents() {
        assert_eq!(strip_accents("áéíóú ñ Ü"), "aeiou n U");
    }
}

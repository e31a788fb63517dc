//! Text normalization applied to extracted text, chunks and questions

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Printable ASCII plus Spanish letters and punctuation
static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7EáéíóúÁÉÍÓÚñÑüÜ–¿¡]").expect("Invalid regex"));

/// Normalize whitespace and strip characters outside the allow-list.
///
/// Line breaks between non-empty lines become sentence separators (`". "`).
/// Characters from other scripts are dropped, and lines left blank vanish.
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

fn clean_line(line: &str) -> String {
    let line = WHITESPACE_RUN.replace_all(line, " ");
    let line = DISALLOWED.replace_all(&line, "");
    WHITESPACE_RUN.replace_all(&line, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_become_sentence_breaks() {
        assert_eq!(clean_text("Título\n\n  Capítulo uno"), "Título. Capítulo uno");
        assert_eq!(clean_text("a\r\nb"), "a. b");
    }

    #[test]
    fn test_whitespace_is_collapsed_and_trimmed() {
        assert_eq!(clean_text("  one \t two   three  "), "one two three");
    }

    #[test]
    fn test_keeps_spanish_characters() {
        assert_eq!(
            clean_text("¿Qué año? ¡Pingüino! Ñandú – fin"),
            "¿Qué año? ¡Pingüino! Ñandú – fin"
        );
    }

    #[test]
    fn test_strips_other_scripts_and_symbols() {
        assert_eq!(clean_text("Hola\n\nmundo  ¿qué tal?\t😀 ok"), "Hola. mundo ¿qué tal? ok");
        assert_eq!(clean_text("日本語 text"), "text");
        assert_eq!(clean_text("€100 • item"), "100 item");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text(" \n\t "), "");
        assert_eq!(clean_text("\n\n"), "");
        assert_eq!(clean_text("😀\n"), "");
    }

    #[test]
    fn test_blank_lines_add_no_separators() {
        assert_eq!(clean_text("\nfirst line\n"), "first line");
        assert_eq!(clean_text("uno\n  \n😀\ndos"), "uno. dos");
    }
}

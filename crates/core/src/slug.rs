//! URL slug generation.

/// Fold common Spanish and Western European accented letters to ASCII.
fn fold(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Turn a title into a URL slug.
///
/// ```
/// use aurelia_core::slug::slugify;
///
/// assert_eq!(slugify("Cómo cuidar tu joyería de plata"), "como-cuidar-tu-joyeria-de-plata");
/// assert_eq!(slugify("  ¡Año nuevo, brillo nuevo!  "), "ano-nuevo-brillo-nuevo");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().flat_map(char::to_lowercase).map(fold) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Whether a string is already a well-formed slug.
#[must_use]
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Oro   &   Plata -- 2026"), "oro-plata-2026");
    }

    #[test]
    fn test_slugify_folds_uppercase_accents() {
        assert_eq!(slugify("ÉXITO ÑANDÚ"), "exito-nandu");
    }

    #[test]
    fn test_slugify_only_symbols() {
        assert_eq!(slugify("¿?¡!"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("anillos-de-oro"));
        assert!(!is_valid_slug("Anillos"));
        assert!(!is_valid_slug("-oro"));
        assert!(!is_valid_slug("oro--plata"));
        assert!(!is_valid_slug(""));
    }
}

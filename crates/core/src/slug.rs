//! URL slugs with Turkish transliteration.

/// Build a URL slug from a title.
///
/// Turkish letters are transliterated (`ç→c`, `ğ→g`, `ı/İ→i`, `ö→o`, `ş→s`,
/// `ü→u`), everything that is not ASCII alphanumeric becomes a single `-`,
/// and leading/trailing dashes are removed.
///
/// ```
/// use takviye_core::slug::slugify;
///
/// assert_eq!(slugify("Whey Protein Tozu - Çikolatalı"), "whey-protein-tozu-cikolatali");
/// assert_eq!(slugify("Günlük Sağlık & Bağışıklık"), "gunluk-saglik-bagisiklik");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        let mapped = match ch {
            'ç' | 'Ç' => 'c',
            'ğ' | 'Ğ' => 'g',
            'ı' | 'I' | 'İ' | 'i' => 'i',
            'ö' | 'Ö' => 'o',
            'ş' | 'Ş' => 's',
            'ü' | 'Ü' => 'u',
            'â' | 'Â' => 'a',
            'î' | 'Î' => 'i',
            'û' | 'Û' => 'u',
            c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
            _ => {
                pending_dash = !slug.is_empty();
                continue;
            }
        };
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        slug.push(mapped);
    }

    slug
}

/// Whether `s` is already a well-formed slug.
#[must_use]
pub fn is_valid(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transliterates_turkish_letters() {
        assert_eq!(slugify("ÇĞIİÖŞÜ çğıiöşü"), "cgiiosu-cgiiosu");
        assert_eq!(slugify("Omega-3 Balık Yağı"), "omega-3-balik-yagi");
    }

    #[test]
    fn test_collapses_separators() {
        assert_eq!(slugify("  BCAA   2:1:1 -- 400g!! "), "bcaa-2-1-1-400g");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_output_is_valid() {
        for title in ["Kreatin Monohidrat", "Ön Antrenman (Pre-Workout)", "Çinko + Magnezyum"] {
            assert!(is_valid(&slugify(title)), "{title}");
        }
        assert!(!is_valid("Bad Slug"));
        assert!(!is_valid("double--dash"));
    }
}

use crate::models::{ContentKind, Locale};
use rusqlite::{Connection, Result as RusqliteResult};
use std::collections::HashSet;

const MAX_SLUG_LEN: usize = 100;

/// Maps the Turkish diacritics to their ASCII counterparts. 'İ' must be
/// handled here: `char::to_lowercase` turns it into "i" plus a combining
/// dot, which would otherwise end up as a stray hyphen.
fn transliterate(c: char) -> char {
    match c {
        'ç' | 'Ç' => 'c',
        'ğ' | 'Ğ' => 'g',
        'ı' | 'İ' => 'i',
        'ö' | 'Ö' => 'o',
        'ş' | 'Ş' => 's',
        'ü' | 'Ü' => 'u',
        other => other,
    }
}

/// Generate a URL-safe slug from a (possibly Turkish) title.
///
/// Lowercases, transliterates Turkish diacritics to ASCII, collapses runs of
/// non-alphanumeric characters to a single hyphen, trims edge hyphens, and
/// truncates to 100 characters. Pure and idempotent.
pub fn slugify(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = true; // suppress a leading hyphen

    for raw in title.chars() {
        let c = transliterate(raw);
        for lower in c.to_lowercase() {
            if lower.is_ascii_alphanumeric() {
                result.push(lower);
                prev_hyphen = false;
            } else if !prev_hyphen {
                result.push('-');
                prev_hyphen = true;
            }
        }
    }

    if result.len() > MAX_SLUG_LEN {
        result.truncate(MAX_SLUG_LEN);
    }
    result.trim_end_matches('-').to_string()
}

/// Returns a slug unique within the locale for the given content table,
/// appending -2, -3, ... on collision. `exclude_id` lets an edit keep its
/// own slug.
pub fn unique_slug(
    conn: &Connection,
    kind: ContentKind,
    locale: Locale,
    title: &str,
    exclude_id: Option<i64>,
) -> RusqliteResult<String> {
    use crate::models::db_operations::content_db_operations::slug_exists;

    let mut base = slugify(title);
    if base.is_empty() {
        base = "icerik".to_string();
    }

    if !slug_exists(conn, kind, locale, &base, exclude_id)? {
        return Ok(base);
    }

    let mut n = 2u32;
    loop {
        let suffix = format!("-{}", n);
        let mut candidate = base.clone();
        if candidate.len() + suffix.len() > MAX_SLUG_LEN {
            candidate.truncate(MAX_SLUG_LEN - suffix.len());
            candidate = candidate.trim_end_matches('-').to_string();
        }
        candidate.push_str(&suffix);
        if !slug_exists(conn, kind, locale, &candidate, exclude_id)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Strips all HTML tags, leaving plain text. Used on title-like fields
/// before they are stored.
pub fn strip_all_html(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::db_operations::content_db_operations::{create_content, ContentInput};
    use crate::setup::db_setup;

    #[test]
    fn slug_maps_turkish_diacritics() {
        assert_eq!(slugify("Gölün Üçüncü Şöleni"), "golun-ucuncu-soleni");
    }

    #[test]
    fn slug_handles_dotted_and_dotless_i() {
        assert_eq!(slugify("İstanbul Iğdır"), "istanbul-igdir");
    }

    #[test]
    fn slug_collapses_and_trims() {
        assert_eq!(slugify("  Çok -- fazla!!! boşluk  "), "cok-fazla-bosluk");
    }

    #[test]
    fn slug_is_idempotent() {
        let once = slugify("Derneğimizin 25. Yılı");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slug_is_total() {
        for input in ["", "!!!", "???", "çğışöü", "a", &"x".repeat(500)] {
            let slug = slugify(input);
            assert!(slug.len() <= 100);
            assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        }
    }

    #[test]
    fn slug_truncates_without_trailing_hyphen() {
        let long_title = "kelime ".repeat(40);
        let slug = slugify(&long_title);
        assert!(slug.len() <= 100);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn unique_slug_appends_suffix_on_collision() {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_content_db(&mut conn).unwrap();

        let first = unique_slug(&conn, ContentKind::News, Locale::Tr, "Genel Kurul", None).unwrap();
        assert_eq!(first, "genel-kurul");
        create_content(
            &conn,
            ContentKind::News,
            &ContentInput {
                locale: Locale::Tr,
                title: "Genel Kurul",
                slug: &first,
                summary: "",
                body: "{}",
                cover_image: None,
                priority: None,
                published_at: None,
                is_active: true,
                parent_id: None,
            },
        )
        .unwrap();

        let second =
            unique_slug(&conn, ContentKind::News, Locale::Tr, "Genel Kurul", None).unwrap();
        assert_eq!(second, "genel-kurul-2");

        // Same title in the other locale does not collide.
        let other =
            unique_slug(&conn, ContentKind::News, Locale::En, "Genel Kurul", None).unwrap();
        assert_eq!(other, "genel-kurul");
    }

    #[test]
    fn strip_all_html_removes_tags() {
        assert_eq!(strip_all_html("<b>Başlık</b> <script>x()</script>"), "Başlık ");
    }
}

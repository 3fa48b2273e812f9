use crate::models::{ContentKind, Locale};

/// Locale detected from a path prefix. Paths without a `/tr` or `/en`
/// prefix belong to the Turkish default rendering.
pub fn detect_locale(path: &str) -> Option<Locale> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    for locale in [Locale::Tr, Locale::En] {
        let prefix = format!("/{}", locale.as_str());
        if path == prefix || path.starts_with(&format!("{}/", prefix)) {
            return Some(locale);
        }
    }
    None
}

/// Rewrites the locale prefix of a site path to the other locale, preserving
/// the rest of the path along with any query string and fragment. A path
/// without a locale prefix is the Turkish default and gains `/en`. Its own
/// inverse on locale-prefixed paths.
pub fn toggle_locale_path(path: &str) -> String {
    // Split off fragment first, then query; both are carried over untouched.
    let (without_fragment, fragment) = match path.split_once('#') {
        Some((p, f)) => (p, Some(f)),
        None => (path, None),
    };
    let (bare_path, query) = match without_fragment.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (without_fragment, None),
    };

    let toggled = match detect_locale(bare_path) {
        Some(locale) => {
            let prefix_len = 1 + locale.as_str().len();
            let rest = &bare_path[prefix_len..];
            if rest.is_empty() {
                format!("/{}", locale.other().as_str())
            } else {
                format!("/{}{}", locale.other().as_str(), rest)
            }
        }
        None => {
            // Unprefixed paths render the Turkish default.
            if bare_path == "/" || bare_path.is_empty() {
                "/en".to_string()
            } else {
                format!("/en{}", bare_path)
            }
        }
    };

    let mut result = toggled;
    if let Some(q) = query {
        result.push('?');
        result.push_str(q);
    }
    if let Some(f) = fragment {
        result.push('#');
        result.push_str(f);
    }
    result
}

/// Public path of a content detail page, e.g. `/tr/haberler/genel-kurul`.
pub fn content_path(kind: ContentKind, locale: Locale, slug: &str) -> String {
    format!("/{}/{}/{}", locale.as_str(), kind.public_segment(locale), slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_prefix_locales() {
        assert_eq!(detect_locale("/tr/haberler"), Some(Locale::Tr));
        assert_eq!(detect_locale("/en/news/some-slug"), Some(Locale::En));
        assert_eq!(detect_locale("/en"), Some(Locale::En));
        assert_eq!(detect_locale("/hakkimizda"), None);
        // Prefix match is on whole segments.
        assert_eq!(detect_locale("/trabzon"), None);
    }

    #[test]
    fn toggles_between_locales() {
        assert_eq!(toggle_locale_path("/tr/haberler"), "/en/haberler");
        assert_eq!(toggle_locale_path("/en/news"), "/tr/news");
        assert_eq!(toggle_locale_path("/tr"), "/en");
        assert_eq!(toggle_locale_path("/en"), "/tr");
    }

    #[test]
    fn toggle_is_its_own_inverse_on_prefixed_paths() {
        for path in ["/tr/projeler/golun-ucuncu-soleni", "/en/contact?tab=map#form", "/tr"] {
            assert_eq!(toggle_locale_path(&toggle_locale_path(path)), path);
        }
    }

    #[test]
    fn preserves_query_and_fragment() {
        assert_eq!(
            toggle_locale_path("/tr/haberler?page=2#liste"),
            "/en/haberler?page=2#liste"
        );
    }

    #[test]
    fn unprefixed_path_gains_english_prefix() {
        assert_eq!(toggle_locale_path("/"), "/en");
        assert_eq!(toggle_locale_path("/iletisim"), "/en/iletisim");
    }

    #[test]
    fn content_paths_use_locale_segments() {
        assert_eq!(
            content_path(ContentKind::News, Locale::Tr, "genel-kurul"),
            "/tr/haberler/genel-kurul"
        );
        assert_eq!(
            content_path(ContentKind::News, Locale::En, "general-assembly"),
            "/en/news/general-assembly"
        );
    }
}

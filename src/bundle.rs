//! Local bundle resolver: static, pre-shipped per-locale translation tables.
//!
//! The cheapest tier in the fallback order. Tables are compiled into the
//! binary, need no network or storage, and are authoritative: a bundle entry
//! wins over any dynamically cached value for the same key. The singleton is
//! initialized once via `OnceLock` and immutable thereafter.

use std::collections::HashMap;
use std::sync::OnceLock;

/// One shipped per-locale table.
#[derive(Debug, Clone, Copy)]
pub struct LocaleBundle {
    /// ISO 639-1 locale code (e.g., "hi", "mr")
    pub locale: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl LocaleBundle {
    /// Tables are small chrome-string lists, so a linear scan is fine.
    fn lookup(&self, text: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(source, _)| *source == text)
            .map(|(_, translated)| *translated)
    }
}

pub struct BundleResolver {
    bundles: HashMap<&'static str, LocaleBundle>,
}

static BUNDLES: OnceLock<BundleResolver> = OnceLock::new();

impl BundleResolver {
    /// Get the global resolver, initializing it on first access.
    pub fn get() -> &'static BundleResolver {
        BUNDLES.get_or_init(|| {
            let mut bundles = HashMap::new();
            for bundle in shipped_bundles() {
                bundles.insert(bundle.locale, bundle);
            }
            BundleResolver { bundles }
        })
    }

    /// Look up a shipped translation for `(text, locale)`.
    pub fn lookup(&self, text: &str, locale: &str) -> Option<&'static str> {
        self.bundles.get(locale).and_then(|b| b.lookup(text))
    }

    /// Whether any table is shipped for this locale.
    pub fn has_locale(&self, locale: &str) -> bool {
        self.bundles.contains_key(locale)
    }

    /// Locales with a shipped table.
    pub fn locales(&self) -> Vec<&'static str> {
        self.bundles.keys().copied().collect()
    }
}

/// Navigation and form chrome for the portal, in the locales it ships.
fn shipped_bundles() -> Vec<LocaleBundle> {
    vec![
        LocaleBundle {
            locale: "hi",
            entries: HINDI_ENTRIES,
        },
        LocaleBundle {
            locale: "mr",
            entries: MARATHI_ENTRIES,
        },
    ]
}

const HINDI_ENTRIES: &[(&str, &str)] = &[
    ("Home", "होम"),
    ("Records", "रिकॉर्ड"),
    ("Data Entry", "डेटा प्रविष्टि"),
    ("Visualisation", "विज़ुअलाइज़ेशन"),
    ("Dashboard", "डैशबोर्ड"),
    ("Contact", "संपर्क"),
    ("User Manual", "उपयोगकर्ता पुस्तिका"),
    ("Log In", "लॉग इन"),
    ("Log Out", "लॉग आउट"),
    ("Register", "पंजीकरण"),
    ("Submit", "जमा करें"),
    ("Cancel", "रद्द करें"),
];

const MARATHI_ENTRIES: &[(&str, &str)] = &[
    ("Home", "मुख्यपृष्ठ"),
    ("Records", "नोंदी"),
    ("Data Entry", "डेटा नोंद"),
    ("Visualisation", "दृश्यीकरण"),
    ("Dashboard", "डॅशबोर्ड"),
    ("Contact", "संपर्क"),
    ("User Manual", "वापरकर्ता पुस्तिका"),
    ("Log In", "लॉग इन"),
    ("Log Out", "लॉग आउट"),
    ("Register", "नोंदणी"),
    ("Submit", "सबमिट करा"),
    ("Cancel", "रद्द करा"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolver_is_singleton() {
        let a = BundleResolver::get();
        let b = BundleResolver::get();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_lookup_hindi_home() {
        let resolver = BundleResolver::get();
        assert_eq!(resolver.lookup("Home", "hi"), Some("होम"));
    }

    #[test]
    fn test_lookup_marathi_home() {
        let resolver = BundleResolver::get();
        assert_eq!(resolver.lookup("Home", "mr"), Some("मुख्यपृष्ठ"));
    }

    #[test]
    fn test_lookup_unknown_text() {
        let resolver = BundleResolver::get();
        assert_eq!(resolver.lookup("Some free-form sentence", "hi"), None);
    }

    #[test]
    fn test_lookup_unknown_locale() {
        let resolver = BundleResolver::get();
        assert_eq!(resolver.lookup("Home", "fr"), None);
        assert!(!resolver.has_locale("fr"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let resolver = BundleResolver::get();
        assert_eq!(resolver.lookup("home", "hi"), None);
    }

    #[test]
    fn test_shipped_locales() {
        let resolver = BundleResolver::get();
        let mut locales = resolver.locales();
        locales.sort_unstable();
        assert_eq!(locales, vec!["hi", "mr"]);
    }
}

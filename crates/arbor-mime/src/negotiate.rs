//! Output codec negotiation.

use crate::MimeRegistry;
use arbor_core::Processor;
use std::fmt;
use std::sync::Arc;

/// Outcome of a successful negotiation.
#[derive(Clone)]
pub struct Negotiated {
    /// Media type the codec was selected for.
    pub media_type: String,
    /// The selected codec.
    pub processor: Arc<dyn Processor>,
}

impl fmt::Debug for Negotiated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Negotiated")
            .field("media_type", &self.media_type)
            .finish_non_exhaustive()
    }
}

impl MimeRegistry {
    /// First codec that can serve one of `accepted`, tried in order.
    pub fn negotiate(&self, accepted: &[String]) -> Option<Negotiated> {
        accepted.iter().find_map(|media_type| {
            self.resolve_with_type(media_type)
                .map(|(registered, processor)| Negotiated {
                    media_type: concrete(media_type, registered),
                    processor,
                })
        })
    }

    /// Intersect a representation's `preferred` types with the caller's
    /// `accepted` types, walking the caller's preferences first. Falls back
    /// to [`MimeRegistry::negotiate`] when the intersection yields nothing.
    pub fn negotiate_preferred(&self, preferred: &[String], accepted: &[String]) -> Option<Negotiated> {
        let intersected = accepted.iter().find_map(|accepted_type| {
            preferred
                .iter()
                .filter(|p| media_matches(accepted_type, p))
                .find_map(|p| {
                    self.resolve_with_type(p).map(|(registered, processor)| Negotiated {
                        media_type: concrete(p, registered),
                        processor,
                    })
                })
        });

        intersected.or_else(|| self.negotiate(accepted))
    }
}

/// Whether two media types overlap, wildcards allowed on either side.
pub fn media_matches(a: &str, b: &str) -> bool {
    let essence = |t: &str| {
        let t = t.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match t.split_once('/') {
            Some((major, minor)) => (major.to_string(), minor.to_string()),
            None => (t, "*".to_string()),
        }
    };
    let (a_major, a_minor) = essence(a);
    let (b_major, b_minor) = essence(b);

    let part = |x: &str, y: &str| x == "*" || y == "*" || x == y;
    part(&a_major, &b_major) && part(&a_minor, &b_minor)
}

/// Prefer the asked-for type when it is concrete; otherwise report the
/// type the codec was registered under.
fn concrete(asked: &str, registered: String) -> String {
    let asked = asked.split(';').next().unwrap_or_default().trim();
    if asked.contains('*') {
        registered
    } else {
        asked.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JsonProcessor;

    fn registry() -> MimeRegistry {
        let mut registry = MimeRegistry::new();
        registry.register(Arc::new(JsonProcessor::new()), None);
        registry.register(Arc::new(JsonProcessor::new()), Some(&["text/plain"]));
        registry
    }

    fn types(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_negotiate_in_preference_order() {
        let registry = registry();
        let negotiated = registry
            .negotiate(&types(&["text/html", "text/plain", "application/json"]))
            .unwrap();
        assert_eq!(negotiated.media_type, "text/plain");
    }

    #[test]
    fn test_negotiate_wildcard_reports_registered_type() {
        let negotiated = registry().negotiate(&types(&["*/*"])).unwrap();
        assert_eq!(negotiated.media_type, "application/json");
    }

    #[test]
    fn test_negotiate_nothing() {
        assert!(registry().negotiate(&types(&["image/png"])).is_none());
        assert!(MimeRegistry::new().negotiate(&types(&["*/*"])).is_none());
    }

    #[test]
    fn test_preferred_intersection() {
        let registry = registry();
        let negotiated = registry
            .negotiate_preferred(&types(&["text/plain"]), &types(&["*/*"]))
            .unwrap();
        assert_eq!(negotiated.media_type, "text/plain");
    }

    #[test]
    fn test_preferred_falls_back() {
        let registry = registry();
        let negotiated = registry
            .negotiate_preferred(&types(&["text/csv"]), &types(&["application/json"]))
            .unwrap();
        assert_eq!(negotiated.media_type, "application/json");
    }

    #[test]
    fn test_media_matches() {
        assert!(media_matches("*/*", "text/html"));
        assert!(media_matches("text/*", "text/html"));
        assert!(media_matches("text/html", "TEXT/HTML; charset=utf-8"));
        assert!(!media_matches("text/*", "application/json"));
        assert!(!media_matches("text/plain", "text/html"));
    }
}

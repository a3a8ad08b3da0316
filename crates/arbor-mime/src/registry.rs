//! Media type registry.

use arbor_core::Processor;
use std::fmt;
use std::sync::Arc;

/// One `(media type, codec)` binding.
#[derive(Clone)]
struct Registration {
    major: String,
    minor: String,
    processor: Arc<dyn Processor>,
}

impl Registration {
    fn media_type(&self) -> String {
        format!("{}/{}", self.major, self.minor)
    }
}

/// Registry of codecs indexed by media type.
///
/// Lookups honour wildcards on both sides and always prefer the earliest
/// registration.
#[derive(Clone, Default)]
pub struct MimeRegistry {
    entries: Vec<Registration>,
}

impl MimeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec under `mime_types`, or under its own
    /// [`Processor::supported_content_types`] when `None`.
    ///
    /// Registering the same codec twice for a media type has no effect.
    /// Malformed media types are skipped.
    pub fn register(&mut self, processor: Arc<dyn Processor>, mime_types: Option<&[&str]>) {
        let types: Vec<String> = match mime_types {
            Some(types) => types.iter().map(|t| t.to_string()).collect(),
            None => processor.supported_content_types(),
        };

        for media_type in types {
            let Some((major, minor)) = split_media_type(&media_type) else {
                tracing::warn!(media_type = %media_type, "Skipping malformed media type");
                continue;
            };
            let duplicate = self.entries.iter().any(|e| {
                e.major == major && e.minor == minor && same_processor(&e.processor, &processor)
            });
            if duplicate {
                continue;
            }
            tracing::debug!(major = %major, minor = %minor, "Registered processor");
            self.entries.push(Registration {
                major,
                minor,
                processor: processor.clone(),
            });
        }
    }

    /// Find the codec for a media type.
    ///
    /// - an exact `major/minor` match wins, then a codec registered as
    ///   `major/*`;
    /// - `major/*` yields the first codec under any minor of `major`;
    /// - `*/minor` yields the first codec under any major with that minor;
    /// - `*/*` yields the first codec registered at all;
    /// - an unmatched major falls back to codecs registered under `*`.
    pub fn resolve(&self, media_type: &str) -> Option<Arc<dyn Processor>> {
        self.resolve_entry(media_type).map(|e| e.processor.clone())
    }

    /// Like [`MimeRegistry::resolve`], also returning the media type the
    /// codec was registered under.
    pub fn resolve_with_type(&self, media_type: &str) -> Option<(String, Arc<dyn Processor>)> {
        self.resolve_entry(media_type)
            .map(|e| (e.media_type(), e.processor.clone()))
    }

    fn resolve_entry(&self, media_type: &str) -> Option<&Registration> {
        let (major, minor) = split_media_type(media_type)?;

        let found = match (major.as_str(), minor.as_str()) {
            ("*", "*") => self.entries.first(),
            ("*", minor) => self.entries.iter().find(|e| e.minor == minor),
            (major, "*") => self.entries.iter().find(|e| e.major == major),
            (major, minor) => self
                .entries
                .iter()
                .find(|e| e.major == major && e.minor == minor)
                .or_else(|| self.entries.iter().find(|e| e.major == major && e.minor == "*")),
        };

        found.or_else(|| {
            self.entries
                .iter()
                .find(|e| e.major == "*" && (e.minor == minor || e.minor == "*" || minor == "*"))
        })
    }

    /// Every registered media type, in registration order.
    pub fn media_types(&self) -> Vec<String> {
        self.entries.iter().map(Registration::media_type).collect()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MimeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimeRegistry")
            .field("media_types", &self.media_types())
            .finish()
    }
}

/// Split `type/subtype; params` into lowercased `(type, subtype)`.
fn split_media_type(media_type: &str) -> Option<(String, String)> {
    let essence = media_type.split(';').next()?.trim();
    let (major, minor) = essence.split_once('/')?;
    let (major, minor) = (major.trim(), minor.trim());
    if major.is_empty() || minor.is_empty() {
        return None;
    }
    Some((major.to_ascii_lowercase(), minor.to_ascii_lowercase()))
}

fn same_processor(a: &Arc<dyn Processor>, b: &Arc<dyn Processor>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

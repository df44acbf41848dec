//! Optional natural-language annotation of a repair.
//!
//! The annotator is a pure, replaceable side-collaborator: it receives the
//! mesh's filename, measured dimensions, and the requested repair mode, and
//! may return a short human-readable description. It never influences the
//! geometric repair, and its absence or failure degrades to a fixed
//! placeholder string.

use kintsu_types::Dimensions;
use tracing::debug;

/// Returned when no annotator is wired up or the annotator declines.
pub const ANNOTATION_PLACEHOLDER: &str =
    "Annotation unavailable, repair proceeded with standard algorithms.";

/// Metadata handed to an [`Annotator`].
#[derive(Debug, Clone, Copy)]
pub struct AnnotationRequest<'a> {
    /// Original filename of the uploaded mesh.
    pub filename: &'a str,
    /// Measured axis-aligned dimensions.
    pub dimensions: Dimensions,
    /// Caller-chosen repair mode label, passed through verbatim.
    pub mode: &'a str,
}

/// A side-collaborator producing a short description of a repair.
///
/// Implementations may call out to an external service; returning `None`
/// means "no annotation available" and is always acceptable.
pub trait Annotator: Send + Sync {
    /// Produce a short description for the given repair, or decline.
    fn annotate(&self, request: &AnnotationRequest<'_>) -> Option<String>;
}

/// The default annotator: always declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAnnotator;

impl Annotator for PlaceholderAnnotator {
    fn annotate(&self, _request: &AnnotationRequest<'_>) -> Option<String> {
        None
    }
}

/// Ask the annotator, falling back to [`ANNOTATION_PLACEHOLDER`] when it
/// declines or returns blank text.
#[must_use]
pub fn annotate_or_placeholder(annotator: &dyn Annotator, request: &AnnotationRequest<'_>) -> String {
    match annotator.annotate(request) {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            debug!(filename = request.filename, "annotator declined, using placeholder");
            ANNOTATION_PLACEHOLDER.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAnnotator(&'static str);

    impl Annotator for FixedAnnotator {
        fn annotate(&self, _request: &AnnotationRequest<'_>) -> Option<String> {
            Some(self.0.to_owned())
        }
    }

    fn request() -> AnnotationRequest<'static> {
        AnnotationRequest {
            filename: "pot.obj",
            dimensions: Dimensions::zero(),
            mode: "standard",
        }
    }

    #[test]
    fn placeholder_annotator_declines() {
        let text = annotate_or_placeholder(&PlaceholderAnnotator, &request());
        assert_eq!(text, ANNOTATION_PLACEHOLDER);
    }

    #[test]
    fn real_text_passes_through() {
        let text = annotate_or_placeholder(&FixedAnnotator("filled 2 holes"), &request());
        assert_eq!(text, "filled 2 holes");
    }

    #[test]
    fn blank_text_degrades_to_placeholder() {
        let text = annotate_or_placeholder(&FixedAnnotator("   "), &request());
        assert_eq!(text, ANNOTATION_PLACEHOLDER);
    }
}

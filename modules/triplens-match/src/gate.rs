//! Boring/irrelevant gate.
//!
//! The cost-control stage: it runs before any catalog, inventory, or model
//! search so that low-value queries never spend money downstream.

use tracing::warn;
use triplens_common::ContentAnalysis;

use crate::traits::BoringClassifier;

/// Confidence floor under which a no-signal analysis is rejected outright.
pub const MIN_CONFIDENCE: f32 = 0.3;

/// Gate decision for a query or an analyzed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Worth searching.
    Proceed,
    /// Recognized activity, but a routine travel moment (transfers, queueing,
    /// generic dining) nobody books an experience for.
    Boring,
    /// Nothing usable to search for.
    Irrelevant,
}

/// Local, free check on an upstream content analysis.
///
/// Irrelevant only when the analyzer was unsure (confidence below
/// [`MIN_CONFIDENCE`]) and detected neither an activity nor a location.
/// Anything with signal proceeds; the downstream stages handle thin input.
pub fn content_check(analysis: &ContentAnalysis) -> GateVerdict {
    if analysis.confidence < MIN_CONFIDENCE && analysis.has_no_signal() {
        GateVerdict::Irrelevant
    } else {
        GateVerdict::Proceed
    }
}

/// Classify an activity term via the external classifier. Fails open: a
/// classifier outage must not cost results, only the cheap guard.
pub async fn boring_check(classifier: &dyn BoringClassifier, activity: &str) -> GateVerdict {
    if activity.trim().is_empty() {
        return GateVerdict::Proceed;
    }
    match classifier.is_boring(activity).await {
        Ok(true) => GateVerdict::Boring,
        Ok(false) => GateVerdict::Proceed,
        Err(e) => {
            warn!(activity, error = %e, "Boring classifier failed, proceeding");
            GateVerdict::Proceed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{analysis, MockClassifier};

    #[test]
    fn low_confidence_without_signal_is_irrelevant() {
        let verdict = content_check(&analysis(None, None, 0.1));
        assert_eq!(verdict, GateVerdict::Irrelevant);
    }

    #[test]
    fn low_confidence_with_a_location_proceeds() {
        let verdict = content_check(&analysis(None, Some("Lisbon, Portugal"), 0.1));
        assert_eq!(verdict, GateVerdict::Proceed);
    }

    #[test]
    fn confident_analysis_proceeds_even_without_signal() {
        let verdict = content_check(&analysis(None, None, 0.9));
        assert_eq!(verdict, GateVerdict::Proceed);
    }

    #[test]
    fn whitespace_only_fields_count_as_missing() {
        let verdict = content_check(&analysis(Some("  "), Some(""), 0.2));
        assert_eq!(verdict, GateVerdict::Irrelevant);
    }

    #[tokio::test]
    async fn classifier_verdict_is_respected() {
        let classifier = MockClassifier::new().boring_on("airport transfer");
        let verdict = boring_check(&classifier, "airport transfer").await;
        assert_eq!(verdict, GateVerdict::Boring);

        let verdict = boring_check(&classifier, "surfing").await;
        assert_eq!(verdict, GateVerdict::Proceed);
    }

    #[tokio::test]
    async fn classifier_error_fails_open() {
        let classifier = MockClassifier::new().failing();
        let verdict = boring_check(&classifier, "surfing").await;
        assert_eq!(verdict, GateVerdict::Proceed);
    }

    #[tokio::test]
    async fn empty_activity_skips_the_classifier() {
        let classifier = MockClassifier::new();
        let verdict = boring_check(&classifier, "   ").await;
        assert_eq!(verdict, GateVerdict::Proceed);
        assert_eq!(classifier.calls(), 0);
    }
}

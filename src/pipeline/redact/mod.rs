//! Redaction Engine.
//!
//! Detectors run in a fixed order, each over the text as left by the
//! detectors before it. Within one detector, spans are replaced
//! rightmost-first so earlier offsets stay valid while replacement
//! tokens change the string length. A span that overlaps an already
//! replaced range is skipped, so replacement tokens are never redacted
//! again. Detector order is part of the observable contract.

mod detectors;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capabilities::NerBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionKind {
    Email,
    Phone,
    GovernmentId,
    PaymentCard,
    DateOfBirth,
    Address,
    PersonName,
}

impl RedactionKind {
    /// Application order.
    pub const ORDER: [RedactionKind; 7] = [
        RedactionKind::Email,
        RedactionKind::Phone,
        RedactionKind::GovernmentId,
        RedactionKind::PaymentCard,
        RedactionKind::DateOfBirth,
        RedactionKind::Address,
        RedactionKind::PersonName,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            RedactionKind::Email => "[EMAIL_REDACTED]",
            RedactionKind::Phone => "[PHONE_REDACTED]",
            RedactionKind::GovernmentId => "[ID_REDACTED]",
            RedactionKind::PaymentCard => "[CARD_REDACTED]",
            RedactionKind::DateOfBirth => "[DOB_REDACTED]",
            RedactionKind::Address => "[ADDRESS_REDACTED]",
            RedactionKind::PersonName => "[NAME_REDACTED]",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionKind::Email => "email",
            RedactionKind::Phone => "phone",
            RedactionKind::GovernmentId => "government_id",
            RedactionKind::PaymentCard => "payment_card",
            RedactionKind::DateOfBirth => "date_of_birth",
            RedactionKind::Address => "address",
            RedactionKind::PersonName => "person_name",
        }
    }
}

/// One applied redaction. Offsets are byte positions into the text as
/// the detector saw it, recorded at detection time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionSpan {
    pub kind: RedactionKind,
    pub original: String,
    pub start: usize,
    pub end: usize,
}

/// Which detectors to run. All on by default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RedactionOptions {
    pub emails: bool,
    pub phones: bool,
    pub government_ids: bool,
    pub payment_cards: bool,
    pub dates_of_birth: bool,
    pub addresses: bool,
    pub person_names: bool,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            emails: true,
            phones: true,
            government_ids: true,
            payment_cards: true,
            dates_of_birth: true,
            addresses: true,
            person_names: true,
        }
    }
}

impl RedactionOptions {
    fn enabled(&self, kind: RedactionKind) -> bool {
        match kind {
            RedactionKind::Email => self.emails,
            RedactionKind::Phone => self.phones,
            RedactionKind::GovernmentId => self.government_ids,
            RedactionKind::PaymentCard => self.payment_cards,
            RedactionKind::DateOfBirth => self.dates_of_birth,
            RedactionKind::Address => self.addresses,
            RedactionKind::PersonName => self.person_names,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionResult {
    pub redacted_text: String,
    pub original_text: String,
    pub redactions: Vec<RedactionSpan>,
    pub redaction_count: usize,
}

pub struct RedactionEngine {
    ner: Option<Arc<dyn NerBackend>>,
}

impl RedactionEngine {
    pub fn new(ner: Option<Arc<dyn NerBackend>>) -> Self {
        Self { ner }
    }

    pub fn redact(&self, text: &str, options: &RedactionOptions) -> RedactionResult {
        let mut current = text.to_string();
        // Ranges in `current` that already hold replacement tokens.
        let mut protected: Vec<(usize, usize)> = Vec::new();
        let mut redactions = Vec::new();

        for kind in RedactionKind::ORDER {
            if !options.enabled(kind) {
                continue;
            }
            let mut spans = self.detect(kind, &current);
            spans.retain(|(start, end, _)| {
                !protected.iter().any(|&(ps, pe)| *start < pe && ps < *end)
            });
            // Rightmost first keeps earlier offsets valid.
            spans.sort_by(|a, b| b.0.cmp(&a.0));

            for (start, end, original) in spans {
                let token = kind.token();
                current.replace_range(start..end, token);

                let delta = token.len() as isize - (end - start) as isize;
                for range in protected.iter_mut() {
                    if range.0 >= end {
                        range.0 = (range.0 as isize + delta) as usize;
                        range.1 = (range.1 as isize + delta) as usize;
                    }
                }
                protected.push((start, start + token.len()));

                redactions.push(RedactionSpan {
                    kind,
                    original,
                    start,
                    end,
                });
            }
        }

        tracing::info!(count = redactions.len(), "Redaction complete");
        let redaction_count = redactions.len();
        RedactionResult {
            redacted_text: current,
            original_text: text.to_string(),
            redactions,
            redaction_count,
        }
    }

    fn detect(&self, kind: RedactionKind, text: &str) -> Vec<detectors::Span> {
        match kind {
            RedactionKind::Email => detectors::emails(text),
            RedactionKind::Phone => detectors::phones(text),
            RedactionKind::GovernmentId => detectors::government_ids(text),
            RedactionKind::PaymentCard => detectors::payment_cards(text),
            RedactionKind::DateOfBirth => detectors::dates_of_birth(text),
            RedactionKind::Address => detectors::addresses(text),
            RedactionKind::PersonName => detectors::person_names(text, self.ner.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::mock::MockNerBackend;

    fn engine() -> RedactionEngine {
        RedactionEngine::new(None)
    }

    #[test]
    fn email_and_phone_produce_exactly_two_spans() {
        let result = engine().redact(
            "Contact: john@example.com or 555-123-4567",
            &RedactionOptions::default(),
        );

        assert_eq!(result.redaction_count, 2);
        assert_eq!(result.redactions[0].kind, RedactionKind::Email);
        assert_eq!(result.redactions[1].kind, RedactionKind::Phone);
        assert!(result.redacted_text.contains("[EMAIL_REDACTED]"));
        assert!(result.redacted_text.contains("[PHONE_REDACTED]"));
        assert!(!result.redacted_text.contains("john@example.com"));
        assert!(!result.redacted_text.contains("555-123-4567"));
    }

    #[test]
    fn rightmost_first_keeps_left_offsets_valid() {
        let text = "a@b.com and c@d.com";
        let result = engine().redact(text, &RedactionOptions::default());

        assert_eq!(result.redaction_count, 2);
        // Both spans carry the original content found at their offsets.
        for span in &result.redactions {
            assert_eq!(&text[span.start..span.end], span.original);
        }
        assert_eq!(
            result.redacted_text,
            "[EMAIL_REDACTED] and [EMAIL_REDACTED]"
        );
    }

    #[test]
    fn replacement_tokens_are_never_re_redacted() {
        // Once the card token is in place, the digit shapes inside the
        // number are invisible to the DOB and ZIP detectors behind it.
        let result = engine().redact(
            "card 4111 1111 1111 1111 on file",
            &RedactionOptions::default(),
        );

        let kinds: Vec<RedactionKind> = result.redactions.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RedactionKind::PaymentCard]);
        assert_eq!(result.redacted_text, "card [CARD_REDACTED] on file");
    }

    #[test]
    fn disabled_detector_is_skipped() {
        let options = RedactionOptions {
            emails: false,
            ..RedactionOptions::default()
        };
        let result = engine().redact("mail jo@example.com", &options);

        assert_eq!(result.redaction_count, 0);
        assert_eq!(result.redacted_text, "mail jo@example.com");
    }

    #[test]
    fn original_text_is_preserved() {
        let text = "SSN 123-45-6789 on record";
        let result = engine().redact(text, &RedactionOptions::default());

        assert_eq!(result.original_text, text);
        assert_eq!(result.redactions[0].original, "123-45-6789");
        assert_eq!(result.redacted_text, "SSN [ID_REDACTED] on record");
    }

    #[test]
    fn ner_backend_drives_name_redaction() {
        let engine = RedactionEngine::new(Some(Arc::new(MockNerBackend::finding(&[(
            "Maria Gonzalez",
            "PERSON",
        )]))));
        let result = engine.redact(
            "prepared by Maria Gonzalez today",
            &RedactionOptions::default(),
        );

        assert_eq!(result.redactions[0].kind, RedactionKind::PersonName);
        assert_eq!(result.redacted_text, "prepared by [NAME_REDACTED] today");
    }

    #[test]
    fn dob_then_name_ordering() {
        let result = engine().redact(
            "Alice Johnson born 03/22/1984",
            &RedactionOptions::default(),
        );

        let kinds: Vec<RedactionKind> = result.redactions.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RedactionKind::DateOfBirth, RedactionKind::PersonName]
        );
    }
}

use intake_core::Redactor;
use proptest::prelude::*;

fn redactor() -> Redactor {
    Redactor::builtin().unwrap()
}

// ── Text without digits, at-signs or plus signs passes through untouched ──

proptest! {
    #[test]
    fn plain_prose_is_untouched(text in "[A-Za-z ,.;:!?'()\n]{0,120}") {
        prop_assert_eq!(redactor().redact(&text), text);
    }
}

// ── Contact details never survive ─────────────────────────────────────────

proptest! {
    #[test]
    fn emails_are_replaced(
        user in "[a-z][a-z0-9._]{0,10}",
        domain in "[a-z]{2,10}",
        tld in "[a-z]{2,4}"
    ) {
        let input = format!("write to {user}@{domain}.{tld} today");
        let output = redactor().redact(&input);
        prop_assert_eq!(output, "write to [EMAIL] today");
    }

    #[test]
    fn international_phones_are_replaced(
        country in "[1-9][0-9]{0,2}",
        groups in prop::collection::vec("[0-9]{2,4}", 1..4)
    ) {
        let phone = format!("+{} {}", country, groups.join("-"));
        let input = format!("call {phone}.");
        let output = redactor().redact(&input);
        prop_assert!(!output.contains('+'), "phone survived: {}", output);
        prop_assert!(output.starts_with("call [PHONE]"), "unexpected output: {}", output);
    }

    #[test]
    fn standalone_long_numbers_are_replaced(
        words in prop::collection::vec("[0-9]{1,9}", 1..8)
    ) {
        let output = redactor().redact(&words.join(" "));
        for word in output.split(' ') {
            prop_assert!(
                word == "[NUMBERS]" || (word.len() < 4 && word.chars().all(|c| c.is_ascii_digit())),
                "unexpected word {:?} in {:?}",
                word,
                output
            );
        }
    }
}

// ── Redaction is idempotent ───────────────────────────────────────────────

proptest! {
    #[test]
    fn redaction_is_idempotent(text in "[a-z0-9@+. -]{0,60}") {
        let r = redactor();
        let once = r.redact(&text);
        let twice = r.redact(&once);
        prop_assert_eq!(&once, &twice, "not idempotent for input {:?}", text);
    }
}

//! Property-based tests for identity key derivation

use proptest::prelude::*;
use tattle::archive::derive_key;

proptest! {
    #[test]
    fn key_ignores_letter_case(
        subject in "[a-zA-Z ]{1,20}",
        headline in "[a-zA-Z0-9 ]{1,40}",
        day in "20[0-9]{2}-[01][0-9]-[0-3][0-9]",
        time_a in "T[0-2][0-9]:[0-5][0-9]:[0-5][0-9]\\.[0-9]{3}Z",
        time_b in "T[0-2][0-9]:[0-5][0-9]:[0-5][0-9]\\.[0-9]{3}Z",
    ) {
        // Same calendar day, any time of day, any casing.
        let lower = derive_key(&subject.to_lowercase(), &format!("{day}{time_a}"), &headline.to_lowercase());
        let upper = derive_key(&subject.to_uppercase(), &format!("{day}{time_b}"), &headline.to_uppercase());
        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn key_is_lowercase_and_starts_with_subject(
        subject in "[A-Za-z]{1,12}",
        created_at in "20[0-9]{2}-[01][0-9]-[0-3][0-9]T00:00:00.000Z",
        headline in "[a-zA-Z0-9 äöÄÖ]{0,30}",
    ) {
        let key = derive_key(&subject, &created_at, &headline);
        prop_assert_eq!(key.clone(), key.to_lowercase());
        let expected_prefix = format!("{}__{}__", subject.to_lowercase(), &created_at[..10]);
        prop_assert!(key.starts_with(&expected_prefix));
    }

    #[test]
    fn short_timestamps_do_not_panic(created_at in "\\PC{0,12}") {
        let _ = derive_key("subject", &created_at, "headline");
    }
}

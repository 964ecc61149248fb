use proptest::prelude::*;
use psexec::redact::{Redactor, MASK};

proptest! {
    #[test]
    fn redacted_line_never_contains_the_secret(
        secret in "[a-z0-9]{1,12}",
        parts in proptest::collection::vec("[a-z0-9 =]{0,10}", 0..5),
    ) {
        let line = parts.join(&secret);
        let redactor = Redactor::new([secret.clone()]);
        let out = redactor.redact(&line);

        prop_assert!(!out.contains(&secret));
        prop_assert!(out.matches(MASK).count() >= line.matches(&secret).count());
    }

    #[test]
    fn lines_without_secrets_are_untouched(
        secrets in proptest::collection::vec("[a-f]{1,8}", 1..4),
        line in "[g-z ]{0,40}",
    ) {
        let redactor = Redactor::new(secrets);
        prop_assert_eq!(redactor.redact(&line).into_owned(), line);
    }

    #[test]
    fn disjoint_secrets_are_all_masked(
        a in "[a-f]{1,8}",
        b in "[g-m]{1,8}",
        filler in "[n-z ]{0,10}",
    ) {
        let line = format!("{filler}{a}{filler}{b}{filler}");
        let out = Redactor::new([a.clone(), b.clone()]).redact(&line).into_owned();
        prop_assert!(!out.contains(&a));
        prop_assert!(!out.contains(&b));
    }
}

use longevity_curator::Blocklist;

#[test]
fn keyword_match_is_case_insensitive() {
    let blocklist = Blocklist::new(Vec::<String>::new(), vec!["Keto"]);
    assert!(blocklist.is_blocked("New KETO miracle pill", "https://ex.co"));
    assert!(blocklist.is_blocked("keto", ""));
    assert!(!blocklist.is_blocked("Sleep matters", "https://ex.co/keto"));
}

#[test]
fn domain_match_is_case_sensitive_against_url() {
    let blocklist = Blocklist::new(vec!["tabloid.com"], Vec::<String>::new());
    assert!(blocklist.is_blocked("Anything", "https://www.tabloid.com/story"));
    assert!(!blocklist.is_blocked("Anything", "https://www.TABLOID.com/story"));
    assert!(!blocklist.is_blocked("tabloid.com says", "https://ex.co"));
}

#[test]
fn any_single_term_blocks() {
    let blocklist = Blocklist::from_csv("spam.net,ads.io", "scam,cure-all");
    assert!(blocklist.is_blocked("", "http://ads.io/x"));
    assert!(blocklist.is_blocked("The CURE-ALL you need", ""));
    assert!(!blocklist.is_blocked("Honest research", "https://journal.org"));
}

#[test]
fn empty_entries_never_match() {
    let unset = Blocklist::from_csv("", "");
    assert!(unset.is_empty());
    for (text, url) in [("", ""), ("anything", "https://ex.co"), (" ", " ")] {
        assert!(!unset.is_blocked(text, url));
    }

    let only_blanks = Blocklist::new(vec!["", " ", ""], vec!["", "  "]);
    assert!(only_blanks.is_empty());
    assert!(!only_blanks.is_blocked("text", "https://ex.co"));

    let trailing_comma = Blocklist::from_csv("spam.net,", ",scam,");
    assert_eq!(trailing_comma.domains(), ["spam.net"]);
    assert_eq!(trailing_comma.keywords(), ["scam"]);
    assert!(!trailing_comma.is_blocked("fine", "https://ex.co"));
}

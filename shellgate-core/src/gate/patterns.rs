use std::sync::LazyLock;

use regex::RegexSet;

/// Substrings that block a command outright, paired with the label shown
/// in the denial. Matching is case-insensitive.
pub const DANGEROUS_PATTERNS: &[(&str, &str)] = &[
    (r"(?i)/etc/", "/etc/"),
    (r"(?i)/var/", "/var/"),
    (r"(?i)/usr/", "/usr/"),
    (r"(?i)/bin/", "/bin/"),
    (r"(?i)/sbin/", "/sbin/"),
    (r"(?i)/root", "/root"),
    (r"(?i)/proc/", "/proc/"),
    (r"(?i)/sys/", "/sys/"),
    (r"(?i)/dev/", "/dev/"),
    (r"\$\(", "$("),
    (r"`", "`"),
];

static DANGEROUS_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    match RegexSet::new(DANGEROUS_PATTERNS.iter().map(|(pattern, _)| *pattern)) {
        Ok(set) => set,
        // Panic is acceptable thanks to the `patterns_compile` test
        Err(err) => panic!("invalid dangerous pattern set: {err}"),
    }
});

/// Label of the first dangerous pattern found in `text`.
pub fn find_dangerous_pattern(text: &str) -> Option<&'static str> {
    DANGEROUS_SET
        .matches(text)
        .iter()
        .next()
        .map(|index| DANGEROUS_PATTERNS[index].1)
}

//! Syntax checks for Kubernetes names, labels, and duration hints
//!
//! Each check returns a plain message on failure; callers wrap it into an
//! [`Error`](crate::Error) carrying the cluster and field path.

use std::time::Duration;

/// Maximum length of a DNS-1123 label (object names, label name segments)
pub const DNS1123_LABEL_MAX_LEN: usize = 63;

/// Maximum length of a DNS-1123 subdomain (base domains, label prefixes)
pub const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;

/// Validate a DNS-1123 label (lowercase alphanumeric with hyphens).
///
/// Rules:
/// - Must not be empty or longer than 63 characters
/// - May contain lowercase letters, digits, and hyphens
/// - Must start and end with an alphanumeric character
pub fn validate_dns_label(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must not be empty".to_string());
    }
    if s.len() > DNS1123_LABEL_MAX_LEN {
        return Err(format!(
            "must be no more than {DNS1123_LABEL_MAX_LEN} characters: {s}"
        ));
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "must consist of lowercase alphanumeric characters or '-': {s}"
        ));
    }

    if s.starts_with('-') || s.ends_with('-') {
        return Err(format!(
            "must start and end with an alphanumeric character: {s}"
        ));
    }

    Ok(())
}

/// Validate a DNS-1123 subdomain: dot-separated DNS-1123 labels
pub fn validate_dns_subdomain(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("must not be empty".to_string());
    }
    if s.len() > DNS1123_SUBDOMAIN_MAX_LEN {
        return Err(format!(
            "must be no more than {DNS1123_SUBDOMAIN_MAX_LEN} characters: {s}"
        ));
    }
    for label in s.split('.') {
        validate_dns_label(label).map_err(|e| format!("invalid segment in {s}: {e}"))?;
    }
    Ok(())
}

/// Validate a Kubernetes label key: `[prefix/]name`
///
/// The optional prefix is a DNS-1123 subdomain; the name is at most 63
/// characters of alphanumerics, `-`, `_` or `.`, beginning and ending with
/// an alphanumeric.
pub fn validate_label_key(key: &str) -> Result<(), String> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            validate_dns_subdomain(prefix)
                .map_err(|e| format!("invalid label key prefix '{prefix}': {e}"))?;
            name
        }
        None => key,
    };

    if name.is_empty() {
        return Err(format!("label key name must not be empty: {key}"));
    }
    validate_label_token(name).map_err(|e| format!("invalid label key '{key}': {e}"))
}

/// Validate a Kubernetes label value (may be empty)
pub fn validate_label_value(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    validate_label_token(value).map_err(|e| format!("invalid label value '{value}': {e}"))
}

fn validate_label_token(s: &str) -> Result<(), String> {
    if s.len() > DNS1123_LABEL_MAX_LEN {
        return Err(format!(
            "must be no more than {DNS1123_LABEL_MAX_LEN} characters"
        ));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("must consist of alphanumerics, '-', '_' or '.'".to_string());
    }
    let starts_ok = s.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = s.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return Err("must start and end with an alphanumeric character".to_string());
    }
    Ok(())
}

/// Parse a duration hint such as `8h`, `90m` or `1h30m`.
///
/// Accepts a sequence of decimal numbers, each with a unit suffix
/// (`ns`, `us`, `ms`, `s`, `m`, `h`). Fractions are allowed (`1.5h`).
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    if s.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(format!("invalid duration {s}: expected a number"));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| format!("invalid duration {s}: bad number"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(format!("invalid duration {s}: missing unit")),
            unit => return Err(format!("invalid duration {s}: unknown unit {unit}")),
        };
        rest = &rest[unit_len..];
        total += value * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).map_err(|_| format!("invalid duration {s}: out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::simple("mycluster")]
    #[case::hyphen("my-cluster-1")]
    #[case::digit_start("1cluster")]
    fn accepts_dns_labels(#[case] name: &str) {
        assert!(validate_dns_label(name).is_ok());
    }

    #[rstest]
    #[case::empty("")]
    #[case::upper("MyCluster")]
    #[case::trailing_hyphen("cluster-")]
    #[case::leading_hyphen("-cluster")]
    #[case::dot("my.cluster")]
    #[case::underscore("my_cluster")]
    fn rejects_invalid_dns_labels(#[case] name: &str) {
        assert!(validate_dns_label(name).is_err());
    }

    #[test]
    fn rejects_overlong_dns_label() {
        let name = "a".repeat(64);
        let err = validate_dns_label(&name).unwrap_err();
        assert!(err.contains("63"));
    }

    #[test]
    fn subdomains_are_dot_separated_labels() {
        assert!(validate_dns_subdomain("example.com").is_ok());
        assert!(validate_dns_subdomain("a.b-c.example.com").is_ok());
        assert!(validate_dns_subdomain("example..com").is_err());
        assert!(validate_dns_subdomain("Example.com").is_err());
    }

    #[test]
    fn label_keys_allow_prefix() {
        assert!(validate_label_key("foo").is_ok());
        assert!(validate_label_key("hive.openshift.io/cluster-pool").is_ok());
        assert!(validate_label_key("app.kubernetes.io/managed_by").is_ok());
        assert!(validate_label_key("Bad Prefix/foo").is_err());
        assert!(validate_label_key("example.com/").is_err());
        assert!(validate_label_key("-foo").is_err());
    }

    #[test]
    fn label_values_may_be_empty() {
        assert!(validate_label_value("").is_ok());
        assert!(validate_label_value("bar").is_ok());
        assert!(validate_label_value("v1.2_3").is_ok());
        assert!(validate_label_value("has space").is_err());
        assert!(validate_label_value("trailing-").is_err());
    }

    #[rstest]
    #[case::hours("8h", 8 * 3600)]
    #[case::mixed("1h30m", 5400)]
    #[case::fraction("1.5h", 5400)]
    #[case::seconds("45s", 45)]
    #[case::zero("0", 0)]
    fn parses_durations(#[case] input: &str, #[case] secs: u64) {
        assert_eq!(parse_duration(input).unwrap(), Duration::from_secs(secs));
    }

    #[rstest]
    #[case::empty("")]
    #[case::no_unit("8")]
    #[case::unknown_unit("8d")]
    #[case::no_number("h")]
    #[case::overflow("99999999999999999999999h")]
    fn rejects_bad_durations(#[case] input: &str) {
        assert!(parse_duration(input).is_err());
    }
}

//! BIOS version comparison.

/// Outcome of comparing the flashed BIOS against the vendor's newest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    UpToDate,
    UpdateAvailable,
}

/// Parse a vendor version the way the API's own tooling does: optional
/// leading whitespace, then the longest run of ASCII digits, in base 10.
///
/// `"1203"` and `"1203 beta"` give 1203.  A version with no leading digits
/// (`"beta"`) gives `None`.
pub fn parse_version(version: &str) -> Option<u64> {
    let trimmed = version.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Compare the recorded version with the vendor's.
///
/// Equal versions are up to date.  A vendor version that does not parse
/// cannot be shown to be older, so it reports an update.
pub fn evaluate(current: u64, remote: &str) -> UpdateStatus {
    match parse_version(remote) {
        Some(latest) if current >= latest => UpdateStatus::UpToDate,
        _ => UpdateStatus::UpdateAvailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_leading_digits() {
        assert_eq!(parse_version("1203"), Some(1203));
        assert_eq!(parse_version(" 0805"), Some(805));
        assert_eq!(parse_version("1203 beta"), Some(1203));
        assert_eq!(parse_version("beta"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn newer_or_equal_is_up_to_date() {
        assert_eq!(evaluate(1203, "1203"), UpdateStatus::UpToDate);
        assert_eq!(evaluate(1301, "1203"), UpdateStatus::UpToDate);
    }

    #[test]
    fn older_needs_update() {
        assert_eq!(evaluate(1105, "1203"), UpdateStatus::UpdateAvailable);
    }

    #[test]
    fn unparsable_remote_reports_update() {
        assert_eq!(evaluate(1105, "N/A"), UpdateStatus::UpdateAvailable);
    }
}

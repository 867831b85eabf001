//! Version information for the application, populated at build time.
//!
//! Environment display format:
//! - Prod (stable): `stable:{version}`
//! - Nightly: `nightly:{date}`
//! - Test: `main:{commit}`

/// Get the build date in RFC3339 format.
pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

/// Get the git commit hash (short).
pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

/// Get the package version.
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns the environment label and version/info string based on build
/// features, as `(env_name, info_string)`.
pub fn env_version_info() -> (&'static str, &'static str) {
    if cfg!(feature = "env_nightly") {
        ("nightly", build_date())
    } else if cfg!(feature = "env_test") {
        ("main", build_commit())
    } else {
        // Production (stable)
        ("stable", build_version())
    }
}

/// Format the environment and version info as a display string.
pub fn format_env_version() -> String {
    let (env_name, info) = env_version_info();
    // For nightly, keep just the date portion of the RFC3339 timestamp.
    if env_name == "nightly" && info.len() >= 10 && info.is_ascii() {
        format!("{}:{}", env_name, &info[..10])
    } else {
        format!("{env_name}:{info}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_not_empty() {
        assert!(!build_date().is_empty());
        assert!(!build_commit().is_empty());
        assert!(!build_version().is_empty());
    }

    #[test]
    fn env_version_has_label_and_info() {
        let (env_name, info) = env_version_info();
        assert!(!env_name.is_empty());
        assert!(!info.is_empty());
    }

    #[test]
    fn formatted_version_is_colon_separated() {
        assert!(format_env_version().contains(':'));
    }
}

//! Host OS/architecture normalization (`spec.md` §4.1).

/// Canonical host OS tag: `windows`, `darwin`, `linux`, or a lowercased
/// passthrough of whatever `std::env::consts::OS` reports.
#[must_use]
pub fn host_os() -> String {
    normalize_os(std::env::consts::OS)
}

/// Canonical host CPU architecture tag: `x86_64`, `arm64`, or a lowercased
/// passthrough of whatever `std::env::consts::ARCH` reports.
#[must_use]
pub fn host_arch() -> String {
    normalize_arch(std::env::consts::ARCH)
}

/// Normalize an OS name the way a `when.os` list entry is normalized:
/// lowercased, otherwise passed through verbatim (`spec.md` §4.1 only
/// defines an alias table for arch, not OS).
#[must_use]
pub fn normalize_os(raw: &str) -> String {
    raw.to_ascii_lowercase()
}

/// Normalize a CPU architecture name per the `spec.md` §4.1 alias table:
/// `x86_64|amd64|x64 -> x86_64`, `arm64|aarch64 -> arm64`, anything else
/// lowercased, or `"unknown"` if empty.
#[must_use]
pub fn normalize_arch(raw: &str) -> String {
    if raw.is_empty() {
        return "unknown".to_string();
    }
    match raw.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => "x86_64".to_string(),
        "arm64" | "aarch64" => "arm64".to_string(),
        other => other.to_string(),
    }
}

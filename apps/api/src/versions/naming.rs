//! Display names for generated duplicates: `<base> v<N>`.
//!
//! The base is the source name with any trailing ` vN` suffix removed (case
//! insensitive, any run of whitespace before the `v`), so repeated duplication
//! yields `Resume v3`, never `Resume v2 v3`.

/// Strips one trailing `\s+v\d+` suffix, if present.
pub fn strip_version_suffix(name: &str) -> &str {
    let digits_start = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits_start == name.len() {
        return name;
    }
    let before_digits = &name[..digits_start];
    let Some(before_v) = before_digits
        .strip_suffix('v')
        .or_else(|| before_digits.strip_suffix('V'))
    else {
        return name;
    };
    let base = before_v.trim_end();
    if base.len() == before_v.len() {
        // "Resumev2": no separating whitespace, not a version suffix.
        return name;
    }
    base
}

/// Name for a new duplicate with the given version number, at most
/// `max_chars` characters long. The base is cut short if the suffix would
/// not otherwise fit.
pub fn version_display_name(source_name: &str, version_number: i32, max_chars: usize) -> String {
    let suffix = format!(" v{version_number}");
    let room = max_chars.saturating_sub(suffix.chars().count());
    let base: String = strip_version_suffix(source_name).chars().take(room).collect();
    format!("{}{}", base.trim_end(), suffix)
}

//! Artifact file names.

/// Placeholder replaced by the hazard display name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// File name for a hazard's map, e.g. `Current_NY_Rip Current_Alert.png`.
///
/// The name is deterministic so each run overwrites the previous artifact.
/// Path separators in the display name are replaced with `_` to keep the
/// file inside the output directory.
pub fn artifact_file_name(pattern: &str, display_name: &str) -> String {
    let safe: String = display_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();

    if pattern.contains(NAME_PLACEHOLDER) {
        pattern.replace(NAME_PLACEHOLDER, &safe)
    } else {
        format!("{}{}.png", pattern, safe)
    }
}

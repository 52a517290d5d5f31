//! Technology tag parsing for the comma-separated "Technologies" field.
//!
//! Both the add form and the edit form take tags as one line of text:
//!
//! - `"React, Node.js,  MongoDB "` → `["React", "Node.js", "MongoDB"]`
//! - `"React,,Node"` → `["React", "Node"]` (empty segments are dropped)
//! - `""` → `[]`
//!
//! The edit form shows existing tags joined with `", "`, so a project that is
//! opened and saved without touching the field keeps the same tags.

const SEPARATOR: char = ',';
const DISPLAY_SEPARATOR: &str = ", ";

/// Split a comma-separated tag line into trimmed, non-empty tags.
pub fn parse_tech_list(input: &str) -> Vec<String> {
    input
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join tags back into the single line shown in the edit form.
pub fn format_tech_list(tags: &[String]) -> String {
    tags.join(DISPLAY_SEPARATOR)
}

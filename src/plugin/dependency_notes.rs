use log::*;

const DEPENDENCIES_HEADER: &str = "### Dependencies";

/// Opening line of generated dependency notes.
pub const WORKSPACE_DEPENDENCIES_NOTE: &str =
    "* The following workspace dependencies were updated";

/// Adds `notes` to the `### Dependencies` section of a changelog entry,
/// creating the section when the entry does not have one.
///
/// Notes are inserted after the last bullet of an existing section so any
/// section following it stays intact.
pub fn append_dependencies_section_to_changelog(
    changelog: &str,
    notes: &str,
) -> String {
    if changelog.trim().is_empty() {
        return format!("{DEPENDENCIES_HEADER}\n\n{notes}");
    }
    info!("appending dependency notes to changelog");

    let mut lines: Vec<&str> = vec![];
    let mut in_section = false;
    let mut seen_spacer = false;
    let mut injected = false;

    for line in changelog.split('\n') {
        if in_section && !injected {
            let trimmed = line.trim();
            if seen_spacer && !trimmed.starts_with('*') {
                lines.push(notes);
                injected = true;
            }
            if trimmed.is_empty() {
                seen_spacer = true;
            }
        }
        if line.contains(DEPENDENCIES_HEADER) {
            in_section = true;
        }
        lines.push(line);
    }

    if injected {
        return lines.join("\n");
    }
    if in_section {
        return format!("{changelog}\n{notes}");
    }

    format!("{changelog}\n\n\n{DEPENDENCIES_HEADER}\n\n{notes}")
}

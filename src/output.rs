//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every project is shown by its position and title first, with id, tech,
//! link and media as indented context lines. The id is what `project edit`
//! and `project delete` take, so it is always printed.
//!
//! # Output Format
//!
//! ## Project list
//!
//! ```text
//! 001 Shop (order 0)
//!     Id: 3f2a9c1e-...
//!     Description: An online shop for hand-made...
//!     Tech: React, Node.js, MongoDB
//!     Link: https://shop.example.com
//!     Media: youtube → https://www.youtube.com/embed/dQw4w9WgXcQ
//! ```
//!
//! ## Classification
//!
//! ```text
//! Kind: vimeo
//! Embed: https://player.vimeo.com/video/76979871
//! ```
//!
//! ## Notices
//!
//! ```text
//! Success: Project added
//! Error: Please fill in all required fields
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns lines) for testability and a
//! `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::backend::NotificationSink;
use crate::media::{MediaReference, classify};
use crate::tags::format_tech_list;
use crate::types::{Notice, Project, Severity, SiteSettings};
use std::path::Path;

const DESCRIPTION_WIDTH: usize = 60;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn media_line(reference: &MediaReference) -> Option<String> {
    let kind = reference.kind();
    reference
        .embed_url()
        .map(|url| format!("{}Media: {kind} → {url}", indent(1)))
}

// ============================================================================
// Projects
// ============================================================================

/// Format the project list in display order.
pub fn format_project_list(projects: &[Project]) -> Vec<String> {
    if projects.is_empty() {
        return vec!["No projects yet".to_string()];
    }
    let mut lines = Vec::new();
    for (pos, project) in projects.iter().enumerate() {
        lines.push(format!(
            "{} {} (order {})",
            format_index(pos + 1),
            project.title,
            project.display_order
        ));
        lines.push(format!("{}Id: {}", indent(1), project.id));
        if !project.description.is_empty() {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(&project.description, DESCRIPTION_WIDTH)
            ));
        }
        if !project.tech.is_empty() {
            lines.push(format!("{}Tech: {}", indent(1), format_tech_list(&project.tech)));
        }
        if let Some(link) = project.outbound_link() {
            lines.push(format!("{}Link: {link}", indent(1)));
        }
        lines.extend(media_line(&classify(project.image_url.as_deref())));
    }
    lines
}

pub fn print_project_list(projects: &[Project]) {
    for line in format_project_list(projects) {
        println!("{}", line);
    }
}

/// Format the settings row as shown by `folio settings show`.
pub fn format_settings(settings: Option<&SiteSettings>) -> Vec<String> {
    let Some(settings) = settings else {
        return vec!["Settings not loaded".to_string()];
    };
    let or_unset = |value: Option<&str>| value.unwrap_or("(not set)").to_string();
    vec![
        format!("Profile image: {}", or_unset(settings.profile_image_url.as_deref())),
        format!("Contact link: {}", or_unset(settings.contact_link.as_deref())),
    ]
}

pub fn print_settings(settings: Option<&SiteSettings>) {
    for line in format_settings(settings) {
        println!("{}", line);
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Format what a raw media string classifies as and how it would embed.
pub fn format_classification(raw: &str) -> Vec<String> {
    let reference = classify(Some(raw));
    let mut lines = vec![format!("Kind: {}", reference.kind())];
    if let Some(url) = reference.embed_url() {
        lines.push(format!("Embed: {url}"));
    }
    lines
}

pub fn print_classification(raw: &str) {
    for line in format_classification(raw) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// Format the list of written pages.
pub fn format_render_output(pages: &[(&str, &Path)]) -> Vec<String> {
    pages
        .iter()
        .map(|(name, path)| format!("{name} → {}", path.display()))
        .collect()
}

pub fn print_render_output(pages: &[(&str, &Path)]) {
    for line in format_render_output(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Notices
// ============================================================================

pub fn format_notice(notice: &Notice) -> String {
    format!("{}: {}", notice.title, notice.description)
}

/// Notification sink for the terminal: normal notices go to stdout,
/// destructive ones to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Normal => println!("{}", format_notice(&notice)),
            Severity::Destructive => eprintln!("{}", format_notice(&notice)),
        }
    }
}

//! HTML rendering for the public landing page and the admin project list.
//!
//! Both pages take their media markup from [`crate::media`]; neither
//! re-implements URL matching.
//!
//! ## Generated Pages
//!
//! - **Landing page** (`index.html`): profile picture, title, contact
//!   buttons and one card per project in display order
//! - **Admin list** (`admin.html`): compact project rows with a media preview
//!
//! ## Media markup
//!
//! | Reference | Landing page | Admin list |
//! |-----------|--------------|------------|
//! | YouTube / Vimeo | player `<iframe>` with the provider's `allow` list | "External video link" tile |
//! | video file | `<video controls preload="metadata">` | `<video controls>` |
//! | anything else | `<img>` | `<img>` |
//! | none | nothing | nothing |
//!
//! ## Fallbacks
//!
//! A missing or empty profile picture falls back to
//! `site.default_profile_image`; a missing or empty contact link falls back to
//! `site.default_contact_link`. Each is decided on its own.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating with
//! automatic escaping.

use crate::config::{self, FolioConfig, SiteConfig};
use crate::media::{Embed, MediaReference, classify};
use crate::types::{Project, SiteSettings};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Profile picture to show: the stored one, or the configured default.
pub fn profile_image<'a>(settings: Option<&'a SiteSettings>, site: &'a SiteConfig) -> &'a str {
    settings
        .and_then(|s| s.profile_image_url.as_deref())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(&site.default_profile_image)
}

/// Contact target: the stored one, or the configured placeholder.
pub fn contact_link<'a>(settings: Option<&'a SiteSettings>, site: &'a SiteConfig) -> &'a str {
    settings
        .and_then(|s| s.contact_link.as_deref())
        .filter(|link| !link.trim().is_empty())
        .unwrap_or(&site.default_contact_link)
}

/// Write `index.html` into `output_dir`. Returns the written path.
pub fn write_landing_page(
    config: &FolioConfig,
    projects: &[Project],
    settings: Option<&SiteSettings>,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let page = render_landing_page(config, projects, settings);
    write_page(output_dir, "index.html", page)
}

/// Write `admin.html` into `output_dir`. Returns the written path.
pub fn write_admin_page(
    config: &FolioConfig,
    projects: &[Project],
    settings: Option<&SiteSettings>,
    output_dir: &Path,
) -> Result<PathBuf, RenderError> {
    let page = render_admin_page(config, projects, settings);
    write_page(output_dir, "admin.html", page)
}

fn write_page(output_dir: &Path, name: &str, page: Markup) -> Result<PathBuf, RenderError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(name);
    fs::write(&path, page.into_string())?;
    tracing::info!(path = %path.display(), "page written");
    Ok(path)
}

fn page_css(config: &FolioConfig) -> String {
    format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    )
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Media block for a landing-page card.
pub fn media_embed(project: &Project) -> Markup {
    let Some(embed) = classify(project.image_url.as_deref()).embed() else {
        return html! {};
    };
    html! {
        div.project-media {
            @match embed {
                Embed::Frame { src, allow } => {
                    iframe src=(src) title=(project.title) allow=(allow) allowfullscreen {}
                }
                Embed::Video { src } => {
                    video src=(src) controls preload="metadata" {}
                }
                Embed::Image { src } => {
                    img src=(src) alt=(project.title) loading="lazy";
                }
            }
        }
    }
}

/// Media thumbnail for an admin list row.
pub fn media_preview(project: &Project) -> Markup {
    let reference = classify(project.image_url.as_deref());
    html! {
        @match &reference {
            MediaReference::None => {}
            MediaReference::DirectVideoFile { url } => {
                video.media-preview src=(url) controls {}
            }
            MediaReference::YouTubeVideo { .. } | MediaReference::VimeoVideo { .. } => {
                div.media-preview.media-tile { "External video link" }
            }
            MediaReference::Image { url } => {
                img.media-preview src=(url) alt=(project.title);
            }
        }
    }
}

fn tech_list(tech: &[String]) -> Markup {
    html! {
        @if !tech.is_empty() {
            ul.tech-list {
                @for tag in tech {
                    li { (tag) }
                }
            }
        }
    }
}

fn project_card(project: &Project) -> Markup {
    html! {
        article.project-card {
            (media_embed(project))
            div.project-body {
                div.project-title {
                    h3 { (project.title) }
                    @if let Some(link) = project.outbound_link() {
                        a href=(link) target="_blank" rel="noopener noreferrer"
                            aria-label={ "Open " (project.title) } { "↗" }
                    }
                }
                p { (project.description) }
                (tech_list(&project.tech))
            }
        }
    }
}

fn admin_row(project: &Project) -> Markup {
    html! {
        li.admin-row data-id=(project.id.as_str()) {
            (media_preview(project))
            div {
                h3 { (project.title) }
                p { (project.description) }
                (tech_list(&project.tech))
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the public landing page.
pub fn render_landing_page(
    config: &FolioConfig,
    projects: &[Project],
    settings: Option<&SiteSettings>,
) -> Markup {
    let site = &config.site;
    let contact = contact_link(settings, site);

    let content = html! {
        main {
            section.hero {
                img.profile-image src=(profile_image(settings, site)) alt=(site.title);
                div {
                    @if !site.tagline.is_empty() {
                        span.tagline { (site.tagline) }
                    }
                    h1 { (site.title) }
                    @if !site.intro.is_empty() {
                        p.intro { (site.intro) }
                    }
                    a.button href="#projects" { "View Projects" }
                    " "
                    a.button.outline href=(contact) target="_blank" rel="noopener" { "Contact Me" }
                }
            }
            section id="projects" {
                h2 { "Featured Projects" }
                div.project-grid {
                    @for project in projects {
                        (project_card(project))
                    }
                }
            }
            section.contact-cta {
                h3 { "Let's Build Something Amazing" }
                a.button href=(contact) target="_blank" rel="noopener" { "Contact Me" }
            }
        }
        footer { (site.title) }
    };

    base_document(&site.title, &page_css(config), None, content)
}

/// Renders the admin project list.
pub fn render_admin_page(
    config: &FolioConfig,
    projects: &[Project],
    settings: Option<&SiteSettings>,
) -> Markup {
    let site = &config.site;
    let content = html! {
        main {
            h1 { "Admin Dashboard" }
            section.settings {
                h2 { "Profile Settings" }
                img.profile-image src=(profile_image(settings, site)) alt="Profile";
                p { "Contact: " a href=(contact_link(settings, site)) { (contact_link(settings, site)) } }
            }
            section {
                h2 { "Projects" }
                ul.admin-list {
                    @for project in projects {
                        (admin_row(project))
                    }
                }
            }
        }
    };
    base_document("Admin Dashboard", &page_css(config), Some("admin"), content)
}

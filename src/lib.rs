//! # Folio
//!
//! A single-owner portfolio: a list of projects, a contact link and a profile
//! picture, kept in a record store and rendered as a static landing page.
//!
//! The interesting part is media. A project's `image_url` is whatever the
//! owner pasted or uploaded: a YouTube link, a Vimeo link, an `.mp4`, an
//! image, or junk. [`media::classify`] decides what it is at render time and
//! both the landing page and the admin list embed it through the same
//! [`media::MediaReference::embed`] call.
//!
//! # Flow
//!
//! ```text
//! form input ──► resolve::resolve_media ──► image_url ──► store
//!   (upload beats typed URL;                                │
//!    edit keeps stored media)                               ▼
//!                          render ◄── media::classify ◄── catalog
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`media`] | Media reference classification and embed URL normalization |
//! | [`tags`] | Comma-separated technology tag parsing |
//! | [`types`] | Records and form payloads shared by every layer |
//! | [`backend`] | Collaborator traits: record store, object storage, sessions, notifications |
//! | [`store`] | JSON-file record store and local-directory object storage |
//! | [`resolve`] | Which media string a submitted form stores; upload naming |
//! | [`catalog`] | In-memory project list and settings with confirm-then-refresh writes |
//! | [`admin`] | Admin-role gate and dashboard actions reporting one notice each |
//! | [`render`] | Landing page and admin list HTML using Maud |
//! | [`config`] | `folio.toml` loading, validation, merging, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Classify On Read
//!
//! The stored media string is never rewritten. A pasted watch URL stays a
//! watch URL in the store; the player URL is derived each time a page is
//! rendered. Improving the classifier therefore fixes old records too.
//!
//! ## The Store Is Authoritative
//!
//! [`catalog::Catalog`] never applies a change the store has not confirmed,
//! and reloads after every confirmed write. There is no optimistic update to
//! roll back.
//!
//! ## Failures Become Notices
//!
//! Catalog operations return typed errors; the [`admin`] layer turns every
//! outcome into exactly one [`types::Notice`]. Nothing retries on its own.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. All interpolation is auto-escaped, which matters here: every
//! title, description and media string on the page is user-typed.

pub mod admin;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod media;
pub mod output;
pub mod render;
pub mod resolve;
pub mod store;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

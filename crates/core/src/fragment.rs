//! Fragment taxonomy: the six creative atom kinds and asset media kinds.
//!
//! Fragments are persisted with their kind as a plain string column; the
//! typed enums here are used by the expansion and scoring logic. String
//! constants and `VALID_*` lists follow the same pattern as CTA types in
//! [`crate::cta`].

use std::fmt;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Fragment kinds
// ---------------------------------------------------------------------------

pub const KIND_ASSET: &str = "asset";
pub const KIND_HOOK: &str = "hook";
pub const KIND_HEADLINE: &str = "headline";
pub const KIND_BODY: &str = "body";
pub const KIND_DESCRIPTION: &str = "description";
pub const KIND_CTA_TEXT: &str = "cta_text";

/// All valid fragment kind strings, in canonical order.
pub const VALID_FRAGMENT_KINDS: &[&str] = &[
    KIND_ASSET,
    KIND_HOOK,
    KIND_HEADLINE,
    KIND_BODY,
    KIND_DESCRIPTION,
    KIND_CTA_TEXT,
];

/// The kind of a creative fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Asset,
    Hook,
    Headline,
    Body,
    Description,
    CtaText,
}

impl FragmentKind {
    /// Canonical string form, matching the database column value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKind::Asset => KIND_ASSET,
            FragmentKind::Hook => KIND_HOOK,
            FragmentKind::Headline => KIND_HEADLINE,
            FragmentKind::Body => KIND_BODY,
            FragmentKind::Description => KIND_DESCRIPTION,
            FragmentKind::CtaText => KIND_CTA_TEXT,
        }
    }

    /// Parse a kind string as stored in the database.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            KIND_ASSET => Ok(FragmentKind::Asset),
            KIND_HOOK => Ok(FragmentKind::Hook),
            KIND_HEADLINE => Ok(FragmentKind::Headline),
            KIND_BODY => Ok(FragmentKind::Body),
            KIND_DESCRIPTION => Ok(FragmentKind::Description),
            KIND_CTA_TEXT => Ok(FragmentKind::CtaText),
            other => Err(CoreError::Validation(format!(
                "Invalid fragment kind '{other}'. Must be one of: {}",
                VALID_FRAGMENT_KINDS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Media kinds (assets only)
// ---------------------------------------------------------------------------

pub const MEDIA_IMAGE: &str = "image";
pub const MEDIA_VIDEO: &str = "video";

/// All valid asset media kind strings.
pub const VALID_MEDIA_KINDS: &[&str] = &[MEDIA_IMAGE, MEDIA_VIDEO];

/// Validate an asset media kind string.
pub fn validate_media_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_MEDIA_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid media kind '{kind}'. Must be one of: {}",
            VALID_MEDIA_KINDS.join(", ")
        )))
    }
}

use crate::types::{Post, UNKNOWN_AUTHOR};

/// Why a candidate was rejected. Rejections are dropped from the result but
/// counted and logged so the loss is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyContent,
    ContentTooShort,
    MissingAuthor,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::EmptyContent => "empty content",
            RejectReason::ContentTooShort => "content below minimum length",
            RejectReason::MissingAuthor => "author missing or unknown",
        }
    }
}

/// Accept/reject a normalized record. Platforms with a site-level default
/// author skip the author check.
pub fn check(post: &Post) -> Result<(), RejectReason> {
    let content = post.content.trim();
    if content.is_empty() {
        return Err(RejectReason::EmptyContent);
    }
    if content.chars().count() < post.platform.min_content_len() {
        return Err(RejectReason::ContentTooShort);
    }

    if post.platform.default_author().is_none() {
        let author = post.author.trim();
        if author.is_empty() || author == UNKNOWN_AUTHOR {
            return Err(RejectReason::MissingAuthor);
        }
    }

    Ok(())
}

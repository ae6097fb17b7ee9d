//! Post identity derived from file names.
//!
//! Post files are named `YYYY-MM-DD-<slug>`. The date gives the post's
//! timestamp (midnight UTC) and, with the slug, its permalink
//! `YYYY/MM/<slug>`.

use chrono::NaiveDate;

/// Identity fields derived from a post file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostIdentity {
    /// Four-digit year.
    pub year: i32,
    /// Month of year (1-12).
    pub month: u32,
    /// Day of month (1-31).
    pub day: u32,
    /// Everything after the date prefix.
    pub slug: String,
    /// Seconds since the Unix epoch at midnight UTC of the date.
    pub timestamp: i64,
    /// Canonical key: `YYYY/MM/<slug>`.
    pub permalink: String,
}

impl PostIdentity {
    /// Build an identity from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`PermalinkError::EmptySlug`] for an empty slug,
    /// [`PermalinkError::InvalidSlug`] for a slug that is not a single path
    /// component and [`PermalinkError::InvalidDate`] if the date does not
    /// exist.
    pub fn new(year: i32, month: u32, day: u32, slug: &str) -> Result<Self, PermalinkError> {
        validate_slug(slug)?;
        let timestamp = midnight_utc(year, month, day)
            .ok_or(PermalinkError::InvalidDate { year, month, day })?;

        Ok(Self {
            year,
            month,
            day,
            slug: slug.to_owned(),
            timestamp,
            permalink: permalink(year, month, slug),
        })
    }

    /// File stem this identity is derived from (`YYYY-MM-DD-<slug>`).
    #[must_use]
    pub fn file_stem(&self) -> String {
        file_stem(self.year, self.month, self.day, &self.slug)
    }
}

/// Reason a file name was not accepted as a post name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermalinkError {
    /// Name does not start with `YYYY-MM-DD-`.
    #[error("name does not match YYYY-MM-DD-slug")]
    Pattern,
    /// Nothing follows the date prefix.
    #[error("name has no slug after the date")]
    EmptySlug,
    /// Slug contains a path separator, a NUL byte or `..`.
    #[error("slug {0:?} must not contain '/', '\\' or '..'")]
    InvalidSlug(String),
    /// Date prefix is well-formed but not a calendar date.
    #[error("{year:04}-{month:02}-{day:02} is not a valid date")]
    InvalidDate {
        /// Parsed year.
        year: i32,
        /// Parsed month.
        month: u32,
        /// Parsed day.
        day: u32,
    },
}

/// Derive a post identity from a file stem (no directory, no extension).
///
/// # Errors
///
/// Returns a [`PermalinkError`] describing why the stem was rejected.
pub fn derive(stem: &str) -> Result<PostIdentity, PermalinkError> {
    let year = digits(stem, 0, 4).ok_or(PermalinkError::Pattern)?;
    let month = digits(stem, 5, 7).ok_or(PermalinkError::Pattern)?;
    let day = digits(stem, 8, 10).ok_or(PermalinkError::Pattern)?;

    let separators_ok = [4, 7, 10]
        .iter()
        .all(|&idx| stem.as_bytes().get(idx) == Some(&b'-'));
    if !separators_ok {
        return Err(PermalinkError::Pattern);
    }

    let slug = stem.get(11..).unwrap_or_default();
    PostIdentity::new(year.cast_signed(), month, day, slug)
}

/// Check that `slug` can be used as one file name and permalink segment.
///
/// # Errors
///
/// Returns [`PermalinkError::EmptySlug`] or [`PermalinkError::InvalidSlug`].
pub fn validate_slug(slug: &str) -> Result<(), PermalinkError> {
    if slug.is_empty() {
        return Err(PermalinkError::EmptySlug);
    }
    if slug.contains(['/', '\\', '\0']) || slug.contains("..") {
        return Err(PermalinkError::InvalidSlug(slug.to_owned()));
    }
    Ok(())
}

/// Canonical permalink for a date and slug.
#[must_use]
pub fn permalink(year: i32, month: u32, slug: &str) -> String {
    format!("{year:04}/{month:02}/{slug}")
}

/// File stem for a date and slug.
#[must_use]
pub fn file_stem(year: i32, month: u32, day: u32, slug: &str) -> String {
    format!("{year:04}-{month:02}-{day:02}-{slug}")
}

/// Parse `stem[start..end]` as ASCII digits.
fn digits(stem: &str, start: usize, end: usize) -> Option<u32> {
    let part = stem.get(start..end)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn midnight_utc(year: i32, month: u32, day: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_valid_name() {
        let identity = derive("2024-03-07-hello-world").unwrap();

        assert_eq!(identity.year, 2024);
        assert_eq!(identity.month, 3);
        assert_eq!(identity.day, 7);
        assert_eq!(identity.slug, "hello-world");
        assert_eq!(identity.permalink, "2024/03/hello-world");
        assert_eq!(identity.timestamp, 1_709_769_600);
    }

    #[test]
    fn test_derive_epoch() {
        let identity = derive("1970-01-01-epoch").unwrap();
        assert_eq!(identity.timestamp, 0);
    }

    #[test]
    fn test_derive_slug_may_contain_dots_and_dashes() {
        let identity = derive("2023-12-31-v1.2-release-notes").unwrap();
        assert_eq!(identity.slug, "v1.2-release-notes");
        assert_eq!(identity.permalink, "2023/12/v1.2-release-notes");
    }

    #[test]
    fn test_derive_timestamps_follow_calendar_order() {
        let a = derive("2024-01-31-a").unwrap();
        let b = derive("2024-02-01-b").unwrap();
        assert_eq!(b.timestamp - a.timestamp, 86_400);
    }

    #[test]
    fn test_derive_rejects_plain_name() {
        assert_eq!(derive("about"), Err(PermalinkError::Pattern));
        assert_eq!(derive(""), Err(PermalinkError::Pattern));
    }

    #[test]
    fn test_derive_rejects_short_fields() {
        assert_eq!(derive("2024-1-07-slug"), Err(PermalinkError::Pattern));
        assert_eq!(derive("24-01-07-slug"), Err(PermalinkError::Pattern));
    }

    #[test]
    fn test_derive_rejects_wrong_separator() {
        assert_eq!(derive("2024_01_07_slug"), Err(PermalinkError::Pattern));
        assert_eq!(derive("2024-01-07slug"), Err(PermalinkError::Pattern));
    }

    #[test]
    fn test_derive_rejects_missing_slug() {
        assert_eq!(derive("2024-01-07-"), Err(PermalinkError::EmptySlug));
        assert_eq!(derive("2024-01-07"), Err(PermalinkError::Pattern));
    }

    #[test]
    fn test_new_rejects_path_like_slugs() {
        for slug in ["a/b", "../escape", "..", "a\\b", "nul\0byte", "wait..what"] {
            assert_eq!(
                PostIdentity::new(2024, 2, 10, slug),
                Err(PermalinkError::InvalidSlug(slug.to_owned())),
                "{slug:?}"
            );
        }
        assert_eq!(
            PostIdentity::new(2024, 2, 10, ""),
            Err(PermalinkError::EmptySlug)
        );
    }

    #[test]
    fn test_derive_rejects_backslash_in_name() {
        assert_eq!(
            derive("2024-02-10-a\\b"),
            Err(PermalinkError::InvalidSlug("a\\b".to_owned()))
        );
    }

    #[test]
    fn test_derive_rejects_invalid_date() {
        assert_eq!(
            derive("2024-02-30-leap"),
            Err(PermalinkError::InvalidDate {
                year: 2024,
                month: 2,
                day: 30
            })
        );
        assert!(derive("2024-13-01-x").is_err());
    }

    #[test]
    fn test_derive_rejects_non_ascii_digits() {
        assert_eq!(derive("２０２４-01-07-x"), Err(PermalinkError::Pattern));
    }

    #[test]
    fn test_file_stem_round_trips() {
        let identity = PostIdentity::new(2024, 5, 9, "notes").unwrap();
        assert_eq!(identity.file_stem(), "2024-05-09-notes");
        assert_eq!(derive(&identity.file_stem()).unwrap(), identity);
    }

    #[test]
    fn test_error_messages() {
        let err = PermalinkError::InvalidDate {
            year: 2024,
            month: 2,
            day: 30,
        };
        assert_eq!(err.to_string(), "2024-02-30 is not a valid date");
    }
}

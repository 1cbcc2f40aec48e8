//! Filesystem-safe names derived from a document title.
//!
//! The archive filename is the only place a document name touches the
//! filesystem. The rule is deliberately simple and byte-for-byte compatible
//! with what the builder has always produced:
//!
//! - every character outside `[A-Za-z0-9]` becomes one `-` (runs are not
//!   collapsed, so `"A! B"` → `"a--b"`)
//! - the result is lowercased
//! - `-chrome-extension.zip` is appended
//!
//! ```text
//! "My Checklist! 2024"  →  my-checklist--2024-chrome-extension.zip
//! "Café Tour"           →  caf--tour-chrome-extension.zip
//! ```
//!
//! Different names can share a slug (`"My List"` and `"my list"`). When one
//! batch produces the same filename twice, later ones are numbered the way a
//! browser numbers repeated downloads: `my-list-chrome-extension (1).zip`.

use std::collections::HashSet;

/// Suffix identifying the bundle flavour in the download name.
pub const ARCHIVE_SUFFIX: &str = "-chrome-extension.zip";

/// Lowercase `name`, replacing every non-ASCII-alphanumeric character with `-`.
pub fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Download filename for a document's extension archive.
pub fn archive_filename(name: &str) -> String {
    format!("{}{}", slugify(name), ARCHIVE_SUFFIX)
}

/// `filename` with ` (n)` inserted before the extension.
pub fn numbered_filename(filename: &str, n: usize) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{filename} ({n})"),
    }
}

/// Make every filename in a batch distinct, keeping input order.
///
/// The first occurrence keeps its name; each repeat gets the lowest ` (n)`
/// that no other name in the batch already uses.
pub fn unique_filenames<I>(filenames: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let filenames: Vec<String> = filenames.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(filenames.len());
    let mut first_seen: HashSet<&str> = HashSet::with_capacity(filenames.len());
    // Names that appear as-is somewhere in the batch are reserved up front.
    let reserved: HashSet<&str> = filenames.iter().map(String::as_str).collect();

    let mut unique = Vec::with_capacity(filenames.len());
    for name in &filenames {
        if first_seen.insert(name.as_str()) {
            taken.insert(name.clone());
            unique.push(name.clone());
            continue;
        }
        let mut n = 1;
        let candidate = loop {
            let candidate = numbered_filename(name, n);
            if !taken.contains(&candidate) && !reserved.contains(candidate.as_str()) {
                break candidate;
            }
            n += 1;
        };
        taken.insert(candidate.clone());
        unique.push(candidate);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_and_spaces_each_become_a_dash() {
        assert_eq!(slugify("My Checklist! 2024"), "my-checklist--2024");
    }

    #[test]
    fn archive_filename_appends_product_tag() {
        assert_eq!(
            archive_filename("My Checklist! 2024"),
            "my-checklist--2024-chrome-extension.zip"
        );
    }

    #[test]
    fn plain_name_is_only_lowercased() {
        assert_eq!(slugify("Onboarding2"), "onboarding2");
    }

    #[test]
    fn non_ascii_letters_are_replaced() {
        assert_eq!(slugify("Café Tour"), "caf--tour");
    }

    #[test]
    fn leading_and_trailing_symbols_are_kept_as_dashes() {
        assert_eq!(slugify(" (Draft) "), "--draft--");
    }

    #[test]
    fn path_separators_cannot_escape() {
        let slug = slugify("../../etc/passwd");
        assert!(!slug.contains('/'));
        assert!(!slug.contains('.'));
    }

    #[test]
    fn numbered_filename_goes_before_extension() {
        assert_eq!(
            numbered_filename("my-list-chrome-extension.zip", 2),
            "my-list-chrome-extension (2).zip"
        );
        assert_eq!(numbered_filename("noext", 1), "noext (1)");
    }

    #[test]
    fn repeated_filenames_are_numbered_in_order() {
        let names = [
            archive_filename("My List"),
            archive_filename("Other"),
            archive_filename("my list"),
            archive_filename("MY LIST"),
        ];
        assert_eq!(
            unique_filenames(names),
            vec![
                "my-list-chrome-extension.zip",
                "other-chrome-extension.zip",
                "my-list-chrome-extension (1).zip",
                "my-list-chrome-extension (2).zip",
            ]
        );
    }

    #[test]
    fn numbering_skips_names_already_in_batch() {
        let names = ["a.zip", "a.zip", "a (1).zip"].map(String::from);
        assert_eq!(unique_filenames(names), vec!["a.zip", "a (2).zip", "a (1).zip"]);
    }

    #[test]
    fn distinct_filenames_are_untouched() {
        let names = ["a.zip", "b.zip"].map(String::from);
        assert_eq!(unique_filenames(names), vec!["a.zip", "b.zip"]);
    }
}

//! Canonical `item-{id}-{photo}.{ext}` file names.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

static CANONICAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^item-(\d+)-(\d+)([xy]?)\.([a-z0-9]+)$").expect("canonical name pattern is valid")
});

/// A parsed or planned catalog image name.
///
/// `split` is a manual marker (`x` or `y`) added to a photo number to move
/// it into a separate item on the next regroup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    pub item_id: u32,
    pub photo_number: u32,
    pub split: Option<char>,
    pub extension: String,
}

impl CanonicalName {
    pub fn new(item_id: u32, photo_number: u32, extension: &str) -> Self {
        Self {
            item_id,
            photo_number,
            split: None,
            extension: extension.to_lowercase(),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let caps = CANONICAL_NAME.captures(name)?;
        Some(Self {
            item_id: caps[1].parse().ok()?,
            photo_number: caps[2].parse().ok()?,
            split: caps[3].chars().next().map(|c| c.to_ascii_lowercase()),
            extension: caps[4].to_lowercase(),
        })
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}-{}", self.item_id, self.photo_number)?;
        if let Some(split) = self.split {
            write!(f, "{}", split)?;
        }
        write!(f, ".{}", self.extension)
    }
}

/// Unique hidden name used between the two rename phases
pub fn staging_name(extension: &str) -> String {
    if extension.is_empty() {
        format!(".stage-{}", Uuid::new_v4().simple())
    } else {
        format!(".stage-{}.{}", Uuid::new_v4().simple(), extension)
    }
}

//! Tag Codec
//!
//! Tags live inside file names. A tagged stem looks like `photo - @beach @sunset`:
//! the base name, the literal separator ` -`, then one ` @tag` group per tag.
//! An untagged stem is just the base name. Tags are kept in a `BTreeSet`, so
//! rendering is always in lexicographic order and decoding then encoding any
//! legal (base, tags) pair gives back the same pair.

use crate::error::ModelError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// Ordered, duplicate-free tag collection.
pub type TagSet = BTreeSet<String>;

/// Separator between the base name and the first tag.
pub const TAG_SEPARATOR: &str = " -";

/// Prefix of each rendered tag.
pub const TAG_PREFIX: &str = " @";

static LEGAL_FILENAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9!#%&();=\[\]^_+{}~,.@\- ]*$"));

static TAGGED_NAME: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^([^\s\-@][^\-@]*)(?: -((?: @[^@\-\s]+)+))?$"));

static TAG_TOKEN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"@([^@\-\s]+)"));

static LEGAL_TAG: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9!#%&();=\[\]^_+{}~,.]+$"));

fn pattern(lazy: &'static Lazy<Result<Regex, regex::Error>>) -> Result<&'static Regex, ModelError> {
    Lazy::force(lazy)
        .as_ref()
        .map_err(|e| ModelError::InvalidArgument(format!("tag grammar failed to compile: {}", e)))
}

/// True if `name` only uses characters that are safe in a file name on every
/// platform we write to, and starts with a letter or digit.
pub fn is_legal_filename(name: &str) -> bool {
    pattern(&LEGAL_FILENAME)
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

/// Check that `tag` can be embedded in a file name and decoded back.
pub fn validate_tag(tag: &str) -> Result<(), ModelError> {
    if pattern(&LEGAL_TAG)?.is_match(tag) {
        Ok(())
    } else {
        Err(ModelError::InvalidTag(tag.to_string()))
    }
}

/// Check that `base` is usable as the untagged part of an image name.
pub fn validate_base_name(base: &str) -> Result<(), ModelError> {
    if is_legal_filename(base) && !base.contains(|c: char| c == '-' || c == '@') {
        Ok(())
    } else {
        Err(ModelError::InvalidName(base.to_string()))
    }
}

/// Split a tagged stem into its base name and tag set.
pub fn decode(tagged: &str) -> Result<(String, TagSet), ModelError> {
    if !is_legal_filename(tagged) {
        return Err(ModelError::InvalidName(tagged.to_string()));
    }
    let captures = pattern(&TAGGED_NAME)?
        .captures(tagged)
        .ok_or_else(|| ModelError::InvalidName(tagged.to_string()))?;

    let base = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ModelError::InvalidName(tagged.to_string()))?;

    let mut tags = TagSet::new();
    if let Some(group) = captures.get(2) {
        for token in pattern(&TAG_TOKEN)?.captures_iter(group.as_str()) {
            if let Some(tag) = token.get(1) {
                tags.insert(tag.as_str().to_string());
            }
        }
    }

    Ok((base, tags))
}

/// Render a base name and tag set as a tagged stem. The separator is omitted
/// entirely when there are no tags.
pub fn encode(base: &str, tags: &TagSet) -> String {
    let mut tagged = String::from(base);
    if !tags.is_empty() {
        tagged.push_str(TAG_SEPARATOR);
    }
    for tag in tags {
        tagged.push_str(TAG_PREFIX);
        tagged.push_str(tag);
    }
    tagged
}

pub fn extract_tags(tagged: &str) -> Result<TagSet, ModelError> {
    decode(tagged).map(|(_, tags)| tags)
}

pub fn extract_base(tagged: &str) -> Result<String, ModelError> {
    decode(tagged).map(|(base, _)| base)
}

/// Split `name.ext` at the last dot. The extension keeps its leading dot.
pub fn split_extension(file_name: &str) -> Result<(&str, &str), ModelError> {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => Ok((&file_name[..idx], &file_name[idx..])),
        _ => Err(ModelError::InvalidName(file_name.to_string())),
    }
}

/// A fully decoded image file name: base, tags and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedName {
    pub base: String,
    pub tags: TagSet,
    pub extension: String,
}

impl TaggedName {
    pub fn parse(file_name: &str) -> Result<Self, ModelError> {
        let (stem, extension) = split_extension(file_name)?;
        let (base, tags) = decode(stem)?;
        Ok(Self {
            base,
            tags,
            extension: extension.to_string(),
        })
    }

    /// The stem without extension, e.g. `photo - @beach`.
    pub fn stem(&self) -> String {
        encode(&self.base, &self.tags)
    }
}

impl fmt::Display for TaggedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem(), self.extension)
    }
}

//! String validators shared by the rule sets.

use std::sync::OnceLock;

use regex::Regex;

/// Characters that start a version specifier in a dependency string.
const SPECIFIER_CHARS: &[char] = &['<', '>', '=', '!', '~'];

/// Operators that count as a version constraint. `!=` alone does not pin
/// anything and is deliberately absent.
const CONSTRAINT_OPERATORS: &[&str] = &[">=", "==", "~=", "<=", "<", ">"];

fn semver_regex() -> &'static Regex {
    static SEMVER: OnceLock<Regex> = OnceLock::new();
    SEMVER.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$")
            .expect("semver pattern is valid")
    })
}

/// Package name of a requirement string: everything before the first
/// specifier character, trimmed. `torch>=2.0.0` -> `torch`.
pub fn package_name(requirement: &str) -> &str {
    let end = requirement
        .find(SPECIFIER_CHARS)
        .unwrap_or(requirement.len());
    requirement[..end].trim()
}

/// Whether a requirement string carries any version constraint.
pub fn has_version_constraint(requirement: &str) -> bool {
    CONSTRAINT_OPERATORS
        .iter()
        .any(|op| requirement.contains(*op))
}

/// `MAJOR.MINOR.PATCH` with optional `-pre` and `+build` parts. One pair of
/// surrounding double quotes is tolerated.
pub fn is_semver(version: &str) -> bool {
    let trimmed = version
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(version);
    semver_regex().is_match(trimmed)
}

/// First prefix in `prefixes` that `value` starts with.
pub fn matching_prefix<'p, I>(value: &str, prefixes: I) -> Option<&'p str>
where
    I: IntoIterator<Item = &'p String>,
{
    prefixes
        .into_iter()
        .map(String::as_str)
        .find(|p| value.starts_with(*p))
}

/// Whether `value` contains any of `fragments` as a substring.
pub fn contains_any<'p, I>(value: &str, fragments: I) -> bool
where
    I: IntoIterator<Item = &'p String>,
{
    fragments.into_iter().any(|f| value.contains(f.as_str()))
}

/// A container image reference split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub repository: &'a str,
    pub tag: Option<&'a str>,
    pub digest: Option<&'a str>,
}

impl<'a> ImageRef<'a> {
    /// Split `registry:5000/team/app:1.2@sha256:...`. A colon only counts as
    /// a tag separator after the last `/`, so registry ports are not tags.
    pub fn parse(image: &'a str) -> Self {
        let (rest, digest) = match image.split_once('@') {
            Some((r, d)) => (r, Some(d)),
            None => (image, None),
        };
        let name_start = rest.rfind('/').map(|i| i + 1).unwrap_or(0);
        match rest[name_start..].rfind(':') {
            Some(i) => {
                let split = name_start + i;
                Self {
                    repository: &rest[..split],
                    tag: Some(&rest[split + 1..]),
                    digest,
                }
            }
            None => Self {
                repository: rest,
                tag: None,
                digest,
            },
        }
    }

    /// Pinned by a non-empty tag or by digest.
    pub fn is_pinned(&self) -> bool {
        self.tag.is_some_and(|t| !t.is_empty()) || self.digest.is_some()
    }
}

//! Addon catalog entry types
//!
//! The wire format allows some fields in more than one shape (`arch` as a
//! string or a list, `post` as a command or an OS-keyed table). Those are
//! normalised into a single internal form while deserializing, so nothing
//! downstream has to inspect the raw JSON.

use crate::error::Result;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;
use url::Url;

/// Extension used by single-script addons
pub const SCRIPT_EXTENSION: &str = "lua";

/// Kind of addon, which decides the folder it is installed into
///
/// Unrecognised wire values are read as [`AddonType::Plugin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AddonType {
    #[default]
    Plugin,
    Font,
    Library,
    Color,
    Meta,
}

impl AddonType {
    /// Every addon type, in declaration order
    pub const ALL: [AddonType; 5] = [
        AddonType::Plugin,
        AddonType::Font,
        AddonType::Library,
        AddonType::Color,
        AddonType::Meta,
    ];

    /// Types that own a folder of their own under the config root
    pub const INSTALLABLE: [AddonType; 4] = [
        AddonType::Plugin,
        AddonType::Font,
        AddonType::Library,
        AddonType::Color,
    ];

    /// Folder (relative to the config root) addons of this type live in
    pub fn folder(&self) -> &'static str {
        match self {
            AddonType::Plugin | AddonType::Meta => "plugins",
            AddonType::Font => "fonts",
            AddonType::Library => "libraries",
            AddonType::Color => "colors",
        }
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonType::Plugin => "plugin",
            AddonType::Font => "font",
            AddonType::Library => "library",
            AddonType::Color => "color",
            AddonType::Meta => "meta",
        }
    }
}

impl fmt::Display for AddonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AddonType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AddonType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::error::Error::unknown_addon_type(s))
    }
}

impl From<String> for AddonType {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!("Unknown addon type {:?}, treating it as a plugin", raw);
            AddonType::Plugin
        })
    }
}

/// Raw `arch` value: a single filter or a list of them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArchSpec {
    One(String),
    Many(Vec<String>),
}

/// Operating system / architecture filter
///
/// Empty means "every platform". An entry matches when it is `*`, empty, or
/// ends with the current operating system name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<ArchSpec>", into = "Vec<String>")]
pub struct ArchFilter(Vec<String>);

impl ArchFilter {
    /// Build a filter from explicit entries
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(Into::into).collect())
    }

    /// Filter accepting every platform
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether the filter accepts the given platform
    pub fn supports(&self, platform: &Platform) -> bool {
        self.0.is_empty() || self.0.iter().any(|entry| platform.matches(entry))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

impl From<Option<ArchSpec>> for ArchFilter {
    fn from(spec: Option<ArchSpec>) -> Self {
        match spec {
            None => Self::default(),
            Some(ArchSpec::One(entry)) => Self(vec![entry]),
            Some(ArchSpec::Many(entries)) => Self(entries),
        }
    }
}

impl From<ArchFilter> for Vec<String> {
    fn from(filter: ArchFilter) -> Self {
        filter.0
    }
}

/// Raw `post` value: a plain command or a table keyed by OS name/suffix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostSpec {
    Command(String),
    PerOs(BTreeMap<String, String>),
}

/// Post-install command table
///
/// A plain command is stored under the `*` key and applies everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<PostSpec>", into = "Option<PostSpec>")]
pub struct PostCommand(BTreeMap<String, String>);

impl PostCommand {
    /// Command run on every platform
    pub fn everywhere(command: impl Into<String>) -> Self {
        let mut table = BTreeMap::new();
        table.insert(crate::platform::ANY_PLATFORM.to_string(), command.into());
        Self(table)
    }

    /// Command table keyed by OS name or suffix
    pub fn per_os<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Command for the given platform
    ///
    /// Lookup order: exact OS key, a key ending with the OS name, then the
    /// platform-independent command.
    pub fn for_platform(&self, platform: &Platform) -> Option<&str> {
        self.0
            .get(&platform.os)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(key, _)| key.ends_with(&platform.os))
                    .map(|(_, cmd)| cmd)
            })
            .or_else(|| self.0.get(crate::platform::ANY_PLATFORM))
            .map(String::as_str)
            .filter(|cmd| !cmd.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Option<PostSpec>> for PostCommand {
    fn from(spec: Option<PostSpec>) -> Self {
        match spec {
            None => Self::default(),
            Some(PostSpec::Command(cmd)) => Self::everywhere(cmd),
            Some(PostSpec::PerOs(table)) => Self(table),
        }
    }
}

impl From<PostCommand> for Option<PostSpec> {
    fn from(post: PostCommand) -> Self {
        if post.0.is_empty() {
            return None;
        }
        if post.0.len() == 1 {
            if let Some(cmd) = post.0.get(crate::platform::ANY_PLATFORM) {
                return Some(PostSpec::Command(cmd.clone()));
            }
        }
        Some(PostSpec::PerOs(post.0))
    }
}

/// Dependency or conflict declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Informational version, never enforced
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Optional dependencies may fail to install without aborting the parent
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

/// One downloadable file belonging to an addon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileArtifact {
    pub url: String,

    /// Carried but not verified
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,

    #[serde(default, skip_serializing_if = "ArchFilter::is_empty")]
    pub arch: ArchFilter,

    /// Local path override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl FileArtifact {
    /// File name the artifact is stored under when no path override is set
    pub fn file_name(&self) -> &str {
        let trimmed = self.url.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }
}

/// Location a catalog document was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Fetched over HTTP(S)
    Remote(Url),
    /// Read from a directory on disk (stub manifests)
    Local(PathBuf),
}

impl Origin {
    /// Origin for a catalog fetched from `location`
    pub fn remote(location: &str) -> Result<Self> {
        Ok(Self::Remote(Url::parse(location)?))
    }

    /// Origin for a catalog read from a directory
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self::Local(dir.into())
    }

    /// Resolve a relative reference against the directory holding the catalog
    pub fn join(&self, relative: &str) -> Result<String> {
        match self {
            Origin::Remote(base) => Ok(base.join(relative)?.to_string()),
            Origin::Local(dir) => Ok(dir.join(relative).to_string_lossy().into_owned()),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Remote(url) => write!(f, "{}", url),
            Origin::Local(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Catalog entry for an installable addon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Addon {
    /// Unique identifier, the join key across remotes and installed state
    pub id: String,

    #[serde(default)]
    pub version: String,

    /// Opaque marker of the editor mod version the addon targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_version: Option<serde_json::Value>,

    #[serde(rename = "type", default)]
    pub addon_type: AddonType,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replaces: Vec<String>,

    /// Source override, absolute or relative to the catalog
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, DependencySpec>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicts: BTreeMap<String, DependencySpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Local install path override, relative to the config root
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(default, skip_serializing_if = "ArchFilter::is_empty")]
    pub arch: ArchFilter,

    #[serde(default, skip_serializing_if = "PostCommand::is_empty")]
    pub post: PostCommand,

    /// Direct artifact override
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileArtifact>,

    /// Where this entry was read from; stamped by the catalog parser
    #[serde(skip)]
    pub origin: Option<Origin>,
}

impl Addon {
    /// Whether this addon can be installed on `platform`
    pub fn supports(&self, platform: &Platform) -> bool {
        self.arch.supports(platform)
    }

    /// Canonical location relative to the config root: `<typeFolder>/<id>`
    pub fn canonical_path(&self) -> PathBuf {
        Path::new(self.addon_type.folder()).join(&self.id)
    }

    /// Install path relative to the config root
    ///
    /// The explicit `path` wins, then the path of a sole file artifact;
    /// empty or `.` falls back to the canonical location.
    pub fn relative_destination(&self) -> PathBuf {
        let mut path = self.path.as_str();
        if path.is_empty() && self.files.len() == 1 {
            path = self.files[0].path.as_str();
        }

        match path {
            "" | "." => self.canonical_path(),
            other => PathBuf::from(other),
        }
    }

    /// Whether the install path was pinned to the canonical location
    /// explicitly, which allows cloning straight into it
    pub fn pins_canonical_path(&self) -> bool {
        self.path == "." || Path::new(&self.path) == self.canonical_path()
    }

    /// Name shown to users
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Whether another declaration of the same addon differs in the fields
    /// that decide what gets installed
    pub fn diverges_from(&self, other: &Addon) -> bool {
        self.version != other.version
            || self.mod_version != other.mod_version
            || self.remote != other.remote
    }
}

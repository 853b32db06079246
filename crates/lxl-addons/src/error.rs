//! Error types for lxl-addons

use thiserror::Error;

/// Result type alias using lxl-addons's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Catalog, subscription and installation error types
#[derive(Error, Debug)]
pub enum Error {
    /// Error bubbled up from lxl-core
    #[error(transparent)]
    Core(#[from] lxl_core::Error),

    /// HTTP transport failure
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("GET {url} returned {status}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Catalog could not be retrieved
    #[error("Cannot retrieve manifest from {location}: {source}")]
    ManifestFetch {
        location: String,
        #[source]
        source: Box<Error>,
    },

    /// Catalog body is not a valid manifest
    #[error("Error while parsing manifest from {location}: {source}")]
    ManifestParse {
        location: String,
        #[source]
        source: lxl_core::Error,
    },

    /// Every subscribed remote failed
    #[error("No valid remote found. Check your connection and subscribed remotes")]
    NoValidRemote,

    /// Identifier is not present in any catalog
    #[error("Addon not found: {id}")]
    NotFound { id: String },

    /// Requested addon is already on disk
    #[error("Addon already installed: {id}")]
    AlreadyInstalled { id: String },

    /// Requested addon is not on disk
    #[error("Addon not installed: {id}")]
    NotInstalled { id: String },

    /// Architecture filter rejects the current platform
    #[error("Addon {id} is not supported on {platform}")]
    UnsupportedPlatform { id: String, platform: String },

    /// No way to derive where the addon's content lives
    #[error("No valid endpoint for addon {id}: {reason}")]
    NoValidEndpoint { id: String, reason: String },

    /// Source link does not have the expected shape
    #[error("Malformed source link: {link}")]
    MalformedLink { link: String },

    /// Repository name carries an extension other than `.git`
    #[error("Unsupported repository extension in {link}")]
    UnsupportedExtension { link: String },

    /// Version control clone failed
    #[error("Cannot clone {repo}: {message}")]
    Clone { repo: String, message: String },

    /// Version control checkout failed
    #[error("Cannot check out {reference}: {message}")]
    Checkout { reference: String, message: String },

    /// Mandatory dependency could not be installed
    #[error("Cannot install dependency {dependency}: {source}")]
    DependencyFailed {
        dependency: String,
        #[source]
        source: Box<Error>,
    },

    /// Dependency graph loops back on itself
    #[error("Dependency cycle detected: {chain}")]
    DependencyCycle { chain: String },

    /// One or more addons listed by a stub manifest failed
    #[error("Stub {id} failed to install: {}", summarize(.failures))]
    StubBatch {
        id: String,
        failures: Vec<(String, Error)>,
    },

    /// Post-install command exited unsuccessfully
    #[error("Post-install command `{command}` failed: {status}")]
    PostInstall { command: String, status: String },

    /// Remote is already subscribed
    #[error("Remote already subscribed: {remote}")]
    RemoteExists { remote: String },

    /// Remote is not subscribed
    #[error("Remote not subscribed: {remote}")]
    RemoteNotFound { remote: String },

    /// Remote reference pins something other than the latest revision
    #[error("Unsupported remote reference '{reference}'. Only latest is supported")]
    UnsupportedRef { reference: String },

    /// Remote URL is unusable
    #[error("Invalid remote {remote}: {reason}")]
    InvalidRemote { remote: String, reason: String },
}

fn summarize(failures: &[(String, Error)]) -> String {
    failures
        .iter()
        .map(|(id, err)| format!("{} ({})", id, err))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a not installed error
    pub fn not_installed(id: impl Into<String>) -> Self {
        Self::NotInstalled { id: id.into() }
    }

    /// Create a no valid endpoint error
    pub fn no_endpoint(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoValidEndpoint {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid remote error
    pub fn invalid_remote(remote: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRemote {
            remote: remote.into(),
            reason: reason.into(),
        }
    }
}

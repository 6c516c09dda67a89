//! Module and asset fetching
//!
//! The module binary and every asset in the manifest are fetched concurrently
//! before anything is instantiated. The first failure aborts the rest.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::task::JoinSet;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Where bytes come from: an `http(s)://` URL or a local path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    Path(PathBuf),
}

impl Location {
    /// Treat `http://` and `https://` strings as URLs, anything else as a path
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Location::Url(s.to_string())
        } else {
            Location::Path(PathBuf::from(s))
        }
    }

    /// Resolve a manifest entry relative to this location
    pub fn join(&self, name: &str) -> Self {
        match self {
            Location::Url(base) => {
                Location::Url(format!("{}/{}", base.trim_end_matches('/'), name))
            }
            Location::Path(dir) => Location::Path(dir.join(name)),
        }
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<Vec<u8>, FetchError> {
        match self {
            Location::Url(url) => {
                let response = client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
            Location::Path(path) => read_file(path).await,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Url(url) => f.write_str(url),
            Location::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, FetchError> {
    tokio::fs::read(path).await.map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything a game needs before it can be instantiated
#[derive(Debug)]
pub struct Bundle {
    pub module: Vec<u8>,
    /// `(name, bytes)` in manifest order
    pub assets: Vec<(String, Vec<u8>)>,
}

impl Bundle {
    pub fn asset_bytes(&self) -> usize {
        self.assets.iter().map(|(_, bytes)| bytes.len()).sum()
    }
}

/// Fetch the module and every file in `asset_files` (relative to `asset_base`)
/// concurrently
pub async fn fetch_bundle(
    module: &Location,
    asset_base: &Location,
    asset_files: &[String],
) -> Result<Bundle, FetchError> {
    let client = reqwest::Client::new();
    let mut tasks = JoinSet::new();

    // Slot 0 is the module, slot i + 1 is asset i
    let locations = std::iter::once(module.clone())
        .chain(asset_files.iter().map(|name| asset_base.join(name)));
    for (slot, location) in locations.enumerate() {
        let client = client.clone();
        tasks.spawn(async move {
            let bytes = location.fetch(&client).await;
            (slot, location, bytes)
        });
    }

    let mut slots: Vec<Option<Vec<u8>>> = vec![None; asset_files.len() + 1];
    while let Some(joined) = tasks.join_next().await {
        let (slot, location, bytes) = match joined {
            Ok(done) => done,
            Err(e) => {
                tasks.abort_all();
                return Err(e.into());
            }
        };
        match bytes {
            Ok(bytes) => {
                tracing::debug!(%location, len = bytes.len(), "Fetched");
                slots[slot] = Some(bytes);
            }
            Err(e) => {
                tracing::error!(%location, "Fetch failed: {}", e);
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    let mut slots = slots.into_iter().map(Option::unwrap_or_default);
    let module = slots.next().unwrap_or_default();
    let assets = asset_files.iter().cloned().zip(slots).collect();
    let bundle = Bundle { module, assets };

    tracing::info!(
        module_bytes = bundle.module.len(),
        assets = bundle.assets.len(),
        asset_bytes = bundle.asset_bytes(),
        "Fetched game bundle"
    );
    Ok(bundle)
}

//! Pretrained-model fetching from HuggingFace Hub, with fallback repos.
//!
//! The GPT-SoVITS server needs a set of pretrained weights that are not
//! always present in the primary hub repo, so each asset is tried against
//! an ordered list of repositories before giving up. Plain `https://`
//! sources are cached in `~/.cache/sori/`.

use crate::error::{Result, TtsError};
use hf_hub::api::sync::Api;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Primary hub repository for GPT-SoVITS pretrained weights.
pub const PRIMARY_REPO: &str = "lj1995/GPT-SoVITS";

/// Repositories tried, in order, when the primary repo lacks a file.
pub const FALLBACK_REPOS: &[&str] = &["XXXXRT/GPT-SoVITS-Pretrained", "fishaudio/GPT-SoVITS"];

/// One named pretrained file.
#[derive(Debug, Clone, Copy)]
pub struct ModelAsset {
    /// Short name used on the CLI.
    pub name: &'static str,
    /// File name inside the hub repository.
    pub file: &'static str,
}

/// The pretrained files the synthesis server expects.
pub const PRETRAINED_ASSETS: &[ModelAsset] = &[
    ModelAsset {
        name: "t2s-v3",
        file: "s1v3.ckpt",
    },
    ModelAsset {
        name: "vits-v1",
        file: "s2G488k.pth",
    },
    ModelAsset {
        name: "vits-v2",
        file: "s2G2333k.pth",
    },
    ModelAsset {
        name: "vits-v3",
        file: "s2Gv3.pth",
    },
    ModelAsset {
        name: "t2s-v1",
        file: "s1bert25hz-2kh-longer-epoch=68e-step=50232.ckpt",
    },
];

/// Look up an asset by its CLI name.
pub fn find_asset(name: &str) -> Option<ModelAsset> {
    PRETRAINED_ASSETS.iter().copied().find(|a| a.name == name)
}

/// Create the download cache directory, `~/.cache/sori/`.
pub fn make_cache_directory() -> Result<PathBuf> {
    let home = std::env::var_os("HOME").unwrap_or_else(|| ".".into());
    let cache_dir = Path::new(&home).join(".cache").join("sori");
    fs::create_dir_all(&cache_dir)?;
    Ok(cache_dir)
}

/// Fetch one asset into `dest_dir`, trying the primary repo and then each
/// fallback repo in order. Returns the final path on disk.
pub fn fetch_asset(asset: ModelAsset, dest_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dest_dir = dest_dir.as_ref();
    fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(asset.file);
    if dest.exists() {
        log::info!("{} already present, skipping", asset.file);
        return Ok(dest);
    }

    let mut repos = vec![PRIMARY_REPO];
    repos.extend_from_slice(FALLBACK_REPOS);

    let mut last_error = String::new();
    for repo in repos {
        log::info!("fetching {} from {repo}", asset.file);
        match fetch_from_repo(repo, asset.file) {
            Ok(cached) => {
                fs::copy(&cached, &dest)?;
                return Ok(dest);
            }
            Err(e) => {
                log::warn!("{repo} did not yield {}: {e}", asset.file);
                last_error = e.to_string();
            }
        }
    }
    Err(TtsError::Download(format!(
        "all sources failed for {}: {last_error}",
        asset.file
    )))
}

fn fetch_from_repo(repo_id: &str, filename: &str) -> Result<PathBuf> {
    let api = Api::new().map_err(|e| TtsError::Download(e.to_string()))?;
    let repo = api.repo(hf_hub::Repo::model(repo_id.to_string()));
    repo.get(filename)
        .map_err(|e| TtsError::Download(e.to_string()))
}

/// Resolve a source string to a local file path.
///
/// Supported forms:
/// - `hf://owner/repo/path/to/file.bin[@revision]`: HuggingFace Hub
/// - `https://...` / `http://...`: direct download, cached locally
/// - anything else: local path, which must exist
pub fn resolve_source(source: &str) -> Result<PathBuf> {
    if let Some(stripped) = source.strip_prefix("hf://") {
        let (repo_id, filename, revision) = parse_hf_path(stripped)?;
        let api = Api::new().map_err(|e| TtsError::Download(e.to_string()))?;
        let repo = match revision {
            Some(rev) => api.repo(hf_hub::Repo::with_revision(
                repo_id,
                hf_hub::RepoType::Model,
                rev,
            )),
            None => api.repo(hf_hub::Repo::model(repo_id)),
        };
        return repo
            .get(&filename)
            .map_err(|e| TtsError::Download(e.to_string()));
    }

    if source.starts_with("http://") || source.starts_with("https://") {
        return download_http(source);
    }

    let local = PathBuf::from(source);
    if !local.exists() {
        return Err(TtsError::AssetNotFound(local));
    }
    Ok(local)
}

/// Download an HTTP(S) URL into the cache directory, atomically.
fn download_http(url: &str) -> Result<PathBuf> {
    let cache_dir = make_cache_directory()?;
    let cache_path = cache_dir.join(url_to_cache_filename(url));
    if cache_path.exists() {
        return Ok(cache_path);
    }

    log::info!("downloading {url}");
    let response = ureq::get(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => {
            TtsError::Download(format!("{url} returned status {status}"))
        }
        ureq::Error::Transport(t) => TtsError::Download(t.to_string()),
    })?;

    let mut data = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut data)
        .map_err(|e| TtsError::Download(e.to_string()))?;

    // Write then rename, so a failed download never poisons the cache.
    let temp_path = cache_path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&temp_path, &cache_path)?;

    Ok(cache_path)
}

/// Convert a URL to a safe cache filename.
fn url_to_cache_filename(url: &str) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    stripped
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' => c,
            _ => '_',
        })
        .collect()
}

/// Parse `owner/repo/path[@rev]` into hub download components.
fn parse_hf_path(path: &str) -> Result<(String, String, Option<String>)> {
    let mut parts = path.split('/').collect::<Vec<_>>();
    if parts.len() < 3 {
        return Err(TtsError::InvalidParameter(format!(
            "invalid hf:// path: {path}"
        )));
    }
    let repo_id = format!("{}/{}", parts.remove(0), parts.remove(0));
    let filename = parts.join("/");

    if let Some((file, rev)) = filename.split_once('@') {
        return Ok((repo_id, file.to_string(), Some(rev.to_string())));
    }
    Ok((repo_id, filename, None))
}

//! Download.
//!
//! This module contains the fetch capability and the stage that streams a remote artifact into a local file.

use crate::cancel::CancelToken;
use crate::error::{Error, FetchError, Result};
use std::fmt;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{instrument, trace};

// Size of the buffer used while streaming a response to disc.
#[doc(hidden)]
const CHUNK_SIZE: usize = 64 * 1024;

// Timeout for establishing a connection. Downloads themselves are not limited, runtimes are large.
#[doc(hidden)]
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// The response of a [`Fetch`].
pub struct FetchResponse {
    /// The final URL, after following redirects.
    pub url: String,
    /// The value of the `content-disposition` header, if any.
    pub content_disposition: Option<String>,
    /// The response body.
    pub body: Box<dyn Read + Send>,
}

/// The capability to fetch a remote resource.
pub trait Fetch: fmt::Debug {
    /// Fetches the given URL; non-success responses are errors.
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// [`Fetch`] implementation over HTTP(S).
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher`.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url) //
            .header(reqwest::header::ACCEPT, "application/octet-stream") //
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        Ok(FetchResponse {
            url: response.url().to_string(),
            content_disposition,
            body: Box::new(response),
        })
    }
}

/// A downloaded artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DownloadArtifact {
    /// The requested URL.
    pub url: String,
    /// The final URL, after following redirects.
    pub final_url: String,
    /// The directory the artifact was written to.
    pub dir: PathBuf,
    /// The local filename of the artifact.
    pub file_name: String,
}

impl DownloadArtifact {
    /// Returns the full path of the artifact.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Downloads the given URL into the given directory, creating the directory if necessary.
///
/// A failed download may leave a partial file behind.
#[instrument(level = "trace", skip(fetcher, cancel))]
pub fn download(fetcher: &dyn Fetch, dir: &Path, url: &str, cancel: &CancelToken) -> Result<DownloadArtifact> {
    let failed = |source: FetchError| Error::DownloadFailed {
        url: url.to_string(),
        source,
    };

    fs::create_dir_all(dir).map_err(|err| failed(err.into()))?;

    let mut response = fetcher.fetch(url).map_err(failed)?;
    let file_name = response
        .content_disposition
        .as_deref()
        .and_then(file_name_from_content_disposition)
        .or_else(|| file_name_from_url(&response.url))
        .or_else(|| file_name_from_url(url))
        .ok_or_else(|| failed(FetchError::Io(std::io::Error::other("unable to derive a file name"))))?;

    let dest = dir.join(&file_name);
    trace!(dest = %dest.display());
    let mut dest_file = File::create(&dest).map_err(|err| failed(err.into()))?;

    // stream to disc, checking for cancellation in between
    let mut buf = vec![0; CHUNK_SIZE];
    let mut bytes_written = 0_u64;
    loop {
        cancel.check()?;
        let n = response.body.read(&mut buf).map_err(|err| failed(err.into()))?;
        if n == 0 {
            break;
        }
        dest_file.write_all(&buf[..n]).map_err(|err| failed(err.into()))?;
        bytes_written += n as u64;
    }
    dest_file.flush().map_err(|err| failed(err.into()))?;
    trace!(bytes_written);

    Ok(DownloadArtifact {
        url: url.to_string(),
        final_url: response.url,
        dir: dir.to_path_buf(),
        file_name,
    })
}

// Extracts the filename from a `content-disposition` header, e.g. `attachment; filename="x.tar.gz"`.
#[doc(hidden)]
fn file_name_from_content_disposition(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|name| name.trim().trim_matches('"'))
        .and_then(sanitize_file_name)
}

// Extracts the filename from the last path segment of the given URL.
#[doc(hidden)]
fn file_name_from_url(url: &str) -> Option<String> {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    url.rsplit('/').next().and_then(sanitize_file_name)
}

// Reduces the given name to its final path component, rejecting names that are empty or navigate.
#[doc(hidden)]
fn sanitize_file_name(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    match name {
        "" | "." | ".." => None,
        _ => Some(name.to_string()),
    }
}

//! Installation.
//!
//! This module contains the orchestration of the acquisition pipeline: check for system java, resolve the options,
//! build the URL, download, verify, relocate and extract.

use crate::cancel::CancelToken;
use crate::checksum::{self, CHECKSUM_FILE_SUFFIX};
use crate::download::{self, DownloadArtifact, Fetch, HttpFetcher};
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::locate::locate_runtime;
use crate::options::{ChecksumSource, HostPlatform, InstallOptions, InstallRequest};
use crate::relocate::relocate;
use crate::system::{JavaHomeProbe, SystemJavaProbe};
use crate::url::{DEFAULT_API_URL, build_url};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, instrument, trace, warn};

/// What an installation does, as decided before anything is downloaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Plan {
    /// System java is allowed and present at the given home.
    SystemJava(PathBuf),
    /// A runtime is installed below the given install root already.
    Installed(PathBuf),
    /// The runtime has to be downloaded from the given URL.
    Download {
        /// The resolved request.
        request: InstallRequest,
        /// The download URL.
        url: String,
    },
}

/// The installer materialises a java runtime to disc.
#[derive(Debug)]
pub struct Installer {
    cancel: CancelToken,
    dry_run: bool,
    fetcher: Box<dyn Fetch>,
    host: HostPlatform,
    probe: Box<dyn JavaHomeProbe>,
}

impl Installer {
    /// Creates a new `Installer` using the given fetch capability and system java probe.
    pub fn new(fetcher: Box<dyn Fetch>, probe: Box<dyn JavaHomeProbe>) -> Self {
        Self {
            cancel: CancelToken::new(),
            dry_run: false,
            fetcher,
            host: HostPlatform::current(),
            probe,
        }
    }

    /// Creates a new `Installer` that downloads over HTTP(S) and probes the system for java.
    pub fn http() -> Result<Self> {
        let fetcher = HttpFetcher::new().map_err(|source| Error::DownloadFailed {
            url: DEFAULT_API_URL.to_string(),
            source,
        })?;

        Ok(Self::new(Box::new(fetcher), Box::new(SystemJavaProbe::default())))
    }

    /// Sets the token to cancel the installation with.
    pub fn cancel_token(&mut self, cancel: CancelToken) -> &mut Self {
        self.cancel = cancel;

        self
    }

    /// Sets whether to stop before downloading anything.
    pub fn dry_run(&mut self, dry_run: bool) -> &mut Self {
        self.dry_run = dry_run;

        self
    }

    /// Sets the host platform used to derive absent operating system and architecture.
    pub fn host(&mut self, host: HostPlatform) -> &mut Self {
        self.host = host;

        self
    }

    /// Decides what an installation according to the given options does, without downloading anything.
    ///
    /// System java is checked first, before any network or filesystem access; then the options are resolved and an
    /// existing installation is looked for (if requested).
    #[instrument(level = "trace", skip(self))]
    pub fn plan(&self, options: &InstallOptions) -> Result<Plan> {
        if options.allow_system_java()
            && let Some(home) = self.probe.find_java_home()
        {
            debug!(home = %home.display(), "using system java");
            return Ok(Plan::SystemJava(home));
        }

        self.cancel.check()?;
        let request = options.resolve(&self.host)?;
        trace!(?request);

        let install_root = request.install_root();
        if request.skip_if_installed {
            match locate_runtime(&install_root, request.os) {
                Ok(java) => {
                    debug!(java = %java.display(), "runtime already installed");
                    return Ok(Plan::Installed(install_root));
                }
                Err(err) => trace!(%err, "no usable installation present"),
            }
        }

        let url = build_url(&request);
        debug!(%url);

        Ok(Plan::Download { request, url })
    }

    /// Installs a java runtime according to the given options.
    ///
    /// Returns the install root, or `None` if system java is allowed and present or this is a dry-run. A failed
    /// installation leaves its partial state (downloads, half-extracted directories) behind.
    #[instrument(level = "trace", skip(self))]
    pub fn install(&self, options: &InstallOptions) -> Result<Option<PathBuf>> {
        let (request, url) = match self.plan(options)? {
            Plan::SystemJava(_) => return Ok(None),
            Plan::Installed(install_root) => return Ok(Some(install_root)),
            Plan::Download { request, url } => (request, url),
        };

        if self.dry_run {
            debug!(%url, "dry-run, not downloading");
            return Ok(None);
        }

        let install_root = request.install_root();

        self.cancel.check()?;
        let staging = request.staging_dir();
        let artifact = download::download(self.fetcher.as_ref(), &staging, &url, &self.cancel)?;

        self.cancel.check()?;
        self.verify(&request, &artifact)?;

        self.cancel.check()?;
        let archive = relocate(&artifact.path(), &request.install_path)?;

        self.cancel.check()?;
        extract(&archive, &install_root)?;

        if let Err(err) = fs::remove_dir_all(&staging) {
            warn!(?err, staging = %staging.display(), "failed to delete staging directory");
        }

        Ok(Some(install_root))
    }

    // Verifies the downloaded artifact according to the checksum source of the request.
    #[instrument(level = "trace", skip(self))]
    fn verify(&self, request: &InstallRequest, artifact: &DownloadArtifact) -> Result<()> {
        match request.checksum {
            ChecksumSource::Companion => {
                let url = format!("{}{CHECKSUM_FILE_SUFFIX}", artifact.final_url);
                let checksum_file = download::download(self.fetcher.as_ref(), &artifact.dir, &url, &self.cancel)?;
                checksum::verify_with_file(&artifact.path(), &checksum_file.path())
            }
            ChecksumSource::Inline(ref expected) => checksum::verify(&artifact.path(), expected),
            ChecksumSource::Skip => {
                warn!(artifact = %artifact.path().display(), "skipping checksum verification");
                Ok(())
            }
        }
    }
}

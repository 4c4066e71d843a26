use crate::http::HttpClient;
use crate::urls::CandidateDocument;
use crate::Result;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};

/// Predict every document url from a date range.
pub mod predicted;

/// Follow the links on the published distribution index page.
pub mod listing;

pub use listing::Listing;
pub use predicted::Predicted;

/// Anything that can turn a url into a document body.
///
/// Returns `None` whenever the remote does not hold a PDF at `url`; for most
/// predicted urls that is the expected answer, so it is never an error.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn get(&self, url: &str) -> Option<Vec<u8>>;
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Option<Vec<u8>> {
        (**self).get(url).await
    }
}

/// One way of filling the local document cache.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Populate `out_dir` and return the documents now held there.
    async fn fetch(&self, out_dir: &Path, tui: bool) -> Result<Vec<PathBuf>>;
}

/// [`DocumentSource`] over plain HTTP GET requests.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: HttpClient,
}

impl HttpSource {
    /// The client's timeout bounds every request.
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn get(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!("no document at {url}, error({err})");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            trace!("no document at {url}, status {status}");
            return None;
        }
        if !is_pdf(response.headers()) {
            trace!(
                "skipping {url}, content type {:?}",
                response.headers().get(CONTENT_TYPE)
            );
            return None;
        }

        match response.bytes().await {
            Ok(body) => Some(body.to_vec()),
            Err(err) => {
                debug!("failed to read body of {url}, error({err})");
                None
            }
        }
    }
}

/// True when the declared content type is a PDF, ignoring parameters.
pub(crate) fn is_pdf(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| {
            let essence = essence.trim();
            essence.eq_ignore_ascii_case("application/pdf")
                || essence.eq_ignore_ascii_case("application/x-pdf")
        })
        .unwrap_or(false)
}

/// Resolve one document into `out_dir`.
///
/// A file already named `file_name` is trusted as a complete copy and the
/// source is never asked for it.
pub async fn fetch_document<S: DocumentSource + ?Sized>(
    source: &S,
    out_dir: &Path,
    url: &str,
    file_name: &str,
) -> Result<Option<PathBuf>> {
    let path = out_dir.join(file_name);
    if tokio::fs::try_exists(&path).await? {
        trace!("{file_name} already cached");
        return Ok(Some(path));
    }

    let Some(body) = source.get(url).await else {
        return Ok(None);
    };

    crate::fs::write_document(&path, &body)
        .await
        .map_err(|err| {
            error!("failed to write {path:?}, error({err})");
            err
        })?;
    debug!("downloaded {url} to {path:?}");

    Ok(Some(path))
}

/// Resolve every candidate in turn, keeping the ones that exist locally
/// afterwards. Order follows the candidates.
pub async fn fetch_candidates<S, I>(
    source: &S,
    out_dir: &Path,
    candidates: I,
    tui: bool,
) -> Result<Vec<PathBuf>>
where
    S: DocumentSource + ?Sized,
    I: IntoIterator<Item = CandidateDocument>,
    I::IntoIter: ExactSizeIterator,
{
    let candidates = candidates.into_iter();
    tokio::fs::create_dir_all(out_dir).await.map_err(|err| {
        error!("failed to create {out_dir:?}, error({err})");
        err
    })?;

    let pb = crate::tui::progress_bar(candidates.len(), "fetching documents ...", tui);
    let mut paths = Vec::new();
    let mut stream = stream::iter(candidates);
    while let Some(candidate) = stream.next().await {
        let file_name = candidate.file_name();
        if let Some(path) = fetch_document(source, out_dir, &candidate.url, &file_name).await? {
            paths.push(path);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(paths)
}

use super::{fetch_candidates, DocumentSource, FetchStrategy};
use crate::urls::CandidateRange;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Builds every candidate url from the date range rather than scraping for
/// links; months or tax types that were never published simply miss.
pub struct Predicted<S> {
    range: CandidateRange,
    source: S,
}

impl<S: DocumentSource> Predicted<S> {
    pub fn new(range: CandidateRange, source: S) -> Self {
        Self { range, source }
    }
}

#[async_trait]
impl<S: DocumentSource> FetchStrategy for Predicted<S> {
    async fn fetch(&self, out_dir: &Path, tui: bool) -> Result<Vec<PathBuf>> {
        let time = std::time::Instant::now();
        crate::tui::banner("Predicted documents", tui);
        info!(
            "resolving {} candidates over {} months",
            self.range.len(),
            self.range.months()
        );

        let paths = fetch_candidates(&self.source, out_dir, self.range.iter(), tui).await?;

        info!(
            "{} of {} candidates held locally, {}",
            paths.len(),
            self.range.len(),
            crate::time_elapsed(time)
        );
        crate::tui::done("fetching documents", tui);

        Ok(paths)
    }
}

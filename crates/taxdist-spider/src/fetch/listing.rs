use super::{fetch_document, DocumentSource, FetchStrategy};
use crate::http::HttpClient;
use crate::Result;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet as Set;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace};
use url::Url;

/// Page listing the state's current distribution reports.
pub const INDEX_URL: &str = "https://tax.utah.gov/sales/distribution";

lazy_static::lazy_static! {
    /// Links to monthly distribution PDFs for the categories we collect.
    static ref PDF_LINK: Regex = Regex::new(
        r"(?i)/(salestax|tourism|resort|restaurant)/distribute/\d{4,}.*\.pdf"
    )
    .expect("valid distribution link pattern");

    static ref ANCHOR: Selector = Selector::parse("a[href]").expect("valid anchor selector");
}

/// Scrapes the index page for document links, then fetches each of them.
pub struct Listing<S> {
    index_url: String,
    client: HttpClient,
    source: S,
}

impl<S: DocumentSource> Listing<S> {
    pub fn new(client: HttpClient, source: S) -> Self {
        Self {
            index_url: INDEX_URL.to_string(),
            client,
            source,
        }
    }

    /// Scrape a different index page.
    pub fn with_index(mut self, index_url: impl Into<String>) -> Self {
        self.index_url = index_url.into();
        self
    }

    async fn index_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.index_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| {
                error!("failed to fetch {}, error({err})", self.index_url);
                err
            })?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl<S: DocumentSource> FetchStrategy for Listing<S> {
    async fn fetch(&self, out_dir: &Path, tui: bool) -> Result<Vec<PathBuf>> {
        let time = std::time::Instant::now();
        crate::tui::banner("Listed documents", tui);

        let html = self.index_page().await?;
        let base = Url::parse(&self.index_url)?;
        let links = document_links(&html, &base);
        info!("{} document links found on {}", links.len(), self.index_url);

        tokio::fs::create_dir_all(out_dir).await.map_err(|err| {
            error!("failed to create {out_dir:?}, error({err})");
            err
        })?;
        let pb = crate::tui::progress_bar(links.len(), "fetching documents ...", tui);
        let mut paths = Vec::new();
        let mut stream = stream::iter(&links);
        while let Some(link) = stream.next().await {
            pb.inc(1);
            let Some(file_name) = last_segment(link) else {
                trace!("skipping {link}, no file name");
                continue;
            };
            if let Some(path) =
                fetch_document(&self.source, out_dir, link.as_str(), &file_name).await?
            {
                paths.push(path);
            }
        }
        pb.finish_and_clear();

        info!(
            "{} of {} listed documents held locally, {}",
            paths.len(),
            links.len(),
            crate::time_elapsed(time)
        );
        crate::tui::done("fetching documents", tui);

        Ok(paths)
    }
}

/// Absolute urls of every distribution PDF linked from `html`, first-seen
/// order, without duplicates.
pub fn document_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = Set::new();
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !PDF_LINK.is_match(href) {
            continue;
        }
        match base.join(href) {
            Ok(url) => {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Err(err) => debug!("ignoring link {href:?}, error({err})"),
        }
    }

    links
}

/// Cache name of a listed document: the last path segment exactly as it
/// appears in the url, percent-encoding included, so `a b.pdf` is cached as
/// `a%20b.pdf` and an encoded `/` can never escape the cache directory.
fn last_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <a href="/salestax/distribute/2401ut_ftr022.pdf">Jan</a>
          <a href="https://tax.utah.gov/tourism/distribute/2402ut_ftr023.PDF">Feb</a>
          <a href="/salestax/distribute/2401ut_ftr022.pdf">Jan again</a>
          <a href="/forms/current/tc-62m.pdf">form</a>
          <a href="/salestax/distribute/index.html">index</a>
          <a>no href</a>
        </body></html>
    "#;

    #[test]
    fn links_are_filtered_resolved_and_deduplicated() {
        let base = Url::parse(INDEX_URL).unwrap();
        let links: Vec<String> = document_links(PAGE, &base)
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(
            links,
            vec![
                "https://tax.utah.gov/salestax/distribute/2401ut_ftr022.pdf",
                "https://tax.utah.gov/tourism/distribute/2402ut_ftr023.PDF",
            ]
        );
    }

    #[test]
    fn file_name_is_last_segment() {
        let url = Url::parse("https://tax.utah.gov/salestax/distribute/2401ut_ftr022.pdf").unwrap();
        assert_eq!(last_segment(&url).as_deref(), Some("2401ut_ftr022.pdf"));

        let dir = Url::parse("https://tax.utah.gov/salestax/").unwrap();
        assert_eq!(last_segment(&dir), None);
    }

    #[test]
    fn file_name_keeps_percent_encoding() {
        let base = Url::parse(INDEX_URL).unwrap();
        let spaced = base.join("/salestax/distribute/2401 ut ftr022.pdf").unwrap();
        assert_eq!(last_segment(&spaced).as_deref(), Some("2401%20ut%20ftr022.pdf"));

        let slashed = base.join("/salestax/distribute/..%2F2401ut_ftr022.pdf").unwrap();
        assert_eq!(last_segment(&slashed).as_deref(), Some("..%2F2401ut_ftr022.pdf"));
    }
}

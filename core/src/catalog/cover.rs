//! Cover art lookup and download
//!
//! The image search service is an untyped, unreliable third-party API. It is
//! modelled behind [`CoverSource`]: "nothing found" is `Ok(None)`, and only
//! transport or protocol failures are errors. The builder never lets either
//! abort a build.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::CoversConfig;

/// Error from a cover lookup or download.
#[derive(Error, Debug)]
pub enum CoverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Download failed with HTTP {status}: {url}")]
    Status { status: u16, url: String },
    #[error("Downloaded image is empty: {0}")]
    Empty(String),
    #[error("Failed to create runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Capability for resolving and fetching cover images.
pub trait CoverSource {
    /// Search for an image URL matching `query`.
    fn lookup(&self, query: &str) -> Result<Option<String>, CoverError>;

    /// Fetch the image bytes at `url`.
    fn download(&self, url: &str) -> Result<Vec<u8>, CoverError>;
}

/// Cover source that never finds anything and never touches the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCovers;

impl CoverSource for NoCovers {
    fn lookup(&self, _query: &str) -> Result<Option<String>, CoverError> {
        Ok(None)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, CoverError> {
        Err(CoverError::Empty(url.to_string()))
    }
}

/// Subset of the MediaWiki `query` response we read.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    pages: Option<HashMap<String, SearchPage>>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    original: Option<PageImage>,
    thumbnail: Option<PageImage>,
}

#[derive(Debug, Deserialize)]
struct PageImage {
    source: Option<String>,
}

impl SearchResponse {
    /// First page's original image, falling back to its thumbnail.
    fn image_url(self) -> Option<String> {
        let page = self.query?.pages?.into_values().next()?;
        page.original
            .and_then(|image| image.source)
            .or_else(|| page.thumbnail.and_then(|image| image.source))
    }
}

/// Cover source backed by the Wikipedia page-images API.
///
/// Requests are issued one at a time on a private current-thread runtime.
pub struct WikipediaCovers {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    endpoint: String,
    thumbnail_size: u32,
}

impl WikipediaCovers {
    pub fn new(config: &CoversConfig) -> Result<Self, CoverError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            runtime,
            client,
            endpoint: config.endpoint.clone(),
            thumbnail_size: config.thumbnail_size,
        })
    }

    async fn lookup_async(&self, query: &str) -> Result<Option<String>, CoverError> {
        let thumbnail_size = self.thumbnail_size.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "1"),
                ("prop", "pageimages"),
                ("piprop", "original|thumbnail"),
                ("pithumbsize", thumbnail_size.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Cover search for '{}' returned HTTP {}", query, response.status());
            return Ok(None);
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.image_url())
    }

    async fn download_async(&self, url: &str) -> Result<Vec<u8>, CoverError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CoverError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(CoverError::Empty(url.to_string()));
        }
        Ok(bytes.to_vec())
    }
}

impl CoverSource for WikipediaCovers {
    fn lookup(&self, query: &str) -> Result<Option<String>, CoverError> {
        self.runtime.block_on(self.lookup_async(query))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, CoverError> {
        self.runtime.block_on(self.download_async(url))
    }
}

/// Look up a cover for a title.
///
/// Tries the disambiguated `"<title> video game"` query first, then the bare
/// title. Only "not found" moves on to the fallback; an error ends the lookup.
pub fn find_cover_url(source: &dyn CoverSource, title: &str) -> Result<Option<String>, CoverError> {
    if let Some(url) = source.lookup(&format!("{} video game", title))? {
        return Ok(Some(url));
    }
    source.lookup(title)
}

/// Delay inserted after every successful download.
pub fn pace(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct ScriptedSource {
        answers: RefCell<Vec<Result<Option<String>, CoverError>>>,
        queries: RefCell<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(answers: Vec<Result<Option<String>, CoverError>>) -> Self {
            Self {
                answers: RefCell::new(answers),
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl CoverSource for ScriptedSource {
        fn lookup(&self, query: &str) -> Result<Option<String>, CoverError> {
            self.queries.borrow_mut().push(query.to_string());
            self.answers.borrow_mut().remove(0)
        }

        fn download(&self, _url: &str) -> Result<Vec<u8>, CoverError> {
            Ok(vec![0xFF, 0xD8])
        }
    }

    #[test]
    fn test_disambiguated_query_first() {
        let source = ScriptedSource::new(vec![Ok(Some("https://img/a.jpg".to_string()))]);
        let url = find_cover_url(&source, "Metroid Fusion").unwrap();
        assert_eq!(url.as_deref(), Some("https://img/a.jpg"));
        assert_eq!(*source.queries.borrow(), vec!["Metroid Fusion video game"]);
    }

    #[test]
    fn test_falls_back_to_bare_title() {
        let source = ScriptedSource::new(vec![Ok(None), Ok(Some("https://img/b.jpg".to_string()))]);
        let url = find_cover_url(&source, "Tetris").unwrap();
        assert_eq!(url.as_deref(), Some("https://img/b.jpg"));
        assert_eq!(*source.queries.borrow(), vec!["Tetris video game", "Tetris"]);
    }

    #[test]
    fn test_error_does_not_fall_back() {
        let source = ScriptedSource::new(vec![Err(CoverError::Empty("x".to_string()))]);
        assert!(find_cover_url(&source, "Tetris").is_err());
        assert_eq!(source.queries.borrow().len(), 1);
    }

    #[test]
    fn test_parse_prefers_original_image() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"query":{"pages":{"123":{"title":"Metroid Fusion",
                "original":{"source":"https://upload/original.jpg"},
                "thumbnail":{"source":"https://upload/thumb.jpg"}}}}}"#,
        )
        .unwrap();
        assert_eq!(body.image_url().as_deref(), Some("https://upload/original.jpg"));
    }

    #[test]
    fn test_parse_thumbnail_fallback() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"query":{"pages":{"9":{"thumbnail":{"source":"https://upload/thumb.jpg"}}}}}"#,
        )
        .unwrap();
        assert_eq!(body.image_url().as_deref(), Some("https://upload/thumb.jpg"));
    }

    #[test]
    fn test_parse_no_results() {
        let body: SearchResponse = serde_json::from_str(r#"{"batchcomplete":""}"#).unwrap();
        assert_eq!(body.image_url(), None);

        let body: SearchResponse =
            serde_json::from_str(r#"{"query":{"pages":{"1":{"title":"No image"}}}}"#).unwrap();
        assert_eq!(body.image_url(), None);
    }
}

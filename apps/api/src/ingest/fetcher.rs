//! Adzuna job-listings fetcher.
//!
//! Runs once at startup. Failures here are non-fatal: the fetcher logs and
//! returns an empty list, and the caller treats that as "no external data".

use serde::Deserialize;
use tracing::{error, info};

use crate::config::Config;
use crate::ingest::Document;

const ADZUNA_API_URL: &str = "https://api.adzuna.com/v1/api/jobs/us/search/1";
const SEARCH_QUERY: &str = "software engineer machine learning";
const FETCH_TIMEOUT_SECS: u64 = 5;

/// Default number of job listings mapped into documents per fetch.
pub const MAX_DOCUMENTS: usize = 10;

const ALTERNATIVE_RESOURCES_DOC: &str =
    "Q: What are alternative resources for learning machine learning skills?\
     A: Consider fast.ai for practical deep learning, DeepLearning.AI for AI certifications,\
     Kaggle for hands-on ML projects, or contributing to open-source projects on GitHub.";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<JobListing>,
}

#[derive(Debug, Deserialize)]
pub struct JobListing {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Client for the Adzuna job-search API.
pub struct JobFetcher {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_key: String,
}

impl JobFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: ADZUNA_API_URL.to_string(),
            app_id: config.adzuna_app_id.clone(),
            app_key: config.adzuna_api_key.clone(),
        }
    }

    /// Overrides the API base URL. Used by tests to point at a mock server.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches up to `max_documents` job listings and maps them into Q&A-style
    /// documents, appending the static alternative-resources document.
    /// Returns an empty Vec on any network or HTTP error.
    pub async fn fetch_career_data(&self, max_documents: usize) -> Vec<Document> {
        match self.fetch_listings(max_documents).await {
            Ok(listings) => {
                let documents = map_listings(&listings, max_documents);
                info!("Fetched {} job documents", documents.len());
                documents
            }
            Err(e) => {
                error!("Error fetching career data: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch_listings(&self, max_documents: usize) -> Result<Vec<JobListing>, reqwest::Error> {
        let per_page = max_documents.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("what", SEARCH_QUERY),
                ("results_per_page", per_page.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }
}

/// Maps job listings into "Q: ... A: ..." documents tagged `job_{idx}`,
/// then appends the static alternative-resources document.
pub fn map_listings(listings: &[JobListing], max_documents: usize) -> Vec<Document> {
    let mut documents: Vec<Document> = listings
        .iter()
        .take(max_documents)
        .enumerate()
        .map(|(idx, job)| {
            let title = job.title.as_deref().unwrap_or("Unknown Job");
            let description = job
                .description
                .as_deref()
                .unwrap_or("No description available");
            Document::new(
                format!("Q: What skills are needed for {title}? A: {description}"),
                &format!("job_{idx}"),
            )
        })
        .collect();

    documents.push(Document::new(
        ALTERNATIVE_RESOURCES_DOC,
        "alternative_resources",
    ));

    documents
}

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::models::{self, Article};

const ARTICLES_ENDPOINT: &str = "https://eventregistry.org/api/v1/article/getArticles";

/// Hard ceiling on how many raw results we ask the provider for.
const PROVIDER_RESULT_CEILING: usize = 200;

/// Broad, always-newsworthy keywords used only by the empty-result
/// sanity check.
const SANITY_KEYWORDS: [&str; 3] = ["Apple", "Tesla", "Microsoft"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticlesRequest<'a> {
    action: &'a str,
    keyword: &'a [String],
    keyword_oper: &'a str,
    lang: &'a str,
    date_start: String,
    date_end: String,
    articles_sort_by: &'a str,
    articles_count: usize,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct ArticlesResponse {
    #[serde(default)]
    articles: ArticlesPage,
}

#[derive(Debug, Default, Deserialize)]
struct ArticlesPage {
    #[serde(default)]
    results: Vec<RawArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawArticle {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    source: Option<RawSource>,
    #[serde(default, rename = "dateTime")]
    date_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    title: Option<String>,
}

/// What one fetch should look for. Built once from the config by the binary.
#[derive(Debug, Clone)]
pub struct FetchParams {
    pub keywords: Vec<String>,
    pub language: String,
    pub lookback_days: i64,
    pub allow_domains: Vec<String>,
    pub max_articles: usize,
    pub debug: bool,
    pub verify_empty_results: bool,
}

pub struct NewsApiClient {
    client: Client,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, api_key })
    }

    /// Fetch, deduplicate, domain-filter and sort recent articles.
    ///
    /// Domain filtering happens client-side, so we over-fetch to compensate
    /// for post-filter loss. If a non-empty allow-list filters everything
    /// out, the same raw results are re-collected with the filter cleared
    /// rather than returning an empty digest. The allow-list is never part
    /// of the provider query, so repeating the fetch would return the same
    /// stream; the fallback reuses the raw results instead of making a
    /// second round-trip.
    pub async fn fetch_articles(&self, params: &FetchParams) -> Result<Vec<Article>> {
        let request_count = PROVIDER_RESULT_CEILING.min(3 * params.max_articles.max(1));
        let raw = self
            .query_provider(
                &params.keywords,
                &params.language,
                params.lookback_days,
                request_count,
            )
            .await?;

        if params.debug {
            eprintln!("Provider returned {} raw results", raw.len());
        }

        let mut articles = collect_articles(&raw, &params.allow_domains, params.max_articles);

        if articles.is_empty() && !params.allow_domains.is_empty() {
            if params.debug {
                eprintln!(
                    "Allow-list {:?} matched nothing; falling back to unfiltered results",
                    params.allow_domains
                );
            }
            articles = collect_articles(&raw, &[], params.max_articles);
        }

        models::sort_newest_first(&mut articles);

        if articles.is_empty() && params.verify_empty_results {
            self.report_empty_result_diagnosis(&params.language).await;
        }

        Ok(articles)
    }

    async fn query_provider(
        &self,
        keywords: &[String],
        language: &str,
        lookback_days: i64,
        count: usize,
    ) -> Result<Vec<RawArticle>> {
        let now = Utc::now();
        let date_start = (now - Duration::days(lookback_days))
            .format("%Y-%m-%d")
            .to_string();
        let date_end = now.format("%Y-%m-%d").to_string();

        let request = ArticlesRequest {
            action: "getArticles",
            keyword: keywords,
            keyword_oper: "or",
            lang: language,
            date_start,
            date_end,
            articles_sort_by: "date",
            articles_count: count,
            api_key: &self.api_key,
        };

        let response = self
            .client
            .post(ARTICLES_ENDPOINT)
            .json(&request)
            .send()
            .await
            .context("Failed to query the news provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("News provider returned error: {} - {}", status, error_text);
        }

        let parsed = response
            .json::<ArticlesResponse>()
            .await
            .context("Failed to parse news provider response")?;

        Ok(parsed.articles.results)
    }

    /// Advisory only: when the final list is empty, probe the provider with
    /// broad keywords over short windows to tell whether the emptiness comes
    /// from our filters or from a genuine absence of matching news. Never
    /// changes the result; its own failures are only logged.
    async fn report_empty_result_diagnosis(&self, language: &str) {
        for days in [1_i64, 7] {
            match self
                .query_provider(
                    &SANITY_KEYWORDS.map(String::from),
                    language,
                    days,
                    1,
                )
                .await
            {
                Ok(results) if !results.is_empty() => {
                    eprintln!(
                        "Empty-result check: provider has news in the last {} day(s); \
                         the query or allow-list is likely too strict",
                        days
                    );
                }
                Ok(_) => {
                    eprintln!(
                        "Empty-result check: even a broad query over {} day(s) returned nothing",
                        days
                    );
                }
                Err(e) => {
                    eprintln!("Empty-result check failed (ignored): {}", e);
                }
            }
        }
    }
}

/// One pass over the provider's raw results, in native order: drop entries
/// without a URL, drop repeated URLs, drop hosts outside the allow-list,
/// normalize the rest. Stops once `cap` articles are accepted.
fn collect_articles(raw: &[RawArticle], allow_domains: &[String], cap: usize) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut articles = Vec::new();

    for item in raw {
        if articles.len() >= cap {
            break;
        }

        let url = match item.url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u,
            _ => continue,
        };
        if !seen.insert(url.to_string()) {
            continue;
        }
        if !host_allowed(url, allow_domains) {
            continue;
        }

        articles.push(Article {
            title: item.title.clone(),
            description: item.body.clone(),
            source: item.source.as_ref().and_then(|s| s.title.clone()),
            url: url.to_string(),
            published_at: item.date_time.clone(),
        });
    }

    articles
}

/// A host passes when it equals an allow-listed domain or is a subdomain of
/// one (dot-suffix match). Comparison is case-insensitive with a leading
/// `www.` stripped from the host.
fn host_allowed(article_url: &str, allow_domains: &[String]) -> bool {
    if allow_domains.is_empty() {
        return true;
    }

    let host = match Url::parse(article_url) {
        Ok(parsed) => match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    allow_domains.iter().any(|domain| {
        let domain = domain.trim().to_lowercase();
        !domain.is_empty() && (host == domain || host.ends_with(&format!(".{}", domain)))
    })
}

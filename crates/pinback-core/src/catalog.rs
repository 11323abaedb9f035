//! The remote search service and its stand-ins.

use crate::color::{hue_distance, RgbHex};
use crate::filter::Category;
use crate::query::{endpoint, Query};
use crate::record::ImageRecord;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{url} answered with HTTP {status}")]
    Status { status: u16, url: String },
    #[error("unexpected response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("catalog unavailable: {0}")]
    Catalog(String),
}

/// Anything that can answer image and suggestion queries.
pub trait Catalog: Send + Sync {
    fn images(&self, query: &Query) -> Result<Vec<ImageRecord>, FetchError>;
    fn suggestions(&self, prefix: &str) -> Result<Vec<String>, FetchError>;
    /// Human-readable form of the request `query` maps to.
    fn describe(&self, query: &Query) -> String;
}

/// Client for the archive HTTP service.
pub struct HttpCatalog {
    base: Url,
    client: reqwest::blocking::Client,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base = Url::parse(base_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pinback/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, client })
    }

    pub fn suggestions_url(&self, prefix: &str) -> Result<Url, FetchError> {
        let mut url = endpoint(&self.base, "suggestions")?;
        url.query_pairs_mut().append_pair("q", prefix);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "GET");
        let resp = self.client.get(url.clone()).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text()?;
        serde_json::from_str(&body).map_err(|source| FetchError::Malformed {
            url: url.to_string(),
            source,
        })
    }
}

impl Catalog for HttpCatalog {
    fn images(&self, query: &Query) -> Result<Vec<ImageRecord>, FetchError> {
        let url = query.request_url(&self.base)?;
        self.get_json(url)
    }

    fn suggestions(&self, prefix: &str) -> Result<Vec<String>, FetchError> {
        let url = self.suggestions_url(prefix)?;
        self.get_json(url)
    }

    fn describe(&self, query: &Query) -> String {
        match query.request_url(&self.base) {
            Ok(url) => url.to_string(),
            Err(e) => format!("<invalid url: {e}>"),
        }
    }
}

/// In-memory catalog that filters the way the archive service does.
#[derive(Debug, Default, Clone)]
pub struct MemCatalog {
    records: Vec<ImageRecord>,
    label: String,
}

impl MemCatalog {
    pub fn new(records: Vec<ImageRecord>) -> Self {
        Self {
            records,
            label: "memory".into(),
        }
    }

    /// Load a JSON array of records, the same shape `GET /images` returns.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| FetchError::Catalog(format!("{}: {e}", path.display())))?;
        let records: Vec<ImageRecord> = serde_json::from_slice(&bytes).map_err(|source| {
            FetchError::Malformed {
                url: path.display().to_string(),
                source,
            }
        })?;
        Ok(Self {
            records,
            label: path.display().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn matches(&self, record: &ImageRecord, query: &Query) -> bool {
        if let Some(range) = query.date_range {
            match record.year() {
                Some(y) if (range.min..=range.max).contains(&y) => {}
                _ => return false,
            }
        }
        if let Some(category) = query.category {
            let political = Category::PoliticalCampaigns.as_param();
            let ok = match (category, record.kind.as_deref()) {
                (Category::PoliticalCampaigns, Some(k)) => k == political,
                (Category::Other, Some(k)) => k != political,
                (_, None) => false,
            };
            if !ok {
                return false;
            }
        }
        if let Some(m) = query.color {
            let Some(color) = record.color.as_deref().and_then(|c| c.parse::<RgbHex>().ok())
            else {
                return false;
            };
            if hue_distance(m.color.hue(), color.hue()) > m.hue_tolerance as f64 {
                return false;
            }
        }
        if let Some(k) = &query.keyword {
            let needle = k.to_lowercase();
            let in_title = record.display_title().to_lowercase().contains(&needle);
            let in_ocr = record
                .ocr_text
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            if !in_title && !in_ocr {
                return false;
            }
        }
        true
    }

    fn suggestion_candidates(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for r in &self.records {
            let title = r.display_title();
            if !title.trim().is_empty() {
                out.insert(title.trim().to_string());
            }
            if let Some(text) = &r.ocr_text {
                for word in text.split(|c: char| !c.is_alphanumeric()) {
                    if word.chars().count() >= 3 {
                        out.insert(word.to_lowercase());
                    }
                }
            }
        }
        out
    }
}

impl Catalog for MemCatalog {
    fn images(&self, query: &Query) -> Result<Vec<ImageRecord>, FetchError> {
        Ok(self
            .records
            .iter()
            .filter(|r| self.matches(r, query))
            .cloned()
            .collect())
    }

    fn suggestions(&self, prefix: &str) -> Result<Vec<String>, FetchError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let matcher = SkimMatcherV2::default().ignore_case();
        let mut scored: Vec<(i64, String)> = self
            .suggestion_candidates()
            .into_iter()
            .filter_map(|c| matcher.fuzzy_match(&c, prefix).map(|s| (s, c)))
            .collect();
        // BTreeSet order breaks score ties alphabetically
        scored.sort_by_key(|(s, _)| -*s);
        Ok(scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, c)| c)
            .collect())
    }

    fn describe(&self, query: &Query) -> String {
        let params: Vec<String> = query
            .to_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if params.is_empty() {
            format!("{}:images", self.label)
        } else {
            format!("{}:images?{}", self.label, params.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ColorMatch, YearRange};

    fn record(id: i64, title: &str, date: &str, kind: &str, color: Option<&str>) -> ImageRecord {
        let mut r = ImageRecord::new(id, title);
        r.date = Some(date.into());
        r.kind = Some(kind.into());
        r.color = color.map(str::to_string);
        r
    }

    fn sample() -> MemCatalog {
        let mut ocr = record(4, "Fish-Fry", "1975", "other", Some("#0000ff"));
        ocr.ocr_text = Some("Annual fish fry, Lakeside Lodge".into());
        MemCatalog::new(vec![
            record(1, "Ike-for-President", "1952", "political-campaigns", Some("#ff0000")),
            record(2, "All-the-Way-with-LBJ", "1964", "political-campaigns", Some("#0000ff")),
            record(3, "Bowling-League", "1958", "other", Some("#ff1000")),
            ocr,
            ImageRecord::new(5, "Undated"),
        ])
    }

    fn ids(v: Vec<ImageRecord>) -> Vec<i64> {
        v.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn unconstrained_returns_everything() {
        assert_eq!(ids(sample().images(&Query::default()).unwrap()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn date_range_is_inclusive_and_skips_undated() {
        let q = Query {
            date_range: Some(YearRange { min: 1952, max: 1964 }),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&q).unwrap()), vec![1, 2, 3]);
    }

    #[test]
    fn other_means_not_political() {
        let q = Query {
            category: Some(Category::Other),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&q).unwrap()), vec![3, 4]);
        let q = Query {
            category: Some(Category::PoliticalCampaigns),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&q).unwrap()), vec![1, 2]);
    }

    #[test]
    fn hue_tolerance_bounds_color_match() {
        let red = "#ff0000".parse().unwrap();
        let tight = Query {
            color: Some(ColorMatch { color: red, hue_tolerance: 0 }),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&tight).unwrap()), vec![1]);
        let loose = Query {
            color: Some(ColorMatch { color: red, hue_tolerance: 10 }),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&loose).unwrap()), vec![1, 3]);
    }

    #[test]
    fn keyword_searches_title_and_ocr() {
        let q = Query {
            keyword: Some("lakeside".into()),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&q).unwrap()), vec![4]);
        let q = Query {
            keyword: Some("way with".into()),
            ..Query::default()
        };
        assert_eq!(ids(sample().images(&q).unwrap()), vec![2]);
    }

    #[test]
    fn suggestions_are_ranked_and_capped() {
        let cat = sample();
        let s = cat.suggestions("ike").unwrap();
        assert_eq!(s.first().map(String::as_str), Some("Ike for President"));
        assert!(s.len() <= MAX_SUGGESTIONS);
        assert!(cat.suggestions("   ").unwrap().is_empty());
        assert!(cat.suggestions("lakes").unwrap().contains(&"lakeside".to_string()));
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"[{"id": 1, "title": "A", "dimension": "2cm"}]"#).unwrap();
        let cat = MemCatalog::from_path(&path).unwrap();
        assert_eq!(cat.len(), 1);

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(MemCatalog::from_path(&path), Err(FetchError::Malformed { .. })));
        assert!(matches!(
            MemCatalog::from_path(dir.path().join("missing.json")),
            Err(FetchError::Catalog(_))
        ));
    }

    #[test]
    fn http_urls() {
        let cat = HttpCatalog::new("http://127.0.0.1:8000", Duration::from_secs(1)).unwrap();
        assert_eq!(
            cat.suggestions_url("ike for").unwrap().as_str(),
            "http://127.0.0.1:8000/suggestions?q=ike+for"
        );
        assert_eq!(cat.describe(&Query::default()), "http://127.0.0.1:8000/images");
        assert!(matches!(
            HttpCatalog::new("not a url", Duration::from_secs(1)),
            Err(FetchError::Url(_))
        ));
    }
}

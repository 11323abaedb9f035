//! Canonical remote query derived from a [`FilterState`].

use crate::color::RgbHex;
use crate::filter::{Category, FilterState};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ColorMatch {
    pub color: RgbHex,
    pub hue_tolerance: u8,
}

/// The search-relevant subset of the filter state.
///
/// Absent fields mean "no constraint". Equality is structural, so it does
/// not matter in which order the filters were touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<YearRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Build the query for `state`. Cosmetic fields (grid size, scale, render
/// mode) never contribute.
pub fn compose_query(state: &FilterState) -> Query {
    let date_range = state.date_filter_enabled().then(|| {
        let (min, max) = state.year_range();
        YearRange { min, max }
    });

    // Both boxes cleared is treated like both ticked: no constraint.
    let category = match (
        state.shows(Category::PoliticalCampaigns),
        state.shows(Category::Other),
    ) {
        (true, false) => Some(Category::PoliticalCampaigns),
        (false, true) => Some(Category::Other),
        (true, true) | (false, false) => None,
    };

    let color = match (state.color_filter_enabled(), state.color()) {
        (true, Some(color)) => Some(ColorMatch {
            color,
            hue_tolerance: state.hue_tolerance(),
        }),
        _ => None,
    };

    let keyword = Some(state.keyword().trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    Query {
        date_range,
        category,
        color,
        keyword,
    }
}

impl Query {
    /// Query-string pairs for `GET /images`, in a fixed order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(range) = self.date_range {
            params.push(("apply_date", "true".to_string()));
            params.push(("min_date", range.min.to_string()));
            params.push(("max_date", range.max.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("type", category.as_param().to_string()));
        }
        if let Some(m) = self.color {
            params.push(("color", m.color.to_string()));
            params.push(("hue_tolerance", m.hue_tolerance.to_string()));
        }
        if let Some(k) = &self.keyword {
            params.push(("keyword", k.clone()));
        }
        params
    }

    /// Full request URL against `base` (e.g. `http://127.0.0.1:8000`).
    pub fn request_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = endpoint(base, "images")?;
        let params = self.to_params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub fn is_unconstrained(&self) -> bool {
        *self == Query::default()
    }
}

/// `base` joined with `path`, treating `base` as a directory.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        base.join(path)
    } else {
        let mut dir = base.clone();
        dir.set_path(&format!("{}/", base.path()));
        dir.join(path)
    }
}

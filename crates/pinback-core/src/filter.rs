//! User-adjustable filter and display controls.
//!
//! `FilterState` is an immutable value. Every user interaction is expressed as
//! a [`FilterAction`] and folded in with [`FilterState::apply`], which is the
//! only place the range and clamping invariants are enforced.

use crate::color::RgbHex;
use serde::{Deserialize, Serialize};

/// Bounds of the year slider.
pub const YEAR_FLOOR: i32 = 1936;
pub const YEAR_CEIL: i32 = 2006;
pub const DEFAULT_YEAR_MIN: i32 = 1940;
pub const DEFAULT_YEAR_MAX: i32 = 2000;

pub const HUE_TOLERANCE_MAX: u8 = 50;
pub const DEFAULT_HUE_TOLERANCE: u8 = 10;

pub const GRID_SIZE_MIN: u32 = 100;
pub const GRID_SIZE_MAX: u32 = 400;
pub const GRID_SIZE_STEP: u32 = 10;

/// Pixels per centimetre in real-life mode.
pub const DEFAULT_REAL_LIFE_SCALE: u32 = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    PoliticalCampaigns,
    Other,
}

impl Category {
    /// Value of the `type` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Category::PoliticalCampaigns => "political-campaigns",
            Category::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::PoliticalCampaigns => "Political Campaigns",
            Category::Other => "Everything Else",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    #[default]
    Grid,
    RealLife,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Grid => RenderMode::RealLife,
            RenderMode::RealLife => RenderMode::Grid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    date_filter_enabled: bool,
    year_min: i32,
    year_max: i32,
    show_political: bool,
    show_other: bool,
    color_filter_enabled: bool,
    color: Option<RgbHex>,
    hue_tolerance: u8,
    keyword: String,
    render_mode: RenderMode,
    grid_size: u32,
    real_life_scale: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            date_filter_enabled: true,
            year_min: DEFAULT_YEAR_MIN,
            year_max: DEFAULT_YEAR_MAX,
            show_political: true,
            show_other: true,
            color_filter_enabled: false,
            color: Some(RgbHex::BLACK),
            hue_tolerance: DEFAULT_HUE_TOLERANCE,
            keyword: String::new(),
            render_mode: RenderMode::Grid,
            grid_size: GRID_SIZE_MIN,
            real_life_scale: DEFAULT_REAL_LIFE_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetDateFilter(bool),
    ToggleDateFilter,
    SetYearRange { min: i32, max: i32 },
    /// Moves the lower bound; drags the upper bound along if needed.
    SetYearMin(i32),
    /// Moves the upper bound; drags the lower bound along if needed.
    SetYearMax(i32),
    SetCategory(Category, bool),
    ToggleCategory(Category),
    SetColorFilter(bool),
    ToggleColorFilter,
    SetColor(Option<RgbHex>),
    SetHueTolerance(i32),
    SetKeyword(String),
    SetRenderMode(RenderMode),
    ToggleRenderMode,
    SetGridSize(i64),
    SetRealLifeScale(u32),
}

impl FilterState {
    /// Fold one action into a new state.
    pub fn apply(&self, action: FilterAction) -> FilterState {
        let mut next = self.clone();
        match action {
            FilterAction::SetDateFilter(on) => next.date_filter_enabled = on,
            FilterAction::ToggleDateFilter => next.date_filter_enabled = !self.date_filter_enabled,
            FilterAction::SetYearRange { min, max } => {
                let (a, b) = (clamp_year(min), clamp_year(max));
                next.year_min = a.min(b);
                next.year_max = a.max(b);
            }
            FilterAction::SetYearMin(v) => {
                let v = clamp_year(v);
                next.year_min = v;
                next.year_max = self.year_max.max(v);
            }
            FilterAction::SetYearMax(v) => {
                let v = clamp_year(v);
                next.year_max = v;
                next.year_min = self.year_min.min(v);
            }
            FilterAction::SetCategory(category, on) => *next.category_flag(category) = on,
            FilterAction::ToggleCategory(category) => {
                let flag = next.category_flag(category);
                *flag = !*flag;
            }
            FilterAction::SetColorFilter(on) => next.color_filter_enabled = on,
            FilterAction::ToggleColorFilter => next.color_filter_enabled = !self.color_filter_enabled,
            FilterAction::SetColor(color) => next.color = color,
            FilterAction::SetHueTolerance(v) => {
                next.hue_tolerance = v.clamp(0, HUE_TOLERANCE_MAX as i32) as u8;
            }
            FilterAction::SetKeyword(text) => next.keyword = text,
            FilterAction::SetRenderMode(mode) => next.render_mode = mode,
            FilterAction::ToggleRenderMode => next.render_mode = self.render_mode.toggled(),
            FilterAction::SetGridSize(v) => next.grid_size = snap_grid_size(v),
            FilterAction::SetRealLifeScale(v) => next.real_life_scale = v.max(1),
        }
        next
    }

    /// Fold a sequence of actions, left to right.
    pub fn apply_all<I: IntoIterator<Item = FilterAction>>(&self, actions: I) -> FilterState {
        actions.into_iter().fold(self.clone(), |state, a| state.apply(a))
    }

    fn category_flag(&mut self, category: Category) -> &mut bool {
        match category {
            Category::PoliticalCampaigns => &mut self.show_political,
            Category::Other => &mut self.show_other,
        }
    }

    pub fn date_filter_enabled(&self) -> bool {
        self.date_filter_enabled
    }

    /// Inclusive `(min, max)`; always `min <= max`.
    pub fn year_range(&self) -> (i32, i32) {
        (self.year_min, self.year_max)
    }

    pub fn shows(&self, category: Category) -> bool {
        match category {
            Category::PoliticalCampaigns => self.show_political,
            Category::Other => self.show_other,
        }
    }

    pub fn color_filter_enabled(&self) -> bool {
        self.color_filter_enabled
    }

    pub fn color(&self) -> Option<RgbHex> {
        self.color
    }

    pub fn hue_tolerance(&self) -> u8 {
        self.hue_tolerance
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn real_life_scale(&self) -> u32 {
        self.real_life_scale
    }
}

fn clamp_year(v: i32) -> i32 {
    v.clamp(YEAR_FLOOR, YEAR_CEIL)
}

fn snap_grid_size(v: i64) -> u32 {
    let v = v.clamp(GRID_SIZE_MIN as i64, GRID_SIZE_MAX as i64) as u32;
    let step = GRID_SIZE_STEP;
    ((v + step / 2) / step * step).min(GRID_SIZE_MAX)
}

use clap::{Args, ValueEnum};
use pinback_core::{Category, FilterAction, RenderMode, RgbHex};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Only {
    Political,
    Other,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Grid,
    RealLife,
}

impl From<Mode> for RenderMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Grid => RenderMode::Grid,
            Mode::RealLife => RenderMode::RealLife,
        }
    }
}

/// Filter flags shared by `browse`, `query` and `search`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Earliest year (inclusive)
    #[arg(long)]
    pub from: Option<i32>,
    /// Latest year (inclusive)
    #[arg(long)]
    pub to: Option<i32>,
    /// Turn the date filter off
    #[arg(long)]
    pub no_date: bool,
    /// Show only one category
    #[arg(long, value_enum)]
    pub only: Option<Only>,
    /// Filter by dominant color (#rrggbb); turns the color filter on
    #[arg(long)]
    pub color: Option<RgbHex>,
    /// Hue tolerance in degrees (0-50)
    #[arg(long)]
    pub tolerance: Option<i32>,
    /// Keyword matched against titles and OCR text
    #[arg(long)]
    pub keyword: Option<String>,
    /// Tile edge in grid mode (100-400)
    #[arg(long)]
    pub grid_size: Option<i64>,
    /// Pixels per centimetre in real-life mode
    #[arg(long)]
    pub scale: Option<u32>,
}

impl FilterArgs {
    pub fn actions(&self) -> Vec<FilterAction> {
        let mut actions = Vec::new();
        if self.no_date {
            actions.push(FilterAction::SetDateFilter(false));
        }
        if let Some(y) = self.from {
            actions.push(FilterAction::SetYearMin(y));
        }
        if let Some(y) = self.to {
            actions.push(FilterAction::SetYearMax(y));
        }
        match self.only {
            Some(Only::Political) => {
                actions.push(FilterAction::SetCategory(Category::PoliticalCampaigns, true));
                actions.push(FilterAction::SetCategory(Category::Other, false));
            }
            Some(Only::Other) => {
                actions.push(FilterAction::SetCategory(Category::PoliticalCampaigns, false));
                actions.push(FilterAction::SetCategory(Category::Other, true));
            }
            None => {}
        }
        if let Some(c) = self.color {
            actions.push(FilterAction::SetColor(Some(c)));
            actions.push(FilterAction::SetColorFilter(true));
        }
        if let Some(t) = self.tolerance {
            actions.push(FilterAction::SetHueTolerance(t));
        }
        if let Some(k) = &self.keyword {
            actions.push(FilterAction::SetKeyword(k.clone()));
        }
        if let Some(g) = self.grid_size {
            actions.push(FilterAction::SetGridSize(g));
        }
        if let Some(s) = self.scale {
            actions.push(FilterAction::SetRealLifeScale(s));
        }
        actions
    }
}

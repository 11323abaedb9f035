//! Per-item render geometry for the two gallery modes.

use crate::dimension::{is_unknown, parse_dimension};
use crate::filter::RenderMode;
use crate::record::ImageRecord;
use serde::Serialize;

/// Smallest edge ever rendered, whatever the recorded size says.
pub const MIN_EDGE_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderBox {
    pub width_px: f64,
    pub height_px: f64,
}

impl RenderBox {
    pub fn square(edge: f64) -> Self {
        let edge = edge.max(MIN_EDGE_PX);
        Self {
            width_px: edge,
            height_px: edge,
        }
    }
}

/// A record that made it into the rendered set, with its box.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Placed<'a> {
    pub record: &'a ImageRecord,
    #[serde(rename = "box")]
    pub render_box: RenderBox,
}

/// Why nothing is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Empty {
    /// The result set itself is empty.
    NoResults,
    /// There are results, but none has a size usable in this mode.
    NoneEligible,
}

impl Empty {
    pub fn message(&self) -> &'static str {
        match self {
            Empty::NoResults => "No images found in this time range.",
            Empty::NoneEligible => "None of these images has a recorded size for real-life view.",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout<'a> {
    pub mode: RenderMode,
    pub placed: Vec<Placed<'a>>,
    /// Records left out because the mode cannot size them.
    pub excluded: usize,
}

impl Layout<'_> {
    pub fn empty(&self) -> Option<Empty> {
        if !self.placed.is_empty() {
            None
        } else if self.excluded == 0 {
            Some(Empty::NoResults)
        } else {
            Some(Empty::NoneEligible)
        }
    }

    pub fn boxes(&self) -> Vec<RenderBox> {
        self.placed.iter().map(|p| p.render_box).collect()
    }
}

/// True when `record` can be shown in `mode`.
pub fn is_eligible(record: &ImageRecord, mode: RenderMode) -> bool {
    match mode {
        RenderMode::Grid => true,
        RenderMode::RealLife => !is_unknown(Some(&record.dimension)),
    }
}

/// Size every eligible record for `mode`. Input order is preserved.
pub fn layout(
    images: &[ImageRecord],
    mode: RenderMode,
    grid_size: u32,
    real_life_scale: u32,
) -> Layout<'_> {
    let fallback = grid_size as f64;
    let scale = real_life_scale as f64;
    let placed: Vec<Placed<'_>> = images
        .iter()
        .filter(|r| is_eligible(r, mode))
        .map(|record| {
            let edge = match mode {
                RenderMode::Grid => fallback,
                RenderMode::RealLife => parse_dimension(Some(&record.dimension), fallback, scale),
            };
            Placed {
                record,
                render_box: RenderBox::square(edge),
            }
        })
        .collect();
    let excluded = images.len() - placed.len();
    Layout {
        mode,
        placed,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(dims: &[&str]) -> Vec<ImageRecord> {
        dims.iter()
            .enumerate()
            .map(|(i, d)| {
                let mut r = ImageRecord::new(i as i64, format!("item-{i}"));
                r.dimension = d.to_string();
                r
            })
            .collect()
    }

    #[test]
    fn grid_mode_is_uniform() {
        let imgs = records(&["2cm", "na", "1.5cm"]);
        let l = layout(&imgs, RenderMode::Grid, 120, 20);
        assert_eq!(l.placed.len(), 3);
        assert!(l.boxes().iter().all(|b| *b == RenderBox::square(120.0)));
        assert_eq!(l.empty(), None);
    }

    #[test]
    fn real_life_mode_drops_unsized() {
        let imgs = records(&["2cm", "na", "1.5cm"]);
        let l = layout(&imgs, RenderMode::RealLife, 100, 20);
        assert_eq!(l.placed.len(), 2);
        assert_eq!(l.excluded, 1);
        assert_eq!(l.placed[0].record.id, 0);
        assert_eq!(l.placed[1].record.id, 2);
        assert_eq!(l.placed[0].render_box, RenderBox::square(40.0));
        assert_eq!(l.placed[1].render_box, RenderBox::square(30.0));
    }

    #[test]
    fn unparseable_size_falls_back_to_grid_size() {
        let imgs = records(&["xcm"]);
        let l = layout(&imgs, RenderMode::RealLife, 150, 20);
        assert_eq!(l.boxes(), vec![RenderBox::square(150.0)]);
    }

    #[test]
    fn degenerate_sizes_render_at_least_one_pixel() {
        let imgs = records(&["0cm", "-3cm"]);
        let l = layout(&imgs, RenderMode::RealLife, 100, 20);
        assert!(l.boxes().iter().all(|b| b.width_px == MIN_EDGE_PX && b.height_px == MIN_EDGE_PX));
    }

    #[test]
    fn empty_states_are_distinct() {
        let none: Vec<ImageRecord> = Vec::new();
        assert_eq!(layout(&none, RenderMode::Grid, 100, 20).empty(), Some(Empty::NoResults));
        assert_eq!(layout(&none, RenderMode::RealLife, 100, 20).empty(), Some(Empty::NoResults));

        let no_size = records(&["na", "NA"]);
        assert_eq!(layout(&no_size, RenderMode::Grid, 100, 20).empty(), None);
        assert_eq!(
            layout(&no_size, RenderMode::RealLife, 100, 20).empty(),
            Some(Empty::NoneEligible)
        );
        assert_ne!(Empty::NoResults.message(), Empty::NoneEligible.message());
    }
}

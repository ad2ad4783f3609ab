use eframe::egui::Color32;
use std::collections::HashMap;

use crate::git::GitError;
use crate::models::BranchHead;

/// An ordered, non-empty list of colors indexed modulo its length.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color32>,
}

impl Palette {
    pub fn new(colors: Vec<Color32>) -> Option<Self> {
        if colors.is_empty() {
            None
        } else {
            Some(Self { colors })
        }
    }

    /// Colors for lane lines, chosen for contrast between neighbours.
    pub fn lanes() -> Self {
        Self {
            colors: vec![
                Color32::from_rgb(66, 133, 244),  // Blue
                Color32::from_rgb(52, 168, 83),   // Green
                Color32::from_rgb(220, 38, 127),  // Vibrant Pink
                Color32::from_rgb(251, 188, 5),   // Yellow
                Color32::from_rgb(156, 39, 176),  // Purple
                Color32::from_rgb(255, 87, 34),   // Deep Orange
                Color32::from_rgb(0, 172, 193),   // Cyan
                Color32::from_rgb(139, 195, 74),  // Light Green
                Color32::from_rgb(92, 107, 192),  // Indigo
                Color32::from_rgb(255, 183, 77),  // Amber
                Color32::from_rgb(240, 98, 146),  // Pink
                Color32::from_rgb(100, 181, 246), // Light Blue
            ],
        }
    }

    /// Darker fills that keep white label text readable.
    pub fn labels() -> Self {
        Self {
            colors: vec![
                Color32::from_rgb(46, 125, 50),  // Green
                Color32::from_rgb(25, 118, 210), // Blue
                Color32::from_rgb(245, 124, 0),  // Orange
                Color32::from_rgb(211, 47, 47),  // Red
                Color32::from_rgb(123, 31, 162), // Purple
                Color32::from_rgb(0, 131, 143),  // Teal
                Color32::from_rgb(93, 64, 55),   // Brown
                Color32::from_rgb(69, 90, 100),  // Blue Grey
            ],
        }
    }

    /// Parse `#rrggbb` strings. An empty list yields `None` so callers can
    /// fall back to a built-in palette.
    pub fn from_hex<S: AsRef<str>>(setting: &str, values: &[S]) -> Result<Option<Self>, GitError> {
        let colors = values
            .iter()
            .map(|value| {
                let value = value.as_ref();
                parse_hex_color(value).ok_or_else(|| {
                    GitError::configuration(setting, format!("'{}' is not a #rrggbb color", value))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(colors))
    }

    pub fn color(&self, index: usize) -> Color32 {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Lane and branch-label coloring.
///
/// Lane colors depend only on the lane index. Branch colors depend on the
/// order in which names first appear in the current head set, so the same
/// heads always color the same way.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    lane_palette: Palette,
    label_palette: Palette,
    branch_order: HashMap<String, usize>,
}

impl ColorAssigner {
    pub fn new(lane_palette: Palette, label_palette: Palette) -> Self {
        Self {
            lane_palette,
            label_palette,
            branch_order: HashMap::new(),
        }
    }

    /// Assigner with the built-in palettes and branch order taken from `heads`.
    pub fn for_heads(heads: &[BranchHead]) -> Self {
        let mut assigner = Self::default();
        assigner.assign_branches(heads);
        assigner
    }

    /// Reset branch ordering to the first-seen order of names in `heads`.
    pub fn assign_branches(&mut self, heads: &[BranchHead]) {
        self.branch_order.clear();
        for head in heads {
            let next = self.branch_order.len();
            self.branch_order.entry(head.name.clone()).or_insert(next);
        }
    }

    pub fn lane_color(&self, lane: usize) -> Color32 {
        self.lane_palette.color(lane)
    }

    /// Color for a branch name. Names not in the current head set take the
    /// next slot after every known name.
    pub fn branch_color(&self, name: &str) -> Color32 {
        let index = self
            .branch_order
            .get(name)
            .copied()
            .unwrap_or(self.branch_order.len());
        self.label_palette.color(index)
    }

    pub fn lane_palette(&self) -> &Palette {
        &self.lane_palette
    }

    pub fn label_palette(&self) -> &Palette {
        &self.label_palette
    }
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new(Palette::lanes(), Palette::labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_color_wraps_around_palette() {
        let colors = ColorAssigner::default();
        let size = colors.lane_palette().len();
        assert_eq!(colors.lane_color(0), colors.lane_color(size));
        assert_eq!(colors.lane_color(3), colors.lane_color(3 + 2 * size));
        assert_ne!(colors.lane_color(0), colors.lane_color(1));
    }

    #[test]
    fn test_branch_color_follows_first_seen_order() {
        let heads = vec![
            BranchHead::new("main", "c3", true),
            BranchHead::new("feature", "c2", false),
            BranchHead::new("main", "c1", false),
        ];
        let colors = ColorAssigner::for_heads(&heads);
        let labels = Palette::labels();

        assert_eq!(colors.branch_color("main"), labels.color(0));
        assert_eq!(colors.branch_color("feature"), labels.color(1));
        assert_eq!(colors.branch_color("unknown"), labels.color(2));
    }

    #[test]
    fn test_branch_colors_collide_after_palette_exhaustion() {
        let heads: Vec<BranchHead> = (0..10)
            .map(|i| BranchHead::new(format!("b{i}"), "c1", false))
            .collect();
        let colors = ColorAssigner::for_heads(&heads);
        let size = colors.label_palette().len();
        assert_eq!(colors.branch_color("b0"), colors.branch_color(&format!("b{size}")));
    }

    #[test]
    fn test_palette_from_hex() {
        let palette = Palette::from_hex("graph.lane_palette", &["#ff0000", "#00ff00"])
            .unwrap()
            .unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.color(0), Color32::from_rgb(255, 0, 0));
        assert_eq!(palette.color(3), Color32::from_rgb(0, 255, 0));

        let empty: [&str; 0] = [];
        assert!(Palette::from_hex("graph.lane_palette", &empty).unwrap().is_none());
        assert!(Palette::from_hex("graph.lane_palette", &["red"]).is_err());
        assert!(Palette::from_hex("graph.lane_palette", &["#12345"]).is_err());
    }
}

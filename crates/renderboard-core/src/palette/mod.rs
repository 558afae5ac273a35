//! Model families and the title → color palette shared by every chart.

pub mod color;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use color::{linspace, Hls, Rgb};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    Nanobanana,
    GptImage,
    Flux,
    Imagen,
    Seedance,
    Kling,
    Runway,
    Veo,
    Elevenlabs,
    Other,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Nanobanana => "nanobanana",
            Family::GptImage => "gpt-image",
            Family::Flux => "flux",
            Family::Imagen => "imagen",
            Family::Seedance => "seedance",
            Family::Kling => "kling",
            Family::Runway => "runway",
            Family::Veo => "veo",
            Family::Elevenlabs => "elevenlabs",
            Family::Other => "other",
        }
    }

    pub fn base_color(&self) -> &'static str {
        match self {
            Family::Nanobanana => "#4E79A7",
            Family::GptImage => "#F28E2B",
            Family::Flux => "#59A14F",
            Family::Imagen => "#E15759",
            Family::Seedance => "#76B7B2",
            Family::Kling => "#EDC948",
            Family::Runway => "#B07AA1",
            Family::Veo => "#FF9DA7",
            Family::Elevenlabs => "#9C755F",
            Family::Other => OTHER_COLOR,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neutral gray for the catch-all family and folded "Other" series.
pub const OTHER_COLOR: &str = "#BAB0AC";

const LIGHT_SHIFT: f64 = 0.22;
const DARK_SHIFT: f64 = 0.18;
const MAX_LIGHTNESS: f64 = 0.85;
const MIN_LIGHTNESS: f64 = 0.15;

/// Ordered (family, pattern) pairs, matched against the lower-cased title.
pub const FAMILY_PATTERNS: &[(Family, &str)] = &[
    (Family::Nanobanana, r"nano\s*banana|nanobanan|nano-banana"),
    (Family::GptImage, r"gpt[-_ ]?image[-_ ]?1|gptimage"),
    (Family::Flux, r"flux"),
    (Family::Imagen, r"imagen"),
    (Family::Seedance, r"seedance"),
    (Family::Kling, r"kling"),
    (Family::Runway, r"runway"),
    (Family::Veo, r"veo"),
    (Family::Elevenlabs, r"eleven"),
];

pub struct FamilyRules {
    rules: Vec<(Family, Regex)>,
}

impl FamilyRules {
    /// Compiles the rules in order. A pattern that fails to compile is skipped with a warning.
    pub fn from_patterns(patterns: &[(Family, &str)]) -> Self {
        let rules = patterns
            .iter()
            .filter_map(|(family, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((*family, re)),
                Err(e) => {
                    tracing::warn!(event = "family_pattern_invalid", family = %family, error = %e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn standard() -> &'static FamilyRules {
        static RULES: OnceLock<FamilyRules> = OnceLock::new();
        RULES.get_or_init(|| FamilyRules::from_patterns(FAMILY_PATTERNS))
    }

    pub fn detect(&self, title: &str) -> Family {
        if title.is_empty() {
            return Family::Other;
        }
        let s = title.to_lowercase();
        self.rules
            .iter()
            .find(|(_, re)| re.is_match(&s))
            .map(|(family, _)| *family)
            .unwrap_or(Family::Other)
    }

    /// Assigns every distinct title one color.
    ///
    /// Titles are grouped by family; within a family they are ordered by
    /// descending weight when `weights` is given (missing weight counts as 0,
    /// ties keep input order), lexicographically otherwise. The first title
    /// gets the lightest shade of the family ramp. The `other` family is
    /// always plain gray.
    pub fn palette<I, S>(&self, titles: I, weights: Option<&HashMap<String, f64>>) -> Palette
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut groups: BTreeMap<Family, Vec<String>> = BTreeMap::new();
        for t in titles {
            let t = t.as_ref();
            if seen.insert(t.to_string()) {
                groups.entry(self.detect(t)).or_default().push(t.to_string());
            }
        }

        let mut palette = Palette::new();
        for (family, mut items) in groups {
            if family == Family::Other {
                for t in items {
                    palette.insert(t, OTHER_COLOR.to_string());
                }
                continue;
            }
            match weights {
                Some(w) => {
                    let weight = |t: &String| w.get(t).copied().unwrap_or(0.0);
                    items.sort_by(|a, b| weight(b).total_cmp(&weight(a)));
                }
                None => items.sort(),
            }
            let shades = ramp_around_base(family.base_color(), items.len());
            for (t, c) in items.into_iter().zip(shades) {
                palette.insert(t, c);
            }
        }
        palette
    }
}

/// Title → `#rrggbb`.
pub type Palette = BTreeMap<String, String>;

pub fn detect_family(title: Option<&str>) -> Family {
    FamilyRules::standard().detect(title.unwrap_or_default())
}

pub fn build_family_palette<I, S>(titles: I, weights: Option<&HashMap<String, f64>>) -> Palette
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    FamilyRules::standard().palette(titles, weights)
}

/// `n` shades of `base` varying only lightness, lightest first.
///
/// `n <= 1` returns the base untouched. Otherwise the ramp runs from
/// `l + 0.22` (capped at 0.85) down to `l - 0.18` (floored at 0.15) and the
/// point nearest `l` is pinned to `l`, so the base color is always present.
pub fn ramp_around_base(base: &str, n: usize) -> Vec<String> {
    if n <= 1 {
        return vec![base.to_string()];
    }
    let Some(rgb) = Rgb::from_hex(base) else {
        tracing::warn!(event = "invalid_base_color", base);
        return vec![base.to_string(); n];
    };
    let Hls { h, l, s } = rgb.to_hls();
    let light = (l + LIGHT_SHIFT).min(MAX_LIGHTNESS);
    let dark = (l - DARK_SHIFT).max(MIN_LIGHTNESS);
    let mut levels = linspace(light, dark, n);

    let mut nearest = 0;
    for (i, level) in levels.iter().enumerate() {
        if (level - l).abs() < (levels[nearest] - l).abs() {
            nearest = i;
        }
    }
    levels[nearest] = l;

    levels
        .into_iter()
        .map(|li| Hls { h, l: li, s }.to_rgb().to_hex())
        .collect()
}

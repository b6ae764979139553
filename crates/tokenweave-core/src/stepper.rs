// ABOUTME: Color scale search for contrast-compliant replacements
// ABOUTME: One-directional stepping, nearest-level search and the white/black fallback ladder

use crate::color_math::{
    BLACK_HEX, ON_TONE_TIE_BREAK, Rgb, contrast_ratio, contrast_ratio_at, contrast_ratio_rgb, meets,
    parse_hex_or_black,
};
use crate::token_index::{ColorFamily, TokenIndex};
use serde::Serialize;
use tokenweave_logging::debug;
use tokenweave_types::{Direction, Mode, ScaleLevel, TokenPath};

/// Equal-distance candidates resolve to the lighter (lower) level
pub const PREFER_LIGHTER_ON_TIE: bool = true;

/// Compliant level found inside a family
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleMatch {
    pub level: ScaleLevel,
    pub hex: String,
    pub token: TokenPath,
    pub ratio: f64,
}

/// Result of one-directional stepping
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub hex: String,
    pub token: Option<TokenPath>,
    pub ratio: f64,
    pub compliant: bool,
}

/// Where a fallback-ladder result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Family,
    White,
    Black,
    /// Neither white nor black met the threshold; the better one was kept
    BestEffort,
}

/// Result of [`make_compliant`]; always carries a usable color
#[derive(Debug, Clone, PartialEq)]
pub struct Compliance {
    pub hex: String,
    pub token: Option<TokenPath>,
    pub ratio: f64,
    pub compliant: bool,
    pub source: CandidateSource,
}

impl Compliance {
    fn from_match(found: ScaleMatch) -> Self {
        Self {
            hex: found.hex,
            token: Some(found.token),
            ratio: found.ratio,
            compliant: true,
            source: CandidateSource::Family,
        }
    }

    fn literal(rgb: Rgb, ratio: f64, compliant: bool, source: CandidateSource) -> Self {
        Self {
            hex: rgb.to_hex(),
            token: None,
            ratio,
            compliant,
            source,
        }
    }
}

/// Family and level a nearest-level search starts from
#[derive(Debug, Clone, Copy)]
pub struct SearchStart<'a> {
    pub family: &'a ColorFamily,
    pub level: ScaleLevel,
}

/// Walk `candidate`'s own family in `direction` until a level meets
/// `threshold` against `background`.
///
/// The candidate itself is checked first. When the end of the scale is reached
/// the last level tried is returned, flagged non-compliant. A candidate that
/// belongs to no family is returned unchanged.
pub fn step_until_compliant(
    candidate: &str,
    background: &str,
    direction: Direction,
    index: &TokenIndex,
    threshold: f64,
) -> StepOutcome {
    let located = index
        .find_hex(candidate)
        .and_then(|path| index.family(&path.scale_key).map(|family| (family, path.level)));

    match located {
        Some((family, level)) => step_in_family(family, level, background, direction, threshold),
        None => {
            let ratio = contrast_ratio(candidate, background);
            debug!(candidate, "Candidate is outside every color family; left unchanged");
            StepOutcome {
                hex: candidate.to_string(),
                token: None,
                ratio,
                compliant: meets(ratio, threshold),
            }
        }
    }
}

/// [`step_until_compliant`] starting from a known family position
pub fn step_in_family(
    family: &ColorFamily,
    start: ScaleLevel,
    background: &str,
    direction: Direction,
    threshold: f64,
) -> StepOutcome {
    let background = parse_hex_or_black(background);
    let count = family.levels.len();

    let mut position = match family.position(start) {
        Ok(found) => Some(found),
        // Absent start: the first step lands on the neighbour in `direction`
        Err(insert) => match direction {
            Direction::Lighter => insert.checked_sub(1),
            Direction::Darker => (insert < count).then_some(insert),
        },
    };

    let mut last: Option<StepOutcome> = None;
    while let Some(current) = position {
        let (level, hex) = &family.levels[current];
        let ratio = contrast_ratio_rgb(parse_hex_or_black(hex), background);
        let outcome = StepOutcome {
            hex: hex.clone(),
            token: Some(family.token_path(*level)),
            ratio,
            compliant: meets(ratio, threshold),
        };
        if outcome.compliant {
            return outcome;
        }
        last = Some(outcome);
        position = match direction {
            Direction::Lighter => current.checked_sub(1),
            Direction::Darker => (current + 1 < count).then_some(current + 1),
        };
    }

    last.unwrap_or_else(|| {
        let hex = family
            .hex_at(start)
            .unwrap_or(BLACK_HEX)
            .to_string();
        let ratio = contrast_ratio_rgb(parse_hex_or_black(&hex), background);
        StepOutcome {
            token: family.hex_at(start).map(|_| family.token_path(start)),
            compliant: meets(ratio, threshold),
            hex,
            ratio,
        }
    })
}

/// Family positions ordered by distance from `start`, nearest first.
///
/// An absent start level sits between its neighbours, so both are distance 1.
fn search_order(family: &ColorFamily, start: ScaleLevel) -> Vec<usize> {
    let count = family.levels.len() as isize;
    let mut order = Vec::with_capacity(family.levels.len());

    // Anchors the lighter and darker walks start from
    let (light_anchor, dark_anchor) = match family.position(start) {
        Ok(found) => {
            order.push(found);
            (found as isize, found as isize)
        }
        Err(insert) => (insert as isize, insert as isize - 1),
    };

    let mut distance = 1;
    loop {
        let (lighter, darker) = (light_anchor - distance, dark_anchor + distance);
        let in_range = |p: isize| (0..count).contains(&p);
        if !in_range(lighter) && !in_range(darker) {
            break;
        }
        let pair = if PREFER_LIGHTER_ON_TIE {
            [lighter, darker]
        } else {
            [darker, lighter]
        };
        order.extend(pair.into_iter().filter(|p| in_range(*p)).map(|p| p as usize));
        distance += 1;
    }
    order
}

/// Nearest level of `family` meeting `threshold` against `background`.
pub fn search_family(
    family: &ColorFamily,
    start: ScaleLevel,
    background: &str,
    threshold: f64,
) -> Option<ScaleMatch> {
    search_family_at(family, start, background, threshold, 1.0)
}

/// [`search_family`] with every candidate composited at `alpha` first
pub fn search_family_at(
    family: &ColorFamily,
    start: ScaleLevel,
    background: &str,
    threshold: f64,
    alpha: f64,
) -> Option<ScaleMatch> {
    let background = parse_hex_or_black(background);
    search_order(family, start).into_iter().find_map(|position| {
        let (level, hex) = &family.levels[position];
        let ratio = contrast_ratio_at(parse_hex_or_black(hex), background, alpha);
        meets(ratio, threshold).then(|| ScaleMatch {
            level: *level,
            hex: hex.clone(),
            token: family.token_path(*level),
            ratio,
        })
    })
}

/// Nearest compliant level of the family named by scale key or alias
pub fn find_compliant_in_family(
    family_key: &str,
    start: ScaleLevel,
    background: &str,
    index: &TokenIndex,
    threshold: f64,
) -> Option<ScaleMatch> {
    let family = index.family(family_key)?;
    search_family(family, start, background, threshold)
}

/// Family search, then white, then black, then the better of the two flagged
/// non-compliant. Never fails.
pub fn make_compliant(start: Option<SearchStart<'_>>, background: &str, threshold: f64) -> Compliance {
    make_compliant_at(start, background, threshold, 1.0)
}

/// [`make_compliant`] for a foreground rendered at opacity `alpha`
pub fn make_compliant_at(
    start: Option<SearchStart<'_>>,
    background: &str,
    threshold: f64,
    alpha: f64,
) -> Compliance {
    if let Some(start) = start
        && let Some(found) = search_family_at(start.family, start.level, background, threshold, alpha)
    {
        return Compliance::from_match(found);
    }

    let background_rgb = parse_hex_or_black(background);
    let white = contrast_ratio_at(Rgb::WHITE, background_rgb, alpha);
    if meets(white, threshold) {
        return Compliance::literal(Rgb::WHITE, white, true, CandidateSource::White);
    }
    let black = contrast_ratio_at(Rgb::BLACK, background_rgb, alpha);
    if meets(black, threshold) {
        return Compliance::literal(Rgb::BLACK, black, true, CandidateSource::Black);
    }

    let best = if white > black {
        Rgb::WHITE
    } else if black > white {
        Rgb::BLACK
    } else {
        ON_TONE_TIE_BREAK
    };
    let ratio = white.max(black);
    debug!(background, ratio, alpha, best = %best, "No candidate meets the threshold");
    Compliance::literal(best, ratio, false, CandidateSource::BestEffort)
}

/// Hover color for `base`: one level darker in light mode, lighter in dark
/// mode, then stepped further until it meets `threshold` against `background`.
pub fn derive_hover(
    base: &str,
    background: &str,
    mode: Mode,
    index: &TokenIndex,
    threshold: f64,
) -> StepOutcome {
    let direction = if mode.is_dark() {
        Direction::Lighter
    } else {
        Direction::Darker
    };

    let located = index
        .find_hex(base)
        .and_then(|path| index.family(&path.scale_key).map(|family| (family, path.level)));
    let Some((family, level)) = located else {
        let ratio = contrast_ratio(base, background);
        return StepOutcome {
            hex: base.to_string(),
            token: None,
            ratio,
            compliant: meets(ratio, threshold),
        };
    };

    let next = family.position(level).ok().and_then(|current| match direction {
        Direction::Lighter => current.checked_sub(1),
        Direction::Darker => (current + 1 < family.levels.len()).then_some(current + 1),
    });
    let start = next.map_or(level, |position| family.levels[position].0);
    step_in_family(family, start, background, direction, threshold)
}

// ABOUTME: Single home for legacy path spellings in token and theme documents
// ABOUTME: Maps color/colors, palette/palettes, core/core-colors and emphasis paths

/// Canonical token category for a (possibly legacy) category segment
pub fn token_category(segment: &str) -> &str {
    match segment {
        "color" | "colors" => "colors",
        "opacity" | "opacities" => "opacity",
        "dimension" | "dimensions" => "dimensions",
        other => other,
    }
}

/// Whether `segment` names the color category in either spelling
pub fn is_color_category(segment: &str) -> bool {
    token_category(segment) == "colors"
}

const PALETTE_ROOTS: [&str; 2] = ["palettes", "palette"];
const CORE_GROUPS: [&str; 2] = ["core-colors", "core"];
const TEXT_GROUP: &str = "text";

/// Every spelling a theme path may be stored under, in lookup order.
///
/// The spelling that was asked for always comes first; the canonical spelling
/// (plural `palettes`, `core-colors`, emphasis under `text`) is always present.
pub fn theme_path_variants(path: &[String]) -> Vec<Vec<String>> {
    let mut variants = vec![path.to_vec()];

    expand(&mut variants, |candidate| {
        let root = candidate.first()?;
        let other = alternate(root, &PALETTE_ROOTS)?;
        let mut alt = candidate.to_vec();
        alt[0] = other.to_string();
        Some(alt)
    });

    expand(&mut variants, |candidate| {
        let (root, group) = (candidate.first()?, candidate.get(1)?);
        alternate(root, &PALETTE_ROOTS)?;
        let other = alternate(group, &CORE_GROUPS)?;
        let mut alt = candidate.to_vec();
        alt[1] = other.to_string();
        Some(alt)
    });

    expand(&mut variants, |candidate| {
        let last = candidate.last()?;
        if !last.ends_with("-emphasis") {
            return None;
        }
        let mut alt = candidate.to_vec();
        let parent_index = candidate.len().checked_sub(2);
        match parent_index {
            Some(index) if candidate[index] == TEXT_GROUP => {
                alt.remove(index);
            }
            _ => alt.insert(candidate.len() - 1, TEXT_GROUP.to_string()),
        }
        Some(alt)
    });

    variants
}

/// Canonical spelling of a theme path, used when a node has to be created
pub fn canonical_theme_path(path: &[String]) -> Vec<String> {
    let mut canonical = path.to_vec();
    if let Some(root) = canonical.first_mut()
        && PALETTE_ROOTS.contains(&root.as_str())
    {
        *root = PALETTE_ROOTS[0].to_string();
        if let Some(group) = canonical.get_mut(1)
            && CORE_GROUPS.contains(&group.as_str())
        {
            *group = CORE_GROUPS[0].to_string();
        }
    }

    let len = canonical.len();
    if canonical.last().is_some_and(|last| last.ends_with("-emphasis"))
        && (len < 2 || canonical[len - 2] != TEXT_GROUP)
    {
        canonical.insert(len - 1, TEXT_GROUP.to_string());
    }
    canonical
}

fn alternate<'a>(segment: &str, pair: &[&'a str; 2]) -> Option<&'a str> {
    if segment == pair[0] {
        Some(pair[1])
    } else if segment == pair[1] {
        Some(pair[0])
    } else {
        None
    }
}

fn expand(variants: &mut Vec<Vec<String>>, rule: impl Fn(&[String]) -> Option<Vec<String>>) {
    let current = std::mem::take(variants);
    for candidate in current {
        let alt = rule(&candidate);
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
        if let Some(alt) = alt
            && !variants.contains(&alt)
        {
            variants.push(alt);
        }
    }
}

/// Split a dotted or slashed path into owned segments
pub fn segments(path: &str) -> Vec<String> {
    path.split(['.', '/'])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

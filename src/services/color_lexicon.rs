//! Static color vocabulary.
//!
//! Both tables are ordered: lookups scan them front to back and the first
//! substring hit wins, so "forest green" resolves through whichever entry is
//! declared first. Extend the lexicon by adding entries, never by reordering.

use crate::models::Undertone;

/// Family name returned when no token matches
pub const OTHER_FAMILY: &str = "other";

/// Color families and the tokens that identify them
pub const COLOR_FAMILIES: &[(&str, &[&str])] = &[
    ("red", &["red", "maroon", "burgundy", "crimson", "scarlet", "ruby", "cherry"]),
    ("pink", &["pink", "rose", "fuchsia", "magenta", "salmon"]),
    ("orange", &["orange", "peach", "coral", "amber", "terracotta", "rust"]),
    ("yellow", &["yellow", "gold", "mustard", "lemon", "honey"]),
    (
        "green",
        &["green", "olive", "emerald", "lime", "mint", "sage", "forest green", "hunter green"],
    ),
    (
        "blue",
        &["blue", "navy", "teal", "turquoise", "cobalt", "royal blue", "sky blue", "cyan"],
    ),
    (
        "purple",
        &["purple", "lavender", "violet", "plum", "lilac", "mauve", "indigo", "amethyst"],
    ),
    (
        "brown",
        &["brown", "tan", "beige", "camel", "khaki", "chestnut", "chocolate", "coffee"],
    ),
    ("neutral", &["white", "black", "gray", "grey", "silver", "ivory", "cream"]),
];

/// Number of named families (excluding `other`)
pub const FAMILY_COUNT: usize = COLOR_FAMILIES.len();

/// Color tokens and their undertone
pub const COLOR_TONES: &[(&str, Undertone)] = &[
    ("red", Undertone::Warm),
    ("burgundy", Undertone::Cool),
    ("crimson", Undertone::Warm),
    ("scarlet", Undertone::Warm),
    ("maroon", Undertone::Cool),
    ("ruby", Undertone::Cool),
    ("cherry", Undertone::Cool),
    ("pink", Undertone::Cool),
    ("rose", Undertone::Cool),
    ("salmon", Undertone::Warm),
    ("fuchsia", Undertone::Cool),
    ("magenta", Undertone::Cool),
    ("orange", Undertone::Warm),
    ("peach", Undertone::Warm),
    ("coral", Undertone::Warm),
    ("amber", Undertone::Warm),
    ("terracotta", Undertone::Warm),
    ("rust", Undertone::Warm),
    ("yellow", Undertone::Warm),
    ("gold", Undertone::Warm),
    ("mustard", Undertone::Warm),
    ("lemon", Undertone::Cool),
    ("honey", Undertone::Warm),
    ("green", Undertone::Neutral),
    ("olive", Undertone::Warm),
    ("emerald", Undertone::Cool),
    ("lime", Undertone::Cool),
    ("mint", Undertone::Cool),
    ("sage", Undertone::Cool),
    ("forest green", Undertone::Cool),
    ("hunter green", Undertone::Cool),
    ("blue", Undertone::Cool),
    ("navy", Undertone::Cool),
    ("teal", Undertone::Cool),
    ("turquoise", Undertone::Cool),
    ("cobalt", Undertone::Cool),
    ("royal blue", Undertone::Cool),
    ("sky blue", Undertone::Cool),
    ("cyan", Undertone::Cool),
    ("purple", Undertone::Cool),
    ("lavender", Undertone::Cool),
    ("violet", Undertone::Cool),
    ("plum", Undertone::Cool),
    ("lilac", Undertone::Cool),
    ("mauve", Undertone::Cool),
    ("indigo", Undertone::Cool),
    ("amethyst", Undertone::Cool),
    ("brown", Undertone::Warm),
    ("tan", Undertone::Warm),
    ("beige", Undertone::Warm),
    ("camel", Undertone::Warm),
    ("khaki", Undertone::Warm),
    ("chestnut", Undertone::Warm),
    ("chocolate", Undertone::Warm),
    ("coffee", Undertone::Warm),
    ("white", Undertone::Neutral),
    ("black", Undertone::Neutral),
    ("gray", Undertone::Neutral),
    ("grey", Undertone::Neutral),
    ("silver", Undertone::Cool),
    ("ivory", Undertone::Warm),
    ("cream", Undertone::Warm),
];

/// Returns the family a color name belongs to, or [`OTHER_FAMILY`].
pub fn family_of(color: &str) -> &'static str {
    family_index(color)
        .map(|idx| COLOR_FAMILIES[idx].0)
        .unwrap_or(OTHER_FAMILY)
}

/// Position of the matching family in [`COLOR_FAMILIES`]
pub fn family_index(color: &str) -> Option<usize> {
    let normalized = color.to_lowercase();

    COLOR_FAMILIES
        .iter()
        .position(|(_, tokens)| tokens.iter().any(|token| normalized.contains(token)))
}

/// Returns the undertone of a color name. Exact token matches take priority
/// over substring matches; unknown colors are neutral.
pub fn tone_of(color: &str) -> Undertone {
    let normalized = color.to_lowercase();

    if let Some((_, tone)) = COLOR_TONES.iter().find(|(token, _)| *token == normalized) {
        return *tone;
    }

    COLOR_TONES
        .iter()
        .find(|(token, _)| normalized.contains(token))
        .map(|(_, tone)| *tone)
        .unwrap_or(Undertone::Neutral)
}

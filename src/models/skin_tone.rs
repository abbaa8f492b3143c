use std::{fmt::Display, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize};

/// Warm/cool/neutral classification shared by colors and skin tones
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Undertone {
    Warm,
    Cool,
    #[default]
    Neutral,
}

impl Undertone {
    /// Tone buckets in feature order
    pub const ALL: [Undertone; 3] = [Undertone::Warm, Undertone::Cool, Undertone::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Undertone::Warm => "warm",
            Undertone::Cool => "cool",
            Undertone::Neutral => "neutral",
        }
    }

    /// Interprets a loosely worded answer ("golden warm", "Cool-ish") from
    /// the vision service. Anything unrecognized is treated as neutral.
    pub fn from_loose(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("warm") || text.contains("golden") || text.contains("olive") {
            Undertone::Warm
        } else if text.contains("cool") || text.contains("pink") {
            Undertone::Cool
        } else {
            Undertone::Neutral
        }
    }
}

impl Display for Undertone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Light/medium/deep classification of a skin tone
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Light,
    #[default]
    Medium,
    Deep,
}

impl Depth {
    pub const ALL: [Depth; 3] = [Depth::Light, Depth::Medium, Depth::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Light => "light",
            Depth::Medium => "medium",
            Depth::Deep => "deep",
        }
    }

    /// Maps free-form depth descriptions onto the three canonical bands
    pub fn from_loose(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("deep") || text.contains("dark") || text.contains("rich") {
            Depth::Deep
        } else if text.contains("light") || text.contains("fair") || text.contains("pale") {
            Depth::Light
        } else {
            Depth::Medium
        }
    }
}

impl Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Undertone {
    type Err = String;

    /// Case-insensitive exact label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Undertone::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown undertone `{}`, expected one of warm, cool, neutral", s))
    }
}

impl FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Depth::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown depth `{}`, expected one of light, medium, deep", s))
    }
}

impl<'de> Deserialize<'de> for Undertone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Depth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?.parse().map_err(de::Error::custom)
    }
}

/// Reads an optional label where `null` and blank strings mean "not given"
pub fn deserialize_blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(label) if !label.trim().is_empty() => label.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// Like [`deserialize_blank_as_none`], falling back to the type's default
pub fn deserialize_blank_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = String> + Default,
{
    deserialize_blank_as_none(deserializer).map(Option::unwrap_or_default)
}

/// A skin tone with the color phrases that flatter or clash with it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkinToneProfile {
    /// `{undertone}_{depth}`
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub undertone: Undertone,
    pub depth: Depth,
    #[serde(default)]
    pub recommended_colors: Vec<String>,
    #[serde(default)]
    pub not_recommended_colors: Vec<String>,
}

impl SkinToneProfile {
    pub fn new(
        name: &str,
        undertone: Undertone,
        depth: Depth,
        recommended: &[&str],
        not_recommended: &[&str],
    ) -> Self {
        Self {
            id: Self::profile_id(undertone, depth),
            name: name.to_string(),
            undertone,
            depth,
            recommended_colors: recommended.iter().map(|c| c.to_string()).collect(),
            not_recommended_colors: not_recommended.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn profile_id(undertone: Undertone, depth: Depth) -> String {
        format!("{}_{}", undertone, depth)
    }
}

/// Looks up the catalog entry for an undertone/depth pair.
pub fn find_profile(
    catalog: &[SkinToneProfile],
    undertone: Undertone,
    depth: Depth,
) -> Option<&SkinToneProfile> {
    catalog
        .iter()
        .find(|p| p.undertone == undertone && p.depth == depth)
}

/// The nine canonical profiles (undertone × depth)
pub fn default_skin_tones() -> Vec<SkinToneProfile> {
    use Depth::*;
    use Undertone::*;

    vec![
        SkinToneProfile::new(
            "Light Warm",
            Warm,
            Light,
            &[
                "Peach", "Coral", "Warm orange", "Golden yellow", "Olive green",
                "Warm red", "Terracotta", "Ivory", "Cream", "Bronze",
            ],
            &["Blue-based pink", "Cold blue", "Silver", "Icy pastels", "Deep purple"],
        ),
        SkinToneProfile::new(
            "Medium Warm",
            Warm,
            Medium,
            &[
                "Amber", "Warm brown", "Orange red", "Teal", "Forest green",
                "Warm coral", "Camel", "Honey", "Mustard", "Bronze",
            ],
            &["Pastel blue", "Cool gray", "Magenta", "Baby pink", "Icy white"],
        ),
        SkinToneProfile::new(
            "Deep Warm",
            Warm,
            Deep,
            &[
                "Bright orange", "Warm red", "Gold", "Copper", "Hunter green",
                "Tangerine", "Bright yellow", "Magenta", "Purple", "Fuchsia",
            ],
            &["Pale pastels", "Light beige", "Muted colors", "Olive", "Dusty rose"],
        ),
        SkinToneProfile::new(
            "Light Cool",
            Cool,
            Light,
            &[
                "Rose pink", "Blue-red", "Lavender", "Navy", "Emerald",
                "Raspberry", "Blue-toned purple", "Silver", "Soft white", "Gray",
            ],
            &["Orange", "Warm yellows", "Peach", "Coral", "Camel"],
        ),
        SkinToneProfile::new(
            "Medium Cool",
            Cool,
            Medium,
            &[
                "Fuchsia", "Plum", "Ruby", "Royal blue", "Pine green",
                "True red", "Cool pink", "Cool mint", "Deep purple", "Burgundy",
            ],
            &["Rust", "Warm brown", "Yellow", "Orange", "Olive"],
        ),
        SkinToneProfile::new(
            "Deep Cool",
            Cool,
            Deep,
            &[
                "Royal purple", "True red", "Hot pink", "Cobalt blue", "Emerald green",
                "Pure white", "Bright berry tones", "True blue", "Electric blue", "Wine red",
            ],
            &["Orange", "Khaki", "Muted browns", "Light pastels", "Warm yellows"],
        ),
        SkinToneProfile::new(
            "Light Neutral",
            Neutral,
            Light,
            &[
                "Soft pink", "Light blue", "Camel", "Medium gray", "Sage green",
                "Periwinkle", "Soft white", "Navy", "Medium purple", "Teal",
            ],
            &["Very bright colors", "Neon colors", "Very dark colors"],
        ),
        SkinToneProfile::new(
            "Medium Neutral",
            Neutral,
            Medium,
            &[
                "Teal", "Medium blue", "Coral", "Burgundy", "Olive green",
                "Medium purple", "Camel", "Forest green", "Russet", "Navy",
            ],
            &["Neon colors", "Very pale pastels"],
        ),
        SkinToneProfile::new(
            "Deep Neutral",
            Neutral,
            Deep,
            &[
                "Emerald green", "Royal blue", "Bright red", "Pure white", "Orange",
                "Fuchsia", "Cobalt blue", "Gold", "Bright yellow", "Purple",
            ],
            &["Beige", "Pale yellow", "Light pastels", "Muted tones"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_covers_every_combination() {
        let catalog = default_skin_tones();
        assert_eq!(catalog.len(), 9);
        for undertone in Undertone::ALL {
            for depth in Depth::ALL {
                let profile = find_profile(&catalog, undertone, depth).unwrap();
                assert_eq!(profile.id, format!("{}_{}", undertone, depth));
            }
        }
    }

    #[test]
    fn test_profile_deserialization() {
        let json = r#"{
            "id": "warm_light",
            "name": "Light Warm",
            "undertone": "warm",
            "depth": "light",
            "recommendedColors": ["Peach"],
            "notRecommendedColors": ["Silver"]
        }"#;
        let profile: SkinToneProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.undertone, Undertone::Warm);
        assert_eq!(profile.depth, Depth::Light);
        assert_eq!(profile.recommended_colors, vec!["Peach".to_string()]);
    }

    #[test]
    fn test_labels_deserialize_case_insensitively() {
        let undertone: Undertone = serde_json::from_str(r#""Warm""#).unwrap();
        assert_eq!(undertone, Undertone::Warm);
        let depth: Depth = serde_json::from_str(r#"" DEEP ""#).unwrap();
        assert_eq!(depth, Depth::Deep);

        let err = serde_json::from_str::<Undertone>(r#""olive""#).unwrap_err();
        assert!(err.to_string().contains("unknown undertone"));
        assert!(serde_json::from_str::<Depth>(r#""""#).is_err());
    }

    #[test]
    fn test_loose_parsing() {
        assert_eq!(Undertone::from_loose("Warm golden"), Undertone::Warm);
        assert_eq!(Undertone::from_loose("COOL"), Undertone::Cool);
        assert_eq!(Undertone::from_loose("unsure"), Undertone::Neutral);
        assert_eq!(Depth::from_loose("fair"), Depth::Light);
        assert_eq!(Depth::from_loose("Dark"), Depth::Deep);
        assert_eq!(Depth::from_loose("tan"), Depth::Medium);
    }
}

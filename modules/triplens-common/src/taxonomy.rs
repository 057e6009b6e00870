//! Static activity taxonomy.
//!
//! Maps canonical activity keys to a broad synonym list (internal-catalog
//! keyword matching) and a narrower strictly-related list (low-signal search
//! diversification), organized by domain. Pure data: retrieval logic stays
//! free of activity-specific branching, and new activities are added here
//! without touching any matching code.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityDomain {
    Water,
    Land,
    Air,
    Motor,
    Winter,
    Wildlife,
    Culture,
}

#[derive(Debug, Clone, Copy)]
pub struct ActivityFamily {
    /// Canonical key, stored as the stem the normalizer produces so every
    /// inflection lands on it: "skydiv" catches "skydive", "skydiving" and
    /// "indoor skydiving simulator".
    pub key: &'static str,
    pub domain: ActivityDomain,
    /// Broad synonyms for catalog keyword matching.
    pub broad: &'static [&'static str],
    /// Strictly-related terms used only to diversify low-signal searches.
    /// Never crosses domains: surf expands to surf things, not skydiving.
    pub strict: &'static [&'static str],
}

/// Lookup is first-match-wins, so keys that contain another key must come
/// before it ("skydiv" before "ski" and "div", "jet ski" before "ski",
/// "kitesurf" before "surf"). Section order matters for the same reason:
/// air and motor entries precede the water and winter keys they embed.
pub const TAXONOMY: &[ActivityFamily] = &[
    // --- Air ---
    ActivityFamily {
        key: "skydiv",
        domain: ActivityDomain::Air,
        broad: &["skydive", "skydiving", "parachute", "tandem jump"],
        strict: &["tandem skydive"],
    },
    ActivityFamily {
        key: "paraglid",
        domain: ActivityDomain::Air,
        broad: &["paraglide", "paragliding", "parasail"],
        strict: &["tandem paraglide"],
    },
    ActivityFamily {
        key: "balloon",
        domain: ActivityDomain::Air,
        broad: &["balloon", "hot air balloon"],
        strict: &["sunrise balloon flight"],
    },
    ActivityFamily {
        key: "bungee",
        domain: ActivityDomain::Air,
        broad: &["bungee", "bungy"],
        strict: &["bridge jump"],
    },
    // --- Motorsport ---
    ActivityFamily {
        key: "jet ski",
        domain: ActivityDomain::Motor,
        broad: &["jet ski", "jetski", "waverunner"],
        strict: &["jet ski rental"],
    },
    ActivityFamily {
        key: "quad",
        domain: ActivityDomain::Motor,
        broad: &["quad", "atv", "buggy", "off road"],
        strict: &["dune buggy", "quad tour"],
    },
    ActivityFamily {
        key: "kart",
        domain: ActivityDomain::Motor,
        broad: &["kart", "go kart", "karting"],
        strict: &["kart race"],
    },
    ActivityFamily {
        key: "motorbik",
        domain: ActivityDomain::Motor,
        broad: &["motorbike", "motorcycle", "scooter"],
        strict: &["motorbike tour"],
    },
    // --- Water ---
    ActivityFamily {
        key: "kitesurf",
        domain: ActivityDomain::Water,
        broad: &["kitesurf", "kiteboard", "kite surf"],
        strict: &["kitesurf lesson", "wing foil"],
    },
    ActivityFamily {
        key: "windsurf",
        domain: ActivityDomain::Water,
        broad: &["windsurf", "wind surf"],
        strict: &["windsurf lesson"],
    },
    ActivityFamily {
        key: "surf",
        domain: ActivityDomain::Water,
        broad: &["surf", "surfing", "surf lesson", "surf school", "surf camp"],
        strict: &["surfing", "bodyboard", "wave", "surf lesson"],
    },
    ActivityFamily {
        key: "snorkel",
        domain: ActivityDomain::Water,
        broad: &["snorkel", "snorkeling", "reef"],
        strict: &["reef tour", "glass bottom boat"],
    },
    ActivityFamily {
        key: "scuba",
        domain: ActivityDomain::Water,
        broad: &["scuba", "dive", "diving", "underwater"],
        strict: &["open water course", "wreck dive", "night dive"],
    },
    ActivityFamily {
        key: "div",
        domain: ActivityDomain::Water,
        broad: &["dive", "diving", "scuba", "underwater"],
        strict: &["open water course", "wreck dive", "reef dive"],
    },
    ActivityFamily {
        key: "kayak",
        domain: ActivityDomain::Water,
        broad: &["kayak", "canoe", "paddle"],
        strict: &["sea kayak", "kayak tour"],
    },
    ActivityFamily {
        key: "raft",
        domain: ActivityDomain::Water,
        broad: &["raft", "rafting", "white water"],
        strict: &["river rafting"],
    },
    ActivityFamily {
        key: "sail",
        domain: ActivityDomain::Water,
        broad: &["sail", "sailing", "catamaran", "yacht"],
        strict: &["sailing lesson", "catamaran trip"],
    },
    ActivityFamily {
        key: "swim",
        domain: ActivityDomain::Water,
        broad: &["swim", "swimming", "lagoon"],
        strict: &["wild swimming", "cenote"],
    },
    ActivityFamily {
        key: "fish",
        domain: ActivityDomain::Water,
        broad: &["fish", "fishing", "angling"],
        strict: &["deep sea fishing", "fly fishing"],
    },
    // --- Land ---
    ActivityFamily {
        key: "hik",
        domain: ActivityDomain::Land,
        broad: &["hike", "hiking", "trek", "trail", "summit"],
        strict: &["sunrise hike", "volcano hike"],
    },
    ActivityFamily {
        key: "climb",
        domain: ActivityDomain::Land,
        broad: &["climb", "climbing", "boulder", "via ferrata"],
        strict: &["rock climbing", "climbing course"],
    },
    ActivityFamily {
        key: "bik",
        domain: ActivityDomain::Land,
        broad: &["bike", "biking", "cycling", "mountain bike", "e-bike"],
        strict: &["bike tour", "mountain biking"],
    },
    ActivityFamily {
        key: "ziplin",
        domain: ActivityDomain::Land,
        broad: &["zipline", "zip line", "canopy"],
        strict: &["canopy tour"],
    },
    ActivityFamily {
        key: "canyon",
        domain: ActivityDomain::Land,
        broad: &["canyon", "canyoning", "abseil", "rappel"],
        strict: &["canyoning tour"],
    },
    ActivityFamily {
        key: "horse",
        domain: ActivityDomain::Land,
        broad: &["horse", "horseback", "pony", "equestrian"],
        strict: &["horseback ride", "horse riding lesson"],
    },
    // --- Winter ---
    ActivityFamily {
        key: "snowboard",
        domain: ActivityDomain::Winter,
        broad: &["snowboard", "snowboarding"],
        strict: &["snowboard lesson"],
    },
    ActivityFamily {
        key: "snowmobil",
        domain: ActivityDomain::Winter,
        broad: &["snowmobile", "snow mobile"],
        strict: &["snowmobile safari"],
    },
    ActivityFamily {
        key: "ski",
        domain: ActivityDomain::Winter,
        broad: &["ski", "skiing", "ski lesson", "slope"],
        strict: &["ski pass", "ski rental"],
    },
    ActivityFamily {
        key: "glacier",
        domain: ActivityDomain::Winter,
        broad: &["glacier", "ice cave", "ice climb"],
        strict: &["glacier hike"],
    },
    // --- Wildlife ---
    ActivityFamily {
        key: "safari",
        domain: ActivityDomain::Wildlife,
        broad: &["safari", "game drive", "wildlife"],
        strict: &["big five safari", "night safari"],
    },
    ActivityFamily {
        key: "whale",
        domain: ActivityDomain::Wildlife,
        broad: &["whale", "whale watching", "dolphin"],
        strict: &["dolphin watching"],
    },
    ActivityFamily {
        key: "shark",
        domain: ActivityDomain::Wildlife,
        broad: &["shark", "cage diving"],
        strict: &["shark cage dive"],
    },
    // --- Culture ---
    ActivityFamily {
        key: "cook",
        domain: ActivityDomain::Culture,
        broad: &["cook", "cooking class", "culinary"],
        strict: &["cooking class", "market visit"],
    },
    ActivityFamily {
        key: "pottery",
        domain: ActivityDomain::Culture,
        broad: &["pottery", "ceramic", "craft workshop"],
        strict: &["pottery class"],
    },
    ActivityFamily {
        key: "danc",
        domain: ActivityDomain::Culture,
        broad: &["dance", "salsa", "flamenco"],
        strict: &["dance class"],
    },
];

/// Bases shorter than this never match a key; stops one- and two-letter
/// fragments from pulling in unrelated families.
const MIN_MATCH_LEN: usize = 3;

/// True when `key` occurs in `base` at the start of a word. Mid-word hits
/// are false friends: "craft" contains "raft" and "kitesurf" contains
/// "surf", neither of which should resolve to those families.
fn matches_at_word_start(base: &str, key: &str) -> bool {
    base.match_indices(key)
        .any(|(i, _)| i == 0 || base.as_bytes()[i - 1] == b' ')
}

/// Find the family for a normalized base. Both sides have been through the
/// same suffix stripper, so the stem key appears verbatim in any inflection
/// of the activity ("diving" becomes "div", "person surfing a large wave"
/// still carries "surf").
pub fn family_for(base: &str) -> Option<&'static ActivityFamily> {
    let base = base.trim();
    if base.len() < MIN_MATCH_LEN {
        return None;
    }
    TAXONOMY
        .iter()
        .find(|family| matches_at_word_start(base, family.key))
}

/// Broad synonyms for a normalized base. Degenerates to `[base]` when no
/// taxonomy key matches, so unknown activities still search as themselves.
pub fn synonyms_for(base: &str) -> Vec<String> {
    match family_for(base) {
        Some(family) => {
            let mut terms: Vec<String> = family.broad.iter().map(|t| t.to_string()).collect();
            if !terms.iter().any(|t| t == family.key) {
                // the stem still matches as a substring even when the broad
                // list only carries full words
                terms.push(family.key.to_string());
            }
            terms
        }
        None => vec![base.trim().to_string()],
    }
}

/// Strictly-related terms for low-signal diversification. Empty when the
/// base is not in the taxonomy.
pub fn strict_terms_for(base: &str) -> Vec<String> {
    family_for(base)
        .map(|family| family.strict.iter().map(|t| t.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize_base;

    #[test]
    fn surf_resolves_to_water_family() {
        let family = family_for(&normalize_base("Surfing")).expect("surf family");
        assert_eq!(family.key, "surf");
        assert_eq!(family.domain, ActivityDomain::Water);
    }

    #[test]
    fn stripped_stem_still_finds_its_family() {
        // "diving" normalizes to "div", which is the stored stem
        let family = family_for(&normalize_base("diving")).expect("dive family");
        assert_eq!(family.domain, ActivityDomain::Water);
    }

    #[test]
    fn full_phrase_matches_embedded_key() {
        let base = normalize_base("person surfing a large wave");
        let family = family_for(&base).expect("surf family");
        assert_eq!(family.key, "surf");
    }

    #[test]
    fn jet_ski_wins_over_winter_ski() {
        let family = family_for(&normalize_base("Jet Skiing")).expect("jet ski family");
        assert_eq!(family.key, "jet ski");
        assert_eq!(family.domain, ActivityDomain::Motor);
    }

    #[test]
    fn skiing_is_winter_not_skydiving() {
        let family = family_for(&normalize_base("Skiing")).expect("ski family");
        assert_eq!(family.key, "ski");
        assert_eq!(family.domain, ActivityDomain::Winter);
    }

    #[test]
    fn skydiving_is_air_not_ski_or_dive() {
        let family = family_for(&normalize_base("skydiving")).expect("skydive family");
        assert_eq!(family.key, "skydiv");
        assert_eq!(family.domain, ActivityDomain::Air);
    }

    #[test]
    fn kitesurf_wins_over_surf() {
        let family = family_for(&normalize_base("kitesurfing")).expect("kitesurf family");
        assert_eq!(family.key, "kitesurf");
    }

    #[test]
    fn mid_word_hits_are_ignored() {
        // "craft workshop" contains "raft" but is not a rafting activity
        assert!(matches_at_word_start("white water raft", "raft"));
        assert!(!matches_at_word_start("craft workshop", "raft"));
        let family = family_for("craft beer tour");
        assert!(family.is_none() || family.unwrap().key != "raft");
    }

    #[test]
    fn surf_is_never_related_to_skydiving() {
        let surf = family_for("surf").unwrap();
        assert!(!surf.strict.iter().any(|t| t.contains("skydiv")));
        assert!(!surf.broad.iter().any(|t| t.contains("skydiv")));
    }

    #[test]
    fn unknown_activity_degenerates_to_itself() {
        assert_eq!(synonyms_for("axe throw"), vec!["axe throw".to_string()]);
        assert!(strict_terms_for("axe throw").is_empty());
    }

    #[test]
    fn short_fragments_never_match() {
        assert!(family_for("a").is_none());
        assert!(family_for("sk").is_none());
    }

    #[test]
    fn strict_terms_stay_inside_their_domain() {
        let terms = strict_terms_for("surf");
        assert!(terms.iter().any(|t| t == "surf lesson"));
        assert!(terms.iter().all(|t| !t.contains("sky")));
    }

    #[test]
    fn containing_keys_listed_before_their_substrings() {
        // first-match-wins depends on this ordering
        let pos = |key: &str| TAXONOMY.iter().position(|f| f.key == key).unwrap();
        assert!(pos("jet ski") < pos("ski"));
        assert!(pos("skydiv") < pos("ski"));
        assert!(pos("skydiv") < pos("div"));
        assert!(pos("kitesurf") < pos("surf"));
        assert!(pos("windsurf") < pos("surf"));
    }
}

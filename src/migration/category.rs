use std::fmt;

use serde::Serialize;

pub const LIFE_PATH_COLLECTION: &str = "life_paths";
pub const ZODIAC_COLLECTION: &str = "zodiacs";
pub const LIFE_PATH_LIFE_PATH_COLLECTION: &str = "life_path_life_path_compatibilities";
pub const LIFE_PATH_ZODIAC_COLLECTION: &str = "life_path_zodiac_compatibilities";
pub const ZODIAC_ZODIAC_COLLECTION: &str = "zodiac_zodiac_compatibilities";

pub const LIFE_PATH_TYPE: &str = "life-path";
pub const ZODIAC_TYPE: &str = "zodiac";

/// Kind of a compatibility factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorKind {
    LifePath,
    Zodiac,
}

impl FactorKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            LIFE_PATH_TYPE => Some(FactorKind::LifePath),
            ZODIAC_TYPE => Some(FactorKind::Zodiac),
            _ => None,
        }
    }
}

/// Which compatibility pairing a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairKind {
    LifePathLifePath,
    LifePathZodiac,
    ZodiacZodiac,
}

impl PairKind {
    pub const ALL: [PairKind; 3] = [
        PairKind::LifePathLifePath,
        PairKind::LifePathZodiac,
        PairKind::ZodiacZodiac,
    ];

    /// Precedence: life-path/life-path, then life-path/zodiac in either
    /// order, then zodiac/zodiac.
    pub fn from_factors(factor1: FactorKind, factor2: FactorKind) -> Self {
        use FactorKind::*;
        match (factor1, factor2) {
            (LifePath, LifePath) => PairKind::LifePathLifePath,
            (LifePath, Zodiac) | (Zodiac, LifePath) => PairKind::LifePathZodiac,
            (Zodiac, Zodiac) => PairKind::ZodiacZodiac,
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            PairKind::LifePathLifePath => LIFE_PATH_LIFE_PATH_COLLECTION,
            PairKind::LifePathZodiac => LIFE_PATH_ZODIAC_COLLECTION,
            PairKind::ZodiacZodiac => ZODIAC_ZODIAC_COLLECTION,
        }
    }

    /// URL slug, e.g. `life-path-zodiac`
    pub fn slug(&self) -> &'static str {
        match self {
            PairKind::LifePathLifePath => "life-path-life-path",
            PairKind::LifePathZodiac => "life-path-zodiac",
            PairKind::ZodiacZodiac => "zodiac-zodiac",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        PairKind::ALL.into_iter().find(|p| p.slug() == slug)
    }
}

/// Why a legacy record was not classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnknownType(String),
    MissingField(&'static str),
    UnsupportedPair { factor1: String, factor2: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownType(t) if t.is_empty() => write!(f, "no type discriminator"),
            SkipReason::UnknownType(t) => write!(f, "unknown type '{}'", t),
            SkipReason::MissingField(field) => write!(f, "missing required field '{}'", field),
            SkipReason::UnsupportedPair { factor1, factor2 } => {
                write!(f, "unsupported factor pair '{}' x '{}'", factor1, factor2)
            }
        }
    }
}

/// Destination category of a legacy record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    LifePath,
    Zodiac,
    Compatibility(PairKind),
    Unrecognized(SkipReason),
}

impl Category {
    /// Destination collection, `None` for unrecognized records
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            Category::LifePath => Some(LIFE_PATH_COLLECTION),
            Category::Zodiac => Some(ZODIAC_COLLECTION),
            Category::Compatibility(pair) => Some(pair.collection()),
            Category::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Category::Unrecognized(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::LifePath => write!(f, "{}", LIFE_PATH_TYPE),
            Category::Zodiac => write!(f, "{}", ZODIAC_TYPE),
            Category::Compatibility(pair) => write!(f, "{}", pair.slug()),
            Category::Unrecognized(reason) => write!(f, "unrecognized ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_precedence_is_total() {
        use FactorKind::*;
        assert_eq!(PairKind::from_factors(LifePath, LifePath), PairKind::LifePathLifePath);
        assert_eq!(PairKind::from_factors(LifePath, Zodiac), PairKind::LifePathZodiac);
        assert_eq!(PairKind::from_factors(Zodiac, LifePath), PairKind::LifePathZodiac);
        assert_eq!(PairKind::from_factors(Zodiac, Zodiac), PairKind::ZodiacZodiac);
    }

    #[test]
    fn slugs_round_trip() {
        for pair in PairKind::ALL {
            assert_eq!(PairKind::from_slug(pair.slug()), Some(pair));
        }
        assert_eq!(PairKind::from_slug("zodiac-life-path"), None);
    }

    #[test]
    fn unrecognized_has_no_collection() {
        let category = Category::Unrecognized(SkipReason::MissingField("code"));
        assert_eq!(category.collection(), None);
        assert!(!category.is_recognized());
    }
}

//! Classifier: decides which destination a legacy record belongs to.
//!
//! Pure and infallible. Anything that cannot be placed resolves to
//! [`Category::Unrecognized`] with the reason attached.

use bson::Document;

use super::category::{Category, FactorKind, PairKind, SkipReason, LIFE_PATH_TYPE, ZODIAC_TYPE};
use super::legacy::{scalar_code, LegacyRecord};

/// Discriminator fields every compatibility record must carry
pub const FACTOR_FIELDS: [&str; 4] = ["factor1Type", "factor1Code", "factor2Type", "factor2Code"];

/// Classify any legacy record. Records carrying a non-empty factor type
/// are compatibility data, everything else is basic data. Null factor
/// fields are ignored.
pub fn classify(document: &Document) -> Category {
    let record = LegacyRecord::new(document);
    if record.discriminator("factor1Type").is_some() || record.discriminator("factor2Type").is_some() {
        classify_compatibility(document)
    } else {
        classify_basic(document)
    }
}

/// Basic data: `type` selects life-path or zodiac, `code` is required
pub fn classify_basic(document: &Document) -> Category {
    let record = LegacyRecord::new(document);

    let category = match record.discriminator("type") {
        Some(LIFE_PATH_TYPE) => Category::LifePath,
        Some(ZODIAC_TYPE) => Category::Zodiac,
        other => {
            return Category::Unrecognized(SkipReason::UnknownType(
                other.unwrap_or_default().to_string(),
            ))
        }
    };

    if record.code().is_none() {
        return Category::Unrecognized(SkipReason::MissingField("code"));
    }

    category
}

/// Compatibility data: all four factor fields are required, then the pair
/// of factor types selects the destination.
pub fn classify_compatibility(document: &Document) -> Category {
    let record = LegacyRecord::new(document);

    for field in FACTOR_FIELDS {
        let present = match field {
            "factor1Code" | "factor2Code" => document.get(field).and_then(scalar_code).is_some(),
            _ => record.discriminator(field).is_some(),
        };
        if !present {
            return Category::Unrecognized(SkipReason::MissingField(field));
        }
    }

    let factor1 = record.discriminator("factor1Type").unwrap_or_default();
    let factor2 = record.discriminator("factor2Type").unwrap_or_default();

    match (FactorKind::parse(factor1), FactorKind::parse(factor2)) {
        (Some(kind1), Some(kind2)) => Category::Compatibility(PairKind::from_factors(kind1, kind2)),
        _ => Category::Unrecognized(SkipReason::UnsupportedPair {
            factor1: factor1.to_string(),
            factor2: factor2.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, Bson};

    #[test]
    fn basic_types_with_code_are_recognized() {
        assert_eq!(classify(&doc! { "type": "life-path", "code": "7" }), Category::LifePath);
        assert_eq!(classify(&doc! { "type": "zodiac", "code": "Aries" }), Category::Zodiac);
        assert_eq!(classify(&doc! { "type": "life-path", "code": 22_i32 }), Category::LifePath);
    }

    #[test]
    fn missing_code_overrides_matching_type() {
        assert_eq!(
            classify(&doc! { "type": "life-path", "title": "Seeker" }),
            Category::Unrecognized(SkipReason::MissingField("code"))
        );
        assert_eq!(
            classify(&doc! { "type": "zodiac", "code": "" }),
            Category::Unrecognized(SkipReason::MissingField("code"))
        );
    }

    #[test]
    fn unknown_or_missing_type_is_unrecognized() {
        assert_eq!(
            classify(&doc! { "type": "tarot", "code": "1" }),
            Category::Unrecognized(SkipReason::UnknownType("tarot".into()))
        );
        assert_eq!(
            classify(&doc! { "code": "1" }),
            Category::Unrecognized(SkipReason::UnknownType(String::new()))
        );
        assert_eq!(
            classify(&doc! { "type": 3_i32, "code": "1" }),
            Category::Unrecognized(SkipReason::UnknownType(String::new()))
        );
    }

    #[test]
    fn compatibility_pairs_follow_precedence() {
        let pair = |t1: &str, t2: &str| {
            classify(&doc! { "factor1Type": t1, "factor1Code": "1", "factor2Type": t2, "factor2Code": "2" })
        };

        assert_eq!(pair("life-path", "life-path"), Category::Compatibility(PairKind::LifePathLifePath));
        assert_eq!(pair("life-path", "zodiac"), Category::Compatibility(PairKind::LifePathZodiac));
        assert_eq!(pair("zodiac", "life-path"), Category::Compatibility(PairKind::LifePathZodiac));
        assert_eq!(pair("zodiac", "zodiac"), Category::Compatibility(PairKind::ZodiacZodiac));
        assert!(!pair("zodiac", "tarot").is_recognized());
        assert!(!pair("moon", "moon").is_recognized());
    }

    #[test]
    fn zodiac_first_pair_routes_to_life_path_zodiac() {
        let document = doc! {
            "factor1Type": "zodiac",
            "factor1Code": "Aries",
            "factor2Type": "life-path",
            "factor2Code": "3",
        };
        let category = classify(&document);
        assert_eq!(category, Category::Compatibility(PairKind::LifePathZodiac));
        assert_eq!(category.collection(), Some("life_path_zodiac_compatibilities"));
    }

    #[test]
    fn any_missing_factor_field_is_unrecognized() {
        let complete = doc! {
            "factor1Type": "life-path",
            "factor1Code": "1",
            "factor2Type": "life-path",
            "factor2Code": "9",
        };
        for field in FACTOR_FIELDS {
            let mut partial = complete.clone();
            partial.remove(field);
            assert_eq!(
                classify(&partial),
                Category::Unrecognized(SkipReason::MissingField(field)),
                "without {}",
                field
            );
        }
    }

    #[test]
    fn type_field_does_not_rescue_partial_compatibility_record() {
        let document = doc! { "type": "life-path", "code": "1", "factor1Type": "life-path" };
        assert!(!classify(&document).is_recognized());
    }

    #[test]
    fn null_factor_fields_leave_basic_records_alone() {
        let document = doc! { "type": "life-path", "code": "7", "factor1Type": Bson::Null, "factor2Type": "" };
        assert_eq!(classify(&document), Category::LifePath);
    }

    #[test]
    fn whole_number_doubles_are_valid_codes() {
        assert_eq!(classify(&doc! { "type": "life-path", "code": 7.0_f64 }), Category::LifePath);
        assert_eq!(
            classify(&doc! { "factor1Type": "life-path", "factor1Code": 3.0_f64, "factor2Type": "zodiac", "factor2Code": "Leo" }),
            Category::Compatibility(PairKind::LifePathZodiac)
        );
        assert_eq!(
            classify(&doc! { "type": "life-path", "code": 7.5_f64 }),
            Category::Unrecognized(SkipReason::MissingField("code"))
        );
    }
}

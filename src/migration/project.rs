//! Field projector: turns a classified legacy record into the normalized
//! document written to its destination collection.

use std::fmt;

use bson::{doc, Bson, DateTime, Document};
use serde::Serialize;

use super::category::Category;
use super::classify::FACTOR_FIELDS;
use super::legacy::{LegacyRecord, TransformError};

/// Field set that identifies a destination document
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalKey(Document);

impl NaturalKey {
    pub fn code(code: impl Into<String>) -> Self {
        NaturalKey(doc! { "code": code.into() })
    }

    /// Directional factor pair, values copied verbatim from the source
    pub fn pair(source: &Document) -> Result<Self, TransformError> {
        let mut key = Document::new();
        for field in FACTOR_FIELDS {
            let value = source
                .get(field)
                .cloned()
                .ok_or_else(|| TransformError::NotProjectable(format!("missing {}", field)))?;
            key.insert(field, value);
        }
        Ok(NaturalKey(key))
    }

    /// Equality filter for lookups
    pub fn filter(&self) -> Document {
        self.0.clone()
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| match v {
                Bson::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

/// Normalized document bound for one destination collection
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRecord {
    pub collection: &'static str,
    pub key: NaturalKey,
    /// Every projected field, `updatedAt` included, `createdAt` excluded
    pub fields: Document,
    /// `createdAt` carried over from the source
    pub created_at: Option<Bson>,
}

#[derive(Debug, Default, Serialize)]
pub struct LifePathEntry {
    pub code: String,
    pub title: String,
    pub overview: String,
    pub traits: Vec<Bson>,
    pub strengths: Vec<Bson>,
    pub weaknesses: Vec<Bson>,
    #[serde(rename = "numberMeaning")]
    pub number_meaning: String,
    pub vibration: String,
    #[serde(rename = "personalityTraits")]
    pub personality_traits: Vec<Bson>,
    pub symbols: Vec<Bson>,
    pub famous_people: Vec<Bson>,
    pub lucky_elements: Document,
    pub compatibility: Document,
    pub details: Document,
}

impl LifePathEntry {
    pub fn from_legacy(record: &LegacyRecord<'_>, code: String) -> Result<Self, TransformError> {
        let details = merged_details(
            record,
            doc! {
                "career": record.text("career")?,
                "relationships": record.text("relationships")?,
                "advice": record.text("advice")?,
                "challenges": record.list("challenges")?,
                "opportunities": record.list("opportunities")?,
            },
        )?;

        Ok(Self {
            code,
            title: record.text("title")?,
            overview: record.text("overview")?,
            traits: record.list("traits")?,
            strengths: record.list("strengths")?,
            weaknesses: record.list("weaknesses")?,
            number_meaning: record.text("numberMeaning")?,
            vibration: record.text("vibration")?,
            personality_traits: record.list("personalityTraits")?,
            symbols: record.list("symbols")?,
            famous_people: record.list("famous_people")?,
            lucky_elements: record.mapping("lucky_elements")?,
            compatibility: record.mapping("compatibility")?,
            details,
        })
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ZodiacEntry {
    pub code: String,
    pub title: String,
    pub overview: String,
    pub traits: Vec<Bson>,
    pub strengths: Vec<Bson>,
    pub weaknesses: Vec<Bson>,
    pub element: String,
    pub ruling_planet: String,
    pub date_range: String,
    pub modality: String,
    pub symbol: String,
    pub symbols: Vec<Bson>,
    pub famous_people: Vec<Bson>,
    pub compatibility: Document,
    pub lucky_elements: Document,
    pub personality_in_different_life_stages: Document,
    pub details: Document,
}

impl ZodiacEntry {
    pub fn from_legacy(record: &LegacyRecord<'_>, code: String) -> Result<Self, TransformError> {
        let details = merged_details(
            record,
            doc! {
                "personality": record.text("personality")?,
                "relationships": record.text("relationships")?,
                "career": record.text("career")?,
                "advice": record.text("advice")?,
            },
        )?;

        Ok(Self {
            code,
            title: record.text("title")?,
            overview: record.text("overview")?,
            traits: record.list("traits")?,
            strengths: record.list("strengths")?,
            weaknesses: record.list("weaknesses")?,
            element: record.text("element")?,
            ruling_planet: record.text("ruling_planet")?,
            date_range: record.text("date_range")?,
            modality: record.text("modality")?,
            symbol: record.text("symbol")?,
            symbols: record.list("symbols")?,
            famous_people: record.list("famous_people")?,
            compatibility: record.mapping("compatibility")?,
            lucky_elements: record.mapping("lucky_elements")?,
            personality_in_different_life_stages: record.mapping("personality_in_different_life_stages")?,
            details,
        })
    }
}

/// Normalized detail keys overlaid by the original `details` mapping
fn merged_details(record: &LegacyRecord<'_>, mut normalized: Document) -> Result<Document, TransformError> {
    if let Some(original) = record.details()? {
        for (key, value) in original {
            normalized.insert(key.clone(), value.clone());
        }
    }
    Ok(normalized)
}

// Fields the projector owns on compatibility records
const COMPATIBILITY_STAMPS: [&str; 4] = ["_id", "createdAt", "updatedAt", "migratedAt"];

/// Project a classified record. Never mutates the source.
pub fn project(source: &Document, category: &Category, now: DateTime) -> Result<DestinationRecord, TransformError> {
    let record = LegacyRecord::new(source);
    let collection = category
        .collection()
        .ok_or_else(|| TransformError::NotProjectable(category.to_string()))?;

    let (key, mut fields) = match category {
        Category::LifePath | Category::Zodiac => {
            let code = record
                .code()
                .ok_or_else(|| TransformError::NotProjectable("missing code".to_string()))?;
            let fields = if matches!(category, Category::LifePath) {
                encode(&LifePathEntry::from_legacy(&record, code.clone())?)?
            } else {
                encode(&ZodiacEntry::from_legacy(&record, code.clone())?)?
            };
            (NaturalKey::code(code), fields)
        }
        Category::Compatibility(_) => {
            let key = NaturalKey::pair(source)?;
            let mut fields = source.clone();
            for stamp in COMPATIBILITY_STAMPS {
                fields.remove(stamp);
            }
            fields.insert("migratedAt", now);
            (key, fields)
        }
        Category::Unrecognized(reason) => return Err(TransformError::NotProjectable(reason.to_string())),
    };

    fields.insert("updatedAt", now);

    Ok(DestinationRecord {
        collection,
        key,
        fields,
        created_at: record.created_at().cloned(),
    })
}

fn encode<T: Serialize>(entry: &T) -> Result<Document, TransformError> {
    bson::to_document(entry).map_err(|e| TransformError::Encode(e.to_string()))
}

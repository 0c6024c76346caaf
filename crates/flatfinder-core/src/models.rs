//! Listing data model.

use pgvector::Vector;
use serde::{Deserialize, Serialize};

/// Listing identifier (store primary key).
pub type ListingId = i32;

/// One apartment listing as stored, including its description embedding.
///
/// The embedding is written by ingestion and is never serialized into
/// results handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub location: String,
    pub rooms: i32,
    pub price: f64,
    pub area: f64,
    pub floor: i32,
    pub beds: i32,
    pub has_wifi: bool,
    pub has_parking: bool,
    pub has_kitchen: bool,
    pub description: String,
    #[serde(skip)]
    pub embedding: Option<Vector>,
}

impl ListingRecord {
    /// Minimal record with zeroed numeric fields and no embedding.
    pub fn new(id: ListingId, location: impl Into<String>) -> Self {
        Self {
            id,
            location: location.into(),
            rooms: 0,
            price: 0.0,
            area: 0.0,
            floor: 0,
            beds: 0,
            has_wifi: false,
            has_parking: false,
            has_kitchen: false,
            description: String::new(),
            embedding: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_rooms(mut self, rooms: i32) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(Vector::from(embedding));
        self
    }

    /// Stored embedding as a slice, if present.
    pub fn embedding_slice(&self) -> Option<&[f32]> {
        self.embedding.as_ref().map(Vector::as_slice)
    }
}

/// A listing paired with its similarity to the query vector.
///
/// Exists only within one ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub listing: ListingRecord,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_not_serialized() {
        let record = ListingRecord::new(7, "Lviv")
            .with_description("Sunny")
            .with_embedding(vec![0.1, 0.2]);

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["location"], "Lviv");
        assert!(json.get("embedding").is_none());

        let back: ListingRecord = serde_json::from_value(json).unwrap();
        assert!(back.embedding.is_none());
        assert_eq!(back.description, "Sunny");
    }

    #[test]
    fn test_embedding_slice() {
        let record = ListingRecord::new(1, "Kyiv").with_embedding(vec![1.0, 0.0]);
        assert_eq!(record.embedding_slice(), Some(&[1.0f32, 0.0][..]));
        assert_eq!(ListingRecord::new(2, "Kyiv").embedding_slice(), None);
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{
    options::{FindOptions, ReplaceOptions},
    Collection, Database,
};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::schemas::{now_millis, Currency, Trip};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("Trip was modified concurrently")]
    Conflict,
}

/// Persistence for trips, keyed by trip id.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create(&self, name: &str, currency: Currency) -> Result<Trip, StoreError> {
        let trip = Trip::new(uuid::Uuid::new_v4().to_string(), name, currency);
        self.save(trip).await
    }

    /// Most recently updated first.
    async fn list(&self) -> Result<Vec<Trip>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Trip>, StoreError>;

    /// Inserts or overwrites the trip, stamping `updated_at`.
    async fn save(&self, trip: Trip) -> Result<Trip, StoreError>;

    /// Overwrites a trip loaded earlier. Fails with [`StoreError::Conflict`]
    /// when the stored copy no longer carries the `updated_at` it was read
    /// with, or is gone.
    async fn update(&self, trip: Trip) -> Result<Trip, StoreError>;

    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

// Strictly increasing so two writes in the same millisecond stay distinct
fn next_stamp(previous: i64) -> i64 {
    now_millis().max(previous + 1)
}

pub struct MongoTripStore {
    trips: Collection<Trip>,
}

impl MongoTripStore {
    pub fn new(database: &Database) -> Self {
        MongoTripStore {
            trips: database.collection("Trips"),
        }
    }
}

#[async_trait]
impl TripStore for MongoTripStore {
    async fn list(&self) -> Result<Vec<Trip>, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "updatedAt": -1 })
            .build();
        let cursor = self.trips.find(None, options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get(&self, id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.find_one(doc! { "id": id }, None).await?)
    }

    async fn save(&self, mut trip: Trip) -> Result<Trip, StoreError> {
        trip.updated_at = now_millis();
        let options = ReplaceOptions::builder().upsert(true).build();
        self.trips
            .replace_one(doc! { "id": trip.id.as_str() }, &trip, options)
            .await?;
        Ok(trip)
    }

    async fn update(&self, mut trip: Trip) -> Result<Trip, StoreError> {
        let read_at = trip.updated_at;
        trip.updated_at = next_stamp(read_at);
        let result = self
            .trips
            .replace_one(
                doc! { "id": trip.id.as_str(), "updatedAt": read_at },
                &trip,
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(trip)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.trips.delete_one(doc! { "id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }
}

#[derive(Default)]
pub struct MemoryTripStore {
    trips: RwLock<HashMap<String, Trip>>,
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn list(&self) -> Result<Vec<Trip>, StoreError> {
        let mut trips: Vec<Trip> = self.trips.read().await.values().cloned().collect();
        trips.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(trips)
    }

    async fn get(&self, id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(self.trips.read().await.get(id).cloned())
    }

    async fn save(&self, mut trip: Trip) -> Result<Trip, StoreError> {
        trip.updated_at = now_millis();
        self.trips
            .write()
            .await
            .insert(trip.id.clone(), trip.clone());
        Ok(trip)
    }

    async fn update(&self, mut trip: Trip) -> Result<Trip, StoreError> {
        let mut trips = self.trips.write().await;
        let stored = trips.get(&trip.id).ok_or(StoreError::Conflict)?;
        if stored.updated_at != trip.updated_at {
            return Err(StoreError::Conflict);
        }
        trip.updated_at = next_stamp(stored.updated_at);
        trips.insert(trip.id.clone(), trip.clone());
        Ok(trip)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.trips.write().await.remove(id).is_some())
    }
}

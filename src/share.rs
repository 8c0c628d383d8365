//! Short-lived share links for trips.
//!
//! A shared trip is stored under an 8 character id and stays readable for
//! 30 days. Expired entries are removed lazily on lookup and in bulk by
//! [`ShareStore::cleanup_expired`].
use std::collections::HashMap;

use async_trait::async_trait;
use bson::doc;
use chrono::Duration;
use mongodb::{Collection, Database};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::schemas::{now_millis, SharedTrip, Trip};
use crate::store::StoreError;

const SHARE_ID_LEN: usize = 8;

pub fn share_expiration() -> Duration {
    Duration::days(30)
}

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Invalid trip data")]
    InvalidTrip,
    #[error("Share not found")]
    NotFound,
    #[error("This share link has expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<mongodb::error::Error> for ShareError {
    fn from(err: mongodb::error::Error) -> Self {
        ShareError::Store(err.into())
    }
}

pub fn generate_share_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_ID_LEN)
        .map(char::from)
        .collect()
}

fn new_share(trip: Trip, expiration: Duration) -> Result<SharedTrip, ShareError> {
    if trip.id.is_empty() {
        return Err(ShareError::InvalidTrip);
    }
    let now = now_millis();
    Ok(SharedTrip {
        id: generate_share_id(),
        trip,
        created_at: now,
        expires_at: now + expiration.num_milliseconds(),
    })
}

#[async_trait]
pub trait ShareStore: Send + Sync {
    async fn create(&self, trip: Trip) -> Result<SharedTrip, ShareError>;

    async fn fetch(&self, id: &str) -> Result<Trip, ShareError>;

    /// Deletes every expired share and returns how many were removed.
    async fn cleanup_expired(&self) -> Result<u64, ShareError>;
}

pub struct MongoShareStore {
    shares: Collection<SharedTrip>,
    expiration: Duration,
}

impl MongoShareStore {
    pub fn new(database: &Database) -> Self {
        MongoShareStore {
            shares: database.collection("SharedTrips"),
            expiration: share_expiration(),
        }
    }
}

#[async_trait]
impl ShareStore for MongoShareStore {
    async fn create(&self, trip: Trip) -> Result<SharedTrip, ShareError> {
        let share = new_share(trip, self.expiration)?;
        self.shares.insert_one(&share, None).await?;
        Ok(share)
    }

    async fn fetch(&self, id: &str) -> Result<Trip, ShareError> {
        let share = self
            .shares
            .find_one(doc! { "id": id }, None)
            .await?
            .ok_or(ShareError::NotFound)?;
        if now_millis() > share.expires_at {
            self.shares.delete_one(doc! { "id": id }, None).await?;
            return Err(ShareError::Expired);
        }
        Ok(share.trip)
    }

    async fn cleanup_expired(&self) -> Result<u64, ShareError> {
        let result = self
            .shares
            .delete_many(doc! { "expiresAt": { "$lt": now_millis() } }, None)
            .await?;
        Ok(result.deleted_count)
    }
}

pub struct MemoryShareStore {
    shares: RwLock<HashMap<String, SharedTrip>>,
    expiration: Duration,
}

impl MemoryShareStore {
    pub fn with_expiration(expiration: Duration) -> Self {
        MemoryShareStore {
            shares: RwLock::default(),
            expiration,
        }
    }
}

impl Default for MemoryShareStore {
    fn default() -> Self {
        MemoryShareStore::with_expiration(share_expiration())
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn create(&self, trip: Trip) -> Result<SharedTrip, ShareError> {
        let share = new_share(trip, self.expiration)?;
        self.shares
            .write()
            .await
            .insert(share.id.clone(), share.clone());
        Ok(share)
    }

    async fn fetch(&self, id: &str) -> Result<Trip, ShareError> {
        let mut shares = self.shares.write().await;
        let share = shares.get(id).ok_or(ShareError::NotFound)?;
        if now_millis() > share.expires_at {
            shares.remove(id);
            return Err(ShareError::Expired);
        }
        Ok(share.trip.clone())
    }

    async fn cleanup_expired(&self) -> Result<u64, ShareError> {
        let now = now_millis();
        let mut shares = self.shares.write().await;
        let before = shares.len();
        shares.retain(|_, share| share.expires_at >= now);
        Ok((before - shares.len()) as u64)
    }
}

//! Compact trip payload for sharing through a URL, no server involved.
//!
//! Field names are shortened to single letters and the JSON is encoded as
//! unpadded base64url so it can sit in a query parameter.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::schemas::{Currency, Expense, ExpenseItem, Person, Trip};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("trip data is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("trip data is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CompactTrip {
    n: String,
    #[serde(default)]
    c: Currency,
    p: Vec<CompactPerson>,
    e: Vec<CompactExpense>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
struct CompactPerson {
    n: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    c: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
struct CompactExpense {
    d: String,
    a: f64,
    pb: String,
    pf: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    i: Option<Vec<CompactItem>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
struct CompactItem {
    d: String,
    a: f64,
    pf: Vec<String>,
}

impl From<&Trip> for CompactTrip {
    fn from(trip: &Trip) -> Self {
        CompactTrip {
            n: trip.name.clone(),
            c: trip.currency,
            p: trip
                .people
                .iter()
                .map(|person| CompactPerson {
                    n: person.name.clone(),
                    c: Some(person.weight),
                })
                .collect(),
            e: trip
                .expenses
                .iter()
                .map(|expense| CompactExpense {
                    d: expense.description.clone(),
                    a: expense.amount,
                    pb: expense.payer.clone(),
                    pf: expense.consumers.clone(),
                    i: expense.items.as_ref().map(|items| {
                        items
                            .iter()
                            .map(|item| CompactItem {
                                d: item.description.clone(),
                                a: item.amount,
                                pf: item.consumers.clone(),
                            })
                            .collect()
                    }),
                })
                .collect(),
        }
    }
}

impl CompactTrip {
    pub fn name(&self) -> &str {
        &self.n
    }

    /// Rebuilds a full trip under a fresh id. Expense ids are not shared, so
    /// every expense gets a new one.
    pub fn into_trip(self) -> Trip {
        let mut trip = Trip::new(
            Uuid::new_v4().to_string(),
            format!("{} (Shared)", self.n),
            self.c,
        );
        trip.people = self
            .p
            .into_iter()
            .map(|p| Person::new(p.n, p.c.filter(|c| *c > 0).unwrap_or(1)))
            .collect();
        trip.expenses = self
            .e
            .into_iter()
            .map(|e| Expense {
                id: Uuid::new_v4().to_string(),
                description: e.d,
                amount: e.a,
                payer: e.pb,
                consumers: e.pf,
                items: e.i.map(|items| {
                    items
                        .into_iter()
                        .map(|item| ExpenseItem {
                            description: item.d,
                            amount: item.a,
                            consumers: item.pf,
                        })
                        .collect()
                }),
            })
            .collect();
        trip
    }
}

pub fn encode_trip(trip: &Trip) -> Result<String, CodecError> {
    let json = serde_json::to_vec(&CompactTrip::from(trip))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_trip(data: &str) -> Result<CompactTrip, CodecError> {
    let json = URL_SAFE_NO_PAD.decode(data.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&json)?)
}

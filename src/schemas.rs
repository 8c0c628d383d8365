use serde::{Deserialize, Serialize};
use std::fmt;

pub type PersonName = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Person {
    pub name: PersonName,
    /// How many cost-bearing shares this slot stands for, e.g. 2 for a couple.
    #[serde(rename = "count", default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl Person {
    pub fn new(name: impl Into<PersonName>, weight: u32) -> Self {
        Person {
            name: name.into(),
            weight,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExpenseItem {
    pub description: String,
    pub amount: f64,
    #[serde(rename = "paidFor")]
    pub consumers: Vec<PersonName>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "paidBy")]
    pub payer: PersonName,
    #[serde(rename = "paidFor")]
    pub consumers: Vec<PersonName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ExpenseItem>>,
}

impl Expense {
    /// The items used for allocation, if the expense is itemized at all.
    /// An empty item list counts as not itemized.
    pub fn allocation_items(&self) -> Option<&[ExpenseItem]> {
        self.items.as_deref().filter(|items| !items.is_empty())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[default]
    #[serde(rename = "BDT")]
    Bdt,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Bdt => "৳",
        }
    }

    pub fn format(self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Usd => write!(f, "USD"),
            Currency::Bdt => write!(f, "BDT"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Unix milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl Trip {
    pub fn new(id: impl Into<String>, name: impl Into<String>, currency: Currency) -> Self {
        let now = now_millis();
        Trip {
            id: id.into(),
            name: name.into(),
            currency,
            people: vec![],
            expenses: vec![],
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedTrip {
    pub id: String,
    pub trip: Trip,
    pub created_at: i64,
    pub expires_at: i64,
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

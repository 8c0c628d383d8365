use std::collections::{HashMap, HashSet};

use crate::schemas::{Expense, Person, PersonName};

type Weights<'a> = HashMap<&'a str, u32>;

/// Running totals of what everyone paid and consumed. Names an expense
/// references but the roster lacks are accumulated too.
#[derive(Debug, Default)]
pub struct Ledger {
    paid: HashMap<PersonName, f64>,
    owes: HashMap<PersonName, f64>,
    pub total_cost: f64,
}

impl Ledger {
    fn add_paid(&mut self, name: &str, amount: f64) {
        *self.paid.entry(name.to_string()).or_insert(0.0) += amount;
    }

    fn add_owed(&mut self, name: &str, amount: f64) {
        *self.owes.entry(name.to_string()).or_insert(0.0) += amount;
    }

    pub fn paid(&self, name: &str) -> f64 {
        self.paid.get(name).copied().unwrap_or(0.0)
    }

    pub fn owes(&self, name: &str) -> f64 {
        self.owes.get(name).copied().unwrap_or(0.0)
    }

    /// Paid minus owed for every roster name, in roster order. A repeated
    /// name keeps its first position.
    pub fn net_balances(&self, people: &[Person]) -> Vec<(PersonName, f64)> {
        let mut seen = HashSet::new();
        people
            .iter()
            .filter(|person| seen.insert(person.name.as_str()))
            .map(|person| {
                let name = &person.name;
                (name.clone(), self.paid(name) - self.owes(name))
            })
            .collect()
    }
}

pub fn compute_ledger(people: &[Person], expenses: &[Expense]) -> Ledger {
    let mut ledger = Ledger::default();
    let mut weights = Weights::new();
    for person in people {
        weights.insert(&person.name, person.weight);
    }

    for expense in expenses {
        ledger.total_cost += expense.amount;
        ledger.add_paid(&expense.payer, expense.amount);

        match expense.allocation_items() {
            Some(items) => {
                for item in items {
                    distribute(&mut ledger, &weights, item.amount, &item.consumers);
                }
            }
            None => distribute(&mut ledger, &weights, expense.amount, &expense.consumers),
        }
    }
    ledger
}

fn weight_of(weights: &Weights, name: &str) -> u32 {
    // Unknown names and zero weights both count as a single share
    weights.get(name).copied().filter(|w| *w > 0).unwrap_or(1)
}

// Splits `amount` across `consumers` proportionally to their weights
fn distribute(ledger: &mut Ledger, weights: &Weights, amount: f64, consumers: &[PersonName]) {
    let total_weight: u32 = consumers.iter().map(|c| weight_of(weights, c)).sum();
    if total_weight == 0 {
        return;
    }

    for consumer in consumers {
        let share = amount * f64::from(weight_of(weights, consumer)) / f64::from(total_weight);
        ledger.add_owed(consumer, share);
    }
}

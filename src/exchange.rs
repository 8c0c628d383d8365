use crate::balance::compute_ledger;
use crate::schemas::{Expense, Person, PersonName};
use serde::{Deserialize, Serialize};

/// Balances within a cent of zero are considered settled.
const SETTLED_THRESHOLD: f64 = 0.01;

#[derive(Clone, Debug)]
pub struct PersonalBalance {
    pub id: PersonName,
    pub balance: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Transaction {
    pub from: PersonName,
    pub to: PersonName,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct IndividualCost {
    pub person: PersonName,
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub total_cost: f64,
    pub individual_costs: Vec<IndividualCost>,
    pub transactions: Vec<Transaction>,
}

impl Settlement {
    pub fn empty() -> Self {
        Settlement {
            total_cost: 0.0,
            individual_costs: vec![],
            transactions: vec![],
        }
    }
}

/// Works out each person's fair share of the trip and the payments that
/// bring everyone back to zero.
///
/// The function is total: unknown names, empty consumer lists and
/// inconsistent itemizations degrade to skipped entries instead of errors.
/// Only names in `people` are balanced, so money paid or consumed by
/// anyone else never shows up in a cost or a transaction.
pub fn calculate_settlement(people: &[Person], expenses: &[Expense]) -> Settlement {
    if people.is_empty() {
        return Settlement::empty();
    }

    let ledger = compute_ledger(people, expenses);

    let individual_costs = people
        .iter()
        .map(|person| IndividualCost {
            person: person.name.clone(),
            cost: round_to_2_decimals(ledger.owes(&person.name)),
        })
        .collect();

    // Divide people into debtors and creditors
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();
    for (id, balance) in ledger.net_balances(people) {
        let balance = round_to_2_decimals(balance);
        if !balance.is_finite() {
            continue;
        }
        if balance > SETTLED_THRESHOLD {
            creditors.push(PersonalBalance { id, balance });
        } else if balance < -SETTLED_THRESHOLD {
            debtors.push(PersonalBalance {
                id,
                balance: -balance,
            });
        }
    }

    Settlement {
        total_cost: round_to_2_decimals(ledger.total_cost),
        individual_costs,
        transactions: get_simplified_transactions(debtors, creditors),
    }
}

// Greedily matches the largest remaining debtor with the largest remaining
// creditor. Equal balances keep their original order.
fn get_simplified_transactions(
    mut debtors: Vec<PersonalBalance>,
    mut creditors: Vec<PersonalBalance>,
) -> Vec<Transaction> {
    debtors.sort_by(|a, b| b.balance.total_cmp(&a.balance));
    creditors.sort_by(|a, b| b.balance.total_cmp(&a.balance));

    let mut transactions = Vec::new();
    let (mut d, mut c) = (0, 0);

    while d < debtors.len() && c < creditors.len() {
        let debtor = &mut debtors[d];
        let creditor = &mut creditors[c];

        let amount = debtor.balance.min(creditor.balance);
        if amount > SETTLED_THRESHOLD {
            transactions.push(Transaction {
                from: debtor.id.clone(),
                to: creditor.id.clone(),
                amount: round_to_2_decimals(amount),
            });
        }

        debtor.balance -= amount;
        creditor.balance -= amount;

        // A NaN remainder counts as settled too
        if debtor.balance.is_nan() || debtor.balance < SETTLED_THRESHOLD {
            d += 1;
        }
        if creditor.balance.is_nan() || creditor.balance < SETTLED_THRESHOLD {
            c += 1;
        }
    }
    transactions
}

/// Rounds to cents, halves towards positive infinity.
pub fn round_to_2_decimals(n: f64) -> f64 {
    (n * 100.0 + 0.5).floor() / 100.0
}

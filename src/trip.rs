use thiserror::Error;

use crate::exchange::{calculate_settlement, Settlement};
use crate::schemas::{Expense, Person, Trip};
use crate::validation::{validate_expense, validate_person, ValidationError};

#[derive(Error, Debug, PartialEq)]
pub enum TripError {
    #[error("No person at position {0}")]
    PersonNotFound(usize),
    #[error("\"{0}\" expense not found!")]
    ExpenseNotFound(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Trip {
    pub fn settlement(&self) -> Settlement {
        calculate_settlement(&self.people, &self.expenses)
    }

    pub fn add_person(&mut self, mut person: Person) -> Result<(), TripError> {
        validate_person(&person, self.people.iter().map(|p| p.name.as_str()))?;
        person.name = person.name.trim().to_string();
        self.people.push(person);
        Ok(())
    }

    /// Replaces the person at `index`. A rename is carried over to every
    /// expense that references the old name.
    pub fn update_person(&mut self, index: usize, mut person: Person) -> Result<(), TripError> {
        if index >= self.people.len() {
            return Err(TripError::PersonNotFound(index));
        }
        let others = self
            .people
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.name.as_str());
        validate_person(&person, others)?;
        person.name = person.name.trim().to_string();

        let old_name = std::mem::replace(&mut self.people[index], person).name;
        let new_name = &self.people[index].name;
        if old_name != *new_name {
            for expense in &mut self.expenses {
                if expense.payer == old_name {
                    expense.payer = new_name.clone();
                }
                rename(&mut expense.consumers, &old_name, new_name);
                for item in expense.items.iter_mut().flatten() {
                    rename(&mut item.consumers, &old_name, new_name);
                }
            }
        }
        Ok(())
    }

    /// Removes the person at `index` and drops them from every consumer
    /// list. Expenses they paid keep them as payer.
    pub fn remove_person(&mut self, index: usize) -> Result<Person, TripError> {
        if index >= self.people.len() {
            return Err(TripError::PersonNotFound(index));
        }
        let removed = self.people.remove(index);
        for expense in &mut self.expenses {
            expense.consumers.retain(|c| *c != removed.name);
            for item in expense.items.iter_mut().flatten() {
                item.consumers.retain(|c| *c != removed.name);
            }
        }
        Ok(removed)
    }

    pub fn add_expense(&mut self, expense: Expense) -> Result<(), TripError> {
        validate_expense(&expense)?;
        self.expenses.push(expense);
        Ok(())
    }

    pub fn update_expense(&mut self, id: &str, mut expense: Expense) -> Result<(), TripError> {
        validate_expense(&expense)?;
        let slot = self
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| TripError::ExpenseNotFound(id.to_string()))?;
        expense.id = id.to_string();
        *slot = expense;
        Ok(())
    }

    pub fn remove_expense(&mut self, id: &str) -> Result<Expense, TripError> {
        let index = self
            .expenses
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| TripError::ExpenseNotFound(id.to_string()))?;
        Ok(self.expenses.remove(index))
    }
}

fn rename(names: &mut [String], old_name: &str, new_name: &str) {
    for name in names.iter_mut().filter(|n| n.as_str() == old_name) {
        *name = new_name.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::IndividualCost;
    use crate::schemas::{Currency, ExpenseItem};

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn trip() -> Trip {
        let mut trip = Trip::new("t1", "Cox's Bazar", Currency::Bdt);
        trip.add_person(Person::new("Alice", 1)).unwrap();
        trip.add_person(Person::new("Bob", 2)).unwrap();
        trip.add_expense(Expense {
            id: "e1".to_string(),
            description: "Hotel".to_string(),
            amount: 90.0,
            payer: "Alice".to_string(),
            consumers: strings(&["Alice", "Bob"]),
            items: Some(vec![
                ExpenseItem {
                    description: "Room A".to_string(),
                    amount: 30.0,
                    consumers: strings(&["Alice"]),
                },
                ExpenseItem {
                    description: "Room B".to_string(),
                    amount: 60.0,
                    consumers: strings(&["Bob"]),
                },
            ]),
        })
        .unwrap();
        trip
    }

    #[test]
    fn add_person_trims_and_rejects_duplicates() {
        let mut trip = trip();
        trip.add_person(Person::new("  Carol ", 1)).unwrap();
        assert_eq!(trip.people[2].name, "Carol");
        assert_eq!(
            trip.add_person(Person::new("Carol", 1)),
            Err(TripError::Invalid(ValidationError::DuplicateName(
                "Carol".to_string()
            )))
        );
    }

    #[test]
    fn rename_cascades_to_expenses() {
        let mut trip = trip();
        trip.update_person(0, Person::new("Alicia", 1)).unwrap();
        let expense = &trip.expenses[0];
        assert_eq!(expense.payer, "Alicia");
        assert_eq!(expense.consumers, strings(&["Alicia", "Bob"]));
        let items = expense.items.as_ref().unwrap();
        assert_eq!(items[0].consumers, strings(&["Alicia"]));
        assert_eq!(items[1].consumers, strings(&["Bob"]));
    }

    #[test]
    fn update_person_may_keep_own_name() {
        let mut trip = trip();
        trip.update_person(1, Person::new("Bob", 3)).unwrap();
        assert_eq!(trip.people[1].weight, 3);
        assert_eq!(
            trip.update_person(1, Person::new("Alice", 1)),
            Err(TripError::Invalid(ValidationError::DuplicateName(
                "Alice".to_string()
            )))
        );
        assert_eq!(
            trip.update_person(7, Person::new("Zed", 1)),
            Err(TripError::PersonNotFound(7))
        );
    }

    #[test]
    fn removed_payer_is_no_longer_settled() {
        let mut trip = trip();
        let removed = trip.remove_person(0).unwrap();
        assert_eq!(removed.name, "Alice");
        let expense = &trip.expenses[0];
        assert_eq!(expense.payer, "Alice");
        assert_eq!(expense.consumers, strings(&["Bob"]));
        assert!(expense.items.as_ref().unwrap()[0].consumers.is_empty());

        // Alice still paid, but only roster members are settled
        let settlement = trip.settlement();
        assert_eq!(settlement.total_cost, 90.0);
        assert_eq!(
            settlement.individual_costs,
            vec![IndividualCost {
                person: "Bob".to_string(),
                cost: 60.0
            }]
        );
        assert!(settlement.transactions.is_empty());
    }

    #[test]
    fn expense_lifecycle() {
        let mut trip = trip();
        let mut replacement = trip.expenses[0].clone();
        replacement.id = "ignored".to_string();
        replacement.items = None;
        replacement.amount = 30.0;
        trip.update_expense("e1", replacement).unwrap();
        assert_eq!(trip.expenses[0].id, "e1");
        assert_eq!(trip.settlement().total_cost, 30.0);

        assert_eq!(
            trip.remove_expense("nope"),
            Err(TripError::ExpenseNotFound("nope".to_string()))
        );
        trip.remove_expense("e1").unwrap();
        assert!(trip.expenses.is_empty());
        assert!(trip.settlement().transactions.is_empty());
    }

    #[test]
    fn invalid_expense_is_rejected() {
        let mut trip = trip();
        let mut expense = trip.expenses[0].clone();
        expense.amount = -5.0;
        assert_eq!(
            trip.add_expense(expense),
            Err(TripError::Invalid(ValidationError::InvalidAmount))
        );
        assert_eq!(trip.expenses.len(), 1);
    }
}

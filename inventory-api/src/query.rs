use crate::model::{Condition, InventoryItem};
use serde::Deserialize;

/// One exact-match constraint on an inventory column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Name(String),
    Category(String),
    Quantity(i32),
    Condition(Condition),
    RestockLevel(i32),
}

impl Predicate {
    pub fn column(&self) -> &'static str {
        match self {
            Predicate::Name(_) => "name",
            Predicate::Category(_) => "category",
            Predicate::Quantity(_) => "quantity",
            Predicate::Condition(_) => "condition",
            Predicate::RestockLevel(_) => "restock_level",
        }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        match self {
            Predicate::Name(name) => item.name == *name,
            Predicate::Category(category) => item.category == *category,
            Predicate::Quantity(quantity) => item.quantity == *quantity,
            Predicate::Condition(condition) => item.condition == *condition,
            Predicate::RestockLevel(level) => item.restock_level == *level,
        }
    }
}

/// Conjunction of predicates. No predicates selects every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    predicates: Vec<Predicate>,
}

impl ItemFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(predicate: Predicate) -> Self {
        Self::all().and(predicate)
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        self.predicates.iter().all(|p| p.matches(item))
    }
}

/// Query string of `GET /api/inventory`.
///
/// Empty strings and zero integers count as "not given", so `?quantity=0`
/// does not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchCriteria {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub restock_level: Option<i32>,
    pub condition: Option<Condition>,
}

impl SearchCriteria {
    pub fn to_filter(&self) -> ItemFilter {
        let mut filter = ItemFilter::all();
        if let Some(name) = self.name.as_ref().filter(|v| !v.is_empty()) {
            filter = filter.and(Predicate::Name(name.clone()));
        }
        if let Some(category) = self.category.as_ref().filter(|v| !v.is_empty()) {
            filter = filter.and(Predicate::Category(category.clone()));
        }
        if let Some(quantity) = self.quantity.filter(|v| *v != 0) {
            filter = filter.and(Predicate::Quantity(quantity));
        }
        if let Some(level) = self.restock_level.filter(|v| *v != 0) {
            filter = filter.and(Predicate::RestockLevel(level));
        }
        if let Some(condition) = self.condition {
            filter = filter.and(Predicate::Condition(condition));
        }
        filter
    }
}

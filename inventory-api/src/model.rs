//! Inventory entity: the persisted record, its condition enumeration and
//! payload validation.

use crate::error::{InventoryError, InventoryResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Physical state of an inventory item.
///
/// Ordinals are not contiguous (2 is unused) and match the values the
/// records were historically written with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_condition", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Condition {
    #[default]
    New,
    Opened,
    Used,
}

/// Retired spellings and the variant that replaced them. Rejected on input,
/// listed here so the error can point at the current name.
const LEGACY_CONDITION_NAMES: &[(&str, Condition)] = &[("OPEN", Condition::Opened)];

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::New, Condition::Opened, Condition::Used];

    pub fn name(&self) -> &'static str {
        match self {
            Condition::New => "NEW",
            Condition::Opened => "OPENED",
            Condition::Used => "USED",
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            Condition::New => 0,
            Condition::Opened => 1,
            Condition::Used => 3,
        }
    }

    fn legal_names() -> String {
        Condition::ALL.iter().map(Condition::name).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Condition {
    type Err = InventoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(found) = Condition::ALL.iter().find(|c| c.name() == value) {
            return Ok(*found);
        }
        if let Some((_, current)) = LEGACY_CONDITION_NAMES.iter().find(|(legacy, _)| *legacy == value) {
            return Err(InventoryError::validation(format!(
                "Invalid condition '{value}': renamed to {current}; must be one of {}",
                Condition::legal_names()
            )));
        }
        Err(InventoryError::validation(format!(
            "Invalid condition '{value}': must be one of {}",
            Condition::legal_names()
        )))
    }
}

/// Width of the `name` and `category` columns.
pub const MAX_TEXT_LEN: usize = 63;

/// A row of the `inventory` table. `id` is `None` until the store assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: Option<i32>,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub condition: Condition,
    pub restock_level: i32,
}

impl InventoryItem {
    pub fn new(payload: ItemPayload) -> Self {
        let ItemPayload { name, category, quantity, condition, restock_level } = payload;
        Self { id: None, name, category, quantity, condition, restock_level }
    }

    /// Overwrite every mutable field; `id` is left alone.
    pub fn apply(&mut self, payload: ItemPayload) -> &mut Self {
        self.name = payload.name;
        self.category = payload.category;
        self.quantity = payload.quantity;
        self.condition = payload.condition;
        self.restock_level = payload.restock_level;
        self
    }

    /// The store key, or a validation fault when the record was never persisted.
    pub fn persisted_id(&self) -> InventoryResult<i32> {
        match self.id {
            Some(id) if id != 0 => Ok(id),
            _ => Err(InventoryError::validation("Update called with empty ID field")),
        }
    }
}

/// The mutable fields of an item, validated from an untyped JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPayload {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub condition: Condition,
    pub restock_level: i32,
}

impl ItemPayload {
    /// Validate a request body. Any `id` key is ignored; the caller decides identity.
    pub fn from_json(data: &Value) -> InventoryResult<Self> {
        let fields = data.as_object().ok_or_else(|| {
            InventoryError::validation(format!(
                "Invalid Inventory: body of request contained bad or no data ({})",
                json_type_name(data)
            ))
        })?;
        let name = required_string(fields, "name")?;
        let category = required_string(fields, "category")?;
        let quantity = required_int(fields, "quantity")?;
        let condition = match required(fields, "condition")? {
            Value::String(text) => text.parse::<Condition>()?,
            other => {
                return Err(InventoryError::validation(format!(
                    "Invalid type for string [condition]: {}",
                    json_type_name(other)
                )))
            }
        };
        let restock_level = required_int(fields, "restock_level")?;
        Ok(Self { name, category, quantity, condition, restock_level })
    }
}

impl From<&InventoryItem> for ItemPayload {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            condition: item.condition,
            restock_level: item.restock_level,
        }
    }
}

fn required<'a>(fields: &'a Map<String, Value>, key: &str) -> InventoryResult<&'a Value> {
    fields
        .get(key)
        .ok_or_else(|| InventoryError::validation(format!("Invalid Inventory: missing {key}")))
}

fn required_string(fields: &Map<String, Value>, key: &str) -> InventoryResult<String> {
    match required(fields, key)? {
        Value::String(text) if text.is_empty() => {
            Err(InventoryError::validation(format!("Invalid Inventory: [{key}] must not be empty")))
        }
        Value::String(text) if text.chars().count() > MAX_TEXT_LEN => Err(InventoryError::validation(format!(
            "Invalid Inventory: [{key}] must be at most {MAX_TEXT_LEN} characters"
        ))),
        Value::String(text) => Ok(text.clone()),
        other => Err(InventoryError::validation(format!(
            "Invalid type for string [{key}]: {}",
            json_type_name(other)
        ))),
    }
}

fn required_int(fields: &Map<String, Value>, key: &str) -> InventoryResult<i32> {
    let value = required(fields, key)?;
    let out_of_range =
        || InventoryError::validation(format!("Invalid value for int [{key}]: {value} is out of range"));
    match value.as_i64() {
        Some(wide) => i32::try_from(wide).map_err(|_| out_of_range()),
        None if value.is_u64() => Err(out_of_range()),
        None => Err(InventoryError::validation(format!(
            "Invalid type for int [{key}]: {}",
            json_type_name(value)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

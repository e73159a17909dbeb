//! Deep merge of settings tables.
//!
//! Operates on value trees rather than typed structs, so a key that is absent
//! from the overlay never resets the base.

use super::value::{Table, Value};

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in the overlay replaces what the base holds at that key.
pub fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, incoming) in overlay {
        merge_entry(base, key, incoming);
    }
}

/// Lowercase every table key, recursively, including tables held in arrays.
pub fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Table(table) => Value::Table(lowercase_table(table)),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

pub fn lowercase_table(table: Table) -> Table {
    let mut out = Table::new();
    for (key, value) in table {
        // Keys that only differ by case collapse into one merged entry.
        merge_entry(&mut out, key.to_lowercase(), lowercase_keys(value));
    }
    out
}

fn merge_entry(base: &mut Table, key: String, incoming: Value) {
    match incoming {
        Value::Table(incoming_table) => {
            if let Some(Value::Table(existing)) = base.get_mut(&key) {
                deep_merge(existing, incoming_table);
            } else {
                base.insert(key, Value::Table(incoming_table));
            }
        }
        other => {
            base.insert(key, other);
        }
    }
}

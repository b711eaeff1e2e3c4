//! Menu Domain Models
//!
//! `MenuItem` is the validated value record the rest of the application works
//! with. `MenuRecord` is the loose shape a data source hands back before
//! validation.

use serde::{Deserialize, Serialize};

use crate::error::MalformedRecord;

// =============================================================================
// Menu Domain Models
// =============================================================================

/// A priced entry on the restaurant menu
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    /// Stable identifier assigned by the data source
    pub id: String,

    /// Display name of the dish
    pub name: String,

    /// Unit price, never negative
    pub price: f64,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// A provider record whose required fields may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MenuRecord {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,
}

impl MenuRecord {
    /// Validates the record, rejecting it when the name or a usable price is missing.
    pub fn into_menu_item(self) -> Result<MenuItem, MalformedRecord> {
        let Some(name) = self.name else {
            return Err(MalformedRecord::MissingName { id: self.id });
        };
        let Some(price) = self.price else {
            return Err(MalformedRecord::MissingPrice { id: self.id });
        };
        if !price.is_finite() || price < 0.0 {
            return Err(MalformedRecord::InvalidPrice { id: self.id, price });
        }

        Ok(MenuItem {
            id: self.id,
            name,
            price,
        })
    }
}

/// Converts a batch of records into menu items, logging and skipping the malformed ones.
pub fn collect_menu(records: impl IntoIterator<Item = MenuRecord>) -> Vec<MenuItem> {
    records
        .into_iter()
        .filter_map(|record| match record.into_menu_item() {
            Ok(item) => Some(item),
            Err(reason) => {
                tracing::warn!(%reason, "dropping malformed menu record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: Option<&str>, price: Option<f64>) -> MenuRecord {
        MenuRecord {
            id: id.into(),
            name: name.map(Into::into),
            price,
        }
    }

    #[test]
    fn complete_record_becomes_menu_item() {
        let item = record("1", Some("Burger"), Some(500.0))
            .into_menu_item()
            .unwrap();
        assert_eq!(item, MenuItem::new("1", "Burger", 500.0));
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert_eq!(
            record("1", None, Some(1.0)).into_menu_item(),
            Err(MalformedRecord::MissingName { id: "1".into() })
        );
        assert_eq!(
            record("2", Some("Fries"), None).into_menu_item(),
            Err(MalformedRecord::MissingPrice { id: "2".into() })
        );
    }

    #[test]
    fn negative_price_is_rejected() {
        let err = record("3", Some("Refund"), Some(-5.0))
            .into_menu_item()
            .unwrap_err();
        assert!(matches!(err, MalformedRecord::InvalidPrice { .. }));
    }

    #[test]
    fn collect_menu_keeps_valid_siblings_in_order() {
        let menu = collect_menu(vec![
            record("1", Some("Burger"), Some(500.0)),
            record("2", Some("Shake"), None),
            record("3", Some("Fries"), Some(200.0)),
        ]);

        let ids: Vec<_> = menu.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}

//! Expense and income domain models
//!
//! Both records share the same shape on the wire; they differ only in the
//! resource path they live under (`/Gastos` vs `/Ingresos`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// A money movement: an expense (gasto) or an income (ingreso)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(
        rename = "monto",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Date as sent by the backend (ISO 8601, with or without time)
    #[serde(rename = "fecha", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "categoriaId", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// An expense record (`/Gastos`)
pub type Expense = Movement;

/// An income record (`/Ingresos`)
pub type Income = Movement;

impl Movement {
    pub fn new(amount: Decimal, category_id: i64, date: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            category_id: Some(category_id),
            date: Some(date.into()),
            ..Default::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Day part of `date` (`2024-03-05T00:00:00` -> `2024-03-05`)
    pub fn day(&self) -> Option<&str> {
        self.date
            .as_deref()
            .map(|d| d.split_once('T').map(|(day, _)| day).unwrap_or(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_numeric_amount() {
        let expense: Expense = serde_json::from_value(json!({
            "id": 11,
            "monto": 42.5,
            "descripcion": "Supermercado",
            "fecha": "2024-03-05T00:00:00",
            "categoriaId": 4,
            "categoriaNombre": "Comida"
        }))
        .unwrap();

        assert_eq!(expense.id, Some(11));
        assert_eq!(expense.amount, Some(Decimal::new(425, 1)));
        assert_eq!(expense.day(), Some("2024-03-05"));
        assert_eq!(expense.extra.get("categoriaNombre"), Some(&json!("Comida")));
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let income: Income = serde_json::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(income.amount, None);
        assert_eq!(income.day(), None);
        assert!(income.extra.is_empty());
    }

    #[test]
    fn test_create_body_skips_empty_fields() {
        let expense = Expense::new(Decimal::new(1250, 2), 4, "2024-03-05")
            .with_description("Cine");
        let body = serde_json::to_value(&expense).unwrap();

        assert_eq!(body["monto"], json!(12.5));
        assert_eq!(body["categoriaId"], json!(4));
        assert_eq!(body["descripcion"], json!("Cine"));
        assert!(body.get("id").is_none());
    }
}

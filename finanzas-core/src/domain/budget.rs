//! Budget and per-category limit domain models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::period::Period;

/// A budget for one period (`/Presupuestos`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "monto",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(rename = "categoriaId", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(rename = "anio", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "mes", default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Budget {
    pub fn period(&self) -> Option<Period> {
        Period::new(self.year?, self.month?).ok()
    }
}

/// A spending limit for one category in one period (`/LimitesCategorias`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryLimit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "categoriaId", default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(
        rename = "montoLimite",
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub limit: Option<Decimal>,
    #[serde(rename = "anio", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "mes", default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl CategoryLimit {
    pub fn new(category_id: i64, limit: Decimal, period: Period) -> Self {
        Self {
            category_id: Some(category_id),
            limit: Some(limit),
            year: Some(period.year),
            month: Some(period.month),
            ..Default::default()
        }
    }

    pub fn period(&self) -> Option<Period> {
        Period::new(self.year?, self.month?).ok()
    }
}

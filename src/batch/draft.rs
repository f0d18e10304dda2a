// src/batch/draft.rs

//! Batch drafts: user input for a new delivery batch, its local validation,
//! and loading drafts from TOML files.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::api::wire::CreateBatchRequest;
use crate::batch::model::DeliveryRequest;
use crate::errors::{BatchrouteError, Result};

/// Width of the phone column on the service side.
const MAX_PHONE_LEN: usize = 15;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-(). ]+$").expect("phone pattern compiles"));

/// Unvalidated input for a new delivery batch.
///
/// Mirrors the draft file format:
///
/// ```toml
/// name = "Ruta AM"
/// delivery_date = "2024-05-01"
/// depot_address = "Av. X"
///
/// [[deliveries]]
/// address = "Calle 1"
/// phone = ""
/// ```
///
/// Every field defaults to empty so that a partially filled draft still
/// deserializes and validation can name the missing field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchDraft {
    #[serde(default)]
    pub name: String,

    /// Calendar date, `YYYY-MM-DD`.
    #[serde(default)]
    pub delivery_date: String,

    #[serde(default)]
    pub depot_address: String,

    #[serde(default)]
    pub deliveries: Vec<DeliveryRequest>,
}

impl BatchDraft {
    /// Check every local precondition and shape the creation request.
    ///
    /// Fails on the first offending field, in form order. The draft itself is
    /// left untouched; the returned request carries trimmed copies.
    pub fn validate(&self) -> Result<CreateBatchRequest> {
        let name = required_text("name", &self.name)?;
        let delivery_date = parse_delivery_date(&self.delivery_date)?;
        let depot_address = required_text("depot_address", &self.depot_address)?;

        if self.deliveries.is_empty() {
            return Err(BatchrouteError::validation(
                "deliveries",
                "a batch needs at least one delivery",
            ));
        }

        let deliveries = self
            .deliveries
            .iter()
            .enumerate()
            .map(|(i, d)| validate_delivery(i, d))
            .collect::<Result<Vec<_>>>()?;

        Ok(CreateBatchRequest {
            name,
            delivery_date,
            depot_address,
            deliveries,
        })
    }
}

fn required_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BatchrouteError::validation(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn parse_delivery_date(value: &str) -> Result<NaiveDate> {
    let trimmed = required_text("delivery_date", value)?;
    NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d").map_err(|e| {
        BatchrouteError::validation(
            "delivery_date",
            format!("expected a YYYY-MM-DD date, got {trimmed:?} ({e})"),
        )
    })
}

fn validate_delivery(index: usize, delivery: &DeliveryRequest) -> Result<DeliveryRequest> {
    let address = required_text(&format!("deliveries[{index}].address"), &delivery.address)?;

    let phone = delivery.phone.trim();
    if !phone.is_empty() {
        let field = format!("deliveries[{index}].phone");
        if !PHONE_RE.is_match(phone) {
            return Err(BatchrouteError::validation(
                field,
                format!("{phone:?} contains characters other than digits, spaces and + - ( ) ."),
            ));
        }
        if phone.chars().count() > MAX_PHONE_LEN {
            return Err(BatchrouteError::validation(
                field,
                format!("{phone:?} is longer than {MAX_PHONE_LEN} characters"),
            ));
        }
    }

    Ok(DeliveryRequest {
        address,
        phone: phone.to_string(),
    })
}

/// Load a draft from a TOML file. Only deserializes; call
/// [`BatchDraft::validate`] before submitting.
pub fn load_draft(path: impl AsRef<Path>) -> Result<BatchDraft> {
    let contents = fs::read_to_string(path.as_ref())?;
    let draft: BatchDraft = toml::from_str(&contents)?;
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> BatchDraft {
        BatchDraft {
            name: "Ruta AM".to_string(),
            delivery_date: "2024-05-01".to_string(),
            depot_address: "Av. X".to_string(),
            deliveries: vec![DeliveryRequest::new("Calle 1", "")],
        }
    }

    fn field_of(draft: &BatchDraft) -> String {
        match draft.validate() {
            Err(BatchrouteError::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_draft_shapes_request() {
        let req = valid_draft().validate().unwrap();
        assert_eq!(req.name, "Ruta AM");
        assert_eq!(req.delivery_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(req.depot_address, "Av. X");
        assert_eq!(req.deliveries, vec![DeliveryRequest::new("Calle 1", "")]);
    }

    #[test]
    fn blank_fields_are_named() {
        let mut d = valid_draft();
        d.name = "   ".into();
        assert_eq!(field_of(&d), "name");

        let mut d = valid_draft();
        d.delivery_date.clear();
        assert_eq!(field_of(&d), "delivery_date");

        let mut d = valid_draft();
        d.depot_address.clear();
        assert_eq!(field_of(&d), "depot_address");

        let mut d = valid_draft();
        d.deliveries.clear();
        assert_eq!(field_of(&d), "deliveries");

        let mut d = valid_draft();
        d.deliveries.push(DeliveryRequest::new("", "555"));
        assert_eq!(field_of(&d), "deliveries[1].address");
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let mut d = valid_draft();
        d.delivery_date = "01/05/2024".into();
        assert_eq!(field_of(&d), "delivery_date");
    }

    #[test]
    fn phone_formatting() {
        let mut d = valid_draft();
        d.deliveries[0].phone = "+1 (809) 555-0101".into();
        assert_eq!(field_of(&d), "deliveries[0].phone");

        d.deliveries[0].phone = "809-555-0101".into();
        assert!(d.validate().is_ok());

        d.deliveries[0].phone = "call me".into();
        assert_eq!(field_of(&d), "deliveries[0].phone");
    }

    #[test]
    fn validation_does_not_mutate_draft() {
        let mut d = valid_draft();
        d.name = "  Ruta AM  ".into();
        let before = d.clone();
        let req = d.validate().unwrap();
        assert_eq!(req.name, "Ruta AM");
        assert_eq!(d, before);
    }
}

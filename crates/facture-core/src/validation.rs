//! # Validation Module
//!
//! Draft invoice validation for Facture.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Contract                                │
//! │                                                                         │
//! │  validate_invoice(draft)                                                │
//! │       │                                                                 │
//! │       ├── checks EVERY rule, never stops at the first failure           │
//! │       │                                                                 │
//! │       ├── Ok(())                    when nothing is wrong               │
//! │       │                                                                 │
//! │       └── Err(ValidationErrors)                                         │
//! │             ├── messages: Vec<String>   one human-readable line each    │
//! │             └── field_map              which form fields to highlight   │
//! │                                                                         │
//! │  Validation errors are user-correctable. They are surfaced verbatim     │
//! │  to the UI and are never logged as system failures.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{DateInput, InvoiceDraft};

/// RFC-shaped email check. Intentionally a shape test, not a deliverability
/// guarantee.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^<>()\[\]\\.,;:\s@]+(\.[^<>()\[\]\\.,;:\s@]+)*@([A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
        .expect("email regex compiles")
});

/// Returns whether the string looks like an email address.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

// =============================================================================
// Error Types
// =============================================================================

/// Per-party field flags (payee / payor blocks of the form).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyFieldErrors {
    pub name: bool,
    pub email: bool,
}

/// Per-line-item field flags, keyed by the item's candidate product UUID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFieldErrors {
    pub name: bool,
    pub quantity: bool,
    pub unit_price: bool,
}

/// Which form fields are in error, for UI highlighting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorMap {
    pub payee: PartyFieldErrors,
    pub payor: PartyFieldErrors,
    pub items: HashMap<String, ItemFieldErrors>,
    pub date_issued: bool,
    pub date_due: bool,
    pub discount: bool,
    pub tax_percent: bool,
    pub shipping: bool,
}

/// The full validation result: one message per violated rule plus a
/// field-keyed map. Collected exhaustively in a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub messages: Vec<String>,
    pub field_map: FieldErrorMap,
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_items(draft: &InvoiceDraft, errors: &mut ValidationErrors) {
    let ValidationErrors {
        messages,
        field_map,
    } = errors;

    for (i, item) in draft.items.iter().enumerate() {
        let flags = field_map.items.entry(item.resource_uuid.clone()).or_default();

        let item_number = i + 1;
        if item.name.is_empty() {
            messages.push(format!("Item {item_number} is missing an Item name."));
            flags.name = true;
        }

        match item.quantity {
            None => {
                messages.push(format!("Item {item_number} is missing a Quantity."));
                flags.quantity = true;
            }
            Some(quantity) if quantity <= Decimal::ZERO => {
                messages.push(format!(
                    "Item {item_number} has Quantity less than or equal to 0. \
                     Please include a positive quantity."
                ));
                flags.quantity = true;
            }
            Some(_) => {}
        }

        match item.unit_price {
            None => {
                messages.push(format!("Item {item_number} is missing a Price."));
                flags.unit_price = true;
            }
            Some(price) if price < Decimal::ZERO => {
                messages.push(format!(
                    "Item {item_number} has Price less than 0. \
                     Please include a price greater than or equal to 0."
                ));
                flags.unit_price = true;
            }
            Some(_) => {}
        }
    }
}

/// Validates a draft against all business rules in one pass.
///
/// Re-running on the same draft yields the same error set (no state).
pub fn validate_invoice(draft: &InvoiceDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if draft.payee.name.is_empty() {
        errors
            .messages
            .push("Your name is missing. Please include your name.".to_string());
        errors.field_map.payee.name = true;
    }

    if draft.payor.name.is_empty() {
        errors
            .messages
            .push("BILL TO name is missing. Please include a name to bill.".to_string());
        errors.field_map.payor.name = true;
    }

    if let Some(email) = &draft.payor.email {
        if !email.is_empty() && !is_valid_email(email) {
            errors
                .messages
                .push("BILL TO email is invalid. Please enter a valid email address.".to_string());
            errors.field_map.payor.email = true;
        }
    }

    if !draft.date_issued.is_valid() {
        errors.messages.push(
            "Invalid date issued. Please make sure the date is valid and has format YYYY-MM-DD."
                .to_string(),
        );
        errors.field_map.date_issued = true;
    }

    if draft.date_due == DateInput::Invalid {
        errors.messages.push(
            "Invalid date due. Please make sure the date is valid and has format YYYY-MM-DD."
                .to_string(),
        );
        errors.field_map.date_due = true;
    }

    validate_items(draft, &mut errors);

    if matches!(draft.discount, Some(d) if d < Decimal::ZERO) {
        errors.messages.push(
            "Discount provided is less than 0. \
             Please include a discount greater than or equal to 0."
                .to_string(),
        );
        errors.field_map.discount = true;
    }

    if matches!(draft.tax_percent, Some(t) if t < Decimal::ZERO) {
        errors.messages.push(
            "Tax provided is less than 0. Please include a tax greater than or equal to 0."
                .to_string(),
        );
        errors.field_map.tax_percent = true;
    }

    if matches!(draft.shipping, Some(s) if s < Decimal::ZERO) {
        errors.messages.push(
            "Shipping cost provided is less than 0. \
             Please include a shipping cost greater than or equal to 0."
                .to_string(),
        );
        errors.field_map.shipping = true;
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountIdentity, DraftLineItem, InvoiceDraft};
    use chrono::Utc;
    use std::str::FromStr;

    fn valid_draft() -> InvoiceDraft {
        let account = AccountIdentity {
            user_id: "user-1".to_string(),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        let mut draft = InvoiceDraft::new(&account, None, Utc::now());
        draft.payor.name = "Acme Corp".to_string();
        draft.payor.email = Some("billing@acme.example".to_string());
        draft.items[0].name = "Consulting".to_string();
        draft
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validate_invoice(&valid_draft()).is_ok());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.domain.example"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("trailing@dot."));
    }

    #[test]
    fn test_every_rule_collected_in_one_pass() {
        let mut draft = valid_draft();
        draft.payee.name = String::new();
        draft.payor.name = String::new();
        draft.payor.email = Some("not-an-email".to_string());
        draft.date_issued = DateInput::Invalid;
        draft.date_due = DateInput::Invalid;
        draft.items[0].name = String::new();
        draft.items[0].quantity = Some(Decimal::ZERO);
        draft.items[0].unit_price = Some(Decimal::from_str("-1").unwrap());
        draft.discount = Some(Decimal::from_str("-1").unwrap());
        draft.tax_percent = Some(Decimal::from_str("-1").unwrap());
        draft.shipping = Some(Decimal::from_str("-1").unwrap());

        let errors = validate_invoice(&draft).unwrap_err();
        // payee name, payor name, payor email, date issued, date due,
        // item name, item quantity, item price, discount, tax, shipping
        assert_eq!(errors.messages.len(), 11);
        assert!(errors.field_map.payee.name);
        assert!(errors.field_map.payor.name);
        assert!(errors.field_map.payor.email);
        assert!(errors.field_map.date_issued);
        assert!(errors.field_map.date_due);
        assert!(errors.field_map.discount);
        assert!(errors.field_map.tax_percent);
        assert!(errors.field_map.shipping);

        let item_flags = &errors.field_map.items[&draft.items[0].resource_uuid];
        assert!(item_flags.name);
        assert!(item_flags.quantity);
        assert!(item_flags.unit_price);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut draft = valid_draft();
        draft.payor.name = String::new();

        let first = validate_invoice(&draft).unwrap_err();
        let second = validate_invoice(&draft).unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_due_date_is_fine() {
        let mut draft = valid_draft();
        draft.date_due = DateInput::Missing;
        assert!(validate_invoice(&draft).is_ok());
    }

    #[test]
    fn test_missing_quantity_vs_non_positive() {
        let mut draft = valid_draft();
        draft.items.push(DraftLineItem {
            quantity: None,
            ..draft.items[0].clone()
        });

        let errors = validate_invoice(&draft).unwrap_err();
        assert_eq!(errors.messages.len(), 1);
        assert!(errors.messages[0].contains("missing a Quantity"));
    }

    #[test]
    fn test_empty_payor_email_not_flagged() {
        let mut draft = valid_draft();
        draft.payor.email = Some(String::new());
        assert!(validate_invoice(&draft).is_ok());
    }
}

//! The invoice record and the advisory schema sent to the model.
//!
//! The schema here is a *prompt*, not a contract: it is serialised into the
//! instruction text so the model knows which fields to look for, but the
//! extracted record is never validated against it. Models omit fields, add
//! fields, and mistype values; the pipeline keeps whatever JSON comes back.
//!
//! [`InvoiceRecord`] is a best-effort typed view over that JSON for callers
//! who want field access without `Value` plumbing. Every field is optional
//! and unknown keys are retained, so deserialising never rejects a record.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Advisory schema: field name → human-readable description.
///
/// Embedded verbatim in the extraction prompt. The descriptions tell the
/// model what each field means; the nesting tells it the expected shape.
pub static INVOICE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "invoice_number": "The unique identifier for this invoice",
        "invoice_date": "The date when the invoice was issued (YYYY-MM-DD format)",
        "due_date": "The date when payment is due (YYYY-MM-DD format)",
        "vendor": {
            "name": "The name of the vendor/supplier",
            "address": "The full address of the vendor",
            "phone": "The phone number of the vendor",
            "email": "The email address of the vendor",
            "tax_id": "The tax ID or business registration number of the vendor"
        },
        "customer": {
            "name": "The name of the customer/client",
            "address": "The full address of the customer",
            "phone": "The phone number of the customer",
            "email": "The email address of the customer"
        },
        "items": [
            {
                "description": "Description of the product or service",
                "quantity": "The quantity of the item",
                "unit_price": "The price per unit",
                "total_price": "The total price for this item (quantity × unit_price)"
            }
        ],
        "subtotal": "The sum of all item totals before tax and discounts",
        "tax": "The tax amount",
        "discount": "Any discount applied",
        "shipping": "Shipping or delivery charges",
        "total_amount": "The final total amount to be paid",
        "payment_terms": "The terms of payment",
        "payment_method": "The method of payment",
        "notes": "Any additional notes or comments on the invoice"
    })
});

/// A party on the invoice — vendor or customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Tax ID / business registration number. Vendors only in practice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Keys the model returned that the schema did not ask for.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One line item on the invoice.
///
/// Amounts stay as `Value`: models sometimes return `"12.50"` (string),
/// sometimes `12.5` (number). Coercing here would be validation, which the
/// pipeline deliberately does not do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Best-effort typed view of an extracted invoice.
///
/// Deserialise with [`InvoiceRecord::from_value`]; it only fails if the
/// input is not a JSON object at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Party>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Party>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvoiceRecord {
    /// Build a typed view from the raw extracted JSON.
    ///
    /// Returns `None` when `value` is not an object; any object succeeds,
    /// however sparse or malformed its fields.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

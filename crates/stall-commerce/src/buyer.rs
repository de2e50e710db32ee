//! Buyer details collected during checkout, and their validation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CommerceError;
use crate::events::ShopEvent;
use crate::ShopBus;

/// Payment method value for online card payment.
pub const PAYMENT_CARD: &str = "card";
/// Payment method value for cash on delivery.
pub const PAYMENT_CASH: &str = "cash";

/// One of the four checkout fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyerField {
    Payment,
    Email,
    Phone,
    Address,
}

/// Which form owns a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    /// Payment method and address.
    Order,
    /// Email and phone.
    Contacts,
}

impl BuyerField {
    /// Every field, in display order.
    pub const ALL: [BuyerField; 4] = [
        BuyerField::Payment,
        BuyerField::Email,
        BuyerField::Phone,
        BuyerField::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuyerField::Payment => "payment",
            BuyerField::Email => "email",
            BuyerField::Phone => "phone",
            BuyerField::Address => "address",
        }
    }

    /// Form that owns this field.
    pub fn group(&self) -> FieldGroup {
        match self {
            BuyerField::Payment | BuyerField::Address => FieldGroup::Order,
            BuyerField::Email | BuyerField::Phone => FieldGroup::Contacts,
        }
    }

    /// Message shown when the field is empty.
    pub fn required_message(&self) -> &'static str {
        match self {
            BuyerField::Payment => "payment method not selected",
            BuyerField::Email => "email required",
            BuyerField::Phone => "phone required",
            BuyerField::Address => "address required",
        }
    }
}

impl FieldGroup {
    /// Fields owned by this group, in display order.
    pub fn fields(&self) -> [BuyerField; 2] {
        match self {
            FieldGroup::Order => [BuyerField::Payment, BuyerField::Address],
            FieldGroup::Contacts => [BuyerField::Email, BuyerField::Phone],
        }
    }
}

impl fmt::Display for BuyerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuyerField {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payment" => Ok(BuyerField::Payment),
            "email" => Ok(BuyerField::Email),
            "phone" => Ok(BuyerField::Phone),
            "address" => Ok(BuyerField::Address),
            other => Err(CommerceError::UnknownField(other.to_string())),
        }
    }
}

/// Current checkout form values. Empty string means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuyerState {
    pub payment: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl BuyerState {
    /// Value of one field.
    pub fn get(&self, field: BuyerField) -> &str {
        match field {
            BuyerField::Payment => &self.payment,
            BuyerField::Email => &self.email,
            BuyerField::Phone => &self.phone,
            BuyerField::Address => &self.address,
        }
    }

    fn slot_mut(&mut self, field: BuyerField) -> &mut String {
        match field {
            BuyerField::Payment => &mut self.payment,
            BuyerField::Email => &mut self.email,
            BuyerField::Phone => &mut self.phone,
            BuyerField::Address => &mut self.address,
        }
    }
}

/// A subset of buyer fields to update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl BuyerPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch touching a single field.
    pub fn field(field: BuyerField, value: impl Into<String>) -> Self {
        Self::new().set(field, value)
    }

    /// Set one field in the patch.
    pub fn set(mut self, field: BuyerField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            BuyerField::Payment => self.payment = value,
            BuyerField::Email => self.email = value,
            BuyerField::Phone => self.phone = value,
            BuyerField::Address => self.address = value,
        }
        self
    }

    pub fn payment(self, value: impl Into<String>) -> Self {
        self.set(BuyerField::Payment, value)
    }

    pub fn email(self, value: impl Into<String>) -> Self {
        self.set(BuyerField::Email, value)
    }

    pub fn phone(self, value: impl Into<String>) -> Self {
        self.set(BuyerField::Phone, value)
    }

    pub fn address(self, value: impl Into<String>) -> Self {
        self.set(BuyerField::Address, value)
    }

    /// Value this patch carries for a field.
    pub fn get(&self, field: BuyerField) -> Option<&str> {
        match field {
            BuyerField::Payment => self.payment.as_deref(),
            BuyerField::Email => self.email.as_deref(),
            BuyerField::Phone => self.phone.as_deref(),
            BuyerField::Address => self.address.as_deref(),
        }
    }

    /// Check if the patch touches no field.
    pub fn is_empty(&self) -> bool {
        BuyerField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// Per-field error messages. A field missing from the map is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<BuyerField, &'static str>,
}

impl ValidationErrors {
    /// Message for a field, if it is invalid.
    pub fn get(&self, field: BuyerField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// Check if every field is valid.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of invalid fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Invalid fields with their messages, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (BuyerField, &'static str)> + '_ {
        self.errors.iter().map(|(f, m)| (*f, *m))
    }

    /// Messages for the fields a form owns, in display order.
    pub fn messages_for(&self, group: FieldGroup) -> Vec<&'static str> {
        group.fields().iter().filter_map(|f| self.get(*f)).collect()
    }

    /// Check if every field a form owns is valid.
    pub fn group_ready(&self, group: FieldGroup) -> bool {
        group.fields().iter().all(|f| self.get(*f).is_none())
    }

    /// No payment or address errors.
    pub fn order_ready(&self) -> bool {
        self.group_ready(FieldGroup::Order)
    }

    /// No email or phone errors.
    pub fn contacts_ready(&self) -> bool {
        self.group_ready(FieldGroup::Contacts)
    }

    /// Both forms are valid.
    pub fn submit_ready(&self) -> bool {
        self.order_ready() && self.contacts_ready()
    }
}

/// Validate buyer details. Only emptiness is checked.
pub fn validate(state: &BuyerState) -> ValidationErrors {
    let errors = BuyerField::ALL
        .into_iter()
        .filter(|f| state.get(*f).is_empty())
        .map(|f| (f, f.required_message()))
        .collect();
    ValidationErrors { errors }
}

/// Holds the in-progress checkout fields.
pub struct BuyerModel {
    state: RefCell<BuyerState>,
    bus: ShopBus,
}

impl BuyerModel {
    /// Create a model with every field empty.
    pub fn new(bus: ShopBus) -> Self {
        Self {
            state: RefCell::new(BuyerState::default()),
            bus,
        }
    }

    /// Apply a patch.
    ///
    /// Emits a single `buyer:changed` if at least one field actually changed,
    /// nothing otherwise. Returns whether anything changed.
    pub fn set_fields(&self, patch: BuyerPatch) -> bool {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let mut changed = false;
            for field in BuyerField::ALL {
                let Some(value) = patch.get(field) else {
                    continue;
                };
                let slot = state.slot_mut(field);
                if slot != value {
                    *slot = value.to_string();
                    changed = true;
                }
            }
            if !changed {
                return false;
            }
            state.clone()
        };

        debug!(
            payment = %snapshot.payment,
            email_set = !snapshot.email.is_empty(),
            phone_set = !snapshot.phone.is_empty(),
            address_set = !snapshot.address.is_empty(),
            "buyer fields updated"
        );
        self.bus.emit(ShopEvent::BuyerChanged(snapshot));
        true
    }

    /// Reset every field to empty. Always emits `buyer:changed`.
    pub fn clear(&self) {
        *self.state.borrow_mut() = BuyerState::default();
        debug!("buyer fields cleared");
        self.bus.emit(ShopEvent::BuyerChanged(BuyerState::default()));
    }

    /// Snapshot of the current fields.
    pub fn state(&self) -> BuyerState {
        self.state.borrow().clone()
    }

    /// Validate the current fields.
    pub fn validate(&self) -> ValidationErrors {
        validate(&self.state.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ShopEventKind;
    use stall_bus::testing::EventRecorder;

    fn complete_patch() -> BuyerPatch {
        BuyerPatch::new()
            .payment(PAYMENT_CASH)
            .email("x@y.com")
            .phone("123")
            .address("addr")
    }

    #[test]
    fn test_cleared_buyer_has_all_errors() {
        let buyer = BuyerModel::new(ShopBus::new());
        buyer.set_fields(complete_patch());
        buyer.clear();

        let errors = buyer.validate();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(BuyerField::Payment), Some("payment method not selected"));
        assert_eq!(errors.get(BuyerField::Email), Some("email required"));
        assert_eq!(errors.get(BuyerField::Phone), Some("phone required"));
        assert_eq!(errors.get(BuyerField::Address), Some("address required"));
    }

    #[test]
    fn test_complete_buyer_is_valid() {
        let buyer = BuyerModel::new(ShopBus::new());
        buyer.set_fields(complete_patch());

        let errors = buyer.validate();
        assert!(errors.is_empty());
        assert!(errors.submit_ready());
    }

    #[test]
    fn test_unchanged_value_does_not_emit() {
        let bus = ShopBus::new();
        let recorder = EventRecorder::attach(&bus);
        let buyer = BuyerModel::new(bus.clone());

        assert!(buyer.set_fields(BuyerPatch::new().payment(PAYMENT_CARD)));
        assert!(!buyer.set_fields(BuyerPatch::new().payment(PAYMENT_CARD)));

        assert_eq!(recorder.count(ShopEventKind::BuyerChanged), 1);
    }

    #[test]
    fn test_batch_emits_once_with_full_state() {
        let bus = ShopBus::new();
        let recorder = EventRecorder::attach(&bus);
        let buyer = BuyerModel::new(bus.clone());

        buyer.set_fields(complete_patch());

        assert_eq!(
            recorder.events(),
            vec![ShopEvent::BuyerChanged(BuyerState {
                payment: "cash".to_string(),
                email: "x@y.com".to_string(),
                phone: "123".to_string(),
                address: "addr".to_string(),
            })]
        );
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let buyer = BuyerModel::new(ShopBus::new());
        buyer.set_fields(complete_patch());
        buyer.set_fields(BuyerPatch::field(BuyerField::Phone, "456"));

        let state = buyer.state();
        assert_eq!(state.phone, "456");
        assert_eq!(state.email, "x@y.com");
        assert_eq!(state.address, "addr");
        assert_eq!(state.payment, "cash");
    }

    #[test]
    fn test_clear_emits_even_when_empty() {
        let bus = ShopBus::new();
        let recorder = EventRecorder::attach(&bus);
        let buyer = BuyerModel::new(bus.clone());

        buyer.clear();
        buyer.clear();

        assert_eq!(recorder.count(ShopEventKind::BuyerChanged), 2);
    }

    #[test]
    fn test_group_readiness() {
        let state = BuyerState {
            payment: PAYMENT_CARD.to_string(),
            address: "Main st. 1".to_string(),
            ..BuyerState::default()
        };
        let errors = validate(&state);

        assert!(errors.order_ready());
        assert!(!errors.contacts_ready());
        assert!(!errors.submit_ready());
        assert_eq!(
            errors.messages_for(FieldGroup::Contacts),
            vec!["email required", "phone required"]
        );
        assert!(errors.messages_for(FieldGroup::Order).is_empty());
    }

    #[test]
    fn test_no_format_validation() {
        let state = BuyerState {
            payment: "barter".to_string(),
            email: "not-an-email".to_string(),
            phone: "x".to_string(),
            address: "?".to_string(),
        };
        assert!(validate(&state).is_empty());
    }

    #[test]
    fn test_field_parsing() {
        assert_eq!("email".parse::<BuyerField>(), Ok(BuyerField::Email));
        assert_eq!(" Address ".parse::<BuyerField>(), Ok(BuyerField::Address));
        assert_eq!(
            "zip".parse::<BuyerField>(),
            Err(CommerceError::UnknownField("zip".to_string()))
        );
        assert_eq!(BuyerField::Payment.group(), FieldGroup::Order);
        assert_eq!(BuyerField::Phone.group(), FieldGroup::Contacts);
    }
}

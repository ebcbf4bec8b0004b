//! Form normalization and validation.
//!
//! Every upsert form is trimmed and canonicalized first (blank optionals
//! become `None`, parseable dates are rewritten as `YYYY-MM-DD`), then checked
//! field by field. All failures are collected before anything is written.

use chrono::NaiveDate;
use shared::{
    BlockForm, ComplaintForm, ExpenseForm, ManagerForm, PaymentForm, PropertyForm, TenantForm, UnitForm,
    DATE_FORMAT,
};

use super::errors::ValidationErrors;

/// An upsert payload for one entity
pub trait EntityForm {
    type Id;

    /// Primary key when editing an existing row
    fn id(&self) -> Option<Self::Id>;

    fn normalize(&mut self);

    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}

fn canonical_date(value: &mut String) {
    trim(value);
    if let Some(date) = parse_date(value) {
        *value = date.format(DATE_FORMAT).to_string();
    }
}

fn canonical_optional_date(value: &mut Option<String>) {
    trim_optional(value);
    if let Some(v) = value.as_mut() {
        canonical_date(v);
    }
}

/// Collects field errors for one form
#[derive(Debug, Default)]
struct FieldValidator {
    errors: ValidationErrors,
}

impl FieldValidator {
    fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors.add(field, "is required");
        }
    }

    fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        if value.trim().is_empty() {
            self.errors.add(field, "is required");
            return None;
        }
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.errors.add(field, "must be a valid date (YYYY-MM-DD)");
        }
        parsed
    }

    fn optional_date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        value.and_then(|v| self.date(field, v))
    }

    fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(email) = value {
            if !is_valid_email(email) {
                self.errors.add(field, "must be a valid email address");
            }
        }
    }

    fn positive_id(&mut self, field: &str, value: i64) {
        if value <= 0 {
            self.errors.add(field, "must be selected");
        }
    }

    fn optional_positive_id(&mut self, field: &str, value: Option<i64>) {
        if let Some(id) = value {
            self.positive_id(field, id);
        }
    }

    fn non_negative_count(&mut self, field: &str, value: i64) {
        if value < 0 {
            self.errors.add(field, "cannot be negative");
        }
    }

    fn non_negative_amount(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.errors.add(field, "must be zero or more");
        }
    }

    fn positive_amount(&mut self, field: &str, value: f64) {
        if !value.is_finite() || value <= 0.0 {
            self.errors.add(field, "must be greater than zero");
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl EntityForm for ManagerForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.manager_id
    }

    fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.phone);
        trim_optional(&mut self.email);
        canonical_date(&mut self.hire_date);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.required("name", &self.name);
        v.required("phone", &self.phone);
        v.date("hire_date", &self.hire_date);
        v.email("email", self.email.as_deref());
        v.finish()
    }
}

impl EntityForm for PropertyForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.property_id
    }

    fn normalize(&mut self) {
        trim(&mut self.name);
        trim(&mut self.address);
        trim(&mut self.property_type);
        trim(&mut self.status);
        canonical_optional_date(&mut self.last_inspection);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.required("name", &self.name);
        v.required("address", &self.address);
        v.required("property_type", &self.property_type);
        v.required("status", &self.status);
        v.non_negative_count("total_units", self.total_units);
        v.optional_date("last_inspection", self.last_inspection.as_deref());
        v.positive_id("manager_id", self.manager_id);
        v.finish()
    }
}

impl EntityForm for BlockForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.block_id
    }

    fn normalize(&mut self) {
        trim(&mut self.block_name);
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.required("block_name", &self.block_name);
        v.positive_id("property_id", self.property_id);
        if let Some(floors) = self.floor_count {
            v.non_negative_count("floor_count", floors);
        }
        v.finish()
    }
}

impl EntityForm for UnitForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.unit_id
    }

    fn normalize(&mut self) {
        trim(&mut self.unit_number);
        trim(&mut self.unit_status);
        trim(&mut self.unit_type);
        trim_optional(&mut self.notes);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.required("unit_number", &self.unit_number);
        v.required("unit_status", &self.unit_status);
        v.required("unit_type", &self.unit_type);
        v.positive_id("property_id", self.property_id);
        v.optional_positive_id("block_id", self.block_id);
        v.non_negative_count("bedroom_count", self.bedroom_count);
        v.non_negative_count("bathroom_count", self.bathroom_count);
        v.non_negative_amount("monthly_rent", self.monthly_rent);
        v.non_negative_amount("security_deposit", self.security_deposit);
        v.finish()
    }
}

impl EntityForm for TenantForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.tenant_id
    }

    fn normalize(&mut self) {
        trim(&mut self.full_name);
        trim_optional(&mut self.phone_number);
        trim_optional(&mut self.email);
        trim_optional(&mut self.id_number);
        canonical_date(&mut self.lease_start_date);
        canonical_optional_date(&mut self.lease_end_date);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.required("full_name", &self.full_name);
        let start = v.date("lease_start_date", &self.lease_start_date);
        let end = v.optional_date("lease_end_date", self.lease_end_date.as_deref());
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                v.errors.add("lease_end_date", "cannot be before the lease start date");
            }
        }
        v.non_negative_amount("rent_amount", self.rent_amount);
        v.non_negative_amount("deposit_amount", self.deposit_amount);
        v.optional_positive_id("unit_id", self.unit_id);
        v.email("email", self.email.as_deref());
        v.finish()
    }
}

impl EntityForm for PaymentForm {
    type Id = String;

    fn id(&self) -> Option<String> {
        self.payment_id.clone()
    }

    fn normalize(&mut self) {
        trim_optional(&mut self.payment_id);
        canonical_date(&mut self.payment_date);
        canonical_date(&mut self.due_date);
        trim_optional(&mut self.receipt_number);
        trim_optional(&mut self.transaction_reference);
        trim_optional(&mut self.remarks);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.positive_id("tenant_id", self.tenant_id);
        v.positive_id("unit_id", self.unit_id);
        v.positive_id("property_id", self.property_id);
        v.positive_amount("amount_paid", self.amount_paid);
        v.date("payment_date", &self.payment_date);
        v.date("due_date", &self.due_date);
        v.finish()
    }
}

impl EntityForm for ComplaintForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.complaint_id
    }

    fn normalize(&mut self) {
        trim(&mut self.description);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.positive_id("unit_id", self.unit_id);
        v.optional_positive_id("tenant_id", self.tenant_id);
        v.required("description", &self.description);
        v.finish()
    }
}

impl EntityForm for ExpenseForm {
    type Id = i64;

    fn id(&self) -> Option<i64> {
        self.expense_id
    }

    fn normalize(&mut self) {
        trim(&mut self.category);
        trim_optional(&mut self.description);
        canonical_date(&mut self.expense_date);
        trim(&mut self.payment_method);
        trim(&mut self.vendor);
        trim_optional(&mut self.invoice_number);
        trim_optional(&mut self.paid_by);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = FieldValidator::default();
        v.positive_amount("amount", self.amount);
        v.required("category", &self.category);
        v.required("payment_method", &self.payment_method);
        v.required("vendor", &self.vendor);
        v.date("expense_date", &self.expense_date);
        v.optional_positive_id("unit_id", self.unit_id);
        v.optional_positive_id("block_id", self.block_id);
        v.optional_positive_id("property_id", self.property_id);
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rule() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("j.doe@mail.example.co.ke"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane@@example.com"));
        assert!(!is_valid_email("jane@.com"));
        assert!(!is_valid_email("jane@example."));
    }

    #[test]
    fn test_manager_requires_name_phone_and_hire_date() {
        let mut form = ManagerForm {
            manager_id: None,
            name: "  ".to_string(),
            email: Some("not-an-email".to_string()),
            phone: String::new(),
            hire_date: "2024-02-30".to_string(),
        };
        form.normalize();
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.message_for("name"), Some("is required"));
        assert_eq!(errors.message_for("phone"), Some("is required"));
        assert_eq!(errors.message_for("hire_date"), Some("must be a valid date (YYYY-MM-DD)"));
        assert_eq!(errors.message_for("email"), Some("must be a valid email address"));
    }

    #[test]
    fn test_normalize_trims_and_canonicalizes() {
        let mut form = ManagerForm {
            manager_id: None,
            name: "  Jane Doe ".to_string(),
            email: Some("   ".to_string()),
            phone: " 0711 ".to_string(),
            hire_date: " 2024-2-1 ".to_string(),
        };
        form.normalize();

        assert_eq!(form.name, "Jane Doe");
        assert_eq!(form.email, None);
        assert_eq!(form.phone, "0711");
        assert_eq!(form.hire_date, "2024-02-01");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_tenant_lease_end_before_start() {
        let mut form = TenantForm {
            full_name: "Tom".to_string(),
            lease_start_date: "2025-05-01".to_string(),
            lease_end_date: Some("2025-04-30".to_string()),
            ..Default::default()
        };
        form.normalize();
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.message_for("lease_end_date"),
            Some("cannot be before the lease start date")
        );
    }

    #[test]
    fn test_payment_rules() {
        let mut form = PaymentForm {
            payment_id: Some("   ".to_string()),
            tenant_id: 1,
            unit_id: 0,
            property_id: 1,
            amount_paid: 0.0,
            payment_date: "2025-03-01".to_string(),
            due_date: "March".to_string(),
            ..Default::default()
        };
        form.normalize();
        assert_eq!(form.id(), None);

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.message_for("unit_id"), Some("must be selected"));
        assert_eq!(errors.message_for("amount_paid"), Some("must be greater than zero"));
        assert!(errors.message_for("due_date").is_some());
        assert!(errors.message_for("payment_date").is_none());
    }

    #[test]
    fn test_unit_and_expense_rules() {
        let unit = UnitForm {
            unit_number: "A1".to_string(),
            unit_status: "Vacant".to_string(),
            unit_type: "Studio".to_string(),
            property_id: 1,
            bedroom_count: -1,
            monthly_rent: -5.0,
            ..Default::default()
        };
        let errors = unit.validate().unwrap_err();
        assert_eq!(errors.errors.len(), 2);

        let expense = ExpenseForm {
            amount: 10.0,
            category: "Repairs".to_string(),
            expense_date: "2025-01-01".to_string(),
            payment_method: "Cash".to_string(),
            vendor: String::new(),
            ..Default::default()
        };
        assert_eq!(expense.validate().unwrap_err().message_for("vendor"), Some("is required"));
    }
}

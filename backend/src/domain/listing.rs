//! List engine shared by every entity screen: equality filters, then a
//! case-insensitive substring search, then sort, then pagination.

use log::warn;
use shared::{
    Block, Complaint, Expense, ListPage, ListQuery, Manager, Payment, Property, SortDirection, Tenant, Unit,
};
use std::cmp::Ordering;

pub const PAGE_SIZE: usize = 10;

/// A value a list can be sorted by
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Missing,
}

impl From<&str> for SortValue {
    fn from(value: &str) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<String> for SortValue {
    fn from(value: String) -> Self {
        SortValue::Text(value)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        SortValue::Number(value as f64)
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        SortValue::Number(value)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SortValue::Missing)
    }
}

impl SortValue {
    /// Ascending order with missing values last
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
            (SortValue::Missing, _) => Ordering::Greater,
            (_, SortValue::Missing) => Ordering::Less,
            (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortValue::Text(a), SortValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// A record that can be listed, searched, filtered, sorted and exported
pub trait TableRow {
    const DEFAULT_SORT: &'static str;
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Asc;
    /// Whether a list without an explicit page is still paginated
    const PAGINATE_BY_DEFAULT: bool = false;

    /// Values matched by the free-text search
    fn search_fields(&self) -> Vec<Option<&str>>;

    /// Value compared by an equality filter; `None` for unknown fields and
    /// missing values
    fn filter_value(&self, field: &str) -> Option<String>;

    fn filter_fields() -> &'static [&'static str];

    /// `Missing` for unknown keys as well as absent values
    fn sort_value(&self, key: &str) -> SortValue;

    fn sort_keys() -> &'static [&'static str];

    fn csv_headers() -> &'static [&'static str];

    fn csv_record(&self) -> Vec<String>;
}

fn is_active_filter(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case("all")
}

/// Apply filters, search and sort; no pagination
pub fn filter_and_sort<T: TableRow>(rows: Vec<T>, query: &ListQuery) -> Vec<T> {
    let filters: Vec<(&str, String)> = query
        .filters
        .iter()
        .filter(|(_, value)| is_active_filter(value))
        .filter_map(|(field, value)| {
            if T::filter_fields().contains(&field.as_str()) {
                Some((field.as_str(), value.trim().to_lowercase()))
            } else {
                warn!("Ignoring unknown filter field '{}'", field);
                None
            }
        })
        .collect();

    let needle = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut rows: Vec<T> = rows
        .into_iter()
        .filter(|row| {
            filters.iter().all(|(field, expected)| {
                row.filter_value(field)
                    .map(|actual| actual.trim().to_lowercase() == *expected)
                    .unwrap_or(false)
            })
        })
        .filter(|row| match &needle {
            Some(needle) => row
                .search_fields()
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            None => true,
        })
        .collect();

    let (key, direction) = match query.sort.as_deref() {
        Some(key) if T::sort_keys().contains(&key) => (key, query.direction),
        Some(key) => {
            warn!("Unknown sort key '{}', using '{}'", key, T::DEFAULT_SORT);
            (T::DEFAULT_SORT, T::DEFAULT_DIRECTION)
        }
        None => (T::DEFAULT_SORT, T::DEFAULT_DIRECTION),
    };

    rows.sort_by(|a, b| {
        let (a, b) = (a.sort_value(key), b.sort_value(key));
        match (&a, &b) {
            // Missing values stay at the end in both directions
            (SortValue::Missing, _) | (_, SortValue::Missing) => a.compare(&b),
            _ => match direction {
                SortDirection::Asc => a.compare(&b),
                SortDirection::Desc => b.compare(&a),
            },
        }
    });

    rows
}

/// Slice a filtered list into the requested 1-based page
pub fn paginate<T>(rows: Vec<T>, page: Option<usize>) -> ListPage<T> {
    let total = rows.len();
    let total_pages = total.div_ceil(PAGE_SIZE);

    let items = match page {
        Some(page) => {
            let start = page.saturating_sub(1).saturating_mul(PAGE_SIZE);
            rows.into_iter().skip(start).take(PAGE_SIZE).collect()
        }
        None => rows,
    };

    ListPage {
        items,
        total,
        page: page.map(|p| p.max(1)),
        page_size: PAGE_SIZE,
        total_pages,
    }
}

/// Full list pipeline for one entity
pub fn apply_query<T: TableRow>(rows: Vec<T>, query: &ListQuery) -> ListPage<T> {
    let page = match query.page {
        Some(page) => Some(page),
        None if T::PAGINATE_BY_DEFAULT => Some(1),
        None => None,
    };
    paginate(filter_and_sort(rows, query), page)
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl TableRow for Manager {
    const DEFAULT_SORT: &'static str = "name";

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(self.name.as_str()), self.email.as_deref(), Some(self.phone.as_str())]
    }

    fn filter_value(&self, _field: &str) -> Option<String> {
        None
    }

    fn filter_fields() -> &'static [&'static str] {
        &[]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "manager_id" => self.manager_id.into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.clone().into(),
            "phone" => self.phone.as_str().into(),
            "hire_date" => self.hire_date.to_string().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &["manager_id", "name", "email", "phone", "hire_date"]
    }

    fn csv_headers() -> &'static [&'static str] {
        &["Manager ID", "Name", "Email", "Phone", "Hire Date"]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.manager_id.to_string(),
            self.name.clone(),
            opt(&self.email),
            self.phone.clone(),
            self.hire_date.to_string(),
        ]
    }
}

impl TableRow for Property {
    const DEFAULT_SORT: &'static str = "name";

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(self.name.as_str()), Some(self.address.as_str()), self.manager_name.as_deref()]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "status" => Some(self.status.clone()),
            "property_type" => Some(self.property_type.clone()),
            "manager_id" => Some(self.manager_id.to_string()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "property_type", "manager_id"]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "property_id" => self.property_id.into(),
            "name" => self.name.as_str().into(),
            "address" => self.address.as_str().into(),
            "total_units" => self.total_units.into(),
            "property_type" => self.property_type.as_str().into(),
            "status" => self.status.as_str().into(),
            "last_inspection" => self.last_inspection.map(|d| d.to_string()).into(),
            "manager_name" => self.manager_name.clone().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &[
            "property_id",
            "name",
            "address",
            "total_units",
            "property_type",
            "status",
            "last_inspection",
            "manager_name",
        ]
    }

    fn csv_headers() -> &'static [&'static str] {
        &[
            "Property ID",
            "Name",
            "Address",
            "Total Units",
            "Type",
            "Status",
            "Last Inspection",
            "Manager",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.property_id.to_string(),
            self.name.clone(),
            self.address.clone(),
            self.total_units.to_string(),
            self.property_type.clone(),
            self.status.clone(),
            opt(&self.last_inspection),
            opt(&self.manager_name),
        ]
    }
}

impl TableRow for Block {
    const DEFAULT_SORT: &'static str = "block_name";

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(self.block_name.as_str()), self.property_name.as_deref()]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "property_id" => Some(self.property_id.to_string()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["property_id"]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "block_id" => self.block_id.into(),
            "block_name" => self.block_name.as_str().into(),
            "property_name" => self.property_name.clone().into(),
            "floor_count" => self.floor_count.into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &["block_id", "block_name", "property_name", "floor_count"]
    }

    fn csv_headers() -> &'static [&'static str] {
        &["Block ID", "Block Name", "Property ID", "Property Name", "Floor Count", "Notes"]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.block_id.to_string(),
            self.block_name.clone(),
            self.property_id.to_string(),
            opt(&self.property_name),
            opt(&self.floor_count),
            opt(&self.notes),
        ]
    }
}

impl TableRow for Unit {
    const DEFAULT_SORT: &'static str = "unit_number";
    const PAGINATE_BY_DEFAULT: bool = true;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(self.unit_number.as_str()), Some(self.unit_type.as_str())]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "property_id" => Some(self.property_id.to_string()),
            "block_id" => self.block_id.map(|id| id.to_string()),
            "unit_status" => Some(self.unit_status.clone()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["property_id", "block_id", "unit_status"]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "unit_id" => self.unit_id.into(),
            "unit_number" => self.unit_number.as_str().into(),
            "property_name" => self.property_name.clone().into(),
            "block_name" => self.block_name.clone().into(),
            "floor_number" => self.floor_number.into(),
            "unit_status" => self.unit_status.as_str().into(),
            "unit_type" => self.unit_type.as_str().into(),
            "bedroom_count" => self.bedroom_count.into(),
            "bathroom_count" => self.bathroom_count.into(),
            "monthly_rent" => self.monthly_rent.into(),
            "security_deposit" => self.security_deposit.into(),
            "tenant_name" => self.tenant_name.clone().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &[
            "unit_id",
            "unit_number",
            "property_name",
            "block_name",
            "floor_number",
            "unit_status",
            "unit_type",
            "bedroom_count",
            "bathroom_count",
            "monthly_rent",
            "security_deposit",
            "tenant_name",
        ]
    }

    fn csv_headers() -> &'static [&'static str] {
        &[
            "Unit ID",
            "Unit Number",
            "Property",
            "Block",
            "Floor",
            "Status",
            "Type",
            "Bedrooms",
            "Bathrooms",
            "Monthly Rent",
            "Security Deposit",
            "Tenant",
            "Notes",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.unit_id.to_string(),
            self.unit_number.clone(),
            opt(&self.property_name),
            opt(&self.block_name),
            opt(&self.floor_number),
            self.unit_status.clone(),
            self.unit_type.clone(),
            self.bedroom_count.to_string(),
            self.bathroom_count.to_string(),
            money(self.monthly_rent),
            money(self.security_deposit),
            opt(&self.tenant_name),
            opt(&self.notes),
        ]
    }
}

impl TableRow for Tenant {
    const DEFAULT_SORT: &'static str = "full_name";

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            Some(self.full_name.as_str()),
            self.email.as_deref(),
            self.phone_number.as_deref(),
            self.unit_number.as_deref(),
        ]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "status" => Some(self.status.as_str().to_string()),
            "unit_id" => self.unit_id.map(|id| id.to_string()),
            "property_id" => self.property_id.map(|id| id.to_string()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "unit_id", "property_id"]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "tenant_id" => self.tenant_id.into(),
            "full_name" => self.full_name.as_str().into(),
            "email" => self.email.clone().into(),
            "unit_number" => self.unit_number.clone().into(),
            "lease_start_date" => self.lease_start_date.as_str().into(),
            "lease_end_date" => self.lease_end_date.clone().into(),
            "rent_amount" => self.rent_amount.into(),
            "status" => self.status.as_str().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &[
            "tenant_id",
            "full_name",
            "email",
            "unit_number",
            "lease_start_date",
            "lease_end_date",
            "rent_amount",
            "status",
        ]
    }

    fn csv_headers() -> &'static [&'static str] {
        &[
            "Tenant ID",
            "Full Name",
            "Phone",
            "Email",
            "ID Number",
            "Unit",
            "Lease Start",
            "Lease End",
            "Rent",
            "Deposit",
            "Status",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.tenant_id.to_string(),
            self.full_name.clone(),
            opt(&self.phone_number),
            opt(&self.email),
            opt(&self.id_number),
            opt(&self.unit_number),
            self.lease_start_date.clone(),
            opt(&self.lease_end_date),
            money(self.rent_amount),
            money(self.deposit_amount),
            self.status.as_str().to_string(),
        ]
    }
}

impl TableRow for Payment {
    const DEFAULT_SORT: &'static str = "payment_date";
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Desc;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![
            self.tenant_name.as_deref(),
            self.unit_number.as_deref(),
            self.property_name.as_deref(),
            self.receipt_number.as_deref(),
        ]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "payment_status" => Some(self.payment_status.as_str().to_string()),
            "payment_category" => Some(self.payment_category.as_str().to_string()),
            "payment_method" => Some(self.payment_method.as_str().to_string()),
            "payment_month" => Some(self.payment_month.clone()),
            "property_id" => Some(self.property_id.to_string()),
            "tenant_id" => Some(self.tenant_id.to_string()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &[
            "payment_status",
            "payment_category",
            "payment_method",
            "payment_month",
            "property_id",
            "tenant_id",
        ]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "payment_date" => self.payment_date.to_string().into(),
            "due_date" => self.due_date.to_string().into(),
            "amount_paid" => self.amount_paid.into(),
            "tenant_name" => self.tenant_name.clone().into(),
            "unit_number" => self.unit_number.clone().into(),
            "property_name" => self.property_name.clone().into(),
            "payment_status" => self.payment_status.as_str().into(),
            "payment_category" => self.payment_category.as_str().into(),
            "receipt_number" => self.receipt_number.clone().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &[
            "payment_date",
            "due_date",
            "amount_paid",
            "tenant_name",
            "unit_number",
            "property_name",
            "payment_status",
            "payment_category",
            "receipt_number",
        ]
    }

    fn csv_headers() -> &'static [&'static str] {
        &[
            "Payment ID",
            "Tenant",
            "Unit",
            "Property",
            "Amount",
            "Payment Date",
            "Due Date",
            "Month",
            "Status",
            "Method",
            "Category",
            "Receipt",
            "Reference",
            "Remarks",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.payment_id.clone(),
            opt(&self.tenant_name),
            opt(&self.unit_number),
            opt(&self.property_name),
            money(self.amount_paid),
            self.payment_date.to_string(),
            self.due_date.to_string(),
            self.payment_month.clone(),
            self.payment_status.as_str().to_string(),
            self.payment_method.as_str().to_string(),
            self.payment_category.as_str().to_string(),
            opt(&self.receipt_number),
            opt(&self.transaction_reference),
            opt(&self.remarks),
        ]
    }
}

impl TableRow for Complaint {
    const DEFAULT_SORT: &'static str = "created_at";
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Desc;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(self.description.as_str()), self.unit_number.as_deref()]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "status" => Some(self.status.as_str().to_string()),
            "unit_id" => Some(self.unit_id.to_string()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["status", "unit_id"]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "complaint_id" => self.complaint_id.into(),
            "created_at" => self.created_at.as_str().into(),
            "updated_at" => self.updated_at.as_str().into(),
            "status" => self.status.as_str().into(),
            "unit_number" => self.unit_number.clone().into(),
            "tenant_name" => self.tenant_name.clone().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &["complaint_id", "created_at", "updated_at", "status", "unit_number", "tenant_name"]
    }

    fn csv_headers() -> &'static [&'static str] {
        &["ID", "Unit", "Tenant", "Description", "Status", "Created At"]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.complaint_id.to_string(),
            opt(&self.unit_number),
            opt(&self.tenant_name),
            self.description.clone(),
            self.status.as_str().to_string(),
            self.created_at.clone(),
        ]
    }
}

impl TableRow for Expense {
    const DEFAULT_SORT: &'static str = "expense_date";
    const DEFAULT_DIRECTION: SortDirection = SortDirection::Desc;

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![self.description.as_deref(), Some(self.vendor.as_str()), self.unit_number.as_deref()]
    }

    fn filter_value(&self, field: &str) -> Option<String> {
        match field {
            "category" => Some(self.category.clone()),
            "block_name" => self.block_name.clone(),
            "property_id" => self.property_id.map(|id| id.to_string()),
            _ => None,
        }
    }

    fn filter_fields() -> &'static [&'static str] {
        &["category", "block_name", "property_id"]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "expense_date" => self.expense_date.to_string().into(),
            "amount" => self.amount.into(),
            "category" => self.category.as_str().into(),
            "vendor" => self.vendor.as_str().into(),
            "unit_number" => self.unit_number.clone().into(),
            "block_name" => self.block_name.clone().into(),
            "property_name" => self.property_name.clone().into(),
            _ => SortValue::Missing,
        }
    }

    fn sort_keys() -> &'static [&'static str] {
        &["expense_date", "amount", "category", "vendor", "unit_number", "block_name", "property_name"]
    }

    fn csv_headers() -> &'static [&'static str] {
        &[
            "Expense ID",
            "Date",
            "Amount",
            "Category",
            "Description",
            "Vendor",
            "Payment Method",
            "Property",
            "Block",
            "Unit",
            "Invoice",
            "Paid By",
        ]
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.expense_id.to_string(),
            self.expense_date.to_string(),
            money(self.amount),
            self.category.clone(),
            opt(&self.description),
            self.vendor.clone(),
            self.payment_method.clone(),
            opt(&self.property_name),
            opt(&self.block_name),
            opt(&self.unit_number),
            opt(&self.invoice_number),
            opt(&self.paid_by),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: i64, name: &str, property_id: i64, floors: Option<i64>) -> Block {
        Block {
            block_id: id,
            block_name: name.to_string(),
            property_id,
            property_name: Some(format!("Property {}", property_id)),
            floor_count: floors,
            notes: None,
        }
    }

    fn names(page: &ListPage<Block>) -> Vec<&str> {
        page.items.iter().map(|b| b.block_name.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let rows = vec![
            block(1, "North Wing", 1, None),
            block(2, "South Wing", 1, None),
            block(3, "Annex", 2, None),
        ];

        let page = apply_query(rows.clone(), &ListQuery::default().with_search("WING"));
        assert_eq!(names(&page), vec!["North Wing", "South Wing"]);

        // property name is searchable too
        let page = apply_query(rows, &ListQuery::default().with_search("property 2"));
        assert_eq!(names(&page), vec!["Annex"]);
    }

    #[test]
    fn test_filter_all_and_unknown_fields_are_ignored() {
        let rows = vec![block(1, "A", 1, None), block(2, "B", 2, None)];

        let page = apply_query(rows.clone(), &ListQuery::default().with_filter("property_id", "2"));
        assert_eq!(names(&page), vec!["B"]);

        let page = apply_query(rows.clone(), &ListQuery::default().with_filter("property_id", "All"));
        assert_eq!(page.total, 2);

        let page = apply_query(rows, &ListQuery::default().with_filter("colour", "red"));
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_sort_numbers_and_missing_last() {
        let rows = vec![
            block(1, "A", 1, Some(10)),
            block(2, "B", 1, None),
            block(3, "C", 1, Some(9)),
        ];

        let asc = apply_query(rows.clone(), &ListQuery::default().with_sort("floor_count", SortDirection::Asc));
        assert_eq!(names(&asc), vec!["C", "A", "B"]);

        let desc = apply_query(rows, &ListQuery::default().with_sort("floor_count", SortDirection::Desc));
        assert_eq!(names(&desc), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_pagination() {
        let rows: Vec<Block> = (1..=23).map(|i| block(i, &format!("B{:02}", i), 1, None)).collect();

        let page = apply_query(rows.clone(), &ListQuery::default().with_page(3));
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(names(&page), vec!["B21", "B22", "B23"]);

        let past_end = apply_query(rows.clone(), &ListQuery::default().with_page(4));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 3);

        // blocks are not paginated unless asked
        let all = apply_query(rows, &ListQuery::default());
        assert_eq!(all.items.len(), 23);
        assert_eq!(all.page, None);
    }

    #[test]
    fn test_empty_list_has_zero_pages() {
        let page = paginate(Vec::<Block>::new(), Some(1));
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_unknown_sort_key_falls_back_to_default() {
        let rows = vec![block(1, "b", 1, None), block(2, "A", 1, None)];
        let page = apply_query(rows, &ListQuery::default().with_sort("color", SortDirection::Desc));
        assert_eq!(names(&page), vec!["A", "b"]);
    }
}

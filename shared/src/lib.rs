use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar date format used for every stored and submitted date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error returned when a stored or submitted enum value is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// Lifecycle status of a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TenantStatus {
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "moving-out")]
    MovingOut,
    #[serde(rename = "inactive")]
    Inactive,
}

impl TenantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::MovingOut => "moving-out",
            TenantStatus::Inactive => "inactive",
        }
    }

    /// Whether a tenant in this status still occupies their unit
    pub fn occupies_unit(&self) -> bool {
        !matches!(self, TenantStatus::Inactive)
    }
}

impl FromStr for TenantStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(TenantStatus::Active),
            "moving-out" | "moving out" => Ok(TenantStatus::MovingOut),
            "inactive" => Ok(TenantStatus::Inactive),
            _ => Err(ParseEnumError { kind: "tenant status", value: s.to_string() }),
        }
    }
}

/// Settlement status of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Overdue => "Overdue",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paid" => Ok(PaymentStatus::Paid),
            "Pending" => Ok(PaymentStatus::Pending),
            "Overdue" => Ok(PaymentStatus::Overdue),
            _ => Err(ParseEnumError { kind: "payment status", value: s.to_string() }),
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    Cash,
    #[default]
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Mobile Money")]
    MobileMoney,
    Check,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::MobileMoney => "Mobile Money",
            PaymentMethod::Check => "Check",
            PaymentMethod::Other => "Other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "Bank Transfer" => Ok(PaymentMethod::BankTransfer),
            "Credit Card" => Ok(PaymentMethod::CreditCard),
            "Mobile Money" => Ok(PaymentMethod::MobileMoney),
            "Check" => Ok(PaymentMethod::Check),
            "Other" => Ok(PaymentMethod::Other),
            _ => Err(ParseEnumError { kind: "payment method", value: s.to_string() }),
        }
    }
}

/// What a payment was for. Only `Rent` counts towards arrears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentCategory {
    #[default]
    Rent,
    Utilities,
    Deposit,
    Other,
}

impl PaymentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentCategory::Rent => "Rent",
            PaymentCategory::Utilities => "Utilities",
            PaymentCategory::Deposit => "Deposit",
            PaymentCategory::Other => "Other",
        }
    }
}

impl FromStr for PaymentCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Rent" => Ok(PaymentCategory::Rent),
            "Utilities" => Ok(PaymentCategory::Utilities),
            "Deposit" => Ok(PaymentCategory::Deposit),
            "Other" => Ok(PaymentCategory::Other),
            _ => Err(ParseEnumError { kind: "payment category", value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ComplaintStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Open => "Open",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }
}

impl FromStr for ComplaintStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(ComplaintStatus::Open),
            "In Progress" => Ok(ComplaintStatus::InProgress),
            "Resolved" => Ok(ComplaintStatus::Resolved),
            _ => Err(ParseEnumError { kind: "complaint status", value: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity records (as listed) and forms (as submitted)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manager {
    pub manager_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ManagerForm {
    /// Present when editing an existing manager
    pub manager_id: Option<i64>,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    /// YYYY-MM-DD
    pub hire_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub property_id: i64,
    pub name: String,
    pub address: String,
    pub total_units: i64,
    pub property_type: String,
    pub status: String,
    pub last_inspection: Option<NaiveDate>,
    pub manager_id: i64,
    pub manager_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PropertyForm {
    pub property_id: Option<i64>,
    pub name: String,
    pub address: String,
    pub total_units: i64,
    pub property_type: String,
    pub status: String,
    pub last_inspection: Option<String>,
    pub manager_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub block_id: i64,
    pub block_name: String,
    pub property_id: i64,
    pub property_name: Option<String>,
    pub floor_count: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlockForm {
    pub block_id: Option<i64>,
    pub block_name: String,
    pub property_id: i64,
    pub floor_count: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: i64,
    pub unit_number: String,
    pub property_id: i64,
    pub property_name: Option<String>,
    pub block_id: Option<i64>,
    pub block_name: Option<String>,
    pub floor_number: Option<i64>,
    pub unit_status: String,
    pub unit_type: String,
    pub bedroom_count: i64,
    pub bathroom_count: i64,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub tenant_id: Option<i64>,
    pub tenant_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnitForm {
    pub unit_id: Option<i64>,
    pub unit_number: String,
    pub property_id: i64,
    pub block_id: Option<i64>,
    pub floor_number: Option<i64>,
    pub unit_status: String,
    pub unit_type: String,
    pub bedroom_count: i64,
    pub bathroom_count: i64,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub tenant_id: i64,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
    /// Kept exactly as stored; the arrears report flags values that do not parse
    pub lease_start_date: String,
    pub lease_end_date: Option<String>,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub unit_id: Option<i64>,
    pub unit_number: Option<String>,
    pub property_id: Option<i64>,
    pub status: TenantStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TenantForm {
    pub tenant_id: Option<i64>,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub id_number: Option<String>,
    pub lease_start_date: String,
    pub lease_end_date: Option<String>,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub unit_id: Option<i64>,
    #[serde(default)]
    pub status: TenantStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: String,
    pub tenant_id: i64,
    pub tenant_name: Option<String>,
    pub unit_id: i64,
    pub unit_number: Option<String>,
    pub property_id: i64,
    pub property_name: Option<String>,
    pub amount_paid: f64,
    pub payment_date: NaiveDate,
    pub due_date: NaiveDate,
    /// YYYY-MM of `due_date`
    pub payment_month: String,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_category: PaymentCategory,
    pub receipt_number: Option<String>,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PaymentForm {
    pub payment_id: Option<String>,
    pub tenant_id: i64,
    pub unit_id: i64,
    pub property_id: i64,
    pub amount_paid: f64,
    pub payment_date: String,
    pub due_date: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_category: PaymentCategory,
    pub receipt_number: Option<String>,
    pub transaction_reference: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub complaint_id: i64,
    pub unit_id: i64,
    pub unit_number: Option<String>,
    pub tenant_id: Option<i64>,
    pub tenant_name: Option<String>,
    pub description: String,
    pub status: ComplaintStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComplaintForm {
    pub complaint_id: Option<i64>,
    pub unit_id: i64,
    pub tenant_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub status: ComplaintStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub expense_id: i64,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub unit_id: Option<i64>,
    pub unit_number: Option<String>,
    pub block_id: Option<i64>,
    pub block_name: Option<String>,
    pub property_id: Option<i64>,
    pub property_name: Option<String>,
    pub payment_method: String,
    pub vendor: String,
    pub invoice_number: Option<String>,
    pub paid_by: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExpenseForm {
    pub expense_id: Option<i64>,
    pub amount: f64,
    pub category: String,
    pub description: Option<String>,
    pub expense_date: String,
    pub unit_id: Option<i64>,
    pub block_id: Option<i64>,
    pub property_id: Option<i64>,
    pub payment_method: String,
    pub vendor: String,
    pub invoice_number: Option<String>,
    pub paid_by: Option<String>,
}

/// Entry in the dashboard's activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub recent_activity_id: i64,
    pub activity_type: String,
    pub message: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivityRequest {
    pub activity_type: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: i64,
    pub task_name: String,
    pub due_date: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub task_name: String,
    pub due_date: String,
    pub priority: String,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ParseEnumError { kind: "sort direction", value: s.to_string() }),
        }
    }
}

/// Search, filter, sort and page parameters applied to an entity list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
    /// 1-based; `None` returns every matching row
    pub page: Option<usize>,
    /// Equality filters as (field, value); a value of "all" disables the filter
    #[serde(default)]
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }

    pub fn with_sort(mut self, key: &str, direction: SortDirection) -> Self {
        self.sort = Some(key.to_string());
        self.direction = direction;
        self
    }

    pub fn with_filter(mut self, field: &str, value: &str) -> Self {
        self.filters.push((field.to_string(), value.to_string()));
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    /// Rows matching the search and filters, before paging
    pub total: usize,
    pub page: Option<usize>,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse<Id> {
    pub id: Id,
    pub created: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvExport {
    pub filename: String,
    pub csv_content: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExportToPathRequest {
    /// Target directory; the Documents folder is used when absent or blank
    pub directory: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub row_count: usize,
}

// ---------------------------------------------------------------------------
// Rent ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrearsStatus {
    Arrears,
    Overpaid,
    Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrearsRow {
    pub tenant_id: i64,
    pub tenant_name: String,
    pub unit_number: String,
    pub expected_amount: f64,
    pub total_paid: f64,
    pub balance: f64,
    pub status: ArrearsStatus,
    pub months_counted: u32,
}

/// A tenant left out of the arrears rows, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTenant {
    pub tenant_id: i64,
    pub tenant_name: String,
    pub lease_start_date: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrearsReport {
    /// Target month (YYYY-MM) or `None` for "as of today"
    pub month: Option<String>,
    pub period_end: NaiveDate,
    pub rows: Vec<ArrearsRow>,
    pub skipped: Vec<SkippedTenant>,
    pub total_expected: f64,
    pub total_paid: f64,
    /// Sum of balances of tenants in arrears
    pub total_arrears: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ArrearsRequest {
    pub property_id: Option<i64>,
    /// YYYY-MM
    pub month: Option<String>,
}

// ---------------------------------------------------------------------------
// Dashboard and property details
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_properties: i64,
    pub active_tenants: i64,
    /// Paid payments whose payment month is the current month
    pub monthly_revenue: f64,
    pub pending_issues: i64,
    pub total_units: i64,
    pub occupied_units: i64,
    /// Percentage of units with a tenant, 0 when there are no units
    pub occupancy_rate: f64,
    pub average_rent: f64,
    pub monthly_expenses: f64,
    pub cards: Vec<StatCard>,
    pub recent_activities: Vec<RecentActivity>,
    pub upcoming_tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyStats {
    pub total_collected: f64,
    pub total_arrears: f64,
    pub tenant_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub property: Property,
    pub units: ListPage<Unit>,
    pub blocks: ListPage<Block>,
    pub tenants: Vec<Tenant>,
    pub payments: Vec<Payment>,
    pub arrears: ArrearsReport,
    pub stats: PropertyStats,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error body returned by the REST layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

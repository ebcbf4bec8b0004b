//! Rent ledger and arrears calculator.
//!
//! For every tenant in scope the ledger counts the calendar months from the
//! lease start month through the period end (both inclusive), multiplies by
//! the unit's monthly rent and subtracts the Rent payments made inside that
//! window. The calculation itself is [`build_arrears_report`], a pure
//! function over loaded records; [`LedgerService`] only gathers the inputs.

use chrono::{Datelike, Local, NaiveDate};
use log::{info, warn};
use shared::{ArrearsReport, ArrearsRequest, ArrearsRow, ArrearsStatus, SkippedTenant, Tenant, DATE_FORMAT};

use super::errors::{DomainError, ValidationErrors};
use crate::storage::{EntityStorage, PaymentRepository, TenantRepository, UnitRepository};

/// Unit number reported for tenants without a resolvable unit
pub const NO_UNIT: &str = "N/A";

/// Everything the calculation needs to know about one tenant
#[derive(Debug, Clone, PartialEq)]
pub struct TenantLedgerInput {
    pub tenant_id: i64,
    pub tenant_name: String,
    pub lease_start_date: String,
    pub unit_number: Option<String>,
    pub monthly_rent: Option<f64>,
    /// Date and amount of each Rent payment
    pub rent_payments: Vec<(NaiveDate, f64)>,
}

/// Parse a `YYYY-MM` target month into its first day
pub fn parse_month(month: &str) -> Result<NaiveDate, ValidationErrors> {
    let month = month.trim();
    let invalid = || ValidationErrors::single("month", "must be a valid month (YYYY-MM)");

    if month.len() != 7 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(&format!("{}-01", month), DATE_FORMAT).map_err(|_| invalid())
}

/// Last day of the target month, or `today` when no month is given
pub fn period_end(month: Option<&str>, today: NaiveDate) -> Result<NaiveDate, ValidationErrors> {
    let Some(month) = month.filter(|m| !m.trim().is_empty()) else {
        return Ok(today);
    };

    let first = parse_month(month)?;
    let (year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };

    NaiveDate::from_ymd_opt(year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| ValidationErrors::single("month", "is out of range"))
}

/// Calendar months from the lease month through the period month, inclusive.
/// Zero when the period ends before the lease month.
pub fn months_counted(lease_start: NaiveDate, period_end: NaiveDate) -> u32 {
    let months = (period_end.year() * 12 + period_end.month() as i32)
        - (lease_start.year() * 12 + lease_start.month() as i32)
        + 1;
    months.max(0) as u32
}

/// Lease start as stored: a plain date, or a timestamp whose date part comes first
pub fn parse_lease_start(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = match raw.char_indices().nth(10) {
        Some((i, 'T')) | Some((i, ' ')) => &raw[..i],
        Some(_) => return None,
        None => raw,
    };
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn status_for(balance: f64) -> ArrearsStatus {
    if balance > 0.0 {
        ArrearsStatus::Arrears
    } else if balance < 0.0 {
        ArrearsStatus::Overpaid
    } else {
        ArrearsStatus::Current
    }
}

/// Compute one row per tenant with a parseable lease start; the rest are
/// listed as skipped
pub fn build_arrears_report(
    inputs: Vec<TenantLedgerInput>,
    month: Option<String>,
    period_end: NaiveDate,
) -> ArrearsReport {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for input in inputs {
        let Some(lease_start) = parse_lease_start(&input.lease_start_date) else {
            skipped.push(SkippedTenant {
                tenant_id: input.tenant_id,
                tenant_name: input.tenant_name,
                lease_start_date: input.lease_start_date,
                reason: "Lease start date is not a valid date".to_string(),
            });
            continue;
        };

        let months = months_counted(lease_start, period_end);
        let monthly_rent = input.monthly_rent.unwrap_or(0.0);
        let expected_amount = round_cents(months as f64 * monthly_rent);
        let total_paid = round_cents(
            input
                .rent_payments
                .iter()
                .filter(|(date, _)| *date >= lease_start && *date <= period_end)
                .map(|(_, amount)| amount)
                .sum(),
        );
        let balance = round_cents(expected_amount - total_paid);

        rows.push(ArrearsRow {
            tenant_id: input.tenant_id,
            tenant_name: input.tenant_name,
            unit_number: input.unit_number.unwrap_or_else(|| NO_UNIT.to_string()),
            expected_amount,
            total_paid,
            balance,
            status: status_for(balance),
            months_counted: months,
        });
    }

    let total_expected = round_cents(rows.iter().map(|r| r.expected_amount).sum());
    let total_paid = round_cents(rows.iter().map(|r| r.total_paid).sum());
    let total_arrears = round_cents(rows.iter().map(|r| r.balance).filter(|b| *b > 0.0).sum());

    ArrearsReport {
        month,
        period_end,
        rows,
        skipped,
        total_expected,
        total_paid,
        total_arrears,
    }
}

/// Loads tenants, unit rents and rent payments for the arrears report
#[derive(Clone)]
pub struct LedgerService {
    tenants: TenantRepository,
    units: UnitRepository,
    payments: PaymentRepository,
}

impl LedgerService {
    pub fn new(tenants: TenantRepository, units: UnitRepository, payments: PaymentRepository) -> Self {
        Self {
            tenants,
            units,
            payments,
        }
    }

    pub async fn arrears_report(&self, request: &ArrearsRequest) -> Result<ArrearsReport, DomainError> {
        self.arrears_report_on(request, Local::now().date_naive()).await
    }

    pub async fn arrears_report_on(
        &self,
        request: &ArrearsRequest,
        today: NaiveDate,
    ) -> Result<ArrearsReport, DomainError> {
        let tenants = match request.property_id {
            Some(property_id) => self.tenants.list_for_property(property_id).await,
            None => self.tenants.list().await,
        }
        .map_err(|e| DomainError::from_storage("Tenant", e))?;

        self.report_for_tenants(&tenants, request.month.as_deref(), today)
            .await
    }

    /// Arrears for an already loaded set of tenants
    pub async fn report_for_tenants(
        &self,
        tenants: &[Tenant],
        month: Option<&str>,
        today: NaiveDate,
    ) -> Result<ArrearsReport, DomainError> {
        let period_end = period_end(month, today)?;

        let mut inputs = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            let unit = match tenant.unit_id {
                Some(unit_id) => self
                    .units
                    .rent_for_unit(unit_id)
                    .await
                    .map_err(|e| DomainError::from_storage("Unit", e))?,
                None => None,
            };
            let rent_payments = self
                .payments
                .rent_payments_for_tenant(tenant.tenant_id)
                .await
                .map_err(|e| DomainError::from_storage("Payment", e))?;

            inputs.push(TenantLedgerInput {
                tenant_id: tenant.tenant_id,
                tenant_name: tenant.full_name.clone(),
                lease_start_date: tenant.lease_start_date.clone(),
                unit_number: unit.as_ref().map(|u| u.unit_number.clone()),
                monthly_rent: unit.map(|u| u.monthly_rent),
                rent_payments,
            });
        }

        let month = month.filter(|m| !m.trim().is_empty()).map(|m| m.trim().to_string());
        let report = build_arrears_report(inputs, month, period_end);

        if !report.skipped.is_empty() {
            warn!(
                "📒 LEDGER: {} tenant(s) skipped for unparseable lease start dates",
                report.skipped.len()
            );
        }
        info!(
            "📒 LEDGER: Arrears through {} for {} tenant(s): expected {:.2}, paid {:.2}, arrears {:.2}",
            report.period_end,
            report.rows.len(),
            report.total_expected,
            report.total_paid,
            report.total_arrears
        );

        Ok(report)
    }
}

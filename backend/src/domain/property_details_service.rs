//! Property details view: one property with its units, blocks, tenants,
//! payments and arrears, plus a few headline figures.

use chrono::{Local, NaiveDate};
use log::info;
use serde::Deserialize;
use shared::{Block, ListPage, ListQuery, PaymentCategory, PropertyDetails, PropertyStats, Unit};

use super::entity_service::EntityService;
use super::errors::DomainError;
use super::ledger::LedgerService;
use crate::storage::{BlockRepository, EntityStorage, PaymentRepository, PropertyRepository, TenantRepository, UnitRepository};

/// Query parameters of the details view
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyDetailsQuery {
    /// Arrears month (YYYY-MM); today when absent
    pub month: Option<String>,
    pub units_page: Option<usize>,
    pub blocks_page: Option<usize>,
}

#[derive(Clone)]
pub struct PropertyDetailsService {
    properties: PropertyRepository,
    units: EntityService<UnitRepository>,
    blocks: EntityService<BlockRepository>,
    tenants: TenantRepository,
    payments: PaymentRepository,
    ledger: LedgerService,
}

impl PropertyDetailsService {
    pub fn new(
        properties: PropertyRepository,
        units: EntityService<UnitRepository>,
        blocks: EntityService<BlockRepository>,
        tenants: TenantRepository,
        payments: PaymentRepository,
        ledger: LedgerService,
    ) -> Self {
        Self {
            properties,
            units,
            blocks,
            tenants,
            payments,
            ledger,
        }
    }

    /// `None` when the property does not exist
    pub async fn get(
        &self,
        property_id: i64,
        query: &PropertyDetailsQuery,
    ) -> Result<Option<PropertyDetails>, DomainError> {
        self.get_on(property_id, query, Local::now().date_naive()).await
    }

    pub async fn get_on(
        &self,
        property_id: i64,
        query: &PropertyDetailsQuery,
        today: NaiveDate,
    ) -> Result<Option<PropertyDetails>, DomainError> {
        let Some(property) = self
            .properties
            .get(&property_id)
            .await
            .map_err(|e| DomainError::from_storage("Property", e))?
        else {
            info!("Property {} not found, showing empty details", property_id);
            return Ok(None);
        };

        let scope = property_id.to_string();
        let units: ListPage<Unit> = self
            .units
            .list(
                &ListQuery::default()
                    .with_filter("property_id", &scope)
                    .with_page(query.units_page.unwrap_or(1)),
            )
            .await?;
        let blocks: ListPage<Block> = self
            .blocks
            .list(
                &ListQuery::default()
                    .with_filter("property_id", &scope)
                    .with_page(query.blocks_page.unwrap_or(1)),
            )
            .await?;

        let tenants = self
            .tenants
            .list_for_property(property_id)
            .await
            .map_err(|e| DomainError::from_storage("Tenant", e))?;
        let payments = self
            .payments
            .list_for_property(property_id)
            .await
            .map_err(|e| DomainError::from_storage("Payment", e))?;

        let arrears = self
            .ledger
            .report_for_tenants(&tenants, query.month.as_deref(), today)
            .await?;

        let total_collected = payments
            .iter()
            .filter(|p| p.payment_category == PaymentCategory::Rent)
            .map(|p| p.amount_paid)
            .sum::<f64>();
        let stats = PropertyStats {
            total_collected: (total_collected * 100.0).round() / 100.0,
            total_arrears: arrears.total_arrears,
            tenant_count: tenants.len(),
        };

        info!(
            "Loaded details for property {}: {} units, {} tenants, {} payments",
            property_id,
            units.total,
            tenants.len(),
            payments.len()
        );

        Ok(Some(PropertyDetails {
            property,
            units,
            blocks,
            tenants,
            payments,
            arrears,
            stats,
        }))
    }
}

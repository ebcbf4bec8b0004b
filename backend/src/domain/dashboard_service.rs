//! Dashboard aggregation.
//!
//! Every figure is an independent query; they are issued together and the
//! result is assembled once all of them have completed.

use chrono::{Local, NaiveDate};
use log::info;
use shared::{DashboardStats, StatCard, DATE_FORMAT};

use super::errors::DomainError;
use crate::storage::{DashboardRepository, ReferenceRepository};

/// Number of activities and tasks shown on the dashboard
pub const DASHBOARD_LIST_LIMIT: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    dashboard: DashboardRepository,
    reference: ReferenceRepository,
}

impl DashboardService {
    pub fn new(dashboard: DashboardRepository, reference: ReferenceRepository) -> Self {
        Self { dashboard, reference }
    }

    pub async fn stats(&self) -> Result<DashboardStats, DomainError> {
        self.stats_on(Local::now().date_naive()).await
    }

    pub async fn stats_on(&self, today: NaiveDate) -> Result<DashboardStats, DomainError> {
        let month = today.format("%Y-%m").to_string();
        let today_str = today.format(DATE_FORMAT).to_string();

        let (
            total_properties,
            active_tenants,
            monthly_revenue,
            pending_issues,
            (total_units, occupied_units),
            average_rent,
            monthly_expenses,
            recent_activities,
            upcoming_tasks,
        ) = tokio::try_join!(
            self.dashboard.count_properties(),
            self.dashboard.count_active_tenants(),
            self.dashboard.revenue_for_month(&month),
            self.dashboard.count_open_complaints(),
            self.dashboard.unit_occupancy(),
            self.dashboard.average_rent(),
            self.dashboard.expenses_for_month(&month),
            self.reference.list_activities(Some(DASHBOARD_LIST_LIMIT)),
            self.reference.list_tasks(Some(&today_str), Some(DASHBOARD_LIST_LIMIT)),
        )
        .map_err(DomainError::Storage)?;

        let occupancy_rate = if total_units > 0 {
            (occupied_units as f64 / total_units as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        let cards = vec![
            StatCard {
                title: "Total Properties".to_string(),
                value: total_properties.to_string(),
                detail: format!("{} units", total_units),
            },
            StatCard {
                title: "Active Tenants".to_string(),
                value: active_tenants.to_string(),
                detail: format!("{:.1}% occupancy", occupancy_rate),
            },
            StatCard {
                title: "Monthly Revenue".to_string(),
                value: format!("{:.2}", monthly_revenue),
                detail: format!("Expenses {:.2}", monthly_expenses),
            },
            StatCard {
                title: "Pending Issues".to_string(),
                value: pending_issues.to_string(),
                detail: "Open complaints".to_string(),
            },
        ];

        info!(
            "📊 DASHBOARD: {} properties, {} active tenants, revenue {:.2} for {}",
            total_properties, active_tenants, monthly_revenue, month
        );

        Ok(DashboardStats {
            total_properties,
            active_tenants,
            monthly_revenue,
            pending_issues,
            total_units,
            occupied_units,
            occupancy_rate,
            average_rent,
            monthly_expenses,
            cards,
            recent_activities,
            upcoming_tasks,
        })
    }
}

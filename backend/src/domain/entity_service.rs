//! Generic list/form service shared by every entity module.

use chrono::{Local, NaiveDate};
use log::{info, warn};
use shared::{CsvExport, DeleteResponse, ExportToPathRequest, ExportToPathResponse, ListPage, ListQuery, SaveResponse};

use super::errors::DomainError;
use super::export_service::ExportService;
use super::listing::{apply_query, filter_and_sort, TableRow};
use super::validation::EntityForm;
use crate::storage::EntityStorage;

/// CRUD, listing and CSV export for one entity
#[derive(Clone)]
pub struct EntityService<S: EntityStorage> {
    storage: S,
    export_service: ExportService,
}

impl<S> EntityService<S>
where
    S: EntityStorage,
    S::Record: TableRow,
    S::Form: EntityForm<Id = S::Id>,
{
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            export_service: ExportService::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn storage_error(err: anyhow::Error) -> DomainError {
        DomainError::from_storage(S::LABEL, err)
    }

    /// Filter, search, sort and paginate the entity's rows
    pub async fn list(&self, query: &ListQuery) -> Result<ListPage<S::Record>, DomainError> {
        let rows = self.storage.list().await.map_err(Self::storage_error)?;
        let page = apply_query(rows, query);
        info!(
            "Listed {}: {} matching, returning {}",
            S::ENTITY,
            page.total,
            page.items.len()
        );
        Ok(page)
    }

    pub async fn get(&self, id: &S::Id) -> Result<S::Record, DomainError> {
        self.storage
            .get(id)
            .await
            .map_err(Self::storage_error)?
            .ok_or_else(|| DomainError::NotFound {
                entity: S::LABEL,
                id: id.to_string(),
            })
    }

    /// Validate and upsert: a form carrying an id updates that row, any other
    /// form inserts a new one
    pub async fn save(&self, mut form: S::Form) -> Result<SaveResponse<S::Id>, DomainError> {
        form.normalize();
        if let Err(errors) = form.validate() {
            warn!("Rejected {} form: {}", S::LABEL, errors);
            return Err(errors.into());
        }

        match form.id() {
            Some(id) => {
                let updated = self
                    .storage
                    .update(&id, &form)
                    .await
                    .map_err(Self::storage_error)?;
                if !updated {
                    return Err(DomainError::NotFound {
                        entity: S::LABEL,
                        id: id.to_string(),
                    });
                }
                info!("Updated {} {}", S::LABEL, id);
                Ok(SaveResponse {
                    id,
                    created: false,
                    success_message: format!("{} updated successfully", S::LABEL),
                })
            }
            None => {
                let id = self.storage.insert(&form).await.map_err(Self::storage_error)?;
                info!("Created {} {}", S::LABEL, id);
                Ok(SaveResponse {
                    id,
                    created: true,
                    success_message: format!("{} created successfully", S::LABEL),
                })
            }
        }
    }

    /// Hard delete after explicit confirmation, refused while other rows
    /// still reference this one
    pub async fn delete(&self, id: &S::Id, confirmed: bool) -> Result<DeleteResponse, DomainError> {
        if !confirmed {
            return Err(DomainError::ConfirmationRequired {
                entity: S::LABEL,
                id: id.to_string(),
            });
        }

        let dependents = self.storage.dependents(id).await.map_err(Self::storage_error)?;
        if !dependents.is_empty() {
            warn!("Refusing to delete {} {}: {:?}", S::LABEL, id, dependents);
            return Err(DomainError::Referenced {
                entity: S::LABEL,
                id: id.to_string(),
                dependents,
            });
        }

        if !self.storage.delete(id).await.map_err(Self::storage_error)? {
            return Err(DomainError::NotFound {
                entity: S::LABEL,
                id: id.to_string(),
            });
        }

        info!("Deleted {} {}", S::LABEL, id);
        Ok(DeleteResponse {
            deleted: true,
            success_message: format!("{} deleted successfully", S::LABEL),
        })
    }

    /// Every row matching the query (never paginated) as CSV
    pub async fn export_csv(&self, query: &ListQuery) -> Result<CsvExport, DomainError> {
        self.export_csv_on(query, Local::now().date_naive()).await
    }

    pub async fn export_csv_on(&self, query: &ListQuery, date: NaiveDate) -> Result<CsvExport, DomainError> {
        let rows = self.storage.list().await.map_err(Self::storage_error)?;
        let rows = filter_and_sort(rows, query);
        Ok(self.export_service.to_csv(S::ENTITY, &rows, date)?)
    }

    pub async fn export_to_path(
        &self,
        query: &ListQuery,
        request: &ExportToPathRequest,
    ) -> Result<ExportToPathResponse, DomainError> {
        let export = self.export_csv(query).await?;
        Ok(self
            .export_service
            .export_to_path(&export, request.directory.as_deref()))
    }
}

//! # Storage Traits
//!
//! The seam between the domain layer and the per-table repositories. The
//! generic entity service is written against [`EntityStorage`] so every
//! list/form module shares one implementation of listing, saving, deleting
//! and exporting.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Display;

/// A table that still references a row, with the number of referencing rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    pub table: &'static str,
    pub count: i64,
}

/// Trait defining the interface for entity storage operations
#[async_trait]
pub trait EntityStorage: Clone + Send + Sync + 'static {
    /// Primary key type
    type Id: Clone + Display + Send + Sync + 'static;
    /// Row as listed, with joined display names resolved
    type Record: Clone + Send + Sync + 'static;
    /// Upsert payload
    type Form: Send + Sync + 'static;

    /// Plural name used in routes and export file names
    const ENTITY: &'static str;
    /// Singular name used in messages
    const LABEL: &'static str;

    /// Every row of the table
    async fn list(&self) -> Result<Vec<Self::Record>>;

    /// A single row by primary key
    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>>;

    /// Insert one row and return its new primary key
    async fn insert(&self, form: &Self::Form) -> Result<Self::Id>;

    /// Update one row; false when no row has this id
    async fn update(&self, id: &Self::Id, form: &Self::Form) -> Result<bool>;

    /// Hard delete by id; false when no row has this id
    async fn delete(&self, id: &Self::Id) -> Result<bool>;

    /// Tables with rows that still reference this one
    async fn dependents(&self, id: &Self::Id) -> Result<Vec<Dependent>>;
}

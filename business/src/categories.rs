//! Category catalog: categories, record types and custom field definitions.
//!
//! Loaded once after sign-in; the records page uses it for the category
//! filter, the type selector, and to extend the table with one dynamic
//! column per custom field.

use std::any::Any;

use log::error;
use serde::{Deserialize, Serialize};
use synctime_states::{
    Command, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater, SnapshotClone,
    Updater, assign_impl,
};
use tokio_util::sync::CancellationToken;
use ustr::Ustr;

use crate::auth::AuthCompute;
use crate::config::AppConfig;
use crate::http::Client;

/// A record category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Ustr,
    pub name: Ustr,
    /// Display color as a hex string, e.g. `#aabbcc`.
    #[serde(default)]
    pub color: Option<Ustr>,
}

/// A record type (income/expense plus any user-defined ones).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordType {
    pub id: Ustr,
    pub name: Ustr,
}

/// The shape of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomFieldKind {
    Text,
    Number,
    Date,
    MultiChoice,
}

/// A caller-defined dynamic field attached to records of a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomFieldDef {
    pub id: Ustr,
    /// Field name; records store values under this key, and the table
    /// addresses the column as `custom_<name>`.
    pub name: Ustr,
    pub kind: CustomFieldKind,
    /// Choices for `MultiChoice` fields.
    #[serde(default)]
    pub options: Vec<Ustr>,
}

impl CustomFieldDef {
    /// Column key used by the data table for this field.
    pub fn column_key(&self) -> String {
        format!("custom_{}", self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ListCategoriesResponse {
    items: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListRecordTypesResponse {
    items: Vec<RecordType>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListCustomFieldsResponse {
    items: Vec<CustomFieldDef>,
}

/// The loaded catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub record_types: Vec<RecordType>,
    pub custom_fields: Vec<CustomFieldDef>,
}

/// Status of the catalog load.
#[derive(Debug, Clone, Default)]
pub enum CatalogStatus {
    #[default]
    Idle,
    Loading,
    Success(Catalog),
    Error(String),
}

/// Compute cache for the catalog.
#[derive(Default, Debug, Clone)]
pub struct CatalogCompute {
    pub status: CatalogStatus,
}

impl CatalogCompute {
    pub fn catalog(&self) -> Option<&Catalog> {
        match &self.status {
            CatalogStatus::Success(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn categories(&self) -> &[Category] {
        self.catalog().map(|c| c.categories.as_slice()).unwrap_or(&[])
    }

    pub fn record_types(&self) -> &[RecordType] {
        self.catalog().map(|c| c.record_types.as_slice()).unwrap_or(&[])
    }

    pub fn custom_fields(&self) -> &[CustomFieldDef] {
        self.catalog().map(|c| c.custom_fields.as_slice()).unwrap_or(&[])
    }
}

impl SnapshotClone for CatalogCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl Compute for CatalogCompute {
    fn deps(&self) -> ComputeDeps {
        (&[], &[])
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {
        // Updated by LoadCatalogCommand.
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        assign_impl(self, new_self);
    }
}

/// Command loading categories, record types and custom field definitions.
#[derive(Default, Debug)]
pub struct LoadCatalogCommand;

impl Command for LoadCatalogCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        let config: AppConfig = snap.state::<AppConfig>().clone();
        let auth: AuthCompute = snap.compute::<AuthCompute>().clone();

        Box::pin(async move {
            let Some(token) = auth.token().map(str::to_owned) else {
                updater.set(CatalogCompute {
                    status: CatalogStatus::Error("Not authenticated".to_owned()),
                });
                return;
            };

            updater.set(CatalogCompute {
                status: CatalogStatus::Loading,
            });

            let base = config.api_url();

            let categories = fetch_json::<ListCategoriesResponse>(
                &format!("{base}/v1/categories"),
                &token,
            )
            .await;
            let record_types = fetch_json::<ListRecordTypesResponse>(
                &format!("{base}/v1/record-types"),
                &token,
            )
            .await;
            let custom_fields = fetch_json::<ListCustomFieldsResponse>(
                &format!("{base}/v1/custom-fields"),
                &token,
            )
            .await;

            match (categories, record_types, custom_fields) {
                (Ok(categories), Ok(record_types), Ok(custom_fields)) => {
                    updater.set(CatalogCompute {
                        status: CatalogStatus::Success(Catalog {
                            categories: categories.items,
                            record_types: record_types.items,
                            custom_fields: custom_fields.items,
                        }),
                    });
                }
                (categories, record_types, custom_fields) => {
                    let message = [
                        categories.err(),
                        record_types.err(),
                        custom_fields.err(),
                    ]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("; ");
                    error!("catalog load failed: {message}");
                    updater.set(CatalogCompute {
                        status: CatalogStatus::Error(message),
                    });
                }
            }
        })
    }
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    url: &str,
    token: &str,
) -> Result<T, String> {
    match Client::get(url).bearer(token).send().await {
        Ok(response) if response.is_success() => response
            .json::<T>()
            .map_err(|e| format!("Failed to parse response: {e}")),
        Ok(response) => Err(response.text().unwrap_or_else(|_| "Unknown error".to_owned())),
        Err(e) => Err(e.to_string()),
    }
}

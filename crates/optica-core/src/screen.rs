//! # Screen State
//!
//! One explicit state struct per management screen, driven by a pure
//! reducer.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ScreenState<T>                                  │
//! │                                                                         │
//! │  FetchStarted ──► loading = true                                        │
//! │  Loaded       ──► snapshot replaced, pipeline re-run, page 0            │
//! │  FetchFailed  ──► snapshot kept (stale but consistent) + notification   │
//! │                                                                         │
//! │  Search / SetFilter / SetRange / SetDateRange / ClearFilters            │
//! │               ──► pipeline re-run, back to page 0                       │
//! │  Sort / ToggleSort ──► pipeline re-run, page kept (clamped)             │
//! │  PageSize / First / Previous / Next / Last ──► paginator only           │
//! │                                                                         │
//! │  SubmitStarted  ──► in flight (a second one is rejected)                │
//! │  SubmitFinished ──► ready + success/error notification                  │
//! │  Tick           ──► expired notification dismissed                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The reducer never reads the clock: every action that needs "now"
//! carries it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::paginator::{PageInfo, Paginator};
use crate::pipeline::{self, FilterSpec, ListContext, Listable, Row, SortKey};
use crate::reference::ReferenceTable;
use crate::validation::{validate_search_query, ErrorMap};
use crate::{DEFAULT_NOTIFICATION_SECS, DEFAULT_PAGE_SIZE};

// =============================================================================
// Settings & Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSettings {
    pub page_size: usize,
    /// How long a notification stays visible.
    pub notification_ttl: Duration,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        ScreenSettings {
            page_size: DEFAULT_PAGE_SIZE,
            notification_ttl: Duration::from_secs(DEFAULT_NOTIFICATION_SECS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message shown above the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// Actions
// =============================================================================

#[derive(Debug)]
pub enum ScreenAction<T: Listable> {
    FetchStarted,
    Loaded { records: Vec<T>, at: DateTime<Utc> },
    FetchFailed { message: String, at: DateTime<Utc> },
    References(ReferenceTable),
    Search(String),
    SetFilter { key: String, value: String },
    SetRange { min: Option<f64>, max: Option<f64> },
    SetDateRange { from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>> },
    ClearFilters,
    Sort(SortKey<T::SortField>),
    /// Same field flips the direction; another field sorts ascending.
    ToggleSort(T::SortField),
    PageSize(usize),
    GoToPage(usize),
    FirstPage,
    PreviousPage,
    NextPage,
    LastPage,
    SubmitStarted,
    /// `Ok(message)` on success, `Err(message)` on failure.
    SubmitFinished { outcome: Result<String, String>, at: DateTime<Utc> },
    Tick(DateTime<Utc>),
}

// =============================================================================
// Screen State
// =============================================================================

#[derive(Debug)]
pub struct ScreenState<T: Listable> {
    records: Vec<Arc<T>>,
    context: ListContext,
    search_term: String,
    filters: FilterSpec,
    sort_key: Option<SortKey<T::SortField>>,
    paginator: Paginator,
    rows: Vec<Row<T>>,
    loading: bool,
    submitting: bool,
    notification: Option<Notification>,
    settings: ScreenSettings,
}

/// What a renderer needs for one frame.
#[derive(Debug)]
pub struct ScreenView<'a, T: Listable> {
    pub rows: &'a [Row<T>],
    pub page: PageInfo,
    pub loading: bool,
    pub submitting: bool,
    pub notification: Option<&'a Notification>,
}

impl<T: Listable> ScreenState<T> {
    pub fn new(settings: ScreenSettings, now: DateTime<Utc>) -> Self {
        ScreenState {
            records: Vec::new(),
            context: ListContext::new(now),
            search_term: String::new(),
            filters: FilterSpec::new(),
            sort_key: None,
            paginator: Paginator::new(settings.page_size),
            rows: Vec::new(),
            loading: false,
            submitting: false,
            notification: None,
            settings,
        }
    }

    pub fn with_sort(mut self, key: SortKey<T::SortField>) -> Self {
        self.sort_key = Some(key);
        self.rerun();
        self
    }

    /// Applies one action.
    pub fn dispatch(&mut self, action: ScreenAction<T>) -> CoreResult<()> {
        match action {
            ScreenAction::FetchStarted => {
                self.loading = true;
            }
            ScreenAction::Loaded { records, at } => {
                tracing::info!(count = records.len(), "listing loaded");
                self.records = records.into_iter().map(Arc::new).collect();
                self.context.now = at;
                self.loading = false;
                self.rerun();
            }
            ScreenAction::FetchFailed { message, at } => {
                tracing::warn!(%message, kept = self.records.len(), "fetch failed, keeping previous snapshot");
                self.loading = false;
                self.notify(NotificationKind::Error, message, at);
            }
            ScreenAction::References(references) => {
                self.context.references = references;
                self.rerun();
            }
            ScreenAction::Search(term) => {
                let term = validate_search_query(&term).map_err(|err| {
                    let mut errors = ErrorMap::new();
                    errors.push(err);
                    CoreError::Validation(errors)
                })?;
                self.search_term = term;
                self.refilter();
            }
            ScreenAction::SetFilter { key, value } => {
                self.filters.set(&key, &value);
                self.refilter();
            }
            ScreenAction::SetRange { min, max } => {
                self.filters.set_range(min, max);
                self.refilter();
            }
            ScreenAction::SetDateRange { from, to } => {
                self.filters.set_date_range(from, to);
                self.refilter();
            }
            ScreenAction::ClearFilters => {
                self.filters.clear();
                self.refilter();
            }
            ScreenAction::Sort(key) => {
                self.sort_key = Some(key);
                self.rerun();
            }
            ScreenAction::ToggleSort(field) => {
                let key = match self.sort_key {
                    Some(current) if current.field == field => SortKey {
                        field,
                        direction: current.direction.toggled(),
                    },
                    _ => SortKey::asc(field),
                };
                self.sort_key = Some(key);
                self.rerun();
            }
            ScreenAction::PageSize(size) => self.paginator.set_size(size)?,
            ScreenAction::GoToPage(index) => self.paginator.go_to(index),
            ScreenAction::FirstPage => self.paginator.first(),
            ScreenAction::PreviousPage => self.paginator.previous(),
            ScreenAction::NextPage => self.paginator.next(),
            ScreenAction::LastPage => self.paginator.last(),
            ScreenAction::SubmitStarted => {
                if self.submitting {
                    return Err(CoreError::SubmissionInFlight);
                }
                self.submitting = true;
            }
            ScreenAction::SubmitFinished { outcome, at } => {
                self.submitting = false;
                match outcome {
                    Ok(message) => {
                        tracing::info!(%message, "submission succeeded");
                        self.notify(NotificationKind::Success, message, at);
                    }
                    Err(message) => {
                        tracing::warn!(%message, "submission failed");
                        self.notify(NotificationKind::Error, message, at);
                    }
                }
            }
            ScreenAction::Tick(now) => {
                if self.notification.as_ref().is_some_and(|n| now >= n.expires_at) {
                    self.notification = None;
                }
            }
        }
        Ok(())
    }

    fn notify(&mut self, kind: NotificationKind, message: String, at: DateTime<Utc>) {
        let ttl = chrono::Duration::from_std(self.settings.notification_ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_NOTIFICATION_SECS as i64));
        self.notification = Some(Notification {
            kind,
            message,
            expires_at: at + ttl,
        });
    }

    /// Re-runs the pipeline; the page is kept when the length is unchanged.
    fn rerun(&mut self) {
        self.rows = pipeline::run(
            &self.records,
            &self.context,
            &self.search_term,
            &self.filters,
            self.sort_key.as_ref(),
        );
        self.paginator.sync_total(self.rows.len());
    }

    /// Re-runs the pipeline and returns to the first page.
    fn refilter(&mut self) {
        self.paginator.reset();
        self.rerun();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn view(&self) -> ScreenView<'_, T> {
        ScreenView {
            rows: self.page(),
            page: self.paginator.info(),
            loading: self.loading,
            submitting: self.submitting,
            notification: self.notification.as_ref(),
        }
    }

    /// Rows of the current page.
    pub fn page(&self) -> &[Row<T>] {
        self.paginator.slice(&self.rows)
    }

    /// All rows after search, filters and sort.
    pub fn rows(&self) -> &[Row<T>] {
        &self.rows
    }

    pub fn records(&self) -> &[Arc<T>] {
        &self.records
    }

    pub fn context(&self) -> &ListContext {
        &self.context
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn sort_key(&self) -> Option<&SortKey<T::SortField>> {
        self.sort_key.as_ref()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::pipeline::SortDirection;
    use crate::screens::product::ProductSort;
    use crate::types::{BranchStock, Product};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
    }

    fn product(id: &str, nombre: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.into(),
            nombre: nombre.into(),
            precio_base: Money::from_cents(price_cents),
            sucursales: vec![BranchStock {
                stock,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn loaded(count: usize, page_size: usize) -> ScreenState<Product> {
        let mut state = ScreenState::new(
            ScreenSettings {
                page_size,
                ..Default::default()
            },
            now(),
        );
        let records = (0..count)
            .map(|i| product(&format!("p{i:02}"), &format!("Aro {i:02}"), 1000 + i as i64, 1))
            .collect();
        state.dispatch(ScreenAction::Loaded { records, at: now() }).unwrap();
        state
    }

    fn page_ids(state: &ScreenState<Product>) -> Vec<String> {
        state.page().iter().map(|r| r.record.id.clone()).collect()
    }

    #[test]
    fn test_loaded_pages_of_ten() {
        let mut state = loaded(25, 10);
        assert_eq!(state.view().page.page_count, 3);
        state.dispatch(ScreenAction::LastPage).unwrap();
        assert_eq!(state.page().len(), 5);
        assert_eq!(page_ids(&state)[0], "p20");
    }

    #[test]
    fn test_search_resets_to_first_page() {
        let mut state = loaded(25, 10);
        state.dispatch(ScreenAction::NextPage).unwrap();
        assert_eq!(state.paginator().index(), 1);

        state.dispatch(ScreenAction::Search("aro 1".into())).unwrap();
        assert_eq!(state.paginator().index(), 0);
        assert_eq!(state.rows().len(), 10);
    }

    #[test]
    fn test_search_too_long_is_rejected() {
        let mut state = loaded(3, 10);
        let result = state.dispatch(ScreenAction::Search("x".repeat(101)));
        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert_eq!(state.search_term(), "");
    }

    #[test]
    fn test_toggle_sort_flips_direction() {
        let mut state = loaded(3, 10);
        state.dispatch(ScreenAction::ToggleSort(ProductSort::Nombre)).unwrap();
        assert_eq!(state.sort_key().map(|k| k.direction), Some(SortDirection::Asc));
        state.dispatch(ScreenAction::ToggleSort(ProductSort::Nombre)).unwrap();
        assert_eq!(state.sort_key().map(|k| k.direction), Some(SortDirection::Desc));
        assert_eq!(page_ids(&state), vec!["p02", "p01", "p00"]);

        state.dispatch(ScreenAction::ToggleSort(ProductSort::Precio)).unwrap();
        assert_eq!(
            state.sort_key().copied(),
            Some(SortKey::asc(ProductSort::Precio))
        );
    }

    #[test]
    fn test_sort_keeps_page_position() {
        let mut state = loaded(25, 10);
        state.dispatch(ScreenAction::NextPage).unwrap();
        state.dispatch(ScreenAction::Sort(SortKey::desc(ProductSort::Precio))).unwrap();
        assert_eq!(state.paginator().index(), 1);
        assert_eq!(page_ids(&state)[0], "p14");
    }

    #[test]
    fn test_fetch_failure_keeps_snapshot() {
        let mut state = loaded(5, 10);
        state.dispatch(ScreenAction::FetchStarted).unwrap();
        assert!(state.is_loading());
        state
            .dispatch(ScreenAction::FetchFailed {
                message: "Error de red".into(),
                at: now(),
            })
            .unwrap();
        assert!(!state.is_loading());
        assert_eq!(state.records().len(), 5);
        assert_eq!(state.notification().map(|n| n.kind), Some(NotificationKind::Error));
    }

    #[test]
    fn test_second_submission_is_rejected() {
        let mut state = loaded(1, 10);
        state.dispatch(ScreenAction::SubmitStarted).unwrap();
        assert!(matches!(
            state.dispatch(ScreenAction::SubmitStarted),
            Err(CoreError::SubmissionInFlight)
        ));
        state
            .dispatch(ScreenAction::SubmitFinished {
                outcome: Ok("Aro creado".into()),
                at: now(),
            })
            .unwrap();
        assert!(!state.is_submitting());
        assert!(state.dispatch(ScreenAction::SubmitStarted).is_ok());
    }

    #[test]
    fn test_edit_product_form_through_submission() {
        use crate::field_store::FieldStore;
        use crate::money::Percentage;
        use crate::payload::{payload_for, SubmitPayload};
        use crate::pricing::PriceResolver;
        use crate::promotion::{Discount, PromotionDescriptor};
        use crate::screens::product::{self, Catalog};
        use crate::screens::ScreenKind;
        use crate::types::{Measurements, Ref, ReferenceItem};
        use crate::validation::FormMode;
        use serde_json::json;

        const CENTRO: &str = "64b7f0c2a1b2c3d4e5f60718";
        let record = Product {
            id: "p1".into(),
            nombre: " Aro Clásico ".into(),
            descripcion: "Metal dorado".into(),
            categoria_id: Some(Ref::id_only("c1")),
            marca_id: Some(Ref::id_only("m1")),
            material: "Metal".into(),
            color: "Dorado".into(),
            precio_base: Money::from_cents(10000),
            precio_actual: Money::from_cents(10000),
            medidas: Measurements {
                ancho_puente: 18.0,
                altura: 40.0,
                ancho: 52.0,
            },
            imagenes: vec!["https://cdn/aro.jpg".into()],
            sucursales: vec![BranchStock {
                sucursal_id: Some(Ref::id_only(CENTRO)),
                stock: 3,
                ..Default::default()
            }],
            ..Default::default()
        };
        let verano = PromotionDescriptor {
            id: "verano".into(),
            discount: Discount::Percentage(Percentage::from_percent(20.0)),
            valid_until: None,
        };
        let references = ReferenceTable::new().with(
            "sucursales",
            vec![ReferenceItem {
                id: CENTRO.into(),
                nombre: "Centro".into(),
            }],
        );

        // edit dialog opens on the stored record, operator puts it on promotion
        let mut store = FieldStore::from_record(product::FORM_FIELDS.iter().copied(), &record);
        let mut prices = PriceResolver::from_product(&record, std::slice::from_ref(&verano));
        prices.set_active(true);
        let resolved = prices.select_promotion(Some(verano.clone()));
        assert_eq!(resolved.effective.cents(), 8000);
        resolved.write_to(&mut store);

        let validator = product::validator(Catalog::Frames);
        assert!(store.validate(&validator, FormMode::Edit), "{:?}", store.errors());

        let body = payload_for(
            ScreenKind::Products(Catalog::Frames),
            &store.snapshot(),
            FormMode::Edit,
            &references,
        );
        assert!(body.get("_id").is_none());
        assert_eq!(body["nombre"], json!("Aro Clásico"));
        assert_eq!(body["precioActual"], json!(80.0));
        assert_eq!(body["promocionId"], json!("verano"));
        assert_eq!(
            body["sucursales"],
            json!([{ "sucursalId": CENTRO, "nombreSucursal": "Centro", "stock": 3 }])
        );

        let payload = SubmitPayload::build(body, Vec::new()).unwrap();
        assert!(!payload.is_multipart());

        let mut state = loaded(1, 10);
        state.dispatch(ScreenAction::SubmitStarted).unwrap();
        assert!(state.is_submitting());
        assert!(matches!(
            state.dispatch(ScreenAction::SubmitStarted),
            Err(CoreError::SubmissionInFlight)
        ));
        state
            .dispatch(ScreenAction::SubmitFinished {
                outcome: Ok("Aro actualizado".into()),
                at: now(),
            })
            .unwrap();
        assert!(!state.is_submitting());
        let notification = state.notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, "Aro actualizado");
    }

    #[test]
    fn test_notification_expires_after_ttl() {
        let mut state = loaded(1, 10);
        state
            .dispatch(ScreenAction::SubmitFinished {
                outcome: Err("No se pudo guardar".into()),
                at: now(),
            })
            .unwrap();
        state.dispatch(ScreenAction::Tick(now() + chrono::Duration::seconds(4))).unwrap();
        assert!(state.notification().is_some());
        state.dispatch(ScreenAction::Tick(now() + chrono::Duration::seconds(5))).unwrap();
        assert!(state.notification().is_none());
    }

    #[test]
    fn test_page_size_out_of_range_is_rejected() {
        let mut state = loaded(25, 10);
        assert!(matches!(
            state.dispatch(ScreenAction::PageSize(0)),
            Err(CoreError::InvalidPageSize(0))
        ));
        assert!(matches!(
            state.dispatch(ScreenAction::PageSize(101)),
            Err(CoreError::InvalidPageSize(101))
        ));
        assert_eq!(state.view().page.size, 10);
        state.dispatch(ScreenAction::PageSize(25)).unwrap();
        assert_eq!(state.view().page.page_count, 1);
    }

    #[test]
    fn test_clear_filters_restores_everything() {
        let mut state = loaded(25, 10);
        state
            .dispatch(ScreenAction::SetRange {
                min: Some(10.20),
                max: None,
            })
            .unwrap();
        assert_eq!(state.rows().len(), 5);
        state.dispatch(ScreenAction::ClearFilters).unwrap();
        assert_eq!(state.rows().len(), 25);
    }
}

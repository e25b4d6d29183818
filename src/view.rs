//! Recompute-on-demand table and analytics views.
//!
//! A view owns its configuration and memoization caches. Callers hand it the
//! current dataset and selections whenever they want fresh view-state, and
//! the view only redoes the filtering or bucketing when those inputs changed.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    Dataset, Error, Record, ViewContext,
    aggregation::{Period, SeriesPoint, aggregate},
    config::ViewConfig,
    field::FieldPath,
    filter::{FilterCriteria, filter},
    memo::{CacheKey, MemoCache},
    pagination::{PageRequest, PageResult, paginate},
    series::{ColorPalette, ColorToken, build_series},
};

/// The view-state a table renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredView {
    /// Every record that matched the filter, in fetch order.
    pub filtered_rows: Vec<Record>,
    /// The requested page of `filtered_rows`.
    pub page_result: PageResult,
    /// The number of records that matched the filter.
    pub total_count: usize,
}

/// The view-state a chart renders from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    /// One point per bucket.
    pub series_data: Vec<SeriesPoint>,
    /// Every category in the filtered records, in first-seen order.
    pub categories: Vec<String>,
    /// The color policy for the categories.
    pub palette: ColorPalette,
}

impl ChartView {
    /// The color to draw `category` with.
    pub fn color_of(&self, category: &str) -> &ColorToken {
        self.palette.color_of(category)
    }
}

/// Filters a dataset, reusing the previous result when nothing relevant changed.
#[derive(Debug)]
struct FilterStage {
    cache: MemoCache<Vec<Record>>,
}

impl FilterStage {
    fn new(cache_capacity: usize) -> Self {
        Self {
            cache: MemoCache::new(cache_capacity),
        }
    }

    fn run(
        &mut self,
        dataset: Option<&Dataset>,
        criteria: &FilterCriteria,
        context: &ViewContext,
    ) -> Result<Arc<Vec<Record>>, Error> {
        let Some(dataset) = dataset else {
            return Ok(Arc::new(Vec::new()));
        };

        let key = CacheKey::new(dataset.version(), &(criteria, context))?;

        Ok(self
            .cache
            .get_or_compute(key, || filter(dataset.records(), criteria, context)))
    }
}

/// A searchable, filterable, paginated list view such as transfers or API keys.
///
/// Filter results are cached per dataset, criteria and [ViewContext]. Build
/// the context once per render cycle and pass the same one to every
/// `recompute`: a fresh [ViewContext::now_in] carries a new `now` and always
/// misses the cache.
#[derive(Debug)]
pub struct TableView {
    config: ViewConfig,
    filter_stage: FilterStage,
}

impl TableView {
    /// Create a table view that caches up to `cache_capacity` filter results.
    pub fn new(config: ViewConfig, cache_capacity: usize) -> Self {
        Self {
            config,
            filter_stage: FilterStage::new(cache_capacity),
        }
    }

    /// The view's configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Compute the table for the given inputs.
    ///
    /// A `None` dataset (nothing fetched yet) is treated as an empty one.
    ///
    /// # Errors
    /// Returns [Error::JsonSerialization] if the criteria cannot be serialized
    /// into a cache key.
    pub fn recompute(
        &mut self,
        dataset: Option<&Dataset>,
        criteria: &FilterCriteria,
        page: PageRequest,
        context: &ViewContext,
    ) -> Result<FilteredView, Error> {
        let filtered = self.filter_stage.run(dataset, criteria, context)?;
        let page_result = paginate(&filtered, page);

        tracing::debug!(
            "recomputed {} view: {} matching records, page {} of {}",
            self.config.key,
            filtered.len(),
            page.page,
            page_result.page_count()
        );

        Ok(FilteredView {
            total_count: filtered.len(),
            filtered_rows: filtered.as_ref().clone(),
            page_result,
        })
    }
}

/// The analytics view: filtered records bucketed into a time series.
///
/// Caches like [TableView], so the same [ViewContext] should be reused across
/// a render cycle for switching periods to hit the cache.
#[derive(Debug)]
pub struct AnalyticsView {
    config: ViewConfig,
    category_field: FieldPath,
    amount_field: FieldPath,
    palette: ColorPalette,
    filter_stage: FilterStage,
    charts: MemoCache<ChartView>,
}

impl AnalyticsView {
    /// Create an analytics view that caches up to `cache_capacity` results per stage.
    ///
    /// # Errors
    /// Returns [Error::MissingField] if the view's config has no amount field,
    /// category field or primary category.
    pub fn new(config: ViewConfig, cache_capacity: usize) -> Result<Self, Error> {
        let missing = |field| Error::MissingField {
            view: config.key.to_string(),
            field,
        };

        let category_field = config
            .fields
            .category
            .clone()
            .ok_or_else(|| missing("category field"))?;
        let amount_field = config
            .fields
            .amount
            .clone()
            .ok_or_else(|| missing("amount field"))?;
        let palette = config.palette().ok_or_else(|| missing("primary category"))?;

        Ok(Self {
            config,
            category_field,
            amount_field,
            palette,
            filter_stage: FilterStage::new(cache_capacity),
            charts: MemoCache::new(cache_capacity),
        })
    }

    /// The view's configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Compute the chart for the given inputs.
    ///
    /// A `None` dataset (nothing fetched yet) is treated as an empty one.
    ///
    /// # Errors
    /// Returns [Error::JsonSerialization] if the inputs cannot be serialized
    /// into a cache key.
    pub fn recompute(
        &mut self,
        dataset: Option<&Dataset>,
        criteria: &FilterCriteria,
        period: Period,
        context: &ViewContext,
    ) -> Result<Arc<ChartView>, Error> {
        let Some(dataset) = dataset else {
            return Ok(Arc::new(ChartView {
                series_data: Vec::new(),
                categories: Vec::new(),
                palette: self.palette.clone(),
            }));
        };

        let filtered = self.filter_stage.run(Some(dataset), criteria, context)?;
        let key = CacheKey::new(dataset.version(), &(criteria, context, period))?;

        let chart = self.charts.get_or_compute(key, || {
            let series_data = aggregate(
                &filtered,
                period,
                &criteria.date_field,
                &self.category_field,
                &self.amount_field,
                context.offset,
            );
            let series = build_series(&filtered, &self.category_field, self.palette.clone());

            tracing::debug!(
                "recomputed {} chart: {} {period} buckets, {} categories",
                self.config.key,
                series_data.len(),
                series.categories.len()
            );

            ChartView {
                series_data,
                categories: series.categories,
                palette: series.palette,
            }
        });

        Ok(chart)
    }
}

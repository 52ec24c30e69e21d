use chrono::{Local, NaiveDate};

use bms_dash::data::model::{CellValue, DATE_FORMAT};
use bms_dash::{Dataset, FilterCriteria, ViewEngine, ViewResult};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub engine: ViewEngine,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<SourcedDataset>,

    /// Text typed in the battery id box.
    pub battery_input: String,

    /// Date range bounds; a bound is only used while its box is ticked.
    pub start_enabled: bool,
    pub start_date: NaiveDate,
    pub end_enabled: bool,
    pub end_date: NaiveDate,

    /// Last computed view (table rows + chart series).
    pub view: ViewResult,

    /// Colours for the battery id values.
    pub color_map: Option<ColorMap>,

    /// Last failed upload; cleared by the next successful one.
    pub load_error: Option<String>,

    /// Error of the last view computation; cleared by the next success.
    pub filter_error: Option<String>,
}

/// A dataset together with the name of the file it came from.
pub struct SourcedDataset {
    pub name: String,
    pub data: Dataset,
}

impl AppState {
    pub fn new(engine: ViewEngine) -> Self {
        let today = Local::now().date_naive();
        Self {
            engine,
            dataset: None,
            battery_input: String::new(),
            start_enabled: false,
            start_date: today,
            end_enabled: false,
            end_date: today,
            view: ViewResult::default(),
            color_map: None,
            load_error: None,
            filter_error: None,
        }
    }

    /// Ingest a newly loaded dataset, reset the filters and recompute.
    pub fn set_dataset(&mut self, name: String, dataset: Dataset) {
        let battery_col = self.engine.columns().battery_id.clone();
        self.color_map = dataset
            .unique_values
            .get(&battery_col)
            .map(|vals| ColorMap::new(&battery_col, vals));

        self.dataset = Some(SourcedDataset {
            name,
            data: dataset,
        });
        self.load_error = None;
        self.reset_filters();
    }

    /// Record a failed upload. The previous dataset stays loaded.
    pub fn set_load_error(&mut self, message: String) {
        self.load_error = Some(message);
    }

    /// Filter criteria as currently entered in the controls.
    pub fn criteria(&self) -> FilterCriteria {
        let bound = |enabled: bool, date: NaiveDate| {
            enabled.then(|| date.format(DATE_FORMAT).to_string())
        };
        FilterCriteria {
            battery_id: Some(self.battery_input.clone()).filter(|s| !s.is_empty()),
            start_date: bound(self.start_enabled, self.start_date),
            end_date: bound(self.end_enabled, self.end_date),
        }
    }

    /// Recompute the view after a dataset or filter change.
    pub fn refresh(&mut self) {
        let criteria = self.criteria();
        let dataset = self.dataset.as_ref().map(|d| &d.data);
        match self.engine.compute(dataset, &criteria) {
            Ok(view) => {
                self.view = view;
                self.filter_error = None;
            }
            Err(e) => {
                log::warn!("Filter failed: {e}");
                self.view = ViewResult::default();
                self.filter_error = Some(format!("Filter error: {e}"));
            }
        }
    }

    /// Clear the battery id and the date bounds.
    ///
    /// The date pickers are moved to the first and last day in the data.
    pub fn reset_filters(&mut self) {
        self.battery_input.clear();
        self.start_enabled = false;
        self.end_enabled = false;
        if let Some((first, last)) = self.date_extent() {
            self.start_date = first;
            self.end_date = last;
        }
        self.refresh();
    }

    /// Earliest and latest date in the date column, if any.
    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        let ds = &self.dataset.as_ref()?.data;
        let mut dates = ds
            .distinct(&self.engine.columns().date)
            .into_iter()
            .filter_map(|v| match v {
                CellValue::Date(d) => Some(*d),
                _ => None,
            });
        let first = dates.next()?;
        let last = dates.last().unwrap_or(first);
        Some((first, last))
    }

    /// Known battery ids, for the dropdown.
    pub fn battery_ids(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|d| {
                d.data
                    .distinct(&self.engine.columns().battery_id)
                    .into_iter()
                    .map(|v| v.as_text().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bms_dash::Row;

    fn dataset() -> Dataset {
        let mut rows = Vec::new();
        for (id, day) in [("A1", 1), ("A2", 2), ("A1", 3)] {
            let mut row = Row::new();
            row.insert("Battery ID".into(), CellValue::Text(id.into()));
            row.insert(
                "Date".into(),
                CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, day).unwrap()),
            );
            rows.push(row);
        }
        Dataset::from_rows(vec!["Battery ID".into(), "Date".into()], rows)
    }

    #[test]
    fn test_set_dataset_shows_everything() {
        let mut state = AppState::new(ViewEngine::default());
        state.set_dataset("log.csv".into(), dataset());
        assert_eq!(state.view.table.len(), 3);
        assert_eq!(state.battery_ids(), vec!["A1", "A2"]);
        assert_eq!(state.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(state.end_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert!(state.color_map.is_some());
        assert!(state.view.soc_vs_time.is_none());
    }

    #[test]
    fn test_criteria_follow_controls() {
        let mut state = AppState::new(ViewEngine::default());
        state.set_dataset("log.csv".into(), dataset());

        state.battery_input = "A1".into();
        state.refresh();
        assert_eq!(state.view.table.len(), 2);

        // One bound ticked: no date filtering.
        state.start_enabled = true;
        state.start_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        state.refresh();
        assert_eq!(state.view.table.len(), 2);

        state.end_enabled = true;
        state.refresh();
        assert_eq!(state.criteria().end_date.as_deref(), Some("2024-01-03"));
        assert_eq!(state.view.table.len(), 1);

        state.reset_filters();
        assert_eq!(state.criteria(), FilterCriteria::default());
        assert_eq!(state.view.table.len(), 3);
    }

    #[test]
    fn test_no_dataset_is_an_empty_view() {
        let mut state = AppState::new(ViewEngine::default());
        state.battery_input = "A1".into();
        state.refresh();
        assert!(state.view.table.is_empty());
        assert!(state.filter_error.is_none());
    }

    #[test]
    fn test_upload_error_outlives_filter_edits() {
        let mut state = AppState::new(ViewEngine::default());
        state.set_dataset("log.csv".into(), dataset());
        state.set_load_error("Error: parsing JSON".into());

        state.battery_input = "A2".into();
        state.refresh();
        assert_eq!(state.load_error.as_deref(), Some("Error: parsing JSON"));
        assert_eq!(state.view.table.len(), 1);

        state.set_dataset("other.csv".into(), dataset());
        assert!(state.load_error.is_none());
    }

    #[test]
    fn test_filter_error_clears_on_success() {
        let mut rows = Vec::new();
        let mut row = Row::new();
        row.insert("Battery ID".into(), CellValue::Text("A1".into()));
        row.insert("Date".into(), CellValue::Integer(20240101));
        rows.push(row);
        let ds = Dataset::from_rows(vec!["Battery ID".into(), "Date".into()], rows);

        let mut state = AppState::new(ViewEngine::default());
        state.set_dataset("log.csv".into(), ds);
        state.start_enabled = true;
        state.end_enabled = true;
        state.refresh();
        assert!(state.filter_error.is_some());
        assert!(state.view.table.is_empty());

        state.reset_filters();
        assert!(state.filter_error.is_none());
        assert_eq!(state.view.table.len(), 1);
    }
}

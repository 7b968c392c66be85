use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::DataConfig;
use crate::dataset::{DataCache, Datasets};
use crate::error::DataError;
use crate::selector::filter_by_name_substring;
use crate::view::{DashboardView, assemble_dashboard};

const MAX_LOGS: usize = 200;

pub struct AppState {
    pub cache: DataCache,
    pub datasets: Datasets,
    pub top_n: usize,
    pub search: String,
    pub search_active: bool,
    pub selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl AppState {
    pub fn load(config: &DataConfig) -> Result<Self, DataError> {
        let mut cache = DataCache::new();
        let datasets = Datasets::load(&mut cache, config)?;
        Ok(Self::with_cache(cache, datasets, config.top_n))
    }

    pub fn new(datasets: Datasets, top_n: usize) -> Self {
        Self::with_cache(DataCache::new(), datasets, top_n)
    }

    pub fn with_cache(cache: DataCache, datasets: Datasets, top_n: usize) -> Self {
        Self {
            cache,
            datasets,
            top_n,
            search: String::new(),
            search_active: false,
            selected: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            export: ExportState::new(),
        }
    }

    pub fn filtered_names(&self) -> Vec<String> {
        filter_by_name_substring(self.datasets.master.names(), &self.search)
    }

    pub fn selected_champion(&self) -> Option<String> {
        let names = self.filtered_names();
        names
            .get(self.selected.min(names.len().saturating_sub(1)))
            .cloned()
    }

    /// Recomputes the dashboard for the current selection from the loaded
    /// tables. `Ok(None)` means there is no selection to show.
    pub fn dashboard(&self) -> Result<Option<DashboardView>, DataError> {
        let Some(champion) = self.selected_champion() else {
            return Ok(None);
        };
        assemble_dashboard(&self.datasets, &champion, self.top_n).map(Some)
    }

    pub fn select_next(&mut self) {
        let total = self.filtered_names().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.filtered_names().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_names().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_search_char(&mut self, ch: char) {
        let keep = self.selected_champion();
        self.search.push(ch);
        self.reselect(keep);
    }

    pub fn pop_search_char(&mut self) {
        let keep = self.selected_champion();
        self.search.pop();
        self.reselect(keep);
    }

    pub fn clear_search(&mut self) {
        let keep = self.selected_champion();
        self.search.clear();
        self.reselect(keep);
    }

    // Keeps the cursor on the previously selected champion when it survives
    // the new filter.
    fn reselect(&mut self, keep: Option<String>) {
        if let Some(name) = keep {
            let names = self.filtered_names();
            if let Some(pos) = names.iter().position(|n| *n == name) {
                self.selected = pos;
                return;
            }
        }
        self.selected = 0;
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if msg.starts_with("[WARN]") {
            warn!("{msg}");
        } else {
            info!("{msg}");
        }
        self.logs.push_back(msg);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportState {
    pub last_path: Option<PathBuf>,
    pub last_error: Option<String>,
    pub done_at: Option<Instant>,
}

impl ExportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish_ok(&mut self, path: PathBuf) {
        self.last_path = Some(path);
        self.last_error = None;
        self.done_at = Some(Instant::now());
    }

    pub fn finish_err(&mut self, err: String) {
        self.last_path = None;
        self.last_error = Some(err);
        self.done_at = Some(Instant::now());
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        let Some(done_at) = self.done_at else {
            return;
        };
        if now.duration_since(done_at).as_secs() >= keep_secs {
            *self = Self::default();
        }
    }

    pub fn status_line(&self) -> Option<String> {
        if let Some(err) = &self.last_error {
            return Some(format!("Export failed: {err}"));
        }
        self.last_path
            .as_ref()
            .map(|path| format!("Exported {}", path.display()))
    }
}

use std::env;
use std::path::{Path, PathBuf};

/// Notebook sandboxes mount uploaded data here.
pub const SANDBOX_DATA_DIR: &str = "/content";

pub const PRIMARY_CANDIDATES: [&str; 2] = ["champion_master_plus.csv", "champion_master.csv"];
pub const SPELL_SUMMARY_FILE: &str = "spell_summary.csv";
pub const ITEM_SUMMARY_FILE: &str = "item_summary.csv";

const DEFAULT_TOP_N: usize = 10;
const MAX_TOP_N: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub top_n: usize,
    pub log_file: Option<PathBuf>,
}

impl DataConfig {
    pub fn from_env() -> Self {
        let top_n = env::var("ARAM_TOP_N").ok();
        Self::from_parts(
            env_path("ARAM_DATA_DIR"),
            env_path("ARAM_EXPORT_DIR"),
            top_n.as_deref(),
            env_path("ARAM_LOG_FILE"),
        )
    }

    fn from_parts(
        data_dir: Option<PathBuf>,
        export_dir: Option<PathBuf>,
        top_n: Option<&str>,
        log_file: Option<PathBuf>,
    ) -> Self {
        let data_dir = resolve_data_dir(data_dir);
        Self {
            export_dir: export_dir.unwrap_or_else(|| data_dir.clone()),
            data_dir,
            top_n: parse_top_n(top_n),
            log_file,
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let data_dir = dir.into();
        Self {
            export_dir: data_dir.clone(),
            data_dir,
            top_n: DEFAULT_TOP_N,
            log_file: None,
        }
    }

    pub fn primary_candidates(&self) -> Vec<PathBuf> {
        PRIMARY_CANDIDATES
            .iter()
            .map(|name| self.data_dir.join(name))
            .collect()
    }

    pub fn spell_summary_path(&self) -> PathBuf {
        self.data_dir.join(SPELL_SUMMARY_FILE)
    }

    pub fn item_summary_path(&self) -> PathBuf {
        self.data_dir.join(ITEM_SUMMARY_FILE)
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn detect_base_dir() -> PathBuf {
    if Path::new(SANDBOX_DATA_DIR).exists() {
        PathBuf::from(SANDBOX_DATA_DIR)
    } else {
        PathBuf::from(".")
    }
}

fn resolve_data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(detect_base_dir)
}

fn parse_top_n(raw: Option<&str>) -> usize {
    raw.and_then(|val| val.trim().parse::<usize>().ok())
        .unwrap_or(DEFAULT_TOP_N)
        .clamp(1, MAX_TOP_N)
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::{
        DataConfig, PRIMARY_CANDIDATES, detect_base_dir, parse_top_n, resolve_data_dir,
    };
    use std::path::PathBuf;

    #[test]
    fn candidates_keep_preference_order() {
        let config = DataConfig::with_dir("/data/aram");
        let candidates = config.primary_candidates();
        assert_eq!(candidates.len(), PRIMARY_CANDIDATES.len());
        assert_eq!(
            candidates[0],
            PathBuf::from("/data/aram/champion_master_plus.csv")
        );
        assert_eq!(candidates[1], PathBuf::from("/data/aram/champion_master.csv"));
        assert_eq!(
            config.spell_summary_path(),
            PathBuf::from("/data/aram/spell_summary.csv")
        );
        assert_eq!(config.export_dir, config.data_dir);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn top_n_defaults_and_clamps() {
        assert_eq!(parse_top_n(None), 10);
        assert_eq!(parse_top_n(Some("abc")), 10);
        assert_eq!(parse_top_n(Some("")), 10);
        assert_eq!(parse_top_n(Some("-3")), 10);
        assert_eq!(parse_top_n(Some("0")), 1);
        assert_eq!(parse_top_n(Some("999")), 50);
        assert_eq!(parse_top_n(Some(" 7 ")), 7);
    }

    #[test]
    fn data_dir_override_beats_detection() {
        assert_eq!(
            resolve_data_dir(Some(PathBuf::from("/srv/aram"))),
            PathBuf::from("/srv/aram")
        );
        assert_eq!(resolve_data_dir(None), detect_base_dir());
    }

    #[test]
    fn export_dir_follows_data_dir_unless_set() {
        let config = DataConfig::from_parts(Some(PathBuf::from("/srv/aram")), None, Some("12"), None);
        assert_eq!(config.data_dir, PathBuf::from("/srv/aram"));
        assert_eq!(config.export_dir, PathBuf::from("/srv/aram"));
        assert_eq!(config.top_n, 12);
        assert!(config.log_file.is_none());

        let config = DataConfig::from_parts(
            Some(PathBuf::from("/srv/aram")),
            Some(PathBuf::from("/tmp/out")),
            None,
            Some(PathBuf::from("/tmp/aram.log")),
        );
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/aram.log")));
    }
}

// OUI Vendor Index Module
//
// Loads the vendor prefix table and the vendor localization table from two
// resource locations, then answers MAC address -> manufacturer queries by
// longest-prefix match over 36-, 28- and 24-bit organizational identifiers.
//
// Lifecycle: Loading -> Ready | Failed, entered once. Queries never block;
// before the index is ready they simply find nothing.

mod download;
mod parser;

pub use download::{Fetch, ResourceFetcher};
pub use parser::{
    normalize_mac, parse_localization, parse_prefix_table, LocalizationTable, ParseStats,
    PrefixTable, PREFIX_LENGTHS,
};

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::{LocalizationPolicy, SourceConfig};
use crate::error::{Result, VendorError};

/// Result of a successful vendor lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorMatch {
    pub vendor: String,
    /// Localized display name, when the localization table has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_localized: Option<String>,
}

/// Both loaded tables
#[derive(Debug, Default)]
struct VendorTables {
    prefixes: PrefixTable,
    localization: LocalizationTable,
}

/// Query handle over a loaded index
///
/// Cheap to clone; all clones share the same immutable tables.
#[derive(Debug, Clone)]
pub struct VendorQuery {
    tables: Arc<VendorTables>,
}

impl VendorQuery {
    fn new(prefixes: PrefixTable, localization: LocalizationTable) -> Self {
        Self {
            tables: Arc::new(VendorTables { prefixes, localization }),
        }
    }

    /// Look up the manufacturer of a MAC address
    ///
    /// Accepts colon-, hyphen- or un-separated hex in any case. Returns None
    /// for empty input or when no 9-, 7- or 6-digit prefix is known.
    pub fn query(&self, address: &str) -> Option<VendorMatch> {
        if address.is_empty() {
            return None;
        }
        let mac = normalize_mac(address);
        let vendor = self.tables.prefixes.longest_match(&mac)?;
        Some(VendorMatch {
            vendor: vendor.to_string(),
            vendor_localized: self.tables.localization.get(vendor).cloned(),
        })
    }

    pub fn prefix_count(&self) -> usize {
        self.tables.prefixes.len()
    }

    pub fn localization_count(&self) -> usize {
        self.tables.localization.len()
    }
}

/// Published load outcome
#[derive(Debug, Clone)]
enum LoadState {
    Loading,
    Ready(VendorQuery),
    Failed(Arc<VendorError>),
}

/// Coarse view of the load state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed,
}

/// MAC vendor index
///
/// Construct once and share; clones observe the same load.
#[derive(Debug, Clone)]
pub struct VendorIndex {
    state: Arc<watch::Sender<LoadState>>,
}

impl VendorIndex {
    /// Start loading from `config` with the default HTTP/file fetcher
    ///
    /// Must be called within a tokio runtime; the load runs on a spawned task.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let fetcher = ResourceFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Start loading from `config` through a custom fetcher
    pub fn with_fetcher(config: SourceConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let (tx, _) = watch::channel(LoadState::Loading);
        let state = Arc::new(tx);

        let publisher = state.clone();
        tokio::spawn(async move {
            // Inner task so a panic while parsing still settles the outcome
            let outcome = match tokio::spawn(load_tables(config, fetcher)).await {
                Ok(result) => result,
                Err(e) => Err(VendorError::LoadTask(e.to_string())),
            };
            let next = match outcome {
                Ok(query) => LoadState::Ready(query),
                Err(e) => {
                    log::error!("Vendor index load failed: {}", e);
                    LoadState::Failed(Arc::new(e))
                }
            };
            publisher.send_replace(next);
        });

        Self { state }
    }

    /// Build an index that is ready immediately from in-memory dataset text
    pub fn from_sources(prefix_data: &str, localization_data: &str) -> Result<Self> {
        let (prefixes, _) = parse_prefix_table(prefix_data);
        let localization = parse_localization(localization_data)?;
        Ok(Self::from_tables(prefixes, localization))
    }

    /// Build an index that is ready immediately from already-built tables
    pub fn from_tables(prefixes: PrefixTable, localization: LocalizationTable) -> Self {
        let (tx, _) = watch::channel(LoadState::Ready(VendorQuery::new(prefixes, localization)));
        Self { state: Arc::new(tx) }
    }

    pub fn status(&self) -> LoadStatus {
        match &*self.state.borrow() {
            LoadState::Loading => LoadStatus::Loading,
            LoadState::Ready(_) => LoadStatus::Ready,
            LoadState::Failed(_) => LoadStatus::Failed,
        }
    }

    /// Non-blocking lookup; None until the index is ready
    pub fn query(&self, address: &str) -> Option<VendorMatch> {
        match &*self.state.borrow() {
            LoadState::Ready(query) => query.query(address),
            _ => None,
        }
    }

    /// Wait for the load to settle
    ///
    /// Resolves immediately if it already has. Every caller sees the same
    /// outcome.
    pub async fn ready(&self) -> std::result::Result<VendorQuery, Arc<VendorError>> {
        let mut rx = self.state.subscribe();
        let settled = rx
            .wait_for(|state| !matches!(state, LoadState::Loading))
            .await
            .map_err(|e| Arc::new(VendorError::LoadTask(e.to_string())))?;

        match &*settled {
            LoadState::Ready(query) => Ok(query.clone()),
            LoadState::Failed(e) => Err(e.clone()),
            LoadState::Loading => unreachable!("wait_for only yields settled states"),
        }
    }

    /// Invoke `callback` once the load settles
    ///
    /// The callback always runs on a spawned task, never inside this call,
    /// even when the index is already ready.
    pub fn onready<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(std::result::Result<VendorQuery, Arc<VendorError>>) + Send + 'static,
    {
        let index = self.clone();
        tokio::spawn(async move {
            let outcome = index.ready().await;
            callback(outcome);
        })
    }
}

async fn load_tables(config: SourceConfig, fetcher: Arc<dyn Fetch>) -> Result<VendorQuery> {
    if !config.start_delay.is_zero() {
        tokio::time::sleep(config.start_delay).await;
    }

    let prefix_uri = config.prefix_uri();
    let localization_uri = config.localization_uri();
    log::info!("Loading vendor index from {} and {}", prefix_uri, localization_uri);

    let (prefix_data, localization_data) = tokio::join!(
        fetcher.fetch(&prefix_uri),
        fetcher.fetch(&localization_uri)
    );

    let (prefixes, stats) = parse_prefix_table(&prefix_data?);

    let localization = match localization_data.and_then(|data| parse_localization(&data)) {
        Ok(table) => table,
        Err(e) if config.localization_policy == LocalizationPolicy::Optional => {
            log::warn!("Localization unavailable, serving vendor names only: {}", e);
            LocalizationTable::new()
        }
        Err(e) => return Err(e),
    };

    let [ma_s, ma_m, ma_l] = prefixes.counts_by_length();
    log::info!(
        "Vendor index ready: {} records from {} lines, {} skipped; {} prefixes ({} MA-S, {} MA-M, {} MA-L), {} localized names",
        stats.records,
        stats.lines,
        stats.skipped,
        prefixes.len(),
        ma_s,
        ma_m,
        ma_l,
        localization.len()
    );

    Ok(VendorQuery::new(prefixes, localization))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    const PREFIXES: &str = "AABBCC\tAcme Corp\n";
    const LOCALIZED: &str = r#"{"Acme Corp":"爱克姆公司"}"#;

    /// In-memory fetcher; unknown locations fail like a 404
    struct MemoryFetcher {
        resources: HashMap<String, String>,
    }

    impl MemoryFetcher {
        fn new(resources: &[(&str, &str)]) -> Arc<dyn Fetch> {
            Arc::new(Self {
                resources: resources
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl Fetch for MemoryFetcher {
        async fn fetch(&self, location: &str) -> Result<String> {
            self.resources.get(location).cloned().ok_or_else(|| VendorError::Io {
                location: location.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    fn config() -> SourceConfig {
        SourceConfig::from_locations("oui.csv", "oui_cn.json").with_start_delay(Duration::ZERO)
    }

    #[test]
    fn test_query_with_localization() {
        let index = VendorIndex::from_sources(PREFIXES, LOCALIZED).unwrap();
        let result = index.query("AA:BB:CC:11:22:33").unwrap();
        assert_eq!(result.vendor, "Acme Corp");
        assert_eq!(result.vendor_localized.as_deref(), Some("爱克姆公司"));
    }

    #[test]
    fn test_query_without_localization() {
        let index = VendorIndex::from_sources(PREFIXES, "{}").unwrap();
        let result = index.query("AA:BB:CC:11:22:33").unwrap();
        assert_eq!(result.vendor, "Acme Corp");
        assert_eq!(result.vendor_localized, None);
    }

    #[test]
    fn test_query_empty_and_unknown() {
        let index = VendorIndex::from_sources(PREFIXES, LOCALIZED).unwrap();
        assert_eq!(index.query(""), None);
        assert_eq!(index.query("00:11:22:33:44:55"), None);
        assert_eq!(index.query("AA:BB"), None);
    }

    #[test]
    fn test_from_sources_rejects_bad_localization() {
        assert!(VendorIndex::from_sources(PREFIXES, "{").is_err());
    }

    #[test]
    fn test_vendor_match_serialization() {
        let index = VendorIndex::from_sources(PREFIXES, "{}").unwrap();
        let json = serde_json::to_string(&index.query("AABBCC000000").unwrap()).unwrap();
        assert_eq!(json, r#"{"vendor":"Acme Corp"}"#);
    }

    #[tokio::test]
    async fn test_load_through_fetcher() {
        let fetcher = MemoryFetcher::new(&[("oui.csv", PREFIXES), ("oui_cn.json", LOCALIZED)]);
        let index = VendorIndex::with_fetcher(config(), fetcher);

        let query = index.ready().await.unwrap();
        assert_eq!(query.prefix_count(), 1);
        assert_eq!(query.localization_count(), 1);
        assert_eq!(index.status(), LoadStatus::Ready);
        assert_eq!(index.query("aa-bb-cc-11-22-33"), query.query("AABBCC112233"));
    }

    #[tokio::test]
    async fn test_data_version_reaches_fetcher() {
        let fetcher = MemoryFetcher::new(&[
            ("oui.csv?v=7", PREFIXES),
            ("oui_cn.json?v=7", LOCALIZED),
        ]);
        let index = VendorIndex::with_fetcher(config().with_data_version("7"), fetcher);
        assert!(index.ready().await.is_ok());
    }

    #[tokio::test]
    async fn test_query_before_ready_is_none() {
        let fetcher = MemoryFetcher::new(&[("oui.csv", PREFIXES), ("oui_cn.json", LOCALIZED)]);
        let index = VendorIndex::with_fetcher(
            config().with_start_delay(Duration::from_millis(200)),
            fetcher,
        );

        assert_eq!(index.status(), LoadStatus::Loading);
        assert_eq!(index.query("AA:BB:CC:11:22:33"), None);

        index.ready().await.unwrap();
        assert!(index.query("AA:BB:CC:11:22:33").is_some());
    }

    #[tokio::test]
    async fn test_prefix_fetch_failure_fails_load() {
        let fetcher = MemoryFetcher::new(&[("oui_cn.json", LOCALIZED)]);
        let index = VendorIndex::with_fetcher(config(), fetcher);

        assert!(index.ready().await.is_err());
        assert_eq!(index.status(), LoadStatus::Failed);
        assert_eq!(index.query("AA:BB:CC:11:22:33"), None);
    }

    #[tokio::test]
    async fn test_required_localization_failure_fails_load() {
        let fetcher = MemoryFetcher::new(&[("oui.csv", PREFIXES), ("oui_cn.json", "<html>")]);
        let index = VendorIndex::with_fetcher(config(), fetcher);

        let err = index.ready().await.unwrap_err();
        assert!(matches!(*err, VendorError::Localization(_)));
    }

    #[tokio::test]
    async fn test_optional_localization_degrades() {
        let fetcher = MemoryFetcher::new(&[("oui.csv", PREFIXES)]);
        let index = VendorIndex::with_fetcher(
            config().with_localization_policy(LocalizationPolicy::Optional),
            fetcher,
        );

        let query = index.ready().await.unwrap();
        let result = query.query("AA:BB:CC:11:22:33").unwrap();
        assert_eq!(result.vendor, "Acme Corp");
        assert_eq!(result.vendor_localized, None);
    }

    #[tokio::test]
    async fn test_onready_runs_for_late_observers() {
        let index = VendorIndex::from_sources(PREFIXES, LOCALIZED).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();

        for _ in 0..3 {
            let tx = tx.clone();
            index
                .onready(move |outcome| {
                    let vendor = outcome.unwrap().query("AABBCC112233").unwrap().vendor;
                    tx.send(vendor).unwrap();
                })
                .await
                .unwrap();
        }
        drop(tx);

        let seen: Vec<String> = rx.iter().collect();
        assert_eq!(seen, vec!["Acme Corp"; 3]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_onready_is_not_reentrant() {
        let index = VendorIndex::from_sources(PREFIXES, LOCALIZED).unwrap();
        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let flag = called.clone();
        let handle = index.onready(move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        });
        // Current-thread runtime: the spawned callback cannot have run yet
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));

        handle.await.unwrap();
        assert!(called.load(std::sync::atomic::Ordering::SeqCst));
    }
}

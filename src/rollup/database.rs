use super::patterns::{feature_combos, feature_patterns, FeatureCombo};
use super::registry::{normalize_features, FeatureRegistry};
use super::RollupError;
use crate::data::{Row, Value};
use crate::storage::key::{field_name, split_key};
use crate::storage::{
    create_schema, ColumnFamily, Keyspace, KeyspaceStats, Schema, StorageError, SEPARATOR,
};
use crate::time::{TimeBucketer, UtcCalendar};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

pub const INTERVAL_MONTH: &str = "month";

pub const MONTH_UNIQUE: &str = "month_unique";
pub const MONTH_TOTAL: &str = "month_total";
pub const WEEK_TOTAL: &str = "week_total";
pub const DAY_TOTAL: &str = "day_total";

const VISITS: &str = "visits";
const VISITS_INCREMENT: &str = "visits+1";

const SITE: &str = "site";
const INTERVAL_SIZE: &str = "intervalSize";
const INTERVAL_START: &str = "intervalStart";
const VISITOR_ID: &str = "visitorId";
const MONTH_START: &str = "monthStart";
const METRIC: &str = "metric";

/// Column family names for a site
pub fn raw_table_name(site: &str) -> String {
    format!("{}_cf_raw_data", site)
}

pub fn monthly_table_name(site: &str) -> String {
    format!("{}_cf_monthly_data", site)
}

/// Raw table: one partition per (site, month, visitor, feature combo), no clustering
pub fn raw_schema(features: &[String]) -> Result<Schema, StorageError> {
    let partition = [SITE, INTERVAL_SIZE, INTERVAL_START, VISITOR_ID]
        .into_iter()
        .map(String::from)
        .chain(features.iter().cloned());
    create_schema(partition, Vec::<String>::new())
}

/// Monthly table: one partition per (site, month, feature combo), rows per (metric, interval)
pub fn monthly_schema(features: &[String]) -> Result<Schema, StorageError> {
    let partition = [SITE, MONTH_START]
        .into_iter()
        .map(String::from)
        .chain(features.iter().cloned());
    create_schema(partition, [METRIC, INTERVAL_START])
}

#[derive(Debug)]
struct SiteTables {
    features: Arc<[String]>,
    raw: Arc<ColumnFamily>,
    monthly: Arc<ColumnFamily>,
}

/// Result of tracking one event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TrackOutcome {
    /// Feature combos the event was fanned out to
    pub combos: usize,
    /// Combos in which the visitor was seen for the first time this month
    pub unique: usize,
}

/// Per-site raw and monthly tables plus the fan-out that keeps them in step
pub struct RollupDatabase {
    keyspace: Keyspace,
    registry: FeatureRegistry,
    sites: DashMap<String, Arc<SiteTables>>,
    bucketer: Arc<dyn TimeBucketer>,
}

impl RollupDatabase {
    pub fn new() -> Self {
        Self::with_bucketer(Arc::new(UtcCalendar))
    }

    pub fn with_bucketer(bucketer: Arc<dyn TimeBucketer>) -> Self {
        Self {
            keyspace: Keyspace::new(),
            registry: FeatureRegistry::new(),
            sites: DashMap::new(),
            bucketer,
        }
    }

    /// Register a site and create its tables.
    ///
    /// Registering again with the same features is a no-op; with different features it
    /// fails because table schemas cannot change.
    pub fn register_site<I, S>(&self, site: &str, features: I) -> Result<(), RollupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if site.is_empty() || site.contains(SEPARATOR) {
            return Err(RollupError::InvalidSiteId(site.to_string()));
        }

        let ordered = normalize_features(features)?;

        if let Some(existing) = self.sites.get(site) {
            if *existing.features == *ordered {
                return Ok(());
            }
        }

        let raw = self
            .keyspace
            .open_or_create(&raw_table_name(site), raw_schema(&ordered)?)?;
        let monthly = self
            .keyspace
            .open_or_create(&monthly_table_name(site), monthly_schema(&ordered)?)?;
        let features = self.registry.register_site(site, ordered)?;

        tracing::info!(
            "Registered site '{}' with features {:?} ({} projections per event)",
            site,
            features,
            feature_patterns(features.len()).len()
        );

        self.sites.insert(
            site.to_string(),
            Arc::new(SiteTables {
                features,
                raw,
                monthly,
            }),
        );
        Ok(())
    }

    /// Record one visit.
    ///
    /// For every feature combo the raw table's visit counter is bumped. When the combo's
    /// raw partition did not exist yet the visitor is new for that month and combo, and
    /// the monthly `month_unique` counter is incremented as well. Monthly, weekly and
    /// daily totals are incremented for every combo.
    pub fn track(
        &self,
        site: &str,
        timestamp: i64,
        visitor_id: &str,
        features: &HashMap<String, String>,
    ) -> Result<TrackOutcome, RollupError> {
        let tables = self.site_tables(site)?;
        let intervals = self.bucketer.bucket(timestamp)?;
        // Every key value is checked up front so a rejected event writes nothing
        check_key_values(&tables.features, visitor_id, features)?;
        let combos = feature_combos(&tables.features, features);

        let visit = visits_row(None);
        let mut outcome = TrackOutcome {
            combos: combos.len(),
            unique: 0,
        };

        for combo in &combos {
            let raw = raw_keys(site, intervals.month_start, visitor_id, combo);

            // The raw insert and the unique increment below are separate writes: a crash or
            // a concurrent tracker in between leaves the two tables out of step.
            let unique = if tables.raw.update_if_exists(&raw, &visit)? {
                false
            } else {
                tables.raw.update(&raw, &visit)?;
                true
            };

            let monthly = monthly_keys(site, intervals.month_start, combo);
            if unique {
                tables.monthly.update(
                    &monthly,
                    &visits_row(Some((MONTH_UNIQUE, intervals.month_start))),
                )?;
                outcome.unique += 1;
                tracing::trace!(
                    "First visit of '{}' to {} in month {} for {:?}",
                    visitor_id,
                    site,
                    intervals.month_start,
                    combo.entries()
                );
            }

            for (metric, start) in [
                (MONTH_TOTAL, intervals.month_start),
                (WEEK_TOTAL, intervals.week_start),
                (DAY_TOTAL, intervals.day_start),
            ] {
                tables
                    .monthly
                    .update(&monthly, &visits_row(Some((metric, start))))?;
            }
        }

        Ok(outcome)
    }

    /// Unique visitors in the month for a partial feature map (absent features are blank)
    pub fn monthly_uniques(
        &self,
        site: &str,
        month_start: i64,
        features: &HashMap<String, String>,
    ) -> Result<i64, RollupError> {
        self.monthly_counter(site, month_start, MONTH_UNIQUE, month_start, features)
    }

    /// Total visits in the month for a partial feature map
    pub fn monthly_total(
        &self,
        site: &str,
        month_start: i64,
        features: &HashMap<String, String>,
    ) -> Result<i64, RollupError> {
        self.monthly_counter(site, month_start, MONTH_TOTAL, month_start, features)
    }

    /// Read one counter of the monthly table, 0 when it was never written
    pub fn monthly_counter(
        &self,
        site: &str,
        month_start: i64,
        metric: &str,
        interval_start: i64,
        features: &HashMap<String, String>,
    ) -> Result<i64, RollupError> {
        let tables = self.site_tables(site)?;
        let combo = query_combo(site, &tables.features, features)?;

        let keys = monthly_keys(site, month_start, &combo);
        let columns = visits_row(Some((metric, interval_start)));

        let value = tables.monthly.select_one(&keys, &columns)?.found();
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Visits of one visitor in the month for a partial feature map
    pub fn visits(
        &self,
        site: &str,
        month_start: i64,
        visitor_id: &str,
        features: &HashMap<String, String>,
    ) -> Result<i64, RollupError> {
        let tables = self.site_tables(site)?;
        let combo = query_combo(site, &tables.features, features)?;

        let keys = raw_keys(site, month_start, visitor_id, &combo);
        let value = tables.raw.select_one(&keys, &visits_row(None))?.found();
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// `(intervalStart, visits)` for every interval of `metric` stored in the month's
    /// partition, in key order.
    ///
    /// Keys compare as strings, so interval starts only sort numerically while they share
    /// a digit width (epoch seconds do from 2001 to 2286).
    pub fn interval_totals(
        &self,
        site: &str,
        month_start: i64,
        metric: &str,
        features: &HashMap<String, String>,
    ) -> Result<Vec<(i64, i64)>, RollupError> {
        let tables = self.site_tables(site)?;
        let combo = query_combo(site, &tables.features, features)?;

        let keys = monthly_keys(site, month_start, &combo);
        let from = interval_row(metric, 0);
        let to = interval_row(metric, i64::MAX);

        let columns = tables
            .monthly
            .select_range(&keys, &from, &to)?
            .found()
            .unwrap_or_default();

        Ok(columns
            .into_iter()
            .filter(|(column, _)| field_name(column) == VISITS)
            .filter_map(|(column, value)| {
                let start = split_key(&column).nth(1)?.parse::<i64>().ok()?;
                Some((start, value.as_i64()?))
            })
            .collect())
    }

    /// Whether counts for exactly this subset of a site's features are maintained
    pub fn is_queryable(&self, site: &str, features: &[&str]) -> Result<bool, RollupError> {
        let tables = self.site_tables(site)?;

        let mut wanted = Vec::with_capacity(features.len());
        for name in features {
            match tables.features.iter().position(|f| f == name) {
                Some(position) => wanted.push(position),
                None => return Ok(false),
            }
        }
        wanted.sort_unstable();
        wanted.dedup();

        Ok(feature_patterns(tables.features.len())
            .iter()
            .any(|p| p.filled_positions().eq(wanted.iter().copied())))
    }

    /// Registered features of a site, in fan-out order
    pub fn site_features(&self, site: &str) -> Option<Arc<[String]>> {
        self.registry.features(site)
    }

    pub fn raw_table(&self, site: &str) -> Option<Arc<ColumnFamily>> {
        self.sites.get(site).map(|t| Arc::clone(&t.raw))
    }

    pub fn monthly_table(&self, site: &str) -> Option<Arc<ColumnFamily>> {
        self.sites.get(site).map(|t| Arc::clone(&t.monthly))
    }

    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    pub fn stats(&self) -> KeyspaceStats {
        self.keyspace.stats()
    }

    fn site_tables(&self, site: &str) -> Result<Arc<SiteTables>, RollupError> {
        self.sites
            .get(site)
            .map(|t| Arc::clone(t.value()))
            .ok_or_else(|| RollupError::UnknownSite(site.to_string()))
    }
}

impl Default for RollupDatabase {
    fn default() -> Self {
        Self::new()
    }
}

fn check_key_values(
    features: &[String],
    visitor_id: &str,
    values: &HashMap<String, String>,
) -> Result<(), StorageError> {
    let keyed = features
        .iter()
        .filter_map(|name| values.get(name).map(|value| (name.as_str(), value.as_str())));

    for (field, value) in std::iter::once((VISITOR_ID, visitor_id)).chain(keyed) {
        if value.contains(SEPARATOR) {
            return Err(StorageError::SeparatorInKey {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn combo_row(combo: &FeatureCombo) -> Row {
    combo
        .entries()
        .iter()
        .map(|(name, value)| (name.clone(), Value::text(value.as_str())))
        .collect()
}

fn raw_keys(site: &str, month_start: i64, visitor_id: &str, combo: &FeatureCombo) -> Row {
    let mut keys = combo_row(combo);
    keys.insert(SITE.to_string(), Value::text(site));
    keys.insert(INTERVAL_SIZE.to_string(), Value::text(INTERVAL_MONTH));
    keys.insert(INTERVAL_START.to_string(), Value::Int(month_start));
    keys.insert(VISITOR_ID.to_string(), Value::text(visitor_id));
    keys
}

fn monthly_keys(site: &str, month_start: i64, combo: &FeatureCombo) -> Row {
    let mut keys = combo_row(combo);
    keys.insert(SITE.to_string(), Value::text(site));
    keys.insert(MONTH_START.to_string(), Value::Int(month_start));
    keys
}

fn interval_row(metric: &str, start: i64) -> Row {
    let mut row = Row::new();
    row.insert(METRIC.to_string(), Value::text(metric));
    row.insert(INTERVAL_START.to_string(), Value::Int(start));
    row
}

/// `{visits: "visits+1"}`, clustered under `(metric, intervalStart)` when given
fn visits_row(clustering: Option<(&str, i64)>) -> Row {
    let mut row = clustering
        .map(|(metric, start)| interval_row(metric, start))
        .unwrap_or_default();
    row.insert(VISITS.to_string(), Value::text(VISITS_INCREMENT));
    row
}

/// Combo for a read: registered features present in `values` keep their value, the rest
/// are blank.
fn query_combo(
    site: &str,
    features: &[String],
    values: &HashMap<String, String>,
) -> Result<FeatureCombo, RollupError> {
    if let Some(unknown) = values.keys().find(|k| !features.iter().any(|f| f == *k)) {
        return Err(RollupError::UnknownFeature {
            site: site.to_string(),
            feature: unknown.clone(),
        });
    }
    Ok(FeatureCombo::partial(features, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::pattern_count;
    use crate::storage::StorageError;
    use crate::time::{to_epoch, Intervals, TimeError};

    const NOV_2018: i64 = 1541030400;

    fn features(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn database() -> RollupDatabase {
        let db = RollupDatabase::new();
        db.register_site("site1", ["referer", "landing_page"]).unwrap();
        db
    }

    fn event() -> HashMap<String, String> {
        features(&[("referer", "google.com"), ("landing_page", "/home")])
    }

    // 2018-11-07 03:40:50 UTC
    const TS: i64 = 1541562050;

    #[test]
    fn test_register_creates_tables() {
        let db = database();

        assert_eq!(
            db.keyspace().list(),
            vec!["site1_cf_monthly_data", "site1_cf_raw_data"]
        );

        let raw = db.raw_table("site1").unwrap();
        assert_eq!(
            raw.schema().partition_fields(),
            &["site", "intervalSize", "intervalStart", "visitorId", "landing_page", "referer"]
        );
        assert!(raw.schema().clustering_fields().is_empty());

        let monthly = db.monthly_table("site1").unwrap();
        assert_eq!(
            monthly.schema().partition_fields(),
            &["site", "monthStart", "landing_page", "referer"]
        );
        assert_eq!(monthly.schema().clustering_fields(), &["metric", "intervalStart"]);
    }

    #[test]
    fn test_register_idempotent_and_immutable() {
        let db = database();
        db.register_site("site1", ["landing_page", "referer"]).unwrap();

        assert!(matches!(
            db.register_site("site1", ["referer"]),
            Err(RollupError::Storage(StorageError::SchemaMismatch(_)))
        ));
        assert!(matches!(
            db.register_site("bad:site", ["referer"]),
            Err(RollupError::InvalidSiteId(_))
        ));
        assert!(matches!(
            db.register_site("site2", ["visitorId"]),
            Err(RollupError::ReservedFeatureName(_))
        ));
    }

    #[test]
    fn test_track_unknown_site() {
        let db = database();
        assert!(matches!(
            db.track("nope", TS, "v1", &event()),
            Err(RollupError::UnknownSite(_))
        ));
    }

    #[test]
    fn test_repeat_visit_counted_once() {
        let db = database();

        let first = db.track("site1", TS, "v1", &event()).unwrap();
        assert_eq!(first.combos, pattern_count(2));
        assert_eq!(first.unique, pattern_count(2));

        let second = db.track("site1", TS + 3600, "v1", &event()).unwrap();
        assert_eq!(second.combos, pattern_count(2));
        assert_eq!(second.unique, 0);

        // Raw visits accumulate, the unique counter does not
        assert_eq!(db.visits("site1", NOV_2018, "v1", &event()).unwrap(), 2);
        assert_eq!(db.monthly_uniques("site1", NOV_2018, &event()).unwrap(), 1);
        assert_eq!(db.monthly_total("site1", NOV_2018, &event()).unwrap(), 2);

        let raw = db.raw_table("site1").unwrap();
        let keys: Row = [
            ("site", Value::text("site1")),
            ("intervalSize", Value::text("month")),
            ("intervalStart", Value::Int(NOV_2018)),
            ("visitorId", Value::text("v1")),
            ("landing_page", Value::text("/home")),
            ("referer", Value::text("google.com")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let store = raw.partition_for(&keys).unwrap().unwrap();
        assert_eq!(store.get("visits"), Some(Value::Int(2)));
    }

    #[test]
    fn test_uniques_per_feature() {
        let db = database();

        db.track("site1", TS, "v1", &features(&[("referer", "google.com"), ("landing_page", "/home")]))
            .unwrap();
        db.track("site1", TS, "v2", &features(&[("referer", "bing.com"), ("landing_page", "/home")]))
            .unwrap();
        db.track("site1", TS, "v3", &features(&[("referer", "google.com"), ("landing_page", "/docs")]))
            .unwrap();
        db.track("site1", TS, "v1", &features(&[("referer", "google.com"), ("landing_page", "/docs")]))
            .unwrap();

        let uniques = |f: &[(&str, &str)]| db.monthly_uniques("site1", NOV_2018, &features(f)).unwrap();

        assert_eq!(uniques(&[]), 3);
        assert_eq!(uniques(&[("referer", "google.com")]), 2);
        assert_eq!(uniques(&[("referer", "bing.com")]), 1);
        assert_eq!(uniques(&[("landing_page", "/home")]), 2);
        assert_eq!(uniques(&[("landing_page", "/docs")]), 2);
        assert_eq!(
            uniques(&[("referer", "google.com"), ("landing_page", "/docs")]),
            2
        );
        assert_eq!(uniques(&[("referer", "yahoo.com")]), 0);

        assert_eq!(db.monthly_total("site1", NOV_2018, &features(&[])).unwrap(), 4);
    }

    #[test]
    fn test_new_month_is_unique_again() {
        let db = database();
        db.track("site1", TS, "v1", &event()).unwrap();

        let december = to_epoch(2018, 12, 3).unwrap();
        let outcome = db.track("site1", december, "v1", &event()).unwrap();
        assert_eq!(outcome.unique, outcome.combos);

        let dec_start = to_epoch(2018, 12, 1).unwrap();
        assert_eq!(db.monthly_uniques("site1", dec_start, &event()).unwrap(), 1);
        assert_eq!(db.monthly_uniques("site1", NOV_2018, &event()).unwrap(), 1);
    }

    #[test]
    fn test_missing_feature_value_discards_combos() {
        let db = database();
        let partial = features(&[("referer", "google.com")]);

        let outcome = db.track("site1", TS, "v1", &partial).unwrap();
        // Baseline and referer alone; anything needing landing_page is dropped
        assert_eq!(outcome.combos, 2);
        assert_eq!(db.monthly_uniques("site1", NOV_2018, &features(&[])).unwrap(), 1);
        assert_eq!(db.monthly_uniques("site1", NOV_2018, &partial).unwrap(), 1);
    }

    #[test]
    fn test_empty_feature_value_tracked_once() {
        let db = database();
        let blank_referer = features(&[("referer", ""), ("landing_page", "/home")]);

        let outcome = db.track("site1", TS, "v1", &blank_referer).unwrap();
        assert_eq!(outcome, TrackOutcome { combos: 2, unique: 2 });

        let baseline = features(&[]);
        assert_eq!(db.visits("site1", NOV_2018, "v1", &baseline).unwrap(), 1);
        assert_eq!(db.monthly_uniques("site1", NOV_2018, &baseline).unwrap(), 1);
        assert_eq!(db.monthly_total("site1", NOV_2018, &baseline).unwrap(), 1);
        assert_eq!(
            db.interval_totals("site1", NOV_2018, DAY_TOTAL, &baseline).unwrap(),
            vec![(to_epoch(2018, 11, 7).unwrap(), 1)]
        );
    }

    #[test]
    fn test_separator_in_event_writes_nothing() {
        let db = RollupDatabase::new();
        db.register_site("site1", ["referer"]).unwrap();

        let url = features(&[("referer", "https://google.com")]);
        assert!(matches!(
            db.track("site1", TS, "v1", &url),
            Err(RollupError::Storage(StorageError::SeparatorInKey { ref field, .. })) if field == "referer"
        ));
        assert!(matches!(
            db.track("site1", TS, "v:1", &features(&[("referer", "google.com")])),
            Err(RollupError::Storage(StorageError::SeparatorInKey { ref field, .. })) if field == "visitorId"
        ));

        assert_eq!(db.monthly_total("site1", NOV_2018, &features(&[])).unwrap(), 0);
        assert_eq!(db.monthly_uniques("site1", NOV_2018, &features(&[])).unwrap(), 0);
        assert_eq!(db.raw_table("site1").unwrap().partition_count(), 0);
        assert_eq!(db.monthly_table("site1").unwrap().partition_count(), 0);

        // Values of features the site does not track never reach a key
        let extra = features(&[("referer", "google.com"), ("utm", "a:b")]);
        assert_eq!(db.track("site1", TS, "v1", &extra).unwrap().combos, 2);
    }

    #[test]
    fn test_unknown_query_feature() {
        let db = database();
        assert!(matches!(
            db.monthly_uniques("site1", NOV_2018, &features(&[("country", "US")])),
            Err(RollupError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn test_interval_totals() {
        let db = database();
        let day1 = to_epoch(2018, 11, 6).unwrap();
        let day2 = to_epoch(2018, 11, 7).unwrap();

        db.track("site1", day2 + 10, "v1", &event()).unwrap();
        db.track("site1", day1 + 10, "v1", &event()).unwrap();
        db.track("site1", day2 + 20, "v2", &event()).unwrap();

        let days = db
            .interval_totals("site1", NOV_2018, DAY_TOTAL, &features(&[]))
            .unwrap();
        assert_eq!(days, vec![(day1, 1), (day2, 2)]);

        let weeks = db
            .interval_totals("site1", NOV_2018, WEEK_TOTAL, &features(&[("referer", "google.com")]))
            .unwrap();
        assert_eq!(weeks, vec![(to_epoch(2018, 11, 5).unwrap(), 3)]);

        let none = db
            .interval_totals("site1", NOV_2018, DAY_TOTAL, &features(&[("referer", "bing.com")]))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_is_queryable() {
        let db = RollupDatabase::new();
        db.register_site("site1", ["a", "b", "c", "d"]).unwrap();

        assert!(db.is_queryable("site1", &[]).unwrap());
        assert!(db.is_queryable("site1", &["c"]).unwrap());
        assert!(db.is_queryable("site1", &["a", "d"]).unwrap());
        assert!(db.is_queryable("site1", &["b", "a"]).unwrap());
        assert!(db.is_queryable("site1", &["a", "b", "c", "d"]).unwrap());
        assert!(!db.is_queryable("site1", &["a", "b", "d"]).unwrap());
        assert!(!db.is_queryable("site1", &["z"]).unwrap());
    }

    struct FixedBucketer;

    impl TimeBucketer for FixedBucketer {
        fn bucket(&self, timestamp: i64) -> Result<Intervals, TimeError> {
            if timestamp < 0 {
                return Err(TimeError::OutOfRange(timestamp));
            }
            Ok(Intervals {
                timestamp,
                month_start: 100,
                week_start: 10,
                day_start: 1,
            })
        }
    }

    #[test]
    fn test_custom_bucketer() {
        let db = RollupDatabase::with_bucketer(Arc::new(FixedBucketer));
        db.register_site("site1", Vec::<String>::new()).unwrap();

        let outcome = db.track("site1", 5, "v1", &HashMap::new()).unwrap();
        assert_eq!(outcome, TrackOutcome { combos: 1, unique: 1 });
        assert_eq!(db.monthly_uniques("site1", 100, &HashMap::new()).unwrap(), 1);
        assert_eq!(
            db.interval_totals("site1", 100, DAY_TOTAL, &HashMap::new()).unwrap(),
            vec![(1, 1)]
        );

        assert!(matches!(
            db.track("site1", -1, "v1", &HashMap::new()),
            Err(RollupError::Timestamp(TimeError::OutOfRange(-1)))
        ));
    }

    #[test]
    fn test_counter_on_text_column_propagates() {
        let db = database();
        db.track("site1", TS, "v1", &event()).unwrap();

        // Corrupt the baseline raw partition's counter with text
        let raw = db.raw_table("site1").unwrap();
        let baseline = raw
            .partition_keys()
            .into_iter()
            .find(|k| k.ends_with("v1::"))
            .unwrap();
        raw.partition(&baseline)
            .unwrap()
            .put("visits", "not a number")
            .unwrap();

        assert!(matches!(
            db.track("site1", TS, "v1", &event()),
            Err(RollupError::Storage(StorageError::NonIntegerCounter { .. }))
        ));
    }
}

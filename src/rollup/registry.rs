use super::RollupError;
use crate::storage::SEPARATOR;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Field names the rollup tables reserve for themselves
pub const RESERVED_FIELDS: &[&str] = &[
    "site",
    "intervalSize",
    "intervalStart",
    "visitorId",
    "monthStart",
    "metric",
];

/// Registered feature names per site, kept in ascending order
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    sites: DashMap<String, Arc<[String]>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) the feature set of a site.
    ///
    /// Duplicates collapse and the stored order is ascending.
    pub fn register_site<I, S>(&self, site: &str, features: I) -> Result<Arc<[String]>, RollupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let features: Arc<[String]> = normalize_features(features)?.into();
        self.sites.insert(site.to_string(), Arc::clone(&features));
        Ok(features)
    }

    pub fn features(&self, site: &str) -> Option<Arc<[String]>> {
        self.sites.get(site).map(|f| Arc::clone(f.value()))
    }

    pub fn contains(&self, site: &str) -> bool {
        self.sites.contains_key(site)
    }

    /// Registered site ids in ascending order
    pub fn sites(&self) -> Vec<String> {
        let mut sites: Vec<String> = self.sites.iter().map(|e| e.key().clone()).collect();
        sites.sort();
        sites
    }
}

/// Validate feature names and put them in fan-out order (ascending, no duplicates)
pub(crate) fn normalize_features<I, S>(features: I) -> Result<Vec<String>, RollupError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let features: BTreeSet<String> = features.into_iter().map(Into::into).collect();
    for feature in &features {
        validate_feature_name(feature)?;
    }
    Ok(features.into_iter().collect())
}

fn validate_feature_name(name: &str) -> Result<(), RollupError> {
    if RESERVED_FIELDS.contains(&name) {
        return Err(RollupError::ReservedFeatureName(name.to_string()));
    }
    if name.is_empty() || name.contains(SEPARATOR) {
        return Err(RollupError::InvalidFeatureName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_sorts_and_dedups() {
        let registry = FeatureRegistry::new();
        let features = registry
            .register_site("site1", ["referer", "landing_page", "referer"])
            .unwrap();

        assert_eq!(&*features, &["landing_page".to_string(), "referer".to_string()]);
        assert_eq!(registry.features("site1").as_deref(), Some(&*features));
        assert!(registry.features("site2").is_none());
    }

    #[test]
    fn test_rejects_reserved_and_invalid_names() {
        let registry = FeatureRegistry::new();
        assert!(matches!(
            registry.register_site("site1", ["site"]),
            Err(RollupError::ReservedFeatureName(_))
        ));
        assert!(matches!(
            registry.register_site("site1", ["a:b"]),
            Err(RollupError::InvalidFeatureName(_))
        ));
        assert!(!registry.contains("site1"));
    }

    #[test]
    fn test_sites() {
        let registry = FeatureRegistry::new();
        registry.register_site("b", ["f"]).unwrap();
        registry.register_site("a", Vec::<String>::new()).unwrap();
        assert_eq!(registry.sites(), vec!["a", "b"]);
    }
}

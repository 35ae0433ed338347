//! Region registry: endpoints, credentials, and bucket whitelists

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Errors raised while building the registry at startup
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// No regions configured
    #[error("no regions configured")]
    Empty,

    /// Same region id listed twice
    #[error("region '{0}' is configured more than once")]
    DuplicateRegion(String),

    /// A required setting has no value
    #[error("region '{region}': missing {field} (set {source_hint})")]
    MissingValue {
        region: String,
        field: &'static str,
        source_hint: String,
    },

    /// Endpoint is not a valid URL
    #[error("region '{region}': invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        region: String,
        endpoint: String,
        reason: String,
    },

    /// Bucket whitelist names a region without connection settings
    #[error("buckets configured for unknown region '{0}'")]
    UnknownBucketRegion(String),
}

/// Connection parameters for one region
#[derive(Clone, PartialEq, Eq)]
pub struct RegionConfig {
    pub endpoint: Url,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for RegionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Process-wide, read-only mapping of regions to connections and buckets
#[derive(Clone, Debug)]
pub struct RegionRegistry {
    configs: BTreeMap<String, RegionConfig>,
    buckets: BTreeMap<String, Vec<String>>,
}

impl RegionRegistry {
    /// Build a registry from its two mappings
    ///
    /// Every region in `buckets` must have an entry in `configs`. Bucket lists
    /// keep their order; duplicates are dropped.
    pub fn new(
        configs: BTreeMap<String, RegionConfig>,
        buckets: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, RegistryError> {
        if configs.is_empty() {
            return Err(RegistryError::Empty);
        }
        if let Some(region) = buckets.keys().find(|r| !configs.contains_key(*r)) {
            return Err(RegistryError::UnknownBucketRegion(region.clone()));
        }

        let buckets = buckets
            .into_iter()
            .map(|(region, list)| {
                let mut unique: Vec<String> = Vec::with_capacity(list.len());
                for bucket in list {
                    if !unique.contains(&bucket) {
                        unique.push(bucket);
                    }
                }
                (region, unique)
            })
            .collect();

        Ok(Self { configs, buckets })
    }

    /// Build a registry from settings, resolving `*_env` references with `lookup`
    pub fn from_settings<F>(settings: &RegistrySettings, lookup: F) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut configs = BTreeMap::new();
        let mut buckets = BTreeMap::new();

        for region in &settings.regions {
            if configs.contains_key(&region.id) {
                return Err(RegistryError::DuplicateRegion(region.id.clone()));
            }

            let endpoint = resolve(
                &region.id,
                "endpoint",
                region.endpoint.as_deref(),
                region.endpoint_env.as_deref(),
                &lookup,
            )?;
            let endpoint = Url::parse(&endpoint).map_err(|e| RegistryError::InvalidEndpoint {
                region: region.id.clone(),
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
            let access_key_id = resolve(
                &region.id,
                "access key",
                region.access_key_id.as_deref(),
                region.access_key_env.as_deref(),
                &lookup,
            )?;
            let secret_access_key = resolve(
                &region.id,
                "secret key",
                region.secret_access_key.as_deref(),
                region.secret_key_env.as_deref(),
                &lookup,
            )?;

            configs.insert(
                region.id.clone(),
                RegionConfig {
                    endpoint,
                    access_key_id,
                    secret_access_key,
                },
            );
            buckets.insert(region.id.clone(), region.buckets.clone());
        }

        Self::new(configs, buckets)
    }

    /// Build a registry from settings, resolving references against the process environment
    pub fn from_env(settings: &RegistrySettings) -> Result<Self, RegistryError> {
        Self::from_settings(settings, |name| std::env::var(name).ok())
    }

    /// Connection parameters of a region
    pub fn resolve_region(&self, id: &str) -> Option<&RegionConfig> {
        self.configs.get(id)
    }

    /// Buckets permitted for a region; empty for unknown regions
    pub fn permitted_buckets(&self, id: &str) -> &[String] {
        self.buckets.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `bucket` is whitelisted for `region`
    pub fn is_permitted(&self, region: &str, bucket: &str) -> bool {
        self.permitted_buckets(region).iter().any(|b| b == bucket)
    }

    /// Region ids in sorted order
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    /// Region id to bucket list, for every configured region
    pub fn bucket_map(&self) -> BTreeMap<&str, &[String]> {
        self.regions()
            .map(|region| (region, self.permitted_buckets(region)))
            .collect()
    }
}

/// Pick the inline value, else the named environment variable
fn resolve<F>(
    region: &str,
    field: &'static str,
    inline: Option<&str>,
    env_name: Option<&str>,
    lookup: &F,
) -> Result<String, RegistryError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = inline.filter(|v| !v.trim().is_empty()) {
        return Ok(value.to_string());
    }
    if let Some(name) = env_name {
        if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
            return Ok(value);
        }
    }
    Err(RegistryError::MissingValue {
        region: region.to_string(),
        field,
        source_hint: env_name.unwrap_or("an inline value").to_string(),
    })
}

/// Registry layout as read from a settings file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    pub regions: Vec<RegionSettings>,
}

/// One region entry of [`RegistrySettings`]
///
/// Each connection value is given inline or as the name of an environment
/// variable holding it; inline values win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSettings {
    pub id: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub endpoint_env: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub access_key_env: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub secret_key_env: Option<String>,
    #[serde(default)]
    pub buckets: Vec<String>,
}

impl RegionSettings {
    fn from_env_names(id: &str, endpoint: &str, access: &str, secret: &str, buckets: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            endpoint_env: Some(endpoint.to_string()),
            access_key_env: Some(access.to_string()),
            secret_key_env: Some(secret.to_string()),
            buckets: buckets.iter().map(|b| b.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            regions: vec![
                RegionSettings::from_env_names(
                    "london-2",
                    "ENDPOINT_LONDON_2",
                    "LONDON_ACCESS_KEY",
                    "LONDON_SECRET_KEY",
                    &["london-files", "london-2-image"],
                ),
                RegionSettings::from_env_names(
                    "los-angeles",
                    "ENDPOINT_LA",
                    "LA_ACCESS_KEY",
                    "LA_SECRET_KEY",
                    &["los-angeles-files", "los-angeles-image"],
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[
            ("ENDPOINT_LONDON_2", "https://london-2.example.com"),
            ("LONDON_ACCESS_KEY", "london-access"),
            ("LONDON_SECRET_KEY", "london-secret"),
            ("ENDPOINT_LA", "https://la.example.com"),
            ("LA_ACCESS_KEY", "la-access"),
            ("LA_SECRET_KEY", "la-secret"),
        ])
    }

    #[test]
    fn test_default_layout_from_env() {
        let registry = RegionRegistry::from_settings(&RegistrySettings::default(), full_env()).unwrap();

        let regions: Vec<_> = registry.regions().collect();
        assert_eq!(regions, ["london-2", "los-angeles"]);

        let london = registry.resolve_region("london-2").unwrap();
        assert_eq!(london.endpoint.as_str(), "https://london-2.example.com/");
        assert_eq!(london.access_key_id, "london-access");
        assert_eq!(
            registry.permitted_buckets("los-angeles"),
            ["los-angeles-files", "los-angeles-image"]
        );
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let lookup = env(&[
            ("ENDPOINT_LONDON_2", "https://london-2.example.com"),
            ("LONDON_ACCESS_KEY", "london-access"),
        ]);
        let err = RegionRegistry::from_settings(&RegistrySettings::default(), lookup).unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingValue {
                region: "london-2".to_string(),
                field: "secret key",
                source_hint: "LONDON_SECRET_KEY".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let settings = RegistrySettings {
            regions: vec![RegionSettings {
                id: "r".to_string(),
                endpoint: Some("https://r.example.com".to_string()),
                access_key_id: Some("   ".to_string()),
                secret_access_key: Some("s".to_string()),
                ..Default::default()
            }],
        };
        let err = RegionRegistry::from_settings(&settings, env(&[])).unwrap_err();
        assert!(matches!(err, RegistryError::MissingValue { field: "access key", .. }));
    }

    #[test]
    fn test_inline_values_win_over_env() {
        let settings = RegistrySettings {
            regions: vec![RegionSettings {
                id: "r".to_string(),
                endpoint: Some("http://127.0.0.1:9000".to_string()),
                endpoint_env: Some("R_ENDPOINT".to_string()),
                access_key_id: Some("inline-access".to_string()),
                secret_access_key: Some("inline-secret".to_string()),
                buckets: vec!["b".to_string()],
                ..Default::default()
            }],
        };
        let registry =
            RegionRegistry::from_settings(&settings, env(&[("R_ENDPOINT", "https://ignored")])).unwrap();
        assert_eq!(
            registry.resolve_region("r").unwrap().endpoint.as_str(),
            "http://127.0.0.1:9000/"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let settings = RegistrySettings {
            regions: vec![RegionSettings {
                id: "r".to_string(),
                endpoint: Some("not a url".to_string()),
                access_key_id: Some("a".to_string()),
                secret_access_key: Some("s".to_string()),
                ..Default::default()
            }],
        };
        let err = RegionRegistry::from_settings(&settings, env(&[])).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_duplicate_region() {
        let region = RegionSettings {
            id: "r".to_string(),
            endpoint: Some("https://r.example.com".to_string()),
            access_key_id: Some("a".to_string()),
            secret_access_key: Some("s".to_string()),
            ..Default::default()
        };
        let settings = RegistrySettings {
            regions: vec![region.clone(), region],
        };
        let err = RegionRegistry::from_settings(&settings, env(&[])).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateRegion("r".to_string()));
    }

    #[test]
    fn test_bucket_region_must_be_configured() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "r".to_string(),
            RegionConfig {
                endpoint: Url::parse("https://r.example.com").unwrap(),
                access_key_id: "a".to_string(),
                secret_access_key: "s".to_string(),
            },
        );
        let mut buckets = BTreeMap::new();
        buckets.insert("ghost".to_string(), vec!["b".to_string()]);

        let err = RegionRegistry::new(configs, buckets).unwrap_err();
        assert_eq!(err, RegistryError::UnknownBucketRegion("ghost".to_string()));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let err = RegionRegistry::new(BTreeMap::new(), BTreeMap::new()).unwrap_err();
        assert_eq!(err, RegistryError::Empty);
    }

    #[test]
    fn test_buckets_deduplicated_in_order() {
        let settings = RegistrySettings {
            regions: vec![RegionSettings {
                id: "r".to_string(),
                endpoint: Some("https://r.example.com".to_string()),
                access_key_id: Some("a".to_string()),
                secret_access_key: Some("s".to_string()),
                buckets: vec!["z".to_string(), "a".to_string(), "z".to_string()],
                ..Default::default()
            }],
        };
        let registry = RegionRegistry::from_settings(&settings, env(&[])).unwrap();
        assert_eq!(registry.permitted_buckets("r"), ["z", "a"]);
        assert!(registry.is_permitted("r", "a"));
        assert!(!registry.is_permitted("r", "b"));
    }

    #[test]
    fn test_unknown_region_has_no_buckets() {
        let registry = RegionRegistry::from_settings(&RegistrySettings::default(), full_env()).unwrap();
        assert!(registry.resolve_region("mars-1").is_none());
        assert!(registry.permitted_buckets("mars-1").is_empty());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let registry = RegionRegistry::from_settings(&RegistrySettings::default(), full_env()).unwrap();
        let rendered = format!("{:?}", registry);
        assert!(rendered.contains("london-access"));
        assert!(!rendered.contains("london-secret"));
    }

    #[test]
    fn test_settings_deserialize() {
        let json = r#"{
            "regions": [
                {"id": "eu", "endpoint_env": "EU_URL", "access_key_env": "EU_KEY",
                 "secret_key_env": "EU_SECRET", "buckets": ["eu-files"]}
            ]
        }"#;
        let settings: RegistrySettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.regions[0].id, "eu");
        assert_eq!(settings.regions[0].endpoint, None);
        assert_eq!(settings.regions[0].buckets, ["eu-files"]);
    }
}

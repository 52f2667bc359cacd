use std::env::var;

use anyhow::bail;
use lazy_static::lazy_static;

lazy_static! {
    pub static ref PORT: u16 = var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(3001);
    pub static ref ISSUES_DATABASE: String =
        var("ISSUES_DATABASE").unwrap_or_else(|_| "issues".to_string());
    pub static ref ISSUES_COLLECTION: String =
        var("ISSUES_COLLECTION").unwrap_or_else(|_| "issues".to_string());
}

/// Where issues are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// Hosted PostgREST project (Supabase).
    Postgrest { url: String, key: String },
    Mongo { uri: String },
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        };

        match first_set(&["ISSUES_STORE"]).as_deref() {
            None | Some("postgrest") | Some("supabase") => {
                let url = first_set(&["SUPABASE_URL", "VITE_SUPABASE_URL"]);
                let key = first_set(&["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]);
                match (url, key) {
                    (Some(url), Some(key)) => Ok(StoreConfig::Postgrest { url, key }),
                    _ => bail!("Missing store configuration: SUPABASE_URL and SUPABASE_ANON_KEY must be set"),
                }
            }
            Some("mongo") => match first_set(&["MONGOURI"]) {
                Some(uri) => Ok(StoreConfig::Mongo { uri }),
                None => bail!("Missing store configuration: MONGOURI must be set"),
            },
            Some(other) => bail!("Unknown store kind: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<StoreConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StoreConfig::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_postgrest_is_default() {
        assert_eq!(
            config(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_ANON_KEY", "k")]).unwrap(),
            StoreConfig::Postgrest {
                url: "https://x.supabase.co".to_string(),
                key: "k".to_string()
            }
        );
    }

    #[test]
    fn test_vite_prefixed_names_are_accepted() {
        assert!(config(&[
            ("VITE_SUPABASE_URL", "https://x.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "k"),
        ])
        .is_ok());
    }

    #[test]
    fn test_missing_url_or_key_is_fatal() {
        assert!(config(&[]).is_err());
        assert!(config(&[("SUPABASE_URL", "https://x.supabase.co")]).is_err());
        assert!(config(&[("SUPABASE_ANON_KEY", "k")]).is_err());
        assert!(config(&[("SUPABASE_URL", " "), ("SUPABASE_ANON_KEY", "k")]).is_err());
    }

    #[test]
    fn test_mongo_store() {
        assert_eq!(
            config(&[("ISSUES_STORE", "mongo"), ("MONGOURI", "mongodb://localhost")]).unwrap(),
            StoreConfig::Mongo {
                uri: "mongodb://localhost".to_string()
            }
        );
        assert!(config(&[("ISSUES_STORE", "mongo")]).is_err());
        assert!(config(&[("ISSUES_STORE", "sqlite")]).is_err());
    }
}

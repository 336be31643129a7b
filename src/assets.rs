//! Loaded model templates and the asset loading contract
//!
//! Fetching is the host's job (it may issue every request at once); the core
//! only ever sees a fully settled [`AssetCatalog`]. Any single failure aborts
//! startup: there is no retry and no degraded mode.

use std::collections::HashMap;

use thiserror::Error;

use crate::sim::anim::{Clip, ClipSet};
use crate::sim::kind::EnemyKind;

/// Errors raised while assembling the catalog
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("failed to load asset `{key}`: {reason}")]
    Load { key: String, reason: String },
    #[error("player model is missing")]
    MissingPlayer,
    #[error("enemy model `{}` is missing", .0.key())]
    MissingEnemyModel(EnemyKind),
}

/// A loaded, clonable model plus its animation clips
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTemplate {
    pub clips: ClipSet,
}

impl ModelTemplate {
    pub fn with_clips(clips: Vec<Clip>) -> Self {
        Self {
            clips: ClipSet::new(clips),
        }
    }
}

/// Every model key the game requests at startup
pub const MODEL_KEYS: [&str; 17] = [
    "road",
    "fence",
    "fenceDamaged",
    "tree",
    "grave",
    "pumpkin",
    "lantern",
    "crypt",
    "rock",
    "trunk",
    "debris",
    "shovel",
    "shield",
    "zombie1",
    "zombie2",
    "zombie3",
    "zombie4",
];

/// All loaded templates, keyed by asset key
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    models: HashMap<String, ModelTemplate>,
    player: ModelTemplate,
}

impl AssetCatalog {
    /// Assemble a catalog from settled load results, failing on the first error
    pub fn collect<I, K>(results: I, player: Result<ModelTemplate, AssetError>) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = (K, Result<ModelTemplate, AssetError>)>,
        K: Into<String>,
    {
        let mut models = HashMap::new();
        for (key, result) in results {
            let key = key.into();
            match result {
                Ok(template) => {
                    models.insert(key, template);
                }
                Err(err) => {
                    log::error!("Asset load failed: {}", err);
                    return Err(err);
                }
            }
        }
        let player = player?;

        for kind in EnemyKind::ALL {
            if !models.contains_key(kind.key()) {
                return Err(AssetError::MissingEnemyModel(kind));
            }
        }

        log::info!("Loaded {} models", models.len());
        Ok(Self { models, player })
    }

    /// Insert or replace a template (tests and tools)
    pub fn insert(&mut self, key: impl Into<String>, template: ModelTemplate) {
        self.models.insert(key.into(), template);
    }

    /// Drop a template, as if the asset never shipped
    pub fn remove(&mut self, key: &str) -> Option<ModelTemplate> {
        self.models.remove(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.models.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ModelTemplate> {
        self.models.get(key)
    }

    pub fn enemy_clips(&self, kind: EnemyKind) -> Option<&ClipSet> {
        self.models.get(kind.key()).map(|m| &m.clips)
    }

    pub fn player(&self) -> &ModelTemplate {
        &self.player
    }

    /// Catalog with every model present and typical clip names, for headless
    /// runs and tests
    pub fn builtin() -> Self {
        let models = MODEL_KEYS
            .iter()
            .filter_map(|k| builtin_model(k).map(|m| (k.to_string(), m)))
            .collect();
        Self {
            models,
            player: builtin_player(),
        }
    }
}

/// Built-in template for one model key; zombies carry clips, props don't
fn builtin_model(key: &str) -> Option<ModelTemplate> {
    let clips = match key {
        "zombie1" => vec![
            Clip::new("Walk", 1.2),
            Clip::new("Attack", 1.0),
            Clip::new("Death", 1.5),
        ],
        "zombie2" => vec![
            Clip::new("Crawl", 1.0),
            Clip::new("Attack", 0.8),
            Clip::new("Die", 1.2),
        ],
        "zombie3" => vec![
            Clip::new("Run", 0.7),
            Clip::new("Bite", 0.9),
            Clip::new("FallDown", 1.4),
        ],
        "zombie4" => vec![
            Clip::new("Flying", 0.5),
            Clip::new("Bite", 0.6),
            Clip::new("Death", 1.0),
        ],
        key if MODEL_KEYS.contains(&key) => Vec::new(),
        _ => return None,
    };
    Some(ModelTemplate::with_clips(clips))
}

fn builtin_player() -> ModelTemplate {
    ModelTemplate::with_clips(vec![
        Clip::new("Run", 0.8),
        Clip::new("Jump", 0.9),
        Clip::new("Roll", 1.2),
        Clip::new("Death", 2.0),
        Clip::new("HitReact", 0.6),
    ])
}

/// Source of model templates (GLTF loader on the web, built-ins natively)
pub trait AssetProvider {
    /// Load one model by asset key
    fn load_model(&mut self, key: &str) -> Result<ModelTemplate, AssetError>;

    /// Load the player model and its clips
    fn load_player_model(&mut self) -> Result<ModelTemplate, AssetError>;

    /// Request every key in [`MODEL_KEYS`] plus the player, then assemble the
    /// catalog; the first failure aborts
    fn load_all(&mut self) -> Result<AssetCatalog, AssetError> {
        let results: Vec<_> = MODEL_KEYS
            .iter()
            .map(|key| (*key, self.load_model(key)))
            .collect();
        let player = self.load_player_model();
        AssetCatalog::collect(results, player)
    }
}

/// Provider backed by the built-in templates
#[derive(Debug, Default)]
pub struct BuiltinAssets;

impl AssetProvider for BuiltinAssets {
    fn load_model(&mut self, key: &str) -> Result<ModelTemplate, AssetError> {
        builtin_model(key).ok_or_else(|| AssetError::Load {
            key: key.to_string(),
            reason: "no built-in model".into(),
        })
    }

    fn load_player_model(&mut self) -> Result<ModelTemplate, AssetError> {
        Ok(builtin_player())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_results() -> Vec<(&'static str, Result<ModelTemplate, AssetError>)> {
        MODEL_KEYS.iter().map(|k| (*k, Ok(ModelTemplate::default()))).collect()
    }

    #[test]
    fn test_collect_all_ok() {
        let catalog = AssetCatalog::collect(ok_results(), Ok(ModelTemplate::default())).unwrap();
        assert!(catalog.has("shield"));
        assert!(catalog.enemy_clips(EnemyKind::Flyer).is_some());
    }

    #[test]
    fn test_collect_fails_fast() {
        let mut results = ok_results();
        results[2].1 = Err(AssetError::Load {
            key: "fenceDamaged".into(),
            reason: "404".into(),
        });
        let err = AssetCatalog::collect(results, Ok(ModelTemplate::default())).unwrap_err();
        assert!(err.to_string().contains("fenceDamaged"));
    }

    #[test]
    fn test_missing_player_is_fatal() {
        let err = AssetCatalog::collect(ok_results(), Err(AssetError::MissingPlayer)).unwrap_err();
        assert_eq!(err, AssetError::MissingPlayer);
    }

    /// Serves built-ins but fails one key
    struct Flaky {
        broken: &'static str,
        requested: Vec<String>,
    }

    impl AssetProvider for Flaky {
        fn load_model(&mut self, key: &str) -> Result<ModelTemplate, AssetError> {
            self.requested.push(key.to_string());
            if key == self.broken {
                return Err(AssetError::Load {
                    key: key.to_string(),
                    reason: "network error".into(),
                });
            }
            BuiltinAssets.load_model(key)
        }

        fn load_player_model(&mut self) -> Result<ModelTemplate, AssetError> {
            BuiltinAssets.load_player_model()
        }
    }

    #[test]
    fn test_builtin_provider_loads_full_catalog() {
        let catalog = BuiltinAssets.load_all().unwrap();
        for key in MODEL_KEYS {
            assert!(catalog.has(key), "missing {}", key);
        }
        assert!(catalog.player().clips.find("roll").is_some());
        assert!(BuiltinAssets.load_model("dragon").is_err());
    }

    #[test]
    fn test_provider_failure_aborts_startup() {
        let mut provider = Flaky {
            broken: "tree",
            requested: Vec::new(),
        };
        let err = provider.load_all().unwrap_err();
        assert_eq!(
            err,
            AssetError::Load {
                key: "tree".into(),
                reason: "network error".into(),
            }
        );
        // Every request was issued before the failure surfaced
        assert_eq!(provider.requested.len(), MODEL_KEYS.len());
    }

    #[test]
    fn test_missing_enemy_model_is_fatal() {
        let results: Vec<_> = ok_results().into_iter().filter(|(k, _)| *k != "zombie3").collect();
        let err = AssetCatalog::collect(results, Ok(ModelTemplate::default())).unwrap_err();
        assert_eq!(err, AssetError::MissingEnemyModel(EnemyKind::Runner));
    }
}

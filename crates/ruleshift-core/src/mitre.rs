//! The MITRE ATT&CK catalog.
//!
//! A process-wide, lazily-initialized resource holding two tables: tactics
//! keyed by snake-case tactic name and techniques keyed by lowercase dotted
//! id. The catalog boots from bundled dictionary files and can be refreshed
//! from the public CTI bundle; readers always see a complete snapshot — the
//! tables are swapped atomically behind an `Arc`, never patched in place.
//! Only one refresh runs at a time.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, RwLock};
use tracing::{debug, warn};

/// Default location of the enterprise ATT&CK STIX bundle.
pub const MITRE_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/mitre/cti/master/enterprise-attack/enterprise-attack.json";

const MITRE_SOURCE_TYPES: &[&str] = &["mitre-attack"];

/// One tactic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacticInfo {
    pub external_id: String,
    pub url: String,
    pub tactic: String,
}

/// One technique or sub-technique entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueInfo {
    pub technique_id: String,
    pub technique: String,
    pub url: String,
    pub tactic: Vec<String>,
}

/// An immutable snapshot of both catalog tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MitreTables {
    pub tactics: HashMap<String, TacticInfo>,
    pub techniques: HashMap<String, TechniqueInfo>,
}

/// The catalog handle. See the module docs for the concurrency contract.
pub struct MitreConfig {
    url: String,
    tables: RwLock<Arc<MitreTables>>,
    refresh_guard: Mutex<()>,
}

impl Default for MitreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MitreConfig {
    /// Builds a catalog seeded from the bundled dictionaries.
    pub fn new() -> Self {
        Self::with_url(MITRE_CONFIG_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            tables: RwLock::new(Arc::new(load_bundled_tables())),
            refresh_guard: Mutex::new(()),
        }
    }

    /// The process-wide catalog.
    pub fn global() -> &'static MitreConfig {
        static GLOBAL: OnceLock<MitreConfig> = OnceLock::new();
        GLOBAL.get_or_init(MitreConfig::new)
    }

    /// A consistent snapshot of both tables.
    pub fn snapshot(&self) -> Arc<MitreTables> {
        match self.tables.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn swap(&self, tables: MitreTables) {
        let mut guard = match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(tables);
    }

    fn refresh_lock(&self) -> MutexGuard<'_, ()> {
        match self.refresh_guard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Refreshes the catalog from the remote STIX bundle. Fetch or parse
    /// failure degrades silently to the bundled dictionaries.
    pub fn update_mitre_config(&self) {
        let _refresh = self.refresh_lock();
        match fetch_bundle(&self.url) {
            Ok(bundle) => {
                let tables = parse_stix_bundle(&bundle);
                debug!(
                    tactics = tables.tactics.len(),
                    techniques = tables.techniques.len(),
                    "loaded remote MITRE catalog"
                );
                self.swap(tables);
            }
            Err(message) => {
                warn!(%message, "MITRE remote fetch failed, falling back to bundled catalog");
                self.swap(load_bundled_tables());
            }
        }
    }

    /// Looks up a tactic by snake-case key or display name
    /// (`Command and Control` resolves as `command_and_control`).
    pub fn get_tactic(&self, tactic: &str) -> Option<TacticInfo> {
        self.snapshot().tactics.get(&normalize_key(tactic)).cloned()
    }

    /// Looks up a technique by dotted id (`t1059.003`, case-insensitive).
    pub fn get_technique(&self, technique_id: &str) -> Option<TechniqueInfo> {
        self.snapshot()
            .techniques
            .get(&technique_id.to_lowercase())
            .cloned()
    }
}

fn normalize_key(tactic: &str) -> String {
    tactic
        .trim()
        .to_lowercase()
        .replace(['.', ' ', '-'], "_")
}

fn fetch_bundle(url: &str) -> Result<JsonValue, String> {
    let response = reqwest::blocking::get(url).map_err(|err| err.to_string())?;
    if !response.status().is_success() {
        return Err(format!("unexpected status: {}", response.status()));
    }
    response.json().map_err(|err| err.to_string())
}

fn load_bundled_tables() -> MitreTables {
    let tactics = serde_json::from_str(include_str!("dictionaries/tactics.json"))
        .unwrap_or_else(|err| {
            warn!(%err, "bundled tactics dictionary is invalid");
            HashMap::new()
        });
    let techniques = serde_json::from_str(include_str!("dictionaries/techniques.json"))
        .unwrap_or_else(|err| {
            warn!(%err, "bundled techniques dictionary is invalid");
            HashMap::new()
        });
    MitreTables { tactics, techniques }
}

fn revoked_or_deprecated(entry: &JsonValue) -> bool {
    entry["revoked"].as_bool().unwrap_or(false)
        || entry["x_mitre_deprecated"].as_bool().unwrap_or(false)
}

fn attack_reference(entry: &JsonValue) -> Option<&JsonValue> {
    entry["external_references"].as_array().and_then(|refs| {
        refs.iter().find(|reference| {
            reference["source_name"]
                .as_str()
                .is_some_and(|source| MITRE_SOURCE_TYPES.contains(&source))
        })
    })
}

/// Three ordered passes over the bundle's `objects`: tactics, techniques,
/// sub-techniques. Revoked and deprecated entries never reach the tables.
fn parse_stix_bundle(bundle: &JsonValue) -> MitreTables {
    let mut tables = MitreTables::default();
    let Some(objects) = bundle["objects"].as_array() else {
        return tables;
    };

    // Pass 1: tactics, plus the shortname -> display-name map used by pass 2.
    let mut tactic_map: HashMap<String, String> = HashMap::new();
    for entry in objects {
        if entry["type"] != "x-mitre-tactic" || revoked_or_deprecated(entry) {
            continue;
        }
        let Some(reference) = attack_reference(entry) else {
            continue;
        };
        let (Some(shortname), Some(name)) =
            (entry["x_mitre_shortname"].as_str(), entry["name"].as_str())
        else {
            continue;
        };
        tactic_map.insert(shortname.to_string(), name.to_string());
        tables.tactics.insert(
            name.replace(' ', "_").to_lowercase(),
            TacticInfo {
                external_id: reference["external_id"].as_str().unwrap_or_default().to_string(),
                url: reference["url"].as_str().unwrap_or_default().to_string(),
                tactic: name.to_string(),
            },
        );
    }

    // Pass 2: parent techniques, resolving tactics through kill-chain phases.
    let mut technique_map: HashMap<String, String> = HashMap::new();
    for entry in objects {
        if entry["type"] != "attack-pattern" || revoked_or_deprecated(entry) {
            continue;
        }
        if entry["x_mitre_is_subtechnique"].as_bool().unwrap_or(false) {
            continue;
        }
        let Some(reference) = attack_reference(entry) else {
            continue;
        };
        let (Some(external_id), Some(name)) =
            (reference["external_id"].as_str(), entry["name"].as_str())
        else {
            continue;
        };
        technique_map.insert(external_id.to_string(), name.to_string());

        let mut tactics = Vec::new();
        if let Some(phases) = entry["kill_chain_phases"].as_array() {
            for phase in phases {
                let in_scope = phase["kill_chain_name"]
                    .as_str()
                    .is_some_and(|chain| MITRE_SOURCE_TYPES.contains(&chain));
                if !in_scope {
                    continue;
                }
                if let Some(display) = phase["phase_name"]
                    .as_str()
                    .and_then(|shortname| tactic_map.get(shortname))
                {
                    tactics.push(display.clone());
                }
            }
        }
        tables.techniques.insert(
            external_id.to_lowercase(),
            TechniqueInfo {
                technique_id: external_id.to_string(),
                technique: name.to_string(),
                url: reference["url"].as_str().unwrap_or_default().to_string(),
                tactic: tactics,
            },
        );
    }

    // Pass 3: sub-techniques inherit the parent's tactics; display name is
    // "Parent : Sub".
    for entry in objects {
        if entry["type"] != "attack-pattern" || revoked_or_deprecated(entry) {
            continue;
        }
        if !entry["x_mitre_is_subtechnique"].as_bool().unwrap_or(false) {
            continue;
        }
        let Some(reference) = attack_reference(entry) else {
            continue;
        };
        let (Some(external_id), Some(name)) =
            (reference["external_id"].as_str(), entry["name"].as_str())
        else {
            continue;
        };
        let parent_id = external_id.split('.').next().unwrap_or(external_id);
        let Some(parent_name) = technique_map.get(parent_id) else {
            continue;
        };
        let parent_tactics = tables
            .techniques
            .get(&parent_id.to_lowercase())
            .map(|parent| parent.tactic.clone())
            .unwrap_or_default();
        tables.techniques.insert(
            external_id.to_lowercase(),
            TechniqueInfo {
                technique_id: external_id.to_string(),
                technique: format!("{parent_name} : {name}"),
                url: reference["url"].as_str().unwrap_or_default().to_string(),
                tactic: parent_tactics,
            },
        );
    }

    tables
}

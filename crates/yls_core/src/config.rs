use serde::{Deserialize, Serialize};

/// Tables kept as a single opaque region by default: per-NPC appearance
/// pieces and hair colors.
pub const DEFAULT_OPAQUE_TABLES: &[&str] = &["Youtuber_appearance", "Npc_appearance"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    /// Table names captured verbatim, heading included, instead of being parsed.
    pub opaque_tables: Vec<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            opaque_tables: DEFAULT_OPAQUE_TABLES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

impl CodecConfig {
    /// Config that models every table, appearance data included.
    pub fn fully_modeled() -> Self {
        Self {
            opaque_tables: Vec::new(),
        }
    }

    pub fn is_opaque_table(&self, name: &str) -> bool {
        self.opaque_tables.iter().any(|opaque| opaque == name)
    }
}

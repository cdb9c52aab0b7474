//! Fixed synonym table for query-term expansion.

use std::collections::HashMap;

/// Many-to-many synonym table applied to lowercased query terms.
///
/// Expansion is one level deep: a term may expand to several synonyms, and
/// synonyms are never re-expanded. Multi-word synonyms are kept as single
/// entries and matched by substring during scoring.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Creates a table from explicit entries.
    #[must_use]
    pub const fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Returns the synonyms registered for a term, if any.
    #[must_use]
    pub fn get(&self, term: &str) -> Option<&[String]> {
        self.entries.get(term).map(Vec::as_slice)
    }

    /// Tokenizes `query` into lowercased terms and appends one level of
    /// synonym expansion for every original term found in the table.
    #[must_use]
    pub fn expand(&self, query: &str) -> Vec<String> {
        let mut terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let originals = terms.clone();
        for term in &originals {
            if let Some(synonyms) = self.get(term) {
                terms.extend(synonyms.iter().cloned());
            }
        }
        terms
    }
}

impl Default for SynonymTable {
    /// The traffic-law vocabulary the corpus was tuned against.
    fn default() -> Self {
        let entries = [
            ("velocidad", vec!["rapidez", "límite", "máximo", "velocidades"]),
            ("ciudad", vec!["urbana", "urbano", "zona urbana", "vías urbanas"]),
            ("multa", vec!["sanción", "penalidad", "infracción"]),
            ("celular", vec!["móvil", "teléfono", "dispositivo"]),
            ("pico", vec!["restricción", "circulación"]),
            ("límites", vec!["velocidades", "máximas", "mínimas", "límite"]),
            ("carretera", vec!["vía", "autopista", "nacional", "carreteras"]),
            ("km", vec!["kilómetros", "kilometros"]),
            ("hora", vec!["h", "/h"]),
        ];
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| {
                    (
                        k.to_string(),
                        v.into_iter().map(str::to_string).collect::<Vec<_>>(),
                    )
                })
                .collect(),
        }
    }
}

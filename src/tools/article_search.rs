//! Retrieval tool: hybrid article search exposed to the reasoning model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::AgentError;
use crate::search::HybridSearchEngine;

use super::registry::Tool;
use super::types::{ToolDefinition, ToolOutcome};

/// Default result count advertised in the tool schema.
const DEFAULT_RESULT_COUNT: usize = 3;
/// Default confidence threshold advertised in the tool schema.
const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Exposes the [`HybridSearchEngine`] as a function-calling target.
///
/// Translates the engine's response into the flat article list the model
/// expects: number, title, content, and a similarity rounded to three
/// decimals.
pub struct ArticleSearchTool {
    engine: Arc<HybridSearchEngine>,
}

#[derive(Deserialize)]
struct SearchArgs {
    consulta: String,
    #[serde(default = "default_result_count")]
    n_resultados: usize,
    #[serde(default = "default_confidence_threshold")]
    umbral_confianza: f64,
}

const fn default_result_count() -> usize {
    DEFAULT_RESULT_COUNT
}

const fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

impl ArticleSearchTool {
    /// Creates the tool over a shared search engine.
    #[must_use]
    pub const fn new(engine: Arc<HybridSearchEngine>) -> Self {
        Self { engine }
    }

    async fn run(&self, input: Value) -> Result<Value, AgentError> {
        let args: SearchArgs =
            serde_json::from_value(input).map_err(|e| AgentError::ToolExecution {
                name: "buscar_articulos_transito".to_string(),
                message: format!("invalid arguments: {e}"),
            })?;

        if args.consulta.trim().is_empty() {
            return Err(AgentError::ToolExecution {
                name: "buscar_articulos_transito".to_string(),
                message: "El parámetro 'consulta' es obligatorio".to_string(),
            });
        }

        info!(
            consulta = %args.consulta,
            n = args.n_resultados,
            umbral = args.umbral_confianza,
            "running hybrid search tool"
        );

        let response = self
            .engine
            .search(&args.consulta, args.n_resultados, args.umbral_confianza)
            .await
            .map_err(|e| AgentError::ToolExecution {
                name: "buscar_articulos_transito".to_string(),
                message: format!("search failed: {e}"),
            })?;

        let articles: Vec<Value> = response
            .results
            .iter()
            .map(|r| {
                json!({
                    "numero_articulo": r.article.metadata.article_number,
                    "titulo": r.article.metadata.title,
                    "contenido": r.article.content,
                    "similitud": (r.score * 1000.0).round() / 1000.0,
                })
            })
            .collect();

        let mut payload = json!({
            "total_encontrados": articles.len(),
            "articulos": articles,
        });
        if response.total_found == 0 {
            payload["mensaje"] = json!(
                "No se encontraron artículos relevantes con el umbral de confianza especificado. \
                 Intenta reformular la consulta o reducir el umbral de confianza."
            );
        }

        Ok(payload)
    }
}

#[async_trait]
impl Tool for ArticleSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "buscar_articulos_transito".to_string(),
            description: "Busca artículos relevantes en el Código Nacional de Tránsito de \
                          Colombia usando búsqueda semántica híbrida (vectorial + keywords). \
                          Usa esta herramienta cuando el usuario pregunte sobre:\n\
                          - Normas y regulaciones de tránsito\n\
                          - Multas y sanciones\n\
                          - Límites de velocidad\n\
                          - Documentos obligatorios del vehículo\n"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "consulta": {
                        "type": "string",
                        "description": "La pregunta o términos de búsqueda sobre el código de \
                                        tránsito. Puede ser una pregunta completa del usuario o \
                                        palabras clave específicas. Ejemplos: 'multa por exceso \
                                        de velocidad', 'límite de velocidad en zona urbana', \
                                        'documentos obligatorios'"
                    },
                    "n_resultados": {
                        "type": "integer",
                        "description": "Número de artículos a retornar. Por defecto 3. Máximo recomendado: 5",
                        "default": DEFAULT_RESULT_COUNT
                    },
                    "umbral_confianza": {
                        "type": "number",
                        "description": "Umbral mínimo de similitud semántica (0.0 a 1.0). Por \
                                        defecto 0.4. Valores más bajos retornan más resultados \
                                        pero menos precisos",
                        "default": DEFAULT_CONFIDENCE_THRESHOLD
                    }
                },
                "required": ["consulta"]
            }),
        }
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        match self.run(input).await {
            Ok(payload) => ToolOutcome::ok(payload),
            Err(e) => ToolOutcome::failure(e.to_string()),
        }
    }
}

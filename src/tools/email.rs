//! Notification dispatch tool: sends email through an external HTTP service.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use super::registry::Tool;
use super::types::{ToolDefinition, ToolOutcome};

/// Default URL of the email dispatch service.
pub const DEFAULT_EMAIL_SERVICE_URL: &str = "http://appchat-apistool:8076/api/v1/email/send";

/// HTTP timeout for the dispatch call.
const EMAIL_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Sends real email through the deployment's notification service.
///
/// The tool description warns the model accordingly; every transport
/// problem (unreachable service, timeout, non-200 status) comes back as a
/// failed outcome rather than an error.
pub struct EmailTool {
    service_url: String,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct EmailArgs {
    #[serde(default)]
    to_email: String,
    #[serde(default)]
    motivo: String,
    #[serde(default)]
    mensaje: String,
}

#[derive(Deserialize)]
struct ServiceReply {
    #[serde(default = "reply_success_default")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    to_email: Option<String>,
}

const fn reply_success_default() -> bool {
    true
}

impl EmailTool {
    /// Creates the tool pointing at `service_url`.
    #[must_use]
    pub fn new(service_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(EMAIL_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            service_url: service_url.into(),
            http,
        }
    }

    async fn dispatch(&self, args: &EmailArgs) -> ToolOutcome {
        info!(to = %args.to_email, motivo = %args.motivo, "dispatching email");

        let payload = json!({
            "to_email": args.to_email,
            "motivo": args.motivo,
            "mensaje": args.mensaje,
        });

        let response = match self.http.post(&self.service_url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                error!(error = %e, "email service timed out");
                return ToolOutcome::failure(
                    "El servicio de email no respondió a tiempo. Intenta nuevamente",
                );
            }
            Err(e) => {
                error!(error = %e, "email service unreachable");
                return ToolOutcome::failure(
                    "El servicio de email no está disponible. Verifica que el servicio esté corriendo",
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), detail = %detail, "email service rejected request");
            return ToolOutcome::failure(format!(
                "Error al enviar email (status {}): {detail}",
                status.as_u16()
            ));
        }

        let reply: ServiceReply = match response.json().await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "email service returned invalid JSON");
                return ToolOutcome::failure(format!("Respuesta inválida del servicio de email: {e}"));
            }
        };

        ToolOutcome::ok(json!({
            "mensaje": reply.message.unwrap_or_else(|| "Email enviado exitosamente".to_string()),
            "to_email": reply.to_email.unwrap_or_else(|| args.to_email.clone()),
            "enviado": reply.success,
        }))
    }
}

#[async_trait]
impl Tool for EmailTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "enviar_email".to_string(),
            description: "Envía un correo electrónico a la dirección especificada. \
                          Usa esta herramienta cuando el usuario solicite:\n\
                          - Enviar notificaciones por correo\n\
                          - Enviar alertas importantes\n\
                          - Enviar confirmaciones\n\
                          - Enviar resúmenes de información\n\
                          IMPORTANTE: Esta herramienta envía emails reales. Úsala solo cuando \
                          el usuario lo solicite explícitamente."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "to_email": {
                        "type": "string",
                        "description": "Dirección de correo electrónico del destinatario. \
                                        Debe ser un email válido (ejemplo: usuario@dominio.com)"
                    },
                    "motivo": {
                        "type": "string",
                        "description": "Asunto o motivo del correo electrónico. Descripción \
                                        breve del propósito del email"
                    },
                    "mensaje": {
                        "type": "string",
                        "description": "Contenido del mensaje del correo electrónico. Texto \
                                        completo que se enviará en el cuerpo del email"
                    }
                },
                "required": ["to_email", "motivo", "mensaje"]
            }),
        }
    }

    async fn execute(&self, input: Value) -> ToolOutcome {
        let args: EmailArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(e) => return ToolOutcome::failure(format!("invalid arguments: {e}")),
        };

        for (value, field) in [
            (&args.to_email, "to_email"),
            (&args.motivo, "motivo"),
            (&args.mensaje, "mensaje"),
        ] {
            if value.trim().is_empty() {
                return ToolOutcome::failure(format!("El parámetro '{field}' es obligatorio"));
            }
        }

        self.dispatch(&args).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_definition_requires_all_fields() {
        let tool = EmailTool::new(DEFAULT_EMAIL_SERVICE_URL);
        let def = tool.definition();
        assert_eq!(def.name, "enviar_email");
        let required = def.input_schema["required"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        assert_eq!(required.len(), 3);
    }

    #[tokio::test]
    async fn test_execute_missing_recipient_is_failure() {
        let tool = EmailTool::new(DEFAULT_EMAIL_SERVICE_URL);
        let outcome = tool
            .execute(json!({"motivo": "Aviso", "mensaje": "Hola"}))
            .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap_or_default().contains("to_email"));
    }

    #[tokio::test]
    async fn test_execute_blank_subject_is_failure() {
        let tool = EmailTool::new(DEFAULT_EMAIL_SERVICE_URL);
        let outcome = tool
            .execute(json!({
                "to_email": "usuario@dominio.com",
                "motivo": "  ",
                "mensaje": "Hola"
            }))
            .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap_or_default().contains("motivo"));
    }

    #[tokio::test]
    async fn test_execute_unreachable_service_is_failure_not_error() {
        // Port 9 (discard) refuses connections on the loopback interface.
        let tool = EmailTool::new("http://127.0.0.1:9/api/v1/email/send");
        let outcome = tool
            .execute(json!({
                "to_email": "usuario@dominio.com",
                "motivo": "Aviso",
                "mensaje": "Hola"
            }))
            .await;
        assert!(!outcome.success);
    }
}

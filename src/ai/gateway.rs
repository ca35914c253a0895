//! HTTP transport for the pipeline edge function

use crate::ai::{AiGateway, AiPipelineRequest, AiPipelineResponse};
use crate::error::{JournalError, Result};
use crate::supabase::{error_for_status, SupabaseClient};
use async_trait::async_trait;
use reqwest::Method;

/// Gateway that posts requests to `{url}/functions/v1/{function}`
///
/// # Examples
///
/// ```
/// use dayjot::ai::HttpAiGateway;
/// use dayjot::config::RemoteConfig;
/// use dayjot::supabase::SupabaseClient;
///
/// let client = SupabaseClient::new(&RemoteConfig::default()).unwrap();
/// let gateway = HttpAiGateway::new(client, "ai-run-pipeline");
/// assert_eq!(gateway.endpoint(), "http://localhost/functions/v1/ai-run-pipeline");
/// ```
pub struct HttpAiGateway {
    client: SupabaseClient,
    function_name: String,
}

impl HttpAiGateway {
    pub fn new(client: SupabaseClient, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }

    /// Full URL of the pipeline function
    pub fn endpoint(&self) -> String {
        self.client.functions_url(&self.function_name)
    }
}

#[async_trait]
impl AiGateway for HttpAiGateway {
    async fn run_pipeline(&self, request: &AiPipelineRequest) -> Result<AiPipelineResponse> {
        let url = self.endpoint();
        tracing::debug!(mode = ?request.mode, "Calling AI pipeline: {}", url);

        let response = self
            .client
            .request(Method::POST, &url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("AI pipeline request failed: {}", e);
                JournalError::Gateway(format!("request failed: {}", e))
            })?;

        let response = error_for_status(response).await.map_err(|e| {
            tracing::warn!("AI pipeline returned error: {}", e);
            JournalError::Gateway(e)
        })?;

        let body: AiPipelineResponse = response.json().await.map_err(|e| {
            JournalError::Gateway(format!("unreadable pipeline response: {}", e))
        })?;

        if body.debug.as_ref().and_then(|d| d.used_fallback) == Some(true) {
            tracing::debug!("AI pipeline answered with its fallback response");
        }

        Ok(body)
    }
}

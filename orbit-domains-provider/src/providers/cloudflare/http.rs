//! Cloudflare HTTP request helpers

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CF_API_BASE, CloudflareAdapter, CloudflareResponse};

impl CloudflareAdapter {
    /// Execute a request against the v4 API and unwrap the response envelope.
    ///
    /// Transport-level failures (timeout, 429, 5xx) are classified by
    /// `HttpUtils`; envelope-level failures go through the error-code map.
    pub(crate) async fn request<T, B>(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let url = format!("{CF_API_BASE}{path}");
        let method_name = method.as_str().to_string();

        let mut builder = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {token}"));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let (_status, text) =
            HttpUtils::execute_request(builder, self.provider_name(), &method_name, &url).await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&text, self.provider_name())?;

        if !cf_response.success {
            let (code, message) = cf_response
                .errors
                .and_then(|errors| {
                    errors
                        .first()
                        .map(|e| (e.code.to_string(), e.message.clone()))
                })
                .unwrap_or_else(|| (String::new(), "Unknown error".to_string()));
            let err = self.map_error(RawApiError::with_code(code, message), context);
            if err.is_expected() {
                log::warn!("[cloudflare] API error: {err}");
            } else {
                log::error!("[cloudflare] API error: {err}");
            }
            return Err(err);
        }

        Ok(cf_response)
    }

    /// Execute a request and require the `result` field.
    pub(crate) async fn request_result<T, B>(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        context: ErrorContext,
    ) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + ?Sized,
    {
        let response = self
            .request::<T, B>(token, method, path, body, context)
            .await?;
        response
            .result
            .ok_or_else(|| self.parse_error("missing result field in response"))
    }
}

use std::borrow::Cow;
use std::future::Future;

use grafana_core::GrafanaError;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Runs `operation` until it finishes or `ct` is cancelled. On cancellation
/// the operation is dropped along with any request it has in flight.
pub async fn until_cancelled<T, F>(
    ct: &CancellationToken,
    operation: F,
) -> Result<T, GrafanaError>
where
    F: Future<Output = Result<T, GrafanaError>>,
{
    tokio::select! {
        () = ct.cancelled() => Err(GrafanaError::Cancelled),
        outcome = operation => outcome,
    }
}

/// Runs a tool operation and renders its outcome. Grafana failures become
/// tool-level error results; only result encoding is a protocol error.
pub async fn respond<T, F>(
    context: &RequestContext<RoleServer>,
    operation: F,
) -> Result<CallToolResult, ErrorData>
where
    T: Serialize,
    F: Future<Output = Result<T, GrafanaError>>,
{
    match until_cancelled(&context.ct, operation).await {
        Ok(value) => json_success(&value),
        Err(err) => Ok(tool_error(&err)),
    }
}

/// Pretty-printed JSON in a single text content.
pub fn json_success<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let text = to_pretty_json(value)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub fn tool_error(err: &GrafanaError) -> CallToolResult {
    debug!(error = %err, "tool call failed");
    CallToolResult::error(vec![Content::text(err.to_string())])
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ErrorData> {
    serde_json::to_string_pretty(value).map_err(|err| {
        mcp_err(
            ErrorCode::INTERNAL_ERROR,
            format!("encoding result: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::extract::State;
    use axum::routing::get;
    use grafana_core::{GrafanaClient, GrafanaConfig};
    use serde_json::json;
    use tokio::sync::Notify;

    fn text_of(result: &CallToolResult) -> &str {
        result.content[0]
            .as_text()
            .map(|text| text.text.as_str())
            .expect("text content")
    }

    #[test]
    fn success_is_two_space_indented_json() {
        let result = json_success(&json!([{"uid": "u1"}])).expect("encodes");
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "[\n  {\n    \"uid\": \"u1\"\n  }\n]");
    }

    #[test]
    fn empty_listing_renders_as_empty_array() {
        let empty: Vec<String> = Vec::new();
        let result = json_success(&empty).expect("encodes");
        assert_eq!(text_of(&result), "[]");
    }

    #[test]
    fn failures_are_tool_errors_carrying_the_message() {
        let result = tool_error(&GrafanaError::UpstreamError {
            status: 502,
            body: "bad gateway".to_string(),
        });
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "API returned status 502: bad gateway");
    }

    #[tokio::test]
    async fn cancelled_token_stops_a_pending_operation() {
        let ct = CancellationToken::new();
        ct.cancel();

        let outcome = until_cancelled(&ct, std::future::pending::<Result<(), GrafanaError>>()).await;

        assert!(matches!(outcome, Err(GrafanaError::Cancelled)));
    }

    #[tokio::test]
    async fn finished_operations_ignore_the_token() {
        let ct = CancellationToken::new();
        let outcome = until_cancelled(&ct, async { Ok::<_, GrafanaError>(7) }).await;
        assert_eq!(outcome.expect("operation result"), 7);
    }

    #[tokio::test]
    async fn cancelling_mid_flight_drops_the_grafana_request() {
        let arrived = Arc::new(Notify::new());
        let router = Router::new()
            .route(
                "/api/v1/provisioning/alert-rules",
                get(|State(arrived): State<Arc<Notify>>| async move {
                    arrived.notify_one();
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    axum::Json(json!([]))
                }),
            )
            .with_state(arrived.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake grafana");
        let addr = listener.local_addr().expect("fake grafana address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("fake grafana serves");
        });
        let config = GrafanaConfig::new(format!("http://{addr}"), "test-token")
            .with_timeout(Duration::from_secs(60));
        let client = GrafanaClient::new(&config).expect("client builds");

        let ct = CancellationToken::new();
        let canceller = ct.clone();
        tokio::spawn(async move {
            arrived.notified().await;
            canceller.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(5),
            until_cancelled(&ct, client.alerting().rules(0)),
        )
        .await
        .expect("returns before the handler finishes");

        assert!(matches!(outcome, Err(GrafanaError::Cancelled)));
    }
}

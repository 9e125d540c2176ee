//! Line-oriented console over stdin/stdout.
//!
//! Every input line is a JSON-RPC request; every non-notification gets one
//! response line. Lines are handled one at a time and the [`Session`]
//! produced by one command is the input of the next.

pub mod handler;
pub mod protocol;
pub mod session;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

use crate::AppState;
use handler::handle_console_request;
use protocol::{error_codes, Request, Response};
pub use session::{FormTarget, Session, SessionError};

/// Runs the console until EOF or an I/O error. Returns the final session.
pub async fn run_console<R, W>(state: AppState, reader: R, mut writer: W) -> Session
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("🚀 Console ready, reading commands from stdin...");

    let mut session = Session::from_config(&state.config);
    let mut lines = reader.lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("EOF received, shutting down console");
                break;
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Received: {}", line);

        let response = match parse_request(line) {
            Ok(request) => {
                let (next, response) = handle_console_request(request, &state, session).await;
                session = next;
                response
            }
            Err(response) => Some(response),
        };

        if let Some(response) = response {
            if let Ok(response_json) = serde_json::to_string(&response) {
                debug!("Sending: {}", response_json);
                if let Err(e) = write_line(&mut writer, &response_json).await {
                    error!("Failed to write response: {}", e);
                    break;
                }
            }
        }
    }

    info!("Console shutting down");
    session
}

/// Not JSON at all is a parse error; JSON that is not a request object
/// (no `method`, wrong types) is an invalid request.
fn parse_request(line: &str) -> Result<Request, Response> {
    let value: serde_json::Value = serde_json::from_str(line).map_err(|parse_error| {
        error!("JSON parse error: {}", parse_error);
        Response::error(
            serde_json::Value::Null,
            error_codes::PARSE_ERROR,
            format!("Parse error: {}", parse_error),
        )
    })?;
    let id = value.get("id").cloned().unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value).map_err(|e| {
        error!("Invalid request: {}", e);
        Response::error(id, error_codes::INVALID_REQUEST, format!("Invalid request: {}", e))
    })
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(format!("{}\n", line).as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::{json, Value};

    async fn run(input: &str) -> (Session, Vec<Value>) {
        let state = AppState::new(Config::default()).unwrap();
        let mut out = Vec::new();
        let session = run_console(state, input.as_bytes(), &mut out).await;
        let responses = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (session, responses)
    }

    #[tokio::test]
    async fn test_session_threads_through_commands() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"endpoint/select","params":{"name":"Native Crypto Transfer"}}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"form/set","params":{"field":"value","value":"7"}}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"form/set","params":{"field":"gasLimit","value":"lots"}}"#,
        ]
        .join("\n");
        let (session, responses) = run(&input).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["endpoint"], "Native Crypto Transfer");
        assert_eq!(responses[2]["error"]["data"]["kind"], "InvalidFieldValue");
        // the failed edit keeps the earlier state
        assert_eq!(session.body_values["value"], json!(7));
        assert_eq!(session.body_values["gasLimit"], json!(21000));
    }

    #[tokio::test]
    async fn test_parse_errors_and_notifications() {
        let input = "not json\n\n{\"jsonrpc\":\"2.0\",\"method\":\"catalog/categories\"}\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"nope\"}\n";
        let (_, responses) = run(input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(responses[1]["id"], 9);
        assert_eq!(responses[1]["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_json_that_is_not_a_request() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":4,\"params\":{}}\n[1, 2]\n";
        let (_, responses) = run(input).await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 4);
        assert_eq!(responses[0]["error"]["code"], error_codes::INVALID_REQUEST);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_send_without_credentials_is_rejected_locally() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"endpoint/select","params":{"name":"Get Gas Price"}}"#,
            r#"{"jsonrpc":"2.0","id":2,"method":"request/send"}"#,
        ]
        .join("\n");
        let (_, responses) = run(&input).await;

        assert_eq!(responses[1]["error"]["data"]["kind"], "IncompleteCredentials");
        assert_eq!(responses[1]["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unsupported_network_selection() {
        let input = r#"{"jsonrpc":"2.0","id":1,"method":"balance/check","params":{"network":"dogechain","address":"0x1"}}"#;
        let (_, responses) = run(input).await;
        assert_eq!(responses[0]["error"]["data"]["kind"], "UnsupportedNetwork");
    }
}

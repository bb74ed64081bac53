//! JSON-lines bridge between an external agent framework and the registry.
//!
//! Each input line is `{"tool": "...", "arguments": {...}}`; each output line
//! is `{"tool": "...", "ok": bool, "output": "..."}`. Calls run one at a time,
//! in order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::ToolRegistry;

#[derive(Debug, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolReply {
    pub tool: String,
    pub ok: bool,
    pub output: String,
}

/// Answer one request line
pub async fn handle_line(registry: &ToolRegistry, line: &str) -> ToolReply {
    let call: ToolCall = match serde_json::from_str(line) {
        Ok(call) => call,
        Err(e) => {
            return ToolReply {
                tool: String::new(),
                ok: false,
                output: format!("Error: Malformed tool call: {}", e),
            };
        }
    };

    match registry.dispatch(&call.tool, call.arguments).await {
        Ok(output) => ToolReply {
            tool: call.tool,
            ok: true,
            output,
        },
        Err(e) => ToolReply {
            tool: call.tool,
            ok: false,
            output: format!("Error: {}", e),
        },
    }
}

/// Serve tool calls from `reader` until EOF, writing replies to `writer`
pub async fn serve<R, W>(registry: &ToolRegistry, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = handle_line(registry, &line).await;
        debug!(tool = %reply.tool, ok = reply.ok, "tool reply");

        let mut encoded = serde_json::to_string(&reply)?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

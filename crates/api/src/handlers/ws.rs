use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use assigner_dispatcher::{ConnectionRegistry, OutboundFrame, WorkerSession};

use crate::routes::AppState;

/// Worker长连接入口
pub async fn worker_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| serve_worker(socket, state.registry))
}

/// 读循环在当前任务中运行，写入由独立任务消费出站队列
async fn serve_worker(socket: WebSocket, registry: Arc<ConnectionRegistry>) {
    let (mut sink, mut stream) = socket.split();
    let (mut session, mut outbound) = WorkerSession::open(registry);
    let connection_id = session.connection().id();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        debug!("连接 {} 写入失败: {}", connection_id, e);
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Close(_)) => break,
            Ok(message) => {
                if let Some(text) = frame_text(&message) {
                    session.handle_text(text).await;
                }
            }
            Err(e) => {
                warn!("连接 {} 读取失败: {}", connection_id, e);
                break;
            }
        }
    }

    debug!(
        "连接 {} 断开 (Worker: {:?})",
        connection_id,
        session.identity().map(|id| id.to_string())
    );
    // 关闭会发出Close帧，写任务随之退出
    session.close().await;
    let _ = writer.await;
}

/// 取出帧中的文本负载，二进制帧按UTF-8解码；控制帧返回None
fn frame_text(message: &Message) -> Option<&str> {
    match message {
        Message::Text(text) => Some(text.as_str()),
        Message::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("二进制帧不是有效的UTF-8，已忽略: {e}");
                None
            }
        },
        _ => None,
    }
}

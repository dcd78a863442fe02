//! Integration tests for the WebSocket transport: a real server and a real
//! `tokio-tungstenite` client exchanging frames over loopback.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use pounce_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on port 0 and returns (transport, resolved address).
    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().unwrap().to_string();
        (transport, addr)
    }

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().into_inner() > 0);

        // Server → client.
        server_conn
            .send(b"hello from server")
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"hello from server");

        // Client → server, as a binary frame.
        client_ws
            .send(Message::Binary(b"hello from client".to_vec().into()))
            .await
            .unwrap();
        let received = server_conn.recv().await.unwrap().expect("should have data");
        assert_eq!(received, b"hello from client");

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_accepts_text_frames() {
        // Browser clients send JSON as text frames; recv must hand the
        // bytes over either way.
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws
            .send(Message::Text("{\"type\":\"PLAY_CARD\"}".into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.unwrap().expect("should have data");
        assert_eq!(received, b"{\"type\":\"PLAY_CARD\"}");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        // The halves are locked independently: a parked recv must not
        // block sends from another task.
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = std::sync::Arc::new(server_handle.await.unwrap());

        // Park a reader with nothing to read.
        let reader = std::sync::Arc::clone(&server_conn);
        let read_task = tokio::spawn(async move { reader.recv().await });

        // Give the reader a moment to take the stream lock, then send.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        server_conn.send(b"unblocked").await.expect("send should not block");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"unblocked");

        // Unpark the reader by sending it something.
        client_ws
            .send(Message::Binary(b"done".to_vec().into()))
            .await
            .unwrap();
        let received = read_task.await.unwrap().unwrap().unwrap();
        assert_eq!(received, b"done");
    }

    #[tokio::test]
    async fn test_websocket_captures_upgrade_query_params() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let _client = tokio_tungstenite::connect_async(format!(
            "ws://{addr}/ws?sessionId=abc123&extra=1"
        ))
        .await
        .expect("client should connect");

        let server_conn = server_handle.await.unwrap();
        assert_eq!(server_conn.query_param("sessionId"), Some("abc123"));
        assert_eq!(server_conn.query_param("extra"), Some("1"));
        assert_eq!(server_conn.query_param("missing"), None);
    }

    #[tokio::test]
    async fn test_websocket_query_param_none_without_query() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let _client = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();
        assert_eq!(server_conn.query_param("sessionId"), None);
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;
        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }
}

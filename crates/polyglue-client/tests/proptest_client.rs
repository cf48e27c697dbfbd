//! Property-based tests for the client state machine

use polyglue_client::prelude::*;
use polyglue_transport::mock::{MockHttpTransport, MockSocket, MockWsTransport};
use polyglue_transport::{HttpRequest, HttpResponse, WsListener, WsMessage};
use proptest::prelude::*;

struct Silent;

impl ProtocolHandler for Silent {
    fn on_ws_connected(&self, _client: &Client) {}
    fn on_ws_message(&self, _client: &Client, _message: &WsMessage, _event_id: u64) {}
    fn on_ws_close(&self, _client: &Client) {}
    fn on_ws_error(&self, _client: &Client, _error: &GlueError) {}
    fn on_http_response(
        &self,
        _client: &Client,
        _request: &HttpRequest,
        _response: Result<&HttpResponse, &GlueError>,
    ) {
    }
}

#[derive(Debug, Clone)]
enum Step {
    Send(String),
    Close,
    RemoteClose,
    Error,
    Inbound,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => "[a-z]{0,8}".prop_map(Step::Send),
        1 => Just(Step::Close),
        1 => Just(Step::RemoteClose),
        1 => Just(Step::Error),
        2 => Just(Step::Inbound),
    ]
}

fn open_client() -> (Client, Arc<MockSocket>) {
    let http = MockHttpTransport::new();
    let ws = MockWsTransport::new();
    let io = IoRuntime::new(http.clone(), ws.clone());
    let client = Client::with_defaults();
    client.connect(&io, "t", Arc::new(Silent)).unwrap();
    http.complete_next(Ok(HttpResponse::json_ok(&serde_json::json!({
        "ok": true,
        "url": "wss://chat.test/socket",
        "self": {"id": "U1"}
    }))));
    let socket = MockSocket::new();
    ws.last_listener().unwrap().on_ws_connected(socket.clone());
    (client, socket)
}

proptest! {
    #[test]
    fn prop_event_ids_count_successful_sends(steps in prop::collection::vec(step(), 0..40)) {
        let (client, socket) = open_client();
        let mut expected_id = 0_u64;

        for step in steps {
            let before = client.state();
            match step {
                Step::Send(text) => match client.ws_send_text(text) {
                    Ok(id) => {
                        prop_assert_eq!(before, ConnectionState::SocketOpen);
                        expected_id += 1;
                        prop_assert_eq!(id, expected_id);
                    }
                    Err(GlueError::InvalidState { .. }) => {
                        prop_assert_ne!(before, ConnectionState::SocketOpen);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                },
                Step::Close => {
                    let result = client.close();
                    prop_assert_eq!(result.is_ok(), before == ConnectionState::SocketOpen);
                }
                Step::RemoteClose => WsListener::on_ws_close(&client),
                Step::Error => WsListener::on_ws_error(&client, GlueError::Transport("reset".into())),
                Step::Inbound => WsListener::on_ws_message(&client, WsMessage::text("{}")),
            }

            let after = client.state();
            prop_assert!(before == after || before.can_transition_to(after));
            prop_assert_eq!(client.event_id(), expected_id);
        }

        prop_assert_eq!(socket.sent().len() as u64, expected_id);
    }

    #[test]
    fn prop_terminal_state_is_sticky(errors_first in any::<bool>(), extra in 0usize..5) {
        let (client, _socket) = open_client();
        if errors_first {
            WsListener::on_ws_error(&client, GlueError::Transport("reset".into()));
        } else {
            WsListener::on_ws_close(&client);
        }
        let terminal = client.state();
        prop_assert!(terminal.is_terminal());

        for _ in 0..extra {
            WsListener::on_ws_close(&client);
            WsListener::on_ws_error(&client, GlueError::Transport("late".into()));
            prop_assert!(client.ws_send_text("x").is_err());
        }

        prop_assert_eq!(client.state(), terminal);
    }
}

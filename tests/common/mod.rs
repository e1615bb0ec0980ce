#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chess_core::{Game, Move};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use server::db::MemorySessionStore;
use server::engine::{EngineError, MoveSource};
use server::mediator::Mediator;

/// Engine that plays queued UCI moves and fails once the queue runs dry.
#[derive(Default)]
pub struct ScriptedEngine {
    moves: Mutex<VecDeque<String>>,
}

impl ScriptedEngine {
    pub fn new(moves: &[&str]) -> Self {
        let engine = Self::default();
        for m in moves {
            engine.push(m);
        }
        engine
    }

    pub fn push(&self, uci: &str) {
        self.moves.lock().unwrap().push_back(uci.to_string());
    }
}

impl MoveSource for ScriptedEngine {
    async fn best_move(&self, game: &Game, _budget: Duration) -> Result<Move, EngineError> {
        let uci = self.moves.lock().unwrap().pop_front().ok_or(EngineError::NoMove)?;
        game.find_uci(&uci).ok_or(EngineError::IllegalMove(uci))
    }
}

pub type TestMediator = Mediator<ScriptedEngine, MemorySessionStore>;

pub struct TestApp {
    pub base_url: String,
    pub mediator: Arc<TestMediator>,
    client: Client,
}

/// Serve the app on an ephemeral port with an in-memory store.
pub async fn spawn_app(engine_moves: &[&str]) -> TestApp {
    let mediator = Arc::new(Mediator::new(
        ScriptedEngine::new(engine_moves),
        MemorySessionStore::new(),
        Duration::from_millis(100),
    ));
    let app = server::app(mediator.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        mediator,
        client: Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post_to(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    pub async fn post(&self, body: &Value) -> (StatusCode, Value) {
        self.post_to("/webhook", body).await
    }

    /// Post and return the spoken text of a successful reply.
    pub async fn say(&self, body: &Value) -> String {
        let (status, res) = self.post(body).await;
        assert_eq!(status, StatusCode::OK, "unexpected reply {res}");
        speech(&res)
    }

    pub async fn has_session(&self, session: &str) -> bool {
        use server::db::SessionStore;
        self.mediator.store().exists(session).await.unwrap()
    }
}

pub fn speech(res: &Value) -> String {
    res["payload"]["google"]["richResponse"]["items"][0]["simpleResponse"]["textToSpeech"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

pub fn expects_response(res: &Value) -> bool {
    res["payload"]["google"]["expectUserResponse"].as_bool().unwrap_or(false)
}

/// Dialogflow fulfillment request for `action`.
pub fn request(session: &str, action: &str, parameters: Value) -> Value {
    request_with_text(session, action, "", parameters)
}

pub fn request_with_text(session: &str, action: &str, query_text: &str, parameters: Value) -> Value {
    json!({
        "responseId": "e7f1d3a0-0000-4b5c-9c1e-000000000000",
        "session": format!("projects/assistant-chess/agent/sessions/{session}"),
        "queryResult": {
            "queryText": query_text,
            "action": action,
            "parameters": parameters,
            "allRequiredParamsPresent": true,
            "languageCode": "en"
        },
        "originalDetectIntentRequest": { "source": "google", "payload": {} }
    })
}

pub fn choose_color(session: &str, key: &str) -> Value {
    json!({
        "session": format!("projects/assistant-chess/agent/sessions/{session}"),
        "queryResult": { "queryText": "actions_intent_OPTION", "action": "choose_color", "parameters": {} },
        "originalDetectIntentRequest": {
            "source": "google",
            "payload": {
                "inputs": [{
                    "intent": "actions.intent.OPTION",
                    "rawInputs": [{ "inputType": "VOICE", "query": key }],
                    "arguments": [
                        { "name": "text", "rawText": key, "textValue": key },
                        { "name": "OPTION", "textValue": key }
                    ]
                }]
            }
        }
    })
}

pub fn two_squares(session: &str, from: &str, to: &str) -> Value {
    request(session, "two_squares", json!({ "squares": [from, to], "piece": "" }))
}

pub fn piece_and_square(session: &str, piece: &str, square: &str) -> Value {
    request(
        session,
        "piece_and_square",
        json!({ "piece": piece, "pawn": "", "square": square, "promotion": "" }),
    )
}

pub fn castle(session: &str, text: &str) -> Value {
    request_with_text(session, "castle", text, json!({}))
}

pub fn start_white(session: &str) -> Value {
    request(session, "welcome", json!({ "color": "white" }))
}

//! Line-oriented JSON request handling for `ygg-session`.
//!
//! One request object per line in, one response object per line out:
//! `{"ok": <payload>}` on success, `{"error": {"kind", "message"}}` on
//! failure. Icon bytes travel base64-encoded.

use crate::catalog::identity::EntityId;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::icon::{Icon, IconOrigin};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Error kind for lines that are not a valid request.
pub const BAD_REQUEST_KIND: &str = "bad_request";
/// Error kind for results that could not be encoded as JSON.
pub const ENCODE_FAILED_KIND: &str = "encode_failed";

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Item {
        id: EntityId,
    },
    Children {
        #[serde(default)]
        id: Option<EntityId>,
    },
    Actions {
        id: EntityId,
    },
    Indirects {
        #[serde(default)]
        item: Option<EntityId>,
        action: EntityId,
    },
    Run {
        direct: EntityId,
        action: EntityId,
        #[serde(default)]
        indirect: Option<EntityId>,
    },
    ItemIcon {
        id: EntityId,
    },
    ActionIcon {
        id: EntityId,
    },
    Prime,
}

#[derive(Debug, Serialize)]
struct IconPayload {
    origin: IconOrigin,
    base64: String,
}

impl From<Icon> for IconPayload {
    fn from(icon: Icon) -> Self {
        Self {
            origin: icon.origin,
            base64: base64::engine::general_purpose::STANDARD.encode(&icon.bytes),
        }
    }
}

/// Parse and execute one request line, returning the response object.
pub async fn handle_line(engine: &Engine, line: &str) -> Value {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle_request(engine, request).await,
        Err(err) => error_response(BAD_REQUEST_KIND, &err.to_string()),
    }
}

pub async fn handle_request(engine: &Engine, request: Request) -> Value {
    match request {
        Request::Item { id } => respond(engine.get_item_by_id(&id)),
        Request::Children { id } => respond(engine.get_children_for_item(id.as_ref()).await),
        Request::Actions { id } => respond(engine.get_actions_for_item(&id).await),
        Request::Indirects { item, action } => respond(
            engine
                .get_indirects_for_action(item.as_ref(), &action)
                .await,
        ),
        Request::Run {
            direct,
            action,
            indirect,
        } => respond(
            engine
                .run_action(&direct, &action, indirect.as_ref())
                .await,
        ),
        Request::ItemIcon { id } => respond(
            engine
                .get_icon_for_item(&id)
                .await
                .map(IconPayload::from),
        ),
        Request::ActionIcon { id } => respond(
            engine
                .get_icon_for_action(&id)
                .await
                .map(IconPayload::from),
        ),
        Request::Prime => {
            engine.prime().await;
            ok_response(true)
        }
    }
}

fn respond<T: Serialize>(result: EngineResult<T>) -> Value {
    match result {
        Ok(payload) => ok_response(payload),
        Err(err) => error_response(err.kind(), &err.report()),
    }
}

fn ok_response<T: Serialize>(payload: T) -> Value {
    match serde_json::to_value(payload) {
        Ok(value) => json!({ "ok": value }),
        Err(err) => error_response(ENCODE_FAILED_KIND, &format!("encoding response: {err}")),
    }
}

fn error_response(kind: &str, message: &str) -> Value {
    json!({ "error": { "kind": kind, "message": message } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::registry::CapabilityRegistry;
    use crate::context::ResolutionContext;
    use crate::root_catalog::CorePlugin;

    fn engine() -> Engine {
        let registry = CapabilityRegistry::builder()
            .plugin(&CorePlugin::new(Vec::new()))
            .build()
            .expect("registry builds");
        Engine::new(ResolutionContext::new(registry))
    }

    #[test]
    fn requests_parse_by_op() {
        let request: Request =
            serde_json::from_str(r#"{"op":"run","direct":"a","action":"b"}"#).expect("parses");
        assert!(matches!(request, Request::Run { indirect: None, .. }));
        let request: Request = serde_json::from_str(r#"{"op":"children"}"#).expect("parses");
        assert!(matches!(request, Request::Children { id: None }));
        assert!(serde_json::from_str::<Request>(r#"{"op":"explode"}"#).is_err());
    }

    #[tokio::test]
    async fn malformed_lines_are_bad_requests() {
        let response = handle_line(&engine(), "not json").await;
        assert_eq!(response["error"]["kind"], BAD_REQUEST_KIND);
    }

    #[tokio::test]
    async fn unknown_ids_report_not_found() {
        let response = handle_line(&engine(), r#"{"op":"item","id":"missing"}"#).await;
        assert_eq!(response["error"]["kind"], "not_found");
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .contains("missing")
        );
    }

    #[tokio::test]
    async fn root_item_and_empty_catalog_succeed() {
        let engine = engine();
        let response = handle_line(&engine, r#"{"op":"item","id":"item-catalog"}"#).await;
        assert_eq!(response["ok"]["id"], "item-catalog");
        let response = handle_line(&engine, r#"{"op":"children","id":"default"}"#).await;
        assert_eq!(response["ok"], json!([]));
        let response = handle_line(&engine, r#"{"op":"prime"}"#).await;
        assert_eq!(response["ok"], true);
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refuses to encode"))
        }
    }

    #[test]
    fn encoding_failures_become_error_responses() {
        let response = respond(Ok(Unencodable));
        assert!(response.get("ok").is_none());
        assert_eq!(response["error"]["kind"], ENCODE_FAILED_KIND);
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .contains("refuses to encode")
        );
    }
}

use super::OperatorBus;
use super::OperatorEvent;
use super::signature;
use crate::error::ApiError;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::web;
use serde_json::Value;
use serde_json::json;

const SIGNATURE_HEADER: &str = "x-square-hmacsha256-signature";

/// `POST /webhooks/square`. Test payloads skip the signature; anything
/// else must carry a valid HMAC over the notification url plus the raw
/// body. Verified batches become operator events.
pub async fn ingest(
    bus: web::Data<OperatorBus>,
    body: web::Bytes,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("unparseable webhook body: {}", e)))?;
    let kind = payload["type"].as_str().unwrap_or_default().to_string();

    if kind != "test" {
        let key = bus
            .key()
            .ok_or_else(|| ApiError::Forbidden("webhook signature key not configured".into()))?;
        let signature = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Forbidden("missing webhook signature".into()))?;
        let info = req.connection_info();
        let url = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
        if !signature::verify(key, &url, &body, signature) {
            log::warn!("webhook signature mismatch for {}", url);
            return Err(ApiError::Forbidden("webhook signature mismatch".into()));
        }
    }

    match event(&kind, &payload) {
        Some(event) => {
            log::info!("webhook {} fanned out to operators", kind);
            bus.broadcast(&event).await;
        }
        None => log::info!("webhook type {} ignored", kind),
    }
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": { "received": true },
        "timestamp": crate::now_ms(),
    })))
}

/// Shape the notification into the operator vocabulary. Orders map to
/// their own types; unknown types are acknowledged but not rebroadcast.
fn event(kind: &str, payload: &Value) -> Option<OperatorEvent> {
    let summary = summarize(payload);
    match kind {
        "test" => Some(OperatorEvent::TestEvent(summary)),
        "order.created" => Some(OperatorEvent::NewOrder(summary)),
        "order.updated" | "order.fulfillment.updated" => {
            Some(OperatorEvent::OrderUpdated(summary))
        }
        _ => None,
    }
}

fn summarize(payload: &Value) -> Value {
    json!({
        "eventId": payload["event_id"],
        "merchantId": payload["merchant_id"],
        "createdAt": payload["created_at"],
        "object": payload["data"]["object"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_and_tests_map_to_their_event_types() {
        let payload = json!({
            "event_id": "e-1",
            "merchant_id": "m-1",
            "type": "order.created",
            "data": { "object": { "order_id": "o-1" } },
        });
        let event = event("order.created", &payload).expect("mapped");
        assert_eq!(event.kind(), "new-order");
        let raw: Value =
            serde_json::from_str(&event.envelope()).expect("json");
        assert_eq!(raw["data"]["eventId"], "e-1");
        assert_eq!(raw["data"]["object"]["order_id"], "o-1");

        assert_eq!(
            event_kind_of(json!({ "type": "test", "data": {} })),
            Some("test-event")
        );
        assert_eq!(
            event_kind_of(json!({ "type": "order.updated" })),
            Some("order-updated")
        );
        assert_eq!(event_kind_of(json!({ "type": "customer.created" })), None);
    }

    fn event_kind_of(payload: Value) -> Option<&'static str> {
        let kind = payload["type"].as_str().unwrap_or_default().to_string();
        event(&kind, &payload).map(|e| e.kind())
    }
}

use didcomm::Message;
use serde_json::Value;

/// Checks the explicit decoration requesting responses on the same route.
///
/// The pickup protocol refuses to operate without it.
pub fn transport_return_route_is_decorated_all(message: &Message) -> bool {
    message
        .extra_headers
        .get("return_route")
        .and_then(Value::as_str)
        == Some("all")
}

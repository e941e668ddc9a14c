//! Pulling the JSON payload out of a free-text model reply.

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Extract the JSON text from a model reply.
///
/// Models often wrap their answer in Markdown fences. A fence labelled
/// `json` wins; otherwise the first generic fence pair is used; otherwise the
/// whole reply. The result is trimmed. An unterminated fence yields
/// everything after the opening marker.
pub fn extract_json_block(reply: &str) -> &str {
    let text = reply.trim();

    let inner = if let Some((_, rest)) = text.split_once(JSON_FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once(FENCE) {
        rest.split(FENCE).next().unwrap_or(rest)
    } else {
        text
    };

    inner.trim()
}

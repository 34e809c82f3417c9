use serde_json::{json, Value};

/// A button press as the bot platform delivers it
pub fn button_press(telegram_id: i64, message_id: i64, data: &str) -> Value {
    json!({
        "update_id": message_id,
        "callback_query": {
            "id": format!("cb-{}", message_id),
            "from": { "id": telegram_id, "is_bot": false, "first_name": "Member" },
            "chat_instance": format!("instance-{}", telegram_id),
            "data": data,
            "message": {
                "message_id": message_id,
                "date": 1709287200,
                "chat": { "id": telegram_id, "type": "private", "first_name": "Member" },
                "text": "Will you attend?"
            }
        }
    })
}

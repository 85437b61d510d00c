use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The participant on the other side of this message from `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    #[validate(length(min = 1, max = 4000, message = "Message must not be empty"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub counterpart_name: String,
    pub last_message: Message,
    pub unread_count: i64,
}

/// Groups a user's messages (newest first) into one summary per counterpart.
///
/// The returned summaries keep the newest-first order of their last message.
/// Counterpart names are resolved by the caller.
pub fn summarize_conversations(user_id: Uuid, messages: &[Message]) -> Vec<(Uuid, Message, i64)> {
    let mut summaries: Vec<(Uuid, Message, i64)> = Vec::new();

    for message in messages {
        let counterpart = message.counterpart(user_id);
        let unread = i64::from(message.receiver_id == user_id && !message.read);

        match summaries.iter_mut().find(|(id, _, _)| *id == counterpart) {
            Some(entry) => entry.2 += unread,
            None => summaries.push((counterpart, message.clone(), unread)),
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn message(from: Uuid, to: Uuid, minutes_ago: i64, read: bool) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: from,
            receiver_id: to,
            content: "hello".to_string(),
            read,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_summaries_group_by_counterpart() {
        let me = Uuid::new_v4();
        let warden = Uuid::new_v4();
        let friend = Uuid::new_v4();

        let messages = vec![
            message(warden, me, 1, false),
            message(me, friend, 2, false),
            message(warden, me, 3, false),
            message(me, warden, 4, true),
            message(friend, me, 5, true),
        ];

        let summaries = summarize_conversations(me, &messages);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].0, warden);
        assert_eq!(summaries[0].2, 2);
        assert_eq!(summaries[1].0, friend);
        // Unread messages I sent do not count against me.
        assert_eq!(summaries[1].2, 0);
    }
}

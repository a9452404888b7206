use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a user's task list.
///
/// Everything except the completion fields is fixed once the item is appended.
/// `completed_at` and `is_done` change together, exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_done: bool,
}

impl TaskItem {
    pub fn new(description: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            description: description.into(),
            created_at,
            completed_at: None,
            is_done: false,
        }
    }

    /// Marks the item done at `now`. Returns `false` if it was already done.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_done {
            return false;
        }
        self.is_done = true;
        self.completed_at = Some(now);
        true
    }
}

/// Ordered task list of one user. Insertion order is preserved.
///
/// This is the state hosted by the task list actor and the shape of its persisted blob.
/// Callers only ever see copies of the items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    #[serde(default)]
    pub items: Vec<TaskItem>,
}

impl TodoList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_item_is_open() {
        let item = TaskItem::new("buy milk", at(9));
        assert!(!item.is_done);
        assert!(item.completed_at.is_none());
        assert_eq!(item.created_at, at(9));
    }

    #[test]
    fn test_complete_happens_once() {
        let mut item = TaskItem::new("buy milk", at(9));
        assert!(item.complete(at(10)));
        assert!(!item.complete(at(11)));
        assert_eq!(item.completed_at, Some(at(10)));
    }

    #[test]
    fn test_blob_uses_camel_case_fields() {
        let list = TodoList {
            items: vec![TaskItem::new("buy milk", at(9))],
        };
        let json = serde_json::to_value(&list).unwrap();
        let item = &json["items"][0];
        assert_eq!(item["description"], "buy milk");
        assert_eq!(item["isDone"], false);
        assert!(item.get("createdAt").is_some());
    }
}

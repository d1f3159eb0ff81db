//! Reading details and reading-status lists.
//!
//! Shortform and blockchain entries describe things read, watched or
//! listened to. The medium is inferred from the entry's `parenthetical`
//! attribute and rendered by the frontend as an icon plus a verb.

use serde::Serialize;

use crate::models::ContentEntry;

/// Icon and verb describing how an entry was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingDetails {
    pub icon: &'static str,
    pub verb: &'static str,
}

const WATCHED: ReadingDetails = ReadingDetails {
    icon: "tv",
    verb: "Watched",
};
const LISTENED: ReadingDetails = ReadingDetails {
    icon: "headphones",
    verb: "Listened to",
};
const READ: ReadingDetails = ReadingDetails {
    icon: "newspaper",
    verb: "Read",
};

pub fn reading_details(entry: &ContentEntry) -> ReadingDetails {
    let Some(parenthetical) = entry.extra_str("parenthetical") else {
        return READ;
    };
    let parenthetical = parenthetical.to_lowercase();
    if parenthetical.contains("video") {
        WATCHED
    } else if parenthetical.contains("podcast") {
        LISTENED
    } else {
        READ
    }
}

/// Status of a book on the reading list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    CurrentlyReading,
    Read,
    Reference,
    Shelved,
    ToRead,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 5] = [
        ReadingStatus::CurrentlyReading,
        ReadingStatus::Read,
        ReadingStatus::Reference,
        ReadingStatus::Shelved,
        ReadingStatus::ToRead,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            ReadingStatus::CurrentlyReading => "currentlyReading",
            ReadingStatus::Read => "read",
            ReadingStatus::Reference => "reference",
            ReadingStatus::Shelved => "shelved",
            ReadingStatus::ToRead => "toRead",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            ReadingStatus::CurrentlyReading => "currently reading",
            ReadingStatus::Read => "read",
            ReadingStatus::Reference => "reference",
            ReadingStatus::Shelved => "shelved",
            ReadingStatus::ToRead => "to read",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub text: &'static str,
    pub value: &'static str,
}

impl From<ReadingStatus> for StatusOption {
    fn from(status: ReadingStatus) -> Self {
        Self {
            text: status.text(),
            value: status.value(),
        }
    }
}

/// Status choices per reading list. Only the non-fiction list offers `reference`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingStatusLists {
    pub pleasure: Vec<StatusOption>,
    pub reference: Vec<StatusOption>,
}

pub fn reading_status_lists() -> ReadingStatusLists {
    ReadingStatusLists {
        pleasure: ReadingStatus::ALL
            .into_iter()
            .filter(|s| *s != ReadingStatus::Reference)
            .map(StatusOption::from)
            .collect(),
        reference: ReadingStatus::ALL.into_iter().map(StatusOption::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_with(extra: serde_json::Value) -> ContentEntry {
        let mut body = json!({ "started": "2024-01-01" });
        if let (Some(obj), Some(add)) = (body.as_object_mut(), extra.as_object()) {
            obj.extend(add.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_video_is_watched() {
        let details = reading_details(&entry_with(json!({ "parenthetical": "YouTube Video" })));
        assert_eq!(details, WATCHED);
    }

    #[test]
    fn test_podcast_is_listened() {
        let details = reading_details(&entry_with(json!({ "parenthetical": "podcast" })));
        assert_eq!(details.verb, "Listened to");
    }

    #[test]
    fn test_default_is_read() {
        assert_eq!(reading_details(&entry_with(json!({}))), READ);
        assert_eq!(reading_details(&entry_with(json!({ "parenthetical": "pdf" }))), READ);
    }

    #[test]
    fn test_pleasure_list_omits_reference() {
        let lists = reading_status_lists();
        assert_eq!(lists.reference.len(), 5);
        assert_eq!(lists.pleasure.len(), 4);
        assert!(lists.pleasure.iter().all(|s| s.value != "reference"));
        assert_eq!(lists.reference[4], StatusOption { text: "to read", value: "toRead" });
    }
}

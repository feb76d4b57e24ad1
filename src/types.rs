//! Shared data model (§3): CIDs, queue items, and extracted records.

/// An opaque, printable content identifier. Never parsed by the crawler.
pub type ContentId = String;

/// One item handed off through the crawl queue: a CID plus its display
/// filename (empty for a root announcement, the `Name` from a `DirLink` for
/// a directory child).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub cid: ContentId,
    pub filename: String,
}

impl QueueItem {
    pub fn root(cid: impl Into<ContentId>) -> Self {
        Self {
            cid: cid.into(),
            filename: String::new(),
        }
    }

    pub fn child(cid: impl Into<ContentId>, filename: impl Into<String>) -> Self {
        Self {
            cid: cid.into(),
            filename: filename.into(),
        }
    }
}

/// A fully extracted record, ready for the sink. `title`/`text` are present
/// iff `mime == "text/html"` (§8 property 3).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExtractedRecord {
    pub cid: ContentId,
    pub filename: String,
    pub mime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

//! Message-level header values, read once from the top-level header block.

use chrono::{DateTime, Utc};

use super::address::AddressList;

/// Header values of the outermost message.
///
/// Address lists are `None` when the header is absent or yields no mailbox.
/// `subject` and `message_id` hold decoded values; `in_reply_to` and
/// `references` hold the unfolded header text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub to: Option<AddressList>,
    pub reply_to: Option<AddressList>,
    pub from: Option<AddressList>,
    pub cc: Option<AddressList>,
    pub bcc: Option<AddressList>,
    /// Parsed `Date:`; `None` when absent or unparseable.
    pub date: Option<DateTime<Utc>>,
    pub subject: Option<String>,
    /// `Message-ID` without its angle brackets.
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub references: Option<String>,
}

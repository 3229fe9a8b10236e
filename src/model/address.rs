//! Email address lists (RFC 5322 §3.4): parsing and canonical formatting.

/// A single mailbox.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `display_name = "Juan García"`, `address = "juan@ejemplo.com"`
/// - `"user@example.com"` → `display_name = ""`, `address = "user@example.com"`
/// - `"postmaster"` → `display_name = ""`, `address = "postmaster"` (no domain is accepted)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct EmailAddress {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare address (`user@domain`, or just `user`).
    pub address: String,
}

impl EmailAddress {
    /// Parse a single mailbox from a header fragment.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    ///
    /// If parsing fails, the raw string is stored as `address`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self {
                display_name: String::new(),
                address: String::new(),
            };
        }

        if let Some(angle_start) = trimmed.rfind('<') {
            if let Some(angle_end) = trimmed.rfind('>') {
                if angle_end > angle_start {
                    let addr = trimmed[angle_start + 1..angle_end].trim().to_string();
                    let name_part = trimmed[..angle_start].trim();
                    return Self {
                        display_name: unquote(name_part),
                        address: addr,
                    };
                }
            }
        }

        Self {
            display_name: String::new(),
            address: trimmed.to_string(),
        }
    }

    /// `true` when neither a name nor an address was found.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_empty() && self.address.is_empty()
    }

    /// Canonical header form: `Name <address>`, `"Quoted, Name" <address>` or `address`.
    pub fn to_header_string(&self) -> String {
        if self.display_name.is_empty() {
            return self.address.clone();
        }
        let name = quote_if_needed(&self.display_name);
        if self.address.is_empty() {
            name
        } else {
            format!("{} <{}>", name, self.address)
        }
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_header_string())
    }
}

/// One member of an address list: a mailbox or a named group of mailboxes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub enum AddressEntry {
    Mailbox(EmailAddress),
    Group {
        name: String,
        members: Vec<EmailAddress>,
    },
}

impl AddressEntry {
    fn to_header_string(&self) -> String {
        match self {
            Self::Mailbox(addr) => addr.to_header_string(),
            Self::Group { name, members } => {
                let members: Vec<String> = members.iter().map(EmailAddress::to_header_string).collect();
                format!("{}: {};", quote_if_needed(name), members.join(", "))
            }
        }
    }
}

/// A parsed address-list header (`To`, `Cc`, `From`, …).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct AddressList {
    pub entries: Vec<AddressEntry>,
}

impl AddressList {
    /// Parse a comma-separated address list, including RFC 5322 groups.
    ///
    /// Handles quoted commas (`"Last, First" <a@b.com>, other@c.com`),
    /// groups (`Team: a@b.com, c@d.com;`) and drops `(comments)`.
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        let mut current = String::new();
        let mut group: Option<(String, Vec<EmailAddress>)> = None;
        let mut in_quotes = false;
        let mut in_angle = false;
        let mut comment_depth = 0usize;
        let mut escaped = false;

        for ch in raw.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
                continue;
            }
            if comment_depth > 0 {
                match ch {
                    '(' => comment_depth += 1,
                    ')' => comment_depth -= 1,
                    '\\' => escaped = true,
                    _ => {}
                }
                continue;
            }
            match ch {
                '\\' if in_quotes => {
                    current.push(ch);
                    escaped = true;
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                '(' if !in_quotes && !in_angle => comment_depth = 1,
                '<' if !in_quotes => {
                    in_angle = true;
                    current.push(ch);
                }
                '>' if !in_quotes => {
                    in_angle = false;
                    current.push(ch);
                }
                ':' if !in_quotes && !in_angle && group.is_none() => {
                    group = Some((unquote(current.trim()), Vec::new()));
                    current.clear();
                }
                ';' if !in_quotes && !in_angle && group.is_some() => {
                    if let Some((name, mut members)) = group.take() {
                        push_mailbox(&mut members, &current);
                        entries.push(AddressEntry::Group { name, members });
                    }
                    current.clear();
                }
                ',' if !in_quotes && !in_angle => {
                    match group.as_mut() {
                        Some((_, members)) => push_mailbox(members, &current),
                        None => {
                            let addr = EmailAddress::parse(&current);
                            if !addr.is_empty() {
                                entries.push(AddressEntry::Mailbox(addr));
                            }
                        }
                    }
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        // Unterminated group or last segment
        match group {
            Some((name, mut members)) => {
                push_mailbox(&mut members, &current);
                entries.push(AddressEntry::Group { name, members });
            }
            None => {
                let addr = EmailAddress::parse(&current);
                if !addr.is_empty() {
                    entries.push(AddressEntry::Mailbox(addr));
                }
            }
        }

        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply `decode` to every display and group name (RFC 2047 decoding).
    pub fn decode_names(&mut self, decode: impl Fn(&str) -> String) {
        for entry in &mut self.entries {
            match entry {
                AddressEntry::Mailbox(addr) => addr.display_name = decode(&addr.display_name),
                AddressEntry::Group { name, members } => {
                    *name = decode(name);
                    for addr in members {
                        addr.display_name = decode(&addr.display_name);
                    }
                }
            }
        }
    }

    /// Standard address-list text: entries joined by `", "`.
    pub fn to_header_string(&self) -> String {
        self.entries
            .iter()
            .map(AddressEntry::to_header_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn push_mailbox(members: &mut Vec<EmailAddress>, raw: &str) {
    let addr = EmailAddress::parse(raw);
    if !addr.is_empty() {
        members.push(addr);
    }
}

/// Strip surrounding double-quotes, resolve `\` escapes and trim whitespace.
fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        let inner = &trimmed[1..trimmed.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut escaped = false;
        for ch in inner.chars() {
            if escaped {
                out.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else {
                out.push(ch);
            }
        }
        out.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Quote a phrase when it contains RFC 5322 specials.
fn quote_if_needed(s: &str) -> String {
    const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];
    if !s.contains(SPECIALS) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

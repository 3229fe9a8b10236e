//! Read-only MIME tree handed to the classifier.

use std::borrow::Cow;

/// A parsed message: the envelope's single content object and everything below it.
#[derive(Debug, Clone)]
pub struct MessageTree<'m> {
    pub root: MimeNode<'m>,
}

/// A node of the MIME tree.
#[derive(Debug, Clone)]
pub enum MimeNode<'m> {
    /// Directly decodable content.
    Leaf(LeafPart<'m>),
    /// `multipart/*`, or an embedded `message/rfc822` wrapping its own root.
    Container(ContainerPart<'m>),
}

/// A part holding content.
#[derive(Debug, Clone)]
pub struct LeafPart<'m> {
    /// Declared `type/subtype` (lower-cased), `None` when the part has no `Content-Type`.
    pub content_type: Option<String>,
    /// Type implied by the context when none is declared.
    pub default_type: &'static str,
    /// `Content-Disposition: attachment`.
    pub attachment: bool,
    /// Filename from the disposition or content-type parameters; never empty.
    pub filename: Option<String>,
    /// Transfer-decoded content. Text keeps its declared charset.
    pub content: Cow<'m, [u8]>,
}

impl LeafPart<'_> {
    /// Declared type, or the contextual default.
    pub fn effective_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(self.default_type)
    }
}

/// A part holding only children.
#[derive(Debug, Clone)]
pub struct ContainerPart<'m> {
    pub content_type: String,
    pub children: Vec<MimeNode<'m>>,
}

impl<'m> MessageTree<'m> {
    pub fn new(root: MimeNode<'m>) -> Self {
        Self { root }
    }

    /// All nodes below the root, depth-first pre-order. The root itself is
    /// not yielded.
    pub fn descendants(&self) -> Descendants<'_, 'm> {
        let stack = match &self.root {
            MimeNode::Container(container) => container.children.iter().rev().collect(),
            MimeNode::Leaf(_) => Vec::new(),
        };
        Descendants { stack }
    }
}

/// Pre-order iterator over the nodes below a tree's root.
pub struct Descendants<'t, 'm> {
    stack: Vec<&'t MimeNode<'m>>,
}

impl<'t, 'm> Iterator for Descendants<'t, 'm> {
    type Item = &'t MimeNode<'m>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let MimeNode::Container(container) = node {
            self.stack.extend(container.children.iter().rev());
        }
        Some(node)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Hand-built trees for classifier and metadata tests.

    use super::*;

    pub fn leaf<'m>(content_type: &str, content: &'m [u8]) -> MimeNode<'m> {
        MimeNode::Leaf(LeafPart {
            content_type: Some(content_type.to_string()),
            default_type: "text/plain",
            attachment: false,
            filename: None,
            content: Cow::Borrowed(content),
        })
    }

    pub fn attachment<'m>(content_type: &str, filename: &str, content: &'m [u8]) -> MimeNode<'m> {
        MimeNode::Leaf(LeafPart {
            content_type: Some(content_type.to_string()),
            default_type: "text/plain",
            attachment: true,
            filename: Some(filename.to_string()),
            content: Cow::Borrowed(content),
        })
    }

    pub fn container<'m>(content_type: &str, children: Vec<MimeNode<'m>>) -> MimeNode<'m> {
        MimeNode::Container(ContainerPart {
            content_type: content_type.to_string(),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn content_of<'t>(node: &'t MimeNode<'_>) -> &'t [u8] {
        match node {
            MimeNode::Leaf(leaf) => leaf.content.as_ref(),
            MimeNode::Container(_) => b"<container>",
        }
    }

    #[test]
    fn test_descendants_pre_order() {
        let tree = MessageTree::new(container(
            "multipart/mixed",
            vec![
                container(
                    "multipart/alternative",
                    vec![leaf("text/plain", b"a"), leaf("text/html", b"b")],
                ),
                leaf("image/png", b"c"),
            ],
        ));
        let seen: Vec<&[u8]> = tree.descendants().map(content_of).collect();
        let expected: Vec<&[u8]> = vec![&b"<container>"[..], &b"a"[..], &b"b"[..], &b"c"[..]];
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_single_part_has_no_descendants() {
        let tree = MessageTree::new(leaf("text/plain", b"body"));
        assert_eq!(tree.descendants().count(), 0);
    }

    #[test]
    fn test_effective_type_falls_back_to_default() {
        let part = LeafPart {
            content_type: None,
            default_type: "message/rfc822",
            attachment: false,
            filename: None,
            content: Cow::Borrowed(&b""[..]),
        };
        assert_eq!(part.effective_type(), "message/rfc822");
    }
}

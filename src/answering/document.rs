//! Read-only policy text shared by every question in a request

/// Extracted policy document text
///
/// The lowercased form is computed once so rule evidence checks do not
/// re-lowercase the whole document for each question.
#[derive(Debug, Clone)]
pub struct PolicyDocument {
    text: String,
    lowered: String,
}

impl PolicyDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lowered = text.to_lowercase();
        Self { text, lowered }
    }

    /// Original text, case preserved
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased text used for evidence matching
    pub fn lowered(&self) -> &str {
        &self.lowered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowered_once() {
        let doc = PolicyDocument::new("Grace Period of THIRTY days.");
        assert_eq!(doc.text(), "Grace Period of THIRTY days.");
        assert_eq!(doc.lowered(), "grace period of thirty days.");
    }
}

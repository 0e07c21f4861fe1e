//! Builder for test notes with sensible defaults.

// Allow dead code since this is a test utility shared by several test crates
#![allow(dead_code)]

/// Builder for markdown notes with YAML frontmatter.
///
/// A note gets a `title` key by default so it passes the frontmatter gate.
#[derive(Debug, Clone)]
pub struct TestNote {
    fields: Vec<(String, String)>,
    body: String,
}

impl TestNote {
    /// Creates a new note with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            fields: vec![("title".to_string(), title.into())],
            body: String::new(),
        }
    }

    /// Creates a note with frontmatter but no `title`.
    pub fn untitled() -> Self {
        Self {
            fields: vec![("tags".to_string(), "[draft]".to_string())],
            body: String::new(),
        }
    }

    /// Adds a frontmatter field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Renders the note as file contents.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        out.push_str("---\n");
        out.push_str(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_title_and_body() {
        let note = TestNote::new("Hello").field("date", "2024-01-01").body("Text");
        assert_eq!(
            note.render(),
            "---\ntitle: Hello\ndate: 2024-01-01\n---\nText"
        );
    }

    #[test]
    fn untitled_note_has_no_title() {
        assert!(!TestNote::untitled().render().contains("title:"));
    }
}

//! The tag names the pipeline recognizes.
//!
//! Every recognized element name is a fixed prefix followed by identifier characters
//! (`[A-Za-z0-9_.-]`). Tags without the prefix are ordinary markdown text.

/// Prefix and element names of the tag family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVocabulary {
    pub prefix: String,
    /// Layout directive, e.g. `name="page.control" value="submit"`
    pub option: String,
    /// Titled group of visualizations
    pub container: String,
    /// Trend or chart visualization carrying JSON
    pub viz: String,
    pub question: String,
    /// Answer choice, child of a question
    pub choice: String,
    /// Free-text input, standalone or child of a question
    pub input: String,
}

impl Default for TagVocabulary {
    fn default() -> Self {
        Self {
            prefix: "ai-".to_string(),
            option: "option".to_string(),
            container: "container".to_string(),
            viz: "viz".to_string(),
            question: "question".to_string(),
            choice: "choice".to_string(),
            input: "input".to_string(),
        }
    }
}

impl TagVocabulary {
    /// Full element name for a short name, e.g. `"viz"` → `"ai-viz"`.
    pub fn tag(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Literal text every recognized opening tag starts with.
    pub fn opening_literal(&self) -> String {
        format!("<{}", self.prefix)
    }

    /// Literal text every closing tag of the family starts with.
    pub fn closing_literal(&self) -> String {
        format!("</{}", self.prefix)
    }

    pub fn is_option(&self, name: &str) -> bool {
        self.matches(name, &self.option)
    }

    pub fn is_container(&self, name: &str) -> bool {
        self.matches(name, &self.container)
    }

    pub fn is_viz(&self, name: &str) -> bool {
        self.matches(name, &self.viz)
    }

    pub fn is_question(&self, name: &str) -> bool {
        self.matches(name, &self.question)
    }

    pub fn is_choice(&self, name: &str) -> bool {
        self.matches(name, &self.choice)
    }

    pub fn is_input(&self, name: &str) -> bool {
        self.matches(name, &self.input)
    }

    fn matches(&self, name: &str, short: &str) -> bool {
        name.strip_prefix(self.prefix.as_str()) == Some(short)
    }
}

/// Characters allowed in an element name after the prefix.
pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

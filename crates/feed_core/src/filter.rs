/// Case-insensitive block-list of literal phrases.
///
/// An entry is excluded when any phrase occurs anywhere in its unfolded text,
/// not only in its title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRule {
    phrases: Vec<String>,
}

impl FilterRule {
    /// Build a rule from raw phrases. Phrases are trimmed and lowercased;
    /// blank phrases are skipped and duplicates collapse.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut folded: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !folded.contains(&phrase) {
                folded.push(phrase);
            }
        }
        Self { phrases: folded }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// First configured phrase contained in `text`, if any.
    pub fn matched_phrase(&self, text: &str) -> Option<&str> {
        if self.phrases.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| haystack.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matched_phrase(text).is_some()
    }
}

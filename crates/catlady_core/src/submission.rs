/// One entry of a feed listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submission {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub adult: bool,
}

impl Submission {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        domain: impl Into<String>,
        adult: bool,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            domain: domain.into(),
            adult,
        }
    }

    /// A bare link with no title or domain, not flagged adult.
    pub fn link(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn flagged_adult(mut self) -> Self {
        self.adult = true;
        self
    }
}

/// Ordered submissions returned by one feed retrieval. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    submissions: Vec<Submission>,
}

impl Snapshot {
    pub fn new(submissions: Vec<Submission>) -> Self {
        Self { submissions }
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }
}

impl FromIterator<Submission> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Submission>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

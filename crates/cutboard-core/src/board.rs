//! Board view: filtered visible projects grouped into stage columns

use cutboard_model::{Project, Stage, StageInfo};

/// Toolbar filters; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    /// Case-insensitive substring of title or client
    pub search: String,
    /// Exact editor
    pub editor: String,
    /// Exact platform
    pub platform: String,
    /// Exact channel
    pub channel: String,
}

impl BoardFilter {
    /// Filter matching everything
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With search text
    #[inline]
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// With editor
    #[inline]
    #[must_use]
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    /// With platform
    #[inline]
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// With channel
    #[inline]
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Whether a project passes every filter
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        let search = self.search.trim().to_lowercase();
        let exact = |wanted: &str, actual: &str| wanted.is_empty() || wanted == actual;

        (search.is_empty()
            || project.title.to_lowercase().contains(&search)
            || project.client.to_lowercase().contains(&search))
            && exact(&self.editor, &project.editor)
            && exact(&self.platform, &project.platform)
            && exact(&self.channel, &project.channel)
    }
}

/// One stage column
#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    /// Stage shown in this column
    pub stage: StageInfo,
    /// Cards in board order
    pub projects: Vec<&'a Project>,
}

/// Every stage column, in stage order
#[derive(Debug, Clone, PartialEq)]
pub struct Board<'a> {
    pub columns: Vec<Column<'a>>,
}

impl<'a> Board<'a> {
    /// Group already-visible projects that pass `filter`
    #[must_use]
    pub fn build<I>(visible: I, filter: &BoardFilter) -> Self
    where
        I: IntoIterator<Item = &'a Project>,
    {
        let mut columns: Vec<Column<'a>> = Stage::ALL
            .into_iter()
            .map(|stage| Column {
                stage: stage.info(),
                projects: Vec::new(),
            })
            .collect();

        for project in visible.into_iter().filter(|p| filter.matches(p)) {
            columns[project.stage.index()].projects.push(project);
        }

        Self { columns }
    }

    /// Column for a stage
    #[must_use]
    pub fn column(&self, stage: Stage) -> &Column<'a> {
        &self.columns[stage.index()]
    }

    /// Cards across every column
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.projects.len()).sum()
    }

    /// Whether no card passed the filters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

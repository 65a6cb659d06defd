use serde::Serialize;

// ---------------------------------------------------------------------------
// Roles and their keyword priority table
// ---------------------------------------------------------------------------

/// One of the seven semantic fields looked for among arbitrary columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Date,
    Title,
    Intro,
    Tags,
    KeyInformation,
    Relevance,
    Links,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Date,
        Role::Title,
        Role::Intro,
        Role::Tags,
        Role::KeyInformation,
        Role::Relevance,
        Role::Links,
    ];

    /// Candidate keywords, highest priority first.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Role::Date => &["date", "published", "updated"],
            Role::Title => &["headline", "title"],
            Role::Intro => &["intro", "introduction", "summary", "dek"],
            Role::Tags => &["tag", "topic", "topics", "category", "categories", "label"],
            Role::KeyInformation => &[
                "key information",
                "key info",
                "details",
                "body",
                "story",
                "content",
            ],
            Role::Relevance => &["relevance", "why it matters", "impact"],
            Role::Links => &["link", "links", "url", "source"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Date => "date",
            Role::Title => "title",
            Role::Intro => "intro",
            Role::Tags => "tags",
            Role::KeyInformation => "key_information",
            Role::Relevance => "relevance",
            Role::Links => "links",
        }
    }
}

// ---------------------------------------------------------------------------
// Schema – role → column name
// ---------------------------------------------------------------------------

/// Which column (if any) plays each role for the loaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub date: Option<String>,
    pub title: Option<String>,
    pub intro: Option<String>,
    pub tags: Option<String>,
    pub key_information: Option<String>,
    pub relevance: Option<String>,
    pub links: Option<String>,
}

impl Schema {
    pub fn column(&self, role: Role) -> Option<&str> {
        let slot = match role {
            Role::Date => &self.date,
            Role::Title => &self.title,
            Role::Intro => &self.intro,
            Role::Tags => &self.tags,
            Role::KeyInformation => &self.key_information,
            Role::Relevance => &self.relevance,
            Role::Links => &self.links,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<String> {
        match role {
            Role::Date => &mut self.date,
            Role::Title => &mut self.title,
            Role::Intro => &mut self.intro,
            Role::Tags => &mut self.tags,
            Role::KeyInformation => &mut self.key_information,
            Role::Relevance => &mut self.relevance,
            Role::Links => &mut self.links,
        }
    }
}

/// First column whose lower-cased name contains one of `keywords`, trying
/// keywords in priority order and columns in table order.
pub fn find_column<'a>(columns: &'a [String], keywords: &[&str]) -> Option<&'a str> {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();
    keywords.iter().find_map(|kw| {
        lowered
            .iter()
            .position(|col| col.contains(kw))
            .map(|i| columns[i].as_str())
    })
}

/// Guess the role of each column from its name.
pub fn detect_schema(columns: &[String]) -> Schema {
    let mut schema = Schema::default();
    for role in Role::ALL {
        let found = find_column(columns, role.keywords());
        match found {
            Some(col) => log::debug!("role '{}' → column '{col}'", role.as_str()),
            None => log::debug!("role '{}' unmapped", role.as_str()),
        }
        *schema.slot_mut(role) = found.map(str::to_string);
    }
    schema
}

//! Platform status model and display classification.

use chrono::{DateTime, Utc};

/// Coarse severity reported by the status service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Indicator {
    None,
    Minor,
    Major,
    Critical,
    Unknown,
}

impl Indicator {
    /// Parses the wire value. Unrecognised values map to [`Indicator::Unknown`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "none" => Indicator::None,
            "minor" => Indicator::Minor,
            "major" => Indicator::Major,
            "critical" => Indicator::Critical,
            _ => Indicator::Unknown,
        }
    }
}

/// Display classification derived from an [`Indicator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusLevel {
    Operational,
    Minor,
    Major,
    Critical,
    Unknown,
}

impl StatusLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusLevel::Operational => "operational",
            StatusLevel::Minor => "minor",
            StatusLevel::Major => "major",
            StatusLevel::Critical => "critical",
            StatusLevel::Unknown => "unknown",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            StatusLevel::Operational => "All Systems Operational",
            StatusLevel::Minor => "Minor Service Outage",
            StatusLevel::Major => "Major Service Outage",
            StatusLevel::Critical => "Critical Service Outage",
            StatusLevel::Unknown => "Unknown Status",
        }
    }
}

pub fn classify(indicator: Indicator) -> StatusLevel {
    match indicator {
        Indicator::None => StatusLevel::Operational,
        Indicator::Minor => StatusLevel::Minor,
        Indicator::Major => StatusLevel::Major,
        Indicator::Critical => StatusLevel::Critical,
        Indicator::Unknown => StatusLevel::Unknown,
    }
}

/// Classifies a raw indicator string as received on the wire.
pub fn classify_indicator(raw: &str) -> StatusLevel {
    classify(Indicator::parse(raw))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentStatus {
    pub name: String,
    pub status: String,
}

impl ComponentStatus {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Components only distinguish "operational" from everything else.
    pub fn level(&self) -> StatusLevel {
        if self.status == "operational" {
            StatusLevel::Operational
        } else {
            StatusLevel::Minor
        }
    }
}

/// Point-in-time capture of the platform status.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusSnapshot {
    pub indicator: Indicator,
    pub description: String,
    pub components: Vec<ComponentStatus>,
    pub fetched_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn new(
        indicator: Indicator,
        description: impl Into<String>,
        components: Vec<ComponentStatus>,
    ) -> Self {
        Self {
            indicator,
            description: description.into(),
            components,
            fetched_at: Utc::now(),
        }
    }

    pub fn level(&self) -> StatusLevel {
        classify(self.indicator)
    }

    pub fn headline(&self) -> &'static str {
        self.level().headline()
    }
}

/// Observable result of the status poller.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PollState {
    #[default]
    Loading,
    Error(String),
    Ready(StatusSnapshot),
}

impl PollState {
    pub fn is_loading(&self) -> bool {
        matches!(self, PollState::Loading)
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            PollState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PollState::Error(message) => Some(message),
            _ => None,
        }
    }
}

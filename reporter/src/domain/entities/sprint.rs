//! Sprint and board domain entities
//!
//! Sprints live in the agile tracker (Jira). Sprints are contiguous one-week
//! iterations whose name is derived from their dates, which is what lets a
//! rotation find a sprint it created on an earlier run instead of creating a
//! duplicate.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// Length of one sprint
pub const SPRINT_DURATION_DAYS: i64 = 7;

/// Day layout used in sprint names
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Agile board identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardId(pub i64);

impl std::fmt::Display for BoardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sprint identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SprintId(pub i64);

impl std::fmt::Display for SprintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Board type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardType {
    Scrum,
    Kanban,
}

impl BoardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardType::Scrum => "scrum",
            BoardType::Kanban => "kanban",
        }
    }
}

/// An agile board owned by a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub board_type: BoardType,
}

/// Sprint lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Future,
    Active,
    Closed,
}

impl SprintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintState::Future => "future",
            SprintState::Active => "active",
            SprintState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for SprintState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SprintState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "future" => Ok(SprintState::Future),
            "active" => Ok(SprintState::Active),
            "closed" => Ok(SprintState::Closed),
            _ => Err(format!("Unknown sprint state: {}", s)),
        }
    }
}

/// A sprint on an agile board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sprint {
    pub id: SprintId,
    pub name: String,
    /// Timestamps keep the tracker's UTC offset; day names are computed in it
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub state: SprintState,
}

impl Sprint {
    /// Deterministic sprint name: `"<start day> - <end minus one second, as day>"`
    ///
    /// A sprint running 2024-06-07T00:00 to 2024-06-14T00:00 is named
    /// `"2024-06-07 - 2024-06-13"`.
    pub fn name_for(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> String {
        let last_second = *end - Duration::seconds(1);
        format!(
            "{} - {}",
            start.format(DAY_FORMAT),
            last_second.format(DAY_FORMAT)
        )
    }

    /// Start and end of the sprint that follows this one, if this one has an end
    pub fn successor_window(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let start = self.end?;
        Some((start, start + Duration::days(SPRINT_DURATION_DAYS)))
    }

    /// Name the following sprint must carry
    pub fn successor_name(&self) -> Option<String> {
        self.successor_window()
            .map(|(start, end)| Sprint::name_for(&start, &end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn sprint(end: Option<&str>) -> Sprint {
        Sprint {
            id: SprintId(1),
            name: "current".to_string(),
            start: None,
            end: end.map(at),
            state: SprintState::Active,
        }
    }

    #[test]
    fn name_ends_on_the_last_covered_day() {
        let name = Sprint::name_for(&at("2024-06-07T00:00:00Z"), &at("2024-06-14T00:00:00Z"));
        assert_eq!(name, "2024-06-07 - 2024-06-13");
    }

    #[test]
    fn name_uses_the_sprint_offset() {
        let name = Sprint::name_for(
            &at("2018-10-05T00:00:00+08:00"),
            &at("2018-10-12T00:00:00+08:00"),
        );
        assert_eq!(name, "2018-10-05 - 2018-10-11");
    }

    #[test]
    fn successor_starts_where_current_ends() {
        let current = sprint(Some("2024-06-07T00:00:00Z"));
        let (start, end) = current.successor_window().unwrap();
        assert_eq!(start, at("2024-06-07T00:00:00Z"));
        assert_eq!(end, at("2024-06-14T00:00:00Z"));
        assert_eq!(
            current.successor_name().as_deref(),
            Some("2024-06-07 - 2024-06-13")
        );
    }

    #[test]
    fn no_successor_without_end_date() {
        assert!(sprint(None).successor_window().is_none());
        assert!(sprint(None).successor_name().is_none());
    }

    #[test]
    fn sprint_state_round_trips_through_text() {
        for state in [SprintState::Future, SprintState::Active, SprintState::Closed] {
            assert_eq!(state.as_str().parse::<SprintState>().unwrap(), state);
        }
        assert!("paused".parse::<SprintState>().is_err());
    }
}

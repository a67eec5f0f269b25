//! Quality score formatting
//!
//! Scores are computed by the media server and forwarded as-is: a producer
//! reports one `{ ssrc, score }` record per encoding, a consumer reports
//! `{ producer, consumer }`. Either side may send a bare record or a list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// RTP stream identifier as reported with a producer score
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ssrc {
    Numeric(u32),
    Named(String),
}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ssrc::Numeric(n) => write!(f, "{}", n),
            Ssrc::Named(s) => f.write_str(s),
        }
    }
}

/// One score record, producer or consumer shaped
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreRecord {
    Producer { ssrc: Ssrc, score: u8 },
    Consumer { producer: u8, consumer: u8 },
}

impl ScoreRecord {
    /// Score that best describes what this side receives
    pub fn primary(&self) -> u8 {
        match self {
            ScoreRecord::Producer { score, .. } => *score,
            ScoreRecord::Consumer { consumer, .. } => *consumer,
        }
    }
}

/// A bare record or a sequence of records
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Many(Vec<ScoreRecord>),
    One(ScoreRecord),
}

impl ScoreValue {
    /// Normalized, order preserving view
    pub fn records(&self) -> &[ScoreRecord] {
        match self {
            ScoreValue::Many(records) => records,
            ScoreValue::One(record) => std::slice::from_ref(record),
        }
    }

    /// Lowest primary score, `None` for an empty list
    pub fn lowest(&self) -> Option<u8> {
        self.records().iter().map(ScoreRecord::primary).min()
    }
}

impl From<ScoreRecord> for ScoreValue {
    fn from(record: ScoreRecord) -> Self {
        ScoreValue::One(record)
    }
}

impl From<Vec<ScoreRecord>> for ScoreValue {
    fn from(records: Vec<ScoreRecord>) -> Self {
        ScoreValue::Many(records)
    }
}

/// One formatted score line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreLine {
    Stream { ssrc: String, score: u8 },
    Flow { producer: u8, consumer: u8 },
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreLine::Stream { ssrc, score } => write!(f, "ssrc:{}, score:{}", ssrc, score),
            ScoreLine::Flow { producer, consumer } => {
                write!(f, "producer:{}, score:{}", producer, consumer)
            }
        }
    }
}

/// Format every record of `value`, preserving input order
pub fn format_scores(value: &ScoreValue) -> Vec<ScoreLine> {
    value
        .records()
        .iter()
        .map(|record| match record {
            ScoreRecord::Producer { ssrc, score } => ScoreLine::Stream {
                ssrc: ssrc.to_string(),
                score: *score,
            },
            ScoreRecord::Consumer { producer, consumer } => ScoreLine::Flow {
                producer: *producer,
                consumer: *consumer,
            },
        })
        .collect()
}

/// Which media flow a score belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreSide {
    Producer,
    Consumer,
}

/// Heading plus lines, as shown in the info panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreSection {
    pub heading: &'static str,
    pub lines: Vec<ScoreLine>,
}

/// Build the info panel section for a producer or consumer score
pub fn score_section(side: ScoreSide, value: &ScoreValue) -> ScoreSection {
    let heading = match side {
        ScoreSide::Producer => "streams:",
        ScoreSide::Consumer => "score:",
    };
    ScoreSection {
        heading,
        lines: format_scores(value),
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::profile::Profile;
use super::questions::{Axis, SurveyVersion};
use super::repository::{SurveyId, SurveyRecord};

/// Side length of the square quadrant map.
pub const MAP_SIZE: f64 = 300.0;
const MAP_CENTER: f64 = MAP_SIZE / 2.0;
const MAP_RADIUS: f64 = 100.0;

/// Two-syllable summary of the leaning on each axis, e.g. `열습`.
pub fn quadrant_label(ch: i32, dd: i32) -> String {
    let heat_cold = if ch >= 0 { Axis::Heat } else { Axis::Cold };
    let damp_dry = if dd >= 0 { Axis::Damp } else { Axis::Dry };
    format!("{}{}", heat_cold.label(), damp_dry.label())
}

/// Coordinate with an explicit sign; zero renders as `+0`.
pub fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Point on the quadrant map: `x` grows toward heat, `y` shrinks toward damp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPosition {
    pub x: f64,
    pub y: f64,
}

impl MapPosition {
    pub fn project(ch: i32, dd: i32, max_magnitude: i32) -> Self {
        if max_magnitude <= 0 {
            return Self {
                x: MAP_CENTER,
                y: MAP_CENTER,
            };
        }
        let bound = f64::from(max_magnitude);
        let ch = f64::from(ch.clamp(-max_magnitude, max_magnitude));
        let dd = f64::from(dd.clamp(-max_magnitude, max_magnitude));
        Self {
            x: MAP_CENTER + ch / bound * MAP_RADIUS,
            y: MAP_CENTER - dd / bound * MAP_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    pub ch: String,
    pub dd: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareLinks {
    pub url: String,
    pub caption: String,
}

impl ShareLinks {
    pub fn new(public_base_url: &str, id: &SurveyId, profile: &Profile) -> Self {
        let url = format!("{}/r/{}", public_base_url.trim_end_matches('/'), id);
        let caption = format!(
            "나는 {} {} ({}). 오늘 미션: “{}” #한열조습 #체질테스트",
            profile.emoji, profile.name, profile.name_en, profile.mission
        );
        Self { url, caption }
    }
}

/// Everything the result page renders for one stored record.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub id: SurveyId,
    pub version: SurveyVersion,
    pub ch: i32,
    pub dd: i32,
    pub profile: &'static Profile,
    pub quadrant_label: String,
    pub coordinates: Coordinates,
    pub map: MapPosition,
    pub share: ShareLinks,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl ResultView {
    pub fn from_record(record: &SurveyRecord, public_base_url: &str) -> Self {
        let profile = record.type_code.profile();
        let max_magnitude = record.version.bank().max_magnitude();
        Self {
            id: record.id,
            version: record.version,
            ch: record.ch,
            dd: record.dd,
            profile,
            quadrant_label: quadrant_label(record.ch, record.dd),
            coordinates: Coordinates {
                ch: signed(record.ch),
                dd: signed(record.dd),
            },
            map: MapPosition::project(record.ch, record.dd, max_magnitude),
            share: ShareLinks::new(public_base_url, &record.id, profile),
            created_at: record.created_at,
            narrative: None,
        }
    }

    pub fn with_narrative(mut self, narrative: Option<String>) -> Self {
        self.narrative = narrative;
        self
    }
}

use serde::Serialize;

use crate::co2mon::{Reading, SessionError};

/// The JSON object printed once per session.
#[derive(Debug, Serialize, PartialEq)]
pub struct Report {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReportData>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Values are strings to stay compatible with existing consumers of co2mond.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReportData {
    pub temperature: String,

    pub co2: String,
}

impl Report {
    pub fn from_outcome(outcome: &Result<Reading, SessionError>) -> Self {
        match outcome {
            Ok(reading) => Self {
                success: true,
                data: Some(ReportData {
                    temperature: format!("{:.4}", reading.temperature_celsius),
                    co2: reading.co2_ppm.to_string(),
                }),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

use crate::co2mon::{Frame, FrameRejection};

pub const CODE_AMBIENT_TEMPERATURE: u8 = 0x42;

pub const CODE_CO2_CONCENTRATION: u8 = 0x50;

// Larger values show up right after power-on, before the sensor has warmed up.
pub const CO2_PPM_MAX: u16 = 3000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Temperature { celsius: f64 },
    Co2 { ppm: u16 },
}

/// One complete sample: both quantities observed within the same session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_celsius: f64,

    pub co2_ppm: u16,
}

/// Decodes a validated frame. Frames with an unknown code yield `Ok(None)`.
pub fn decode_measurement(frame: &Frame) -> Result<Option<Measurement>, FrameRejection> {
    match frame.code {
        CODE_AMBIENT_TEMPERATURE => Ok(Some(Measurement::Temperature {
            celsius: decode_temperature(frame.value),
        })),
        CODE_CO2_CONCENTRATION => Ok(Some(Measurement::Co2 {
            ppm: decode_co2(frame.value)?,
        })),
        _ => Ok(None),
    }
}

pub fn decode_temperature(w: u16) -> f64 {
    f64::from(w) * 0.0625 - 273.15
}

fn decode_co2(w: u16) -> Result<u16, FrameRejection> {
    if w > CO2_PPM_MAX {
        return Err(FrameRejection::Co2OutOfRange {
            ppm: w,
            max: CO2_PPM_MAX,
        });
    }

    Ok(w)
}

#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    temperature_celsius: Option<f64>,
    co2_ppm: Option<u16>,
}

impl Accumulator {
    pub(crate) fn record(&mut self, measurement: Measurement) {
        match measurement {
            Measurement::Temperature { celsius } => self.temperature_celsius = Some(celsius),
            Measurement::Co2 { ppm } => self.co2_ppm = Some(ppm),
        }
    }

    pub(crate) fn reading(&self) -> Option<Reading> {
        Some(Reading {
            temperature_celsius: self.temperature_celsius?,
            co2_ppm: self.co2_ppm?,
        })
    }
}

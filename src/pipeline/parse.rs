use fitparser::profile::MesgNum;
use fitparser::FitDataRecord;

use crate::error::ParseError;
use crate::pipeline::{extract, summary};
use crate::types::workout::Workout;

fn fields(record: &FitDataRecord) -> impl Iterator<Item = (&str, &fitparser::Value)> {
    record.fields().iter().map(|f| (f.name(), f.value()))
}

/// Decodes a FIT byte stream and builds the full workout data model.
/// Record order within each kind is preserved from the file. A file that
/// fails to decode, or decodes without a session message, is a hard error;
/// everything below that is tolerated field by field.
pub fn parse(bytes: &[u8]) -> Result<Workout, ParseError> {
    let data = fitparser::from_bytes(bytes)
        .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

    let mut session = None;
    let mut laps = Vec::new();
    let mut lengths = Vec::new();
    let mut records = Vec::new();

    for record in &data {
        match record.kind() {
            MesgNum::Session => {
                // Multisport files carry several sessions; the last one wins.
                session = Some(extract::session_from_fields(fields(record)));
            }
            MesgNum::Lap => {
                if let Some(lap) = extract::lap_from_fields(fields(record)) {
                    laps.push(lap);
                }
            }
            MesgNum::Length => {
                if let Some(length) = extract::length_from_fields(fields(record)) {
                    lengths.push(length);
                }
            }
            MesgNum::Record => {
                if let Some(point) = extract::record_from_fields(fields(record)) {
                    records.push(point);
                }
            }
            _ => {}
        }
    }

    let session = session.ok_or(ParseError::MissingSession)?;
    let summary = summary::summarize(&session, &laps, &lengths, &records);

    Ok(Workout {
        session,
        laps,
        lengths,
        records,
        summary,
    })
}

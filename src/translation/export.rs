/*!
 * Serialization of run results.
 *
 * Two stable forms: a full-fidelity JSON array holding every segment field, and a
 * flat CSV table with the columns `ID, Original, Translated, Back Translated, Status`.
 */

use csv::{QuoteStyle, Terminator, WriterBuilder};

use super::pipeline::Segment;
use crate::errors::AppError;

/// CSV header row
pub const CSV_HEADERS: [&str; 5] = ["ID", "Original", "Translated", "Back Translated", "Status"];

/// Pretty-printed JSON array of segments
pub fn segments_to_json(segments: &[Segment]) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(segments)?)
}

/// Load segments saved with `segments_to_json`
pub fn segments_from_json(json: &str) -> Result<Vec<Segment>, AppError> {
    Ok(serde_json::from_str(json)?)
}

/// Flat CSV table; fields holding a delimiter, quote or line break are quoted
/// with embedded quotes doubled
pub fn segments_to_csv(segments: &[Segment]) -> Result<String, AppError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for segment in segments {
        let status = segment.status.to_string();
        writer.write_record([
            segment.id.as_str(),
            segment.original.as_str(),
            segment.translated.as_deref().unwrap_or_default(),
            segment.back_translated.as_deref().unwrap_or_default(),
            status.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(format!("Failed to flush CSV output: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(format!("CSV output is not UTF-8: {}", e)))
}

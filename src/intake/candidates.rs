//! Candidate task JSON
//!
//! The extraction service answers with an object keyed by task description:
//!
//! ```text
//! { "Replace kitchen sink": { "CATEGORY": "PLUMBING", "BUDGET": "0",
//!   "PROPOSED": "...", "COMMENT": "...", "DWG REF": "", "LEAD": "..." } }
//! ```
//!
//! Key order is preserved, since it decides fuzzy-match tie breaks.

use serde_json::{Map, Value};

use crate::models::{TaskRecord, BUDGET, COMMENT, DWG_REF, LEAD, PROPOSAL, PROPOSED};

pub const CATEGORY: &str = "CATEGORY";

#[derive(Debug, thiserror::Error)]
pub enum CandidateError {
    #[error("Empty task list")]
    Empty,
    #[error("Invalid task JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Task list must be a JSON object keyed by task description")]
    NotAnObject,
}

/// Remove markdown code fences the service sometimes wraps its JSON in
pub fn strip_code_fences(raw: &str) -> String {
    raw.trim()
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Stringify a field value the way it would appear in a cell
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn record_from_fields(description: &str, fields: &Map<String, Value>) -> TaskRecord {
    let mut record = TaskRecord::new(description, "");

    for (key, value) in fields {
        let text = value_text(value);
        match key.trim().to_uppercase().as_str() {
            CATEGORY => record.category = text,
            BUDGET => record.budget = if text.trim().is_empty() { "0".to_string() } else { text },
            PROPOSED => record.proposed = Some(text),
            PROPOSAL => record.proposal = Some(text),
            COMMENT => record.comment = text,
            DWG_REF => record.dwg_ref = text,
            LEAD => record.lead = text,
            other => log::debug!("Ignoring field '{}' on '{}'", other, description),
        }
    }

    record
}

/// Parse the service's answer into candidate records, in answer order.
///
/// Entries whose value is not an object are skipped.
pub fn parse_candidates(raw: &str) -> Result<Vec<TaskRecord>, CandidateError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(CandidateError::Empty);
    }

    let Value::Object(tasks) = serde_json::from_str::<Value>(&cleaned)? else {
        return Err(CandidateError::NotAnObject);
    };

    let mut records = Vec::with_capacity(tasks.len());
    for (description, fields) in &tasks {
        match fields {
            Value::Object(fields) => records.push(record_from_fields(description, fields)),
            _ => log::warn!("Skipping '{}': fields are not an object", description),
        }
    }
    Ok(records)
}

/// Like [`parse_candidates`], but any failure yields no candidates
pub fn parse_candidates_lenient(raw: &str) -> Vec<TaskRecord> {
    match parse_candidates(raw) {
        Ok(records) => records,
        Err(e) => {
            log::error!("Could not read tasks: {}", e);
            Vec::new()
        }
    }
}

/// Render records back into the keyed JSON shape
pub fn records_to_json(records: &[TaskRecord]) -> Value {
    let mut tasks = Map::new();
    for record in records {
        let mut fields = Map::new();
        fields.insert(CATEGORY.to_string(), Value::from(record.category.clone()));
        fields.insert(BUDGET.to_string(), Value::from(record.budget.clone()));
        if let Some(proposed) = &record.proposed {
            fields.insert(PROPOSED.to_string(), Value::from(proposed.clone()));
        }
        if let Some(proposal) = &record.proposal {
            fields.insert(PROPOSAL.to_string(), Value::from(proposal.clone()));
        }
        fields.insert(COMMENT.to_string(), Value::from(record.comment.clone()));
        fields.insert(DWG_REF.to_string(), Value::from(record.dwg_ref.clone()));
        fields.insert(LEAD.to_string(), Value::from(record.lead.clone()));
        tasks.insert(record.description.clone(), Value::Object(fields));
    }
    Value::Object(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"```json
{
  "Replace kitchen sink": {
    "CATEGORY": "PLUMBING",
    "BUDGET": 450,
    "PROPOSED": "Undermount sink",
    "COMMENT": "costs 450",
    "DWG REF": null,
    "LEAD": "Speaker 1"
  },
  "Attic insulation": {
    "CATEGORY": "HVAC"
  }
}
```"#;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_candidates() {
        let records = parse_candidates(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let sink = &records[0];
        assert_eq!(sink.description, "Replace kitchen sink");
        assert_eq!(sink.category, "PLUMBING");
        assert_eq!(sink.budget, "450");
        assert_eq!(sink.proposed.as_deref(), Some("Undermount sink"));
        assert_eq!(sink.dwg_ref, "");
        assert_eq!(sink.lead, "Speaker 1");

        let attic = &records[1];
        assert_eq!(attic.budget, "0");
        assert_eq!(attic.lead, "Unknown");
    }

    #[test]
    fn test_parse_preserves_order() {
        let raw = r#"{"zeta": {"CATEGORY": "GC"}, "alpha": {"CATEGORY": "GC"}, "mid": {"CATEGORY": "GC"}}"#;
        let names: Vec<String> = parse_candidates(raw)
            .unwrap()
            .into_iter()
            .map(|r| r.description)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_candidates(""), Err(CandidateError::Empty)));
        assert!(matches!(parse_candidates("```json```"), Err(CandidateError::Empty)));
        assert!(matches!(parse_candidates("[1, 2]"), Err(CandidateError::NotAnObject)));
        assert!(matches!(parse_candidates("{not json"), Err(CandidateError::Json(_))));
    }

    #[test]
    fn test_non_object_entries_skipped() {
        let records = parse_candidates(r#"{"a": "oops", "b": {"CATEGORY": "GC"}}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "b");
    }

    #[test]
    fn test_lenient_returns_empty() {
        assert!(parse_candidates_lenient("garbage").is_empty());
        assert_eq!(parse_candidates_lenient(SAMPLE).len(), 2);
    }

    #[test]
    fn test_records_to_json() {
        let mut record = TaskRecord::new("Replace kitchen sink", "PLUMBING");
        record.proposal = Some("Undermount".to_string());
        let json = records_to_json(&[record]);
        let fields = &json["Replace kitchen sink"];
        assert_eq!(fields["PROPOSAL"], "Undermount");
        assert!(fields.get("PROPOSED").is_none());
        assert_eq!(fields["LEAD"], "Unknown");

        let reparsed = parse_candidates(&json.to_string()).unwrap();
        assert_eq!(reparsed[0].proposal.as_deref(), Some("Undermount"));
    }
}

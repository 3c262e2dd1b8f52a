use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Target domain the remote service scores the resume against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Domain {
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Full Stack")]
    FullStack,
    #[serde(rename = "Cloud/DevOps")]
    CloudDevops,
    #[serde(rename = "Cybersecurity")]
    Cybersecurity,
}

impl Domain {
    /// Wire string expected by the analyze endpoint.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Domain::MachineLearning => "Machine Learning",
            Domain::FullStack => "Full Stack",
            Domain::CloudDevops => "Cloud/DevOps",
            Domain::Cybersecurity => "Cybersecurity",
        }
    }
}

/// A resume read into memory, ready for the binary upload.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lowercased text after the last `.`, if the name has one.
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}

/// Input to a single submission. Consumed by `UploadCoordinator::submit`.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub domain: Domain,
    pub job_description: String,
    pub resume: Option<ResumeFile>,
}

/// Presigned upload URL plus the object key the analyze step refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredential {
    pub upload_url: String,
    pub file_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Credential,
    Upload,
    Analyze,
}

/// Progress events emitted by the coordinator and consumed by CLI output.
#[derive(Debug, Clone)]
pub enum SubmissionEvent {
    PhaseStarted { phase: Phase },
    Info(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDetails {
    #[serde(default, deserialize_with = "null_as_default")]
    pub found_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub penalty: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub semantic_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtsScore {
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: ScoreDetails,
}

impl ScoreDetails {
    fn lenient(value: &Value) -> Self {
        let num = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or_default();
        Self {
            found_score: num("found_score"),
            penalty: num("penalty"),
            semantic_score: num("semantic_score"),
        }
    }
}

impl AtsScore {
    fn lenient(value: &Value) -> Self {
        Self {
            score: value.get("score").and_then(Value::as_f64).unwrap_or_default(),
            details: value
                .get("details")
                .map(ScoreDetails::lenient)
                .unwrap_or_default(),
        }
    }
}

/// Scored output of the remote analysis service.
///
/// Decoding never fails for a JSON object. Missing or `null` fields take their
/// defaults; a field of the wrong type is read as far as possible and its raw
/// value is kept in `extra`, next to fields this client does not know about.
/// Serialization writes `extra` back over the typed fields, so the document
/// survives a save/load cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AnalysisResult {
    pub score: AtsScore,
    pub semantic_match: f64,
    pub skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for AnalysisResult {
    fn from(mut map: Map<String, Value>) -> Self {
        let mut extra = Map::new();
        let score = take_lenient(&mut map, &mut extra, "score", AtsScore::lenient);
        let semantic_match = take_lenient(&mut map, &mut extra, "semanticMatch", |v| {
            v.as_f64().unwrap_or_default()
        });
        let skills = take_lenient(&mut map, &mut extra, "skills", string_list);
        let missing_skills = take_lenient(&mut map, &mut extra, "missingSkills", string_list);
        let suggestions = take_lenient(&mut map, &mut extra, "suggestions", string_list);
        extra.extend(map);

        Self {
            score,
            semantic_match,
            skills,
            missing_skills,
            suggestions,
            extra,
        }
    }
}

impl From<AnalysisResult> for Map<String, Value> {
    fn from(r: AnalysisResult) -> Self {
        let mut map = Map::new();
        map.insert(
            "score".into(),
            serde_json::to_value(r.score).unwrap_or_default(),
        );
        map.insert("semanticMatch".into(), Value::from(r.semantic_match));
        map.insert("skills".into(), Value::from(r.skills));
        map.insert("missingSkills".into(), Value::from(r.missing_skills));
        map.insert("suggestions".into(), Value::from(r.suggestions));
        map.extend(r.extra);
        map
    }
}

/// Decode `key` strictly; on a type mismatch fall back to `lenient` and keep
/// the raw value in `extra`.
fn take_lenient<T, F>(
    map: &mut Map<String, Value>,
    extra: &mut Map<String, Value>,
    key: &str,
    lenient: F,
) -> T
where
    T: DeserializeOwned + Default,
    F: FnOnce(&Value) -> T,
{
    let Some(raw) = map.remove(key) else {
        return T::default();
    };
    match serde_json::from_value::<Option<T>>(raw.clone()) {
        Ok(v) => v.unwrap_or_default(),
        Err(_) => {
            let v = lenient(&raw);
            extra.insert(key.to_string(), raw);
            v
        }
    }
}

/// Strings as-is, numbers and booleans as text, anything else dropped.
fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The single record held by the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub data: AnalysisResult,
    #[serde(rename = "savedAt")]
    pub saved_at: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(
            ResumeFile::new("cv.PDF", vec![1]).extension().as_deref(),
            Some("pdf")
        );
        assert_eq!(
            ResumeFile::new("cv.final.Pdf", vec![1]).extension().as_deref(),
            Some("pdf")
        );
        assert_eq!(
            ResumeFile::new(".pdf", vec![1]).extension().as_deref(),
            Some("pdf")
        );
        assert_eq!(ResumeFile::new("pdf", vec![1]).extension(), None);
    }

    #[test]
    fn domain_serializes_to_wire_string() {
        for domain in [
            Domain::MachineLearning,
            Domain::FullStack,
            Domain::CloudDevops,
            Domain::Cybersecurity,
        ] {
            assert_eq!(
                serde_json::to_value(domain).unwrap(),
                json!(domain.as_wire_str())
            );
        }
    }

    #[test]
    fn analysis_result_fills_defaults_for_missing_and_null_fields() {
        let parsed: AnalysisResult =
            serde_json::from_value(json!({ "score": null, "skills": ["rust"] })).unwrap();
        assert_eq!(parsed.score, AtsScore::default());
        assert_eq!(parsed.skills, vec!["rust".to_string()]);
        assert!(parsed.missing_skills.is_empty());
        assert_eq!(parsed.semantic_match, 0.0);
    }

    #[test]
    fn wrongly_typed_fields_fall_back_and_keep_raw_value() {
        let raw = json!({
            "score": 72,
            "semanticMatch": "0.81",
            "skills": [1, "sql", null],
            "missingSkills": ["go"]
        });
        let parsed: AnalysisResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed.score, AtsScore::default());
        assert_eq!(parsed.semantic_match, 0.0);
        assert_eq!(parsed.skills, vec!["1".to_string(), "sql".to_string()]);
        assert_eq!(parsed.missing_skills, vec!["go".to_string()]);
        assert_eq!(parsed.extra.get("score"), Some(&json!(72)));
        assert!(!parsed.extra.contains_key("missingSkills"));

        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["score"], json!(72));
        assert_eq!(back["semanticMatch"], json!("0.81"));
        let again: AnalysisResult = serde_json::from_value(back).unwrap();
        assert_eq!(again, parsed);
    }

    #[test]
    fn partially_typed_score_keeps_readable_parts() {
        let parsed: AnalysisResult = serde_json::from_value(json!({
            "score": { "score": 64, "details": { "found_score": 40, "penalty": "4" } }
        }))
        .unwrap();
        assert_eq!(parsed.score.score, 64.0);
        assert_eq!(parsed.score.details.found_score, 40.0);
        assert_eq!(parsed.score.details.penalty, 0.0);
        assert!(parsed.extra.contains_key("score"));
    }

    #[test]
    fn analysis_result_keeps_unknown_fields() {
        let raw = json!({ "semanticMatch": 0.5, "model": "v2" });
        let parsed: AnalysisResult = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.extra.get("model"), Some(&json!("v2")));
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["model"], json!("v2"));
        assert_eq!(back["semanticMatch"], json!(0.5));
    }
}

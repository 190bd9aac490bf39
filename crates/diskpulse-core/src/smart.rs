//! Telemetry synthesis: turn raw SMART output into one [`TelemetryReport`].
//!
//! The input is whatever the diagnostic tool produced for one device: an
//! optional structured document (smartctl's JSON) and an optional free-text
//! transcript. Synthesis is pure and total. It performs no I/O and never fails.
//! Missing or oddly shaped sub-fields degrade to empty strings or
//! [`HealthVerdict::Unknown`].
//!
//! # Evidence precedence
//!
//! - **Family**: a device path containing `nvme` (any case) wins over document
//!   content. Otherwise the NVMe health log key, then the ATA attribute table
//!   key, decide. Nothing recognizable means [`DiskFamily::Unknown`].
//! - **Health**: when a usable document is present it is the only evidence;
//!   the transcript is never consulted. Without one, the transcript is scanned
//!   case-insensitively for `PASSED`/`OK` first and `FAILED` second, so text
//!   containing both resolves to [`HealthVerdict::Passed`].
//! - **Attributes**: only extracted from a usable document, with the schema
//!   chosen by family. [`DiskFamily::Unknown`] never yields attributes.
//!
//! A document counts as usable when it is a non-empty JSON object. Anything
//! else is kept verbatim on the report but treated as absent for analysis.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// smartctl key holding the NVMe SMART/health information log page.
pub const NVME_HEALTH_KEY: &str = "nvme_smart_health_information_log";
/// smartctl key holding the ATA SMART attribute block.
pub const ATA_ATTRIBUTES_KEY: &str = "ata_smart_attributes";
/// Row array inside [`ATA_ATTRIBUTES_KEY`].
pub const ATA_TABLE_KEY: &str = "table";
/// smartctl key holding the overall self-assessment.
pub const SMART_STATUS_KEY: &str = "smart_status";
/// Boolean-like member of [`SMART_STATUS_KEY`].
pub const SMART_PASSED_KEY: &str = "passed";
/// Identifier placed on every NVMe attribute (NVMe has no attribute IDs).
pub const NVME_ATTRIBUTE_ID: &str = "-";

/// NVMe `available_spare` below this percentage is flagged.
pub const CRITICAL_SPARE_THRESHOLD: u64 = 10;
/// NVMe `percentage_used` above this value is flagged.
pub const CRITICAL_USED_THRESHOLD: u64 = 80;

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Storage protocol family, which selects the attribute schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskFamily {
    Nvme,
    SataAta,
    Unknown,
}

impl std::fmt::Display for DiskFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nvme => write!(f, "nvme"),
            Self::SataAta => write!(f, "sata_ata"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Overall health verdict. Always derived by [`synthesize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthVerdict {
    Passed,
    Failed,
    Unknown,
}

impl std::fmt::Display for HealthVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One normalized telemetry datum.
///
/// Scalars are kept as opaque JSON values so exports stay lossless. For NVMe,
/// `id` is [`NVME_ATTRIBUTE_ID`], `worst`/`threshold` are empty strings and
/// `raw` repeats `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Value,
    pub name: String,
    pub value: Value,
    pub worst: Value,
    #[serde(rename = "thresh")]
    pub threshold: Value,
    pub raw: Value,
}

/// Raw output of one diagnostic run, as handed to [`synthesize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmartPayload {
    pub document: Option<Value>,
    pub transcript: Option<String>,
}

impl SmartPayload {
    pub fn new(document: Option<Value>, transcript: Option<String>) -> Self {
        Self {
            document,
            transcript,
        }
    }

    /// Payload carrying only a structured document.
    pub fn from_document(document: Value) -> Self {
        Self::new(Some(document), None)
    }

    /// Payload carrying only a free-text transcript.
    pub fn from_transcript(transcript: impl Into<String>) -> Self {
        Self::new(None, Some(transcript.into()))
    }
}

/// Unified health report for one device.
///
/// Built once by [`synthesize`] and read-only afterwards. Serializes to the
/// persisted report layout (`disk_type`, `raw`, `json_data`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReport {
    device: String,
    health: HealthVerdict,
    #[serde(rename = "disk_type")]
    family: DiskFamily,
    attributes: Vec<Attribute>,
    #[serde(rename = "raw")]
    transcript: Option<String>,
    #[serde(rename = "json_data")]
    document: Option<Value>,
}

impl TelemetryReport {
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn health(&self) -> HealthVerdict {
        self.health
    }

    pub fn family(&self) -> DiskFamily {
        self.family
    }

    /// Attributes in source order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Free-text transcript as captured, if any.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Structured document exactly as received, if any.
    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }

    /// Attributes paired with their per-row health indicator.
    pub fn attributes_with_indicators(
        &self,
    ) -> impl Iterator<Item = (&Attribute, HealthIndicator)> + '_ {
        self.attributes
            .iter()
            .map(move |a| (a, attribute_indicator(self.family, a)))
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Build the report for `device` from an already captured payload.
pub fn synthesize(device: &str, payload: SmartPayload) -> TelemetryReport {
    let SmartPayload {
        document,
        transcript,
    } = payload;

    let usable = usable_document(document.as_ref());
    let family = detect_family(device, document.as_ref());

    let health = match usable {
        Some(doc) => health_from_document(doc),
        None => health_from_transcript(transcript.as_deref()),
    };

    let attributes = match usable {
        Some(doc) => extract_attributes(family, doc),
        None => Vec::new(),
    };

    log::debug!(
        "synthesized {device}: family={family} health={health} attributes={}",
        attributes.len()
    );

    TelemetryReport {
        device: device.to_string(),
        health,
        family,
        attributes,
        transcript,
        document,
    }
}

/// Decide which attribute schema applies.
pub fn detect_family(device: &str, document: Option<&Value>) -> DiskFamily {
    if device.to_lowercase().contains("nvme") {
        return DiskFamily::Nvme;
    }
    if let Some(doc) = usable_document(document) {
        if doc.contains_key(NVME_HEALTH_KEY) {
            return DiskFamily::Nvme;
        }
        if doc.contains_key(ATA_ATTRIBUTES_KEY) {
            return DiskFamily::SataAta;
        }
    }
    DiskFamily::Unknown
}

/// Health from the `smart_status.passed` indicator of a structured document.
pub fn health_from_document(document: &Map<String, Value>) -> HealthVerdict {
    match document.get(SMART_STATUS_KEY) {
        Some(Value::Object(status)) if !status.is_empty() => match status.get(SMART_PASSED_KEY) {
            Some(passed) if is_truthy(passed) => HealthVerdict::Passed,
            Some(_) => HealthVerdict::Failed,
            None => HealthVerdict::Unknown,
        },
        _ => HealthVerdict::Unknown,
    }
}

/// Health from free text. `PASSED`/`OK` are checked before `FAILED`.
pub fn health_from_transcript(transcript: Option<&str>) -> HealthVerdict {
    let Some(text) = transcript.filter(|t| !t.is_empty()) else {
        return HealthVerdict::Unknown;
    };
    let upper = text.to_uppercase();
    if upper.contains("PASSED") || upper.contains("OK") {
        HealthVerdict::Passed
    } else if upper.contains("FAILED") {
        HealthVerdict::Failed
    } else {
        HealthVerdict::Unknown
    }
}

/// Map rows of the ATA attribute table. Missing fields become `""`.
///
/// Rows that are not JSON objects carry no fields at all and are skipped.
pub fn parse_ata_attributes(table: &[Value]) -> Vec<Attribute> {
    table
        .iter()
        .filter_map(|row| {
            let Some(row) = row.as_object() else {
                log::debug!("skipping non-object ATA attribute row: {row}");
                return None;
            };
            Some(Attribute {
                id: field_or_empty(row, "id"),
                name: row.get("name").map(scalar_text).unwrap_or_default(),
                value: field_or_empty(row, "value"),
                worst: field_or_empty(row, "worst"),
                threshold: field_or_empty(row, "thresh"),
                raw: field_or_empty(row, "raw"),
            })
        })
        .collect()
}

/// Flatten the NVMe health log into one attribute per key, in source order.
pub fn parse_nvme_attributes(log: &Map<String, Value>) -> Vec<Attribute> {
    log.iter()
        .map(|(key, value)| Attribute {
            id: Value::String(NVME_ATTRIBUTE_ID.to_string()),
            name: key.clone(),
            value: value.clone(),
            worst: empty(),
            threshold: empty(),
            raw: value.clone(),
        })
        .collect()
}

fn extract_attributes(family: DiskFamily, doc: &Map<String, Value>) -> Vec<Attribute> {
    match family {
        DiskFamily::Nvme => doc
            .get(NVME_HEALTH_KEY)
            .and_then(Value::as_object)
            .map(parse_nvme_attributes)
            .unwrap_or_default(),
        DiskFamily::SataAta => doc
            .get(ATA_ATTRIBUTES_KEY)
            .and_then(|ata| ata.get(ATA_TABLE_KEY))
            .and_then(Value::as_array)
            .map(|rows| parse_ata_attributes(rows))
            .unwrap_or_default(),
        DiskFamily::Unknown => Vec::new(),
    }
}

fn usable_document(document: Option<&Value>) -> Option<&Map<String, Value>> {
    document
        .and_then(Value::as_object)
        .filter(|map| !map.is_empty())
}

fn field_or_empty(row: &Map<String, Value>, key: &str) -> Value {
    row.get(key).cloned().unwrap_or_else(empty)
}

fn empty() -> Value {
    Value::String(String::new())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// Per-attribute indicator
// ---------------------------------------------------------------------------

/// Coarse per-attribute status shown next to each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthIndicator {
    Ok,
    Warning,
}

impl std::fmt::Display for HealthIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARN"),
        }
    }
}

/// Flag attributes that look unhealthy under the family's rules.
pub fn attribute_indicator(family: DiskFamily, attribute: &Attribute) -> HealthIndicator {
    let flagged = match family {
        DiskFamily::Nvme => nvme_attribute_flagged(attribute),
        DiskFamily::SataAta | DiskFamily::Unknown => {
            let value = parse_digits(&scalar_text(&attribute.value)).unwrap_or(0);
            let threshold = parse_digits(&scalar_text(&attribute.threshold)).unwrap_or(0);
            value < threshold
        }
    };
    if flagged {
        HealthIndicator::Warning
    } else {
        HealthIndicator::Ok
    }
}

fn nvme_attribute_flagged(attribute: &Attribute) -> bool {
    let name = attribute.name.to_lowercase();
    let value = scalar_text(&attribute.value);

    if name.contains("critical_warning") && value != "0" {
        return true;
    }
    if name.contains("available_spare")
        && parse_digits(&value).is_some_and(|spare| spare < CRITICAL_SPARE_THRESHOLD)
    {
        return true;
    }
    if name.contains("percentage_used")
        && parse_digits(&value).is_some_and(|used| used > CRITICAL_USED_THRESHOLD)
    {
        return true;
    }
    name.contains("media_errors") && value != "0"
}

/// Unsigned decimal made only of ASCII digits; anything else is `None`.
fn parse_digits(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Render an opaque scalar as display text.
///
/// smartctl wraps some raw values as `{"value": n, "string": "..."}`; the
/// `string` member is preferred for those.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => match map.get("string") {
            Some(Value::String(s)) => s.clone(),
            _ => value.to_string(),
        },
        Value::Array(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Family detection
    // -----------------------------------------------------------------------

    #[test]
    fn test_family_from_device_path() {
        assert_eq!(detect_family("/dev/nvme0n1", None), DiskFamily::Nvme);
        assert_eq!(detect_family("/dev/NVMe1", None), DiskFamily::Nvme);
    }

    #[test]
    fn test_family_device_path_beats_document() {
        let doc = json!({ "ata_smart_attributes": { "table": [] } });
        assert_eq!(detect_family("/dev/nvme0", Some(&doc)), DiskFamily::Nvme);
    }

    #[test]
    fn test_family_from_nvme_key() {
        let doc = json!({ "nvme_smart_health_information_log": { "temperature": 30 } });
        assert_eq!(detect_family("/dev/sda", Some(&doc)), DiskFamily::Nvme);
    }

    #[test]
    fn test_family_nvme_key_checked_before_ata_key() {
        let doc = json!({
            "ata_smart_attributes": { "table": [] },
            "nvme_smart_health_information_log": {}
        });
        assert_eq!(detect_family("/dev/sda", Some(&doc)), DiskFamily::Nvme);
    }

    #[test]
    fn test_family_from_ata_key() {
        let doc = json!({ "ata_smart_attributes": { "table": [] } });
        assert_eq!(detect_family("/dev/sda", Some(&doc)), DiskFamily::SataAta);
    }

    #[test]
    fn test_family_unknown() {
        assert_eq!(detect_family("/dev/sda", None), DiskFamily::Unknown);
        let doc = json!({ "model_name": "X" });
        assert_eq!(detect_family("/dev/sda", Some(&doc)), DiskFamily::Unknown);
        let not_an_object = json!(["nvme_smart_health_information_log"]);
        assert_eq!(
            detect_family("/dev/sda", Some(&not_an_object)),
            DiskFamily::Unknown
        );
    }

    // -----------------------------------------------------------------------
    // Health from document
    // -----------------------------------------------------------------------

    fn doc_map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_health_document_passed() {
        let doc = doc_map(json!({ "smart_status": { "passed": true } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Passed);
    }

    #[test]
    fn test_health_document_failed() {
        let doc = doc_map(json!({ "smart_status": { "passed": false } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Failed);
    }

    #[test]
    fn test_health_document_truthiness() {
        let doc = doc_map(json!({ "smart_status": { "passed": 1 } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Passed);
        let doc = doc_map(json!({ "smart_status": { "passed": 0 } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Failed);
        let doc = doc_map(json!({ "smart_status": { "passed": null } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Failed);
    }

    #[test]
    fn test_health_document_status_missing() {
        let doc = doc_map(json!({ "device": { "name": "/dev/sda" } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Unknown);
    }

    #[test]
    fn test_health_document_passed_field_missing() {
        let doc = doc_map(json!({ "smart_status": { "nvme": { "value": 0 } } }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Unknown);
    }

    #[test]
    fn test_health_document_status_not_an_object() {
        let doc = doc_map(json!({ "smart_status": "passed" }));
        assert_eq!(health_from_document(&doc), HealthVerdict::Unknown);
    }

    // -----------------------------------------------------------------------
    // Health from transcript
    // -----------------------------------------------------------------------

    #[test]
    fn test_health_transcript_cases() {
        let cases = [
            (
                Some("SMART overall-health self-assessment test result: PASSED"),
                HealthVerdict::Passed,
            ),
            (Some("SMART Health Status: OK"), HealthVerdict::Passed),
            (Some("some text passed other text"), HealthVerdict::Passed),
            (
                Some("SMART overall-health self-assessment test result: FAILED"),
                HealthVerdict::Failed,
            ),
            (Some("some text FAILED other text"), HealthVerdict::Failed),
            (Some("No SMART support"), HealthVerdict::Unknown),
            (Some(""), HealthVerdict::Unknown),
            (None, HealthVerdict::Unknown),
        ];
        for (text, expected) in cases {
            assert_eq!(health_from_transcript(text), expected, "input: {text:?}");
        }
    }

    #[test]
    fn test_health_transcript_passed_wins_over_failed() {
        let text = "attribute 5 FAILED in the past, overall result: PASSED";
        assert_eq!(health_from_transcript(Some(text)), HealthVerdict::Passed);
    }

    // -----------------------------------------------------------------------
    // Attribute parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_ata_attributes() {
        let table = vec![
            json!({
                "id": 5, "name": "Reallocated_Sector_Ct", "value": 100,
                "worst": 100, "thresh": 36, "raw": { "value": 0, "string": "0" }
            }),
            json!({
                "id": 194, "name": "Temperature_Celsius", "value": 64,
                "worst": 45, "thresh": 0, "raw": { "value": 36, "string": "36 (Min/Max 20/55)" }
            }),
        ];
        let attrs = parse_ata_attributes(&table);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].id, json!(5));
        assert_eq!(attrs[0].name, "Reallocated_Sector_Ct");
        assert_eq!(attrs[0].threshold, json!(36));
        assert_eq!(attrs[1].raw["string"], json!("36 (Min/Max 20/55)"));
    }

    #[test]
    fn test_parse_ata_missing_fields_default_to_empty() {
        let attrs = parse_ata_attributes(&[json!({ "id": 1 })]);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].id, json!(1));
        assert_eq!(attrs[0].name, "");
        assert_eq!(attrs[0].value, json!(""));
        assert_eq!(attrs[0].worst, json!(""));
        assert_eq!(attrs[0].threshold, json!(""));
        assert_eq!(attrs[0].raw, json!(""));
    }

    #[test]
    fn test_parse_ata_empty_and_non_object_rows() {
        assert!(parse_ata_attributes(&[]).is_empty());
        assert!(parse_ata_attributes(&[json!(42), json!("row")]).is_empty());
    }

    #[test]
    fn test_parse_nvme_attributes_preserves_order() {
        let log = doc_map(json!({
            "critical_warning": 0,
            "temperature": 33,
            "available_spare": 100,
            "data_units_read": 1234567
        }));
        let attrs = parse_nvme_attributes(&log);
        let names: Vec<_> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            ["critical_warning", "temperature", "available_spare", "data_units_read"]
        );
        for a in &attrs {
            assert_eq!(a.id, json!("-"));
            assert_eq!(a.worst, json!(""));
            assert_eq!(a.threshold, json!(""));
            assert_eq!(a.raw, a.value);
        }
    }

    #[test]
    fn test_parse_nvme_empty_log() {
        assert!(parse_nvme_attributes(&Map::new()).is_empty());
    }

    // -----------------------------------------------------------------------
    // synthesize
    // -----------------------------------------------------------------------

    #[test]
    fn test_synthesize_nvme_report() {
        let doc = json!({
            "smart_status": { "passed": true },
            "nvme_smart_health_information_log": { "critical_warning": 0, "temperature": 33 }
        });
        let report = synthesize("/dev/nvme0n1", SmartPayload::from_document(doc.clone()));
        assert_eq!(report.device(), "/dev/nvme0n1");
        assert_eq!(report.family(), DiskFamily::Nvme);
        assert_eq!(report.health(), HealthVerdict::Passed);
        assert_eq!(report.attributes().len(), 2);
        assert_eq!(report.attributes()[0].name, "critical_warning");
        assert_eq!(report.attributes()[0].worst, json!(""));
        assert_eq!(report.document(), Some(&doc));
    }

    #[test]
    fn test_synthesize_sata_report() {
        let doc = json!({
            "smart_status": { "passed": false },
            "ata_smart_attributes": { "table": [
                { "id": 5, "name": "Reallocated_Sector_Ct", "value": 100, "worst": 100, "thresh": 36, "raw": { "value": 0 } }
            ] }
        });
        let report = synthesize("/dev/sda", SmartPayload::new(Some(doc), Some("raw".into())));
        assert_eq!(report.family(), DiskFamily::SataAta);
        assert_eq!(report.health(), HealthVerdict::Failed);
        assert_eq!(report.attributes().len(), 1);
        assert_eq!(report.transcript(), Some("raw"));
    }

    #[test]
    fn test_synthesize_transcript_fallback() {
        let report = synthesize(
            "/dev/sda",
            SmartPayload::from_transcript("SMART test result: PASSED"),
        );
        assert_eq!(report.health(), HealthVerdict::Passed);
        assert_eq!(report.family(), DiskFamily::Unknown);
        assert!(report.attributes().is_empty());
        assert!(report.document().is_none());
    }

    #[test]
    fn test_synthesize_document_shadows_transcript() {
        // No smart_status in the document: health stays UNKNOWN even though
        // the transcript says PASSED.
        let doc = json!({ "ata_smart_attributes": { "table": [] } });
        let report = synthesize(
            "/dev/sda",
            SmartPayload::new(Some(doc), Some("PASSED".into())),
        );
        assert_eq!(report.health(), HealthVerdict::Unknown);
    }

    #[test]
    fn test_synthesize_empty_document_is_treated_as_absent() {
        let report = synthesize(
            "/dev/sda",
            SmartPayload::new(Some(json!({})), Some("result: FAILED".into())),
        );
        assert_eq!(report.health(), HealthVerdict::Failed);
        assert_eq!(report.family(), DiskFamily::Unknown);
        // Kept verbatim for export.
        assert_eq!(report.document(), Some(&json!({})));
    }

    #[test]
    fn test_synthesize_ambiguous_document_has_no_attributes() {
        let doc = json!({
            "smart_status": { "passed": true },
            "temperature": { "current": 30 },
            "power_on_time": { "hours": 100 }
        });
        let report = synthesize("/dev/sdb", SmartPayload::from_document(doc));
        assert_eq!(report.family(), DiskFamily::Unknown);
        assert!(report.attributes().is_empty());
        assert_eq!(report.health(), HealthVerdict::Passed);
    }

    #[test]
    fn test_synthesize_nvme_path_without_log_has_no_attributes() {
        let doc = json!({
            "smart_status": { "passed": true },
            "ata_smart_attributes": { "table": [ { "id": 1 } ] }
        });
        let report = synthesize("/dev/nvme0", SmartPayload::from_document(doc));
        assert_eq!(report.family(), DiskFamily::Nvme);
        assert!(report.attributes().is_empty());
    }

    #[test]
    fn test_synthesize_nothing() {
        let report = synthesize("/dev/sdc", SmartPayload::default());
        assert_eq!(report.health(), HealthVerdict::Unknown);
        assert_eq!(report.family(), DiskFamily::Unknown);
        assert!(report.transcript().is_none());
    }

    // -----------------------------------------------------------------------
    // Indicators and display text
    // -----------------------------------------------------------------------

    fn nvme_attr(name: &str, value: Value) -> Attribute {
        Attribute {
            id: json!("-"),
            name: name.to_string(),
            value: value.clone(),
            worst: json!(""),
            threshold: json!(""),
            raw: value,
        }
    }

    #[test]
    fn test_nvme_indicator_rules() {
        let f = DiskFamily::Nvme;
        assert_eq!(attribute_indicator(f, &nvme_attr("critical_warning", json!(0))), HealthIndicator::Ok);
        assert_eq!(attribute_indicator(f, &nvme_attr("critical_warning", json!(4))), HealthIndicator::Warning);
        assert_eq!(attribute_indicator(f, &nvme_attr("available_spare", json!(5))), HealthIndicator::Warning);
        assert_eq!(attribute_indicator(f, &nvme_attr("available_spare", json!(100))), HealthIndicator::Ok);
        assert_eq!(attribute_indicator(f, &nvme_attr("available_spare_threshold", json!(10))), HealthIndicator::Ok);
        assert_eq!(attribute_indicator(f, &nvme_attr("percentage_used", json!(81))), HealthIndicator::Warning);
        assert_eq!(attribute_indicator(f, &nvme_attr("percentage_used", json!(80))), HealthIndicator::Ok);
        assert_eq!(attribute_indicator(f, &nvme_attr("media_errors", json!(2))), HealthIndicator::Warning);
        assert_eq!(attribute_indicator(f, &nvme_attr("temperature", json!(70))), HealthIndicator::Ok);
    }

    #[test]
    fn test_sata_indicator_value_below_threshold() {
        let mut attr = Attribute {
            id: json!(5),
            name: "Reallocated_Sector_Ct".into(),
            value: json!(30),
            worst: json!(30),
            threshold: json!(36),
            raw: json!(0),
        };
        assert_eq!(attribute_indicator(DiskFamily::SataAta, &attr), HealthIndicator::Warning);
        attr.value = json!(100);
        assert_eq!(attribute_indicator(DiskFamily::SataAta, &attr), HealthIndicator::Ok);
        attr.value = json!("");
        attr.threshold = json!("");
        assert_eq!(attribute_indicator(DiskFamily::Unknown, &attr), HealthIndicator::Ok);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("abc")), "abc");
        assert_eq!(scalar_text(&json!(null)), "");
        assert_eq!(scalar_text(&json!(42)), "42");
        assert_eq!(scalar_text(&json!(true)), "true");
        assert_eq!(scalar_text(&json!({ "value": 36, "string": "36 (Min/Max 20/55)" })), "36 (Min/Max 20/55)");
        assert_eq!(scalar_text(&json!({ "value": 36 })), r#"{"value":36}"#);
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("42"), Some(42));
        assert_eq!(parse_digits("+42"), None);
        assert_eq!(parse_digits("-1"), None);
        assert_eq!(parse_digits(""), None);
        assert_eq!(parse_digits("4.2"), None);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(DiskFamily::SataAta.to_string(), "sata_ata");
        assert_eq!(HealthVerdict::Passed.to_string(), "PASSED");
        assert_eq!(HealthIndicator::Warning.to_string(), "WARN");
    }

    #[test]
    fn test_serde_labels_match_display() {
        assert_eq!(serde_json::to_value(DiskFamily::SataAta).unwrap(), json!("sata_ata"));
        assert_eq!(serde_json::to_value(DiskFamily::Nvme).unwrap(), json!("nvme"));
        assert_eq!(serde_json::to_value(HealthVerdict::Failed).unwrap(), json!("FAILED"));
    }
}

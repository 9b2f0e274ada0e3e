use std::sync::LazyLock;

use regex::Regex;

use crate::models::VitalSigns;

/// Words kept in an evolution summary before truncation.
pub const SUMMARY_WORD_LIMIT: usize = 20;

/// `<digits>` or `<digits> - <digits>` followed by the unit, captured verbatim.
macro_rules! vital_pattern {
    ($label:literal, $unit:literal) => {
        concat!(
            r"(?i)\b",
            $label,
            r":?\s*(?P<value>\d+(?:\s*-\s*\d+)?\s*",
            $unit,
            ")"
        )
    };
}

static PRESSURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(vital_pattern!("PAM?", "mmHg")).unwrap());
static HEART_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(vital_pattern!("FC", "bpm")).unwrap());
static RESPIRATORY_RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(vital_pattern!("FR", "i?rpm")).unwrap());
static SATURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(vital_pattern!("Sat", "%")).unwrap());

/// Diagnosis mentions: section words plus `pneumonia`, which HICD notes often state
/// without any section heading.
static DIAGNOSIS_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)diagnóstico|hipótese|cid|pneumonia").unwrap());

static MEDICATION_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)medicamento|droga|prescrição|mg|ml").unwrap());

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name("value"))
        .map(|m| m.as_str().to_string())
}

/// Pull inline vital signs (`PAM: 73-99 mmHg FC: 99-154 bpm ...`) out of free text.
/// Each measurement is independent; missing ones stay `None`.
pub fn extract_vitals(text: &str) -> VitalSigns {
    if text.is_empty() {
        return VitalSigns::default();
    }
    VitalSigns {
        pressao: capture(&PRESSURE, text),
        frequencia_cardiaca: capture(&HEART_RATE, text),
        frequencia_respiratoria: capture(&RESPIRATORY_RATE, text),
        saturacao: capture(&SATURATION, text),
    }
}

/// Presence of diagnosis / medication vocabulary in a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClinicalFlags {
    pub has_diagnosis: bool,
    pub has_medication: bool,
}

pub fn detect_clinical_flags(text: &str) -> ClinicalFlags {
    ClinicalFlags {
        has_diagnosis: DIAGNOSIS_MENTION.is_match(text),
        has_medication: MEDICATION_MENTION.is_match(text),
    }
}

/// First `SUMMARY_WORD_LIMIT` whitespace-delimited words, `...` appended only
/// when words were dropped.
pub fn summarize(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut summary = words
        .iter()
        .take(SUMMARY_WORD_LIMIT)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > SUMMARY_WORD_LIMIT {
        summary.push_str("...");
    }
    summary
}

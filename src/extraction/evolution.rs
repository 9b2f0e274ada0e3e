use serde_json::Value;

use super::fields::{optional_text, value_to_text, FieldRule};
use super::vitals::{detect_clinical_flags, extract_vitals, summarize};
use super::{require_object, ExtractionContext, ExtractionError};
use crate::config::{SCHEMA_VERSION, SOURCE_TAG};
use crate::models::{
    ClinicalEvolution, EvolutionContent, EvolutionMetadata, StructuredClinicalData,
};

pub const TIMESTAMP: FieldRule = FieldRule {
    field: "dataEvolucao",
    candidates: &[&["dataEvolucao"], &["data"]],
    fallback: Some("Data não informada"),
};

pub const PROFESSIONAL: FieldRule = FieldRule {
    field: "profissional",
    candidates: &[&["profissional"], &["medico", "nome"]],
    fallback: Some("Profissional não informado"),
};

pub const ACTIVITY: FieldRule = FieldRule {
    field: "atividade",
    candidates: &[&["atividade"], &["categoria"]],
    fallback: Some("MEDICO (QUALQUER ESPECIALIDADE)"),
};

pub const CONTENT: FieldRule = FieldRule {
    field: "conteudo",
    candidates: &[&["conteudo"], &["textoCompleto"], &["texto"]],
    fallback: None,
};

/// Text-bearing keys inside a content value that arrived as a mapping.
pub const NESTED_CONTENT: FieldRule = FieldRule {
    field: "conteudo.texto",
    candidates: &[&["texto"], &["textoCompleto"], &["descricao"]],
    fallback: None,
};

/// Resolve the note text, unwrapping a nested content mapping if needed.
pub fn resolve_content(raw: &Value) -> String {
    match CONTENT.resolve(raw) {
        None => String::new(),
        Some(nested @ Value::Object(_)) => match NESTED_CONTENT.resolve(nested) {
            Some(text) => value_to_text(text),
            None => nested.to_string(),
        },
        Some(other) => value_to_text(other),
    }
}

/// Normalize one raw evolution. `index` is its position in the backend sequence.
pub fn transform_evolution(
    ctx: &ExtractionContext,
    index: usize,
    raw: &Value,
) -> Result<ClinicalEvolution, ExtractionError> {
    require_object(raw)?;

    let text = resolve_content(raw);
    let resumo = summarize(&text);
    let sinais_vitais = extract_vitals(&text);
    let flags = detect_clinical_flags(&text);

    Ok(ClinicalEvolution {
        id: format!("{}_{}", ctx.patient_id, index),
        paciente_id: ctx.patient_id.clone(),
        data_evolucao: TIMESTAMP.resolve_text(raw),
        data_atualizacao: optional_text(raw, "dataAtualizacao"),
        profissional: PROFESSIONAL.resolve_text(raw),
        atividade: ACTIVITY.resolve_text(raw),
        sub_atividade: optional_text(raw, "subAtividade"),
        clinica_leito: optional_text(raw, "clinicaLeito"),
        metadata: EvolutionMetadata {
            tamanho_texto: text.chars().count(),
            tem_diagnostico: flags.has_diagnosis,
            tem_medicamentos: flags.has_medication,
            tem_sinais_vitais: !sinais_vitais.is_empty(),
            data_extracao: ctx.timestamp(),
            fonte: SOURCE_TAG.to_string(),
            versao: SCHEMA_VERSION.to_string(),
        },
        dados_clinicos_estruturados: StructuredClinicalData {
            sinais_vitais,
            ..StructuredClinicalData::default()
        },
        conteudo: EvolutionContent {
            texto_completo: text,
            resumo,
        },
    })
}

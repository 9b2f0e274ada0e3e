use serde_json::Value;

use super::fields::{count, flag, optional_text, text_list, type_name};
use super::{optional_object, require_object, ExtractionContext, ExtractionError};
use crate::config::SOURCE_TAG;
use crate::models::{ExamMetadata, ExamResult, ExamStatus, ExamSummary};

/// Both spellings of the test-code list seen in backend payloads.
const TEST_CODE_KEYS: &[&str] = &["siglasDisponveis", "siglasDisponiveis"];

/// Normalize one exam request. The `status` mapping is required; its flags and the
/// whole `resumo` section default when absent.
pub fn transform_exam(
    ctx: &ExtractionContext,
    _index: usize,
    raw: &Value,
) -> Result<ExamResult, ExtractionError> {
    require_object(raw)?;

    let status = match raw.get("status") {
        None | Some(Value::Null) => return Err(ExtractionError::MissingSection("status")),
        Some(value @ Value::Object(_)) => value,
        Some(other) => {
            return Err(ExtractionError::InvalidSection {
                section: "status",
                expected: "object",
                found: type_name(other),
            })
        }
    };
    let resumo = optional_object(raw, "resumo")?;

    Ok(ExamResult {
        id: optional_text(raw, "id"),
        paciente_id: optional_text(raw, "pacienteId")
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| ctx.patient_id.clone()),
        requisicao_id: optional_text(raw, "requisicaoId"),
        data: optional_text(raw, "data"),
        hora: optional_text(raw, "hora"),
        medico: optional_text(raw, "medico"),
        clinica: optional_text(raw, "clinica"),
        status: ExamStatus {
            coletado: flag(status, "coletado"),
            processado: flag(status, "processado"),
            liberado: flag(status, "liberado"),
            tem_resultados: flag(status, "temResultados"),
        },
        resumo: resumo
            .map(|summary| ExamSummary {
                total_exames_solicitados: count(summary, "totalExamesSolicitados"),
                total_resultados: count(summary, "totalResultados"),
                siglas_disponiveis: text_list(summary, TEST_CODE_KEYS),
            })
            .unwrap_or_default(),
        metadata: ExamMetadata {
            data_processamento: ctx.timestamp(),
            fonte: SOURCE_TAG.to_string(),
        },
    })
}

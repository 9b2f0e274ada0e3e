use serde::{Deserialize, Serialize};

/// One exam request with its collection/release status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: Option<String>,
    pub paciente_id: String,
    pub requisicao_id: Option<String>,
    pub data: Option<String>,
    pub hora: Option<String>,
    pub medico: Option<String>,
    pub clinica: Option<String>,
    pub status: ExamStatus,
    pub resumo: ExamSummary,
    pub metadata: ExamMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStatus {
    pub coletado: bool,
    pub processado: bool,
    pub liberado: bool,
    pub tem_resultados: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub total_exames_solicitados: u64,
    pub total_resultados: u64,
    /// Test codes with results. Wire name keeps the backend's spelling.
    #[serde(rename = "siglasDisponveis")]
    pub siglas_disponiveis: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamMetadata {
    pub data_processamento: String,
    pub fonte: String,
}

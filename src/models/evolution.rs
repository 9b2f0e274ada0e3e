use serde::{Deserialize, Serialize};

/// One clinical evolution note, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalEvolution {
    /// `{patientId}_{sequenceIndex}`
    pub id: String,
    pub paciente_id: String,
    pub data_evolucao: String,
    pub data_atualizacao: Option<String>,
    pub profissional: String,
    pub atividade: String,
    pub sub_atividade: Option<String>,
    pub clinica_leito: Option<String>,
    pub conteudo: EvolutionContent,
    pub dados_clinicos_estruturados: StructuredClinicalData,
    pub metadata: EvolutionMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionContent {
    pub texto_completo: String,
    pub resumo: String,
}

/// Structured sections of the note. Only `sinais_vitais` is populated by
/// fixed-pattern extraction; the list sections are reserved for richer parsers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredClinicalData {
    pub hipoteses_diagnosticas: Vec<String>,
    pub medicamentos: Vec<String>,
    pub exames: Vec<String>,
    pub sinais_vitais: VitalSigns,
    pub procedimentos: Vec<String>,
}

/// Vital signs found inline in the note text, verbatim (`"73-99 mmHg"`).
/// Absent measurements are omitted from the serialized mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequencia_cardiaca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequencia_respiratoria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturacao: Option<String>,
}

impl VitalSigns {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        [
            &self.pressao,
            &self.frequencia_cardiaca,
            &self.frequencia_respiratoria,
            &self.saturacao,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionMetadata {
    pub tamanho_texto: usize,
    pub tem_diagnostico: bool,
    pub tem_medicamentos: bool,
    pub tem_sinais_vitais: bool,
    pub data_extracao: String,
    pub fonte: String,
    pub versao: String,
}

use serde::{Deserialize, Serialize};

/// One prescribing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Option<String>,
    pub codigo: Option<String>,
    pub data_hora: Option<String>,
    pub paciente_nome: Option<String>,
    pub registro: Option<String>,
    pub internacao: Option<String>,
    pub enf_leito: Option<String>,
    pub clinica: Option<String>,
    pub prontuario: String,
    pub detalhes: PrescriptionDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetail {
    pub id: Option<String>,
    pub cabecalho: PrescriptionHeader,
    pub medicamentos: Vec<Medication>,
}

/// Patient and admission context printed at the top of a prescription.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionHeader {
    pub paciente_nome: Option<String>,
    pub registro: Option<String>,
    pub prontuario: Option<String>,
    pub leito: Option<String>,
    pub data_nascimento: Option<String>,
    pub idade: Option<String>,
    pub peso: Option<String>,
    pub data_internacao: Option<String>,
    pub clinica: Option<String>,
    pub data_prescricao: Option<String>,
    pub hospital: Option<String>,
    pub medico: Option<String>,
    pub crm: Option<String>,
    pub data_assinatura: Option<String>,
    pub acompanhante: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub nome: String,
    pub dose: String,
    pub apresentacao: String,
    pub via: String,
    pub intervalo: String,
    pub observacao: String,
    pub dias: String,
    pub texto_medicamento: String,
    /// Present only for items outside the hospital formulary.
    #[serde(flatten)]
    pub nao_padronizado: Option<NonStandardDetail>,
}

impl Medication {
    pub fn is_non_standard(&self) -> bool {
        self.nao_padronizado.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonStandardDetail {
    pub nao_padronizado: bool,
    pub posologia: String,
}

use serde_json::Value;

use super::fields::{flag, optional_text, text_or_empty, type_name};
use super::{optional_object, require_object, ExtractionContext, ExtractionError};
use crate::models::{
    Medication, NonStandardDetail, Prescription, PrescriptionDetail, PrescriptionHeader,
};

/// Normalize one prescription. `detalhes`, `cabecalho` and `medicamentos` may be
/// missing, but present-with-the-wrong-shape rejects the item.
pub fn transform_prescription(
    ctx: &ExtractionContext,
    _index: usize,
    raw: &Value,
) -> Result<Prescription, ExtractionError> {
    require_object(raw)?;

    let id = optional_text(raw, "id");
    let detalhes = optional_object(raw, "detalhes")?;
    let cabecalho = match detalhes {
        Some(d) => optional_object(d, "cabecalho")?,
        None => None,
    };
    let medicamentos: &[Value] = match detalhes.and_then(|d| d.get("medicamentos")) {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items.as_slice(),
        Some(other) => {
            return Err(ExtractionError::InvalidSection {
                section: "medicamentos",
                expected: "array",
                found: type_name(other),
            })
        }
    };

    Ok(Prescription {
        codigo: optional_text(raw, "codigo").or_else(|| id.clone()),
        data_hora: optional_text(raw, "dataHora"),
        paciente_nome: optional_text(raw, "pacienteNome"),
        registro: optional_text(raw, "registro"),
        internacao: optional_text(raw, "internacao"),
        enf_leito: optional_text(raw, "enfLeito"),
        clinica: optional_text(raw, "clinica"),
        prontuario: optional_text(raw, "prontuario")
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| ctx.patient_id.clone()),
        detalhes: PrescriptionDetail {
            id: id.clone(),
            cabecalho: cabecalho.map(extract_header).unwrap_or_default(),
            medicamentos: extract_medications(medicamentos),
        },
        id,
    })
}

fn extract_header(raw: &Value) -> PrescriptionHeader {
    PrescriptionHeader {
        paciente_nome: optional_text(raw, "pacienteNome"),
        registro: optional_text(raw, "registro"),
        prontuario: optional_text(raw, "prontuario"),
        leito: optional_text(raw, "leito"),
        data_nascimento: optional_text(raw, "dataNascimento"),
        idade: optional_text(raw, "idade"),
        peso: optional_text(raw, "peso"),
        data_internacao: optional_text(raw, "dataInternacao"),
        clinica: optional_text(raw, "clinica"),
        data_prescricao: optional_text(raw, "dataPrescricao"),
        hospital: optional_text(raw, "hospital"),
        medico: optional_text(raw, "medico"),
        crm: optional_text(raw, "crm"),
        data_assinatura: optional_text(raw, "dataAssinatura"),
        acompanhante: optional_text(raw, "acompanhante"),
    }
}

/// Normalize medication entries in order; non-mapping entries are ignored.
pub fn extract_medications(items: &[Value]) -> Vec<Medication> {
    items
        .iter()
        .filter(|item| item.is_object())
        .map(extract_medication)
        .collect()
}

fn extract_medication(raw: &Value) -> Medication {
    let nao_padronizado = flag(raw, "naoPadronizado").then(|| NonStandardDetail {
        nao_padronizado: true,
        posologia: text_or_empty(raw, "posologia"),
    });

    Medication {
        nome: text_or_empty(raw, "nome"),
        dose: text_or_empty(raw, "dose"),
        apresentacao: text_or_empty(raw, "apresentacao"),
        via: text_or_empty(raw, "via"),
        intervalo: text_or_empty(raw, "intervalo"),
        observacao: text_or_empty(raw, "observacao"),
        dias: text_or_empty(raw, "dias"),
        texto_medicamento: text_or_empty(raw, "textoMedicamento"),
        nao_padronizado,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::extract_batch;
    use serde_json::json;

    fn ctx() -> ExtractionContext {
        ExtractionContext::new("40380")
    }

    fn raw_prescription() -> Value {
        json!({
            "id": "P-1",
            "dataHora": "02/09/2025 10:00",
            "pacienteNome": "MARIA",
            "registro": "R-9",
            "internacao": "I-3",
            "enfLeito": "UTI-04",
            "clinica": "UTI PEDIATRICA",
            "detalhes": {
                "cabecalho": {
                    "pacienteNome": "MARIA",
                    "prontuario": "40380",
                    "idade": 4,
                    "peso": "16 kg",
                    "medico": "DR. CARLOS",
                    "crm": "1234"
                },
                "medicamentos": [
                    {
                        "nome": "DIPIRONA",
                        "dose": "1",
                        "apresentacao": "AMPOLA",
                        "via": "EV",
                        "intervalo": "6/6H",
                        "dias": 3,
                        "textoMedicamento": "DIPIRONA 1 AMPOLA EV 6/6H"
                    },
                    {
                        "nome": "MELATONINA",
                        "naoPadronizado": true,
                        "posologia": "1x ao dia"
                    }
                ]
            }
        })
    }

    #[test]
    fn full_prescription() {
        let p = transform_prescription(&ctx(), 0, &raw_prescription()).unwrap();
        assert_eq!(p.id.as_deref(), Some("P-1"));
        assert_eq!(p.codigo.as_deref(), Some("P-1"));
        assert_eq!(p.prontuario, "40380");
        assert_eq!(p.enf_leito.as_deref(), Some("UTI-04"));
        assert_eq!(p.detalhes.id.as_deref(), Some("P-1"));
        assert_eq!(p.detalhes.cabecalho.idade.as_deref(), Some("4"));
        assert_eq!(p.detalhes.cabecalho.crm.as_deref(), Some("1234"));
        assert_eq!(p.detalhes.cabecalho.hospital, None);
        assert_eq!(p.detalhes.medicamentos.len(), 2);
        assert_eq!(p.detalhes.medicamentos[0].dias, "3");
        assert_eq!(p.detalhes.medicamentos[0].observacao, "");
    }

    #[test]
    fn non_standard_medication_keeps_posology() {
        let p = transform_prescription(&ctx(), 0, &raw_prescription()).unwrap();
        let json = serde_json::to_value(&p.detalhes.medicamentos).unwrap();

        assert_eq!(json[1]["naoPadronizado"], true);
        assert_eq!(json[1]["posologia"], "1x ao dia");

        let standard = json[0].as_object().unwrap();
        assert!(!standard.contains_key("naoPadronizado"));
        assert!(!standard.contains_key("posologia"));
    }

    #[test]
    fn non_standard_without_posology_defaults_empty() {
        let meds = extract_medications(&[json!({"nome": "X", "naoPadronizado": true})]);
        assert_eq!(
            meds[0].nao_padronizado,
            Some(NonStandardDetail {
                nao_padronizado: true,
                posologia: String::new()
            })
        );
    }

    #[test]
    fn explicit_standard_flag_is_standard() {
        let meds = extract_medications(&[json!({"nome": "X", "naoPadronizado": false, "posologia": "y"})]);
        assert!(!meds[0].is_non_standard());
    }

    #[test]
    fn non_object_medications_ignored() {
        let meds = extract_medications(&[json!("texto"), json!({"nome": "A"}), json!(null)]);
        assert_eq!(meds.len(), 1);
        assert_eq!(meds[0].nome, "A");
    }

    #[test]
    fn minimal_prescription_uses_fallbacks() {
        let p = transform_prescription(&ctx(), 0, &json!({"codigo": "C-7"})).unwrap();
        assert_eq!(p.codigo.as_deref(), Some("C-7"));
        assert_eq!(p.id, None);
        assert_eq!(p.prontuario, "40380");
        assert_eq!(p.detalhes.cabecalho, PrescriptionHeader::default());
        assert!(p.detalhes.medicamentos.is_empty());
    }

    #[test]
    fn malformed_sections_reject_item() {
        let bad_details = json!({"id": "1", "detalhes": "texto"});
        assert!(transform_prescription(&ctx(), 0, &bad_details).is_err());

        let bad_header = json!({"id": "1", "detalhes": {"cabecalho": [1]}});
        assert!(transform_prescription(&ctx(), 0, &bad_header).is_err());

        let bad_meds = json!({"id": "1", "detalhes": {"medicamentos": {"nome": "A"}}});
        assert_eq!(
            transform_prescription(&ctx(), 0, &bad_meds).unwrap_err(),
            ExtractionError::InvalidSection {
                section: "medicamentos",
                expected: "array",
                found: "object"
            }
        );
    }

    #[test]
    fn batch_skips_only_broken_prescription() {
        let items = vec![
            raw_prescription(),
            json!({"detalhes": 5}),
            json!({"id": "P-3"}),
        ];
        let out = extract_batch("prescriptions", &items, |i, raw| {
            transform_prescription(&ctx(), i, raw)
        });
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].id.as_deref(), Some("P-3"));
    }
}

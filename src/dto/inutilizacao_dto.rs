//! DTOs da API de inutilização

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::inutilizacao::StatusInutilizacao;
use crate::utils::validation::{validate_cnpj, validate_modelo, validate_serie, validate_uf};

/// Request de inutilização de faixa de numeração
///
/// O certificado A1 chega em base64 junto da requisição; nada é
/// persistido por este serviço.
#[derive(Debug, Deserialize, Validate)]
pub struct InutilizacaoRequest {
    #[validate(custom = "validate_uf")]
    pub uf: String,
    #[validate(custom = "validate_cnpj")]
    pub cnpj: String,
    #[validate(custom = "validate_modelo")]
    pub modelo: String,
    #[validate(custom = "validate_serie")]
    pub serie: String,
    pub numero_inicial: u64,
    pub numero_final: u64,
    /// Tamanho mínimo da justificativa é validado pela SEFAZ, não aqui
    #[validate(length(min = 1))]
    pub justificativa: String,
    pub ano: u16,
    /// "1" produção / "2" homologação
    pub tp_amb: String,
    pub certificado_base64: String,
    pub senha_certificado: String,
}

/// Response com os artefatos da inutilização
#[derive(Debug, Serialize)]
pub struct InutilizacaoResponse {
    pub success: bool,
    pub status: StatusInutilizacao,
    pub xml_assinado: String,
    pub ret_inut_xml: String,
    pub proc_inut_xml: String,
    pub timestamp: String,
}

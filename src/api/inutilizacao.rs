//! API de inutilização de numeração NFe/NFCe

use axum::{extract::State, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use validator::Validate;

use crate::{
    dto::inutilizacao_dto::{InutilizacaoRequest, InutilizacaoResponse},
    models::inutilizacao::{InutilizacaoPayload, TipoAmbiente},
    services::sefaz_inutilizacao_service::solicitar_inutilizacao,
    state::AppState,
    utils::errors::AppError,
};

/// Criar o router de inutilização
pub fn create_inutilizacao_router() -> Router<AppState> {
    Router::new().route("/inutilizacao", post(solicitar))
}

/// POST /api/inutilizacao - Solicitar inutilização de faixa à SEFAZ
async fn solicitar(
    State(state): State<AppState>,
    Json(request): Json<InutilizacaoRequest>,
) -> Result<Json<InutilizacaoResponse>, AppError> {
    request.validate()?;

    if request.numero_final < request.numero_inicial {
        return Err(AppError::BadRequest(
            "numero_final deve ser maior ou igual a numero_inicial".to_string(),
        ));
    }

    let tp_amb = TipoAmbiente::from_codigo(&request.tp_amb)
        .ok_or_else(|| AppError::BadRequest("tp_amb deve ser \"1\" ou \"2\"".to_string()))?;

    let cert_buffer = BASE64
        .decode(&request.certificado_base64)
        .map_err(|_| AppError::BadRequest("certificado_base64 não é base64 válido".to_string()))?;

    log::info!(
        "🗂️  Inutilização solicitada: UF={} modelo={} série={} faixa={}-{}",
        request.uf,
        request.modelo,
        request.serie,
        request.numero_inicial,
        request.numero_final
    );

    let payload = InutilizacaoPayload {
        uf: request.uf,
        cnpj: request.cnpj,
        modelo: request.modelo,
        serie: request.serie,
        numero_inicial: request.numero_inicial,
        numero_final: request.numero_final,
        justificativa: request.justificativa,
        ano: request.ano,
        tp_amb,
        cert_buffer,
        cert_password: request.senha_certificado,
    };

    let resultado = solicitar_inutilizacao(&state.sefaz_client, &payload).await?;

    Ok(Json(InutilizacaoResponse {
        success: true,
        status: resultado.status,
        xml_assinado: resultado.xml_assinado,
        ret_inut_xml: resultado.ret_inut_xml,
        proc_inut_xml: resultado.proc_inut_xml,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

//! Sistema de tratamento de erros
//!
//! Este módulo define os tipos de erro da aplicação e sua conversão
//! para respostas HTTP apropriadas.
//!
//! Taxonomia: configuração (UF não suportada), credencial (certificado/senha),
//! transporte (falha de rede ou timeout do cliente HTTP) e protocolo
//! (resposta da SEFAZ em formato não reconhecido). Nenhum erro é retentado
//! ou suprimido aqui; a camada chamadora decide o que fazer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Erros principais da aplicação
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Inutilização não suportada para a UF {0}")]
    UfNaoSuportada(String),

    #[error("certificado inválido ou senha incorreta")]
    CertificadoInvalido,

    #[error("Erro de comunicação com a SEFAZ: {0}")]
    Transporte(#[from] reqwest::Error),

    #[error("Resposta SEFAZ sem retInutNFe")]
    RespostaSemRetInut,

    #[error("XML de resposta inválido: {0}")]
    XmlInvalido(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Resposta de erro da API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Validation(e) => {
                eprintln!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "Os dados informados são inválidos".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::UfNaoSuportada(uf) => {
                eprintln!("UF não suportada: {}", uf);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "UF Não Suportada".to_string(),
                        message: format!("Inutilização não suportada para a UF {}", uf),
                        details: None,
                        code: Some("UF_NAO_SUPORTADA".to_string()),
                    },
                )
            }

            AppError::CertificadoInvalido => {
                eprintln!("Certificado inválido ou senha incorreta");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Certificado Inválido".to_string(),
                        message: "certificado inválido ou senha incorreta".to_string(),
                        details: None,
                        code: Some("CERTIFICADO_INVALIDO".to_string()),
                    },
                )
            }

            AppError::Transporte(e) => {
                eprintln!("Erro de comunicação com a SEFAZ: {}", e);
                let code = if e.is_timeout() {
                    "SEFAZ_TIMEOUT"
                } else {
                    "SEFAZ_TRANSPORTE"
                };
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse {
                        error: "Erro de Comunicação".to_string(),
                        message: "Falha na comunicação com o webservice da SEFAZ".to_string(),
                        details: Some(json!({ "transport_error": e.to_string() })),
                        code: Some(code.to_string()),
                    },
                )
            }

            AppError::RespostaSemRetInut => {
                eprintln!("Resposta SEFAZ sem retInutNFe");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse {
                        error: "Resposta Inválida".to_string(),
                        message: "Resposta SEFAZ sem retInutNFe".to_string(),
                        details: None,
                        code: Some("SEFAZ_RESPOSTA_INVALIDA".to_string()),
                    },
                )
            }

            AppError::XmlInvalido(msg) => {
                eprintln!("XML de resposta inválido: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse {
                        error: "XML Inválido".to_string(),
                        message: "A SEFAZ devolveu um XML que não pôde ser interpretado".to_string(),
                        details: Some(json!({ "xml_error": msg })),
                        code: Some("SEFAZ_XML_INVALIDO".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => {
                eprintln!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Bad Request".to_string(),
                        message: msg,
                        details: None,
                        code: Some("BAD_REQUEST".to_string()),
                    },
                )
            }

            AppError::Internal(msg) => {
                eprintln!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "Ocorreu um erro inesperado".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operações que podem falhar
pub type AppResult<T> = Result<T, AppError>;

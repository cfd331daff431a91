//! Services module
//!
//! Este módulo contém a lógica de negócio da aplicação. Os serviços
//! encapsulam as operações do fluxo de inutilização: montagem do XML,
//! extração do certificado A1 e assinatura XML-DSig.

pub mod assinatura_service;
pub mod certificado_service;
pub mod sefaz_inutilizacao_service;

pub use sefaz_inutilizacao_service::solicitar_inutilizacao;

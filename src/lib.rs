//! Serviço de inutilização de numeração NFe/NFCe junto à SEFAZ
//!
//! Monta o XML `inutNFe` canônico, assina com o certificado A1 (PKCS#12)
//! no perfil XML-DSig legado da NFe, envia por SOAP 1.2 ao webservice da
//! UF e interpreta o `retInutNFe` devolvido. Expõe a operação por uma API
//! HTTP mínima; persistência, retentativas e telas ficam nos chamadores.

pub mod api;
pub mod clients;
pub mod config;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

//! Shared application state
//!
//! Este módulo define o estado compartilhado da aplicação que é
//! passado através do router do Axum.
//!
//! O serviço não guarda estado mutável entre requisições: o cliente
//! SOAP é compartilhado apenas por eficiência de conexão, e chamadas
//! concorrentes (por exemplo, de empresas diferentes) são independentes.

use crate::clients::sefaz_client::SefazSoapClient;
use crate::config::environment::EnvironmentConfig;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub sefaz_client: SefazSoapClient,
}

impl AppState {
    pub fn new(config: EnvironmentConfig) -> AppResult<Self> {
        let sefaz_client = SefazSoapClient::new(config.sefaz_timeout_secs)?;
        Ok(Self {
            config,
            sefaz_client,
        })
    }
}

//! Configuração de variáveis de ambiente
//!
//! Este módulo concentra a configuração lida do ambiente no boot.
//! As URLs dos webservices da SEFAZ não ficam aqui: são tabelas
//! estáticas imutáveis no serviço de inutilização.

use std::env;

/// Configuração do ambiente de execução
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    /// Timeout da chamada SOAP à SEFAZ, em segundos
    pub sefaz_timeout_secs: u64,
    pub cors_origins: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            sefaz_timeout_secs: env::var("SEFAZ_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("SEFAZ_TIMEOUT_SECS must be a valid number"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect(),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar se estamos em modo desenvolvimento
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar se estamos em modo produção
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obter a URL do servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// As credenciais do certificado A1 chegam dinamicamente via HTTP request;
// não há certificado nem senha hardcoded na configuração.

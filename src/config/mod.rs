//! Configuração do projeto
//!
//! Este módulo contém a configuração lida das variáveis de ambiente.

pub mod environment;

pub use environment::EnvironmentConfig;

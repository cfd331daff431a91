//! Modelos do sistema
//!
//! Este módulo contém os modelos de dados do fluxo fiscal de inutilização.

pub mod inutilizacao;

pub use inutilizacao::*;

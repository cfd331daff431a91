//! Utilidades do sistema
//!
//! Este módulo contém utilidades para tratamento de erros e validação
//! dos campos fiscais.

pub mod errors;
pub mod validation;

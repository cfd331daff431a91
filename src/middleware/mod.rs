//! Middleware da aplicação

pub mod cors;

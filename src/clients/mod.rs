//! Clients - clientes HTTP para serviços externos
//!
//! Este módulo contém os clientes HTTP de comunicação com webservices externos.

pub mod sefaz_client;

pub use sefaz_client::SefazSoapClient;

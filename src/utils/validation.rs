//! Utilidades de validação
//!
//! Este módulo contém funções helper de validação dos campos fiscais
//! usados nos DTOs da API.

use validator::ValidationError;

/// Siglas das 27 unidades federativas (26 estados + DF)
pub const UFS: [&str; 27] = [
    "RO", "AC", "AM", "RR", "PA", "AP", "TO", "MA", "PI", "CE", "RN", "PB", "PE", "AL", "SE",
    "BA", "MG", "ES", "RJ", "SP", "PR", "SC", "RS", "MS", "MT", "GO", "DF",
];

/// Validar sigla de UF
pub fn validate_uf(value: &str) -> Result<(), ValidationError> {
    if UFS.contains(&value.to_uppercase().as_str()) {
        return Ok(());
    }
    let mut error = ValidationError::new("uf");
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Validar CNPJ: 14 dígitos e dígitos verificadores corretos
pub fn validate_cnpj(value: &str) -> Result<(), ValidationError> {
    if cnpj_valido(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("cnpj");
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Validar modelo de documento fiscal ("55" NFe, "65" NFCe)
pub fn validate_modelo(value: &str) -> Result<(), ValidationError> {
    if value == "55" || value == "65" {
        return Ok(());
    }
    let mut error = ValidationError::new("modelo");
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Validar série de emissão (1 a 3 dígitos)
pub fn validate_serie(value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.len() <= 3 && somente_digitos(value) {
        return Ok(());
    }
    let mut error = ValidationError::new("serie");
    error.add_param("value".into(), &value.to_string());
    Err(error)
}

/// Verificar se a string contém apenas dígitos ASCII
pub fn somente_digitos(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Verificação completa de CNPJ, incluindo os dois dígitos verificadores
/// (módulo 11 com pesos 2..9 da direita para a esquerda)
pub fn cnpj_valido(cnpj: &str) -> bool {
    if cnpj.len() != 14 || !somente_digitos(cnpj) {
        return false;
    }

    let digitos: Vec<u32> = cnpj.bytes().map(|b| (b - b'0') as u32).collect();

    // CNPJs com todos os dígitos iguais passam no módulo 11 mas são inválidos
    if digitos.iter().all(|&d| d == digitos[0]) {
        return false;
    }

    digito_verificador(&digitos[..12]) == digitos[12]
        && digito_verificador(&digitos[..13]) == digitos[13]
}

fn digito_verificador(digitos: &[u32]) -> u32 {
    let mut peso = 2u32;
    let mut soma = 0u32;
    for &d in digitos.iter().rev() {
        soma += d * peso;
        peso = if peso == 9 { 2 } else { peso + 1 };
    }
    let resto = soma % 11;
    if resto < 2 {
        0
    } else {
        11 - resto
    }
}

//! Modelos do fluxo de inutilização de numeração NFe/NFCe
//!
//! Este módulo define o payload consumido pelo serviço de inutilização
//! e os artefatos retornados após a submissão à SEFAZ.

use serde::{Deserialize, Serialize};

/// Ambiente de emissão junto à SEFAZ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoAmbiente {
    Producao,
    Homologacao,
}

impl TipoAmbiente {
    /// Código do ambiente conforme o schema da NFe ("1" produção, "2" homologação)
    pub fn codigo(&self) -> &'static str {
        match self {
            TipoAmbiente::Producao => "1",
            TipoAmbiente::Homologacao => "2",
        }
    }

    pub fn from_codigo(codigo: &str) -> Option<Self> {
        match codigo {
            "1" => Some(TipoAmbiente::Producao),
            "2" => Some(TipoAmbiente::Homologacao),
            _ => None,
        }
    }
}

/// Pedido de inutilização de uma faixa de numeração
///
/// Registro transiente: construído pelo chamador, consumido uma única vez.
/// Não possui identidade persistente; arquivamento e retentativas são
/// responsabilidade da camada chamadora.
#[derive(Debug, Clone)]
pub struct InutilizacaoPayload {
    /// Sigla da UF emitente (ex.: "SP")
    pub uf: String,
    /// CNPJ do emitente, 14 dígitos sem máscara
    pub cnpj: String,
    /// Modelo do documento fiscal ("55" NFe, "65" NFCe)
    pub modelo: String,
    /// Série de emissão (sem zeros à esquerda)
    pub serie: String,
    pub numero_inicial: u64,
    pub numero_final: u64,
    /// Justificativa da inutilização (tamanho mínimo é validado pela SEFAZ)
    pub justificativa: String,
    /// Ano de emissão com 4 dígitos; apenas os 2 últimos entram no XML
    pub ano: u16,
    pub tp_amb: TipoAmbiente,
    /// Conteúdo bruto do arquivo PKCS#12 (certificado A1)
    pub cert_buffer: Vec<u8>,
    pub cert_password: String,
}

/// XML de inutilização montado e seu identificador obrigatório
#[derive(Debug, Clone)]
pub struct XmlInutilizacao {
    pub xml: String,
    /// `Id` no formato ID{cUF}{ano2}{cnpj}{modelo}{serie3}{nNFIni9}{nNFFin9}
    pub id: String,
}

/// Status extraído do `retInutNFe` devolvido pela SEFAZ
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusInutilizacao {
    #[serde(rename = "cStat", skip_serializing_if = "Option::is_none")]
    pub c_stat: Option<String>,
    #[serde(rename = "xMotivo", skip_serializing_if = "Option::is_none")]
    pub x_motivo: Option<String>,
    /// Número de protocolo, presente apenas quando a inutilização é homologada
    #[serde(rename = "nProt", skip_serializing_if = "Option::is_none")]
    pub n_prot: Option<String>,
}

/// Artefatos produzidos por uma solicitação de inutilização
#[derive(Debug, Clone, Serialize)]
pub struct ResultadoInutilizacao {
    /// XML `inutNFe` assinado enviado à SEFAZ
    pub xml_assinado: String,
    /// Fragmento `retInutNFe` devolvido pela autoridade
    pub ret_inut_xml: String,
    /// Documento composto `procInutNFe` (pedido assinado + resposta), próprio para arquivamento
    pub proc_inut_xml: String,
    pub status: StatusInutilizacao,
}

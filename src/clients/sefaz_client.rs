//! Cliente SOAP para os webservices da SEFAZ
//!
//! Transporte puro: envolve o XML assinado num envelope SOAP 1.2 e faz o
//! POST com timeout fixo. Sem retentativa automática; erros de rede e de
//! status HTTP sobem inalterados como erros de transporte.

use reqwest::Client;
use std::time::Duration;

use crate::utils::errors::AppResult;

/// Namespace WSDL do serviço NFeInutilizacao4
const NS_WSDL_INUTILIZACAO: &str = "http://www.portalfiscal.inf.br/nfe/wsdl/NFeInutilizacao4";

const CONTENT_TYPE_SOAP12: &str = "application/soap+xml; charset=utf-8";

/// Cliente HTTP para os webservices SOAP da SEFAZ
#[derive(Debug, Clone)]
pub struct SefazSoapClient {
    client: Client,
}

impl SefazSoapClient {
    /// Criar o cliente com o timeout da chamada (60 s em produção)
    pub fn new(timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// Enviar o `inutNFe` assinado ao endpoint da UF e devolver o corpo bruto
    pub async fn enviar_inutilizacao(&self, url: &str, xml_assinado: &str) -> AppResult<String> {
        let envelope = montar_envelope_soap(xml_assinado);

        let response = self
            .client
            .post(url)
            .header("Content-Type", CONTENT_TYPE_SOAP12)
            .body(envelope)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

/// Envelope SOAP 1.2 com o XML fiscal dentro de `nfeDadosMsg`
pub fn montar_envelope_soap(xml: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <soap12:Envelope xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
         xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\" \
         xmlns:soap12=\"http://www.w3.org/2003/05/soap-envelope\">\
         <soap12:Body>\
         <nfeDadosMsg xmlns=\"{}\">{}</nfeDadosMsg>\
         </soap12:Body>\
         </soap12:Envelope>",
        NS_WSDL_INUTILIZACAO, xml
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_soap12() {
        let envelope = montar_envelope_soap("<inutNFe>x</inutNFe>");

        assert!(envelope.contains("http://www.w3.org/2003/05/soap-envelope"));
        assert!(envelope.contains(
            "<nfeDadosMsg xmlns=\"http://www.portalfiscal.inf.br/nfe/wsdl/NFeInutilizacao4\">"
        ));
        assert!(envelope.contains("<inutNFe>x</inutNFe>"));

        // envelope bem formado, com o payload como filho único do Body
        let doc = roxmltree::Document::parse(&envelope).unwrap();
        let body = doc
            .descendants()
            .find(|n| n.tag_name().name() == "Body")
            .unwrap();
        let filhos: Vec<&str> = body
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(filhos, vec!["nfeDadosMsg"]);
    }
}

//! Assinatura digital XML-DSig (perfil legado da NFe)
//!
//! Assinatura "enveloped" sobre um elemento identificado por `Id`, com
//! digest SHA-1, assinatura RSA-SHA1 e canonicalização
//! REC-xml-c14n-20010315. Os algoritmos não são escolha nossa: o perfil
//! de assinatura fiscal legado exige exatamente esses, e a SEFAZ rejeita
//! qualquer outro.
//!
//! O XML assinado aqui é gerado pelo próprio sistema já em forma
//! canônica (atributos ordenados, sem comentários, aspas duplas, elementos
//! vazios como par de tags), então a canonicalização se reduz a propagar o
//! namespace default do documento para o elemento referenciado.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::{Digest, Sha1};

use crate::services::certificado_service::CertificadoDigital;
use crate::utils::errors::{AppError, AppResult};

const NS_XMLDSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
const ALG_C14N: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
const ALG_RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
const ALG_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
const ALG_ENVELOPED: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Assinar um documento XML, referenciando o elemento `tag` de atributo `Id`
///
/// `ns` é o namespace default do documento, que a canonicalização torna
/// explícito no elemento referenciado. O nó `<Signature>` é inserido como
/// último filho do elemento raiz (o schema exige a assinatura após o
/// conteúdo assinado).
pub fn assinar_xml(
    xml: &str,
    tag: &str,
    id: &str,
    ns: &str,
    certificado: &CertificadoDigital,
) -> AppResult<String> {
    let elemento = extrair_elemento(xml, tag)?;

    // forma canônica do elemento referenciado: o namespace default herdado
    // do documento é declarado no próprio elemento
    let abertura = format!("<{} ", tag);
    let abertura_canonica = format!("<{} xmlns=\"{}\" ", tag, ns);
    let elemento_canonico = elemento.replacen(&abertura, &abertura_canonica, 1);

    let digest = BASE64.encode(Sha1::digest(elemento_canonico.as_bytes()));

    // SignedInfo é assinado na forma canônica (com o namespace xmldsig que
    // herdaria de <Signature>); embutido, o namespace fica só na Signature
    let signed_info_conteudo = format!(
        "<CanonicalizationMethod Algorithm=\"{c14n}\"></CanonicalizationMethod>\
         <SignatureMethod Algorithm=\"{rsa_sha1}\"></SignatureMethod>\
         <Reference URI=\"#{id}\">\
         <Transforms>\
         <Transform Algorithm=\"{enveloped}\"></Transform>\
         <Transform Algorithm=\"{c14n}\"></Transform>\
         </Transforms>\
         <DigestMethod Algorithm=\"{sha1}\"></DigestMethod>\
         <DigestValue>{digest}</DigestValue>\
         </Reference>",
        c14n = ALG_C14N,
        rsa_sha1 = ALG_RSA_SHA1,
        enveloped = ALG_ENVELOPED,
        sha1 = ALG_SHA1,
        id = id,
        digest = digest,
    );
    let signed_info_canonico = format!(
        "<SignedInfo xmlns=\"{}\">{}</SignedInfo>",
        NS_XMLDSIG, signed_info_conteudo
    );
    let signed_info_embutido = format!("<SignedInfo>{}</SignedInfo>", signed_info_conteudo);

    let signing_key = SigningKey::<Sha1>::new(certificado.private_key.clone());
    let assinatura = signing_key.sign(signed_info_canonico.as_bytes());
    let signature_value = BASE64.encode(assinatura.to_vec());

    let bloco_signature = format!(
        "<Signature xmlns=\"{ns_dsig}\">{signed_info}\
         <SignatureValue>{value}</SignatureValue>\
         <KeyInfo><X509Data><X509Certificate>{cert}</X509Certificate></X509Data></KeyInfo>\
         </Signature>",
        ns_dsig = NS_XMLDSIG,
        signed_info = signed_info_embutido,
        value = signature_value,
        cert = certificado.certificado_base64(),
    );

    // última tag de fechamento do documento = fechamento do elemento raiz
    let pos = xml
        .rfind("</")
        .ok_or_else(|| AppError::Internal("XML sem elemento raiz para assinar".to_string()))?;

    let mut assinado = String::with_capacity(xml.len() + bloco_signature.len());
    assinado.push_str(&xml[..pos]);
    assinado.push_str(&bloco_signature);
    assinado.push_str(&xml[pos..]);

    Ok(assinado)
}

/// Recortar o elemento `<tag ...>...</tag>` do documento, sem casar tags
/// que apenas começam com o mesmo nome (`<infInutX>` não é `<infInut>`)
fn extrair_elemento<'a>(xml: &'a str, tag: &str) -> AppResult<&'a str> {
    let abertura = format!("<{}", tag);
    let fechamento = format!("</{}>", tag);

    let mut base = 0usize;
    let inicio = loop {
        let rel = xml[base..]
            .find(&abertura)
            .ok_or_else(|| AppError::Internal(format!("elemento {} não encontrado no XML", tag)))?;
        let inicio = base + rel;
        match xml.as_bytes().get(inicio + abertura.len()) {
            Some(b'>') | Some(b' ') | Some(b'/') => break inicio,
            _ => base = inicio + abertura.len(),
        }
    };

    let fim = xml[inicio..]
        .find(&fechamento)
        .map(|rel| inicio + rel + fechamento.len())
        .ok_or_else(|| AppError::Internal(format!("elemento {} não fechado no XML", tag)))?;

    Ok(&xml[inicio..fim])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::certificado_service::extrair_certificado;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::signature::Verifier;
    use rsa::RsaPublicKey;

    const PFX_TESTE: &[u8] = include_bytes!("../../tests/fixtures/certificado_teste.pfx");

    const NS_NFE: &str = "http://www.portalfiscal.inf.br/nfe";

    fn xml_exemplo() -> String {
        concat!(
            "<inutNFe xmlns=\"http://www.portalfiscal.inf.br/nfe\" versao=\"4.00\">",
            "<infInut Id=\"ID35260123456789000195550010000000010000000100\">",
            "<tpAmb>2</tpAmb><xServ>INUTILIZAR</xServ><cUF>35</cUF>",
            "</infInut></inutNFe>"
        )
        .to_string()
    }

    #[test]
    fn test_assinatura_unica_e_ultimo_filho() {
        let cert = extrair_certificado(PFX_TESTE, "1234").unwrap();
        let assinado = assinar_xml(
            &xml_exemplo(),
            "infInut",
            "ID35260123456789000195550010000000010000000100",
            NS_NFE,
            &cert,
        )
        .unwrap();

        // "<Signature" nu também casaria com SignatureMethod/SignatureValue
        assert_eq!(assinado.matches("<Signature xmlns").count(), 1);
        let doc = roxmltree::Document::parse(&assinado).unwrap();
        let assinaturas: Vec<_> = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "Signature")
            .collect();
        assert_eq!(assinaturas.len(), 1);
        assert_eq!(
            assinaturas[0].parent_element().unwrap().tag_name().name(),
            "inutNFe"
        );
        // a assinatura fecha imediatamente antes do fechamento da raiz
        assert!(assinado.ends_with("</Signature></inutNFe>"));
        // o conteúdo assinado permanece intacto antes da assinatura
        assert!(assinado.contains("</infInut><Signature"));
    }

    #[test]
    fn test_digest_e_referencia() {
        let cert = extrair_certificado(PFX_TESTE, "1234").unwrap();
        let assinado = assinar_xml(
            &xml_exemplo(),
            "infInut",
            "ID35260123456789000195550010000000010000000100",
            NS_NFE,
            &cert,
        )
        .unwrap();

        assert!(assinado.contains("URI=\"#ID35260123456789000195550010000000010000000100\""));

        // DigestValue corresponde ao SHA-1 do infInut canonicalizado
        let elemento = extrair_elemento(&assinado, "infInut").unwrap();
        let canonico = elemento.replacen("<infInut ", &format!("<infInut xmlns=\"{}\" ", NS_NFE), 1);
        let esperado = BASE64.encode(Sha1::digest(canonico.as_bytes()));
        assert!(assinado.contains(&format!("<DigestValue>{}</DigestValue>", esperado)));
    }

    #[test]
    fn test_extrair_elemento_nao_casa_prefixo() {
        let xml = "<doc><infInutX>errado</infInutX><infInut Id=\"ID1\">certo</infInut></doc>";
        assert_eq!(
            extrair_elemento(xml, "infInut").unwrap(),
            "<infInut Id=\"ID1\">certo</infInut>"
        );
    }

    #[test]
    fn test_signature_value_verifica() {
        let cert = extrair_certificado(PFX_TESTE, "1234").unwrap();
        let assinado = assinar_xml(
            &xml_exemplo(),
            "infInut",
            "ID35260123456789000195550010000000010000000100",
            NS_NFE,
            &cert,
        )
        .unwrap();

        // reconstituir o SignedInfo canônico e conferir a assinatura RSA-SHA1
        let embutido = extrair_elemento(&assinado, "SignedInfo").unwrap();
        let canonico = embutido.replacen(
            "<SignedInfo>",
            &format!("<SignedInfo xmlns=\"{}\">", NS_XMLDSIG),
            1,
        );

        let inicio = assinado.find("<SignatureValue>").unwrap() + "<SignatureValue>".len();
        let fim = assinado.find("</SignatureValue>").unwrap();
        let valor = BASE64.decode(&assinado[inicio..fim]).unwrap();

        let verifying_key =
            VerifyingKey::<Sha1>::new(RsaPublicKey::from(&cert.private_key));
        let signature = Signature::try_from(valor.as_slice()).unwrap();
        verifying_key
            .verify(canonico.as_bytes(), &signature)
            .expect("assinatura deve verificar");
    }
}

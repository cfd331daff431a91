//! Serviço de inutilização de numeração junto à SEFAZ
//!
//! Este módulo monta o XML `inutNFe`, orquestra assinatura e envio SOAP,
//! e interpreta o `retInutNFe` devolvido pela autoridade. É uma primitiva
//! de requisição de disparo único: nenhuma falha é retentada aqui e não
//! há rastreio de idempotência — se o chamador reenviar após um timeout,
//! uma solicitação duplicada pode chegar à SEFAZ, e a deduplicação (por
//! `Id` ou por faixa de numeração) é responsabilidade dele.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::clients::sefaz_client::SefazSoapClient;
use crate::models::inutilizacao::{
    InutilizacaoPayload, ResultadoInutilizacao, StatusInutilizacao, TipoAmbiente, XmlInutilizacao,
};
use crate::services::assinatura_service::assinar_xml;
use crate::services::certificado_service::extrair_certificado;
use crate::utils::errors::{AppError, AppResult};

/// Namespace do portal fiscal, comum a todos os documentos NFe
pub const NS_NFE: &str = "http://www.portalfiscal.inf.br/nfe";

const VERSAO_LEIAUTE: &str = "4.00";

lazy_static! {
    /// Código numérico da UF no cadastro do IBGE, usado em `cUF` e no `Id`
    ///
    /// Tabela fixa com as 27 unidades federativas. Configuração imutável
    /// de processo, não estado de runtime.
    pub static ref UF_TO_CUF: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("RO", "11");
        m.insert("AC", "12");
        m.insert("AM", "13");
        m.insert("RR", "14");
        m.insert("PA", "15");
        m.insert("AP", "16");
        m.insert("TO", "17");
        m.insert("MA", "21");
        m.insert("PI", "22");
        m.insert("CE", "23");
        m.insert("RN", "24");
        m.insert("PB", "25");
        m.insert("PE", "26");
        m.insert("AL", "27");
        m.insert("SE", "28");
        m.insert("BA", "29");
        m.insert("MG", "31");
        m.insert("ES", "32");
        m.insert("RJ", "33");
        m.insert("SP", "35");
        m.insert("PR", "41");
        m.insert("SC", "42");
        m.insert("RS", "43");
        m.insert("MS", "50");
        m.insert("MT", "51");
        m.insert("GO", "52");
        m.insert("DF", "53");
        m
    };

    /// Endpoints do webservice NFeInutilizacao4, por (UF, tpAmb)
    ///
    /// Apenas São Paulo está configurado. Se outras UFs exigem SOAPAction
    /// ou namespaces diferentes é uma lacuna de configuração em aberto,
    /// não uma premissa deste serviço.
    pub static ref UF_INUTILIZACAO_URL: HashMap<(&'static str, &'static str), &'static str> = {
        let mut m = HashMap::new();
        m.insert(
            ("SP", "1"),
            "https://nfe.fazenda.sp.gov.br/ws/nfeinutilizacao4.asmx",
        );
        m.insert(
            ("SP", "2"),
            "https://homologacao.nfe.fazenda.sp.gov.br/ws/nfeinutilizacao4.asmx",
        );
        m
    };
}

/// Montar o XML `inutNFe` canônico e seu `Id` obrigatório
///
/// O `Id` é derivado deterministicamente dos campos do payload; a SEFAZ
/// o valida contra os valores embutidos no XML, então qualquer mutação
/// posterior dos campos produziria rejeição do lado da autoridade, não
/// erro local.
pub fn montar_xml_inutilizacao(payload: &InutilizacaoPayload) -> AppResult<XmlInutilizacao> {
    let uf = payload.uf.to_uppercase();
    let cuf = UF_TO_CUF
        .get(uf.as_str())
        .ok_or_else(|| AppError::UfNaoSuportada(payload.uf.clone()))?;

    // campos numéricos de largura fixa do schema fiscal
    let ano2 = format!("{:02}", payload.ano % 100);
    let serie3 = format!("{:0>3}", payload.serie);
    let ini9 = format!("{:09}", payload.numero_inicial);
    let fin9 = format!("{:09}", payload.numero_final);

    let id = format!(
        "ID{}{}{}{}{}{}{}",
        cuf, ano2, payload.cnpj, payload.modelo, serie3, ini9, fin9
    );

    let xml = format!(
        "<inutNFe xmlns=\"{ns}\" versao=\"{versao}\">\
         <infInut Id=\"{id}\">\
         <tpAmb>{tp_amb}</tpAmb>\
         <xServ>INUTILIZAR</xServ>\
         <cUF>{cuf}</cUF>\
         <ano>{ano2}</ano>\
         <CNPJ>{cnpj}</CNPJ>\
         <mod>{modelo}</mod>\
         <serie>{serie}</serie>\
         <nNFIni>{ini}</nNFIni>\
         <nNFFin>{fin}</nNFFin>\
         <xJust>{just}</xJust>\
         </infInut></inutNFe>",
        ns = NS_NFE,
        versao = VERSAO_LEIAUTE,
        id = id,
        tp_amb = payload.tp_amb.codigo(),
        cuf = cuf,
        ano2 = ano2,
        cnpj = payload.cnpj,
        modelo = payload.modelo,
        serie = payload.serie,
        ini = payload.numero_inicial,
        fin = payload.numero_final,
        just = escape_xml(&payload.justificativa),
    );

    Ok(XmlInutilizacao { xml, id })
}

/// Endpoint do webservice para a UF e ambiente informados
pub fn url_inutilizacao(uf: &str, tp_amb: TipoAmbiente) -> AppResult<&'static str> {
    let uf = uf.to_uppercase();
    UF_INUTILIZACAO_URL
        .get(&(uf.as_str(), tp_amb.codigo()))
        .copied()
        .ok_or_else(|| AppError::UfNaoSuportada(uf))
}

/// Solicitar a inutilização de uma faixa de numeração à SEFAZ
///
/// Fluxo completo: monta o XML, extrai o certificado A1, assina, envolve
/// em SOAP 1.2, envia, recorta o `retInutNFe` da resposta e monta o
/// `procInutNFe` de arquivamento. Persistência e decisão de retentativa
/// pertencem à camada chamadora.
pub async fn solicitar_inutilizacao(
    client: &SefazSoapClient,
    payload: &InutilizacaoPayload,
) -> AppResult<ResultadoInutilizacao> {
    let montado = montar_xml_inutilizacao(payload)?;
    let url = url_inutilizacao(&payload.uf, payload.tp_amb)?;

    let certificado = extrair_certificado(&payload.cert_buffer, &payload.cert_password)?;
    let xml_assinado = assinar_xml(&montado.xml, "infInut", &montado.id, NS_NFE, &certificado)?;

    log::info!("📤 Enviando inutilização {} para {}", montado.id, url);
    let corpo = client.enviar_inutilizacao(url, &xml_assinado).await?;

    let ret_inut_xml = extrair_ret_inut(&corpo)?;
    let status = parse_status(&ret_inut_xml)?;
    log::info!(
        "📥 Resposta SEFAZ: cStat={} xMotivo={}",
        status.c_stat.as_deref().unwrap_or("-"),
        status.x_motivo.as_deref().unwrap_or("-")
    );

    let proc_inut_xml = montar_proc_inut(&xml_assinado, &ret_inut_xml);

    Ok(ResultadoInutilizacao {
        xml_assinado,
        ret_inut_xml,
        proc_inut_xml,
        status,
    })
}

/// Recortar o fragmento `retInutNFe` do corpo SOAP
///
/// Duas formas de resposta são conhecidas: o fragmento nu no corpo, ou
/// embrulhado em `nfeInutilizacaoNFResult` com o XML interno escapado
/// como texto.
pub fn extrair_ret_inut(corpo: &str) -> AppResult<String> {
    if let Some(frag) = recortar_elemento(corpo, "retInutNFe") {
        return Ok(frag.to_string());
    }

    if let Some(resultado) = recortar_elemento(corpo, "nfeInutilizacaoNFResult") {
        let interno = desescapar_xml(resultado);
        if let Some(frag) = recortar_elemento(&interno, "retInutNFe") {
            return Ok(frag.to_string());
        }
    }

    Err(AppError::RespostaSemRetInut)
}

/// Extrair `cStat`, `xMotivo` e `nProt` do fragmento `retInutNFe`
pub fn parse_status(ret_xml: &str) -> AppResult<StatusInutilizacao> {
    let doc =
        roxmltree::Document::parse(ret_xml).map_err(|e| AppError::XmlInvalido(e.to_string()))?;

    let texto = |nome: &str| {
        doc.descendants()
            .find(|n| n.tag_name().name() == nome)
            .and_then(|n| n.text())
            .map(str::to_string)
    };

    Ok(StatusInutilizacao {
        c_stat: texto("cStat"),
        x_motivo: texto("xMotivo"),
        n_prot: texto("nProt"),
    })
}

/// Documento composto `procInutNFe`: pedido assinado e resposta como irmãos
pub fn montar_proc_inut(xml_assinado: &str, ret_inut_xml: &str) -> String {
    format!(
        "<procInutNFe xmlns=\"{}\" versao=\"{}\">{}{}</procInutNFe>",
        NS_NFE, VERSAO_LEIAUTE, xml_assinado, ret_inut_xml
    )
}

/// Recortar `<tag ...>...</tag>` de um documento, sem perder o caso de
/// nomes que apenas começam igual (`<retInutNFeX>` não casa com `retInutNFe`)
fn recortar_elemento<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let abertura = format!("<{}", tag);
    let fechamento = format!("</{}>", tag);

    let mut base = 0usize;
    let inicio = loop {
        let rel = xml[base..].find(&abertura)?;
        let inicio = base + rel;
        match xml.as_bytes().get(inicio + abertura.len()) {
            Some(b'>') | Some(b' ') | Some(b'/') => break inicio,
            _ => base = inicio + abertura.len(),
        }
    };

    let fim = xml[inicio..].find(&fechamento)? + inicio + fechamento.len();
    Some(&xml[inicio..fim])
}

fn escape_xml(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn desescapar_xml(texto: &str) -> String {
    texto
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_base() -> InutilizacaoPayload {
        InutilizacaoPayload {
            uf: "SP".to_string(),
            cnpj: "12345678000195".to_string(),
            modelo: "55".to_string(),
            serie: "1".to_string(),
            numero_inicial: 1,
            numero_final: 100,
            justificativa: "Numeração pulada por falha no sistema emissor".to_string(),
            ano: 2026,
            tp_amb: TipoAmbiente::Homologacao,
            cert_buffer: Vec::new(),
            cert_password: String::new(),
        }
    }

    #[test]
    fn test_id_para_todas_as_ufs() {
        // Id no formato ID{cUF}{ano2}{cnpj}{modelo}{serie3}{nNFIni9}{nNFFin9}
        for (uf, cuf) in UF_TO_CUF.iter() {
            let mut payload = payload_base();
            payload.uf = uf.to_string();

            let montado = montar_xml_inutilizacao(&payload).unwrap();
            let esperado = format!("ID{}261234567800019555001000000001000000100", cuf);
            assert_eq!(montado.id, esperado, "Id incorreto para UF {}", uf);
            assert_eq!(montado.id.len(), 43);
        }
        assert_eq!(UF_TO_CUF.len(), 27);
    }

    #[test]
    fn test_zero_padding() {
        let mut payload = payload_base();
        payload.serie = "12".to_string();
        payload.numero_inicial = 7;
        payload.numero_final = 999_999_999;

        let montado = montar_xml_inutilizacao(&payload).unwrap();
        assert!(montado.id.contains("012000000007999999999"));
        // os elementos do XML não levam padding, só o Id
        assert!(montado.xml.contains("<serie>12</serie>"));
        assert!(montado.xml.contains("<nNFIni>7</nNFIni>"));
    }

    #[test]
    fn test_ano_somente_dois_digitos() {
        let mut payload = payload_base();
        payload.ano = 2007;
        let montado = montar_xml_inutilizacao(&payload).unwrap();
        assert!(montado.xml.contains("<ano>07</ano>"));
        assert!(montado.id.starts_with("ID3507"));
    }

    #[test]
    fn test_uf_desconhecida() {
        let mut payload = payload_base();
        payload.uf = "ZZ".to_string();
        let err = montar_xml_inutilizacao(&payload).unwrap_err();
        assert!(matches!(err, AppError::UfNaoSuportada(_)));
    }

    #[test]
    fn test_justificativa_escapada() {
        let mut payload = payload_base();
        payload.justificativa = "Falha <grave> & \"reincidente\"".to_string();
        let montado = montar_xml_inutilizacao(&payload).unwrap();
        assert!(montado
            .xml
            .contains("<xJust>Falha &lt;grave&gt; &amp; &quot;reincidente&quot;</xJust>"));
    }

    #[test]
    fn test_url_somente_sp() {
        assert_eq!(
            url_inutilizacao("SP", TipoAmbiente::Producao).unwrap(),
            "https://nfe.fazenda.sp.gov.br/ws/nfeinutilizacao4.asmx"
        );
        assert_eq!(
            url_inutilizacao("sp", TipoAmbiente::Homologacao).unwrap(),
            "https://homologacao.nfe.fazenda.sp.gov.br/ws/nfeinutilizacao4.asmx"
        );
        assert!(matches!(
            url_inutilizacao("MG", TipoAmbiente::Producao),
            Err(AppError::UfNaoSuportada(_))
        ));
    }

    const RET_INUT: &str = "<retInutNFe xmlns=\"http://www.portalfiscal.inf.br/nfe\" versao=\"4.00\"><infInut><tpAmb>2</tpAmb><cStat>102</cStat><xMotivo>Inutilizacao de numero homologado</xMotivo><nProt>135260000000001</nProt></infInut></retInutNFe>";

    #[test]
    fn test_extrair_ret_inut_fragmento_nu() {
        let corpo = format!(
            "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\"><soap:Body>{}</soap:Body></soap:Envelope>",
            RET_INUT
        );
        let frag = extrair_ret_inut(&corpo).unwrap();
        assert_eq!(frag, RET_INUT);

        let status = parse_status(&frag).unwrap();
        assert_eq!(status.c_stat.as_deref(), Some("102"));
        assert_eq!(
            status.x_motivo.as_deref(),
            Some("Inutilizacao de numero homologado")
        );
        assert_eq!(status.n_prot.as_deref(), Some("135260000000001"));
    }

    #[test]
    fn test_extrair_ret_inut_embrulhado_escapado() {
        let escapado = RET_INUT
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        let corpo = format!(
            "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\"><soap:Body><nfeInutilizacaoNFResult>{}</nfeInutilizacaoNFResult></soap:Body></soap:Envelope>",
            escapado
        );
        let frag = extrair_ret_inut(&corpo).unwrap();
        assert_eq!(frag, RET_INUT);
    }

    #[test]
    fn test_resposta_sem_ret_inut() {
        let corpo = "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\"><soap:Body><outraCoisa/></soap:Body></soap:Envelope>";
        let err = extrair_ret_inut(corpo).unwrap_err();
        assert!(matches!(err, AppError::RespostaSemRetInut));
        assert_eq!(err.to_string(), "Resposta SEFAZ sem retInutNFe");
    }

    #[test]
    fn test_rejeicao_sem_protocolo() {
        let ret = "<retInutNFe versao=\"4.00\"><infInut><cStat>241</cStat><xMotivo>Rejeicao: Um numero da faixa ja foi utilizado</xMotivo></infInut></retInutNFe>";
        let status = parse_status(ret).unwrap();
        assert_eq!(status.c_stat.as_deref(), Some("241"));
        assert!(status.n_prot.is_none());
    }

    #[test]
    fn test_proc_inut_bem_formado() {
        let payload = payload_base();
        let montado = montar_xml_inutilizacao(&payload).unwrap();
        let proc = montar_proc_inut(&montado.xml, RET_INUT);

        let doc = roxmltree::Document::parse(&proc).expect("procInutNFe deve ser XML válido");
        let raiz = doc.root_element();
        assert_eq!(raiz.tag_name().name(), "procInutNFe");

        // pedido e resposta como filhos irmãos, nessa ordem
        let filhos: Vec<&str> = raiz
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(filhos, vec!["inutNFe", "retInutNFe"]);
    }

    #[test]
    fn test_recortar_elemento_nao_casa_prefixo() {
        let xml = "<retInutNFeResumo>x</retInutNFeResumo><retInutNFe>ok</retInutNFe>";
        assert_eq!(
            recortar_elemento(xml, "retInutNFe"),
            Some("<retInutNFe>ok</retInutNFe>")
        );
    }
}

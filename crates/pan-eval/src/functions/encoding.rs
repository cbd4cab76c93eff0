use super::coerce::Args;
use crate::element::Element;
use crate::error::EvalResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256, Sha384, Sha512};

pub(super) fn base64_encode(args: &Args<'_>) -> EvalResult<Element> {
    let text = args.string(0)?;
    Ok(Element::String(STANDARD.encode(text.as_bytes())))
}

/// Decode to a UTF-8 string. Whitespace in the input is ignored.
pub(super) fn base64_decode(args: &Args<'_>) -> EvalResult<Element> {
    let text: String = args
        .string(0)?
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(text.as_bytes())
        .map_err(|e| args.invalid(format!("invalid base64 data: {e}")))?;
    String::from_utf8(bytes)
        .map(Element::String)
        .map_err(|_| args.invalid("decoded data is not valid UTF-8"))
}

/// `digest(algorithm, string)` as lower-case hex.
pub(super) fn digest(args: &Args<'_>) -> EvalResult<Element> {
    let algorithm = args.string(0)?;
    let data = args.string(1)?.as_bytes();
    let bytes = match algorithm.to_ascii_lowercase().as_str() {
        "sha-256" | "sha256" => Sha256::digest(data).to_vec(),
        "sha-384" | "sha384" => Sha384::digest(data).to_vec(),
        "sha-512" | "sha512" => Sha512::digest(data).to_vec(),
        _ => return Err(args.invalid(format!("unsupported digest algorithm '{algorithm}'"))),
    };
    Ok(Element::String(
        bytes.iter().map(|b| format!("{b:02x}")).collect(),
    ))
}

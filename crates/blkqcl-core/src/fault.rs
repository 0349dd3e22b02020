use crate::encoding::tree::Element;

/// Extracts the `faultstring` of a SOAP fault body.
///
/// Returns `None` when the body is not XML or carries no `faultstring`; the
/// caller then reports the HTTP failure as-is.
pub fn fault_string(body: &[u8]) -> Option<String> {
    let root = Element::parse(body).ok()?;
    root.find_local("faultstring")
        .map(|e| e.text().trim().to_owned())
}

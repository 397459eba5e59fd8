/// Turn a column or field name into an exported identifier.
///
/// Underscore separated tokens are capitalized and joined, empty tokens are
/// dropped and an `id` token becomes the acronym `ID`. Applying the function
/// to its own output returns the output unchanged.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for token in name.split('_').filter(|t| !t.is_empty()) {
        if token.eq_ignore_ascii_case("id") {
            out.push_str("ID");
            continue;
        }
        let mut chars = token.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

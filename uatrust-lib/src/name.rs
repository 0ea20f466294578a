//! Bounded one-line rendering of distinguished names.
//!
//! Used for diagnostics only; name *comparison* is byte-for-byte on the raw
//! DER encoding (see `verify::checks::same_name`), never on rendered text.

use x509_parser::prelude::*;

/// Upper bound on a rendered distinguished name. Rendering truncates rather
/// than growing without limit on pathological names.
const MAX_RENDERED_NAME: usize = 256;

/// Render a distinguished name as `attr = value, attr = value, ...`,
/// truncated to a fixed maximum length.
pub fn render_name(name: &X509Name) -> String {
    let mut out = String::new();
    'outer: for rdn in name.iter() {
        for attr in rdn.iter() {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(short_attr_name(&attr.attr_type().to_id_string()));
            out.push_str(" = ");
            for ch in attr.as_str().unwrap_or("<binary>").chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    ',' => out.push_str("\\,"),
                    '=' => out.push_str("\\="),
                    _ => out.push(ch),
                }
            }
            if out.len() > MAX_RENDERED_NAME {
                // Cut on a char boundary; the limit may fall inside a
                // multi-byte character.
                let mut cut = MAX_RENDERED_NAME;
                while !out.is_char_boundary(cut) {
                    cut -= 1;
                }
                out.truncate(cut);
                out.push_str("...");
                break 'outer;
            }
        }
    }
    out
}

/// Short name for common DN attribute OIDs (RFC 4519 / X.520).
fn short_attr_name(oid: &str) -> &str {
    match oid {
        "2.5.4.3" => "CN",
        "2.5.4.6" => "C",
        "2.5.4.7" => "L",
        "2.5.4.8" => "ST",
        "2.5.4.10" => "O",
        "2.5.4.11" => "OU",
        "0.9.2342.19200300.100.1.25" => "DC",
        "1.2.840.113549.1.9.1" => "emailAddress",
        other => other,
    }
}

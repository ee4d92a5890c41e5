//! Text helpers for question-bank strings, which arrive HTML-entity encoded.

/// Characters of question text kept in the end-of-session breakdown
pub const BREAKDOWN_PREVIEW_CHARS: usize = 50;

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("shy", "\u{ad}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("hellip", "\u{2026}"),
    ("ndash", "\u{2013}"),
    ("mdash", "\u{2014}"),
    ("deg", "\u{b0}"),
    ("pi", "\u{3c0}"),
    ("micro", "\u{b5}"),
    ("times", "\u{d7}"),
    ("divide", "\u{f7}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("euro", "\u{20ac}"),
    ("pound", "\u{a3}"),
    ("yen", "\u{a5}"),
    ("iexcl", "\u{a1}"),
    ("iquest", "\u{bf}"),
    ("szlig", "\u{df}"),
    ("aacute", "\u{e1}"),
    ("Aacute", "\u{c1}"),
    ("agrave", "\u{e0}"),
    ("acirc", "\u{e2}"),
    ("atilde", "\u{e3}"),
    ("auml", "\u{e4}"),
    ("Auml", "\u{c4}"),
    ("aring", "\u{e5}"),
    ("Aring", "\u{c5}"),
    ("aelig", "\u{e6}"),
    ("ccedil", "\u{e7}"),
    ("Ccedil", "\u{c7}"),
    ("eacute", "\u{e9}"),
    ("Eacute", "\u{c9}"),
    ("egrave", "\u{e8}"),
    ("ecirc", "\u{ea}"),
    ("euml", "\u{eb}"),
    ("iacute", "\u{ed}"),
    ("Iacute", "\u{cd}"),
    ("igrave", "\u{ec}"),
    ("icirc", "\u{ee}"),
    ("iuml", "\u{ef}"),
    ("ntilde", "\u{f1}"),
    ("Ntilde", "\u{d1}"),
    ("oacute", "\u{f3}"),
    ("Oacute", "\u{d3}"),
    ("ograve", "\u{f2}"),
    ("ocirc", "\u{f4}"),
    ("otilde", "\u{f5}"),
    ("ouml", "\u{f6}"),
    ("Ouml", "\u{d6}"),
    ("oslash", "\u{f8}"),
    ("Oslash", "\u{d8}"),
    ("uacute", "\u{fa}"),
    ("Uacute", "\u{da}"),
    ("ugrave", "\u{f9}"),
    ("ucirc", "\u{fb}"),
    ("uuml", "\u{fc}"),
    ("Uuml", "\u{dc}"),
    ("yacute", "\u{fd}"),
    ("scaron", "\u{161}"),
    ("Scaron", "\u{160}"),
];

/// Decodes named (`&quot;`) and numeric (`&#039;`, `&#x27;`) character references.
/// Unknown or malformed references are left as written.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        match tail.find(';') {
            // entity names are short; a distant ';' is not ours
            Some(semi) if semi > 1 && semi <= 10 => {
                let name = &tail[1..semi];
                match resolve(name) {
                    Some(decoded) => {
                        out.push_str(&decoded);
                        rest = &tail[semi + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &tail[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn resolve(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(String::from);
    }

    NAMED_ENTITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v.to_string())
}

/// Decoded question text cut to the breakdown preview length, always followed by "..."
pub fn breakdown_preview(raw: &str) -> String {
    let decoded = decode_entities(raw);
    let mut preview: String = decoded.chars().take(BREAKDOWN_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

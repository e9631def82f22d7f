/// Object identifier: (object_number, generation_number).
/// Generation is always 0 for new documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub u32, pub u16);

/// PDF object types per PDF 32000-1:2008 Section 7.3.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// Name object (stored without the leading `/`).
    Name(String),
    /// Literal string bytes (stored without the enclosing parens).
    LiteralString(Vec<u8>),
    /// String written in hexadecimal form.
    HexString(Vec<u8>),
    Array(Vec<PdfObject>),
    /// Key-value pairs. Uses Vec for deterministic output order.
    Dictionary(Vec<(String, PdfObject)>),
    Stream {
        dict: Vec<(String, PdfObject)>,
        data: Vec<u8>,
    },
    Reference(ObjId),
}

impl PdfObject {
    pub fn name(s: &str) -> Self {
        PdfObject::Name(s.to_string())
    }

    pub fn literal_string(s: &str) -> Self {
        PdfObject::LiteralString(s.as_bytes().to_vec())
    }

    /// Text string for document metadata: a literal for ASCII text,
    /// otherwise UTF-16BE with a byte-order mark.
    pub fn text_string(s: &str) -> Self {
        if s.is_ascii() {
            return PdfObject::literal_string(s);
        }
        let mut bytes = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        PdfObject::HexString(bytes)
    }

    pub fn reference(id: ObjId) -> Self {
        PdfObject::Reference(id)
    }

    pub fn array(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }

    /// `[x0 y0 x1 y1]` rectangle array.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        PdfObject::Array(vec![
            PdfObject::Real(x0),
            PdfObject::Real(y0),
            PdfObject::Real(x1),
            PdfObject::Real(y1),
        ])
    }

    pub fn dict(entries: Vec<(&str, PdfObject)>) -> Self {
        PdfObject::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn stream(dict_entries: Vec<(&str, PdfObject)>, data: Vec<u8>) -> Self {
        PdfObject::Stream {
            dict: dict_entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_text_string_is_literal() {
        assert_eq!(
            PdfObject::text_string("Poster"),
            PdfObject::LiteralString(b"Poster".to_vec())
        );
    }

    #[test]
    fn unicode_text_string_is_utf16_hex() {
        match PdfObject::text_string("é") {
            PdfObject::HexString(bytes) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xE9]);
            }
            other => panic!("expected HexString, got {:?}", other),
        }
    }

    #[test]
    fn rect_has_four_reals() {
        match PdfObject::rect(0.0, 0.0, 10.0, 20.0) {
            PdfObject::Array(items) => {
                assert_eq!(items.len(), 4);
                assert_eq!(items[3], PdfObject::Real(20.0));
            }
            _ => panic!("expected Array"),
        }
    }

    #[test]
    fn stream_keeps_entries_in_order() {
        let obj = PdfObject::stream(
            vec![
                ("Type", PdfObject::name("XObject")),
                ("Subtype", PdfObject::name("Image")),
            ],
            vec![1, 2, 3],
        );
        match obj {
            PdfObject::Stream { dict, data } => {
                assert_eq!(dict[0].0, "Type");
                assert_eq!(dict[1].0, "Subtype");
                assert_eq!(data, vec![1, 2, 3]);
            }
            _ => panic!("expected Stream"),
        }
    }
}

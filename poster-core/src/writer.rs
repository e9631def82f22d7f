use std::io::{self, Write};

use crate::objects::{ObjId, PdfObject};

/// Low-level PDF serializer. Writes indirect objects to any `Write`
/// target and remembers their byte offsets for the xref table.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    /// Byte offset per object number; index 0 is the free-list head.
    offsets: Vec<Option<usize>>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            offsets: vec![None],
        }
    }

    fn put(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn put_str(&mut self, s: &str) -> io::Result<()> {
        self.put(s.as_bytes())
    }

    /// `%PDF-1.7` followed by a comment of four high bytes so
    /// transfer tools treat the file as binary.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.put(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object and record where it starts.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        let num = id.0 as usize;
        if self.offsets.len() <= num {
            self.offsets.resize(num + 1, None);
        }
        self.offsets[num] = Some(self.offset);
        self.put_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.put_value(obj)?;
        self.put(b"\nendobj\n")
    }

    fn put_entries(&mut self, entries: &[(String, PdfObject)]) -> io::Result<()> {
        for (key, val) in entries {
            self.put_str(&format!(" /{} ", key))?;
            self.put_value(val)?;
        }
        Ok(())
    }

    fn put_value(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => self.put(b"null"),
            PdfObject::Boolean(b) => self.put_str(if *b { "true" } else { "false" }),
            PdfObject::Integer(n) => self.put_str(&n.to_string()),
            PdfObject::Real(f) => self.put_str(&format_real(*f)),
            PdfObject::Name(name) => self.put_str(&format!("/{}", name)),
            PdfObject::LiteralString(bytes) => {
                self.put(b"(")?;
                self.put(&escape_string_bytes(bytes))?;
                self.put(b")")
            }
            PdfObject::HexString(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                self.put_str(&format!("<{}>", hex))
            }
            PdfObject::Array(items) => {
                self.put(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.put(b" ")?;
                    }
                    self.put_value(item)?;
                }
                self.put(b"]")
            }
            PdfObject::Dictionary(entries) => {
                self.put(b"<<")?;
                self.put_entries(entries)?;
                self.put(b" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.put(b"<<")?;
                self.put_entries(dict)?;
                self.put_str(&format!(" /Length {} >>\nstream\n", data.len()))?;
                self.put(data)?;
                self.put(b"\nendstream")
            }
            PdfObject::Reference(id) => self.put_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    /// Write the xref table, trailer, startxref and `%%EOF`. Object
    /// numbers never written become free entries.
    pub fn write_xref_and_trailer(&mut self, root: ObjId, info: Option<ObjId>) -> io::Result<()> {
        let xref_offset = self.offset;
        let size = self.offsets.len();

        self.put_str(&format!("xref\n0 {}\n", size))?;
        // Every entry is exactly 20 bytes including CR LF.
        self.put(b"0000000000 65535 f\r\n")?;
        for num in 1..size {
            let entry = match self.offsets[num] {
                Some(off) => format!("{:010} 00000 n\r\n", off),
                None => "0000000000 00000 f\r\n".to_string(),
            };
            self.put_str(&entry)?;
        }

        let mut trailer = format!("trailer\n<< /Size {} /Root {} {} R", size, root.0, root.1);
        if let Some(info) = info {
            trailer.push_str(&format!(" /Info {} {} R", info.0, info.1));
        }
        trailer.push_str(&format!(" >>\nstartxref\n{}\n%%EOF\n", xref_offset));
        self.put_str(&trailer)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escape the delimiters of a literal string (PDF and PostScript
/// share the syntax). Control bytes become octal escapes.
pub fn escape_string_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                result.push(b'\\');
                result.push(b);
            }
            0x20..=0x7E | 0x80..=0xFF => result.push(b),
            _ => result.extend_from_slice(format!("\\{:03o}", b).as_bytes()),
        }
    }
    result
}

/// Format a float for PDF objects: no trailing zeros, no scientific
/// notation, integral values keep one decimal.
pub(crate) fn format_real(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        let s = format!("{:.6}", f);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Format a number for content streams: integral values without a
/// decimal point, otherwise up to four decimals.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" {
            "0".to_string()
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut PdfWriter<&mut Vec<u8>>)) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        f(&mut w);
        buf
    }

    #[test]
    fn header_is_binary_marked() {
        let buf = written(|w| w.write_header().unwrap());
        assert!(buf.starts_with(b"%PDF-1.7\n%"));
        assert!(buf[10..14].iter().all(|&b| b >= 128));
    }

    #[test]
    fn dictionary_with_reference() {
        let buf = written(|w| {
            let obj = PdfObject::dict(vec![
                ("Type", PdfObject::name("Catalog")),
                ("Pages", PdfObject::reference(ObjId(2, 0))),
            ]);
            w.write_object(ObjId(1, 0), &obj).unwrap();
        });
        let out = String::from_utf8_lossy(&buf);
        assert!(out.starts_with("1 0 obj\n"));
        assert!(out.contains("<< /Type /Catalog /Pages 2 0 R >>"));
        assert!(out.ends_with("endobj\n"));
    }

    #[test]
    fn stream_length_and_markers() {
        let buf = written(|w| {
            let obj = PdfObject::stream(vec![], b"0 0 m".to_vec());
            w.write_object(ObjId(4, 0), &obj).unwrap();
        });
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("<< /Length 5 >>\nstream\n0 0 m\nendstream"));
    }

    #[test]
    fn hex_and_literal_strings() {
        let buf = written(|w| {
            let obj = PdfObject::array(vec![
                PdfObject::HexString(vec![0xFE, 0xFF]),
                PdfObject::literal_string("a(b)\\"),
            ]);
            w.write_object(ObjId(1, 0), &obj).unwrap();
        });
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("[<FEFF> (a\\(b\\)\\\\)]"));
    }

    #[test]
    fn xref_marks_gaps_free() {
        let buf = written(|w| {
            w.write_header().unwrap();
            w.write_object(ObjId(1, 0), &PdfObject::Null).unwrap();
            w.write_object(ObjId(3, 0), &PdfObject::Null).unwrap();
            w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();
        });
        let out = String::from_utf8_lossy(&buf);
        let xref = out.find("xref\n0 4\n").unwrap();
        let entries = &buf[xref + "xref\n0 4\n".len()..];
        // Four 20-byte entries; the gap at object 2 is free.
        assert_eq!(&entries[40..60], b"0000000000 00000 f\r\n");
        assert_eq!(&entries[18..20], b"\r\n");
        assert!(out.contains("/Size 4 /Root 1 0 R >>"));
        assert!(out.ends_with("%%EOF\n"));
    }

    #[test]
    fn trailer_with_info() {
        let buf = written(|w| {
            w.write_object(ObjId(1, 0), &PdfObject::Null).unwrap();
            w.write_object(ObjId(2, 0), &PdfObject::Null).unwrap();
            w.write_xref_and_trailer(ObjId(1, 0), Some(ObjId(2, 0))).unwrap();
        });
        assert!(String::from_utf8_lossy(&buf).contains("/Info 2 0 R"));
    }

    #[test]
    fn control_bytes_are_octal_escaped() {
        assert_eq!(escape_string_bytes(b"a\nb"), b"a\\012b".to_vec());
        assert_eq!(escape_string_bytes(&[0xE9]), vec![0xE9]);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_real(612.0), "612.0");
        assert_eq!(format_real(12.5), "12.5");
        assert_eq!(format_coord(100.0), "100");
        assert_eq!(format_coord(2.834645669), "2.8346");
        assert_eq!(format_coord(-0.00001), "0");
        assert_eq!(format_coord(0.5), "0.5");
    }
}

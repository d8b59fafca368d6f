//! Shared fixtures: small documents assembled in memory.
#![allow(dead_code)]

/// Appends objects, streams and trailers to an in-memory document.
pub struct DocBuilder {
    data: Vec<u8>,
}

impl DocBuilder {
    pub fn new() -> Self {
        Self {
            data: b"%PDF-1.4\n".to_vec(),
        }
    }

    pub fn object(mut self, id: u64, body: &str) -> Self {
        self.data
            .extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
        self
    }

    /// A stream object whose `Length` matches `data`. `data` must not start
    /// or end with whitespace.
    pub fn stream(self, id: u64, attrs: &str, data: &[u8]) -> Self {
        self.stream_with_length(id, &data.len().to_string(), attrs, data)
    }

    pub fn stream_with_length(mut self, id: u64, length: &str, attrs: &str, data: &[u8]) -> Self {
        self.data.extend_from_slice(
            format!("{id} 0 obj\n<< /Length {length} {attrs} >>\nstream\n").as_bytes(),
        );
        self.data.extend_from_slice(data);
        self.data.extend_from_slice(b"\nendstream\nendobj\n");
        self
    }

    /// A one-entry xref table, then the trailer.
    pub fn trailer(mut self, dict: &str) -> Self {
        self.data.extend_from_slice(
            format!(
                "xref\n0 1\n0000000000 65535 f \ntrailer\n{dict}\nstartxref\n{}\n%%EOF\n",
                self.data.len()
            )
            .as_bytes(),
        );
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Catalog 1, page tree 2, then one page (and one content stream) per entry.
pub fn simple_pdf(contents: &[&[u8]]) -> Vec<u8> {
    let page_ids: Vec<u64> = (0..contents.len() as u64).map(|i| 3 + 2 * i).collect();
    let kids: Vec<String> = page_ids.iter().map(|id| format!("{id} 0 R")).collect();

    let mut doc = DocBuilder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object(
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                contents.len()
            ),
        );
    for (id, content) in page_ids.iter().zip(contents) {
        doc = doc
            .object(
                *id,
                &format!("<< /Type /Page /Parent 2 0 R /Contents {} 0 R >>", id + 1),
            )
            .stream(id + 1, "", content);
    }
    doc.trailer(&format!("<< /Size {} /Root 1 0 R >>", 3 + 2 * contents.len()))
        .build()
}

use std::fmt;

/// A filled path inside an [`SvgDocument`].
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPath {
    pub data: String,
    pub fill: [u8; 3],
}

/// Minimal SVG document holding filled paths over a fixed canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub width: u32,
    pub height: u32,
    pub paths: Vec<SvgPath>,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            paths: Vec::new(),
        }
    }

    /// Append a path; empty path data is skipped.
    pub fn add_path(&mut self, data: String, fill: [u8; 3]) {
        if !data.is_empty() {
            self.paths.push(SvgPath { data, fill });
        }
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        )?;
        for path in &self.paths {
            let [r, g, b] = path.fill;
            writeln!(
                f,
                r##"<path d="{}" fill="#{r:02x}{g:02x}{b:02x}" fill-rule="evenodd"/>"##,
                path.data
            )?;
        }
        writeln!(f, "</svg>")
    }
}

/// Format a coordinate, rounding to `precision` decimals and trimming trailing zeros.
pub fn format_number(value: f64, precision: Option<u32>) -> String {
    let text = match precision {
        Some(p) => format!("{:.*}", p as usize, value),
        None => format!("{value}"),
    };
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" { "0".to_string() } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_trims() {
        assert_eq!(format_number(2.0, Some(2)), "2");
        assert_eq!(format_number(1.5, Some(2)), "1.5");
        assert_eq!(format_number(1.256, Some(2)), "1.26");
        assert_eq!(format_number(0.5, None), "0.5");
        assert_eq!(format_number(-0.001, Some(1)), "0");
        assert_eq!(format_number(10.0, Some(0)), "10");
    }

    #[test]
    fn document_layout() {
        let mut doc = SvgDocument::new(3, 2);
        doc.add_path("M0 0H1V1H0Z".to_string(), [0, 0, 0]);
        doc.add_path(String::new(), [255, 0, 0]);

        let text = doc.to_string();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains(r#"viewBox="0 0 3 2""#));
        assert!(text.contains(r##"<path d="M0 0H1V1H0Z" fill="#000000" fill-rule="evenodd"/>"##));
        assert_eq!(text.matches("<path").count(), 1);
        assert!(text.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn empty_document_is_valid() {
        let text = SvgDocument::new(0, 0).to_string();
        assert!(!text.contains("<path"));
        assert!(text.contains("</svg>"));
    }
}

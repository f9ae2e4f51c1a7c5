//! # Document Renderer
//!
//! Lays the formatted solution body out on US Letter pages and writes it as
//! a PDF with `lopdf`. Each body line is classified by its leading token and
//! drawn in one of the named styles below; long lines are word-wrapped and
//! pages break at the bottom margin.
//!
//! | Line starts with | Kind      | Style        |
//! |------------------|-----------|--------------|
//! | `Question`       | Header    | Question     |
//! | `Marks:`         | Metadata  | QuestionInfo |
//! | `Answer:`        | Body      | Answer       |
//! | only `-`         | Separator | Separator    |
//! | anything else    | Plain     | Normal       |

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::errors::PipelineError;

/// Kind of a body line, decided by its leading token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Metadata,
    Body,
    Separator,
    Plain,
}

pub fn classify_line(line: &str) -> LineKind {
    if line.starts_with("Question") {
        LineKind::Header
    } else if line.starts_with("Marks:") {
        LineKind::Metadata
    } else if line.starts_with("Answer:") {
        LineKind::Body
    } else if !line.is_empty() && line.chars().all(|c| c == '-') {
        LineKind::Separator
    } else {
        LineKind::Plain
    }
}

/// The three standard PDF fonts used by the styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    Oblique,
}

impl FontFace {
    const ALL: [FontFace; 3] = [FontFace::Regular, FontFace::Bold, FontFace::Oblique];

    /// Name of the font in the page resource dictionary
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Oblique => "F3",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
            FontFace::Oblique => "Helvetica-Oblique",
        }
    }
}

/// Paragraph style of one line kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub name: &'static str,
    pub font: FontFace,
    pub size: f32,
    pub left_indent: f32,
    pub space_after: f32,
}

impl TextStyle {
    pub fn leading(&self) -> f32 {
        self.size * 1.2
    }
}

pub fn style_for(kind: LineKind) -> TextStyle {
    match kind {
        LineKind::Header => TextStyle {
            name: "Question",
            font: FontFace::Bold,
            size: 12.0,
            left_indent: 0.0,
            space_after: 6.0,
        },
        LineKind::Metadata => TextStyle {
            name: "QuestionInfo",
            font: FontFace::Oblique,
            size: 10.0,
            left_indent: 0.0,
            space_after: 6.0,
        },
        LineKind::Body => TextStyle {
            name: "Answer",
            font: FontFace::Regular,
            size: 11.0,
            left_indent: 20.0,
            space_after: 12.0,
        },
        // 0.2 inch spacer after every separator
        LineKind::Separator => TextStyle {
            name: "Separator",
            font: FontFace::Regular,
            size: 11.0,
            left_indent: 0.0,
            space_after: 14.4,
        },
        LineKind::Plain => TextStyle {
            name: "Normal",
            font: FontFace::Regular,
            size: 10.0,
            left_indent: 0.0,
            space_after: 0.0,
        },
    }
}

/// Page size and margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for PageLayout {
    /// US Letter, one-inch margins except an 18pt bottom margin
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_left: 72.0,
            margin_right: 72.0,
            margin_top: 72.0,
            margin_bottom: 18.0,
        }
    }
}

impl PageLayout {
    pub fn frame_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }
}

/// A line of text at its final position on a page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub kind: LineKind,
    pub font: FontFace,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Approximate Helvetica advance width in em units
fn char_width_em(c: char) -> f32 {
    match c {
        ' ' | 'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 0.278,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.333,
        'm' | 'M' | 'W' => 0.833,
        'w' => 0.722,
        c if c.is_ascii_digit() => 0.556,
        c if c.is_uppercase() => 0.667,
        _ => 0.556,
    }
}

/// Estimated width of `text` in points
pub fn text_width(text: &str, font: FontFace, size: f32) -> f32 {
    let widen = if font == FontFace::Bold { 1.06 } else { 1.0 };
    text.chars().map(char_width_em).sum::<f32>() * size * widen
}

/// Break `text` into lines no wider than `max_width`; over-long words are split
pub fn wrap_text(text: &str, font: FontFace, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font, size) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                let mut next = current.clone();
                next.push(c);
                if !current.is_empty() && text_width(&next, font, size) > max_width {
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                } else {
                    current = next;
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Position every body line, returning one vector of lines per page
///
/// Blank lines take no vertical space; spacing comes from the styles.
pub fn layout_body(body: &str, page: &PageLayout) -> Vec<Vec<PlacedLine>> {
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let top = page.height - page.margin_top;
    let mut cursor = top;

    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let kind = classify_line(line);
        let style = style_for(kind);
        let width = page.frame_width() - style.left_indent;

        for segment in wrap_text(line, style.font, style.size, width) {
            let baseline = cursor - style.size;
            if baseline < page.margin_bottom && cursor < top {
                pages.push(Vec::new());
                cursor = top;
            }
            let baseline = cursor - style.size;
            if let Some(current_page) = pages.last_mut() {
                current_page.push(PlacedLine {
                    kind,
                    font: style.font,
                    size: style.size,
                    x: page.margin_left + style.left_indent,
                    y: baseline,
                    text: segment,
                });
            }
            cursor -= style.leading();
        }
        cursor -= style.space_after;
    }

    pages
}

/// Encode text for a WinAnsiEncoding font; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Renders solution bodies to PDF
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    page: PageLayout,
}

impl DocumentRenderer {
    pub fn new(page: PageLayout) -> Self {
        Self { page }
    }

    /// Build the PDF in memory
    ///
    /// # Errors
    ///
    /// [`PipelineError::Render`] for an empty body or when the content
    /// streams cannot be encoded.
    pub fn render_to_bytes(&self, body: &str) -> Result<Vec<u8>, PipelineError> {
        if body.trim().is_empty() {
            return Err(PipelineError::Render("document body is empty".to_string()));
        }

        let pages = layout_body(body, &self.page);
        let line_count: usize = pages.iter().map(Vec::len).sum();
        debug!(pages = pages.len(), lines = line_count, "Document laid out");

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for face in FontFace::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page_lines in &pages {
            let content_id = self.add_page_content(&mut doc, page_lines)?;
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), self.page.width.into(), self.page.height.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PipelineError::Render(format!("failed to serialize PDF: {e}")))?;
        Ok(bytes)
    }

    fn add_page_content(
        &self,
        doc: &mut Document,
        lines: &[PlacedLine],
    ) -> Result<ObjectId, PipelineError> {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![line.font.resource_name().into(), line.size.into()],
            ));
            operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| PipelineError::Render(format!("failed to encode page content: {e}")))?;
        Ok(doc.add_object(Stream::new(dictionary! {}, content)))
    }

    /// Render `body` and write it to `path`, replacing any earlier file
    ///
    /// Returns the size of the written file, read back from disk.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Render`] as for [`render_to_bytes`](Self::render_to_bytes),
    /// in which case `path` is left untouched; [`PipelineError::Storage`] when
    /// the write fails or leaves an empty file.
    pub fn render_to_file(&self, body: &str, path: &Path) -> Result<u64, PipelineError> {
        let bytes = self.render_to_bytes(body)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PipelineError::Storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        fs::write(path, &bytes)
            .map_err(|e| PipelineError::Storage(format!("cannot write {}: {e}", path.display())))?;

        let size = fs::metadata(path)
            .map_err(|e| PipelineError::Storage(format!("cannot stat {}: {e}", path.display())))?
            .len();
        if size == 0 {
            return Err(PipelineError::Storage(format!(
                "{} was written but is empty",
                path.display()
            )));
        }

        info!(path = %path.display(), size_bytes = size, "Document written");
        Ok(size)
    }
}

//! PDF exporter for printable boards
//!
//! Each board becomes one or more landscape pages: the board name as a
//! header, then a table of image and label cells with the same fixed column
//! count as the OBF grid. A page break follows every `rows_per_page` grid
//! rows and every board.
//!
//! ## Images
//!
//! Tile images are resolved through the same [`ImageResolver`] as OBF
//! exports, decoded with the `image` crate, shrunk to fit a 150 px canvas and
//! flattened onto the tile's background color. Anything that cannot be
//! fetched or decoded (SVG included) is drawn as a "not found" placeholder.
//!
//! The writer emits PDF 1.4 with the standard Helvetica font and
//! uncompressed RGB image XObjects, so no font or codec data is embedded.

use super::ExportError;
use super::grid::layout_rows;
use super::image::{ImageFetcher, ImageResolver};
use crate::config::{ExportConfig, LabelPosition};
use crate::i18n::Translations;
use crate::models::{Board, Tile};
use chrono::NaiveDateTime;
use image::imageops::FilterType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{info, warn};

/// Pixel size of the canvas a tile image is fitted into
const CANVAS_PX: u32 = 150;
const MARGIN: f64 = 36.0;
const TITLE_SIZE: f64 = 18.0;
const TITLE_GAP: f64 = 32.0;
const LABEL_SIZE: f64 = 11.0;
const LABEL_HEIGHT: f64 = 16.0;
const CELL_PADDING: f64 = 4.0;
const WHITE: [u8; 3] = [255, 255, 255];

static RGB_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[\d.]+\s*)?\)$")
        .unwrap()
});

/// Parse a CSS color as stored on tiles (`#rgb`, `#rrggbb`, `rgb()`,
/// `rgba()` or a few common names)
pub fn parse_color(value: &str) -> Option<[u8; 3]> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<_>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some([r * 17, g * 17, b * 17]),
            [r1, r2, g1, g2, b1, b2] => Some([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2]),
            _ => None,
        };
    }

    if let Some(caps) = RGB_FUNCTION.captures(&value) {
        let channel = |i: usize| caps[i].parse::<u16>().ok().map(|v| v.min(255) as u8);
        return Some([channel(1)?, channel(2)?, channel(3)?]);
    }

    match value.as_str() {
        "white" => Some([255, 255, 255]),
        "black" => Some([0, 0, 0]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "yellow" => Some([255, 255, 0]),
        "gray" | "grey" => Some([128, 128, 128]),
        _ => None,
    }
}

/// Decoded image pixels, flattened to RGB
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Decode, shrink to the tile canvas and flatten alpha onto `background`
    pub fn decode(bytes: &[u8], background: [u8; 3]) -> Result<Self, image::ImageError> {
        let mut decoded = image::load_from_memory(bytes)?;
        if decoded.width() > CANVAS_PX || decoded.height() > CANVAS_PX {
            decoded = decoded.resize(CANVAS_PX, CANVAS_PX, FilterType::Triangle);
        }
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = a as u32;
            for (channel, bg) in [r, g, b].into_iter().zip(background) {
                let blended = (channel as u32 * alpha + bg as u32 * (255 - alpha)) / 255;
                rgb.push(blended as u8);
            }
        }

        Ok(Self { width, height, rgb })
    }
}

/// What to draw in a cell's image area
#[derive(Debug, Clone, PartialEq)]
pub enum CellImage {
    Empty,
    Raster(Rc<RasterImage>),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfCell {
    pub label: String,
    pub image: CellImage,
    pub background: Option<[u8; 3]>,
    pub border: Option<[u8; 3]>,
}

/// One printed page. Only a board's first page carries its title.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    pub title: Option<String>,
    pub rows: Vec<Vec<Option<PdfCell>>>,
}

/// Split a board's grid rows into pages of at most `rows_per_page` rows.
/// A board without rows still gets a page with its title. Zero rows per
/// page is treated as one.
pub fn paginate(
    title: String,
    rows: Vec<Vec<Option<PdfCell>>>,
    rows_per_page: usize,
) -> Vec<PdfPage> {
    let rows_per_page = rows_per_page.max(1);
    if rows.is_empty() {
        return vec![PdfPage {
            title: Some(title),
            rows,
        }];
    }

    let mut pages = Vec::new();
    let mut title = Some(title);
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        pages.push(PdfPage {
            title: title.take(),
            rows: rows.by_ref().take(rows_per_page).collect(),
        });
    }
    pages
}

/// Result of PDF export
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// PDF exporter for boards
pub struct PdfExporter<'a> {
    config: &'a ExportConfig,
    translations: &'a Translations,
    resolver: ImageResolver<'a>,
}

impl<'a> PdfExporter<'a> {
    pub fn new(
        config: &'a ExportConfig,
        translations: &'a Translations,
        fetcher: &'a dyn ImageFetcher,
    ) -> Self {
        Self {
            config,
            translations,
            resolver: ImageResolver::new(fetcher, config.platform),
        }
    }

    async fn cell_image(
        &self,
        reference: &str,
        background: [u8; 3],
        cache: &mut HashMap<(String, [u8; 3]), CellImage>,
    ) -> CellImage {
        let key = (reference.to_string(), background);
        if let Some(image) = cache.get(&key) {
            return image.clone();
        }

        let image = match self.resolver.resolve(reference).await {
            Ok(artifact) => match RasterImage::decode(&artifact.bytes, background) {
                Ok(raster) => CellImage::Raster(Rc::new(raster)),
                Err(e) => {
                    warn!(reference, error = %e, "Cannot decode image, using placeholder");
                    CellImage::NotFound
                }
            },
            Err(e) => {
                warn!(reference, error = %e, "Cannot fetch image, using placeholder");
                CellImage::NotFound
            }
        };
        cache.insert(key, image.clone());
        image
    }

    async fn cell_for(
        &self,
        tile: &Tile,
        cache: &mut HashMap<(String, [u8; 3]), CellImage>,
    ) -> PdfCell {
        let background = tile.background_color.as_deref().and_then(parse_color);
        let image = match tile.image_ref() {
            Some(reference) => {
                self.cell_image(reference, background.unwrap_or(WHITE), cache)
                    .await
            }
            None => CellImage::Empty,
        };

        PdfCell {
            label: self
                .translations
                .label_for(tile.label.as_deref(), tile.label_key.as_deref()),
            image,
            background,
            border: tile.border_color.as_deref().and_then(parse_color),
        }
    }

    /// Lay out one board's pages, resolving tile images one at a time
    pub async fn layout_board(
        &self,
        board: &Board,
        cache: &mut HashMap<(String, [u8; 3]), CellImage>,
    ) -> Vec<PdfPage> {
        let mut cells = Vec::new();
        for tile in board.present_tiles() {
            cells.push(self.cell_for(tile, cache).await);
        }
        let rows = layout_rows(cells, self.config.columns);
        paginate(board.name.clone(), rows, self.config.rows_per_page)
    }

    /// Render all boards into one PDF
    pub async fn export(
        &self,
        boards: &[Board],
        created: NaiveDateTime,
    ) -> Result<PdfDocument, ExportError> {
        self.config.validate()?;
        let mut cache = HashMap::new();
        let mut pages = Vec::new();
        for board in boards {
            pages.extend(self.layout_board(board, &mut cache).await);
        }
        if pages.is_empty() {
            pages.push(PdfPage {
                title: None,
                rows: Vec::new(),
            });
        }

        let title = match boards {
            [only] => only.name.clone(),
            _ => "Boards".to_string(),
        };
        let bytes = self.render(&pages, &title, created)?;

        info!(
            boards = boards.len(),
            pages = pages.len(),
            bytes = bytes.len(),
            "Generated PDF"
        );
        Ok(PdfDocument {
            bytes,
            page_count: pages.len(),
        })
    }

    fn render(
        &self,
        pages: &[PdfPage],
        title: &str,
        created: NaiveDateTime,
    ) -> Result<Vec<u8>, ExportError> {
        let (width, height) = self.config.page_size.landscape_points();
        let mut images = ImageRegistry::default();
        let mut streams = Vec::with_capacity(pages.len());
        for page in pages {
            streams.push(self.page_stream(page, width, height, &mut images));
        }

        let mut writer = PdfWriter::default();
        let catalog = writer.reserve();
        let pages_id = writer.reserve();
        let font = writer.reserve();
        let info = writer.reserve();

        writer.set(
            catalog,
            format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id).into_bytes(),
        );
        writer.set(
            font,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );
        let mut info_dict = b"<< /Title (".to_vec();
        info_dict.extend(pdf_text(title));
        info_dict.extend(
            format!(
                ") /Producer (Board Export SDK) /CreationDate (D:{}) >>",
                created.format("%Y%m%d%H%M%S")
            )
            .into_bytes(),
        );
        writer.set(info, info_dict);

        let image_ids: Vec<usize> = images
            .rasters
            .iter()
            .map(|raster| {
                let id = writer.reserve();
                writer.set_stream(
                    id,
                    &format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8",
                        raster.width, raster.height
                    ),
                    &raster.rgb,
                );
                id
            })
            .collect();

        let mut kids = Vec::with_capacity(streams.len());
        for (stream, used) in streams {
            let page_id = writer.reserve();
            let content_id = writer.reserve();
            writer.set_stream(content_id, "", &stream);

            let xobjects: String = used
                .iter()
                .map(|index| format!("/Im{} {} 0 R ", index, image_ids[*index]))
                .collect();
            writer.set(
                page_id,
                format!(
                    "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << /Font << /F1 {} 0 R >> /XObject << {}>> >> >>",
                    pages_id, width, height, content_id, font, xobjects
                )
                .into_bytes(),
            );
            kids.push(format!("{} 0 R", page_id));
        }
        writer.set(
            pages_id,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                kids.len()
            )
            .into_bytes(),
        );

        writer.finish(catalog, info)
    }

    /// Content stream for one page, plus the registry indices of the images
    /// it draws
    fn page_stream(
        &self,
        page: &PdfPage,
        width: f64,
        height: f64,
        images: &mut ImageRegistry,
    ) -> (Vec<u8>, Vec<usize>) {
        let mut stream = Vec::new();
        let mut used = Vec::new();

        // Continuation pages keep the header band so rows line up
        let top = height - MARGIN - TITLE_GAP;
        if let Some(title) = &page.title {
            push_text(&mut stream, title, MARGIN, height - MARGIN - TITLE_SIZE, TITLE_SIZE);
        }

        let columns = self.config.columns as f64;
        let cell_width = (width - 2.0 * MARGIN) / columns;
        let row_height = (top - MARGIN) / self.config.rows_per_page as f64;

        for (row_index, row) in page.rows.iter().enumerate() {
            let row_top = top - row_index as f64 * row_height;
            for (column, cell) in row.iter().enumerate() {
                let Some(cell) = cell else { continue };
                let x = MARGIN + column as f64 * cell_width;
                let layout = CellLayout::new(
                    self.config.label_position,
                    x,
                    row_top,
                    cell_width,
                    row_height,
                );
                self.draw_cell(&mut stream, cell, &layout, images, &mut used);
            }
        }

        (stream, used)
    }

    fn draw_cell(
        &self,
        stream: &mut Vec<u8>,
        cell: &PdfCell,
        layout: &CellLayout,
        images: &mut ImageRegistry,
        used: &mut Vec<usize>,
    ) {
        let (bx, by, side) = (layout.box_x, layout.box_y, layout.box_side);

        if let Some([r, g, b]) = cell.background {
            push_op(
                stream,
                format!(
                    "{} {} {} rg {:.2} {:.2} {:.2} {:.2} re f",
                    unit(r),
                    unit(g),
                    unit(b),
                    bx,
                    by,
                    side,
                    side
                ),
            );
        }

        match &cell.image {
            CellImage::Raster(raster) => {
                let index = images.register(raster);
                if !used.contains(&index) {
                    used.push(index);
                }
                // Canvas pixels map onto the box; small images stay small
                let scale = side / CANVAS_PX as f64;
                let w = raster.width as f64 * scale;
                let h = raster.height as f64 * scale;
                let x = bx + (side - w) / 2.0;
                let y = by + (side - h) / 2.0;
                push_op(
                    stream,
                    format!("q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q", w, h, x, y, index),
                );
            }
            CellImage::NotFound => {
                push_op(
                    stream,
                    format!(
                        "0.9 0.9 0.9 rg {:.2} {:.2} {:.2} {:.2} re f",
                        bx + side * 0.2,
                        by + side * 0.2,
                        side * 0.6,
                        side * 0.6
                    ),
                );
                push_centered_text(stream, "Not found", bx, side, by + side / 2.0 - 4.0, 9.0);
            }
            CellImage::Empty => {}
        }

        if let Some([r, g, b]) = cell.border {
            push_op(
                stream,
                format!(
                    "{} {} {} RG 2 w {:.2} {:.2} {:.2} {:.2} re S",
                    unit(r),
                    unit(g),
                    unit(b),
                    bx,
                    by,
                    side,
                    side
                ),
            );
        }

        if let Some(baseline) = layout.label_baseline {
            let max_chars = ((layout.cell_width - 2.0 * CELL_PADDING) / (LABEL_SIZE * 0.5)) as usize;
            let label = truncate_label(&cell.label, max_chars);
            push_centered_text(
                stream,
                &label,
                layout.cell_x,
                layout.cell_width,
                baseline,
                LABEL_SIZE,
            );
        }
    }
}

/// Geometry of one cell on the page (PDF units, origin bottom-left)
#[derive(Debug, Clone, PartialEq)]
struct CellLayout {
    cell_x: f64,
    cell_width: f64,
    box_x: f64,
    box_y: f64,
    box_side: f64,
    /// `None` when labels are hidden
    label_baseline: Option<f64>,
}

impl CellLayout {
    fn new(position: LabelPosition, x: f64, top: f64, width: f64, height: f64) -> Self {
        let image_area = (height - LABEL_HEIGHT).max(0.0);
        let box_side = (image_area.min(width) - 2.0 * CELL_PADDING).max(0.0);
        let box_x = x + (width - box_side) / 2.0;

        // Above and hidden both reserve the label strip at the top
        let (image_top, label_baseline) = match position {
            LabelPosition::Below => (top, Some(top - image_area - LABEL_HEIGHT + 4.0)),
            LabelPosition::Above => (top - LABEL_HEIGHT, Some(top - LABEL_HEIGHT + 4.0)),
            LabelPosition::Hidden => (top - LABEL_HEIGHT, None),
        };

        Self {
            cell_x: x,
            cell_width: width,
            box_x,
            box_y: image_top - CELL_PADDING - box_side,
            box_side,
            label_baseline,
        }
    }
}

/// Distinct rasters drawn in the document, shared across pages
#[derive(Default)]
struct ImageRegistry {
    rasters: Vec<Rc<RasterImage>>,
    index: HashMap<*const RasterImage, usize>,
}

impl ImageRegistry {
    fn register(&mut self, raster: &Rc<RasterImage>) -> usize {
        let key = Rc::as_ptr(raster);
        if let Some(index) = self.index.get(&key) {
            return *index;
        }
        self.rasters.push(Rc::clone(raster));
        let index = self.rasters.len() - 1;
        self.index.insert(key, index);
        index
    }
}

/// Collects numbered objects and serializes them with an xref table
#[derive(Default)]
struct PdfWriter {
    objects: Vec<Vec<u8>>,
}

impl PdfWriter {
    /// Allocate the next object id (1-based)
    fn reserve(&mut self) -> usize {
        self.objects.push(Vec::new());
        self.objects.len()
    }

    fn set(&mut self, id: usize, body: Vec<u8>) {
        self.objects[id - 1] = body;
    }

    fn set_stream(&mut self, id: usize, dictionary: &str, data: &[u8]) {
        let mut body = format!("<< {} /Length {} >>\nstream\n", dictionary, data.len()).into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.set(id, body);
    }

    fn finish(self, root: usize, info: usize) -> Result<Vec<u8>, ExportError> {
        if self.objects.iter().any(Vec::is_empty) {
            return Err(ExportError::PdfError(
                "PDF object reserved but never written".to_string(),
            ));
        }

        let mut pdf = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n");
        pdf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for (i, body) in self.objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            pdf.extend_from_slice(body);
            pdf.extend_from_slice(b"\nendobj\n");
        }

        let xref_start = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", offsets.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                offsets.len() + 1,
                root,
                info,
                xref_start
            )
            .as_bytes(),
        );
        Ok(pdf)
    }
}

fn unit(channel: u8) -> String {
    format!("{:.3}", channel as f64 / 255.0)
}

fn push_op(stream: &mut Vec<u8>, op: String) {
    stream.extend_from_slice(op.as_bytes());
    stream.push(b'\n');
}

fn push_text(stream: &mut Vec<u8>, text: &str, x: f64, y: f64, size: f64) {
    stream.extend_from_slice(
        format!("0 g BT /F1 {:.1} Tf {:.2} {:.2} Td (", size, x, y).as_bytes(),
    );
    stream.extend(pdf_text(text));
    stream.extend_from_slice(b") Tj ET\n");
}

fn push_centered_text(stream: &mut Vec<u8>, text: &str, x: f64, width: f64, y: f64, size: f64) {
    let estimated = text.chars().count() as f64 * size * 0.5;
    let left = x + ((width - estimated) / 2.0).max(0.0);
    push_text(stream, text, left, y, size);
}

/// Shorten a label to `max_chars`, marking the cut with "..."
fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut short: String = label.chars().take(keep).collect();
    short.push_str("...");
    short
}

/// Encode text as a PDF literal string body in WinAnsi. Characters outside
/// Latin-1 become `?`.
fn pdf_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if c.is_control() => out.push(b' '),
            c if (c as u32) < 0x100 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(label: &str) -> PdfCell {
        PdfCell {
            label: label.to_string(),
            image: CellImage::Empty,
            background: None,
            border: None,
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_color("#FF8000"), Some([255, 128, 0]));
        assert_eq!(parse_color("rgb(255, 241, 118)"), Some([255, 241, 118]));
        assert_eq!(parse_color("rgba(1,2,3,0.5)"), Some([1, 2, 3]));
        assert_eq!(parse_color("white"), Some([255, 255, 255]));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_paginate_breaks_every_n_rows() {
        let rows: Vec<_> = (0..9).map(|i| vec![Some(cell(&i.to_string()))]).collect();
        let pages = paginate("Home".to_string(), rows, 4);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].title.as_deref(), Some("Home"));
        assert!(pages[1].title.is_none());
        assert_eq!(pages[0].rows.len(), 4);
        assert_eq!(pages[2].rows.len(), 1);
    }

    #[test]
    fn test_paginate_zero_rows_per_page_terminates() {
        let rows: Vec<_> = (0..2).map(|i| vec![Some(cell(&i.to_string()))]).collect();
        let pages = paginate("Home".to_string(), rows, 0);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_paginate_empty_board_keeps_title_page() {
        let pages = paginate("Empty".to_string(), Vec::new(), 4);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title.as_deref(), Some("Empty"));
        assert!(pages[0].rows.is_empty());
    }

    #[test]
    fn test_label_positions() {
        let below = CellLayout::new(LabelPosition::Below, 0.0, 500.0, 120.0, 120.0);
        let above = CellLayout::new(LabelPosition::Above, 0.0, 500.0, 120.0, 120.0);
        let hidden = CellLayout::new(LabelPosition::Hidden, 0.0, 500.0, 120.0, 120.0);

        assert!(below.label_baseline.unwrap() < below.box_y);
        assert!(above.label_baseline.unwrap() > above.box_y + above.box_side);
        assert!(hidden.label_baseline.is_none());
        // hidden labels still leave the spacer above the image
        assert_eq!(hidden.box_y, above.box_y);
    }

    #[test]
    fn test_pdf_text_escaping() {
        assert_eq!(pdf_text("a(b)\\c"), b"a\\(b\\)\\\\c".to_vec());
        assert_eq!(pdf_text("caf\u{e9}"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(pdf_text("\u{4f60}"), b"?".to_vec());
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("a very long label", 8), "a ver...");
    }

    #[test]
    fn test_decode_flattens_alpha_onto_background() {
        let mut png = Vec::new();
        let pixel = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 0]));
        image::DynamicImage::ImageRgba8(pixel)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let raster = RasterImage::decode(&png, [10, 20, 30]).unwrap();
        assert_eq!((raster.width, raster.height), (2, 2));
        assert_eq!(&raster.rgb[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_decode_shrinks_large_images() {
        let mut png = Vec::new();
        let pixel = image::RgbImage::from_pixel(600, 300, image::Rgb([200, 0, 0]));
        image::DynamicImage::ImageRgb8(pixel)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let raster = RasterImage::decode(&png, WHITE).unwrap();
        assert_eq!((raster.width, raster.height), (150, 75));
        assert_eq!(raster.rgb.len(), 150 * 75 * 3);
    }

    #[test]
    fn test_writer_rejects_unwritten_objects() {
        let mut writer = PdfWriter::default();
        let root = writer.reserve();
        assert!(writer.finish(root, root).is_err());
    }
}

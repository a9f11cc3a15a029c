//! PDF 导出
//!
//! A4 纵向，每张卡片一个带边框的区块（卡片序号、问题/答案或主题/摘要/要点），
//! 放不下时换页，最后统一写入页脚 `Page i of n`。
//!
//! 只用到 PDF 内置的 Helvetica 字体族，按 WinAnsiEncoding 输出，内容流不压缩。

use crate::domain::{split_concept, CardContent, StyleKind};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;

const MARGIN_TOP: f32 = 60.0;
const MARGIN_BOTTOM: f32 = 40.0;
const MARGIN_LEFT: f32 = 40.0;
const MARGIN_RIGHT: f32 = 40.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
const CARD_PADDING: f32 = 15.0;
const CARD_CONTENT_WIDTH: f32 = CONTENT_WIDTH - CARD_PADDING * 2.0;
const CARD_GAP: f32 = 20.0;
const LINE_FACTOR: f32 = 1.15;

const SIZE_TITLE: f32 = 24.0;
const SIZE_TOPIC: f32 = 14.0;
const SIZE_BODY: f32 = 11.0;
const SIZE_LABEL: f32 = 10.0;
const SIZE_FOOTER: f32 = 9.0;

const COLOR_PRIMARY: Rgb = Rgb(0x43, 0x38, 0xCA);
const COLOR_TEXT: Rgb = Rgb(0x1F, 0x29, 0x37);
const COLOR_LABEL: Rgb = Rgb(0x6B, 0x72, 0x80);
const COLOR_BORDER: Rgb = Rgb(0xE5, 0xE7, 0xEB);
const COLOR_BACKGROUND: Rgb = Rgb(0xF9, 0xFA, 0xFB);

pub const PDF_TITLE: &str = "QuickFlash AI Flashcards";

#[derive(Debug, Clone, Copy)]
struct Rgb(u8, u8, u8);

impl Rgb {
    fn components(&self) -> String {
        format!(
            "{:.3} {:.3} {:.3}",
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }
}

/// Helvetica 字宽的近似值（单位：em）
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | '\'' | '|' | '!' | ':' | ';' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' => 0.85,
        'A'..='Z' => 0.68,
        _ => 0.55,
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(char_width).sum::<f32>() * size
}

/// 按宽度折行，保留原文中的换行
pub(crate) fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if text_width(&candidate, size) <= max_width || line.is_empty() {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line = word.to_string();
            }
        }
        lines.push(line);
    }

    lines
}

/// PDF 字符串转义，非 WinAnsi 字符替换为 `?`
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\u{2022}' => out.push_str("\\225"),
            '\u{2013}' => out.push_str("\\226"),
            '\u{2014}' => out.push_str("\\227"),
            '\u{2018}' => out.push_str("\\221"),
            '\u{2019}' => out.push_str("\\222"),
            '\u{201C}' => out.push_str("\\223"),
            '\u{201D}' => out.push_str("\\224"),
            ' '..='~' => out.push(c),
            '\u{A0}'..='\u{FF}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// 页面内容流（坐标以页面顶部为原点）
#[derive(Default)]
struct Page {
    ops: String,
}

impl Page {
    fn text(&mut self, font: Font, size: f32, color: Rgb, x: f32, y: f32, text: &str) {
        self.ops.push_str(&format!(
            "BT /{} {:.1} Tf {} rg {:.2} {:.2} Td ({}) Tj ET\n",
            font.resource(),
            size,
            color.components(),
            x,
            PAGE_HEIGHT - y,
            escape(text)
        ));
    }

    fn centered(&mut self, font: Font, size: f32, color: Rgb, y: f32, text: &str) {
        let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
        self.text(font, size, color, x.max(0.0), y, text);
    }

    fn boxed(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push_str(&format!(
            "{} rg {} RG {:.2} {:.2} {:.2} {:.2} re B\n",
            COLOR_BACKGROUND.components(),
            COLOR_BORDER.components(),
            x,
            PAGE_HEIGHT - y - height,
            width,
            height
        ));
    }

    fn rule(&mut self, x1: f32, x2: f32, y: f32) {
        self.ops.push_str(&format!(
            "{} RG {:.2} {:.2} m {:.2} {:.2} l S\n",
            COLOR_BORDER.components(),
            x1,
            PAGE_HEIGHT - y,
            x2,
            PAGE_HEIGHT - y
        ));
    }
}

/// 卡片区块中的一行（按从上到下的顺序排版）
enum Row {
    Text {
        font: Font,
        size: f32,
        color: Rgb,
        text: String,
        /// 基线相对行顶的偏移
        offset: f32,
        advance: f32,
    },
    Rule,
    Space(f32),
}

impl Row {
    fn label(text: impl Into<String>) -> Self {
        Row::Text {
            font: Font::Bold,
            size: SIZE_LABEL,
            color: COLOR_LABEL,
            text: text.into(),
            offset: 0.0,
            advance: 12.0,
        }
    }

    fn advance(&self) -> f32 {
        match self {
            Row::Text { advance, .. } => *advance,
            Row::Rule => 15.0,
            Row::Space(height) => *height,
        }
    }

    fn draw(&self, page: &mut Page, y: f32) {
        let x = MARGIN_LEFT + CARD_PADDING;
        match self {
            Row::Text {
                font,
                size,
                color,
                text,
                offset,
                ..
            } => page.text(*font, *size, *color, x, y + offset, text),
            Row::Rule => page.rule(x, PAGE_WIDTH - MARGIN_RIGHT - CARD_PADDING, y),
            Row::Space(_) => {}
        }
    }
}

fn push_lines(
    rows: &mut Vec<Row>,
    lines: Vec<String>,
    font: Font,
    size: f32,
    color: Rgb,
    offset: f32,
) {
    rows.extend(lines.into_iter().map(|text| Row::Text {
        font,
        size,
        color,
        text,
        offset,
        advance: size * LINE_FACTOR,
    }));
}

/// 一张卡片的全部行
fn card_rows(card: &CardContent, index: usize, total: usize) -> Vec<Row> {
    let mut rows = vec![Row::Text {
        font: Font::Bold,
        size: SIZE_LABEL,
        color: COLOR_LABEL,
        text: format!("CARD {} OF {}", index + 1, total),
        offset: 10.0,
        advance: 25.0,
    }];

    let body = |text: &str| wrap_text(text, SIZE_BODY, CARD_CONTENT_WIDTH);
    match split_concept(&card.front_text) {
        Some((topic, summary)) if card.style == StyleKind::Concept => {
            let topic = wrap_text(topic, SIZE_TOPIC, CARD_CONTENT_WIDTH);
            push_lines(&mut rows, topic, Font::Bold, SIZE_TOPIC, COLOR_PRIMARY, 0.0);
            push_lines(&mut rows, body(summary), Font::Italic, SIZE_BODY, COLOR_TEXT, 5.0);
            rows.push(Row::Space(15.0));
            rows.push(Row::Rule);
            rows.push(Row::label("DETAILS"));
            push_lines(&mut rows, body(&card.back_text), Font::Regular, SIZE_BODY, COLOR_TEXT, 0.0);
        }
        _ => {
            rows.push(Row::label("QUESTION"));
            push_lines(&mut rows, body(&card.front_text), Font::Regular, SIZE_BODY, COLOR_TEXT, 0.0);
            rows.push(Row::Space(10.0));
            rows.push(Row::Rule);
            rows.push(Row::label("ANSWER"));
            push_lines(&mut rows, body(&card.back_text), Font::Regular, SIZE_BODY, COLOR_TEXT, 0.0);
        }
    }
    rows.push(Row::Space(12.0));
    rows
}

/// 分页排版
///
/// 放不下的卡片换到新页；单页放不下的卡片在行边界处拆开，每页各画一段边框。
struct Layout {
    done: Vec<Page>,
    page: Page,
    y: f32,
}

impl Layout {
    const BOTTOM: f32 = PAGE_HEIGHT - MARGIN_BOTTOM;

    fn new() -> Self {
        let mut page = Page::default();
        page.centered(Font::Bold, SIZE_TITLE, COLOR_PRIMARY, 40.0, PDF_TITLE);
        Self {
            done: Vec::new(),
            page,
            y: MARGIN_TOP,
        }
    }

    fn new_page(&mut self) {
        self.done.push(std::mem::take(&mut self.page));
        self.y = MARGIN_TOP;
    }

    /// 边框先于内容写入，避免背景色盖住文字
    fn close_segment(&mut self, start: f32, segment: Page) {
        self.page.boxed(MARGIN_LEFT, start, CONTENT_WIDTH, self.y - start);
        self.page.ops.push_str(&segment.ops);
    }

    fn card(&mut self, rows: &[Row]) {
        let height = CARD_PADDING * 2.0 + rows.iter().map(Row::advance).sum::<f32>();
        if self.y + height > Self::BOTTOM && self.y > MARGIN_TOP {
            self.new_page();
        }

        let mut start = self.y;
        let mut segment = Page::default();
        self.y += CARD_PADDING;

        for row in rows {
            let overflows = self.y + row.advance() > Self::BOTTOM - CARD_PADDING;
            if overflows && self.y > start + CARD_PADDING {
                self.y += CARD_PADDING;
                self.close_segment(start, std::mem::take(&mut segment));
                self.new_page();
                start = self.y;
                self.y += CARD_PADDING;
            }
            row.draw(&mut segment, self.y);
            self.y += row.advance();
        }

        self.y += CARD_PADDING;
        self.close_segment(start, segment);
        self.y += CARD_GAP;
    }

    fn finish(mut self) -> Vec<Page> {
        self.done.push(self.page);
        let page_count = self.done.len();
        for (i, page) in self.done.iter_mut().enumerate() {
            page.centered(
                Font::Regular,
                SIZE_FOOTER,
                COLOR_LABEL,
                PAGE_HEIGHT - 20.0,
                &format!("Page {} of {}", i + 1, page_count),
            );
        }
        self.done
    }
}

fn layout(cards: &[CardContent]) -> Vec<Page> {
    let mut layout = Layout::new();
    for (index, card) in cards.iter().enumerate() {
        layout.card(&card_rows(card, index, cards.len()));
    }
    layout.finish()
}

/// 导出为 PDF 文档
pub fn to_pdf(cards: &[CardContent]) -> Vec<u8> {
    serialize(&layout(cards))
}

/// 写出 PDF 对象、交叉引用表和 trailer
fn serialize(pages: &[Page]) -> Vec<u8> {
    // 1: Catalog, 2: Pages, 3-5: 字体, 之后每页占两个对象（Page + Contents）
    let first_page_obj = 6;
    let mut objects: Vec<String> = Vec::with_capacity(5 + pages.len() * 2);

    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page_obj + i * 2))
        .collect::<Vec<_>>()
        .join(" ");

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids,
        pages.len()
    ));
    for base_font in ["Helvetica", "Helvetica-Bold", "Helvetica-Oblique"] {
        objects.push(format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{base_font} /Encoding /WinAnsiEncoding >>"
        ));
    }

    for (i, page) in pages.iter().enumerate() {
        let contents_obj = first_page_obj + i * 2 + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH:.2} {PAGE_HEIGHT:.2}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R /F3 5 0 R >> >> /Contents {contents_obj} 0 R >>"
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            page.ops.len(),
            page.ops
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, object));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    out.into_bytes()
}

//! PDF 字节生成
//!
//! 把排好的物理行画进 A4 页面：游标从页顶往下走，越过下边距就换页。
//! 字体用 printpdf 内置 Helvetica / Helvetica-Bold，不依赖外部字体文件。

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};

use crate::error::{AppError, RenderError};
use crate::renderer::layout::{
    text_width_mm, Align, Line, LineKind, TextStyle, MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};

/// 把行序列画成 PDF 字节
pub fn emit(lines: &[Line]) -> Result<Vec<u8>, AppError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Question Paper",
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Render(RenderError::FontLoadFailed { source: Box::new(e) }))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Render(RenderError::FontLoadFailed { source: Box::new(e) }))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    // 游标指向当前行的上沿，自页顶向下递减
    let mut cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;

    for line in lines {
        if cursor_y - line.height < MARGIN_MM {
            let (page, new_layer) = doc.add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
            layer = doc.get_page(page).get_layer(new_layer);
            cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
        }

        // 基线取行内约 3/4 处
        let baseline = cursor_y - line.height * 0.75;
        let font = font_for(&regular, &bold, line.style);

        match &line.kind {
            LineKind::Text { text, align } => {
                if !text.is_empty() {
                    let x = match align {
                        Align::Left => MARGIN_MM,
                        Align::Center => (PAGE_WIDTH_MM - text_width_mm(text, line.style)) / 2.0,
                    };
                    layer.use_text(
                        text.clone(),
                        line.style.size as f32,
                        Mm(x as f32),
                        Mm(baseline as f32),
                        font,
                    );
                }
            }
            LineKind::Pair { left, right } => {
                layer.use_text(
                    left.clone(),
                    line.style.size as f32,
                    Mm(MARGIN_MM as f32),
                    Mm(baseline as f32),
                    font,
                );
                let right_x = PAGE_WIDTH_MM - MARGIN_MM - text_width_mm(right, line.style);
                layer.use_text(
                    right.clone(),
                    line.style.size as f32,
                    Mm(right_x as f32),
                    Mm(baseline as f32),
                    font,
                );
            }
            LineKind::Spacer => {}
        }

        cursor_y -= line.height;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Render(RenderError::PdfBuildFailed { source: Box::new(e) }))
}

/// 按 `emit` 相同的游标规则计算一份行序列会占用的页数
pub fn page_count(lines: &[Line]) -> usize {
    let mut pages = 1;
    let mut cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
    for line in lines {
        if cursor_y - line.height < MARGIN_MM {
            pages += 1;
            cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        cursor_y -= line.height;
    }
    pages
}

fn font_for<'a>(
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
    style: TextStyle,
) -> &'a IndirectFontRef {
    if style.bold {
        bold
    } else {
        regular
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionSet;
    use crate::renderer::layout::compose;

    #[test]
    fn test_emit_produces_pdf_bytes() {
        let lines = compose(&QuestionSet::default(), None);
        let bytes = emit(&lines).expect("PDF 生成不应失败");
        // PDF 魔数
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_emit_paginates_long_documents() {
        let set = QuestionSet {
            mcqs: Vec::new(),
            short: (1..=120).map(|i| format!("第 {} 题题干", i)).collect(),
            long: Vec::new(),
        };
        let lines = compose(&set, None);
        // 行高总和远超一页可用高度，应分成多页
        let total_height: f64 = lines.iter().map(|l| l.height).sum();
        assert!(total_height > PAGE_HEIGHT_MM - 2.0 * MARGIN_MM);
        assert!(page_count(&lines) > 1);

        let bytes = emit(&lines).expect("PDF 生成不应失败");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_page_count_single_page_for_empty_set() {
        let lines = compose(&QuestionSet::default(), None);
        assert_eq!(page_count(&lines), 1);
    }
}

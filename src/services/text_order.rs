// OCR word ordering inside a region
//
// Japanese manga text is usually set vertically (columns read right to left,
// each column top to bottom) but sound effects and narration are sometimes
// horizontal. The writing direction is inferred from the words' aggregate
// footprint.

use std::cmp::Ordering;

use crate::core::types::OcrWord;

/// Writing direction of a region's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Vertical,
    Horizontal,
}

/// Vertical when the summed word heights exceed the summed word widths
pub fn detect_direction(words: &[OcrWord]) -> TextDirection {
    let total_width: f64 = words.iter().map(|w| w.bbox.x2 - w.bbox.x1).sum();
    let total_height: f64 = words.iter().map(|w| w.bbox.y2 - w.bbox.y1).sum();

    if total_height > total_width {
        TextDirection::Vertical
    } else {
        TextDirection::Horizontal
    }
}

/// Concatenate a region's words in reading order
pub fn ordered_text(words: &[OcrWord]) -> String {
    if words.is_empty() {
        return String::new();
    }

    let direction = detect_direction(words);
    let mut sorted: Vec<&OcrWord> = words.iter().collect();
    sorted.sort_by(|a, b| compare_words(direction, a, b));

    sorted.iter().map(|w| w.text.as_str()).collect()
}

fn compare_words(direction: TextDirection, a: &OcrWord, b: &OcrWord) -> Ordering {
    match direction {
        // Rightmost column first, then down the column
        TextDirection::Vertical => b
            .bbox
            .x2
            .total_cmp(&a.bbox.x2)
            .then_with(|| a.bbox.y1.total_cmp(&b.bbox.y1)),
        // Top line first, then left to right
        TextDirection::Horizontal => a
            .bbox
            .y1
            .total_cmp(&b.bbox.y1)
            .then_with(|| a.bbox.x1.total_cmp(&b.bbox.x1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BoundingBox;

    fn word(x1: f64, y1: f64, x2: f64, y2: f64, text: &str) -> OcrWord {
        OcrWord {
            bbox: BoundingBox { x1, y1, x2, y2 },
            text: text.to_string(),
        }
    }

    #[test]
    fn test_vertical_columns_right_to_left() {
        let words = vec![
            word(0.0, 0.0, 10.0, 80.0, "です"),
            word(20.0, 40.0, 30.0, 80.0, "日は"),
            word(20.0, 0.0, 30.0, 40.0, "今"),
        ];
        assert_eq!(detect_direction(&words), TextDirection::Vertical);
        assert_eq!(ordered_text(&words), "今日はです");
    }

    #[test]
    fn test_horizontal_lines_top_to_bottom() {
        let words = vec![
            word(0.0, 20.0, 60.0, 30.0, "world"),
            word(50.0, 0.0, 90.0, 10.0, "there"),
            word(0.0, 0.0, 40.0, 10.0, "hello"),
        ];
        assert_eq!(detect_direction(&words), TextDirection::Horizontal);
        assert_eq!(ordered_text(&words), "hellothereworld");
    }

    #[test]
    fn test_square_footprint_is_horizontal() {
        let words = vec![word(0.0, 0.0, 10.0, 10.0, "ア")];
        assert_eq!(detect_direction(&words), TextDirection::Horizontal);
        assert_eq!(ordered_text(&[]), "");
    }
}

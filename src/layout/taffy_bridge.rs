//! Taffy Bridge - host element props to Taffy styles.
//!
//! Host elements carry layout as plain props. This module reads them into a
//! Taffy [`Style`] and provides the measure function for text leaves.
//!
//! | prop | Taffy field |
//! |------|-------------|
//! | `width`, `height` | `size` (cells, `"50%"`, `"auto"`) |
//! | `flexDirection` | `flex_direction` (`row`, `column`, `row-reverse`, `column-reverse`) |
//! | `flexGrow`, `flexShrink` | `flex_grow`, `flex_shrink` |
//! | `padding`, `paddingTop`.. | `padding` |
//! | `margin` | `margin` |
//! | `gap` | `gap` |
//! | `justifyContent`, `alignItems` | same |

use taffy::{
    AlignItems as TaffyAlignItems, AvailableSpace, Dimension as TaffyDimension, Display,
    FlexDirection as TaffyFlexDirection, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, Rect, Size, Style,
};

use crate::types::{Dimension, Props, Value};

use super::text_measure::{max_line_width, measure_text_height, string_width};

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

/// Convert our Dimension to Taffy's Dimension.
fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Cells(n) => TaffyDimension::Length(n as f32),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn cells(props: &Props, key: &str) -> Option<f32> {
    match props.get(key)? {
        Value::Int(n) => Some((*n).max(0) as f32),
        Value::Float(f) => Some(f.max(0.0) as f32),
        _ => None,
    }
}

fn number(props: &Props, key: &str) -> Option<f32> {
    props.get(key).and_then(Value::as_f64).map(|f| f as f32)
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(value: &str) -> TaffyFlexDirection {
    match value {
        "row" => TaffyFlexDirection::Row,
        "row-reverse" => TaffyFlexDirection::RowReverse,
        "column-reverse" => TaffyFlexDirection::ColumnReverse,
        _ => TaffyFlexDirection::Column,
    }
}

fn to_taffy_justify_content(value: &str) -> Option<TaffyJustifyContent> {
    Some(match value {
        "flex-start" => TaffyJustifyContent::FlexStart,
        "center" => TaffyJustifyContent::Center,
        "flex-end" => TaffyJustifyContent::FlexEnd,
        "space-between" => TaffyJustifyContent::SpaceBetween,
        "space-around" => TaffyJustifyContent::SpaceAround,
        "space-evenly" => TaffyJustifyContent::SpaceEvenly,
        _ => return None,
    })
}

fn to_taffy_align_items(value: &str) -> Option<TaffyAlignItems> {
    Some(match value {
        "stretch" => TaffyAlignItems::Stretch,
        "flex-start" => TaffyAlignItems::FlexStart,
        "center" => TaffyAlignItems::Center,
        "flex-end" => TaffyAlignItems::FlexEnd,
        "baseline" => TaffyAlignItems::Baseline,
        _ => return None,
    })
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy Style for a host element from its props.
///
/// Boxes are columns by default, as in a terminal a stack of lines is the
/// common case.
pub fn style_from_props(props: &Props) -> Style {
    let dimension = |key| props.get(key).map(Dimension::from).unwrap_or_default();

    let padding = cells(props, "padding").unwrap_or(0.0);
    let side = |key| LengthPercentage::Length(cells(props, key).unwrap_or(padding));
    let margin = LengthPercentageAuto::Length(cells(props, "margin").unwrap_or(0.0));
    let gap = LengthPercentage::Length(cells(props, "gap").unwrap_or(0.0));

    Style {
        display: Display::Flex,
        flex_direction: to_taffy_flex_direction(
            props.get("flexDirection").and_then(Value::as_str).unwrap_or("column"),
        ),
        justify_content: props
            .get("justifyContent")
            .and_then(Value::as_str)
            .and_then(to_taffy_justify_content),
        align_items: props
            .get("alignItems")
            .and_then(Value::as_str)
            .and_then(to_taffy_align_items),
        flex_grow: number(props, "flexGrow").unwrap_or(0.0),
        flex_shrink: number(props, "flexShrink").unwrap_or(1.0),
        size: Size {
            width: to_taffy_dimension(dimension("width")),
            height: to_taffy_dimension(dimension("height")),
        },
        padding: Rect {
            top: side("paddingTop"),
            right: side("paddingRight"),
            bottom: side("paddingBottom"),
            left: side("paddingLeft"),
        },
        margin: Rect {
            top: margin,
            right: margin,
            bottom: margin,
            left: margin,
        },
        gap: Size { width: gap, height: gap },
        ..Default::default()
    }
}

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Measure function for text leaves.
pub fn measure_text(
    content: &str,
    known_dimensions: Size<Option<f32>>,
    available_space: Size<AvailableSpace>,
) -> Size<f32> {
    if content.is_empty() {
        return Size::ZERO;
    }

    // Get available width for wrapping
    let avail_width = match available_space.width {
        AvailableSpace::Definite(w) => w as u16,
        AvailableSpace::MinContent => string_width(content),
        AvailableSpace::MaxContent => u16::MAX,
    };

    let text_width = max_line_width(content).min(avail_width.max(1));
    let text_height = measure_text_height(content, avail_width.max(1));

    Size {
        width: known_dimensions.width.unwrap_or(text_width as f32),
        height: known_dimensions.height.unwrap_or(text_height as f32),
    }
}

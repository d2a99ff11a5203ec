//! Property application: declaration values -> typed [`Styles`] fields.

use crate::css::model::DeclarationValue;
use crate::css::scalar::Scalar;
use crate::css::styles::*;
use crate::geometry::Spacing;

/// Why a declaration could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

fn invalid(property: &str, message: impl Into<String>) -> PropertyError {
    PropertyError::InvalidValue { property: property.to_owned(), message: message.into() }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Parse one value as a length.
pub fn parse_scalar(property: &str, value: &DeclarationValue) -> Result<Scalar, PropertyError> {
    match value {
        DeclarationValue::Number(n) => Ok(Scalar::Cells(*n)),
        DeclarationValue::Dimension(n, unit) => match unit.as_str() {
            "fr" => Ok(Scalar::Fraction(*n)),
            "%" => Ok(Scalar::Percent(*n)),
            "vw" => Ok(Scalar::ViewportWidth(*n)),
            "vh" => Ok(Scalar::ViewportHeight(*n)),
            other => Err(invalid(property, format!("unknown unit `{other}`"))),
        },
        DeclarationValue::Ident(name) if name == "auto" => Ok(Scalar::Auto),
        other => Err(invalid(property, format!("expected a length, got {other:?}"))),
    }
}

fn single<'a>(property: &str, values: &'a [DeclarationValue]) -> Result<&'a DeclarationValue, PropertyError> {
    match values {
        [value] => Ok(value),
        _ => Err(invalid(property, format!("expected 1 value, got {}", values.len()))),
    }
}

fn ident<'a>(property: &str, value: &'a DeclarationValue) -> Result<&'a str, PropertyError> {
    match value {
        DeclarationValue::Ident(name) => Ok(name),
        other => Err(invalid(property, format!("expected a keyword, got {other:?}"))),
    }
}

/// Look a keyword up in a table of accepted names.
fn keyword<T: Copy>(
    property: &str,
    values: &[DeclarationValue],
    table: &[(&str, T)],
) -> Result<T, PropertyError> {
    let name = ident(property, single(property, values)?)?;
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let expected: Vec<&str> = table.iter().map(|(candidate, _)| *candidate).collect();
            invalid(property, format!("expected {}, got `{name}`", expected.join("|")))
        })
}

fn length(property: &str, values: &[DeclarationValue]) -> Result<Scalar, PropertyError> {
    parse_scalar(property, single(property, values)?)
}

fn lengths(property: &str, values: &[DeclarationValue]) -> Result<Vec<Scalar>, PropertyError> {
    if values.is_empty() {
        return Err(invalid(property, "expected at least 1 value"));
    }
    values.iter().map(|value| parse_scalar(property, value)).collect()
}

fn integer(property: &str, value: &DeclarationValue) -> Result<i32, PropertyError> {
    match value {
        DeclarationValue::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Ok(*n as i32),
        other => Err(invalid(property, format!("expected a non-negative integer, got {other:?}"))),
    }
}

fn color(property: &str, value: &DeclarationValue) -> Result<String, PropertyError> {
    match value {
        DeclarationValue::Ident(name) => Ok(name.clone()),
        DeclarationValue::Color(hex) => Ok(format!("#{hex}")),
        other => Err(invalid(property, format!("expected a colour, got {other:?}"))),
    }
}

/// CSS box shorthand in cells: 1 value for all edges, 2 for
/// vertical/horizontal, 4 for top/right/bottom/left.
pub fn parse_spacing(property: &str, values: &[DeclarationValue]) -> Result<Spacing, PropertyError> {
    let cells: Vec<i32> = values
        .iter()
        .map(|value| integer(property, value))
        .collect::<Result<_, _>>()?;
    match cells.as_slice() {
        [all] => Ok(Spacing::all(*all)),
        [vertical, horizontal] => Ok(Spacing::symmetric(*vertical, *horizontal)),
        [top, right, bottom, left] => Ok(Spacing::new(*top, *right, *bottom, *left)),
        _ => Err(invalid(property, format!("expected 1, 2 or 4 values, got {}", cells.len()))),
    }
}

fn parse_border(values: &[DeclarationValue]) -> Result<Border, PropertyError> {
    let (kind, rest) = match values {
        [first, rest @ ..] if rest.len() <= 1 => (ident("border", first)?, rest),
        _ => return Err(invalid("border", "expected `<kind> [<colour>]`")),
    };
    let kind = match kind {
        "none" | "hidden" => BorderKind::None,
        "ascii" => BorderKind::Ascii,
        "round" => BorderKind::Round,
        "solid" => BorderKind::Solid,
        "heavy" => BorderKind::Heavy,
        "double" => BorderKind::Double,
        other => return Err(invalid("border", format!("unknown border kind `{other}`"))),
    };
    let color = rest.first().map(|value| color("border", value)).transpose()?;
    Ok(Border { kind, color })
}

fn parse_text_style(values: &[DeclarationValue]) -> Result<TextStyle, PropertyError> {
    let mut style = TextStyle::default();
    for value in values {
        match ident("text-style", value)? {
            "none" => style = TextStyle::default(),
            "bold" => style.bold = true,
            "dim" => style.dim = true,
            "italic" => style.italic = true,
            "underline" => style.underline = true,
            "strike" => style.strike = true,
            "reverse" => style.reverse = true,
            other => return Err(invalid("text-style", format!("unknown text style `{other}`"))),
        }
    }
    Ok(style)
}

const OVERFLOW: &[(&str, Overflow)] =
    &[("hidden", Overflow::Hidden), ("scroll", Overflow::Scroll), ("auto", Overflow::Auto)];

const ALIGN_HORIZONTAL: &[(&str, AlignHorizontal)] = &[
    ("left", AlignHorizontal::Left),
    ("center", AlignHorizontal::Center),
    ("right", AlignHorizontal::Right),
];

const ALIGN_VERTICAL: &[(&str, AlignVertical)] = &[
    ("top", AlignVertical::Top),
    ("middle", AlignVertical::Middle),
    ("bottom", AlignVertical::Bottom),
];

// ---------------------------------------------------------------------------
// apply_declaration
// ---------------------------------------------------------------------------

/// Apply one declaration to `styles`.
///
/// On error `styles` is left as it was, so the caller can drop the
/// declaration and keep going.
pub fn apply_declaration(
    styles: &mut Styles,
    property: &str,
    values: &[DeclarationValue],
) -> Result<(), PropertyError> {
    match property {
        "display" => {
            styles.display =
                Some(keyword(property, values, &[("block", Display::Block), ("none", Display::None)])?);
        }
        "visibility" => {
            styles.visibility = Some(keyword(
                property,
                values,
                &[("visible", Visibility::Visible), ("hidden", Visibility::Hidden)],
            )?);
        }
        "layout" => {
            styles.layout = Some(keyword(
                property,
                values,
                &[
                    ("vertical", LayoutMode::Vertical),
                    ("horizontal", LayoutMode::Horizontal),
                    ("grid", LayoutMode::Grid),
                    ("center", LayoutMode::Center),
                ],
            )?);
        }
        "dock" => {
            styles.dock = Some(keyword(
                property,
                values,
                &[
                    ("top", Dock::Top),
                    ("right", Dock::Right),
                    ("bottom", Dock::Bottom),
                    ("left", Dock::Left),
                ],
            )?);
        }
        "position" => {
            styles.position = Some(keyword(
                property,
                values,
                &[("relative", Position::Relative), ("absolute", Position::Absolute)],
            )?);
        }
        "offset" => match values {
            [x, y] => {
                let x = parse_scalar(property, x)?;
                let y = parse_scalar(property, y)?;
                styles.offset_x = Some(x);
                styles.offset_y = Some(y);
            }
            _ => return Err(invalid(property, "expected `<x> <y>`")),
        },
        "offset-x" => styles.offset_x = Some(length(property, values)?),
        "offset-y" => styles.offset_y = Some(length(property, values)?),
        "overflow" => {
            let (x, y) = match values {
                [_] => {
                    let both = keyword(property, values, OVERFLOW)?;
                    (both, both)
                }
                [x, y] => (
                    keyword(property, std::slice::from_ref(x), OVERFLOW)?,
                    keyword(property, std::slice::from_ref(y), OVERFLOW)?,
                ),
                _ => return Err(invalid(property, "expected 1 or 2 values")),
            };
            styles.overflow_x = Some(x);
            styles.overflow_y = Some(y);
        }
        "overflow-x" => styles.overflow_x = Some(keyword(property, values, OVERFLOW)?),
        "overflow-y" => styles.overflow_y = Some(keyword(property, values, OVERFLOW)?),

        "width" => styles.width = Some(length(property, values)?),
        "height" => styles.height = Some(length(property, values)?),
        "min-width" => styles.min_width = Some(length(property, values)?),
        "min-height" => styles.min_height = Some(length(property, values)?),
        "max-width" => styles.max_width = Some(length(property, values)?),
        "max-height" => styles.max_height = Some(length(property, values)?),

        "margin" => styles.margin = Some(parse_spacing(property, values)?),
        "padding" => styles.padding = Some(parse_spacing(property, values)?),
        "border" => styles.border = Some(parse_border(values)?),

        "align" => match values {
            [horizontal, vertical] => {
                let horizontal =
                    keyword(property, std::slice::from_ref(horizontal), ALIGN_HORIZONTAL)?;
                let vertical = keyword(property, std::slice::from_ref(vertical), ALIGN_VERTICAL)?;
                styles.align_horizontal = Some(horizontal);
                styles.align_vertical = Some(vertical);
            }
            _ => return Err(invalid(property, "expected `<horizontal> <vertical>`")),
        },
        "align-horizontal" => {
            styles.align_horizontal = Some(keyword(property, values, ALIGN_HORIZONTAL)?);
        }
        "align-vertical" => {
            styles.align_vertical = Some(keyword(property, values, ALIGN_VERTICAL)?);
        }

        "layer" => styles.layer = Some(ident(property, single(property, values)?)?.to_owned()),
        "layers" => {
            let names = values
                .iter()
                .map(|value| ident(property, value).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;
            if names.is_empty() {
                return Err(invalid(property, "expected at least 1 layer name"));
            }
            styles.layers = Some(names);
        }

        "grid-size" => {
            let (columns, rows) = match values {
                [columns] => (integer(property, columns)?, 0),
                [columns, rows] => (integer(property, columns)?, integer(property, rows)?),
                _ => return Err(invalid(property, "expected `<columns> [<rows>]`")),
            };
            if columns == 0 {
                return Err(invalid(property, "grid needs at least one column"));
            }
            styles.grid_size_columns = Some(columns);
            styles.grid_size_rows = Some(rows);
        }
        "grid-columns" => styles.grid_columns = Some(lengths(property, values)?),
        "grid-rows" => styles.grid_rows = Some(lengths(property, values)?),
        "grid-gutter" => {
            let (vertical, horizontal) = match values {
                [both] => {
                    let both = integer(property, both)?;
                    (both, both)
                }
                [vertical, horizontal] => (integer(property, vertical)?, integer(property, horizontal)?),
                _ => return Err(invalid(property, "expected `<vertical> [<horizontal>]`")),
            };
            styles.grid_gutter_vertical = Some(vertical);
            styles.grid_gutter_horizontal = Some(horizontal);
        }
        "column-span" => styles.column_span = Some(integer(property, single(property, values)?)?.max(1)),
        "row-span" => styles.row_span = Some(integer(property, single(property, values)?)?.max(1)),

        "color" => styles.color = Some(color(property, single(property, values)?)?),
        "background" => styles.background = Some(color(property, single(property, values)?)?),
        "text-align" => {
            styles.text_align = Some(keyword(
                property,
                values,
                &[("left", TextAlign::Left), ("center", TextAlign::Center), ("right", TextAlign::Right)],
            )?);
        }
        "text-style" => styles.text_style = Some(parse_text_style(values)?),

        other => return Err(PropertyError::UnknownProperty(other.to_owned())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f32) -> DeclarationValue {
        DeclarationValue::Number(n)
    }

    fn dim(n: f32, unit: &str) -> DeclarationValue {
        DeclarationValue::Dimension(n, unit.into())
    }

    fn word(name: &str) -> DeclarationValue {
        DeclarationValue::Ident(name.into())
    }

    fn apply(property: &str, values: &[DeclarationValue]) -> Result<Styles, PropertyError> {
        let mut styles = Styles::new();
        apply_declaration(&mut styles, property, values)?;
        Ok(styles)
    }

    #[test]
    fn sizes_accept_every_unit() {
        assert_eq!(apply("width", &[num(10.0)]).unwrap().width, Some(Scalar::Cells(10.0)));
        assert_eq!(apply("width", &[dim(2.0, "fr")]).unwrap().width, Some(Scalar::Fraction(2.0)));
        assert_eq!(apply("height", &[dim(50.0, "%")]).unwrap().height, Some(Scalar::Percent(50.0)));
        assert_eq!(
            apply("max-height", &[dim(80.0, "vh")]).unwrap().max_height,
            Some(Scalar::ViewportHeight(80.0))
        );
        assert_eq!(apply("height", &[word("auto")]).unwrap().height, Some(Scalar::Auto));
    }

    #[test]
    fn spacing_shorthand() {
        assert_eq!(apply("margin", &[num(1.0)]).unwrap().margin, Some(Spacing::all(1)));
        assert_eq!(
            apply("padding", &[num(1.0), num(2.0)]).unwrap().padding,
            Some(Spacing::symmetric(1, 2))
        );
        assert_eq!(
            apply("margin", &[num(1.0), num(2.0), num(3.0), num(4.0)]).unwrap().margin,
            Some(Spacing::new(1, 2, 3, 4))
        );
        assert!(apply("margin", &[num(1.0), num(2.0), num(3.0)]).is_err());
        assert!(apply("padding", &[dim(10.0, "%")]).is_err());
    }

    #[test]
    fn grid_properties() {
        let styles = apply("grid-size", &[num(3.0), num(2.0)]).unwrap();
        assert_eq!(styles.grid_size_columns, Some(3));
        assert_eq!(styles.grid_size_rows, Some(2));

        let styles = apply("grid-gutter", &[num(1.0), num(2.0)]).unwrap();
        assert_eq!(styles.grid_gutter_vertical, Some(1));
        assert_eq!(styles.grid_gutter_horizontal, Some(2));

        let styles = apply("grid-columns", &[num(10.0), dim(1.0, "fr")]).unwrap();
        assert_eq!(styles.grid_columns, Some(vec![Scalar::Cells(10.0), Scalar::Fraction(1.0)]));

        assert!(apply("grid-size", &[num(0.0)]).is_err());
        assert!(apply("column-span", &[num(1.5)]).is_err());
    }

    #[test]
    fn align_pair() {
        let styles = apply("align", &[word("center"), word("middle")]).unwrap();
        assert_eq!(styles.align_horizontal, Some(AlignHorizontal::Center));
        assert_eq!(styles.align_vertical, Some(AlignVertical::Middle));
        assert!(apply("align", &[word("middle"), word("center")]).is_err());
    }

    #[test]
    fn border_with_colour() {
        let styles =
            apply("border", &[word("round"), DeclarationValue::Color("ff0000".into())]).unwrap();
        assert_eq!(
            styles.border,
            Some(Border { kind: BorderKind::Round, color: Some("#ff0000".into()) })
        );
    }

    #[test]
    fn text_style_flags() {
        let styles = apply("text-style", &[word("bold"), word("underline")]).unwrap();
        let flags = styles.text_style.unwrap();
        assert!(flags.bold && flags.underline && !flags.italic);
    }

    #[test]
    fn layers_list() {
        let styles = apply("layers", &[word("below"), word("above")]).unwrap();
        assert_eq!(styles.layers, Some(vec!["below".to_owned(), "above".to_owned()]));
    }

    #[test]
    fn unknown_property() {
        assert_eq!(
            apply("colour", &[word("red")]),
            Err(PropertyError::UnknownProperty("colour".into()))
        );
    }

    #[test]
    fn bad_keyword_leaves_styles_untouched() {
        let mut styles = Styles::new();
        let err = apply_declaration(&mut styles, "dock", &[word("middle")]).unwrap_err();
        assert!(err.to_string().contains("top|right|bottom|left"));
        assert!(styles.is_empty());
    }
}

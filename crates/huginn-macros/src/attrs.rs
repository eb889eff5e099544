use syn::{Attribute, LitStr, Result};

/// How a field is rendered.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Describe,
    Display,
    Debug,
    Skip,
}

/// `#[debug_case(display)]` on the type.
pub fn container_display(attrs: &[Attribute]) -> Result<bool> {
    let mut display = false;
    for attr in debug_case_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("display") {
                display = true;
                Ok(())
            } else {
                Err(meta.error("unknown debug_case container attribute, expected `display`"))
            }
        })?;
    }
    Ok(display)
}

/// `#[debug_case(rename = "...")]` on a variant.
pub fn variant_rename(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut rename = None;
    for attr in debug_case_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                rename = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unknown debug_case variant attribute, expected `rename`"))
            }
        })?;
    }
    Ok(rename)
}

/// `#[debug_case(skip | display | debug)]` on a field.
pub fn field_mode(attrs: &[Attribute]) -> Result<FieldMode> {
    let mut mode = FieldMode::Describe;
    for attr in debug_case_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            let next = if meta.path.is_ident("skip") {
                FieldMode::Skip
            } else if meta.path.is_ident("display") {
                FieldMode::Display
            } else if meta.path.is_ident("debug") {
                FieldMode::Debug
            } else {
                return Err(meta.error(
                    "unknown debug_case field attribute, expected `skip`, `display` or `debug`",
                ));
            };
            if mode != FieldMode::Describe {
                return Err(meta.error("only one debug_case mode per field"));
            }
            mode = next;
            Ok(())
        })?;
    }
    Ok(mode)
}

fn debug_case_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("debug_case"))
}

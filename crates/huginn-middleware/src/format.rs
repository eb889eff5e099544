//! Compact, human-readable rendering of actions for trace messages.
//!
//! Values describe their own structure through [`DebugCase`], and
//! [`debug_case`] turns that description into strings such as
//! `.result(.failure(timeout))` or `id: 7, name: a`:
//!
//! - a tagged case without payload renders as `.name`, or as nothing when
//!   its text is the type name itself
//! - a tagged case with a payload renders as `.name(payload)`, dropping the
//!   parentheses when the payload renders empty
//! - a tuple or record renders its fields joined with `", "`, labeled fields
//!   as `label: value`
//! - anything else renders as its own text
//!
//! Most types get [`DebugCase`] from `#[derive(DebugCase)]`.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A value that can describe its structure to the action formatter.
pub trait DebugCase {
    fn shape(&self) -> Shape<'_>;
}

/// Structural description of a value.
pub enum Shape<'a> {
    /// A tagged case without payload.
    Unit {
        /// The case's own text, usually its name.
        text: &'a str,
        /// The name of the type the case belongs to.
        type_name: &'a str,
    },

    /// A tagged case carrying a payload.
    Case { label: &'a str, payload: Payload<'a> },

    /// A tuple or record.
    Tuple(Vec<Field<'a>>),

    /// An atomic value, already rendered.
    Leaf(Cow<'a, str>),
}

/// Payload of a tagged case.
pub enum Payload<'a> {
    /// Exactly one associated value.
    Single(Child<'a>),

    /// Several associated values, or named ones.
    Fields(Vec<Field<'a>>),
}

/// A nested value.
pub enum Child<'a> {
    /// Described recursively.
    Value(&'a dyn DebugCase),

    /// Rendered up front, for values that cannot describe themselves.
    Text(Cow<'a, str>),
}

/// One element of a tuple, record, or multi-value payload.
pub struct Field<'a> {
    pub label: Option<&'a str>,
    pub child: Child<'a>,
}

impl<'a> Shape<'a> {
    /// Leaf rendered with `Display`.
    pub fn display(value: &dyn fmt::Display) -> Self {
        Shape::Leaf(Cow::Owned(value.to_string()))
    }

    /// Leaf rendered with `Debug`.
    pub fn debug(value: &dyn fmt::Debug) -> Self {
        Shape::Leaf(Cow::Owned(format!("{value:?}")))
    }

    /// Tagged case with one associated value.
    pub fn case(label: &'a str, value: &'a dyn DebugCase) -> Self {
        Shape::Case {
            label,
            payload: Payload::Single(Child::Value(value)),
        }
    }
}

impl<'a> Field<'a> {
    pub fn labeled(label: &'a str, value: &'a dyn DebugCase) -> Self {
        Self {
            label: Some(label),
            child: Child::Value(value),
        }
    }

    pub fn unlabeled(value: &'a dyn DebugCase) -> Self {
        Self {
            label: None,
            child: Child::Value(value),
        }
    }

    /// A field whose value is already rendered.
    pub fn text(label: Option<&'a str>, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            label,
            child: Child::Text(text.into()),
        }
    }
}

/// Render a value for a trace message. Never fails.
pub fn debug_case<T: DebugCase + ?Sized>(value: &T) -> String {
    render(value.shape())
}

fn render(shape: Shape<'_>) -> String {
    match shape {
        Shape::Unit { text, type_name } => {
            if text == type_name {
                String::new()
            } else {
                format!(".{text}")
            }
        }
        Shape::Case { label, payload } => {
            let inner = match payload {
                Payload::Single(child) => render_child(child),
                Payload::Fields(fields) => render_fields(fields),
            };
            if inner.is_empty() {
                format!(".{label}")
            } else {
                format!(".{label}({inner})")
            }
        }
        Shape::Tuple(fields) => render_fields(fields),
        Shape::Leaf(text) => text.into_owned(),
    }
}

fn render_child(child: Child<'_>) -> String {
    match child {
        Child::Value(value) => render(value.shape()),
        Child::Text(text) => text.into_owned(),
    }
}

fn render_fields(fields: Vec<Field<'_>>) -> String {
    fields
        .into_iter()
        .map(|field| {
            let value = render_child(field.child);
            match field.label {
                Some(label) if value.is_empty() => format!("{label}:"),
                Some(label) => format!("{label}: {value}"),
                None => value,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Standard library impls
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! leaf_via_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DebugCase for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::display(self)
                }
            }
        )*
    };
}

leaf_via_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char,
);

impl DebugCase for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self))
    }
}

impl DebugCase for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self.as_str()))
    }
}

impl DebugCase for Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Leaf(Cow::Borrowed(self.as_ref()))
    }
}

impl<T: DebugCase> DebugCase for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => Shape::case("Some", value),
            None => Shape::Unit {
                text: "None",
                type_name: "Option",
            },
        }
    }
}

impl<T: DebugCase, E: DebugCase> DebugCase for Result<T, E> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Ok(value) => Shape::case("Ok", value),
            Err(error) => Shape::case("Err", error),
        }
    }
}

impl<T: fmt::Debug> DebugCase for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::debug(&self)
    }
}

impl<T: fmt::Debug> DebugCase for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::debug(self)
    }
}

impl<T: DebugCase + ?Sized> DebugCase for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: DebugCase + ?Sized> DebugCase for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: DebugCase + ?Sized> DebugCase for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: DebugCase + ?Sized> DebugCase for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl DebugCase for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Tuple(Vec::new())
    }
}

macro_rules! tuple_impl {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: DebugCase),+> DebugCase for ($($name,)+) {
            fn shape(&self) -> Shape<'_> {
                Shape::Tuple(vec![$(Field::unlabeled(&self.$idx)),+])
            }
        }
    };
}

tuple_impl!(A.0);
tuple_impl!(A.0, B.1);
tuple_impl!(A.0, B.1, C.2);
tuple_impl!(A.0, B.1, C.2, D.3);
tuple_impl!(A.0, B.1, C.2, D.3, E.4);
tuple_impl!(A.0, B.1, C.2, D.3, E.4, F.5);

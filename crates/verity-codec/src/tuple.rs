//! Fixed-length heterogeneous arrays, decoded into native Rust tuples.
//!
//! `tuple((string(), number()))` is a `Codec<(String, f64)>` accepting
//! `["a", 1]`. Arities 1 through 6 are supported through [`TupleCodecs`],
//! which is implemented for tuples of codecs by a macro below.

use std::sync::Arc;

use serde_json::Value;

use crate::codec::Codec;
use crate::error::CodecError;
use crate::schema::Schema;

/// A tuple of codecs that together describe a tuple of values.
///
/// You never implement this yourself; it exists so [`tuple`] can accept
/// `(Codec<A>,)`, `(Codec<A>, Codec<B>)`, and so on with a single function.
pub trait TupleCodecs: Send + Sync + 'static {
    /// The decoded tuple type, e.g. `(String, f64)`.
    type Output: 'static;

    /// Number of elements the JSON array must have.
    const ARITY: usize;

    /// Decodes `elements`, which is known to have [`Self::ARITY`] entries.
    fn decode_elements(&self, elements: &[Value]) -> Result<Self::Output, CodecError>;

    fn encode_elements(&self, value: &Self::Output) -> Vec<Value>;

    fn schemas(&self) -> Vec<Schema>;
}

// The `$idx` token doubles as the tuple field (`self.0`) and the array
// position (`elements.get(0)`).
macro_rules! impl_tuple_codecs {
    ($arity:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: 'static),+> TupleCodecs for ($(Codec<$name>,)+) {
            type Output = ($($name,)+);
            const ARITY: usize = $arity;

            fn decode_elements(&self, elements: &[Value]) -> Result<Self::Output, CodecError> {
                Ok(($(
                    self.$idx
                        .decode_field(elements.get($idx))
                        .map_err(|err| CodecError::index($idx, err))?,
                )+))
            }

            fn encode_elements(&self, value: &Self::Output) -> Vec<Value> {
                vec![$(self.$idx.encode(&value.$idx)),+]
            }

            fn schemas(&self) -> Vec<Schema> {
                vec![$(self.$idx.schema()),+]
            }
        }
    };
}

impl_tuple_codecs!(1; A: 0);
impl_tuple_codecs!(2; A: 0, B: 1);
impl_tuple_codecs!(3; A: 0, B: 1, C: 2);
impl_tuple_codecs!(4; A: 0, B: 1, C: 2, D: 3);
impl_tuple_codecs!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_codecs!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

/// A JSON array of exactly `C::ARITY` elements, each with its own codec.
///
/// A length mismatch is reported before any element is looked at.
/// Otherwise elements are decoded left to right and the first failure
/// is returned, wrapped with its index.
pub fn tuple<C: TupleCodecs>(codecs: C) -> Codec<C::Output> {
    let codecs = Arc::new(codecs);
    let (decoder, encoder) = (Arc::clone(&codecs), Arc::clone(&codecs));
    Codec::from_parts(
        move |input| match input {
            Some(Value::Array(elements)) if elements.len() == C::ARITY => {
                decoder.decode_elements(elements)
            }
            Some(Value::Array(elements)) => Err(CodecError::TupleLength {
                expected: C::ARITY,
                received: elements.len(),
            }),
            other => Err(CodecError::mismatch("an array", other)),
        },
        move |value: &C::Output| Some(Value::Array(encoder.encode_elements(value))),
        move || Schema::tuple(codecs.schemas()),
    )
}

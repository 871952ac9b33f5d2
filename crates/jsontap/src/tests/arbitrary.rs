use quickcheck::{Arbitrary, Gen};
use serde_json::{Map, Number, Value};

/// A top-level JSON document: always an object or an array.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document(pub Value);

#[derive(Debug, Copy, Clone, PartialEq)]
struct JsonNumber(f64);

impl Arbitrary for JsonNumber {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut value = f64::arbitrary(g);
        while !value.is_finite() {
            value = f64::arbitrary(g);
        }

        Self(value)
    }
}

fn number(g: &mut Gen) -> Value {
    if bool::arbitrary(g) {
        Value::from(i64::arbitrary(g))
    } else {
        Number::from_f64(JsonNumber::arbitrary(g).0).map_or(Value::Null, Value::Number)
    }
}

fn array(g: &mut Gen, depth: usize) -> Value {
    let len = usize::arbitrary(g) % 4;
    Value::Array((0..len).map(|_| gen_val(g, depth)).collect())
}

fn object(g: &mut Gen, depth: usize) -> Value {
    let len = usize::arbitrary(g) % 4;
    let mut map = Map::new();
    for _ in 0..len {
        map.insert(String::arbitrary(g), gen_val(g, depth));
    }
    Value::Object(map)
}

fn gen_val(g: &mut Gen, depth: usize) -> Value {
    let kinds = if depth == 0 { 4 } else { 6 };
    match usize::arbitrary(g) % kinds {
        0 => Value::Null,
        1 => Value::Bool(bool::arbitrary(g)),
        2 => number(g),
        3 => Value::String(String::arbitrary(g)),
        4 => array(g, depth - 1),
        _ => object(g, depth - 1),
    }
}

impl Arbitrary for Document {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = usize::arbitrary(g) % 3;
        if bool::arbitrary(g) {
            Self(array(g, depth))
        } else {
            Self(object(g, depth))
        }
    }
}

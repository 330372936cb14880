use crate::value::Value;

///
/// FieldValue
///
/// Conversion between a concrete struct field and the dynamic `Value`
/// surface. Only text-bearing types accept translated text.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;

    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Whether `assign_text` would store the text.
    fn accepts_text(&self) -> bool {
        false
    }

    fn assign_text(&mut self, _text: String) -> bool {
        false
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn accepts_text(&self) -> bool {
        true
    }

    fn assign_text(&mut self, text: String) -> bool {
        *self = text;
        true
    }
}

impl FieldValue for Option<String> {
    fn to_value(&self) -> Value {
        self.as_ref()
            .map_or(Value::Null, |text| Value::Text(text.clone()))
    }

    fn as_text(&self) -> Option<&str> {
        self.as_deref()
    }

    fn accepts_text(&self) -> bool {
        true
    }

    fn assign_text(&mut self, text: String) -> bool {
        *self = Some(text);
        true
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }

    fn as_text(&self) -> Option<&str> {
        Some(*self)
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn as_text(&self) -> Option<&str> {
        Value::as_text(self)
    }
}

impl FieldValue for Vec<String> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().cloned().map(Value::Text).collect())
    }
}

macro_rules! impl_field_value_signed {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }
        )*
    };
}

macro_rules! impl_field_value_unsigned {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Uint(u64::from(*self))
                }
            }
        )*
    };
}

impl_field_value_signed!(i8, i16, i32, i64);
impl_field_value_unsigned!(u8, u16, u32, u64);

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_field_value_optional {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for Option<$ty> {
                fn to_value(&self) -> Value {
                    self.as_ref().map_or(Value::Null, FieldValue::to_value)
                }
            }
        )*
    };
}

impl_field_value_optional!(bool, i32, i64, u32, u64);

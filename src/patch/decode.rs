use serde_json::Value;
use thiserror::Error as ThisError;

use super::field::{Field, SparseFields, SqlValue};
use crate::db::models::{Column, ColumnKind};

#[derive(Debug, ThisError)]
pub enum DecodeError {
    #[error("request body is not valid JSON: {0}")]
    Malformed(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("field `{field}` must be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

/// Parse raw body bytes and decode them against `columns`.
pub fn decode_slice<'a>(
    body: &[u8],
    columns: impl IntoIterator<Item = &'a Column>,
) -> Result<SparseFields, DecodeError> {
    let doc: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    decode_fields(&doc, columns)
}

/// Decode a JSON document into a sparse field set covering exactly `columns`.
///
/// Keys that do not name one of `columns` are ignored.
pub fn decode_fields<'a>(
    doc: &Value,
    columns: impl IntoIterator<Item = &'a Column>,
) -> Result<SparseFields, DecodeError> {
    let obj = doc.as_object().ok_or(DecodeError::NotAnObject)?;

    let mut fields = SparseFields::new();
    for column in columns {
        let field = match obj.get(column.name) {
            None => Field::Absent,
            Some(Value::Null) => Field::Null,
            Some(value) => Field::Present(coerce(column, value)?),
        };
        fields.insert(column.name, field);
    }
    Ok(fields)
}

fn coerce(column: &Column, value: &Value) -> Result<SqlValue, DecodeError> {
    let mismatch = |expected| DecodeError::TypeMismatch {
        field: column.name,
        expected,
    };
    match column.kind {
        ColumnKind::Text => value
            .as_str()
            .map(SqlValue::from)
            .ok_or_else(|| mismatch("a string")),
        ColumnKind::Integer => value
            .as_i64()
            .map(SqlValue::Integer)
            .ok_or_else(|| mismatch("an integer")),
        ColumnKind::Flag => match value {
            Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
            Value::Number(n) => match n.as_i64() {
                Some(i @ (0 | 1)) => Ok(SqlValue::Integer(i)),
                _ => Err(mismatch("0 or 1")),
            },
            _ => Err(mismatch("0 or 1")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{GROCERY_ITEM_SHAPE, LIST_ITEM_SHAPE, LIST_SHAPE};
    use serde_json::json;

    #[test]
    fn distinguishes_absent_null_and_present() {
        let doc = json!({ "quantity": 3, "checked": null });
        let fields = decode_fields(&doc, LIST_ITEM_SHAPE.patchable()).unwrap();

        assert_eq!(fields.get("quantity"), Field::Present(&SqlValue::Integer(3)));
        assert_eq!(fields.get("checked"), Field::Null);
        assert_eq!(fields.get("position"), Field::Absent);
    }

    #[test]
    fn ignores_unknown_and_out_of_scope_keys() {
        let doc = json!({ "id": "not-a-number", "title": "Milk run", "colour": "red" });
        let fields = decode_fields(&doc, LIST_SHAPE.patchable()).unwrap();

        assert_eq!(fields.present_count(), 1);
        assert!(fields.get("id").is_absent());
    }

    #[test]
    fn flag_accepts_bool_and_binary_integers() {
        let shape = LIST_ITEM_SHAPE.patchable();
        let fields = decode_fields(&json!({ "checked": true }), shape).unwrap();
        assert_eq!(fields.get("checked"), Field::Present(&SqlValue::Integer(1)));

        let fields = decode_fields(&json!({ "checked": 0 }), LIST_ITEM_SHAPE.patchable()).unwrap();
        assert_eq!(fields.get("checked"), Field::Present(&SqlValue::Integer(0)));

        let err = decode_fields(&json!({ "checked": 2 }), LIST_ITEM_SHAPE.patchable()).unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { field: "checked", .. }));
    }

    #[test]
    fn rejects_values_of_the_wrong_type() {
        let err = decode_fields(&json!({ "minimum": "5" }), GROCERY_ITEM_SHAPE.patchable())
            .unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { field: "minimum", .. }));

        let err = decode_fields(&json!({ "current": 1.5 }), GROCERY_ITEM_SHAPE.patchable())
            .unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { field: "current", .. }));

        let err = decode_fields(&json!({ "name": 12 }), GROCERY_ITEM_SHAPE.patchable())
            .unwrap_err();
        assert!(matches!(err, DecodeError::TypeMismatch { field: "name", .. }));
    }

    #[test]
    fn rejects_non_objects_and_garbage() {
        let err = decode_fields(&json!([1, 2]), LIST_SHAPE.patchable()).unwrap_err();
        assert!(matches!(err, DecodeError::NotAnObject));

        let err = decode_slice(b"{\"title\":", LIST_SHAPE.patchable()).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn negative_integers_are_ordinary_values() {
        let fields = decode_fields(&json!({ "quantity": -1 }), LIST_ITEM_SHAPE.patchable()).unwrap();
        assert_eq!(fields.get("quantity"), Field::Present(&SqlValue::Integer(-1)));
    }
}

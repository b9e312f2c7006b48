//! Decoding of response envelopes into a closed set of response shapes.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::rows::{classify_rows, ClassifiedRows, RowKind, UnrecognizedTable};
use super::types::{scalar_string, scalar_to_string, ResponseEnvelope};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReceiptDetail {
    #[serde(default, deserialize_with = "scalar_string")]
    pub key: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
}

/// Confirmation payload of a mutating command (run, stop, remove, pull, prune).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionReceipt {
    #[serde(default, deserialize_with = "scalar_string")]
    pub action: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub status: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub resource_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Vec<ReceiptDetail>,
}

/// Table built by the assistant, which names its own columns.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TablePayload {
    /// No rows; the kind is guessed from the command text.
    Empty(RowKind),
    Rows(ClassifiedRows),
    Unrecognized(UnrecognizedTable),
}

/// Every shape a response can take once decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResponse {
    Error(String),
    Table(TablePayload),
    ActionReceipt(ActionReceipt),
    Inspect { object_name: String, payload: String },
    Text(String),
    AssistantText(String),
    AssistantTable(AssistantTable),
    /// Known output type whose payload did not fit it
    Malformed { output_type: String, reason: String },
    Unrecognized(String),
}

impl ResponseEnvelope {
    pub fn decode(&self) -> DecodedResponse {
        if let Some(error) = self.error_message() {
            return DecodedResponse::Error(error.to_string());
        }

        let output_type = self.output_type.as_deref().unwrap_or("");
        match output_type {
            "table" => DecodedResponse::Table(decode_table(&self.output, self.received_command())),
            "action_receipt" => match ActionReceipt::deserialize(&self.output) {
                Ok(receipt) if self.output.is_object() => DecodedResponse::ActionReceipt(receipt),
                Ok(_) => malformed(output_type, "expected an object"),
                Err(e) => malformed(output_type, e.to_string()),
            },
            "inspect" => DecodedResponse::Inspect {
                object_name: inspected_object_name(self.received_command()),
                payload: pretty_payload(&self.output),
            },
            "text" => DecodedResponse::Text(text_payload(&self.output)),
            "gemini_text" => DecodedResponse::AssistantText(text_payload(&self.output)),
            "gemini_table" => match decode_assistant_table(&self.output) {
                Ok(table) => DecodedResponse::AssistantTable(table),
                Err(reason) => malformed(output_type, reason),
            },
            other => DecodedResponse::Unrecognized(other.to_string()),
        }
    }
}

fn malformed(output_type: &str, reason: impl Into<String>) -> DecodedResponse {
    DecodedResponse::Malformed {
        output_type: output_type.to_string(),
        reason: reason.into(),
    }
}

fn decode_table(output: &Value, received_command: &str) -> TablePayload {
    match output {
        Value::Null => TablePayload::Empty(RowKind::from_command_hint(received_command)),
        Value::Array(rows) if rows.is_empty() => {
            TablePayload::Empty(RowKind::from_command_hint(received_command))
        }
        Value::Array(rows) => match classify_rows(rows) {
            Ok(classified) => TablePayload::Rows(classified),
            Err(e) => TablePayload::Unrecognized(e),
        },
        _ => TablePayload::Unrecognized(UnrecognizedTable::NotAnObject { index: 0 }),
    }
}

/// `inspect container web` names `web`: the first two tokens are the verb and
/// the object type.
pub fn inspected_object_name(received_command: &str) -> String {
    received_command
        .split_whitespace()
        .skip(2)
        .collect::<Vec<_>>()
        .join(" ")
}

fn pretty_payload(output: &Value) -> String {
    match output {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => {
                serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| s.clone())
            }
            _ => s.clone(),
        },
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| output.to_string())
        }
        other => scalar_to_string(other),
    }
}

fn text_payload(output: &Value) -> String {
    match output {
        Value::Object(_) | Value::Array(_) => pretty_payload(output),
        other => scalar_to_string(other),
    }
}

fn decode_assistant_table(output: &Value) -> Result<AssistantTable, String> {
    let object = output.as_object().ok_or("expected an object with headers and rows")?;

    let headers: Vec<String> = object
        .get("headers")
        .and_then(Value::as_array)
        .ok_or("missing headers")?
        .iter()
        .map(scalar_to_string)
        .collect();
    if headers.is_empty() {
        return Err("headers are empty".to_string());
    }

    let rows = match object.get("rows") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows
            .iter()
            .enumerate()
            .map(|(i, row)| -> Result<Vec<String>, String> {
                let cells = row.as_array().ok_or(format!("row {i} is not a list"))?;
                let mut cells: Vec<String> = cells.iter().map(scalar_to_string).collect();
                cells.resize(headers.len(), String::new());
                Ok(cells)
            })
            .collect::<Result<Vec<_>, String>>()?,
        Some(_) => return Err("rows is not a list".to_string()),
    };

    Ok(AssistantTable { headers, rows })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn envelope(value: Value) -> ResponseEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case("table")]
    #[case("action_receipt")]
    #[case("gemini_text")]
    #[case("made_up")]
    #[case("")]
    fn test_error_takes_precedence(#[case] output_type: &str) {
        let env = envelope(json!({"output_type": output_type, "output": [{"status": "Up"}], "error": "boom"}));
        assert_eq!(env.decode(), DecodedResponse::Error("boom".to_string()));
    }

    #[test]
    fn test_empty_table_uses_command_hint() {
        let env = envelope(json!({"output_type": "table", "output": []}))
            .with_received_command("docker image ls");
        assert_eq!(env.decode(), DecodedResponse::Table(TablePayload::Empty(RowKind::Image)));

        let env = envelope(json!({"output_type": "table", "output": null}));
        assert_eq!(env.decode(), DecodedResponse::Table(TablePayload::Empty(RowKind::Container)));
    }

    #[test]
    fn test_table_of_scalars_is_unrecognized() {
        let env = envelope(json!({"output_type": "table", "output": "not rows"}));
        assert!(matches!(
            env.decode(),
            DecodedResponse::Table(TablePayload::Unrecognized(_))
        ));
    }

    #[test]
    fn test_receipt_without_details() {
        let env = envelope(json!({
            "output_type": "action_receipt",
            "output": {"action": "Stop", "status": "Berhasil Dihentikan", "resource_type": "Kontainer", "resource_name": "web"}
        }));
        match env.decode() {
            DecodedResponse::ActionReceipt(receipt) => {
                assert_eq!(receipt.action, "Stop");
                assert!(receipt.details.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_receipt_details_keep_order() {
        let env = envelope(json!({
            "output_type": "action_receipt",
            "output": {"action": "Run", "status": "ok", "resource_type": "Kontainer", "resource_name": "web",
                       "details": [{"key": "ID", "value": "abc"}, {"key": "Image", "value": "nginx"}]}
        }));
        let DecodedResponse::ActionReceipt(receipt) = env.decode() else {
            panic!("expected receipt");
        };
        let keys: Vec<_> = receipt.details.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["ID", "Image"]);
    }

    #[test]
    fn test_receipt_that_is_not_an_object_is_malformed() {
        let env = envelope(json!({"output_type": "action_receipt", "output": null}));
        assert!(matches!(env.decode(), DecodedResponse::Malformed { .. }));
    }

    #[rstest]
    #[case("inspect container web", "web")]
    #[case("inspect   volume   data_old", "data_old")]
    #[case("inspect container", "")]
    #[case("periksa image nginx latest", "nginx latest")]
    fn test_inspected_object_name(#[case] command: &str, #[case] expected: &str) {
        assert_eq!(inspected_object_name(command), expected);
    }

    #[test]
    fn test_inspect_reindents_json_strings() {
        let env = envelope(json!({"output_type": "inspect", "output": "{\"Id\":\"abc\"}"}))
            .with_received_command("inspect container web");
        assert_eq!(
            env.decode(),
            DecodedResponse::Inspect {
                object_name: "web".to_string(),
                payload: "{\n  \"Id\": \"abc\"\n}".to_string(),
            }
        );
    }

    #[test]
    fn test_text_output_variants() {
        let env = envelope(json!({"output_type": "text", "output": "hello"}));
        assert_eq!(env.decode(), DecodedResponse::Text("hello".to_string()));
        let env = envelope(json!({"output_type": "text", "output": null}));
        assert_eq!(env.decode(), DecodedResponse::Text(String::new()));
    }

    #[test]
    fn test_assistant_table_pads_short_rows() {
        let env = envelope(json!({
            "output_type": "gemini_table",
            "output": {"headers": ["Name", "State"], "rows": [["web", "running"], ["db"]]}
        }));
        assert_eq!(
            env.decode(),
            DecodedResponse::AssistantTable(AssistantTable {
                headers: vec!["Name".to_string(), "State".to_string()],
                rows: vec![
                    vec!["web".to_string(), "running".to_string()],
                    vec!["db".to_string(), String::new()],
                ],
            })
        );
    }

    #[test]
    fn test_assistant_table_without_headers_is_malformed() {
        let env = envelope(json!({"output_type": "gemini_table", "output": {"rows": []}}));
        assert!(matches!(env.decode(), DecodedResponse::Malformed { .. }));
    }

    #[test]
    fn test_unknown_output_type_is_named() {
        let env = envelope(json!({"output_type": "unknown_tag"}));
        assert_eq!(env.decode(), DecodedResponse::Unrecognized("unknown_tag".to_string()));
    }
}

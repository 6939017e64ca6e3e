// JSON and text renderers for command payloads

use crate::dispatch::{Payload, TerminatingError};
use serde_json::Value;
use std::cmp::max;

/// Rows of named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// JSON formatter
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(payload: &Payload) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(payload)
    }

    pub fn format_error(error: &TerminatingError) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(error)
    }
}

/// Text formatter
///
/// Single objects render as `Name : Value` lists, collections as padded
/// column tables, plain strings verbatim.
pub struct TextFormatter;

impl TextFormatter {
    pub fn format(payload: &Payload) -> Result<String, serde_json::Error> {
        if let Payload::Text(text) = payload {
            return Ok(text.clone());
        }

        match serde_json::to_value(payload)? {
            Value::Array(items) => Ok(Self::format_table(&Self::table_from(&items))),
            Value::Object(map) => {
                let fields: Vec<(String, String)> =
                    map.into_iter().map(|(k, v)| (k, Self::cell(&v))).collect();
                Ok(Self::format_list(&fields))
            }
            other => Ok(Self::cell(&other)),
        }
    }

    fn table_from(items: &[Value]) -> TableData {
        let mut data = TableData::default();
        for item in items {
            if let Value::Object(map) = item {
                if data.headers.is_empty() {
                    data.headers = map.keys().cloned().collect();
                }
                data.rows.push(
                    data.headers
                        .iter()
                        .map(|h| map.get(h).map(Self::cell).unwrap_or_default())
                        .collect(),
                );
            }
        }
        data
    }

    fn cell(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .values()
                .map(Self::cell)
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        }
    }

    pub fn format_list(fields: &[(String, String)]) -> String {
        let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        fields
            .iter()
            .map(|(k, v)| format!("{:<width$} : {}", k, v, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_table(data: &TableData) -> String {
        if data.headers.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = data.headers.iter().map(String::len).collect();
        for row in &data.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = max(widths[i], cell.len());
            }
        }

        let render = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = vec![render(&data.headers)];
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        lines.extend(data.rows.iter().map(|row| render(row)));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{NetworkDescription, NetworkNode, NetworkStatus, NetworkType};

    #[test]
    fn test_network_list_as_table() {
        let payload = Payload::NetworkNodes(vec![
            NetworkNode {
                network_name: "overlay0".to_string(),
                node_name: "_Node_0".to_string(),
            },
            NetworkNode {
                network_name: "overlay0".to_string(),
                node_name: "_Node_1".to_string(),
            },
        ]);
        let text = TextFormatter::format(&payload).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "network_name  node_name");
        assert_eq!(lines[1], "------------  ---------");
        assert_eq!(lines[2], "overlay0      _Node_0");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_single_object_as_list() {
        let payload = Payload::Network(NetworkDescription {
            network_name: "overlay0".to_string(),
            network_type: NetworkType::Isolated,
            address_prefix: "10.10.0.0/16".to_string(),
            status: NetworkStatus::Ready,
        });
        let text = TextFormatter::format(&payload).unwrap();
        assert!(text.contains("network_name   : overlay0"));
        assert!(text.contains("status         : ready"));
    }

    #[test]
    fn test_text_is_verbatim() {
        let payload = Payload::Text("{\"Jobs\":[]}".to_string());
        assert_eq!(TextFormatter::format(&payload).unwrap(), "{\"Jobs\":[]}");
        assert_eq!(JsonFormatter::format(&payload).unwrap(), "\"{\\\"Jobs\\\":[]}\"");
    }
}
